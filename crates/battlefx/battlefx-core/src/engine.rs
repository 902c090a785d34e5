//! Engine: owns the task and sprite pools plus every buffer effects share.
//!
//! Tick contract (one call per displayed frame):
//! 1. every task that existed before this tick runs once, ascending priority,
//!    ties broken by allocation order;
//! 2. every sprite that existed before this tick runs once, in pool order;
//! 3. the scanline buffers swap.
//!
//! Entries created during a tick first run on the following tick. Destroying an
//! entry frees its slot immediately; a slot reused mid-tick holds a new
//! generation and is skipped until the next tick.

use log::{debug, trace, warn};

use crate::config::{Config, SCRATCH_WORDS};
use crate::error::FxError;
use crate::host::{BattleEnv, SpriteTemplate};
use crate::ids::{MatrixId, SequenceAllocator, SpriteId, TaskId};
use crate::motion::Point;
use crate::palette::Palette;
use crate::pool::SlotPool;
use crate::scanline::{BgScroll, BlendStage, ScanlineBuffers};
use crate::sprite::{Sprite, SpriteBehavior};
use crate::task::{Task, TaskBehavior};

/// Words of the battle-animation argument block.
pub const ANIM_ARG_WORDS: usize = 8;

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    frame: u64,
    seq: SequenceAllocator,
    tasks: SlotPool<Task>,
    sprites: SlotPool<Sprite>,
    matrices: SlotPool<SpriteId>,
    open_visuals: usize,
    leaked_matrices: usize,
    env: Box<dyn BattleEnv>,

    /// Shared color table.
    pub palette: Palette,
    /// Per-line values streamed into the blend stage.
    pub scanline: ScanlineBuffers,
    pub blend: BlendStage,
    pub bg_scroll: BgScroll,
    /// Arguments of the running battle animation; effects also use them as shared signals.
    pub anim_args: [i16; ANIM_ARG_WORDS],
}

impl Engine {
    pub fn new(cfg: Config, env: Box<dyn BattleEnv>) -> Result<Self, FxError> {
        cfg.validate()?;
        Ok(Self {
            frame: 0,
            seq: SequenceAllocator::new(),
            tasks: SlotPool::with_capacity(cfg.task_capacity),
            sprites: SlotPool::with_capacity(cfg.sprite_capacity),
            matrices: SlotPool::with_capacity(cfg.matrix_capacity),
            open_visuals: 0,
            leaked_matrices: 0,
            env,
            palette: Palette::new(cfg.palette_size),
            scanline: ScanlineBuffers::new(cfg.display_lines),
            blend: BlendStage::default(),
            bg_scroll: BgScroll::default(),
            anim_args: [0; ANIM_ARG_WORDS],
            cfg,
        })
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of completed ticks.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn env(&self) -> &dyn BattleEnv {
        self.env.as_ref()
    }

    /// Next value of the host's random stream.
    #[inline]
    pub fn random(&mut self) -> u16 {
        self.env.random()
    }

    /// Drop every entry and clear shared buffers for a new encounter.
    pub fn reset(&mut self) {
        if !self.tasks.is_empty() || !self.sprites.is_empty() {
            debug!(
                "reset drops {} tasks and {} sprites",
                self.tasks.len(),
                self.sprites.len()
            );
        }
        self.tasks.clear();
        self.sprites.clear();
        self.matrices.clear();
        self.seq.reset();
        self.frame = 0;
        self.open_visuals = 0;
        self.leaked_matrices = 0;
        self.palette.clear();
        self.scanline.clear();
        self.blend.clear();
        self.bg_scroll.reset();
        self.anim_args = [0; ANIM_ARG_WORDS];
    }

    // ---------- Tick ----------

    /// Advance every live entry by one tick. See the module docs for the ordering contract.
    pub fn tick(&mut self) {
        self.frame += 1;
        let tasks = self.tick_tasks();
        let sprites = self.tick_sprites();
        self.scanline.swap();
        trace!(
            "frame {}: ran {} tasks, {} sprites",
            self.frame,
            tasks,
            sprites
        );
    }

    /// Phase 1: tasks in (priority, allocation order).
    fn tick_tasks(&mut self) -> usize {
        let frame = self.frame;
        let mut order: Vec<(u8, u64, TaskId)> = self
            .tasks
            .iter()
            .filter(|(_, _, t)| t.spawned_on < frame)
            .map(|(i, g, t)| (t.priority, t.seq, TaskId::new(i, g)))
            .collect();
        order.sort_unstable_by_key(|&(priority, seq, _)| (priority, seq));

        let mut ran = 0;
        for (_, _, id) in order {
            let Some(mut behavior) = self
                .tasks
                .get_mut(id.index, id.generation)
                .and_then(|t| t.behavior.take())
            else {
                continue;
            };
            behavior.step(id, self);
            ran += 1;
            if let Some(task) = self.tasks.get_mut(id.index, id.generation) {
                // a replacement installed during the step wins
                task.behavior.get_or_insert(behavior);
            }
        }
        ran
    }

    /// Phase 2: sprites in pool order.
    fn tick_sprites(&mut self) -> usize {
        let frame = self.frame;
        let order: Vec<SpriteId> = self
            .sprites
            .iter()
            .filter(|(_, _, s)| s.spawned_on < frame)
            .map(|(i, g, _)| SpriteId::new(i, g))
            .collect();

        let mut ran = 0;
        for id in order {
            let Some(mut behavior) = self
                .sprites
                .get_mut(id.index, id.generation)
                .and_then(|s| s.behavior.take())
            else {
                continue;
            };
            behavior.step(id, self);
            ran += 1;
            if let Some(sprite) = self.sprites.get_mut(id.index, id.generation) {
                sprite.behavior.get_or_insert(behavior);
            }
        }
        ran
    }

    // ---------- Tasks ----------

    /// Allocate a task. `None` when the pool is full; nothing else is disturbed.
    pub fn create_task(&mut self, behavior: TaskBehavior, priority: u8) -> Option<TaskId> {
        let name = behavior.name();
        let task = Task::new(behavior, priority, self.seq.alloc(), self.frame);
        match self.tasks.insert(task) {
            Some((index, generation)) => {
                let id = TaskId::new(index, generation);
                debug!("created {name} {id:?} (priority {priority})");
                Some(id)
            }
            None => {
                warn!("task pool full ({}); {name} not created", self.tasks.capacity());
                None
            }
        }
    }

    /// Like [`Engine::create_task`], and the task counts as an open visual until
    /// [`Engine::destroy_visual_task`].
    pub fn create_visual_task(&mut self, behavior: TaskBehavior, priority: u8) -> Option<TaskId> {
        let id = self.create_task(behavior, priority)?;
        if let Some(task) = self.tasks.get_mut(id.index, id.generation) {
            task.counted = true;
            self.open_visuals += 1;
        }
        Some(id)
    }

    /// Free the task's slot. Returns `false` for a stale handle.
    pub fn destroy_task(&mut self, id: TaskId) -> bool {
        match self.tasks.remove(id.index, id.generation) {
            Some(task) => {
                if task.counted {
                    self.open_visuals = self.open_visuals.saturating_sub(1);
                }
                debug!("destroyed task {id:?}");
                true
            }
            None => {
                debug!("destroy of stale {id:?} ignored");
                false
            }
        }
    }

    /// Destroy a task created with [`Engine::create_visual_task`], closing its visual.
    pub fn destroy_visual_task(&mut self, id: TaskId) -> bool {
        self.destroy_task(id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id.index, id.generation)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(id.index, id.generation)
    }

    /// Typed access to another task's state; `None` if stale or currently running.
    pub fn task_behavior_mut(&mut self, id: TaskId) -> Option<&mut TaskBehavior> {
        self.task_mut(id).and_then(|t| t.behavior.as_mut())
    }

    /// Replace a task's behavior. Inside its own step this takes effect after the step returns.
    pub fn set_task_behavior(&mut self, id: TaskId, behavior: TaskBehavior) -> Result<(), FxError> {
        let task = self
            .task_mut(id)
            .ok_or(FxError::StaleTask { index: id.index() })?;
        task.behavior = Some(behavior);
        Ok(())
    }

    /// Scratch word `slot` of a task; fails for a stale handle or `slot >= SCRATCH_WORDS`.
    pub fn task_scratch(&self, id: TaskId, slot: usize) -> Result<i16, FxError> {
        let task = self
            .task(id)
            .ok_or(FxError::StaleTask { index: id.index() })?;
        task.scratch.get(slot).copied().ok_or_else(|| scratch_range(slot))
    }

    pub fn set_task_scratch(&mut self, id: TaskId, slot: usize, value: i16) -> Result<(), FxError> {
        let task = self
            .task_mut(id)
            .ok_or(FxError::StaleTask { index: id.index() })?;
        *task.scratch.get_mut(slot).ok_or_else(|| scratch_range(slot))? = value;
        Ok(())
    }

    #[inline]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Live task handles in pool order.
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks
            .iter()
            .map(|(i, g, _)| TaskId::new(i, g))
            .collect()
    }

    // ---------- Sprites ----------

    /// Allocate an idle sprite at `(x, y)`. `None` when the pool is full.
    pub fn create_sprite(
        &mut self,
        template: SpriteTemplate,
        x: i32,
        y: i32,
        subpriority: u8,
    ) -> Option<SpriteId> {
        self.create_sprite_with(template, Point::new(x, y), subpriority, SpriteBehavior::Idle)
    }

    /// Allocate a sprite running `behavior`. Affine templates also take a matrix.
    pub fn create_sprite_with(
        &mut self,
        template: SpriteTemplate,
        base: Point,
        subpriority: u8,
        behavior: SpriteBehavior,
    ) -> Option<SpriteId> {
        let name = behavior.name();
        let mut sprite = Sprite::new(template, base, subpriority, self.frame);
        sprite.behavior = Some(behavior);
        let Some((index, generation)) = self.sprites.insert(sprite) else {
            warn!("sprite pool full ({}); {name} not created", self.sprites.capacity());
            return None;
        };
        let id = SpriteId::new(index, generation);
        if template.affine {
            match self.matrices.insert(id) {
                Some((mi, mg)) => {
                    if let Some(sprite) = self.sprites.get_mut(index, generation) {
                        sprite.affine.matrix = Some(MatrixId::new(mi, mg));
                    }
                }
                None => warn!("no affine matrix left for {id:?}"),
            }
        }
        debug!("created {name} {id:?} at ({}, {})", base.x, base.y);
        Some(id)
    }

    /// Like [`Engine::create_sprite_with`], and the sprite counts as an open visual
    /// until [`Engine::destroy_anim_sprite`].
    pub fn create_visual_sprite(
        &mut self,
        template: SpriteTemplate,
        base: Point,
        subpriority: u8,
        behavior: SpriteBehavior,
    ) -> Option<SpriteId> {
        let id = self.create_sprite_with(template, base, subpriority, behavior)?;
        if let Some(sprite) = self.sprites.get_mut(id.index, id.generation) {
            sprite.counted = true;
            self.open_visuals += 1;
        }
        Some(id)
    }

    /// Free the sprite's slot. A matrix it still owns stays allocated until [`Engine::reset`].
    pub fn destroy_sprite(&mut self, id: SpriteId) -> bool {
        let Some(sprite) = self.sprites.remove(id.index, id.generation) else {
            debug!("destroy of stale {id:?} ignored");
            return false;
        };
        if let Some(matrix) = sprite.affine.matrix {
            self.leaked_matrices += 1;
            warn!("{id:?} destroyed while owning {matrix:?}; matrix leaked");
        }
        if sprite.counted {
            self.open_visuals = self.open_visuals.saturating_sub(1);
        }
        debug!("destroyed sprite {id:?}");
        true
    }

    /// Release the sprite's matrix, then destroy it.
    pub fn destroy_sprite_and_matrix(&mut self, id: SpriteId) -> bool {
        self.free_sprite_matrix(id);
        self.destroy_sprite(id)
    }

    /// Destroy a sprite created as a visual; releases its matrix too.
    pub fn destroy_anim_sprite(&mut self, id: SpriteId) -> bool {
        self.destroy_sprite_and_matrix(id)
    }

    /// Release the sprite's affine matrix, if any.
    pub fn free_sprite_matrix(&mut self, id: SpriteId) {
        let Some(sprite) = self.sprites.get_mut(id.index, id.generation) else {
            return;
        };
        if let Some(matrix) = sprite.affine.matrix.take() {
            self.matrices.remove(matrix.index, matrix.generation);
        }
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(id.index, id.generation)
    }

    pub fn sprite_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.sprites.get_mut(id.index, id.generation)
    }

    /// Typed access to another sprite's state; `None` if stale or currently running.
    pub fn sprite_behavior_mut(&mut self, id: SpriteId) -> Option<&mut SpriteBehavior> {
        self.sprite_mut(id).and_then(|s| s.behavior.as_mut())
    }

    /// Replace a sprite's behavior. Inside its own step this takes effect after the step returns.
    pub fn set_sprite_behavior(
        &mut self,
        id: SpriteId,
        behavior: SpriteBehavior,
    ) -> Result<(), FxError> {
        let sprite = self
            .sprite_mut(id)
            .ok_or(FxError::StaleSprite { index: id.index() })?;
        sprite.behavior = Some(behavior);
        Ok(())
    }

    pub fn sprite_scratch(&self, id: SpriteId, slot: usize) -> Result<i16, FxError> {
        let sprite = self
            .sprite(id)
            .ok_or(FxError::StaleSprite { index: id.index() })?;
        sprite.scratch.get(slot).copied().ok_or_else(|| scratch_range(slot))
    }

    pub fn set_sprite_scratch(&mut self, id: SpriteId, slot: usize, value: i16) -> Result<(), FxError> {
        let sprite = self
            .sprite_mut(id)
            .ok_or(FxError::StaleSprite { index: id.index() })?;
        *sprite.scratch.get_mut(slot).ok_or_else(|| scratch_range(slot))? = value;
        Ok(())
    }

    /// Whether the sprite's frame animation ended. Stale handles read as ended.
    pub fn anim_ended(&self, id: SpriteId) -> bool {
        self.sprite(id).map_or(true, |s| s.anim.ended)
    }

    /// Whether the sprite's affine animation ended. Stale handles read as ended.
    pub fn affine_anim_ended(&self, id: SpriteId) -> bool {
        self.sprite(id).map_or(true, |s| s.affine.ended)
    }

    /// Renderer hook: the frame animation reached its end.
    pub fn mark_anim_ended(&mut self, id: SpriteId) {
        if let Some(sprite) = self.sprite_mut(id) {
            sprite.anim.ended = true;
        }
    }

    /// Renderer hook: the affine animation reached its end.
    pub fn mark_affine_ended(&mut self, id: SpriteId) {
        if let Some(sprite) = self.sprite_mut(id) {
            sprite.affine.ended = true;
        }
    }

    #[inline]
    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn sprite_ids(&self) -> Vec<SpriteId> {
        self.sprites
            .iter()
            .map(|(i, g, _)| SpriteId::new(i, g))
            .collect()
    }

    // ---------- Bookkeeping ----------

    /// Visual tasks and sprites still running.
    #[inline]
    pub fn open_visuals(&self) -> usize {
        self.open_visuals
    }

    /// No visual is running; the combat layer may continue.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.open_visuals == 0
    }

    #[inline]
    pub fn matrices_in_use(&self) -> usize {
        self.matrices.len()
    }

    /// Matrices lost to sprites destroyed without releasing them.
    #[inline]
    pub fn leaked_matrices(&self) -> usize {
        self.leaked_matrices
    }
}

fn scratch_range(slot: usize) -> FxError {
    FxError::ScratchIndexOutOfRange {
        slot,
        words: SCRATCH_WORDS,
    }
}
