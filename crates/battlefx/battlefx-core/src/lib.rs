//! BattleFX Core (renderer-agnostic)
//!
//! Frame-stepped engine for short-lived battle effects: a prioritized task
//! scheduler, a sprite scheduler with render state, fixed-point motion, a
//! store-and-resume continuation for multi-phase sprites, double-buffered
//! scanline values feeding a blend stage, and palette window rotation.
//!
//! The host calls [`Engine::tick`] once per displayed frame and reads sprite
//! positions, the palette, the front scanline buffer, blend registers and
//! background scroll back out. Battler placement and randomness come from a
//! [`BattleEnv`].

pub mod config;
pub mod continuation;
pub mod effects;
pub mod engine;
pub mod error;
pub mod host;
pub mod ids;
pub mod motion;
pub mod palette;
pub mod pool;
pub mod scanline;
pub mod sprite;
pub mod task;
pub mod trig;

// Re-exports for hosts
pub use config::Config;
pub use continuation::{defer_until, Deferral, WaitCondition};
pub use engine::Engine;
pub use error::FxError;
pub use host::{
    BattleEnv, BattlerPosition, BattlerRole, CoordKind, ResourceTag, Side, SpriteTemplate,
    StaticEnv,
};
pub use ids::{MatrixId, SpriteId, TaskId};
pub use motion::{sine_wave, ArcTranslation, LinearTranslation, Point, SineWave};
pub use palette::{Direction, Palette, PaletteWindow};
pub use scanline::{BgScroll, BlendStage, BlendTarget, ScanlineBuffers};
pub use sprite::{AffineState, AnimState, Sprite, SpriteBehavior, SpriteStep};
pub use task::{Task, TaskBehavior, TaskStep};
