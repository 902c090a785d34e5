use battlefx_core::effects::palette_cycle::PaletteCycle;
use battlefx_core::effects::surf::{SurfWave, SURF_BLEND_HIDDEN};
use battlefx_core::scanline::blend_alpha;
use battlefx_core::{
    BlendTarget, Config, Direction, Engine, ResourceTag, StaticEnv, TaskBehavior, TaskId,
};

fn engine(env: StaticEnv) -> Engine {
    Engine::new(Config::default(), Box::new(env)).unwrap()
}

fn scanline_task(e: &Engine, wave: TaskId) -> TaskId {
    match e.task(wave).and_then(|t| t.behavior()) {
        Some(TaskBehavior::SurfWave(w)) => w.scanline_task(),
        other => panic!("expected surf controller, got {other:?}"),
    }
}

fn ticks(e: &mut Engine, n: usize) {
    for _ in 0..n {
        e.tick();
    }
}

#[test]
fn surf_runs_its_whole_timeline() {
    let mut e = engine(StaticEnv::singles());
    let bank = 2;
    let water: Vec<u16> = (1..=7).collect();
    e.palette.load(bank * 16 + 1, &water).unwrap();

    let wave = SurfWave::spawn(&mut e, bank as u8, 2).unwrap().unwrap();
    let scan = scanline_task(&e, wave);
    assert_eq!(e.open_visuals(), 1, "only the controller counts as a visual");

    // setup: both buffers hold the band at the first fade step
    e.tick();
    assert!(e.blend.is_armed());
    assert_eq!(e.blend.target, BlendTarget::Alpha);
    let first = blend_alpha(1, 15);
    assert_eq!(e.scanline.front()[47], SURF_BLEND_HIDDEN);
    assert_eq!(e.scanline.front()[48], first);
    assert_eq!(e.scanline.front()[111], first);
    assert_eq!(e.scanline.front()[112], SURF_BLEND_HIDDEN);
    assert_eq!(e.scanline.back(), e.scanline.front());

    // the band opens one line per tick
    e.tick();
    assert_eq!(e.scanline.front()[47], first);
    assert_eq!(e.scanline.front()[46], SURF_BLEND_HIDDEN);

    // water colors rotate backward every fourth tick
    ticks(&mut e, 2);
    let window = e.palette.window(bank * 16 + 1, 7).unwrap();
    assert_eq!(e.palette.colors(window), &[7, 1, 2, 3, 4, 5, 6]);

    // fully open and at full strength
    ticks(&mut e, 56);
    assert_eq!(e.frame(), 60);
    let full = blend_alpha(13, 3);
    assert!(e.scanline.front()[..112].iter().all(|v| *v == full));
    assert!(e.scanline.front()[112..].iter().all(|v| *v == SURF_BLEND_HIDDEN));
    assert_eq!(e.bg_scroll.x, -2 * 60);
    assert_eq!(e.bg_scroll.y, -48 + 60);

    // strength hits zero on tick 133, the layer clears, then everything unwinds
    ticks(&mut e, 74);
    assert_eq!(e.frame(), 134);
    assert!(e.task(wave).is_some());
    assert!(e.task(scan).is_some());
    assert!(e.blend.is_armed());

    e.tick();
    assert!(e.task(wave).is_none());
    assert!(e.task(scan).is_none(), "scanline task ends in the same tick");
    assert!(!e.blend.is_armed());
    assert_eq!(e.blend.control, 0);
    assert_eq!((e.bg_scroll.x, e.bg_scroll.y), (0, 0));
    assert_eq!(e.task_count(), 0);
    assert!(e.is_idle());
}

#[test]
fn surf_from_the_opponent_opens_downward() {
    let mut e = engine(StaticEnv::singles_from_opponent());
    let wave = SurfWave::spawn(&mut e, 0, 2).unwrap().unwrap();
    let scan = scanline_task(&e, wave);
    ticks(&mut e, 120);
    match e.task(scan).and_then(|t| t.behavior()) {
        Some(TaskBehavior::SurfScanline(s)) => assert_eq!(s.band(), (0, 112)),
        other => panic!("expected scanline task, got {other:?}"),
    }
    ticks(&mut e, 15);
    assert!(e.is_idle());
    assert_eq!(e.task_count(), 0);
}

#[test]
fn surf_without_room_leaves_nothing_behind() {
    let cfg = Config {
        task_capacity: 1,
        ..Config::default()
    };
    let mut e = Engine::new(cfg, Box::new(StaticEnv::singles())).unwrap();
    assert_eq!(SurfWave::spawn(&mut e, 0, 2), Ok(None));
    assert_eq!(e.task_count(), 0);
    assert!(e.is_idle());
    assert!(!e.blend.is_armed());
}

#[test]
fn ring_cycle_is_a_cyclic_permutation_at_every_step() {
    let env = StaticEnv::singles().with_palette(ResourceTag::RAINBOW_RINGS, 5);
    let mut e = engine(env);
    let cycle = PaletteCycle::ring_colors(&e, 8).unwrap();
    let window = cycle.window();
    let rings: Vec<u16> = (0..8).map(|i| 0x100 + i).collect();
    e.palette.load(window.start(), &rings).unwrap();
    // neighbours outside the window never move
    e.palette.load(window.start() - 1, &[0x7FFF]).unwrap();
    e.palette.load(window.end(), &[0x7C00]).unwrap();

    let id = cycle.spawn(&mut e, 2).unwrap();
    for step in 1..=8usize {
        ticks(&mut e, 3);
        let mut expected = rings.clone();
        expected.rotate_left(step % 8);
        assert_eq!(e.palette.colors(window), expected.as_slice(), "after {step} rotations");
        assert_eq!(e.palette.as_slice()[window.start() - 1], 0x7FFF);
        assert_eq!(e.palette.as_slice()[window.end()], 0x7C00);
    }
    assert!(e.task(id).is_none());
    assert!(e.is_idle());
}

#[test]
fn backward_cycle_undoes_forward_cycle() {
    let mut e = engine(StaticEnv::singles());
    let window = e.palette.window(64, 5).unwrap();
    e.palette.load(64, &[1, 2, 3, 4, 5]).unwrap();
    PaletteCycle::new(window, Direction::Forward, 1, 3)
        .spawn(&mut e, 0)
        .unwrap();
    PaletteCycle::new(window, Direction::Backward, 1, 3)
        .spawn(&mut e, 1)
        .unwrap();
    ticks(&mut e, 3);
    assert_eq!(e.palette.colors(window), &[1, 2, 3, 4, 5]);
    assert!(e.is_idle());
}
