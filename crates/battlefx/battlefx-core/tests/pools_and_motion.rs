use battlefx_core::{
    defer_until, Config, Engine, FxError, Point, SpriteBehavior, SpriteTemplate, StaticEnv,
    TaskBehavior, WaitCondition,
};

fn engine(cfg: Config) -> Engine {
    Engine::new(cfg, Box::new(StaticEnv::singles())).unwrap()
}

#[test]
fn full_task_pool_returns_none_and_leaves_others_alone() {
    let mut e = engine(Config {
        task_capacity: 4,
        ..Config::default()
    });
    let ids: Vec<_> = (0..4)
        .map(|i| e.create_task(TaskBehavior::Idle, i).unwrap())
        .collect();
    for (i, id) in ids.iter().enumerate() {
        e.set_task_scratch(*id, 0, i as i16).unwrap();
    }

    assert!(e.create_task(TaskBehavior::Idle, 0).is_none());
    assert!(e.create_visual_task(TaskBehavior::Idle, 0).is_none());
    assert_eq!(e.open_visuals(), 0);
    assert_eq!(e.task_count(), 4);
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(e.task_scratch(*id, 0), Ok(i as i16));
    }

    assert!(e.destroy_task(ids[2]));
    let reused = e.create_task(TaskBehavior::Idle, 9).unwrap();
    assert_eq!(reused.index(), ids[2].index());
    assert_eq!(e.task_scratch(reused, 0), Ok(0), "reused slot starts zeroed");
    assert_eq!(
        e.task_scratch(ids[2], 0),
        Err(FxError::StaleTask {
            index: ids[2].index()
        })
    );
}

#[test]
fn full_sprite_pool_returns_none() {
    let mut e = engine(Config {
        sprite_capacity: 3,
        ..Config::default()
    });
    let template = SpriteTemplate::invisible();
    let ids: Vec<_> = (0..3)
        .map(|i| e.create_sprite(template, i * 10, 0, 0).unwrap())
        .collect();
    assert!(e.create_sprite(template, 0, 0, 0).is_none());
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(e.sprite(*id).unwrap().base, Point::new(i as i32 * 10, 0));
    }

    e.destroy_sprite(ids[0]);
    let reused = e.create_sprite(template, 5, 5, 0).unwrap();
    assert_eq!(reused.index(), ids[0].index());
    assert!(e.sprite(ids[0]).is_none());
}

#[test]
fn sprite_without_matrix_when_matrices_run_out() {
    let mut e = engine(Config {
        matrix_capacity: 1,
        ..Config::default()
    });
    let affine = SpriteTemplate::new(battlefx_core::ResourceTag::BUBBLE, true);
    let first = e.create_sprite(affine, 0, 0, 0).unwrap();
    let second = e.create_sprite(affine, 0, 0, 0).unwrap();
    assert!(e.sprite(first).unwrap().affine.matrix.is_some());
    assert!(e.sprite(second).unwrap().affine.matrix.is_none());
}

#[test]
fn linear_translation_lands_exactly_on_the_last_tick() {
    let mut e = engine(Config::default());
    let s = e
        .create_sprite_with(
            SpriteTemplate::invisible(),
            Point::ZERO,
            0,
            SpriteBehavior::translate(Point::ZERO, Point::new(64, 0), 30, SpriteBehavior::Idle),
        )
        .unwrap();

    let mut last_x = 0;
    for _ in 0..29 {
        e.tick();
        let sprite = e.sprite(s).unwrap();
        assert!(!sprite.motion_complete);
        assert!(sprite.position().x >= last_x, "x never moves backward");
        assert!(sprite.position().x < 64);
        last_x = sprite.position().x;
    }
    e.tick();
    let sprite = e.sprite(s).unwrap();
    assert!(sprite.motion_complete);
    assert_eq!(sprite.position(), Point::new(64, 0));
}

#[test]
fn translation_then_wait_then_destroy() {
    let mut e = engine(Config::default());
    let then = SpriteBehavior::wait(WaitCondition::Ticks(2), SpriteBehavior::Destroy);
    let s = e
        .create_visual_sprite(
            SpriteTemplate::invisible(),
            Point::new(8, 8),
            0,
            SpriteBehavior::translate(Point::new(8, 8), Point::new(16, 8), 4, then),
        )
        .unwrap();

    for _ in 0..4 {
        e.tick();
    }
    assert_eq!(e.sprite(s).unwrap().position(), Point::new(16, 8));
    // waits count down on the next two ticks and fire on the third
    e.tick();
    e.tick();
    assert!(e.sprite(s).is_some());
    e.tick();
    assert!(e.sprite(s).is_none());
    assert!(e.is_idle());
}

#[test]
fn defer_until_anim_end_from_the_host() {
    let mut e = engine(Config::default());
    let s = e.create_sprite(SpriteTemplate::invisible(), 0, 0, 0).unwrap();
    defer_until(&mut e, s, WaitCondition::AnimEnded, SpriteBehavior::Destroy).unwrap();
    for _ in 0..10 {
        e.tick();
    }
    assert!(e.sprite(s).is_some());
    e.mark_anim_ended(s);
    e.tick();
    assert!(e.sprite(s).is_none());
    assert!(matches!(
        defer_until(&mut e, s, WaitCondition::AnimEnded, SpriteBehavior::Destroy),
        Err(FxError::StaleSprite { .. })
    ));
}
