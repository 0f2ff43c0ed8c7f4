use grid_engine::{
    BlockingMode, Camera, EngineError, Game, GameAction, GameContext, GameRunner, GameState,
    Level, PixelGrid, Sprite,
};

fn solid(name: &str, value: i8, x: i32, y: i32) -> Sprite {
    Sprite::new(PixelGrid::filled(1, 1, value).expect("grid"))
        .with_name(name)
        .with_position(x, y)
        .with_blocking(BlockingMode::BoundingBox)
}

struct ThreeStepGame {
    steps: u32,
}

impl Game for ThreeStepGame {
    fn step(&mut self, ctx: &mut GameContext) -> Result<(), EngineError> {
        self.steps += 1;
        if self.steps % 3 == 0 {
            ctx.complete_action();
        }
        Ok(())
    }
}

#[test]
fn small_viewport_is_letterboxed_and_scaled() {
    let sprite = Sprite::new(PixelGrid::filled(2, 2, 7).expect("grid"));
    let camera = Camera::with_viewport(8, 8)
        .expect("camera")
        .with_background(5);
    let frame = camera.render([&sprite]);

    for y in 0..64 {
        for x in 0..64 {
            let expected = if x < 16 && y < 16 { 7 } else { 5 };
            assert_eq!(frame.get(x, y), Some(expected), "pixel ({x}, {y})");
        }
    }
}

#[test]
fn try_move_reverts_when_upscaled_sprites_overlap() {
    let mover = solid("mover", 1, 0, 0).with_scale(2).expect("scale");
    let target = solid("target", 2, 2, 2).with_scale(2).expect("scale");
    let level = Level::new(vec![mover, target]).with_grid_size(8, 8);
    let mut runner =
        GameRunner::new("scenario", &[level], None, ThreeStepGame { steps: 0 }).expect("runner");

    let hits = runner
        .context_mut()
        .try_move("mover", 1, 1)
        .expect("mover exists");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name(), "target");
    assert_eq!(
        runner
            .context()
            .current_level()
            .sprite_by_name("mover")
            .map(Sprite::position),
        Some((0, 0))
    );
}

#[test]
fn completing_on_third_step_yields_three_frames() {
    let level = Level::new(vec![solid("dot", 3, 1, 1)]);
    let mut runner =
        GameRunner::new("three", &[level], None, ThreeStepGame { steps: 0 }).expect("runner");
    let outcome = runner.perform_action(GameAction::Action1).expect("action");
    assert_eq!(outcome.frames.len(), 3);
    assert_eq!(outcome.state, GameState::NotFinished);
    assert_eq!(outcome.score, 0);
    for frame in &outcome.frames {
        assert_eq!(frame.to_rows().len(), 64);
        assert!(frame.to_rows().iter().all(|row| row.len() == 64));
    }
}

#[test]
fn runner_levels_are_independent_of_caller_levels() {
    let mut caller_level = Level::new(vec![solid("dot", 3, 1, 1)]);
    let mut runner = GameRunner::new(
        "clone",
        std::slice::from_ref(&caller_level),
        None,
        ThreeStepGame { steps: 0 },
    )
    .expect("runner");

    caller_level
        .sprite_by_name_mut("dot")
        .expect("dot")
        .move_by(10, 10);
    runner
        .context_mut()
        .try_move("dot", 1, 0)
        .expect("dot exists");

    assert_eq!(
        runner
            .context()
            .current_level()
            .sprite_by_name("dot")
            .map(Sprite::position),
        Some((2, 1))
    );
    assert_eq!(
        caller_level.sprite_by_name("dot").map(Sprite::position),
        Some((11, 11))
    );
}

#[test]
fn identical_runs_produce_identical_frames() {
    let run = || {
        let level = Level::new(vec![solid("dot", 3, 1, 1)]).with_grid_size(10, 6);
        let mut runner =
            GameRunner::new("det", &[level], None, ThreeStepGame { steps: 0 }).expect("runner");
        runner
            .perform_action(GameAction::Action2)
            .expect("action")
            .frames
            .iter()
            .map(|frame| frame.digest())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
