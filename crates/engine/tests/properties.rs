use grid_engine::{BlockingMode, Camera, InteractionMode, PixelGrid, Sprite, FRAME_SIZE};
use proptest::prelude::*;

fn grid_strategy() -> impl Strategy<Value = PixelGrid> {
    (1usize..7, 1usize..7).prop_flat_map(|(width, height)| {
        prop::collection::vec(-1i8..16, width * height).prop_map(move |cells| {
            PixelGrid::new(width, height, cells).expect("strategy builds valid grids")
        })
    })
}

/// Pairs a grid with a scale it accepts, downscales included.
fn scaled_grid_strategy() -> impl Strategy<Value = (PixelGrid, i32)> {
    prop_oneof![
        (grid_strategy(), 1i32..4),
        (1usize..4, 1usize..4, 2usize..5).prop_flat_map(|(cols, rows, divisor)| {
            let (width, height) = (cols * divisor, rows * divisor);
            prop::collection::vec(-1i8..16, width * height).prop_map(move |cells| {
                let grid = PixelGrid::new(width, height, cells)
                    .expect("strategy builds valid grids");
                (grid, 1 - divisor as i32)
            })
        }),
    ]
}

fn blocking_strategy() -> impl Strategy<Value = BlockingMode> {
    prop_oneof![
        Just(BlockingMode::NotBlocked),
        Just(BlockingMode::BoundingBox),
        Just(BlockingMode::PixelPerfect),
    ]
}

fn interaction_strategy() -> impl Strategy<Value = InteractionMode> {
    prop_oneof![
        Just(InteractionMode::Tangible),
        Just(InteractionMode::Intangible),
        Just(InteractionMode::Invisible),
        Just(InteractionMode::Removed),
    ]
}

fn sprite_strategy() -> impl Strategy<Value = Sprite> {
    (
        scaled_grid_strategy(),
        -8i32..8,
        -8i32..8,
        0i32..4,
        blocking_strategy(),
        interaction_strategy(),
    )
        .prop_map(|((grid, scale), x, y, quarter_turns, blocking, interaction)| {
            Sprite::new(grid)
                .with_position(x, y)
                .with_rotation(quarter_turns * 90)
                .and_then(|sprite| sprite.with_scale(scale))
                .expect("strategy only pairs grids with scales they accept")
                .with_blocking(blocking)
                .with_interaction(interaction)
        })
}

proptest! {
    #[test]
    fn four_quarter_turns_are_identity(grid in grid_strategy()) {
        let turned = grid
            .rotated_cw(1)
            .rotated_cw(1)
            .rotated_cw(1)
            .rotated_cw(1);
        prop_assert_eq!(turned, grid);
    }

    #[test]
    fn rotating_a_sprite_four_times_renders_the_same(sprite in sprite_strategy()) {
        let mut turned = sprite.clone();
        for _ in 0..4 {
            turned.rotate(90).expect("quarter turn");
        }
        prop_assert_eq!(turned.rotation(), sprite.rotation());
        prop_assert_eq!(turned.render(), sprite.render());
    }

    #[test]
    fn double_mirror_is_identity(grid in grid_strategy()) {
        prop_assert_eq!(grid.flipped_vertical().flipped_vertical(), grid.clone());
        prop_assert_eq!(grid.flipped_horizontal().flipped_horizontal(), grid);
    }

    #[test]
    fn collision_is_symmetric(a in sprite_strategy(), b in sprite_strategy()) {
        prop_assert_eq!(a.collides_with(&b), b.collides_with(&a));
    }

    #[test]
    fn sprite_never_collides_with_itself(sprite in sprite_strategy()) {
        prop_assert!(!sprite.collides_with(&sprite));
    }

    #[test]
    fn rendered_size_matches_render(sprite in sprite_strategy()) {
        prop_assert_eq!(sprite.rendered_size(), sprite.render().size());
    }

    #[test]
    fn camera_output_is_always_full_frame(
        width in 1u32..=64,
        height in 1u32..=64,
        cam_x in -10i32..10,
        cam_y in -10i32..10,
        sprites in prop::collection::vec(sprite_strategy(), 0..6),
    ) {
        let mut camera = Camera::with_viewport(width, height).expect("valid viewport");
        camera.set_position(cam_x, cam_y);
        let frame = camera.render(&sprites);
        prop_assert_eq!(frame.grid().size(), (FRAME_SIZE, FRAME_SIZE));
    }

    #[test]
    fn rendering_is_deterministic(sprites in prop::collection::vec(sprite_strategy(), 0..6)) {
        let camera = Camera::with_viewport(16, 12).expect("valid viewport");
        prop_assert_eq!(camera.render(&sprites).digest(), camera.render(&sprites).digest());
    }
}
