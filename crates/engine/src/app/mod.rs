mod action;
mod game;
mod level;
mod loop_runner;
mod pixel_grid;
mod rendering;
mod sprite;

pub use action::{GameAction, GameState};
pub use game::{Game, GameContext};
pub use level::Level;
pub use loop_runner::{ActionOutcome, GameRunner, LoopConfig, MAX_STEPS_ENV_VAR};
pub use pixel_grid::{is_opaque, PixelGrid, TRANSPARENT};
pub use rendering::{
    Camera, Frame, LetterboxGeometry, RenderableUserDisplay, ToggleableUserDisplay,
    DEFAULT_BACKGROUND, DEFAULT_LETTERBOX, FRAME_SIZE, MAX_VIEWPORT_DIMENSION,
};
pub use sprite::{BlockingMode, InteractionMode, Sprite};
