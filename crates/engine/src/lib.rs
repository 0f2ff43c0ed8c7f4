use thiserror::Error;

pub mod app;

pub use app::{
    is_opaque, ActionOutcome, BlockingMode, Camera, Frame, Game, GameAction, GameContext,
    GameRunner, GameState, InteractionMode, LetterboxGeometry, Level, LoopConfig, PixelGrid,
    RenderableUserDisplay, Sprite, ToggleableUserDisplay, DEFAULT_BACKGROUND, DEFAULT_LETTERBOX,
    FRAME_SIZE, MAX_STEPS_ENV_VAR, MAX_VIEWPORT_DIMENSION, TRANSPARENT,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid pixel buffer: {reason}")]
    InvalidBuffer { reason: String },
    #[error("rotation {rotation} is not a multiple of 90 degrees")]
    InvalidRotation { rotation: i32 },
    #[error("scale {scale} is invalid for a {width}x{height} buffer")]
    InvalidScale {
        scale: i32,
        width: usize,
        height: usize,
    },
    #[error("{what} index {index} out of range [0, {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: i64,
        len: usize,
    },
    #[error("no sprite found with name: {name}")]
    EntityNotFound { name: String },
    #[error("game must have at least one level")]
    EmptySceneList,
    #[error("viewport {width}x{height} must be between 1x1 and 64x64")]
    InvalidViewport { width: u32, height: u32 },
    #[error("level not found: {name}")]
    LevelNotFound { name: String },
    #[error("action not completed after {steps} steps")]
    ActionIncomplete { steps: u32 },
}
