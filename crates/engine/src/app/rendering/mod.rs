mod camera;
mod frame;
mod interface;

pub use camera::{
    Camera, LetterboxGeometry, DEFAULT_BACKGROUND, DEFAULT_LETTERBOX, MAX_VIEWPORT_DIMENSION,
};
pub use frame::{Frame, FRAME_SIZE};
pub use interface::{RenderableUserDisplay, ToggleableUserDisplay};
