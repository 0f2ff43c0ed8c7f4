use crate::app::pixel_grid::PixelGrid;
use crate::app::sprite::Sprite;
use crate::EngineError;

use super::frame::{Frame, FRAME_SIZE};

pub const MAX_VIEWPORT_DIMENSION: u32 = FRAME_SIZE as u32;
pub const DEFAULT_BACKGROUND: i8 = 5;
pub const DEFAULT_LETTERBOX: i8 = 5;

/// Integer scale and centering offsets of the viewport inside the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterboxGeometry {
    pub scale: usize,
    pub x_offset: usize,
    pub y_offset: usize,
}

/// Rectangular window into the world, composited into a 64x64 frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Camera {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    background: i8,
    letterbox: i8,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: MAX_VIEWPORT_DIMENSION,
            height: MAX_VIEWPORT_DIMENSION,
            background: DEFAULT_BACKGROUND,
            letterbox: DEFAULT_LETTERBOX,
        }
    }
}

impl Camera {
    pub fn new(
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        background: i8,
        letterbox: i8,
    ) -> Result<Self, EngineError> {
        validate_viewport(width, height)?;
        Ok(Self {
            x,
            y,
            width,
            height,
            background,
            letterbox,
        })
    }

    pub fn with_viewport(width: u32, height: u32) -> Result<Self, EngineError> {
        let mut camera = Self::default();
        camera.resize(width, height)?;
        Ok(camera)
    }

    pub fn with_background(mut self, background: i8) -> Self {
        self.background = background;
        self
    }

    pub fn with_letterbox(mut self, letterbox: i8) -> Self {
        self.letterbox = letterbox;
        self
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> i8 {
        self.background
    }

    pub fn letterbox(&self) -> i8 {
        self.letterbox
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
    }

    /// On failure the viewport keeps its previous size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        validate_viewport(width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn letterbox_geometry(&self) -> LetterboxGeometry {
        let width = self.width as usize;
        let height = self.height as usize;
        let scale = (FRAME_SIZE / width).min(FRAME_SIZE / height);
        LetterboxGeometry {
            scale,
            x_offset: (FRAME_SIZE - width * scale) / 2,
            y_offset: (FRAME_SIZE - height * scale) / 2,
        }
    }

    /// Draws visible sprites, lowest layer first, into a `width x height` view.
    pub fn raw_render<'a>(&self, sprites: impl IntoIterator<Item = &'a Sprite>) -> PixelGrid {
        let mut view = PixelGrid::canvas(self.width as usize, self.height as usize, self.background);
        let mut visible: Vec<&Sprite> = sprites
            .into_iter()
            .filter(|sprite| sprite.is_visible())
            .collect();
        // Stable: equal layers keep insertion order.
        visible.sort_by_key(|sprite| sprite.layer());
        for sprite in visible {
            view.blit(
                &sprite.render(),
                sprite.x().saturating_sub(self.x),
                sprite.y().saturating_sub(self.y),
            );
        }
        view
    }

    pub fn render<'a>(&self, sprites: impl IntoIterator<Item = &'a Sprite>) -> Frame {
        let view = self.raw_render(sprites);
        let geometry = self.letterbox_geometry();
        let mut frame = Frame::filled(self.letterbox);
        frame.paste(
            &view.upscaled(geometry.scale),
            geometry.x_offset as i32,
            geometry.y_offset as i32,
        );
        frame
    }

    /// Maps a frame coordinate back to world space; `None` on the letterbox.
    pub fn display_to_grid(&self, display_x: i32, display_y: i32) -> Option<(i32, i32)> {
        let geometry = self.letterbox_geometry();
        let local_x = display_x - geometry.x_offset as i32;
        let local_y = display_y - geometry.y_offset as i32;
        let span_x = (self.width as usize * geometry.scale) as i32;
        let span_y = (self.height as usize * geometry.scale) as i32;
        if local_x < 0 || local_y < 0 || local_x >= span_x || local_y >= span_y {
            return None;
        }
        let scale = geometry.scale as i32;
        Some((
            self.x.saturating_add(local_x / scale),
            self.y.saturating_add(local_y / scale),
        ))
    }
}

fn validate_viewport(width: u32, height: u32) -> Result<(), EngineError> {
    if width == 0 || height == 0 || width > MAX_VIEWPORT_DIMENSION || height > MAX_VIEWPORT_DIMENSION
    {
        return Err(EngineError::InvalidViewport { width, height });
    }
    Ok(())
}
