use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::EngineError;

use super::pixel_grid::{intersect_spans, span_end, PixelGrid, TRANSPARENT};

/// How a sprite participates in collision tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockingMode {
    #[default]
    NotBlocked,
    BoundingBox,
    PixelPerfect,
}

/// Visibility and collidability as one closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    #[default]
    Tangible,
    Intangible,
    Invisible,
    Removed,
}

impl InteractionMode {
    pub fn from_flags(visible: bool, collidable: bool) -> Self {
        match (visible, collidable) {
            (true, true) => Self::Tangible,
            (true, false) => Self::Intangible,
            (false, true) => Self::Invisible,
            (false, false) => Self::Removed,
        }
    }

    pub fn is_visible(self) -> bool {
        matches!(self, Self::Tangible | Self::Intangible)
    }

    pub fn is_collidable(self) -> bool {
        matches!(self, Self::Tangible | Self::Invisible)
    }
}

/// Positioned, transformable pixel entity.
///
/// Rotation is always stored normalized to 0, 90, 180 or 270 and the scale is
/// never 0; a negative scale is only ever stored when its divisor evenly
/// divides both buffer dimensions, so [`Sprite::render`] cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pixels: PixelGrid,
    name: String,
    x: i32,
    y: i32,
    layer: i32,
    rotation: i32,
    scale: i32,
    mirror_ud: bool,
    mirror_lr: bool,
    blocking: BlockingMode,
    interaction: InteractionMode,
    tags: BTreeSet<String>,
}

impl Sprite {
    pub fn new(pixels: PixelGrid) -> Self {
        Self {
            pixels,
            name: String::new(),
            x: 0,
            y: 0,
            layer: 0,
            rotation: 0,
            scale: 1,
            mirror_ud: false,
            mirror_lr: false,
            blocking: BlockingMode::default(),
            interaction: InteractionMode::default(),
            tags: BTreeSet::new(),
        }
    }

    pub fn from_rows(rows: Vec<Vec<i8>>) -> Result<Self, EngineError> {
        PixelGrid::from_rows(rows).map(Self::new)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_rotation(mut self, rotation: i32) -> Result<Self, EngineError> {
        self.set_rotation(rotation)?;
        Ok(self)
    }

    pub fn with_scale(mut self, scale: i32) -> Result<Self, EngineError> {
        self.set_scale(scale)?;
        Ok(self)
    }

    pub fn with_mirror_ud(mut self, mirror_ud: bool) -> Self {
        self.mirror_ud = mirror_ud;
        self
    }

    pub fn with_mirror_lr(mut self, mirror_lr: bool) -> Self {
        self.mirror_lr = mirror_lr;
        self
    }

    pub fn with_blocking(mut self, blocking: BlockingMode) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn with_interaction(mut self, interaction: InteractionMode) -> Self {
        self.interaction = interaction;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn pixels(&self) -> &PixelGrid {
        &self.pixels
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn layer(&self) -> i32 {
        self.layer
    }

    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn mirror_ud(&self) -> bool {
        self.mirror_ud
    }

    pub fn mirror_lr(&self) -> bool {
        self.mirror_lr
    }

    pub fn blocking(&self) -> BlockingMode {
        self.blocking
    }

    pub fn interaction(&self) -> InteractionMode {
        self.interaction
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_visible(&self) -> bool {
        self.interaction.is_visible()
    }

    pub fn is_collidable(&self) -> bool {
        self.interaction.is_collidable()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Positions saturate at the `i32` bounds.
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
    }

    pub fn set_layer(&mut self, layer: i32) {
        self.layer = layer;
    }

    pub fn set_rotation(&mut self, rotation: i32) -> Result<(), EngineError> {
        self.rotation = normalize_rotation(rotation)?;
        Ok(())
    }

    pub fn rotate(&mut self, delta: i32) -> Result<(), EngineError> {
        let delta = normalize_rotation(delta)?;
        self.rotation = (self.rotation + delta) % 360;
        Ok(())
    }

    /// On failure the previous scale is kept.
    pub fn set_scale(&mut self, scale: i32) -> Result<(), EngineError> {
        validate_scale(&self.pixels, scale)?;
        self.scale = scale;
        Ok(())
    }

    /// Walks toward `scale + delta` one step at a time, hopping over 0.
    ///
    /// Every intermediate scale is validated; on failure the sprite keeps the
    /// last scale that was accepted.
    pub fn adjust_scale(&mut self, delta: i32) -> Result<(), EngineError> {
        if delta == 0 {
            return Ok(());
        }
        let step = delta.signum();
        let target = self.scale.saturating_add(delta);
        while self.scale != target {
            let mut next = self.scale + step;
            if next == 0 {
                next = step;
            }
            self.set_scale(next)?;
            // 0 can never be stored, so a target of 0 ends one hop past it.
            if target == 0 && next == step {
                break;
            }
        }
        Ok(())
    }

    pub fn set_mirror_ud(&mut self, mirror_ud: bool) {
        self.mirror_ud = mirror_ud;
    }

    pub fn set_mirror_lr(&mut self, mirror_lr: bool) {
        self.mirror_lr = mirror_lr;
    }

    pub fn set_blocking(&mut self, blocking: BlockingMode) {
        self.blocking = blocking;
    }

    pub fn set_interaction(&mut self, interaction: InteractionMode) {
        self.interaction = interaction;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.interaction = InteractionMode::from_flags(visible, self.is_collidable());
    }

    pub fn set_collidable(&mut self, collidable: bool) {
        self.interaction = InteractionMode::from_flags(self.is_visible(), collidable);
    }

    /// Returns `true` when the tag was not already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Swaps the buffer, rejecting grids the current scale cannot divide.
    pub fn set_pixels(&mut self, pixels: PixelGrid) -> Result<(), EngineError> {
        validate_scale(&pixels, self.scale)?;
        self.pixels = pixels;
        Ok(())
    }

    pub fn clone_named(&self, name: impl Into<String>) -> Self {
        let mut sprite = self.clone();
        sprite.name = name.into();
        sprite
    }

    /// Rotate, mirror vertically, mirror horizontally, then scale.
    pub fn render(&self) -> PixelGrid {
        let quarter_turns = (self.rotation / 90) as u32;
        let mut result = self.pixels.rotated_cw(quarter_turns);
        if self.mirror_ud {
            result = result.flipped_vertical();
        }
        if self.mirror_lr {
            result = result.flipped_horizontal();
        }
        match self.scale {
            scale if scale > 1 => result.upscaled(scale as usize),
            scale if scale < 0 => result.block_mode(downscale_divisor(scale)),
            _ => result,
        }
    }

    /// Size of [`Sprite::render`] without producing the buffer.
    pub fn rendered_size(&self) -> (usize, usize) {
        let (width, height) = if self.rotation % 180 == 0 {
            self.pixels.size()
        } else {
            (self.pixels.height(), self.pixels.width())
        };
        match self.scale {
            scale if scale > 1 => (width * scale as usize, height * scale as usize),
            scale if scale < 0 => {
                let divisor = downscale_divisor(scale);
                (width / divisor, height / divisor)
            }
            _ => (width, height),
        }
    }

    /// World-space point test against the rendered bounding box.
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        let (width, height) = self.rendered_size();
        x >= self.x && y >= self.y && x < span_end(self.x, width) && y < span_end(self.y, height)
    }

    /// Symmetric; a sprite never collides with itself.
    ///
    /// Pixel-perfect tests treat every value except [`TRANSPARENT`] as solid.
    pub fn collides_with(&self, other: &Sprite) -> bool {
        if std::ptr::eq(self, other) {
            return false;
        }
        if !(self.is_collidable() && other.is_collidable()) {
            return false;
        }
        if self.blocking == BlockingMode::NotBlocked || other.blocking == BlockingMode::NotBlocked
        {
            return false;
        }

        let own = self.render();
        let theirs = other.render();
        let Some(overlap) = intersect_spans(
            (self.x, self.y, own.width(), own.height()),
            (other.x, other.y, theirs.width(), theirs.height()),
        ) else {
            return false;
        };

        if self.blocking != BlockingMode::PixelPerfect
            && other.blocking != BlockingMode::PixelPerfect
        {
            return true;
        }

        for world_y in overlap.y_start..overlap.y_end {
            for world_x in overlap.x_start..overlap.x_end {
                let mine = own.get((world_x - self.x) as usize, (world_y - self.y) as usize);
                let other_px =
                    theirs.get((world_x - other.x) as usize, (world_y - other.y) as usize);
                if let (Some(a), Some(b)) = (mine, other_px) {
                    if a != TRANSPARENT && b != TRANSPARENT {
                        return true;
                    }
                }
            }
        }
        false
    }
}

pub(crate) fn normalize_rotation(rotation: i32) -> Result<i32, EngineError> {
    let normalized = rotation.rem_euclid(360);
    if normalized % 90 != 0 {
        return Err(EngineError::InvalidRotation { rotation });
    }
    Ok(normalized)
}

fn validate_scale(pixels: &PixelGrid, scale: i32) -> Result<(), EngineError> {
    let invalid = || EngineError::InvalidScale {
        scale,
        width: pixels.width(),
        height: pixels.height(),
    };
    if scale == 0 {
        return Err(invalid());
    }
    if scale < 0 {
        let divisor = downscale_divisor(scale);
        if pixels.width() % divisor != 0 || pixels.height() % divisor != 0 {
            return Err(invalid());
        }
    }
    Ok(())
}

fn downscale_divisor(scale: i32) -> usize {
    (1 - scale) as usize
}
