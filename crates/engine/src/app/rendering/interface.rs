use crate::app::sprite::Sprite;
use crate::EngineError;

use super::frame::Frame;

/// Overlay drawn directly on the final 64x64 frame, after letterboxing.
pub trait RenderableUserDisplay {
    fn render_interface(&self, frame: &mut Frame);
}

#[derive(Debug, Clone, PartialEq)]
struct ToggleEntry {
    enabled_sprite: Sprite,
    disabled_sprite: Sprite,
    enabled: bool,
}

/// Pairs of sprites where each pair shows one of two looks, such as a
/// lives counter or a key inventory. Every pair starts enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleableUserDisplay {
    entries: Vec<ToggleEntry>,
}

impl ToggleableUserDisplay {
    pub fn new(pairs: &[(Sprite, Sprite)]) -> Self {
        let entries = pairs
            .iter()
            .map(|(enabled_sprite, disabled_sprite)| ToggleEntry {
                enabled_sprite: enabled_sprite.clone(),
                disabled_sprite: disabled_sprite.clone(),
                enabled: true,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn enable(&mut self, index: usize) -> Result<(), EngineError> {
        self.entry_mut(index)?.enabled = true;
        Ok(())
    }

    pub fn disable(&mut self, index: usize) -> Result<(), EngineError> {
        self.entry_mut(index)?.enabled = false;
        Ok(())
    }

    pub fn is_enabled(&self, index: usize) -> Result<bool, EngineError> {
        self.entries
            .get(index)
            .map(|entry| entry.enabled)
            .ok_or_else(|| self.out_of_range(index))
    }

    pub fn enabled_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.enabled).count()
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut ToggleEntry, EngineError> {
        let err = self.out_of_range(index);
        self.entries.get_mut(index).ok_or(err)
    }

    fn out_of_range(&self, index: usize) -> EngineError {
        EngineError::IndexOutOfRange {
            what: "interface entry",
            index: index as i64,
            len: self.entries.len(),
        }
    }
}

impl RenderableUserDisplay for ToggleableUserDisplay {
    fn render_interface(&self, frame: &mut Frame) {
        let mut shown: Vec<&Sprite> = self
            .entries
            .iter()
            .map(|entry| {
                if entry.enabled {
                    &entry.enabled_sprite
                } else {
                    &entry.disabled_sprite
                }
            })
            .filter(|sprite| sprite.is_visible())
            .collect();
        shown.sort_by_key(|sprite| sprite.layer());
        for sprite in shown {
            frame.blit(&sprite.render(), sprite.x(), sprite.y());
        }
    }
}
