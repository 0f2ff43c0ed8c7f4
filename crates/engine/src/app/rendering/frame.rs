use std::fmt::Write as _;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::app::pixel_grid::PixelGrid;
use crate::EngineError;

/// Edge length of every output frame.
pub const FRAME_SIZE: usize = 64;

/// A 64x64 palette buffer, the only shape the compositor ever emits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    grid: PixelGrid,
}

impl Frame {
    pub fn filled(value: i8) -> Self {
        Self {
            grid: PixelGrid::canvas(FRAME_SIZE, FRAME_SIZE, value),
        }
    }

    pub fn from_grid(grid: PixelGrid) -> Result<Self, EngineError> {
        if grid.size() != (FRAME_SIZE, FRAME_SIZE) {
            return Err(EngineError::InvalidBuffer {
                reason: format!(
                    "frame must be {FRAME_SIZE}x{FRAME_SIZE}, got {}x{}",
                    grid.width(),
                    grid.height()
                ),
            });
        }
        Ok(Self { grid })
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    pub fn get(&self, x: usize, y: usize) -> Option<i8> {
        self.grid.get(x, y)
    }

    pub fn set(&mut self, x: usize, y: usize, value: i8) -> bool {
        self.grid.set(x, y, value)
    }

    pub fn blit(&mut self, source: &PixelGrid, dest_x: i32, dest_y: i32) {
        self.grid.blit(source, dest_x, dest_y);
    }

    /// Unmasked copy; transparent source pixels overwrite the frame.
    pub fn paste(&mut self, source: &PixelGrid, dest_x: i32, dest_y: i32) {
        self.grid.paste(source, dest_x, dest_y);
    }

    pub fn to_rows(&self) -> Vec<Vec<i8>> {
        self.grid.to_rows()
    }

    /// Lowercase hex SHA-256 over the raw cells.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.grid.cells().iter().map(|value| *value as u8).collect::<Vec<_>>());
        to_hex_lower(&hasher.finalize())
    }
}

fn to_hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}

impl Serialize for Frame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.grid.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Frame {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let grid = PixelGrid::deserialize(deserializer)?;
        Frame::from_grid(grid).map_err(D::Error::custom)
    }
}
