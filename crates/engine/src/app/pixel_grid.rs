use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::EngineError;

/// Palette index reserved for "no pixel here". Any negative value is
/// treated as transparent when compositing.
pub const TRANSPARENT: i8 = -1;

pub fn is_opaque(value: i8) -> bool {
    value >= 0
}

/// Row-major buffer of palette indices.
///
/// Invariant: `width >= 1`, `height >= 1` and `cells.len() == width * height`.
/// Transforms never mutate in place; they return a new grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    cells: Vec<i8>,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize, cells: Vec<i8>) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidBuffer {
                reason: format!("buffer must not be empty, got {width}x{height}"),
            });
        }
        let expected = width * height;
        if cells.len() != expected {
            return Err(EngineError::InvalidBuffer {
                reason: format!("cell count mismatch: expected {expected}, got {}", cells.len()),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn filled(width: usize, height: usize, value: i8) -> Result<Self, EngineError> {
        Self::new(width, height, vec![value; width * height])
    }

    /// Caller guarantees both dimensions are non-zero.
    pub(crate) fn canvas(width: usize, height: usize, value: i8) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }

    pub fn from_rows(rows: Vec<Vec<i8>>) -> Result<Self, EngineError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some((row_index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != width)
        {
            return Err(EngineError::InvalidBuffer {
                reason: format!(
                    "row {row_index} has {} cells, expected {width}",
                    row.len()
                ),
            });
        }
        Self::new(width, height, rows.into_iter().flatten().collect())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn cells(&self) -> &[i8] {
        &self.cells
    }

    pub fn index_of(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<i8> {
        self.index_of(x, y).map(|index| self.cells[index])
    }

    /// Returns `false` when the coordinate is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, value: i8) -> bool {
        match self.index_of(x, y) {
            Some(index) => {
                self.cells[index] = value;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, value: i8) {
        self.cells.fill(value);
    }

    pub fn rows(&self) -> impl Iterator<Item = &[i8]> {
        self.cells.chunks_exact(self.width)
    }

    pub fn to_rows(&self) -> Vec<Vec<i8>> {
        self.rows().map(<[i8]>::to_vec).collect()
    }

    /// Rotates clockwise by `quarter_turns * 90` degrees.
    pub fn rotated_cw(&self, quarter_turns: u32) -> PixelGrid {
        match quarter_turns % 4 {
            0 => self.clone(),
            1 => self.remap(self.height, self.width, |x, y| (y, self.height - 1 - x)),
            2 => self.remap(self.width, self.height, |x, y| {
                (self.width - 1 - x, self.height - 1 - y)
            }),
            _ => self.remap(self.height, self.width, |x, y| (self.width - 1 - y, x)),
        }
    }

    /// Top row becomes bottom row.
    pub fn flipped_vertical(&self) -> PixelGrid {
        self.remap(self.width, self.height, |x, y| (x, self.height - 1 - y))
    }

    /// Left column becomes right column.
    pub fn flipped_horizontal(&self) -> PixelGrid {
        self.remap(self.width, self.height, |x, y| (self.width - 1 - x, y))
    }

    /// Nearest-neighbour block expansion: each pixel becomes a `factor x factor` block.
    pub fn upscaled(&self, factor: usize) -> PixelGrid {
        if factor <= 1 {
            return self.clone();
        }
        self.remap(self.width * factor, self.height * factor, |x, y| {
            (x / factor, y / factor)
        })
    }

    /// Mode-based downscale for palette images.
    ///
    /// Every non-overlapping `divisor x divisor` block collapses to its most
    /// frequent value; ties go to the highest palette index.
    pub fn downscaled_mode(&self, divisor: usize) -> Result<PixelGrid, EngineError> {
        if divisor == 0 || self.width % divisor != 0 || self.height % divisor != 0 {
            return Err(EngineError::InvalidScale {
                scale: scale_for_divisor(divisor),
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.block_mode(divisor))
    }

    /// Caller guarantees `divisor` divides both dimensions.
    pub(crate) fn block_mode(&self, divisor: usize) -> PixelGrid {
        if divisor <= 1 {
            return self.clone();
        }
        let out_width = self.width / divisor;
        let out_height = self.height / divisor;
        let mut block = Vec::with_capacity(divisor * divisor);
        let mut cells = Vec::with_capacity(out_width * out_height);
        for out_y in 0..out_height {
            for out_x in 0..out_width {
                block.clear();
                for dy in 0..divisor {
                    let row_start = (out_y * divisor + dy) * self.width + out_x * divisor;
                    block.extend_from_slice(&self.cells[row_start..row_start + divisor]);
                }
                cells.push(dominant_value(&mut block));
            }
        }
        PixelGrid {
            width: out_width,
            height: out_height,
            cells,
        }
    }

    /// Copies the opaque pixels of `source` with its top-left corner at
    /// `(dest_x, dest_y)`, clipping anything that falls outside `self`.
    pub fn blit(&mut self, source: &PixelGrid, dest_x: i32, dest_y: i32) {
        self.copy_region(source, dest_x, dest_y, true);
    }

    /// Like [`PixelGrid::blit`], but copies every pixel, transparent ones included.
    pub fn paste(&mut self, source: &PixelGrid, dest_x: i32, dest_y: i32) {
        self.copy_region(source, dest_x, dest_y, false);
    }

    fn copy_region(&mut self, source: &PixelGrid, dest_x: i32, dest_y: i32, masked: bool) {
        let Some(overlap) = intersect_spans(
            (dest_x, dest_y, source.width, source.height),
            (0, 0, self.width, self.height),
        ) else {
            return;
        };
        for world_y in overlap.y_start..overlap.y_end {
            for world_x in overlap.x_start..overlap.x_end {
                let src_x = (world_x - dest_x) as usize;
                let src_y = (world_y - dest_y) as usize;
                let value = source.cells[src_y * source.width + src_x];
                if !masked || is_opaque(value) {
                    self.cells[world_y as usize * self.width + world_x as usize] = value;
                }
            }
        }
    }

    fn remap(
        &self,
        out_width: usize,
        out_height: usize,
        source_of: impl Fn(usize, usize) -> (usize, usize),
    ) -> PixelGrid {
        let mut cells = Vec::with_capacity(out_width * out_height);
        for y in 0..out_height {
            for x in 0..out_width {
                let (src_x, src_y) = source_of(x, y);
                cells.push(self.cells[src_y * self.width + src_x]);
            }
        }
        PixelGrid {
            width: out_width,
            height: out_height,
            cells,
        }
    }
}

/// Half-open world-space rectangle shared by two placed buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Overlap {
    pub x_start: i32,
    pub x_end: i32,
    pub y_start: i32,
    pub y_end: i32,
}

/// Each span is `(x, y, width, height)`. Far edges saturate at `i32::MAX`.
pub(crate) fn intersect_spans(
    a: (i32, i32, usize, usize),
    b: (i32, i32, usize, usize),
) -> Option<Overlap> {
    let x_start = a.0.max(b.0);
    let x_end = span_end(a.0, a.2).min(span_end(b.0, b.2));
    let y_start = a.1.max(b.1);
    let y_end = span_end(a.1, a.3).min(span_end(b.1, b.3));
    if x_end <= x_start || y_end <= y_start {
        return None;
    }
    Some(Overlap {
        x_start,
        x_end,
        y_start,
        y_end,
    })
}

pub(crate) fn span_end(start: i32, len: usize) -> i32 {
    start.saturating_add(i32::try_from(len).unwrap_or(i32::MAX))
}

/// Negative sprite scale `-k` downsamples by `k + 1`.
pub(crate) fn scale_for_divisor(divisor: usize) -> i32 {
    if divisor == 0 {
        0
    } else {
        -(divisor as i32 - 1)
    }
}

fn dominant_value(block: &mut [i8]) -> i8 {
    block.sort_unstable();
    let mut best_value = block[0];
    let mut best_count = 0usize;
    let mut index = 0usize;
    while index < block.len() {
        let value = block[index];
        let run = block[index..].iter().take_while(|v| **v == value).count();
        // Ascending order: `>=` hands ties to the higher index.
        if run >= best_count {
            best_value = value;
            best_count = run;
        }
        index += run;
    }
    best_value
}

impl Serialize for PixelGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

impl<'de> Deserialize<'de> for PixelGrid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Vec::<Vec<i8>>::deserialize(deserializer)?;
        PixelGrid::from_rows(rows).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[i8]]) -> PixelGrid {
        PixelGrid::from_rows(rows.iter().map(|row| row.to_vec()).collect()).expect("grid")
    }

    fn quadrants_6x6() -> PixelGrid {
        grid(&[
            &[1, 1, 1, 2, 2, 2],
            &[1, 1, 1, 2, 2, 2],
            &[1, 1, 1, 2, 2, 2],
            &[3, 3, 3, 4, 4, 4],
            &[3, 3, 3, 4, 4, 4],
            &[3, 3, 3, 4, 4, 4],
        ])
    }

    #[test]
    fn from_rows_rejects_ragged_and_empty_input() {
        assert!(matches!(
            PixelGrid::from_rows(vec![vec![1, 2], vec![3]]),
            Err(EngineError::InvalidBuffer { .. })
        ));
        assert!(matches!(
            PixelGrid::from_rows(Vec::new()),
            Err(EngineError::InvalidBuffer { .. })
        ));
        assert!(matches!(
            PixelGrid::from_rows(vec![Vec::new()]),
            Err(EngineError::InvalidBuffer { .. })
        ));
    }

    #[test]
    fn new_rejects_cell_count_mismatch() {
        let err = PixelGrid::new(2, 2, vec![0; 3]).expect_err("mismatch");
        assert!(matches!(err, EngineError::InvalidBuffer { .. }));
    }

    #[test]
    fn indexing_and_bounds() {
        let mut g = grid(&[&[1, 2, 3], &[4, 5, 6]]);
        assert_eq!(g.size(), (3, 2));
        assert_eq!(g.get(2, 1), Some(6));
        assert_eq!(g.get(3, 0), None);
        assert!(g.set(0, 1, 9));
        assert!(!g.set(0, 2, 9));
        assert_eq!(g.to_rows(), vec![vec![1, 2, 3], vec![9, 5, 6]]);
    }

    #[test]
    fn clockwise_rotation_matches_reference_layouts() {
        let g = grid(&[&[1, 2], &[3, 4]]);
        assert_eq!(g.rotated_cw(1).to_rows(), vec![vec![3, 1], vec![4, 2]]);
        assert_eq!(g.rotated_cw(2).to_rows(), vec![vec![4, 3], vec![2, 1]]);
        assert_eq!(g.rotated_cw(3).to_rows(), vec![vec![2, 4], vec![1, 3]]);
        assert_eq!(g.rotated_cw(4), g);
    }

    #[test]
    fn rotation_swaps_dimensions_for_odd_quarter_turns() {
        let g = grid(&[&[1, 2, 3], &[4, 5, 6]]);
        let rotated = g.rotated_cw(1);
        assert_eq!(rotated.size(), (2, 3));
        assert_eq!(rotated.to_rows(), vec![vec![4, 1], vec![5, 2], vec![6, 3]]);
        assert_eq!(g.rotated_cw(3).to_rows(), vec![vec![3, 6], vec![2, 5], vec![1, 4]]);
    }

    #[test]
    fn flips_mirror_the_expected_axis() {
        let g = grid(&[&[1, 2], &[3, 4]]);
        assert_eq!(g.flipped_vertical().to_rows(), vec![vec![3, 4], vec![1, 2]]);
        assert_eq!(g.flipped_horizontal().to_rows(), vec![vec![2, 1], vec![4, 3]]);
    }

    #[test]
    fn upscale_replicates_blocks() {
        let g = grid(&[&[1, 2]]);
        assert_eq!(
            g.upscaled(2).to_rows(),
            vec![vec![1, 1, 2, 2], vec![1, 1, 2, 2]]
        );
    }

    #[test]
    fn downscale_by_two_keeps_block_mode_with_high_index_ties() {
        let downscaled = quadrants_6x6().downscaled_mode(2).expect("divisible");
        assert_eq!(
            downscaled.to_rows(),
            vec![vec![1, 2, 2], vec![3, 4, 4], vec![3, 4, 4]]
        );
    }

    #[test]
    fn downscale_by_three_recovers_quadrants() {
        let downscaled = quadrants_6x6().downscaled_mode(3).expect("divisible");
        assert_eq!(downscaled.to_rows(), vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn downscale_transparency_loses_ties() {
        let g = grid(&[&[-1, 3], &[3, -1]]);
        assert_eq!(g.downscaled_mode(2).expect("divisible").to_rows(), vec![vec![3]]);
        let mostly_clear = grid(&[&[-1, -1], &[-1, 7]]);
        assert_eq!(
            mostly_clear.downscaled_mode(2).expect("divisible").to_rows(),
            vec![vec![-1]]
        );
    }

    #[test]
    fn downscale_rejects_non_dividing_factor() {
        let err = quadrants_6x6().downscaled_mode(4).expect_err("6 % 4 != 0");
        assert_eq!(
            err,
            EngineError::InvalidScale {
                scale: -3,
                width: 6,
                height: 6
            }
        );
        assert!(quadrants_6x6().downscaled_mode(0).is_err());
    }

    #[test]
    fn blit_skips_transparent_pixels_and_clips() {
        let mut canvas = PixelGrid::filled(3, 3, 0).expect("canvas");
        let stamp = grid(&[&[5, -1], &[-1, 6]]);
        canvas.blit(&stamp, 2, 2);
        canvas.blit(&stamp, -1, -1);
        assert_eq!(
            canvas.to_rows(),
            vec![vec![6, 0, 0], vec![0, 0, 0], vec![0, 0, 5]]
        );
    }

    #[test]
    fn paste_copies_transparent_pixels_too() {
        let mut canvas = PixelGrid::filled(3, 3, 0).expect("canvas");
        canvas.paste(&grid(&[&[5, -1], &[-1, 6]]), 1, 1);
        assert_eq!(
            canvas.to_rows(),
            vec![vec![0, 0, 0], vec![0, 5, -1], vec![0, -1, 6]]
        );
    }

    #[test]
    fn span_intersection_saturates_at_the_coordinate_limit() {
        let far = (i32::MAX - 1, i32::MAX - 1, 4, 4);
        assert_eq!(
            intersect_spans(far, far),
            Some(Overlap {
                x_start: i32::MAX - 1,
                x_end: i32::MAX,
                y_start: i32::MAX - 1,
                y_end: i32::MAX,
            })
        );
        assert_eq!(intersect_spans(far, (0, 0, 4, 4)), None);
    }

    #[test]
    fn serde_round_trips_as_nested_rows() {
        let g = grid(&[&[1, -1], &[0, 15]]);
        let json = serde_json::to_string(&g).expect("serialize");
        assert_eq!(json, "[[1,-1],[0,15]]");
        let back: PixelGrid = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, g);
        assert!(serde_json::from_str::<PixelGrid>("[[1],[2,3]]").is_err());
    }
}
