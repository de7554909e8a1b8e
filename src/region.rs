//! Bounding boxes and frame diffing for partial updates
//!
//! Pure logic (no hardware) so it can be unit-tested without a panel.

extern crate alloc;

use alloc::vec::Vec;

/// Rectangular region in unrotated panel coordinates.
///
/// Half-open on the max edges: a region covers `min_x..max_x` by
/// `min_y..max_y`, so `min < max` holds on both axes whenever a region
/// exists. "No change" is represented by `Option::None`, never by an empty
/// region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub min_x: u16,
    pub min_y: u16,
    pub max_x: u16,
    pub max_y: u16,
}

impl Region {
    /// Width in pixels.
    pub const fn width(self) -> u16 {
        self.max_x - self.min_x
    }

    /// Height in pixels.
    pub const fn height(self) -> u16 {
        self.max_y - self.min_y
    }

    /// Grow the region outward so every edge lands on a multiple of `align`.
    ///
    /// Never shrinks, and re-rounding an aligned region is a no-op. The
    /// controller refuses refresh regions off its alignment grid, so every
    /// region headed for the panel passes through here first.
    pub const fn round_to(self, align: u16) -> Region {
        Region {
            min_x: self.min_x - self.min_x % align,
            min_y: self.min_y - self.min_y % align,
            max_x: self.max_x + (align - 1) - (self.max_x - 1) % align,
            max_y: self.max_y + (align - 1) - (self.max_y - 1) % align,
        }
    }

    /// Cap the max edges at the panel bounds.
    ///
    /// Rounding can push a region past the last row or column when the
    /// panel dimensions are not alignment multiples; the panel edge wins.
    pub fn clamp_to(self, width: u16, height: u16) -> Region {
        Region {
            min_x: self.min_x,
            min_y: self.min_y,
            max_x: self.max_x.min(width),
            max_y: self.max_y.min(height),
        }
    }

    /// Smallest region containing both `self` and `other`.
    pub fn merge(self, other: Region) -> Region {
        Region {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Merge two optional regions; the absent region is the identity.
    pub fn merge_opt(a: Option<Region>, b: Option<Region>) -> Option<Region> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.merge(b)),
            (region, None) | (None, region) => region,
        }
    }

    /// Whether `(x, y)` lies inside the region.
    pub const fn contains(self, x: u16, y: u16) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }
}

/// Minimal bounding box of pixel differences between two 8-bpp frames.
///
/// Both frames must be `width` pixels wide with identical lengths. Returns
/// `None` when the frames are byte-identical.
pub fn diff(prev: &[u8], next: &[u8], width: usize) -> Option<Region> {
    debug_assert_eq!(prev.len(), next.len());

    let mut bounds: Option<Region> = None;

    for (y, (prev_row, next_row)) in prev
        .chunks_exact(width)
        .zip(next.chunks_exact(width))
        .enumerate()
    {
        if prev_row == next_row {
            continue;
        }

        let first = prev_row
            .iter()
            .zip(next_row)
            .position(|(a, b)| a != b)
            .unwrap_or(0);
        let last = prev_row
            .iter()
            .zip(next_row)
            .rposition(|(a, b)| a != b)
            .unwrap_or(first);

        let row_box = Region {
            min_x: first as u16,
            min_y: y as u16,
            max_x: last as u16 + 1,
            max_y: y as u16 + 1,
        };
        bounds = Region::merge_opt(bounds, Some(row_box));
    }

    bounds
}

/// Copy the sub-rectangle `region` of `frame` into a compact buffer.
pub fn extract(frame: &[u8], width: usize, region: Region) -> Vec<u8> {
    let region_width = region.width() as usize;
    let mut out = Vec::with_capacity(region_width * region.height() as usize);

    for y in region.min_y..region.max_y {
        let start = y as usize * width + region.min_x as usize;
        out.extend_from_slice(&frame[start..start + region_width]);
    }

    out
}
