//! Viewport cell enumeration for virtualized grid rendering.
//!
//! Given a pan offset and viewport size, yields every cell whose square
//! intersects the viewport or lies within [`OVERSCAN_CELLS`] of it.
//!
//! ```text
//! start_x = floor(−pan_x / grid_size) − margin
//! end_x   = floor((−pan_x + width) / grid_size) + margin
//! ```
//!
//! Both ends are inclusive. The overscan masks pop-in while panning fast.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::index::index_of;

/// Extra cells enumerated beyond each viewport edge.
pub const OVERSCAN_CELLS: i32 = 2;

/// Integer coordinates of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A visible cell and its stable render key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub position: GridPosition,
    /// Square-spiral index of `position`. Unique per cell.
    pub index: u64,
}

impl GridCell {
    pub const fn at(x: i32, y: i32) -> Self {
        Self {
            position: GridPosition::new(x, y),
            index: index_of(x, y),
        }
    }

    /// Top-left corner of the cell in content space (before panning).
    pub fn origin(&self, grid_size: f32) -> Vec2 {
        Vec2::new(
            self.position.x as f32 * grid_size,
            self.position.y as f32 * grid_size,
        )
    }
}

/// Inputs to [`visible_cells`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportQuery {
    /// Content offset in pixels. Positive shifts content right/down.
    pub pan: Vec2,
    /// Viewport size in pixels. Zero on either axis means "not yet measured".
    pub size: Vec2,
    /// Edge length of one cell in pixels. Must be positive.
    pub grid_size: f32,
}

/// Inclusive cell bounds covered by a viewport query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_x: i32,
    pub end_x: i32,
    pub start_y: i32,
    pub end_y: i32,
}

impl CellRange {
    /// Number of cells in the range.
    pub fn len(&self) -> usize {
        let w = (self.end_x as i64 - self.start_x as i64 + 1).max(0);
        let h = (self.end_y as i64 - self.start_y as i64 + 1).max(0);
        (w * h) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, position: GridPosition) -> bool {
        (self.start_x..=self.end_x).contains(&position.x)
            && (self.start_y..=self.end_y).contains(&position.y)
    }
}

impl ViewportQuery {
    pub fn new(pan: Vec2, size: Vec2, grid_size: f32) -> Self {
        Self {
            pan,
            size,
            grid_size,
        }
    }

    /// Cell bounds for this query, or `None` when the viewport is unmeasured
    /// or the grid size is not positive.
    pub fn range(&self) -> Option<CellRange> {
        if self.size.x <= 0.0 || self.size.y <= 0.0 || self.grid_size <= 0.0 {
            return None;
        }

        let g = self.grid_size as f64;
        let pan_x = self.pan.x as f64;
        let pan_y = self.pan.y as f64;
        let w = self.size.x as f64;
        let h = self.size.y as f64;

        let cell = |v: f64| v.floor() as i32;
        Some(CellRange {
            start_x: cell(-pan_x / g).saturating_sub(OVERSCAN_CELLS),
            end_x: cell((-pan_x + w) / g).saturating_add(OVERSCAN_CELLS),
            start_y: cell(-pan_y / g).saturating_sub(OVERSCAN_CELLS),
            end_y: cell((-pan_y + h) / g).saturating_add(OVERSCAN_CELLS),
        })
    }
}

/// Iterator over the cells of a [`CellRange`], x outer and y inner, both ascending.
#[derive(Debug, Clone)]
pub struct VisibleCells {
    range: Option<CellRange>,
    x: i64,
    y: i64,
}

impl Iterator for VisibleCells {
    type Item = GridCell;

    fn next(&mut self) -> Option<GridCell> {
        let range = self.range?;
        if self.x > range.end_x as i64 {
            return None;
        }
        let cell = GridCell::at(self.x as i32, self.y as i32);
        if self.y >= range.end_y as i64 {
            self.y = range.start_y as i64;
            self.x += 1;
        } else {
            self.y += 1;
        }
        Some(cell)
    }
}

/// Enumerate the cells to render for a viewport.
///
/// Returns an empty iterator when the viewport has zero width or height.
pub fn visible_cells(query: &ViewportQuery) -> VisibleCells {
    let range = query.range();
    VisibleCells {
        range,
        x: range.map_or(0, |r| r.start_x as i64),
        y: range.map_or(0, |r| r.start_y as i64),
    }
}

/// Memoized [`visible_cells`]: recomputes only when the query changes.
#[derive(Debug, Default)]
pub struct CellCache {
    key: Option<ViewportQuery>,
    cells: Vec<GridCell>,
}

impl CellCache {
    /// Cells for `query`, reusing the previous result when nothing changed.
    pub fn cells(&mut self, query: ViewportQuery) -> &[GridCell] {
        if self.key != Some(query) {
            self.cells.clear();
            self.cells.extend(visible_cells(&query));
            self.key = Some(query);
        }
        &self.cells
    }

    /// Whether the last call to [`cells`](Self::cells) used `query`.
    pub fn is_current(&self, query: &ViewportQuery) -> bool {
        self.key.as_ref() == Some(query)
    }
}
