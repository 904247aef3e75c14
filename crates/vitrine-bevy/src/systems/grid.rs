//! Gallery grid panning and visible-cell enumeration.

use bevy::prelude::*;

use crate::events::{GridInput, VisibleCellsChanged};
use crate::resources::GridView;

/// Feed grid input into the pan state and announce the cells to render
/// whenever the visible range moves.
pub fn update_grid_view(
    mut input: MessageReader<GridInput>,
    mut grid: ResMut<GridView>,
    mut visible: MessageWriter<VisibleCellsChanged>,
) {
    for event in input.read() {
        match *event {
            GridInput::DragStart => {
                grid.drag_total = Vec2::ZERO;
                grid.pan.begin_drag();
            }
            GridInput::Drag(delta) => {
                if grid.pan.is_moving() {
                    grid.drag_total += delta;
                    let total = grid.drag_total;
                    grid.pan.drag(total);
                }
            }
            GridInput::DragEnd => grid.pan.end_drag(),
            GridInput::Wheel(delta) => grid.pan.wheel(delta),
            GridInput::Resize(size) => grid.viewport = size,
        }
    }

    if !grid.is_stale() {
        return;
    }
    let pan = grid.pan.offset;
    let cells = grid.visible_cells().to_vec();
    tracing::trace!("{} grid cells visible", cells.len());
    visible.write(VisibleCellsChanged { pan, cells });
}
