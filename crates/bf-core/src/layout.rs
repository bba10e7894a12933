use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;

/// Graph-space coordinates. `y` grows downward, like the renderer's canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// Position of the next child of a parent that already has `parent_branch_count` children.
///
/// The existing siblings are assumed to start at `parent.x - count * S / 2`, so the new
/// child lands at `start + count * S`. Earlier siblings keep their stored positions; only
/// the slot assumed for the next one shifts as the group grows.
pub fn place(parent: Position, parent_branch_count: usize, layout: &LayoutConfig) -> Position {
    let count = parent_branch_count as f64;
    let total_width = count * layout.branch_spacing;
    let start_x = parent.x - total_width / 2.0;
    Position { x: start_x + count * layout.branch_spacing, y: parent.y + layout.vertical_offset }
}

/// Where the "start conversation" placeholder goes.
pub fn placeholder_position(layout: &LayoutConfig) -> Position {
    Position::new(layout.placeholder_x, layout.placeholder_y)
}

/// Where the first exchange goes, directly under the placeholder.
pub fn first_exchange_position(layout: &LayoutConfig) -> Position {
    placeholder_position(layout).offset(0.0, layout.first_exchange_offset)
}
