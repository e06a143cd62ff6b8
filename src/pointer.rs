// Pointer tracker - latest mouse position in canvas world coordinates
use crate::types::Position;

/// Holds the most recent pointer position. Overwritten on every mouse move,
/// read once per tick by the player's steering.
#[derive(Debug, Clone, Copy)]
pub struct PointerTracker {
    position: Position,
    scale: f64,
}

impl PointerTracker {
    /// `start` is where the pointer is assumed to be before the first move event
    pub fn new(start: Position, scale: f64) -> Self {
        PointerTracker { position: start, scale }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Record a terminal mouse event at (column, row).
    /// A cell covers one pixel horizontally and two vertically, so the pointer
    /// lands on the centre of the cell's pixel pair.
    pub fn update_from_cell(&mut self, column: u16, row: u16) {
        let px = column as f64 + 0.5;
        let py = row as f64 * 2.0 + 1.0;
        self.position = Position::new(px * self.scale, py * self.scale);
    }
}
