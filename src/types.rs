// Shared types module - Common types used across the simulation and the host loop

// Game mode exit reason - tells main why the frame loop stopped
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeExitReason {
    UserQuit,  // User pressed 'q', Esc or Ctrl+C inside the terminal
    Shutdown,  // Signal handler asked the process to stop
}

/// A point in canvas world space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn distance(&self, other: Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle of the vector from `self` to `target`, in radians
    pub fn angle_to(&self, target: Position) -> f64 {
        (target.y - self.y).atan2(target.x - self.x)
    }

    /// Step `length` units along `heading`
    pub fn step(&self, heading: f64, length: f64) -> Position {
        Position {
            x: self.x + heading.cos() * length,
            y: self.y + heading.sin() * length,
        }
    }
}

// RGB color representation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Multiply every channel by `factor`, truncating toward zero
    pub fn scaled(&self, factor: f64) -> Rgb {
        Rgb {
            r: (self.r as f64 * factor) as u8,
            g: (self.g as f64 * factor) as u8,
            b: (self.b as f64 * factor) as u8,
        }
    }
}
