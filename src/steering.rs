// Steering policies - how a snake picks its heading each tick
use rand::{Rng, RngCore};

use crate::types::Position;

/// Random walk turn range: delta = (u - 0.5) * TURN_JITTER, u in [0, 1)
pub const TURN_JITTER: f64 = 0.2;

/// Per-tick inputs a policy may read
pub struct SteerInput<'a> {
    pub head: Position,
    pub heading: f64,
    pub pointer: Position,
    pub rng: &'a mut dyn RngCore,
}

pub trait SteeringPolicy: Send {
    /// Heading for the next step, in radians
    fn steer(&mut self, input: SteerInput<'_>) -> f64;

    /// Whether this snake is driven by the pointer
    fn is_player(&self) -> bool {
        false
    }
}

/// Always face the pointer
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerSeeking;

impl SteeringPolicy for PointerSeeking {
    fn steer(&mut self, input: SteerInput<'_>) -> f64 {
        // atan2(0, 0) is 0, so a pointer sitting on the head steers east
        input.head.angle_to(input.pointer)
    }

    fn is_player(&self) -> bool {
        true
    }
}

/// Bounded random perturbation of the previous heading
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomWalk;

impl SteeringPolicy for RandomWalk {
    fn steer(&mut self, mut input: SteerInput<'_>) -> f64 {
        let u: f64 = input.rng.gen();
        input.heading + (u - 0.5) * TURN_JITTER
    }
}
