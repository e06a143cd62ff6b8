// Snake - a head steered by a policy, trailing a fixed-budget chain of segments
use rand::RngCore;
use std::collections::VecDeque;

use crate::canvas::Surface;
use crate::steering::{PointerSeeking, RandomWalk, SteerInput, SteeringPolicy};
use crate::types::{Position, Rgb};

pub const INITIAL_LENGTH: usize = 40;
pub const GROWTH_PER_FOOD: usize = 5;
pub const SNAKE_SPEED: f64 = 2.0;
pub const SEGMENT_RADIUS: f64 = 6.0;
pub const COLLISION_DISTANCE: f64 = 10.0;
/// Segments nearest another snake's head that never count as a hit
pub const COLLISION_SKIP: usize = 5;

pub const PLAYER_COLOR: Rgb = Rgb::new(0, 255, 0);
pub const COMPUTER_COLOR: Rgb = Rgb::new(255, 0, 0);

pub struct Snake {
    id: usize,  // Stable across retirement; the world gives the player 0
    segments: VecDeque<Position>,  // Head first
    target_length: usize,
    speed: f64,
    color: Rgb,
    heading: f64,
    dead: bool,
    steering: Box<dyn SteeringPolicy>,
}

impl Snake {
    pub fn new(start: Position, color: Rgb, steering: Box<dyn SteeringPolicy>) -> Self {
        let mut segments = VecDeque::with_capacity(INITIAL_LENGTH + 1);
        segments.push_front(start);

        Snake {
            id: 0,
            segments,
            target_length: INITIAL_LENGTH,
            speed: SNAKE_SPEED,
            color,
            heading: 0.0,
            dead: false,
            steering,
        }
    }

    /// Pointer-driven snake
    pub fn player(start: Position) -> Self {
        Self::new(start, PLAYER_COLOR, Box::new(PointerSeeking))
    }

    /// Random-walk snake
    pub fn computer(start: Position) -> Self {
        Self::new(start, COMPUTER_COLOR, Box::new(RandomWalk))
    }

    pub fn with_id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn head(&self) -> Position {
        // Never empty: created with one segment and truncation keeps at least target_length >= 1
        self.segments.front().copied().unwrap_or_default()
    }

    pub fn segments(&self) -> &VecDeque<Position> {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn target_length(&self) -> usize {
        self.target_length
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_player(&self) -> bool {
        self.steering.is_player()
    }

    /// One step: steer, push a new head, drop tail segments beyond the target length
    pub fn advance(&mut self, pointer: Position, rng: &mut dyn RngCore) {
        if self.dead {
            return;
        }

        let head = self.head();
        self.heading = self.steering.steer(SteerInput {
            head,
            heading: self.heading,
            pointer,
            rng,
        });

        self.segments.push_front(head.step(self.heading, self.speed));
        while self.segments.len() > self.target_length {
            self.segments.pop_back();
        }
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        if self.dead {
            return;
        }
        for seg in &self.segments {
            surface.fill_circle(*seg, SEGMENT_RADIUS, self.color);
        }
    }

    /// True when this head touches the body of any live snake in `others`.
    /// `self` is skipped by identity, so it may appear in `others`.
    pub fn check_collision<'a>(&self, others: impl IntoIterator<Item = &'a Snake>) -> bool {
        if self.dead {
            return false;
        }

        let head = self.head();
        others
            .into_iter()
            .filter(|other| !std::ptr::eq(*other, self) && !other.dead)
            .any(|other| {
                other
                    .segments
                    .iter()
                    .skip(COLLISION_SKIP)
                    .any(|seg| seg.distance(head) < COLLISION_DISTANCE)
            })
    }

    /// Alive -> Dead. Returns false if the snake was already dead.
    pub fn kill(&mut self) -> bool {
        let was_alive = !self.dead;
        self.dead = true;
        was_alive
    }

    pub fn grow(&mut self) {
        self.target_length += GROWTH_PER_FOOD;
    }

    #[cfg(test)]
    pub(crate) fn with_segments(segments: Vec<Position>, color: Rgb, steering: Box<dyn SteeringPolicy>) -> Self {
        let mut snake = Self::new(segments[0], color, steering);
        snake.segments = segments.into_iter().collect();
        snake
    }
}
