// Food pellets dropped by dead snakes
use crate::canvas::Surface;
use crate::types::{Position, Rgb};

pub const FOOD_RADIUS: f64 = 5.0;
pub const FOOD_COLOR: Rgb = Rgb::new(255, 255, 0);
/// A pellet is left at every Nth segment of a dead snake
pub const FOOD_DROP_STRIDE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Food {
    pub position: Position,
    pub color: Rgb,
}

impl Food {
    pub fn new(position: Position, color: Rgb) -> Self {
        Food { position, color }
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.fill_circle(self.position, FOOD_RADIUS, self.color);
    }
}

/// All pellets currently lying on the canvas
#[derive(Debug, Default)]
pub struct FoodField {
    foods: Vec<Food>,
}

impl FoodField {
    pub fn new() -> Self {
        FoodField { foods: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Food> {
        self.foods.iter()
    }

    pub fn push(&mut self, food: Food) {
        self.foods.push(food);
    }

    /// Leave a pellet at segments 0, 3, 6, ... of a dead body. Returns how many were added.
    pub fn drop_from<'a>(&mut self, segments: impl IntoIterator<Item = &'a Position>) -> usize {
        let before = self.foods.len();
        self.foods.extend(
            segments
                .into_iter()
                .step_by(FOOD_DROP_STRIDE)
                .map(|pos| Food::new(*pos, FOOD_COLOR)),
        );
        self.foods.len() - before
    }

    /// Remove every pellet closer than `radius` to `head`, returning the count.
    /// Scans back to front so removals don't shift unvisited entries.
    pub fn consume_near(&mut self, head: Position, radius: f64) -> usize {
        let mut eaten = 0;
        for i in (0..self.foods.len()).rev() {
            if self.foods[i].position.distance(head) < radius {
                self.foods.remove(i);
                eaten += 1;
            }
        }
        eaten
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        for food in &self.foods {
            food.draw(surface);
        }
    }
}
