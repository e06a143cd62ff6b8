// World - owns every snake, the pellets and the drawing surface; runs one tick per frame
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::canvas::Surface;
use crate::food::FoodField;
use crate::snake::{Snake, COLLISION_DISTANCE};
use crate::types::Position;

pub const COMPUTER_SNAKES: usize = 5;
/// Alpha of the black overlay painted at the start of each tick
pub const FADE_ALPHA: f64 = 0.3;
pub const EAT_DISTANCE: f64 = COLLISION_DISTANCE;

pub struct World<S: Surface> {
    player: Snake,
    computers: Vec<Snake>,
    retired: Vec<Snake>,  // Dead computer snakes ordered by id; they only eat from here on
    foods: FoodField,
    surface: S,
    rng: StdRng,
    ticks: u64,
}

impl<S: Surface> World<S> {
    /// Player at the centre, computer snakes at random spots across the canvas
    pub fn new(surface: S, width: f64, height: f64, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let player = Snake::player(Position::new(width / 2.0, height / 2.0));
        let computers = (0..COMPUTER_SNAKES)
            .map(|_| {
                let x = rng.gen::<f64>() * width;
                let y = rng.gen::<f64>() * height;
                Snake::computer(Position::new(x, y))
            })
            .collect();

        Self::with_snakes(surface, player, computers, rng)
    }

    /// Player gets id 0, computer snakes 1.. in the order given
    pub fn with_snakes(surface: S, player: Snake, computers: Vec<Snake>, rng: StdRng) -> Self {
        World {
            player: player.with_id(0),
            computers: computers
                .into_iter()
                .enumerate()
                .map(|(i, snake)| snake.with_id(i + 1))
                .collect(),
            retired: Vec::new(),
            foods: FoodField::new(),
            surface,
            rng,
            ticks: 0,
        }
    }

    pub fn player(&self) -> &Snake {
        &self.player
    }

    /// Live (or just-died, until the end of the tick) computer snakes
    pub fn computers(&self) -> &[Snake] {
        &self.computers
    }

    /// Dead computer snakes, ordered by id
    pub fn retired(&self) -> &[Snake] {
        &self.retired
    }

    pub fn foods(&self) -> &FoodField {
        &self.foods
    }

    pub fn foods_mut(&mut self) -> &mut FoodField {
        &mut self.foods
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn alive_count(&self) -> usize {
        let computers = self.computers.iter().filter(|s| !s.is_dead()).count();
        computers + usize::from(!self.player.is_dead())
    }

    /// Leave pellets along a dead body
    pub fn drop_food<'a>(&mut self, segments: impl IntoIterator<Item = &'a Position>) -> usize {
        self.foods.drop_from(segments)
    }

    /// Feed the player from any pellets under its head
    pub fn eat_food_player(&mut self) -> usize {
        Self::eat_food(&mut self.foods, &mut self.player)
    }

    /// Dead snakes keep eating: a corpse's head still swallows pellets within reach
    fn eat_food(foods: &mut FoodField, snake: &mut Snake) -> usize {
        let eaten = foods.consume_near(snake.head(), EAT_DISTANCE);
        for _ in 0..eaten {
            snake.grow();
        }
        eaten
    }

    /// Player collision against the computer snakes
    pub fn check_player_collision(&mut self) -> bool {
        if !self.player.check_collision(self.computers.iter()) {
            return false;
        }
        self.player.kill();
        let dropped = self.foods.drop_from(self.player.segments());
        info!("Player died at tick {} (length {}), dropped {} pellets", self.ticks, self.player.len(), dropped);
        true
    }

    /// Collision for computer snake `idx` against the player and every computer snake
    pub fn check_computer_collision(&mut self, idx: usize) -> bool {
        let hit = {
            let candidates = std::iter::once(&self.player).chain(self.computers.iter());
            self.computers[idx].check_collision(candidates)
        };
        if !hit {
            return false;
        }

        let snake = &mut self.computers[idx];
        snake.kill();
        let dropped = self.foods.drop_from(snake.segments());
        info!(
            "Computer snake {} died at tick {} (length {}), dropped {} pellets",
            snake.id(),
            self.ticks,
            snake.len(),
            dropped
        );
        true
    }

    /// One frame of simulation and drawing
    pub fn tick(&mut self, pointer: Position) {
        self.ticks += 1;
        self.surface.fade(FADE_ALPHA);

        self.player.advance(pointer, &mut self.rng);
        self.check_player_collision();
        Self::eat_food(&mut self.foods, &mut self.player);
        self.player.draw(&mut self.surface);

        // Retired snakes still eat, at the slot their id held among the computers
        let mut retired_idx = 0;
        for idx in 0..self.computers.len() {
            let id = self.computers[idx].id();
            while retired_idx < self.retired.len() && self.retired[retired_idx].id() < id {
                Self::eat_food(&mut self.foods, &mut self.retired[retired_idx]);
                retired_idx += 1;
            }

            self.computers[idx].advance(pointer, &mut self.rng);
            self.check_computer_collision(idx);
            Self::eat_food(&mut self.foods, &mut self.computers[idx]);
            self.computers[idx].draw(&mut self.surface);
        }
        for snake in &mut self.retired[retired_idx..] {
            Self::eat_food(&mut self.foods, snake);
        }

        self.foods.draw(&mut self.surface);

        self.retire_dead();
    }

    fn retire_dead(&mut self) {
        if self.computers.iter().all(|s| !s.is_dead()) {
            return;
        }
        let (dead, alive): (Vec<Snake>, Vec<Snake>) = std::mem::take(&mut self.computers)
            .into_iter()
            .partition(|s| s.is_dead());
        self.computers = alive;
        self.retired.extend(dead);
        self.retired.sort_by_key(|s| s.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::{Food, FOOD_COLOR};
    use crate::snake::{COMPUTER_COLOR, GROWTH_PER_FOOD, INITIAL_LENGTH, PLAYER_COLOR};
    use crate::steering::{PointerSeeking, RandomWalk};
    use crate::types::Rgb;

    #[derive(Default)]
    struct Recorder {
        fades: usize,
        circles: Vec<(Position, f64, Rgb)>,
    }

    impl Surface for Recorder {
        fn fade(&mut self, _alpha: f64) {
            self.fades += 1;
            self.circles.clear();
        }
        fn fill_circle(&mut self, center: Position, radius: f64, color: Rgb) {
            self.circles.push((center, radius, color));
        }
    }

    fn body(head: Position, n: usize) -> Vec<Position> {
        (0..n).map(|i| Position::new(head.x - i as f64 * 2.0, head.y)).collect()
    }

    fn world_with(player: Snake, computers: Vec<Snake>) -> World<Recorder> {
        World::with_snakes(Recorder::default(), player, computers, StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_new_world_layout() {
        let world = World::new(Recorder::default(), 800.0, 600.0, Some(1));
        assert_eq!(world.player().head(), Position::new(400.0, 300.0));
        assert!(world.player().is_player());
        assert_eq!(world.computers().len(), COMPUTER_SNAKES);
        for snake in world.computers() {
            let head = snake.head();
            assert!(head.x >= 0.0 && head.x < 800.0);
            assert!(head.y >= 0.0 && head.y < 600.0);
            assert!(!snake.is_player());
            assert_eq!(snake.len(), 1);
        }
        assert!(world.foods().is_empty());
        assert_eq!(world.alive_count(), 6);
        assert_eq!(world.player().id(), 0);
        let ids: Vec<usize> = world.computers().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_player_dies_on_computer_body() {
        let player = Snake::with_segments(body(Position::new(100.0, 100.0), 12), PLAYER_COLOR, Box::new(PointerSeeking));
        let mut segs = vec![Position::new(700.0, 500.0); 6];
        segs.push(Position::new(105.0, 100.0));
        let computer = Snake::with_segments(segs, COMPUTER_COLOR, Box::new(RandomWalk));

        let mut world = world_with(player, vec![computer]);
        let prior: Vec<Position> = world.player().segments().iter().copied().collect();

        assert!(world.check_player_collision());
        assert!(world.player().is_dead());
        assert_eq!(world.foods().len(), (prior.len() + 2) / 3);

        let dropped: Vec<Position> = world.foods().iter().map(|f| f.position).collect();
        let expected: Vec<Position> = prior.iter().step_by(3).copied().collect();
        assert_eq!(dropped, expected);
    }

    #[test]
    fn test_eat_food_scenario() {
        let player = Snake::player(Position::new(50.0, 50.0));
        let mut world = world_with(player, Vec::new());
        world.foods_mut().push(Food::new(Position::new(50.0, 50.0), FOOD_COLOR));

        // Pointer far to the east: head moves to (52, 50)
        world.player.advance(Position::new(1000.0, 50.0), &mut world.rng);
        assert_eq!(world.player().head(), Position::new(52.0, 50.0));

        assert_eq!(world.eat_food_player(), 1);
        assert!(world.foods().is_empty());
        assert_eq!(world.player().target_length(), INITIAL_LENGTH + GROWTH_PER_FOOD);

        // Nothing left, nothing double counted
        assert_eq!(world.eat_food_player(), 0);
        assert_eq!(world.player().target_length(), INITIAL_LENGTH + GROWTH_PER_FOOD);
    }

    #[test]
    fn test_drop_food_appends() {
        let mut world = world_with(Snake::player(Position::default()), Vec::new());
        let dead_body = body(Position::new(200.0, 200.0), 7);
        assert_eq!(world.drop_food(&dead_body), 3);
        assert_eq!(world.drop_food(&dead_body[..1]), 1);
        assert_eq!(world.foods().len(), 4);
    }

    #[test]
    fn test_eating_several_pellets_in_one_tick() {
        let player = Snake::player(Position::new(50.0, 50.0));
        let mut world = world_with(player, Vec::new());
        for dx in [0.0, 1.0, 3.0] {
            world.foods_mut().push(Food::new(Position::new(52.0 + dx, 50.0), FOOD_COLOR));
        }
        world.foods_mut().push(Food::new(Position::new(300.0, 300.0), FOOD_COLOR));

        world.tick(Position::new(1000.0, 50.0));
        assert_eq!(world.foods().len(), 1);
        assert_eq!(world.player().target_length(), INITIAL_LENGTH + 3 * GROWTH_PER_FOOD);
    }

    #[test]
    fn test_computer_collides_with_player() {
        let player = Snake::with_segments(body(Position::new(300.0, 300.0), 20), PLAYER_COLOR, Box::new(PointerSeeking));
        // Computer head sits on player segment 10
        let computer = Snake::with_segments(vec![Position::new(280.0, 301.0)], COMPUTER_COLOR, Box::new(RandomWalk));
        let mut world = world_with(player, vec![computer]);

        assert!(world.check_computer_collision(0));
        assert!(world.computers()[0].is_dead());
        assert!(!world.player().is_dead());
        assert_eq!(world.foods().len(), 1);
    }

    #[test]
    fn test_computer_ignores_itself() {
        let player = Snake::player(Position::new(10.0, 10.0));
        let mut segs = body(Position::new(300.0, 300.0), 10);
        segs[7] = Position::new(301.0, 300.0);
        let computer = Snake::with_segments(segs, COMPUTER_COLOR, Box::new(RandomWalk));
        let mut world = world_with(player, vec![computer]);

        assert!(!world.check_computer_collision(0));
        assert!(!world.computers()[0].is_dead());
    }

    #[test]
    fn test_tick_order_and_retirement() {
        // Player head runs into computer 0's body on the first tick
        let player = Snake::player(Position::new(98.0, 100.0));
        let mut segs = vec![Position::new(700.0, 500.0); 6];
        segs.push(Position::new(100.0, 100.0));
        let blocker = Snake::with_segments(segs, COMPUTER_COLOR, Box::new(RandomWalk));

        let wanderer = Snake::with_segments(vec![Position::new(400.0, 400.0)], COMPUTER_COLOR, Box::new(RandomWalk));
        let mut world = world_with(player, vec![blocker, wanderer]);

        world.tick(Position::new(1000.0, 100.0));
        assert_eq!(world.ticks(), 1);
        assert!(world.player().is_dead());
        // The corpse swallows the single pellet it dropped on its own head
        assert!(world.foods().is_empty());
        assert_eq!(world.player().target_length(), INITIAL_LENGTH + GROWTH_PER_FOOD);
        assert_eq!(world.surface().fades, 1);
        // Dead player is not drawn; both computers are
        assert!(world.surface().circles.iter().all(|c| c.2 != PLAYER_COLOR && c.2 != FOOD_COLOR));
        assert!(world.surface().circles.iter().any(|c| c.2 == COMPUTER_COLOR));

        // Player stays dead forever, world keeps running
        for _ in 0..50 {
            world.tick(Position::new(0.0, 0.0));
        }
        assert!(world.player().is_dead());
        assert_eq!(world.ticks(), 51);
    }

    #[test]
    fn test_dead_computers_move_to_retired() {
        let player = Snake::with_segments(body(Position::new(300.0, 300.0), 20), PLAYER_COLOR, Box::new(PointerSeeking));
        let doomed = Snake::with_segments(vec![Position::new(280.0, 301.0)], COMPUTER_COLOR, Box::new(RandomWalk));
        let safe = Snake::computer(Position::new(700.0, 50.0));
        let mut world = world_with(player, vec![doomed, safe]);

        // The doomed snake moves at most 2 units, still within 10 of the player's body
        world.tick(Position::new(300.0, 300.0));
        assert_eq!(world.computers().len(), 1);
        assert_eq!(world.retired().len(), 1);
        assert!(world.retired()[0].is_dead());
        assert!(!world.computers()[0].is_dead());
    }

    #[test]
    fn test_dead_player_eats_pellets_under_its_head() {
        // Body x = 102, 100, ..., 80; the next step puts the head on computer segment 6
        let player = Snake::with_segments(body(Position::new(102.0, 100.0), 12), PLAYER_COLOR, Box::new(PointerSeeking));
        let mut segs = vec![Position::new(700.0, 500.0); 6];
        segs.push(Position::new(104.0, 100.0));
        let computer = Snake::with_segments(segs, COMPUTER_COLOR, Box::new(RandomWalk));
        let mut world = world_with(player, vec![computer]);

        world.tick(Position::new(1000.0, 100.0));
        assert!(world.player().is_dead());
        // 13 segments drop 5 pellets; those at distance 0 and 6 from the head are eaten
        assert_eq!(world.foods().len(), 3);
        assert_eq!(world.player().target_length(), INITIAL_LENGTH + 2 * GROWTH_PER_FOOD);
        assert!(world.foods().iter().all(|f| f.position.distance(world.player().head()) >= EAT_DISTANCE));
    }

    #[test]
    fn test_retired_computer_keeps_eating() {
        let player = Snake::with_segments(body(Position::new(300.0, 300.0), 20), PLAYER_COLOR, Box::new(PointerSeeking));
        let doomed = Snake::with_segments(vec![Position::new(280.0, 301.0)], COMPUTER_COLOR, Box::new(RandomWalk));
        let safe = Snake::computer(Position::new(700.0, 50.0));
        let mut world = world_with(player, vec![doomed, safe]);

        world.tick(Position::new(300.0, 300.0));
        assert_eq!(world.retired().len(), 1);
        let corpse = &world.retired()[0];
        assert_eq!(corpse.id(), 1);
        // It ate the pellet dropped on its own head
        assert_eq!(corpse.target_length(), INITIAL_LENGTH + GROWTH_PER_FOOD);
        assert!(world.foods().is_empty());

        // A pellet landing next to the corpse on a later tick is eaten too
        let head = corpse.head();
        world.foods_mut().push(Food::new(Position::new(head.x, head.y + 3.0), FOOD_COLOR));
        world.tick(Position::new(300.0, 300.0));
        assert!(world.foods().is_empty());
        assert_eq!(world.retired()[0].target_length(), INITIAL_LENGTH + 2 * GROWTH_PER_FOOD);
        assert_eq!(world.retired()[0].head(), head);
    }

    #[test]
    fn test_retired_snakes_eat_in_id_order() {
        let player = Snake::player(Position::new(10.0, 10.0));
        let corpse = Snake::with_segments(vec![Position::new(400.0, 400.0)], COMPUTER_COLOR, Box::new(RandomWalk));
        // Heading east, the rival ends the step about 4 units from the pellet
        let rival = Snake::with_segments(vec![Position::new(394.0, 400.0)], COMPUTER_COLOR, Box::new(RandomWalk));
        let mut world = world_with(player, vec![corpse, rival]);
        world.computers[0].kill();
        world.retire_dead();
        assert_eq!(world.retired()[0].id(), 1);
        assert_eq!(world.computers()[0].id(), 2);

        // Both could reach the pellet; snake 1 comes first in the eat order
        world.foods_mut().push(Food::new(Position::new(400.0, 400.0), FOOD_COLOR));
        world.tick(Position::new(10.0, 10.0));
        assert!(world.foods().is_empty());
        assert_eq!(world.retired()[0].target_length(), INITIAL_LENGTH + GROWTH_PER_FOOD);
        assert_eq!(world.computers()[0].target_length(), INITIAL_LENGTH);
    }

    #[test]
    fn test_invariants_over_long_run() {
        let mut world = World::new(Recorder::default(), 600.0, 400.0, Some(1234));
        let mut lengths: Vec<usize> = Vec::new();
        for t in 0..2000 {
            let pointer = Position::new((t % 600) as f64, (t % 400) as f64);
            world.tick(pointer);

            let all = std::iter::once(world.player()).chain(world.computers().iter());
            for snake in all {
                assert!(snake.len() <= snake.target_length());
            }

            let current = world.player().target_length();
            if let Some(&last) = lengths.last() {
                assert!(current >= last);
                assert_eq!((current - INITIAL_LENGTH) % GROWTH_PER_FOOD, 0);
            }
            lengths.push(current);
        }
    }
}
