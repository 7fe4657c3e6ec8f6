use log::{debug, info};
use rand::Rng;

use crate::snake::{Direction, Grid, Position, Worm};

pub const INITIAL_WORM_LENGTH: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoundState {
    Running,
    Over,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndCause {
    Wall,
    SelfBite,
}

/// One round of play: the worm, the apple and the per-tick rules.
pub struct RoundSimulator {
    grid: Grid,
    worm: Worm,
    apple: Position,
    state: RoundState,
    end_cause: Option<EndCause>,
    ticks: u64,
}

impl RoundSimulator {
    pub fn new<R: Rng + ?Sized>(grid: Grid, rng: &mut R) -> Self {
        let spawn = grid.random_spawn(rng);
        let worm = Worm::new(spawn, INITIAL_WORM_LENGTH, Direction::Right);
        let apple = grid.random_cell(rng);

        info!("Round start: head {:?}, apple {:?}", spawn, apple);
        Self::from_parts(grid, worm, apple)
    }

    pub fn from_parts(grid: Grid, worm: Worm, apple: Position) -> Self {
        RoundSimulator { grid, worm, apple, state: RoundState::Running, end_cause: None, ticks: 0 }
    }

    /// Advances the round by one cell.
    ///
    /// Collisions are judged on the head as it stood before this tick, so a
    /// move into a wall is only reported on the tick after it was made. The
    /// apple check uses that same head: eating skips the tail removal.
    pub fn tick<R: Rng + ?Sized>(&mut self, input: Option<Direction>, rng: &mut R) -> RoundState {
        if self.state == RoundState::Over {
            return RoundState::Over;
        }

        if let Some(dir) = input {
            self.worm.set_direction(dir);
        }

        let head = self.worm.head();
        let cause = if !self.grid.contains(head) {
            Some(EndCause::Wall)
        } else if self.worm.bites_itself() {
            Some(EndCause::SelfBite)
        } else {
            None
        };

        if let Some(cause) = cause {
            debug!("Collision ({:?}) at {:?}", cause, head);
            self.end_cause = Some(cause);
            self.state = RoundState::Over;
            return RoundState::Over;
        }

        let ate = head == self.apple;
        if ate {
            self.apple = self.grid.random_cell(rng);
            debug!("Apple eaten at {:?}, next apple {:?}", head, self.apple);
        }

        self.worm.advance(ate);
        self.ticks += 1;
        RoundState::Running
    }

    pub fn worm(&self) -> &Worm {
        &self.worm
    }

    pub fn apple(&self) -> Position {
        self.apple
    }

    pub fn direction(&self) -> Direction {
        self.worm.direction()
    }

    #[cfg(test)]
    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn end_cause(&self) -> Option<EndCause> {
        self.end_cause
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn score(&self) -> usize {
        self.worm.len().saturating_sub(INITIAL_WORM_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction::*;
    use crate::GridInt;
    use rand::{rngs::StdRng, SeedableRng};

    const GRID: Grid = Grid::new(32, 24);

    fn cells(list: &[(GridInt, GridInt)]) -> Vec<Position> {
        list.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    fn body(sim: &RoundSimulator) -> Vec<Position> {
        sim.worm().body().iter().copied().collect()
    }

    fn round(list: &[(GridInt, GridInt)], direction: Direction, apple: (GridInt, GridInt)) -> RoundSimulator {
        let worm = Worm::from_segments(cells(list), direction);
        RoundSimulator::from_parts(GRID, worm, Position::new(apple.0, apple.1))
    }

    #[test]
    fn plain_move_shifts_body() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = round(&[(5, 5), (4, 5), (3, 5)], Right, (6, 5));

        assert_eq!(sim.tick(None, &mut rng), RoundState::Running);
        assert_eq!(body(&sim), cells(&[(6, 5), (5, 5), (4, 5)]));
        assert_eq!(sim.apple(), Position::new(6, 5));
        assert_eq!(sim.score(), 0);
    }

    #[test]
    fn apple_under_head_grows_and_moves_apple() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut sim = round(&[(5, 5), (4, 5), (3, 5)], Right, (5, 5));

        assert_eq!(sim.tick(None, &mut rng), RoundState::Running);
        assert_eq!(body(&sim), cells(&[(6, 5), (5, 5), (4, 5), (3, 5)]));
        assert_eq!(sim.score(), 1);
        assert!(GRID.contains(sim.apple()));
    }

    #[test]
    fn resampled_apple_usually_moves() {
        let mut moved = 0;
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut sim = round(&[(5, 5), (4, 5), (3, 5)], Right, (5, 5));
            sim.tick(None, &mut rng);
            assert!(GRID.contains(sim.apple()));
            if sim.apple() != Position::new(5, 5) {
                moved += 1;
            }
        }
        assert!(moved >= 95, "apple stayed put in {} of 100 rounds", 100 - moved);
    }

    #[test]
    fn head_off_grid_ends_round_untouched() {
        let mut rng = StdRng::seed_from_u64(3);
        let starts: [(&[(GridInt, GridInt)], Direction); 4] = [
            (&[(-1, 3), (0, 3), (1, 3)], Left),
            (&[(32, 3), (31, 3), (30, 3)], Right),
            (&[(4, -1), (4, 0), (4, 1)], Up),
            (&[(4, 24), (4, 23), (4, 22)], Down),
        ];

        for (list, dir) in starts.iter() {
            let mut sim = round(list, *dir, (10, 10));
            assert_eq!(sim.tick(Some(Up), &mut rng), RoundState::Over);
            assert_eq!(body(&sim), cells(list));
            assert_eq!(sim.end_cause(), Some(EndCause::Wall));
            assert_eq!(sim.state(), RoundState::Over);
        }
    }

    #[test]
    fn wall_hit_is_reported_one_tick_late() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut sim = round(&[(31, 3), (30, 3), (29, 3)], Right, (0, 0));

        assert_eq!(sim.tick(None, &mut rng), RoundState::Running);
        assert_eq!(sim.worm().head(), Position::new(32, 3));
        assert_eq!(sim.tick(None, &mut rng), RoundState::Over);
        assert_eq!(sim.ticks(), 1);
    }

    #[test]
    fn self_bite_ends_round() {
        let mut rng = StdRng::seed_from_u64(5);
        let list = [(4, 5), (4, 4), (5, 4), (5, 5), (4, 5), (3, 5)];
        let mut sim = round(&list, Down, (10, 10));

        assert_eq!(sim.tick(None, &mut rng), RoundState::Over);
        assert_eq!(sim.end_cause(), Some(EndCause::SelfBite));
        assert_eq!(body(&sim), cells(&list));
    }

    #[test]
    fn over_is_sticky() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut sim = round(&[(-1, 3), (0, 3), (1, 3)], Left, (10, 10));
        assert_eq!(sim.tick(None, &mut rng), RoundState::Over);
        assert_eq!(sim.tick(Some(Down), &mut rng), RoundState::Over);
        assert_eq!(sim.direction(), Left);
    }

    #[test]
    fn reverse_input_is_ignored() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sim = round(&[(5, 5), (4, 5), (3, 5)], Right, (0, 0));

        sim.tick(Some(Left), &mut rng);
        assert_eq!(sim.direction(), Right);
        assert_eq!(sim.worm().head(), Position::new(6, 5));

        sim.tick(Some(Up), &mut rng);
        assert_eq!(sim.direction(), Up);
        assert_eq!(sim.worm().head(), Position::new(6, 4));
    }

    #[test]
    fn spawned_worm_fits_on_grid() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let sim = RoundSimulator::new(GRID, &mut rng);
            assert_eq!(sim.worm().len(), INITIAL_WORM_LENGTH);
            assert_eq!(sim.direction(), Right);
            assert!(sim.worm().body().iter().all(|p| GRID.contains(*p)));
            assert!(GRID.contains(sim.apple()));
            assert_eq!(sim.state(), RoundState::Running);
        }
    }

    #[test]
    fn random_play_keeps_length_and_heading_rules() {
        let dirs = [Up, Down, Left, Right];

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut sim = RoundSimulator::new(GRID, &mut rng);

            while sim.state() == RoundState::Running {
                let before_len = sim.worm().len();
                let before_dir = sim.direction();
                let input = if rng.gen_bool(0.3) {
                    Some(dirs[rng.gen_range(0..dirs.len())])
                } else {
                    None
                };

                let state = sim.tick(input, &mut rng);
                assert_ne!(sim.direction(), before_dir.opposite());

                let grown = sim.worm().len() - before_len;
                match state {
                    RoundState::Running => assert!(grown <= 1),
                    RoundState::Over => assert_eq!(grown, 0),
                }
                assert!(sim.ticks() < 10_000);
            }
        }
    }
}
