use std::collections::HashSet;

use rand::Rng;

use crate::grid::{Grid, Vector2};
use crate::snake::Snake;

pub struct Food {
    position: Vector2,
}

impl Food {
    pub fn new(grid: Grid) -> Self {
        Food { position: grid.initial_food() }
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    /// Moves the food to a random cell not covered by the snake.
    ///
    /// Cells are sampled uniformly and rejected while they hit the snake, so
    /// this stays cheap as long as most of the board is free. When the snake
    /// covers every cell there is nowhere to go: the position is left alone
    /// and `false` is returned.
    #[must_use]
    pub fn respawn<R: Rng>(&mut self, snake: &Snake, grid: Grid, rng: &mut R) -> bool {
        let occupied: HashSet<Vector2> = snake
            .body()
            .iter()
            .copied()
            .filter(|cell| grid.contains(*cell))
            .collect();

        if occupied.len() >= grid.cell_count() {
            return false;
        }

        loop {
            let candidate = Vector2::new(rng.gen_range(0..grid.width), rng.gen_range(0..grid.height));
            if !occupied.contains(&candidate) {
                self.position = candidate;
                return true;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, position: Vector2) {
        self.position = position;
    }
}
