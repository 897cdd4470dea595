use std::collections::VecDeque;

use crate::grid::{Grid, Vector2};

const INITIAL_SNAKE_LENGTH: i32 = 3;

pub struct Snake {
    spawn: Vector2,
    body: VecDeque<Vector2>,
    velocity: Vector2,
    next_velocity: Vector2,
    grow_pending: u32,
}

impl Snake {
    /// Creates a snake already reset at `spawn`, heading right.
    pub fn new(spawn: Vector2) -> Self {
        let mut snake = Snake {
            spawn,
            body: VecDeque::new(),
            velocity: Vector2::RIGHT,
            next_velocity: Vector2::RIGHT,
            grow_pending: 0,
        };
        snake.reset();
        snake
    }

    pub fn reset(&mut self) {
        let spawn = self.spawn;
        self.body = (0..INITIAL_SNAKE_LENGTH)
            .map(|i| Vector2::new(spawn.x - i, spawn.y))
            .collect();
        self.velocity = Vector2::RIGHT;
        self.next_velocity = Vector2::RIGHT;
        self.grow_pending = 0;
    }

    /// Buffers a turn for the next `update()`. Reversals onto the neck and
    /// anything that isn't a unit vector are dropped.
    pub fn change_direction(&mut self, direction: Vector2) {
        if !direction.is_unit() || direction == -self.velocity {
            return;
        }
        self.next_velocity = direction;
    }

    pub fn update(&mut self) {
        self.velocity = self.next_velocity;

        let new_head = self.head() + self.velocity;
        self.body.push_front(new_head);

        if self.grow_pending > 0 {
            self.grow_pending -= 1;
        } else {
            self.body.pop_back();
        }
    }

    pub fn grow(&mut self) {
        self.grow_pending += 1;
    }

    pub fn check_collision(&self, grid: Grid) -> bool {
        let head = self.head();
        !grid.contains(head) || self.body.iter().skip(1).any(|segment| *segment == head)
    }

    pub fn head(&self) -> Vector2 {
        // body is never empty once reset() has run
        self.body[0]
    }

    pub fn body(&self) -> &VecDeque<Vector2> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn occupies(&self, cell: Vector2) -> bool {
        self.body.contains(&cell)
    }

    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    pub fn next_velocity(&self) -> Vector2 {
        self.next_velocity
    }

    pub fn grow_pending(&self) -> u32 {
        self.grow_pending
    }
}
