use std::ops::{Add, Neg, Sub};

pub const DEFAULT_GRID_SIZE: i32 = 20;

/// Integer cell coordinate, also used as a per-tick velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vector2 {
    pub x: i32,
    pub y: i32,
}

impl Vector2 {
    pub const UP: Vector2 = Vector2 { x: 0, y: -1 };
    pub const DOWN: Vector2 = Vector2 { x: 0, y: 1 };
    pub const LEFT: Vector2 = Vector2 { x: -1, y: 0 };
    pub const RIGHT: Vector2 = Vector2 { x: 1, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Vector2 { x, y }
    }

    /// True for the four axis-aligned unit vectors.
    pub fn is_unit(&self) -> bool {
        self.x.abs() + self.y.abs() == 1
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

/// The play field: cells `[0, width) x [0, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Grid { width, height }
    }

    pub fn square(size: i32) -> Self {
        Grid::new(size, size)
    }

    pub fn contains(&self, cell: Vector2) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }

    /// Where the snake's head is placed on reset.
    pub fn spawn_point(&self) -> Vector2 {
        Vector2::new(self.width / 2, self.height / 2)
    }

    /// Food position before the first respawn.
    pub fn initial_food(&self) -> Vector2 {
        Vector2::new(self.width * 3 / 4, self.height / 2)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::square(DEFAULT_GRID_SIZE)
    }
}
