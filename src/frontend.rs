use anyhow::Result;

use crate::food::Food;
use crate::grid::Grid;
use crate::snake::Snake;

/// Read-only view of the board handed to the renderer.
pub struct Scene<'a> {
    pub grid: Grid,
    pub food: &'a Food,
    pub snake: &'a Snake,
}

/// Everything the game session draws on or shows to the player.
///
/// `render` repaints the whole board (clear, food, then snake); the other
/// methods drive the score readouts and the message overlay.
pub trait Frontend {
    fn render(&mut self, scene: &Scene) -> Result<()>;
    fn set_score(&mut self, score: u32) -> Result<()>;
    fn set_high_score(&mut self, high_score: u32) -> Result<()>;
    fn show_overlay(&mut self, title: &str, message: &str, action: &str) -> Result<()>;
    fn hide_overlay(&mut self) -> Result<()>;
}
