//! Terminal snake: the game core (`snake`, `food`, `game`) plus the
//! collaborators it talks to (`frontend`, `input`, `storage`, `term`).

pub mod config;
pub mod food;
pub mod frontend;
pub mod game;
pub mod grid;
pub mod input;
pub mod snake;
pub mod storage;
pub mod term;
