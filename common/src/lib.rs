//! A knowledge-based Minesweeper agent.
//!
//! The agent turns `(cell, nearby mine count)` observations into sentences of
//! the form "exactly `count` of these cells are mines", combines them, and
//! reports which unprobed cells are provably safe or provably mines.

pub mod cell;
pub mod error;
pub mod game;
pub mod knowledge;
pub mod sentence;

pub use cell::{Bounds, Cell};
pub use error::KnowledgeError;
pub use game::Minesweeper;
pub use knowledge::KnowledgeBase;
pub use sentence::Sentence;
