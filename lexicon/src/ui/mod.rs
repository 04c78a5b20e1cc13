//! UI module for the Lexicon TUI

pub mod render;
pub mod theme;
