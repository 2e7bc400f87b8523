//! Text rendering for the terminal.
//!
//! Pure functions that turn outcomes, code and menus into printable text.

pub mod render;

pub use render::*;
