//! **mazegraph** is a maze graph library: carve spanning-tree mazes over a grid, punch loops into
//! them and find weighted routes through the result.

pub mod coordinates;
pub mod cycles;
pub mod errors;
pub mod generators;
pub mod graph;
pub mod grid_displays;
pub mod masks;
pub mod pathing;
pub mod priority_queue;
pub mod units;
mod utils;
