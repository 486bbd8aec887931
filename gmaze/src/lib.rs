pub mod algorithms;
pub mod array;
pub mod clock;
pub mod config;
pub mod dims;
pub mod grid;
pub mod maze;
pub mod progress;
pub mod registry;
pub mod solver;
