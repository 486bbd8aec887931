pub mod app;
pub mod args;
pub mod logging;
pub mod renderer;
pub mod settings;
