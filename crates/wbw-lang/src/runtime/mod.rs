pub mod camera;
pub mod input;
pub mod interpreter;
pub mod physics;
pub mod state;
pub mod timers;
pub mod ui;
pub mod value;
