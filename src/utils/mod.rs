//! Small engine utilities: frame timing and FPS accounting.

pub mod fps_counter;
pub mod time;

pub use fps_counter::FpsCounter;
pub use time::Timer;
