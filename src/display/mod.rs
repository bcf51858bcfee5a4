//! Display surfaces for pipeline state

mod logging;
mod surface;
mod terminal;

pub use logging::LoggingDisplay;
pub use surface::{DisplaySurface, FanoutDisplay, NoOpDisplay};
pub use terminal::TerminalDisplay;
