//! Pothole Scout Library
//!
//! Desktop wiring and runners for the detection session: pick the
//! collaborators, drive the engine, and report to a person or a script.

pub mod desktop;
pub mod headless;
pub mod interactive;

// Re-export main entry points
pub use desktop::RunOptions;
pub use headless::run_headless;
pub use interactive::run_interactive;
