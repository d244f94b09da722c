//! DishaNav - Vision-guided grid navigation for a differential-drive robot
//!
//! The robot traverses a floor grid painted with dark lines. A downward
//! camera localizes the vehicle on the grid, a planner walks a snake
//! coverage order over the cells, and an open-loop motion executor turns
//! abstract drive commands into calibrated, timed motor actuation.
//!
//! Hardware plugs in through the traits in [`drivers`]; the crate ships
//! mock devices for hardware-free testing.

pub mod config;
pub mod devices;
pub mod drivers;
pub mod error;
pub mod grid;
pub mod motion;
pub mod navigation;
pub mod orchestrator;
pub mod vision;

// Re-export commonly used types
pub use config::DishaConfig;
pub use error::{DishaError, Result};
pub use grid::{GridCoordinate, Orientation};
pub use motion::{DriveCommand, MotionExecutor, WiringTopology};
pub use navigation::{NavigationPlanner, NavigationStatus};
pub use orchestrator::{Orchestrator, RunState};
pub use vision::GridLocalizer;
