//! Hardware collaborator traits
//!
//! The core never touches GPIO pins or the camera stack directly. Real
//! hardware implementations live outside this crate and plug in through
//! these traits; `devices::mock` provides hardware-free stand-ins.

use crate::error::Result;
use std::time::Duration;

/// Camera frame raster: single-channel 8-bit intensity.
pub type Frame = image::GrayImage;

/// Drive side of the differential chassis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// One output line of a side's motor driver stage.
///
/// Direct-PWM wiring uses `Forward`/`Backward` as duty-bearing lines;
/// shared-enable wiring carries the duty on `Enable` and drives
/// `Forward`/`Backward` as binary direction lines (0 or 100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorLine {
    Forward,
    Backward,
    Enable,
}

/// Rotation sense of one drive side, in vehicle-relative terms.
///
/// Polarity inversion is resolved above the [`Actuator`] primitive, so
/// implementations never reason about per-wheel lead polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideDirection {
    Forward,
    Backward,
}

/// Minimal motor actuation primitive
pub trait Actuator: Send {
    /// Set the duty cycle (0-100) on one output line of one side.
    fn set_line(&mut self, side: Side, line: MotorLine, duty: u8) -> Result<()>;

    /// Zero all duty cycles on both sides immediately.
    fn stop_all(&mut self) -> Result<()>;
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn set_line(&mut self, side: Side, line: MotorLine, duty: u8) -> Result<()> {
        (**self).set_line(side, line, duty)
    }

    fn stop_all(&mut self) -> Result<()> {
        (**self).stop_all()
    }
}

/// Camera frame supplier
pub trait FrameSource: Send {
    /// Capture one frame; `None` on transient capture failure.
    fn capture(&mut self) -> Option<Frame>;

    /// Release the underlying sensor.
    fn release(&mut self);
}

/// Fire-and-forget store for operator-inspectable debug frames.
///
/// Implementations log their own failures; saving never affects navigation.
pub trait DebugSink: Send {
    fn save(&mut self, image: &Frame, label: &str);
}

/// Time source for duration-bounded actuation
///
/// Injected so motion tests run against a virtual clock instead of
/// wall-clock sleeps.
pub trait Clock: Send {
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
