//! Open-loop motion execution
//!
//! Converts abstract drive commands into calibrated, timed actuation.
//! Every duration-bearing command is synchronous: drive the sides, block
//! for the calibrated duration on the injected clock, stop, return. With
//! no encoders there is no feedback to justify overlapping motions.

use crate::config::MotionConfig;
use crate::drivers::{Actuator, Clock, MotorLine, Side, SideDirection};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Abstract drive commands
///
/// Commands carry no parameters; speed and duration are resolved from the
/// calibration profile at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveCommand {
    MoveForward,
    MoveBackward,
    TurnLeft90,
    TurnRight90,
    PivotLeft90,
    PivotRight90,
    Stop,
}

impl DriveCommand {
    /// Command name for logging
    pub fn name(self) -> &'static str {
        match self {
            DriveCommand::MoveForward => "move_forward",
            DriveCommand::MoveBackward => "move_backward",
            DriveCommand::TurnLeft90 => "turn_left",
            DriveCommand::TurnRight90 => "turn_right",
            DriveCommand::PivotLeft90 => "pivot_left",
            DriveCommand::PivotRight90 => "pivot_right",
            DriveCommand::Stop => "stop",
        }
    }
}

/// Motor driver wiring topology, fixed at startup.
///
/// Direct-PWM: all four direction lines carry their own variable duty
/// cycle. Shared-enable: one duty-bearing enable line per side (ENA/ENB
/// on an L298N-style board) plus two binary direction lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WiringTopology {
    #[default]
    DirectPwm,
    SharedEnable,
}

/// Motion executor state
pub struct MotionExecutor<A: Actuator, C: Clock> {
    actuator: A,
    clock: C,
    wiring: WiringTopology,
    config: MotionConfig,
}

impl<A: Actuator, C: Clock> MotionExecutor<A, C> {
    /// Create a new motion executor; the wiring topology is resolved here
    /// and never switched at runtime.
    pub fn new(actuator: A, clock: C, config: MotionConfig) -> Self {
        log::debug!(
            "MotionExecutor: Initialized ({:?}, forward={}%/{:.1}s, turn={}%/{:.1}s, pivot={:.1}s, reverse L/R={}/{})",
            config.wiring,
            config.forward_speed,
            config.forward_secs,
            config.turn_speed,
            config.turn_secs,
            config.pivot_secs,
            config.reverse_left,
            config.reverse_right,
        );

        Self {
            actuator,
            clock,
            wiring: config.wiring,
            config,
        }
    }

    /// Execute one drive command, blocking for its calibrated duration.
    ///
    /// Actuator faults propagate unchanged; a motion command is never
    /// retried because open-loop replay could double-execute a move.
    pub fn execute(&mut self, command: DriveCommand) -> Result<()> {
        use SideDirection::{Backward, Forward};

        match command {
            DriveCommand::MoveForward => self.timed(
                Forward,
                Forward,
                self.config.forward_speed,
                self.config.forward_secs,
                command,
            ),
            DriveCommand::MoveBackward => self.timed(
                Backward,
                Backward,
                self.config.forward_speed,
                self.config.backward_secs,
                command,
            ),
            // Tank turn: sides opposite, equal duty
            DriveCommand::TurnLeft90 => self.timed(
                Backward,
                Forward,
                self.config.turn_speed,
                self.config.turn_secs,
                command,
            ),
            DriveCommand::TurnRight90 => self.timed(
                Forward,
                Backward,
                self.config.turn_speed,
                self.config.turn_secs,
                command,
            ),
            // Pivot: same pattern as the tank turn, tighter calibrated duration
            DriveCommand::PivotLeft90 => self.timed(
                Backward,
                Forward,
                self.config.turn_speed,
                self.config.pivot_secs,
                command,
            ),
            DriveCommand::PivotRight90 => self.timed(
                Forward,
                Backward,
                self.config.turn_speed,
                self.config.pivot_secs,
                command,
            ),
            DriveCommand::Stop => self.stop(),
        }
    }

    /// Zero all duty cycles immediately; idempotent.
    pub fn stop(&mut self) -> Result<()> {
        self.actuator.stop_all()
    }

    fn timed(
        &mut self,
        left: SideDirection,
        right: SideDirection,
        duty: u8,
        secs: f32,
        command: DriveCommand,
    ) -> Result<()> {
        self.drive_side(Side::Left, left, duty)?;
        self.drive_side(Side::Right, right, duty)?;

        self.clock.sleep(Duration::from_secs_f32(secs));
        self.stop()?;

        log::info!(
            "MotionExecutor: {} complete ({}% duty, {:.2}s)",
            command.name(),
            duty,
            secs
        );
        Ok(())
    }

    fn drive_side(&mut self, side: Side, direction: SideDirection, duty: u8) -> Result<()> {
        let direction = self.resolve_polarity(side, direction);
        let (active, inactive) = match direction {
            SideDirection::Forward => (MotorLine::Forward, MotorLine::Backward),
            SideDirection::Backward => (MotorLine::Backward, MotorLine::Forward),
        };

        match self.wiring {
            // The complementary line is held at 0 so both directions of a
            // side are never driven simultaneously.
            WiringTopology::DirectPwm => {
                self.actuator.set_line(side, active, duty)?;
                self.actuator.set_line(side, inactive, 0)
            }
            // Speed lives on the enable line; direction lines are binary.
            WiringTopology::SharedEnable => {
                self.actuator.set_line(side, MotorLine::Enable, duty)?;
                self.actuator.set_line(side, active, 100)?;
                self.actuator.set_line(side, inactive, 0)
            }
        }
    }

    fn resolve_polarity(&self, side: Side, direction: SideDirection) -> SideDirection {
        let reversed = match side {
            Side::Left => self.config.reverse_left,
            Side::Right => self.config.reverse_right,
        };
        if reversed {
            match direction {
                SideDirection::Forward => SideDirection::Backward,
                SideDirection::Backward => SideDirection::Forward,
            }
        } else {
            direction
        }
    }
}
