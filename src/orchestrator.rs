//! Top-level control loop
//!
//! Owns one instance of each subsystem and drives the capture -> localize
//! -> plan -> act cycle from a single thread. Subsystems never call each
//! other; every cross-module hand-off happens here, so the whole data
//! flow is readable in one place.

use crate::config::DishaConfig;
use crate::drivers::{Actuator, Clock, DebugSink, FrameSource};
use crate::error::Result;
use crate::motion::MotionExecutor;
use crate::navigation::{NavigationPlanner, NavigationStatus};
use crate::vision::GridLocalizer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Control loop lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Stopped,
}

/// Session orchestrator
///
/// `running` is the only piece of state shared with other threads; a
/// signal handler clears it to request shutdown and the loop observes it
/// between commands, so the vehicle halts within one command duration.
pub struct Orchestrator<A: Actuator, C: Clock> {
    localizer: GridLocalizer,
    planner: NavigationPlanner,
    executor: MotionExecutor<A, C>,
    frames: Box<dyn FrameSource>,
    sink: Option<Box<dyn DebugSink>>,
    clock: C,
    running: Arc<AtomicBool>,
    state: RunState,
    tick_delay: Duration,
    command_pause: Duration,
}

impl<A: Actuator, C: Clock + Clone> Orchestrator<A, C> {
    /// Wire up all subsystems from one validated configuration.
    ///
    /// `running` is shared with the caller so an external signal handler
    /// can request shutdown.
    pub fn new(
        config: &DishaConfig,
        actuator: A,
        frames: Box<dyn FrameSource>,
        clock: C,
        running: Arc<AtomicBool>,
    ) -> Result<Self> {
        let planner = NavigationPlanner::new(&config.grid)?;
        let executor = MotionExecutor::new(actuator, clock.clone(), config.motion.clone());

        Ok(Self {
            localizer: GridLocalizer::new(config),
            planner,
            executor,
            frames,
            sink: None,
            clock,
            running,
            state: RunState::Idle,
            tick_delay: Duration::from_secs_f32(config.control.tick_delay_secs),
            command_pause: Duration::from_secs_f32(config.control.command_pause_secs),
        })
    }

    /// Attach a debug sink receiving one annotated frame per completed tick.
    pub fn with_debug_sink(mut self, sink: Box<dyn DebugSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Drive the traversal until it completes or shutdown is requested.
    ///
    /// On any exit path, including an actuation fault, the motors are
    /// stopped and the camera released before the result propagates.
    pub fn run(&mut self) -> Result<()> {
        if self.state == RunState::Stopped {
            log::warn!("Orchestrator: Already stopped, refusing to run");
            return Ok(());
        }

        self.state = RunState::Running;
        log::info!("Orchestrator: Traversal started");

        let result = self.run_loop();

        if let Err(e) = self.executor.stop() {
            log::error!("Orchestrator: Failed to stop motors on shutdown: {}", e);
        }
        self.frames.release();
        self.state = RunState::Stopped;

        let status = self.planner.status();
        log::info!(
            "Orchestrator: Traversal ended - {}/{} cells visited ({:.0}%)",
            status.visited,
            status.total,
            status.percent_complete
        );
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        while self.running.load(Ordering::Relaxed) && !self.planner.is_complete() {
            if self.state == RunState::Paused {
                self.clock.sleep(self.tick_delay);
                continue;
            }
            self.tick()?;
            self.clock.sleep(self.tick_delay);
        }
        Ok(())
    }

    /// One capture -> localize -> plan -> act cycle.
    ///
    /// A failed capture skips the tick instead of failing the run; the
    /// camera regularly drops frames during exposure adjustment.
    fn tick(&mut self) -> Result<()> {
        let frame = match self.frames.capture() {
            Some(frame) => frame,
            None => {
                log::warn!("Orchestrator: Frame capture failed, skipping tick");
                return Ok(());
            }
        };

        if let Some(coordinate) = self.localizer.locate(&frame) {
            self.planner.update_position(coordinate.row, coordinate.col);
        }

        if let Some(sink) = &mut self.sink {
            let label = format!("step_{}", self.planner.status().visited);
            sink.save(&frame, &label);
        }

        let target = match self.planner.next_target() {
            Some(target) => target,
            None => return Ok(()),
        };
        log::debug!(
            "Orchestrator: At {}, next target {}",
            self.planner.position(),
            target
        );

        for command in self.planner.commands_to(target) {
            // Re-check between commands so a shutdown request never has
            // to wait for the whole sequence
            if !self.running.load(Ordering::Relaxed) {
                break;
            }
            self.executor.execute(command)?;
            self.clock.sleep(self.command_pause);
        }
        Ok(())
    }

    /// Suspend command execution; capture and planning stay idle too.
    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
            log::info!("Orchestrator: Paused");
        }
    }

    /// Resume a paused traversal.
    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.state = RunState::Running;
            log::info!("Orchestrator: Resumed");
        }
    }

    /// Request shutdown; terminal, a stopped session never restarts.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        self.state = RunState::Stopped;
        log::info!("Orchestrator: Stop requested");
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Current traversal progress
    pub fn status(&self) -> NavigationStatus {
        self.planner.status()
    }
}
