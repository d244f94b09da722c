//! Mock device implementations for hardware-free testing
//!
//! Each mock keeps its observable state behind `Arc<Mutex<..>>` so tests
//! hold a cloned handle while the component under test owns the device.

use crate::drivers::{Actuator, Clock, DebugSink, Frame, FrameSource, MotorLine, Side};
use crate::error::{DishaError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock motor actuator recording per-line duty cycles
#[derive(Clone)]
pub struct MockActuator {
    state: Arc<Mutex<MockActuatorState>>,
}

#[derive(Debug, Default)]
struct MockActuatorState {
    duties: HashMap<(Side, MotorLine), u8>,
    peaks: HashMap<(Side, MotorLine), u8>,
    stop_count: usize,
    fail: bool,
}

impl MockActuator {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockActuatorState::default())),
        }
    }

    /// Make subsequent calls fail with an actuation fault
    pub fn fail_next(&self, fail: bool) {
        self.state.lock().unwrap().fail = fail;
    }

    /// Current duty cycle on one line
    pub fn duty(&self, side: Side, line: MotorLine) -> u8 {
        *self
            .state
            .lock()
            .unwrap()
            .duties
            .get(&(side, line))
            .unwrap_or(&0)
    }

    /// Highest duty cycle ever set on one line
    pub fn peak(&self, side: Side, line: MotorLine) -> u8 {
        *self
            .state
            .lock()
            .unwrap()
            .peaks
            .get(&(side, line))
            .unwrap_or(&0)
    }

    /// True when every line currently sits at zero duty
    pub fn all_lines_zero(&self) -> bool {
        self.state.lock().unwrap().duties.values().all(|&d| d == 0)
    }

    pub fn stop_count(&self) -> usize {
        self.state.lock().unwrap().stop_count
    }
}

impl Default for MockActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuator for MockActuator {
    fn set_line(&mut self, side: Side, line: MotorLine, duty: u8) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail {
            return Err(DishaError::Actuation("mock driver fault".to_string()));
        }
        state.duties.insert((side, line), duty);
        let peak = state.peaks.entry((side, line)).or_insert(0);
        *peak = (*peak).max(duty);
        Ok(())
    }

    fn stop_all(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail {
            return Err(DishaError::Actuation("mock driver fault".to_string()));
        }
        for duty in state.duties.values_mut() {
            *duty = 0;
        }
        state.stop_count += 1;
        Ok(())
    }
}

/// Virtual clock recording requested sleeps without blocking
#[derive(Clone)]
pub struct MockClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps.lock().unwrap().iter().sum()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Mock frame source replaying a fixed frame
///
/// Optionally clears a shared running flag after a set number of captures,
/// which lets loop tests exercise the external-stop path.
pub struct MockFrameSource {
    frame: Frame,
    captures: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
    halt_after: Option<(usize, Arc<AtomicBool>)>,
}

impl MockFrameSource {
    /// Uniform mid-gray frame of the given size
    pub fn blank(width: u32, height: u32) -> Self {
        Self::with_frame(Frame::from_pixel(width, height, image::Luma([200u8])))
    }

    pub fn with_frame(frame: Frame) -> Self {
        Self {
            frame,
            captures: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicBool::new(false)),
            halt_after: None,
        }
    }

    /// Clear `flag` once `captures` frames have been served
    pub fn halt_after(mut self, captures: usize, flag: Arc<AtomicBool>) -> Self {
        self.halt_after = Some((captures, flag));
        self
    }

    /// Shared handle answering whether `release` was called
    pub fn released_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }

    /// Shared handle counting served frames
    pub fn captures_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.captures)
    }
}

impl FrameSource for MockFrameSource {
    fn capture(&mut self) -> Option<Frame> {
        let count = self.captures.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some((limit, flag)) = &self.halt_after {
            if count >= *limit {
                flag.store(false, Ordering::Relaxed);
            }
        }
        Some(self.frame.clone())
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::Relaxed);
    }
}

/// Debug sink recording labels instead of persisting frames
#[derive(Clone)]
pub struct RecordingDebugSink {
    labels: Arc<Mutex<Vec<String>>>,
}

impl RecordingDebugSink {
    pub fn new() -> Self {
        Self {
            labels: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }
}

impl Default for RecordingDebugSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugSink for RecordingDebugSink {
    fn save(&mut self, _image: &Frame, label: &str) {
        self.labels.lock().unwrap().push(label.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_actuator_records_peaks_and_stops() {
        let mut actuator = MockActuator::new();
        actuator
            .set_line(Side::Left, MotorLine::Forward, 40)
            .unwrap();
        actuator
            .set_line(Side::Left, MotorLine::Forward, 20)
            .unwrap();

        assert_eq!(actuator.duty(Side::Left, MotorLine::Forward), 20);
        assert_eq!(actuator.peak(Side::Left, MotorLine::Forward), 40);
        assert!(!actuator.all_lines_zero());

        actuator.stop_all().unwrap();
        assert!(actuator.all_lines_zero());
        assert_eq!(actuator.stop_count(), 1);
    }

    #[test]
    fn test_mock_frame_source_halts_flag() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut source = MockFrameSource::blank(8, 8).halt_after(2, Arc::clone(&flag));

        assert!(source.capture().is_some());
        assert!(flag.load(Ordering::Relaxed));
        assert!(source.capture().is_some());
        assert!(!flag.load(Ordering::Relaxed));

        let released = source.released_handle();
        source.release();
        assert!(released.load(Ordering::Relaxed));
    }

    #[test]
    fn test_mock_clock_accumulates() {
        let clock = MockClock::new();
        clock.sleep(Duration::from_millis(100));
        clock.sleep(Duration::from_millis(250));
        assert_eq!(clock.total_slept(), Duration::from_millis(350));
        assert_eq!(clock.sleeps().len(), 2);
    }
}
