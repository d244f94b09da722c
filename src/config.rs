//! Configuration loading for DishaNav
//!
//! All calibration values live in one TOML file loaded once at startup.
//! Every component receives the sections it needs by reference at
//! construction, so tests can inject alternate calibration values.

use crate::error::{DishaError, Result};
use crate::motion::WiringTopology;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DishaConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Grid dimensions of the navigable surface
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GridConfig {
    /// Number of grid rows (default: 4)
    #[serde(default = "default_rows")]
    pub rows: u32,

    /// Number of grid columns (default: 5)
    #[serde(default = "default_cols")]
    pub cols: u32,
}

/// Camera frame geometry
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CameraConfig {
    /// Frame width in pixels (default: 640)
    #[serde(default = "default_frame_width")]
    pub width: u32,

    /// Frame height in pixels (default: 480)
    #[serde(default = "default_frame_height")]
    pub height: u32,
}

/// Grid detection tuning
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VisionConfig {
    /// Minimum grid line length in pixels (default: 50)
    #[serde(default = "default_min_line_length")]
    pub min_line_length: u32,

    /// Minimum distance between distinct intersections in pixels (default: 8.0)
    #[serde(default = "default_dedup_distance")]
    pub dedup_distance_px: f32,

    /// Raw intersection count above which de-duplication kicks in (default: 40)
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: usize,

    /// Y tolerance when clustering intersections into rows (default: 10)
    #[serde(default = "default_row_tolerance")]
    pub row_tolerance_px: u32,
}

/// Motion calibration profile
///
/// Speeds are PWM duty-cycle percentages; durations come from physical
/// calibration runs, not geometry. Wheel slip and gearbox backlash make
/// analytic timing unreliable on the 1:120 geared motors.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MotionConfig {
    /// Duty cycle for forward/backward movement (default: 35)
    #[serde(default = "default_forward_speed")]
    pub forward_speed: u8,

    /// Duty cycle for turning in place (default: 25)
    #[serde(default = "default_turn_speed")]
    pub turn_speed: u8,

    /// Seconds to travel one grid cell forward (default: 8.0)
    #[serde(default = "default_forward_secs")]
    pub forward_secs: f32,

    /// Seconds for a backward nudge (default: 1.0)
    #[serde(default = "default_backward_secs")]
    pub backward_secs: f32,

    /// Seconds for a calibrated 90° tank turn (default: 2.0)
    #[serde(default = "default_turn_secs")]
    pub turn_secs: f32,

    /// Seconds for a calibrated 90° pivot (default: 1.5)
    #[serde(default = "default_pivot_secs")]
    pub pivot_secs: f32,

    /// Swap forward/backward lines on the left side (lead polarity fix)
    #[serde(default)]
    pub reverse_left: bool,

    /// Swap forward/backward lines on the right side (lead polarity fix)
    #[serde(default)]
    pub reverse_right: bool,

    /// Motor driver wiring topology (default: direct-pwm)
    #[serde(default)]
    pub wiring: WiringTopology,
}

/// Device implementation selection
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Actuator implementation ("mock"; real GPIO drivers plug in externally)
    #[serde(default = "default_device")]
    pub actuator: String,

    /// Frame source implementation ("mock"; real camera plugs in externally)
    #[serde(default = "default_device")]
    pub camera: String,
}

/// Control loop pacing
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ControlConfig {
    /// Delay between control-loop ticks in seconds (default: 0.1)
    #[serde(default = "default_tick_delay")]
    pub tick_delay_secs: f32,

    /// Settle pause between consecutive motion commands (default: 0.2)
    #[serde(default = "default_command_pause")]
    pub command_pause_secs: f32,
}

/// Debug artifact output
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DebugConfig {
    /// Persist intermediate and annotated frames (default: false)
    #[serde(default)]
    pub save_images: bool,

    /// Directory for persisted frames (default: /tmp/disha-images)
    #[serde(default = "default_image_path")]
    pub image_path: String,
}

/// Logging configuration
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_rows() -> u32 {
    4
}
fn default_cols() -> u32 {
    5
}
fn default_frame_width() -> u32 {
    640
}
fn default_frame_height() -> u32 {
    480
}
fn default_min_line_length() -> u32 {
    50
}
fn default_dedup_distance() -> f32 {
    8.0
}
fn default_dedup_threshold() -> usize {
    40
}
fn default_row_tolerance() -> u32 {
    10
}
fn default_forward_speed() -> u8 {
    35
}
fn default_turn_speed() -> u8 {
    25
}
fn default_forward_secs() -> f32 {
    8.0
}
fn default_backward_secs() -> f32 {
    1.0
}
fn default_turn_secs() -> f32 {
    2.0
}
fn default_pivot_secs() -> f32 {
    1.5
}
fn default_device() -> String {
    "mock".to_string()
}
fn default_tick_delay() -> f32 {
    0.1
}
fn default_command_pause() -> f32 {
    0.2
}
fn default_image_path() -> String {
    "/tmp/disha-images".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: default_frame_width(),
            height: default_frame_height(),
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            min_line_length: default_min_line_length(),
            dedup_distance_px: default_dedup_distance(),
            dedup_threshold: default_dedup_threshold(),
            row_tolerance_px: default_row_tolerance(),
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            forward_speed: default_forward_speed(),
            turn_speed: default_turn_speed(),
            forward_secs: default_forward_secs(),
            backward_secs: default_backward_secs(),
            turn_secs: default_turn_secs(),
            pivot_secs: default_pivot_secs(),
            reverse_left: false,
            reverse_right: false,
            wiring: WiringTopology::default(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            actuator: default_device(),
            camera: default_device(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            tick_delay_secs: default_tick_delay(),
            command_pause_secs: default_command_pause(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            save_images: false,
            image_path: default_image_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for DishaConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            camera: CameraConfig::default(),
            vision: VisionConfig::default(),
            motion: MotionConfig::default(),
            device: DeviceConfig::default(),
            control: ControlConfig::default(),
            debug: DebugConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DishaConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DishaError::Config(format!("Failed to read config file: {}", e)))?;
        let config: DishaConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check configuration consistency; violations are fatal at startup.
    pub fn validate(&self) -> Result<()> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(DishaError::Config(format!(
                "Grid dimensions must be non-zero (got {}x{})",
                self.grid.rows, self.grid.cols
            )));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(DishaError::Config(format!(
                "Frame dimensions must be non-zero (got {}x{})",
                self.camera.width, self.camera.height
            )));
        }
        if self.motion.forward_speed > 100 || self.motion.turn_speed > 100 {
            return Err(DishaError::Config(format!(
                "Duty cycles must be 0-100 (forward={}, turn={})",
                self.motion.forward_speed, self.motion.turn_speed
            )));
        }
        for (name, secs) in [
            ("forward_secs", self.motion.forward_secs),
            ("backward_secs", self.motion.backward_secs),
            ("turn_secs", self.motion.turn_secs),
            ("pivot_secs", self.motion.pivot_secs),
        ] {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(DishaError::Config(format!(
                    "Motion duration {} must be positive (got {})",
                    name, secs
                )));
            }
        }
        if self.vision.min_line_length == 0 {
            return Err(DishaError::Config(
                "min_line_length must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DishaConfig::default();
        assert_eq!(config.grid.rows, 4);
        assert_eq!(config.grid.cols, 5);
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.motion.forward_speed, 35);
        assert_eq!(config.motion.turn_secs, 2.0);
        assert_eq!(config.motion.wiring, WiringTopology::DirectPwm);
        assert!(!config.motion.reverse_left);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = DishaConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[grid]"));
        assert!(toml_string.contains("[motion]"));
        assert!(toml_string.contains("wiring = \"direct-pwm\""));

        let parsed: DishaConfig = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed.grid.cols, config.grid.cols);
        assert_eq!(parsed.motion.turn_speed, config.motion.turn_speed);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_content = r#"
[grid]
rows = 3
cols = 3

[motion]
turn_secs = 1.8
wiring = "shared-enable"
reverse_left = true
"#;

        let config: DishaConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.grid.rows, 3);
        assert_eq!(config.motion.turn_secs, 1.8);
        assert_eq!(config.motion.wiring, WiringTopology::SharedEnable);
        assert!(config.motion.reverse_left);
        // Untouched sections keep defaults
        assert_eq!(config.motion.forward_secs, 8.0);
        assert_eq!(config.camera.height, 480);
        assert_eq!(config.vision.min_line_length, 50);
    }

    #[test]
    fn test_validate_rejects_zero_grid() {
        let mut config = DishaConfig::default();
        config.grid.rows = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_duty_cycle() {
        let mut config = DishaConfig::default();
        config.motion.forward_speed = 150;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nonpositive_duration() {
        let mut config = DishaConfig::default();
        config.motion.turn_secs = 0.0;
        assert!(config.validate().is_err());
    }
}
