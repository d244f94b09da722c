//! Device implementations
//!
//! Real GPIO and camera drivers live outside this crate and plug in
//! through the `drivers` traits; the factories here wire up the
//! implementations this crate ships (mock devices, PNG debug store).

pub mod debug_store;
pub mod mock;

use crate::config::DishaConfig;
use crate::drivers::{Actuator, DebugSink, FrameSource};
use crate::error::{DishaError, Result};
use self::debug_store::DebugStore;
use self::mock::{MockActuator, MockFrameSource};

/// Create the actuator named by the configuration
pub fn create_actuator(config: &DishaConfig) -> Result<Box<dyn Actuator>> {
    match config.device.actuator.as_str() {
        "mock" => Ok(Box::new(MockActuator::new())),
        other => Err(DishaError::Config(format!("Unknown actuator: {}", other))),
    }
}

/// Create the frame source named by the configuration
pub fn create_frame_source(config: &DishaConfig) -> Result<Box<dyn FrameSource>> {
    match config.device.camera.as_str() {
        "mock" => Ok(Box::new(MockFrameSource::blank(
            config.camera.width,
            config.camera.height,
        ))),
        other => Err(DishaError::Config(format!(
            "Unknown frame source: {}",
            other
        ))),
    }
}

/// Create the debug sink when frame persistence is enabled
pub fn create_debug_sink(config: &DishaConfig) -> Result<Option<Box<dyn DebugSink>>> {
    if !config.debug.save_images {
        return Ok(None);
    }
    let store = DebugStore::new(config.debug.image_path.clone())?;
    Ok(Some(Box::new(store)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factories_accept_mock_and_reject_unknown() {
        let mut config = DishaConfig::default();
        assert!(create_actuator(&config).is_ok());
        assert!(create_frame_source(&config).is_ok());
        assert!(create_debug_sink(&config).unwrap().is_none());

        config.device.actuator = "gpio".to_string();
        assert!(matches!(
            create_actuator(&config),
            Err(DishaError::Config(_))
        ));
    }
}
