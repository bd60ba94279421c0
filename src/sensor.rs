//! Platform sensor backend.
//!
//! On this platform no sensor sources are exposed, so the backend reports
//! every sensor as unavailable and every operation is a no-op. The surface is
//! kept so callers can be written against it unconditionally.

use log::trace;

use crate::audio::math::vec3::Vec3;

/// The sensors a platform backend may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorType {
    Accelerometer,
    Gyroscope,
    Magnetometer,
    Gravity,
    UserAcceleration,
    Orientation,
}

impl SensorType {
    pub const ALL: [SensorType; 6] = [
        SensorType::Accelerometer,
        SensorType::Gyroscope,
        SensorType::Magnetometer,
        SensorType::Gravity,
        SensorType::UserAcceleration,
        SensorType::Orientation,
    ];
}

/// Sensor backend for platforms without sensor support.
#[derive(Debug, Default)]
pub struct SensorBackend {
    _priv: (),
}

impl SensorBackend {
    /// Prepares the backend for use. Nothing to do here.
    pub fn initialize() -> Self {
        trace!("sensor backend initialized (no sensors on this platform)");
        Self { _priv: () }
    }

    /// Releases backend resources. Nothing to do here.
    pub fn cleanup(&mut self) {}

    /// No sensor is available on this platform.
    pub fn is_available(&self, _sensor: SensorType) -> bool {
        false
    }

    /// Opening always fails since no sensor is available.
    pub fn open(&mut self, _sensor: SensorType) -> bool {
        false
    }

    pub fn close(&mut self, _sensor: SensorType) {}

    /// Reads the latest sensor value; always the zero vector here.
    pub fn update(&mut self, _sensor: SensorType) -> Vec3 {
        Vec3::ZERO
    }

    pub fn set_enabled(&mut self, _sensor: SensorType, _enabled: bool) {}
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn no_sensor_is_available() {
        let mut backend = SensorBackend::initialize();

        for sensor in SensorType::ALL {
            assert!(!backend.is_available(sensor));
            assert!(!backend.open(sensor));
        }
    }

    #[test]
    fn update_returns_zero() {
        let mut backend = SensorBackend::initialize();

        backend.set_enabled(SensorType::Accelerometer, true);
        let value = backend.update(SensorType::Accelerometer);
        assert_eq!(value, Vec3::ZERO);

        backend.close(SensorType::Accelerometer);
        backend.cleanup();
    }
}
