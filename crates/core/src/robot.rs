//! Robot classification, operational status and telemetry validation.

use crate::error::CoreError;

define_text_enum! {
    /// Kind of robot in the fleet.
    RobotType {
        /// Autonomous mobile robot.
        Amr = "amr",
        /// Automated guided vehicle.
        Agv = "agv",
        Drone = "drone",
        /// Stationary robotic arm.
        Arm = "arm",
        Humanoid = "humanoid",
    }
}

define_text_enum! {
    /// Operational status reported by (or set for) a robot.
    RobotStatus {
        Idle = "idle",
        Active = "active",
        Charging = "charging",
        Maintenance = "maintenance",
        Offline = "offline",
        Error = "error",
    }
}

impl Default for RobotType {
    fn default() -> Self {
        RobotType::Amr
    }
}

impl Default for RobotStatus {
    fn default() -> Self {
        RobotStatus::Offline
    }
}

/// Maximum length of a robot display name.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a serial number.
pub const MAX_SERIAL_LEN: usize = 50;

/// Maximum length of a firmware version string.
pub const MAX_FIRMWARE_LEN: usize = 50;

/// Validate a robot name: non-blank, at most [`MAX_NAME_LEN`] characters.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Robot name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Robot name must not exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a serial number: non-blank, no whitespace, bounded length.
pub fn validate_serial_number(serial: &str) -> Result<(), CoreError> {
    if serial.is_empty() {
        return Err(CoreError::Validation(
            "Serial number must not be empty".into(),
        ));
    }
    if serial.chars().count() > MAX_SERIAL_LEN {
        return Err(CoreError::Validation(format!(
            "Serial number must not exceed {MAX_SERIAL_LEN} characters"
        )));
    }
    if serial.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(
            "Serial number must not contain whitespace".into(),
        ));
    }
    Ok(())
}

pub fn validate_firmware_version(version: Option<&str>) -> Result<(), CoreError> {
    match version {
        Some(v) if v.chars().count() > MAX_FIRMWARE_LEN => Err(CoreError::Validation(format!(
            "Firmware version must not exceed {MAX_FIRMWARE_LEN} characters"
        ))),
        _ => Ok(()),
    }
}

/// Battery level is a percentage in `0.0..=100.0`.
pub fn validate_battery_level(level: Option<f64>) -> Result<(), CoreError> {
    match level {
        Some(l) if !(0.0..=100.0).contains(&l) => Err(CoreError::Validation(format!(
            "Battery level must be between 0 and 100, got {l}"
        ))),
        _ => Ok(()),
    }
}

/// Heading is in degrees, `0.0..360.0`.
pub fn validate_heading(heading: Option<f64>) -> Result<(), CoreError> {
    match heading {
        Some(h) if !(0.0..360.0).contains(&h) => Err(CoreError::Validation(format!(
            "Heading must be in [0, 360), got {h}"
        ))),
        _ => Ok(()),
    }
}

/// Coordinates must be finite numbers when present.
pub fn validate_coordinates(coords: &[Option<f64>]) -> Result<(), CoreError> {
    if coords.iter().flatten().any(|c| !c.is_finite()) {
        return Err(CoreError::Validation(
            "Coordinates must be finite numbers".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn defaults_match_schema() {
        assert_eq!(RobotType::default(), RobotType::Amr);
        assert_eq!(RobotStatus::default(), RobotStatus::Offline);
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in RobotStatus::ALL {
            let parsed: RobotStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, *status);
        }
    }

    #[test]
    fn unknown_type_is_a_validation_error() {
        assert_matches!(
            RobotType::try_from("forklift".to_string()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn status_converts_from_owned_string() {
        assert_eq!(
            RobotStatus::try_from("error".to_string()).unwrap(),
            RobotStatus::Error
        );
        assert_matches!(
            RobotStatus::try_from("rebooting".to_string()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("Atlas-01").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn serial_rules() {
        assert!(validate_serial_number("AMR-2024-0001").is_ok());
        assert!(validate_serial_number("").is_err());
        assert!(validate_serial_number("AMR 1").is_err());
    }

    #[test]
    fn battery_bounds_are_inclusive() {
        assert!(validate_battery_level(Some(0.0)).is_ok());
        assert!(validate_battery_level(Some(100.0)).is_ok());
        assert!(validate_battery_level(None).is_ok());
        assert!(validate_battery_level(Some(100.5)).is_err());
        assert!(validate_battery_level(Some(-1.0)).is_err());
    }

    #[test]
    fn heading_excludes_full_turn() {
        assert!(validate_heading(Some(359.9)).is_ok());
        assert!(validate_heading(Some(360.0)).is_err());
    }

    #[test]
    fn coordinates_must_be_finite() {
        assert!(validate_coordinates(&[Some(1.0), None, Some(-3.5)]).is_ok());
        assert!(validate_coordinates(&[Some(f64::NAN)]).is_err());
    }
}
