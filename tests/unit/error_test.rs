//! Tests for error types

use station_queue::core::{ProtocolViolation, StationError};

#[test]
fn test_lifecycle_errors() {
    assert_eq!(
        StationError::InvalidConfig("pumps must be greater than 0".into()).to_string(),
        "invalid configuration: pumps must be greater than 0"
    );
    assert_eq!(StationError::EmptyLine.to_string(), "cannot start a run with an empty line");
    assert_eq!(StationError::AlreadyRunning.to_string(), "station is already running");
    assert_eq!(StationError::NotRunning.to_string(), "station is not running");
    assert_eq!(
        StationError::StillRunning.to_string(),
        "results are unavailable while the station is running"
    );
}

#[test]
fn test_head_mismatch() {
    let err = ProtocolViolation::HeadMismatch {
        expected: 2,
        actual: 5,
    };
    assert_eq!(
        err.to_string(),
        "head mismatch: car 5 acted out of turn while car 2 is head"
    );
}

#[test]
fn test_release_violations() {
    let foreign = ProtocolViolation::ReleaseByNonOccupant {
        pump: 1,
        car: 3,
        occupant: 4,
    };
    assert_eq!(foreign.to_string(), "pump 1 released by car 3 but held by car 4");

    let free = ProtocolViolation::ReleaseOfFreePump { pump: 0, car: 7 };
    assert_eq!(free.to_string(), "car 7 released pump 0 which is not occupied");
}

#[test]
fn test_occupancy_violations() {
    let double = ProtocolViolation::DoubleOccupancy {
        car: 1,
        held: 0,
        pump: 2,
    };
    assert_eq!(
        double.to_string(),
        "car 1 already holds pump 0 and tried to occupy pump 2"
    );

    let missing = ProtocolViolation::NotOccupant { pump: 2, car: 1 };
    assert_eq!(missing.to_string(), "car 1 advanced the line without occupying pump 2");
}
