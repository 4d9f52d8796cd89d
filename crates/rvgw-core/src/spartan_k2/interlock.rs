//! Spartan K2 safety-interlock evaluation. Thresholds and violation
//! messages are carried over verbatim from the chassis OEM's own
//! validators.

pub struct BrakeReading {
    pub brake_pressure: f64,
    pub abs_active: bool,
    pub vehicle_speed: f64,
    pub parking_brake: bool,
    pub engine_running: bool,
}

pub struct SuspensionReading {
    pub front_level: f64,
    pub rear_level: f64,
    pub air_pressure: f64,
    pub leveling_active: bool,
    pub vehicle_speed: f64,
}

pub struct SteeringReading {
    pub ps_pressure: f64,
    pub steering_angle: f64,
    pub vehicle_speed: f64,
}

pub fn evaluate_brake_interlock(reading: &BrakeReading) -> Vec<String> {
    let mut violations = Vec::new();
    if reading.brake_pressure < 80.0 {
        violations.push("Low brake pressure detected - system safety compromised".to_string());
    }
    if !reading.abs_active && reading.vehicle_speed > 5.0 {
        violations.push("ABS system inactive at speed - safety concern".to_string());
    }
    if !reading.parking_brake && !reading.engine_running {
        violations.push("Parking brake not engaged with engine off".to_string());
    }
    violations
}

pub fn evaluate_suspension_interlock(reading: &SuspensionReading) -> Vec<String> {
    let mut violations = Vec::new();
    if (reading.front_level - reading.rear_level).abs() > 15.0 {
        violations.push("Chassis level differential exceeds safe limits".to_string());
    }
    if reading.air_pressure < 100.0 {
        violations.push("Insufficient air pressure for suspension operation".to_string());
    }
    if reading.leveling_active && reading.vehicle_speed > 0.5 {
        violations.push("Leveling system active while vehicle in motion".to_string());
    }
    violations
}

pub fn evaluate_steering_interlock(reading: &SteeringReading) -> Vec<String> {
    let mut violations = Vec::new();
    if reading.ps_pressure < 1000.0 {
        violations.push("Low power steering pressure - steering assistance compromised".to_string());
    }
    if reading.steering_angle.abs() > 720.0 {
        violations.push("Excessive steering angle detected".to_string());
    }
    if reading.vehicle_speed > 50.0 && reading.steering_angle.abs() > 180.0 {
        violations.push("High-speed operation with significant steering input".to_string());
    }
    violations
}

/// Groups the three chassis-system validators behind one entry point, the
/// way a caller iterating decoded Spartan K2 messages wants to use them.
pub struct SafetyInterlock;

impl SafetyInterlock {
    pub fn validate_brakes(reading: &BrakeReading) -> Vec<String> {
        evaluate_brake_interlock(reading)
    }

    pub fn validate_suspension(reading: &SuspensionReading) -> Vec<String> {
        evaluate_suspension_interlock(reading)
    }

    pub fn validate_steering(reading: &SteeringReading) -> Vec<String> {
        evaluate_steering_interlock(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_brake_pressure_is_flagged() {
        let reading = BrakeReading {
            brake_pressure: 60.0,
            abs_active: true,
            vehicle_speed: 0.0,
            parking_brake: true,
            engine_running: true,
        };
        let violations = evaluate_brake_interlock(&reading);
        assert_eq!(violations, vec!["Low brake pressure detected - system safety compromised"]);
    }

    #[test]
    fn healthy_brake_reading_has_no_violations() {
        let reading = BrakeReading {
            brake_pressure: 110.0,
            abs_active: true,
            vehicle_speed: 20.0,
            parking_brake: false,
            engine_running: true,
        };
        assert!(evaluate_brake_interlock(&reading).is_empty());
    }

    #[test]
    fn leveling_while_moving_is_flagged() {
        let reading = SuspensionReading {
            front_level: 0.0,
            rear_level: 0.0,
            air_pressure: 120.0,
            leveling_active: true,
            vehicle_speed: 3.0,
        };
        let violations = evaluate_suspension_interlock(&reading);
        assert_eq!(violations, vec!["Leveling system active while vehicle in motion"]);
    }

    #[test]
    fn high_speed_steering_input_is_flagged() {
        let reading = SteeringReading {
            ps_pressure: 1500.0,
            steering_angle: 200.0,
            vehicle_speed: 60.0,
        };
        let violations = evaluate_steering_interlock(&reading);
        assert_eq!(violations, vec!["High-speed operation with significant steering input"]);
    }
}
