//! Servo-Positionen und PWM-Umrechnung
//!
//! Standard-Servos: 50 Hz PWM, 1 ms Puls = 0°, 2 ms Puls = 180°.

/// Servo-Winkel: Klappe offen (Futter fällt)
pub const SERVO_OPEN_DEG: u8 = 87;

/// Servo-Winkel: Klappe geschlossen
pub const SERVO_CLOSED_DEG: u8 = 7;

/// PWM-Frequenz für Standard-Servos
pub const SERVO_PWM_HZ: u32 = 50;

/// Rechnet einen Winkel (0-180°) in einen Duty-Wert bei `duty_bits` Auflösung um
///
/// Bei 20 ms Periode entspricht 1 ms = 5 % und 2 ms = 10 % Duty.
///
/// ```
/// # use feeder_core::servo::angle_to_duty;
/// // 14-Bit Auflösung (16384 Schritte)
/// assert_eq!(angle_to_duty(0, 14), 819);
/// assert_eq!(angle_to_duty(180, 14), 1638);
/// ```
pub fn angle_to_duty(degrees: u8, duty_bits: u8) -> u32 {
    let degrees = u32::from(degrees.min(180));
    let full_scale: u32 = 1 << duty_bits;
    let min_duty = full_scale / 20; // 5 %
    let max_duty = full_scale / 10; // 10 %

    min_duty + (degrees * (max_duty - min_duty)) / 180
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_to_duty_center() {
        assert_eq!(angle_to_duty(90, 14), 1228);
    }

    #[test]
    fn test_angle_to_duty_clamps() {
        assert_eq!(angle_to_duty(255, 14), angle_to_duty(180, 14));
    }

    #[test]
    fn test_open_is_wider_than_closed() {
        assert!(angle_to_duty(SERVO_OPEN_DEG, 14) > angle_to_duty(SERVO_CLOSED_DEG, 14));
    }
}
