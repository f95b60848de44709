// Futter-Servo über LEDC PWM
//
// Standard-Servo: 50 Hz, 1-2 ms Puls. Der LEDC-Timer muss länger leben als
// der Kanal (beide liegen als Locals im feeder_task).

use esp_hal::ledc::channel::{self, ChannelHW, ChannelIFace};
use esp_hal::ledc::timer::{self, TimerIFace};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::time::Rate;
use feeder_core::servo::{SERVO_PWM_HZ, angle_to_duty};
use feeder_core::{Dispenser, ServoError};

use crate::config::SERVO_DUTY_BITS;

/// Konfiguriert LEDC Timer0 für 50 Hz / 14 Bit
pub fn servo_timer(
    ledc: &mut Ledc<'static>,
) -> Result<timer::Timer<'static, LowSpeed>, ServoError> {
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

    let mut timer0 = ledc.timer::<LowSpeed>(timer::Number::Timer0);
    timer0
        .configure(timer::config::Config {
            duty: timer::config::Duty::Duty14Bit,
            clock_source: timer::LSClockSource::APBClk,
            frequency: Rate::from_hz(SERVO_PWM_HZ),
        })
        .map_err(|_| ServoError::Setup)?;

    Ok(timer0)
}

/// Servo an einem LEDC Low-Speed Kanal
pub struct LedcServo<'a> {
    channel: channel::Channel<'a, LowSpeed>,
}

impl<'a> LedcServo<'a> {
    /// Verbindet Kanal 0 mit dem Servo-Pin
    pub fn new(
        ledc: &Ledc<'a>,
        timer: &'a timer::Timer<'a, LowSpeed>,
        pin: esp_hal::peripherals::GPIO20<'a>,
    ) -> Result<Self, ServoError> {
        let mut channel = ledc.channel(channel::Number::Channel0, pin);
        channel
            .configure(channel::config::Config {
                timer,
                duty_pct: 0,
                pin_config: channel::config::PinConfig::PushPull,
            })
            .map_err(|_| ServoError::Setup)?;

        Ok(Self { channel })
    }
}

impl<'a> Dispenser for LedcServo<'a> {
    fn set_angle(&mut self, degrees: u8) -> Result<(), ServoError> {
        if degrees > 180 {
            return Err(ServoError::DutyRejected);
        }
        self.channel.set_duty_hw(angle_to_duty(degrees, SERVO_DUTY_BITS));
        Ok(())
    }
}
