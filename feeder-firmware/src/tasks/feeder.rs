// Feeder Task - Wägezelle + Servo: misst die Portion und füttert im Intervall
use defmt::{error, info, warn};
use embassy_time::{Delay, Duration, Instant, Timer};
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig};
use esp_hal::ledc::Ledc;
use esp_hal::peripherals::{GPIO20, GPIO21, GPIO22, LEDC};
use feeder_core::feeding::{DispensePlan, FeedSession, FeedStep, calibrate_portion};
use feeder_core::scale::{CALIBRATION_FACTOR, TARE_SAMPLES};
use feeder_core::schedule::{FEED_INTERVAL_MS, POLL_INTERVAL_MS};
use feeder_core::servo::SERVO_CLOSED_DEG;
use feeder_core::{Dispenser, FeedNotifier, FeedSchedule, LoadCell, Scale, ServoError};

use crate::SharedFeederState;
use crate::hal::{Hx711, LedcServo, servo_timer};
use crate::tasks::report::ChannelNotifier;

/// Feeder Task - läuft als Haupt-Logik des Futterautomaten
///
/// - Initialisiert HX711 und Servo (Klappe zu)
/// - Tariert die leere Schale
/// - Misst einmalig die Soll-Portion
/// - Prüft jede Sekunde ob gefüttert werden muss
#[embassy_executor::task]
pub async fn feeder_task(
    dout: GPIO22<'static>,
    sck: GPIO21<'static>,
    servo_pin: GPIO20<'static>,
    ledc: LEDC<'static>,
    notifier: ChannelNotifier,
    state: &'static SharedFeederState,
) {
    info!("Feeder: Task started");

    // HX711: DOUT wird vom Chip aktiv getrieben, SCK startet LOW (Chip an)
    let dout = Input::new(dout, InputConfig::default());
    let sck = Output::new(sck, Level::Low, OutputConfig::default());
    let mut scale = Scale::new(Hx711::new(dout, sck));
    scale.set_scale(CALIBRATION_FACTOR);

    // Servo: LEDC Timer + Kanal, Timer muss länger leben als der Kanal
    let mut ledc = Ledc::new(ledc);
    let timer = match servo_timer(&mut ledc) {
        Ok(timer) => timer,
        Err(e) => {
            error!("Feeder: LEDC timer setup failed: {}", e);
            return;
        }
    };
    let mut servo = match LedcServo::new(&ledc, &timer, servo_pin) {
        Ok(servo) => servo,
        Err(e) => {
            error!("Feeder: Servo channel setup failed: {}", e);
            return;
        }
    };

    run_feeder(&mut scale, &mut servo, notifier, state).await;
}

/// Geräte-Logik nach der Initialisierung
async fn run_feeder<L, S, N>(
    scale: &mut Scale<L>,
    servo: &mut S,
    mut notifier: N,
    state: &SharedFeederState,
) where
    L: LoadCell,
    S: Dispenser,
    N: FeedNotifier,
{
    let mut delay = Delay;

    if let Err(e) = close_gate(servo) {
        error!("Feeder: Could not close gate at start-up: {}", e);
    }

    info!("Feeder: Taring empty scale ({} samples)...", TARE_SAMPLES);
    match scale.tare(TARE_SAMPLES) {
        Ok(()) => info!("Feeder: Tare offset {}", scale.offset()),
        Err(e) => warn!("Feeder: Tare failed ({}), offset stays 0", e),
    }

    // Soll-Portion messen (wiederholen bis die Wägezelle antwortet)
    let desired_g = loop {
        info!("Feeder: Please place a full portion on the scale");
        match calibrate_portion(scale, &mut delay).await {
            Ok(desired_g) => break desired_g,
            Err(e) => {
                error!("Feeder: Portion calibration failed: {}", e);
                Timer::after(Duration::from_millis(u64::from(POLL_INTERVAL_MS))).await;
            }
        }
    };
    info!("Feeder: Desired portion is {} g", desired_g);
    state.lock(|s| s.borrow_mut().desired_g = Some(desired_g));

    let plan = DispensePlan::new(desired_g);
    let mut schedule = FeedSchedule::new(FEED_INTERVAL_MS);

    loop {
        // Wrapping u32-Uptime, FeedSchedule rechnet mit wrapping_sub
        let now_ms = Instant::now().as_millis() as u32;
        if schedule.is_due(now_ms) {
            info!("Feeder: Attempting to feed");
            feed_once(scale, servo, &mut delay, &mut notifier, plan, state).await;
            schedule.mark_fed(now_ms);
        }
        Timer::after(Duration::from_millis(u64::from(POLL_INTERVAL_MS))).await;
    }
}

/// Eine Fütterungs-Session mit Logging und Event-Eintrag
async fn feed_once<L, S, N>(
    scale: &mut Scale<L>,
    servo: &mut S,
    delay: &mut Delay,
    notifier: &mut N,
    plan: DispensePlan,
    state: &SharedFeederState,
) where
    L: LoadCell,
    S: Dispenser,
    N: FeedNotifier,
{
    let mut session = FeedSession::new(plan);
    let (outcome, aborted) = loop {
        match session.step(scale, servo, delay, notifier).await {
            Ok(FeedStep::Dispensed { weight_g, pulse }) => {
                info!(
                    "Feeder: {} g on scale, dispensing (pulse {})",
                    weight_g, pulse
                );
            }
            Ok(FeedStep::Done(outcome)) => break (outcome, false),
            Err(e) => {
                error!("Feeder: Feeding aborted: {}", e);
                break (session.outcome(), true);
            }
        }
    };

    if aborted {
        warn!(
            "Feeder: Session stopped after {} pulses (reported: {})",
            outcome.pulses, outcome.reported
        );
    } else if outcome.hopper_empty {
        warn!(
            "Feeder: Gave up after {} pulses at {} g, hopper empty or jammed?",
            outcome.pulses, outcome.final_weight_g
        );
    } else {
        info!(
            "Feeder: Desired food weight reached ({} g)",
            outcome.final_weight_g
        );
    }

    if let Some(event) = outcome.event(Instant::now().as_millis(), aborted) {
        state.lock(|s| s.borrow_mut().events.push(event));
    }
}

fn close_gate<S: Dispenser>(servo: &mut S) -> Result<(), ServoError> {
    servo.set_angle(SERVO_CLOSED_DEG)
}
