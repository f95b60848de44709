//! Integration Tests für Waage, Servo und Fütterungs-Session
//!
//! Diese Tests laufen auf dem Host (x86_64). Napf, Wägezelle und Servo sind
//! Mocks: jeder Öffnen-Puls des Servos legt eine feste Futtermenge in den Napf.

use std::cell::Cell;
use std::rc::Rc;

use embassy_futures::block_on;
use embedded_hal_async::delay::DelayNs;
use feeder_core::feeding::{DISPENSE_PULSE_MS, MAX_PULSES, calibrate_portion, dispense_pulse};
use feeder_core::scale::{CALIBRATION_FACTOR, POWER_CYCLE_MS, TARE_SAMPLES};
use feeder_core::schedule::{FEED_INTERVAL_MS, POLL_INTERVAL_MS};
use feeder_core::servo::{SERVO_CLOSED_DEG, SERVO_OPEN_DEG};
use feeder_core::{
    DispensePlan, Dispenser, FeedError, FeedNotifier, FeedSchedule, FeedSession, FeedStep,
    LoadCell, Scale, ScaleError, ServoError, attempt_feed,
};

// ============================================================================
// Mocks
// ============================================================================

/// Napf-Inhalt in Gramm, geteilt zwischen Wägezelle und Servo
#[derive(Clone, Default)]
struct Bowl(Rc<Cell<f32>>);

impl Bowl {
    fn with(grams: f32) -> Self {
        let bowl = Self::default();
        bowl.0.set(grams);
        bowl
    }

    fn grams(&self) -> f32 {
        self.0.get()
    }

    fn add(&self, grams: f32) {
        self.0.set(self.0.get() + grams);
    }
}

/// HX711-Mock: liefert Napf-Gewicht * Faktor + leere Schale als Rohwert
struct MockCell {
    bowl: Bowl,
    factor: f32,
    empty_raw: i32,
    fail: bool,
    reads: usize,
    power_downs: usize,
    power_ups: usize,
}

impl MockCell {
    fn new(bowl: Bowl, factor: f32, empty_raw: i32) -> Self {
        Self {
            bowl,
            factor,
            empty_raw,
            fail: false,
            reads: 0,
            power_downs: 0,
            power_ups: 0,
        }
    }
}

impl LoadCell for MockCell {
    fn read_raw(&mut self) -> Result<i32, ScaleError> {
        if self.fail {
            return Err(ScaleError::NotReady);
        }
        self.reads += 1;
        Ok(self.empty_raw + (self.bowl.grams() * self.factor) as i32)
    }

    fn power_down(&mut self) {
        self.power_downs += 1;
    }

    fn power_up(&mut self) {
        self.power_ups += 1;
    }
}

/// Servo-Mock: merkt sich alle Winkel, Öffnen füllt den Napf
struct MockServo {
    bowl: Bowl,
    grams_per_pulse: f32,
    angles: Vec<u8>,
    reject_open: bool,
    /// Klappe klemmt nach so vielen erfolgreichen Öffnungen
    opens_before_reject: Option<usize>,
}

impl MockServo {
    fn new(bowl: Bowl, grams_per_pulse: f32) -> Self {
        Self {
            bowl,
            grams_per_pulse,
            angles: Vec::new(),
            reject_open: false,
            opens_before_reject: None,
        }
    }

    fn open_count(&self) -> usize {
        self.angles.iter().filter(|&&a| a == SERVO_OPEN_DEG).count()
    }
}

impl Dispenser for MockServo {
    fn set_angle(&mut self, degrees: u8) -> Result<(), ServoError> {
        let jammed = self
            .opens_before_reject
            .is_some_and(|limit| self.open_count() >= limit);
        if degrees == SERVO_OPEN_DEG && (self.reject_open || jammed) {
            return Err(ServoError::DutyRejected);
        }
        self.angles.push(degrees);
        if degrees == SERVO_OPEN_DEG {
            self.bowl.add(self.grams_per_pulse);
        }
        Ok(())
    }
}

/// Delay-Mock: merkt sich die Wartezeiten statt zu schlafen
#[derive(Default)]
struct MockDelay {
    waits_ms: Vec<u32>,
}

impl MockDelay {
    fn total_ms(&self) -> u32 {
        self.waits_ms.iter().sum()
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.waits_ms.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

/// Notifier-Mock: zählt Meldungen, kann eine volle Queue simulieren
#[derive(Default)]
struct MockNotifier {
    notifications: usize,
    queue_full: bool,
}

impl FeedNotifier for MockNotifier {
    fn notify_feeding(&mut self) -> bool {
        self.notifications += 1;
        !self.queue_full
    }
}

/// Waage mit Werksfaktor, tariert auf den leeren Napf
fn calibrated_scale(bowl: &Bowl) -> Scale<MockCell> {
    let contents = bowl.grams();
    bowl.0.set(0.0);

    let mut scale = Scale::new(MockCell::new(bowl.clone(), CALIBRATION_FACTOR, 84_000));
    scale.set_scale(CALIBRATION_FACTOR);
    scale.tare(TARE_SAMPLES).unwrap();

    bowl.0.set(contents);
    scale
}

// ============================================================================
// Tests: Scale
// ============================================================================

#[test]
fn test_tare_then_units_in_grams() {
    let bowl = Bowl::default();
    let mut scale = calibrated_scale(&bowl);

    assert_eq!(scale.offset(), 84_000);
    assert_eq!(scale.cell().reads, usize::from(TARE_SAMPLES));

    bowl.add(25.0);
    let grams = scale.get_units(1).unwrap();
    assert!((grams - 25.0).abs() < 0.01, "got {grams}");
}

#[test]
fn test_zero_scale_factor_is_ignored() {
    let bowl = Bowl::default();
    let mut scale = calibrated_scale(&bowl);

    scale.set_scale(0.0);
    assert_eq!(scale.scale_factor(), CALIBRATION_FACTOR);
}

#[test]
fn test_power_cycle_waits_between_down_and_up() {
    let bowl = Bowl::default();
    let mut scale = calibrated_scale(&bowl);
    let mut delay = MockDelay::default();

    block_on(scale.power_cycle(&mut delay));

    assert_eq!(scale.cell().power_downs, 1);
    assert_eq!(scale.cell().power_ups, 1);
    assert_eq!(delay.total_ms(), POWER_CYCLE_MS);
}

// ============================================================================
// Tests: Portion-Kalibrierung
// ============================================================================

#[test]
fn test_calibrate_portion_reads_placed_portion() {
    let bowl = Bowl::default();
    let mut scale = calibrated_scale(&bowl);
    let mut delay = MockDelay::default();

    // Portion liegt bereits auf, wenn nach 2 s gemessen wird
    bowl.add(42.0);
    let desired = block_on(calibrate_portion(&mut scale, &mut delay)).unwrap();

    assert!((desired - 42.0).abs() < 0.01);
    assert_eq!(delay.waits_ms, vec![2000, 4000]);
}

#[test]
fn test_calibrate_portion_propagates_not_ready() {
    let mut delay = MockDelay::default();
    let mut failing = Scale::new(MockCell {
        fail: true,
        ..MockCell::new(Bowl::default(), 1.0, 0)
    });

    assert_eq!(
        block_on(calibrate_portion(&mut failing, &mut delay)),
        Err(ScaleError::NotReady)
    );
    // Die Settle-Pause entfällt nach einem Fehler
    assert_eq!(delay.total_ms(), 2000);
}

// ============================================================================
// Tests: Fütterungs-Session
// ============================================================================

#[test]
fn test_full_bowl_needs_no_pulse() {
    let bowl = Bowl::with(30.0);
    let mut scale = calibrated_scale(&bowl);
    let mut servo = MockServo::new(bowl.clone(), 10.0);
    let mut delay = MockDelay::default();
    let mut notifier = MockNotifier::default();

    let outcome = block_on(attempt_feed(
        &mut scale,
        &mut servo,
        &mut delay,
        &mut notifier,
        DispensePlan::new(30.0),
    ))
    .unwrap();

    assert_eq!(outcome.pulses, 0);
    assert!(!outcome.reported);
    assert!(!outcome.hopper_empty);
    assert_eq!(notifier.notifications, 0);
    assert!(servo.angles.is_empty());
    // auch ohne Puls wird die Wägezelle einmal aus- und eingeschaltet
    assert_eq!(scale.cell().power_downs, 1);
}

#[test]
fn test_dispenses_until_within_tolerance() {
    let bowl = Bowl::with(0.0);
    let mut scale = calibrated_scale(&bowl);
    let mut servo = MockServo::new(bowl.clone(), 10.0);
    let mut delay = MockDelay::default();
    let mut notifier = MockNotifier::default();

    let outcome = block_on(attempt_feed(
        &mut scale,
        &mut servo,
        &mut delay,
        &mut notifier,
        DispensePlan::new(30.0),
    ))
    .unwrap();

    // 0 g → 10 g → 20 g → 30 g: drei Pulse, 25 g wären schon genug
    assert_eq!(outcome.pulses, 3);
    assert!((outcome.final_weight_g - 30.0).abs() < 0.01);
    assert!(outcome.reported);
    assert_eq!(notifier.notifications, 1);
    assert_eq!(
        servo.angles,
        vec![
            SERVO_OPEN_DEG,
            SERVO_CLOSED_DEG,
            SERVO_OPEN_DEG,
            SERVO_CLOSED_DEG,
            SERVO_OPEN_DEG,
            SERVO_CLOSED_DEG
        ]
    );
    // 4 Messungen mit Power-Cycle + 3 Pulse
    assert_eq!(delay.total_ms(), 4 * POWER_CYCLE_MS + 3 * DISPENSE_PULSE_MS);
}

#[test]
fn test_within_tolerance_stops_early() {
    let bowl = Bowl::with(26.0);
    let mut scale = calibrated_scale(&bowl);
    let mut servo = MockServo::new(bowl.clone(), 10.0);
    let mut delay = MockDelay::default();
    let mut notifier = MockNotifier::default();

    let outcome = block_on(attempt_feed(
        &mut scale,
        &mut servo,
        &mut delay,
        &mut notifier,
        DispensePlan::new(30.0),
    ))
    .unwrap();

    assert_eq!(outcome.pulses, 0);
    assert_eq!(notifier.notifications, 0);
}

#[test]
fn test_empty_hopper_gives_up_after_max_pulses() {
    let bowl = Bowl::with(0.0);
    let mut scale = calibrated_scale(&bowl);
    let mut servo = MockServo::new(bowl.clone(), 0.0);
    let mut delay = MockDelay::default();
    let mut notifier = MockNotifier::default();

    let outcome = block_on(attempt_feed(
        &mut scale,
        &mut servo,
        &mut delay,
        &mut notifier,
        DispensePlan::new(30.0),
    ))
    .unwrap();

    assert!(outcome.hopper_empty);
    assert_eq!(outcome.pulses, MAX_PULSES);
    assert_eq!(servo.open_count(), usize::from(MAX_PULSES));
    assert_eq!(servo.angles.last(), Some(&SERVO_CLOSED_DEG));
    // trotz 40 Pulsen genau eine Meldung
    assert_eq!(notifier.notifications, 1);
}

#[test]
fn test_full_queue_marks_feeding_unreported() {
    let bowl = Bowl::with(0.0);
    let mut scale = calibrated_scale(&bowl);
    let mut servo = MockServo::new(bowl.clone(), 20.0);
    let mut delay = MockDelay::default();
    let mut notifier = MockNotifier {
        queue_full: true,
        ..Default::default()
    };

    let outcome = block_on(attempt_feed(
        &mut scale,
        &mut servo,
        &mut delay,
        &mut notifier,
        DispensePlan::new(30.0),
    ))
    .unwrap();

    assert_eq!(outcome.pulses, 2);
    assert!(!outcome.reported);
    assert_eq!(notifier.notifications, 1);
}

#[test]
fn test_scale_error_aborts_without_moving_servo() {
    let bowl = Bowl::with(0.0);
    let mut scale = Scale::new(MockCell {
        fail: true,
        ..MockCell::new(bowl.clone(), 1.0, 0)
    });
    let mut servo = MockServo::new(bowl, 10.0);
    let mut delay = MockDelay::default();
    let mut notifier = MockNotifier::default();

    let result = block_on(attempt_feed(
        &mut scale,
        &mut servo,
        &mut delay,
        &mut notifier,
        DispensePlan::new(30.0),
    ));

    assert_eq!(result, Err(FeedError::Scale(ScaleError::NotReady)));
    assert!(servo.angles.is_empty());
    assert_eq!(notifier.notifications, 0);
}

#[test]
fn test_servo_failure_mid_session_keeps_sent_report() {
    let bowl = Bowl::with(0.0);
    let mut scale = calibrated_scale(&bowl);
    let mut servo = MockServo::new(bowl.clone(), 10.0);
    servo.opens_before_reject = Some(1);
    let mut delay = MockDelay::default();
    let mut notifier = MockNotifier::default();
    let mut session = FeedSession::new(DispensePlan::new(30.0));

    let result = block_on(session.run(&mut scale, &mut servo, &mut delay, &mut notifier));

    assert_eq!(result, Err(FeedError::Servo(ServoError::DutyRejected)));
    assert_eq!(notifier.notifications, 1);
    // zweites Öffnen scheiterte, Klappe wurde trotzdem geschlossen
    assert_eq!(servo.angles.last(), Some(&SERVO_CLOSED_DEG));

    let outcome = session.outcome();
    assert_eq!(outcome.pulses, 1);
    assert!(outcome.reported);

    let event = outcome.event(20_000, true).unwrap();
    assert_eq!(event.pulses, 1);
    assert!(event.reported);
    assert!(event.aborted);
}

#[test]
fn test_rejected_open_still_closes_gate() {
    let bowl = Bowl::with(0.0);
    let mut servo = MockServo::new(bowl, 10.0);
    servo.reject_open = true;
    let mut delay = MockDelay::default();

    let result = block_on(dispense_pulse(&mut servo, &mut delay, DISPENSE_PULSE_MS));

    assert_eq!(result, Err(ServoError::DutyRejected));
    assert_eq!(servo.angles, vec![SERVO_CLOSED_DEG]);
    assert_eq!(delay.total_ms(), 0);
}

#[test]
fn test_session_steps_report_weight_and_pulse() {
    let bowl = Bowl::with(5.0);
    let mut scale = calibrated_scale(&bowl);
    let mut servo = MockServo::new(bowl.clone(), 10.0);
    let mut delay = MockDelay::default();
    let mut notifier = MockNotifier::default();
    let mut session = FeedSession::new(DispensePlan::new(19.0));

    let mut step = || block_on(session.step(&mut scale, &mut servo, &mut delay, &mut notifier));

    match step().unwrap() {
        FeedStep::Dispensed { weight_g, pulse } => {
            assert!((weight_g - 5.0).abs() < 0.01);
            assert_eq!(pulse, 1);
        }
        other => panic!("expected a pulse, got {other:?}"),
    }

    // 15 g + 5 g Toleranz erreicht die Soll-Portion von 19 g
    let second = step().unwrap();
    assert!(matches!(second, FeedStep::Done(outcome) if outcome.pulses == 1));
    assert_eq!(session.outcome().pulses, 1);
}

// ============================================================================
// Tests: Zeitplan
// ============================================================================

#[test]
fn test_schedule_feeds_once_per_interval() {
    let mut schedule = FeedSchedule::new(FEED_INTERVAL_MS);
    let mut feeds = Vec::new();

    // 65 s Uptime im 1-s-Takt der Hauptschleife
    for tick in 0..=65 {
        let now = tick * POLL_INTERVAL_MS;
        if schedule.is_due(now) {
            schedule.mark_fed(now);
            feeds.push(now);
        }
    }

    assert_eq!(feeds, vec![20_000, 40_000, 60_000]);
}
