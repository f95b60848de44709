//! Portions-Kalibrierung und Futter-Ausgabe
//!
//! Eine Fütterung läuft als Session: Waage lesen, Waage aufwecken, und solange
//! weniger als die Soll-Portion im Napf liegt, einen Servo-Puls ausgeben.
//! Beim ersten Puls einer Session wird genau eine Meldung an den Server abgesetzt.

use embedded_hal_async::delay::DelayNs;

use crate::scale::Scale;
use crate::servo::{SERVO_CLOSED_DEG, SERVO_OPEN_DEG};
use crate::traits::{Dispenser, FeedNotifier, LoadCell, ScaleError, ServoError};
use crate::types::FeedingEvent;

/// Toleranz in Gramm, ab der der Napf als voll gilt
pub const TOLERANCE_G: f32 = 5.0;

/// Dauer eines Ausgabe-Pulses (Klappe offen)
pub const DISPENSE_PULSE_MS: u32 = 500;

/// Maximale Pulse pro Session bevor der Vorrat als leer gilt
pub const MAX_PULSES: u16 = 40;

/// Wartezeit bis die Portion auf der Waage liegt
pub const PLACE_PORTION_MS: u32 = 2000;

/// Wartezeit nach der Portions-Messung
pub const SETTLE_MS: u32 = 4000;

/// Fehler während einer Fütterung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedError {
    Scale(ScaleError),
    Servo(ServoError),
}

impl From<ScaleError> for FeedError {
    fn from(e: ScaleError) -> Self {
        FeedError::Scale(e)
    }
}

impl From<ServoError> for FeedError {
    fn from(e: ServoError) -> Self {
        FeedError::Servo(e)
    }
}

/// Parameter einer Fütterung
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispensePlan {
    pub desired_g: f32,
    pub tolerance_g: f32,
    pub pulse_ms: u32,
    pub max_pulses: u16,
}

impl DispensePlan {
    pub fn new(desired_g: f32) -> Self {
        Self {
            desired_g,
            tolerance_g: TOLERANCE_G,
            pulse_ms: DISPENSE_PULSE_MS,
            max_pulses: MAX_PULSES,
        }
    }

    /// Liegt weniger als die Soll-Portion (abzüglich Toleranz) im Napf?
    pub fn needs_food(&self, current_g: f32) -> bool {
        current_g + self.tolerance_g < self.desired_g
    }
}

/// Ergebnis einer Fütterung
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeedOutcome {
    pub pulses: u16,
    pub final_weight_g: f32,
    pub reported: bool,
    pub hopper_empty: bool,
}

impl FeedOutcome {
    /// Event-Log-Eintrag für diese Session
    ///
    /// `None` wenn weder ein Puls ausgegeben noch eine Meldung abgesetzt wurde.
    /// Auch abgebrochene Sessions mit Meldung landen im Log, damit das Log zu
    /// den Meldungen am Server passt.
    pub fn event(&self, uptime_ms: u64, aborted: bool) -> Option<FeedingEvent> {
        if self.pulses == 0 && !self.reported {
            return None;
        }
        Some(FeedingEvent {
            uptime_ms,
            pulses: self.pulses,
            final_weight_g: self.final_weight_g,
            reported: self.reported,
            hopper_empty: self.hopper_empty,
            aborted,
        })
    }
}

/// Ein Schritt der Fütterungs-Session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedStep {
    /// Ein Puls wurde ausgegeben
    Dispensed { weight_g: f32, pulse: u16 },
    /// Session beendet
    Done(FeedOutcome),
}

/// Zustand einer laufenden Fütterung
pub struct FeedSession {
    plan: DispensePlan,
    outcome: FeedOutcome,
}

impl FeedSession {
    pub fn new(plan: DispensePlan) -> Self {
        Self {
            plan,
            outcome: FeedOutcome::default(),
        }
    }

    pub fn outcome(&self) -> FeedOutcome {
        self.outcome
    }

    /// Führt einen Mess- und ggf. Ausgabe-Schritt aus
    pub async fn step<L, S, D, N>(
        &mut self,
        scale: &mut Scale<L>,
        servo: &mut S,
        delay: &mut D,
        notifier: &mut N,
    ) -> Result<FeedStep, FeedError>
    where
        L: LoadCell,
        S: Dispenser,
        D: DelayNs,
        N: FeedNotifier,
    {
        let weight_g = scale.get_units(1)?;
        self.outcome.final_weight_g = weight_g;

        scale.power_cycle(delay).await;

        if !self.plan.needs_food(weight_g) {
            return Ok(FeedStep::Done(self.outcome));
        }
        if self.outcome.pulses >= self.plan.max_pulses {
            self.outcome.hopper_empty = true;
            return Ok(FeedStep::Done(self.outcome));
        }

        if self.outcome.pulses == 0 {
            self.outcome.reported = notifier.notify_feeding();
        }

        dispense_pulse(servo, delay, self.plan.pulse_ms).await?;
        self.outcome.pulses += 1;

        Ok(FeedStep::Dispensed {
            weight_g,
            pulse: self.outcome.pulses,
        })
    }

    /// Schritte bis zum Ende der Session
    ///
    /// Bei einem Fehler bleibt der bisherige Stand über `outcome()` abrufbar.
    pub async fn run<L, S, D, N>(
        &mut self,
        scale: &mut Scale<L>,
        servo: &mut S,
        delay: &mut D,
        notifier: &mut N,
    ) -> Result<FeedOutcome, FeedError>
    where
        L: LoadCell,
        S: Dispenser,
        D: DelayNs,
        N: FeedNotifier,
    {
        loop {
            if let FeedStep::Done(outcome) = self.step(scale, servo, delay, notifier).await? {
                return Ok(outcome);
            }
        }
    }
}

/// Misst die Soll-Portion: Portion auflegen, messen, kurz warten
pub async fn calibrate_portion<L: LoadCell, D: DelayNs>(
    scale: &mut Scale<L>,
    delay: &mut D,
) -> Result<f32, ScaleError> {
    delay.delay_ms(PLACE_PORTION_MS).await;
    let desired_g = scale.get_units(1)?;
    delay.delay_ms(SETTLE_MS).await;
    Ok(desired_g)
}

/// Öffnet die Klappe für `pulse_ms` und schließt sie wieder
///
/// Schlägt das Öffnen fehl, wird trotzdem versucht die Klappe zu schließen.
pub async fn dispense_pulse<S: Dispenser, D: DelayNs>(
    servo: &mut S,
    delay: &mut D,
    pulse_ms: u32,
) -> Result<(), ServoError> {
    if let Err(e) = servo.set_angle(SERVO_OPEN_DEG) {
        let _ = servo.set_angle(SERVO_CLOSED_DEG);
        return Err(e);
    }
    delay.delay_ms(pulse_ms).await;
    servo.set_angle(SERVO_CLOSED_DEG)
}

/// Komplette Fütterung bis die Soll-Portion erreicht ist
pub async fn attempt_feed<L, S, D, N>(
    scale: &mut Scale<L>,
    servo: &mut S,
    delay: &mut D,
    notifier: &mut N,
    plan: DispensePlan,
) -> Result<FeedOutcome, FeedError>
where
    L: LoadCell,
    S: Dispenser,
    D: DelayNs,
    N: FeedNotifier,
{
    FeedSession::new(plan)
        .run(scale, servo, delay, notifier)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_food_with_tolerance() {
        let plan = DispensePlan::new(50.0);
        assert!(plan.needs_food(40.0));
        assert!(!plan.needs_food(45.0)); // 45 + 5 ist nicht < 50
        assert!(!plan.needs_food(60.0));
    }

    #[test]
    fn test_event_only_for_real_feedings() {
        assert_eq!(FeedOutcome::default().event(1000, false), None);

        let reported = FeedOutcome {
            reported: true,
            ..Default::default()
        };
        let event = reported.event(1000, true).unwrap();
        assert_eq!((event.pulses, event.reported, event.aborted), (0, true, true));

        let fed = FeedOutcome {
            pulses: 3,
            final_weight_g: 48.0,
            ..Default::default()
        };
        assert_eq!(fed.event(2000, false).map(|e| e.pulses), Some(3));
    }

    #[test]
    fn test_plan_defaults() {
        let plan = DispensePlan::new(12.5);
        assert_eq!(plan.pulse_ms, 500);
        assert_eq!(plan.max_pulses, 40);
        assert_eq!(plan.tolerance_g, 5.0);
    }
}
