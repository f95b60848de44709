//! Wägezellen-Kalibrierung (Tara + Skalierungsfaktor)
//!
//! Rechnet HX711-Rohwerte in Gramm um. Der Skalierungsfaktor wurde einmalig
//! mit Referenzgewichten bestimmt, der Tara-Offset wird bei jedem Start gemessen.

use embedded_hal_async::delay::DelayNs;

use crate::traits::{LoadCell, ScaleError};

/// Werkskalibrierung: Rohwert-Counts pro Gramm
pub const CALIBRATION_FACTOR: f32 = 332.3238;

/// Anzahl Messungen für die Tara beim Start
pub const TARE_SAMPLES: u8 = 10;

/// Pause zwischen Power-Down und Power-Up beim Aufwecken der Waage
pub const POWER_CYCLE_MS: u32 = 500;

/// Waage: Wägezelle plus Kalibrierung
pub struct Scale<L: LoadCell> {
    cell: L,
    offset: i32,
    factor: f32,
}

impl<L: LoadCell> Scale<L> {
    /// Erstellt eine unkalibrierte Waage (Offset 0, Faktor 1)
    pub fn new(cell: L) -> Self {
        Self {
            cell,
            offset: 0,
            factor: 1.0,
        }
    }

    /// Setzt den Skalierungsfaktor. Ein Faktor von 0 wird ignoriert.
    pub fn set_scale(&mut self, factor: f32) {
        if factor != 0.0 {
            self.factor = factor;
        }
    }

    pub fn scale_factor(&self) -> f32 {
        self.factor
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: i32) {
        self.offset = offset;
    }

    /// Mittelwert aus `times` Rohwerten (mindestens einer)
    pub fn read_average(&mut self, times: u8) -> Result<i32, ScaleError> {
        let times = times.max(1);
        let mut sum: i64 = 0;
        for _ in 0..times {
            sum += i64::from(self.cell.read_raw()?);
        }
        Ok((sum / i64::from(times)) as i32)
    }

    /// Nullt die Waage: aktueller Mittelwert wird zum Offset
    pub fn tare(&mut self, times: u8) -> Result<(), ScaleError> {
        self.offset = self.read_average(times)?;
        Ok(())
    }

    /// Rohwert abzüglich Tara
    pub fn get_value(&mut self, times: u8) -> Result<i32, ScaleError> {
        Ok(self.read_average(times)? - self.offset)
    }

    /// Gewicht in Gramm
    pub fn get_units(&mut self, times: u8) -> Result<f32, ScaleError> {
        Ok(self.get_value(times)? as f32 / self.factor)
    }

    /// Schaltet den ADC kurz aus und wieder ein
    ///
    /// Der HX711 liefert danach einen frisch eingeschwungenen Messwert.
    pub async fn power_cycle<D: DelayNs>(&mut self, delay: &mut D) {
        self.cell.power_down();
        delay.delay_ms(POWER_CYCLE_MS).await;
        self.cell.power_up();
    }

    /// Zugriff auf die Wägezelle (z.B. für Tests)
    pub fn cell(&self) -> &L {
        &self.cell
    }
}
