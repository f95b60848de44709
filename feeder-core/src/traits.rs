//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Hardware-Zugriff
//! ohne konkrete Implementierung. Die Firmware implementiert sie für
//! ESP32-C6 Peripherals, die Tests mit In-Memory Mocks.

use rgb::RGB8;

use crate::types::PetId;

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    WriteFailed,
}

/// Fehler-Typ für Wägezellen-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScaleError {
    /// DOUT ging nicht rechtzeitig auf LOW (HX711 nicht bereit / nicht angeschlossen)
    NotReady,
}

/// Fehler-Typ für Servo-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoError {
    /// PWM-Timer oder Kanal ließ sich nicht konfigurieren
    Setup,
    /// Winkel außerhalb 0-180°
    DutyRejected,
}

/// Fehler-Typ für den RFID-Leser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RfidError {
    /// SPI-Transfer zum Leser fehlgeschlagen
    Bus,
    /// Karte antwortete, aber Anticollision/Select schlug fehl
    Protocol,
    /// UID hat keine gültige Länge (4, 7 oder 10 Bytes)
    InvalidUid,
}

/// Fehler-Typ für den Lichtsensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    ReadFailed,
}

/// Trait für SmartLED Hardware-Zugriff
///
/// Abstrahiert den Zugriff auf RGB LEDs (WS2812/Neopixel).
///
/// # Implementierungen
/// - **Production:** RmtLedWriter (ESP32 RMT Peripheral)
/// - **Testing:** MockLedWriter (in-memory Mock)
pub trait SmartLedWriter: Send {
    /// Schreibt eine RGB-Farbe auf die LED
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn write(&mut self, color: RGB8) -> Result<(), LedError>;
}

/// Trait für Wägezellen-ADCs (HX711)
///
/// # Implementierungen
/// - **Production:** Hx711 (bit-banged DOUT/SCK)
/// - **Testing:** MockLoadCell (feste Rohwerte)
pub trait LoadCell {
    /// Liest einen vorzeichenbehafteten 24-Bit Rohwert
    fn read_raw(&mut self) -> Result<i32, ScaleError>;

    /// Versetzt den ADC in den Power-Down Modus
    fn power_down(&mut self);

    /// Weckt den ADC wieder auf
    fn power_up(&mut self);
}

/// Trait für den Futter-Servo
pub trait Dispenser {
    /// Fährt den Servo auf den angegebenen Winkel (0-180°)
    fn set_angle(&mut self, degrees: u8) -> Result<(), ServoError>;
}

/// Trait für den RFID-Leser (MFRC522)
pub trait CardReader {
    /// Prüft ob eine Karte im Feld ist
    ///
    /// Gibt `Ok(None)` zurück wenn keine Karte antwortet.
    fn poll(&mut self) -> Result<Option<PetId>, RfidError>;
}

/// Trait für den analogen Lichtsensor (Fotowiderstand am ADC)
pub trait LightSensor {
    /// Liest einen 12-Bit ADC-Wert (0-4095)
    fn read(&mut self) -> Result<u16, SensorError>;
}

/// Senke für Fütterungs-Meldungen an den Server
///
/// Die Firmware reicht die Meldung über einen Channel an den Report-Task weiter.
pub trait FeedNotifier {
    /// Meldet eine Fütterung. Gibt `false` zurück wenn die Meldung verworfen wurde.
    fn notify_feeding(&mut self) -> bool;
}

/// Senke für Scan-Meldungen der RFID-Station
pub trait ScanNotifier {
    /// Meldet einen Scan. Gibt `false` zurück wenn die Meldung verworfen wurde.
    fn notify_scan(&mut self, pet_id: &PetId) -> bool;
}
