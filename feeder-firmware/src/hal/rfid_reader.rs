// MFRC522 RFID-Leser über SPI
//
// Ablauf pro Poll: REQA (Karte im Feld?) → Select (Anticollision, UID lesen)
// → HLTA (Karte schlafen legen bis sie das Feld verlässt).

use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::Blocking;
use esp_hal::delay::Delay;
use esp_hal::gpio::Output;
use esp_hal::spi::master::Spi;
use feeder_core::{CardReader, PetId, RfidError};
use mfrc522::comm::blocking::spi::SpiInterface;
use mfrc522::{Initialized, Mfrc522};

/// SPI-Device mit eigenem Chip-Select
pub type RfidSpiDevice<'d> = ExclusiveDevice<Spi<'d, Blocking>, Output<'d>, Delay>;

pub struct Mfrc522Reader<'d> {
    reader: Mfrc522<SpiInterface<RfidSpiDevice<'d>>, Initialized>,
}

impl<'d> Mfrc522Reader<'d> {
    /// Initialisiert den Leser (Soft-Reset, Antenne an)
    pub fn new(spi: Spi<'d, Blocking>, cs: Output<'d>) -> Result<Self, RfidError> {
        let device = ExclusiveDevice::new(spi, cs, Delay::new()).map_err(|_| RfidError::Bus)?;
        let reader = Mfrc522::new(SpiInterface::new(device))
            .init()
            .map_err(|_| RfidError::Bus)?;
        Ok(Self { reader })
    }

    /// Versionsregister (0x91/0x92 bei echten Chips)
    pub fn version(&mut self) -> Result<u8, RfidError> {
        self.reader.version().map_err(|_| RfidError::Bus)
    }
}

impl<'d> CardReader for Mfrc522Reader<'d> {
    fn poll(&mut self) -> Result<Option<PetId>, RfidError> {
        let atqa = match self.reader.reqa() {
            Ok(atqa) => atqa,
            // Keine Karte im Feld
            Err(mfrc522::Error::Timeout) => return Ok(None),
            Err(_) => return Err(RfidError::Protocol),
        };

        let uid = self
            .reader
            .select(&atqa)
            .map_err(|_| RfidError::Protocol)?;
        // HLTA wird von Karten nicht bestätigt, Fehler hier sind normal
        let _ = self.reader.hlta();

        PetId::from_uid(uid.as_bytes())
            .map(Some)
            .ok_or(RfidError::InvalidUid)
    }
}
