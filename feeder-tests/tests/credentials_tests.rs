//! Integration Tests für die WiFi-Zugangsdaten im Flash
//!
//! MockFlash verhält sich wie ein gelöschter NOR-Flash (alles 0xFF).

use embedded_storage::{ReadStorage, Storage};
use feeder_core::credentials::{self, MAX_PASSWORD_LEN, RECORD_MAGIC};
use feeder_core::{CredentialError, WifiCredentials};

const OFFSET: u32 = 0x9000;
const CAPACITY: usize = 0x10000;

// ============================================================================
// Mock Flash
// ============================================================================

#[derive(Debug, PartialEq)]
struct FlashError;

struct MockFlash {
    data: Vec<u8>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

impl MockFlash {
    fn erased() -> Self {
        Self {
            data: vec![0xFF; CAPACITY],
            fail_reads: false,
            fail_writes: false,
            writes: 0,
        }
    }

    fn bytes_at(&self, offset: u32, len: usize) -> &[u8] {
        let start = offset as usize;
        &self.data[start..start + len]
    }
}

impl ReadStorage for MockFlash {
    type Error = FlashError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        if self.fail_reads || start + bytes.len() > self.data.len() {
            return Err(FlashError);
        }
        bytes.copy_from_slice(&self.data[start..start + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

impl Storage for MockFlash {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        if self.fail_writes || start + bytes.len() > self.data.len() {
            return Err(FlashError);
        }
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_fresh_flash_is_not_initialized() {
    let mut flash = MockFlash::erased();
    assert_eq!(
        credentials::load(&mut flash, OFFSET),
        Err(CredentialError::NotInitialized)
    );
}

#[test]
fn test_provisioned_credentials_survive_reload() {
    let mut flash = MockFlash::erased();
    let creds = WifiCredentials::new("Katzenklappe", "miau-1234").unwrap();

    credentials::store(&mut flash, OFFSET, &creds).unwrap();

    assert_eq!(flash.writes, 1);
    assert_eq!(flash.bytes_at(OFFSET, 4), &RECORD_MAGIC);
    assert_eq!(credentials::load(&mut flash, OFFSET), Ok(creds));
}

#[test]
fn test_store_leaves_neighbouring_flash_untouched() {
    let mut flash = MockFlash::erased();
    let creds = WifiCredentials::new("home", "pw").unwrap();

    credentials::store(&mut flash, OFFSET, &creds).unwrap();

    assert!(flash.bytes_at(OFFSET - 16, 16).iter().all(|&b| b == 0xFF));
    let record_len = 4 + 1 + 4 + 1 + 2;
    assert!(
        flash
            .bytes_at(OFFSET + record_len as u32, 64)
            .iter()
            .all(|&b| b == 0xFF)
    );
}

#[test]
fn test_shorter_record_replaces_longer_one() {
    let mut flash = MockFlash::erased();
    let password = "x".repeat(MAX_PASSWORD_LEN);
    let long = WifiCredentials::new("a-very-long-network-name", &password).unwrap();
    let short = WifiCredentials::new("lan", "").unwrap();

    credentials::store(&mut flash, OFFSET, &long).unwrap();
    credentials::store(&mut flash, OFFSET, &short).unwrap();

    // Reste des alten Datensatzes liegen hinter dem Längenfeld und stören nicht
    assert_eq!(credentials::load(&mut flash, OFFSET), Ok(short));
}

#[test]
fn test_open_network_without_password() {
    let mut flash = MockFlash::erased();
    let creds = WifiCredentials::new("Gaeste", "").unwrap();

    credentials::store(&mut flash, OFFSET, &creds).unwrap();
    let loaded = credentials::load(&mut flash, OFFSET).unwrap();

    assert_eq!(loaded.ssid.as_str(), "Gaeste");
    assert!(loaded.password.is_empty());
}

#[test]
fn test_foreign_data_is_corrupt() {
    let mut flash = MockFlash::erased();
    // z.B. Reste einer ESP-IDF NVS-Seite
    flash.write(OFFSET, &[0xFE, 0xFF, 0xFF, 0xFF, 0x00, 0x12]).unwrap();

    assert_eq!(
        credentials::load(&mut flash, OFFSET),
        Err(CredentialError::Corrupt)
    );
}

#[test]
fn test_invalid_utf8_is_corrupt() {
    let mut flash = MockFlash::erased();
    let mut record = RECORD_MAGIC.to_vec();
    record.extend_from_slice(&[2, 0xC3, 0x28, 0]);
    flash.write(OFFSET, &record).unwrap();

    assert_eq!(
        credentials::load(&mut flash, OFFSET),
        Err(CredentialError::Corrupt)
    );
}

#[test]
fn test_read_failure_maps_to_storage_error() {
    let mut flash = MockFlash::erased();
    flash.fail_reads = true;

    assert_eq!(
        credentials::load(&mut flash, OFFSET),
        Err(CredentialError::Storage)
    );
}

#[test]
fn test_write_failure_maps_to_storage_error() {
    let mut flash = MockFlash::erased();
    flash.fail_writes = true;
    let creds = WifiCredentials::new("home", "secret").unwrap();

    assert_eq!(
        credentials::store(&mut flash, OFFSET, &creds),
        Err(CredentialError::Storage)
    );
    assert_eq!(
        credentials::load(&mut flash, OFFSET),
        Err(CredentialError::NotInitialized)
    );
}

#[test]
fn test_record_past_end_of_flash_fails() {
    let mut flash = MockFlash::erased();
    let offset = (CAPACITY - 8) as u32;

    assert_eq!(
        credentials::load(&mut flash, offset),
        Err(CredentialError::Storage)
    );
}
