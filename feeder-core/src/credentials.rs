//! WiFi-Zugangsdaten im nichtflüchtigen Speicher
//!
//! Die Zugangsdaten liegen als kleiner Datensatz in einem reservierten
//! Flash-Bereich:
//!
//! ```text
//! "PFC1" | ssid_len: u8 | ssid | pass_len: u8 | pass
//! ```
//!
//! Gelöschter Flash (0xFF) bedeutet "noch nicht initialisiert".

use embedded_storage::{ReadStorage, Storage};
use heapless::String;

/// Kennung am Anfang des Datensatzes
pub const RECORD_MAGIC: [u8; 4] = *b"PFC1";

/// Maximale SSID-Länge (IEEE 802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximale Passwort-Länge (WPA2 Passphrase bzw. 64 Hex-Zeichen PSK)
pub const MAX_PASSWORD_LEN: usize = 64;

/// Maximale Größe eines Datensatzes in Bytes
pub const RECORD_MAX_LEN: usize = RECORD_MAGIC.len() + 1 + MAX_SSID_LEN + 1 + MAX_PASSWORD_LEN;

/// Fehler beim Laden/Speichern der Zugangsdaten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CredentialError {
    /// Flash ist gelöscht, es wurde noch nichts gespeichert
    NotInitialized,
    /// Datensatz unlesbar (falsche Kennung, Länge oder kein UTF-8)
    Corrupt,
    /// Zugangsdaten passen nicht in den Datensatz
    TooLong,
    /// Flash-Zugriff fehlgeschlagen
    Storage,
}

/// SSID und Passwort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, CredentialError> {
        Ok(Self {
            ssid: String::try_from(ssid).map_err(|_| CredentialError::TooLong)?,
            password: String::try_from(password).map_err(|_| CredentialError::TooLong)?,
        })
    }

    /// Schreibt den Datensatz in `buf` und gibt die Länge zurück
    pub fn encode(&self, buf: &mut [u8; RECORD_MAX_LEN]) -> usize {
        let ssid = self.ssid.as_bytes();
        let pass = self.password.as_bytes();

        let mut pos = 0;
        buf[pos..pos + 4].copy_from_slice(&RECORD_MAGIC);
        pos += 4;
        buf[pos] = ssid.len() as u8;
        pos += 1;
        buf[pos..pos + ssid.len()].copy_from_slice(ssid);
        pos += ssid.len();
        buf[pos] = pass.len() as u8;
        pos += 1;
        buf[pos..pos + pass.len()].copy_from_slice(pass);
        pos + pass.len()
    }

    /// Liest einen Datensatz aus einem Byte-Puffer
    pub fn decode(buf: &[u8]) -> Result<Self, CredentialError> {
        let magic = buf.get(..4).ok_or(CredentialError::Corrupt)?;
        if magic == [0xFF; 4] {
            return Err(CredentialError::NotInitialized);
        }
        if magic != RECORD_MAGIC {
            return Err(CredentialError::Corrupt);
        }

        let (ssid, rest) = take_field(&buf[4..], MAX_SSID_LEN)?;
        let (password, _) = take_field(rest, MAX_PASSWORD_LEN)?;
        if ssid.is_empty() {
            return Err(CredentialError::Corrupt);
        }

        Self::new(ssid, password).map_err(|_| CredentialError::Corrupt)
    }
}

/// Liest ein Feld `len: u8 | bytes` und gibt den Rest des Puffers zurück
fn take_field(buf: &[u8], max_len: usize) -> Result<(&str, &[u8]), CredentialError> {
    let (&len, rest) = buf.split_first().ok_or(CredentialError::Corrupt)?;
    let len = usize::from(len);
    if len > max_len || len > rest.len() {
        return Err(CredentialError::Corrupt);
    }
    let value = core::str::from_utf8(&rest[..len]).map_err(|_| CredentialError::Corrupt)?;
    Ok((value, &rest[len..]))
}

/// Lädt die Zugangsdaten ab `offset` aus dem Flash
pub fn load<S: ReadStorage>(
    storage: &mut S,
    offset: u32,
) -> Result<WifiCredentials, CredentialError> {
    let mut buf = [0u8; RECORD_MAX_LEN];
    storage
        .read(offset, &mut buf)
        .map_err(|_| CredentialError::Storage)?;
    WifiCredentials::decode(&buf)
}

/// Speichert die Zugangsdaten ab `offset` im Flash
pub fn store<S: Storage>(
    storage: &mut S,
    offset: u32,
    credentials: &WifiCredentials,
) -> Result<(), CredentialError> {
    let mut buf = [0xFFu8; RECORD_MAX_LEN];
    let len = credentials.encode(&mut buf);
    storage
        .write(offset, &buf[..len])
        .map_err(|_| CredentialError::Storage)
}
