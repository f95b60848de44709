// WiFi-Zugangsdaten aus dem Flash laden
//
// Reihenfolge:
// 1. Datensatz im Flash (nvs-Partition)
// 2. Build-Zeit Credentials aus .env - werden dann in den Flash geschrieben
// 3. Nichts gefunden → None (Radio bleibt aus)

use defmt::{error, info, warn};
use esp_storage::FlashStorage;
use feeder_core::credentials::{self, CredentialError, WifiCredentials};

use crate::config::{CREDENTIALS_FLASH_OFFSET, WIFI_PASSWORD, WIFI_SSID};

/// Lädt die Zugangsdaten und provisioniert sie bei Bedarf aus der Build-Konfiguration
pub fn load_credentials(flash: esp_hal::peripherals::FLASH<'_>) -> Option<WifiCredentials> {
    info!("NVS: Opening credential storage at {:#x}...", CREDENTIALS_FLASH_OFFSET);
    let mut storage = FlashStorage::new(flash);

    match credentials::load(&mut storage, CREDENTIALS_FLASH_OFFSET) {
        Ok(creds) => {
            info!("NVS: Retrieved SSID/password (SSID '{}')", creds.ssid.as_str());
            return Some(creds);
        }
        Err(CredentialError::NotInitialized) => {
            warn!("NVS: The value is not initialized yet!");
        }
        Err(e) => {
            error!("NVS: Error ({}) reading credentials!", e);
        }
    }

    let creds = build_time_credentials()?;
    match credentials::store(&mut storage, CREDENTIALS_FLASH_OFFSET, &creds) {
        Ok(()) => info!("NVS: Stored build-time credentials for '{}'", creds.ssid.as_str()),
        Err(e) => error!("NVS: Failed to store credentials: {}", e),
    }
    Some(creds)
}

/// Credentials aus WIFI_SSID / WIFI_PASSWORD (Build-Zeit)
fn build_time_credentials() -> Option<WifiCredentials> {
    let Some(ssid) = WIFI_SSID.filter(|s| !s.is_empty()) else {
        error!("NVS: No credentials in flash and WIFI_SSID not set at build time");
        return None;
    };
    match WifiCredentials::new(ssid, WIFI_PASSWORD.unwrap_or("")) {
        Ok(creds) => Some(creds),
        Err(e) => {
            error!("NVS: Build-time credentials rejected: {}", e);
            None
        }
    }
}
