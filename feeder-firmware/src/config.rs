// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
#![allow(dead_code)]

// ============================================================================
// Wägezelle (HX711) Konfiguration - Futterautomat
// ============================================================================

/// GPIO-Pin für HX711 DOUT (Daten vom ADC)
pub const LOADCELL_DOUT_PIN: u8 = 22;

/// GPIO-Pin für HX711 SCK (Takt zum ADC)
pub const LOADCELL_SCK_PIN: u8 = 21;

/// Maximale Wartezeit bis der HX711 einen Messwert bereit hat (ms)
/// Bei 10 SPS kommt spätestens alle 100 ms ein Wert
pub const LOADCELL_READY_TIMEOUT_MS: u32 = 1000;

/// Halbe Taktperiode für das Bit-Banging (µs)
pub const LOADCELL_CLOCK_HALF_PERIOD_US: u32 = 1;

// ============================================================================
// Servo Konfiguration - Futterautomat
// ============================================================================

/// GPIO-Pin für das Servo-Signal (LEDC PWM)
pub const SERVO_PIN: u8 = 20;

/// Duty-Auflösung des LEDC-Timers in Bit
/// 14 Bit bei 50 Hz passt in den 80 MHz APB-Takt
pub const SERVO_DUTY_BITS: u8 = 14;

// ============================================================================
// RFID-Station Konfiguration
// ============================================================================

/// SPI-Pins für den MFRC522
pub const RFID_SCK_PIN: u8 = 6;
pub const RFID_MOSI_PIN: u8 = 7;
pub const RFID_MISO_PIN: u8 = 5;
pub const RFID_CS_PIN: u8 = 4;

/// Reset-Pin des MFRC522 (HIGH = aktiv)
pub const RFID_RST_PIN: u8 = 15;

/// SPI-Takt für den MFRC522 in MHz (max. 10 MHz laut Datenblatt)
pub const RFID_SPI_MHZ: u32 = 1;

/// ADC-Pin für den Fotowiderstand (Spannungsteiler gegen 3.3 V)
pub const LIGHT_SENSOR_PIN: u8 = 1;

/// GPIO-Pin für die RGB LED (WS2812/Neopixel)
pub const LED_GPIO_PIN: u8 = 8;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// Flash-Offset des Zugangsdaten-Datensatzes
/// Anfang der `nvs`-Partition der Standard-Partitionstabelle (0x9000, 24 KB)
pub const CREDENTIALS_FLASH_OFFSET: u32 = 0x9000;

/// Fallback WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// und beim ersten Start in den Flash geschrieben (siehe .env.example)
pub const WIFI_SSID: Option<&str> = option_env!("WIFI_SSID");

/// Fallback WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
pub const WIFI_PASSWORD: Option<&str> = option_env!("WIFI_PASSWORD");

/// Wartezeit nach Verbindungsfehler vor erneutem Versuch (Sekunden)
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Wartezeit nach Verbindungsabbruch vor erneutem Versuch (Sekunden)
pub const WIFI_RECONNECT_DELAY_SECS: u64 = 2;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// Gesamt-Heap: ~100 KB für WiFi-Stack

// ============================================================================
// Server Konfiguration (Meldungen per HTTP GET)
// ============================================================================

/// Hostname oder IPv4-Adresse des Servers
/// Wird zur Build-Zeit aus der Environment Variable SERVER_HOST geladen
pub const SERVER_HOST: &str = match option_env!("SERVER_HOST") {
    Some(host) => host,
    None => "13.59.144.115",
};

/// Port des Servers (Flask Standard: 5000)
pub const SERVER_PORT: u16 = match option_env!("SERVER_PORT") {
    Some(port) => parse_port(port),
    None => 5000,
};

/// Ohne empfangene Daten wird nach dieser Zeit aufgegeben (Sekunden)
pub const NETWORK_TIMEOUT_SECS: u64 = 30;

/// TCP-Verbindungsaufbau Timeout (Sekunden)
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 10;

/// Puffer für die Server-Antwort (Kopf + Body-Stücke)
pub const RESPONSE_BUFFER_SIZE: usize = 1024;

/// Socket-Slots des embassy-net Stacks
/// Report-Client (1) + HTTP-Listener (HTTP_TASK_POOL) + DNS (1) + Reserve
pub const NET_SOCKETS: usize = 6;

/// Kapazität des Report-Channels (Geräte-Logik → Report-Task)
pub const REPORT_QUEUE_LEN: usize = 4;

// ============================================================================
// HTTP Server Konfiguration (Event-Log auf dem Gerät)
// ============================================================================

/// HTTP Buffer-Größe in Bytes
/// Für HTTP Request/Response Headers und Body
pub const HTTP_BUFFER_SIZE: usize = 1024;

/// TCP RX Buffer-Größe in Bytes
/// Für eingehende TCP-Daten vom Client
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
/// Für ausgehende TCP-Daten zum Client
pub const TCP_TX_BUFFER_SIZE: usize = 1024;

/// JSON Serialisierungs-Buffer für das Event-Log
/// 16 Events à ~120 Bytes plus Reserve
pub const JSON_EVENTS_BUFFER_SIZE: usize = 3072;

/// JSON Serialisierungs-Buffer für /status
pub const JSON_STATUS_BUFFER_SIZE: usize = 256;

/// Anzahl paralleler HTTP Server Tasks
pub const HTTP_TASK_POOL: usize = 2;

/// Port-Nummer aus der Build-Zeit Environment Variable (const, ungültig → 5000)
const fn parse_port(value: &str) -> u16 {
    let bytes = value.as_bytes();
    if bytes.is_empty() {
        return 5000;
    }
    let mut port: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        if digit < b'0' || digit > b'9' {
            return 5000;
        }
        port = port * 10 + (digit - b'0') as u32;
        if port > u16::MAX as u32 {
            return 5000;
        }
        i += 1;
    }
    port as u16
}
