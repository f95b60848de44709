// HTTP Server Task - Serviert Statusseite, Event-Log und Status als JSON
use alloc::string::String;
use alloc::vec;
use defmt::{info, warn};
use embassy_net::Stack;
use embassy_time::{Duration, Instant};
use picoserve::response::{IntoResponse, Response, StatusCode};
use picoserve::routing::get;
use serde::Serialize;

use crate::config::*;
use crate::web::INDEX_HTML;
use crate::web::protocol::{DeviceKind, EventsJson, FeederStatus, StationStatus};
use crate::{SharedFeederState, SharedStationState};

/// HTTP Server Task des Futterautomaten
///
/// - `GET /`             → index.html
/// - `GET /feeding_data` → letzte Fütterungen als JSON-Array
/// - `GET /status`       → Uptime, Soll-Portion, Anzahl Fütterungen
///
/// **Task Pool:** wird HTTP_TASK_POOL-mal gespawnt, damit die Seite und ihre
/// JSON-Abfragen parallel bedient werden.
#[embassy_executor::task(pool_size = HTTP_TASK_POOL)]
pub async fn feeder_http_task(
    task_id: usize,
    stack: &'static Stack<'static>,
    state: &'static SharedFeederState,
) {
    info!("HTTP: Feeder server task {} starting on port 80...", task_id);

    let app = picoserve::Router::new()
        .route("/", get(serve_html))
        .route(
            "/feeding_data",
            get(move || async move {
                let body = state.lock(|s| {
                    serialize_json(&EventsJson(&s.borrow().events), JSON_EVENTS_BUFFER_SIZE)
                });
                json_response(body)
            }),
        )
        .route(
            "/status",
            get(move || async move {
                let status = state.lock(|s| {
                    let s = s.borrow();
                    FeederStatus {
                        device: DeviceKind::Feeder,
                        uptime_ms: Instant::now().as_millis(),
                        desired_g: s.desired_g,
                        feedings: s.events.total(),
                    }
                });
                json_response(serialize_json(&status, JSON_STATUS_BUFFER_SIZE))
            }),
        );

    serve(task_id, stack, &app).await;
}

/// HTTP Server Task der RFID-Station
///
/// - `GET /`          → index.html
/// - `GET /rfid_data` → letzte Scans als JSON-Array
/// - `GET /status`    → Uptime, Lichtsensor-Kalibrierung, Anzahl Scans
#[embassy_executor::task(pool_size = HTTP_TASK_POOL)]
pub async fn station_http_task(
    task_id: usize,
    stack: &'static Stack<'static>,
    state: &'static SharedStationState,
) {
    info!("HTTP: Station server task {} starting on port 80...", task_id);

    let app = picoserve::Router::new()
        .route("/", get(serve_html))
        .route(
            "/rfid_data",
            get(move || async move {
                let body = state.lock(|s| {
                    serialize_json(&EventsJson(&s.borrow().events), JSON_EVENTS_BUFFER_SIZE)
                });
                json_response(body)
            }),
        )
        .route(
            "/status",
            get(move || async move {
                let status = state.lock(|s| {
                    let s = s.borrow();
                    StationStatus {
                        device: DeviceKind::RfidStation,
                        uptime_ms: Instant::now().as_millis(),
                        calibrated: s.calibration.is_some(),
                        light_min: s.calibration.map(|c| c.min()),
                        light_max: s.calibration.map(|c| c.max()),
                        scans: s.events.total(),
                    }
                });
                json_response(serialize_json(&status, JSON_STATUS_BUFFER_SIZE))
            }),
        );

    serve(task_id, stack, &app).await;
}

/// Gemeinsame Server-Schleife beider Geräte (lauscht auf Port 80)
async fn serve<P: picoserve::routing::PathRouter>(
    task_id: usize,
    stack: &'static Stack<'static>,
    app: &picoserve::Router<P>,
) {
    // Server-Konfiguration
    let config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(1)),
        write: Some(Duration::from_secs(1)),
        persistent_start_read_request: Some(Duration::from_secs(5)),
    })
    .keep_connection_alive();

    // HTTP-Buffer für Requests/Responses
    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];

    // TCP-Buffers für Socket
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    let server = picoserve::Server::new(app, &config, &mut http_buffer);

    // task_id ermöglicht mehrere concurrent Server-Instanzen
    let _ = server
        .listen_and_serve(task_id, *stack, 80, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Server task {} ended", task_id);
}

/// Serviert die HTML-Hauptseite
async fn serve_html() -> impl IntoResponse {
    Response::new(StatusCode::OK, INDEX_HTML)
        .with_header("Content-Type", "text/html; charset=utf-8")
}

/// Serialisiert in einen Heap-Buffer; None wenn der Buffer zu klein ist
fn serialize_json<T: Serialize>(value: &T, capacity: usize) -> Option<String> {
    let mut buffer = vec![0u8; capacity];
    let n = serde_json_core::to_slice(value, &mut buffer).ok()?;
    buffer.truncate(n);
    String::from_utf8(buffer).ok()
}

fn json_response(body: Option<String>) -> impl IntoResponse {
    let (status, body) = match body {
        Some(body) => (StatusCode::OK, body),
        None => {
            warn!("HTTP: JSON buffer too small");
            (
                StatusCode::new(500),
                String::from("{\"error\":\"serialization failed\"}"),
            )
        }
    };
    Response::new(status, body).with_header("Content-Type", "application/json")
}
