//! Integration Tests für die Server-Meldungen (HTTP GET)
//!
//! Prüft die Requests gegen die Endpoints des Servers und das Parsen
//! von Antworten, die in mehreren TCP-Stücken ankommen.

use feeder_core::http::{build_get_request, parse_response_head};
use feeder_core::{HttpError, PetId, Report, ResponseHead};

/// Simuliert den Lese-Loop des Report-Tasks: Stück für Stück anhängen,
/// bis der Kopf vollständig ist
fn read_head_in_chunks(
    response: &[u8],
    chunk: usize,
) -> Result<(ResponseHead, usize), HttpError> {
    let mut received = Vec::new();
    for piece in response.chunks(chunk) {
        received.extend_from_slice(piece);
        if let Some(head) = parse_response_head(&received)? {
            return Ok((head, received.len()));
        }
    }
    panic!("response head never completed");
}

#[test]
fn test_feeding_request_matches_server_route() {
    let req = build_get_request("13.59.144.115", 5000, &Report::Feeding).unwrap();

    let mut lines = req.split("\r\n");
    assert_eq!(lines.next(), Some("GET /feeding HTTP/1.1"));
    assert_eq!(lines.next(), Some("Host: 13.59.144.115:5000"));
    assert!(req.contains("\r\nUser-Agent: pet-feeder/1.0\r\n"));
    assert!(req.contains("\r\nConnection: close\r\n"));
    assert!(req.ends_with("\r\n\r\n"));
    assert!(!req.contains('?'));
}

#[test]
fn test_rfid_request_carries_pet_id() {
    let pet_id = PetId::from_uid(&[0x04, 0x52, 0x9a, 0x1c, 0x3b, 0x80, 0x00]).unwrap();
    let req = build_get_request("petfeeder.local", 8080, &Report::RfidScan { pet_id }).unwrap();

    assert!(req.starts_with("GET /rfid_scan?pet_id=04529A1C3B8000 HTTP/1.1\r\n"));
    assert!(req.contains("\r\nHost: petfeeder.local:8080\r\n"));
}

#[test]
fn test_flask_response_split_across_reads() {
    let response = b"HTTP/1.1 200 OK\r\n\
        Server: Werkzeug/3.0.1 Python/3.11.4\r\n\
        Date: Sun, 18 Oct 2026 10:00:00 GMT\r\n\
        Content-Type: application/json\r\n\
        Content-Length: 36\r\n\
        Connection: close\r\n\
        \r\n\
        {\"message\": \"Feeding data received\"}";

    let (head, received) = read_head_in_chunks(response, 16).unwrap();

    assert_eq!(head.status, 200);
    assert!(head.is_success());
    assert_eq!(head.content_length, Some(36));
    // Was nach dem Kopf schon da ist, gehört zum Body
    let body_so_far = &response[head.head_len..received];
    assert!(b"{\"message\": \"Feeding data received\"}".starts_with(body_so_far));
    assert_eq!(response.len() - head.head_len, 36);
}

#[test]
fn test_response_without_content_length() {
    let response = b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\nok";

    let (head, _) = read_head_in_chunks(response, 5).unwrap();

    assert_eq!(head.content_length, None);
    assert_eq!(&response[head.head_len..], b"ok");
}

#[test]
fn test_error_status_is_not_success() {
    let response = b"HTTP/1.1 500 INTERNAL SERVER ERROR\r\nContent-Length: 0\r\n\r\n";

    let (head, _) = read_head_in_chunks(response, 64).unwrap();

    assert_eq!(head.status, 500);
    assert!(!head.is_success());
    assert_eq!(head.content_length, Some(0));
}

#[test]
fn test_garbage_response_is_rejected() {
    let response = b"SSH-2.0-OpenSSH_9.6\r\n\r\n";
    assert_eq!(
        read_head_in_chunks(response, 8),
        Err(HttpError::MalformedStatusLine)
    );
}

#[test]
fn test_header_without_colon_is_rejected() {
    let response = b"HTTP/1.1 200 OK\r\nbroken header\r\n\r\n";
    assert_eq!(
        read_head_in_chunks(response, 64),
        Err(HttpError::MalformedHeader)
    );
}
