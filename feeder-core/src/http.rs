//! Minimaler HTTP/1.1 Client-Teil: GET-Request bauen, Response-Kopf lesen
//!
//! Der Server erwartet nur einfache GET-Requests ohne Body. Die eigentliche
//! TCP-Verbindung baut die Firmware auf (embassy-net), hier liegt nur das
//! Text-Format, damit es auf dem Host testbar ist.

use core::fmt::Write;

use heapless::String;

use crate::types::Report;

/// Größe des Request-Puffers
pub const REQUEST_BUFFER_SIZE: usize = 256;

/// User-Agent der Geräte
pub const USER_AGENT: &str = "pet-feeder/1.0";

/// Fertig formatierter Request
pub type RequestBuffer = String<REQUEST_BUFFER_SIZE>;

/// Fehler beim Bauen oder Parsen von HTTP-Nachrichten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HttpError {
    /// Request passt nicht in den Puffer
    RequestTooLong,
    /// Status-Zeile ist kein `HTTP/1.x <code> ...`
    MalformedStatusLine,
    /// Header-Zeile ohne `:` oder nicht UTF-8
    MalformedHeader,
    /// `Content-Length` ist keine Zahl
    InvalidContentLength,
}

/// Geparster Response-Kopf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    /// `None` wenn der Server keine Länge angibt
    pub content_length: Option<usize>,
    /// Länge des Kopfs inkl. Leerzeile (Body beginnt hier)
    pub head_len: usize,
}

impl ResponseHead {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Baut den GET-Request für eine Meldung
///
/// ```
/// # use feeder_core::{Report, http::build_get_request};
/// let req = build_get_request("10.0.0.2", 5000, &Report::Feeding).unwrap();
/// assert!(req.starts_with("GET /feeding HTTP/1.1\r\nHost: 10.0.0.2:5000\r\n"));
/// assert!(req.ends_with("\r\n\r\n"));
/// ```
pub fn build_get_request(
    host: &str,
    port: u16,
    report: &Report,
) -> Result<RequestBuffer, HttpError> {
    let mut req = RequestBuffer::new();
    write_request(&mut req, host, port, report).map_err(|_| HttpError::RequestTooLong)?;
    Ok(req)
}

fn write_request(
    req: &mut RequestBuffer,
    host: &str,
    port: u16,
    report: &Report,
) -> core::fmt::Result {
    write!(req, "GET {}", report.path())?;
    if let Report::RfidScan { pet_id } = report {
        req.push_str("?pet_id=").map_err(|_| core::fmt::Error)?;
        percent_encode(req, pet_id.as_str())?;
    }
    write!(
        req,
        " HTTP/1.1\r\nHost: {}:{}\r\nUser-Agent: {}\r\nAccept: */*\r\nConnection: close\r\n\r\n",
        host, port, USER_AGENT
    )
}

/// Prozent-Kodierung für Query-Werte (RFC 3986 unreserved bleibt stehen)
pub fn percent_encode<W: Write>(out: &mut W, value: &str) -> core::fmt::Result {
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.write_char(byte as char)?
            }
            _ => write!(out, "%{:02X}", byte)?,
        }
    }
    Ok(())
}

/// Liest den Status-Code aus `HTTP/1.1 200 OK`
pub fn parse_status_line(line: &str) -> Result<u16, HttpError> {
    let mut parts = line.split(' ');
    let version = parts.next().ok_or(HttpError::MalformedStatusLine)?;
    if !version.starts_with("HTTP/1.") {
        return Err(HttpError::MalformedStatusLine);
    }
    let code = parts.next().ok_or(HttpError::MalformedStatusLine)?;
    if code.len() != 3 {
        return Err(HttpError::MalformedStatusLine);
    }
    code.parse().map_err(|_| HttpError::MalformedStatusLine)
}

/// Parst den Response-Kopf aus den bisher empfangenen Bytes
///
/// Gibt `Ok(None)` zurück solange die Leerzeile nach den Headern fehlt.
pub fn parse_response_head(buf: &[u8]) -> Result<Option<ResponseHead>, HttpError> {
    let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        return Ok(None);
    };
    let head = core::str::from_utf8(&buf[..end]).map_err(|_| HttpError::MalformedHeader)?;
    let mut lines = head.split("\r\n");

    let status = parse_status_line(lines.next().unwrap_or(""))?;

    let mut content_length = None;
    for line in lines {
        let (name, value) = line.split_once(':').ok_or(HttpError::MalformedHeader)?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            let len = value
                .trim()
                .parse()
                .map_err(|_| HttpError::InvalidContentLength)?;
            content_length = Some(len);
        }
    }

    Ok(Some(ResponseHead {
        status,
        content_length,
        head_len: end + 4,
    }))
}
