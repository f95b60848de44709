// Report Task - Meldet Fütterungen und RFID-Scans per HTTP GET an den Server
use defmt::{Debug2Format, error, info, warn};
use embassy_net::{IpAddress, Ipv4Address, Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::{Duration, Timer, with_timeout};
use feeder_core::http::{HttpError, ResponseHead, build_get_request, parse_response_head};
use feeder_core::{FeedNotifier, PetId, Report, ScanNotifier};
use picoserve::io::embedded_io_async::Write;

use crate::config::*;
use crate::{ReportReceiver, ReportSender};

/// Report Task - läuft parallel zu den Geräte-Tasks
///
/// - Wartet auf Netzwerk-Verbindung
/// - Empfängt Meldungen via Channel
/// - Schickt pro Meldung einen GET-Request und loggt die Antwort
/// - Kein Retry: fehlgeschlagene Meldungen werden nur geloggt
#[embassy_executor::task]
pub async fn report_task(stack: &'static Stack<'static>, receiver: ReportReceiver) {
    info!("Report: Task started, waiting for network...");
    wait_for_network(stack).await;
    info!(
        "Report: Network ready, server is {}:{}",
        SERVER_HOST, SERVER_PORT
    );

    loop {
        let report = receiver.receive().await;
        info!("Report: Sending {}", report);

        match send_report(stack, &report).await {
            Ok(head) if head.is_success() => {
                info!("Report: {} done (status {})", report, head.status)
            }
            Ok(head) => warn!("Report: {} rejected (status {})", report, head.status),
            Err(e) => error!("Report: {} failed: {}", report, e),
        }
    }
}

/// Wartet bis Netzwerk-Verbindung verfügbar ist
///
/// Prüft kontinuierlich Link-Status und DHCP-Konfiguration.
pub async fn wait_for_network(stack: &'static Stack<'static>) {
    loop {
        if stack.is_link_up() && stack.config_v4().is_some() {
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

/// FeedNotifier / ScanNotifier über den Report-Channel
///
/// Blockiert nie: ist die Queue voll, wird die Meldung verworfen.
pub struct ChannelNotifier {
    sender: Option<ReportSender>,
}

impl ChannelNotifier {
    pub fn new(sender: ReportSender) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// Ohne Netz: Meldungen werden gar nicht erst eingereiht
    pub fn offline() -> Self {
        Self { sender: None }
    }

    /// Reiht eine beliebige Meldung ein
    pub fn submit(&self, report: Report) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        match sender.try_send(report) {
            Ok(()) => true,
            Err(_) => {
                warn!("Report: Queue full, report dropped");
                false
            }
        }
    }
}

impl FeedNotifier for ChannelNotifier {
    fn notify_feeding(&mut self) -> bool {
        self.submit(Report::Feeding)
    }
}

impl ScanNotifier for ChannelNotifier {
    fn notify_scan(&mut self, pet_id: &PetId) -> bool {
        self.submit(Report::RfidScan {
            pet_id: pet_id.clone(),
        })
    }
}

/// Fehler-Stufen einer Meldung
#[derive(Debug, defmt::Format)]
enum ReportError {
    Http(HttpError),
    DnsResolutionFailed,
    DnsTimeout,
    ConnectTimeout,
    ConnectFailed,
    WriteFailed,
    /// Keine Antwort bzw. Timeout beim Lesen der Status-Zeile
    ResponseFailed,
    /// Response-Kopf passt nicht in den Puffer
    SkipHeadersFailed,
}

/// Schickt eine Meldung und gibt den Response-Kopf zurück
async fn send_report(
    stack: &'static Stack<'static>,
    report: &Report,
) -> Result<ResponseHead, ReportError> {
    let request =
        build_get_request(SERVER_HOST, SERVER_PORT, report).map_err(ReportError::Http)?;

    let server_ip = resolve_server(stack).await?;

    // TCP Connect
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];
    let mut socket = TcpSocket::new(*stack, &mut rx_buffer, &mut tx_buffer);
    // Ohne empfangene Daten wird nach NETWORK_TIMEOUT_SECS aufgegeben
    socket.set_timeout(Some(Duration::from_secs(NETWORK_TIMEOUT_SECS)));

    with_timeout(
        Duration::from_secs(CONNECT_TIMEOUT_SECS),
        socket.connect((server_ip, SERVER_PORT)),
    )
    .await
    .map_err(|_| ReportError::ConnectTimeout)?
    .map_err(|e| {
        warn!("Report: Connect failed: {}", Debug2Format(&e));
        ReportError::ConnectFailed
    })?;

    socket
        .write_all(request.as_bytes())
        .await
        .map_err(|_| ReportError::WriteFailed)?;
    socket.flush().await.map_err(|_| ReportError::WriteFailed)?;

    // Response-Kopf lesen bis zur Leerzeile
    let mut buffer = [0u8; RESPONSE_BUFFER_SIZE];
    let mut filled = 0;
    let head = loop {
        if filled == buffer.len() {
            return Err(ReportError::SkipHeadersFailed);
        }
        let n = socket
            .read(&mut buffer[filled..])
            .await
            .map_err(|_| ReportError::ResponseFailed)?;
        if n == 0 {
            return Err(ReportError::ResponseFailed);
        }
        filled += n;
        if let Some(head) = parse_response_head(&buffer[..filled]).map_err(ReportError::Http)? {
            break head;
        }
    };

    info!("Report: Got status code: {}", head.status);
    match head.content_length {
        Some(len) => info!("Report: Content length is: {}", len),
        None => info!("Report: Content length is: -1"),
    }

    // Body loggen bis Content-Length erreicht, Verbindung zu oder Timeout
    info!("Report: Body returned follows:");
    let mut received = filled - head.head_len;
    log_body(&buffer[head.head_len..filled]);
    while head.content_length.is_none_or(|len| received < len) {
        match socket.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => {
                log_body(&buffer[..n]);
                received += n;
            }
            Err(e) => {
                warn!("Report: Body read stopped: {}", Debug2Format(&e));
                break;
            }
        }
    }

    socket.close();
    Ok(head)
}

fn log_body(chunk: &[u8]) {
    if chunk.is_empty() {
        return;
    }
    match core::str::from_utf8(chunk) {
        Ok(text) => info!("{}", text),
        Err(_) => info!("{=[u8]}", chunk),
    }
}

/// Server-Adresse: IPv4-Literal direkt, sonst DNS
async fn resolve_server(stack: &'static Stack<'static>) -> Result<Ipv4Address, ReportError> {
    if let Ok(ip) = SERVER_HOST.parse::<Ipv4Address>() {
        return Ok(ip);
    }
    info!("Report: Resolving '{}'...", SERVER_HOST);
    resolve_hostname(stack, SERVER_HOST).await
}

/// Löst Hostname zu IPv4-Adresse auf
///
/// Nutzt embassy-net DNS-Stack mit konfigurierbarem Timeout.
async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<Ipv4Address, ReportError> {
    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => addrs
            .iter()
            .find_map(|addr| match addr {
                IpAddress::Ipv4(ipv4) => Some(*ipv4),
                #[allow(unreachable_patterns)]
                _ => None,
            })
            .ok_or(ReportError::DnsResolutionFailed),
        Ok(Err(_)) => Err(ReportError::DnsResolutionFailed),
        Err(_) => Err(ReportError::DnsTimeout),
    }
}
