// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Geräte-Tasks melden über einen Channel an den Report-Task (Gerät → Server),
// HTTP-Tasks lesen den geteilten Geräte-Zustand.

pub mod feeder;
pub mod http;
pub mod report;
pub mod rfid_station;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use feeder::feeder_task;
pub use http::{feeder_http_task, station_http_task};
pub use report::{ChannelNotifier, report_task};
pub use rfid_station::{StationPeripherals, station_task};
pub use wifi::{connection_task, dhcp_task, net_task, start_wifi};
