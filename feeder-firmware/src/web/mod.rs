// Web-Modul für den Geräte-Webserver
// Organisiert alle Web-bezogenen Komponenten

pub mod protocol;

// HTML-Datei zur Compile-Zeit einbinden
// Die Datei wird direkt ins Binary eingebettet und fragt per JavaScript
// `/status` sowie das Event-Log des jeweiligen Geräts ab
pub const INDEX_HTML: &str = include_str!("index.html");
