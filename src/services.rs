//! Service classification from banners and well-known ports.
//!
//! Classification is a pure lookup: first a case-insensitive substring match
//! of the banner against known service signatures, then a fallback to the
//! well-known port table, then "Unknown".

use std::collections::HashMap;
use std::sync::LazyLock;

/// Banner signatures in fixed priority order; the first match wins.
///
/// Ordered most-specific first so that a banner matching several signatures
/// always classifies the same way. "220" is shared by FTP and SMTP greetings;
/// FTP is listed first and wins the tie.
const SERVICE_SIGNATURES: &[(&str, &str)] = &[
    ("PostgreSQL", "POSTGRESQL"),
    ("MongoDB", "MONGODB"),
    ("Telnet", "TELNET"),
    ("MySQL", "MYSQL"),
    ("Redis", "REDIS"),
    ("HTTP", "HTTP/"),
    ("SSH", "SSH-"),
    ("IMAP", "* OK"),
    ("POP3", "+OK"),
    ("FTP", "220"),
    ("SMTP", "220"),
];

/// Static map of well-known ports to service names.
static KNOWN_PORTS: LazyLock<HashMap<u16, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    m.insert(20, "FTP-Data");
    m.insert(21, "FTP");
    m.insert(22, "SSH");
    m.insert(23, "Telnet");
    m.insert(25, "SMTP");
    m.insert(53, "DNS");
    m.insert(80, "HTTP");
    m.insert(110, "POP3");
    m.insert(143, "IMAP");
    m.insert(443, "HTTPS");
    m.insert(445, "SMB");
    m.insert(465, "SMTPS");
    m.insert(587, "SMTP");
    m.insert(993, "IMAPS");
    m.insert(995, "POP3S");
    m.insert(1433, "MSSQL");
    m.insert(1521, "Oracle");
    m.insert(3306, "MySQL");
    m.insert(3389, "RDP");
    m.insert(5432, "PostgreSQL");
    m.insert(5900, "VNC");
    m.insert(6379, "Redis");
    m.insert(8080, "HTTP-Proxy");
    m.insert(8443, "HTTPS-Alt");
    m.insert(9200, "Elasticsearch");
    m.insert(27017, "MongoDB");
    m.insert(27018, "MongoDB");
    m.insert(50000, "DB2");

    m
});

/// Static map of service names to human-readable descriptions.
static SERVICE_DESCRIPTIONS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        m.insert("SSH", "Secure Shell");
        m.insert("HTTP", "Hypertext Transfer Protocol");
        m.insert("HTTPS", "HTTP Secure");
        m.insert("FTP", "File Transfer Protocol");
        m.insert("SMTP", "Simple Mail Transfer Protocol");
        m.insert("MySQL", "MySQL Database");
        m.insert("PostgreSQL", "PostgreSQL Database");
        m.insert("Redis", "Redis Key-Value Store");
        m.insert("MongoDB", "MongoDB NoSQL Database");
        m.insert("Elasticsearch", "Elasticsearch Search Engine");
        m.insert("DNS", "Domain Name System");
        m.insert("RDP", "Remote Desktop Protocol");
        m.insert("VNC", "Virtual Network Computing");

        m
    });

/// Classify a service from its banner and port number.
///
/// The banner match is case-insensitive and takes priority over the port
/// lookup, so an SSH daemon answering on a non-standard port still classifies
/// as SSH.
pub fn classify(banner: &str, port: u16) -> &'static str {
    let upper = banner.to_uppercase();

    for (service, signature) in SERVICE_SIGNATURES {
        if upper.contains(signature) {
            return service;
        }
    }

    KNOWN_PORTS.get(&port).copied().unwrap_or("Unknown")
}

/// Human-readable description for a classified service name.
pub fn describe(service: &str) -> &'static str {
    SERVICE_DESCRIPTIONS
        .get(service)
        .copied()
        .unwrap_or("Unknown Service")
}
