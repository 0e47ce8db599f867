//! Well-known port to service-name mapping.
//!
//! Pure lookup over a static table; ports absent from the table get the
//! `UNKNOWN_SERVICE` label rather than an error or an `Option`.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Label returned for ports with no table entry.
pub const UNKNOWN_SERVICE: &str = "unknown";

static PORT_SERVICES: LazyLock<HashMap<u16, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // Standard protocols
    m.insert(21, "FTP");
    m.insert(22, "SSH");
    m.insert(23, "Telnet");
    m.insert(25, "SMTP");
    m.insert(53, "DNS");
    m.insert(67, "DHCP Server");
    m.insert(68, "DHCP Client");
    m.insert(69, "TFTP");
    m.insert(80, "HTTP");
    m.insert(110, "POP3");
    m.insert(119, "NNTP");
    m.insert(123, "NTP");
    m.insert(143, "IMAP");
    m.insert(161, "SNMP");
    m.insert(162, "SNMP Trap");
    m.insert(389, "LDAP");
    m.insert(443, "HTTPS");
    m.insert(465, "SMTPS");
    m.insert(514, "Syslog");
    m.insert(587, "SMTP TLS");
    m.insert(631, "IPP");
    m.insert(636, "LDAPS");
    m.insert(989, "FTPS Data");
    m.insert(990, "FTPS Control");
    m.insert(993, "IMAPS");
    m.insert(995, "POP3S");

    // Databases
    m.insert(1433, "SQL Server");
    m.insert(1521, "Oracle DB");
    m.insert(3306, "MySQL");
    m.insert(5432, "PostgreSQL");
    m.insert(27017, "MongoDB");

    // Misc services
    m.insert(1883, "MQTT");
    m.insert(3389, "RDP");
    m.insert(5900, "VNC");
    m.insert(6379, "Redis");
    m.insert(8080, "HTTP Proxy");
    m.insert(8443, "HTTPS Alt");
    m.insert(8883, "MQTT Secure");
    m.insert(9000, "SonarQube / PHP-FPM");
    m.insert(9090, "Prometheus / Web Server");
    m.insert(10000, "Webmin");

    m
});

/// Look up the service label for a port. Unknown ports are first-class and
/// map to [`UNKNOWN_SERVICE`]; there is no absence signal.
pub fn service_name(port: u16) -> &'static str {
    PORT_SERVICES.get(&port).copied().unwrap_or(UNKNOWN_SERVICE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ports_map_to_labels() {
        assert_eq!(service_name(22), "SSH");
        assert_eq!(service_name(25), "SMTP");
        assert_eq!(service_name(443), "HTTPS");
        assert_eq!(service_name(5432), "PostgreSQL");
    }

    #[test]
    fn unknown_port_gets_sentinel() {
        assert_eq!(service_name(47123), UNKNOWN_SERVICE);
    }
}
