//! Error definitions for the syslog parser.

use thiserror::Error;

/// Reasons a syslog line is rejected. All variants are terminal for the
/// current line; the caller reports the message and publishes nothing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Neither connectivity keyword was found anywhere in the line
    #[error(r#"malformed syslog line: must include either "connected" or "disassociated""#)]
    MissingConnectionKeyword,

    /// The line did not contain exactly two MAC addresses (station and client)
    #[error("malformed syslog line: expected exactly 2 MAC addresses, found {found}")]
    UnexpectedMacCount { found: usize },

    /// No `VSS:` label with a network name behind it
    #[error(r#"malformed syslog line: must include the SSID, e.g. "VSS:OpiNet""#)]
    MissingSsid,

    /// No `WTP:` label with an access point name behind it
    #[error(r#"malformed syslog line: must include the AP name, e.g. "WTP:OpiAP""#)]
    MissingAccessPoint,

    /// No `Radio` label with a radio number behind it
    #[error(r#"malformed syslog line: must include the radio number, e.g. "Radio1""#)]
    MissingRadio,
}
