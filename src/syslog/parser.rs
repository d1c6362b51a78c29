use super::error::ParseError;

const KEYWORD_CONNECTED: &str = "connected";
const KEYWORD_DISASSOCIATED: &str = "disassociated";

/// Everything extracted from one association event. Constructed only by
/// [`parse`], never mutated afterwards, and lives only for the duration of
/// one publish cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    /// Client hardware address, the second MAC token in the line
    pub mac: String,
    /// True iff the line reported `connected` rather than `disassociated`
    pub connected: bool,
    /// The access point's radio interface, the first MAC token in the line
    pub station: String,
    /// Access point name, from the `WTP:` label
    pub ap: String,
    /// Radio/band number, from the `Radio` label
    pub radio: String,
    /// Network name, from the `VSS:` label
    pub ssid: String,
}

impl DeviceState {
    /// Per-field state values in publish order, connectivity excluded.
    ///
    /// The publish sequence is fixed by this list, not by the struct
    /// declaration, so reordering fields above cannot silently change the
    /// topics a consumer sees.
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("station", self.station.as_str()),
            ("ap", self.ap.as_str()),
            ("radio", self.radio.as_str()),
            ("ssid", self.ssid.as_str()),
        ]
    }
}

/// Parses one syslog line into a [`DeviceState`].
///
/// The five extractions are independent scans over the same input; a line is
/// accepted only if all of them succeed. The first failing check in the
/// order below determines the reported error.
pub fn parse(line: &str) -> Result<DeviceState, ParseError> {
    let connected = connection_keyword(line).ok_or(ParseError::MissingConnectionKeyword)?;

    let macs = find_mac_tokens(line);
    let [station, mac] = <[String; 2]>::try_from(macs)
        .map_err(|macs| ParseError::UnexpectedMacCount { found: macs.len() })?;

    let ssid = labeled_token(line, "VSS:", is_word_char).ok_or(ParseError::MissingSsid)?;
    let ap = labeled_token(line, "WTP:", is_word_char).ok_or(ParseError::MissingAccessPoint)?;
    let radio =
        labeled_token(line, "Radio", |c| c.is_ascii_digit()).ok_or(ParseError::MissingRadio)?;

    Ok(DeviceState {
        mac,
        connected,
        station,
        ap,
        radio,
        ssid,
    })
}

/// Finds the earliest connectivity keyword. Returns `Some(true)` only when
/// that keyword is exactly `connected` — the state is decided by which
/// keyword matched, never by a containment test, so `disassociated` can
/// never read as connected.
fn connection_keyword(line: &str) -> Option<bool> {
    match (line.find(KEYWORD_CONNECTED), line.find(KEYWORD_DISASSOCIATED)) {
        (Some(c), Some(d)) => Some(c < d),
        (Some(_), None) => Some(true),
        (None, Some(_)) => Some(false),
        (None, None) => None,
    }
}

/// Collects all non-overlapping tokens of the form `hh:hh:hh:hh:hh:hh`
/// (six case-insensitive hex pairs), left to right.
fn find_mac_tokens(line: &str) -> Vec<String> {
    const MAC_LEN: usize = 17;
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i + MAC_LEN <= bytes.len() {
        match mac_at(&bytes[i..i + MAC_LEN]) {
            Some(token) => {
                tokens.push(token);
                i += MAC_LEN;
            }
            None => i += 1,
        }
    }
    tokens
}

/// Checks one 17-byte window against the MAC shape: hex pairs at byte
/// offsets 0-1, 3-4, ... and colons at 2, 5, 8, 11, 14.
fn mac_at(window: &[u8]) -> Option<String> {
    let shaped = window.iter().enumerate().all(|(idx, &b)| match idx % 3 {
        2 => b == b':',
        _ => b.is_ascii_hexdigit(),
    });
    if !shaped {
        return None;
    }
    // All-ASCII by construction, so the window is valid UTF-8.
    String::from_utf8(window.to_vec()).ok()
}

/// Extracts the run of accepted characters immediately following `label`.
/// An occurrence of the label with nothing acceptable behind it does not
/// satisfy the extraction; a later occurrence still can.
fn labeled_token(line: &str, label: &str, accept: fn(char) -> bool) -> Option<String> {
    for (idx, _) in line.match_indices(label) {
        let token: String = line[idx + label.len()..]
            .chars()
            .take_while(|&c| accept(c))
            .collect();
        if !token.is_empty() {
            return Some(token);
        }
    }
    None
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
