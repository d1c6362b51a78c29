//! # Syslog Line Parser
//!
//! Turns one wireless-controller syslog line describing a client
//! association/disassociation event into a validated [`DeviceState`],
//! or a descriptive [`ParseError`].
//!
//! ## Line Format
//!
//! The controller emits lines carrying five independent pieces of
//! information, in no guaranteed order:
//!
//! - the keyword `connected` or `disassociated`
//! - exactly two MAC addresses: the access point's radio interface first,
//!   the client second
//! - the network name behind a `VSS:` label, e.g. `VSS:OpiNet`
//! - the access point name behind a `WTP:` label, e.g. `WTP:OpiAP`
//! - the radio number behind a `Radio` label, e.g. `Radio1`
//!
//! ## Design
//!
//! Parsing is all-or-nothing: every extraction must succeed or the whole
//! line is rejected, and no partial record ever leaves this module. The
//! extractions scan the line independently without consuming it, so their
//! order carries no semantics beyond which error is reported first.

pub mod error;
pub mod parser;

pub use error::ParseError;
pub use parser::{parse, DeviceState};
