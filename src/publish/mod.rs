//! # State Publishing
//!
//! Derives the MQTT side of one association event: stable device identity,
//! topic paths, Home Assistant discovery payloads, and the fixed-order
//! sequence of publish operations.
//!
//! ## Topic Convention
//!
//! Per-field state lands under the configured namespace prefix:
//!
//! ```text
//! <prefix>/<mac>/connected     "true" / "false"
//! <prefix>/<mac>/station
//! <prefix>/<mac>/ap
//! <prefix>/<mac>/radio
//! <prefix>/<mac>/ssid
//! ```
//!
//! and Home Assistant auto-discovery config for each of those fields under
//! `homeassistant/sensor/<device id>/<field>/config`. Every message is
//! retained so a restarting consumer immediately sees the last state.
//!
//! ## Design
//!
//! Plan construction ([`plan`]) is pure: it never touches the network and
//! has no failure modes, so the exact operation sequence is unit-testable.
//! Actual delivery goes through the narrow [`transport::Transport`]
//! capability, implemented for rumqttc and for a recording fake in tests.

pub mod plan;
pub mod transport;

pub use plan::{build_publish_plan, PublishOp};
pub use transport::{deliver_plan, MqttTransport, Transport, TransportError};
