use serde_json::json;

use crate::config::PublishTarget;
use crate::syslog::DeviceState;

const DISCOVERY_BASE: &str = "homeassistant/sensor";
const CONNECTED_FIELD: &str = "connected";

/// One broker publish: topic, payload, retain flag. The transport must
/// deliver a plan's ops in the order they were built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOp {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

impl PublishOp {
    fn retained(topic: String, payload: impl Into<String>) -> Self {
        PublishOp {
            topic,
            payload: payload.into(),
            retain: true,
        }
    }
}

/// Builds the full publish sequence for one association event.
///
/// Always exactly ten operations, in this order: the connectivity state op,
/// state ops for the remaining fields ([`DeviceState::fields`] order), the
/// connectivity discovery op, then discovery ops for the same fields. The
/// connectivity discovery payload carries no availability clause; every
/// other discovery payload points its `availability_topic` at the
/// connectivity state topic.
///
/// Pure construction: identical inputs yield byte-identical output.
pub fn build_publish_plan(state: &DeviceState, target: &PublishTarget) -> Vec<PublishOp> {
    let device = DeviceIdentity::derive(state, target);

    let mut ops = Vec::with_capacity(2 + 2 * state.fields().len());

    ops.push(PublishOp::retained(
        device.state_topic(CONNECTED_FIELD),
        if state.connected { "true" } else { "false" },
    ));
    for (field, value) in state.fields() {
        ops.push(PublishOp::retained(device.state_topic(field), value));
    }

    ops.push(PublishOp::retained(
        device.discovery_topic(CONNECTED_FIELD),
        device.discovery_payload(CONNECTED_FIELD, false),
    ));
    for (field, _) in state.fields() {
        ops.push(PublishOp::retained(
            device.discovery_topic(field),
            device.discovery_payload(field, true),
        ));
    }

    ops
}

/// Stable identity a consumer uses to group the per-field sensors into one
/// device, derived from the client MAC alone.
struct DeviceIdentity {
    device_id: String,
    device_name: String,
    base_topic: String,
}

impl DeviceIdentity {
    fn derive(state: &DeviceState, target: &PublishTarget) -> Self {
        DeviceIdentity {
            device_id: format!("wifi_client_{}", state.mac),
            device_name: format!("Wifi Client {}", state.mac),
            base_topic: format!("{}/{}", target.topic, state.mac),
        }
    }

    fn state_topic(&self, field: &str) -> String {
        format!("{}/{}", self.base_topic, field)
    }

    fn discovery_topic(&self, field: &str) -> String {
        format!("{}/{}/{}/config", DISCOVERY_BASE, self.device_id, field)
    }

    /// Home Assistant discovery descriptor for one field. Key order in the
    /// serialized JSON is alphabetical and therefore stable.
    fn discovery_payload(&self, field: &str, with_availability: bool) -> String {
        let mut descriptor = json!({
            "unique_id": format!("{}_{}", self.device_id, field),
            "name": format!("{} {}", self.device_name, title_case(field)),
            "device": {
                "identifiers": self.device_id,
                "name": self.device_name,
            },
            "state_topic": self.state_topic(field),
        });
        if with_availability {
            descriptor["availability_topic"] = json!(self.state_topic(CONNECTED_FIELD));
        }
        descriptor.to_string()
    }
}

fn title_case(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
