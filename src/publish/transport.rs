use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use thiserror::Error;
use tracing::{debug, info};

use super::plan::PublishOp;
use crate::config::PublishTarget;

const CLIENT_ID: &str = "wifi_presence";
const KEEP_ALIVE: Duration = Duration::from_secs(5);

/// Errors surfaced by the broker transport. Terminal for the process; the
/// core performs no retries.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to queue publish: {0}")]
    Queue(#[from] rumqttc::ClientError),

    #[error("broker connection failed: {0}")]
    Connection(#[from] rumqttc::ConnectionError),
}

/// The one capability the core needs from a broker client. Keeping it this
/// narrow lets tests observe the exact operation sequence with a recording
/// fake instead of a live connection.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        retain: bool,
    ) -> Result<(), TransportError>;
}

/// Hands every op of a plan to the transport, preserving plan order.
pub async fn deliver_plan<T: Transport>(
    transport: &mut T,
    plan: &[PublishOp],
) -> Result<(), TransportError> {
    for op in plan {
        transport.publish(&op.topic, &op.payload, op.retain).await?;
    }
    Ok(())
}

/// rumqttc-backed transport: queues publishes at QoS 1 and drives the event
/// loop on shutdown until the broker has acknowledged all of them.
pub struct MqttTransport {
    client: AsyncClient,
    eventloop: EventLoop,
    in_flight: usize,
}

impl MqttTransport {
    pub fn connect(target: &PublishTarget) -> Self {
        let mut options = MqttOptions::new(CLIENT_ID, &target.host, target.port);
        options
            .set_credentials(&target.user, &target.password)
            .set_keep_alive(KEEP_ALIVE);

        let (client, eventloop) = AsyncClient::new(options, 16);

        MqttTransport {
            client,
            eventloop,
            in_flight: 0,
        }
    }

    /// Waits for the broker to acknowledge every queued publish, then
    /// disconnects cleanly.
    pub async fn shutdown(mut self) -> Result<(), TransportError> {
        while self.in_flight > 0 {
            match self.eventloop.poll().await? {
                Event::Incoming(Packet::ConnAck(_)) => {
                    debug!("broker accepted connection");
                }
                Event::Incoming(Packet::PubAck(_)) => {
                    self.in_flight -= 1;
                }
                event => debug!(?event, "ignoring event while draining"),
            }
        }

        self.client.disconnect().await?;
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
                Ok(_) => continue,
                // The broker closing the socket after our disconnect is the
                // expected end of the session.
                Err(_) => break,
            }
        }

        info!("disconnected from broker");
        Ok(())
    }
}

impl Transport for MqttTransport {
    async fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        retain: bool,
    ) -> Result<(), TransportError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, retain, payload)
            .await?;
        self.in_flight += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::plan::build_publish_plan;
    use crate::syslog::DeviceState;

    #[derive(Default)]
    struct RecordingTransport {
        ops: Vec<(String, String, bool)>,
    }

    impl Transport for RecordingTransport {
        async fn publish(
            &mut self,
            topic: &str,
            payload: &str,
            retain: bool,
        ) -> Result<(), TransportError> {
            self.ops.push((topic.to_string(), payload.to_string(), retain));
            Ok(())
        }
    }

    #[tokio::test]
    async fn deliver_plan_preserves_op_order() {
        let state = DeviceState {
            mac: "aa:bb:cc:dd:ee:02".into(),
            connected: false,
            station: "aa:bb:cc:dd:ee:01".into(),
            ap: "OpiAP".into(),
            radio: "1".into(),
            ssid: "OpiNet".into(),
        };
        let target = PublishTarget {
            host: "broker.local".into(),
            port: 1883,
            user: "wifi".into(),
            password: "secret".into(),
            topic: "wifi/clients".into(),
        };

        let plan = build_publish_plan(&state, &target);
        let mut transport = RecordingTransport::default();
        deliver_plan(&mut transport, &plan).await.unwrap();

        assert_eq!(transport.ops.len(), plan.len());
        for (recorded, op) in transport.ops.iter().zip(&plan) {
            assert_eq!(recorded, &(op.topic.clone(), op.payload.clone(), op.retain));
        }
    }
}
