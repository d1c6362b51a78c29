pub mod config;
pub mod publish;
pub mod syslog;

use color_eyre::eyre::{eyre, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::PublishTarget;
use crate::publish::{build_publish_plan, deliver_plan, MqttTransport};

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let target = PublishTarget::load().await?;
    let line = syslog_argument()?;

    let state = syslog::parse(&line)?;
    info!(
        mac = %state.mac,
        connected = state.connected,
        ap = %state.ap,
        ssid = %state.ssid,
        "parsed association event"
    );

    let plan = build_publish_plan(&state, &target);

    let mut transport = MqttTransport::connect(&target);
    deliver_plan(&mut transport, &plan).await?;
    transport.shutdown().await?;

    info!("published {} retained messages", plan.len());
    Ok(())
}

/// The syslog line arrives as the single process argument, typically wired
/// up as the action of the controller's log forwarder.
fn syslog_argument() -> Result<String> {
    let mut args = std::env::args().skip(1);
    match (args.next(), args.next()) {
        (Some(line), None) => Ok(line),
        _ => Err(eyre!("Usage: wifi-presence <syslog line>")),
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}
