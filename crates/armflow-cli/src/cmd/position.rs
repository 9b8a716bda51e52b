use crate::output::print_json;
use crate::status::{load_status, monitor_config};
use anyhow::Context;
use armflow_status::{
    DecodedPosition, FrameBus, LineConnection, MonitorConfig, Position, PositionMonitor,
};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tokio::net::TcpStream;

#[derive(Debug, Serialize)]
struct PositionReport<'a> {
    addr: &'a str,
    /// `null` when no well-formed reply arrived in time.
    position: Option<Position>,
}

/// Connect to the controller at `addr`, send the position query from the
/// plan's `status` section and print the reply.
pub fn run(
    plan_path: Option<&Path>,
    addr: &str,
    timeout: Duration,
    json: bool,
) -> anyhow::Result<()> {
    let config = monitor_config(&load_status(plan_path)?)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let position = rt.block_on(query(addr, config, timeout))?;

    if json {
        return print_json(&PositionReport { addr, position });
    }
    match position {
        Some(p) => println!("position: {p}"),
        None => println!("position: unavailable"),
    }
    Ok(())
}

async fn query(
    addr: &str,
    config: MonitorConfig,
    timeout: Duration,
) -> anyhow::Result<DecodedPosition> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .with_context(|| format!("timed out connecting to {addr}"))?
        .with_context(|| format!("failed to connect to {addr}"))?;
    let (rd, wr) = stream.into_split();
    let conn = LineConnection::spawn(FrameBus::new(), rd, wr);
    let monitor = PositionMonitor::attach(&conn, config);
    let position = monitor.fresh_value(timeout).await;
    if position.is_none() {
        tracing::warn!(%addr, "no position reply from controller");
    }
    Ok(position)
}
