use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::connection::{DeviceConnection, Subscription};
use crate::frame::FrameMatcher;
use crate::packet::{QueryFraming, POSITION_QUERY};
use crate::parser::{DecodedPosition, StatusFrameParser};

// ─── MonitorConfig ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub matcher: FrameMatcher,
    /// Script sent on every read.
    pub query: String,
    pub framing: QueryFraming,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            matcher: FrameMatcher::default(),
            query: POSITION_QUERY.to_string(),
            framing: QueryFraming::Tmsct,
        }
    }
}

// ─── PositionMonitor ──────────────────────────────────────────────────────

/// Live six-axis position read from a device connection.
///
/// Attaching subscribes a [`StatusFrameParser`] to the connection's inbound
/// lines; the subscription is released when the monitor is dropped or
/// [`detach`](Self::detach)ed, on every exit path.
///
/// [`value`](Self::value) is best-effort: it fires the position query and
/// returns whatever is decoded *now*, which may predate the query. Callers
/// that need a reading newer than the query use
/// [`fresh_value`](Self::fresh_value) or watch [`updates`](Self::updates).
pub struct PositionMonitor<C: DeviceConnection> {
    connection: C,
    parser: Arc<StatusFrameParser>,
    packet: String,
    subscription: Subscription,
}

impl<C: DeviceConnection> PositionMonitor<C> {
    pub fn attach(connection: C, config: MonitorConfig) -> Self {
        let parser = Arc::new(StatusFrameParser::new(config.matcher));
        let handler_parser = Arc::clone(&parser);
        let subscription = connection.subscribe(Arc::new(move |line: &str| {
            handler_parser.on_frame(line);
        }));
        Self {
            connection,
            parser,
            packet: config.framing.frame(&config.query),
            subscription,
        }
    }

    /// Send the position query, then return the current decoded value
    /// without waiting for the reply.
    pub fn value(&self) -> DecodedPosition {
        self.request();
        self.parser.current()
    }

    /// The current decoded value; sends nothing.
    pub fn current(&self) -> DecodedPosition {
        self.parser.current()
    }

    /// Send the query and wait up to `timeout` for the next recognized
    /// frame. Returns the decoded value at that point (possibly `None` if
    /// the reply was malformed or never came).
    pub async fn fresh_value(&self, timeout: Duration) -> DecodedPosition {
        let mut rx = self.parser.subscribe();
        self.request();
        if tokio::time::timeout(timeout, rx.changed()).await.is_err() {
            tracing::debug!(?timeout, "no status frame before timeout");
        }
        self.parser.current()
    }

    /// Notified on every recognized frame.
    pub fn updates(&self) -> watch::Receiver<DecodedPosition> {
        self.parser.subscribe()
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Release the subscription and hand back the connection.
    pub fn detach(self) -> C {
        let Self {
            connection,
            subscription,
            ..
        } = self;
        subscription.release();
        connection
    }

    fn request(&self) {
        if let Err(e) = self.connection.send(&self.packet) {
            tracing::warn!(error = %e, "position query not sent");
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
