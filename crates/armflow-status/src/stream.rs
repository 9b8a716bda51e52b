use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::connection::{FrameBus, Subscription};

// ─── FrameStream ──────────────────────────────────────────────────────────

/// An async stream of raw inbound lines from a [`FrameBus`].
///
/// Backed by an unbounded Tokio channel fed from a bus handler, so the
/// delivering side never waits on a slow consumer. The stream ends once the
/// bus is closed (inbound EOF). Dropping it releases the subscription.
///
/// Subscribe before the connection starts reading, or early lines are
/// missed:
///
/// ```rust,ignore
/// let bus = FrameBus::new();
/// let mut frames = FrameStream::subscribe(&bus);
/// let conn = LineConnection::spawn(bus, reader, writer);
/// while let Some(line) = frames.next().await {
///     println!("{line}");
/// }
/// ```
pub struct FrameStream {
    rx: mpsc::UnboundedReceiver<String>,
    _subscription: Subscription,
}

impl FrameStream {
    pub fn subscribe(bus: &FrameBus) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = bus.subscribe(Arc::new(move |line: &str| {
            // Receiver dropped means the stream is gone; nothing to do.
            let _ = tx.send(line.to_owned());
        }));
        FrameStream {
            rx,
            _subscription: subscription,
        }
    }
}

impl Stream for FrameStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
