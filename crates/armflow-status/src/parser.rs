use tokio::sync::watch;

use crate::frame::{FrameMatcher, FrameOutcome, Position};

/// Latest decoded position, or `None` when unavailable.
pub type DecodedPosition = Option<Position>;

// ─── StatusFrameParser ────────────────────────────────────────────────────

/// Stateful decoder over inbound status frames.
///
/// Holds the last decoded position in a `watch` channel: every write swaps
/// the whole value, so a reader on another thread never sees a partially
/// updated reading. Malformed frames clear the value; unrecognized frames
/// leave it alone. Nothing here returns an error.
#[derive(Debug)]
pub struct StatusFrameParser {
    matcher: FrameMatcher,
    tx: watch::Sender<DecodedPosition>,
}

impl Default for StatusFrameParser {
    fn default() -> Self {
        Self::new(FrameMatcher::default())
    }
}

impl StatusFrameParser {
    pub fn new(matcher: FrameMatcher) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { matcher, tx }
    }

    pub fn matcher(&self) -> &FrameMatcher {
        &self.matcher
    }

    /// Feed one raw inbound line.
    pub fn on_frame(&self, raw: &str) -> FrameOutcome {
        let outcome = self.matcher.decode(raw);
        match &outcome {
            FrameOutcome::Decoded { position } => {
                tracing::trace!(%position, "decoded status frame");
                self.tx.send_replace(Some(*position));
            }
            FrameOutcome::Malformed { reason } => {
                tracing::debug!(reason = %reason, "malformed status frame; position unavailable");
                self.tx.send_replace(None);
            }
            FrameOutcome::Unrecognized => {}
        }
        outcome
    }

    /// The value as of the last recognized frame.
    pub fn current(&self) -> DecodedPosition {
        *self.tx.borrow()
    }

    /// A receiver that is notified whenever a recognized frame lands, even
    /// if the decoded value did not change.
    pub fn subscribe(&self) -> watch::Receiver<DecodedPosition> {
        self.tx.subscribe()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
