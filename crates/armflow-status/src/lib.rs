//! `armflow-status`: live position decoding for TM-series robot arms.
//!
//! The controller streams newline-terminated telemetry lines. Lines that
//! start with `$TMSTA` and carry channel `90` in their third field answer a
//! position query; their `{...}` payload holds six comma-separated numbers.
//!
//! # Architecture
//!
//! ```text
//! transport (AsyncRead/AsyncWrite, opened by the caller)
//!     │
//!     ▼
//! LineConnection   ← reader task splits lines, writer task drains commands
//!     │
//!     ▼
//! FrameBus         ← per-connection fan-out; Subscription guards unregister
//!     │
//!     ├──► StatusFrameParser  ← recognize, decode, publish via watch channel
//!     │        ▲
//!     │   PositionMonitor     ← sends the (TMSCT-framed) query, reads value
//!     │
//!     └──► FrameStream        ← futures::Stream of raw lines
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use armflow_status::{FrameBus, LineConnection, MonitorConfig, PositionMonitor};
//!
//! let stream = tokio::net::TcpStream::connect("192.168.1.10:5890").await?;
//! let (rd, wr) = stream.into_split();
//! let conn = LineConnection::spawn(FrameBus::new(), rd, wr);
//! let monitor = PositionMonitor::attach(&conn, MonitorConfig::default());
//!
//! let reading = monitor.fresh_value(std::time::Duration::from_millis(200)).await;
//! ```

pub mod connection;
pub mod error;
pub mod frame;
pub mod line;
pub mod monitor;
pub mod packet;
pub mod parser;
pub mod stream;


pub use connection::{DeviceConnection, FrameBus, FrameHandler, Subscription};
pub use error::StatusError;
pub use frame::{FrameMatcher, FrameOutcome, Position, AXES};
pub use line::LineConnection;
pub use monitor::{MonitorConfig, PositionMonitor};
pub use packet::{encode_tmsct, QueryFraming, POSITION_QUERY};
pub use parser::{DecodedPosition, StatusFrameParser};
pub use stream::FrameStream;

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, StatusError>;
