use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::connection::{DeviceConnection, FrameBus, FrameHandler, Subscription};
use crate::error::StatusError;

// ─── LineConnection ───────────────────────────────────────────────────────

/// A device link over any byte transport that speaks newline-terminated
/// text: a TCP stream, a serial port, a capture file, a test duplex.
///
/// Two background tasks own the halves. The reader task splits inbound
/// bytes into lines and dispatches each non-blank one through the
/// connection's [`FrameBus`], with invalid UTF-8 replaced rather than
/// treated as an error; on EOF or a read error it closes the bus. The
/// writer task drains queued commands onto the writer, so
/// [`send`](DeviceConnection::send) never waits on the device.
///
/// Opening the transport is the caller's business.
pub struct LineConnection {
    bus: FrameBus,
    commands: mpsc::UnboundedSender<String>,
    reader: Option<JoinHandle<()>>,
}

impl LineConnection {
    /// Start the reader and writer tasks. Must be called inside a Tokio
    /// runtime. Subscribe to `bus` first if no early line may be missed.
    pub fn spawn<R, W>(bus: FrameBus, reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (commands, rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_lines(reader, bus.clone()));
        tokio::spawn(write_commands(writer, rx));
        LineConnection {
            bus,
            commands,
            reader: Some(reader),
        }
    }

    pub fn bus(&self) -> &FrameBus {
        &self.bus
    }

    /// Wait until the inbound side reaches EOF (or fails).
    pub async fn closed(&mut self) {
        if let Some(reader) = self.reader.take() {
            if let Err(e) = reader.await {
                tracing::warn!(error = %e, "device connection reader task failed");
                // The task never reached its own close.
                self.bus.close();
            }
        }
    }
}

impl DeviceConnection for LineConnection {
    fn send(&self, command: &str) -> Result<(), StatusError> {
        self.commands
            .send(command.to_owned())
            .map_err(|_| StatusError::ConnectionClosed("writer task has stopped".into()))
    }

    fn subscribe(&self, handler: FrameHandler) -> Subscription {
        self.bus.subscribe(handler)
    }
}

impl Drop for LineConnection {
    fn drop(&mut self) {
        // The writer task ends on its own once `commands` is dropped.
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

// ─── Tasks ────────────────────────────────────────────────────────────────

async fn read_lines<R: AsyncRead + Unpin>(reader: R, bus: FrameBus) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                tracing::debug!("device connection reached EOF");
                break;
            }
            Ok(_) => {
                // Bad bytes only spoil their own line.
                let line = String::from_utf8_lossy(trim_line_end(&buf));
                if line.trim().is_empty() {
                    continue;
                }
                bus.dispatch(&line);
            }
            Err(e) => {
                tracing::warn!(error = %e, "device connection read failed");
                break;
            }
        }
    }
    bus.close();
}

/// Strip a trailing `\n`, then a trailing `\r`.
fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

async fn write_commands<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(command) = rx.recv().await {
        if let Err(e) = write_command(&mut writer, &command).await {
            tracing::warn!(error = %e, "device connection write failed");
            break;
        }
    }
}

async fn write_command<W: AsyncWrite + Unpin>(
    writer: &mut W,
    command: &str,
) -> std::io::Result<()> {
    writer.write_all(command.as_bytes()).await?;
    writer.flush().await
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::FrameStream;
    use futures::StreamExt;
    use tokio::io::{duplex, AsyncReadExt};

    #[tokio::test]
    async fn dispatches_non_blank_lines_until_eof() {
        let bus = FrameBus::new();
        let frames = FrameStream::subscribe(&bus);
        let input: &[u8] = b"$TMSTA,1\r\n\r\n   \nsecond\nlast-without-newline";
        let mut conn = LineConnection::spawn(bus, input, tokio::io::sink());

        conn.closed().await;
        assert!(conn.bus().is_closed());
        let lines: Vec<String> = frames.collect().await;
        assert_eq!(lines, vec!["$TMSTA,1", "second", "last-without-newline"]);
    }

    #[tokio::test]
    async fn invalid_utf8_line_does_not_end_the_connection() {
        let bus = FrameBus::new();
        let frames = FrameStream::subscribe(&bus);
        let input: &[u8] =
            b"$TMSTA,1,00,\xff\xfe noise\r\n$TMSTA,50,90,{1,2,3,4,5,6},*00\r\n";
        let mut conn = LineConnection::spawn(bus, input, tokio::io::sink());

        conn.closed().await;
        let lines: Vec<String> = frames.collect().await;
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("$TMSTA,1,00,"));
        assert!(lines[0].contains('\u{FFFD}'));
        assert_eq!(lines[1], "$TMSTA,50,90,{1,2,3,4,5,6},*00");
    }

    #[test]
    fn trims_lf_and_crlf_only() {
        assert_eq!(trim_line_end(b"a\r\n"), b"a");
        assert_eq!(trim_line_end(b"a\n"), b"a");
        assert_eq!(trim_line_end(b"a"), b"a");
        assert_eq!(trim_line_end(b"a\r"), b"a");
    }

    struct PanickingReader;

    impl AsyncRead for PanickingReader {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            panic!("transport blew up");
        }
    }

    #[tokio::test]
    async fn failed_reader_task_still_closes() {
        let bus = FrameBus::new();
        let frames = FrameStream::subscribe(&bus);
        let mut conn = LineConnection::spawn(bus, PanickingReader, tokio::io::sink());

        conn.closed().await;
        assert!(conn.bus().is_closed());
        let lines: Vec<String> = frames.collect().await;
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn send_writes_commands_in_order() {
        let (device, mut host) = duplex(256);
        let (_device_read, device_write) = tokio::io::split(device);
        // `host` reads whatever the connection writes to the device.
        let conn = LineConnection::spawn(FrameBus::new(), tokio::io::empty(), device_write);

        conn.send("first\r\n").unwrap();
        conn.send("second\r\n").unwrap();

        let mut buf = vec![0u8; "first\r\nsecond\r\n".len()];
        host.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, b"first\r\nsecond\r\n");
    }
}
