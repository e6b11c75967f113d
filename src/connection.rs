//! Per-client connection loop.
//!
//! Ported from `examples/original_source/server.py`'s
//! `_handle_connection`. The roster actor (module D) owns all chat
//! state; this module only owns the socket and forwards lines to it,
//! the way the teacher crate's background tasks (`src/retention.rs`,
//! `src/webhooks.rs`) are `tokio::spawn`ed loops that talk to shared
//! state through a channel/mutex rather than holding it themselves.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{info, info_span, warn, Instrument};

use crate::roster::RosterHandle;

/// Bytes read per `read()` call. The server treats each `read(1024)` as
/// a single logical request — no newline reframing. We document and
/// preserve that rather than silently adding a `LinesCodec`.
const READ_CHUNK: usize = 1024;

/// Drives one client connection end-to-end: registers with the roster,
/// reads raw chunks until EOF/error, forwards each as one command line,
/// and tears the session down on exit. Generic over the stream so tests
/// can drive it with an in-memory duplex pair instead of a real socket.
pub async fn handle<S>(stream: S, peer: String, roster: RosterHandle)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut read_half, mut write_half) = tokio::io::split(stream);

    let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel::<String>();
    let id = roster.connect(peer.clone(), outgoing_tx).await;

    let span = info_span!("connection", session = id, %peer);
    async move {
        let writer_task = tokio::spawn(async move {
            while let Some(line) = outgoing_rx.recv().await {
                if write_half.write_all(line.as_bytes()).await.is_err() {
                    break;
                }
                if write_half.write_all(b"\n").await.is_err() {
                    break;
                }
                if write_half.flush().await.is_err() {
                    break;
                }
            }
        });

        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            match read_half.read(&mut buf).await {
                Ok(0) => {
                    info!("connection closed by peer");
                    break;
                }
                Ok(n) => {
                    let line = String::from_utf8_lossy(&buf[..n]).into_owned();
                    roster.line(id, line);
                }
                Err(err) => {
                    warn!(%err, "connection error");
                    break;
                }
            }
        }

        roster.disconnect(id);
        writer_task.abort();
    }
    .instrument(span)
    .await;
}
