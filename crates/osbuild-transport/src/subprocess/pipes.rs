//! Stream pumps for the engine's standard streams
//!
//! Each pump owns one end of the child's pipes and runs until that stream is
//! finished. The invoker polls all three together so that a child blocked on
//! one stream never stalls the others.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

const DIAGNOSTIC_CHUNK: usize = 8 * 1024;

/// Write the encoded manifest and close the stream.
///
/// Dropping `stdin` on return is what signals end-of-input to the engine.
pub(crate) async fn write_manifest<W>(mut stdin: W, payload: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    stdin.write_all(payload).await?;
    stdin.flush().await?;
    stdin.shutdown().await?;
    debug!(bytes = payload.len(), "manifest written");
    Ok(())
}

/// Read the output stream to end-of-stream.
pub(crate) async fn read_output<R>(mut stdout: R) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut output = Vec::new();
    stdout.read_to_end(&mut output).await?;
    debug!(bytes = output.len(), "output read");
    Ok(output)
}

/// Copy diagnostic text into `sink` until the stream ends.
///
/// A failing sink does not stop the pump: the rest of the stream is still
/// drained so the engine never blocks on a full stderr pipe. Returns the
/// number of bytes delivered to the sink.
pub(crate) async fn forward_diagnostics<R, W>(mut stderr: R, sink: &mut W) -> u64
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; DIAGNOSTIC_CHUNK];
    let mut delivered = 0u64;
    let mut sink_open = true;

    loop {
        let n = match stderr.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                warn!(error = %err, "error reading osbuild stderr");
                break;
            }
        };

        if !sink_open {
            continue;
        }

        match sink.write_all(&buf[..n]).await {
            Ok(()) => delivered += n as u64,
            Err(err) => {
                warn!(error = %err, "diagnostic sink failed; discarding remaining stderr");
                sink_open = false;
            }
        }
    }

    if sink_open && let Err(err) = sink.flush().await {
        warn!(error = %err, "error flushing diagnostic sink");
    }

    delivered
}
