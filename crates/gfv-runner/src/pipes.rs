// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stdin feeding and output draining tasks.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::ChildStdin;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const READ_CHUNK: usize = 8 * 1024;

/// Shared capture buffer, readable after the draining task is aborted.
pub(crate) type Capture = Arc<Mutex<Vec<u8>>>;

/// Write `input` fully, then close stdin by dropping it.
///
/// A child that exits (or closes stdin) before reading everything is not an
/// error: the payload was offered and the tool chose not to consume it.
pub(crate) async fn feed(mut stdin: ChildStdin, input: Vec<u8>) -> io::Result<()> {
    if !input.is_empty() {
        match stdin.write_all(&input).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!(target: "gfv.runner", "child closed stdin before reading all input");
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        match stdin.shutdown().await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
            Err(e) => return Err(e),
        }
    }
    drop(stdin);
    Ok(())
}

/// Read `reader` to EOF, appending to `capture` as data arrives.
pub(crate) async fn drain<R>(mut reader: R, capture: Capture) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        capture
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(&chunk[..n]);
    }
}

/// A draining task plus the buffer it fills.
pub(crate) struct Drain {
    task: JoinHandle<io::Result<()>>,
    capture: Capture,
    stream: &'static str,
}

impl Drain {
    pub(crate) fn spawn<R>(reader: R, stream: &'static str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let capture = Capture::default();
        let task = tokio::spawn(drain(reader, Arc::clone(&capture)));
        Self {
            task,
            capture,
            stream,
        }
    }

    /// Wait up to `grace` for EOF, then return everything captured.
    ///
    /// The error is the read failure, if the stream broke before EOF.
    pub(crate) async fn finish(mut self, grace: Duration) -> (Vec<u8>, Option<String>) {
        let outcome = tokio::time::timeout(grace, &mut self.task).await;
        let failure = match outcome {
            Ok(Ok(Ok(()))) => None,
            Ok(Ok(Err(e))) => {
                warn!(target: "gfv.runner", stream = self.stream, error = %e, "pipe read failed");
                Some(format!("failed to read {}: {e}", self.stream))
            }
            Ok(Err(join)) => Some(format!("{} reader task failed: {join}", self.stream)),
            Err(_) => {
                warn!(
                    target: "gfv.runner",
                    stream = self.stream,
                    "stream still open after exit; keeping partial output"
                );
                self.task.abort();
                None
            }
        };
        let bytes = std::mem::take(&mut *self.capture.lock().unwrap_or_else(PoisonError::into_inner));
        (bytes, failure)
    }
}
