//! Mock EventTransport for testing.
//!
//! Each call to `open` consumes the next scripted attempt. An attempt either
//! fails outright or yields a stream fed by the test through a [`StreamFeed`],
//! which lets tests deliver chunks at chosen moments, including after the
//! session has moved on. A gated attempt keeps `open` pending until its
//! [`OpenGate`] is released.
//!
//! # Example
//!
//! ```ignore
//! let transport = Arc::new(MockEventTransport::new());
//! transport.push_failure(TransportError::connect("refused"));
//! let feed = transport.push_stream();
//! feed.send("event: connected\n\n");
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};

use crate::ports::{ByteStream, EventTransport, StreamRequest, TransportError};

type Chunk = Result<Bytes, TransportError>;

enum ScriptedAttempt {
    Fail(TransportError),
    Stream(mpsc::UnboundedReceiver<Chunk>),
    Gated(oneshot::Receiver<()>, mpsc::UnboundedReceiver<Chunk>),
}

fn into_byte_stream(receiver: mpsc::UnboundedReceiver<Chunk>) -> ByteStream {
    Box::pin(stream::unfold(receiver, |mut receiver| async move {
        receiver.recv().await.map(|chunk| (chunk, receiver))
    }))
}

/// Test-side handle holding a gated `open` call.
#[derive(Debug)]
pub struct OpenGate {
    release: oneshot::Sender<()>,
}

impl OpenGate {
    /// Lets the pending `open` complete. A no-op if the caller gave up.
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

/// Test-side handle for an open scripted stream.
///
/// Dropping the feed ends the stream as a remote close would.
#[derive(Debug)]
pub struct StreamFeed {
    sender: mpsc::UnboundedSender<Chunk>,
}

impl StreamFeed {
    /// Delivers a chunk. Returns false if the connection is already gone.
    pub fn send(&self, text: &str) -> bool {
        self.send_bytes(text.as_bytes())
    }

    /// Delivers raw bytes. Returns false if the connection is already gone.
    pub fn send_bytes(&self, bytes: &[u8]) -> bool {
        self.sender.send(Ok(Bytes::copy_from_slice(bytes))).is_ok()
    }

    /// Breaks the stream with `error`.
    pub fn fail(self, error: TransportError) {
        let _ = self.sender.send(Err(error));
    }

    /// Returns true once the reading side has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Scripted transport recording every request it receives.
///
/// Attempts beyond the script fail with a connection error.
#[derive(Default)]
pub struct MockEventTransport {
    script: Mutex<VecDeque<ScriptedAttempt>>,
    requests: Mutex<Vec<StreamRequest>>,
}

impl MockEventTransport {
    /// Creates a transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a failed attempt.
    pub fn push_failure(&self, error: TransportError) {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedAttempt::Fail(error));
    }

    /// Scripts a successful attempt and returns its feed.
    pub fn push_stream(&self) -> StreamFeed {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedAttempt::Stream(receiver));
        StreamFeed { sender }
    }

    /// Scripts an attempt whose `open` stays pending until the gate is released.
    pub fn push_gated(&self) -> (OpenGate, StreamFeed) {
        let (release, gate) = oneshot::channel();
        let (sender, receiver) = mpsc::unbounded_channel();
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedAttempt::Gated(gate, receiver));
        (OpenGate { release }, StreamFeed { sender })
    }

    /// Number of `open` calls so far.
    pub fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// All requests received, in order.
    pub fn requests(&self) -> Vec<StreamRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventTransport for MockEventTransport {
    async fn open(&self, request: StreamRequest) -> Result<ByteStream, TransportError> {
        self.requests.lock().unwrap().push(request);

        let attempt = self.script.lock().unwrap().pop_front();
        match attempt {
            Some(ScriptedAttempt::Stream(receiver)) => Ok(into_byte_stream(receiver)),
            Some(ScriptedAttempt::Gated(gate, receiver)) => match gate.await {
                Ok(()) => Ok(into_byte_stream(receiver)),
                Err(_) => Err(TransportError::connect("gate dropped")),
            },
            Some(ScriptedAttempt::Fail(error)) => Err(error),
            None => Err(TransportError::connect("no scripted attempt")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ProjectId;
    use futures::StreamExt;

    fn request() -> StreamRequest {
        StreamRequest::new(ProjectId::new("p").unwrap(), None)
    }

    #[tokio::test]
    async fn attempts_follow_the_script() {
        let transport = MockEventTransport::new();
        transport.push_failure(TransportError::Unauthorized { status: 401 });
        let feed = transport.push_stream();

        assert!(matches!(
            transport.open(request()).await,
            Err(TransportError::Unauthorized { status: 401 })
        ));

        let mut stream = transport.open(request()).await.unwrap();
        feed.send("data: x\n\n");
        drop(feed);

        assert_eq!(stream.next().await, Some(Ok(Bytes::from_static(b"data: x\n\n"))));
        assert_eq!(stream.next().await, None);
        assert!(transport.open(request()).await.is_err());
        assert_eq!(transport.attempts(), 3);
    }

    #[tokio::test]
    async fn gated_attempt_waits_for_release() {
        let transport = std::sync::Arc::new(MockEventTransport::new());
        let (gate, feed) = transport.push_gated();

        let opening = tokio::spawn({
            let transport = transport.clone();
            async move { transport.open(request()).await }
        });
        tokio::task::yield_now().await;
        assert!(!opening.is_finished());

        gate.release();
        let mut stream = opening.await.unwrap().unwrap();
        feed.send("event: late\n\n");
        assert_eq!(stream.next().await, Some(Ok(Bytes::from_static(b"event: late\n\n"))));
    }
}
