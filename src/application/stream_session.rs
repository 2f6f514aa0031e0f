//! Stream Session - owns one long-lived event stream subscription.
//!
//! The session is an actor: a single task owns the subscription key, the
//! frame decoder, the in-flight connection and the reconnect timer. Callers
//! hold a cloneable [`StreamSession`] handle and observe a [`SessionSnapshot`]
//! through a `watch` channel.
//!
//! Every connection attempt gets a generation number. The reading task tags
//! each message with it, and the actor drops anything whose generation is
//! not current, so nothing from a torn-down stream is ever decoded or routed.
//!
//! ```text
//! transport ──chunks──► actor ──► FrameDecoder ──records──► EventRouter
//!                        │
//!                        └──► watch<SessionSnapshot>
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::event_router::EventRouter;
use super::timer_slot::TimerSlot;
use crate::domain::foundation::{ProjectId, StateMachine};
use crate::domain::stream::{FrameDecoder, RouteDecision, SessionState, SubscriptionKey};
use crate::ports::{
    CredentialProvider, EventTransport, HealthReporter, StreamRequest, TransportError,
};

/// Default delay before reconnecting after a drop.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Observable state of a session, published as one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub target: Option<ProjectId>,
    /// True once the handshake event arrived on the current connection.
    pub connected: bool,
    pub last_event: Option<String>,
    pub last_error: Option<String>,
    pub reconnect_pending: bool,
}

enum SessionCommand {
    Activate {
        project_id: ProjectId,
        credential: Option<String>,
        ack: oneshot::Sender<()>,
    },
    Deactivate {
        ack: oneshot::Sender<()>,
    },
}

enum ConnectionEvent {
    Opened {
        generation: u64,
    },
    Chunk {
        generation: u64,
        bytes: Bytes,
    },
    Closed {
        generation: u64,
        error: Option<TransportError>,
    },
}

impl ConnectionEvent {
    fn generation(&self) -> u64 {
        match self {
            Self::Opened { generation }
            | Self::Chunk { generation, .. }
            | Self::Closed { generation, .. } => *generation,
        }
    }
}

/// Builder for [`StreamSession`].
pub struct StreamSessionBuilder {
    transport: Arc<dyn EventTransport>,
    router: Arc<EventRouter>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    health: Option<Arc<dyn HealthReporter>>,
    reconnect_delay: Duration,
}

impl StreamSessionBuilder {
    /// Reads the credential from `provider` on every connection attempt.
    /// The credential given to `update_target` is used only when the
    /// provider has none.
    pub fn with_credentials(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(provider);
        self
    }

    /// Forwards connectivity-class transport errors to `reporter`.
    pub fn with_health_reporter(mut self, reporter: Arc<dyn HealthReporter>) -> Self {
        self.health = Some(reporter);
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Spawns the session actor in `Idle`. Must be called inside a Tokio
    /// runtime.
    pub fn spawn(self) -> StreamSession {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let actor = SessionActor {
            transport: self.transport,
            router: self.router,
            credentials: self.credentials,
            health: self.health,
            reconnect_delay: self.reconnect_delay,
            commands: commands_rx,
            events_tx,
            events_rx,
            snapshot_tx,
            snapshot: SessionSnapshot::default(),
            key: None,
            decoder: FrameDecoder::new(),
            generation: 0,
            connection: None,
            reconnect: TimerSlot::new(),
        };
        tokio::spawn(actor.run());

        StreamSession {
            commands: commands_tx,
            snapshot: snapshot_rx,
        }
    }
}

/// Handle to a running stream session. Cheap to clone.
///
/// The actor shuts down, closing any open connection, once every handle
/// has been dropped.
#[derive(Clone)]
pub struct StreamSession {
    commands: mpsc::UnboundedSender<SessionCommand>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl StreamSession {
    pub fn builder(
        transport: Arc<dyn EventTransport>,
        router: Arc<EventRouter>,
    ) -> StreamSessionBuilder {
        StreamSessionBuilder {
            transport,
            router,
            credentials: None,
            health: None,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    /// Points the session at `project_id`, or tears it down when `active`
    /// is false.
    ///
    /// - inactive: closes the connection, cancels any pending reconnect,
    ///   clears the buffer and returns to `Idle`
    /// - new project: full teardown, then connect
    /// - same project: connects only if no connection is in flight; a new
    ///   credential is kept for the next attempt
    ///
    /// Resolves once the session has applied the change, so nothing from a
    /// torn-down stream is routed after this returns.
    pub async fn update_target(
        &self,
        project_id: ProjectId,
        credential: Option<String>,
        active: bool,
    ) {
        let (ack, done) = oneshot::channel();
        let command = if active {
            SessionCommand::Activate {
                project_id,
                credential,
                ack,
            }
        } else {
            SessionCommand::Deactivate { ack }
        };
        self.send(command, done).await;
    }

    /// Same as `update_target` with `active = false`.
    pub async fn deactivate(&self) {
        let (ack, done) = oneshot::channel();
        self.send(SessionCommand::Deactivate { ack }, done).await;
    }

    /// Current observable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.snapshot.borrow().connected
    }

    /// Receiver notified on every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    async fn send(&self, command: SessionCommand, done: oneshot::Receiver<()>) {
        if self.commands.send(command).is_err() {
            warn!("stream session task is gone");
            return;
        }
        let _ = done.await;
    }
}

struct SessionActor {
    transport: Arc<dyn EventTransport>,
    router: Arc<EventRouter>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    health: Option<Arc<dyn HealthReporter>>,
    reconnect_delay: Duration,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    events_tx: mpsc::UnboundedSender<ConnectionEvent>,
    events_rx: mpsc::UnboundedReceiver<ConnectionEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    snapshot: SessionSnapshot,
    key: Option<SubscriptionKey>,
    decoder: FrameDecoder,
    generation: u64,
    connection: Option<JoinHandle<()>>,
    reconnect: TimerSlot,
}

impl SessionActor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },

                Some(event) = self.events_rx.recv() => self.handle_connection_event(event),

                _ = self.reconnect.fired() => self.reconnect_due(),
            }
            self.publish();
        }

        self.teardown();
        debug!("stream session stopped: all handles dropped");
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Activate {
                project_id,
                credential,
                ack,
            } => {
                self.activate(project_id, credential);
                self.publish();
                let _ = ack.send(());
            }
            SessionCommand::Deactivate { ack } => {
                self.teardown();
                self.key = None;
                self.snapshot.target = None;
                self.publish();
                let _ = ack.send(());
            }
        }
    }

    fn activate(&mut self, project_id: ProjectId, credential: Option<String>) {
        match self.key.as_mut() {
            Some(key) if key.targets(&project_id) => {
                key.set_credential(credential);
                if self.connection.is_none() {
                    self.connect();
                }
            }
            _ => {
                self.teardown();
                info!(project_id = %project_id, "switching stream target");
                self.snapshot.target = Some(project_id.clone());
                self.key = Some(SubscriptionKey::new(project_id, credential));
                self.connect();
            }
        }
    }

    fn connect(&mut self) {
        let Some(key) = self.key.as_ref() else {
            return;
        };

        let credential = self
            .credentials
            .as_ref()
            .and_then(|provider| provider.current_credential())
            .or_else(|| key.credential().map(str::to_owned));
        let request = StreamRequest::new(key.project_id().clone(), credential);

        self.generation += 1;
        self.decoder.clear();
        self.snapshot.connected = false;
        self.set_state(SessionState::Connecting);
        info!(
            project_id = %request.project_id,
            generation = self.generation,
            "connecting event stream"
        );

        self.connection = Some(tokio::spawn(read_stream(
            Arc::clone(&self.transport),
            request,
            self.generation,
            self.events_tx.clone(),
        )));
    }

    /// Stops the current connection and pending reconnect; ends in `Idle`.
    fn teardown(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.abort();
        }
        self.generation += 1;
        self.reconnect.cancel();
        self.decoder.clear();
        self.snapshot.connected = false;

        if self.snapshot.state != SessionState::Idle {
            self.set_state(SessionState::Disconnecting);
            self.set_state(SessionState::Idle);
            info!(generation = self.generation, "event stream torn down");
        }
    }

    fn handle_connection_event(&mut self, event: ConnectionEvent) {
        if event.generation() != self.generation {
            debug!(
                generation = event.generation(),
                current = self.generation,
                "dropping message from stale connection"
            );
            return;
        }

        match event {
            ConnectionEvent::Opened { .. } => {
                self.snapshot.last_error = None;
                self.set_state(SessionState::Streaming);
            }
            ConnectionEvent::Chunk { bytes, .. } => self.process_chunk(&bytes),
            ConnectionEvent::Closed { error, .. } => self.connection_closed(error),
        }
    }

    fn process_chunk(&mut self, bytes: &[u8]) {
        for record in self.decoder.push(bytes) {
            let decision = self.router.route(&record);
            debug!(
                event = %record.name,
                generation = self.generation,
                ?decision,
                "record routed"
            );
            if decision == RouteDecision::Handshake && !self.snapshot.connected {
                info!(generation = self.generation, "event stream live");
                self.snapshot.connected = true;
            }
            self.snapshot.last_event = Some(record.name);
        }
    }

    fn connection_closed(&mut self, error: Option<TransportError>) {
        self.connection = None;
        self.decoder.clear();
        self.snapshot.connected = false;

        match &error {
            Some(error) => {
                warn!(generation = self.generation, %error, "event stream failed");
                if error.is_connectivity() {
                    if let Some(health) = &self.health {
                        health.report_hard_failure();
                    }
                }
            }
            None => info!(generation = self.generation, "event stream closed by remote"),
        }
        self.snapshot.last_error = Some(
            error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "stream closed by remote".to_string()),
        );

        self.set_state(SessionState::Faulted);
        if self.key.is_some() && self.reconnect.arm_if_idle(self.reconnect_delay) {
            debug!(
                delay_ms = self.reconnect_delay.as_millis() as u64,
                "reconnect scheduled"
            );
        }
    }

    fn reconnect_due(&mut self) {
        if self.key.is_none() || self.connection.is_some() {
            return;
        }
        self.connect();
    }

    fn set_state(&mut self, next: SessionState) {
        let current = self.snapshot.state;
        if current == next {
            return;
        }
        // Off-path transitions are logged, never refused.
        if let Err(error) = current.transition_to(next) {
            warn!(%error, allowed = ?current.valid_transitions(), "unexpected session state transition");
        }
        self.snapshot.state = next;
    }

    fn publish(&mut self) {
        self.snapshot.reconnect_pending = self.reconnect.is_armed();
        self.snapshot_tx.send_if_modified(|published| {
            if *published == self.snapshot {
                false
            } else {
                *published = self.snapshot.clone();
                true
            }
        });
    }
}

/// Opens one connection and forwards its chunks to the actor.
async fn read_stream(
    transport: Arc<dyn EventTransport>,
    request: StreamRequest,
    generation: u64,
    events: mpsc::UnboundedSender<ConnectionEvent>,
) {
    let mut stream = match transport.open(request).await {
        Ok(stream) => stream,
        Err(error) => {
            let _ = events.send(ConnectionEvent::Closed {
                generation,
                error: Some(error),
            });
            return;
        }
    };

    if events.send(ConnectionEvent::Opened { generation }).is_err() {
        return;
    }

    while let Some(chunk) = stream.next().await {
        let event = match chunk {
            Ok(bytes) => ConnectionEvent::Chunk { generation, bytes },
            Err(error) => {
                let _ = events.send(ConnectionEvent::Closed {
                    generation,
                    error: Some(error),
                });
                return;
            }
        };
        if events.send(event).is_err() {
            return;
        }
    }

    let _ = events.send(ConnectionEvent::Closed {
        generation,
        error: None,
    });
}
