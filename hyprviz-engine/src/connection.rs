use std::io::{ErrorKind, Read};
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::time::Instant;

use flume::Sender;
use log::{debug, info, trace, warn};

use hyprviz_messages::{AudioSnapshot, ConnectionState, EngineConfig, Event, SnapshotStore};

use crate::decoder::decode;
use crate::framer::LineFramer;
use crate::smoothing::Smoother;

/// Upper bound on reads per poll, so a producer that floods the socket
/// cannot keep the worker from checking for shutdown.
const MAX_READS_PER_POLL: usize = 64;

/// What a single [`ConnectionManager::poll`] did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    /// Complete records framed
    pub records: usize,
    /// Records that failed to decode
    pub rejected: usize,
    /// Sequence number of the snapshot published this poll, if any
    pub published: Option<u64>,
}

/// Running totals since the manager was created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStats {
    pub attempts: u64,
    pub connects: u64,
    pub disconnects: u64,
    pub records: u64,
    pub rejected: u64,
    pub published: u64,
    /// Unterminated tails discarded for exceeding the frame cap
    pub overflows: u64,
}

/// Owns the producer socket and drives it through
/// `Disconnected -> Connecting -> Connected`, reconnecting after a fixed
/// backoff whenever anything goes wrong.
///
/// Each [`poll`](Self::poll) is non-blocking. Decoded records and the
/// current [`ConnectionState`] are published to the [`SnapshotStore`].
/// [`Event`]s mirror state changes and rejected records, at most one
/// rejection event per poll.
pub struct ConnectionManager {
    config: EngineConfig,
    store: Arc<SnapshotStore>,
    event_tx: Option<Sender<Event>>,

    state: ConnectionState,
    stream: Option<UnixStream>,
    framer: LineFramer,
    smoother: Smoother,
    read_buf: Vec<u8>,
    /// `None` means attempt on the next poll
    retry_at: Option<Instant>,
    stats: ConnectionStats,
}

impl ConnectionManager {
    pub fn new(config: EngineConfig, store: Arc<SnapshotStore>) -> Self {
        Self {
            framer: LineFramer::new(config.frame_cap),
            smoother: Smoother::new(config.smoothing),
            read_buf: vec![0; config.read_buffer_size],
            config,
            store,
            event_tx: None,
            state: ConnectionState::Disconnected,
            stream: None,
            retry_at: None,
            stats: ConnectionStats::default(),
        }
    }

    /// Report state changes and rejected records on `event_tx`.
    pub fn with_events(mut self, event_tx: Sender<Event>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn stats(&self) -> ConnectionStats {
        self.stats
    }

    /// Bytes of a partial record waiting for their newline.
    pub fn pending_bytes(&self) -> usize {
        self.framer.pending().len()
    }

    /// Advance the state machine by one step.
    ///
    /// While disconnected this attempts a connection once the backoff has
    /// elapsed. While connected it reads everything currently available.
    pub fn poll(&mut self) -> PollOutcome {
        if self.state != ConnectionState::Connected {
            let due = self.retry_at.is_none_or(|at| Instant::now() >= at);
            if !due {
                return PollOutcome::default();
            }
            self.connect();
        }

        if self.state == ConnectionState::Connected {
            self.read_available()
        } else {
            PollOutcome::default()
        }
    }

    /// Drop the current connection and attempt a new one on the next poll.
    pub fn reconnect_now(&mut self) {
        if self.stream.is_some() {
            info!("Reconnect requested, closing producer connection");
            self.disconnect();
        }
        self.retry_at = None;
    }

    /// Close the socket and discard buffered state.
    pub fn close(&mut self) {
        if self.stream.is_some() {
            self.disconnect();
        }
        self.framer.clear();
    }

    fn connect(&mut self) {
        self.stats.attempts += 1;
        self.transition(ConnectionState::Connecting);

        let path = &self.config.socket_path;
        debug!("Connecting to producer at {}", path.display());

        let result = UnixStream::connect(path).and_then(|stream| {
            stream.set_nonblocking(true)?;
            Ok(stream)
        });

        match result {
            Ok(stream) => {
                info!("Connected to producer at {}", path.display());
                self.framer.clear();
                self.smoother.reset();
                self.stream = Some(stream);
                self.stats.connects += 1;
                self.transition(ConnectionState::Connected);
            }
            Err(e) => {
                debug!("Connect to {} failed: {}", path.display(), e);
                self.fail();
            }
        }
    }

    fn read_available(&mut self) -> PollOutcome {
        let mut outcome = PollOutcome::default();
        let mut latest: Option<AudioSnapshot> = None;
        let mut last_error = None;
        let expected = self.store.layout().len();

        for _ in 0..MAX_READS_PER_POLL {
            let Some(stream) = self.stream.as_mut() else {
                break;
            };

            match stream.read(&mut self.read_buf) {
                Ok(0) => {
                    info!("Producer closed the connection");
                    self.disconnect();
                    break;
                }
                Ok(n) => {
                    for record in self.framer.feed(&self.read_buf[..n]) {
                        outcome.records += 1;
                        match decode(&record, expected) {
                            Ok(snapshot) => latest = Some(snapshot),
                            Err(e) => {
                                outcome.rejected += 1;
                                debug!("Dropping record {:?}: {}", record, e);
                                last_error = Some(e);
                            }
                        }
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                // ECONNRESET and friends: the socket is unusable.
                Err(e) => {
                    warn!("Read from producer failed: {}", e);
                    self.fail();
                    break;
                }
            }
        }

        if let Some(snapshot) = latest {
            let snapshot = self.smoother.apply(snapshot);
            match self.store.publish(snapshot) {
                Ok(sequence) => {
                    trace!("Published snapshot {}", sequence);
                    self.stats.published += 1;
                    outcome.published = Some(sequence);
                }
                Err(e) => warn!("Snapshot rejected by store: {}", e),
            }
        }

        if let Some(e) = last_error {
            self.emit(Event::RecordsRejected {
                count: outcome.rejected,
                reason: e.to_string(),
            });
        }

        self.stats.records += outcome.records as u64;
        self.stats.rejected += outcome.rejected as u64;
        self.stats.overflows = self.framer.overflows();
        outcome
    }

    /// `Failed` is transient: report it, then settle in `Disconnected`.
    fn fail(&mut self) {
        self.transition(ConnectionState::Failed);
        self.disconnect();
    }

    fn disconnect(&mut self) {
        if self.stream.take().is_some() {
            self.stats.disconnects += 1;
        }
        self.framer.clear();
        self.smoother.reset();
        self.retry_at = Some(Instant::now() + self.config.backoff);
        self.transition(ConnectionState::Disconnected);
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state == next {
            return;
        }
        debug!("Connection state {} -> {}", self.state, next);
        self.state = next;
        self.store.set_connection(next);
        self.emit(Event::ConnectionChanged(next));
    }

    fn emit(&self, event: Event) {
        let Some(tx) = &self.event_tx else {
            return;
        };
        if let Err(e) = tx.try_send(event) {
            trace!("Event not delivered: {}", e);
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}
