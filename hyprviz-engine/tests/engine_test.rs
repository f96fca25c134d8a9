use std::io::Write;
use std::os::unix::net::UnixListener;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use hyprviz_engine::Engine;
use hyprviz_messages::{BandLayout, Command, ConnectionState, EngineConfig, Event, SnapshotStore};

// Test helpers to reduce boilerplate

fn test_config(path: &Path) -> EngineConfig {
    EngineConfig {
        socket_path: path.to_path_buf(),
        layout: BandLayout::five_band(),
        backoff: Duration::from_millis(50),
        ..Default::default()
    }
}

fn setup_engine(
    config: EngineConfig,
) -> (
    flume::Sender<Command>,
    flume::Receiver<Event>,
    Arc<SnapshotStore>,
    JoinHandle<anyhow::Result<()>>,
) {
    let (cmd_tx, cmd_rx) = flume::unbounded::<Command>();
    let (event_tx, event_rx) = flume::unbounded::<Event>();
    let store = Arc::new(SnapshotStore::new(config.layout.clone()));

    let engine = Engine::new(config, Arc::clone(&store), cmd_rx, event_tx)
        .expect("Engine should accept a valid config");
    let handle = thread::spawn(move || engine.run());

    (cmd_tx, event_rx, store, handle)
}

fn teardown_engine(cmd_tx: flume::Sender<Command>, handle: JoinHandle<anyhow::Result<()>>) {
    cmd_tx.send(Command::Stop).unwrap();
    handle
        .join()
        .expect("Engine thread should not panic")
        .expect("Engine should stop cleanly");
}

fn wait_for_state(event_rx: &flume::Receiver<Event>, wanted: ConnectionState) {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match event_rx.recv_timeout(remaining) {
            Ok(Event::ConnectionChanged(state)) if state == wanted => return,
            Ok(_) => {}
            Err(e) => panic!("Never reached {wanted}: {e:?}"),
        }
    }
}

fn wait_for_sequence(store: &SnapshotStore, sequence: u64) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while store.current().sequence() < sequence {
        assert!(Instant::now() < deadline, "No snapshot {sequence} published");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_engine_rejects_mismatched_store() {
    let dir = tempfile::tempdir().unwrap();
    let (_cmd_tx, cmd_rx) = flume::unbounded::<Command>();
    let (event_tx, _event_rx) = flume::unbounded::<Event>();
    let store = Arc::new(SnapshotStore::new(BandLayout::loudness_only()));

    let result = Engine::new(test_config(&dir.path().join("a.sock")), store, cmd_rx, event_tx);
    assert!(result.is_err());
}

#[test]
fn test_engine_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        read_buffer_size: 0,
        ..test_config(&dir.path().join("a.sock"))
    };
    let (_cmd_tx, cmd_rx) = flume::unbounded::<Command>();
    let (event_tx, _event_rx) = flume::unbounded::<Event>();
    let store = Arc::new(SnapshotStore::new(config.layout.clone()));

    assert!(Engine::new(config, store, cmd_rx, event_tx).is_err());
}

#[test]
fn test_engine_stops_without_producer() {
    let dir = tempfile::tempdir().unwrap();
    let (cmd_tx, event_rx, store, handle) = setup_engine(test_config(&dir.path().join("none.sock")));

    wait_for_state(&event_rx, ConnectionState::Failed);
    teardown_engine(cmd_tx, handle);
    assert_eq!(store.current().sequence(), 0);
}

#[test]
fn test_engine_stops_when_command_channel_drops() {
    let dir = tempfile::tempdir().unwrap();
    let (cmd_tx, _event_rx, _store, handle) =
        setup_engine(test_config(&dir.path().join("none.sock")));

    drop(cmd_tx);
    let result = handle.join();
    assert!(result.is_ok(), "Engine thread should not panic");
}

#[test]
fn test_engine_publishes_producer_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("producer.sock");
    let listener = UnixListener::bind(&path).unwrap();
    let (cmd_tx, event_rx, store, handle) = setup_engine(test_config(&path));

    let (mut producer, _) = listener.accept().unwrap();
    wait_for_state(&event_rx, ConnectionState::Connected);

    // rms, sub_bass, bass, low_mids, mids, highs
    producer
        .write_all(b"0.5,0.1,0.2,0.3,0.4,0.6\n")
        .unwrap();
    wait_for_sequence(&store, 1);
    assert_eq!(store.current().bands(), &[0.5, 0.1, 0.2, 0.3, 0.4, 0.6]);

    teardown_engine(cmd_tx, handle);
}

#[test]
fn test_engine_reports_rejected_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("producer.sock");
    let listener = UnixListener::bind(&path).unwrap();
    let (cmd_tx, event_rx, store, handle) = setup_engine(test_config(&path));

    let (mut producer, _) = listener.accept().unwrap();
    producer.write_all(b"1,2,3\n").unwrap();

    let deadline = Instant::now() + Duration::from_secs(2);
    let (count, reason) = loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match event_rx.recv_timeout(remaining) {
            Ok(Event::RecordsRejected { count, reason }) => break (count, reason),
            Ok(Event::ConnectionChanged(_)) => {}
            Err(e) => panic!("No rejection reported: {e:?}"),
        }
    };
    assert_eq!(count, 1);
    assert!(reason.contains("expected 6 fields, found 3"), "{reason}");
    assert_eq!(store.current().sequence(), 0);
    assert_eq!(store.connection(), ConnectionState::Connected);

    teardown_engine(cmd_tx, handle);
}

#[test]
fn test_engine_survives_producer_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("producer.sock");
    let listener = UnixListener::bind(&path).unwrap();
    let (cmd_tx, event_rx, store, handle) = setup_engine(test_config(&path));

    let (mut producer, _) = listener.accept().unwrap();
    producer.write_all(b"1,1,1,1,1,1\n").unwrap();
    wait_for_sequence(&store, 1);

    // Producer goes away entirely, socket file included.
    drop(producer);
    drop(listener);
    std::fs::remove_file(&path).unwrap();
    wait_for_state(&event_rx, ConnectionState::Disconnected);
    wait_for_state(&event_rx, ConnectionState::Failed);

    // Last known values stay in place while disconnected.
    assert_eq!(store.current().bands(), &[1.0; 6]);

    let listener = UnixListener::bind(&path).unwrap();
    let (mut producer, _) = listener.accept().unwrap();
    wait_for_state(&event_rx, ConnectionState::Connected);
    producer.write_all(b"2,2,2,2,2,2\n").unwrap();
    wait_for_sequence(&store, 2);
    assert_eq!(store.current().bands(), &[2.0; 6]);

    teardown_engine(cmd_tx, handle);
}

#[test]
fn test_engine_reconnect_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("producer.sock");
    let listener = UnixListener::bind(&path).unwrap();
    let config = EngineConfig {
        backoff: Duration::from_secs(60),
        ..test_config(&path)
    };
    let (cmd_tx, event_rx, _store, handle) = setup_engine(config);

    let _first = listener.accept().unwrap();
    wait_for_state(&event_rx, ConnectionState::Connected);

    cmd_tx.send(Command::Reconnect).unwrap();
    wait_for_state(&event_rx, ConnectionState::Disconnected);
    // Backoff is a minute, so only the command can explain a second connection.
    let _second = listener.accept().unwrap();
    wait_for_state(&event_rx, ConnectionState::Connected);

    teardown_engine(cmd_tx, handle);
}
