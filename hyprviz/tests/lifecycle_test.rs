use std::io::{Read, Write};
use std::os::unix::net::UnixListener;
use std::thread;
use std::time::{Duration, Instant};

use hyprviz_messages::{BandLayout, ConnectionState, EngineConfig, Event};

fn wait_for_connected(events: &flume::Receiver<Event>) {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match events.recv_timeout(remaining) {
            Ok(Event::ConnectionChanged(ConnectionState::Connected)) => return,
            Ok(_) => {}
            Err(e) => panic!("Engine never connected: {e:?}"),
        }
    }
}

#[test]
fn start_connects_immediately_and_stop_releases_socket() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audio_monitor.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let config = EngineConfig {
        socket_path: path.clone(),
        layout: BandLayout::loudness_only(),
        ..Default::default()
    };
    let engine = hyprviz::start(config).unwrap();
    let store = engine.store();

    let (mut producer, _) = listener.accept().unwrap();
    wait_for_connected(&engine.events());

    producer.write_all(b"0.25\n").unwrap();
    let deadline = Instant::now() + Duration::from_secs(2);
    while store.current().sequence() == 0 {
        assert!(Instant::now() < deadline, "Nothing published");
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(store.current().bands(), &[0.25]);

    engine.stop().unwrap();

    // The engine closed its end, so the producer sees end of stream.
    producer
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let mut buf = [0u8; 8];
    assert_eq!(producer.read(&mut buf).unwrap(), 0);

    // Last value stays readable after shutdown.
    assert_eq!(store.current().bands(), &[0.25]);
}

#[test]
fn start_rejects_invalid_config() {
    let config = EngineConfig {
        frame_cap: 0,
        ..Default::default()
    };
    assert!(hyprviz::start(config).is_err());
}

#[test]
fn stop_without_producer_returns_promptly() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        socket_path: dir.path().join("absent.sock"),
        ..Default::default()
    };
    let engine = hyprviz::start(config).unwrap();
    thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    engine.stop().unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}
