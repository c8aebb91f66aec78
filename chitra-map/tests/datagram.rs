//! Datagram source against a scripted local view server.

mod common;

use std::net::UdpSocket;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, unbounded};

use chitra_map::engine::{UpdateEngine, UpdateOutcome};
use chitra_map::error::Error;
use chitra_map::grid::GridStore;
use chitra_map::playback::MapView;
use chitra_map::source::{
    DataSource, DatagramConfig, DatagramSource, DeviceSource, RangeDevice, SourceStep,
};

use chitra_map::viewport::{Repaint, Viewport};

use common::{GRID_SIZE, record};

/// Answers the handshake, then one scripted reply per `step` request.
///
/// Every request received is forwarded on the returned channel. The server
/// exits after sending its last step reply.
fn spawn_server(replies: Vec<String>) -> (u16, Receiver<String>, JoinHandle<()>) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = socket.local_addr().unwrap().port();
    socket
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let (tx, rx) = unbounded();

    let handle = thread::spawn(move || {
        let mut buf = [0u8; 2048];
        let mut replies = replies.into_iter();
        loop {
            let Ok((len, client)) = socket.recv_from(&mut buf) else {
                return;
            };
            let request = String::from_utf8_lossy(&buf[..len]).into_owned();
            let _ = tx.send(request.clone());
            let reply = match request.as_str() {
                "Hello" => "ChitraMap test server ready".to_string(),
                "step" => match replies.next() {
                    Some(reply) => reply,
                    None => return,
                },
                _ => continue,
            };
            socket.send_to(reply.as_bytes(), client).unwrap();
            if request == "step" && replies.len() == 0 {
                return;
            }
        }
    });
    (port, rx, handle)
}

/// Answers the handshake, then swallows every request until idle for a second.
fn spawn_mute_server() -> (u16, JoinHandle<usize>) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = socket.local_addr().unwrap().port();
    socket
        .set_read_timeout(Some(Duration::from_secs(1)))
        .unwrap();

    let handle = thread::spawn(move || {
        let mut buf = [0u8; 2048];
        let mut ignored = 0;
        while let Ok((len, client)) = socket.recv_from(&mut buf) {
            if &buf[..len] == b"Hello" {
                socket.send_to(b"ChitraMap test server ready", client).unwrap();
            } else {
                ignored += 1;
            }
        }
        ignored
    });
    (port, handle)
}

fn config(port: u16) -> DatagramConfig {
    DatagramConfig {
        host: "127.0.0.1".to_string(),
        control_port: port,
        read_timeout: Some(Duration::from_secs(2)),
    }
}

#[test]
fn test_handshake_and_reply_mapping() {
    let first = record(0, 0, 3, &[(1, 0, 0.8)]);
    let (port, requests, server) = spawn_server(vec![
        first.clone(),
        "reset".to_string(),
        String::new(),
        "quit".to_string(),
    ]);

    let mut source = DatagramSource::connect(&config(port)).unwrap();
    assert_eq!(requests.recv().unwrap(), "Hello");
    assert_eq!(source.data_source(), DataSource::Network);
    assert_eq!(source.range_device(), RangeDevice::Datagram);

    assert_eq!(source.step().unwrap(), SourceStep::Record(first));
    assert_eq!(source.step().unwrap(), SourceStep::Idle);
    assert_eq!(source.step().unwrap(), SourceStep::Exhausted);
    assert_eq!(source.step().unwrap(), SourceStep::Quit);
    server.join().unwrap();

    let steps: Vec<String> = requests.try_iter().collect();
    assert_eq!(steps, vec!["step"; 4]);

    source.close();
    source.close();
    assert_eq!(source.step().unwrap(), SourceStep::Exhausted);
}

#[test]
fn test_engine_plays_from_server() {
    let (port, requests, server) = spawn_server(vec![
        record(0, 0, 0, &[(0, 2, 0.9)]),
        record(1, 0, 1, &[(1, 2, 0.9)]),
        "reset".to_string(),
        "quit".to_string(),
    ]);

    let mut engine = UpdateEngine::new(GridStore::new(GRID_SIZE), 160);
    engine.connect(&config(port)).unwrap();
    assert_eq!(engine.data_source(), DataSource::Network);

    assert!(matches!(engine.update().unwrap(), UpdateOutcome::Applied(_)));
    assert!(matches!(engine.update().unwrap(), UpdateOutcome::Applied(_)));
    assert_eq!(engine.update().unwrap(), UpdateOutcome::Skipped);
    assert_eq!(engine.update().unwrap(), UpdateOutcome::Shutdown);
    assert_eq!(engine.cell_value(51, 48).unwrap(), 0.9);

    // a network map cannot be saved
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        engine.save(dir.path().join("net.gd")),
        Err(Error::UnsupportedOperation(_))
    ));

    server.join().unwrap();
    assert_eq!(requests.try_iter().filter(|r| r == "step").count(), 4);
}

#[test]
fn test_reset_request_sent_to_server() {
    let (port, requests, server) =
        spawn_server(vec![record(0, 0, 0, &[]), "quit".to_string()]);

    let mut engine = UpdateEngine::new(GridStore::new(GRID_SIZE), 160);
    engine.connect(&config(port)).unwrap();
    engine.update().unwrap();
    engine.reset().unwrap();
    assert_eq!(engine.undo_depth(), 0);
    assert_eq!(engine.grid_stats().known(), 0);
    assert_eq!(engine.update().unwrap(), UpdateOutcome::Shutdown);
    server.join().unwrap();

    let seen: Vec<String> = requests.try_iter().collect();
    assert_eq!(seen, vec!["Hello", "step", "reset", "step"]);
}

#[test]
fn test_mute_server_times_out_as_pending() {
    let (port, server) = spawn_mute_server();
    let mut timeout = config(port);
    timeout.read_timeout = Some(Duration::from_millis(20));

    let mut source = DatagramSource::connect(&timeout).unwrap();
    assert_eq!(source.step().unwrap(), SourceStep::Pending);
    source.close();
    assert_eq!(server.join().unwrap(), 1);
}

#[test]
fn test_build_all_ends_when_server_goes_quiet() {
    let (port, server) = spawn_mute_server();
    let mut timeout = config(port);
    timeout.read_timeout = Some(Duration::from_millis(20));

    let mut engine = UpdateEngine::new(GridStore::new(GRID_SIZE), 160);
    engine.connect(&timeout).unwrap();
    let mut view = MapView::new(engine.into_shared(), Viewport::new(GRID_SIZE, 4, 200, 200));

    let start = Instant::now();
    assert_eq!(view.build_all().unwrap(), Repaint::Full);
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(view.applied(), 0);
    assert!(!view.needs_reset());
    assert_eq!(
        view.engine().lock().update().unwrap(),
        UpdateOutcome::Waiting
    );

    view.engine().lock().close();
    assert_eq!(server.join().unwrap(), 2);
}

#[test]
fn test_silent_server_is_unavailable() {
    // bound but never answers the handshake
    let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = silent.local_addr().unwrap().port();

    assert!(matches!(
        DatagramSource::connect(&config(port)),
        Err(Error::SourceUnavailable(_))
    ));
}
