//! Loopback tests for the TCP control channel.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use microrail::adapters::tcp_channel::{TX_BUFFER_LIMIT, TcpChannelServer};
use microrail::app::events::{ChannelEvent, PeerId};
use microrail::app::ports::PeerChannel;

const TIMEOUT: Duration = Duration::from_secs(2);

fn server(max_peers: usize) -> TcpChannelServer {
    TcpChannelServer::bind(0, max_peers).unwrap()
}

fn connect(server: &TcpChannelServer) -> TcpStream {
    let port = server.local_addr().unwrap().port();
    let stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream.set_read_timeout(Some(TIMEOUT)).unwrap();
    stream
}

/// Poll until at least `count` events arrived or the timeout hits.
fn poll_events(server: &mut TcpChannelServer, count: usize) -> Vec<ChannelEvent> {
    let deadline = Instant::now() + TIMEOUT;
    let mut events = Vec::new();
    while events.len() < count && Instant::now() < deadline {
        events.extend(server.poll());
        std::thread::sleep(Duration::from_millis(5));
    }
    events
}

fn peer_of(event: &ChannelEvent) -> PeerId {
    match event {
        ChannelEvent::Connected { peer }
        | ChannelEvent::Disconnected { peer }
        | ChannelEvent::Message { peer, .. } => *peer,
    }
}

fn payload(event: &ChannelEvent) -> &[u8] {
    match event {
        ChannelEvent::Message { payload, .. } => payload,
        other => panic!("expected a message, got {other:?}"),
    }
}

#[test]
fn connect_then_message_yields_events_in_order() {
    let mut srv = server(5);
    let mut client = connect(&srv);

    let events = poll_events(&mut srv, 1);
    assert!(matches!(events[0], ChannelEvent::Connected { .. }));
    let peer = peer_of(&events[0]);

    client.write_all(b"#FASTER\r\n#STOP\n").unwrap();
    let events = poll_events(&mut srv, 2);
    assert_eq!(events.len(), 2);
    assert_eq!(peer_of(&events[0]), peer);
    assert_eq!(payload(&events[0]), b"#FASTER");
    assert_eq!(payload(&events[1]), b"#STOP");
}

#[test]
fn frame_split_across_writes_is_reassembled() {
    let mut srv = server(5);
    let mut client = connect(&srv);
    poll_events(&mut srv, 1);

    client.write_all(b"#DIR").unwrap();
    client.flush().unwrap();
    assert!(poll_events(&mut srv, 1).is_empty());

    client.write_all(b"BACK\n").unwrap();
    let events = poll_events(&mut srv, 1);
    assert_eq!(payload(&events[0]), b"#DIRBACK");
}

#[test]
fn oversized_frame_is_dropped_and_stream_recovers() {
    let mut srv = server(5);
    let mut client = connect(&srv);
    poll_events(&mut srv, 1);

    let mut big = vec![b'#'; 200];
    big.push(b'\n');
    client.write_all(&big).unwrap();
    client.write_all(b"#STOP\n").unwrap();

    let events = poll_events(&mut srv, 1);
    assert_eq!(events.len(), 1);
    assert_eq!(payload(&events[0]), b"#STOP");
}

#[test]
fn broadcast_reaches_every_peer_and_unicast_only_one() {
    let mut srv = server(5);
    let a = connect(&srv);
    let b = connect(&srv);
    let events = poll_events(&mut srv, 2);
    let first = peer_of(&events[0]);

    srv.send_to(first, "hello");
    srv.broadcast("{\"speed\":7}");

    let mut a = BufReader::new(a);
    let mut b = BufReader::new(b);
    let mut line = String::new();

    a.read_line(&mut line).unwrap();
    assert_eq!(line, "hello\n");
    line.clear();
    a.read_line(&mut line).unwrap();
    assert_eq!(line, "{\"speed\":7}\n");

    line.clear();
    b.read_line(&mut line).unwrap();
    assert_eq!(line, "{\"speed\":7}\n");
}

#[test]
fn peers_beyond_the_limit_are_refused() {
    let mut srv = server(1);
    let _first = connect(&srv);
    assert_eq!(poll_events(&mut srv, 1).len(), 1);

    let mut second = connect(&srv);
    // Give the listener a chance to accept and drop it.
    let events = poll_events(&mut srv, 1);
    assert!(events.is_empty());
    assert_eq!(srv.peer_count(), 1);

    let mut buf = [0u8; 8];
    let n = second.read(&mut buf).unwrap_or(0);
    assert_eq!(n, 0, "refused peer sees EOF");
}

#[test]
fn closed_client_is_reported_disconnected() {
    let mut srv = server(5);
    let client = connect(&srv);
    let peer = peer_of(&poll_events(&mut srv, 1)[0]);

    drop(client);
    let events = poll_events(&mut srv, 1);
    assert_eq!(events, vec![ChannelEvent::Disconnected { peer }]);
    assert_eq!(srv.peer_count(), 0);
}

#[test]
fn peer_that_never_reads_is_dropped_without_blocking() {
    let mut srv = server(5);
    let _silent = connect(&srv);
    let peer = peer_of(&poll_events(&mut srv, 1)[0]);

    // Far more than the kernel buffers plus the queue can hold.
    let line = "x".repeat(1_000);
    let mut sent = 0;
    while srv.peer_count() > 0 && sent < 50_000 {
        srv.broadcast(&line);
        sent += 1;
    }
    assert_eq!(srv.peer_count(), 0, "slow peer still open after {sent} lines");
    assert!(sent * line.len() > TX_BUFFER_LIMIT);

    let events = poll_events(&mut srv, 1);
    assert_eq!(events, vec![ChannelEvent::Disconnected { peer }]);
}

#[test]
fn lines_arrive_whole_and_in_order() {
    let mut srv = server(5);
    let client = connect(&srv);
    poll_events(&mut srv, 1);

    for i in 0..50 {
        srv.broadcast(&format!("{{\"speed\":{i}}}"));
        srv.poll();
    }

    let mut reader = BufReader::new(client);
    let mut line = String::new();
    for i in 0..50 {
        line.clear();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, format!("{{\"speed\":{i}}}\n"));
    }
}
