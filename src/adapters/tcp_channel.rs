//! Control channel over plain TCP.
//!
//! Multi-peer, non-blocking, polled from the main loop.  Frames are
//! newline-delimited text in both directions; a trailing `\r` is
//! stripped so `telnet` and `nc -C` work as clients.
//!
//! ```text
//!   peer ──"#FASTER\n"──▶ poll() ──▶ ChannelEvent::Message
//!   peer ◀──"{...}\n"──── broadcast() / send_to()
//! ```
//!
//! Inbound frames longer than [`MAX_MESSAGE_LEN`] are dropped whole.
//!
//! Outbound lines are queued per peer and written until the socket would
//! block; the rest goes out on later writes or `poll()`, so a line is
//! never cut short.  A peer whose queue would pass [`TX_BUFFER_LIMIT`],
//! or whose socket fails, is closed on the next `poll()` and reported as
//! [`ChannelEvent::Disconnected`].

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

use log::{debug, info, warn};

use crate::app::events::{ChannelEvent, MAX_MESSAGE_LEN, PeerId};
use crate::app::ports::PeerChannel;
use crate::error::ChannelError;

const READ_CHUNK: usize = 256;

/// Unsent bytes a peer may hold before it is dropped as too slow.
pub const TX_BUFFER_LIMIT: usize = 16 * 1024;

struct Peer {
    id: PeerId,
    addr: SocketAddr,
    stream: TcpStream,
    /// Bytes of the frame being assembled.
    rx: Vec<u8>,
    /// Set while skipping the rest of an oversized frame.
    discarding: bool,
    /// Outbound bytes the socket has not taken yet.
    tx: Vec<u8>,
    closed: bool,
}

impl Peer {
    /// Drain the socket into `events`.  Marks the peer closed on EOF or
    /// a hard error.
    fn read_frames(&mut self, events: &mut Vec<ChannelEvent>) {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match self.stream.read(&mut buf) {
                Ok(0) => {
                    debug!("Peer {} closed the connection", self.id);
                    self.closed = true;
                    return;
                }
                Ok(n) => self.push_bytes(&buf[..n], events),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => return,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Peer {} read error: {}", self.id, e);
                    self.closed = true;
                    return;
                }
            }
        }
    }

    fn push_bytes(&mut self, bytes: &[u8], events: &mut Vec<ChannelEvent>) {
        for &byte in bytes {
            if byte == b'\n' {
                self.finish_frame(events);
                continue;
            }
            if self.discarding {
                continue;
            }
            // One extra byte of room for a trailing '\r'.
            if self.rx.len() > MAX_MESSAGE_LEN {
                warn!("Peer {}: frame exceeds {} bytes, dropped", self.id, MAX_MESSAGE_LEN);
                self.rx.clear();
                self.discarding = true;
                continue;
            }
            self.rx.push(byte);
        }
    }

    fn finish_frame(&mut self, events: &mut Vec<ChannelEvent>) {
        if self.discarding {
            self.discarding = false;
            self.rx.clear();
            return;
        }
        if self.rx.last() == Some(&b'\r') {
            self.rx.pop();
        }
        if !self.rx.is_empty() {
            match ChannelEvent::message(self.id, &self.rx) {
                Some(event) => events.push(event),
                None => warn!("Peer {}: frame exceeds {} bytes, dropped", self.id, MAX_MESSAGE_LEN),
            }
        }
        self.rx.clear();
    }

    fn write_line(&mut self, text: &str) {
        if self.closed {
            return;
        }
        if self.tx.len() + text.len() + 1 > TX_BUFFER_LIMIT {
            warn!(
                "Peer {}: {} bytes still unsent, dropping slow peer",
                self.id,
                self.tx.len()
            );
            self.closed = true;
            return;
        }
        self.tx.extend_from_slice(text.as_bytes());
        self.tx.push(b'\n');
        self.flush_tx();
    }

    /// Write queued bytes until the socket would block.
    fn flush_tx(&mut self) {
        while !self.closed && !self.tx.is_empty() {
            match self.stream.write(&self.tx) {
                Ok(0) => {
                    warn!("Peer {} stopped accepting data, closing", self.id);
                    self.closed = true;
                }
                Ok(n) => {
                    self.tx.drain(..n);
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => return,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Peer {} write failed ({}), closing", self.id, e);
                    self.closed = true;
                }
            }
        }
    }
}

pub struct TcpChannelServer {
    listener: TcpListener,
    peers: Vec<Peer>,
    max_peers: usize,
    next_id: PeerId,
}

impl TcpChannelServer {
    /// Listen on `0.0.0.0:port`.  Pass port `0` to let the OS pick a free
    /// port (use [`local_addr()`](Self::local_addr) to discover it).
    pub fn bind(port: u16, max_peers: usize) -> Result<Self, ChannelError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).map_err(|e| ChannelError::Bind(e.kind()))?;
        listener
            .set_nonblocking(true)
            .map_err(|e| ChannelError::Io(e.kind()))?;

        let max_peers = max_peers.clamp(1, usize::from(PeerId::MAX));
        info!("Control channel listening on port {} (max {} peers)", port, max_peers);

        Ok(Self {
            listener,
            peers: Vec::with_capacity(max_peers),
            max_peers,
            next_id: 0,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ChannelError> {
        self.listener
            .local_addr()
            .map_err(|e| ChannelError::Io(e.kind()))
    }

    pub fn peer_count(&self) -> usize {
        self.peers.iter().filter(|p| !p.closed).count()
    }

    /// Accept new peers, flush queued output, read what is available and
    /// report it.
    ///
    /// Never blocks.
    pub fn poll(&mut self) -> Vec<ChannelEvent> {
        let mut events = Vec::new();

        // Peers that failed on write since the last poll.
        self.reap(&mut events);
        self.accept_pending(&mut events);

        for peer in &mut self.peers {
            peer.flush_tx();
            peer.read_frames(&mut events);
        }
        self.reap(&mut events);

        events
    }

    fn accept_pending(&mut self, events: &mut Vec<ChannelEvent>) {
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if self.peers.len() >= self.max_peers {
                        warn!("Refusing {}: {} peers already connected", addr, self.max_peers);
                        drop(stream);
                        continue;
                    }
                    if let Err(e) = stream.set_nonblocking(true) {
                        warn!("Refusing {}: cannot set non-blocking ({})", addr, e);
                        continue;
                    }
                    let _ = stream.set_nodelay(true);

                    let id = self.allocate_id();
                    info!("Peer {} connected from {}", id, addr);
                    self.peers.push(Peer {
                        id,
                        addr,
                        stream,
                        rx: Vec::with_capacity(MAX_MESSAGE_LEN + 1),
                        discarding: false,
                        tx: Vec::new(),
                        closed: false,
                    });
                    events.push(ChannelEvent::Connected { peer: id });
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => return,
                Err(e) => {
                    warn!("Accept error: {}", e);
                    return;
                }
            }
        }
    }

    fn reap(&mut self, events: &mut Vec<ChannelEvent>) {
        self.peers.retain(|peer| {
            if peer.closed {
                info!("Peer {} ({}) dropped", peer.id, peer.addr);
                events.push(ChannelEvent::Disconnected { peer: peer.id });
            }
            !peer.closed
        });
    }

    /// Next id not held by a connected peer.
    fn allocate_id(&mut self) -> PeerId {
        loop {
            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            if self.peers.iter().all(|p| p.id != id) {
                return id;
            }
        }
    }
}

impl PeerChannel for TcpChannelServer {
    fn send_to(&mut self, peer: PeerId, text: &str) {
        match self.peers.iter_mut().find(|p| p.id == peer) {
            Some(p) => p.write_line(text),
            None => debug!("Peer {} gone, unicast dropped", peer),
        }
    }

    fn broadcast(&mut self, text: &str) {
        for peer in &mut self.peers {
            peer.write_line(text);
        }
    }
}
