#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Exercises the exact-read guarantee, bounded accept waits, and connection
//! replacement over real loopback sockets.

use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use secure_transport::error::ChannelError;
use secure_transport::transport::{AcceptOutcome, TcpTransport};

fn listen_local() -> (TcpTransport, SocketAddr) {
    let transport = TcpTransport::bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = transport.local_addr().unwrap();
    (transport, addr)
}

#[test]
fn accept_timeout_is_an_outcome_within_bounds() {
    let (mut server, _) = listen_local();

    let started = Instant::now();
    let outcome = server.accept(Duration::from_millis(100)).unwrap();
    let elapsed = started.elapsed();

    assert!(matches!(outcome, AcceptOutcome::TimedOut));
    assert!(elapsed >= Duration::from_millis(100));
    assert!(
        elapsed <= Duration::from_millis(350),
        "accept wait overran: {elapsed:?}"
    );
}

#[test]
fn exact_read_reassembles_one_byte_writes() {
    let (mut server, addr) = listen_local();
    let expected: Vec<u8> = (0u8..32).collect();

    let writer = {
        let expected = expected.clone();
        std::thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.set_nodelay(true).unwrap();
            for byte in expected {
                stream.write_all(&[byte]).unwrap();
                stream.flush().unwrap();
                std::thread::sleep(Duration::from_millis(2));
            }
        })
    };

    server.accept(Duration::from_secs(5)).unwrap();
    let mut conn = server.take_accepted().unwrap();

    let mut buf = vec![0u8; expected.len()];
    conn.receive_exact(&mut buf, Some(Duration::from_secs(5)))
        .unwrap();
    assert_eq!(buf, expected);

    writer.join().unwrap();
}

#[test]
fn receive_timeout_when_peer_sends_nothing() {
    let (mut server, addr) = listen_local();

    let client_thread = std::thread::spawn(move || {
        let stream = TcpStream::connect(addr).unwrap();
        // Hold the connection open without writing.
        std::thread::sleep(Duration::from_millis(500));
        drop(stream);
    });

    server.accept(Duration::from_secs(5)).unwrap();
    let mut conn = server.take_accepted().unwrap();

    let mut buf = [0u8; 1];
    let result = conn.receive_exact(&mut buf, Some(Duration::from_millis(100)));
    assert!(matches!(result, Err(ChannelError::Timeout)));

    client_thread.join().unwrap();
}

#[test]
fn large_send_arrives_complete() {
    let (mut server, addr) = listen_local();
    let payload: Vec<u8> = (0..1024 * 1024).map(|i| (i % 251) as u8).collect();

    let sender = {
        let payload = payload.clone();
        std::thread::spawn(move || {
            let mut client = TcpTransport::connect(addr, Duration::from_secs(5)).unwrap();
            client.send(&payload).unwrap();
            // Keep the socket open until the receiver is done.
            let mut ack = [0u8; 1];
            client
                .receive_exact(&mut ack, Some(Duration::from_secs(10)))
                .unwrap();
        })
    };

    server.accept(Duration::from_secs(5)).unwrap();
    let mut conn = server.take_accepted().unwrap();

    let mut received = vec![0u8; payload.len()];
    conn.receive_exact(&mut received, Some(Duration::from_secs(10)))
        .unwrap();
    assert_eq!(received, payload);

    conn.send(&[1]).unwrap();
    sender.join().unwrap();
}

#[test]
fn accept_replaces_previous_connection() {
    let (mut server, addr) = listen_local();

    let mut first = TcpTransport::connect(addr, Duration::from_secs(5)).unwrap();
    server.accept(Duration::from_secs(5)).unwrap();

    let second_thread = std::thread::spawn(move || {
        let mut second = TcpTransport::connect(addr, Duration::from_secs(5)).unwrap();
        second.send(b"second").unwrap();
        // Hold until the server read it.
        std::thread::sleep(Duration::from_millis(300));
    });

    // Accepting again closes the first peer's connection.
    server.accept(Duration::from_secs(5)).unwrap();
    let mut conn = server.take_accepted().unwrap();

    let mut buf = [0u8; 6];
    conn.receive_exact(&mut buf, Some(Duration::from_secs(5)))
        .unwrap();
    assert_eq!(&buf, b"second");

    let mut one = [0u8; 1];
    let result = first.receive_exact(&mut one, Some(Duration::from_secs(2)));
    assert!(matches!(result, Err(ChannelError::ConnectionClosed)));

    second_thread.join().unwrap();
}
