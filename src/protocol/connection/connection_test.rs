use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use super::*;
use crate::protocol::packets::{encode, MAX_PAYLOAD};

/// Bind an ephemeral loopback port and serve exactly one connection with `peer`.
fn spawn_peer<F>(peer: F) -> (u16, JoinHandle<()>)
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        peer(stream);
    });
    (port, handle)
}

fn echo(mut stream: TcpStream) {
    while let Ok(frame) = Frame::read_from(&mut stream) {
        if frame.write_to(&mut stream).is_err() {
            break;
        }
    }
}

#[test]
fn open_reports_peer_and_state() {
    let (port, peer) = spawn_peer(echo);
    let mut session = Session::open("127.0.0.1", port).unwrap();
    assert!(session.is_open());
    assert_eq!(session.get_state(), State::Open);
    assert_eq!(session.get_peer_addr().port(), port);
    assert_eq!(session.get_addr(), format!("127.0.0.1:{port}"));
    session.close().unwrap();
    peer.join().unwrap();
}

#[test]
fn replies_come_back_in_request_order() {
    let (port, peer) = spawn_peer(echo);
    let mut session = Session::open("127.0.0.1", port).unwrap();

    session.send_line("a").unwrap();
    assert_eq!(session.receive_line().unwrap(), "a");
    session.send_line("b").unwrap();
    assert_eq!(session.receive_line().unwrap(), "b");

    session.close().unwrap();
    peer.join().unwrap();
}

#[test]
fn empty_and_multibyte_lines_survive_the_wire() {
    let (port, peer) = spawn_peer(echo);
    let mut session = Session::open("localhost", port).unwrap();

    for line in ["", "naïve café", "🦀🦀"] {
        session.send_line(line).unwrap();
        assert_eq!(session.receive_line().unwrap(), line);
    }

    session.close().unwrap();
    peer.join().unwrap();
}

#[test]
fn send_writes_exact_wire_bytes() {
    let (port, peer) = spawn_peer(|mut stream| {
        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0x00, 0x03, b'a', b'b', b'c']);
        stream.write_all(&encode("ok").unwrap()).unwrap();
    });
    let mut session = Session::open("127.0.0.1", port).unwrap();
    session.send_line("abc").unwrap();
    assert_eq!(session.receive_line().unwrap(), "ok");
    peer.join().unwrap();
}

#[test]
fn premature_close_is_a_read_error() {
    let (port, peer) = spawn_peer(|mut stream| {
        // declares 5 bytes, delivers 1
        stream.write_all(&[0x00, 0x05, b'h']).unwrap();
    });
    let mut session = Session::open("127.0.0.1", port).unwrap();
    peer.join().unwrap();

    match session.receive_line() {
        Err(Error::Read(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("expected read error, got {other:?}"),
    }
    assert_eq!(session.get_state(), State::Closed);
}

#[test]
fn malformed_utf8_is_a_read_error() {
    let (port, peer) = spawn_peer(|mut stream| {
        stream.write_all(&[0x00, 0x01, 0xFF]).unwrap();
    });
    let mut session = Session::open("127.0.0.1", port).unwrap();
    peer.join().unwrap();

    assert!(matches!(session.receive_line(), Err(Error::Read(_))));
    assert!(!session.is_open());
}

#[test]
fn oversized_line_is_rejected_before_writing() {
    let (port, peer) = spawn_peer(echo);
    let mut session = Session::open("127.0.0.1", port).unwrap();

    let big = "z".repeat(MAX_PAYLOAD + 1);
    assert!(matches!(session.send_line(&big), Err(Error::Encoding { .. })));

    // nothing reached the peer, the session is still in sync
    assert!(session.is_open());
    session.send_line("after").unwrap();
    assert_eq!(session.receive_line().unwrap(), "after");

    session.close().unwrap();
    peer.join().unwrap();
}

#[test]
fn close_is_idempotent() {
    let (port, peer) = spawn_peer(echo);
    let mut session = Session::open("127.0.0.1", port).unwrap();
    session.close().unwrap();
    session.close().unwrap();
    assert_eq!(session.get_state(), State::Closed);
    peer.join().unwrap();
}

#[test]
fn closed_session_refuses_io() {
    let (port, peer) = spawn_peer(echo);
    let mut session = Session::open("127.0.0.1", port).unwrap();
    session.close().unwrap();

    match session.send_line("late") {
        Err(Error::Write(e)) => assert_eq!(e.kind(), ErrorKind::NotConnected),
        other => panic!("expected write error, got {other:?}"),
    }
    assert!(matches!(session.receive_line(), Err(Error::Read(_))));
    peer.join().unwrap();
}

#[test]
fn drop_closes_the_connection() {
    let (port, peer) = spawn_peer(|mut stream| {
        let mut rest = Vec::new();
        // returns only once the client side has shut down
        stream.read_to_end(&mut rest).unwrap();
        assert!(rest.is_empty());
    });
    let session = Session::open("127.0.0.1", port).unwrap();
    drop(session);
    peer.join().unwrap();
}

#[test]
fn refused_port_is_a_connection_error() {
    // grab a free port, then release it so nothing listens there
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    match Session::open("127.0.0.1", port) {
        Err(Error::Connection { addr, .. }) => assert_eq!(addr, format!("127.0.0.1:{port}")),
        other => panic!("expected connection error, got {other:?}"),
    }
}

#[test]
fn unresolvable_host_is_a_connection_error() {
    assert!(matches!(
        Session::open("no-such-host.invalid", 80),
        Err(Error::Connection { .. })
    ));
}
