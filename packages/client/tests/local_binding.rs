use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};

use epp_transport_client::prelude::*;

fn free_port() -> u16 {
    let probe = TcpListener::bind("127.0.0.1:0").expect("probe");
    probe.local_addr().expect("addr").port()
}

fn exchange(connector: &mut TransportConnector<PlainTcp>, listener: &TcpListener) -> SocketAddr {
    connector.connect().expect("connect");
    let (mut server, client_addr) = listener.accept().expect("accept");

    let session = connector.session_mut().expect("session");
    session.write_all(b"frame").expect("write");
    session.flush().expect("flush");

    let mut received = [0u8; 5];
    server.read_exact(&mut received).expect("read");
    assert_eq!(&received, b"frame");
    client_addr
}

#[test]
fn bound_dial_uses_the_configured_local_endpoint() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().expect("addr").port();
    let local_port = free_port();

    let config = ConnectionConfig::builder("127.0.0.1", port)
        .local_endpoint("127.0.0.1", local_port)
        .build()
        .expect("config");
    let mut connector = TransportConnector::new(config, PlainTcp);

    let client_addr = exchange(&mut connector, &listener);
    assert_eq!(client_addr.port(), local_port);
    assert_eq!(
        connector.session().and_then(|s| s.local_addr()),
        Some(SocketAddr::from(([127, 0, 0, 1], local_port)))
    );
    connector.close().expect("close");
}

#[test]
fn bound_connector_reconnects_on_the_same_local_port() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().expect("addr").port();
    let local_port = free_port();

    let config = ConnectionConfig::builder("127.0.0.1", port)
        .local_endpoint("127.0.0.1", local_port)
        .build()
        .expect("config");
    let mut connector = TransportConnector::new(config, PlainTcp);

    for _ in 0..3 {
        connector.connect().expect("bound connect");
        let (mut server, client_addr) = listener.accept().expect("accept");
        assert_eq!(client_addr.port(), local_port);

        // The client closes first, leaving its local port in TIME_WAIT.
        connector.close().expect("close");
        let mut rest = Vec::new();
        server.read_to_end(&mut rest).expect("drain");
        assert!(rest.is_empty());
    }
    assert_eq!(connector.state(), ConnectState::Unconnected);
}

#[test]
fn bound_and_unbound_sessions_behave_alike() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().expect("addr").port();

    let unbound = ConnectionConfig::new("127.0.0.1", port).expect("config");
    let bound = ConnectionConfig::builder("127.0.0.1", port)
        .local_endpoint("127.0.0.1", free_port())
        .build()
        .expect("config");

    for config in [unbound, bound] {
        let mut connector = TransportConnector::new(config, PlainTcp);
        exchange(&mut connector, &listener);
        let session = connector.session().expect("session");
        assert_eq!(session.read_timeout().as_millis(), 50_000);
        assert!(session.protocol().is_none());
        connector.close().expect("close");
    }
}

#[test]
fn occupied_local_port_is_address_in_use() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().expect("addr").port();
    let occupied = TcpListener::bind("127.0.0.1:0").expect("occupied");
    let local_port = occupied.local_addr().expect("addr").port();

    let config = ConnectionConfig::builder("127.0.0.1", port)
        .local_endpoint("127.0.0.1", local_port)
        .build()
        .expect("config");
    let mut connector = TransportConnector::new(config, PlainTcp);

    let err = connector.connect().unwrap_err();
    assert!(err.is_network());
    assert_eq!(err.message(), "address in use");
    assert_eq!(connector.state(), ConnectState::Failed);
}

#[test]
fn half_configured_binding_dials_unbound() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().expect("addr").port();

    let config = ConnectionConfig::builder("127.0.0.1", port)
        .local_address("127.0.0.1")
        .build()
        .expect("config");
    assert!(config.local_binding().is_none());

    let mut connector = TransportConnector::new(config, PlainTcp);
    exchange(&mut connector, &listener);
    connector.close().expect("close");
}

#[test]
fn unresolvable_local_address_is_unknown_host() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().expect("addr").port();

    let config = ConnectionConfig::builder("127.0.0.1", port)
        .local_endpoint("no-such-host.invalid", free_port())
        .build()
        .expect("config");
    let mut connector = TransportConnector::new(config, PlainTcp);

    let err = connector.connect().unwrap_err();
    assert!(err.is_network());
    assert_eq!(err.message(), "unknown host");
}
