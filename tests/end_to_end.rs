#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Scenario tests over real localhost sockets: connection establishment,
//! the readiness barrier, ordered delivery, and disconnect handling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use netball_net::config::TransportSettings;
use netball_net::core::event::{Event, EventKind};
use netball_net::error::NetError;
use netball_net::session::{Role, Session, SessionState};
use netball_net::transport::tcp::{accept_repeatedly, dial, Connection, Listener};
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

/// Connect the two given sessions over an ephemeral localhost port.
async fn connect_pair(host: &Arc<Session>, guest: &Arc<Session>) -> (Connection, Connection) {
    let listener = Listener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().to_string();
    let settings = TransportSettings::default();

    let accept = {
        let host = host.clone();
        tokio::spawn(async move { listener.accept_one(&host, None).await })
    };

    let guest_conn = dial(guest, &addr, &settings).await.expect("dial");
    let host_conn = accept.await.expect("accept task").expect("accept");
    (host_conn, guest_conn)
}

// ============================================================================
// READINESS BARRIER
// ============================================================================

#[tokio::test]
async fn test_barrier_false_until_established_then_latched() {
    let host = Session::new(Role::Host);
    let guest = Session::new(Role::Guest);

    // Nothing has connected yet: game construction must not proceed.
    assert!(!host.is_connected());
    assert!(!guest.is_connected());

    let (_host_conn, guest_conn) = connect_pair(&host, &guest).await;

    timeout(WAIT, host.wait_connected()).await.expect("host barrier");
    timeout(WAIT, guest.wait_connected())
        .await
        .expect("guest barrier");
    assert!(host.is_connected());
    assert!(guest.is_connected());

    // The flag remains true after the peer drops.
    guest_conn.close().await.expect("close");
    let mut states = host.state_changes();
    timeout(WAIT, states.wait_for(|s| *s == SessionState::Disconnected))
        .await
        .expect("disconnect observed")
        .expect("watch alive");
    assert!(host.is_connected());
}

// ============================================================================
// SCENARIO A: one ball-setup event, host to guest
// ============================================================================

#[tokio::test]
async fn test_ball_setup_reaches_guest_subscriber() {
    let host = Session::new(Role::Host);
    let guest = Session::new(Role::Guest);

    // Scene setup registers before the transport starts.
    let (tx, mut rx) = mpsc::unbounded_channel();
    guest
        .dispatcher()
        .register(EventKind::BallSetup, move |event| {
            tx.send(*event).expect("capture");
        })
        .expect("register");

    let (host_conn, _guest_conn) = connect_pair(&host, &guest).await;

    host_conn
        .send(Event::BallSetup { x: 100.0, y: 50.0 })
        .await
        .expect("send");

    let received = timeout(WAIT, rx.recv())
        .await
        .expect("delivery")
        .expect("channel open");
    assert_eq!(received, Event::BallSetup { x: 100.0, y: 50.0 });

    // Exactly one event: nothing else trickles in.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());
}

// ============================================================================
// SCENARIO B: sixty back-to-back events, order preserved
// ============================================================================

#[tokio::test]
async fn test_sixty_goals_delivered_exactly_sixty_times() {
    let host = Session::new(Role::Host);
    let guest = Session::new(Role::Guest);

    let (tx, mut rx) = mpsc::unbounded_channel();
    guest
        .dispatcher()
        .register(EventKind::Goal, move |event| {
            tx.send(*event).expect("capture");
        })
        .expect("register");

    let (host_conn, _guest_conn) = connect_pair(&host, &guest).await;

    for _ in 0..60 {
        host_conn.send(Event::Goal).await.expect("send");
    }

    for i in 0..60 {
        let event = timeout(WAIT, rx.recv())
            .await
            .unwrap_or_else(|_| panic!("goal {i} never arrived"))
            .expect("channel open");
        assert_eq!(event, Event::Goal);
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err(), "exactly sixty, not more");
}

#[tokio::test]
async fn test_burst_preserves_send_order() {
    let host = Session::new(Role::Host);
    let guest = Session::new(Role::Guest);

    let (tx, mut rx) = mpsc::unbounded_channel();
    guest
        .dispatcher()
        .register(EventKind::BallSetup, move |event| {
            tx.send(*event).expect("capture");
        })
        .expect("register");

    let (host_conn, _guest_conn) = connect_pair(&host, &guest).await;

    for i in 0..60 {
        host_conn
            .send(Event::BallSetup {
                x: i as f32,
                y: 0.0,
            })
            .await
            .expect("send");
    }

    for i in 0..60 {
        let event = timeout(WAIT, rx.recv())
            .await
            .expect("delivery")
            .expect("channel open");
        assert_eq!(event, Event::BallSetup { x: i as f32, y: 0.0 });
    }
}

// ============================================================================
// SCENARIO C: peer disconnect
// ============================================================================

#[tokio::test]
async fn test_peer_close_surfaces_disconnect_without_fault() {
    let host = Session::new(Role::Host);
    let guest = Session::new(Role::Guest);

    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = delivered.clone();
    host.dispatcher()
        .register(EventKind::Goal, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("register");

    let (host_conn, guest_conn) = connect_pair(&host, &guest).await;

    guest_conn.send(Event::Goal).await.expect("send");
    guest_conn.close().await.expect("close");

    let mut states = host.state_changes();
    timeout(WAIT, states.wait_for(|s| *s == SessionState::Disconnected))
        .await
        .expect("host observes the disconnect")
        .expect("watch alive");
    host_conn.closed().await;

    // Everything sent before the close arrived; nothing arrives after.
    assert_eq!(delivered.load(Ordering::SeqCst), 1);
    assert_eq!(guest.state(), SessionState::Closed);
}

#[tokio::test]
async fn test_send_after_peer_gone_reports_error() {
    let host = Session::new(Role::Host);
    let guest = Session::new(Role::Guest);
    let (host_conn, guest_conn) = connect_pair(&host, &guest).await;

    guest_conn.close().await.expect("close");
    // Drop the handle so the guest socket closes fully, not just its write half.
    drop(guest_conn);
    host_conn.closed().await;

    // Once the receive loop has observed the disconnect, sending reports
    // the lost peer instead of writing into the void.
    let err = host_conn
        .send(Event::Goal)
        .await
        .expect_err("send against a lost peer must fail");
    assert!(matches!(
        err,
        NetError::PeerDisconnected | NetError::Send(_)
    ));
}

// ============================================================================
// SETUP AND CONNECT FAILURES
// ============================================================================

#[tokio::test]
async fn test_dial_refused_is_connect_error_and_closes_session() {
    let guest = Session::new(Role::Guest);

    // Bind to learn a free port, then close it again
    let listener = Listener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().to_string();
    drop(listener);

    let result = dial(&guest, &addr, &TransportSettings::default()).await;
    assert!(matches!(result, Err(NetError::Connect(_))));
    assert!(!guest.is_connected());

    // A session that never connected reaches its terminal state, and the
    // startup barrier unblocks instead of hanging forever.
    assert_eq!(guest.state(), SessionState::Closed);
    timeout(WAIT, guest.wait_connected())
        .await
        .expect("barrier must unblock after a failed dial");
    assert!(!guest.is_connected());
}

#[tokio::test]
async fn test_accept_timeout_is_setup_error_and_closes_session() {
    let host = Session::new(Role::Host);
    let listener = Listener::bind("127.0.0.1:0").await.expect("bind");

    let result = listener
        .accept_one(&host, Some(Duration::from_millis(200)))
        .await;
    assert!(matches!(result, Err(NetError::Setup(_))));
    assert!(!host.is_connected());

    assert_eq!(host.state(), SessionState::Closed);
    timeout(WAIT, host.wait_connected())
        .await
        .expect("barrier must unblock after an accept timeout");
    assert!(!host.is_connected());
}

#[tokio::test]
async fn test_bind_on_occupied_port_is_setup_error() {
    let first = Listener::bind("127.0.0.1:0").await.expect("bind");
    let addr = first.local_addr().to_string();

    let result = Listener::bind(&addr).await;
    assert!(matches!(result, Err(NetError::Setup(_))));

    // The one-call host entry also closes the session on a bind failure.
    let host = Session::new(Role::Host);
    let result = netball_net::transport::listen_and_accept(
        &host,
        &addr,
        &TransportSettings::default(),
    )
    .await;
    assert!(matches!(result, Err(NetError::Setup(_))));
    assert_eq!(host.state(), SessionState::Closed);
    timeout(WAIT, host.wait_connected())
        .await
        .expect("barrier must unblock after a failed bind");
}

// ============================================================================
// SHUTDOWN AND MULTI-ROUND ACCEPT
// ============================================================================

#[tokio::test]
async fn test_close_is_idempotent() {
    let host = Session::new(Role::Host);
    let guest = Session::new(Role::Guest);
    let (host_conn, _guest_conn) = connect_pair(&host, &guest).await;

    host_conn.close().await.expect("first close");
    host_conn.close().await.expect("second close is a no-op");
    assert_eq!(host.state(), SessionState::Closed);
}

#[tokio::test]
async fn test_accept_repeatedly_serves_a_second_round() {
    let host = Session::new(Role::Host);
    let listener = Listener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().to_string();

    let rounds = Arc::new(AtomicUsize::new(0));
    let goals = Arc::new(AtomicUsize::new(0));
    let counter = goals.clone();
    host.dispatcher()
        .register(EventKind::Goal, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("register");

    let server = {
        let host = host.clone();
        let rounds = rounds.clone();
        tokio::spawn(async move {
            let settings = TransportSettings::default();
            let _ = accept_repeatedly(listener, host, &settings, move |_| {
                rounds.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        })
    };

    // Round one
    let guest1 = Session::new(Role::Guest);
    let conn1 = dial(&guest1, &addr, &TransportSettings::default())
        .await
        .expect("first dial");
    conn1.send(Event::Goal).await.expect("send");
    conn1.close().await.expect("close");

    // Round two, once the host is back in accept
    let guest2 = Session::new(Role::Guest);
    let conn2 = dial(&guest2, &addr, &TransportSettings::default())
        .await
        .expect("second dial");
    conn2.send(Event::Goal).await.expect("send");

    let deadline = tokio::time::Instant::now() + WAIT;
    while goals.load(Ordering::SeqCst) < 2 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "second round never delivered (goals: {}, rounds: {})",
            goals.load(Ordering::SeqCst),
            rounds.load(Ordering::SeqCst)
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert!(rounds.load(Ordering::SeqCst) >= 2);
    server.abort();
}
