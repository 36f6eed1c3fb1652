#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Dispatcher contract: registration order, isolation of kinds, and
//! duplicate-registration behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use netball_net::core::event::{Event, EventKind};
use netball_net::protocol::dispatcher::EventDispatcher;

#[test]
fn test_subscribers_run_in_registration_order() {
    let dispatcher = EventDispatcher::new();
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let first = log.clone();
    dispatcher
        .register(EventKind::BallSetup, move |_| {
            first.lock().unwrap().push("s1");
        })
        .expect("register s1");

    let second = log.clone();
    dispatcher
        .register(EventKind::BallSetup, move |_| {
            second.lock().unwrap().push("s2");
        })
        .expect("register s2");

    dispatcher
        .dispatch(&Event::BallSetup { x: 1.0, y: 2.0 })
        .expect("dispatch");

    assert_eq!(*log.lock().unwrap(), vec!["s1", "s2"]);
}

#[test]
fn test_unsubscribed_kind_has_no_observable_effect() {
    let dispatcher = EventDispatcher::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let hits_clone = hits.clone();
    dispatcher
        .register(EventKind::Goal, move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        })
        .expect("register");

    // No BallSetup subscriber: dropped silently, no error
    dispatcher
        .dispatch(&Event::BallSetup { x: 0.0, y: 0.0 })
        .expect("silent drop");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_duplicate_registration_delivers_twice() {
    let dispatcher = EventDispatcher::new();
    let hits = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let hits_clone = hits.clone();
        dispatcher
            .register(EventKind::Goal, move |_| {
                hits_clone.fetch_add(1, Ordering::SeqCst);
            })
            .expect("register");
    }

    dispatcher.dispatch(&Event::Goal).expect("dispatch");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_one_subscriber_many_kinds() {
    let dispatcher = EventDispatcher::new();
    let hits = Arc::new(AtomicUsize::new(0));

    for kind in [EventKind::BallSetup, EventKind::Goal] {
        let hits_clone = hits.clone();
        dispatcher
            .register(kind, move |_| {
                hits_clone.fetch_add(1, Ordering::SeqCst);
            })
            .expect("register");
    }

    dispatcher.dispatch(&Event::Goal).expect("dispatch");
    dispatcher
        .dispatch(&Event::BallSetup { x: 5.0, y: 6.0 })
        .expect("dispatch");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_subscriber_sees_event_fields() {
    let dispatcher = EventDispatcher::new();
    let seen: Arc<Mutex<Option<(f32, f32)>>> = Arc::new(Mutex::new(None));

    let seen_clone = seen.clone();
    dispatcher
        .register(EventKind::BallSetup, move |event| {
            if let Event::BallSetup { x, y } = *event {
                *seen_clone.lock().unwrap() = Some((x, y));
            }
        })
        .expect("register");

    dispatcher
        .dispatch(&Event::BallSetup { x: 100.0, y: 50.0 })
        .expect("dispatch");

    assert_eq!(*seen.lock().unwrap(), Some((100.0, 50.0)));
}

#[test]
fn test_dispatch_from_another_thread() {
    // Registration happens on the "scene setup" thread, dispatch on the
    // receive-loop thread.
    let dispatcher = Arc::new(EventDispatcher::new());
    let hits = Arc::new(AtomicUsize::new(0));

    let hits_clone = hits.clone();
    dispatcher
        .register(EventKind::Goal, move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        })
        .expect("register");

    let worker = {
        let dispatcher = dispatcher.clone();
        std::thread::spawn(move || {
            for _ in 0..10 {
                dispatcher.dispatch(&Event::Goal).expect("dispatch");
            }
        })
    };
    worker.join().expect("worker");

    assert_eq!(hits.load(Ordering::SeqCst), 10);
}
