//! End-to-end tests for scheduler-driven subscriptions
//!
//! Each test opens a client with a short poll interval, subscribes, and
//! observes the notifications the scheduler delivers. Sleeps are a few
//! ticks long so the assertions do not race the tick task.
//!
//! Run with: cargo test -p plcipc-tests --test subscription_e2e_test

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use plcipc_client::{
    ClientConfig, IpcClient, IpcError, MockTransport, ResultCode, ServerEvent, VarKind, VarValue,
    Variable,
};

const TICK_MS: u64 = 10;

fn harness() -> (Arc<MockTransport>, IpcClient) {
    plcipc_tests::init_tracing();
    let transport = Arc::new(MockTransport::new());
    let config = ClientConfig::new("/run/plc/request", "/run/plc/response")
        .with_poll_interval_ms(TICK_MS);
    let client = IpcClient::open(transport.clone(), config).expect("open client");
    (transport, client)
}

async fn ticks(n: u64) {
    tokio::time::sleep(Duration::from_millis(TICK_MS * n)).await;
}

#[tokio::test]
async fn constant_value_notifies_exactly_once() {
    let (transport, client) = harness();
    transport.add_variable("level", VarKind::Word, vec![0x01, 0x00]);

    let var = Variable::new("level", VarKind::Word);
    client.register(&var).unwrap();

    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = notifications.clone();
    let _sub = var
        .subscribe(
            move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            |_, _| {},
        )
        .unwrap();

    // Far more than five ticks with an unchanged value.
    ticks(10).await;
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn value_changes_are_announced_with_payload() {
    let (transport, client) = harness();
    transport.add_variable("count", VarKind::Byte, vec![1]);

    let var = Variable::new("count", VarKind::Byte);
    client.register(&var).unwrap();

    let seen: Arc<Mutex<Vec<VarValue>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = var
        .subscribe(
            move |_, value| sink.lock().unwrap().push(value.clone()),
            |_, _| {},
        )
        .unwrap();

    ticks(5).await;
    transport.set_raw_value("count", vec![2]);
    ticks(5).await;
    transport.set_raw_value("count", vec![3]);
    ticks(5).await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![VarValue::Int(1), VarValue::Int(2), VarValue::Int(3)]
    );
}

#[tokio::test]
async fn repeated_error_notifies_once_until_it_changes() {
    let (transport, client) = harness();
    transport.add_variable("broken", VarKind::Byte, vec![1]);

    let var = Variable::new("broken", VarKind::Byte);
    client.register(&var).unwrap();

    let errors: Arc<Mutex<Vec<IpcError>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let _sub = var
        .subscribe(
            |_, _| {},
            move |_, error| sink.lock().unwrap().push(error.clone()),
        )
        .unwrap();

    transport.fail_all_gets("broken", ResultCode::ServerProtocol);
    ticks(10).await;
    assert_eq!(errors.lock().unwrap().len(), 1);
    assert_eq!(
        errors.lock().unwrap()[0].code(),
        Some(ResultCode::ServerProtocol)
    );

    // Same kind, same message: still just the one notification. A new
    // kind fires again.
    transport.fail_all_gets("broken", ResultCode::ClientBufferTooSmall);
    ticks(10).await;
    assert_eq!(errors.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn unsubscribe_takes_effect_on_the_next_tick() {
    let (transport, client) = harness();
    transport.add_variable("x", VarKind::Byte, vec![1]);

    let var = Variable::new("x", VarKind::Byte);
    client.register(&var).unwrap();

    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = notifications.clone();
    let sub = var
        .subscribe(
            move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            |_, _| {},
        )
        .unwrap();

    ticks(5).await;
    assert_eq!(notifications.load(Ordering::SeqCst), 1);

    var.unsubscribe(sub);
    ticks(3).await;
    let settled = notifications.load(Ordering::SeqCst);

    transport.set_raw_value("x", vec![2]);
    transport.set_raw_value("x", vec![3]);
    ticks(6).await;
    assert_eq!(notifications.load(Ordering::SeqCst), settled);
}

#[tokio::test]
async fn server_stop_pauses_variable_polling() {
    let (transport, client) = harness();
    transport.add_variable("x", VarKind::Byte, vec![1]);

    let var = Variable::new("x", VarKind::Byte);
    client.register(&var).unwrap();

    let events: Arc<Mutex<Vec<ServerEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let _events_sub = client
        .subscribe_events(move |event| sink.lock().unwrap().push(event))
        .unwrap();
    let _var_sub = var.subscribe(|_, _| {}, |_, _| {}).unwrap();

    ticks(5).await;
    let polls_while_running = transport.get_calls("x");
    assert!(polls_while_running > 0);

    transport.set_server_running(false);
    ticks(3).await;
    let polls_at_stop = transport.get_calls("x");
    ticks(5).await;
    assert_eq!(transport.get_calls("x"), polls_at_stop);
    assert_eq!(*events.lock().unwrap(), vec![ServerEvent::Stopped]);

    transport.set_server_running(true);
    ticks(5).await;
    assert!(transport.get_calls("x") > polls_at_stop);
    assert_eq!(
        *events.lock().unwrap(),
        vec![ServerEvent::Stopped, ServerEvent::Started]
    );
}

#[tokio::test]
async fn scheduler_survives_state_query_failures() {
    let (transport, client) = harness();
    transport.add_variable("x", VarKind::Byte, vec![1]);

    let var = Variable::new("x", VarKind::Byte);
    client.register(&var).unwrap();

    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = notifications.clone();
    let _sub = var
        .subscribe(
            move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            |_, _| {},
        )
        .unwrap();

    // A few bad polls skip their ticks but leave the scheduler alive.
    transport.fail_next_server_queries(ResultCode::SocketRecv, 3);
    ticks(10).await;
    assert!(client.scheduler_running());
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn close_stops_scheduler_and_callbacks() {
    let (transport, client) = harness();
    transport.add_variable("x", VarKind::Byte, vec![1]);

    let var = Variable::new("x", VarKind::Byte);
    client.register(&var).unwrap();

    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = notifications.clone();
    let _sub = var
        .subscribe(
            move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            |_, _| {},
        )
        .unwrap();

    ticks(5).await;
    client.close().unwrap();
    let settled = notifications.load(Ordering::SeqCst);

    transport.set_raw_value("x", vec![99]);
    ticks(6).await;
    assert_eq!(notifications.load(Ordering::SeqCst), settled);
    assert!(!client.scheduler_running());
}

#[tokio::test]
async fn resubscribing_a_dropped_variable_works() {
    let (transport, client) = harness();
    transport.add_variable("x", VarKind::Byte, vec![1]);

    let var = Variable::new("x", VarKind::Byte);
    client.register(&var).unwrap();

    let first = Arc::new(AtomicUsize::new(0));
    let counter = first.clone();
    let sub = var
        .subscribe(
            move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            |_, _| {},
        )
        .unwrap();

    ticks(5).await;
    var.unsubscribe(sub);
    // The variable self-unsubscribes and the scheduler winds down.
    ticks(5).await;
    assert!(!client.scheduler_running());

    // The handle is still usable: subscribing again revives everything.
    let second = Arc::new(AtomicUsize::new(0));
    let counter = second.clone();
    let _sub = var
        .subscribe(
            move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            |_, _| {},
        )
        .unwrap();
    assert!(client.scheduler_running());

    transport.set_raw_value("x", vec![7]);
    ticks(5).await;
    assert!(second.load(Ordering::SeqCst) >= 1);
}
