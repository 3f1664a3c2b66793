//! Integration tests for the event hub
//!
//! Exercises the hub end to end through its public handle: registration,
//! ordered delivery, response listeners, shared state, and shutdown. Tests
//! use the harness crate's recording extensions and collectors, with
//! explicit waits instead of assuming delivery is instantaneous.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hubkit_core::value::{event_data, Value};
use hubkit_harness::{test_extension, EventCollector, LifecycleLog, TestExtensionConfig};
use hubkit_runtime::{
    event_source, event_type, Event, EventHub, EventHubBuilder, ExtensionError, HubConfig,
    RegistrationError, SharedStateType, EVENT_HUB_NAME,
};

const WAIT: Duration = Duration::from_millis(500);
const QUIET: Duration = Duration::from_millis(60);

// ----------------------------------------------------------------------------
// Test Utilities
// ----------------------------------------------------------------------------

async fn test_hub() -> EventHub {
    EventHubBuilder::new()
        .with_config(HubConfig::for_testing())
        .build()
        .await
}

fn sample_event(name: &str, event_type: &str, source: &str) -> Event {
    Event::builder(name, event_type, source).build()
}

fn kv(key: &str, value: &str) -> hubkit_core::EventData {
    event_data([(key, Value::from(value))])
}

// ----------------------------------------------------------------------------
// Delivery
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_two_extensions_receive_one_event() {
    let hub = test_hub().await;
    let typed = EventCollector::new();
    let wildcard = EventCollector::new();

    hub.register_extension(test_extension(
        TestExtensionConfig::named("com.example.a").listen("T", "S", typed.listener()),
    ))
    .await
    .unwrap();
    hub.register_extension(test_extension(
        TestExtensionConfig::named("com.example.b").listen("*", "*", wildcard.listener()),
    ))
    .await
    .unwrap();
    hub.start().await;

    let event = sample_event("greeting", "T", "S");
    let event_id = event.id().to_string();
    hub.dispatch(event).await;

    assert!(typed.wait_for_count(1, WAIT).await);
    assert_eq!(typed.events()[0].id(), event_id);

    // The wildcard listener also sees hub-internal events; the dispatched
    // event must be among them exactly once.
    assert!(wildcard.wait_for_count(1, WAIT).await);
    wildcard.settle(QUIET).await;
    let matches: Vec<_> = wildcard
        .events()
        .into_iter()
        .filter(|e| e.id() == event_id)
        .collect();
    assert_eq!(matches.len(), 1);

    hub.shutdown().await;
}

#[tokio::test]
async fn test_event_numbers_are_contiguous_from_one() {
    let hub = test_hub().await;

    // Masked events land in the history sink along with their numbers.
    for name in ["first", "second", "third"] {
        hub.dispatch(
            Event::builder(name, "T", "S")
                .mask(vec!["k".to_string()])
                .build(),
        )
        .await;
    }
    hub.start().await;

    let deadline = tokio::time::Instant::now() + WAIT;
    loop {
        if hub.event_history().await.len() >= 3 || tokio::time::Instant::now() >= deadline {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let history = hub.event_history().await;
    let numbers: Vec<_> = history.iter().map(|(number, _)| *number).collect();
    let names: Vec<_> = history
        .iter()
        .map(|(_, event)| event.name().to_string())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(names, vec!["first", "second", "third"]);

    hub.shutdown().await;
}

#[tokio::test]
async fn test_events_queue_until_start() {
    let hub = test_hub().await;
    let collector = EventCollector::new();

    hub.register_extension(test_extension(
        TestExtensionConfig::named("com.example.late").listen("T", "S", collector.listener()),
    ))
    .await
    .unwrap();

    hub.dispatch(sample_event("queued", "T", "S")).await;
    tokio::time::sleep(QUIET).await;
    assert!(collector.is_empty());

    hub.start().await;
    assert!(collector.wait_for_count(1, WAIT).await);
    assert_eq!(collector.names(), vec!["queued".to_string()]);

    hub.shutdown().await;
}

#[tokio::test]
async fn test_fifo_order_per_extension() {
    let hub = test_hub().await;
    let collector = EventCollector::new();

    hub.register_extension(test_extension(
        TestExtensionConfig::named("com.example.order").listen("T", "S", collector.listener()),
    ))
    .await
    .unwrap();
    hub.start().await;

    let expected: Vec<String> = (0..25).map(|n| format!("event-{n}")).collect();
    for name in &expected {
        hub.dispatch(sample_event(name, "T", "S")).await;
    }

    assert!(collector.wait_for_count(expected.len(), WAIT).await);
    assert_eq!(collector.names(), expected);

    hub.shutdown().await;
}

#[tokio::test]
async fn test_wildcard_type_listener_filters_by_source() {
    let hub = test_hub().await;
    let collector = EventCollector::new();

    hub.register_extension(test_extension(
        TestExtensionConfig::named("com.example.bysource").listen(
            "*",
            "com.example.source.match",
            collector.listener(),
        ),
    ))
    .await
    .unwrap();
    hub.start().await;

    hub.dispatch(sample_event("hit-1", "T1", "com.example.source.match"))
        .await;
    hub.dispatch(sample_event("miss", "T1", "com.example.source.other"))
        .await;
    hub.dispatch(sample_event("hit-2", "T2", "COM.EXAMPLE.SOURCE.MATCH"))
        .await;

    assert!(collector.wait_for_count(2, WAIT).await);
    collector.settle(QUIET).await;
    assert_eq!(
        collector.names(),
        vec!["hit-1".to_string(), "hit-2".to_string()]
    );

    hub.shutdown().await;
}

#[tokio::test]
async fn test_unattributed_listener_via_hub() {
    let hub = test_hub().await;
    let collector = EventCollector::new();
    let listener = collector.listener();

    hub.register_listener("T", "S", move |event| listener(event))
        .await;
    hub.start().await;

    hub.dispatch(sample_event("to-placeholder", "T", "S")).await;
    assert!(collector.wait_for_count(1, WAIT).await);

    hub.shutdown().await;
}

// ----------------------------------------------------------------------------
// Registration
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_duplicate_name_rejected_first_intact() {
    let hub = test_hub().await;
    let collector = EventCollector::new();

    hub.register_extension(test_extension(
        TestExtensionConfig::named("com.example.dup").listen("T", "S", collector.listener()),
    ))
    .await
    .unwrap();

    let second = hub
        .register_extension(test_extension(TestExtensionConfig::named("com.example.dup")))
        .await;
    assert_eq!(second, Err(RegistrationError::DuplicateExtensionName));

    hub.start().await;
    hub.dispatch(sample_event("still-delivered", "T", "S")).await;
    assert!(collector.wait_for_count(1, WAIT).await);

    hub.shutdown().await;
}

#[tokio::test]
async fn test_blank_name_rejected() {
    let hub = test_hub().await;
    let result = hub
        .register_extension(test_extension(TestExtensionConfig::named("   ")))
        .await;
    assert_eq!(result, Err(RegistrationError::InvalidExtensionName));
    hub.shutdown().await;
}

#[tokio::test]
async fn test_failed_on_registered_reports_initialization_failure() {
    let hub = test_hub().await;
    let lifecycle = LifecycleLog::new();

    let result = hub
        .register_extension(test_extension(
            TestExtensionConfig::named("com.example.broken")
                .failing()
                .lifecycle(lifecycle.clone()),
        ))
        .await;
    assert_eq!(result, Err(RegistrationError::ExtensionInitializationFailure));

    // The container is gone: its state store is unreachable.
    let state = hub
        .get_shared_state(SharedStateType::Standard, "com.example.broken", None)
        .await;
    assert_eq!(state, Err(ExtensionError::BadName));

    hub.shutdown().await;
}

#[tokio::test]
async fn test_unregister_runs_hook_and_stops_delivery() {
    let hub = test_hub().await;
    let collector = EventCollector::new();
    let lifecycle = LifecycleLog::new();

    hub.register_extension(test_extension(
        TestExtensionConfig::named("com.example.gone")
            .listen("T", "S", collector.listener())
            .lifecycle(lifecycle.clone()),
    ))
    .await
    .unwrap();
    hub.start().await;

    hub.dispatch(sample_event("before", "T", "S")).await;
    assert!(collector.wait_for_count(1, WAIT).await);

    hub.unregister_extension("com.example.gone").await.unwrap();
    hub.dispatch(sample_event("after", "T", "S")).await;

    collector.settle(QUIET).await;
    assert_eq!(collector.names(), vec!["before".to_string()]);

    let deadline = tokio::time::Instant::now() + WAIT;
    while !lifecycle
        .entries()
        .contains(&"com.example.gone:unregistered".to_string())
    {
        assert!(tokio::time::Instant::now() < deadline, "hook never ran");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(
        hub.unregister_extension("com.example.gone").await,
        Err(RegistrationError::ExtensionNotRegistered)
    );
    hub.shutdown().await;
}

#[tokio::test]
async fn test_placeholder_is_not_unregisterable() {
    let hub = test_hub().await;
    assert_eq!(
        hub.unregister_extension(EVENT_HUB_NAME).await,
        Err(RegistrationError::ExtensionNotRegistered)
    );
    hub.shutdown().await;
}

// ----------------------------------------------------------------------------
// Response Listeners
// ----------------------------------------------------------------------------

fn response_capture() -> (
    hubkit_core::ResponseCallback,
    Arc<Mutex<Vec<Result<String, String>>>>,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: hubkit_core::ResponseCallback = Box::new(move |result| {
        sink.lock().unwrap().push(
            result
                .map(|event| event.name().to_string())
                .map_err(|err| err.to_string()),
        );
    });
    (callback, seen)
}

#[tokio::test]
async fn test_response_listener_times_out_once() {
    let hub = test_hub().await;
    hub.start().await;

    let trigger = sample_event("request", "T", "S");
    let (callback, seen) = response_capture();
    hub.register_response_listener(&trigger, Duration::from_millis(50), callback)
        .await;

    tokio::time::sleep(Duration::from_millis(150)).await;
    {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_err());
    }

    // A late response must not fire the evicted listener.
    hub.dispatch(
        Event::builder("late", "T", "S")
            .in_response_to(&trigger)
            .build(),
    )
    .await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(seen.lock().unwrap().len(), 1);

    hub.shutdown().await;
}

#[tokio::test]
async fn test_response_listener_fires_once_on_success() {
    let hub = test_hub().await;
    hub.start().await;

    let trigger = sample_event("request", "T", "S");
    let (callback, seen) = response_capture();
    hub.register_response_listener(&trigger, Duration::from_secs(10), callback)
        .await;

    hub.dispatch(
        Event::builder("answer", "T", "S")
            .in_response_to(&trigger)
            .build(),
    )
    .await;

    let deadline = tokio::time::Instant::now() + WAIT;
    while seen.lock().unwrap().is_empty() {
        assert!(tokio::time::Instant::now() < deadline, "response never arrived");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // A second response to the same trigger finds no listener.
    hub.dispatch(
        Event::builder("answer-again", "T", "S")
            .in_response_to(&trigger)
            .build(),
    )
    .await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.as_slice(), [Ok("answer".to_string())]);

    hub.shutdown().await;
}

#[tokio::test]
async fn test_dispatch_with_response_round_trip() {
    let hub = test_hub().await;
    let responder_hub = hub.clone();

    hub.register_extension(test_extension(
        TestExtensionConfig::named("com.example.responder").listen(
            "T",
            "com.example.source.request",
            Arc::new(move |event: Arc<Event>| {
                let hub = responder_hub.clone();
                tokio::spawn(async move {
                    hub.dispatch(
                        Event::builder("pong", "T", "com.example.source.response")
                            .in_response_to(&event)
                            .build(),
                    )
                    .await;
                });
            }),
        ),
    ))
    .await
    .unwrap();
    hub.start().await;

    let response = hub
        .dispatch_with_response(
            sample_event("ping", "T", "com.example.source.request"),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert_eq!(response.name(), "pong");

    hub.shutdown().await;
}

// ----------------------------------------------------------------------------
// Shared State
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_state_resolves_by_event_version() {
    let hub = test_hub().await;
    hub.register_extension(test_extension(TestExtensionConfig::named("X")))
        .await
        .unwrap();

    let e1 = sample_event("e1", "T", "S");
    let e2 = sample_event("e2", "T", "S");
    hub.dispatch(e1.clone()).await;
    hub.dispatch(e2.clone()).await;

    assert_eq!(
        hub.set_shared_state(SharedStateType::Standard, "X", Some(kv("k", "v1")), Some(&e1))
            .await,
        Ok(true)
    );
    assert_eq!(
        hub.set_shared_state(SharedStateType::Standard, "X", Some(kv("k", "v2")), Some(&e2))
            .await,
        Ok(true)
    );

    assert_eq!(
        hub.get_shared_state(SharedStateType::Standard, "X", Some(&e1))
            .await,
        Ok(Some(kv("k", "v1")))
    );
    assert_eq!(
        hub.get_shared_state(SharedStateType::Standard, "X", Some(&e2))
            .await,
        Ok(Some(kv("k", "v2")))
    );
    assert_eq!(
        hub.get_shared_state(SharedStateType::Standard, "X", None).await,
        Ok(Some(kv("k", "v2")))
    );

    hub.shutdown().await;
}

#[tokio::test]
async fn test_pending_state_resolves_in_place() {
    let hub = test_hub().await;
    hub.register_extension(test_extension(TestExtensionConfig::named("X")))
        .await
        .unwrap();

    let e1 = sample_event("e1", "T", "S");
    hub.dispatch(e1.clone()).await;

    assert_eq!(
        hub.set_shared_state(SharedStateType::Standard, "X", None, Some(&e1))
            .await,
        Ok(true)
    );
    assert_eq!(
        hub.get_shared_state(SharedStateType::Standard, "X", Some(&e1))
            .await,
        Ok(None)
    );

    assert_eq!(
        hub.set_shared_state(SharedStateType::Standard, "X", Some(kv("k", "v")), Some(&e1))
            .await,
        Ok(true)
    );
    assert_eq!(
        hub.get_shared_state(SharedStateType::Standard, "X", Some(&e1))
            .await,
        Ok(Some(kv("k", "v")))
    );

    hub.shutdown().await;
}

#[tokio::test]
async fn test_blank_and_unknown_names_rejected() {
    let hub = test_hub().await;

    assert_eq!(
        hub.set_shared_state(SharedStateType::Standard, "", Some(kv("k", "v")), None)
            .await,
        Err(ExtensionError::BadName)
    );
    assert_eq!(
        hub.get_shared_state(SharedStateType::Standard, "com.example.nowhere", None)
            .await,
        Err(ExtensionError::BadName)
    );

    hub.shutdown().await;
}

#[tokio::test]
async fn test_xdm_and_standard_states_are_independent() {
    let hub = test_hub().await;
    hub.register_extension(test_extension(TestExtensionConfig::named("X")))
        .await
        .unwrap();

    assert_eq!(
        hub.set_shared_state(SharedStateType::Xdm, "X", Some(kv("k", "xdm")), None)
            .await,
        Ok(true)
    );
    assert_eq!(
        hub.get_shared_state(SharedStateType::Standard, "X", None).await,
        Ok(None)
    );
    assert_eq!(
        hub.get_shared_state(SharedStateType::Xdm, "X", None).await,
        Ok(Some(kv("k", "xdm")))
    );

    hub.shutdown().await;
}

#[tokio::test]
async fn test_clear_shared_state() {
    let hub = test_hub().await;
    hub.register_extension(test_extension(TestExtensionConfig::named("X")))
        .await
        .unwrap();

    hub.set_shared_state(SharedStateType::Standard, "X", Some(kv("k", "v")), None)
        .await
        .unwrap();
    assert_eq!(
        hub.clear_shared_state(SharedStateType::Standard, "X").await,
        Ok(true)
    );
    assert_eq!(
        hub.get_shared_state(SharedStateType::Standard, "X", None).await,
        Ok(None)
    );

    hub.shutdown().await;
}

#[tokio::test]
async fn test_state_change_notification_dispatched() {
    let hub = test_hub().await;
    let collector = EventCollector::new();

    hub.register_extension(test_extension(
        TestExtensionConfig::named("com.example.watcher").listen(
            event_type::HUB,
            event_source::SHARED_STATE,
            collector.listener(),
        ),
    ))
    .await
    .unwrap();
    hub.register_extension(test_extension(TestExtensionConfig::named("X")))
        .await
        .unwrap();
    hub.start().await;

    hub.set_shared_state(SharedStateType::Standard, "X", Some(kv("k", "v")), None)
        .await
        .unwrap();

    let deadline = tokio::time::Instant::now() + WAIT;
    loop {
        let owned_by_x = collector.events().iter().any(|event| {
            event
                .data()
                .and_then(|data| data.get("stateowner"))
                .and_then(|value| value.as_str())
                == Some("X")
        });
        if owned_by_x {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "no shared-state notification for X"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    hub.shutdown().await;
}

#[tokio::test]
async fn test_hub_publishes_extension_snapshot() {
    let hub = test_hub().await;
    hub.register_extension(test_extension(
        TestExtensionConfig::named("com.example.analytics")
            .friendly_name("Analytics")
            .version("2.1.0"),
    ))
    .await
    .unwrap();
    hub.start().await;

    let snapshot = hub
        .get_shared_state(SharedStateType::Standard, EVENT_HUB_NAME, None)
        .await
        .unwrap()
        .expect("hub shared state must exist after start");

    let extensions = snapshot["extensions"].as_map().expect("extensions map");
    let entry = extensions["Analytics"].as_map().expect("analytics entry");
    assert_eq!(entry["version"].as_str(), Some("2.1.0"));
    assert_eq!(entry["friendlyName"].as_str(), Some("Analytics"));

    hub.shutdown().await;
}

// ----------------------------------------------------------------------------
// Shutdown
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_shutdown_stops_delivery_and_runs_hooks() {
    let hub = test_hub().await;
    let collector = EventCollector::new();
    let lifecycle = LifecycleLog::new();

    hub.register_extension(test_extension(
        TestExtensionConfig::named("com.example.stopme")
            .listen("T", "S", collector.listener())
            .lifecycle(lifecycle.clone()),
    ))
    .await
    .unwrap();
    hub.start().await;

    hub.dispatch(sample_event("delivered", "T", "S")).await;
    assert!(collector.wait_for_count(1, WAIT).await);

    hub.shutdown().await;
    assert!(lifecycle
        .entries()
        .contains(&"com.example.stopme:unregistered".to_string()));

    hub.dispatch(sample_event("dropped", "T", "S")).await;
    tokio::time::sleep(QUIET).await;
    assert_eq!(collector.names(), vec!["delivered".to_string()]);
}
