use std::sync::Arc;

use morse_relay::error::{ActuatorError, RelayError};
use morse_relay::scheduler::{Coordinator, Speed, StatusSnapshot};

#[test]
fn test_set_speed_clamps_every_integer() {
    let coordinator = Coordinator::default();

    for n in -50i64..=60 {
        let expected = n.clamp(5, 30) as u8;
        let speed = coordinator.set_speed(&n.to_string()).unwrap();
        assert_eq!(speed.wpm(), expected, "input {n}");
        assert_eq!(coordinator.speed().wpm(), expected, "input {n}");
    }
}

#[test]
fn test_set_speed_rejects_non_numeric() {
    let coordinator = Coordinator::default();
    coordinator.set_speed("12").unwrap();

    let result = coordinator.set_speed("abc");

    assert_eq!(result, Err(RelayError::BadSpeed("abc".to_string())));
    assert_eq!(coordinator.speed().wpm(), 12);
}

#[test]
fn test_set_speed_is_idempotent() {
    let coordinator = Coordinator::default();
    assert_eq!(coordinator.set_speed("40").unwrap().wpm(), 30);
    assert_eq!(coordinator.set_speed("30").unwrap().wpm(), 30);
    assert_eq!(coordinator.speed().wpm(), 30);
}

#[test]
fn test_enqueue_rejects_empty_text() {
    let coordinator = Coordinator::default();

    assert_eq!(coordinator.enqueue("", None), Err(RelayError::EmptyText));
    assert_eq!(
        coordinator.enqueue("   \r\n  ", Some("10")),
        Err(RelayError::EmptyText)
    );

    let status = coordinator.status();
    assert_eq!(status.queue_len, 0);
    assert_eq!(status.last, StatusSnapshot::Idle);
}

#[test]
fn test_enqueue_resolves_speed() {
    let coordinator = Coordinator::default();
    coordinator.set_speed("12").unwrap();

    assert_eq!(coordinator.enqueue("SOS", None).unwrap().speed.wpm(), 12);
    assert_eq!(
        coordinator.enqueue("SOS", Some("999")).unwrap().speed.wpm(),
        30
    );
    assert_eq!(coordinator.enqueue("SOS", Some("2")).unwrap().speed.wpm(), 5);
    assert_eq!(coordinator.queue_len(), 3);
}

#[test]
fn test_enqueue_unparseable_speed_falls_back_to_default() {
    let coordinator = Coordinator::new(Speed::clamped(22));

    let accepted = coordinator.enqueue("SOS", Some("fast")).unwrap();

    assert_eq!(accepted.speed.wpm(), 22);
    assert_eq!(coordinator.speed().wpm(), 22);
}

#[test]
fn test_enqueue_normalizes_text() {
    let coordinator = Coordinator::default();

    let accepted = coordinator.enqueue("  hello\r\nworld \r", None).unwrap();

    assert_eq!(accepted.txt, "hello\nworld");
    assert_eq!(accepted.len, 11);
}

#[test]
fn test_enqueue_updates_status_register() {
    let coordinator = Coordinator::default();
    coordinator.enqueue("A", Some("8")).unwrap();
    coordinator.enqueue("B", Some("9")).unwrap();

    let status = coordinator.status();
    assert!(!status.busy);
    assert_eq!(status.queue_len, 2);
    assert_eq!(
        status.last,
        StatusSnapshot::Queued {
            txt: "B".to_string(),
            speed: Speed::clamped(9),
            queue_len: 2,
        }
    );
}

#[test]
fn test_fifo_dispatch_order() {
    let coordinator = Coordinator::default();
    for text in ["A", "B", "C"] {
        coordinator.enqueue(text, None).unwrap();
    }

    let mut dispatched = Vec::new();
    for _ in 0..3 {
        let in_flight = coordinator.begin_dispatch().unwrap();
        dispatched.push(in_flight.job().text().to_string());
        in_flight.finish(Ok("ok".to_string()));
    }

    assert_eq!(dispatched, vec!["A", "B", "C"]);
    assert!(coordinator.begin_dispatch().is_none());
}

#[test]
fn test_no_dequeue_while_busy() {
    let coordinator = Coordinator::default();
    coordinator.enqueue("FIRST", None).unwrap();
    coordinator.enqueue("SECOND", None).unwrap();

    let in_flight = coordinator.begin_dispatch().unwrap();
    assert!(coordinator.is_busy());

    // Second attempt while busy: nothing moves
    assert!(coordinator.begin_dispatch().is_none());
    assert_eq!(coordinator.queue_len(), 1);
    assert_eq!(coordinator.status().last.state(), "sending");

    in_flight.finish(Ok("ok".to_string()));
    assert!(!coordinator.is_busy());

    let next = coordinator.begin_dispatch().unwrap();
    assert_eq!(next.job().text(), "SECOND");
    next.finish(Ok("ok".to_string()));
}

#[test]
fn test_failure_is_recorded_and_not_requeued() {
    let coordinator = Coordinator::default();
    coordinator.enqueue("MAYDAY", Some("11")).unwrap();

    let in_flight = coordinator.begin_dispatch().unwrap();
    let snapshot = in_flight.finish(Err(ActuatorError::Rejected("jammed".to_string())));

    let status = coordinator.status();
    assert!(!status.busy);
    assert_eq!(status.queue_len, 0);
    assert_eq!(status.last, snapshot);
    match snapshot {
        StatusSnapshot::Error {
            txt, speed, detail, ..
        } => {
            assert_eq!(txt, "MAYDAY");
            assert_eq!(speed.wpm(), 11);
            assert!(detail.contains("jammed"));
        }
        other => panic!("expected error snapshot, got {other:?}"),
    }
    assert!(coordinator.begin_dispatch().is_none());
}

#[test]
fn test_done_reports_current_queue_length() {
    let coordinator = Coordinator::default();
    coordinator.enqueue("ONE", None).unwrap();

    let in_flight = coordinator.begin_dispatch().unwrap();
    // Produced while the first job is in flight
    coordinator.enqueue("TWO", None).unwrap();
    coordinator.enqueue("THREE", None).unwrap();
    let snapshot = in_flight.finish(Ok("ok".to_string()));

    assert_eq!(snapshot.state(), "done");
    assert_eq!(snapshot.queue_len(), Some(2));
}

#[test]
fn test_concurrent_producers_keep_every_job() {
    let coordinator = Arc::new(Coordinator::default());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let coordinator = coordinator.clone();
            std::thread::spawn(move || {
                for i in 0..25 {
                    coordinator.enqueue(&format!("T{t} M{i}"), None).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(coordinator.queue_len(), 200);
}

#[test]
fn test_concurrent_dispatch_attempts_allow_one_in_flight() {
    let coordinator = Arc::new(Coordinator::default());
    for i in 0..10 {
        coordinator.enqueue(&format!("M{i}"), None).unwrap();
    }

    let in_flight = coordinator.begin_dispatch().unwrap();

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let coordinator = coordinator.clone();
            std::thread::spawn(move || coordinator.begin_dispatch().is_some())
        })
        .collect();
    for attempt in attempts {
        assert!(!attempt.join().unwrap());
    }

    assert_eq!(coordinator.queue_len(), 9);
    in_flight.finish(Ok("ok".to_string()));
}
