//! Tests for the event journal

use station_queue::core::{EventSink, InMemoryJournal, StationEvent};

#[test]
fn test_in_memory_journal() {
    let journal = InMemoryJournal::new(100);
    journal.record(StationEvent::Attempted { car: 0 });
    journal.record(StationEvent::Occupied { car: 0, pump: 0 });
    journal.record(StationEvent::HeadAdvanced { car: 0, next: 1 });
    journal.record(StationEvent::Released { car: 0, pump: 0 });

    let events = journal.events();
    assert_eq!(events.len(), 4);
    assert_eq!(events[2], StationEvent::HeadAdvanced { car: 0, next: 1 });
}

#[test]
fn test_journal_bounded_buffer() {
    let journal = InMemoryJournal::new(3);
    for car in 0..10 {
        journal.record(StationEvent::Saturated { car });
    }
    let events = journal.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], StationEvent::Saturated { car: 7 });
}

#[test]
fn test_journal_events_round_trip_json() {
    let events = vec![
        StationEvent::Occupied { car: 2, pump: 1 },
        StationEvent::Released { car: 2, pump: 1 },
    ];
    let json = serde_json::to_string(&events).unwrap();
    let back: Vec<StationEvent> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, events);
}
