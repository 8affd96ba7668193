// File: tests/store_behavior.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use schedly::error::ErrorKind;
use schedly::model::{Event, EventFilter};
use schedly::store::{EventStore, StoreChange};

fn ev(name: &str, date: &str, start: &str, end: &str) -> Event {
    Event::new(
        name,
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
        NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
    )
}

#[test]
fn test_add_appends_in_insertion_order() {
    let mut store = EventStore::new();
    store.add(ev("Late", "2024-01-02", "10:00", "11:00")).unwrap();
    store.add(ev("Early", "2024-01-01", "10:00", "11:00")).unwrap();

    let names: Vec<&str> = store.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Late", "Early"]);
}

#[test]
fn test_identity_duplicate_is_rejected() {
    let mut store = EventStore::new();
    let a = ev("Tennis", "2023-12-20", "18:00", "20:00");
    store.add(a.clone()).unwrap();

    let err = store.add(a).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntity);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_store_add_does_not_check_overlap() {
    // Overlap policy lives in the controller, the store only guards identity.
    let mut store = EventStore::new();
    store.add(ev("A", "2023-12-20", "10:00", "12:00")).unwrap();
    store.add(ev("B", "2023-12-20", "11:00", "13:00")).unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn test_same_fields_different_name_is_a_different_event() {
    let mut store = EventStore::new();
    store.add(ev("A", "2023-12-20", "10:00", "12:00")).unwrap();
    store.add(ev("a", "2023-12-20", "10:00", "12:00")).unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn test_exists_overlap_honours_exclusion() {
    let mut store = EventStore::new();
    let a = ev("A", "2023-12-20", "10:00", "12:00");
    store.add(a.clone()).unwrap();

    let moved = ev("A", "2023-12-20", "11:00", "13:00");
    assert!(store.exists_overlap(None, &moved));
    assert!(!store.exists_overlap(Some(&a), &moved));
    assert_eq!(store.find_overlap(None, &moved), Some(&a));

    // Touching ranges do not overlap.
    let after = ev("B", "2023-12-20", "12:00", "13:00");
    assert!(!store.exists_overlap(None, &after));
}

#[test]
fn test_replace_keeps_position() {
    let mut store = EventStore::new();
    let a = ev("A", "2024-01-01", "08:00", "09:00");
    let b = ev("B", "2024-01-01", "10:00", "11:00");
    let c = ev("C", "2024-01-01", "12:00", "13:00");
    for e in [&a, &b, &c] {
        store.add(e.clone()).unwrap();
    }

    let b2 = ev("B2", "2024-01-05", "10:00", "11:00");
    store.replace(&b, b2.clone()).unwrap();
    assert_eq!(store.events(), &[a.clone(), b2, c.clone()]);

    // Replacing with an identity twin of another event fails and changes nothing.
    let err = store.replace(&a, c.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntity);
    assert_eq!(store.events()[0], a);
}

#[test]
fn test_replace_and_remove_missing_target() {
    let mut store = EventStore::new();
    let ghost = ev("Ghost", "2024-01-01", "08:00", "09:00");

    assert_eq!(
        store.replace(&ghost, ghost.clone()).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(store.remove(&ghost).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_remove_reports_index_and_insert_restores_it() {
    let mut store = EventStore::new();
    let a = ev("A", "2024-01-01", "08:00", "09:00");
    let b = ev("B", "2024-01-01", "10:00", "11:00");
    let c = ev("C", "2024-01-01", "12:00", "13:00");
    for e in [&a, &b, &c] {
        store.add(e.clone()).unwrap();
    }

    let at = store.remove(&b).unwrap();
    assert_eq!(at, 1);
    store.insert(at, b.clone()).unwrap();
    assert_eq!(store.events(), &[a, b, c]);
}

#[test]
fn test_from_events_rejects_duplicates() {
    let a = ev("A", "2024-01-01", "08:00", "09:00");
    let err = EventStore::from_events(vec![a.clone(), a]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntity);
}

#[test]
fn test_view_filters_and_sorts_without_touching_store() {
    let mut store = EventStore::new();
    store.add(ev("Gym", "2024-01-02", "07:00", "08:00")).unwrap();
    store.add(ev("Tennis", "2023-12-20", "18:00", "20:00")).unwrap();
    store.add(ev("Tennis lesson", "2023-12-19", "18:00", "20:00")).unwrap();

    let view = store.view(&EventFilter::NameKeywords(vec!["TENNIS".into()]));
    let names: Vec<&str> = view.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Tennis lesson", "Tennis"]);

    // Stored order unchanged.
    assert_eq!(store.events()[0].name, "Gym");
}

#[test]
fn test_keyword_match_is_whole_word() {
    let mut store = EventStore::new();
    store.add(ev("Tennisclub", "2023-12-20", "18:00", "20:00")).unwrap();
    let view = store.view(&EventFilter::NameKeywords(vec!["tennis".into()]));
    assert!(view.is_empty());
}

#[test]
fn test_upcoming_view_limits_after_sorting() {
    let mut store = EventStore::new();
    store.add(ev("C", "2024-01-03", "09:00", "10:00")).unwrap();
    store.add(ev("Past", "2023-01-01", "09:00", "10:00")).unwrap();
    store.add(ev("A", "2024-01-01", "09:00", "10:00")).unwrap();
    store.add(ev("B", "2024-01-02", "09:00", "10:00")).unwrap();

    let from = NaiveDateTime::parse_from_str("2024-01-01 09:00", "%Y-%m-%d %H:%M").unwrap();
    let view = store.view(&EventFilter::Upcoming { from, limit: 2 });
    let names: Vec<&str> = view.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn test_view_out_of_range_is_an_error() {
    let store = EventStore::new();
    let view = store.view(&EventFilter::All);
    let err = view.get(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
}

#[test]
fn test_sorted_view_leaves_storage_order_but_sort_mutates() {
    let mut store = EventStore::new();
    let late = ev("Late", "2024-01-02", "10:00", "11:00");
    let early = ev("Early", "2024-01-01", "10:00", "11:00");
    store.add(late.clone()).unwrap();
    store.add(early.clone()).unwrap();

    let sorted = store.sorted_chronologically();
    assert_eq!(sorted.as_slice(), &[early.clone(), late.clone()]);
    assert_eq!(store.events(), &[late.clone(), early.clone()]);

    store.sort_chronologically();
    assert_eq!(store.events(), &[early, late]);
}

#[test]
fn test_subscribers_see_every_change() {
    let mut store = EventStore::new();
    let rx = store.subscribe();

    let a = ev("A", "2024-01-01", "08:00", "09:00");
    let b = ev("B", "2024-01-01", "10:00", "11:00");
    store.add(a.clone()).unwrap();
    store.replace(&a, b.clone()).unwrap();
    store.remove(&b).unwrap();
    store.replace_all(vec![a.clone()]).unwrap();

    let changes: Vec<StoreChange> = rx.try_iter().collect();
    assert_eq!(
        changes,
        vec![
            StoreChange::Added {
                index: 0,
                event: a.clone()
            },
            StoreChange::Replaced {
                index: 0,
                old: a,
                new: b.clone()
            },
            StoreChange::Removed { index: 0, event: b },
            StoreChange::Reset { len: 1 },
        ]
    );
}

#[test]
fn test_failed_mutation_sends_nothing() {
    let mut store = EventStore::new();
    let a = ev("A", "2024-01-01", "08:00", "09:00");
    store.add(a.clone()).unwrap();
    let rx = store.subscribe();

    assert!(store.add(a).is_err());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_dropped_receiver_is_pruned() {
    let mut store = EventStore::new();
    drop(store.subscribe());
    let rx = store.subscribe();

    store.add(ev("A", "2024-01-01", "08:00", "09:00")).unwrap();
    assert_eq!(rx.try_iter().count(), 1);
}

#[test]
fn test_extend_is_all_or_nothing() {
    let mut store = EventStore::new();
    let a = ev("A", "2024-01-01", "08:00", "09:00");
    store.add(a.clone()).unwrap();
    let rx = store.subscribe();

    let b = ev("B", "2024-01-02", "08:00", "09:00");
    let err = store.extend(&[b.clone(), a.clone()]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntity);
    assert_eq!(err.step(), Some(2));
    assert_eq!(store.events(), &[a.clone()]);
    assert!(rx.try_recv().is_err());

    store.extend(&[b.clone()]).unwrap();
    assert_eq!(store.events(), &[a, b.clone()]);
    assert_eq!(
        rx.try_recv().unwrap(),
        StoreChange::Added { index: 1, event: b }
    );
}

#[test]
fn test_remove_all_is_all_or_nothing() {
    let a = ev("A", "2024-01-01", "08:00", "09:00");
    let b = ev("B", "2024-01-02", "08:00", "09:00");
    let c = ev("C", "2024-01-03", "08:00", "09:00");
    let mut store = EventStore::from_events(vec![a.clone(), b.clone(), c.clone()]).unwrap();
    let rx = store.subscribe();

    let ghost = ev("Ghost", "2024-01-04", "08:00", "09:00");
    let err = store.remove_all(&[a.clone(), ghost]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(store.len(), 3);

    store.remove_all(&[c.clone(), a.clone()]).unwrap();
    assert_eq!(store.events(), &[b]);
    let changes: Vec<StoreChange> = rx.try_iter().collect();
    assert_eq!(
        changes,
        vec![
            StoreChange::Removed { index: 0, event: a },
            StoreChange::Removed { index: 1, event: c },
        ]
    );
}

#[test]
fn test_clear_empties_and_notifies() {
    let mut store =
        EventStore::from_events(vec![ev("A", "2024-01-01", "08:00", "09:00")]).unwrap();
    let rx = store.subscribe();

    store.clear();
    assert!(store.is_empty());
    assert_eq!(rx.try_recv().unwrap(), StoreChange::Reset { len: 0 });
}
