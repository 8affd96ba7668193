// File: tests/logic_recurrence.rs
use chrono::{NaiveDate, NaiveTime};
use schedly::controller::{Scheduler, SchedulerOptions};
use schedly::error::ErrorKind;
use schedly::model::{Cadence, Event, RecurrenceEngine};
use schedly::store::EventStore;
use schedly::undo::{CommandKind, UndoState};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn ev(name: &str, date: &str, start: &str, end: &str) -> Event {
    Event::new(
        name,
        d(date),
        NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
        NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
    )
}

fn dates(events: &[Event]) -> Vec<NaiveDate> {
    events.iter().map(|e| e.date).collect()
}

#[test]
fn test_daily_expansion_is_inclusive_of_end() {
    let seed = ev("Standup", "2024-01-01", "09:00", "09:15");
    let series = RecurrenceEngine::expand(&seed, Cadence::Day, d("2024-01-04")).unwrap();
    assert_eq!(
        dates(&series),
        vec![d("2024-01-02"), d("2024-01-03"), d("2024-01-04")]
    );
    assert!(series.iter().all(|e| e.name == "Standup"
        && e.start_time == seed.start_time
        && e.end_time == seed.end_time));
}

#[test]
fn test_weekly_expansion() {
    let seed = ev("Choir", "2024-02-05", "19:00", "21:00");
    let series = RecurrenceEngine::expand(&seed, Cadence::Week, d("2024-02-26")).unwrap();
    assert_eq!(
        dates(&series),
        vec![d("2024-02-12"), d("2024-02-19"), d("2024-02-26")]
    );
}

#[test]
fn test_monthly_tennis_example() {
    let store = EventStore::from_events(vec![ev("Tennis", "2023-12-20", "18:00", "20:00")]).unwrap();
    let mut scheduler = Scheduler::new(store, SchedulerOptions::default());

    let generated = scheduler
        .recur_event(0, d("2024-02-28"), Cadence::Month)
        .unwrap();
    assert_eq!(dates(&generated), vec![d("2024-01-20"), d("2024-02-20")]);
    assert_eq!(scheduler.store().len(), 3);

    assert_eq!(scheduler.undo().unwrap(), CommandKind::Recur);
    assert_eq!(
        scheduler.store().events(),
        &[ev("Tennis", "2023-12-20", "18:00", "20:00")]
    );
    assert_eq!(scheduler.undo_state(), UndoState::Idle);
}

#[test]
fn test_month_end_seed_clamps_each_month() {
    let seed = ev("Rent", "2024-01-31", "08:00", "08:30");
    let series = RecurrenceEngine::expand(&seed, Cadence::Month, d("2024-05-31")).unwrap();
    assert_eq!(
        dates(&series),
        vec![
            d("2024-02-29"),
            d("2024-03-31"),
            d("2024-04-30"),
            d("2024-05-31")
        ]
    );
}

#[test]
fn test_end_before_seed_fails_without_changes() {
    let store = EventStore::from_events(vec![ev("Tennis", "2023-12-20", "18:00", "20:00")]).unwrap();
    let mut scheduler = Scheduler::new(store, SchedulerOptions::default());

    let err = scheduler
        .recur_event(0, d("2023-12-01"), Cadence::Week)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRecurrenceEnd);
    assert_eq!(scheduler.store().len(), 1);
    assert_eq!(scheduler.undo_state(), UndoState::Idle);
}

#[test]
fn test_conflict_rolls_back_whole_series_and_names_step() {
    let store = EventStore::from_events(vec![
        ev("Tennis", "2023-12-20", "18:00", "20:00"),
        ev("Party", "2023-12-23", "19:00", "23:00"),
    ])
    .unwrap();
    let mut scheduler = Scheduler::new(store, SchedulerOptions::default());
    let before = scheduler.export_all();

    // Daily steps: 21st, 22nd, then the 23rd collides with the party.
    let err = scheduler
        .recur_event(0, d("2023-12-27"), Cadence::Day)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OverlapConflict);
    assert_eq!(err.step(), Some(3));
    assert!(err.to_string().contains("recurrence step 3"));

    assert_eq!(scheduler.export_all(), before);
    assert_eq!(scheduler.undo_state(), UndoState::Idle);
}

#[test]
fn test_existing_identity_twin_in_series_is_a_duplicate() {
    let store = EventStore::from_events(vec![
        ev("Yoga", "2024-03-01", "07:00", "08:00"),
        ev("Yoga", "2024-03-15", "07:00", "08:00"),
    ])
    .unwrap();
    let mut scheduler = Scheduler::new(store, SchedulerOptions::default());

    let err = scheduler
        .recur_event(0, d("2024-03-29"), Cadence::Week)
        .unwrap_err();
    // Same rule as a plain add: an identity twin is a duplicate, not an overlap.
    assert_eq!(err.kind(), ErrorKind::DuplicateEntity);
    assert_eq!(err.step(), Some(2));
    assert_eq!(scheduler.store().len(), 2);

    let add_err = scheduler
        .add_event(ev("Yoga", "2024-03-15", "07:00", "08:00"))
        .unwrap_err();
    assert_eq!(add_err.kind(), err.kind());
}

#[test]
fn test_long_daily_series_inserts_and_undoes() {
    let store = EventStore::from_events(vec![
        ev("Standup", "2000-01-01", "09:00", "09:15"),
        ev("Lunch", "2015-06-01", "12:00", "13:00"),
    ])
    .unwrap();
    let mut scheduler = Scheduler::new(store, SchedulerOptions::default());

    let generated = scheduler
        .recur_event(0, d("2029-12-31"), Cadence::Day)
        .unwrap();
    assert_eq!(generated.len(), 10957);
    assert_eq!(scheduler.store().len(), 10959);

    scheduler.undo().unwrap();
    assert_eq!(scheduler.store().len(), 2);
}

#[test]
fn test_late_conflict_in_long_series_leaves_store_untouched() {
    let store = EventStore::from_events(vec![
        ev("Standup", "2000-01-01", "09:00", "09:15"),
        ev("Dentist", "2020-01-01", "09:10", "09:40"),
    ])
    .unwrap();
    let mut scheduler = Scheduler::new(store, SchedulerOptions::default());
    let rx = scheduler.subscribe();

    let err = scheduler
        .recur_event(0, d("2029-12-31"), Cadence::Day)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OverlapConflict);
    assert_eq!(err.step(), Some(7305));
    assert_eq!(scheduler.store().len(), 2);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_insert_series_without_overlap_check_still_guards_identity() {
    let mut store = EventStore::new();
    let seed = ev("Yoga", "2024-03-01", "07:00", "08:00");
    store.add(ev("Yoga", "2024-03-03", "07:00", "08:00")).unwrap();
    store.add(seed.clone()).unwrap();

    let series = RecurrenceEngine::expand(&seed, Cadence::Day, d("2024-03-05")).unwrap();
    let err = RecurrenceEngine::insert_series(&mut store, &series, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntity);
    assert_eq!(err.step(), Some(2));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_recur_addresses_filtered_list() {
    let store = EventStore::from_events(vec![
        ev("Gym", "2024-01-02", "07:00", "08:00"),
        ev("Tennis", "2023-12-20", "18:00", "20:00"),
    ])
    .unwrap();
    let mut scheduler = Scheduler::new(store, SchedulerOptions::default());
    scheduler.set_filter(schedly::model::EventFilter::NameKeywords(vec!["tennis".into()]));

    let generated = scheduler
        .recur_event(0, d("2023-12-27"), Cadence::Week)
        .unwrap();
    assert_eq!(generated, vec![ev("Tennis", "2023-12-27", "18:00", "20:00")]);
}
