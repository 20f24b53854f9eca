use chrono::NaiveDate;
use rusqlite::Connection;
use tdih_core::db::open_db_in_memory;
use tdih_core::{
    CandidateFilter, DateRange, EventOrder, EventRepository, EventStore,
    HistoricalEvent, InvalidQueryError, RawDate, RepoError, RepoResult, RetrievalConfig,
    SqliteEventRepository, TdihError, TdihService,
};

fn seed(conn: &Connection, events: &[HistoricalEvent]) {
    let repo = SqliteEventRepository::try_new(conn).unwrap();
    for event in events {
        repo.create_event(event).unwrap();
    }
}

fn store_order() -> RetrievalConfig {
    RetrievalConfig {
        order: EventOrder::Store,
        ..RetrievalConfig::default()
    }
}

fn titles(events: &[HistoricalEvent]) -> Vec<&str> {
    events.iter().map(|event| event.title.as_str()).collect()
}

#[test]
fn christmas_lookup_promotes_reference_year_and_excludes_other_days() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            HistoricalEvent::new("christmas 1994", RawDate::ymd(1994, 12, 25)),
            HistoricalEvent::new("christmas 1652", RawDate::ymd(1652, 12, 25)),
            HistoricalEvent::new("june 1990", RawDate::ymd(1990, 6, 1)),
        ],
    );
    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    let service = TdihService::new(repo);

    let ranked = service.find_events(12, 25, Some(1994)).unwrap();
    let order = ranked
        .items
        .iter()
        .map(|item| (item.event.title.as_str(), item.exact_match))
        .collect::<Vec<_>>();
    assert_eq!(
        order,
        vec![("christmas 1994", true), ("christmas 1652", false)]
    );
}

#[test]
fn day_lookup_returns_only_events_on_that_day() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            HistoricalEvent::new("a", RawDate::ymd(1960, 3, 21)),
            HistoricalEvent::new("b", RawDate::text("????-03-21")),
            HistoricalEvent::new("c", RawDate::ymd(1960, 3, 22)),
            HistoricalEvent::new("d", RawDate::ymd(1960, 4, 21)),
            HistoricalEvent::new("e", RawDate::text("1985-03-21T10:30:00")),
        ],
    );
    let service = TdihService::with_config(
        SqliteEventRepository::try_new(&conn).unwrap(),
        store_order(),
    );

    for month in 1..=12 {
        for day in [1, 21, 22] {
            let ranked = service.find_events(month, day, None).unwrap();
            for item in &ranked.items {
                assert_eq!((item.date.month, item.date.day), (month, day));
            }
        }
    }

    let ranked = service.find_events(3, 21, None).unwrap();
    assert_eq!(titles(&ranked.into_events()), vec!["a", "b", "e"]);
}

#[test]
fn non_exact_matches_keep_their_relative_order() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            HistoricalEvent::new("1910", RawDate::ymd(1910, 5, 31)),
            HistoricalEvent::new("undated", RawDate::month_day(5, 31)),
            HistoricalEvent::new("1961", RawDate::ymd(1961, 5, 31)),
            HistoricalEvent::new("1902", RawDate::ymd(1902, 5, 31)),
        ],
    );
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let stored = TdihService::with_config(&repo, store_order())
        .find_events(5, 31, Some(1961))
        .unwrap();
    assert_eq!(
        titles(&stored.into_events()),
        vec!["1961", "1910", "undated", "1902"]
    );

    let chronological = TdihService::new(&repo).find_events(5, 31, Some(1961)).unwrap();
    assert_eq!(
        titles(&chronological.into_events()),
        vec!["1961", "1902", "1910", "undated"]
    );
}

#[test]
fn repeated_lookups_are_identical() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            HistoricalEvent::new("x", RawDate::ymd(1900, 8, 9)),
            HistoricalEvent::new("y", RawDate::month_day(8, 9)),
            HistoricalEvent::new("z", RawDate::ymd(1956, 8, 9)),
        ],
    );
    let service = TdihService::new(SqliteEventRepository::try_new(&conn).unwrap());

    let first = service.find_events(8, 9, Some(1956)).unwrap();
    let second = service.find_events(8, 9, Some(1956)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn february_29_events_match_without_leap_year_check() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            HistoricalEvent::new("leap", RawDate::month_day(2, 29)),
            HistoricalEvent::new("text leap", RawDate::text("1900-02-29")),
        ],
    );
    let service = TdihService::new(SqliteEventRepository::try_new(&conn).unwrap());

    let ranked = service.find_events(2, 29, Some(2023)).unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(
        service.find_events(2, 30, None).unwrap_err().to_string(),
        "invalid date query: day 30 is out of range for month 2"
    );
}

#[test]
fn normal_range_returns_inclusive_matches_in_store_order() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            HistoricalEvent::new("before", RawDate::ymd(1900, 2, 28)),
            HistoricalEvent::new("start", RawDate::ymd(1901, 3, 1)),
            HistoricalEvent::new("middle", RawDate::month_day(4, 15)),
            HistoricalEvent::new("end", RawDate::ymd(1902, 5, 31)),
            HistoricalEvent::new("after", RawDate::ymd(1903, 6, 1)),
            HistoricalEvent::new("broken", RawDate::text("spring 1904")),
        ],
    );
    let service = TdihService::new(SqliteEventRepository::try_new(&conn).unwrap());

    let events = service.find_events_in_range(3, 1, 5, 31).unwrap();
    assert_eq!(titles(&events), vec!["start", "middle", "end"]);
}

#[test]
fn wrapping_ranges_cross_the_year_boundary() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            HistoricalEvent::new("dec 20", RawDate::ymd(1838, 12, 20)),
            HistoricalEvent::new("jan 5", RawDate::ymd(1879, 1, 5)),
            HistoricalEvent::new("jun 1", RawDate::ymd(1910, 6, 1)),
            HistoricalEvent::new("nov 25", RawDate::month_day(11, 25)),
            HistoricalEvent::new("mar 1", RawDate::month_day(3, 1)),
        ],
    );
    let service = TdihService::new(SqliteEventRepository::try_new(&conn).unwrap());

    let december = service.find_events_in_range(12, 15, 1, 15).unwrap();
    assert_eq!(titles(&december), vec!["dec 20", "jan 5"]);

    let summer_break = service.find_events_in_range(11, 20, 2, 10).unwrap();
    assert_eq!(titles(&summer_break), vec!["dec 20", "jan 5", "nov 25"]);
}

#[test]
fn month_granular_and_single_month_ranges() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            HistoricalEvent::new("oct", RawDate::month_day(10, 31)),
            HistoricalEvent::new("nov", RawDate::month_day(11, 1)),
            HistoricalEvent::new("feb", RawDate::month_day(2, 29)),
            HistoricalEvent::new("mar", RawDate::month_day(3, 1)),
        ],
    );
    let service = TdihService::new(SqliteEventRepository::try_new(&conn).unwrap());

    let summer = service
        .find_events_in(&DateRange::months(11, 2).unwrap())
        .unwrap();
    assert_eq!(titles(&summer), vec!["nov", "feb"]);

    let march = service.find_events_in(&DateRange::month(3).unwrap()).unwrap();
    assert_eq!(titles(&march), vec!["mar"]);
}

#[test]
fn config_controls_content_types_publish_status_and_limit() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            HistoricalEvent::new("event", RawDate::ymd(1918, 7, 18)),
            HistoricalEvent::new("mandela", RawDate::ymd(1918, 7, 18))
                .with_content_type("biography"),
            HistoricalEvent::new("draft", RawDate::ymd(1918, 7, 18)).unpublished(),
            HistoricalEvent::new("later", RawDate::ymd(2009, 7, 18)),
        ],
    );
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let default_types = TdihService::new(&repo).find_events(7, 18, None).unwrap();
    assert_eq!(titles(&default_types.into_events()), vec!["event", "later"]);

    let people = RetrievalConfig {
        content_types: vec!["biography".to_string()],
        ..RetrievalConfig::default()
    };
    let ranked = TdihService::with_config(&repo, people)
        .find_events(7, 18, Some(1918))
        .unwrap();
    assert_eq!(ranked.len(), 1);
    assert!(ranked.items[0].exact_match);

    let limited = RetrievalConfig {
        content_types: Vec::new(),
        published_only: false,
        limit: Some(2),
        order: EventOrder::Store,
    };
    let ranked = TdihService::with_config(&repo, limited)
        .find_events(7, 18, Some(2009))
        .unwrap();
    assert_eq!(titles(&ranked.into_events()), vec!["later", "event"]);
}

#[test]
fn featured_lookup_and_date_based_lookups() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            HistoricalEvent::new("plain", RawDate::ymd(1994, 4, 27)),
            HistoricalEvent::new("elections", RawDate::ymd(1994, 4, 27)).featured(),
            HistoricalEvent::new("old", RawDate::ymd(1800, 4, 27)).featured(),
        ],
    );
    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    let service = TdihService::with_config(&repo, store_order());

    let featured = service.find_featured_events(4, 27).unwrap();
    assert_eq!(titles(&featured.into_events()), vec!["elections", "old"]);
    assert!(matches!(
        service.find_featured_events(4, 31),
        Err(TdihError::InvalidQuery(InvalidQueryError::Day { month: 4, day: 31 }))
    ));

    let election_day = NaiveDate::from_ymd_opt(1994, 4, 27).unwrap();
    let ranked = service.find_events_on(election_day).unwrap();
    assert_eq!(ranked.exact_matches().count(), 2);
    assert_eq!(ranked.items[2].event.title, "old");
    assert!(!ranked.items[2].exact_match);

    let pinned = TdihService::with_config(&repo, store_order())
        .with_clock(|| NaiveDate::from_ymd_opt(1994, 4, 27).unwrap());
    assert_eq!(pinned.find_events_today().unwrap(), ranked);
}

#[test]
fn birthday_lookup_includes_people_and_promotes_birth_year() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            HistoricalEvent::new("riots", RawDate::ymd(1980, 6, 16)),
            HistoricalEvent::new("born same year", RawDate::ymd(1976, 6, 16))
                .with_content_type("biography"),
            HistoricalEvent::new("born earlier", RawDate::ymd(1902, 6, 16))
                .with_content_type("biography"),
            HistoricalEvent::new("essay", RawDate::ymd(1976, 6, 16)).with_content_type("article"),
            HistoricalEvent::new("next day", RawDate::ymd(1976, 6, 17))
                .with_content_type("biography"),
        ],
    );
    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    let service = TdihService::with_config(&repo, store_order());
    let birthday = NaiveDate::from_ymd_opt(1976, 6, 16).unwrap();

    let ranked = service.find_birthday_events(birthday).unwrap();
    let order = ranked
        .items
        .iter()
        .map(|item| (item.event.title.as_str(), item.exact_match))
        .collect::<Vec<_>>();
    assert_eq!(
        order,
        vec![
            ("born same year", true),
            ("riots", false),
            ("born earlier", false)
        ]
    );

    let events_only = service.find_events_on(birthday).unwrap();
    assert_eq!(titles(&events_only.into_events()), vec!["riots"]);
}

#[test]
fn one_unreadable_stored_date_does_not_fail_the_lookup() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[HistoricalEvent::new("christmas", RawDate::ymd(1994, 12, 25))],
    );
    conn.execute(
        "INSERT INTO historical_events (uuid, title, content_type, event_year, event_month, event_day)
         VALUES ('3a9e1f5c-7b2d-4c8e-9f0a-1b3c5d7e9f2a', 'bad month', 'event', 1994, -1, 25);",
        [],
    )
    .unwrap();
    let service = TdihService::new(SqliteEventRepository::try_new(&conn).unwrap());

    let ranked = service.find_events(12, 25, None).unwrap();
    assert_eq!(titles(&ranked.into_events()), vec!["christmas"]);
    assert!(service.find_events_in_range(1, 1, 12, 31).is_ok());
}

struct UnreachableStore;

impl EventStore for UnreachableStore {
    fn fetch_candidate_events(
        &self,
        _filter: &CandidateFilter,
    ) -> RepoResult<Vec<HistoricalEvent>> {
        Err(RepoError::Unavailable("cms timeout".to_string()))
    }
}

#[test]
fn upstream_failures_are_not_masked() {
    let service = TdihService::new(UnreachableStore);

    let err = service.find_events(1, 1, None).unwrap_err();
    assert!(matches!(err, TdihError::UpstreamUnavailable(_)));
    assert!(std::error::Error::source(&err).is_some());

    let err = service.find_events_in_range(12, 15, 1, 15).unwrap_err();
    assert!(matches!(err, TdihError::UpstreamUnavailable(_)));

    let err = service.find_events(0, 1, None).unwrap_err();
    assert!(matches!(
        err,
        TdihError::InvalidQuery(InvalidQueryError::Month(0))
    ));
}

#[test]
fn boxed_store_can_be_injected() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, &[HistoricalEvent::new("boxed", RawDate::month_day(9, 24))]);
    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    let store: Box<dyn EventStore + '_> = Box::new(repo);

    let ranked = TdihService::new(store).find_events(9, 24, None).unwrap();
    assert_eq!(ranked.len(), 1);
}
