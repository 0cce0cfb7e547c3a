//! Date attributes: storage text on write, `NaiveDateTime` on read.

mod fixtures;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use fixtures::{MockConnection, resolver};
use tinymodel::prelude::*;

#[derive(Entity)]
#[tinymodel(table = "torrents", dates = ["added_on"], timestamps = false)]
struct Torrent;

#[derive(Entity)]
#[tinymodel(table = "torrents", dates = ["added_on"], date_format = "%Y-%m-%d", timestamps = false)]
struct DailyTorrent;

#[derive(Entity)]
#[tinymodel(table = "torrents", dates = ["added_on", "updated_at"])]
struct StampedTorrent;

fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

fn local_seconds(value: NaiveDateTime) -> i64 {
    Local.from_local_datetime(&value).single().unwrap().timestamp()
}

#[test]
fn test_date_round_trip_at_second_resolution() {
    let conn = MockConnection::new("round-trip").shared();
    let mut torrent = Model::<Torrent>::new(resolver(&conn)).unwrap();

    let samples = [
        dt(2021, 5, 1, 10, 0, 0),
        dt(1999, 12, 31, 23, 59, 59),
        dt(2024, 2, 29, 0, 0, 1),
        dt(2021, 5, 1, 10, 0, 0).with_nanosecond(750_000_000).unwrap(),
    ];
    for value in samples {
        torrent.set_attribute("added_on", value);
        let expected = value.with_nanosecond(0).unwrap();
        assert_eq!(
            torrent.get_attribute("added_on").unwrap(),
            Value::DateTime(expected)
        );
    }
}

#[test]
fn test_date_only_format_reads_back_midnight() {
    let conn = MockConnection::new("daily").shared();
    let mut torrent = Model::<DailyTorrent>::new(resolver(&conn)).unwrap();

    torrent.set_attribute("added_on", dt(2021, 5, 1, 10, 30, 0));

    assert_eq!(torrent.get("added_on"), Some(&Value::from("2021-05-01")));
    assert_eq!(
        torrent.get_attribute("added_on").unwrap(),
        Value::DateTime(dt(2021, 5, 1, 0, 0, 0))
    );
}

#[test]
fn test_calendar_date_is_stored_at_midnight() {
    let conn = MockConnection::new("calendar").shared();
    let mut torrent = Model::<Torrent>::new(resolver(&conn)).unwrap();

    torrent.set_attribute("added_on", NaiveDate::from_ymd_opt(2021, 5, 1).unwrap());

    assert_eq!(
        torrent.get("added_on"),
        Some(&Value::from("2021-05-01 00:00:00"))
    );
}

#[test]
fn test_datetime_value_on_plain_attribute_is_formatted() {
    let conn = MockConnection::new("plain").shared();
    let mut torrent = Model::<Torrent>::new(resolver(&conn)).unwrap();

    torrent.set_attribute("seen_at", dt(2021, 5, 1, 10, 0, 0));

    assert_eq!(
        torrent.get_attribute("seen_at").unwrap(),
        Value::from("2021-05-01 10:00:00")
    );
}

#[test]
fn test_plain_values_pass_through_date_attribute() {
    let conn = MockConnection::new("pass-through").shared();
    let mut torrent = Model::<Torrent>::new(resolver(&conn)).unwrap();

    torrent.set_attribute("added_on", "2021-05-01 10:00:00");
    assert_eq!(
        torrent.get("added_on"),
        Some(&Value::from("2021-05-01 10:00:00"))
    );

    // Unix seconds are read on the local clock.
    let secs = local_seconds(dt(2021, 5, 1, 10, 0, 0));
    torrent.set_attribute("added_on", secs);
    assert_eq!(torrent.get("added_on"), Some(&Value::BigInt(secs)));
    assert_eq!(
        torrent.get_attribute("added_on").unwrap(),
        Value::DateTime(dt(2021, 5, 1, 10, 0, 0))
    );

    torrent.set_attribute("added_on", Value::Null);
    assert_eq!(torrent.get_attribute("added_on").unwrap(), Value::Null);
}

#[test]
fn test_unparseable_date_reports_value_and_format() {
    let conn = MockConnection::new("invalid").shared();
    let mut torrent = Model::<Torrent>::new(resolver(&conn)).unwrap();
    torrent.set_attribute("added_on", "01/05/2021");

    let err = torrent.get_attribute("added_on").unwrap_err();

    match &err {
        Error::InvalidFormat(e) => {
            assert_eq!(e.value, "01/05/2021");
            assert_eq!(e.format, "%Y-%m-%d %H:%M:%S");
        }
        other => panic!("expected invalid format, got {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Could not parse the datetime '01/05/2021' using the given format '%Y-%m-%d %H:%M:%S'."
    );
}

#[test]
fn test_date_format_falls_back_to_connection() {
    let conn = MockConnection::new("dotted")
        .with_date_format("%d.%m.%Y %H:%M")
        .shared();
    let mut torrent = Model::<Torrent>::new(resolver(&conn)).unwrap();
    assert_eq!(torrent.get_date_format(), "%d.%m.%Y %H:%M");

    torrent.set_attribute("added_on", dt(2021, 5, 1, 10, 0, 0));
    assert_eq!(torrent.get("added_on"), Some(&Value::from("01.05.2021 10:00")));

    let daily = Model::<DailyTorrent>::new(resolver(&conn)).unwrap();
    assert_eq!(daily.get_date_format(), "%Y-%m-%d");

    torrent.set_date_format("%Y").unwrap();
    assert_eq!(torrent.get_date_format(), "%Y");
}

#[test]
fn test_unwritable_date_format_is_rejected() {
    let conn = MockConnection::new("bad-override").shared();
    let mut torrent = Model::<Torrent>::new(resolver(&conn)).unwrap();

    let err = torrent.set_date_format("%Y-%m-%d %Q").unwrap_err();
    assert!(matches!(err, Error::InvalidFormat(ref e) if e.format == "%Y-%m-%d %Q"));
    assert_eq!(torrent.get_date_format(), tinymodel::DEFAULT_DATE_FORMAT);

    // The previous format keeps working.
    torrent.set_attribute("added_on", dt(2021, 5, 1, 10, 0, 0));
    assert_eq!(
        torrent.get("added_on"),
        Some(&Value::from("2021-05-01 10:00:00"))
    );
}

#[test]
fn test_unwritable_connection_format_fails_construction() {
    let conn = MockConnection::new("bad-connection")
        .with_date_format("%d.%m.%Y %z")
        .shared();

    let err = Model::<Torrent>::new(resolver(&conn)).unwrap_err();
    assert!(matches!(err, Error::InvalidFormat(_)));

    // An entity format takes precedence over the connection's.
    let daily = Model::<DailyTorrent>::new(resolver(&conn)).unwrap();
    assert_eq!(daily.get_date_format(), "%Y-%m-%d");
}

#[test]
fn test_timestamp_columns_are_dates_only_with_timestamps() {
    let conn = MockConnection::new("stamps").shared();
    let mut torrent = Model::<StampedTorrent>::new(resolver(&conn)).unwrap();

    assert_eq!(
        torrent.get_dates(),
        vec![
            "added_on".to_owned(),
            "updated_at".to_owned(),
            "created_at".to_owned()
        ]
    );

    torrent.set_use_timestamps(false);
    assert_eq!(
        torrent.get_dates(),
        vec!["added_on".to_owned(), "updated_at".to_owned()]
    );
    torrent.set_attribute("created_at", "2021-05-01 10:00:00");
    assert_eq!(
        torrent.get_attribute("created_at").unwrap(),
        Value::from("2021-05-01 10:00:00")
    );
}

#[test]
fn test_fresh_timestamp_uses_storage_format() {
    let conn = MockConnection::new("fresh-stamp").shared();
    let torrent = Model::<DailyTorrent>::new(resolver(&conn)).unwrap();

    let stamp = torrent.fresh_timestamp_string();

    assert_eq!(stamp.len(), "2021-05-01".len());
    assert!(NaiveDate::parse_from_str(&stamp, "%Y-%m-%d").is_ok());
}
