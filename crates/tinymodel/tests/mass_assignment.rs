//! Fill / force fill behaviour against the fillable and guarded policies.
//!
//! Policies are process-wide per entity type, so every test that changes one
//! works on its own entity.

mod fixtures;

use chrono::NaiveDate;
use fixtures::{MockConnection, attrs, resolver};
use tinymodel::guard;
use tinymodel::prelude::*;

#[derive(Entity)]
#[tinymodel(table = "peers", fillable = [], guarded = [])]
struct OpenPeer;

#[derive(Entity)]
#[tinymodel(table = "peers", guarded = ["secret"])]
struct ColumnCheckedPeer;

#[derive(Entity)]
#[tinymodel(table = "torrents", guarded = ["created_at"])]
struct StampGuardedTorrent;

#[derive(Entity)]
#[tinymodel(table = "torrents")]
struct LockedTorrent;

#[derive(Entity)]
#[tinymodel(table = "torrents", fillable = ["name", "size"])]
struct FillableTorrent;

#[derive(Entity)]
#[tinymodel(table = "torrents", fillable = ["name"])]
struct RuntimePolicyTorrent;

#[test]
fn test_empty_policy_fills_plain_column() {
    let conn = MockConnection::new("open-policy").shared();
    let mut peer = Model::<OpenPeer>::new(resolver(&conn)).unwrap();

    peer.fill(attrs([("name", Value::from("x"))])).unwrap();

    assert_eq!(peer.get_attributes().len(), 1);
    assert_eq!(peer.get("name"), Some(&Value::from("x")));
    assert!(peer.is_fillable("name").unwrap());
    assert!(!peer.is_guarded("name").unwrap());
    // Guarded list is empty, the schema is never consulted.
    assert_eq!(conn.column_listing_calls(), 0);
}

#[test]
fn test_guarded_list_checks_real_columns_once() {
    let conn = MockConnection::new("column-check")
        .with_columns("peers", &["id", "name", "secret"])
        .shared();
    let mut peer = Model::<ColumnCheckedPeer>::new(resolver(&conn)).unwrap();

    peer.fill(attrs([
        ("name", Value::from("x")),
        ("secret", Value::from("s")),
        ("not_a_column", Value::from(1)),
    ]))
    .unwrap();

    let keys: Vec<&str> = peer.attribute_store().keys().collect();
    assert_eq!(keys, vec!["name"]);
    assert!(peer.is_guarded("not_a_column").unwrap());
    assert!(peer.is_guarded("secret").unwrap());
    assert!(!peer.is_guarded("name").unwrap());

    peer.fill(attrs([("name", Value::from("y"))])).unwrap();
    assert_eq!(conn.column_listing_calls(), 1);
}

#[test]
fn test_guarded_attribute_is_dropped_silently() {
    let conn = MockConnection::new("guarded-stamp").shared();
    let mut torrent = Model::<StampGuardedTorrent>::new(resolver(&conn)).unwrap();
    let added = NaiveDate::from_ymd_opt(2021, 5, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();

    let result = torrent.fill(attrs([("created_at", Value::from(added))]));

    assert!(result.is_ok());
    assert!(torrent.get_attributes().is_empty());
}

#[test]
fn test_totally_guarded_fill_fails() {
    let conn = MockConnection::new("locked").shared();
    let mut torrent = Model::<LockedTorrent>::new(resolver(&conn)).unwrap();
    assert!(torrent.totally_guarded());

    let err = torrent
        .fill(attrs([("name", Value::from("x"))]))
        .unwrap_err();

    match err {
        Error::MassAssignment(e) => {
            assert_eq!(e.key, "name");
            assert_eq!(e.model, "LockedTorrent");
        }
        other => panic!("expected mass assignment error, got {other:?}"),
    }
    assert!(torrent.get_attributes().is_empty());
}

#[test]
fn test_force_fill_bypasses_total_guard() {
    let conn = MockConnection::new("locked-force").shared();
    let mut torrent = Model::<LockedTorrent>::new(resolver(&conn)).unwrap();

    torrent
        .force_fill(attrs([("name", Value::from("x"))]))
        .unwrap();

    assert_eq!(torrent.get("name"), Some(&Value::from("x")));
    assert!(!guard::is_unguarded());
    assert!(torrent.fill(attrs([("size", Value::from(1))])).is_err());
}

#[test]
fn test_table_qualified_key_is_not_fillable() {
    let conn = MockConnection::new("qualified-key").shared();
    let mut peer = Model::<OpenPeer>::new(resolver(&conn)).unwrap();

    peer.fill(attrs([("peers.name", Value::from("v"))])).unwrap();

    assert!(!peer.is_fillable("peers.name").unwrap());
    assert!(peer.get("peers.name").is_none());
    assert!(peer.get_attributes().is_empty());
}

#[test]
fn test_guard_everything_blocks_unlisted_keys() {
    let conn = MockConnection::new("guard-star").shared();
    let mut torrent = Model::<FillableTorrent>::new(resolver(&conn)).unwrap();

    assert_eq!(Model::<FillableTorrent>::get_guarded(), vec!["*".to_owned()]);
    assert!(!torrent.totally_guarded());
    for key in ["name", "size", "note", "id"] {
        assert!(torrent.is_guarded(key).unwrap(), "{key} should be guarded");
    }
    assert!(!torrent.is_fillable("note").unwrap());
    assert!(!torrent.is_fillable("id").unwrap());

    torrent
        .fill(attrs([
            ("id", Value::from(7)),
            ("name", Value::from("test1")),
            ("note", Value::from("dropped")),
            ("size", Value::from(11)),
        ]))
        .unwrap();

    let keys: Vec<&str> = torrent.attribute_store().keys().collect();
    assert_eq!(keys, vec!["name", "size"]);
}

#[test]
fn test_runtime_policy_changes_apply_to_every_instance() {
    let conn = MockConnection::new("runtime-policy").shared();
    let first = Model::<RuntimePolicyTorrent>::new(resolver(&conn)).unwrap();
    assert!(!first.is_fillable("size").unwrap());

    Model::<RuntimePolicyTorrent>::merge_fillable(&["size", "name"]);
    assert_eq!(
        Model::<RuntimePolicyTorrent>::get_fillable(),
        vec!["name".to_owned(), "size".to_owned()]
    );
    assert!(first.is_fillable("size").unwrap());

    let mut second = Model::<RuntimePolicyTorrent>::new(resolver(&conn)).unwrap();
    second
        .fill(attrs([("size", Value::from(3))]))
        .unwrap();
    assert_eq!(second.get("size"), Some(&Value::from(3)));

    Model::<RuntimePolicyTorrent>::fillable(&[] as &[&str]);
    assert!(second.totally_guarded());

    Model::<RuntimePolicyTorrent>::reset_guards();
    assert_eq!(
        Model::<RuntimePolicyTorrent>::guard_policy().fillable,
        vec!["name".to_owned()]
    );
}

#[test]
fn test_unguarded_scope_restores_after_panic() {
    let result = std::panic::catch_unwind(|| {
        guard::unguarded(|| {
            assert!(guard::is_unguarded());
            panic!("boom");
        })
    });

    assert!(result.is_err());
    assert!(!guard::is_unguarded());
}

#[test]
fn test_instance_fills_through_policy() {
    let conn = MockConnection::new("instance").shared();
    let torrent = Model::<FillableTorrent>::instance(
        resolver(&conn),
        attrs([("name", Value::from("test1")), ("hash", Value::from("abc"))]),
    )
    .unwrap();

    assert!(!torrent.exists());
    assert_eq!(torrent.get("name"), Some(&Value::from("test1")));
    assert!(torrent.get("hash").is_none());
    assert!(torrent.is_dirty());
}
