//! The settings module provides Settings, an overlay over one stored settings document.
//!
//! An overlay holds two independent copies of the document's values: what was last read from or
//! written to the store ("disk"), and the working values that callers read and change ("core").
//! Writing computes the difference between the two and submits it as a single field-level update
//! guarded only by the document's existence, so changes made to other fields by other overlays
//! since this one was read are preserved.  A document removed out from under an overlay makes
//! the write fail with NotFound; the caller decides whether to re-read and retry.

use snafu::{ensure, ResultExt};
use std::collections::HashSet;

use crate::change::ItemChange;
use crate::error::{self, Result};
use crate::store::{
    DocumentStore, Fields, TxnOp, TxnOutcome, Value, ID_FIELD, QUEUE_FIELD, REVNO_FIELD,
};

/// The collection that holds all settings documents.
pub const SETTINGS_COLLECTION: &str = "settings";

/// A Settings manages changes to a settings document as a delta in memory and merges them back
/// into the store when explicitly requested.
#[derive(Debug)]
pub struct Settings<'a, S: ?Sized> {
    store: &'a S,
    key: String,
    // disk holds the values in the document as of the last read or write through this overlay,
    // or None if there hasn't been one.
    disk: Option<Fields>,
    // core holds the current values.  The difference between disk and core determines the delta
    // applied when write is called.
    core: Fields,
    txn_revno: i64,
}

impl<'a, S> Settings<'a, S>
where
    S: DocumentStore + ?Sized,
{
    fn new<K: Into<String>>(store: &'a S, key: K) -> Self {
        Self {
            store,
            key: key.into(),
            disk: None,
            core: Fields::new(),
            txn_revno: 0,
        }
    }

    /// Returns the key of the document this overlay is bound to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the document's revision as of the last read.
    pub fn txn_revno(&self) -> i64 {
        self.txn_revno
    }

    /// Returns the current keys in alphabetical order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.core.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns the value of key, if it's set.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.core.get(key)
    }

    /// Returns a copy of all keys and values.
    pub fn map(&self) -> Fields {
        self.core.clone()
    }

    /// Sets key to value.
    pub fn set<K: Into<String>>(&mut self, key: K, value: Value) {
        self.core.insert(key.into(), value);
    }

    /// Sets multiple key/value pairs.
    pub fn update<I>(&mut self, kv: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.core.extend(kv);
    }

    /// Removes key, if it's set.
    pub fn delete(&mut self, key: &str) {
        self.core.remove(key);
    }

    /// Writes changes made to the overlay back to its document.  Changes are written as a delta
    /// applied on top of the latest version of the document, to prevent overwriting unrelated
    /// changes made to it since it was last read.  Returns the applied changes, sorted by key.
    ///
    /// If nothing changed, the store isn't contacted at all.
    pub fn write(&mut self) -> Result<Vec<ItemChange>> {
        let delta = diff(&self.key, self.disk.as_ref(), &self.core)?;
        if delta.changes.is_empty() {
            trace!("No changes to settings '{}', skipping write", self.key);
            return Ok(Vec::new());
        }

        debug!(
            "Writing {} changed items of settings '{}'",
            delta.changes.len(),
            self.key
        );
        let op = TxnOp::Update {
            set: delta.updates,
            unset: delta.deletions,
        };
        let outcome = self
            .store
            .run_guarded(SETTINGS_COLLECTION, &self.key, &op)
            .context(error::WriteFailed { key: &self.key })?;
        ensure!(
            outcome == TxnOutcome::Applied,
            error::NotFound { key: &self.key }
        );

        self.disk = Some(self.core.clone());
        Ok(delta.changes)
    }

    /// (Re)reads the document into the overlay, discarding any unwritten changes.  If the
    /// document no longer exists, the overlay is emptied and NotFound is returned.
    pub fn read(&mut self) -> Result<()> {
        let fetched = self
            .store
            .fetch(SETTINGS_COLLECTION, &self.key)
            .context(error::ReadFailed { key: &self.key })?;

        let mut config = match fetched {
            Some(config) => config,
            None => {
                self.disk = None;
                self.core = Fields::new();
                return error::NotFound { key: &self.key }.fail();
            }
        };

        self.txn_revno = config
            .get(REVNO_FIELD)
            .and_then(Value::as_i64)
            .unwrap_or(0);
        clean_fields(&mut config);
        trace!("Read settings '{}': {:?}", self.key, config);

        self.core = config.clone();
        self.disk = Some(config);
        Ok(())
    }
}

/// Removes the store's bookkeeping fields from a fetched document.
fn clean_fields(fields: &mut Fields) {
    for bookkeeping in &[ID_FIELD, REVNO_FIELD, QUEUE_FIELD] {
        fields.remove(*bookkeeping);
    }
}

/////

// Diffing of the stored and working values.

/// The difference between the stored and working values of one document, in the forms needed
/// to report it and to write it.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Delta {
    /// Every changed item, sorted by key.
    pub(crate) changes: Vec<ItemChange>,
    /// Values of added and modified items.
    pub(crate) updates: Fields,
    /// Keys of deleted items, sorted.
    pub(crate) deletions: Vec<String>,
}

/// Classifies every key present in either `disk` or `core`.  Keys whose values are structurally
/// equal on both sides aren't part of the delta.
pub(crate) fn diff(key: &str, disk: Option<&Fields>, core: &Fields) -> Result<Delta> {
    let empty = Fields::new();
    let disk = disk.unwrap_or(&empty);
    let universe: HashSet<&String> = disk.keys().chain(core.keys()).collect();

    let mut delta = Delta::default();
    for item in universe {
        let change = match (disk.get(item), core.get(item)) {
            (Some(old), Some(new)) if old == new => continue,
            (Some(old), Some(new)) => {
                delta.updates.insert(item.clone(), new.clone());
                ItemChange::Modified {
                    key: item.clone(),
                    old_value: old.clone(),
                    new_value: new.clone(),
                }
            }
            (None, Some(new)) => {
                delta.updates.insert(item.clone(), new.clone());
                ItemChange::Added {
                    key: item.clone(),
                    new_value: new.clone(),
                }
            }
            (Some(old), None) => {
                delta.deletions.push(item.clone());
                ItemChange::Deleted {
                    key: item.clone(),
                    old_value: old.clone(),
                }
            }
            (None, None) => return error::InternalInconsistency { key, item }.fail(),
        };
        trace!("Settings '{}': {}", key, change);
        delta.changes.push(change);
    }

    delta.changes.sort_by(|a, b| a.key().cmp(b.key()));
    delta.deletions.sort();
    Ok(delta)
}

/////

// Lifecycle functions.

/// Returns the Settings for the document with the given key, which must exist.
pub fn read_settings<'a, S>(store: &'a S, key: &str) -> Result<Settings<'a, S>>
where
    S: DocumentStore + ?Sized,
{
    let mut settings = Settings::new(store, key);
    settings.read()?;
    Ok(settings)
}

/// Writes an initial settings document, which must not already exist, and returns its Settings.
pub fn create_settings<'a, S>(store: &'a S, key: &str, values: Fields) -> Result<Settings<'a, S>>
where
    S: DocumentStore + ?Sized,
{
    let mut settings = Settings::new(store, key);
    settings.core = values;

    let op = TxnOp::Insert(settings.core.clone());
    let outcome = store
        .run_guarded(SETTINGS_COLLECTION, key, &op)
        .context(error::WriteFailed { key })?;
    ensure!(
        outcome == TxnOutcome::Applied,
        error::AlreadyExists { key }
    );

    settings.disk = Some(settings.core.clone());
    Ok(settings)
}

/// Writes a full settings document replacing the previous values, and returns its Settings.
/// The document must already exist.
pub fn overwrite_settings<'a, S>(
    store: &'a S,
    key: &str,
    values: Fields,
) -> Result<Settings<'a, S>>
where
    S: DocumentStore + ?Sized,
{
    let mut settings = Settings::new(store, key);
    settings.core = values;

    let op = TxnOp::Replace(settings.core.clone());
    let outcome = store
        .run_guarded(SETTINGS_COLLECTION, key, &op)
        .context(error::WriteFailed { key })?;
    ensure!(outcome == TxnOutcome::Applied, error::NotFound { key });

    settings.disk = Some(settings.core.clone());
    Ok(settings)
}

/// Removes the settings document with the given key.  Returns NotFound if it was already gone.
pub fn remove_settings<S>(store: &S, key: &str) -> Result<()>
where
    S: DocumentStore + ?Sized,
{
    let outcome = store
        .run_guarded(SETTINGS_COLLECTION, key, &TxnOp::Remove)
        .context(error::WriteFailed { key })?;
    ensure!(outcome == TxnOutcome::Applied, error::NotFound { key });
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{
        create_settings, diff, overwrite_settings, read_settings, remove_settings, Delta,
        SETTINGS_COLLECTION,
    };
    use crate::error::Error;
    use crate::store::{
        self, DocumentStore, Fields, FilesystemDocumentStore, MemoryDocumentStore, TxnOp,
        TxnOutcome,
    };
    use crate::ItemChange;
    use maplit::hashmap;
    use serde_json::json;
    use snafu::ResultExt;
    use std::io;

    /// Store whose writes always fail, for checking error propagation.
    struct FailingStore {
        doc: Fields,
    }

    impl DocumentStore for FailingStore {
        fn fetch(&self, _collection: &str, _id: &str) -> store::Result<Option<Fields>> {
            Ok(Some(self.doc.clone()))
        }

        fn run_guarded(
            &self,
            _collection: &str,
            _id: &str,
            _op: &TxnOp,
        ) -> store::Result<TxnOutcome> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
                .context(store::error::Io { path: "/failing" })
        }
    }

    fn fields(value: serde_json::Value) -> Fields {
        match value {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            _ => panic!("test fields must be an object"),
        }
    }

    fn store_with(key: &str, values: serde_json::Value) -> MemoryDocumentStore {
        let m = MemoryDocumentStore::new();
        create_settings(&m, key, fields(values)).unwrap();
        m
    }

    #[test]
    fn accessors() {
        let m = store_with("key", json!({"b": 2, "a": 1}));
        let mut s = read_settings(&m, "key").unwrap();

        assert_eq!(s.key(), "key");
        assert_eq!(s.keys(), vec!["a", "b"]);
        assert_eq!(s.get("a"), Some(&json!(1)));
        assert_eq!(s.get("missing"), None);

        s.set("c", json!("three"));
        s.update(hashmap!("a".to_string() => json!(10), "d".to_string() => json!(null)));
        s.delete("b");
        s.delete("never-there");

        assert_eq!(s.keys(), vec!["a", "c", "d"]);
        assert_eq!(
            s.map(),
            fields(json!({"a": 10, "c": "three", "d": null}))
        );
    }

    #[test]
    fn map_is_a_copy() {
        let m = store_with("key", json!({"a": {"nested": 1}}));
        let s = read_settings(&m, "key").unwrap();

        let mut copy = s.map();
        copy.insert("a".to_string(), json!("changed"));
        copy.insert("b".to_string(), json!(2));

        assert_eq!(s.map(), fields(json!({"a": {"nested": 1}})));
    }

    #[test]
    fn read_missing() {
        let m = MemoryDocumentStore::new();
        match read_settings(&m, "key") {
            Err(Error::NotFound { key }) => assert_eq!(key, "key"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn read_strips_bookkeeping() {
        let m = MemoryDocumentStore::new();
        let raw = fields(json!({"a": 1, "txn-queue": ["abc_1"]}));
        m.run_guarded(SETTINGS_COLLECTION, "key", &TxnOp::Insert(raw))
            .unwrap();
        m.run_guarded(
            SETTINGS_COLLECTION,
            "key",
            &TxnOp::Update {
                set: fields(json!({"b": 2})),
                unset: vec![],
            },
        )
        .unwrap();

        let s = read_settings(&m, "key").unwrap();
        assert_eq!(s.map(), fields(json!({"a": 1, "b": 2})));
        assert_eq!(s.txn_revno(), 2);
    }

    #[test]
    fn unmodified_write_is_noop() {
        let m = store_with("key", json!({"a": 1}));
        let mut s = read_settings(&m, "key").unwrap();
        let before = m.txn_count();

        assert!(s.write().unwrap().is_empty());
        assert_eq!(m.txn_count(), before);
    }

    #[test]
    fn setting_equal_value_is_noop() {
        let m = store_with("key", json!({"a": {"x": [1, 2]}}));
        let mut s = read_settings(&m, "key").unwrap();
        let before = m.txn_count();

        s.set("a", json!({"x": [1, 2]}));
        assert!(s.write().unwrap().is_empty());
        assert_eq!(m.txn_count(), before);
    }

    #[test]
    fn write_changes() {
        let m = store_with("key", json!({"a": 1, "b": 2}));
        let mut s = read_settings(&m, "key").unwrap();

        s.set("b", json!(3));
        s.set("c", json!(4));
        s.delete("a");

        let changes = s.write().unwrap();
        assert_eq!(
            changes,
            vec![
                ItemChange::Deleted {
                    key: "a".to_string(),
                    old_value: json!(1),
                },
                ItemChange::Modified {
                    key: "b".to_string(),
                    old_value: json!(2),
                    new_value: json!(3),
                },
                ItemChange::Added {
                    key: "c".to_string(),
                    new_value: json!(4),
                },
            ]
        );
        assert_eq!(s.map(), fields(json!({"b": 3, "c": 4})));
        assert!(s.write().unwrap().is_empty());

        let reread = read_settings(&m, "key").unwrap();
        assert_eq!(reread.map(), fields(json!({"b": 3, "c": 4})));
    }

    #[test]
    fn changes_sorted_regardless_of_mutation_order() {
        let m = store_with("key", json!({}));
        let mut s = read_settings(&m, "key").unwrap();

        for key in &["zeta", "mu", "alpha", "omega", "beta"] {
            s.set(*key, json!(key.len()));
        }

        let keys: Vec<String> = s
            .write()
            .unwrap()
            .iter()
            .map(|c| c.key().to_string())
            .collect();
        assert_eq!(keys, vec!["alpha", "beta", "mu", "omega", "zeta"]);
    }

    #[test]
    fn write_after_removal_preserves_state() {
        let m = store_with("key", json!({"a": 1, "b": 2}));
        let mut s = read_settings(&m, "key").unwrap();
        s.set("b", json!(3));
        s.delete("a");

        remove_settings(&m, "key").unwrap();
        match s.write() {
            Err(Error::NotFound { key }) => assert_eq!(key, "key"),
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert_eq!(s.map(), fields(json!({"b": 3})));

        // The stored snapshot is untouched too, so once the document is back the same delta is
        // written.
        create_settings(&m, "key", fields(json!({"a": 1, "b": 2}))).unwrap();
        let changes = s.write().unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(
            read_settings(&m, "key").unwrap().map(),
            fields(json!({"b": 3}))
        );
    }

    #[test]
    fn write_failure_preserves_state() {
        let failing = FailingStore {
            doc: fields(json!({"a": 1, "txn-revno": 7})),
        };
        let mut s = read_settings(&failing, "key").unwrap();
        assert_eq!(s.txn_revno(), 7);
        s.set("a", json!(2));

        match s.write() {
            Err(Error::WriteFailed { key, .. }) => assert_eq!(key, "key"),
            other => panic!("expected WriteFailed, got {:?}", other),
        }
        assert_eq!(s.map(), fields(json!({"a": 2})));

        // Still differs from the stored values.
        assert!(s.write().is_err());
    }

    #[test]
    fn concurrent_writers_keep_each_others_fields() {
        let m = store_with("key", json!({"a": 1, "b": 1, "c": 1}));
        let mut s1 = read_settings(&m, "key").unwrap();
        let mut s2 = read_settings(&m, "key").unwrap();

        s1.set("a", json!(2));
        s2.set("b", json!(2));
        s2.delete("c");
        s1.write().unwrap();
        s2.write().unwrap();

        assert_eq!(
            read_settings(&m, "key").unwrap().map(),
            fields(json!({"a": 2, "b": 2}))
        );
    }

    #[test]
    fn reread() {
        let m = store_with("key", json!({"a": 1}));
        let mut s1 = read_settings(&m, "key").unwrap();
        let mut s2 = read_settings(&m, "key").unwrap();

        s2.set("a", json!(5));
        s2.write().unwrap();
        s1.set("unwritten", json!(true));

        s1.read().unwrap();
        assert_eq!(s1.map(), fields(json!({"a": 5})));
        assert!(s1.write().unwrap().is_empty());

        remove_settings(&m, "key").unwrap();
        assert!(s1.read().is_err());
        assert!(s1.keys().is_empty());
    }

    #[test]
    fn create() {
        let m = MemoryDocumentStore::new();
        let mut s = create_settings(&m, "key", fields(json!({"x": "y"}))).unwrap();
        assert_eq!(s.map(), fields(json!({"x": "y"})));

        // The created values count as stored.
        let before = m.txn_count();
        assert!(s.write().unwrap().is_empty());
        assert_eq!(m.txn_count(), before);

        let reread = read_settings(&m, "key").unwrap();
        assert_eq!(reread.map(), fields(json!({"x": "y"})));

        match create_settings(&m, "key", Fields::new()) {
            Err(Error::AlreadyExists { key }) => assert_eq!(key, "key"),
            other => panic!("expected AlreadyExists, got {:?}", other),
        }
        assert_eq!(
            read_settings(&m, "key").unwrap().map(),
            fields(json!({"x": "y"}))
        );
    }

    #[test]
    fn overwrite() {
        let m = MemoryDocumentStore::new();
        match overwrite_settings(&m, "key", Fields::new()) {
            Err(Error::NotFound { .. }) => (),
            other => panic!("expected NotFound, got {:?}", other),
        }

        create_settings(&m, "key", fields(json!({"a": 1, "b": 2}))).unwrap();
        let mut s = overwrite_settings(&m, "key", fields(json!({"c": 3}))).unwrap();
        assert!(s.write().unwrap().is_empty());
        assert_eq!(
            read_settings(&m, "key").unwrap().map(),
            fields(json!({"c": 3}))
        );
    }

    #[test]
    fn remove() {
        let m = store_with("key", json!({"a": 1}));
        remove_settings(&m, "key").unwrap();
        assert!(read_settings(&m, "key").is_err());
        match remove_settings(&m, "key") {
            Err(Error::NotFound { .. }) => (),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn diff_classifies_every_key() {
        let disk = fields(json!({
            "same": 1,
            "same-nested": {"a": [1, {"b": null}]},
            "changed": "x",
            "changed-type": 1,
            "gone": true,
            "was-null": null,
        }));
        let core = fields(json!({
            "same": 1,
            "same-nested": {"a": [1, {"b": null}]},
            "changed": "y",
            "changed-type": "1",
            "new": [],
            "new-null": null,
        }));

        let delta = diff("key", Some(&disk), &core).unwrap();
        let summary: Vec<(&str, Option<&serde_json::Value>, Option<&serde_json::Value>)> = delta
            .changes
            .iter()
            .map(|c| (c.key(), c.old_value(), c.new_value()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("changed", Some(&json!("x")), Some(&json!("y"))),
                ("changed-type", Some(&json!(1)), Some(&json!("1"))),
                ("gone", Some(&json!(true)), None),
                ("new", None, Some(&json!([]))),
                ("new-null", None, Some(&json!(null))),
                ("was-null", Some(&json!(null)), None),
            ]
        );
        assert_eq!(
            delta.updates,
            fields(json!({"changed": "y", "changed-type": "1", "new": [], "new-null": null}))
        );
        assert_eq!(delta.deletions, vec!["gone", "was-null"]);
    }

    #[test]
    fn diff_without_stored_values() {
        let core = fields(json!({"b": 2, "a": 1}));
        let delta = diff("key", None, &core).unwrap();
        assert_eq!(
            delta.changes,
            vec![
                ItemChange::Added {
                    key: "a".to_string(),
                    new_value: json!(1),
                },
                ItemChange::Added {
                    key: "b".to_string(),
                    new_value: json!(2),
                },
            ]
        );
        assert!(delta.deletions.is_empty());

        assert_eq!(diff("key", None, &Fields::new()).unwrap(), Delta::default());
    }

    // The same overlay behavior, through the store settingsctl uses.

    #[test]
    fn filesystem_write_changes() {
        let dir = tempfile::tempdir().unwrap();
        let f = FilesystemDocumentStore::new(dir.path());
        create_settings(&f, "s#mysql", fields(json!({"a": 1, "b": 2}))).unwrap();

        let mut s = read_settings(&f, "s#mysql").unwrap();
        s.set("b", json!(3));
        s.set("c", json!(4));
        s.delete("a");
        let keys: Vec<String> = s
            .write()
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(
            keys,
            vec![
                "setting deleted: a (was 1)",
                "setting modified: b = 3 (was 2)",
                "setting added: c = 4",
            ]
        );
        assert_eq!(s.map(), fields(json!({"b": 3, "c": 4})));
        assert!(s.write().unwrap().is_empty());

        // A fresh store over the same directory sees the written values.
        let f2 = FilesystemDocumentStore::new(dir.path());
        let reread = read_settings(&f2, "s#mysql").unwrap();
        assert_eq!(reread.map(), fields(json!({"b": 3, "c": 4})));
        assert_eq!(reread.txn_revno(), 2);
    }

    #[test]
    fn filesystem_create_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let f = FilesystemDocumentStore::new(dir.path());
        create_settings(&f, "key", fields(json!({"x": "y"}))).unwrap();
        assert_eq!(
            read_settings(&f, "key").unwrap().map(),
            fields(json!({"x": "y"}))
        );
        match create_settings(&f, "key", Fields::new()) {
            Err(Error::AlreadyExists { key }) => assert_eq!(key, "key"),
            other => panic!("expected AlreadyExists, got {:?}", other),
        }

        remove_settings(&f, "key").unwrap();
        match remove_settings(&f, "key") {
            Err(Error::NotFound { .. }) => (),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn filesystem_write_after_removal_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let f = FilesystemDocumentStore::new(dir.path());
        create_settings(&f, "key", fields(json!({"a": 1, "b": 2}))).unwrap();
        let mut s = read_settings(&f, "key").unwrap();
        s.set("b", json!(3));

        remove_settings(&FilesystemDocumentStore::new(dir.path()), "key").unwrap();
        match s.write() {
            Err(Error::NotFound { key }) => assert_eq!(key, "key"),
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert_eq!(s.map(), fields(json!({"a": 1, "b": 3})));
        assert!(read_settings(&f, "key").is_err());
    }

    #[test]
    fn filesystem_concurrent_writers_keep_each_others_fields() {
        let dir = tempfile::tempdir().unwrap();
        let f1 = FilesystemDocumentStore::new(dir.path());
        let f2 = FilesystemDocumentStore::new(dir.path());
        create_settings(&f1, "key", fields(json!({"a": 1, "b": 1, "c": 1}))).unwrap();

        let mut s1 = read_settings(&f1, "key").unwrap();
        let mut s2 = read_settings(&f2, "key").unwrap();
        s1.set("a", json!(2));
        s2.set("b", json!(2));
        s2.delete("c");
        s1.write().unwrap();
        s2.write().unwrap();

        assert_eq!(
            read_settings(&f1, "key").unwrap().map(),
            fields(json!({"a": 2, "b": 2}))
        );
    }

    #[test]
    fn filesystem_threaded_writers_keep_each_others_fields() {
        let dir = tempfile::tempdir().unwrap();
        create_settings(
            &FilesystemDocumentStore::new(dir.path()),
            "key",
            Fields::new(),
        )
        .unwrap();

        let writers: Vec<_> = (0..2)
            .map(|t| {
                let base = dir.path().to_path_buf();
                std::thread::spawn(move || {
                    let f = FilesystemDocumentStore::new(base);
                    for i in 0..50 {
                        let mut s = read_settings(&f, "key").unwrap();
                        s.set(format!("t{}-{}", t, i), json!(i));
                        assert_eq!(s.write().unwrap().len(), 1);
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let store = FilesystemDocumentStore::new(dir.path());
        let s = read_settings(&store, "key").unwrap();
        assert_eq!(s.keys().len(), 100);
    }
}
