//! In-memory document store, for use in testing overlays and other modules.
//!
//! Mimics the decisions made for FilesystemDocumentStore, e.g. bookkeeping fields being stamped
//! on every write, and also counts the guarded operations it's asked to run so tests can check
//! whether the persistence layer was contacted at all.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{effect_of, error, DocumentStore, Effect, Fields, Result, TxnOp, TxnOutcome};

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    // Map of collection name to the documents in it, by id.  The guard check and the effect of
    // an operation happen under one lock, which is what makes operations atomic.
    collections: Mutex<HashMap<String, HashMap<String, Fields>>>,
    // Number of guarded operations submitted, whether or not they applied.
    txn_count: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of guarded operations this store has been asked to run.
    pub fn txn_count(&self) -> usize {
        self.txn_count.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, HashMap<String, Fields>>>> {
        self.collections.lock().map_err(|_| error::Error::Poisoned {})
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn fetch(&self, collection: &str, id: &str) -> Result<Option<Fields>> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    fn run_guarded(&self, collection: &str, id: &str, op: &TxnOp) -> Result<TxnOutcome> {
        self.txn_count.fetch_add(1, Ordering::SeqCst);
        let mut collections = self.lock()?;
        let docs = collections
            .entry(collection.to_string())
            .or_insert_with(HashMap::new);

        match effect_of(id, docs.get(id), op) {
            Effect::Aborted => {
                trace!("Aborted {} of '{}' in '{}'", op.name(), id, collection);
                Ok(TxnOutcome::Aborted)
            }
            Effect::Put(doc) => {
                docs.insert(id.to_string(), doc);
                Ok(TxnOutcome::Applied)
            }
            Effect::Delete => {
                docs.remove(id);
                Ok(TxnOutcome::Applied)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::{DocumentStore, Fields, TxnOp, TxnOutcome};
    use super::MemoryDocumentStore;
    use maplit::hashmap;
    use serde_json::json;

    #[test]
    fn insert_fetch() {
        let m = MemoryDocumentStore::new();
        let fields = hashmap!("a".to_string() => json!("b"));
        assert_eq!(
            m.run_guarded("c", "doc", &TxnOp::Insert(fields)).unwrap(),
            TxnOutcome::Applied
        );

        let doc = m.fetch("c", "doc").unwrap().unwrap();
        assert_eq!(doc.get("a"), Some(&json!("b")));
        assert_eq!(doc.get("_id"), Some(&json!("doc")));
        assert_eq!(doc.get("txn-revno"), Some(&json!(1)));
    }

    #[test]
    fn collections_are_separate() {
        let m = MemoryDocumentStore::new();
        m.run_guarded("c1", "doc", &TxnOp::Insert(Fields::new()))
            .unwrap();
        assert!(m.fetch("c1", "doc").unwrap().is_some());
        assert!(m.fetch("c2", "doc").unwrap().is_none());
    }

    #[test]
    fn guards() {
        let m = MemoryDocumentStore::new();
        assert_eq!(
            m.run_guarded("c", "doc", &TxnOp::Remove).unwrap(),
            TxnOutcome::Aborted
        );
        m.run_guarded("c", "doc", &TxnOp::Insert(Fields::new()))
            .unwrap();
        assert_eq!(
            m.run_guarded("c", "doc", &TxnOp::Insert(Fields::new()))
                .unwrap(),
            TxnOutcome::Aborted
        );
        assert_eq!(
            m.run_guarded("c", "doc", &TxnOp::Remove).unwrap(),
            TxnOutcome::Applied
        );
        assert!(m.fetch("c", "doc").unwrap().is_none());
    }

    #[test]
    fn counts_transactions() {
        let m = MemoryDocumentStore::new();
        assert_eq!(m.txn_count(), 0);
        m.fetch("c", "doc").unwrap();
        assert_eq!(m.txn_count(), 0);
        m.run_guarded("c", "doc", &TxnOp::Remove).unwrap();
        m.run_guarded("c", "doc", &TxnOp::Insert(Fields::new()))
            .unwrap();
        assert_eq!(m.txn_count(), 2);
    }
}
