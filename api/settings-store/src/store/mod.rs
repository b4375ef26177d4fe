//! The store module contains the DocumentStore trait, which describes the persistence layer that
//! settings are written through: named collections of documents, each a JSON object identified
//! by a string id, with single-document operations that are applied atomically together with an
//! existence guard.
//!
//! There's also a common error type and the logic that implementations of DocumentStore share
//! for deciding what a guarded operation does to a document, including the bookkeeping fields
//! every stored document carries.

pub mod error;
pub mod filesystem;
pub mod memory;

pub use error::{Error, Result};
pub use filesystem::FilesystemDocumentStore;
pub use memory::MemoryDocumentStore;

use std::collections::HashMap;

/// Serde generic "Value" type representing one schema-less field value.
pub type Value = serde_json::Value;

/// The fields of one document, by name.
pub type Fields = HashMap<String, Value>;

/// Bookkeeping field holding the document's id.
pub const ID_FIELD: &str = "_id";
/// Bookkeeping field holding the document's revision counter.
pub const REVNO_FIELD: &str = "txn-revno";
/// Bookkeeping field some writers use for queued transaction markers.  We never write it, but
/// readers must not mistake it for data.
pub const QUEUE_FIELD: &str = "txn-queue";

/// The precondition checked atomically as part of an operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Assert {
    DocExists,
    DocMissing,
}

/// A single-document operation.  Each variant implies its guard; see `TxnOp::assertion`.
#[derive(Debug, Clone, PartialEq)]
pub enum TxnOp {
    /// Create the document with the given fields, if it doesn't exist.
    Insert(Fields),
    /// Merge `set` into the existing document and remove the `unset` fields from it; fields not
    /// named in either are left untouched.
    Update { set: Fields, unset: Vec<String> },
    /// Replace all fields of the existing document.
    Replace(Fields),
    /// Delete the existing document.
    Remove,
}

impl TxnOp {
    pub fn assertion(&self) -> Assert {
        match self {
            TxnOp::Insert(_) => Assert::DocMissing,
            TxnOp::Update { .. } | TxnOp::Replace(_) | TxnOp::Remove => Assert::DocExists,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TxnOp::Insert(_) => "insert",
            TxnOp::Update { .. } => "update",
            TxnOp::Replace(_) => "replace",
            TxnOp::Remove => "remove",
        }
    }
}

/// Whether a guarded operation took effect.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TxnOutcome {
    Applied,
    /// The operation's assertion didn't hold, so nothing was changed.
    Aborted,
}

pub trait DocumentStore {
    /// Retrieve a document, including its bookkeeping fields.  Returns Ok(None) if the document
    /// doesn't exist.
    fn fetch(&self, collection: &str, id: &str) -> Result<Option<Fields>>;

    /// Apply an operation to one document if, and only if, its assertion holds at the time it's
    /// applied.
    fn run_guarded(&self, collection: &str, id: &str, op: &TxnOp) -> Result<TxnOutcome>;
}

/////

// This section holds the operation semantics shared by the implementations.

/// What applying an operation should do to the stored document.
#[derive(Debug, PartialEq)]
pub(crate) enum Effect {
    Aborted,
    Put(Fields),
    Delete,
}

/// Decides the effect of `op` on a document whose current stored state is `current` (None if
/// it doesn't exist).  Documents that are written get fresh bookkeeping fields.
pub(crate) fn effect_of(id: &str, current: Option<&Fields>, op: &TxnOp) -> Effect {
    match (op, current) {
        (TxnOp::Insert(fields), None) => Effect::Put(stamped(id, fields.clone(), 1)),
        (TxnOp::Insert(_), Some(_)) | (_, None) => Effect::Aborted,
        (TxnOp::Update { set, unset }, Some(doc)) => {
            // Read the revision before any unset can remove it.
            let revno = revno(doc) + 1;
            let mut updated = doc.clone();
            for field in unset {
                updated.remove(field);
            }
            updated.extend(set.iter().map(|(k, v)| (k.clone(), v.clone())));
            Effect::Put(stamped(id, updated, revno))
        }
        (TxnOp::Replace(fields), Some(doc)) => {
            Effect::Put(stamped(id, fields.clone(), revno(doc) + 1))
        }
        (TxnOp::Remove, Some(_)) => Effect::Delete,
    }
}

/// Returns the revision counter of a stored document, or 0 if it has none.
pub(crate) fn revno(doc: &Fields) -> i64 {
    doc.get(REVNO_FIELD).and_then(Value::as_i64).unwrap_or(0)
}

fn stamped(id: &str, mut fields: Fields, revno: i64) -> Fields {
    fields.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    fields.insert(REVNO_FIELD.to_string(), Value::from(revno));
    fields
}
