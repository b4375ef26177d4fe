/*!
# Background

This library manages settings documents: schema-less key/value configuration stored for some
owning entity, one document per owner, in a document store shared by many independent callers.

# Design

## Overlay

A `Settings` is an in-memory overlay over one document.
It's created by reading an existing document, creating a new one, or overwriting one, and holds two
independent copies of the document's values: the values last synchronized with the store, and the
working values that `get`, `set`, `update`, and `delete` act on.

Calling `write` compares the two, produces a sorted list of `ItemChange`s (added, modified,
deleted), and writes only the changed fields back, as a single update guarded by the document's
existence.
Unchanged overlays never contact the store.

## Concurrency

The overlay itself isn't shared between threads; concurrency comes from several overlays, possibly
in different processes, over the same document.
Field-level updates mean concurrent writers of different fields don't clobber each other, and
concurrent writers of the same field are last-writer-wins.
A document removed out from under an overlay makes its write fail with `Error::NotFound`.
There's no locking and no internal retry; callers re-read and retry if they want to.

## Store

The `store` module has the `DocumentStore` trait the overlay writes through, with an in-memory
implementation (also used as the test fake) and a filesystem implementation.

# Example usage

```
use serde_json::json;
use settings_store::store::MemoryDocumentStore;
use settings_store::{create_settings, read_settings};

let store = MemoryDocumentStore::new();
let mut initial = std::collections::HashMap::new();
initial.insert("a".to_string(), json!(1));
create_settings(&store, "s#mysql", initial).unwrap();

let mut settings = read_settings(&store, "s#mysql").unwrap();
settings.set("b", json!(2));
for change in settings.write().unwrap() {
    println!("{}", change);
}
```
*/

#[macro_use]
extern crate log;

pub mod change;
pub mod error;
pub mod settings;
pub mod store;

pub use change::ItemChange;
pub use error::{Error, Result};
pub use settings::{
    create_settings, overwrite_settings, read_settings, remove_settings, Settings,
    SETTINGS_COLLECTION,
};
pub use store::{DocumentStore, Fields, Value};
