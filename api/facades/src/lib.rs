/*!
# Introduction

This library has thin clients for remote API facades used by the workers and commands that sit
around the settings store.

A facade is a named group of remote requests.  Each request carries JSON parameters and returns a
JSON result; how the call is transported is up to the `FacadeCaller` implementation you provide.

* `tag` has the typed tags (`unit-mysql-0`, `service-mysql`, `storage-data-0`) entities are
  addressed by.
* `params` has the shared argument and result shapes.
* `firewaller` is a unit-facing client exposing life, refresh, watch, opened ports, and assigned
  machine.
* `watcher` is the notification watcher returned by `Watch` requests.
* `process` has the argument and result shapes for workload process registration.
* `storage` implements the "show" command for storage instances.

Each request is a single synchronous round trip; there's no retry, and a per-entity error in a
result is returned as `Error::Remote`.
*/

#[macro_use]
extern crate log;

pub mod caller;
pub mod error;
pub mod firewaller;
pub mod params;
pub mod process;
pub mod storage;
pub mod tag;
pub mod watcher;

pub use caller::{facade_call, CallError, FacadeCaller};
pub use error::{Error, Result};
pub use tag::{ServiceTag, StorageTag, UnitTag};
