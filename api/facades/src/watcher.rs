use serde_json::Value;
use snafu::ensure;

use crate::caller::{facade_call, FacadeCaller};
use crate::{error, Result};

pub const FACADE: &str = "NotifyWatcher";

/// A subscription to changes of some remote entity.  Each `next_change` call blocks until the
/// remote side reports a change; once stopped, the watcher can't be used again.
pub struct NotifyWatcher<'a, C: ?Sized> {
    caller: &'a C,
    id: String,
    stopped: bool,
}

impl<'a, C> NotifyWatcher<'a, C>
where
    C: FacadeCaller + ?Sized,
{
    /// Wraps the remote watcher with the given id, as returned by a Watch request.
    pub fn new<S: Into<String>>(caller: &'a C, id: S) -> Self {
        Self {
            caller,
            id: id.into(),
            stopped: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Waits for the next change notification.
    pub fn next_change(&mut self) -> Result<()> {
        ensure!(!self.stopped, error::WatcherStopped { id: &self.id });
        let _: Value = facade_call(self.caller, FACADE, &self.id, "Next", &())?;
        trace!("Watcher {} saw a change", self.id);
        Ok(())
    }

    /// Stops the remote watcher.  The watcher counts as stopped even if the request fails.
    pub fn stop(&mut self) -> Result<()> {
        ensure!(!self.stopped, error::WatcherStopped { id: &self.id });
        self.stopped = true;
        let _: Value = facade_call(self.caller, FACADE, &self.id, "Stop", &())?;
        debug!("Stopped watcher {}", self.id);
        Ok(())
    }
}
