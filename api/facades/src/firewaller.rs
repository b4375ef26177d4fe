//! A client of the Firewaller facade, giving a firewall worker the view of units and services it
//! needs.  Every request names exactly one entity and expects exactly one result back.

use serde::de::DeserializeOwned;
use snafu::{ensure, OptionExt, ResultExt};

use crate::caller::{facade_call, FacadeCaller};
use crate::params::{
    ApiError, Entities, Life, LifeResults, NotifyWatchResults, Port, PortsResults, StringResults,
};
use crate::tag::{ServiceTag, UnitTag};
use crate::watcher::NotifyWatcher;
use crate::{error, Result};

pub const FACADE: &str = "Firewaller";

/// Makes a bulk request for a single entity.
fn entity_call<C, R>(caller: &C, request: &str, tag: &str) -> Result<R>
where
    C: FacadeCaller + ?Sized,
    R: DeserializeOwned,
{
    facade_call(caller, FACADE, "", request, &Entities::one(tag))
}

/// Takes the only result out of a bulk result list.
fn one_result<T>(mut results: Vec<T>) -> Result<T> {
    ensure!(
        results.len() == 1,
        error::ResultCount {
            expected: 1usize,
            got: results.len()
        }
    );
    Ok(results.remove(0))
}

fn check(error: Option<ApiError>) -> Result<()> {
    match error {
        Some(e) => Err(e).context(error::Remote),
        None => Ok(()),
    }
}

fn life<C: FacadeCaller + ?Sized>(caller: &C, tag: &str) -> Result<Life> {
    let results: LifeResults = entity_call(caller, "Life", tag)?;
    let result = one_result(results.results)?;
    check(result.error)?;
    result.life.context(error::MissingResult { request: "Life" })
}

/// Entry point to the Firewaller facade.
pub struct State<'a, C: ?Sized> {
    caller: &'a C,
}

impl<'a, C> State<'a, C>
where
    C: FacadeCaller + ?Sized,
{
    pub fn new(caller: &'a C) -> Self {
        Self { caller }
    }

    /// Looks up the unit with the given tag, fetching its current life.
    pub fn unit(&self, tag: &UnitTag) -> Result<Unit<'a, C>> {
        let life = life(self.caller, &tag.to_string())?;
        Ok(Unit {
            caller: self.caller,
            tag: tag.clone(),
            life,
        })
    }
}

/// A unit as seen by the firewaller.  Its life is cached locally until `refresh`.
pub struct Unit<'a, C: ?Sized> {
    caller: &'a C,
    tag: UnitTag,
    life: Life,
}

impl<'a, C> Unit<'a, C>
where
    C: FacadeCaller + ?Sized,
{
    /// The unit's id, e.g. "mysql/0".
    pub fn name(&self) -> &str {
        self.tag.id()
    }

    pub fn tag(&self) -> &UnitTag {
        &self.tag
    }

    pub fn life(&self) -> Life {
        self.life
    }

    /// Updates the cached life.
    pub fn refresh(&mut self) -> Result<()> {
        self.life = life(self.caller, &self.tag.to_string())?;
        Ok(())
    }

    /// Starts watching the unit for changes.
    pub fn watch(&self) -> Result<NotifyWatcher<'a, C>> {
        let results: NotifyWatchResults = entity_call(self.caller, "Watch", &self.tag.to_string())?;
        let result = one_result(results.results)?;
        check(result.error)?;
        debug!(
            "Watching {} with watcher {}",
            self.tag, result.notify_watcher_id
        );
        Ok(NotifyWatcher::new(self.caller, result.notify_watcher_id))
    }

    /// Returns the unit's service, with its life freshly fetched.
    pub fn service(&self) -> Result<Service<'a, C>> {
        let mut service = Service {
            caller: self.caller,
            tag: self.tag.service(),
            life: Life::Alive,
        };
        service.refresh()?;
        Ok(service)
    }

    /// Returns the ports opened by the unit.
    pub fn opened_ports(&self) -> Result<Vec<Port>> {
        let results: PortsResults =
            entity_call(self.caller, "OpenedPorts", &self.tag.to_string())?;
        let result = one_result(results.results)?;
        check(result.error)?;
        Ok(result.ports)
    }

    /// Returns the tag of the machine the unit is assigned to.  An unassigned unit is a remote
    /// error.
    pub fn assigned_machine(&self) -> Result<String> {
        let results: StringResults =
            entity_call(self.caller, "GetAssignedMachine", &self.tag.to_string())?;
        let result = one_result(results.results)?;
        check(result.error)?;
        Ok(result.result)
    }
}

/// A service as seen by the firewaller.
pub struct Service<'a, C: ?Sized> {
    caller: &'a C,
    tag: ServiceTag,
    life: Life,
}

impl<'a, C> Service<'a, C>
where
    C: FacadeCaller + ?Sized,
{
    pub fn name(&self) -> &str {
        self.tag.id()
    }

    pub fn tag(&self) -> &ServiceTag {
        &self.tag
    }

    pub fn life(&self) -> Life {
        self.life
    }

    pub fn refresh(&mut self) -> Result<()> {
        self.life = life(self.caller, &self.tag.to_string())?;
        Ok(())
    }
}
