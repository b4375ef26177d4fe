//! The "show" command for storage instances: turns the storage ids a user gives into tags, asks
//! the Storage facade about them, and reshapes the answer for display.

use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, ResultExt};

use crate::caller::{facade_call, FacadeCaller};
use crate::params::{Entities, Entity, StorageInstance, StorageShowResults};
use crate::tag::StorageTag;
use crate::{error, Result};

pub const FACADE: &str = "Storage";

pub const SHOW_COMMAND_DOC: &str = "
Show extended information about storage instances.
Storage instances to display are specified by storage ids.

* note use of positional arguments

[space separated storage ids]
";

/// How a storage instance is shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageInfo {
    pub storage_tag: String,
    pub owner_tag: String,
}

impl From<StorageInstance> for StorageInfo {
    fn from(instance: StorageInstance) -> Self {
        Self {
            storage_tag: instance.storage_tag,
            owner_tag: instance.owner_tag,
        }
    }
}

/// The remote calls the show command needs.
pub trait StorageShowApi {
    fn show(&self, tags: &[StorageTag]) -> Result<Vec<StorageInstance>>;
}

/// Shows storage instances given by id.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowCommand {
    ids: Vec<String>,
}

impl ShowCommand {
    /// Takes the positional arguments; at least one storage id is required.
    pub fn init<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = args.into_iter().map(Into::into).collect();
        ensure!(!ids.is_empty(), error::NoStorageIds);
        Ok(Self { ids })
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn storage_tags(&self) -> Result<Vec<StorageTag>> {
        self.ids.iter().map(StorageTag::new).collect()
    }

    /// Makes one show request for all the ids, and returns one StorageInfo per instance.
    pub fn run<A: StorageShowApi + ?Sized>(&self, api: &A) -> Result<Vec<StorageInfo>> {
        let tags = self.storage_tags()?;
        let instances = api.show(&tags)?;
        Ok(instances.into_iter().map(StorageInfo::from).collect())
    }
}

/// StorageShowApi over the Storage facade.
pub struct StorageClient<'a, C: ?Sized> {
    caller: &'a C,
}

impl<'a, C> StorageClient<'a, C>
where
    C: FacadeCaller + ?Sized,
{
    pub fn new(caller: &'a C) -> Self {
        Self { caller }
    }
}

impl<'a, C> StorageShowApi for StorageClient<'a, C>
where
    C: FacadeCaller + ?Sized,
{
    fn show(&self, tags: &[StorageTag]) -> Result<Vec<StorageInstance>> {
        let args = Entities {
            entities: tags
                .iter()
                .map(|tag| Entity {
                    tag: tag.to_string(),
                })
                .collect(),
        };
        let results: StorageShowResults = facade_call(self.caller, FACADE, "", "Show", &args)?;
        ensure!(
            results.results.len() == tags.len(),
            error::ResultCount {
                expected: tags.len(),
                got: results.results.len()
            }
        );

        let mut instances = Vec::with_capacity(results.results.len());
        for result in results.results {
            if let Some(e) = result.error {
                return Err(e).context(error::Remote);
            }
            instances.push(
                result
                    .result
                    .context(error::MissingResult { request: "Show" })?,
            );
        }
        Ok(instances)
    }
}
