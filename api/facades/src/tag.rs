//! Tags name remote entities in API calls.  A tag is the entity kind, a dash, and the entity's id
//! with any '/' turned into a dash, so unit `mysql/0` has the tag `unit-mysql-0`.

use lazy_static::lazy_static;
use regex::Regex;
use snafu::{ensure, OptionExt};
use std::fmt;
use std::str::FromStr;

use crate::{error, Result};

/// Service and storage names: lowercase, dash-separated, and each segment has a letter, so a
/// trailing number can't be mistaken for part of the name.
const NAME_STR: &str = "[a-z][a-z0-9]*(?:-[a-z0-9]*[a-z][a-z0-9]*)*";

lazy_static! {
    static ref NAME: Regex = Regex::new(&format!(r"^{}$", NAME_STR)).unwrap();

    /// Unit and storage ids: a name, a slash, and a number without leading zeros.
    static ref NUMBERED_ID: Regex =
        Regex::new(&format!(r"^(?P<name>{})/(?:0|[1-9][0-9]*)$", NAME_STR)).unwrap();
}

/// Returns the part of the tag after "KIND-", or an InvalidTag error.
fn tag_body<'t>(kind: &'static str, tag: &'t str) -> Result<&'t str> {
    let prefix = format!("{}-", kind);
    if tag.starts_with(&prefix) {
        Ok(&tag[prefix.len()..])
    } else {
        error::InvalidTag { kind, tag }.fail()
    }
}

/// Turns "name-with-dashes-N" back into "name-with-dashes/N".
fn numbered_id_from_tag(kind: &'static str, tag: &str) -> Result<String> {
    let body = tag_body(kind, tag)?;
    let split = body.rfind('-').context(error::InvalidTag { kind, tag })?;
    let id = format!("{}/{}", &body[..split], &body[split + 1..]);
    ensure!(NUMBERED_ID.is_match(&id), error::InvalidTag { kind, tag });
    Ok(id)
}

fn numbered_id(kind: &'static str, id: &str) -> Result<String> {
    ensure!(NUMBERED_ID.is_match(id), error::InvalidId { kind, id });
    Ok(id.to_string())
}

/// Identifies a unit, e.g. `mysql/0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitTag {
    id: String,
}

impl UnitTag {
    const KIND: &'static str = "unit";

    pub fn new<S: AsRef<str>>(id: S) -> Result<Self> {
        Ok(Self {
            id: numbered_id(Self::KIND, id.as_ref())?,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The service a unit belongs to is named by the part of the unit id before the slash.
    pub fn service(&self) -> ServiceTag {
        let name = self.id.split('/').next().unwrap_or_default();
        ServiceTag {
            name: name.to_string(),
        }
    }
}

impl FromStr for UnitTag {
    type Err = error::Error;

    fn from_str(tag: &str) -> Result<Self> {
        Ok(Self {
            id: numbered_id_from_tag(Self::KIND, tag)?,
        })
    }
}

impl fmt::Display for UnitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", Self::KIND, self.id.replace('/', "-"))
    }
}

/// Identifies a service, e.g. `mysql`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceTag {
    name: String,
}

impl ServiceTag {
    const KIND: &'static str = "service";

    pub fn new<S: AsRef<str>>(name: S) -> Result<Self> {
        let name = name.as_ref();
        ensure!(
            NAME.is_match(name),
            error::InvalidId {
                kind: Self::KIND,
                id: name
            }
        );
        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.name
    }
}

impl FromStr for ServiceTag {
    type Err = error::Error;

    fn from_str(tag: &str) -> Result<Self> {
        let name = tag_body(Self::KIND, tag)?;
        ensure!(
            NAME.is_match(name),
            error::InvalidTag {
                kind: Self::KIND,
                tag
            }
        );
        Ok(Self {
            name: name.to_string(),
        })
    }
}

impl fmt::Display for ServiceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", Self::KIND, self.name)
    }
}

/// Identifies a storage instance, e.g. `data/0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageTag {
    id: String,
}

impl StorageTag {
    const KIND: &'static str = "storage";

    pub fn new<S: AsRef<str>>(id: S) -> Result<Self> {
        Ok(Self {
            id: numbered_id(Self::KIND, id.as_ref())?,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl FromStr for StorageTag {
    type Err = error::Error;

    fn from_str(tag: &str) -> Result<Self> {
        Ok(Self {
            id: numbered_id_from_tag(Self::KIND, tag)?,
        })
    }
}

impl fmt::Display for StorageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", Self::KIND, self.id.replace('/', "-"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unit_tags() {
        let tag = UnitTag::new("mysql/0").unwrap();
        assert_eq!(tag.to_string(), "unit-mysql-0");
        assert_eq!("unit-mysql-0".parse::<UnitTag>().unwrap(), tag);

        let tag: UnitTag = "unit-my-sql-12".parse().unwrap();
        assert_eq!(tag.id(), "my-sql/12");
        assert_eq!(tag.service().to_string(), "service-my-sql");
    }

    #[test]
    fn bad_unit_tags() {
        for tag in &[
            "mysql-0",
            "service-mysql",
            "unit-mysql",
            "unit-mysql-01",
            "unit-0",
            "unit-MySQL-0",
            "unit-",
        ] {
            assert!(tag.parse::<UnitTag>().is_err(), "parsed '{}'", tag);
        }
        assert!(UnitTag::new("mysql").is_err());
        assert!(UnitTag::new("mysql/x").is_err());
    }

    #[test]
    fn service_tags() {
        let tag = ServiceTag::new("wordpress").unwrap();
        assert_eq!(tag.to_string(), "service-wordpress");
        assert_eq!("service-wordpress".parse::<ServiceTag>().unwrap(), tag);

        assert!("service-".parse::<ServiceTag>().is_err());
        assert!("unit-mysql-0".parse::<ServiceTag>().is_err());
        assert!("service-mysql-0".parse::<ServiceTag>().is_err());
        assert!(ServiceTag::new("mysql/0").is_err());
    }

    #[test]
    fn storage_tags() {
        let tag = StorageTag::new("data/0").unwrap();
        assert_eq!(tag.to_string(), "storage-data-0");
        assert_eq!("storage-data-0".parse::<StorageTag>().unwrap(), tag);
        assert_eq!(
            "storage-shared-fs-3".parse::<StorageTag>().unwrap().id(),
            "shared-fs/3"
        );

        assert!("unit-data-0".parse::<StorageTag>().is_err());
        assert!(StorageTag::new("data").is_err());
    }
}
