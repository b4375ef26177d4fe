//! Argument and result shapes shared by the facades.  Field names on the wire are PascalCase.
//!
//! Bulk requests take a list of entities and return one result per entity, in order; each result
//! has either a value or an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Names one entity by tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Entity {
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Entities {
    pub entities: Vec<Entity>,
}

impl Entities {
    /// Bulk arguments naming a single entity.
    pub fn one<S: ToString>(tag: S) -> Self {
        Self {
            entities: vec![Entity {
                tag: tag.to_string(),
            }],
        }
    }
}

/// Where an entity is in its life cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Life {
    Alive,
    Dying,
    Dead,
}

impl fmt::Display for Life {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Life::Alive => "alive",
            Life::Dying => "dying",
            Life::Dead => "dead",
        };
        write!(f, "{}", s)
    }
}

/// An error reported by the remote side for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiError {
    pub message: String,
    #[serde(default)]
    pub code: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} ({})", self.message, self.code)
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResult {
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifeResult {
    #[serde(default)]
    pub life: Option<Life>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifeResults {
    pub results: Vec<LifeResult>,
}

/// The id of a new notify watcher, to be used as the object id of NotifyWatcher calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotifyWatchResult {
    #[serde(default)]
    pub notify_watcher_id: String,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotifyWatchResults {
    pub results: Vec<NotifyWatchResult>,
}

/// A network port, e.g. 80/tcp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Port {
    pub protocol: String,
    pub number: u16,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.number, self.protocol)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortsResult {
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortsResults {
    pub results: Vec<PortsResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StringResult {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StringResults {
    pub results: Vec<StringResult>,
}

/// A storage instance and the entity that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageInstance {
    pub storage_tag: String,
    pub owner_tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageShowResult {
    #[serde(default)]
    pub result: Option<StorageInstance>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageShowResults {
    pub results: Vec<StorageShowResult>,
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_names() {
        assert_eq!(
            serde_json::to_value(Entities::one("unit-mysql-0")).unwrap(),
            json!({"Entities": [{"Tag": "unit-mysql-0"}]})
        );

        let results: NotifyWatchResults = serde_json::from_value(json!({
            "Results": [{"NotifyWatcherId": "7"}]
        }))
        .unwrap();
        assert_eq!(results.results[0].notify_watcher_id, "7");
        assert_eq!(results.results[0].error, None);
    }

    #[test]
    fn life_and_errors() {
        let results: LifeResults = serde_json::from_value(json!({
            "Results": [
                {"Life": "dying"},
                {"Error": {"Message": "unit not found", "Code": "not found"}},
            ]
        }))
        .unwrap();
        assert_eq!(results.results[0].life, Some(Life::Dying));
        let error = results.results[1].error.as_ref().unwrap();
        assert_eq!(error.to_string(), "unit not found (not found)");
    }
}
