//! Argument and result shapes for registering, listing, setting the status of, and unregistering
//! workload processes.  These are plain data; there's no client behavior here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::params::ApiError;

/// Arguments for RegisterProcesses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterProcessesArgs {
    pub processes: Vec<RegisterProcessArg>,
}

/// One process to register, on the unit it runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterProcessArg {
    pub unit_tag: String,
    #[serde(flatten)]
    pub info: ProcessInfo,
}

/// Results of a request about one or more processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessResults {
    pub results: Vec<ProcessResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessResult {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// Arguments for ListProcesses.  An empty id list means all of the unit's processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListProcessesArgs {
    pub unit_tag: String,
    #[serde(rename = "IDs", default)]
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListProcessesResults {
    pub results: Vec<ListProcessResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListProcessResult {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub info: ProcessInfo,
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// Arguments for SetProcessesStatus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SetProcessesStatusArgs {
    pub args: Vec<SetProcessStatusArg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SetProcessStatusArg {
    pub unit_tag: String,
    #[serde(rename = "ID")]
    pub id: String,
    pub status: ProcStatus,
}

/// Arguments for UnregisterProcesses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnregisterProcessesArgs {
    pub unit_tag: String,
    #[serde(rename = "IDs")]
    pub ids: Vec<String>,
}

/// What's known about a workload process: its definition, status code, and launch details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProcessInfo {
    pub process: Process,
    pub status: i32,
    pub details: ProcDetails,
}

/// The static definition of a workload process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Process {
    pub name: String,
    pub description: String,
    #[serde(rename = "Type")]
    pub process_type: String,
    pub type_options: HashMap<String, String>,
    pub command: String,
    pub image: String,
    pub ports: Vec<ProcessPort>,
    pub volumes: Vec<ProcessVolume>,
    pub env_vars: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProcessPort {
    /// Port on the host.
    pub external: u16,
    /// Port in the process.
    pub internal: u16,
    /// Relation endpoint matching the external port, if any.
    pub endpoint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProcessVolume {
    pub external_mount: String,
    pub internal_mount: String,
    /// "ro" or "rw"
    pub mode: String,
    pub name: String,
}

/// What the plugin reported after launching the process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcDetails {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(flatten)]
    pub status: ProcStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcStatus {
    #[serde(default)]
    pub status: String,
}
