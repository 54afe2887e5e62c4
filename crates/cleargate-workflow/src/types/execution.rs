//! Run lineage and the structured outcome of a node invocation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Lineage
// ---------------------------------------------------------------------------

/// Who started the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum UserFrom {
    Account,
    EndUser,
}

/// Which surface invoked the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum InvokeFrom {
    ServiceApi,
    WebApp,
    Explore,
    Debugger,
}

/// Immutable parameters of the workflow run a node executes in.
///
/// Carried for lineage and logging only; nothing here shapes the request a
/// node sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GraphInitParams {
    pub tenant_id: String,
    pub app_id: String,
    pub workflow_id: String,
    pub user_id: String,
    pub user_from: UserFrom,
    pub invoke_from: InvokeFrom,
    #[serde(default)]
    pub call_depth: u32,
}

impl Default for GraphInitParams {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            app_id: String::new(),
            workflow_id: String::new(),
            user_id: String::new(),
            user_from: UserFrom::Account,
            invoke_from: InvokeFrom::ServiceApi,
            call_depth: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Execution result
// ---------------------------------------------------------------------------

/// Terminal status of a node invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum NodeExecutionStatus {
    Succeeded,
    Failed,
}

/// Machine-readable failure category, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    ReferenceResolution,
    TypeMismatch,
    FileFetch,
    Transport,
    InvalidRequest,
    ResponseTooLarge,
    HttpStatus,
}

/// Failure detail attached to a failed [`NodeRunResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NodeFailure {
    pub kind: ErrorKind,
    pub message: String,
}

/// What a node hands back to the graph engine.
///
/// Built once per invocation. The engine writes `outputs` into the variable
/// pool and routes on `status`; nodes never raise past this boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NodeRunResult {
    pub status: NodeExecutionStatus,
    #[serde(default)]
    pub inputs: BTreeMap<String, Value>,
    #[serde(default)]
    pub process_data: BTreeMap<String, Value>,
    #[serde(default)]
    pub outputs: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<NodeFailure>,
}

impl NodeRunResult {
    pub fn succeeded(
        inputs: BTreeMap<String, Value>,
        process_data: BTreeMap<String, Value>,
        outputs: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            status: NodeExecutionStatus::Succeeded,
            inputs,
            process_data,
            outputs,
            error: None,
        }
    }

    pub fn failed(
        kind: ErrorKind,
        message: impl Into<String>,
        inputs: BTreeMap<String, Value>,
        process_data: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            status: NodeExecutionStatus::Failed,
            inputs,
            process_data,
            outputs: BTreeMap::new(),
            error: Some(NodeFailure {
                kind,
                message: message.into(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == NodeExecutionStatus::Succeeded
    }
}
