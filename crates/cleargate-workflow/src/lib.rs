//! Cleargate workflow: node runtime for graph-based workflows.
//!
//! This crate provides the run-scoped [`VariablePool`], typed file
//! references, and the HTTP request node that turns pool values (text,
//! single files, file arrays) into outbound requests. External concerns
//! such as file storage and network egress sit behind the traits in
//! [`traits`]; [`defaults`] ships filesystem and `reqwest` implementations.
//!
//! Graph scheduling is not part of this crate. An engine builds a
//! [`NodeCtx`] per invocation, calls [`Node::run`], and routes on the
//! returned [`NodeRunResult`].

pub mod config;
pub mod defaults;
pub mod errors;
pub mod node_ctx;
pub mod nodes;
pub mod traits;
pub mod types;
pub mod variable_pool;

// Re-export public types at the crate level.

// config
pub use config::HttpRequestConfig;

// defaults
pub use defaults::{FsStorage, ReqwestTransport, StorageFileResolver};

// errors
pub use errors::{ConfigError, FileFetchError, HttpRequestError, StorageError, TransportError};

// node_ctx
#[cfg(any(test, feature = "test-support"))]
pub use node_ctx::test_support::{FnFileResolver, StubTransport, TestNodeCtx, TestNodeCtxInspector};
pub use node_ctx::NodeCtx;

// nodes
pub use nodes::HttpRequestNode;

// traits
pub use traits::{FileResolver, FileStorage, HttpTransport, Node};

// types
pub use types::{
    ErrorKind, File, FilePart, FileTransferMethod, FileType, FormFields, GraphInitParams,
    HttpMethod, InvokeFrom, NodeExecutionStatus, NodeFailure, NodeRunResult, OutboundRequest,
    RequestPayload, Segment, Selector, Timeouts, TransportResponse, UserFrom, Variable,
};

// variable_pool
pub use variable_pool::{SystemVariables, VariableLookup, VariablePool, VariablePoolError};
