//! Collaborator trait interfaces.
//!
//! Every external dependency of a node is an async trait held as
//! `Arc<dyn Trait>` in the [`NodeCtx`]. Production wiring and tests swap
//! implementations without touching node code. Adding a method to any trait
//! requires a default implementation.

use async_trait::async_trait;
use bytes::Bytes;

use super::errors::{FileFetchError, StorageError, TransportError};
use super::node_ctx::NodeCtx;
use super::types::{File, NodeRunResult, OutboundRequest, TransportResponse};

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Every executable node type implements this trait.
///
/// `run` is infallible at the type level: failures are reported through
/// the returned [`NodeRunResult`], so the graph engine only ever observes
/// structured outcomes.
#[async_trait]
pub trait Node: Send + Sync {
    /// Stable type tag, e.g. `"http-request"`.
    fn node_type(&self) -> &'static str;

    /// The node's id within its graph.
    fn id(&self) -> &str;

    /// Human-readable title from the node configuration.
    fn title(&self) -> &str {
        self.id()
    }

    /// Execute once against the run's variable pool and collaborators.
    async fn run(&self, ctx: &NodeCtx) -> NodeRunResult;
}

// ---------------------------------------------------------------------------
// FileResolver
// ---------------------------------------------------------------------------

/// Turns a [`File`] reference into its bytes.
///
/// Implementations may hit storage or the network. Each call is
/// independent; implementations must not share mutable state between
/// concurrently running nodes.
#[async_trait]
pub trait FileResolver: Send + Sync {
    async fn fetch(&self, file: &File) -> Result<Bytes, FileFetchError>;
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// Tenant object storage addressed by storage key.
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn load(&self, key: &str) -> Result<Bytes, StorageError>;

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self.load(key).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

/// Egress for outbound HTTP requests.
///
/// The production implementation is expected to guard against requests to
/// internal network ranges. Any HTTP response, whatever its status, is
/// `Ok`; `Err` is reserved for failures that produced no response.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError>;
}
