//! Runtime context given to every node invocation.
//!
//! Nodes reach the run's variable pool and every external collaborator
//! exclusively through [`NodeCtx`]. The engine builds one per invocation;
//! node code never constructs one directly.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::traits::{FileResolver, HttpTransport};
use super::types::GraphInitParams;
use super::variable_pool::VariablePool;

// ---------------------------------------------------------------------------
// NodeCtx
// ---------------------------------------------------------------------------

/// The runtime context given to every node invocation.
pub struct NodeCtx {
    run_id: String,
    node_instance_id: String,
    graph_params: Arc<GraphInitParams>,
    variable_pool: Arc<VariablePool>,
    file_resolver: Arc<dyn FileResolver>,
    transport: Arc<dyn HttpTransport>,
    started_at: DateTime<Utc>,
}

impl NodeCtx {
    /// Construct a `NodeCtx` for a node execution.
    pub fn new(
        run_id: String,
        node_instance_id: String,
        graph_params: Arc<GraphInitParams>,
        variable_pool: Arc<VariablePool>,
        file_resolver: Arc<dyn FileResolver>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            run_id,
            node_instance_id,
            graph_params,
            variable_pool,
            file_resolver,
            transport,
            started_at: Utc::now(),
        }
    }

    /// The run this node execution belongs to.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// The specific node instance being executed.
    pub fn node_instance_id(&self) -> &str {
        &self.node_instance_id
    }

    /// Lineage of the run: tenant, app, workflow, caller.
    pub fn graph_params(&self) -> &GraphInitParams {
        &self.graph_params
    }

    /// The run's shared variable pool. Nodes read from it; the engine writes
    /// node outputs back after the node returns.
    pub fn variable_pool(&self) -> &VariablePool {
        &self.variable_pool
    }

    /// Resolver for file bytes.
    pub fn file_resolver(&self) -> &dyn FileResolver {
        self.file_resolver.as_ref()
    }

    /// Egress-guarded HTTP transport.
    pub fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    /// When this invocation's context was created.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    //! Builder and inspector for exercising nodes without real storage or
    //! network. Collaborators are closures, so each test states exactly what
    //! a file fetch or an HTTP call returns.

    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::RwLock;

    use super::NodeCtx;
    use crate::errors::{FileFetchError, TransportError};
    use crate::traits::{FileResolver, HttpTransport};
    use crate::types::{File, GraphInitParams, OutboundRequest, TransportResponse, Variable};
    use crate::variable_pool::{SystemVariables, VariablePool};

    type FetchFn = dyn Fn(&File) -> Result<Bytes, FileFetchError> + Send + Sync;
    type SendFn = dyn Fn(&OutboundRequest) -> Result<TransportResponse, TransportError> + Send + Sync;

    // -- Closure-backed FileResolver ----------------------------------------

    /// File resolver that answers every fetch with a closure.
    pub struct FnFileResolver {
        fetch: Box<FetchFn>,
        calls: AtomicUsize,
    }

    impl FnFileResolver {
        pub fn new(
            fetch: impl Fn(&File) -> Result<Bytes, FileFetchError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                fetch: Box::new(fetch),
                calls: AtomicUsize::new(0),
            }
        }

        /// Resolver that returns the same bytes for every file.
        pub fn constant(bytes: &'static [u8]) -> Self {
            Self::new(move |_| Ok(Bytes::from_static(bytes)))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FileResolver for FnFileResolver {
        async fn fetch(&self, file: &File) -> Result<Bytes, FileFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.fetch)(file)
        }
    }

    // -- Recording HttpTransport --------------------------------------------

    /// Transport that records every request and answers with a closure.
    pub struct StubTransport {
        respond: Box<SendFn>,
        sent: RwLock<Vec<OutboundRequest>>,
    }

    impl StubTransport {
        pub fn new(
            respond: impl Fn(&OutboundRequest) -> Result<TransportResponse, TransportError>
                + Send
                + Sync
                + 'static,
        ) -> Self {
            Self {
                respond: Box::new(respond),
                sent: RwLock::new(Vec::new()),
            }
        }

        /// Transport answering 200 with the request's raw content echoed
        /// back (empty for form payloads).
        pub fn echo() -> Self {
            Self::new(|req| {
                let body = req.payload.content().cloned().unwrap_or_default();
                Ok(TransportResponse::new(200, body))
            })
        }

        pub fn sent(&self) -> Vec<OutboundRequest> {
            self.sent.read().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for StubTransport {
        async fn send(
            &self,
            request: OutboundRequest,
        ) -> Result<TransportResponse, TransportError> {
            let response = (self.respond)(&request);
            self.sent.write().push(request);
            response
        }
    }

    // -- TestNodeCtx builder ------------------------------------------------

    /// Builder for constructing a [`NodeCtx`] in tests.
    pub struct TestNodeCtx {
        run_id: String,
        node_id: String,
        graph_params: GraphInitParams,
        pool: Arc<VariablePool>,
        resolver: Option<Arc<FnFileResolver>>,
        transport: Option<Arc<StubTransport>>,
    }

    impl TestNodeCtx {
        /// Start building a test `NodeCtx` with an empty pool, a resolver that
        /// fails every fetch, and an echoing transport.
        pub fn builder() -> Self {
            Self {
                run_id: "test-run".to_string(),
                node_id: "test-node".to_string(),
                graph_params: GraphInitParams::default(),
                pool: Arc::new(VariablePool::new(SystemVariables::empty(), BTreeMap::new())),
                resolver: None,
                transport: None,
            }
        }

        /// Set the run ID.
        pub fn run_id(mut self, run_id: &str) -> Self {
            self.run_id = run_id.to_string();
            self
        }

        /// Set the node instance ID.
        pub fn node_id(mut self, node_id: &str) -> Self {
            self.node_id = node_id.to_string();
            self
        }

        pub fn graph_params(mut self, params: GraphInitParams) -> Self {
            self.graph_params = params;
            self
        }

        /// Use an existing pool instead of a fresh one.
        pub fn pool(mut self, pool: Arc<VariablePool>) -> Self {
            self.pool = pool;
            self
        }

        /// Bind a variable in the pool (can be called multiple times).
        ///
        /// # Panics
        /// If `selector` has fewer than two elements.
        pub fn variable(self, selector: &[&str], variable: Variable) -> Self {
            if let Err(e) = self.pool.add(selector, variable) {
                panic!("invalid test selector {selector:?}: {e}");
            }
            self
        }

        /// Answer file fetches with `fetch`.
        pub fn resolve_with(
            mut self,
            fetch: impl Fn(&File) -> Result<Bytes, FileFetchError> + Send + Sync + 'static,
        ) -> Self {
            self.resolver = Some(Arc::new(FnFileResolver::new(fetch)));
            self
        }

        /// Answer every file fetch with `bytes`.
        pub fn file_bytes(mut self, bytes: &'static [u8]) -> Self {
            self.resolver = Some(Arc::new(FnFileResolver::constant(bytes)));
            self
        }

        /// Answer HTTP sends with `respond`.
        pub fn respond_with(
            mut self,
            respond: impl Fn(&OutboundRequest) -> Result<TransportResponse, TransportError>
                + Send
                + Sync
                + 'static,
        ) -> Self {
            self.transport = Some(Arc::new(StubTransport::new(respond)));
            self
        }

        /// Build the `NodeCtx` and an inspector for verifying side effects.
        pub fn build(self) -> (NodeCtx, TestNodeCtxInspector) {
            let resolver = self.resolver.unwrap_or_else(|| {
                Arc::new(FnFileResolver::new(|_| {
                    Err(FileFetchError::Download {
                        message: "no file resolver configured".into(),
                    })
                }))
            });
            let transport = self
                .transport
                .unwrap_or_else(|| Arc::new(StubTransport::echo()));

            let ctx = NodeCtx::new(
                self.run_id,
                self.node_id,
                Arc::new(self.graph_params),
                Arc::clone(&self.pool),
                Arc::clone(&resolver) as Arc<dyn FileResolver>,
                Arc::clone(&transport) as Arc<dyn HttpTransport>,
            );

            let inspector = TestNodeCtxInspector {
                resolver,
                transport,
                pool: self.pool,
            };
            (ctx, inspector)
        }
    }

    /// Inspect side effects produced by a node under test.
    pub struct TestNodeCtxInspector {
        resolver: Arc<FnFileResolver>,
        transport: Arc<StubTransport>,
        pool: Arc<VariablePool>,
    }

    impl TestNodeCtxInspector {
        /// Every request handed to the transport, in send order.
        pub fn sent_requests(&self) -> Vec<OutboundRequest> {
            self.transport.sent()
        }

        /// How many times the file resolver was invoked.
        pub fn fetch_count(&self) -> usize {
            self.resolver.calls()
        }

        pub fn pool(&self) -> &VariablePool {
            &self.pool
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use test_support::{FnFileResolver, StubTransport, TestNodeCtx, TestNodeCtxInspector};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
