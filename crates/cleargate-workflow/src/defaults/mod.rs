//! Default collaborator implementations.
//!
//! These let a node run against local storage and the real network with no
//! further wiring. Each can be replaced by any other implementation of the
//! matching trait.

pub mod fs_storage;
pub mod reqwest_transport;
pub mod storage_resolver;

pub use fs_storage::FsStorage;
pub use reqwest_transport::ReqwestTransport;
pub use storage_resolver::StorageFileResolver;
