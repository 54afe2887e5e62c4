//! Built-in node implementations.

pub mod http_request;

pub use http_request::HttpRequestNode;
