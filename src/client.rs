//! Transport adapters for the deployment client port.

pub mod http;

pub use http::HttpDeploymentClient;
