//! HTTP capability for cross-service jobs.
//!
//! Wraps [`reqwest`] around the two peer services the platform talks to.
//! Callers name a service, an endpoint path and a method; every transport
//! fault comes back as a [`RemoteError`], never a panic.

pub mod client;

pub use client::{PeerServices, RemoteError, ResponseBody, ServiceResponse, REQUEST_TIMEOUT};
