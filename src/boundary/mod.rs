//! Client for the external administrative-boundary query service.
//!
//! Talks to an ordered list of interchangeable mirrors with per-mirror
//! retry/backoff and sequential failover.

mod client;
mod policy;

pub use client::{
    BoundaryClient, BoundaryElement, BoundaryError, ElementKind, ElementMember, ElementVertex,
};
pub use policy::{run_with_policy, RetryPolicy};
