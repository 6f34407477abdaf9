//! In-memory flow store for the Train.ai tool API
//!
//! This crate provides an in-memory implementation of the `FlowRepository`
//! contract defined in trainai-core. It is primarily useful for development,
//! testing, and single-instance deployments where persistence is not required.

pub mod repositories;
pub use repositories::InMemoryFlowRepository;
