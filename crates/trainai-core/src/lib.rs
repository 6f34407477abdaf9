//! Train.ai core
//!
//! Domain model for recorded UI automation flows, the storage contract that
//! every flow store backend implements, and the discovery service used by the
//! HTTP layer for crawl, document search and selector evaluation.

pub mod discovery;
pub mod domain;
pub mod error;

pub use discovery::{CrawlResult, DiscoveryService, DocChunk, Evaluation, MockDiscoveryService};
pub use domain::{
    Flow, FlowId, FlowInput, FlowRepository, FlowStep, FlowSummary, StepAction, StoredFlow,
};
pub use error::CoreError;
