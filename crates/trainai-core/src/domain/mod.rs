//! Domain model for the Train.ai tool API

pub mod flow;
pub mod repository;

pub use flow::{Flow, FlowId, FlowInput, FlowStep, FlowSummary, StepAction, StoredFlow};
pub use repository::FlowRepository;
