//! Core library for the node-local decision maker
//!
//! This crate provides:
//! - Pod/process discovery from `/proc` and cgroup descriptors
//! - Resolution of pod-level scheduling intents onto live PIDs
//! - A concurrent store of resolved scheduling intents
//! - The latest scheduler telemetry snapshot and its Prometheus export
//! - Health checks and observability

pub mod discovery;
pub mod error;
pub mod health;
pub mod intents;
pub mod models;
pub mod observability;
pub mod service;
pub mod telemetry;

pub use error::{Error, Result};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
pub use service::{DecisionService, ServiceOptions};
