//! Data core for the Sweden Insights dashboards.
//!
//! Fetches CPI and migration statistics from SCB's PxWeb open-data API,
//! normalizes the keyed-tuple payloads into typed observation tables, and
//! derives the metrics the dashboards render: inflation contributions and
//! rankings, net migration, yearly aggregates, and country flow records.
//! Rendering itself lives with the presentation collaborator; this crate
//! only returns typed data.
//!
//! Pipeline: `ingest` fetches raw payloads, `normalize` and `resolve`
//! produce labeled tables, `analysis` computes derived metrics, `fetch`
//! fronts the whole thing behind a TTL cache.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod countries;
pub mod fetch;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod verify;
