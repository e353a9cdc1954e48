//! Client-side controller for a dashboard comparing two regression models.
//!
//! [`MetricsController`] keeps the metrics and chart views in step with the
//! selected [`Algorithm`], however its responses interleave.
//! [`PredictionClient`] validates and sends single-record predictions, one
//! at a time.

pub mod algorithm;
pub mod api;
pub mod chart;
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod metrics;
pub mod prediction;

pub use algorithm::Algorithm;
pub use api::{Backend, HttpBackend, Metrics, MetricsResponse, PredictionResult, SamplePoint};
pub use chart::{ChartData, ChartPoint};
pub use config::DashboardConfig;
pub use display::{DisplayState, Resolution};
pub use error::ClientErr;
pub use input::{Feature, PredictionInput, ValidatedInput, ValidationError};
pub use metrics::{Generation, MetricsController};
pub use prediction::PredictionClient;
