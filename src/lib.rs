// src/lib.rs
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod join;
pub mod normalize;
pub mod read;
pub mod resolve;
pub mod table;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, PanelId, PanelOutcome};
pub use error::{PipelineError, SchemaError};
pub use table::{CanonicalTable, RawTable};
