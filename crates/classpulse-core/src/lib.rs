//! # ClassPulse
//!
//! School performance tracking for students, teachers and parents.
//!
//! Students log activities and study sessions, teachers record scores and
//! remarks, and parents follow their child's progress. When a new score
//! falls to 80% or less of the previous score in the same subject, a
//! performance alert is raised for the teacher and parent.
//!
//! ## Architecture
//!
//! - **Alerting**: score drop policy and evaluator
//! - **Storage**: PostgreSQL through sqlx, or an in-process store
//! - **API**: REST API with per-role route groups
//!
//! ## Quick Start
//!
//! ```bash
//! # Create the schema
//! classpulse db migrate
//!
//! # Start the API server
//! classpulse serve
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod alerting;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod summary;

pub use config::Config;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::alerting::{evaluate, AlertEvaluator, DropPolicy};
    pub use crate::config::Config;
    pub use crate::db::{MemoryStore, Store};
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
}
