//! `inspection-report` - Typst reports from building inspection projects
//!
//! This library turns the JSON export of an inspection project (levels,
//! spaces, observations and their embedded photos) into a Typst document and
//! a folder of extracted images, ready for `typst compile`.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod markup;
pub mod photo;
pub mod project;
pub mod report;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use photo::{ImageStore, PhotoError, PhotoSink};
pub use project::{Level, Observation, Project, Space};
pub use report::{render_project, RenderOptions, ReportBuilder, ReportOutput, ReportSummary};
