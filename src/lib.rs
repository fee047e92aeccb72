//! Agent provisioning console.
//!
//! A wizard walks an operator through choosing an organization, one of its
//! agent instances and a data source, then links them on the backend.
//! Completed agents can generate and show articles. The terminal front end
//! lives in the binary; everything here is UI-agnostic.

pub mod catalog;
pub mod config;
pub mod console;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod registry;
pub mod schedule;
pub mod tracker;
pub mod upload;
pub mod wizard;

pub use console::{Console, ConsoleOptions};
pub use error::{ConsoleError, ConsoleResult, ValidationError};
