//! Asynchronous access to read-only triple stores from a single control thread.
//!
//! Blocking store work (opening, searching) runs on a worker pool; results come
//! back as callbacks executed by whichever thread drives the [`Dispatcher`].

pub mod config;
pub mod dispatcher;
pub mod document;
pub mod errors;
pub mod logging;
pub mod marshal;
mod open;
mod search;

pub use config::BridgeConfig;
pub use dispatcher::{Dispatcher, Outcome, TaskId};
pub use document::{Document, DocumentStatus};
pub use errors::{BridgeError, Result, TaskError};
pub use marshal::TripleRecord;
pub use open::create_document;
pub use search::materialize;
pub use trix_core::{Triple, TripleIndex, TriplePattern, TripleStore};
