//! State module for tracking crawl progress
//!
//! This module holds the shared mutable state of a crawl and the per-task
//! state machine.
//!
//! # Components
//!
//! - `VisitedRegistry`: normalized URL -> visit count, capped by the page budget
//! - `LinkCollector`: bounded lists of reported links and extracted content
//! - `TaskState` / `CrawlTask`: lifecycle of a single fetch-extract-expand cycle

mod collector;
mod registry;
mod task_state;

// Re-export main types
pub use collector::{ContentRecord, LinkCollector, LinkRecord};
pub use registry::{Admission, VisitedRegistry};
pub use task_state::{CrawlTask, TaskState};
