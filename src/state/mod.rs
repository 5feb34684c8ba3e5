//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `ExpansionState`: terminal outcome of expanding one URL (skipped, failed, completed)
//! - `LinkClass`: what the frontier decided for a discovered link (new, requeue, done)

mod expansion;
mod link_class;

pub use expansion::ExpansionState;
pub use link_class::LinkClass;
