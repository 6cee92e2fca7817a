//! Eval planner client library.
//!
//! State-synchronization layer between the eval planner backend and its
//! views: per-resource stores, the rule selection/edit controller, the
//! agent registration form, the job poller and the top-level tab
//! controller. Exposed as a library so integration tests and the binary
//! entrypoint can both use it.

pub mod agents;
pub mod api;
pub mod config;
pub mod error;
pub mod poller;
pub mod rules;
pub mod store;
pub mod tabs;
