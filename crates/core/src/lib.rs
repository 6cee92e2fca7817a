//! Domain model for the eval planner client.
//!
//! Entities (rules, agents, jobs), their drafts and validation, and the
//! pure selection state machine. No I/O lives here.

pub mod agent;
pub mod error;
pub mod form;
pub mod job;
pub mod rule;
pub mod selection;
pub mod types;
