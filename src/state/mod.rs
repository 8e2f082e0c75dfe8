//! State module for tracking run progress
//!
//! A run moves from `InProgress` to exactly one terminal status. The status is
//! owned by the run status cache and written only by the task driving that run.

mod run_state;

pub use run_state::RunStatus;
