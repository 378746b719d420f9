//! Run orchestration.
//!
//! Owns the run state machine and its coupling to the screenshot poller, and
//! the controller task that presentation layers talk to over channels.

mod controller;

pub(crate) use controller::{build_run_request, run_controller, RunDriver, RunForm, UiCommand};
