//! Anonymous viewer flow through the password and email gates.

pub mod flow;

pub use flow::{
    Admission, FileAccess, GateStep, LinkPrompt, ViewerClient, ViewerOutcome, ViewerService,
    deny_error,
};
