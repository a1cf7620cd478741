//! Email capture ledger.

pub mod ledger;

pub use ledger::{EmailCaptureLedger, EmailSubmission};
