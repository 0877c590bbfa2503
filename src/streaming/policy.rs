use tracing::{error, warn};

use super::error::ContractViolation;
use crate::io::IoError;

/// Policy for handling bad input during an import
///
/// Store faults are not covered: they stick to the buffer, so an import
/// always stops on them.
pub trait ErrorPolicy: Send + Sync {
    /// Handle a record that could not be read
    /// Return true to continue processing, false to abort
    fn handle_io_error(&self, error: IoError) -> bool;

    /// Handle a record the buffer refused (out of order)
    /// Return true to continue processing, false to abort
    fn handle_contract_violation(&self, violation: ContractViolation) -> bool;
}

/// Skip bad records and continue (logged as warnings)
#[derive(Debug, Clone, Copy)]
pub struct SkipErrors;

impl ErrorPolicy for SkipErrors {
    fn handle_io_error(&self, error: IoError) -> bool {
        warn!(%error, "Skipping unreadable record");
        true
    }

    fn handle_contract_violation(&self, violation: ContractViolation) -> bool {
        warn!(%violation, "Skipping rejected record");
        true
    }
}

/// Abort on the first bad record
#[derive(Debug, Clone, Copy)]
pub struct AbortOnError;

impl ErrorPolicy for AbortOnError {
    fn handle_io_error(&self, error: IoError) -> bool {
        error!(%error, "Aborting on unreadable record");
        false
    }

    fn handle_contract_violation(&self, violation: ContractViolation) -> bool {
        error!(%violation, "Aborting on rejected record");
        false
    }
}

/// Skip bad records without logging
#[derive(Debug, Clone, Copy)]
pub struct SilentSkip;

impl ErrorPolicy for SilentSkip {
    fn handle_io_error(&self, _error: IoError) -> bool {
        true
    }

    fn handle_contract_violation(&self, _violation: ContractViolation) -> bool {
        true
    }
}
