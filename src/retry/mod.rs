mod coordinator;
mod outcome;
mod plan;

pub use coordinator::{CancelPhase, OperationKind, RetryCoordinator};
pub use outcome::{Outcome, classify};
pub use plan::RetryPlan;
