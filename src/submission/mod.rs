/// Submission pipeline: rate-limit gate and classification wizard
pub mod gate;
pub mod wizard;

pub use gate::{GateReady, SubmissionGate};
pub use wizard::{Draft, DraftSeed, FinalizeResult, StepView, WizardField, WizardManager, WizardReply};
