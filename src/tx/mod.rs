//! Transaction submission with local nonce sequencing and gas price bumping

pub mod gas;
pub mod nonce;
pub mod step;

pub use gas::GasPricer;
pub use nonce::NonceCounter;
pub use step::{
    GasLimit, SpenderRole, StepKind, SubmittedTx, TransactionSender, WorkflowStep,
};
