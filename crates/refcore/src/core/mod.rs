//! Configuration, errors, logging and the shared ledger types

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-exports for convenience
pub use error::{AppError, AppResult};
pub use logging::{init_logger, log_program_configuration};
pub use types::{AdminList, ProgramRules, UserAccount, WithdrawalRequest, WithdrawalStatus};
