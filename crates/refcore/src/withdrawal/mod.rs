//! Two-step withdrawal conversation: card number, then amount

pub mod card;
pub mod workflow;

pub use card::normalize_card_number;
pub use workflow::{BeginOutcome, SubmitOutcome, WithdrawalStage, WithdrawalWorkflow};
