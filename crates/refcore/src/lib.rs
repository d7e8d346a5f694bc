//! refcore - ledger, referral rewards and the withdrawal workflow
//!
//! This crate has no Telegram dependency by default. Enable the `telegram`
//! feature to get `From<teloxide::RequestError>` on [`AppError`].
//!
//! - [`storage`]: SQLite ledger behind the [`LedgerStore`] trait
//! - [`referral`]: one-time invitation rewards
//! - [`withdrawal`]: per-user card/amount conversation
//! - [`adjudication`]: admin approve/reject with refund

pub mod adjudication;
pub mod core;
pub mod referral;
pub mod storage;
pub mod withdrawal;

pub use crate::core::{AdminList, AppError, AppResult, ProgramRules, UserAccount, WithdrawalRequest, WithdrawalStatus};
pub use adjudication::{Adjudication, Adjudicator, UserSummary};
pub use referral::ReferralEngine;
pub use storage::{LedgerStore, SqliteLedger};
pub use withdrawal::{BeginOutcome, SubmitOutcome, WithdrawalStage, WithdrawalWorkflow};
