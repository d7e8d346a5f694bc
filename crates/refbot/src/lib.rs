//! refbot - Telegram front end of the referral program
//!
//! The ledger, referral rules and withdrawal conversation live in `refcore`;
//! this crate wires them to teloxide and serves the liveness endpoint.

pub mod cli;
pub mod health;
pub mod telegram;
