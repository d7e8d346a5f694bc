pub mod db;
pub mod ledger;
pub mod migrations;

pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use ledger::{LedgerStore, SqliteLedger};
