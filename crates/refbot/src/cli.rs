use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "refbot")]
#[command(author, version, about = "Telegram referral bot with card withdrawals", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling) together with the health endpoint
    Run,

    /// Serve only the health endpoint
    ServeHealth {
        /// Port to listen on (defaults to PORT or 10000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
