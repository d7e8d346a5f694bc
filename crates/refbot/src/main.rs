use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::sleep;

use refbot::cli::{Cli, Commands};
use refbot::health;
use refbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
use refcore::core::{config, init_logger, log_program_configuration};
use refcore::storage::create_pool;
use refcore::{AdminList, LedgerStore, ProgramRules, SqliteLedger};

/// Main entry point for the referral bot
///
/// Parses CLI arguments and dispatches to the chosen subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) => run_bot().await,
        Some(Commands::ServeHealth { port }) => {
            let port = port.unwrap_or(*config::HEALTH_PORT);
            health::serve(port, health::shutdown_signal()).await
        }
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot().await
        }
    }
}

/// Waits for the Bot API to answer `getMe`, retrying transient failures
async fn fetch_bot_info(bot: &Bot) -> Result<teloxide::types::Me> {
    let startup_max_retries = 60;
    let mut startup_retry = 0;
    loop {
        match bot.get_me().await {
            Ok(info) => return Ok(info),
            Err(e) => {
                let err_str = e.to_string();
                let is_retryable = err_str.contains("network")
                    || err_str.contains("connection")
                    || err_str.contains("timed out")
                    || err_str.contains("Connection refused");

                startup_retry += 1;
                if startup_retry >= startup_max_retries || !is_retryable {
                    return Err(anyhow::anyhow!(
                        "Failed to connect to Bot API after {} retries: {}",
                        startup_retry,
                        e
                    ));
                }

                log::warn!(
                    "Bot API not ready (attempt {}/{}): {}. Retrying in 5 seconds...",
                    startup_retry,
                    startup_max_retries,
                    err_str
                );
                sleep(Duration::from_secs(5)).await;
            }
        }
    }
}

async fn run_bot() -> Result<()> {
    let bot_init_start = std::time::Instant::now();
    log::info!("Starting bot...");

    let rules = ProgramRules::default();
    let admins = AdminList::new(config::admin::ADMIN_IDS.iter().copied());
    log_program_configuration(admins.len());

    // An unusable database is fatal: refuse to start
    let db_pool = Arc::new(
        create_pool(&config::DATABASE_PATH).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );
    let ledger: Arc<dyn LedgerStore> = Arc::new(SqliteLedger::new(Arc::clone(&db_pool)));

    let bot = create_bot()?;
    let bot_info = fetch_bot_info(&bot).await?;
    let bot_username = bot_info.username.clone();
    log::info!("Bot username: {:?}, Bot ID: {}", bot_username, bot_info.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    // Health endpoint lives as long as the process
    let health_port = *config::HEALTH_PORT;
    tokio::spawn(async move {
        if let Err(e) = health::serve(health_port, health::shutdown_signal()).await {
            log::error!("Health server error: {}", e);
        }
    });

    let handler_deps = HandlerDeps::new(ledger, rules, admins, bot_username);
    let handler = schema(handler_deps);

    log::info!("================================================");
    log::info!(
        "🎉 Bot initialization complete in {:.2}s",
        bot_init_start.elapsed().as_secs_f64()
    );
    log::info!("📡 Ready to receive updates!");
    log::info!("================================================");

    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;
    let mut retry_count = 0;

    // Run the dispatcher; a panicking dispatcher task is restarted a few times
    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) if join_err.is_panic() => {
                log::error!("Dispatcher panicked: {}", join_err);
                if retry_count >= max_retries {
                    log::error!("Max retries reached after panic. Exiting...");
                    break;
                }
                retry_count += 1;
                log::info!(
                    "Retrying dispatcher after panic (attempt {}/{})...",
                    retry_count,
                    max_retries
                );
                sleep(config::retry::dispatcher_delay()).await;
            }
            Err(join_err) => {
                log::warn!("Dispatcher task was cancelled: {}", join_err);
                break;
            }
        }
    }

    Ok(())
}
