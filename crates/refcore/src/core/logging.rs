//! Logging initialization and startup diagnostics

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger is already set
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective program configuration at startup
pub fn log_program_configuration(admin_count: usize) {
    use config::program::*;

    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("💰 Referral program configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("  • Referral reward: {}", REFERRAL_REWARD);
    log::info!("  • Signup bonus: {}", SIGNUP_BONUS);
    log::info!("  • Minimum withdrawal: {}", MIN_WITHDRAWAL);
    log::info!("  • Withdrawal timeout: {}s", WITHDRAWAL_TIMEOUT_SECS);
    log::info!("  • Database: {}", config::DATABASE_PATH.as_str());

    if admin_count == 0 {
        log::warn!("⚠️  ADMIN_IDS is empty - withdrawal requests will reach nobody");
    } else {
        log::info!("  • Administrators: {}", admin_count);
    }
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::NamedTempFile;

    #[test]
    fn test_init_logger_twice_fails_second_time() {
        let first = NamedTempFile::new().unwrap();
        let second = NamedTempFile::new().unwrap();

        // Another test in this binary may already own the global logger,
        // so only the second call is guaranteed to fail.
        let _ = init_logger(first.path().to_str().unwrap());
        assert!(init_logger(second.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_init_logger_rejects_missing_directory() {
        assert!(init_logger("/nonexistent-dir/for/sure/app.log").is_err());
    }
}
