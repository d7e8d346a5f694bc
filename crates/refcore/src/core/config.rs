use once_cell::sync::Lazy;
use std::env;

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: referral.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "referral.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Port of the liveness endpoint
/// Read from PORT environment variable (hosting platforms set it)
/// Default: 10000
pub static HEALTH_PORT: Lazy<u16> = Lazy::new(|| {
    env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10000)
});

/// Support contact shown by the "Support" menu button
pub static SUPPORT_USERNAME: Lazy<String> =
    Lazy::new(|| env::var("SUPPORT_USERNAME").unwrap_or_else(|_| "@hallaym_support".to_string()));

/// News channel shown by the "News" menu button
pub static NEWS_CHANNEL: Lazy<String> =
    Lazy::new(|| env::var("NEWS_CHANNEL").unwrap_or_else(|_| "@hallaym".to_string()));

/// Administrator configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    /// Admin user IDs (comma-separated)
    /// Read from ADMIN_IDS environment variable
    pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
        env::var("ADMIN_IDS")
            .ok()
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default()
    });
}

/// Referral and payout rules
pub mod program {
    use std::time::Duration;

    /// Credited to the inviter for every attributed referral
    pub const REFERRAL_REWARD: i64 = 1000;

    /// Credited to the invited user on attribution
    pub const SIGNUP_BONUS: i64 = 500;

    /// Smallest amount that can be withdrawn (also the balance needed to start)
    pub const MIN_WITHDRAWAL: i64 = 10_000;

    /// Lifetime of a withdrawal conversation, counted from its start
    pub const WITHDRAWAL_TIMEOUT_SECS: u64 = 60;

    pub fn withdrawal_timeout() -> Duration {
        Duration::from_secs(WITHDRAWAL_TIMEOUT_SECS)
    }
}

/// Network configuration
pub mod network {
    use std::time::Duration;

    /// Timeout for Bot API requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Retry configuration
pub mod retry {
    use std::time::Duration;

    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher retry attempts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::admin::parse_admin_ids;

    #[test]
    fn test_parse_admin_ids_mixed_separators() {
        assert_eq!(parse_admin_ids("1, 2,3\n4\t5"), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_parse_admin_ids_skips_garbage() {
        assert_eq!(parse_admin_ids("abc, 42,,  "), vec![42]);
        assert!(parse_admin_ids("").is_empty());
    }
}
