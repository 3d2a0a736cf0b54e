use std::env;

use crate::error::AppError;
use crate::models::Money;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub order_queue_size: usize,
    pub event_buffer_size: usize,
    pub rescan_interval_secs: u64,
    pub rules: Rules,
}

/// Business rules applied by the proposal and settlement engines.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub proposal_expiry_seconds: i64,
    pub courier_share_percent: i64,
    pub daily_goal_target: usize,
    pub daily_goal_bonus_amount: Money,
    pub late_penalty_threshold_minutes: f64,
    pub late_penalty_amount: Money,
    pub cancellation_penalty_amount: Money,
    pub merchant_commission_percent: i64,
    /// Largest accepted gap between a declared remittance and its orders' totals.
    pub remittance_tolerance: Money,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            proposal_expiry_seconds: 120,
            courier_share_percent: 70,
            daily_goal_target: 10,
            daily_goal_bonus_amount: 2_000,
            late_penalty_threshold_minutes: 15.0,
            late_penalty_amount: 200,
            cancellation_penalty_amount: 500,
            merchant_commission_percent: 15,
            remittance_tolerance: 0,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            order_queue_size: parse_or_default("ORDER_QUEUE_SIZE", 1024)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            rescan_interval_secs: parse_or_default("RESCAN_INTERVAL_SECS", 30)?,
            rules: Rules::from_env()?,
        })
    }
}

impl Rules {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Rules::default();

        let rules = Self {
            proposal_expiry_seconds: parse_or_default(
                "PROPOSAL_EXPIRY_SECONDS",
                defaults.proposal_expiry_seconds,
            )?,
            courier_share_percent: parse_or_default(
                "COURIER_SHARE_PERCENT",
                defaults.courier_share_percent,
            )?,
            daily_goal_target: parse_or_default("DAILY_GOAL_TARGET", defaults.daily_goal_target)?,
            daily_goal_bonus_amount: parse_or_default(
                "DAILY_GOAL_BONUS_AMOUNT",
                defaults.daily_goal_bonus_amount,
            )?,
            late_penalty_threshold_minutes: parse_or_default(
                "LATE_PENALTY_THRESHOLD_MINUTES",
                defaults.late_penalty_threshold_minutes,
            )?,
            late_penalty_amount: parse_or_default(
                "LATE_PENALTY_AMOUNT",
                defaults.late_penalty_amount,
            )?,
            cancellation_penalty_amount: parse_or_default(
                "CANCELLATION_PENALTY_AMOUNT",
                defaults.cancellation_penalty_amount,
            )?,
            merchant_commission_percent: parse_or_default(
                "MERCHANT_COMMISSION_PERCENT",
                defaults.merchant_commission_percent,
            )?,
            remittance_tolerance: parse_or_default(
                "REMITTANCE_TOLERANCE",
                defaults.remittance_tolerance,
            )?,
        };

        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.proposal_expiry_seconds <= 0 {
            return Err(AppError::Internal(
                "PROPOSAL_EXPIRY_SECONDS must be > 0".to_string(),
            ));
        }
        if !(0..=100).contains(&self.courier_share_percent) {
            return Err(AppError::Internal(
                "COURIER_SHARE_PERCENT must be within 0..=100".to_string(),
            ));
        }
        if !(0..=100).contains(&self.merchant_commission_percent) {
            return Err(AppError::Internal(
                "MERCHANT_COMMISSION_PERCENT must be within 0..=100".to_string(),
            ));
        }
        if self.remittance_tolerance < 0 {
            return Err(AppError::Internal(
                "REMITTANCE_TOLERANCE must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
