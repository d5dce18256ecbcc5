use anyhow::Result;
use std::str::FromStr;

use crate::env::{which, Environment};

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub booking: BookingConfig,
    pub payment: PaymentConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: std::env::var("DATABASE_HOST")?,
            port: std::env::var("DATABASE_PORT")?.parse::<u16>()?,
            username: std::env::var("DATABASE_USERNAME")?,
            password: std::env::var("DATABASE_PASSWORD")?,
            database: std::env::var("DATABASE_NAME")?,
        };
        let redis = RedisConfig {
            host: std::env::var("REDIS_HOST")?,
            port: std::env::var("REDIS_PORT")?.parse::<u16>()?,
        };
        let auth = AuthConfig {
            ttl: std::env::var("AUTH_TOKEN_TTL")?.parse::<u64>()?,
        };
        let booking = BookingConfig {
            prepayment_percent: var_or("BOOKING_PREPAYMENT_PERCENT", 30)?,
            refund_days: var_or("BOOKING_REFUND_DAYS", 3)?,
            reject_overlapping: var_or("BOOKING_REJECT_OVERLAPPING", true)?,
        };

        // 本番では実決済、開発環境ではテスト決済を既定とする
        let default_mode = match which() {
            Environment::Development => PaymentMode::Simulated,
            Environment::Production => PaymentMode::Live,
        };
        let payment = PaymentConfig {
            mode: var_or("PAYMENT_MODE", default_mode)?,
            shop_id: std::env::var("YOOKASSA_SHOP_ID").unwrap_or_default(),
            secret_key: std::env::var("YOOKASSA_SECRET_KEY").unwrap_or_default(),
            api_url: std::env::var("YOOKASSA_API_URL")
                .unwrap_or_else(|_| DEFAULT_YOOKASSA_API_URL.into()),
            currency: std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "RUB".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            trusted_networks: match std::env::var("PAYMENT_TRUSTED_NETWORKS") {
                Ok(v) => v
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
                Err(_) => DEFAULT_TRUSTED_NETWORKS.iter().map(|s| s.to_string()).collect(),
            },
            pending_ttl_minutes: var_or("PAYMENT_PENDING_TTL_MINUTES", 60)?,
            sweep_interval_secs: var_or("PAYMENT_SWEEP_INTERVAL_SECS", 300)?,
        };

        Ok(Self {
            database,
            redis,
            auth,
            booking,
            payment,
        })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

pub struct AuthConfig {
    pub ttl: u64,
}

#[derive(Debug, Clone)]
pub struct BookingConfig {
    pub prepayment_percent: u32,
    pub refund_days: u32,
    // 同一期間の重複予約を拒否するかどうか
    pub reject_overlapping: bool,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            prepayment_percent: 30,
            refund_days: 3,
            reject_overlapping: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMode {
    Simulated,
    Live,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub mode: PaymentMode,
    pub shop_id: String,
    pub secret_key: String,
    pub api_url: String,
    pub currency: String,
    pub public_base_url: String,
    pub trusted_networks: Vec<String>,
    pub pending_ttl_minutes: i64,
    pub sweep_interval_secs: u64,
}

pub const DEFAULT_YOOKASSA_API_URL: &str = "https://api.yookassa.ru";

// YooKassa が通知を送信する IP アドレス帯
pub const DEFAULT_TRUSTED_NETWORKS: &[&str] = &[
    "185.71.76.0/27",
    "185.71.77.0/27",
    "77.75.153.0/25",
    "77.75.156.11/32",
    "77.75.156.35/32",
    "77.75.154.128/25",
    "2a02:5180::/32",
];

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => Ok(v.parse::<T>()?),
        Err(_) => Ok(default),
    }
}
