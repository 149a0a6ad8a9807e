use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub daily_generation_limit: i64,
    pub otp_ttl_minutes: i64,
    pub provider_base_url: String,
    pub provider_api_key: Option<String>,
    pub provider_image_count: u8,
    pub provider_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/image_gen".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()?,
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key".to_string()),
            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()?,
            daily_generation_limit: env::var("DAILY_GENERATION_LIMIT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            otp_ttl_minutes: env::var("OTP_TTL_MINUTES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            provider_base_url: env::var("PROVIDER_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8188".to_string()),
            provider_api_key: env::var("PROVIDER_API_KEY").ok(),
            provider_image_count: env::var("PROVIDER_IMAGE_COUNT")
                .unwrap_or_else(|_| "4".to_string())
                .parse()?,
            provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
        })
    }
}
