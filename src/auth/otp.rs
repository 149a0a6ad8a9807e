use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::errors::{AppError, Result};
use crate::models::User;

/// One-time verification codes for newly registered accounts. Delivery is
/// out of band; this service only issues and checks codes.
pub struct OtpService {
    ttl: Duration,
}

impl OtpService {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// A fresh 6-digit code and its expiry.
    pub fn issue(&self) -> (String, DateTime<Utc>) {
        let code = rand::thread_rng().gen_range(0..1_000_000u32);
        (format!("{:06}", code), Utc::now() + self.ttl)
    }

    /// Checks a submitted code against the user's pending one.
    pub fn verify(&self, user: &User, submitted: &str) -> Result<()> {
        let (code, expires_at) = match (&user.otp_code, user.otp_expires_at) {
            (Some(code), Some(expires_at)) => (code, expires_at),
            _ => {
                return Err(AppError::Validation(
                    "No verification pending for this account".to_string(),
                ))
            }
        };

        if Utc::now() > expires_at {
            return Err(AppError::Validation(
                "Verification code has expired. Please register again to receive a new one".to_string(),
            ));
        }

        if code != submitted.trim() {
            return Err(AppError::Validation("Invalid verification code".to_string()));
        }

        Ok(())
    }
}
