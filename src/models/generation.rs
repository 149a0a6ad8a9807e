use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

/// One completed image generation call and its resulting URLs. Immutable
/// once written.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub style: String,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new record; `id` and `created_at` are assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct NewGenerationRecord {
    pub user_id: Uuid,
    pub prompt: String,
    pub style: GenerationStyle,
    pub image_urls: Vec<String>,
}

/// Styles the generation provider accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStyle {
    Realism,
    Anime,
    Fantasy,
    Cyberpunk,
    Watercolor,
    Sketch,
}

impl GenerationStyle {
    pub const ALL: [GenerationStyle; 6] = [
        GenerationStyle::Realism,
        GenerationStyle::Anime,
        GenerationStyle::Fantasy,
        GenerationStyle::Cyberpunk,
        GenerationStyle::Watercolor,
        GenerationStyle::Sketch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStyle::Realism => "realism",
            GenerationStyle::Anime => "anime",
            GenerationStyle::Fantasy => "fantasy",
            GenerationStyle::Cyberpunk => "cyberpunk",
            GenerationStyle::Watercolor => "watercolor",
            GenerationStyle::Sketch => "sketch",
        }
    }
}

impl fmt::Display for GenerationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        GenerationStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == needle)
            .ok_or_else(|| {
                let supported: Vec<&str> = GenerationStyle::ALL.iter().map(|s| s.as_str()).collect();
                AppError::Validation(format!(
                    "Unsupported style '{}'. Supported styles: {}",
                    s,
                    supported.join(", ")
                ))
            })
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub style: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub image_urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MyImagesParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MyImagesResponse {
    /// Generations performed today; the client renders this against the
    /// daily limit.
    pub total: i64,
    pub images: Vec<GenerationRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_parses_known_values() {
        assert_eq!("realism".parse::<GenerationStyle>().unwrap(), GenerationStyle::Realism);
        assert_eq!(" Anime ".parse::<GenerationStyle>().unwrap(), GenerationStyle::Anime);
    }

    #[test]
    fn style_rejects_unknown_values() {
        let err = "oilpaint".parse::<GenerationStyle>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("oilpaint"));
        assert!(message.contains("realism"));
    }

    #[test]
    fn generate_response_uses_camel_case_urls() {
        let response = GenerateResponse {
            image_urls: vec!["https://img.example/1.png".to_string()],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("imageUrls").is_some());
        assert!(json.get("image_urls").is_none());
    }
}
