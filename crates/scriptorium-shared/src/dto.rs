//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visual keywords as uploaded: either `"a, b, c"` or `["a", "b", "c"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisualKeywords {
    List(Vec<String>),
    Joined(String),
}

impl Default for VisualKeywords {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl VisualKeywords {
    /// Trimmed, non-empty keywords.
    pub fn into_vec(self) -> Vec<String> {
        let raw = match self {
            Self::List(list) => list,
            Self::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// One quote record of an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub quote: String,
    pub theme: String,
    pub tone: String,
    pub length: String,
    #[serde(default)]
    pub visual_keywords: VisualKeywords,
}

/// Replaces the whole quote bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadQuotesRequest {
    pub quotes: Vec<QuoteRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadQuotesResponse {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub id: Uuid,
    pub quote: String,
    pub theme: String,
    pub tone: String,
    pub length: String,
    pub visual_keywords: Vec<String>,
    pub last_selected_at: Option<DateTime<Utc>>,
    pub times_selected: u32,
}

/// Query parameters for quote listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteListResponse {
    pub quotes: Vec<QuoteResponse>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
}

/// Body of `POST /api/posts/generate`. An empty body draws a quote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub quote_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub quote_id: Uuid,
    /// Text of the source quote, absent when it left the bank.
    pub quote_text: Option<String>,
    /// Base64-encoded PNG.
    pub image_base64: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub call_to_action: String,
    pub full_caption: String,
    pub status: String,
    pub forced_repeat: bool,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsRequest {
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub has_api_key: bool,
}
