use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Review status of a post. Approval is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Pending,
    Approved,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Pending => "pending",
            PostStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PostStatus::Pending),
            "approved" => Ok(PostStatus::Approved),
            other => Err(DomainError::Validation(format!("unknown post status '{other}'"))),
        }
    }
}

/// Output of one successful generation run, not yet attached to a post.
#[derive(Debug, Clone)]
pub struct Draft {
    pub quote_id: Uuid,
    pub image: Vec<u8>,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub call_to_action: String,
    pub full_caption: String,
    pub forced_repeat: bool,
}

/// Post entity - a generated image and caption awaiting or past review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// Non-owning reference into the quote store.
    pub quote_id: Uuid,
    pub image: Vec<u8>,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub call_to_action: String,
    pub full_caption: String,
    pub status: PostStatus,
    /// Set when the quote was drawn by the exhausted-pool fallback.
    pub forced_repeat: bool,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a pending post from a draft.
    pub fn from_draft(draft: Draft) -> Self {
        Self {
            id: Uuid::new_v4(),
            quote_id: draft.quote_id,
            image: draft.image,
            caption: draft.caption,
            hashtags: draft.hashtags,
            call_to_action: draft.call_to_action,
            full_caption: draft.full_caption,
            status: PostStatus::Pending,
            forced_repeat: draft.forced_repeat,
            created_at: Utc::now(),
            approved_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == PostStatus::Pending
    }

    pub(crate) fn ensure_pending(&self, action: &'static str) -> Result<(), DomainError> {
        if self.is_pending() {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                id: self.id,
                from: self.status,
                action,
            })
        }
    }

    /// Replace the generated content in place. Identity and `created_at` are kept.
    pub fn apply_draft(&mut self, draft: Draft) -> Result<(), DomainError> {
        self.ensure_pending("regenerate")?;

        self.quote_id = draft.quote_id;
        self.image = draft.image;
        self.caption = draft.caption;
        self.hashtags = draft.hashtags;
        self.call_to_action = draft.call_to_action;
        self.full_caption = draft.full_caption;
        self.forced_repeat = draft.forced_repeat;
        Ok(())
    }

    /// `pending -> approved`. Approving twice is an error, not a no-op.
    pub fn approve(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_pending("approve")?;
        self.status = PostStatus::Approved;
        self.approved_at = Some(at);
        Ok(())
    }
}
