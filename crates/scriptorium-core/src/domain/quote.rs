use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Length class of a quote, as labelled in the quote bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthClass {
    Short,
    Medium,
    Long,
}

impl LengthClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            LengthClass::Short => "short",
            LengthClass::Medium => "medium",
            LengthClass::Long => "long",
        }
    }
}

impl fmt::Display for LengthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(LengthClass::Short),
            "medium" => Ok(LengthClass::Medium),
            "long" => Ok(LengthClass::Long),
            other => Err(DomainError::Validation(format!(
                "unknown length class '{other}' (expected short, medium or long)"
            ))),
        }
    }
}

/// Quote entity - one curated line from the quote bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub text: String,
    pub theme: String,
    pub tone: String,
    pub length: LengthClass,
    /// Ordered; the image prompt joins them in this order.
    pub visual_keywords: Vec<String>,
    pub last_selected_at: Option<DateTime<Utc>>,
    pub times_selected: u32,
}

impl Quote {
    /// Create a never-selected quote. The text must not be blank.
    pub fn new(
        text: impl Into<String>,
        theme: impl Into<String>,
        tone: impl Into<String>,
        length: LengthClass,
        visual_keywords: Vec<String>,
    ) -> Result<Self, DomainError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(DomainError::Validation("quote text is empty".to_string()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            text,
            theme: theme.into().trim().to_string(),
            tone: tone.into().trim().to_string(),
            length,
            visual_keywords: visual_keywords
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            last_selected_at: None,
            times_selected: 0,
        })
    }

    /// Whether the quote is outside the cooldown window at `now`.
    pub fn is_eligible(&self, now: DateTime<Utc>, window_days: u32) -> bool {
        if window_days == 0 {
            return true;
        }
        match self.last_selected_at {
            None => true,
            Some(last) => now - last >= Duration::days(i64::from(window_days)),
        }
    }

    /// Stamp a selection. The timestamp never moves backwards.
    pub fn record_selection(&mut self, at: DateTime<Utc>) {
        self.last_selected_at = Some(match self.last_selected_at {
            Some(previous) if previous > at => previous,
            _ => at,
        });
        self.times_selected = self.times_selected.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote() -> Quote {
        Quote::new(
            "We burned, quietly.",
            "loss",
            "melancholic",
            LengthClass::Short,
            vec!["ashes".into(), " candle ".into(), "".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_new_trims_and_drops_blank_keywords() {
        let q = quote();
        assert_eq!(q.visual_keywords, vec!["ashes", "candle"]);
        assert!(q.last_selected_at.is_none());
    }

    #[test]
    fn test_blank_text_rejected() {
        let result = Quote::new("   ", "t", "t", LengthClass::Long, vec![]);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_eligibility_window() {
        let now = Utc::now();
        let mut q = quote();
        assert!(q.is_eligible(now, 14));

        q.last_selected_at = Some(now - Duration::days(13));
        assert!(!q.is_eligible(now, 14));
        assert!(q.is_eligible(now, 0));

        q.last_selected_at = Some(now - Duration::days(14));
        assert!(q.is_eligible(now, 14));
    }

    #[test]
    fn test_record_selection_is_monotone() {
        let now = Utc::now();
        let mut q = quote();
        q.record_selection(now);
        q.record_selection(now - Duration::hours(1));
        assert_eq!(q.last_selected_at, Some(now));
        assert_eq!(q.times_selected, 2);
    }

    #[test]
    fn test_length_class_parse() {
        assert_eq!(" Medium ".parse::<LengthClass>().unwrap(), LengthClass::Medium);
        assert!("epic".parse::<LengthClass>().is_err());
    }
}
