//! Quote selection under the cooldown policy.
//!
//! Quotes selected within the last `window_days` are skipped. When every
//! quote is cooling down, the draw falls back to the whole collection and
//! the result is flagged as a forced repeat instead of blocking generation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::domain::Quote;
use crate::error::DomainError;
use crate::ports::QuoteStore;

pub const DEFAULT_COOLDOWN_DAYS: u32 = 14;

/// A drawn quote and whether the cooldown had to be ignored to get it.
#[derive(Debug, Clone)]
pub struct Selection {
    pub quote: Quote,
    pub forced_repeat: bool,
}

/// Draw one quote uniformly from the eligible pool.
pub fn select<R: Rng + ?Sized>(
    mut quotes: Vec<Quote>,
    window_days: u32,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Selection, DomainError> {
    if quotes.is_empty() {
        return Err(DomainError::EmptyPool);
    }

    let eligible: Vec<usize> = quotes
        .iter()
        .enumerate()
        .filter(|(_, q)| q.is_eligible(now, window_days))
        .map(|(i, _)| i)
        .collect();

    let (index, forced_repeat) = if eligible.is_empty() {
        (rng.gen_range(0..quotes.len()), true)
    } else {
        (eligible[rng.gen_range(0..eligible.len())], false)
    };

    Ok(Selection {
        quote: quotes.swap_remove(index),
        forced_repeat,
    })
}

/// Selector bound to a quote store.
pub struct QuoteSelector {
    quotes: Arc<dyn QuoteStore>,
    window_days: u32,
}

impl QuoteSelector {
    pub fn new(quotes: Arc<dyn QuoteStore>, window_days: u32) -> Self {
        Self {
            quotes,
            window_days,
        }
    }

    /// Draw from the current snapshot of the store. Does not record the selection.
    pub async fn draw(&self, now: DateTime<Utc>) -> Result<Selection, DomainError> {
        let quotes = self.quotes.list().await?;
        let total = quotes.len();

        let selection = select(quotes, self.window_days, now, &mut rand::thread_rng())?;

        if selection.forced_repeat {
            tracing::warn!(
                quote_id = %selection.quote.id,
                pool_size = total,
                window_days = self.window_days,
                "All quotes are within the cooldown window, repeating a quote"
            );
        } else {
            tracing::debug!(quote_id = %selection.quote.id, pool_size = total, "Quote selected");
        }

        Ok(selection)
    }
}
