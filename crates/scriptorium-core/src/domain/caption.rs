//! Full-caption composition: generated caption, attribution, rotating
//! call-to-action and curated hashtags.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Attribution line appended under every caption.
pub const ATTRIBUTION: &str = "— We Burned, Quietly";

pub const MIN_HASHTAGS: usize = 5;
pub const MAX_HASHTAGS: usize = 7;

/// Minimum number of general tags, so every post carries the brand tags.
const MIN_GENERAL_HASHTAGS: usize = 2;

/// Theme/tone-specific tags with the labels that make them relevant.
const RELEVANT_HASHTAGS: &[(&str, &[&str])] = &[
    ("#gothicliterature", &["gothic", "dark", "haunt", "shadow", "night"]),
    ("#melancholy", &["melanchol", "grief", "loss", "sorrow", "mourn"]),
    ("#romanticism", &["love", "romance", "romantic", "desire", "longing"]),
    ("#philosophy", &["truth", "philosoph", "existential", "reflect", "contemplat"]),
    ("#poetry", &["poetic", "lyrical", "wistful", "tender"]),
    ("#fireandash", &["fire", "burn", "flame", "ash", "ember"]),
    ("#secretsociety", &["secret", "order", "ritual", "society", "mystery"]),
    ("#rebellion", &["defian", "rebel", "rage", "fierce", "resolute"]),
    ("#memoryandtime", &["memory", "time", "nostalg", "past", "remember"]),
];

/// Tags used on every post, in priority order.
const GENERAL_HASHTAGS: &[&str] = &[
    "#darkacademia",
    "#webburnedquietly",
    "#bookstagram",
    "#literaryquotes",
    "#gothicnovel",
];

/// The two calls-to-action that alternate across generated posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallToAction {
    FollowForFragments,
    JoinNewsletter,
}

impl CallToAction {
    pub const ALL: [CallToAction; 2] = [CallToAction::FollowForFragments, CallToAction::JoinNewsletter];

    /// The call-to-action for a given rotation index.
    pub fn for_rotation(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn text(&self) -> &'static str {
        match self {
            CallToAction::FollowForFragments => "Follow for more fragments of the Order",
            CallToAction::JoinNewsletter => "Join the newsletter for deeper pages of the Pocket Guide",
        }
    }
}

/// Rotation counter handing out calls-to-action in a fixed cadence.
#[derive(Debug, Default)]
pub struct CtaRotation {
    next: AtomicUsize,
}

impl CtaRotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next call-to-action and advance the rotation.
    pub fn advance(&self) -> CallToAction {
        CallToAction::for_rotation(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Caption parts plus the assembled full caption.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedCaption {
    pub caption: String,
    pub call_to_action: String,
    pub hashtags: Vec<String>,
    pub full_caption: String,
}

/// Pick 5 to 7 hashtags: relevant ones first, then general tags.
///
/// A marker matches a word of the theme or tone that starts with it, so
/// "burning" hits `burn` but "flash" does not hit `ash`.
pub fn select_hashtags(theme: &str, tone: &str) -> Vec<String> {
    let labels = format!("{} {}", theme, tone).to_lowercase();
    let words: Vec<&str> = labels
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();

    let mut tags: Vec<String> = RELEVANT_HASHTAGS
        .iter()
        .filter(|(_, markers)| {
            markers
                .iter()
                .any(|m| words.iter().any(|w| w.starts_with(m)))
        })
        .map(|(tag, _)| tag.to_string())
        .take(MAX_HASHTAGS - MIN_GENERAL_HASHTAGS)
        .collect();

    let mut general = 0;
    for tag in GENERAL_HASHTAGS {
        if tags.len() >= MAX_HASHTAGS {
            break;
        }
        if tags.len() >= MIN_HASHTAGS && general >= MIN_GENERAL_HASHTAGS {
            break;
        }
        tags.push(tag.to_string());
        general += 1;
    }

    tags
}

/// Assemble the full caption for a generated caption text.
pub fn compose(caption: &str, theme: &str, tone: &str, cta: CallToAction) -> ComposedCaption {
    let caption = caption.trim().to_string();
    let hashtags = select_hashtags(theme, tone);
    let full_caption = format!(
        "{}\n\n{}\n\n{}\n\n{}",
        caption,
        ATTRIBUTION,
        cta.text(),
        hashtags.join(" ")
    );

    ComposedCaption {
        caption,
        call_to_action: cta.text().to_string(),
        hashtags,
        full_caption,
    }
}
