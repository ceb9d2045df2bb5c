//! Domain entities - the core business objects.

pub mod caption;
mod post;
pub mod prompt;
mod quote;

pub use caption::{CallToAction, ComposedCaption, CtaRotation};
pub use post::{Draft, Post, PostStatus};
pub use quote::{LengthClass, Quote};
