//! Pipeline services - the components that drive quotes to exported posts.

mod export;
mod lifecycle;
mod locking;
mod orchestrator;
pub mod selector;

pub use export::{ExportPackager, PackagedBundle};
pub use lifecycle::PostLifecycle;
pub use orchestrator::{GenerationOrchestrator, GenerationPorts, GenerationSettings};
pub use selector::{DEFAULT_COOLDOWN_DAYS, QuoteSelector, Selection};
