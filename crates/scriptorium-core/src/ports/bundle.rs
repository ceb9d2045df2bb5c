//! Export bundle port.

/// One named file inside a bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleEntry {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Files making up an exported post, before container encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    /// Base name without extension, unique per post.
    pub name: String,
    pub entries: Vec<BundleEntry>,
}

/// Turns a bundle into a single downloadable container.
pub trait BundleEncoder: Send + Sync {
    /// File extension of the container, without the dot.
    fn extension(&self) -> &'static str;

    fn content_type(&self) -> &'static str;

    fn encode(&self, bundle: &Bundle) -> Result<Vec<u8>, BundleError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("Failed to encode bundle: {0}")]
    Encoding(String),
}
