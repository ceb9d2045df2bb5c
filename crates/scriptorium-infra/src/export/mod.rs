//! Bundle encoders for post export.

mod zip;

pub use self::zip::ZipBundleEncoder;
