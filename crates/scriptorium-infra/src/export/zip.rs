//! ZIP container for exported posts.

use std::io::{Cursor, Write};

use ::zip::write::SimpleFileOptions;
use ::zip::{CompressionMethod, ZipWriter};

use scriptorium_core::ports::{Bundle, BundleEncoder, BundleError};

/// Deflate-compressed ZIP archive, one file per bundle entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipBundleEncoder;

impl ZipBundleEncoder {
    pub fn new() -> Self {
        Self
    }
}

fn encoding_error(e: impl std::fmt::Display) -> BundleError {
    BundleError::Encoding(e.to_string())
}

impl BundleEncoder for ZipBundleEncoder {
    fn extension(&self) -> &'static str {
        "zip"
    }

    fn content_type(&self) -> &'static str {
        "application/zip"
    }

    fn encode(&self, bundle: &Bundle) -> Result<Vec<u8>, BundleError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &bundle.entries {
            writer
                .start_file(entry.name.as_str(), options)
                .map_err(encoding_error)?;
            writer.write_all(&entry.contents).map_err(encoding_error)?;
        }

        let cursor = writer.finish().map_err(encoding_error)?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use ::zip::ZipArchive;
    use scriptorium_core::ports::BundleEntry;

    use super::*;

    #[test]
    fn test_archive_contains_every_entry() {
        let bundle = Bundle {
            name: "ember_post_1".to_string(),
            entries: vec![
                BundleEntry {
                    name: "image_1.png".to_string(),
                    contents: vec![0x89, b'P', b'N', b'G', 0, 1, 2],
                },
                BundleEntry {
                    name: "caption_1.txt".to_string(),
                    contents: b"The ash remembers.\n\nGenerated: now".to_vec(),
                },
            ],
        };

        let bytes = ZipBundleEncoder::new().encode(&bundle).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut image = Vec::new();
        archive.by_name("image_1.png").unwrap().read_to_end(&mut image).unwrap();
        assert_eq!(image, bundle.entries[0].contents);

        let mut caption = String::new();
        archive
            .by_name("caption_1.txt")
            .unwrap()
            .read_to_string(&mut caption)
            .unwrap();
        assert!(caption.starts_with("The ash remembers."));
    }

    #[test]
    fn test_empty_bundle_is_a_valid_archive() {
        let bundle = Bundle {
            name: "empty".to_string(),
            entries: vec![],
        };
        let bytes = ZipBundleEncoder::new().encode(&bundle).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
