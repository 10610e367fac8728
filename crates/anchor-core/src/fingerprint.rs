//! Content hashes for duplicate-upload detection

use crate::document;
use crate::error::AnchorError;
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprint {
    pub content_hash: String,
    pub text_hash: String,
    pub page_count: u32,
}

/// SHA-256 of the raw bytes, hex encoded. No parsing involved.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 of the document's extracted text, page by page.
///
/// Two files that differ only in metadata or object layout hash the same.
/// Pages whose text cannot be extracted contribute nothing.
pub fn text_hash(bytes: &[u8]) -> Result<String, AnchorError> {
    let doc = document::load(bytes)?;
    Ok(hash_text(&doc))
}

/// Both hashes plus page count, from a single parse
pub fn fingerprint(bytes: &[u8]) -> Result<Fingerprint, AnchorError> {
    let doc = document::load(bytes)?;
    Ok(Fingerprint {
        content_hash: content_hash(bytes),
        text_hash: hash_text(&doc),
        page_count: doc.get_pages().len() as u32,
    })
}

fn hash_text(doc: &lopdf::Document) -> String {
    let mut hasher = Sha256::new();
    for page_num in doc.get_pages().keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(text) => hasher.update(text.as_bytes()),
            Err(e) => tracing::warn!(page = page_num, error = %e, "text extraction failed"),
        }
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{Anchor, CanvasSize, RenderMode};
    use crate::document::test_pdf;
    use crate::stamp::stamp_anchors;
    use pretty_assertions::assert_eq;
    use lopdf::dictionary;

    #[test]
    fn test_content_hash_is_sha256_hex() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(content_hash(b"abc").len(), 64);
    }

    #[test]
    fn test_content_hash_is_stable() {
        let pdf = test_pdf::letter(2);
        assert_eq!(content_hash(&pdf), content_hash(&pdf.clone()));
    }

    #[test]
    fn test_content_hash_detects_single_bit_flip() {
        let pdf = test_pdf::letter(1);
        let mut flipped = pdf.clone();
        let middle = flipped.len() / 2;
        flipped[middle] ^= 0x01;
        assert_ne!(content_hash(&pdf), content_hash(&flipped));
    }

    #[test]
    fn test_text_hash_ignores_metadata() {
        let pdf = test_pdf::letter(2);

        let mut doc = lopdf::Document::load_mem(&pdf).unwrap();
        let info_id = doc.add_object(lopdf::dictionary! {
            "Title" => lopdf::Object::string_literal("Contract"),
        });
        doc.trailer.set("Info", info_id);
        let mut with_info = Vec::new();
        doc.save_to(&mut with_info).unwrap();

        assert_ne!(content_hash(&pdf), content_hash(&with_info));
        assert_eq!(text_hash(&pdf).unwrap(), text_hash(&with_info).unwrap());
    }

    #[test]
    fn test_text_hash_sees_stamped_text() {
        let pdf = test_pdf::letter(1);
        let stamped = stamp_anchors(
            &pdf,
            &[Anchor::new("ACME Energy", 100.0, 100.0, "1")],
            CanvasSize::default(),
            RenderMode::Final,
        )
        .unwrap();

        assert_ne!(text_hash(&pdf).unwrap(), text_hash(&stamped).unwrap());
    }

    #[test]
    fn test_text_hash_rejects_garbage() {
        assert!(matches!(
            text_hash(b"not a pdf"),
            Err(AnchorError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_fingerprint_bundles_hashes() {
        let pdf = test_pdf::letter(3);
        let fp = fingerprint(&pdf).unwrap();
        assert_eq!(fp.content_hash, content_hash(&pdf));
        assert_eq!(fp.text_hash, text_hash(&pdf).unwrap());
        assert_eq!(fp.page_count, 3);
    }
}
