//! Opening PDFs and reading page geometry

use crate::coords::PageBox;
use crate::error::AnchorError;
use lopdf::{Document, Object, ObjectId};
use serde::{Deserialize, Serialize};

/// US Letter, used when a page carries no usable MediaBox at all
const LETTER: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Page-tree depth guard against cyclic Parent links
const MAX_INHERIT_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub page_count: u32,
    pub pages: Vec<PageSize>,
}

/// Parse PDF bytes into an in-memory document
pub fn load(bytes: &[u8]) -> Result<Document, AnchorError> {
    Document::load_mem(bytes).map_err(|e| AnchorError::MalformedDocument(e.to_string()))
}

/// Parse PDF bytes and return page count
pub fn page_count(bytes: &[u8]) -> Result<u32, AnchorError> {
    let doc = load(bytes)?;
    Ok(doc.get_pages().len() as u32)
}

/// Page count and per-page size in points, as displayed (after `/Rotate`)
pub fn inspect(bytes: &[u8]) -> Result<DocumentInfo, AnchorError> {
    let doc = load(bytes)?;
    let pages: Vec<PageSize> = doc
        .get_pages()
        .values()
        .map(|&page_id| {
            let page_box = page_box(&doc, page_id);
            PageSize {
                width: page_box.visual_width(),
                height: page_box.visual_height(),
            }
        })
        .collect();

    Ok(DocumentInfo {
        page_count: pages.len() as u32,
        pages,
    })
}

/// Visible box of a page: CropBox if present and valid, else MediaBox,
/// together with the page's display rotation.
///
/// All three keys are inheritable from ancestor page-tree nodes.
pub fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let rect = inherited_rect(doc, page_id, b"CropBox")
        .or_else(|| inherited_rect(doc, page_id, b"MediaBox"))
        .unwrap_or_else(|| {
            tracing::warn!(?page_id, "page has no MediaBox, assuming US Letter");
            LETTER
        });
    PageBox::from_rect(rect).with_rotation(page_rotation(doc, page_id))
}

/// Raw `/Rotate` in degrees; absent or non-numeric means unrotated
fn page_rotation(doc: &Document, page_id: ObjectId) -> i64 {
    inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| resolve(doc, obj))
        .and_then(number)
        .filter(|degrees| degrees.is_finite())
        .map(|degrees| degrees.round() as i64)
        .unwrap_or(0)
}

fn inherited_rect(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<[f64; 4]> {
    inherited_attribute(doc, page_id, key).and_then(|obj| parse_rect(doc, obj))
}

/// Look up `key` on the page or the nearest ancestor that defines it
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node_id = page_id;
    for _ in 0..MAX_INHERIT_DEPTH {
        let node = doc.get_object(node_id).ok()?.as_dict().ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        node_id = node.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

/// Follow a reference to the object it names, or return the object itself
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn parse_rect(doc: &Document, obj: &Object) -> Option<[f64; 4]> {
    let items = resolve(doc, obj)?.as_array().ok()?;
    if items.len() != 4 {
        return None;
    }

    let mut rect = [0.0; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        *slot = number(resolve(doc, item)?)?;
    }

    let page_box = PageBox::from_rect(rect);
    if page_box.width() > 0.0 && page_box.height() > 0.0 {
        Some(rect)
    } else {
        None
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}
