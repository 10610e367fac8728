//! Stamp anchor text onto PDF pages
//!
//! Every anchor is resolved to its target pages, its canvas point is mapped
//! into each page's space, and its literal text is drawn there in the pass
//! color. Drawing goes into one extra content stream per touched page; the
//! page's existing content is wrapped in `q … Q` so its graphics state cannot
//! leak into the overlay.

use crate::anchor::{Anchor, CanvasSize, RenderMode, TextColor, ANCHOR_FONT_SIZE};
use crate::coords::{canvas_to_page, page_to_user_space};
use crate::document;
use crate::error::AnchorError;
use crate::selector::resolve_pages;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use serde::Serialize;
use std::collections::BTreeMap;

/// Resource name prefix for the overlay font
const FONT_RESOURCE_PREFIX: &str = "FAnchor";

/// Summary of a stamping pass
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StampReport {
    pub page_count: u32,
    pub anchors: usize,
    /// Anchors that resolved to no page and drew nothing
    pub anchors_skipped: usize,
    pub marks_placed: usize,
    pub pages_touched: usize,
}

/// A piece of text positioned in PDF user space
#[derive(Debug, Clone)]
struct Mark {
    text: Vec<u8>,
    x: f32,
    y: f32,
    /// Text matrix rotation so the run reads upright on a rotated page
    direction: [i64; 4],
}

/// Stamp `anchors` onto a copy of `pdf_bytes` and return the new document.
///
/// `canvas` is the viewport the anchors were captured in, unless an anchor
/// carries its own. Fails only when the input is not a readable PDF or the
/// result cannot be written; no partially stamped document is ever returned.
pub fn stamp_anchors(
    pdf_bytes: &[u8],
    anchors: &[Anchor],
    canvas: CanvasSize,
    mode: RenderMode,
) -> Result<Vec<u8>, AnchorError> {
    stamp_anchors_with_report(pdf_bytes, anchors, canvas, mode).map(|(bytes, _)| bytes)
}

/// Same as [`stamp_anchors`], also reporting what was placed
pub fn stamp_anchors_with_report(
    pdf_bytes: &[u8],
    anchors: &[Anchor],
    canvas: CanvasSize,
    mode: RenderMode,
) -> Result<(Vec<u8>, StampReport), AnchorError> {
    let mut doc = document::load(pdf_bytes)?;
    let pages: BTreeMap<u32, ObjectId> = doc.get_pages();
    let total_pages = pages.len() as u32;

    let mut report = StampReport {
        page_count: total_pages,
        anchors: anchors.len(),
        ..Default::default()
    };

    let mut overlays: BTreeMap<u32, Vec<Mark>> = BTreeMap::new();

    for (index, anchor) in anchors.iter().enumerate() {
        let targets = resolve_pages(&anchor.page, total_pages);
        if targets.is_empty() {
            tracing::debug!(anchor = index, selector = %anchor.page, "anchor targets no pages");
            report.anchors_skipped += 1;
            continue;
        }

        let anchor_canvas = anchor.effective_canvas(canvas);

        for page_num in targets {
            let Some(&page_id) = pages.get(&page_num) else {
                tracing::warn!(anchor = index, page = page_num, total_pages, "skipping missing page");
                continue;
            };

            let page_box = document::page_box(&doc, page_id);
            let (page_x, page_y) = canvas_to_page(
                anchor.x,
                anchor.y,
                anchor_canvas.width,
                anchor_canvas.height,
                page_box.visual_width(),
                page_box.visual_height(),
            );
            let (x, y) = page_to_user_space(page_x, page_y, &page_box);

            // Content streams carry single-precision reals
            let (x, y) = (x as f32, y as f32);
            if !(x.is_finite() && y.is_finite()) {
                tracing::warn!(
                    anchor = index,
                    page = page_num,
                    "skipping anchor whose position does not fit a PDF real"
                );
                continue;
            }

            tracing::debug!(
                anchor = index,
                page = page_num,
                x,
                y,
                rotation = page_box.rotation,
                "placing anchor"
            );

            overlays.entry(page_num).or_default().push(Mark {
                text: encode_win_ansi(&anchor.text),
                x,
                y,
                direction: page_box.text_direction(),
            });
            report.marks_placed += 1;
        }
    }

    report.pages_touched = overlays.len();

    if overlays.is_empty() {
        // Nothing to draw, hand back an untouched copy
        return Ok((pdf_bytes.to_vec(), report));
    }

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let color = mode.text_color();

    for (page_num, marks) in &overlays {
        let page_id = pages[page_num];
        apply_overlay(&mut doc, page_id, font_id, marks, color)?;
    }

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| AnchorError::Serialization(e.to_string()))?;

    tracing::debug!(
        marks = report.marks_placed,
        pages = report.pages_touched,
        preview = mode.is_preview(),
        "stamped document"
    );

    Ok((output, report))
}

fn apply_overlay(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    marks: &[Mark],
    color: TextColor,
) -> Result<(), AnchorError> {
    let font_name = register_font(doc, page_id, font_id)?;
    let existing = page_contents(doc, page_id)?;

    let mut operations = Vec::with_capacity(marks.len() * 6 + 3);
    if !existing.is_empty() {
        // Closes the `q` pushed in front of the original content
        operations.push(Operation::new("Q", vec![]));
    }
    operations.push(Operation::new("q", vec![]));
    for mark in marks {
        operations.extend(text_operations(mark, &font_name, color));
    }
    operations.push(Operation::new("Q", vec![]));

    let overlay = encode_stream(operations)?;

    let mut contents = Vec::with_capacity(existing.len() + 2);
    if !existing.is_empty() {
        let save = encode_stream(vec![Operation::new("q", vec![])])?;
        contents.push(Object::Reference(
            doc.add_object(Stream::new(Dictionary::new(), save)),
        ));
        contents.extend(existing);
    }
    contents.push(Object::Reference(
        doc.add_object(Stream::new(Dictionary::new(), overlay)),
    ));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Encode operations as a standalone content stream.
///
/// Readers concatenate a page's streams without separators and the page's
/// own streams may not end in whitespace, so ours are newline-delimited on
/// both sides.
fn encode_stream(operations: Vec<Operation>) -> Result<Vec<u8>, AnchorError> {
    let body = Content { operations }
        .encode()
        .map_err(|e| AnchorError::Serialization(e.to_string()))?;
    let mut bytes = Vec::with_capacity(body.len() + 2);
    bytes.push(b'\n');
    bytes.extend_from_slice(&body);
    bytes.push(b'\n');
    Ok(bytes)
}

fn text_operations(mark: &Mark, font_name: &[u8], color: TextColor) -> Vec<Operation> {
    let [a, b, c, d] = mark.direction;
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(font_name.to_vec()),
                Object::Real(ANCHOR_FONT_SIZE as f32),
            ],
        ),
        Operation::new(
            "rg",
            vec![
                Object::Real(color.r),
                Object::Real(color.g),
                Object::Real(color.b),
            ],
        ),
        Operation::new(
            "Tm",
            vec![
                Object::Integer(a),
                Object::Integer(b),
                Object::Integer(c),
                Object::Integer(d),
                Object::Real(mark.x),
                Object::Real(mark.y),
            ],
        ),
        Operation::new(
            "Tj",
            vec![Object::String(
                mark.text.clone(),
                lopdf::StringFormat::Literal,
            )],
        ),
        Operation::new("ET", vec![]),
    ]
}

/// Current content streams of a page as a flat list of references
fn page_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, AnchorError> {
    let page = doc.get_object(page_id)?.as_dict()?;
    Ok(match page.get(b"Contents").ok() {
        Some(Object::Reference(id)) => match doc.get_object(*id) {
            // Indirect array of streams
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Some(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    })
}

/// Add the overlay font to the page's resources and return its resource name.
///
/// Resources may be inherited or indirect; the effective dictionary is copied
/// onto the page so the addition never leaks into sibling pages.
fn register_font(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
) -> Result<Vec<u8>, AnchorError> {
    let (mut resources, mut fonts) = effective_resources(doc, page_id);

    let name = unique_font_name(&fonts);
    fonts.set(name.clone(), Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Resources", Object::Dictionary(resources));
    Ok(name)
}

/// Owned copies of a page's resource dictionary and its font sub-dictionary
fn effective_resources(doc: &Document, page_id: ObjectId) -> (Dictionary, Dictionary) {
    let resources = match document::inherited_attribute(doc, page_id, b"Resources")
        .and_then(|obj| document::resolve(doc, obj))
    {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };

    let fonts = match resources
        .get(b"Font")
        .ok()
        .and_then(|obj| document::resolve(doc, obj))
    {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };

    (resources, fonts)
}

fn unique_font_name(fonts: &Dictionary) -> Vec<u8> {
    let mut name = FONT_RESOURCE_PREFIX.as_bytes().to_vec();
    let mut suffix = 1;
    while fonts.has(&name) {
        name = format!("{}{}", FONT_RESOURCE_PREFIX, suffix).into_bytes();
        suffix += 1;
    }
    name
}

/// Encode text for a WinAnsiEncoding simple font.
///
/// Line breaks and other control characters become spaces, since an anchor is
/// a single text run. Characters the encoding cannot express become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            c if c.is_control() => b' ',
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        })
        .collect()
}
