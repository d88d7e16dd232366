//! Outline (bookmark) tree traversal.
//!
//! Walks the catalog's `/Outlines` dictionary through `/First`/`/Next`
//! chains, decoding titles and resolving each entry's destination to a
//! 1-based page number. Entries whose destination cannot be resolved (for
//! example named destinations routed through a `/Names` tree) are skipped;
//! if that leaves the outline too thin the caller's page-scan fallback
//! takes over.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use bookforge_detect::OutlineEntry;

/// Outline trees deeper than this are treated as malformed.
const MAX_DEPTH: u32 = 8;

/// Upper bound on siblings per level, guarding against `/Next` cycles.
const MAX_SIBLINGS: usize = 4096;

pub fn outline_entries(doc: &Document) -> Vec<OutlineEntry> {
    let page_numbers: HashMap<ObjectId, u32> =
        doc.get_pages().iter().map(|(number, id)| (*id, *number)).collect();

    let mut entries = Vec::new();
    let root = doc
        .catalog()
        .ok()
        .and_then(|catalog| catalog.get(b"Outlines").ok())
        .and_then(|obj| obj.as_reference().ok())
        .and_then(|id| doc.get_dictionary(id).ok());
    let Some(root) = root else {
        return entries;
    };

    if let Some(first) = reference(root.get(b"First").ok()) {
        walk_siblings(doc, &page_numbers, first, 1, &mut entries);
    }
    entries
}

fn walk_siblings(
    doc: &Document,
    page_numbers: &HashMap<ObjectId, u32>,
    first: ObjectId,
    level: u32,
    out: &mut Vec<OutlineEntry>,
) {
    if level > MAX_DEPTH {
        log::warn!("outline nesting exceeds {MAX_DEPTH} levels; truncating");
        return;
    }

    let mut node = first;
    for _ in 0..MAX_SIBLINGS {
        let Ok(dict) = doc.get_dictionary(node) else {
            return;
        };

        let title = dict
            .get(b"Title")
            .ok()
            .and_then(|obj| obj.as_str().ok())
            .map(decode_pdf_string)
            .unwrap_or_default();

        match resolve_destination(doc, page_numbers, dict) {
            Some(page) => out.push(OutlineEntry { level, title, page }),
            None => log::debug!("outline entry {title:?} has no resolvable page; skipping"),
        }

        if let Some(child) = reference(dict.get(b"First").ok()) {
            walk_siblings(doc, page_numbers, child, level + 1, out);
        }

        match reference(dict.get(b"Next").ok()) {
            Some(next) => node = next,
            None => return,
        }
    }
    log::warn!("outline sibling chain exceeds {MAX_SIBLINGS} entries; truncating");
}

/// Resolves an outline item's target to a 1-based page number.
///
/// Handles direct `/Dest` arrays and `/A` GoTo actions carrying a `/D`
/// array. The first array element is the target page: either a page object
/// reference or (from some writers) a 0-based page number.
fn resolve_destination(
    doc: &Document,
    page_numbers: &HashMap<ObjectId, u32>,
    dict: &Dictionary,
) -> Option<u32> {
    let dest = if let Ok(dest) = dict.get(b"Dest") {
        Some(dest)
    } else if let Ok(action) = dict.get(b"A") {
        deref(doc, action)?.as_dict().ok()?.get(b"D").ok()
    } else {
        None
    }?;

    let array = deref(doc, dest)?.as_array().ok()?;
    match array.first()? {
        Object::Reference(id) => page_numbers.get(id).copied(),
        Object::Integer(n) => u32::try_from(*n).ok().map(|page| page + 1),
        _ => None,
    }
}

fn reference(obj: Option<&Object>) -> Option<ObjectId> {
    obj.and_then(|o| o.as_reference().ok())
}

fn deref<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        _ => Some(obj),
    }
}

/// Decodes a PDF text string: UTF-16BE when the BOM is present, otherwise
/// lossy byte decoding.
pub(crate) fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}
