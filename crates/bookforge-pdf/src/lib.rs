//! # bookforge-pdf
//!
//! lopdf-backed document adapter for the boundary detector.
//!
//! [`PdfBook`] opens a PDF once and exposes it through
//! [`SourceDocument`](bookforge_detect::SourceDocument): per-page plain
//! text, the outline (bookmark) tree flattened to `(level, title, page)`
//! entries, and contiguous page-range export to standalone PDF files.
//!
//! Text extraction failures on individual pages degrade to empty text with
//! a warning instead of aborting: a scanned page simply matches no
//! heuristic, and the fatal "no structure at all" case is diagnosed by the
//! caller with an OCR hint.

use std::path::Path;

use lopdf::Document;
use thiserror::Error;

use bookforge_detect::{OutlineEntry, SourceDocument};

mod outline;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("failed to open PDF: {0}")]
    Open(String),

    #[error("PDF is encrypted; decrypt it before splitting")]
    Encrypted,

    #[error("PDF has no pages")]
    Empty,

    #[error("invalid page range {start}..={end} for {pages} pages")]
    BadRange { start: usize, end: usize, pages: usize },

    #[error("failed to save PDF: {0}")]
    Save(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// A loaded PDF, read-only for the duration of processing.
#[derive(Debug)]
pub struct PdfBook {
    doc: Document,
    page_count: usize,
}

impl PdfBook {
    /// Loads the document and verifies it is usable for splitting.
    pub fn open(path: &Path) -> Result<Self> {
        let doc = Document::load(path).map_err(|e| PdfError::Open(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }
        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::Empty);
        }
        log::debug!("opened {} ({} pages)", path.display(), page_count);
        Ok(Self { doc, page_count })
    }

    /// Writes the inclusive 0-based page interval `[start, end]` to a new
    /// standalone PDF at `outfile`.
    ///
    /// Works on a clone of the in-memory document: pages outside the
    /// interval are deleted and unreferenced objects pruned before saving,
    /// so repeated exports from one `PdfBook` are independent and
    /// byte-for-byte reproducible.
    pub fn save_range(&self, start: usize, end: usize, outfile: &Path) -> Result<()> {
        if start > end || end >= self.page_count {
            return Err(PdfError::BadRange { start, end, pages: self.page_count });
        }

        let mut out = self.doc.clone();
        // lopdf page numbers are 1-based.
        let doomed: Vec<u32> = (0..self.page_count)
            .filter(|&idx| idx < start || idx > end)
            .map(|idx| idx as u32 + 1)
            .collect();
        if !doomed.is_empty() {
            out.delete_pages(&doomed);
        }
        out.prune_objects();
        out.save(outfile).map_err(|e| PdfError::Save(e.to_string()))?;
        Ok(())
    }
}

impl SourceDocument for PdfBook {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_text(&self, index: usize) -> String {
        let page_number = index as u32 + 1;
        match self.doc.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("text extraction failed on page {page_number}: {e}");
                String::new()
            }
        }
    }

    fn outline(&self) -> Vec<OutlineEntry> {
        outline::outline_entries(&self.doc)
    }
}
