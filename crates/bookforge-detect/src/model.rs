use serde::{Deserialize, Serialize};

/// One entry of a document's navigation outline (bookmarks).
///
/// `page` is 1-based, matching how navigation targets are stored in
/// document metadata. Detection converts to 0-based page indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: u32,
    pub title: String,
    pub page: u32,
}

/// The first page of a detected chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterStart {
    /// Parsed (or sequentially assigned) chapter number. Unique among the
    /// retained starts; the first occurrence of a number wins.
    pub number: u32,
    /// 0-based page index.
    pub page: usize,
    /// Outline title or the heading line that matched.
    pub title: String,
}

/// A contiguous page interval belonging to one chapter.
///
/// `start` and `end` are 0-based and inclusive, with `start <= end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRange {
    pub number: u32,
    pub start: usize,
    pub end: usize,
    pub title: String,
}

impl ChapterRange {
    pub fn page_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// A paginated document the detector can read.
///
/// Implementations are read-only for the duration of processing. Page text
/// that cannot be extracted (scanned pages, decode failures) is reported as
/// an empty string; the heuristics simply find nothing on such pages.
pub trait SourceDocument {
    fn page_count(&self) -> usize;

    /// Plain text of the page at the given 0-based index.
    fn page_text(&self, index: usize) -> String;

    /// Outline entries in document order, or an empty vector when the
    /// document carries no navigation metadata.
    fn outline(&self) -> Vec<OutlineEntry>;
}
