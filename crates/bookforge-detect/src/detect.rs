use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{ChapterRange, ChapterStart, SourceDocument};

/// Number of leading lines inspected per page when looking for headings.
pub const TOP_LINES: usize = 25;

/// Heading keywords that mark the start of an exercise/problem section.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "Exercises",
    "PROBLEMS",
    "Problems",
    "Review Exercises",
    "Review Questions",
    "Exercises and Problems",
];

/// Chapter heading patterns, tried in order against a trimmed line or title.
///
/// The last pattern (numeric first-level style, e.g. "1 Probability Theory")
/// also matches a numbered theorem heading sitting at the top of a page.
/// That false-positive source is a known property of the heuristic and is
/// kept rather than worked around.
static CHAPTER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)^\s*Chapter\s+(\d+)\b").unwrap(),
        Regex::new(r"^\s*CHAPTER\s+(\d+)\b").unwrap(),
        Regex::new(r"^\s*(\d+)\s+[A-Z][A-Za-z].*").unwrap(),
    ]
});

/// Parses a chapter number from a heading line or outline title.
///
/// The first pattern that matches decides; a match whose digits overflow
/// yields `None` rather than falling through to later patterns.
fn parse_chapter_number(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    for rx in CHAPTER_PATTERNS.iter() {
        if let Some(cap) = rx.captures(trimmed) {
            return cap.get(1).and_then(|m| m.as_str().parse().ok());
        }
    }
    None
}

/// Tuning knobs for exercise boundary detection.
#[derive(Debug, Clone)]
pub struct ExerciseHeuristics {
    /// Heading keywords compared case-insensitively as line prefixes.
    pub keywords: Vec<String>,
    /// Minimum count of `<chapter>.<item>` lines for the density tier.
    pub min_numbered_lines: usize,
    /// Leading lines of a page inspected for heading keywords.
    pub top_lines: usize,
}

impl Default for ExerciseHeuristics {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            min_numbered_lines: 2,
            top_lines: TOP_LINES,
        }
    }
}

/// Extracts chapter starts from the document outline.
///
/// Only top-level (level 1) entries are considered. Titles that do not
/// parse to a chapter number get sequential fallback numbering; duplicate
/// numbers keep the first entry. The result is sorted by page ascending.
pub fn chapter_starts_from_outline(doc: &dyn SourceDocument) -> Vec<ChapterStart> {
    let mut chapters: Vec<ChapterStart> = Vec::new();
    let mut seen: HashSet<u32> = HashSet::new();

    for entry in doc.outline() {
        if entry.level != 1 {
            continue;
        }
        // Outline targets are 1-based; 0 is malformed metadata.
        if entry.page == 0 {
            log::warn!("outline entry {:?} has no page target; ignoring", entry.title);
            continue;
        }
        let title = entry.title.trim().to_string();
        let number =
            parse_chapter_number(&title).unwrap_or_else(|| chapters.len() as u32 + 1);
        if !seen.insert(number) {
            continue;
        }
        chapters.push(ChapterStart {
            number,
            page: (entry.page - 1) as usize,
            title,
        });
    }

    chapters.sort_by_key(|c| c.page);
    chapters
}

/// Scans page text for chapter headings when the outline is unusable.
///
/// Only the leading lines of each page are inspected, which keeps in-body
/// numbered references from registering as chapter starts. The first page
/// on which a chapter number appears wins; the result is sorted by chapter
/// number.
pub fn chapter_starts_from_scan(doc: &dyn SourceDocument) -> Vec<ChapterStart> {
    let mut found: BTreeMap<u32, ChapterStart> = BTreeMap::new();

    for page in 0..doc.page_count() {
        let text = doc.page_text(page);
        for line in text.lines().take(TOP_LINES) {
            let line = line.trim();
            if let Some(number) = parse_chapter_number(line) {
                found.entry(number).or_insert_with(|| ChapterStart {
                    number,
                    page,
                    title: line.to_string(),
                });
                break;
            }
        }
    }

    found.into_values().collect()
}

/// Runs the start-detection strategies in order.
///
/// The outline is authoritative when it yields at least two starts. A
/// thinner outline triggers the page scan; if the scan comes back empty,
/// whatever the outline produced is kept so a single-chapter document can
/// still be split. An empty result overall is the caller's fatal case.
pub fn detect_chapter_starts(doc: &dyn SourceDocument) -> Vec<ChapterStart> {
    let from_outline = chapter_starts_from_outline(doc);
    if from_outline.len() >= 2 {
        return from_outline;
    }

    log::info!(
        "outline yielded {} chapter starts; scanning page text",
        from_outline.len()
    );
    let scanned = chapter_starts_from_scan(doc);
    if scanned.is_empty() {
        from_outline
    } else {
        scanned
    }
}

/// Converts an ordered start list into contiguous page ranges.
///
/// Each range ends one page before the next start by page order; the final
/// range ends at the document's last page. A start that would produce
/// `end < start` (duplicate or out-of-order start pages) is dropped.
pub fn build_chapter_ranges(starts: &[ChapterStart], total_pages: usize) -> Vec<ChapterRange> {
    if total_pages == 0 {
        return Vec::new();
    }

    let mut by_page: Vec<&ChapterStart> = starts.iter().collect();
    by_page.sort_by_key(|s| s.page);

    let mut ranges = Vec::new();
    for (i, start) in by_page.iter().enumerate() {
        let end = match by_page.get(i + 1) {
            Some(next) => match next.page.checked_sub(1) {
                Some(end) => end,
                None => continue,
            },
            None => total_pages - 1,
        };
        if end >= start.page {
            ranges.push(ChapterRange {
                number: start.number,
                start: start.page,
                end,
                title: start.title.clone(),
            });
        }
    }
    ranges
}

/// Checks whether a page's leading lines start with a heading keyword.
pub fn page_has_heading(text: &str, keywords: &[String], top_lines: usize) -> bool {
    text.lines().take(top_lines).map(str::trim).any(|line| {
        let lower = line.to_lowercase();
        keywords.iter().any(|kw| lower.starts_with(&kw.to_lowercase()))
    })
}

/// Locates the exercise boundary inside one chapter range.
///
/// Tier 1 scans forward for an explicit heading keyword near the top of a
/// page; an explicit heading always wins. Tier 2 scans backward from the
/// chapter end for the latest page holding enough `<chapter>.<item>` lines
/// (exercise lists sit near a chapter's end, and scanning back-to-front
/// avoids matching numbered examples earlier in the chapter). When the page
/// immediately before the dense page carries a heading keyword, that
/// earlier page is the true boundary: the heading precedes the numbering
/// that begins mid-section.
///
/// Returns `None` when neither tier matches; the caller skips the chapter.
pub fn find_exercise_start(
    doc: &dyn SourceDocument,
    range: &ChapterRange,
    heuristics: &ExerciseHeuristics,
) -> Option<usize> {
    for page in range.start..=range.end {
        if page_has_heading(&doc.page_text(page), &heuristics.keywords, heuristics.top_lines) {
            return Some(page);
        }
    }

    let numbered = Regex::new(&format!(r"^\s*{}\.\d+\b", range.number)).unwrap();
    for page in (range.start..=range.end).rev() {
        let text = doc.page_text(page);
        let count = text.lines().filter(|line| numbered.is_match(line.trim())).count();
        if count >= heuristics.min_numbered_lines {
            if page > range.start {
                let prev = doc.page_text(page - 1);
                if page_has_heading(&prev, &heuristics.keywords, heuristics.top_lines) {
                    return Some(page - 1);
                }
            }
            return Some(page);
        }
    }

    None
}
