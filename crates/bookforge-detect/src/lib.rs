//! # bookforge-detect
//!
//! Chapter and exercise boundary detection for paginated textbooks.
//!
//! ## Overview
//!
//! This crate locates structure in a book-like document that exposes
//! per-page plain text and (optionally) hierarchical outline metadata:
//!
//! - **Chapter starts**: preferring the document outline when it carries at
//!   least two top-level entries, otherwise scanning the top of every page
//!   for `Chapter N` / `N Title` headings.
//! - **Chapter ranges**: contiguous, non-overlapping page intervals derived
//!   from the ordered start list. Each range ends one page before the next
//!   start, the last range ends at the final page.
//! - **Exercise boundaries**: within a chapter range, the first page of the
//!   end-of-chapter problem section, found by an explicit heading keyword
//!   or, failing that, by the density of `<chapter>.<item>` numbered lines.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐  outline()/page_text()   ┌──────────────────┐
//! │ SourceDocument │ ───────────────────────► │ detect_chapter_  │
//! │ (PDF adapter,  │                          │ starts           │
//! │  test fixture) │                          └────────┬─────────┘
//! └────────────────┘                                   │ Vec<ChapterStart>
//!                                                      ▼
//!                                          build_chapter_ranges
//!                                                      │ Vec<ChapterRange>
//!                                                      ▼
//!                                          find_exercise_start (per range)
//! ```
//!
//! The crate performs no I/O. Documents are accessed through the
//! [`SourceDocument`](model::SourceDocument) trait so every heuristic is
//! testable against in-memory fixtures.

/// Detection heuristics over a [`model::SourceDocument`].
pub mod detect;
/// Data model: outline entries, chapter starts and ranges.
pub mod model;
/// Filesystem-safe title slugs for output filenames.
pub mod slug;

#[cfg(test)]
mod tests;

pub use detect::{
    build_chapter_ranges, chapter_starts_from_outline, chapter_starts_from_scan,
    detect_chapter_starts, find_exercise_start, ExerciseHeuristics, DEFAULT_KEYWORDS,
};
pub use model::{ChapterRange, ChapterStart, OutlineEntry, SourceDocument};
pub use slug::slugify;
