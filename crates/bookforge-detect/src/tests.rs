use crate::detect::{
    build_chapter_ranges, chapter_starts_from_outline, chapter_starts_from_scan,
    detect_chapter_starts, find_exercise_start, page_has_heading, ExerciseHeuristics,
};
use crate::model::{ChapterRange, ChapterStart, OutlineEntry, SourceDocument};

/// In-memory document fixture.
struct FakeBook {
    pages: Vec<String>,
    outline: Vec<OutlineEntry>,
}

impl FakeBook {
    fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            outline: Vec::new(),
        }
    }

    fn with_outline(mut self, outline: Vec<(u32, &str, u32)>) -> Self {
        self.outline = outline
            .into_iter()
            .map(|(level, title, page)| OutlineEntry {
                level,
                title: title.to_string(),
                page,
            })
            .collect();
        self
    }
}

impl SourceDocument for FakeBook {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> String {
        self.pages.get(index).cloned().unwrap_or_default()
    }

    fn outline(&self) -> Vec<OutlineEntry> {
        self.outline.clone()
    }
}

fn blank_pages(count: usize) -> Vec<&'static str> {
    vec![""; count]
}

#[test]
fn test_outline_starts_sorted_by_page() {
    let book = FakeBook::new(&blank_pages(40)).with_outline(vec![
        (1, "Chapter 2 Sequences", 15),
        (1, "Chapter 1 The Real Numbers", 3),
        (1, "Chapter 3 Series", 28),
    ]);

    let starts = chapter_starts_from_outline(&book);
    assert_eq!(starts.len(), 3);
    assert_eq!(
        starts.iter().map(|s| (s.number, s.page)).collect::<Vec<_>>(),
        vec![(1, 2), (2, 14), (3, 27)]
    );
}

#[test]
fn test_outline_ignores_deeper_levels() {
    let book = FakeBook::new(&blank_pages(30)).with_outline(vec![
        (1, "Chapter 1 Sets", 1),
        (2, "1.1 Unions", 2),
        (2, "1.2 Intersections", 4),
        (1, "Chapter 2 Functions", 10),
    ]);

    let starts = chapter_starts_from_outline(&book);
    assert_eq!(starts.len(), 2);
    assert_eq!(starts[0].title, "Chapter 1 Sets");
    assert_eq!(starts[1].title, "Chapter 2 Functions");
}

#[test]
fn test_outline_duplicate_number_keeps_first() {
    let book = FakeBook::new(&blank_pages(30)).with_outline(vec![
        (1, "Chapter 4 Integration", 5),
        (1, "Chapter 4 Integration (cont.)", 12),
    ]);

    let starts = chapter_starts_from_outline(&book);
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].page, 4);
}

#[test]
fn test_outline_unnumbered_titles_get_sequential_numbers() {
    let book = FakeBook::new(&blank_pages(20)).with_outline(vec![
        (1, "Preface", 1),
        (1, "Acknowledgements", 3),
    ]);

    let starts = chapter_starts_from_outline(&book);
    assert_eq!(
        starts.iter().map(|s| s.number).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[test]
fn test_scan_finds_chapter_headings_near_top() {
    let mut pages = blank_pages(12);
    pages[2] = "Chapter 1\nThe Real Numbers\nWe begin with the axioms.";
    pages[7] = "CHAPTER 2\nSequences";

    let book = FakeBook::new(&pages);
    let starts = chapter_starts_from_scan(&book);
    assert_eq!(
        starts.iter().map(|s| (s.number, s.page)).collect::<Vec<_>>(),
        vec![(1, 2), (2, 7)]
    );
}

#[test]
fn test_scan_numeric_heading_style() {
    let mut pages = blank_pages(10);
    pages[1] = "1 Probability Theory\nThe sample space is a set.";
    pages[6] = "2 Random Variables\nA random variable is a function.";

    let starts = chapter_starts_from_scan(&FakeBook::new(&pages));
    assert_eq!(starts.len(), 2);
    assert_eq!(starts[0].title, "1 Probability Theory");
}

#[test]
fn test_scan_first_page_per_chapter_wins() {
    let mut pages = blank_pages(10);
    pages[2] = "Chapter 1 Sets";
    // Running heads repeat the chapter heading on later pages.
    pages[3] = "Chapter 1 Sets";
    pages[4] = "Chapter 1 Sets";

    let starts = chapter_starts_from_scan(&FakeBook::new(&pages));
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].page, 2);
}

#[test]
fn test_scan_ignores_headings_below_window() {
    let deep = format!("{}\nChapter 1 Hidden", "filler\n".repeat(30));
    let book = FakeBook::new(&[deep.as_str()]);
    assert!(chapter_starts_from_scan(&book).is_empty());
}

#[test]
fn test_detect_prefers_outline() {
    let mut pages = blank_pages(20);
    // Scan would find chapter 9 here; the outline should win.
    pages[0] = "Chapter 9 Wrong";

    let book = FakeBook::new(&pages).with_outline(vec![
        (1, "Chapter 1 A", 2),
        (1, "Chapter 2 B", 11),
    ]);
    let starts = detect_chapter_starts(&book);
    assert_eq!(
        starts.iter().map(|s| s.number).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[test]
fn test_detect_falls_back_to_scan_on_thin_outline() {
    let mut pages = blank_pages(20);
    pages[1] = "Chapter 1 A";
    pages[10] = "Chapter 2 B";

    let book =
        FakeBook::new(&pages).with_outline(vec![(1, "Frontmatter", 1)]);
    let starts = detect_chapter_starts(&book);
    assert_eq!(starts.len(), 2);
    assert_eq!(starts[0].page, 1);
}

#[test]
fn test_detect_keeps_single_outline_start_when_scan_is_empty() {
    let book = FakeBook::new(&blank_pages(8))
        .with_outline(vec![(1, "Chapter 1 Everything", 1)]);
    let starts = detect_chapter_starts(&book);
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].number, 1);
}

#[test]
fn test_detect_empty_document_yields_no_starts() {
    let book = FakeBook::new(&blank_pages(5));
    assert!(detect_chapter_starts(&book).is_empty());
}

#[test]
fn test_ranges_partition_document() {
    let starts = vec![
        ChapterStart { number: 1, page: 0, title: "A".into() },
        ChapterStart { number: 2, page: 10, title: "B".into() },
        ChapterStart { number: 3, page: 25, title: "C".into() },
    ];
    let ranges = build_chapter_ranges(&starts, 30);
    assert_eq!(
        ranges.iter().map(|r| (r.start, r.end)).collect::<Vec<_>>(),
        vec![(0, 9), (10, 24), (25, 29)]
    );
    // Contiguity: each range begins where the previous one ended.
    for pair in ranges.windows(2) {
        assert_eq!(pair[0].end + 1, pair[1].start);
    }
}

#[test]
fn test_ranges_drop_degenerate_starts() {
    let starts = vec![
        ChapterStart { number: 1, page: 5, title: "A".into() },
        ChapterStart { number: 2, page: 5, title: "B".into() },
    ];
    // Two starts on the same page: the first would end at page 4 < 5.
    let ranges = build_chapter_ranges(&starts, 10);
    assert_eq!(ranges.len(), 1);
    assert_eq!((ranges[0].start, ranges[0].end), (5, 9));
}

#[test]
fn test_ranges_empty_inputs() {
    assert!(build_chapter_ranges(&[], 30).is_empty());
    let starts = vec![ChapterStart { number: 1, page: 0, title: "A".into() }];
    assert!(build_chapter_ranges(&starts, 0).is_empty());
}

#[test]
fn test_heading_match_is_case_insensitive_prefix() {
    let keywords: Vec<String> = vec!["Exercises".into()];
    assert!(page_has_heading("EXERCISES 3.1\n1. Prove that...", &keywords, 25));
    assert!(page_has_heading("intro line\nexercises\nmore", &keywords, 25));
    assert!(!page_has_heading("See the exercises at the end.", &keywords, 25));
}

fn range(number: u32, start: usize, end: usize) -> ChapterRange {
    ChapterRange {
        number,
        start,
        end,
        title: format!("Chapter {number}"),
    }
}

#[test]
fn test_exercise_heading_tier_wins() {
    let mut pages = blank_pages(10);
    pages[3] = "Exercises\n3.1 Prove the triangle inequality.";
    // Denser numbering later in the chapter must not override the heading.
    pages[7] = "3.4 ...\n3.5 ...\n3.6 ...";

    let book = FakeBook::new(&pages);
    let found = find_exercise_start(&book, &range(3, 0, 9), &ExerciseHeuristics::default());
    assert_eq!(found, Some(3));
}

#[test]
fn test_exercise_density_tier_picks_latest_dense_page() {
    let mut pages = blank_pages(12);
    pages[4] = "7.1 An early example.\nDiscussion follows.";
    pages[9] = "7.2 First problem.\n7.3 Second problem.";
    pages[10] = "7.10 More problems.\n7.11 And more.";

    let book = FakeBook::new(&pages);
    let found = find_exercise_start(&book, &range(7, 0, 11), &ExerciseHeuristics::default());
    assert_eq!(found, Some(10));
}

#[test]
fn test_heading_page_before_dense_numbering_is_selected() {
    let mut pages = blank_pages(12);
    // Section heading on page 8, dense numbering starting on page 9. The
    // boundary is the heading page, not the first dense page.
    pages[8] = "Problems for Chapter 7";
    pages[9] = "7.2 First problem.\n7.3 Second problem.";

    let book = FakeBook::new(&pages);
    let found = find_exercise_start(&book, &range(7, 0, 11), &ExerciseHeuristics::default());
    assert_eq!(found, Some(8));
}

#[test]
fn test_exercise_density_preceding_page_check() {
    let mut pages = blank_pages(12);
    pages[8] = "Übungen\nsome text"; // not a known keyword
    pages[9] = "7.2 First problem.\n7.3 Second problem.";

    let book = FakeBook::new(&pages);
    let found = find_exercise_start(&book, &range(7, 0, 11), &ExerciseHeuristics::default());
    assert_eq!(found, Some(9));
}

#[test]
fn test_exercise_density_respects_minimum() {
    let mut pages = blank_pages(10);
    pages[6] = "5.1 A single numbered line.";

    let book = FakeBook::new(&pages);
    let found = find_exercise_start(&book, &range(5, 0, 9), &ExerciseHeuristics::default());
    assert_eq!(found, None);

    let relaxed = ExerciseHeuristics {
        min_numbered_lines: 1,
        ..ExerciseHeuristics::default()
    };
    assert_eq!(find_exercise_start(&book, &range(5, 0, 9), &relaxed), Some(6));
}

#[test]
fn test_exercise_number_pattern_is_chapter_specific() {
    let mut pages = blank_pages(10);
    // Chapter 12's numbering must not match chapter 1 ("12.3" vs "1.x").
    pages[7] = "12.3 Problem.\n12.10 Problem.";

    let book = FakeBook::new(&pages);
    assert_eq!(
        find_exercise_start(&book, &range(1, 0, 9), &ExerciseHeuristics::default()),
        None
    );
    assert_eq!(
        find_exercise_start(&book, &range(12, 0, 9), &ExerciseHeuristics::default()),
        Some(7)
    );
}

#[test]
fn test_detection_is_deterministic() {
    let mut pages = blank_pages(30);
    pages[0] = "Chapter 1 Sets";
    pages[8] = "Exercises\n1.1 ...\n1.2 ...";
    pages[10] = "Chapter 2 Functions";
    pages[27] = "2.4 ...\n2.5 ...";

    let book = FakeBook::new(&pages);
    let heuristics = ExerciseHeuristics::default();

    let run = || {
        let starts = detect_chapter_starts(&book);
        let ranges = build_chapter_ranges(&starts, book.page_count());
        let exercises: Vec<Option<usize>> = ranges
            .iter()
            .map(|r| find_exercise_start(&book, r, &heuristics))
            .collect();
        (starts, ranges, exercises)
    };

    assert_eq!(run(), run());
}
