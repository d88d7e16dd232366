use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use bookforge_build::VersionBuilder;
use bookforge_detect::{
    build_chapter_ranges, detect_chapter_starts, find_exercise_start, slugify, ChapterRange,
    ExerciseHeuristics, SourceDocument,
};
use bookforge_pdf::PdfBook;

#[derive(Parser)]
#[command(name = "bookforge")]
#[command(about = "Authoring tools for a LaTeX textbook/solutions manual", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a PDF into one file per detected chapter
    Chapters {
        /// Input PDF path
        #[arg(value_name = "PDF")]
        pdf: PathBuf,
        /// Output directory (default: <stem>_chapters next to the input)
        #[arg(long)]
        outdir: Option<PathBuf>,
        /// Print the detected ranges as JSON instead of writing PDFs
        #[arg(long)]
        json: bool,
    },
    /// Extract each chapter's end-of-chapter exercise pages
    Exercises {
        /// Input PDF path
        #[arg(value_name = "PDF")]
        pdf: PathBuf,
        /// Output directory (default: <stem>_exercises next to the input)
        #[arg(long)]
        outdir: Option<PathBuf>,
        /// Headings that mark an exercise section
        #[arg(long, num_args = 1..)]
        keywords: Vec<String>,
        /// Minimum number of '<chapter>.<n>' lines for the density fallback
        #[arg(long, default_value_t = 2)]
        min_num_count: usize,
        /// Print the detected ranges as JSON instead of writing PDFs
        #[arg(long)]
        json: bool,
    },
    /// Build the book twice: with problem statements and solutions-only
    Versions {
        /// Root .tex file carrying the \showproblems conditional
        #[arg(value_name = "TEX")]
        tex: PathBuf,
        /// Output directory (default: output/ next to the source)
        #[arg(long)]
        outdir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Chapters { pdf, outdir, json } => split_chapters(&pdf, outdir, json),
        Commands::Exercises {
            pdf,
            outdir,
            keywords,
            min_num_count,
            json,
        } => {
            let mut heuristics = ExerciseHeuristics::default();
            if !keywords.is_empty() {
                heuristics.keywords = keywords;
            }
            heuristics.min_numbered_lines = min_num_count;
            split_exercises(&pdf, outdir, &heuristics, json)
        }
        Commands::Versions { tex, outdir } => build_versions(&tex, outdir),
    }
}

/// Opens the input and resolves its chapter ranges, or fails with the
/// appropriate fatal diagnosis.
fn chapter_ranges(pdf: &Path) -> Result<(PdfBook, Vec<ChapterRange>)> {
    if !pdf.exists() {
        bail!("file not found: {}", pdf.display());
    }
    let book = PdfBook::open(pdf).with_context(|| format!("opening {}", pdf.display()))?;

    let starts = detect_chapter_starts(&book);
    if starts.is_empty() {
        bail!(
            "could not detect chapter starts in {} (no usable outline, no 'Chapter N' \
             headings). If the document is scanned, OCR it first and retry.",
            pdf.display()
        );
    }

    let ranges = build_chapter_ranges(&starts, book.page_count());
    if ranges.is_empty() {
        bail!("could not build chapter ranges from {} detected starts", starts.len());
    }
    Ok((book, ranges))
}

fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("book")
}

fn resolve_outdir(pdf: &Path, outdir: Option<PathBuf>, suffix: &str) -> PathBuf {
    outdir.unwrap_or_else(|| {
        pdf.parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("{}_{}", file_stem(pdf), suffix))
    })
}

fn split_chapters(pdf: &Path, outdir: Option<PathBuf>, json: bool) -> Result<()> {
    let (book, ranges) = chapter_ranges(pdf)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ranges)?);
        return Ok(());
    }

    let outdir = resolve_outdir(pdf, outdir, "chapters");
    std::fs::create_dir_all(&outdir).with_context(|| format!("creating {}", outdir.display()))?;

    for range in &ranges {
        let outfile = outdir.join(chapter_filename(file_stem(pdf), range, false));
        book.save_range(range.start, range.end, &outfile)
            .with_context(|| format!("writing {}", outfile.display()))?;
        println!(
            "Wrote: {}  (chapter {:02}, pages {}-{})",
            outfile.display(),
            range.number,
            range.start + 1,
            range.end + 1
        );
    }
    Ok(())
}

/// One row of the `exercises --json` summary.
#[derive(Serialize)]
struct ExerciseSummary {
    chapter: u32,
    title: String,
    start: usize,
    end: usize,
    exercises_start: Option<usize>,
}

fn split_exercises(
    pdf: &Path,
    outdir: Option<PathBuf>,
    heuristics: &ExerciseHeuristics,
    json: bool,
) -> Result<()> {
    let (book, ranges) = chapter_ranges(pdf)?;

    if json {
        let summary: Vec<ExerciseSummary> = ranges
            .iter()
            .map(|range| ExerciseSummary {
                chapter: range.number,
                title: range.title.clone(),
                start: range.start,
                end: range.end,
                exercises_start: find_exercise_start(&book, range, heuristics),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let outdir = resolve_outdir(pdf, outdir, "exercises");
    std::fs::create_dir_all(&outdir).with_context(|| format!("creating {}", outdir.display()))?;

    let mut wrote_any = false;
    for range in &ranges {
        let Some(exercises_start) = find_exercise_start(&book, range, heuristics) else {
            log::warn!(
                "chapter {:02}: no exercise section detected (pages {}-{}, title {:?})",
                range.number,
                range.start + 1,
                range.end + 1,
                range.title
            );
            continue;
        };

        let outfile = outdir.join(chapter_filename(file_stem(pdf), range, true));
        book.save_range(exercises_start, range.end, &outfile)
            .with_context(|| format!("writing {}", outfile.display()))?;
        wrote_any = true;
        println!(
            "Wrote: {}  (chapter {:02}, pages {}-{})",
            outfile.display(),
            range.number,
            exercises_start + 1,
            range.end + 1
        );
    }

    if !wrote_any {
        log::warn!(
            "no exercise sections found in any chapter; try adjusting --keywords or --min-num-count"
        );
    }
    Ok(())
}

/// `<stem>_Chapter-NN_<slug>.pdf`, with an `_Exercises` suffix for the
/// exercise-extraction mode.
fn chapter_filename(stem: &str, range: &ChapterRange, exercises: bool) -> String {
    let fallback = if exercises { "Exercises" } else { "Chapter" };
    let slug = slugify(&range.title, fallback);
    if exercises {
        format!("{}_Chapter-{:02}_{}_Exercises.pdf", stem, range.number, slug)
    } else {
        format!("{}_Chapter-{:02}_{}.pdf", stem, range.number, slug)
    }
}

fn build_versions(tex: &Path, outdir: Option<PathBuf>) -> Result<()> {
    let outdir = outdir.unwrap_or_else(|| {
        tex.parent().unwrap_or_else(|| Path::new(".")).join("output")
    });
    let builder = VersionBuilder::new(tex, &outdir)?;
    let report = builder.build_both()?;

    if let Some(path) = &report.with_problems {
        println!("Wrote: {}", path.display());
    }
    if let Some(path) = &report.solutions_only {
        println!("Wrote: {}", path.display());
    }
    if !report.built_any() {
        bail!("neither book version compiled; see the log output above");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(number: u32, title: &str) -> ChapterRange {
        ChapterRange {
            number,
            start: 0,
            end: 9,
            title: title.to_string(),
        }
    }

    #[test]
    fn test_chapter_filename_format() {
        let r = range(3, "Chapter 3: Limits & Continuity");
        assert_eq!(
            chapter_filename("apostol", &r, false),
            "apostol_Chapter-03_Chapter-3-Limits-Continuity.pdf"
        );
        assert_eq!(
            chapter_filename("apostol", &r, true),
            "apostol_Chapter-03_Chapter-3-Limits-Continuity_Exercises.pdf"
        );
    }

    #[test]
    fn test_chapter_filename_empty_title_fallbacks() {
        let r = range(12, "");
        assert_eq!(
            chapter_filename("book", &r, false),
            "book_Chapter-12_Chapter.pdf"
        );
        assert_eq!(
            chapter_filename("book", &r, true),
            "book_Chapter-12_Exercises_Exercises.pdf"
        );
    }

    #[test]
    fn test_resolve_outdir_defaults_next_to_input() {
        let out = resolve_outdir(Path::new("/books/apostol.pdf"), None, "chapters");
        assert_eq!(out, PathBuf::from("/books/apostol_chapters"));

        let explicit = resolve_outdir(
            Path::new("/books/apostol.pdf"),
            Some(PathBuf::from("/tmp/out")),
            "chapters",
        );
        assert_eq!(explicit, PathBuf::from("/tmp/out"));
    }
}
