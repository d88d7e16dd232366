//! # bookforge-build
//!
//! Builds the two versions of a solutions book from one LaTeX source: the
//! version that restates each problem before its solution, and the
//! solutions-only version. The root `.tex` file selects between them with
//! a `\showproblemstrue` / `\showproblemsfalse` conditional; this crate
//! rewrites that flag, runs `pdflatex` twice per version (the second pass
//! stabilizes the table of contents), copies each produced PDF into the
//! output directory and removes the auxiliary files afterwards.
//!
//! A compile failure for one version is reported and does not abort the
//! other version.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};

const SHOW_FLAG: &str = r"\showproblemstrue";
const HIDE_FLAG: &str = r"\showproblemsfalse";

/// Extensions of pdflatex auxiliary files removed after the build.
const AUX_EXTENSIONS: &[&str] = &[
    "aux",
    "log",
    "toc",
    "out",
    "fdb_latexmk",
    "fls",
    "synctex.gz",
];

/// Which book version a single compile produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    WithProblems,
    SolutionsOnly,
}

impl Version {
    fn flag(self) -> &'static str {
        match self {
            Version::WithProblems => SHOW_FLAG,
            Version::SolutionsOnly => HIDE_FLAG,
        }
    }

    fn other_flag(self) -> &'static str {
        match self {
            Version::WithProblems => HIDE_FLAG,
            Version::SolutionsOnly => SHOW_FLAG,
        }
    }

    fn output_suffix(self) -> &'static str {
        match self {
            Version::WithProblems => "with_problems",
            Version::SolutionsOnly => "solutions_only",
        }
    }
}

/// Paths of the successfully built PDFs.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub with_problems: Option<PathBuf>,
    pub solutions_only: Option<PathBuf>,
}

impl BuildReport {
    pub fn built_any(&self) -> bool {
        self.with_problems.is_some() || self.solutions_only.is_some()
    }
}

/// Drives the two-version build for one root `.tex` file.
pub struct VersionBuilder {
    tex_path: PathBuf,
    source_dir: PathBuf,
    stem: String,
    outdir: PathBuf,
}

impl VersionBuilder {
    pub fn new(tex_path: &Path, outdir: &Path) -> Result<Self> {
        if !tex_path.exists() {
            bail!("file not found: {}", tex_path.display());
        }
        let source_dir = tex_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let stem = tex_path
            .file_stem()
            .and_then(|s| s.to_str())
            .context("tex path has no usable file stem")?
            .to_string();
        Ok(Self {
            tex_path: tex_path.to_path_buf(),
            source_dir,
            stem,
            outdir: outdir.to_path_buf(),
        })
    }

    /// Builds both versions and cleans up. Per-version failures are logged
    /// and reflected in the report, not returned as errors.
    pub fn build_both(&self) -> Result<BuildReport> {
        fs::create_dir_all(&self.outdir)
            .with_context(|| format!("creating {}", self.outdir.display()))?;

        let mut report = BuildReport::default();
        for version in [Version::WithProblems, Version::SolutionsOnly] {
            match self.build_version(version) {
                Ok(pdf) => {
                    log::info!("built {:?}: {}", version, pdf.display());
                    match version {
                        Version::WithProblems => report.with_problems = Some(pdf),
                        Version::SolutionsOnly => report.solutions_only = Some(pdf),
                    }
                }
                Err(e) => log::error!("{:?} build failed: {:#}", version, e),
            }
        }

        self.clean_aux_files();
        Ok(report)
    }

    fn build_version(&self, version: Version) -> Result<PathBuf> {
        self.set_flag(version)?;
        // Two passes so the TOC the first pass writes is typeset.
        for pass in 1..=2 {
            self.run_pdflatex()
                .with_context(|| format!("pdflatex pass {pass}"))?;
        }

        let produced = self.source_dir.join(format!("{}.pdf", self.stem));
        if !produced.exists() {
            bail!("pdflatex reported success but {} is missing", produced.display());
        }
        let target = self
            .outdir
            .join(format!("{}_{}.pdf", self.stem, version.output_suffix()));
        fs::copy(&produced, &target)
            .with_context(|| format!("copying {} to {}", produced.display(), target.display()))?;
        Ok(target)
    }

    /// Rewrites the `\showproblems` conditional in the root `.tex` file.
    fn set_flag(&self, version: Version) -> Result<()> {
        let content = fs::read_to_string(&self.tex_path)
            .with_context(|| format!("reading {}", self.tex_path.display()))?;
        if !content.contains(SHOW_FLAG) && !content.contains(HIDE_FLAG) {
            log::warn!(
                "{} contains neither {SHOW_FLAG} nor {HIDE_FLAG}; both builds will be identical",
                self.tex_path.display()
            );
            return Ok(());
        }
        let updated = content.replace(version.other_flag(), version.flag());
        if updated != content {
            fs::write(&self.tex_path, updated)
                .with_context(|| format!("writing {}", self.tex_path.display()))?;
        }
        Ok(())
    }

    fn run_pdflatex(&self) -> Result<()> {
        let output = Command::new("pdflatex")
            .arg("-interaction=nonstopmode")
            .arg(&self.tex_path)
            .current_dir(&self.source_dir)
            .output()
            .context("running pdflatex (is a TeX distribution installed?)")?;

        if output.status.success() {
            Ok(())
        } else {
            // pdflatex details go to the .log; stderr usually only has the exit reason.
            bail!(
                "pdflatex exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
    }

    fn clean_aux_files(&self) {
        for ext in AUX_EXTENSIONS {
            let path = self.source_dir.join(format!("{}.{}", self.stem, ext));
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    log::warn!("could not remove {}: {}", path.display(), e);
                }
            }
        }
    }
}
