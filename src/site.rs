//! Directory build: rewrite every HTML file under a source tree.
//!
//! Mirrors `source` into `output`. Files whose extension is listed in
//! [`SiteConfig::extensions`] go through the transformer; everything else is
//! copied byte for byte. Empty directories are recreated.
//!
//! The output directory may not live inside the source directory. Both paths
//! are resolved (symlinks, `.` and `..`) before that check, so `site/..`
//! against `dist` is caught the same as `.` against `dist`.
//!
//! ```text
//! site/                     out/
//! ├── index.html     →      ├── index.html        (rewritten)
//! ├── blog/                 ├── blog/
//! │   └── post.htm   →      │   └── post.htm      (rewritten)
//! └── style.css      →      └── style.css         (copied)
//! ```
//!
//! ## Parallel Processing
//!
//! Files are independent, so they are processed in parallel on the global
//! [rayon](https://docs.rs/rayon) pool. The report lists files in sorted path
//! order regardless of completion order.

use crate::config::SiteConfig;
use crate::finder::{AdaptiveMediaFinder, FileEntryLookup};
use crate::transform::{HtmlContentTransformer, ImageOutcome, ImageStatus};
use rayon::prelude::*;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Output directory {output} is inside source directory {source_dir}")]
    OutputInsideSource { output: PathBuf, source_dir: PathBuf },
}

/// What the build did with one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    Copied,
    Transformed { outcomes: Vec<ImageOutcome> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Path relative to the source directory.
    pub path: PathBuf,
    pub action: FileAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteReport {
    pub files: Vec<FileReport>,
}

impl SiteReport {
    pub fn transformed_files(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.action, FileAction::Transformed { .. }))
            .count()
    }

    pub fn copied_files(&self) -> usize {
        self.files.len() - self.transformed_files()
    }

    pub fn images_replaced(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o.status, ImageStatus::Replaced { .. }))
            .count()
    }

    /// Every image outcome across all rewritten files.
    pub fn outcomes(&self) -> impl Iterator<Item = &ImageOutcome> {
        self.files.iter().flat_map(|f| {
            let outcomes: &[ImageOutcome] = match &f.action {
                FileAction::Transformed { outcomes } => outcomes,
                FileAction::Copied => &[],
            };
            outcomes
        })
    }
}

pub fn build_site<L, F>(
    transformer: &HtmlContentTransformer<L, F>,
    source: &Path,
    output: &Path,
    site: &SiteConfig,
) -> Result<SiteReport, SiteError>
where
    L: FileEntryLookup,
    F: AdaptiveMediaFinder,
{
    if !source.is_dir() {
        return Err(SiteError::SourceNotFound(source.to_path_buf()));
    }
    let source_dir = fs::canonicalize(source)?;
    let resolved_output = resolve_path(output)?;
    if resolved_output.starts_with(&source_dir) {
        return Err(SiteError::OutputInsideSource {
            output: resolved_output,
            source_dir,
        });
    }

    fs::create_dir_all(output)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| entry.path().to_path_buf());
        if entry.file_type().is_dir() {
            fs::create_dir_all(output.join(&rel))?;
        } else {
            files.push(rel);
        }
    }

    let files = files
        .par_iter()
        .map(|rel| build_file(transformer, source, output, rel, site))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SiteReport { files })
}

/// Canonical form of a path that may not exist yet.
///
/// The longest existing prefix is canonicalized; the missing tail is
/// appended with `..` folded lexically.
fn resolve_path(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let parts: Vec<Component<'_>> = absolute.components().collect();
    for split in (1..=parts.len()).rev() {
        let prefix: PathBuf = parts[..split].iter().collect();
        let Ok(mut resolved) = fs::canonicalize(&prefix) else {
            continue;
        };
        for part in &parts[split..] {
            match part {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::CurDir => {}
                other => resolved.push(other),
            }
        }
        return Ok(resolved);
    }
    fs::canonicalize(&absolute)
}

fn build_file<L, F>(
    transformer: &HtmlContentTransformer<L, F>,
    source: &Path,
    output: &Path,
    rel: &Path,
    site: &SiteConfig,
) -> Result<FileReport, SiteError>
where
    L: FileEntryLookup,
    F: AdaptiveMediaFinder,
{
    let src = source.join(rel);
    let dst = output.join(rel);

    if !site.is_rewritten(rel) {
        fs::copy(&src, &dst)?;
        return Ok(FileReport {
            path: rel.to_path_buf(),
            action: FileAction::Copied,
        });
    }

    let action = match String::from_utf8(fs::read(&src)?) {
        Ok(html) => {
            let result = transformer.transform_detailed(&html);
            fs::write(&dst, &result.html)?;
            info!(
                path = %rel.display(),
                images = result.outcomes.len(),
                replaced = result.replaced(),
                "rewrote file"
            );
            FileAction::Transformed {
                outcomes: result.outcomes,
            }
        }
        Err(err) => {
            warn!(path = %rel.display(), "not valid UTF-8, copying unchanged");
            fs::write(&dst, err.into_bytes())?;
            FileAction::Copied
        }
    };

    Ok(FileReport {
        path: rel.to_path_buf(),
        action,
    })
}
