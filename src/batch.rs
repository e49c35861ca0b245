//! Independent extractions over many recordings, in parallel.

use std::path::PathBuf;

use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use crate::{ExtractOptions, Gpmf, GpmfError};

/// Extract each path in `paths` on its own, in parallel.
/// Results are returned in input order.
/// A failing recording does not affect the others.
pub fn extract_many(
    paths: &[PathBuf],
    options: &ExtractOptions,
    progress: Option<&ProgressBar>,
) -> Vec<(PathBuf, Result<Gpmf, GpmfError>)> {
    let extract = |path: &PathBuf| (path.to_owned(), Gpmf::with_options(path, options));
    match progress {
        Some(progress) => paths.par_iter()
            .progress_with(progress.to_owned())
            .map(extract)
            .collect(),
        None => paths.par_iter()
            .map(extract)
            .collect(),
    }
}
