//! Descriptor discovery.

use std::path::Path;

use walkdir::WalkDir;

use crate::job::ConversionJob;

/// Walks the material tree and returns one pending job per `.vmt` file
/// (case-insensitive extension), sorted for deterministic ordering.
pub fn scan_descriptors(root: &Path) -> Vec<ConversionJob> {
    let mut jobs: Vec<ConversionJob> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("vmt"))
        })
        .map(|e| {
            let source = e.path().to_path_buf();
            let relative = source
                .strip_prefix(root)
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|_| source.clone());
            ConversionJob::new(source, relative)
        })
        .collect();

    jobs.sort_by(|a, b| a.source.cmp(&b.source));
    jobs
}
