//! ABI file scanner - discovers build artifacts and splits them into fragments

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use crate::domain::abi::{CandidateFragment, DefinitionError, InterfaceDefinition};

/// Largest artifact read, in bytes
const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Fragments found by a scan, with where they came from
#[derive(Debug, Default)]
pub struct ScanReport {
    pub fragments: Vec<(CandidateFragment, PathBuf)>,
    pub scanned_files: usize,
    pub errors: Vec<String>,
    pub scan_ms: u128,
}

impl ScanReport {
    pub fn merge(&mut self, other: ScanReport) {
        self.fragments.extend(other.fragments);
        self.scanned_files += other.scanned_files;
        self.errors.extend(other.errors);
    }
}

/// ABI file scanner
pub struct AbiScanner;

impl AbiScanner {
    /// Scan a single root directory for ABI files
    ///
    /// Only `*.json` files somewhere under an `out/` or `artifacts/` directory
    /// are read. A root that is itself a file is read regardless.
    pub fn scan(root: impl AsRef<Path>) -> ScanReport {
        let started = Instant::now();
        let root = root.as_ref();
        let mut report = ScanReport::default();

        if root.is_file() {
            report.scanned_files = 1;
            Self::load_into(root, &mut report);
            report.scan_ms = started.elapsed().as_millis();
            return report;
        }

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !Self::is_ignored_dir(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    report.errors.push(err.to_string());
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if !Self::path_contains_any(path, &["out", "artifacts"]) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(meta) => meta,
                Err(err) => {
                    report.errors.push(format!("{}: {}", path.display(), err));
                    continue;
                }
            };
            if metadata.len() > MAX_FILE_SIZE {
                continue;
            }

            report.scanned_files += 1;
            Self::load_into(path, &mut report);
        }

        report.scan_ms = started.elapsed().as_millis();
        tracing::debug!(
            root = %root.display(),
            files = report.scanned_files,
            fragments = report.fragments.len(),
            errors = report.errors.len(),
            "scanned abi root"
        );
        report
    }

    /// Scan multiple root directories
    pub fn scan_roots(roots: &[PathBuf]) -> ScanReport {
        let started = Instant::now();
        let mut report = ScanReport::default();
        for root in roots {
            report.merge(Self::scan(root));
        }
        report.scan_ms = started.elapsed().as_millis();
        report
    }

    fn load_into(path: &Path, report: &mut ScanReport) {
        match Self::load_abi_file(path) {
            Ok(fragments) => report
                .fragments
                .extend(fragments.into_iter().map(|f| (f, path.to_path_buf()))),
            Err(err) => report.errors.push(format!("{}: {}", path.display(), err)),
        }
    }

    /// Load a single ABI file as one fragment per function and named event
    fn load_abi_file(path: &Path) -> anyhow::Result<Vec<CandidateFragment>> {
        let content = fs::read_to_string(path)?;
        let definition = match InterfaceDefinition::from_json(&content) {
            Ok(definition) => definition,
            // not every artifact carries an ABI
            Err(DefinitionError::NotAnAbi) => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        Ok(definition
            .iter()
            .filter(|descriptor| !descriptor.is_anonymous())
            .filter_map(|descriptor| CandidateFragment::from_descriptor(descriptor.clone()))
            .collect())
    }

    /// Check if a path should be ignored
    fn is_ignored_dir(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| {
                matches!(
                    name,
                    ".git" | "target" | "node_modules" | ".next" | "dist" | "build"
                )
            })
            .unwrap_or(false)
    }

    /// Check if path contains any of the given names
    fn path_contains_any(path: &Path, names: &[&str]) -> bool {
        path.components().any(|component| {
            if let std::path::Component::Normal(value) = component {
                if let Some(value) = value.to_str() {
                    return names.iter().any(|name| *name == value);
                }
            }
            false
        })
    }
}
