// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Organize pass: copy a folder and sort its top-level files by extension

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier::{CategoryLabel, Classifier};
use crate::config::{AppConfig, OrganizerConfig};
use crate::fsops::{decode_sample, FileOps, LocalFs};
use crate::summary::SummaryReport;
use crate::{OrganizerError, Result};

/// Where a top-level file ended up after the organize pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Moved into the named bucket folder
    Relocated { bucket: String },
    /// No `.` in the name; left in place and never read
    NoExtension,
    /// Extension is not alphanumeric; left in place
    UnsupportedExtension,
    /// Reading or moving failed; left in place
    Failed { reason: String },
}

/// Outcome for a single top-level file of the working copy
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub name: String,
    pub extension: Option<String>,
    /// Advisory content label; placement never depends on it
    pub category: Option<CategoryLabel>,
    pub placement: Placement,
}

/// Result of one organize run
#[derive(Debug, Clone, Serialize)]
pub struct OrganizeReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Source folder with links resolved
    pub source: PathBuf,
    /// Root of the organized working copy
    pub working_copy: PathBuf,
    pub summary_path: PathBuf,
    /// Lowercase extension -> files moved into its bucket
    pub counts: BTreeMap<String, usize>,
    pub files: Vec<FileOutcome>,
}

impl OrganizeReport {
    /// Number of files moved into buckets
    pub fn relocated(&self) -> usize {
        self.counts.values().sum()
    }

    /// Files whose read or move failed
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files
            .iter()
            .filter(|f| matches!(f.placement, Placement::Failed { .. }))
    }
}

/// What an organize run would do, computed without touching the disk
#[derive(Debug, Clone, Serialize)]
pub struct OrganizePlan {
    pub source: PathBuf,
    /// Name the working copy folder would get
    pub folder_name: String,
    pub counts: BTreeMap<String, usize>,
    pub files: Vec<FileOutcome>,
    /// Text the summary file would contain
    pub summary: String,
}

/// Bucket folder name for a lowercase extension
pub fn bucket_name(extension: &str, suffix: &str) -> String {
    format!("{}{}", extension.to_uppercase(), suffix)
}

/// Extension after the last `.`, lowercased, if the name has a `.` at all
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

fn is_alphanumeric(ext: &str) -> bool {
    !ext.is_empty() && ext.chars().all(char::is_alphanumeric)
}

/// Copies a source folder and sorts the copy's files into extension buckets
pub struct Organizer<F: FileOps = LocalFs> {
    fs: F,
    config: OrganizerConfig,
    classifier: Classifier,
}

impl Organizer<LocalFs> {
    /// Create an organizer working on the local disk
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_fs(LocalFs, config)
    }
}

impl<F: FileOps> Organizer<F> {
    /// Create an organizer over a custom file system
    pub fn with_fs(fs: F, config: &AppConfig) -> Result<Self> {
        Ok(Self {
            fs,
            config: config.organizer.clone(),
            classifier: Classifier::new(&config.classifier)?,
        })
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Organize a copy of `source`, leaving `source` untouched
    pub fn organize(&self, source: &Path) -> Result<OrganizeReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let (resolved, base_name) = self.resolve_source(source)?;

        let temp_root = self
            .fs
            .create_temp_dir(&self.config.temp_prefix)
            .map_err(|e| OrganizerError::Copy(format!("Cannot create temporary folder: {}", e)))?;
        let temp_resolved = self
            .fs
            .canonicalize(&temp_root)
            .map_err(|e| OrganizerError::Copy(format!("Cannot resolve {}: {}", temp_root.display(), e)))?;
        if temp_resolved.starts_with(&resolved) {
            // The copy would land inside the folder being copied
            if let Err(e) = self.fs.remove_tree(&temp_root) {
                warn!("Cannot remove {:?}: {}", temp_root, e);
            }
            return Err(OrganizerError::InvalidInput(format!(
                "{} contains the temporary folder {}; choose another temp location",
                resolved.display(),
                temp_root.display()
            )));
        }
        let root = temp_root.join(base_name);

        info!("Run {}: copying {:?} to {:?}", run_id, resolved, root);
        self.fs.copy_tree(&resolved, &root).map_err(|e| {
            OrganizerError::Copy(format!("{} -> {}: {}", resolved.display(), root.display(), e))
        })?;

        let files = self
            .fs
            .list_top_level_files(&root)
            .map_err(|e| OrganizerError::Copy(format!("Cannot list {}: {}", root.display(), e)))?;

        let outcomes: Vec<FileOutcome> = files.iter().map(|path| self.process_file(&root, path)).collect();
        let (counts, processed) = tally(&outcomes);

        let summary = SummaryReport::new(counts.clone(), processed);
        let summary_path = root.join(&self.config.summary_file);
        self.fs.write_file(&summary_path, summary.render().as_bytes())?;

        let report = OrganizeReport {
            run_id,
            started_at,
            source: resolved,
            working_copy: root,
            summary_path,
            counts,
            files: outcomes,
        };

        info!(
            "Run {}: organized {} of {} files into {} folders ({} failed)",
            run_id,
            report.relocated(),
            report.files.len(),
            report.counts.len(),
            report.failures().count()
        );

        Ok(report)
    }

    /// Work out what `organize` would do with `source` without writing anything
    ///
    /// Files are read in place for classification. Move failures cannot be
    /// predicted, so every eligible file is reported as relocated.
    pub fn preview(&self, source: &Path) -> Result<OrganizePlan> {
        let (resolved, base_name) = self.resolve_source(source)?;

        let files = self
            .fs
            .list_top_level_files(&resolved)
            .map_err(|e| OrganizerError::InvalidInput(format!("Cannot list {}: {}", resolved.display(), e)))?;

        let outcomes: Vec<FileOutcome> = files.iter().map(|path| self.inspect(path)).collect();
        let (counts, processed) = tally(&outcomes);
        let summary = SummaryReport::new(counts.clone(), processed).render();

        debug!("Preview of {:?}: {} files", resolved, outcomes.len());
        Ok(OrganizePlan {
            source: resolved,
            folder_name: base_name.to_string_lossy().into_owned(),
            counts,
            files: outcomes,
            summary,
        })
    }

    /// Check `source` is a folder and resolve it
    ///
    /// Returns the resolved path and the folder name to give the copy. The
    /// name comes from the path as given, so a link keeps its own name;
    /// paths such as `.` fall back to the resolved folder's name.
    fn resolve_source(&self, source: &Path) -> Result<(PathBuf, OsString)> {
        if !self.fs.is_dir(source) {
            return Err(OrganizerError::InvalidInput(format!(
                "{} is not an existing folder",
                source.display()
            )));
        }
        let resolved = self.fs.canonicalize(source).map_err(|e| {
            OrganizerError::InvalidInput(format!("Cannot resolve {}: {}", source.display(), e))
        })?;
        let base_name = source
            .file_name()
            .or_else(|| resolved.file_name())
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "organized".into());
        Ok((resolved, base_name))
    }

    /// Move one top-level file into its bucket; failures stay local to the file
    fn process_file(&self, root: &Path, path: &Path) -> FileOutcome {
        let outcome = self.inspect(path);
        let bucket_dir = match &outcome.placement {
            Placement::Relocated { bucket } => Some(root.join(bucket)),
            _ => None,
        };
        let Some(bucket_dir) = bucket_dir else {
            return outcome;
        };

        let moved = self
            .fs
            .create_dir_all(&bucket_dir)
            .and_then(|()| self.fs.move_file(path, &bucket_dir.join(path.file_name().unwrap_or_default())));

        match moved {
            Ok(()) => outcome,
            Err(e) => Self::failed(
                outcome.name,
                outcome.extension,
                outcome.category,
                format!("move failed: {}", e),
            ),
        }
    }

    /// Read, classify and decide the placement of one file without moving it
    fn inspect(&self, path: &Path) -> FileOutcome {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some(extension) = extension_of(&name) else {
            debug!("Leaving {} in place: no extension", name);
            return FileOutcome {
                name,
                extension: None,
                category: None,
                placement: Placement::NoExtension,
            };
        };

        let sample = match self.fs.read_prefix(path, self.config.sample_bytes) {
            Ok(bytes) => decode_sample(&bytes),
            Err(e) => return Self::failed(name, Some(extension), None, format!("read failed: {}", e)),
        };
        let category = self.classifier.classify(&sample);
        info!("{} → {}", name, category);

        if !is_alphanumeric(&extension) {
            debug!("Leaving {} in place: extension {:?} is not alphanumeric", name, extension);
            return FileOutcome {
                name,
                extension: Some(extension),
                category: Some(category),
                placement: Placement::UnsupportedExtension,
            };
        }

        let bucket = bucket_name(&extension, &self.config.bucket_suffix);
        FileOutcome {
            name,
            extension: Some(extension),
            category: Some(category),
            placement: Placement::Relocated { bucket },
        }
    }

    fn failed(
        name: String,
        extension: Option<String>,
        category: Option<CategoryLabel>,
        reason: String,
    ) -> FileOutcome {
        let err = OrganizerError::PerFile {
            file: name.clone(),
            reason: reason.clone(),
        };
        warn!("{}", err);
        FileOutcome {
            name,
            extension,
            category,
            placement: Placement::Failed { reason },
        }
    }
}

/// Per-extension counts of relocated files, and the names listed in the summary
fn tally(outcomes: &[FileOutcome]) -> (BTreeMap<String, usize>, Vec<String>) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut processed = Vec::new();
    for outcome in outcomes {
        match &outcome.placement {
            Placement::Relocated { .. } => {
                if let Some(ext) = &outcome.extension {
                    *counts.entry(ext.clone()).or_insert(0) += 1;
                }
                processed.push(outcome.name.clone());
            }
            Placement::UnsupportedExtension => processed.push(outcome.name.clone()),
            Placement::NoExtension | Placement::Failed { .. } => {}
        }
    }
    (counts, processed)
}
