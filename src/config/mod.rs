// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Orgonizer

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::classifier::CategoryLabel;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Organize pass settings
    #[serde(default)]
    pub organizer: OrganizerConfig,

    /// Content classification keywords
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Post-action settings
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OrganizerConfig {
    /// Bytes read from each file for classification
    #[serde(default = "default_sample_bytes")]
    pub sample_bytes: usize,
    /// Appended to the uppercased extension to name a bucket folder
    #[serde(default = "default_bucket_suffix")]
    pub bucket_suffix: String,
    /// Summary report file name, written at the working copy root
    #[serde(default = "default_summary_file")]
    pub summary_file: String,
    /// Prefix of the temporary directory holding the working copy
    #[serde(default = "default_temp_prefix")]
    pub temp_prefix: String,
}

/// Ordered keyword rules; earlier categories win ties
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClassifierConfig {
    pub categories: Vec<CategoryRule>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CategoryRule {
    pub label: CategoryLabel,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    /// Open the organized and saved folders in the host file browser
    #[serde(default = "default_true")]
    pub open_folders: bool,
}

// Default value functions
fn default_sample_bytes() -> usize { 2048 }
fn default_bucket_suffix() -> String { "_Files".to_string() }
fn default_summary_file() -> String { "summary.txt".to_string() }
fn default_temp_prefix() -> String { "orgonizer-".to_string() }
fn default_true() -> bool { true }

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            sample_bytes: default_sample_bytes(),
            bucket_suffix: default_bucket_suffix(),
            summary_file: default_summary_file(),
            temp_prefix: default_temp_prefix(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                CategoryRule {
                    label: CategoryLabel::Resume,
                    keywords: keywords(&[
                        "curriculum vitae", "cv", "resume", "objective", "skills",
                        "experience", "education", "references", "summary",
                    ]),
                },
                CategoryRule {
                    label: CategoryLabel::JobApplication,
                    keywords: keywords(&[
                        "cover letter", "application for", "dear hiring",
                        "position of", "attached resume", "job application",
                    ]),
                },
                CategoryRule {
                    label: CategoryLabel::Others,
                    keywords: Vec::new(),
                },
            ],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            open_folders: true,
        }
    }
}

/// A name that must be usable as a single path component
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::OrganizerError::Config(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that serde alone cannot reject
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |msg: String| Err(crate::OrganizerError::Config(msg));

        if self.organizer.sample_bytes == 0 {
            return invalid("organizer.sample_bytes must be greater than zero".to_string());
        }
        if !is_plain_name(&self.organizer.summary_file) {
            return invalid(format!(
                "organizer.summary_file must be a plain file name, got {:?}",
                self.organizer.summary_file
            ));
        }
        if self.organizer.bucket_suffix.contains(['/', '\\']) {
            return invalid(format!(
                "organizer.bucket_suffix must not contain path separators, got {:?}",
                self.organizer.bucket_suffix
            ));
        }
        if self.organizer.temp_prefix.contains(['/', '\\']) {
            return invalid(format!(
                "organizer.temp_prefix must not contain path separators, got {:?}",
                self.organizer.temp_prefix
            ));
        }

        let mut seen = Vec::new();
        for rule in &self.classifier.categories {
            if seen.contains(&rule.label) {
                return invalid(format!("classifier category {} is declared more than once", rule.label));
            }
            if rule.label == CategoryLabel::Others && !rule.keywords.is_empty() {
                return invalid("classifier category Others cannot have keywords".to_string());
            }
            seen.push(rule.label);
        }

        Ok(())
    }
}
