// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Keyword-based content classification for text samples
//!
//! The label is advisory: it is logged and stored in the run report, but file
//! placement never looks at it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{CategoryRule, ClassifierConfig};
use crate::{OrganizerError, Result};

/// Content category of a text sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryLabel {
    Resume,
    #[serde(rename = "Job_Application")]
    JobApplication,
    Others,
}

impl CategoryLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resume => "Resume",
            Self::JobApplication => "Job_Application",
            Self::Others => "Others",
        }
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One category with its compiled whole-word keyword patterns
#[derive(Debug, Clone)]
struct CompiledCategory {
    label: CategoryLabel,
    patterns: Vec<Regex>,
}

/// Classifier holding compiled keyword patterns, in declaration order
#[derive(Debug, Clone)]
pub struct Classifier {
    categories: Vec<CompiledCategory>,
}

impl Classifier {
    /// Build a classifier from configured rules
    ///
    /// Rules for `Others` are skipped: that category never scores.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let mut categories = Vec::with_capacity(config.categories.len());

        for rule in &config.categories {
            if rule.label == CategoryLabel::Others {
                if !rule.keywords.is_empty() {
                    tracing::warn!("Ignoring {} keywords configured for Others", rule.keywords.len());
                }
                continue;
            }
            if categories.iter().any(|c: &CompiledCategory| c.label == rule.label) {
                return Err(OrganizerError::Config(format!(
                    "Category {} is declared more than once",
                    rule.label
                )));
            }
            categories.push(Self::compile(rule)?);
        }

        Ok(Self { categories })
    }

    fn compile(rule: &CategoryRule) -> Result<CompiledCategory> {
        let patterns = rule
            .keywords
            .iter()
            .map(|kw| kw.trim().to_lowercase())
            .filter(|kw| !kw.is_empty())
            .map(|kw| Regex::new(&format!(r"\b{}\b", regex::escape(&kw))))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(CompiledCategory {
            label: rule.label,
            patterns,
        })
    }

    /// Number of keywords of `label` present in `text` as whole words
    ///
    /// `text` must already be lowercased.
    fn score(category: &CompiledCategory, text: &str) -> usize {
        category.patterns.iter().filter(|re| re.is_match(text)).count()
    }

    /// Classify a text sample
    pub fn classify(&self, sample: &str) -> CategoryLabel {
        let text = sample.to_lowercase();

        let mut best = CategoryLabel::Others;
        let mut best_score = 0;
        for category in &self.categories {
            let score = Self::score(category, &text);
            // Strictly greater: earlier categories win ties
            if score > best_score {
                best = category.label;
                best_score = score;
            }
        }

        best
    }
}

impl Default for Classifier {
    fn default() -> Self {
        // Built-in keyword lists are constant and always compile
        Self::new(&ClassifierConfig::default()).unwrap_or(Self {
            categories: Vec::new(),
        })
    }
}

static DEFAULT_CLASSIFIER: Lazy<Classifier> = Lazy::new(Classifier::default);

/// Classify a text sample with the built-in keyword lists
pub fn classify(sample: &str) -> CategoryLabel {
    DEFAULT_CLASSIFIER.classify(sample)
}
