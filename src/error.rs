// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for Orgonizer

use thiserror::Error;

/// Result type alias for Orgonizer operations
pub type Result<T> = std::result::Result<T, OrganizerError>;

/// Orgonizer error types
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Copy failed: {0}")]
    Copy(String),

    #[error("Error processing {file}: {reason}")]
    PerFile { file: String, reason: String },

    #[error("No organized folder found. Organize a folder before saving")]
    NoOrganizedResult,

    #[error("Save failed: {0}")]
    Save(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Keyword pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

