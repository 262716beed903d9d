// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Orgonizer: Folder Copier & Extension Sorter
//!
//! Copies a folder, sorts the copy's top-level files into per-extension
//! subfolders, tags text samples with a keyword-based category, writes a
//! summary report, and exports the result to a chosen location as a folder
//! or a ZIP archive.

pub mod classifier;
pub mod config;
pub mod error;
pub mod fsops;
pub mod opener;
pub mod organizer;
pub mod session;
pub mod summary;

pub use classifier::{classify, CategoryLabel, Classifier};
pub use config::AppConfig;
pub use error::{OrganizerError, Result};
pub use organizer::{OrganizePlan, OrganizeReport, Organizer};
pub use session::{SaveOutcome, Session};
