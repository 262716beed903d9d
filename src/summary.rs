// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Human-readable summary written at the root of an organized folder

use std::collections::BTreeMap;
use std::fmt::Write;

/// Counts per extension and the names of every processed file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryReport {
    /// Lowercase extension -> number of files moved into its bucket
    pub counts: BTreeMap<String, usize>,
    /// Processed file names, in processing order
    pub processed: Vec<String>,
}

impl SummaryReport {
    pub fn new(counts: BTreeMap<String, usize>, processed: Vec<String>) -> Self {
        Self { counts, processed }
    }

    /// Render the report text
    pub fn render(&self) -> String {
        let mut out = String::from("Folder Organized Summary:\n\n");

        for (ext, count) in &self.counts {
            let _ = writeln!(out, "• {} Files: {}", ext.to_uppercase(), count);
        }

        out.push_str("\nRenamed Files:\n");
        // Files keep their names; only their folder changes
        for name in &self.processed {
            let _ = writeln!(out, "- {} → {}", name, name);
        }

        out
    }
}
