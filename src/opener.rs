// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Host integration: opening folders and asking for overwrite confirmation

use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Shows a folder to the user
pub trait FolderOpener {
    fn open(&self, path: &Path) -> io::Result<()>;
}

/// Opens folders in the host's native file browser
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl FolderOpener for SystemOpener {
    fn open(&self, path: &Path) -> io::Result<()> {
        #[cfg(target_os = "linux")]
        {
            std::process::Command::new("xdg-open").arg(path).spawn()?;
        }
        #[cfg(target_os = "macos")]
        {
            std::process::Command::new("open").arg(path).spawn()?;
        }
        #[cfg(target_os = "windows")]
        {
            std::process::Command::new("explorer").arg(path).spawn()?;
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            debug!("No file browser integration on this platform for {:?}", path);
        }
        Ok(())
    }
}

/// Opener for headless runs and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOpener;

impl FolderOpener for NoopOpener {
    fn open(&self, path: &Path) -> io::Result<()> {
        debug!("Not opening {:?}", path);
        Ok(())
    }
}

/// Open a folder, logging failures instead of returning them
pub fn open_quietly(opener: &dyn FolderOpener, path: &Path) {
    if let Err(e) = opener.open(path) {
        warn!("Failed to open {:?}: {}", path, e);
    }
}

/// Decides whether an existing save target may be replaced
pub trait ConfirmOverwrite {
    fn confirm_overwrite(&self, path: &Path) -> bool;
}

/// Always answers with a fixed value (`--yes`, or non-interactive runs)
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl ConfirmOverwrite for FixedAnswer {
    fn confirm_overwrite(&self, _path: &Path) -> bool {
        self.0
    }
}

/// Asks on stderr and reads a y/N answer from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl ConfirmOverwrite for StdinPrompt {
    fn confirm_overwrite(&self, path: &Path) -> bool {
        eprint!("{} already exists. Overwrite? [y/N] ", path.display());
        let _ = io::stderr().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => parse_yes(&answer),
            Err(e) => {
                warn!("Failed to read answer: {}", e);
                false
            }
        }
    }
}

fn parse_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
