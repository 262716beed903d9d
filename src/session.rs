// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Session state shared by organize and save
//!
//! A session remembers the most recent successful organize run. Saving always
//! exports that run's working copy, and fails if there is none yet.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::AppConfig;
use crate::fsops::{FileOps, LocalFs};
use crate::opener::{open_quietly, ConfirmOverwrite, FolderOpener, NoopOpener};
use crate::organizer::{OrganizePlan, OrganizeReport, Organizer};
use crate::{OrganizerError, Result};

/// What a save call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The working copy was copied to this path
    Saved(PathBuf),
    /// The target existed and overwriting was declined; nothing changed
    Declined,
}

/// Organize/save session
pub struct Session<F: FileOps = LocalFs> {
    organizer: Organizer<F>,
    opener: Box<dyn FolderOpener>,
    organized: Option<OrganizeReport>,
}

impl Session<LocalFs> {
    /// Session on the local disk
    pub fn new(config: &AppConfig, opener: Box<dyn FolderOpener>) -> Result<Self> {
        Ok(Self::with_organizer(Organizer::new(config)?, opener))
    }
}

impl<F: FileOps> Session<F> {
    pub fn with_organizer(organizer: Organizer<F>, opener: Box<dyn FolderOpener>) -> Self {
        Self {
            organizer,
            opener,
            organized: None,
        }
    }

    /// Session that never opens folders
    pub fn headless(organizer: Organizer<F>) -> Self {
        Self::with_organizer(organizer, Box::new(NoopOpener))
    }

    /// The most recent successful organize run
    pub fn organized(&self) -> Option<&OrganizeReport> {
        self.organized.as_ref()
    }

    /// Organize `source` and make the result the session's current one
    ///
    /// On failure the previous result, if any, is kept.
    pub fn organize(&mut self, source: &Path) -> Result<&OrganizeReport> {
        let report = self.organizer.organize(source)?;
        open_quietly(self.opener.as_ref(), &report.working_copy);
        Ok(&*self.organized.insert(report))
    }

    /// Plan an organize run on `source` without writing anything
    ///
    /// The session's current result is left as it is.
    pub fn preview(&self, source: &Path) -> Result<OrganizePlan> {
        self.organizer.preview(source)
    }

    /// Copy the current working copy to `destination/name`
    pub fn save(
        &self,
        destination: &Path,
        name: &str,
        confirm: &dyn ConfirmOverwrite,
    ) -> Result<SaveOutcome> {
        let report = self.organized.as_ref().ok_or(OrganizerError::NoOrganizedResult)?;
        let fs = self.organizer.fs();

        let name = validate_name(name)?;
        let target = self.export_target(report, destination, name)?;
        if !self.clear_target(&target, confirm)? {
            return Ok(SaveOutcome::Declined);
        }

        fs.copy_tree(&report.working_copy, &target).map_err(|e| {
            OrganizerError::Save(format!(
                "{} -> {}: {}",
                report.working_copy.display(),
                target.display(),
                e
            ))
        })?;
        info!("Saved {:?} to {:?}", report.working_copy, target);

        open_quietly(self.opener.as_ref(), &target);
        Ok(SaveOutcome::Saved(target))
    }

    /// Write the current working copy to `destination/name.zip`
    ///
    /// The archive holds one top-level folder named `name` with the whole
    /// organized tree, summary file included. `.zip` is appended to `name`
    /// unless already present.
    pub fn export_zip(
        &self,
        destination: &Path,
        name: &str,
        confirm: &dyn ConfirmOverwrite,
    ) -> Result<SaveOutcome> {
        let report = self.organized.as_ref().ok_or(OrganizerError::NoOrganizedResult)?;
        let fs = self.organizer.fs();

        let name = validate_name(name)?;
        let stem = name.strip_suffix(".zip").unwrap_or(name);
        if stem.is_empty() {
            return Err(OrganizerError::InvalidInput("Archive name must not be empty".to_string()));
        }
        let file_name = format!("{}.zip", stem);
        let target = self.export_target(report, destination, &file_name)?;
        if !self.clear_target(&target, confirm)? {
            return Ok(SaveOutcome::Declined);
        }

        fs.zip_tree(&report.working_copy, stem, &target).map_err(|e| {
            OrganizerError::Save(format!(
                "{} -> {}: {}",
                report.working_copy.display(),
                target.display(),
                e
            ))
        })?;
        info!("Archived {:?} to {:?}", report.working_copy, target);

        if let Some(parent) = target.parent() {
            open_quietly(self.opener.as_ref(), parent);
        }
        Ok(SaveOutcome::Saved(target))
    }

    /// Resolve `destination/name` and make sure it is a safe place to write
    ///
    /// The target may not equal, contain or sit inside the source folder or
    /// the working copy.
    fn export_target(&self, report: &OrganizeReport, destination: &Path, name: &str) -> Result<PathBuf> {
        let fs = self.organizer.fs();
        if !fs.is_dir(destination) {
            return Err(OrganizerError::InvalidInput(format!(
                "{} is not an existing folder",
                destination.display()
            )));
        }

        let target = destination.join(name);
        let resolved_dest = fs.canonicalize(destination).map_err(|e| {
            OrganizerError::InvalidInput(format!("Cannot resolve {}: {}", destination.display(), e))
        })?;
        // An existing link at the target is judged by where it points
        let resolved = fs
            .canonicalize(&target)
            .unwrap_or_else(|_| resolved_dest.join(name));

        let working = fs
            .canonicalize(&report.working_copy)
            .unwrap_or_else(|_| report.working_copy.clone());
        for protected in [&report.source, &working] {
            if resolved.starts_with(protected) || protected.starts_with(&resolved) {
                return Err(OrganizerError::InvalidInput(format!(
                    "{} overlaps {}; choose a destination outside it",
                    target.display(),
                    protected.display()
                )));
            }
        }
        Ok(target)
    }

    /// Ask before replacing an existing target; false when declined
    fn clear_target(&self, target: &Path, confirm: &dyn ConfirmOverwrite) -> Result<bool> {
        let fs = self.organizer.fs();
        if !fs.exists(target) {
            return Ok(true);
        }
        if !confirm.confirm_overwrite(target) {
            info!("Keeping existing {:?}", target);
            return Ok(false);
        }
        info!("Removing existing {:?}", target);
        fs.remove_tree(target)
            .map_err(|e| OrganizerError::Save(format!("Cannot remove {}: {}", target.display(), e)))?;
        Ok(true)
    }
}

/// Trimmed folder name; must be a single path component
fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(OrganizerError::InvalidInput("Folder name must not be empty".to_string()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(OrganizerError::InvalidInput(format!(
            "Folder name must be a single path component, got {:?}",
            name
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opener::FixedAnswer;
    use crate::organizer::tests::{sample_source, snapshot, FaultyFs};
    use std::cell::RefCell;
    use std::fs;
    use std::io;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Records every opened path
    struct RecordingOpener(Rc<RefCell<Vec<PathBuf>>>);

    impl FolderOpener for RecordingOpener {
        fn open(&self, path: &Path) -> io::Result<()> {
            self.0.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    struct BrokenOpener;

    impl FolderOpener for BrokenOpener {
        fn open(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no file browser"))
        }
    }

    fn session() -> Session {
        Session::headless(Organizer::new(&AppConfig::default()).unwrap())
    }

    fn cleanup<F: FileOps>(session: &Session<F>) {
        if let Some(report) = session.organized() {
            if let Some(parent) = report.working_copy.parent() {
                let _ = fs::remove_dir_all(parent);
            }
        }
    }

    #[test]
    fn test_save_before_organize_fails_without_writes() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("dest");
        fs::create_dir_all(&dest).unwrap();

        let result = session().save(&dest, "out", &FixedAnswer(true));

        assert!(matches!(result, Err(OrganizerError::NoOrganizedResult)));
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 0);
    }

    #[test]
    fn test_save_copies_working_copy() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);
        let dest = tmp.path().join("dest");
        fs::create_dir_all(&dest).unwrap();

        let mut session = session();
        session.organize(&src).unwrap();
        let outcome = session.save(&dest, "sorted", &FixedAnswer(false)).unwrap();

        let target = dest.join("sorted");
        assert_eq!(outcome, SaveOutcome::Saved(target.clone()));
        let working = &session.organized().unwrap().working_copy;
        assert_eq!(snapshot(&target), snapshot(working));
        // Working copy survives the save
        assert!(working.join("summary.txt").is_file());
        cleanup(&session);
    }

    #[test]
    fn test_declined_overwrite_is_noop() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);
        let dest = tmp.path().join("dest");
        fs::create_dir_all(dest.join("sorted")).unwrap();
        fs::write(dest.join("sorted/old.txt"), "old").unwrap();
        let before = snapshot(&dest);

        let mut session = session();
        session.organize(&src).unwrap();
        let outcome = session.save(&dest, "sorted", &FixedAnswer(false)).unwrap();

        assert_eq!(outcome, SaveOutcome::Declined);
        assert_eq!(snapshot(&dest), before);
        cleanup(&session);
    }

    #[test]
    fn test_confirmed_overwrite_replaces_tree() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);
        let dest = tmp.path().join("dest");
        fs::create_dir_all(dest.join("sorted")).unwrap();
        fs::write(dest.join("sorted/old.txt"), "old").unwrap();

        let mut session = session();
        session.organize(&src).unwrap();
        session.save(&dest, "sorted", &FixedAnswer(true)).unwrap();

        assert!(!dest.join("sorted/old.txt").exists());
        assert!(dest.join("sorted/TXT_Files/cv.txt").is_file());
        cleanup(&session);
    }

    #[test]
    fn test_save_over_source_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);
        let before = snapshot(&src);

        let mut session = session();
        session.organize(&src).unwrap();

        // Same folder, a folder inside it, and a folder containing it
        let attempts = [
            (tmp.path().to_path_buf(), "inbox".to_string()),
            (src.clone(), "sorted".to_string()),
            (
                tmp.path().parent().unwrap().to_path_buf(),
                tmp.path().file_name().unwrap().to_string_lossy().to_string(),
            ),
        ];
        for (dest, name) in &attempts {
            let result = session.save(dest, name, &FixedAnswer(true));
            assert!(matches!(result, Err(OrganizerError::InvalidInput(_))), "{:?}/{}", dest, name);
        }

        assert_eq!(snapshot(&src), before);
        assert!(!src.join("sorted").exists());
        cleanup(&session);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_through_link_to_source_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);
        let dest = tmp.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        std::os::unix::fs::symlink(&src, dest.join("sorted")).unwrap();
        let before = snapshot(&src);

        let mut session = session();
        session.organize(&src).unwrap();
        let result = session.save(&dest, "sorted", &FixedAnswer(true));

        assert!(matches!(result, Err(OrganizerError::InvalidInput(_))));
        assert_eq!(snapshot(&src), before);
        cleanup(&session);
    }

    #[test]
    fn test_save_into_working_copy_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);

        let mut session = session();
        let working = session.organize(&src).unwrap().working_copy.clone();
        let before = snapshot(&working);

        let inside = session.save(&working, "nested", &FixedAnswer(true));
        let replace = session.save(working.parent().unwrap(), "inbox", &FixedAnswer(true));

        assert!(matches!(inside, Err(OrganizerError::InvalidInput(_))));
        assert!(matches!(replace, Err(OrganizerError::InvalidInput(_))));
        assert_eq!(snapshot(&working), before);
        cleanup(&session);
    }

    #[test]
    fn test_save_copy_failure_is_save_error() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);
        let dest = tmp.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        // The organize copy succeeds, the save copy fails
        let fs_ops = FaultyFs {
            copy_budget: Some(1),
            ..Default::default()
        };
        let mut session = Session::headless(Organizer::with_fs(fs_ops, &AppConfig::default()).unwrap());
        session.organize(&src).unwrap();

        let result = session.save(&dest, "sorted", &FixedAnswer(true));

        assert!(matches!(result, Err(OrganizerError::Save(_))));
        assert!(session.organized().unwrap().working_copy.join("summary.txt").is_file());
        cleanup(&session);
    }

    #[test]
    fn test_export_zip_holds_organized_tree() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);
        let dest = tmp.path().join("dest");
        fs::create_dir_all(&dest).unwrap();

        let mut session = session();
        session.organize(&src).unwrap();
        let outcome = session.export_zip(&dest, "sorted", &FixedAnswer(false)).unwrap();

        let target = dest.join("sorted.zip");
        assert_eq!(outcome, SaveOutcome::Saved(target.clone()));
        let mut archive = zip::ZipArchive::new(fs::File::open(&target).unwrap()).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        for expected in ["sorted/TXT_Files/cv.txt", "sorted/JPG_Files/photo.jpg", "sorted/summary.txt", "sorted/README"] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }

        let mut summary = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("sorted/summary.txt").unwrap(), &mut summary).unwrap();
        assert!(summary.contains("• TXT Files: 2"));
        cleanup(&session);
    }

    #[test]
    fn test_export_zip_declined_overwrite_is_noop() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);
        let dest = tmp.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("sorted.zip"), "old").unwrap();

        let mut session = session();
        session.organize(&src).unwrap();

        assert_eq!(
            session.export_zip(&dest, "sorted.zip", &FixedAnswer(false)).unwrap(),
            SaveOutcome::Declined
        );
        assert_eq!(fs::read_to_string(dest.join("sorted.zip")).unwrap(), "old");

        session.export_zip(&dest, "sorted.zip", &FixedAnswer(true)).unwrap();
        assert!(zip::ZipArchive::new(fs::File::open(dest.join("sorted.zip")).unwrap()).is_ok());
        cleanup(&session);
    }

    #[test]
    fn test_export_zip_requires_organize() {
        let tmp = TempDir::new().unwrap();
        let result = session().export_zip(tmp.path(), "sorted", &FixedAnswer(true));

        assert!(matches!(result, Err(OrganizerError::NoOrganizedResult)));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_preview_keeps_session_state() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);

        let session = session();
        let plan = session.preview(&src).unwrap();

        assert_eq!(plan.counts.get("txt"), Some(&2));
        assert!(session.organized().is_none());
    }

    #[test]
    fn test_save_rejects_bad_names_and_destinations() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);
        let dest = tmp.path().join("dest");
        fs::create_dir_all(&dest).unwrap();

        let mut session = session();
        session.organize(&src).unwrap();

        for name in ["", "   ", "..", "a/b"] {
            let result = session.save(&dest, name, &FixedAnswer(true));
            assert!(matches!(result, Err(OrganizerError::InvalidInput(_))), "name {:?}", name);
        }
        let missing = tmp.path().join("missing");
        assert!(matches!(
            session.save(&missing, "out", &FixedAnswer(true)),
            Err(OrganizerError::InvalidInput(_))
        ));
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 0);
        cleanup(&session);
    }

    #[test]
    fn test_organize_replaces_previous_result() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);

        let mut session = session();
        let first = session.organize(&src).unwrap().working_copy.clone();
        let second = session.organize(&src).unwrap().working_copy.clone();

        assert_ne!(first, second);
        assert_eq!(session.organized().unwrap().working_copy, second);
        // The earlier copy is left alone
        assert!(first.join("summary.txt").is_file());
        let _ = fs::remove_dir_all(first.parent().unwrap());
        cleanup(&session);
    }

    #[test]
    fn test_failed_organize_keeps_previous_result() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);

        let mut session = session();
        let first = session.organize(&src).unwrap().working_copy.clone();
        assert!(session.organize(&tmp.path().join("missing")).is_err());

        assert_eq!(session.organized().unwrap().working_copy, first);
        cleanup(&session);
    }

    #[test]
    fn test_folders_opened_after_organize_and_save() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);
        let dest = tmp.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        let opened = Rc::new(RefCell::new(Vec::new()));

        let organizer = Organizer::new(&AppConfig::default()).unwrap();
        let mut session = Session::with_organizer(organizer, Box::new(RecordingOpener(opened.clone())));
        let working = session.organize(&src).unwrap().working_copy.clone();
        session.save(&dest, "sorted", &FixedAnswer(true)).unwrap();

        assert_eq!(*opened.borrow(), vec![working, dest.join("sorted")]);
        cleanup(&session);
    }

    #[test]
    fn test_opener_failure_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let src = sample_source(&tmp);

        let organizer = Organizer::new(&AppConfig::default()).unwrap();
        let mut session = Session::with_organizer(organizer, Box::new(BrokenOpener));

        assert!(session.organize(&src).is_ok());
        cleanup(&session);
    }
}
