// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Narrow file system operations used by the organizer and session

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File system side effects needed by an organize/save run
pub trait FileOps {
    /// Create a fresh, uniquely named directory under the system temp dir
    ///
    /// The directory is not removed automatically.
    fn create_temp_dir(&self, prefix: &str) -> io::Result<PathBuf>;

    /// Recursively copy `src` to `dst`; `dst` must not exist yet
    ///
    /// Symbolic links are followed and their targets copied as regular
    /// files and folders. A link cycle is an error.
    fn copy_tree(&self, src: &Path, dst: &Path) -> io::Result<()>;

    /// Write the tree under `src` into a new ZIP archive at `dst`
    ///
    /// Entries are stored under a single top-level folder named `root`.
    fn zip_tree(&self, src: &Path, root: &str, dst: &Path) -> io::Result<()>;

    /// Regular files directly inside `dir`, sorted by name
    fn list_top_level_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Read at most `limit` bytes from the start of a file
    fn read_prefix(&self, path: &Path, limit: usize) -> io::Result<Vec<u8>>;

    /// Create a directory and its parents if missing
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Move a file to a new path
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create or truncate a file with the given contents
    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Remove a file or a whole directory tree
    fn remove_tree(&self, path: &Path) -> io::Result<()>;

    /// Whether anything exists at `path` (symlinks are not followed)
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is an existing directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Absolute path with every link resolved
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// [`FileOps`] backed by the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileOps for LocalFs {
    fn create_temp_dir(&self, prefix: &str) -> io::Result<PathBuf> {
        let dir = tempfile::Builder::new().prefix(prefix).keep(true).tempdir()?;
        Ok(dir.path().to_path_buf())
    }

    fn copy_tree(&self, src: &Path, dst: &Path) -> io::Result<()> {
        if dst.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("copy target already exists: {}", dst.display()),
            ));
        }

        // With links followed, file_type() describes the link target
        for entry in WalkDir::new(src).follow_links(true) {
            let entry = entry.map_err(io::Error::from)?;
            let relative = entry
                .path()
                .strip_prefix(src)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            let target = dst.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                fs::create_dir_all(&target)?;
            } else if file_type.is_file() {
                fs::copy(entry.path(), &target)?;
            } else {
                debug!("Skipping special file {:?}", entry.path());
            }
        }

        Ok(())
    }

    fn zip_tree(&self, src: &Path, root: &str, dst: &Path) -> io::Result<()> {
        let file = File::options().write(true).create_new(true).open(dst)?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            let relative = entry
                .path()
                .strip_prefix(src)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            let mut name = root.to_string();
            for part in relative.components() {
                name.push('/');
                name.push_str(&part.as_os_str().to_string_lossy());
            }

            if entry.file_type().is_dir() {
                zip.add_directory(name, options)?;
            } else if entry.file_type().is_file() {
                zip.start_file(name, options)?;
                io::copy(&mut File::open(entry.path())?, &mut zip)?;
            }
        }

        zip.finish()?;
        Ok(())
    }

    fn list_top_level_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn read_prefix(&self, path: &Path, limit: usize) -> io::Result<Vec<u8>> {
        let file = File::open(path)?;
        let mut buf = Vec::with_capacity(limit.min(64 * 1024));
        file.take(limit as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        if to.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("move target already exists: {}", to.display()),
            ));
        }
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) => {
                // Rename fails across devices; fall back to copy + delete
                debug!("Rename {:?} failed ({}), copying instead", from, e);
                fs::copy(from, to)?;
                fs::remove_file(from)
            }
        }
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn remove_tree(&self, path: &Path) -> io::Result<()> {
        let meta = fs::symlink_metadata(path)?;
        if meta.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        path.canonicalize()
    }
}

/// Decode a byte sample as UTF-8, dropping bytes that do not decode
pub fn decode_sample(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect()
}
