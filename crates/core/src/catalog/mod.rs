pub mod format;

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::hasher;
pub use format::SceneFormat;

/// How identifiers are assigned to submitted images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdPolicy {
    /// Identifier is the SHA-256 of the bytes. Submitting the same bytes twice
    /// stores one file and reports the second submission as a duplicate.
    #[default]
    ContentHash,
    /// Identifier is a fresh random token. Every submission stores a new file.
    RandomToken,
}

/// A stored scene image: identifier plus the format that fixes its extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SceneRef {
    pub id: String,
    pub format: SceneFormat,
}

impl SceneRef {
    pub fn new(id: impl Into<String>, format: SceneFormat) -> Self {
        Self {
            id: id.into(),
            format,
        }
    }

    /// File name inside the catalog directory, e.g. `<sha256>.png`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.id, self.format.extension())
    }

    /// Parse a catalog file name back into a reference.
    pub fn parse(file_name: &str) -> Option<Self> {
        let (stem, ext) = file_name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        let format = SceneFormat::from_extension(ext)?;
        Some(Self::new(stem, format))
    }
}

/// Result of submitting image bytes to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The bytes were written to a new file.
    Stored(SceneRef),
    /// Identical bytes are already stored; nothing was written.
    Duplicate(SceneRef),
}

impl SubmitOutcome {
    pub fn scene(&self) -> &SceneRef {
        match self {
            SubmitOutcome::Stored(scene) | SubmitOutcome::Duplicate(scene) => scene,
        }
    }

    pub fn id(&self) -> &str {
        &self.scene().id
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, SubmitOutcome::Duplicate(_))
    }
}

/// Outcome of re-hashing the catalog.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Content-addressed files whose hash was recomputed.
    pub checked: usize,
    /// Files named by random token; their content cannot be checked.
    pub skipped: usize,
    /// File names whose content no longer matches the hash in their name.
    pub mismatched: Vec<String>,
    /// `(file name, error)` for files that could not be read.
    pub unreadable: Vec<(String, String)>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.mismatched.is_empty() && self.unreadable.is_empty()
    }
}

/// Directory of scene images, one file per identifier.
pub struct SceneCatalog {
    dir: PathBuf,
    policy: IdPolicy,
    write_lock: Mutex<()>,
}

impl SceneCatalog {
    /// Open the catalog at `dir`, creating the directory if it does not exist.
    pub fn open(dir: &Path, policy: IdPolicy) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|source| Error::StorageWrite {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            policy,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn policy(&self) -> IdPolicy {
        self.policy
    }

    pub fn path_of(&self, scene: &SceneRef) -> PathBuf {
        self.dir.join(scene.file_name())
    }

    /// Store `bytes` under an identifier chosen by the catalog's policy.
    pub fn submit(&self, bytes: &[u8]) -> Result<SubmitOutcome> {
        let format = SceneFormat::sniff(bytes).ok_or(Error::UnsupportedFormat(None))?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        match self.policy {
            IdPolicy::ContentHash => {
                let id = hasher::sha256_hex(bytes);
                // A file stored under the same hash with another extension is the same image.
                if let Some(existing) = self.find_by_id(&id) {
                    tracing::debug!(file = %existing.file_name(), "duplicate scene");
                    return Ok(SubmitOutcome::Duplicate(existing));
                }
                let scene = SceneRef::new(id, format);
                if self.write_new(&self.path_of(&scene), bytes)? {
                    tracing::info!(file = %scene.file_name(), "stored scene");
                    Ok(SubmitOutcome::Stored(scene))
                } else {
                    Ok(SubmitOutcome::Duplicate(scene))
                }
            }
            IdPolicy::RandomToken => loop {
                let scene = SceneRef::new(hasher::random_token(), format);
                if self.write_new(&self.path_of(&scene), bytes)? {
                    tracing::info!(file = %scene.file_name(), "stored scene");
                    return Ok(SubmitOutcome::Stored(scene));
                }
                tracing::debug!(token = %scene.id, "token collision, regenerating");
            },
        }
    }

    /// Sorted file names of every image in the catalog.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if SceneRef::parse(name).is_some() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Resolve a catalog file name to its path, failing if it is not stored.
    pub fn locate(&self, file_name: &str) -> Result<PathBuf> {
        let not_found = || Error::ImageNotFound(file_name.to_string());
        if file_name.contains(['/', '\\']) || SceneRef::parse(file_name).is_none() {
            return Err(not_found());
        }
        let path = self.dir.join(file_name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(not_found())
        }
    }

    /// Re-hash every content-addressed image and report those that no longer match.
    pub fn verify(&self) -> Result<VerifyReport> {
        let (hashed, tokens): (Vec<String>, Vec<String>) =
            self.list()?.into_iter().partition(|name| {
                SceneRef::parse(name).is_some_and(|scene| hasher::is_sha256_hex(&scene.id))
            });

        let results: Vec<(String, std::io::Result<bool>)> = hashed
            .into_par_iter()
            .map(|name| {
                let expected = name.split('.').next().unwrap_or_default().to_string();
                let matches =
                    hasher::compute_sha256(&self.dir.join(&name)).map(|sha| sha == expected);
                (name, matches)
            })
            .collect();

        let mut report = VerifyReport {
            skipped: tokens.len(),
            ..VerifyReport::default()
        };
        for (name, result) in results {
            match result {
                Ok(true) => report.checked += 1,
                Ok(false) => {
                    tracing::warn!(file = %name, "content does not match its hash");
                    report.checked += 1;
                    report.mismatched.push(name);
                }
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "unreadable scene");
                    report.unreadable.push((name, e.to_string()));
                }
            }
        }
        Ok(report)
    }

    fn find_by_id(&self, id: &str) -> Option<SceneRef> {
        SceneFormat::ALL
            .into_iter()
            .map(|format| SceneRef::new(id, format))
            .find(|scene| self.path_of(scene).is_file())
    }

    /// Create `path` and write `bytes`. Returns `Ok(false)` without touching
    /// anything if the file already exists. A failed write removes the partial file.
    fn write_new(&self, path: &Path, bytes: &[u8]) -> Result<bool> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(source) => {
                return Err(Error::StorageWrite {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if let Err(source) = file.write_all(bytes).and_then(|_| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(path);
            return Err(Error::StorageWrite {
                path: path.to_path_buf(),
                source,
            });
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::format::samples;
    use super::*;

    fn open(dir: &Path, policy: IdPolicy) -> SceneCatalog {
        SceneCatalog::open(&dir.join("scenes"), policy).unwrap()
    }

    fn file_count(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    // ── open ────────────────────────────────────────────────────

    #[test]
    fn test_open_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);
        assert!(catalog.dir().is_dir());
    }

    #[test]
    fn test_open_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let first = open(tmp.path(), IdPolicy::ContentHash);
        first.submit(&samples::png(b"a")).unwrap();

        let second = open(tmp.path(), IdPolicy::ContentHash);
        assert_eq!(second.list().unwrap().len(), 1);
    }

    // ── submit: content hash ────────────────────────────────────

    #[test]
    fn test_hash_submit_twice_is_duplicate() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);
        let bytes = samples::png(b"scene one");

        let first = catalog.submit(&bytes).unwrap();
        let second = catalog.submit(&bytes).unwrap();

        assert!(matches!(first, SubmitOutcome::Stored(_)));
        assert!(second.is_duplicate());
        assert_eq!(first.id(), second.id());
        assert_eq!(first.id(), hasher::sha256_hex(&bytes));
        assert_eq!(file_count(catalog.dir()), 1);
    }

    #[test]
    fn test_hash_duplicate_preserves_original() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);
        let bytes = samples::png(b"original");

        let stored = catalog.submit(&bytes).unwrap();
        let path = catalog.path_of(stored.scene());
        let before = fs::metadata(&path).unwrap().modified().unwrap();

        catalog.submit(&bytes).unwrap();
        assert_eq!(fs::read(&path).unwrap(), bytes);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn test_hash_distinct_bytes_distinct_files() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);

        let a = catalog.submit(&samples::png(b"a")).unwrap();
        let b = catalog.submit(&samples::png(b"b")).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(catalog.list().unwrap().len(), 2);
    }

    #[test]
    fn test_hash_detects_legacy_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);
        let bytes = samples::jpeg(b"camera shot");

        // Older catalogs stored every upload with a .png extension.
        let legacy = catalog.dir().join(format!("{}.png", hasher::sha256_hex(&bytes)));
        fs::write(&legacy, &bytes).unwrap();

        let outcome = catalog.submit(&bytes).unwrap();
        assert!(outcome.is_duplicate());
        assert_eq!(outcome.scene().format, SceneFormat::Png);
        assert_eq!(file_count(catalog.dir()), 1);
    }

    #[test]
    fn test_hash_every_listed_file_blocks_resubmission() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);
        let bytes = samples::jpeg(b"camera shot");
        let id = hasher::sha256_hex(&bytes);
        fs::write(catalog.dir().join(format!("{id}.jpeg")), &bytes).unwrap();

        // Alias spellings are not catalog records, so the store holds exactly one.
        let outcome = catalog.submit(&bytes).unwrap();
        assert!(!outcome.is_duplicate());
        assert_eq!(catalog.list().unwrap(), vec![format!("{id}.jpg")]);

        assert!(catalog.submit(&bytes).unwrap().is_duplicate());
        let matching: Vec<String> = catalog
            .list()
            .unwrap()
            .into_iter()
            .filter(|name| SceneRef::parse(name).is_some_and(|s| s.id == id))
            .collect();
        assert_eq!(matching.len(), 1);
    }

    #[test]
    fn test_format_keeps_original_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);

        let outcome = catalog.submit(&samples::jpeg(b"photo")).unwrap();
        assert_eq!(outcome.scene().format, SceneFormat::Jpeg);
        assert!(outcome.scene().file_name().ends_with(".jpg"));
    }

    #[test]
    fn test_submit_rejects_unknown_format() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);

        let err = catalog.submit(b"definitely not an image").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(None)));
        assert_eq!(file_count(catalog.dir()), 0);
    }

    #[test]
    fn test_submit_write_failure_is_storage_error() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);
        fs::remove_dir(catalog.dir()).unwrap();
        // The catalog path is now a regular file, so no image can be created under it.
        fs::write(catalog.dir(), b"").unwrap();

        let err = catalog.submit(&samples::png(b"x")).unwrap_err();
        assert!(err.is_storage_write());
        assert!(catalog.dir().is_file());
        assert_eq!(fs::read(catalog.dir()).unwrap(), b"");
    }

    #[test]
    fn test_token_write_failure_is_storage_error() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::RandomToken);
        fs::remove_dir(catalog.dir()).unwrap();

        let err = catalog.submit(&samples::png(b"x")).unwrap_err();
        assert!(err.is_storage_write());
        assert!(!catalog.dir().exists());
    }

    // ── submit: random token ────────────────────────────────────

    #[test]
    fn test_token_submit_twice_stores_twice() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::RandomToken);
        let bytes = samples::png(b"same content");

        let first = catalog.submit(&bytes).unwrap();
        let second = catalog.submit(&bytes).unwrap();

        assert!(!first.is_duplicate());
        assert!(!second.is_duplicate());
        assert_ne!(first.id(), second.id());
        assert_eq!(first.id().len(), hasher::TOKEN_LEN);
        assert_eq!(file_count(catalog.dir()), 2);
    }

    // ── list ────────────────────────────────────────────────────

    #[test]
    fn test_list_sorted_and_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);
        fs::write(catalog.dir().join("b.png"), b"x").unwrap();
        fs::write(catalog.dir().join("a.jpg"), b"x").unwrap();
        fs::write(catalog.dir().join("notes.txt"), b"x").unwrap();
        fs::write(catalog.dir().join(".png"), b"x").unwrap();
        fs::create_dir(catalog.dir().join("nested.png")).unwrap();

        assert_eq!(catalog.list().unwrap(), vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn test_list_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);
        assert!(catalog.list().unwrap().is_empty());
    }

    // ── locate ──────────────────────────────────────────────────

    #[test]
    fn test_locate() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);
        let outcome = catalog.submit(&samples::png(b"x")).unwrap();

        let path = catalog.locate(&outcome.scene().file_name()).unwrap();
        assert!(path.is_file());
        assert!(matches!(
            catalog.locate("missing.png"),
            Err(Error::ImageNotFound(_))
        ));
        assert!(matches!(
            catalog.locate("readme.md"),
            Err(Error::ImageNotFound(_))
        ));
    }

    // ── verify ──────────────────────────────────────────────────

    #[test]
    fn test_verify_clean_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);
        catalog.submit(&samples::png(b"1")).unwrap();
        catalog.submit(&samples::png(b"2")).unwrap();

        let report = catalog.verify().unwrap();
        assert_eq!(report.checked, 2);
        assert_eq!(report.skipped, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_verify_detects_tampering() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::ContentHash);
        let outcome = catalog.submit(&samples::png(b"1")).unwrap();
        fs::write(catalog.path_of(outcome.scene()), b"changed").unwrap();

        let report = catalog.verify().unwrap();
        assert_eq!(report.mismatched, vec![outcome.scene().file_name()]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_verify_skips_tokens() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = open(tmp.path(), IdPolicy::RandomToken);
        catalog.submit(&samples::png(b"1")).unwrap();

        let report = catalog.verify().unwrap();
        assert_eq!(report.checked, 0);
        assert_eq!(report.skipped, 1);
        assert!(report.is_clean());
    }

    // ── SceneRef ────────────────────────────────────────────────

    #[test]
    fn test_scene_ref_parse() {
        let scene = SceneRef::parse("abc.jpg").unwrap();
        assert_eq!(scene.id, "abc");
        assert_eq!(scene.format, SceneFormat::Jpeg);
        assert_eq!(scene.file_name(), "abc.jpg");
        assert!(SceneRef::parse("abc.jpeg").is_none());
        assert!(SceneRef::parse("abc").is_none());
        assert!(SceneRef::parse("abc.gif").is_none());
    }
}
