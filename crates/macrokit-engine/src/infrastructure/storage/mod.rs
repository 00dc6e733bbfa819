//! Macro persistence.
//!
//! Each macro lives in its own JSON document under the store directory,
//! named after the macro with filesystem-hostile characters replaced.
//! The store never keeps an index file: the directory listing is the
//! catalog, so macros can be copied in and out by hand.

use std::fs;
use std::path::{Path, PathBuf};

use macrokit_core::{macro_from_document, macro_to_document, FormatError, Macro};
use thiserror::Error;
use tracing::{debug, warn};

pub mod config;

/// Error type for macro store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No macro with this name exists in the store.
    #[error("macro '{0}' not found")]
    NotFound(String),

    /// A macro with this name already exists.
    #[error("macro '{0}' already exists")]
    Conflict(String),

    /// A file system I/O error occurred.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The macro document could not be parsed or serialized.
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Directory-backed JSON macro store.
pub struct MacroStore {
    dir: PathBuf,
}

impl MacroStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// The directory this store reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_file_name(name)))
    }

    /// Writes `macro_def` to disk, overwriting any previous version of the
    /// same name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Format`].
    pub fn save(&self, macro_def: &Macro) -> Result<(), StoreError> {
        let path = self.path_for(&macro_def.name);
        let document = macro_to_document(macro_def)?;
        fs::write(&path, document).map_err(|source| StoreError::Io { path, source })?;
        debug!(name = %macro_def.name, "macro saved");
        Ok(())
    }

    /// Loads the macro named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no file exists for the name,
    /// [`StoreError::Io`] for other file-system errors, and
    /// [`StoreError::Format`] for malformed documents.
    pub fn load(&self, name: &str) -> Result<Macro, StoreError> {
        let path = self.path_for(name);
        let document = match fs::read_to_string(&path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()));
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(macro_from_document(&document)?)
    }

    /// Loads every readable macro in the store, sorted by name.
    ///
    /// Unreadable or malformed files are skipped with a warning so one bad
    /// document cannot take the whole library down.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] only if the directory itself cannot be
    /// listed.
    pub fn load_all(&self) -> Result<Vec<Macro>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut macros = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match fs::read_to_string(&path).map_err(FileReadError::Io).and_then(|d| {
                macro_from_document(&d).map_err(FileReadError::Format)
            }) {
                Ok(macro_def) => macros.push(macro_def),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable macro file"),
            }
        }
        macros.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(macros)
    }

    /// Deletes the macro named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such macro exists.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Renames a macro, rewriting its document under the new name and
    /// removing the old file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when a macro named `new_name`
    /// already exists, and [`StoreError::NotFound`] when `old_name` does
    /// not.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<(), StoreError> {
        if old_name == new_name {
            return Ok(());
        }
        if self.path_for(new_name).exists() {
            return Err(StoreError::Conflict(new_name.to_string()));
        }
        let mut macro_def = self.load(old_name)?;
        macro_def.name = new_name.to_string();
        self.save(&macro_def)?;
        self.delete(old_name)
    }

    /// Copies the macro's document to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the macro does not exist and
    /// [`StoreError::Io`] if the destination cannot be written.
    pub fn export(&self, name: &str, destination: &Path) -> Result<(), StoreError> {
        let macro_def = self.load(name)?;
        let document = macro_to_document(&macro_def)?;
        fs::write(destination, document).map_err(|source| StoreError::Io {
            path: destination.to_path_buf(),
            source,
        })
    }

    /// Imports a macro document from `source` into the store and returns
    /// the name it was stored under. When the name collides with an
    /// existing macro, a " (n)" suffix is appended, n counting up from 1
    /// until the name is free.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the source cannot be read and
    /// [`StoreError::Format`] if it is not a valid macro document.
    pub fn import(&self, source: &Path) -> Result<String, StoreError> {
        let document = fs::read_to_string(source).map_err(|src| StoreError::Io {
            path: source.to_path_buf(),
            source: src,
        })?;
        let mut macro_def = macro_from_document(&document)?;

        let base = macro_def.name.clone();
        let mut candidate = base.clone();
        let mut n = 1u32;
        while self.path_for(&candidate).exists() {
            candidate = format!("{base} ({n})");
            n += 1;
        }

        macro_def.name = candidate.clone();
        self.save(&macro_def)?;
        Ok(candidate)
    }
}

/// Intermediate error for load_all's per-file skip path.
#[derive(Debug, Error)]
enum FileReadError {
    #[error("{0}")]
    Io(std::io::Error),
    #[error("{0}")]
    Format(FormatError),
}

/// Replaces characters Windows refuses in file names with underscores.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use macrokit_core::Event;

    use super::*;

    fn temp_store(tag: &str) -> MacroStore {
        let dir = std::env::temp_dir().join(format!(
            "macrokit_store_{tag}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        MacroStore::open(dir).expect("open temp store")
    }

    fn sample_macro(name: &str) -> Macro {
        let mut macro_def = Macro::new(name).unwrap();
        macro_def.push_event(Event::key_press("a"));
        macro_def.push_event(Event::delay(Duration::from_millis(120)));
        macro_def.push_event(Event::key_release("a"));
        macro_def
    }

    #[test]
    fn test_save_then_load_returns_equal_macro() {
        // Arrange
        let store = temp_store("roundtrip");
        let macro_def = sample_macro("Open Editor");

        // Act
        store.save(&macro_def).unwrap();
        let loaded = store.load("Open Editor").unwrap();

        // Assert
        assert_eq!(loaded, macro_def);

        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_load_missing_macro_reports_not_found() {
        let store = temp_store("missing");

        let result = store.load("nope");

        assert!(matches!(result, Err(StoreError::NotFound(name)) if name == "nope"));
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_hostile_name_is_sanitized_on_disk_but_kept_in_document() {
        // Arrange
        let store = temp_store("sanitize");
        let macro_def = sample_macro("ops: build/deploy?");

        // Act
        store.save(&macro_def).unwrap();

        // Assert – the file name is sanitized, the stored name is not
        let expected_file = store.dir().join("ops_ build_deploy_.json");
        assert!(expected_file.exists());
        let loaded = store.load("ops: build/deploy?").unwrap();
        assert_eq!(loaded.name, "ops: build/deploy?");

        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_load_all_skips_malformed_files() {
        // Arrange
        let store = temp_store("skip_bad");
        store.save(&sample_macro("good one")).unwrap();
        store.save(&sample_macro("another good one")).unwrap();
        std::fs::write(store.dir().join("broken.json"), "{ not json").unwrap();
        std::fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

        // Act
        let macros = store.load_all().unwrap();

        // Assert – sorted by name, bad file skipped
        let names: Vec<&str> = macros.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["another good one", "good one"]);

        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_delete_removes_file_and_second_delete_fails() {
        let store = temp_store("delete");
        store.save(&sample_macro("ephemeral")).unwrap();

        assert!(store.delete("ephemeral").is_ok());
        assert!(matches!(
            store.delete("ephemeral"),
            Err(StoreError::NotFound(_))
        ));
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_rename_rejects_existing_target() {
        let store = temp_store("rename_conflict");
        store.save(&sample_macro("alpha")).unwrap();
        store.save(&sample_macro("beta")).unwrap();

        let result = store.rename("alpha", "beta");

        assert!(matches!(result, Err(StoreError::Conflict(name)) if name == "beta"));
        // Original is untouched
        assert!(store.load("alpha").is_ok());
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_rename_updates_stored_name() {
        let store = temp_store("rename");
        store.save(&sample_macro("draft")).unwrap();

        store.rename("draft", "final").unwrap();

        assert!(matches!(store.load("draft"), Err(StoreError::NotFound(_))));
        assert_eq!(store.load("final").unwrap().name, "final");
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_import_appends_numeric_suffix_on_collision() {
        // Arrange
        let store = temp_store("import");
        store.save(&sample_macro("login")).unwrap();

        let outside = store.dir().join("incoming.json");
        let document = macro_to_document(&sample_macro("login")).unwrap();
        // Keep the incoming file out of the store's .json listing
        let outside = outside.with_extension("import");
        std::fs::write(&outside, document).unwrap();

        // Act
        let first = store.import(&outside).unwrap();
        let second = store.import(&outside).unwrap();

        // Assert
        assert_eq!(first, "login (1)");
        assert_eq!(second, "login (2)");
        assert_eq!(store.load("login (1)").unwrap().name, "login (1)");

        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_export_writes_loadable_document() {
        // Arrange
        let store = temp_store("export");
        let macro_def = sample_macro("to share");
        store.save(&macro_def).unwrap();
        let destination = store.dir().join("shared.export");

        // Act
        store.export("to share", &destination).unwrap();

        // Assert
        let document = std::fs::read_to_string(&destination).unwrap();
        assert_eq!(macro_from_document(&document).unwrap(), macro_def);

        std::fs::remove_dir_all(store.dir()).ok();
    }
}
