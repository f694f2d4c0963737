//! Registry backup of schema files.
//!
//! Mirrors every schema file under a commons tree into a backup tree,
//! preserving relative paths. The backup only ever adds or overwrites;
//! removing retired schemas from the backup is a deliberate manual step
//! since registered subjects outlive their definitions.

use crate::error::RegistrationError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SCHEMA_EXTENSION: &str = "avsc";

/// What the backup did with one schema file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BackupOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Per-file outcomes of one backup run, keyed by path relative to the
/// commons root.
#[derive(Debug, Default)]
pub struct BackupReport {
    pub entries: BTreeMap<PathBuf, BackupOutcome>,
}

impl BackupReport {
    /// Whether the run changed nothing.
    pub fn is_unchanged(&self) -> bool {
        self.entries
            .values()
            .all(|outcome| *outcome == BackupOutcome::Unchanged)
    }

    pub fn count(&self, outcome: BackupOutcome) -> usize {
        self.entries
            .values()
            .filter(|entry| **entry == outcome)
            .count()
    }
}

/// Mirror every `.avsc` file under `commons_root` into `backup_root`.
///
/// Unchanged files are detected by byte comparison and left untouched so
/// repeated runs are idempotent.
pub fn backup_schemas(
    commons_root: &Path,
    backup_root: &Path,
) -> Result<BackupReport, RegistrationError> {
    if !commons_root.is_dir() {
        return Err(RegistrationError::MissingRoot(commons_root.to_path_buf()));
    }

    let mut files = Vec::new();
    collect_schemas(commons_root, &mut files)?;
    files.sort();

    let mut report = BackupReport::default();
    for path in files {
        let Ok(relative) = path.strip_prefix(commons_root).map(Path::to_path_buf) else {
            continue;
        };
        let destination = backup_root.join(&relative);
        let outcome = copy_if_changed(&path, &destination)?;
        debug!(path = %relative.display(), ?outcome, "backed up schema");
        report.entries.insert(relative, outcome);
    }

    info!(
        created = report.count(BackupOutcome::Created),
        updated = report.count(BackupOutcome::Updated),
        unchanged = report.count(BackupOutcome::Unchanged),
        "schema backup finished"
    );
    Ok(report)
}

fn copy_if_changed(source: &Path, destination: &Path) -> Result<BackupOutcome, RegistrationError> {
    let contents = fs::read(source).map_err(|err| RegistrationError::Read {
        path: source.to_path_buf(),
        source: err,
    })?;

    let outcome = match fs::read(destination) {
        Ok(existing) if existing == contents => return Ok(BackupOutcome::Unchanged),
        Ok(_) => BackupOutcome::Updated,
        Err(_) => BackupOutcome::Created,
    };

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|err| RegistrationError::Write {
            path: parent.to_path_buf(),
            source: err,
        })?;
    }
    fs::write(destination, contents).map_err(|err| RegistrationError::Write {
        path: destination.to_path_buf(),
        source: err,
    })?;
    Ok(outcome)
}

fn collect_schemas(dir: &Path, acc: &mut Vec<PathBuf>) -> Result<(), RegistrationError> {
    let entries = fs::read_dir(dir).map_err(|err| RegistrationError::Read {
        path: dir.to_path_buf(),
        source: err,
    })?;
    for entry in entries {
        let entry = entry.map_err(|err| RegistrationError::Read {
            path: dir.to_path_buf(),
            source: err,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_schemas(&path, acc)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SCHEMA_EXTENSION))
        {
            acc.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_schema(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn backup_mirrors_and_is_idempotent() {
        let commons = TempDir::new().expect("temp dir");
        let backup = TempDir::new().expect("temp dir");
        write_schema(
            commons.path(),
            "passive/empatica/empatica_e4_acceleration.avsc",
            "{\"name\": \"EmpaticaE4Acceleration\"}",
        );
        write_schema(commons.path(), "passive/empatica/README.md", "not a schema");

        let report = backup_schemas(commons.path(), backup.path()).unwrap();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.count(BackupOutcome::Created), 1);
        assert!(
            backup
                .path()
                .join("passive/empatica/empatica_e4_acceleration.avsc")
                .is_file()
        );

        let again = backup_schemas(commons.path(), backup.path()).unwrap();
        assert!(again.is_unchanged());

        write_schema(
            commons.path(),
            "passive/empatica/empatica_e4_acceleration.avsc",
            "{\"name\": \"EmpaticaE4Acceleration\", \"doc\": \"updated\"}",
        );
        let updated = backup_schemas(commons.path(), backup.path()).unwrap();
        assert_eq!(updated.count(BackupOutcome::Updated), 1);
    }

    #[test]
    fn missing_commons_root_is_an_error() {
        let backup = TempDir::new().expect("temp dir");
        let err = backup_schemas(Path::new("/nonexistent/commons"), backup.path()).unwrap_err();
        assert!(matches!(err, RegistrationError::MissingRoot(_)));
    }
}
