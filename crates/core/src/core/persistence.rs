use std::{
    fs,
    io::{ErrorKind, Write},
    path::Path,
};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{
    error::{Error, Result},
    table::MatchEntry,
};

/// Read a persisted table view.
///
/// A missing or unreadable file is not an error: the run starts from an
/// empty table instead.
pub fn load_table(path: &Path) -> Vec<MatchEntry> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("no rename table at {}, starting empty", path.display());
            return vec![];
        }
        Err(err) => {
            warn!("cannot read rename table {}: {}", path.display(), err);
            return vec![];
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|err| {
        warn!("discarding unparsable rename table {}: {}", path.display(), err);
        vec![]
    })
}

/// Overwrite `path` with `entries`.
///
/// The table is written to a sibling temporary file which then replaces the
/// target, so readers see either the previous table or the new one.
pub fn save_table(path: &Path, entries: &[MatchEntry]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    fs::create_dir_all(dir).map_err(|err| Error::io(dir, err))?;

    let json = serde_json::to_string(entries)?;

    let mut file = NamedTempFile::new_in(dir).map_err(|err| Error::io(dir, err))?;
    file.write_all(json.as_bytes())
        .map_err(|err| Error::io(file.path(), err))?;
    file.persist(path)
        .map_err(|err| Error::io(path, err.error))?;

    debug!("saved {} entries to {}", entries.len(), path.display());

    Ok(())
}

/// Delete a persisted table so the next run starts from scratch.
pub fn remove_table(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::io(path, err)),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::core::table::SelectorKind;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();

        assert!(load_table(&dir.path().join("nope.json")).is_empty());
    }

    #[test]
    fn garbage_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.json");
        fs::write(&path, "{not json").unwrap();

        assert!(load_table(&path).is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/table.json");
        let entries = vec![
            MatchEntry::new(".btn-primary", ".b", SelectorKind::Class),
            MatchEntry::new("#main-nav", "#c", SelectorKind::Id),
        ];

        save_table(&path, &entries).unwrap();

        assert_eq!(load_table(&path), entries);
    }

    #[test]
    fn save_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.json");

        save_table(&path, &[MatchEntry::new(".x", ".a", SelectorKind::Class)]).unwrap();
        save_table(&path, &[]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn remove_missing_is_ok() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.json");

        remove_table(&path).unwrap();
        fs::write(&path, "[]").unwrap();
        remove_table(&path).unwrap();

        assert!(!path.exists());
    }
}
