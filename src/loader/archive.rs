//! ZIP archive access
//!
//! The archive is a sequence of named byte streams. Every loader task opens
//! its own handle on the file so entries decompress independently.

use crate::loader::LoaderError;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::ZipArchive;

/// A named entry of the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position in the archive's central directory
    pub index: usize,
    pub name: String,
}

fn open(path: &Path) -> Result<ZipArchive<BufReader<File>>, LoaderError> {
    let file = File::open(path).map_err(|source| LoaderError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ZipArchive::new(BufReader::new(file))?)
}

/// List the file entries of the archive, skipping directories
pub fn list_entries(path: &Path) -> Result<Vec<ArchiveEntry>, LoaderError> {
    let mut archive = open(path)?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }
        entries.push(ArchiveEntry {
            index,
            name: file.name().to_string(),
        });
    }

    Ok(entries)
}

/// Open one entry and hand its decompressed stream to `f`
pub fn with_entry<T>(
    path: &Path,
    entry: &ArchiveEntry,
    f: impl FnOnce(&mut dyn Read) -> Result<T, LoaderError>,
) -> Result<T, LoaderError> {
    let mut archive = open(path)?;
    let file = archive.by_index(entry.index)?;
    let mut reader = BufReader::new(file);
    f(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    #[test]
    fn test_list_and_read_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.zip");

        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        zip.add_directory("nested/", options).unwrap();
        zip.start_file("users_1.json", options).unwrap();
        zip.write_all(br#"{"users": []}"#).unwrap();
        zip.start_file("nested/visits_1.json", options).unwrap();
        zip.write_all(br#"{"visits": []}"#).unwrap();
        zip.finish().unwrap();

        let entries = list_entries(&path).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["users_1.json", "nested/visits_1.json"]);

        let content = with_entry(&path, &entries[1], |reader| {
            let mut s = String::new();
            reader.read_to_string(&mut s).unwrap();
            Ok(s)
        })
        .unwrap();
        assert_eq!(content, r#"{"visits": []}"#);
    }

    #[test]
    fn test_missing_archive() {
        let dir = tempdir().unwrap();
        let err = list_entries(&dir.path().join("missing.zip")).unwrap_err();
        assert!(matches!(err, LoaderError::Open { .. }));
    }

    #[test]
    fn test_not_a_zip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.zip");
        std::fs::write(&path, b"definitely not a zip file").unwrap();

        assert!(matches!(
            list_entries(&path).unwrap_err(),
            LoaderError::Archive(_)
        ));
    }
}
