//! JSON patch files.
//!
//! A patch file is a JSON object keyed by channel, each holding an object keyed
//! by control number:
//!
//! ```json
//! { "2": { "20": 64, "21": 127 } }
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::{from_reader, to_writer_pretty};

use crate::channel::Channel;
use crate::error::PatchFileError;

use super::store::Patch;

type PatchFileData = BTreeMap<u8, BTreeMap<u8, u8>>;

/// Saves patches under a directory and loads them back.
#[derive(Debug, Clone)]
pub struct PatchDirectory {
    directory: PathBuf,
}

impl PatchDirectory {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// File name for a save made now, e.g. `patch-202403291530.json`.
    pub fn timestamped_name() -> String {
        format!("patch-{}.json", chrono::Local::now().format("%Y%m%d%H%M"))
    }

    /// Write `patch` to a new timestamped file and return its path.
    pub fn save(&self, patch: &Patch) -> Result<PathBuf, PatchFileError> {
        if !self.directory.as_os_str().is_empty() {
            fs::create_dir_all(&self.directory)?;
        }
        let path = self.directory.join(Self::timestamped_name());
        save_to(&path, patch)?;
        Ok(path)
    }

    pub fn load(&self, path: &Path) -> Result<Patch, PatchFileError> {
        load_from(path)
    }
}

/// Write `patch` to `path`, replacing any existing file.
pub fn save_to(path: &Path, patch: &Patch) -> Result<(), PatchFileError> {
    let mut data = PatchFileData::new();
    for (channel, control, value) in patch.iter() {
        data.entry(channel.get()).or_default().insert(control, value);
    }

    let file = File::create(path)?;
    to_writer_pretty(file, &data).map_err(PatchFileError::Serialize)?;
    Ok(())
}

/// Read a patch from `path`. Nothing is returned unless every entry is valid.
pub fn load_from(path: &Path) -> Result<Patch, PatchFileError> {
    if !path.is_file() {
        return Err(PatchFileError::NotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let data: PatchFileData =
        from_reader(BufReader::new(file)).map_err(|source| PatchFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut patch = Patch::new();
    for (channel, values) in data {
        let channel = Channel::new(channel).ok_or_else(|| PatchFileError::OutOfRange {
            path: path.to_path_buf(),
            detail: format!("channel {channel}"),
        })?;
        for (control, value) in values {
            if control > 127 || value > 127 {
                return Err(PatchFileError::OutOfRange {
                    path: path.to_path_buf(),
                    detail: format!("control {control} = {value} on channel {channel}"),
                });
            }
            patch.set(channel, control, value);
        }
    }

    Ok(patch)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let patches = PatchDirectory::new(temp_dir.path());

        let mut patch = Patch::new();
        patch.set(Channel::new(0).unwrap(), 12, 0);
        patch.set(Channel::new(2).unwrap(), 20, 64);
        patch.set(Channel::new(15).unwrap(), 127, 127);

        let path = patches.save(&patch).unwrap();
        assert!(path.starts_with(temp_dir.path()));

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("patch-") && name.ends_with(".json"));
        assert_eq!(name.len(), "patch-YYYYMMDDHHMM.json".len());

        assert_eq!(patches.load(&path).unwrap(), patch);
    }

    #[test]
    fn test_single_values_survive_a_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("single.json");

        for channel in [0, 1, 8, 15] {
            for control in [0, 12, 64, 127] {
                for value in [0, 1, 64, 126, 127] {
                    let channel = Channel::new(channel).unwrap();
                    let mut patch = Patch::new();
                    patch.set(channel, control, value);

                    save_to(&path, &patch).unwrap();
                    let loaded = load_from(&path).unwrap();
                    assert_eq!(loaded, patch, "{channel} {control} {value}");
                    assert!(loaded.has(channel, control));
                    assert_eq!(loaded.get(channel, control), value);
                }
            }
        }
    }

    #[test]
    fn test_full_patch_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("full.json");

        let mut patch = Patch::new();
        for channel in Channel::all() {
            for control in (0..=127u8).step_by(9).chain([127]) {
                let value = control.wrapping_add(channel.get() * 17) % 128;
                patch.set(channel, control, value);
            }
            patch.set(channel, 1, 0);
            patch.set(channel, 2, 127);
        }

        save_to(&path, &patch).unwrap();
        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.len(), patch.len());
        assert_eq!(loaded, patch);
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_from(&temp_dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, PatchFileError::NotFound(_)));
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ \"2\": [1, 2").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, PatchFileError::Parse { .. }));
    }

    #[test]
    fn test_out_of_range_channel() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("range.json");
        fs::write(&path, r#"{ "16": { "20": 1 } }"#).unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, PatchFileError::OutOfRange { .. }));
    }

    #[test]
    fn test_reads_string_keyed_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("legacy.json");
        fs::write(&path, r#"{"2": {"20": 64, "21": 127}}"#).unwrap();

        let patch = load_from(&path).unwrap();
        let channel = Channel::new(2).unwrap();
        assert_eq!(patch.get(channel, 20), 64);
        assert_eq!(patch.get(channel, 21), 127);
        assert_eq!(patch.len(), 2);
    }
}
