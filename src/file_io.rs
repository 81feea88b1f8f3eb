use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::PathBuf;

use log::debug;

use crate::entry::Document;
use crate::logging::log_error;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Sheet {path:?} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("Couldn't read sheet {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Couldn't write sheet {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// The sheet file holding the whole [`Document`].
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing file is an empty sheet; anything unreadable is an error.
    pub fn load(&self) -> Result<Document, Error> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No sheet at {:?} yet, starting empty", self.path);
                return Ok(Document::default());
            }
            Err(source) => {
                return Err(Error::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let document = from_str(&data).map_err(|reason| self.corrupt(reason))?;
        document
            .check_consistent()
            .map_err(|reason| self.corrupt(reason))?;

        Ok(document)
    }

    /// Replaces the sheet in one step: written next to it, then renamed over.
    pub fn save(&self, document: &Document) -> Result<(), Error> {
        let serialized = to_string(document).map_err(|err| Error::Write {
            path: self.path.clone(),
            source: err.into(),
        })?;
        let write_error = |source| Error::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(write_error)?;
            }
        }

        let temp = self.temp_path();
        let written = fs::write(&temp, serialized)
            .and_then(|()| fs::rename(&temp, &self.path));
        if let Err(source) = written {
            log_error(
                fs::remove_file(&temp),
                "Couldn't clean up temporary sheet",
            );
            return Err(write_error(source));
        }

        debug!("Saved sheet to {:?}", self.path);
        Ok(())
    }

    /// Raw bytes of the sheet as it is on disk.
    pub fn read_raw(&self) -> Result<Vec<u8>, Error> {
        fs::read(&self.path).map_err(|source| Error::Read {
            path: self.path.clone(),
            source,
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn corrupt(&self, reason: impl ToString) -> Error {
        Error::Corrupt {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

pub(crate) fn from_str(input: &str) -> Result<Document, serde_json::Error> {
    serde_json::from_str(input)
}

pub(crate) fn to_string(document: &Document) -> Result<String, serde_json::Error> {
    let mut serialized = serde_json::to_string_pretty(document)?;
    serialized.push('\n');
    Ok(serialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Stamp, WorkEntry};

    fn at(millis: i64) -> Stamp {
        Stamp::from_millisecond(1_700_000_000_000 + millis).unwrap()
    }

    fn sample() -> Document {
        let mut done = WorkEntry::open("writing", at(0));
        done.tags.insert("draft".to_owned());
        done.tags.insert("blog".to_owned());
        done.notes.push("first pass".to_owned());
        done.close(at(300_000));

        Document {
            work: vec![done.clone(), WorkEntry::open("review", at(300_000))],
            interrupt_stack: vec![done],
        }
    }

    #[test]
    fn missing_file_is_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("sheet.json"));
        assert_eq!(store.load().unwrap(), Document::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nested/sheet.json"));
        let document = sample();

        store.save(&document).unwrap();
        assert_eq!(store.load().unwrap(), document);
        assert!(!dir.path().join("nested/sheet.json.tmp").exists());
    }

    #[test]
    fn tag_insertion_order_does_not_matter() {
        let mut a = WorkEntry::open("t", at(0));
        a.tags.extend(["x".to_owned(), "y".to_owned()]);
        let mut b = WorkEntry::open("t", at(0));
        b.tags.extend(["y".to_owned(), "x".to_owned()]);

        let doc = |entry| Document {
            work: vec![entry],
            interrupt_stack: vec![],
        };
        assert_eq!(
            to_string(&doc(a)).unwrap(),
            to_string(&doc(b)).unwrap()
        );
    }

    #[test]
    fn serialized_form_is_stable() {
        let mut entry = WorkEntry::open("writing", at(0));
        entry.tags.insert("draft".to_owned());
        entry.close(at(300_000));
        let document = Document {
            work: vec![entry],
            interrupt_stack: vec![],
        };

        let expected = r#"{
  "work": [
    {
      "name": "writing",
      "start": "2023-11-14T22:13:20.000Z",
      "end": "2023-11-14T22:18:20.000Z",
      "total_mins": 5.0,
      "tags": [
        "draft"
      ]
    }
  ],
  "interrupt_stack": []
}
"#;
        assert_eq!(to_string(&document).unwrap(), expected);
    }

    #[test]
    fn malformed_files_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.json");
        let store = Store::new(&path);

        for content in [
            "not json",
            r#"{"work": [{"name": "a"}], "interrupt_stack": []}"#,
            r#"{"work": [{"name": "a", "start": "2023-11-14T22:13:20Z"}]}"#,
            r#"{"work": [], "interrupt_stack": [], "extra": 1}"#,
            r#"{"work": [
                {"name": "a", "start": "2023-11-14T22:13:20.000Z"},
                {"name": "b", "start": "2023-11-14T22:14:20.000Z"}
            ]}"#,
            r#"{"work": [], "interrupt_stack": [
                {"name": "a", "start": "2023-11-14T22:13:20.000Z",
                 "end": "2023-11-14T22:14:20.000Z"}
            ]}"#,
            r#"{"work": [
                {"name": "a", "start": "2023-11-14T22:13:20.000Z", "total_mins": 1.0}
            ]}"#,
        ] {
            fs::write(&path, content).unwrap();
            assert!(
                matches!(store.load(), Err(Error::Corrupt { .. })),
                "{content}"
            );
        }
    }

    #[test]
    fn failed_save_keeps_previous_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.json");
        let store = Store::new(&path);
        store.save(&sample()).unwrap();

        // A directory squatting on the temp name makes the write fail.
        fs::create_dir(dir.path().join("sheet.json.tmp")).unwrap();
        let result = store.save(&Document::default());

        assert!(matches!(result, Err(Error::Write { .. })));
        assert_eq!(store.load().unwrap(), sample());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn partial_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.json");
        let temp = dir.path().join("sheet.json.tmp");
        let store = Store::new(&path);
        store.save(&sample()).unwrap();

        // Writes through this link fail like a full disk.
        std::os::unix::fs::symlink("/dev/full", &temp).unwrap();
        let result = store.save(&Document::default());

        assert!(matches!(result, Err(Error::Write { .. })));
        assert!(fs::symlink_metadata(&temp).is_err());
        assert_eq!(store.load().unwrap(), sample());
    }
}
