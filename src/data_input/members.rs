// src/data_input/members.rs

//! Named-member containers a flight log can be loaded from.
//!
//! A recovered flight log ships as three members: the packet table, the state table and
//! one `.config` file. They arrive either zipped together or unpacked into a directory;
//! [`MemberSource`] hides which.

use std::fs::{self, File};
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::constants::{
    CONFIG_FILE_SUFFIX, CSV_EXTENSION, MAX_MEMBER_PREALLOC, NPY_EXTENSION, PACKET_DATA_STEM, STATE_DATA_STEM,
};
use crate::error::{FlightDataError, Result};

/// Encoding of the two data members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberFormat {
    /// Binary `.npy` arrays.
    #[default]
    Npy,
    /// Comma-separated text with one header row.
    Csv,
}

impl MemberFormat {
    pub fn extension(self) -> &'static str {
        match self {
            MemberFormat::Npy => NPY_EXTENSION,
            MemberFormat::Csv => CSV_EXTENSION,
        }
    }

    /// `packet_data.npy` or `packet_data.csv`.
    pub fn packet_member(self) -> String {
        format!("{PACKET_DATA_STEM}.{}", self.extension())
    }

    /// `state_data.npy` or `state_data.csv`.
    pub fn state_member(self) -> String {
        format!("{STATE_DATA_STEM}.{}", self.extension())
    }
}

/// First member whose name ends in `.config`, in listing order.
pub fn find_config_member(names: &[String]) -> Option<&str> {
    names
        .iter()
        .map(String::as_str)
        .find(|name| name.ends_with(CONFIG_FILE_SUFFIX))
}

/// A container of named byte members.
pub trait MemberSource {
    /// Where the members come from, for log and error messages.
    fn location(&self) -> &Path;

    /// Member names in the container's own order.
    fn member_names(&mut self) -> Result<Vec<String>>;

    /// Full contents of one member. A name that is not present yields `MissingMember`.
    fn read_member(&mut self, name: &str) -> Result<Vec<u8>>;
}

/// Members of a zip archive.
pub struct ZipMembers<R: Read + Seek> {
    archive: ZipArchive<R>,
    path: PathBuf,
}

impl ZipMembers<File> {
    /// Open an archive on disk. An unreadable container is `InvalidArchive`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| FlightDataError::io(path, e))?;
        Self::new(file, path)
    }
}

impl<R: Read + Seek> ZipMembers<R> {
    /// Wrap an already opened stream; `path` is only used for reporting.
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let archive = ZipArchive::new(reader).map_err(|source| FlightDataError::InvalidArchive {
            path: path.clone(),
            source,
        })?;
        debug!(archive = %path.display(), members = archive.len(), "Opened archive");
        Ok(Self { archive, path })
    }
}

impl<R: Read + Seek> MemberSource for ZipMembers<R> {
    fn location(&self) -> &Path {
        &self.path
    }

    fn member_names(&mut self) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(self.archive.len());
        for i in 0..self.archive.len() {
            let entry = self.archive.by_index(i).map_err(|source| FlightDataError::InvalidArchive {
                path: self.path.clone(),
                source,
            })?;
            names.push(entry.name().to_string());
        }
        Ok(names)
    }

    fn read_member(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(FlightDataError::MissingMember { name: name.to_string() }),
            Err(source) => {
                return Err(FlightDataError::InvalidArchive {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let mut bytes = Vec::with_capacity(preallocation_hint(entry.size()));
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| FlightDataError::format(name, e))?;
        Ok(bytes)
    }
}

/// Buffer size to reserve for a member whose header declares `declared` bytes.
///
/// The declared size is untrusted, so it is only a hint and is capped.
fn preallocation_hint(declared: u64) -> usize {
    declared.min(MAX_MEMBER_PREALLOC) as usize
}

/// Members stored as plain files in one directory.
pub struct DirectoryMembers {
    dir: PathBuf,
}

impl DirectoryMembers {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MemberSource for DirectoryMembers {
    fn location(&self) -> &Path {
        &self.dir
    }

    /// Regular files only, sorted by name so the `.config` pick is stable.
    fn member_names(&mut self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| FlightDataError::io(&self.dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FlightDataError::io(&self.dir, e))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if is_file {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_member(&mut self, name: &str) -> Result<Vec<u8>> {
        let path = self.dir.join(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FlightDataError::MissingMember { name: name.to_string() })
            }
            Err(e) => Err(FlightDataError::io(path, e)),
        }
    }
}


// src/data_input/members.rs
