// SPDX-License-Identifier: GPL-3.0-only

//! Output target resolution for captured photos and videos
//!
//! Persistent captures go to a dedicated folder under the public pictures or
//! videos directory. Temporary captures get a uniquely named file in the
//! application's private cache directory.

use crate::config::Config;
use crate::constants::{media_type, naming};
use crate::errors::StorageError;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Suffixed names tried before giving up on a persistent file name
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Kind of media being written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// File name prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            MediaKind::Image => "IMG_",
            MediaKind::Video => "VID_",
        }
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

impl TryFrom<i32> for MediaKind {
    type Error = StorageError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            media_type::IMAGE => Ok(MediaKind::Image),
            media_type::VIDEO => Ok(MediaKind::Video),
            other => {
                error!(media_type = other, "Unsupported media type");
                Err(StorageError::UnsupportedMediaKind(other))
            }
        }
    }
}

/// Whether a destination outlives the application cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    Persistent,
    Temporary,
}

/// A resolved output location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDestination {
    pub path: PathBuf,
    pub persistence: Persistence,
}

impl MediaDestination {
    /// `file://` URI for the destination
    pub fn uri(&self) -> String {
        file_uri(&self.path)
    }
}

/// Render a path as a `file://` URI
pub fn file_uri(path: &Path) -> String {
    url::Url::from_file_path(path)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| format!("file://{}", path.display()))
}

/// Root directories that destinations are resolved against
#[derive(Debug, Clone)]
pub struct StorageLocations {
    pictures_dir: PathBuf,
    videos_dir: PathBuf,
    cache_dir: PathBuf,
    subdirectory: String,
}

impl StorageLocations {
    pub fn new(
        pictures_dir: PathBuf,
        videos_dir: PathBuf,
        cache_dir: PathBuf,
        subdirectory: impl Into<String>,
    ) -> Self {
        Self {
            pictures_dir,
            videos_dir,
            cache_dir,
            subdirectory: subdirectory.into(),
        }
    }

    /// Resolve the platform directories, honouring config overrides
    pub fn from_config(config: &Config) -> Self {
        let home = || dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        let pictures_dir = config
            .pictures_dir
            .clone()
            .or_else(dirs::picture_dir)
            .unwrap_or_else(home);
        let videos_dir = config
            .videos_dir
            .clone()
            .or_else(dirs::video_dir)
            .unwrap_or_else(home);
        let cache_dir = config
            .cache_dir
            .clone()
            .unwrap_or_else(|| {
                dirs::cache_dir()
                    .unwrap_or_else(std::env::temp_dir)
                    .join(naming::CACHE_FOLDER)
            });

        Self::new(
            pictures_dir,
            videos_dir,
            cache_dir,
            config.media_subdirectory.clone(),
        )
    }

    /// Directory that persistent media of `kind` is written to
    pub fn media_dir(&self, kind: MediaKind) -> PathBuf {
        let root = match kind {
            MediaKind::Image => &self.pictures_dir,
            MediaKind::Video => &self.videos_dir,
        };
        root.join(&self.subdirectory)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Resolve a destination for a new capture
    pub fn resolve(
        &self,
        kind: MediaKind,
        persistence: Persistence,
    ) -> Result<MediaDestination, StorageError> {
        let path = match persistence {
            Persistence::Persistent => self.persistent_file(kind)?,
            Persistence::Temporary => self.temporary_file(kind)?,
        };

        debug!(path = %path.display(), ?kind, ?persistence, "Resolved media destination");
        Ok(MediaDestination { path, persistence })
    }

    /// Resolve a destination from a raw media type code
    pub fn resolve_code(
        &self,
        media_type: i32,
        persistence: Persistence,
    ) -> Result<MediaDestination, StorageError> {
        self.resolve(MediaKind::try_from(media_type)?, persistence)
    }

    /// Claim `IMG_<timestamp>.jpg`, or `IMG_<timestamp>_<n>.jpg` when that is taken
    fn persistent_file(&self, kind: MediaKind) -> Result<PathBuf, StorageError> {
        let dir = self.media_dir(kind);
        ensure_dir(&dir)?;

        let stamp = timestamp();
        let mut attempt = 0;
        loop {
            let filename = match attempt {
                0 => format!("{}{}.{}", kind.prefix(), stamp, kind.extension()),
                n => format!("{}{}_{}.{}", kind.prefix(), stamp, n, kind.extension()),
            };
            let path = dir.join(filename);

            match create_exclusive(&path) {
                Ok(()) => return Ok(path),
                Err(source)
                    if source.kind() == ErrorKind::AlreadyExists
                        && attempt < MAX_NAME_ATTEMPTS =>
                {
                    debug!(path = %path.display(), "Media file name taken, adding a suffix");
                    attempt += 1;
                }
                Err(source) => return Err(StorageError::FileCreation { path, source }),
            }
        }
    }

    fn temporary_file(&self, kind: MediaKind) -> Result<PathBuf, StorageError> {
        ensure_dir(&self.cache_dir)?;

        let unique = uuid::Uuid::new_v4().simple().to_string();
        let filename = format!(
            "{}{}_{}.{}",
            kind.prefix(),
            timestamp(),
            &unique[..12],
            kind.extension()
        );
        let path = self.cache_dir.join(filename);

        create_exclusive(&path).map_err(|source| StorageError::FileCreation {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

fn create_exclusive(path: &Path) -> std::io::Result<()> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(drop)
}

fn timestamp() -> String {
    chrono::Local::now()
        .format(naming::TIMESTAMP_FORMAT)
        .to_string()
}

fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    if dir.is_dir() {
        return Ok(());
    }

    std::fs::create_dir_all(dir).map_err(|source| {
        error!(path = %dir.display(), error = %source, "Failed to create directory");
        StorageError::DirectoryCreation {
            path: dir.to_path_buf(),
            source,
        }
    })?;

    info!(path = %dir.display(), "Created media directory");
    Ok(())
}
