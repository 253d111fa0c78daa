//! Media discovery
//!
//! Walks a source tree and classifies every file as a photo or a video
//! by its extension. Unreadable sub-paths are skipped so that one bad
//! directory never aborts the whole scan.

use crate::config::{Config, FileTypes};
use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Media classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Photo => "Photo",
            MediaKind::Video => "Video",
        }
    }
}

/// File system metadata used by the stat-based sort modes
///
/// Each field is `None` when the platform or file system cannot provide it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryStat {
    pub created: Option<SystemTime>,
    pub modified: Option<SystemTime>,
    pub size: Option<u64>,
}

/// One discovered media file
#[derive(Debug, Clone)]
pub struct MediaEntry {
    path: PathBuf,
    kind: MediaKind,
    stat: OnceCell<EntryStat>,
}

impl MediaEntry {
    pub fn new(path: PathBuf, kind: MediaKind) -> Self {
        Self {
            path,
            kind,
            stat: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    /// Base filename, lossily converted for display and name-based ordering
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Metadata, read on first access and cached
    ///
    /// A missing or unreadable file yields an all-`None` stat.
    pub fn stat(&self) -> &EntryStat {
        self.stat.get_or_init(|| match fs::metadata(&self.path) {
            Ok(metadata) => EntryStat {
                created: metadata.created().ok(),
                modified: metadata.modified().ok(),
                size: Some(metadata.len()),
            },
            Err(e) => {
                debug!(path = ?self.path, error = %e, "Metadata unavailable");
                EntryStat::default()
            }
        })
    }
}

/// Walks source trees and classifies media files
#[derive(Debug, Clone)]
pub struct MediaCatalog {
    image_extensions: Vec<String>,
    video_extensions: Vec<String>,
    exclude_dirs: Vec<PathBuf>,
}

impl MediaCatalog {
    pub fn new(config: &Config) -> Self {
        Self {
            image_extensions: config.image_extensions.clone(),
            video_extensions: config.video_extensions.clone(),
            exclude_dirs: Vec::new(),
        }
    }

    /// Skip these directories (and everything below them) while walking
    pub fn with_excluded(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.exclude_dirs.extend(dirs);
        self
    }

    /// Classify a path by its extension alone
    pub fn classify(&self, path: &Path) -> Option<MediaKind> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if self.image_extensions.iter().any(|e| e == &ext) {
            Some(MediaKind::Photo)
        } else if self.video_extensions.iter().any(|e| e == &ext) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Recursively collect media under `root`, in visitation order
    pub fn discover(&self, root: &Path, file_types: FileTypes) -> Vec<MediaEntry> {
        let mut entries = Vec::new();
        let mut skipped = 0usize;

        let walker = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !self.is_excluded_dir(e.path()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = ?e.path(), error = %e, "Skipping unreadable path");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            match self.classify(path) {
                Some(MediaKind::Photo) if file_types.photos_allowed() => {
                    entries.push(MediaEntry::new(path.to_path_buf(), MediaKind::Photo));
                }
                Some(MediaKind::Video) if file_types.videos_allowed() => {
                    entries.push(MediaEntry::new(path.to_path_buf(), MediaKind::Video));
                }
                _ => {
                    debug!(?path, "Not offered for triage");
                    skipped += 1;
                }
            }
        }

        info!(
            root = %root.display(),
            found = entries.len(),
            skipped,
            "Media discovery finished"
        );
        entries
    }

    fn is_excluded_dir(&self, path: &Path) -> bool {
        self.exclude_dirs.iter().any(|exclude| path == exclude)
    }
}
