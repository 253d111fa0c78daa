//! Hotkey assignment and destination routing

use crate::error::{Error, Result};
use std::fs;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use tracing::debug;

/// Fewest destinations a triage session accepts
pub const MIN_DESTINATIONS: usize = 2;

/// Digits 1-9 followed by letters A-Z
pub const MAX_DESTINATIONS: usize = 35;

/// Hotkey for the destination at `index`: '1'..='9', then 'A'..='Z'
pub fn assign_hotkey(index: usize) -> Result<char> {
    if index < 9 {
        return Ok(char::from(b'1' + index as u8));
    }
    let letter = index - 9;
    if letter >= 26 {
        return Err(Error::TooManyDestinations { count: index + 1 });
    }
    Ok(char::from(b'A' + letter as u8))
}

/// Final path segment for display, or the whole path when it has none
pub fn destination_label(path: &Path) -> String {
    let text = path.to_string_lossy();
    let trimmed = text.trim_end_matches(['/', MAIN_SEPARATOR]);
    let cleaned = if trimmed.is_empty() { text.as_ref() } else { trimmed };
    match Path::new(cleaned).file_name() {
        Some(name) if !name.is_empty() => name.to_string_lossy().into_owned(),
        _ => cleaned.to_string(),
    }
}

/// One routing key and where it sends files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationBinding {
    pub key: char,
    pub path: PathBuf,
    pub label: String,
}

/// Fixed key → destination map
#[derive(Debug, Clone)]
pub struct DestinationRouter {
    bindings: Vec<DestinationBinding>,
}

impl DestinationRouter {
    /// Bind hotkeys to `destinations` in order and create each directory
    pub fn new(destinations: &[PathBuf]) -> Result<Self> {
        if destinations.len() < MIN_DESTINATIONS {
            return Err(Error::Validation(format!(
                "at least {} destination directories are required, got {}",
                MIN_DESTINATIONS,
                destinations.len()
            )));
        }
        if destinations.len() > MAX_DESTINATIONS {
            return Err(Error::TooManyDestinations {
                count: destinations.len(),
            });
        }

        let mut bindings = Vec::with_capacity(destinations.len());
        for (index, path) in destinations.iter().enumerate() {
            let key = assign_hotkey(index)?;
            fs::create_dir_all(path)?;
            debug!(%key, path = %path.display(), "Destination bound");
            bindings.push(DestinationBinding {
                key,
                path: path.clone(),
                label: destination_label(path),
            });
        }

        Ok(Self { bindings })
    }

    pub fn bindings(&self) -> &[DestinationBinding] {
        &self.bindings
    }

    /// Binding for a typed character; letters match either case
    pub fn resolve(&self, key: char) -> Option<&DestinationBinding> {
        let key = key.to_ascii_uppercase();
        self.bindings.iter().find(|binding| binding.key == key)
    }

    /// "'1' for Keep, '2' for Trash"
    pub fn instruction_text(&self) -> String {
        self.bindings
            .iter()
            .map(|binding| format!("'{}' for {}", binding.key, binding.label))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
