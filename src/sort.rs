//! Ordering strategies for the triage sequence
//!
//! Every mode is a (key extractor, direction) pair. Sorting is stable and
//! the direction only flips comparisons between unequal keys, so entries
//! with equal keys keep their discovery order in both directions.

use crate::catalog::MediaEntry;
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Alternating digit / non-digit runs of a filename
static NATURAL_RUNS: OnceLock<Regex> = OnceLock::new();

fn natural_runs() -> &'static Regex {
    NATURAL_RUNS.get_or_init(|| Regex::new(r"[0-9]+|[^0-9]+").expect("natural sort pattern is valid"))
}

/// Which value a mode orders by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Case-folded base filename
    Alphabetic,
    /// Filename with embedded numbers compared by value
    Natural,
    Created,
    Modified,
    Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Built-in sort modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    Name,
    NameRev,
    Natural,
    NaturalRev,
    Created,
    CreatedRev,
    Modified,
    ModifiedRev,
    Size,
    SizeRev,
}

/// (mode, key, label, extractor, direction)
static MODE_TABLE: [(SortMode, &str, &str, SortKey, Direction); 10] = [
    (SortMode::Name, "name", "Name (A-Z)", SortKey::Alphabetic, Direction::Ascending),
    (SortMode::NameRev, "name-rev", "Name (Z-A)", SortKey::Alphabetic, Direction::Descending),
    (SortMode::Natural, "natural", "Natural (1-9)", SortKey::Natural, Direction::Ascending),
    (SortMode::NaturalRev, "natural-rev", "Natural (9-1)", SortKey::Natural, Direction::Descending),
    (SortMode::Created, "created", "Created (oldest first)", SortKey::Created, Direction::Ascending),
    (SortMode::CreatedRev, "created-rev", "Created (newest first)", SortKey::Created, Direction::Descending),
    (SortMode::Modified, "modified", "Modified (oldest first)", SortKey::Modified, Direction::Ascending),
    (SortMode::ModifiedRev, "modified-rev", "Modified (newest first)", SortKey::Modified, Direction::Descending),
    (SortMode::Size, "size", "Size (smallest first)", SortKey::Size, Direction::Ascending),
    (SortMode::SizeRev, "size-rev", "Size (largest first)", SortKey::Size, Direction::Descending),
];

impl SortMode {
    pub const ALL: [SortMode; 10] = [
        SortMode::Name,
        SortMode::NameRev,
        SortMode::Natural,
        SortMode::NaturalRev,
        SortMode::Created,
        SortMode::CreatedRev,
        SortMode::Modified,
        SortMode::ModifiedRev,
        SortMode::Size,
        SortMode::SizeRev,
    ];

    fn row(&self) -> &'static (SortMode, &'static str, &'static str, SortKey, Direction) {
        // MODE_TABLE is declared in the same order as the enum
        &MODE_TABLE[*self as usize]
    }

    /// Identifier accepted on the command line
    pub fn key(&self) -> &'static str {
        self.row().1
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        self.row().2
    }

    pub fn sort_key(&self) -> SortKey {
        self.row().3
    }

    pub fn direction(&self) -> Direction {
        self.row().4
    }

    /// Comparator for this mode, with the direction already applied
    pub fn comparator(&self) -> impl Fn(&MediaEntry, &MediaEntry) -> Ordering + use<> {
        let key = self.sort_key();
        let direction = self.direction();
        move |a, b| {
            let ordering = compare_by_key(key, a, b);
            match direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SortMode {
    type Err = Error;

    /// Accepts a mode key, or the label compared without case or punctuation
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        if let Some(row) = MODE_TABLE.iter().find(|row| row.1 == wanted) {
            return Ok(row.0);
        }

        let folded = fold_label(s);
        if !folded.is_empty()
            && let Some(row) = MODE_TABLE.iter().find(|row| fold_label(row.2) == folded)
        {
            return Ok(row.0);
        }

        Err(Error::UnknownSortMode(s.to_string()))
    }
}

/// Lower-cased alphanumerics only
fn fold_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Stable in-place sort of the triage sequence
pub fn sort_entries(entries: &mut [MediaEntry], mode: SortMode) {
    let compare = mode.comparator();
    entries.sort_by(|a, b| compare(a, b));
}

fn compare_by_key(key: SortKey, a: &MediaEntry, b: &MediaEntry) -> Ordering {
    match key {
        SortKey::Alphabetic => a.file_name().to_lowercase().cmp(&b.file_name().to_lowercase()),
        SortKey::Natural => natural_cmp(&a.file_name(), &b.file_name()),
        // `None` orders before any value, so unreadable metadata sorts first
        SortKey::Created => a.stat().created.cmp(&b.stat().created),
        SortKey::Modified => a.stat().modified.cmp(&b.stat().modified),
        SortKey::Size => a.stat().size.cmp(&b.stat().size),
    }
}

/// Compare filenames with digit runs ordered by numeric value
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = natural_runs().find_iter(a);
    let mut right = natural_runs().find_iter(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = compare_runs(x.as_str(), y.as_str());
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn compare_runs(x: &str, y: &str) -> Ordering {
    let x_digits = x.starts_with(|c: char| c.is_ascii_digit());
    let y_digits = y.starts_with(|c: char| c.is_ascii_digit());

    match (x_digits, y_digits) {
        (true, true) => compare_unsigned(x, y),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => x.to_lowercase().cmp(&y.to_lowercase()),
    }
}

/// Numeric comparison of two ASCII digit strings of any length
fn compare_unsigned(x: &str, y: &str) -> Ordering {
    let x = x.trim_start_matches('0');
    let y = y.trim_start_matches('0');
    x.len().cmp(&y.len()).then_with(|| x.cmp(y))
}
