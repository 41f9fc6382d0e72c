//! Listing and loading of memory files.
//!
//! Every call reads the filesystem afresh. A file that disappears or cannot be
//! read between enumeration and access becomes a per-file failure; the rest of
//! the batch is still returned.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, SecondsFormat};
use glob::MatchOptions;
use serde::{Deserialize, Serialize};

use super::config::{is_plain_file_name, MemoryCategory, MemoryConfig};
use crate::error::Result;

/// Metadata for a memory file that could be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub path: String,
    pub name: String,
    pub size_bytes: u64,
    pub size_kb: f64,
    /// Modification time, ISO-8601 in local time
    pub modified: String,
    pub line_count: usize,
    pub char_count: usize,
    pub exists: bool,
}

/// A listed file whose metadata or content could not be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileError {
    pub path: String,
    pub name: String,
    pub error: String,
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    Found(FileMetadata),
    Failed(FileError),
}

impl FileEntry {
    pub fn name(&self) -> &str {
        match self {
            FileEntry::Found(meta) => &meta.name,
            FileEntry::Failed(err) => &err.name,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, FileEntry::Found(_))
    }

    /// Size of a readable file; failures count as zero.
    pub fn size_bytes(&self) -> u64 {
        match self {
            FileEntry::Found(meta) => meta.size_bytes,
            FileEntry::Failed(_) => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub total_files: usize,
    pub total_size_kb: f64,
    pub short_term_count: usize,
    pub long_term_count: usize,
    pub rules_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryListing {
    pub short_term_files: Vec<FileEntry>,
    pub long_term_files: Vec<FileEntry>,
    pub memory_rules: Vec<FileEntry>,
    pub summary: ListingSummary,
}

/// Content of a loaded memory file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedFile {
    pub content: String,
    pub category: MemoryCategory,
    pub path: String,
    /// Length of `content` in characters
    pub size: usize,
    pub lines: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub files_loaded: usize,
    pub total_characters: usize,
    pub total_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadResult {
    pub loaded_files: BTreeMap<String, LoadedFile>,
    pub summary: LoadSummary,
}

/// Counts lines the way a text editor does: a trailing terminator does not open
/// an extra empty line.
///
/// Besides `\n` and `\r\n`, a lone `\r`, vertical tab, form feed, the
/// file/group/record separators, NEL and the Unicode line and paragraph
/// separators all end a line.
pub fn count_lines(content: &str) -> usize {
    let mut lines = 0;
    let mut open = false;
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if is_line_break(c) {
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            lines += 1;
            open = false;
        } else {
            open = true;
        }
    }
    if open {
        lines += 1;
    }
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn round_kb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 100.0).round() / 100.0
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Memory files of `category`, sorted by path. A missing directory yields
/// nothing. Hidden files and subdirectories are skipped.
pub fn memory_files(config: &MemoryConfig, category: MemoryCategory) -> Vec<PathBuf> {
    let dir = config.category_path(category);
    if !dir.is_dir() {
        return Vec::new();
    }

    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped).join(category.file_pattern());
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let paths = match glob::glob_with(&pattern.to_string_lossy(), options) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::warn!("Invalid memory file pattern {}: {}", pattern.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = paths
        .map(|entry| match entry {
            Ok(path) => path,
            // Keep the path so the failure surfaces as a per-file record.
            Err(e) => e.path().to_path_buf(),
        })
        .filter(|path| !path.is_dir())
        .collect();
    files.sort();
    files
}

/// Reads size, modification time and text statistics for one file.
pub fn file_metadata(path: &Path) -> Result<FileMetadata> {
    let stat = fs::metadata(path)?;
    let content = fs::read_to_string(path)?;
    let modified: DateTime<Local> = stat.modified()?.into();

    Ok(FileMetadata {
        path: path.to_string_lossy().into_owned(),
        name: file_name_of(path),
        size_bytes: stat.len(),
        size_kb: round_kb(stat.len()),
        modified: modified.to_rfc3339_opts(SecondsFormat::Micros, false),
        line_count: count_lines(&content),
        char_count: content.chars().count(),
        exists: true,
    })
}

fn file_entry(path: &Path) -> FileEntry {
    match file_metadata(path) {
        Ok(meta) => FileEntry::Found(meta),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            FileEntry::Failed(FileError {
                path: path.to_string_lossy().into_owned(),
                name: file_name_of(path),
                error: e.to_string(),
                exists: false,
            })
        }
    }
}

fn list_category(config: &MemoryConfig, category: MemoryCategory) -> Vec<FileEntry> {
    memory_files(config, category)
        .iter()
        .map(|path| file_entry(path))
        .collect()
}

/// Lists memory files of all three categories with metadata.
pub fn list_files(config: &MemoryConfig) -> MemoryListing {
    tracing::info!("Listing memory files under {}", config.base_path.display());

    let short_term_files = list_category(config, MemoryCategory::ShortTerm);
    let long_term_files = list_category(config, MemoryCategory::LongTerm);
    let memory_rules = list_category(config, MemoryCategory::Rules);

    let all = || {
        short_term_files
            .iter()
            .chain(long_term_files.iter())
            .chain(memory_rules.iter())
    };
    let total_files = all().count();
    let total_size: u64 = all().map(FileEntry::size_bytes).sum();
    let failed = all().filter(|entry| !entry.is_found()).count();

    let summary = ListingSummary {
        total_files,
        total_size_kb: round_kb(total_size),
        short_term_count: short_term_files.len(),
        long_term_count: long_term_files.len(),
        rules_count: memory_rules.len(),
    };

    if failed > 0 {
        tracing::warn!("{} of {} memory files could not be read", failed, total_files);
    }
    tracing::info!(
        "Found {} memory files totaling {} KB",
        summary.total_files,
        summary.total_size_kb
    );

    MemoryListing {
        short_term_files,
        long_term_files,
        memory_rules,
        summary,
    }
}

/// Reads one memory file into a [`LoadedFile`].
pub fn load_file(path: &Path, category: MemoryCategory) -> Result<LoadedFile> {
    let content = fs::read_to_string(path)?;
    let size = content.chars().count();
    let lines = count_lines(&content);

    Ok(LoadedFile {
        content,
        category,
        path: path.to_string_lossy().into_owned(),
        size,
        lines,
    })
}

/// Finds `name` in the first category directory that contains it, searching
/// short-term, then long-term, then rules.
pub fn locate(config: &MemoryConfig, name: &str) -> Option<(PathBuf, MemoryCategory)> {
    MemoryCategory::SEARCH_ORDER.iter().find_map(|&category| {
        let path = config.category_path(category).join(name);
        path.exists().then_some((path, category))
    })
}

/// Loads the named memory files, or every memory file when `names` is empty
/// or absent.
///
/// Names that match nothing are logged and left out. When the same file name
/// exists in several categories the first one in search order is kept.
pub fn load_files(config: &MemoryConfig, names: Option<&[String]>) -> LoadResult {
    let mut targets: Vec<(PathBuf, MemoryCategory)> = Vec::new();

    match names {
        Some(names) if !names.is_empty() => {
            tracing::info!("Loading memory files: {}", names.join(", "));
            for name in names {
                if !is_plain_file_name(name) {
                    tracing::warn!("Ignoring memory file name with path components: {}", name);
                    continue;
                }
                match locate(config, name) {
                    Some(target) => targets.push(target),
                    None => tracing::warn!("Memory file not found: {}", name),
                }
            }
        }
        _ => {
            tracing::info!("Loading all memory files");
            for category in MemoryCategory::SEARCH_ORDER {
                targets.extend(
                    memory_files(config, category)
                        .into_iter()
                        .map(|path| (path, category)),
                );
            }
        }
    }

    let mut loaded_files = BTreeMap::new();
    for (path, category) in targets {
        let name = file_name_of(&path);
        if loaded_files.contains_key(&name) {
            tracing::debug!("Skipping {}: {} already loaded", path.display(), name);
            continue;
        }
        match load_file(&path, category) {
            Ok(file) => {
                tracing::debug!("Loaded {} ({} chars)", name, file.size);
                loaded_files.insert(name, file);
            }
            Err(e) => tracing::error!("Failed to load {}: {}", path.display(), e),
        }
    }

    let summary = LoadSummary {
        files_loaded: loaded_files.len(),
        total_characters: loaded_files.values().map(|f| f.size).sum(),
        total_lines: loaded_files.values().map(|f| f.lines).sum(),
    };

    tracing::info!(
        "Loaded {} memory files - {} chars, {} lines",
        summary.files_loaded,
        summary.total_characters,
        summary.total_lines
    );

    LoadResult {
        loaded_files,
        summary,
    }
}
