//! Memory base resolution and the fixed directory layout beneath it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable overriding the memory base directory.
pub const BASE_PATH_ENV: &str = "CURSOR_MEMORY_BASE_PATH";

pub const PROJECT_KNOWLEDGE_FILE: &str = "project-knowledge.md";
pub const KNOWN_ISSUES_FILE: &str = "known-issues.md";
pub const WORKING_MEMORY_FILE: &str = "working-memory.md";
pub const MEMORY_RULE_FILE: &str = "intelligent-memory.mdc";

/// Glob for note files in the short-term and long-term directories.
pub const NOTE_PATTERN: &str = "*.md";
/// Glob for rule files that belong to the memory system.
pub const MEMORY_RULE_PATTERN: &str = "*memory*.mdc";

/// Paths of the memory system under a single base directory.
///
/// ```text
/// <base>/.cursor/memory/short-term/*.md
/// <base>/.cursor/memory/long-term/*.md
/// <base>/.cursor/rules/*memory*.mdc
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryConfig {
    pub base_path: PathBuf,
}

impl MemoryConfig {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Resolves the base directory for one call.
    ///
    /// An explicit override wins, then `CURSOR_MEMORY_BASE_PATH`, then the
    /// current working directory. Nothing is cached, so a changed environment
    /// or working directory applies to the next call.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::new(path);
        }

        match std::env::var_os(BASE_PATH_ENV) {
            Some(value) if !value.is_empty() => Self::new(value),
            _ => Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))),
        }
    }

    pub fn memory_root(&self) -> PathBuf {
        self.base_path.join(".cursor").join("memory")
    }

    pub fn short_term_path(&self) -> PathBuf {
        self.memory_root().join("short-term")
    }

    pub fn long_term_path(&self) -> PathBuf {
        self.memory_root().join("long-term")
    }

    pub fn rules_path(&self) -> PathBuf {
        self.base_path.join(".cursor").join("rules")
    }

    /// Directory backing a memory category.
    pub fn category_path(&self, category: MemoryCategory) -> PathBuf {
        match category {
            MemoryCategory::ShortTerm => self.short_term_path(),
            MemoryCategory::LongTerm => self.long_term_path(),
            MemoryCategory::Rules => self.rules_path(),
        }
    }
}

/// The closed set of memory locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryCategory {
    ShortTerm,
    LongTerm,
    Rules,
}

impl MemoryCategory {
    /// Search order used when a file is requested by name.
    pub const SEARCH_ORDER: [MemoryCategory; 3] = [
        MemoryCategory::ShortTerm,
        MemoryCategory::LongTerm,
        MemoryCategory::Rules,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryCategory::ShortTerm => "short-term",
            MemoryCategory::LongTerm => "long-term",
            MemoryCategory::Rules => "rules",
        }
    }

    /// File name glob that selects memory files in this category.
    pub fn file_pattern(&self) -> &'static str {
        match self {
            MemoryCategory::ShortTerm | MemoryCategory::LongTerm => NOTE_PATTERN,
            MemoryCategory::Rules => MEMORY_RULE_PATTERN,
        }
    }
}

impl std::fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true when `name` is a bare file name that cannot escape its directory.
///
/// Control characters are refused so a name can never break a line in a
/// rendered script.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.chars().any(char::is_control)
}
