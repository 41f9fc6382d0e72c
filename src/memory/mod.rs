//! Markdown memory store for Cursor.
//!
//! Maps a base directory to the short-term, long-term and rules locations and
//! provides read-only access to the files in them. Writes are only ever
//! suggested, never performed.

pub mod config;
pub mod files;
pub mod prompt;
pub mod suggest;
pub mod validator;

pub use config::{MemoryCategory, MemoryConfig, BASE_PATH_ENV};
pub use files::{
    list_files, load_files, FileEntry, FileError, FileMetadata, ListingSummary, LoadResult,
    LoadSummary, LoadedFile, MemoryListing,
};
pub use prompt::{prompt_for_current_state, PromptResponse, PromptType, ACTIVE_PROMPT, SETUP_PROMPT};
pub use suggest::{
    classify, suggest_update, SuggestionFormat, SuggestionPayload, UpdateRequest,
    UpdateSuggestion,
};
pub use validator::{validate, CoreFileStatus, DirectoryStatus, ValidationReport};
