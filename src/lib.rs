pub mod error;
pub mod memory;

pub use error::{MemoryError, Result};
pub use memory::{
    classify, list_files, load_files, prompt_for_current_state, suggest_update, validate,
    FileEntry, FileError, FileMetadata, ListingSummary, LoadResult, LoadSummary, LoadedFile,
    MemoryCategory, MemoryConfig, MemoryListing, PromptResponse, PromptType, SuggestionFormat,
    SuggestionPayload, UpdateRequest, UpdateSuggestion, ValidationReport, BASE_PATH_ENV,
};
