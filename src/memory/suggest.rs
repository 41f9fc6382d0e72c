//! Update suggestions for memory files.
//!
//! Nothing here writes to disk. A suggestion is either an instruction prompt
//! for the agent or a shell snippet that performs the append when someone
//! chooses to run it.

use std::path::Path;

use chrono::{Local, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::config::{
    is_plain_file_name, MemoryCategory, MemoryConfig, KNOWN_ISSUES_FILE, MEMORY_RULE_FILE,
    PROJECT_KNOWLEDGE_FILE,
};
use crate::error::{MemoryError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const HEREDOC_DELIMITER: &str = "MEMORY_EOF";

/// How a suggestion is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionFormat {
    /// Markdown instructions for the agent
    #[default]
    Prompt,
    /// Shell command and script that append the entry
    Script,
}

impl SuggestionFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionFormat::Prompt => "prompt",
            SuggestionFormat::Script => "script",
        }
    }
}

impl std::str::FromStr for SuggestionFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prompt" => Ok(SuggestionFormat::Prompt),
            "script" | "bash" => Ok(SuggestionFormat::Script),
            other => Err(format!("unknown suggestion format: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub file_name: String,
    pub content: String,
    pub add_timestamp: bool,
    pub format: SuggestionFormat,
}

impl UpdateRequest {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            add_timestamp: true,
            format: SuggestionFormat::Prompt,
        }
    }

    pub fn with_timestamp(mut self, add_timestamp: bool) -> Self {
        self.add_timestamp = add_timestamp;
        self
    }

    pub fn with_format(mut self, format: SuggestionFormat) -> Self {
        self.format = format;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionPayload {
    Prompt {
        suggestion_prompt: String,
    },
    Script {
        bash_command: String,
        script: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSuggestion {
    #[serde(flatten)]
    pub payload: SuggestionPayload,
    pub target_file: String,
    pub target_path: String,
    pub memory_category: MemoryCategory,
    /// Length of the supplied content in characters, without the heading
    pub content_length: usize,
    pub timestamp_suggested: bool,
    pub formatted_content: String,
}

/// Decides where a memory file belongs from its name alone.
///
/// Rules, first match wins:
/// 1. `project-knowledge.md` and `known-issues.md` are long-term.
/// 2. Names containing "knowledge" or "pattern" (any case) are long-term.
/// 3. Names ending in `.mdc` are rules.
/// 4. Everything else is short-term.
pub fn classify(file_name: &str) -> MemoryCategory {
    if file_name == PROJECT_KNOWLEDGE_FILE || file_name == KNOWN_ISSUES_FILE {
        return MemoryCategory::LongTerm;
    }

    let lower = file_name.to_lowercase();
    if lower.contains("knowledge") || lower.contains("pattern") {
        MemoryCategory::LongTerm
    } else if file_name.ends_with(".mdc") {
        MemoryCategory::Rules
    } else {
        MemoryCategory::ShortTerm
    }
}

/// Prefixes `content` with a `## YYYY-MM-DD HH:MM:SS` heading when a time is given.
pub fn format_entry(content: &str, timestamp: Option<NaiveDateTime>) -> String {
    match timestamp {
        Some(ts) => format!("## {}\n{}", ts.format(TIMESTAMP_FORMAT), content),
        None => content.to_string(),
    }
}

/// Builds a suggestion stamped with the current local time.
pub fn suggest_update(config: &MemoryConfig, request: &UpdateRequest) -> Result<UpdateSuggestion> {
    suggest_update_at(config, request, Local::now().naive_local())
}

/// Builds a suggestion using `now` for the optional heading.
pub fn suggest_update_at(
    config: &MemoryConfig,
    request: &UpdateRequest,
    now: NaiveDateTime,
) -> Result<UpdateSuggestion> {
    if !is_plain_file_name(&request.file_name) {
        return Err(MemoryError::InvalidFileName(request.file_name.clone()));
    }

    tracing::info!(
        "Generating {} memory update suggestion for {}",
        request.format.as_str(),
        request.file_name
    );

    let category = classify(&request.file_name);
    let target_dir = config.category_path(category);
    let target_path = target_dir.join(&request.file_name);
    let formatted_content =
        format_entry(&request.content, request.add_timestamp.then_some(now));

    let payload = match request.format {
        SuggestionFormat::Prompt => SuggestionPayload::Prompt {
            suggestion_prompt: render_prompt(
                &request.file_name,
                category,
                &target_path,
                &formatted_content,
            ),
        },
        SuggestionFormat::Script => SuggestionPayload::Script {
            bash_command: render_command(&target_dir, &target_path, &formatted_content),
            script: render_script(
                category,
                &target_dir,
                &target_path,
                &formatted_content,
            ),
        },
    };

    let content_length = request.content.chars().count();
    tracing::info!(
        "Generated suggestion for {} ({} chars)",
        request.file_name,
        content_length
    );

    Ok(UpdateSuggestion {
        payload,
        target_file: request.file_name.clone(),
        target_path: target_path.to_string_lossy().into_owned(),
        memory_category: category,
        content_length,
        timestamp_suggested: request.add_timestamp,
        formatted_content,
    })
}

fn render_prompt(
    file_name: &str,
    category: MemoryCategory,
    target_path: &Path,
    formatted_content: &str,
) -> String {
    format!(
        "💾 **Memory Update Suggestion**\n\
         \n\
         **Target**: `{file_name}` ({category} memory)\n\
         **Location**: `{path}`\n\
         \n\
         **Suggested Content to Add**:\n\
         ```markdown\n\
         {formatted_content}\n\
         ```\n\
         \n\
         **Action Needed**: Please add the above content to the memory file `{file_name}` \
         to maintain our intelligent memory system. This will help preserve important \
         insights and patterns for future sessions.\n\
         \n\
         **Why This Matters**: This content represents valuable learning that should be \
         consolidated in our memory system following the {rule} guidelines.",
        path = target_path.display(),
        rule = MEMORY_RULE_FILE,
    )
}

/// Single-quotes `value` for POSIX shells.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// A heredoc delimiter that no line of `content` equals.
fn heredoc_delimiter(content: &str) -> String {
    let mut delimiter = HEREDOC_DELIMITER.to_string();
    let mut n = 1;
    while content.lines().any(|line| line == delimiter) {
        delimiter = format!("{}_{}", HEREDOC_DELIMITER, n);
        n += 1;
    }
    delimiter
}

fn heredoc_append(target_path: &Path, content: &str) -> String {
    let delimiter = heredoc_delimiter(content);
    let newline = if content.ends_with('\n') { "" } else { "\n" };
    format!(
        "cat >> {} <<'{delimiter}'\n{content}{newline}{delimiter}",
        shell_quote(&target_path.to_string_lossy()),
    )
}

fn render_command(target_dir: &Path, target_path: &Path, content: &str) -> String {
    format!(
        "mkdir -p {} && {}",
        shell_quote(&target_dir.to_string_lossy()),
        heredoc_append(target_path, content)
    )
}

fn render_script(
    category: MemoryCategory,
    target_dir: &Path,
    target_path: &Path,
    content: &str,
) -> String {
    format!(
        "#!/usr/bin/env bash\n\
         set -euo pipefail\n\
         \n\
         # Append a {category} memory entry\n\
         mkdir -p {dir}\n\
         {append}\n\
         echo {done}\n",
        dir = shell_quote(&target_dir.to_string_lossy()),
        append = heredoc_append(target_path, content),
        done = shell_quote(&format!("Updated {}", target_path.display())),
    )
}
