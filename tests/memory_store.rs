//! Integration tests for the memory store operations.
//!
//! Each test builds its own memory base in a temporary directory.

use std::fs;
use std::path::Path;

use cursor_memory_mcp::memory::{ACTIVE_PROMPT, SETUP_PROMPT};
use cursor_memory_mcp::{
    list_files, load_files, prompt_for_current_state, suggest_update, validate, FileEntry,
    MemoryCategory, MemoryConfig, PromptType, SuggestionFormat, SuggestionPayload,
    UpdateRequest,
};
use regex::Regex;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

fn empty_base() -> (TempDir, MemoryConfig) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = MemoryConfig::new(dir.path());
    (dir, config)
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Creates the six required components in the given order.
fn create_required(config: &MemoryConfig, order: &[usize]) {
    for &step in order {
        match step {
            0 => fs::create_dir_all(config.short_term_path()).unwrap(),
            1 => fs::create_dir_all(config.long_term_path()).unwrap(),
            2 => fs::create_dir_all(config.rules_path()).unwrap(),
            3 => write(&config.long_term_path().join("project-knowledge.md"), ""),
            4 => write(&config.long_term_path().join("known-issues.md"), ""),
            5 => write(&config.short_term_path().join("working-memory.md"), ""),
            _ => unreachable!(),
        }
    }
}

// ============================================================================
// Validation Tests
// ============================================================================

mod validation {
    use super::*;

    #[test]
    fn test_empty_base_reports_nothing() {
        let (_dir, config) = empty_base();
        let report = validate(&config);

        assert!(!report.configured);
        assert!(!report.directories.short_term);
        assert!(!report.directories.long_term);
        assert!(!report.directories.rules);
        assert!(!report.core_files.project_knowledge);
        assert!(!report.core_files.known_issues);
        assert!(!report.core_files.working_memory);
        assert!(!report.core_files.memory_rule);
    }

    #[test]
    fn test_creation_order_does_not_matter() {
        for order in [[0, 1, 2, 3, 4, 5], [5, 4, 3, 2, 1, 0], [2, 4, 0, 3, 5, 1]] {
            let (_dir, config) = empty_base();
            create_required(&config, &order);

            let report = validate(&config);
            assert!(report.configured, "order {:?}", order);
            assert!(report.directories.short_term);
            assert!(report.directories.long_term);
            assert!(report.directories.rules);
            assert!(report.core_files.project_knowledge);
            assert!(report.core_files.known_issues);
            assert!(report.core_files.working_memory);
        }
    }

    #[test]
    fn test_any_missing_component_unconfigures() {
        for skipped in 3..6 {
            let (_dir, config) = empty_base();
            let order: Vec<usize> = (0..6).filter(|&s| s != skipped).collect();
            create_required(&config, &order);
            assert!(!validate(&config).configured, "skipped {}", skipped);
        }
    }

    #[test]
    fn test_report_shape() {
        let (_dir, config) = empty_base();
        let json = serde_json::to_value(validate(&config)).unwrap();

        assert!(json["configured"].is_boolean());
        assert!(json["directories"]["short_term"].is_boolean());
        assert!(json["core_files"]["memory_rule"].is_boolean());
        assert!(json["base_path"].is_string());
    }
}

// ============================================================================
// Prompt Selection Tests
// ============================================================================

mod prompt_selection {
    use super::*;

    #[test]
    fn test_setup_prompt_when_unconfigured() {
        let (_dir, config) = empty_base();
        let response = prompt_for_current_state(&config);

        assert_eq!(response.prompt_type, PromptType::Setup);
        assert_eq!(response.prompt, SETUP_PROMPT);
        assert!(!response.system_status.configured);
    }

    #[test]
    fn test_active_prompt_when_configured() {
        let (_dir, config) = empty_base();
        create_required(&config, &[0, 1, 2, 3, 4, 5]);
        let response = prompt_for_current_state(&config);

        assert_eq!(response.prompt_type, PromptType::Active);
        assert_eq!(response.prompt, ACTIVE_PROMPT);
        assert!(response.system_status.configured);
    }
}

// ============================================================================
// Listing Tests
// ============================================================================

mod listing {
    use super::*;

    #[test]
    fn test_empty_long_term_directory() {
        let (_dir, config) = empty_base();
        fs::create_dir_all(config.long_term_path()).unwrap();

        let listing = list_files(&config);
        assert!(listing.long_term_files.is_empty());
        assert_eq!(listing.summary.long_term_count, 0);
        assert_eq!(listing.summary.total_files, 0);
        assert_eq!(listing.summary.total_size_kb, 0.0);
    }

    #[test]
    fn test_entries_match_file_contents() {
        let (_dir, config) = empty_base();
        let contents = ["one line", "first\nsecond\n", "a\nb\nc\nd"];
        for (i, content) in contents.iter().enumerate() {
            write(&config.long_term_path().join(format!("topic-{}.md", i)), content);
        }

        let listing = list_files(&config);
        assert_eq!(listing.summary.long_term_count, 3);

        for (i, content) in contents.iter().enumerate() {
            let name = format!("topic-{}.md", i);
            let entry = listing
                .long_term_files
                .iter()
                .find(|e| e.name() == name)
                .expect("entry missing");
            match entry {
                FileEntry::Found(meta) => {
                    assert_eq!(meta.size_bytes, content.len() as u64);
                    assert_eq!(meta.line_count, content.lines().count());
                    assert_eq!(meta.char_count, content.chars().count());
                }
                FileEntry::Failed(err) => panic!("unexpected failure: {}", err.error),
            }
        }
    }

    #[test]
    fn test_categories_and_filters() {
        let (_dir, config) = empty_base();
        write(&config.short_term_path().join("working-memory.md"), "wm");
        write(&config.short_term_path().join("notes.txt"), "ignored");
        write(&config.long_term_path().join("project-knowledge.md"), "pk");
        write(&config.rules_path().join("intelligent-memory.mdc"), "rule");
        write(&config.rules_path().join("formatting.mdc"), "ignored");

        let listing = list_files(&config);
        assert_eq!(listing.summary.short_term_count, 1);
        assert_eq!(listing.summary.long_term_count, 1);
        assert_eq!(listing.summary.rules_count, 1);
        assert_eq!(listing.summary.total_files, 3);
        assert_eq!(listing.memory_rules[0].name(), "intelligent-memory.mdc");
    }

    #[cfg(unix)]
    #[test]
    fn test_vanished_file_becomes_error_record() {
        let (_dir, config) = empty_base();
        write(&config.short_term_path().join("kept.md"), "still here\n");
        // A dangling link is enumerated but cannot be read, like a file
        // deleted between enumeration and read.
        std::os::unix::fs::symlink(
            config.short_term_path().join("deleted-target.md.bak"),
            config.short_term_path().join("vanished.md"),
        )
        .unwrap();

        let listing = list_files(&config);
        assert_eq!(listing.summary.short_term_count, 2);
        assert_eq!(listing.summary.total_files, 2);

        let failed: Vec<_> = listing
            .short_term_files
            .iter()
            .filter(|e| !e.is_found())
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name(), "vanished.md");

        let json = serde_json::to_value(failed[0]).unwrap();
        assert_eq!(json["exists"], false);
        assert!(json["error"].is_string());

        // Failed entries do not contribute to the size total.
        assert_eq!(listing.summary.total_size_kb, 0.01);
    }
}

// ============================================================================
// Loading Tests
// ============================================================================

mod loading {
    use super::*;

    #[test]
    fn test_round_trip() {
        let (_dir, config) = empty_base();
        let content = "# Working Memory\n\n## Current Context\n- refactor auth\n";
        write(&config.short_term_path().join("working-memory.md"), content);

        let names = vec!["working-memory.md".to_string()];
        let result = load_files(&config, Some(&names));
        let file = &result.loaded_files["working-memory.md"];

        assert_eq!(file.content, content);
        assert_eq!(file.lines, content.lines().count());
        assert_eq!(file.size, content.chars().count());
        assert_eq!(file.category, MemoryCategory::ShortTerm);
    }

    #[test]
    fn test_short_term_takes_precedence() {
        let (_dir, config) = empty_base();
        write(&config.short_term_path().join("shared.md"), "short copy");
        write(&config.long_term_path().join("shared.md"), "long copy");

        let names = vec!["shared.md".to_string()];
        let result = load_files(&config, Some(&names));
        let file = &result.loaded_files["shared.md"];

        assert_eq!(file.content, "short copy");
        assert_eq!(file.category, MemoryCategory::ShortTerm);
    }

    #[test]
    fn test_bulk_load_keeps_first_in_search_order() {
        let (_dir, config) = empty_base();
        write(&config.short_term_path().join("shared.md"), "short copy");
        write(&config.long_term_path().join("shared.md"), "long copy");

        let result = load_files(&config, None);
        let file = &result.loaded_files["shared.md"];

        assert_eq!(file.content, "short copy");
        assert_eq!(file.category, MemoryCategory::ShortTerm);
        assert_eq!(result.summary.files_loaded, 1);
        assert_eq!(result.loaded_files.len(), 1);
    }

    #[test]
    fn test_carriage_return_lines_are_counted() {
        let (_dir, config) = empty_base();
        write(&config.short_term_path().join("mac.md"), "one\rtwo\rthree");

        let result = load_files(&config, None);
        assert_eq!(result.loaded_files["mac.md"].lines, 3);

        let listing = list_files(&config);
        let entry = &listing.short_term_files[0];
        match entry {
            FileEntry::Found(meta) => assert_eq!(meta.line_count, 3),
            FileEntry::Failed(err) => panic!("unexpected error record: {:?}", err),
        }
    }

    #[test]
    fn test_rules_found_last() {
        let (_dir, config) = empty_base();
        write(&config.rules_path().join("intelligent-memory.mdc"), "rule");

        let names = vec!["intelligent-memory.mdc".to_string()];
        let result = load_files(&config, Some(&names));
        assert_eq!(
            result.loaded_files["intelligent-memory.mdc"].category,
            MemoryCategory::Rules
        );
    }

    #[test]
    fn test_unknown_names_are_omitted() {
        let (_dir, config) = empty_base();
        write(&config.long_term_path().join("known-issues.md"), "issues\n");

        let names = vec!["known-issues.md".to_string(), "nowhere.md".to_string()];
        let result = load_files(&config, Some(&names));

        assert_eq!(result.summary.files_loaded, 1);
        assert!(result.loaded_files.contains_key("known-issues.md"));
        assert!(!result.loaded_files.contains_key("nowhere.md"));
    }

    #[test]
    fn test_bulk_load_totals() {
        let (_dir, config) = empty_base();
        write(&config.short_term_path().join("working-memory.md"), "a\nb\n");
        write(&config.long_term_path().join("project-knowledge.md"), "ccc");
        write(&config.rules_path().join("intelligent-memory.mdc"), "rule\n");
        write(&config.rules_path().join("style.mdc"), "not a memory rule");

        let result = load_files(&config, None);

        assert_eq!(result.summary.files_loaded, 3);
        assert_eq!(result.summary.total_characters, 4 + 3 + 5);
        assert_eq!(result.summary.total_lines, 2 + 1 + 1);
        assert!(!result.loaded_files.contains_key("style.mdc"));
    }

    #[test]
    fn test_bulk_load_without_layout() {
        let (_dir, config) = empty_base();
        let result = load_files(&config, None);
        assert!(result.loaded_files.is_empty());
        assert_eq!(result.summary.files_loaded, 0);
    }

    #[test]
    fn test_unreadable_file_does_not_abort_batch() {
        let (_dir, config) = empty_base();
        write(&config.long_term_path().join("project-knowledge.md"), "ok");
        fs::write(config.long_term_path().join("binary.md"), [0xff, 0xfe, 0x00]).unwrap();

        let result = load_files(&config, None);
        assert_eq!(result.summary.files_loaded, 1);
        assert!(result.loaded_files.contains_key("project-knowledge.md"));
    }
}

// ============================================================================
// Update Suggestion Tests
// ============================================================================

mod suggestions {
    use super::*;

    fn category_of(file_name: &str) -> MemoryCategory {
        let config = MemoryConfig::new("/project");
        suggest_update(&config, &UpdateRequest::new(file_name, "x"))
            .unwrap()
            .memory_category
    }

    #[test]
    fn test_category_heuristic() {
        assert_eq!(category_of("known-issues.md"), MemoryCategory::LongTerm);
        assert_eq!(category_of("project-knowledge.md"), MemoryCategory::LongTerm);
        assert_eq!(category_of("foo.mdc"), MemoryCategory::Rules);
        assert_eq!(category_of("scratch.md"), MemoryCategory::ShortTerm);
        assert_eq!(category_of("auth-patterns.md"), MemoryCategory::LongTerm);
    }

    #[test]
    fn test_timestamp_heading() {
        let config = MemoryConfig::new("/project");
        let suggestion =
            suggest_update(&config, &UpdateRequest::new("scratch.md", "remember this")).unwrap();

        let heading = Regex::new(r"^## \d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\nremember this$").unwrap();
        assert!(heading.is_match(&suggestion.formatted_content));
        assert!(suggestion.timestamp_suggested);
        assert_eq!(suggestion.content_length, "remember this".len());
    }

    #[test]
    fn test_without_timestamp() {
        let config = MemoryConfig::new("/project");
        let request = UpdateRequest::new("scratch.md", "remember this").with_timestamp(false);
        let suggestion = suggest_update(&config, &request).unwrap();

        assert_eq!(suggestion.formatted_content, "remember this");
        assert!(!suggestion.timestamp_suggested);
    }

    #[test]
    fn test_suggestion_never_writes() {
        let (dir, config) = empty_base();
        let request = UpdateRequest::new("working-memory.md", "note")
            .with_format(SuggestionFormat::Script);
        let suggestion = suggest_update(&config, &request).unwrap();

        assert!(matches!(suggestion.payload, SuggestionPayload::Script { .. }));
        assert!(!Path::new(&suggestion.target_path).exists());
        assert!(!dir.path().join(".cursor").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_script_appends_when_run() {
        let (_dir, config) = empty_base();
        let request = UpdateRequest::new("working-memory.md", "it's a 'quoted' note")
            .with_timestamp(false)
            .with_format(SuggestionFormat::Script);
        let suggestion = suggest_update(&config, &request).unwrap();

        let SuggestionPayload::Script { script, .. } = &suggestion.payload else {
            panic!("expected script payload");
        };

        let status = std::process::Command::new("bash")
            .arg("-c")
            .arg(script)
            .stdout(std::process::Stdio::null())
            .status();
        // Skip silently when bash is unavailable.
        if let Ok(status) = status {
            assert!(status.success());
            let written = fs::read_to_string(&suggestion.target_path).unwrap();
            assert_eq!(written, "it's a 'quoted' note\n");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_injected_file_name_is_refused() {
        let (dir, config) = empty_base();
        let request = UpdateRequest::new("notes.md\ntouch pwned", "note")
            .with_format(SuggestionFormat::Script);
        assert!(suggest_update(&config, &request).is_err());

        // A legitimate script run from the base leaves nothing else behind.
        let request = UpdateRequest::new("notes.md", "note").with_format(SuggestionFormat::Script);
        let suggestion = suggest_update(&config, &request).unwrap();
        let SuggestionPayload::Script { script, .. } = &suggestion.payload else {
            panic!("expected script payload");
        };
        let status = std::process::Command::new("bash")
            .arg("-c")
            .arg(script)
            .current_dir(dir.path())
            .stdout(std::process::Stdio::null())
            .status();
        if let Ok(status) = status {
            assert!(status.success());
            assert!(!dir.path().join("pwned").exists());
            let top: Vec<_> = fs::read_dir(dir.path())
                .unwrap()
                .map(|e| e.unwrap().file_name())
                .collect();
            assert_eq!(top, vec![std::ffi::OsString::from(".cursor")]);
        }
    }
}
