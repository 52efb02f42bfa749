// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Loading recorded violation events
//!
//! Accepts either a JSON array of events or one event object per line.

use std::fs;
use std::path::Path;

use crate::error::{ErrorContext, Result};
use crate::security::ViolationEvent;

/// Read events from a file
pub fn load_events(path: impl AsRef<Path>) -> Result<Vec<ViolationEvent>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).context(&format!("reading {}", path.display()))?;
    parse_events(&text)
}

/// Parse events from a JSON array or JSON lines
pub fn parse_events(text: &str) -> Result<Vec<ViolationEvent>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<ViolationEvent>(line)
                .context(&format!("event on line {}", idx + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_array() {
        let events = parse_events(
            r#"[
                {"blockedURI": "https://evil.test/x.js", "effectiveDirective": "script-src"},
                {"blockedURI": "inline", "sample": "alert(1)"}
            ]"#,
        )
        .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[1].sample.as_deref(), Some("alert(1)"));
    }

    #[test]
    fn test_parse_lines() {
        let text = "{\"blockedURI\": \"a\"}\n\n{\"blockedURI\": \"b\"}\n";
        let events = parse_events(text).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].blocked_uri.as_deref(), Some("a"));
    }

    #[test]
    fn test_bad_line_reports_position() {
        let text = "{\"blockedURI\": \"a\"}\n{oops}\n";
        let err = parse_events(text).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"blockedURI": "https://evil.test/x.js"}}"#).unwrap();

        let events = load_events(file.path()).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        assert!(load_events("/nonexistent/events.json").is_err());
    }
}
