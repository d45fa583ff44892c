//! Line-oriented scanner for console reports.
//!
//! Console output is loosely formatted for humans, so nothing here fails: lines
//! that match neither form are kept for consumers that look up lines by anchor.

use std::collections::HashMap;
use std::sync::OnceLock;

use log::trace;
use regex::Regex;

fn key_value_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([\w-]*)\s{3,}(.*)$").expect("static regex"))
}

fn total_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*total").expect("static regex"))
}

#[derive(Debug, Clone, Default)]
pub struct ParsedFields {
    values: HashMap<String, String>,
    total: Option<u64>,
    lines: Vec<String>,
}

impl ParsedFields {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Integer value of `key`, 0 when absent or not a number.
    pub fn get_int(&self, key: &str) -> i64 {
        self.get(key)
            .and_then(|v| v.split_whitespace().next())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// First line containing `anchor`, compared case-insensitively.
    pub fn find_line(&self, anchor: &str) -> Option<&str> {
        let anchor = anchor.to_lowercase();
        self.lines
            .iter()
            .find(|line| line.to_lowercase().contains(&anchor))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.total.is_none()
    }
}

pub fn normalize_key(key: &str) -> String {
    key.replace('-', "_").to_lowercase()
}

pub fn parse_fields(output: &str) -> ParsedFields {
    let mut fields = ParsedFields::default();
    for raw in output.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(caps) = key_value_regex().captures(line) {
            let key = &caps[1];
            let value = caps[2].trim();
            if !key.is_empty() && !value.is_empty() {
                trace!("Match line: {}", line);
                fields.values.insert(normalize_key(key), value.to_string());
            }
        }
        for caps in total_regex().captures_iter(line) {
            if let Ok(total) = caps[1].parse::<u64>() {
                trace!("Total line: {}", line);
                fields.total = Some(total);
            }
        }
        fields.lines.push(line.to_string());
    }
    fields
}
