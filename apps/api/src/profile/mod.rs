//! Structured candidate profiles: the JSON document the LLM extracts from a CV.
//!
//! A profile is a JSON object keyed by section. Sections are free-form below
//! the top level; only the top-level keys and their display order are fixed.

pub mod prompts;
pub mod structurer;

use serde_json::{Map, Value};
use thiserror::Error;

pub type Profile = Map<String, Value>;

/// Display order of the known profile sections, with their titles.
pub const SECTIONS: &[(&str, &str)] = &[
    ("personal_info", "Personal Information"),
    ("executive_summary", "Executive Summary"),
    ("profile_insights", "Profile Insights"),
    ("technical_skills", "Technical Skills"),
    ("professional_experience", "Professional Experience"),
    ("education", "Education"),
    ("languages", "Languages"),
    ("projects", "Projects"),
    ("additional_info", "Additional Information"),
];

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("LLM output is not a JSON object")]
    NotAnObject,

    #[error("Structured profile is empty")]
    Empty,

    #[error("LLM rejected the CV: {0}")]
    Rejected(String),
}

/// A profile section resolved for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<'a> {
    pub key: &'a str,
    pub title: String,
    pub content: Option<&'a Value>,
}

/// Validates raw LLM output and drops every empty value from it.
pub fn sanitize_profile(raw: Value) -> Result<Profile, ProfileError> {
    if !raw.is_object() {
        return Err(ProfileError::NotAnObject);
    }
    let Some(Value::Object(profile)) = prune_empty(raw) else {
        return Err(ProfileError::Empty);
    };
    if let Some(error) = profile.get("error") {
        let reason = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(ProfileError::Rejected(reason));
    }
    Ok(profile)
}

/// Recursively removes `null`, blank strings, the literal string `"null"`,
/// empty arrays and empty objects. Strings are trimmed.
pub fn prune_empty(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "null" {
                None
            } else {
                Some(Value::String(trimmed.to_string()))
            }
        }
        Value::Array(items) => {
            let items: Vec<Value> = items.into_iter().filter_map(prune_empty).collect();
            (!items.is_empty()).then_some(Value::Array(items))
        }
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| prune_empty(v).map(|v| (k, v)))
                .collect();
            (!map.is_empty()).then_some(Value::Object(map))
        }
        other => Some(other),
    }
}

/// Known sections in display order (absent ones carry `None`), followed by
/// any extra sections in profile order. Keys starting with `_` are skipped.
pub fn ordered_sections(profile: &Profile) -> Vec<Section<'_>> {
    let mut sections: Vec<Section<'_>> = SECTIONS
        .iter()
        .map(|(key, title)| Section {
            key: *key,
            title: (*title).to_string(),
            content: profile.get(*key),
        })
        .collect();

    for (key, value) in profile {
        if key.starts_with('_') || SECTIONS.iter().any(|(k, _)| *k == key.as_str()) {
            continue;
        }
        sections.push(Section {
            key: key.as_str(),
            title: section_title(key),
            content: Some(value),
        });
    }
    sections
}

/// Display title for a section key.
pub fn section_title(key: &str) -> String {
    if let Some((_, title)) = SECTIONS.iter().find(|(k, _)| *k == key) {
        return (*title).to_string();
    }
    title_case(key)
}

/// `"link_github"` → `"Link Github"`.
pub fn title_case(key: &str) -> String {
    key.replace('_', " ")
        .split_whitespace()
        .map(|w| {
            let mut c = w.chars();
            match c.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().to_string() + c.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Flattens a profile into the plain text that gets embedded and shown to
/// the re-ranker: one block per top-level section, nested content indented.
pub fn render_profile_text(profile: &Profile) -> String {
    let mut out = String::new();
    for (key, value) in profile {
        if key.starts_with('_') {
            continue;
        }
        match value {
            Value::Object(_) | Value::Array(_) => {
                out.push_str(&format!("{}:\n", section_title(key)));
                write_value(&mut out, value, 1);
            }
            scalar => {
                out.push_str(&format!("{}:\n  {}\n", section_title(key), scalar_text(scalar)));
            }
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k.starts_with('_') {
                    continue;
                }
                match v {
                    Value::Object(_) | Value::Array(_) => {
                        out.push_str(&format!("{indent}{}:\n", title_case(k)));
                        write_value(out, v, depth + 1);
                    }
                    scalar => {
                        out.push_str(&format!("{indent}{}: {}\n", title_case(k), scalar_text(scalar)));
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        out.push_str(&format!("{indent}-\n"));
                        write_value(out, item, depth + 1);
                    }
                    scalar => out.push_str(&format!("{indent}- {}\n", scalar_text(scalar))),
                }
            }
        }
        scalar => out.push_str(&format!("{indent}{}\n", scalar_text(scalar))),
    }
}

/// Text of a scalar without JSON quoting.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
