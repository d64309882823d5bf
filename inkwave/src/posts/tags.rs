// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::Deserialize;
use serde::de::IgnoredAny;

/// Raw `tags` value as sent by clients: a list of tags, a single delimited
/// string, or anything else (which normalizes to no tags).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TagInput {
    List(Vec<String>),
    Text(String),
    Other(IgnoredAny),
}

impl Default for TagInput {
    fn default() -> Self {
        TagInput::Text(String::new())
    }
}

impl From<&str> for TagInput {
    fn from(value: &str) -> Self {
        TagInput::Text(value.to_string())
    }
}

impl From<Vec<&str>> for TagInput {
    fn from(values: Vec<&str>) -> Self {
        TagInput::List(values.into_iter().map(str::to_string).collect())
    }
}

/// Produces the canonical tag string: lowercase tokens separated by a single
/// space, no empty tokens. List elements are split on the same delimiters as
/// strings so the result is stable under re-normalization. Duplicates are kept.
pub fn normalize_tags(input: &TagInput) -> String {
    match input {
        TagInput::List(items) => join_tokens(items.iter().flat_map(|item| split_tokens(item))),
        TagInput::Text(text) => join_tokens(split_tokens(text)),
        TagInput::Other(_) => String::new(),
    }
}

/// Splits an already canonical tag string back into tokens.
pub fn tags_array(canonical: &str) -> Vec<String> {
    canonical
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_tokens(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn join_tokens(tokens: impl Iterator<Item = String>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn delimited_string_is_split_and_lowercased() {
        assert_eq!(
            normalize_tags(&"art, Painting  creativity".into()),
            "art painting creativity"
        );
        assert_eq!(normalize_tags(&"Travel, Food".into()), "travel food");
    }

    #[test]
    fn list_keeps_duplicates() {
        assert_eq!(
            normalize_tags(&vec!["Art", " art ", "PAINTING"].into()),
            "art art painting"
        );
    }

    #[test]
    fn empty_entries_are_dropped() {
        assert_eq!(normalize_tags(&vec!["", "  ", "x"].into()), "x");
        assert_eq!(normalize_tags(&" ,, ,".into()), "");
        assert_eq!(normalize_tags(&TagInput::List(Vec::new())), "");
    }

    #[test]
    fn list_elements_with_delimiters_become_separate_tokens() {
        assert_eq!(
            normalize_tags(&vec!["Rust,Async", "web  dev"].into()),
            "rust async web dev"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs: Vec<TagInput> = vec![
            vec!["Art", " art ", "PAINTING"].into(),
            vec!["a,b", "  C  d "].into(),
            "  Mixed,CASE\ttabs\nnewlines ".into(),
        ];
        for input in inputs {
            let once = normalize_tags(&input);
            let twice = normalize_tags(&TagInput::Text(once.clone()));
            assert_eq!(once, twice);
            assert!(!once.starts_with(' ') && !once.ends_with(' '));
            assert!(!once.contains("  "));
        }
    }

    #[test]
    fn non_string_json_yields_empty() {
        let number: TagInput = serde_json::from_value(json!(42)).expect("deserialize");
        assert_eq!(normalize_tags(&number), "");
        let object: TagInput = serde_json::from_value(json!({"a": 1})).expect("deserialize");
        assert_eq!(normalize_tags(&object), "");
        let mixed: TagInput = serde_json::from_value(json!(["a", 1])).expect("deserialize");
        assert_eq!(normalize_tags(&mixed), "");
    }

    #[test]
    fn json_list_and_string_deserialize() {
        let list: TagInput = serde_json::from_value(json!(["Go", "Rust"])).expect("list");
        assert_eq!(list, TagInput::List(vec!["Go".into(), "Rust".into()]));
        let text: TagInput = serde_json::from_value(json!("Go Rust")).expect("text");
        assert_eq!(text, TagInput::Text("Go Rust".into()));
    }

    #[test]
    fn tags_array_splits_canonical_form() {
        assert_eq!(tags_array("travel food"), vec!["travel", "food"]);
        assert!(tags_array("").is_empty());
    }
}
