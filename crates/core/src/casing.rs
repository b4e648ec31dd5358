use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key naming convention expected by a provider's API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Casing {
    #[serde(rename = "camelCase")]
    CamelCase,
    #[serde(rename = "PascalCase")]
    PascalCase,
    #[serde(rename = "snake_case")]
    SnakeCase,
    #[serde(rename = "kebab-case")]
    KebabCase,
    #[serde(rename = "CONSTANT_CASE")]
    ConstantCase,
}

impl Casing {
    /// Rewrite a single key into this convention.
    pub fn apply(self, key: &str) -> String {
        let words = split_words(key);
        match self {
            Self::CamelCase => words
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    if i == 0 {
                        w.to_lowercase()
                    } else {
                        capitalize(w)
                    }
                })
                .collect(),
            Self::PascalCase => words.iter().map(|w| capitalize(w)).collect(),
            Self::SnakeCase => join_lower(&words, "_"),
            Self::KebabCase => join_lower(&words, "-"),
            Self::ConstantCase => words
                .iter()
                .map(|w| w.to_uppercase())
                .collect::<Vec<_>>()
                .join("_"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CamelCase => "camelCase",
            Self::PascalCase => "PascalCase",
            Self::SnakeCase => "snake_case",
            Self::KebabCase => "kebab-case",
            Self::ConstantCase => "CONSTANT_CASE",
        }
    }
}

impl fmt::Display for Casing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a key into words.
///
/// Boundaries are placed between a lowercase letter or digit and a following
/// uppercase letter (`fooBar`), before the last capital of an uppercase run
/// that is followed by a lowercase letter (`HTTPServer`), and at every run of
/// `-`, `_` or whitespace (the separators are dropped). Empty fragments are
/// discarded, so the function is total over any input.
pub fn split_words(key: &str) -> Vec<String> {
    let chars: Vec<char> = key.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if is_separator(c) {
            flush(&mut words, &mut current);
            continue;
        }

        if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
            let lower_to_upper =
                (prev.is_ascii_lowercase() || prev.is_ascii_digit()) && c.is_ascii_uppercase();
            let acronym_end = prev.is_ascii_uppercase()
                && c.is_ascii_uppercase()
                && chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            if lower_to_upper || acronym_end {
                flush(&mut words, &mut current);
            }
        }

        current.push(c);
    }

    flush(&mut words, &mut current);
    words
}

/// Recursively re-key every nested object of `map` into `casing`.
///
/// Arrays are copied as-is and never descended into. When two keys collapse
/// onto the same cased key, the one visited last wins.
pub fn transform_keys(map: &Map<String, Value>, casing: Casing) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Object(nested) => Value::Object(transform_keys(nested, casing)),
                other => other.clone(),
            };
            (casing.apply(key), value)
        })
        .collect()
}

// NUL counts as a separator as well.
fn is_separator(c: char) -> bool {
    c == '-' || c == '_' || c == '\0' || c.is_whitespace()
}

fn flush(words: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn join_lower(words: &[String], sep: &str) -> String {
    words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ALL: [Casing; 5] = [
        Casing::CamelCase,
        Casing::PascalCase,
        Casing::SnakeCase,
        Casing::KebabCase,
        Casing::ConstantCase,
    ];

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn split_on_separators() {
        assert_eq!(split_words("thread-id"), ["thread", "id"]);
        assert_eq!(split_words("mutable-content"), ["mutable", "content"]);
        assert_eq!(split_words("a__b  c-_-d"), ["a", "b", "c", "d"]);
    }

    #[test]
    fn split_on_case_boundaries() {
        assert_eq!(split_words("HTTPServer"), ["HTTP", "Server"]);
        assert_eq!(split_words("fooBarBAZQux"), ["foo", "Bar", "BAZ", "Qux"]);
        assert_eq!(split_words("v2Api"), ["v2", "Api"]);
        assert_eq!(split_words("ABCDeFGHi"), ["ABC", "De", "FG", "Hi"]);
    }

    #[test]
    fn split_degenerate_inputs() {
        assert!(split_words("").is_empty());
        assert!(split_words("--__  ").is_empty());
        assert_eq!(split_words("word"), ["word"]);
        assert_eq!(split_words("URL"), ["URL"]);
    }

    #[test]
    fn apply_each_convention() {
        let key = "thread-id";
        assert_eq!(Casing::CamelCase.apply(key), "threadId");
        assert_eq!(Casing::PascalCase.apply(key), "ThreadId");
        assert_eq!(Casing::SnakeCase.apply(key), "thread_id");
        assert_eq!(Casing::KebabCase.apply(key), "thread-id");
        assert_eq!(Casing::ConstantCase.apply(key), "THREAD_ID");
    }

    #[test]
    fn apply_lowercases_word_tails() {
        assert_eq!(Casing::PascalCase.apply("HTTPServer"), "HttpServer");
        assert_eq!(Casing::CamelCase.apply("XMLHttpRequest"), "xmlHttpRequest");
        assert_eq!(Casing::SnakeCase.apply("fcmOptions"), "fcm_options");
        assert_eq!(Casing::PascalCase.apply("phone_number"), "PhoneNumber");
    }

    #[test]
    fn apply_empty_and_single_word() {
        for casing in ALL {
            assert_eq!(casing.apply(""), "");
        }
        assert_eq!(Casing::CamelCase.apply("Title"), "title");
        assert_eq!(Casing::PascalCase.apply("title"), "Title");
        assert_eq!(Casing::ConstantCase.apply("title"), "TITLE");
    }

    #[test]
    fn transform_recurses_into_objects_only() {
        let input = obj(json!({
            "threadId": "t",
            "fcmOptions": { "analyticsLabel": "x" },
            "targetList": [{ "innerKey": 1 }],
        }));

        let out = transform_keys(&input, Casing::SnakeCase);

        assert_eq!(
            Value::Object(out),
            json!({
                "thread_id": "t",
                "fcm_options": { "analytics_label": "x" },
                "target_list": [{ "innerKey": 1 }],
            })
        );
    }

    #[test]
    fn transform_collisions_keep_one_value() {
        let input = obj(json!({ "thread-id": 1, "threadId": 2 }));
        let out = transform_keys(&input, Casing::SnakeCase);
        assert_eq!(out.len(), 1);
        assert!(out.contains_key("thread_id"));
    }

    #[test]
    fn transform_is_stable_under_reapplication() {
        let input = obj(json!({
            "threadId": "a",
            "mutable-content": 1,
            "HTTPServer": { "innerValue": true, "deep_nested": { "leafKey": null } },
            "apns_push_type": "alert",
            "fcmOptions": ["keep", "as", "is"],
        }));

        for casing in ALL {
            let once = transform_keys(&input, casing);
            let twice = transform_keys(&once, casing);
            assert_eq!(once, twice, "{casing} not stable");
        }
    }

    #[test]
    fn casing_serde_names() {
        assert_eq!(
            serde_json::to_string(&Casing::ConstantCase).unwrap(),
            "\"CONSTANT_CASE\""
        );
        let casing: Casing = serde_json::from_str("\"kebab-case\"").unwrap();
        assert_eq!(casing, Casing::KebabCase);
        assert_eq!(Casing::PascalCase.to_string(), "PascalCase");
    }
}
