//! `application/x-www-form-urlencoded` view over a query string.

use crate::percent::{FORM_URLENCODED_SET, percent_decode_bytes};

/// An ordered multimap over URL query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlSearchParams {
    params: Vec<(String, String)>,
}

impl UrlSearchParams {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Parse from a query string (with or without leading `?`)
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);

        if query.is_empty() {
            return Self::new();
        }

        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (decode_component(key), decode_component(value)),
                None => (decode_component(pair), String::new()),
            })
            .collect();

        Self { params }
    }

    pub fn append(&mut self, key: &str, value: &str) {
        self.params.push((key.to_string(), value.to_string()));
    }

    /// Delete pairs with the given key. With a value, only pairs
    /// matching both are removed.
    pub fn delete(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(value) => self.params.retain(|(k, v)| k != key || v != value),
            None => self.params.retain(|(k, _)| k != key),
        }
    }

    /// Get the first value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get all values for a key.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Check if a key (or key-value pair) exists.
    pub fn has(&self, key: &str, value: Option<&str>) -> bool {
        match value {
            Some(value) => self.params.iter().any(|(k, v)| k == key && v == value),
            None => self.params.iter().any(|(k, _)| k == key),
        }
    }

    /// Set a key to a single value, replacing all existing values for
    /// that key but keeping its position.
    pub fn set(&mut self, key: &str, value: &str) {
        let mut found_first = false;
        self.params.retain_mut(|(k, v)| {
            if k != key {
                return true;
            }
            if found_first {
                return false;
            }
            found_first = true;
            *v = value.to_string();
            true
        });
        if !found_first {
            self.params.push((key.to_string(), value.to_string()));
        }
    }

    /// Stable sort by key.
    pub fn sort(&mut self) {
        self.params.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn size(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(_, v)| v.as_str())
    }

    /// Serialize with a leading `?`, or `""` when empty.
    pub fn serialize(&self) -> String {
        if self.params.is_empty() {
            return String::new();
        }

        let mut result = String::from("?");
        for (i, (key, value)) in self.params.iter().enumerate() {
            if i > 0 {
                result.push('&');
            }
            encode_component(&mut result, key);
            result.push('=');
            encode_component(&mut result, value);
        }
        result
    }
}

impl core::fmt::Display for UrlSearchParams {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// Decode one form-urlencoded component: `+` is a space, `%HH` decodes,
/// malformed sequences and non-UTF-8 bytes fall back lossily.
fn decode_component(input: &str) -> String {
    let plus_decoded = input.replace('+', " ");
    let bytes = percent_decode_bytes(&plus_decoded);
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Encode one component per the form-urlencoded serializer: spaces
/// become `+`, everything in the form set becomes `%HH`.
fn encode_component(out: &mut String, input: &str) {
    let mut utf8 = [0u8; 4];
    for c in input.chars() {
        if c == ' ' {
            out.push('+');
            continue;
        }
        for &b in c.encode_utf8(&mut utf8).as_bytes() {
            if b >= 0x80 || crate::percent::set_contains_byte(FORM_URLENCODED_SET, b) {
                crate::percent::percent_encode_byte_into(out, b);
            } else {
                out.push(b as char);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let params = UrlSearchParams::parse("?a=1&b=2&a=3");
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get_all("a"), vec!["1", "3"]);
        assert_eq!(params.get("b"), Some("2"));
        assert_eq!(params.size(), 3);
    }

    #[test]
    fn test_parse_decoding() {
        let params = UrlSearchParams::parse("q=hello+world&x=%26%3D");
        assert_eq!(params.get("q"), Some("hello world"));
        assert_eq!(params.get("x"), Some("&="));
    }

    #[test]
    fn test_keys_without_values() {
        let params = UrlSearchParams::parse("flag&x=1");
        assert!(params.has("flag", None));
        assert_eq!(params.get("flag"), Some(""));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut params = UrlSearchParams::parse("a=1&b=2&a=3");
        params.set("a", "9");
        assert_eq!(params.serialize(), "?a=9&b=2");
    }

    #[test]
    fn test_delete() {
        let mut params = UrlSearchParams::parse("a=1&b=2&a=3");
        params.delete("a", Some("1"));
        assert_eq!(params.serialize(), "?b=2&a=3");
        params.delete("a", None);
        assert_eq!(params.serialize(), "?b=2");
    }

    #[test]
    fn test_sort_is_stable() {
        let mut params = UrlSearchParams::parse("b=1&a=2&b=0");
        params.sort();
        assert_eq!(params.serialize(), "?a=2&b=1&b=0");
    }

    #[test]
    fn test_serialize_encodes() {
        let mut params = UrlSearchParams::new();
        params.append("key with space", "a&b=c");
        assert_eq!(params.serialize(), "?key+with+space=a%26b%3Dc");
    }

    #[test]
    fn test_round_trip() {
        let original = UrlSearchParams::parse("a=1&q=hello+world&sym=%26");
        let reparsed = UrlSearchParams::parse(&original.serialize());
        assert_eq!(original, reparsed);
    }
}
