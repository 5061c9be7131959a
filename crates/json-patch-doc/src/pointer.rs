//! JSON Pointer (RFC 6901) helpers.
//!
//! Paths are `Vec<String>` of unescaped components. Object members are looked
//! up exactly first and then case-insensitively, which is how patch clients
//! are allowed to spell member names.

use serde_json::{Map, Value};

/// A parsed JSON Pointer.
pub type Path = Vec<String>;

/// Decode one reference token: `~1` becomes `/`, then `~0` becomes `~`.
///
/// ```
/// use json_patch_doc::pointer::unescape_component;
///
/// assert_eq!(unescape_component("MyModel"), "MyModel");
/// assert_eq!(unescape_component("~01"), "~1");
/// assert_eq!(unescape_component("a~1b"), "a/b");
/// ```
pub fn unescape_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut chars = component.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.clone().next() {
            Some('0') => {
                out.push('~');
                chars.next();
            }
            Some('1') => {
                out.push('/');
                chars.next();
            }
            _ => out.push('~'),
        }
    }
    out
}

/// Encode one reference token, the inverse of [`unescape_component`].
///
/// ```
/// use json_patch_doc::pointer::escape_component;
///
/// assert_eq!(escape_component("extensionData"), "extensionData");
/// assert_eq!(escape_component("~/"), "~0~1");
/// ```
pub fn escape_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for c in component.chars() {
        match c {
            '~' => out.push_str("~0"),
            '/' => out.push_str("~1"),
            c => out.push(c),
        }
    }
    out
}

/// Split a pointer into unescaped components.
///
/// `""` addresses the root. The leading `/` may be left out, so `a/b` and
/// `/a/b` address the same member.
///
/// ```
/// use json_patch_doc::pointer::parse_json_pointer;
///
/// assert!(parse_json_pointer("").is_empty());
/// assert_eq!(parse_json_pointer("/MyModel/Foo"), ["MyModel", "Foo"]);
/// assert_eq!(parse_json_pointer("MyModel/Foo"), ["MyModel", "Foo"]);
/// ```
pub fn parse_json_pointer(pointer: &str) -> Path {
    match pointer {
        "" => Vec::new(),
        _ => pointer
            .strip_prefix('/')
            .unwrap_or(pointer)
            .split('/')
            .map(unescape_component)
            .collect(),
    }
}

/// Join components into a pointer, escaping each one.
///
/// ```
/// use json_patch_doc::pointer::format_json_pointer;
///
/// assert_eq!(format_json_pointer(&["a/b".to_string(), "c".to_string()]), "/a~1b/c");
/// ```
pub fn format_json_pointer(path: &[String]) -> String {
    path.iter()
        .map(|component| format!("/{}", escape_component(component)))
        .collect()
}

/// Whether `token` is a canonical array index: digits only, no leading zero.
pub fn is_valid_index(token: &str) -> bool {
    match token.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        digits => digits.iter().all(u8::is_ascii_digit),
    }
}

/// Case-insensitive comparison of two names or path components.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Find the member of `map` addressed by `key`.
///
/// An exact match wins; otherwise a unique case-insensitive match is used.
pub fn member_key<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    if let Some((k, _)) = map.get_key_value(key) {
        return Some(k.as_str());
    }
    let mut found = map.keys().filter(|k| eq_ignore_case(k, key));
    match (found.next(), found.next()) {
        (Some(k), None) => Some(k.as_str()),
        _ => None,
    }
}

/// Get a value by path, resolving object members like [`member_key`].
///
/// ```
/// use json_patch_doc::pointer::get;
/// use serde_json::json;
///
/// let doc = json!({"MyModel": {"Foo": [1, 2]}});
/// let path = vec!["myModel".to_string(), "Foo".to_string(), "1".to_string()];
/// assert_eq!(get(&doc, &path), Some(&json!(2)));
/// ```
pub fn get<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Array(arr) => {
                if !is_valid_index(step) {
                    return None;
                }
                arr.get(step.parse::<usize>().ok()?)?
            }
            Value::Object(map) => {
                let key = member_key(map, step)?;
                map.get(key)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`get`].
pub fn get_mut<'a>(val: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Array(arr) => {
                if !is_valid_index(step) {
                    return None;
                }
                arr.get_mut(step.parse::<usize>().ok()?)?
            }
            Value::Object(map) => {
                let key = member_key(map, step)?.to_string();
                map.get_mut(&key)?
            }
            _ => return None,
        };
    }
    Some(current)
}
