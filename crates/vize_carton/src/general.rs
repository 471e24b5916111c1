//! General string utilities shared across the compiler.

use crate::String;

/// Convert kebab-case to camelCase: `foo-bar` -> `fooBar`
pub fn camelize(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            result.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }
    if upper_next {
        result.push('-');
    }
    result
}

/// Uppercase the first character: `foo` -> `Foo`
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let mut result = String::with_capacity(s.len());
            result.push(first.to_ascii_uppercase());
            result.push_str(chars.as_str());
            result
        }
        None => String::default(),
    }
}

/// Lowercase the first character: `Click` -> `click`
pub fn uncapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let mut result = String::with_capacity(s.len());
            result.push(first.to_ascii_lowercase());
            result.push_str(chars.as_str());
            result
        }
        None => String::default(),
    }
}

/// Event name to handler prop key: `click` -> `onClick`
pub fn to_handler_key(event: &str) -> String {
    if event.is_empty() {
        return String::const_new("on");
    }
    let mut key = String::const_new("on");
    key.push_str(&capitalize(event));
    key
}

#[inline]
fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphabetic())
}

#[inline]
fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

/// Check whether `s` is a plain JavaScript identifier.
pub fn is_simple_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_identifier_start(c) => chars.all(is_identifier_part),
        _ => false,
    }
}

/// Escape a string for use inside a double-quoted HTML attribute.
pub fn escape_html_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("&quot;"),
            '&' => result.push_str("&amp;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape text content for inclusion in a static HTML template.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("foo-bar").as_str(), "fooBar");
        assert_eq!(camelize("foo-bar-baz").as_str(), "fooBarBaz");
        assert_eq!(camelize("foo").as_str(), "foo");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("click").as_str(), "Click");
        assert_eq!(capitalize("").as_str(), "");
        assert_eq!(uncapitalize("KeyDown").as_str(), "keyDown");
    }

    #[test]
    fn test_to_handler_key() {
        assert_eq!(to_handler_key("click").as_str(), "onClick");
        assert_eq!(to_handler_key("update:modelValue").as_str(), "onUpdate:modelValue");
    }

    #[test]
    fn test_identifiers() {
        assert!(is_simple_identifier("foo"));
        assert!(is_simple_identifier("_foo$1"));
        assert!(!is_simple_identifier("1foo"));
        assert!(!is_simple_identifier("foo-bar"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_html_attr(r#"a"b"#).as_str(), "a&quot;b");
        assert_eq!(escape_html("a > b").as_str(), "a &gt; b");
    }
}
