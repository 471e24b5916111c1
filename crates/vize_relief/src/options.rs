//! Syntax adapter options.

use vize_carton::String;

/// Parser options
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// File name used in diagnostics
    pub filename: String,
    /// Whether is a custom element (kept as a native element)
    pub is_custom_element: Option<fn(&str) -> bool>,
    /// Whether is a void tag
    pub is_void_tag: fn(&str) -> bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            filename: String::from("index.jsx"),
            is_custom_element: None,
            is_void_tag: vize_carton::is_void_tag,
        }
    }
}

impl ParserOptions {
    pub fn is_custom_element(&self, tag: &str) -> bool {
        self.is_custom_element.is_some_and(|f| f(tag))
    }
}
