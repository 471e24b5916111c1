//! Compiler options.

use vize_relief::{CompilerError, ParserOptions};

use crate::transform::{DirectiveTransform, NodeTransform};

/// What to do when the compiler reports an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Stop at the first error and return it
    #[default]
    Throw,
    /// Keep going with safe defaults and report every error
    Collect,
}

/// Options for [`compile`](crate::compile)
#[derive(Clone)]
pub struct CompilerOptions {
    /// File name used for source maps
    pub filename: String,
    /// Generate a source map
    pub source_map: bool,
    /// Tags that stay native elements even though they look like components
    pub is_custom_element: Option<fn(&str) -> bool>,
    /// Create components with the fallback-resolving constructor
    pub with_fallback: bool,
    /// Extra node transforms, run after the built-in preset
    pub node_transforms: Vec<NodeTransform>,
    /// Extra directive transforms; a name shared with a built-in overrides it
    pub directive_transforms: Vec<(&'static str, DirectiveTransform)>,
    pub error_mode: ErrorMode,
    /// Observer called for every reported error
    pub on_error: Option<fn(&CompilerError)>,
    /// Module the runtime helpers are imported from
    pub runtime_module_name: String,
    /// Hoist selector comparisons and key-only bindings out of keyed loops
    pub optimize_loops: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            filename: String::from("index.jsx"),
            source_map: false,
            is_custom_element: None,
            with_fallback: false,
            node_transforms: Vec::new(),
            directive_transforms: Vec::new(),
            error_mode: ErrorMode::Throw,
            on_error: None,
            runtime_module_name: String::from("vue"),
            optimize_loops: true,
        }
    }
}

impl CompilerOptions {
    pub fn is_custom_element(&self, tag: &str) -> bool {
        self.is_custom_element.is_some_and(|f| f(tag))
    }

    /// Options for the JSX syntax adapter
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            filename: self.filename.as_str().into(),
            is_custom_element: self.is_custom_element,
            ..Default::default()
        }
    }
}
