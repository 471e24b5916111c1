//! Compiler error model.
//!
//! Errors are plain data: a code plus an optional source location. The
//! transform pipeline hands them to an error sink and decides whether to stop
//! or keep going based on the configured error mode.

use serde::{Deserialize, Serialize};
use vize_carton::String;

use crate::ast::SourceLocation;

/// Compiler error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ErrorCode {
    // Syntax adapter
    JsxParseError = 0,
    UnexpectedRoot = 1,

    // Structural directives
    VIfNoExpression = 10,
    VIfSameKey = 11,
    VElseNoAdjacentIf = 12,
    VForNoExpression = 13,
    VForMalformedExpression = 14,

    // Binding directives
    VBindNoExpression = 20,
    VOnNoExpression = 21,
    VShowNoExpression = 22,
    VHtmlNoExpression = 23,
    VHtmlWithChildren = 24,
    VTextNoExpression = 25,
    VTextWithChildren = 26,

    // Slots
    VSlotUnexpectedDirectiveOnSlotOutlet = 30,
    VSlotMixedSlotUsage = 31,
    VSlotDuplicateSlotNames = 32,
    VSlotExtraneousDefaultSlotChildren = 33,
    VSlotMisplaced = 34,

    // v-model
    VModelNoExpression = 40,
    VModelMalformedExpression = 41,
    VModelOnScopeVariable = 42,
    VModelOnProps = 43,
    VModelOnInvalidElement = 44,
    VModelArgOnElement = 45,
    VModelOnFileInputElement = 46,
    VModelUnnecessaryValue = 47,
}

impl ErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            Self::JsxParseError => "Failed to parse JSX template.",
            Self::UnexpectedRoot => "Template root must be a single JSX element or fragment.",
            Self::VIfNoExpression => "v-if/v-else-if is missing expression.",
            Self::VIfSameKey => "v-if/else branches must use unique keys.",
            Self::VElseNoAdjacentIf => "v-else/v-else-if has no adjacent v-if or v-else-if.",
            Self::VForNoExpression => "v-for is missing expression.",
            Self::VForMalformedExpression => "v-for has invalid expression.",
            Self::VBindNoExpression => "v-bind is missing expression.",
            Self::VOnNoExpression => "v-on is missing expression.",
            Self::VShowNoExpression => "v-show is missing expression.",
            Self::VHtmlNoExpression => "v-html is missing expression.",
            Self::VHtmlWithChildren => "v-html will override element children.",
            Self::VTextNoExpression => "v-text is missing expression.",
            Self::VTextWithChildren => "v-text will override element children.",
            Self::VSlotUnexpectedDirectiveOnSlotOutlet => {
                "Unexpected custom directive on <slot> outlet."
            }
            Self::VSlotMixedSlotUsage => {
                "Mixed v-slot usage on both the component and nested <template>. \
                 When there are multiple named slots, all slots should use <template> syntax \
                 to avoid scope ambiguity."
            }
            Self::VSlotDuplicateSlotNames => "Duplicate slot names found.",
            Self::VSlotExtraneousDefaultSlotChildren => {
                "Extraneous children found when component already has explicitly named \
                 default slot. These children will be ignored."
            }
            Self::VSlotMisplaced => "v-slot can only be used on components or <template> tags.",
            Self::VModelNoExpression => "v-model is missing expression.",
            Self::VModelMalformedExpression => {
                "v-model value must be a valid JavaScript member expression."
            }
            Self::VModelOnScopeVariable => {
                "v-model cannot be used on v-for or v-slot scope variables because they are not writable."
            }
            Self::VModelOnProps => {
                "v-model cannot be used on a prop, because local prop bindings are not writable."
            }
            Self::VModelOnInvalidElement => {
                "v-model can only be used on <input>, <textarea> and <select> elements."
            }
            Self::VModelArgOnElement => "v-model argument is not supported on plain elements.",
            Self::VModelOnFileInputElement => {
                "v-model cannot be used on file inputs since they are read-only. \
                 Use a v-on:change listener instead."
            }
            Self::VModelUnnecessaryValue => {
                "Unnecessary value binding used alongside v-model. It will interfere with \
                 v-model's behavior."
            }
        }
    }
}

/// A compiler diagnostic
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CompilerError {
    pub code: ErrorCode,
    pub loc: Option<SourceLocation>,
    pub message: String,
}

impl CompilerError {
    pub fn new(code: ErrorCode, loc: Option<SourceLocation>) -> Self {
        Self {
            code,
            loc,
            message: String::from(code.message()),
        }
    }

    /// Error with a custom message (used for syntax errors reported by oxc).
    pub fn with_message(
        code: ErrorCode,
        loc: Option<SourceLocation>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            loc,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert!(!ErrorCode::VElseNoAdjacentIf.message().is_empty());
        assert!(!ErrorCode::VModelOnFileInputElement.message().is_empty());
        assert!(!ErrorCode::VSlotMixedSlotUsage.message().is_empty());
    }

    #[test]
    fn test_display() {
        let err = CompilerError::new(ErrorCode::VShowNoExpression, None);
        assert_eq!(err.to_string(), "v-show is missing expression.");
        let err = CompilerError::with_message(ErrorCode::JsxParseError, None, "Unexpected token");
        assert_eq!(err.to_string(), "Unexpected token");
        assert_eq!(err.code, ErrorCode::JsxParseError);
    }
}
