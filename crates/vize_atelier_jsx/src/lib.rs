//! Atelier JSX - The JSX Vapor compiler workshop for Vize.
//!
//! Compiles a JSX template into Vapor output: a table of static markup
//! strings cloned at runtime, and a render function that navigates the cloned
//! nodes and wires up reactive bindings.
//!
//! The pipeline has three stages:
//!
//! - **Parse**: JSX source to the relief element tree (`vize_relief`)
//! - **Transform**: element tree to Vapor IR ([`transform`])
//! - **Generate**: IR to JavaScript ([`generate`])
//!
//! # Example
//!
//! ```
//! use vize_atelier_jsx::{compile, CompilerOptions};
//! use vize_carton::Bump;
//!
//! let bump = Bump::new();
//! let result = compile(&bump, "<div>{msg}</div>", CompilerOptions::default()).unwrap();
//! assert_eq!(result.templates, vec!["<div> </div>"]);
//! assert!(result.code.contains("_setText"));
//! ```

pub mod directive;
pub mod expression;
pub mod generate;
pub mod ir;
pub mod options;
pub mod transform;
pub mod transforms;

pub use generate::{generate, GenerateResult, SourceMap};
pub use ir::*;
pub use options::{CompilerOptions, ErrorMode};
pub use transform::{transform, DirectiveTransformResult, TransformContext};

use vize_carton::{Bump, String};
use vize_relief::{parse_with_options, CompilerError, RootNode};

/// Output of [`compile`]
#[derive(Debug)]
pub struct CompileResult<'a> {
    /// Render function, `(() => { ... })()`
    pub code: std::string::String,
    /// Helper imports, template factories and event delegation
    pub preamble: std::string::String,
    pub templates: Vec<std::string::String>,
    /// Template of the single static root, if there is one
    pub root_template: Option<usize>,
    pub helpers: Vec<String>,
    pub delegated_events: Vec<String>,
    pub ast: &'a RootNode<'a>,
    pub source_map: Option<SourceMap>,
    /// Diagnostics collected with [`ErrorMode::Collect`]
    pub errors: Vec<CompilerError>,
}

/// Compile a JSX template.
///
/// With [`ErrorMode::Throw`] the first diagnostic is returned as the error.
pub fn compile<'a>(
    allocator: &'a Bump,
    source: &'a str,
    options: CompilerOptions,
) -> Result<CompileResult<'a>, CompilerError> {
    let (root, parse_errors) = {
        let _span = tracing::debug_span!("parse", filename = %options.filename).entered();
        parse_with_options(allocator, source, options.parser_options())
    };
    if let Some(on_error) = options.on_error {
        parse_errors.iter().for_each(on_error);
    }
    if options.error_mode == ErrorMode::Throw {
        if let Some(error) = parse_errors.first() {
            return Err(error.clone());
        }
    }

    let root = allocator.alloc(root);
    let mut result = compile_root(root, options)?;
    if !parse_errors.is_empty() {
        result.errors.splice(0..0, parse_errors);
    }
    Ok(result)
}

/// Compile a pre-parsed element tree.
pub fn compile_root<'a>(
    root: &'a RootNode<'a>,
    options: CompilerOptions,
) -> Result<CompileResult<'a>, CompilerError> {
    let error_mode = options.error_mode;
    let (ir, errors) = transform(root, options.clone());
    if error_mode == ErrorMode::Throw {
        if let Some(error) = errors.into_iter().next() {
            return Err(error);
        }
        return Ok(finish(root, &ir, &options, Vec::new()));
    }
    Ok(finish(root, &ir, &options, errors))
}

fn finish<'a>(
    root: &'a RootNode<'a>,
    ir: &RootIRNode,
    options: &CompilerOptions,
    errors: Vec<CompilerError>,
) -> CompileResult<'a> {
    let generated = generate(ir, options);
    CompileResult {
        code: generated.code,
        preamble: generated.preamble,
        templates: ir.templates.clone(),
        root_template: match ir.root_template_indexes.as_slice() {
            [index] => Some(*index),
            _ => None,
        },
        helpers: generated.helpers,
        delegated_events: generated.delegated_events,
        ast: root,
        source_map: generated.source_map,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vize_relief::ErrorCode;

    #[test]
    fn test_compile_simple() {
        let bump = Bump::new();
        let result = compile(&bump, "<div>hello</div>", CompilerOptions::default()).unwrap();
        assert_eq!(result.templates, vec!["<div>hello</div>"]);
        assert_eq!(result.root_template, Some(0));
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_throw_mode_returns_first_error() {
        let bump = Bump::new();
        let error = compile(&bump, "<div v-model={msg} />", CompilerOptions::default()).unwrap_err();
        assert_eq!(error.code, ErrorCode::VModelOnInvalidElement);
    }

    #[test]
    fn test_collect_mode_keeps_going() {
        let bump = Bump::new();
        let options = CompilerOptions {
            error_mode: ErrorMode::Collect,
            ..Default::default()
        };
        let result = compile(&bump, "<><div v-model={msg} /><p>{a}</p></>", options).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.templates, vec!["<div></div>", "<p> </p>"]);
    }

    #[test]
    fn test_parse_error() {
        let bump = Bump::new();
        let error = compile(&bump, "<div>", CompilerOptions::default()).unwrap_err();
        assert_eq!(error.code, ErrorCode::JsxParseError);
    }
}
