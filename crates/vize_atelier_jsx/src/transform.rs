//! JSX element tree to Vapor IR.
//!
//! The traversal is driven by a list of node transforms. Each one may act on
//! entering a node and may return exit callbacks, which run in reverse order
//! after the node's subtree has been transformed. Directive transforms are
//! looked up by name while the element transform builds props.

mod context;

pub use context::{Children, NodeRef, TransformContext};

use vize_carton::String;
use vize_relief::{CompilerError, ElementNode, RootNode, SimpleExpressionNode};

use crate::directive::DirectiveNode;
use crate::ir::{EventModifiers, IRProp, PropModifier, RootIRNode};
use crate::options::CompilerOptions;

/// Callback run when leaving a node.
pub type ExitFn<'a> = Box<dyn FnOnce(&mut TransformContext<'a>) + 'a>;

/// A structural or element-level transform.
pub type NodeTransform = for<'a> fn(&mut TransformContext<'a>) -> Option<Vec<ExitFn<'a>>>;

/// A transform for one directive (attribute form) on an element.
pub type DirectiveTransform = for<'a> fn(
    &DirectiveNode,
    &'a ElementNode<'a>,
    &mut TransformContext<'a>,
) -> Option<DirectiveTransformResult>;

/// Prop produced by a directive transform.
#[derive(Debug, Clone)]
pub struct DirectiveTransformResult {
    pub key: SimpleExpressionNode,
    pub value: SimpleExpressionNode,
    pub modifier: Option<PropModifier>,
    pub runtime_camelize: bool,
    pub handler: bool,
    pub handler_modifiers: Option<EventModifiers>,
    pub model: bool,
    pub model_modifiers: Vec<String>,
}

impl DirectiveTransformResult {
    pub fn new(key: SimpleExpressionNode, value: SimpleExpressionNode) -> Self {
        Self {
            key,
            value,
            modifier: None,
            runtime_camelize: false,
            handler: false,
            handler_modifiers: None,
            model: false,
            model_modifiers: Vec::new(),
        }
    }

    pub fn into_prop(self) -> IRProp {
        IRProp {
            key: self.key,
            values: vec![self.value],
            modifier: self.modifier,
            runtime_camelize: self.runtime_camelize,
            handler: self.handler,
            handler_modifiers: self.handler_modifiers,
            model: self.model,
            model_modifiers: self.model_modifiers,
        }
    }
}

/// Transform a parsed JSX tree into Vapor IR.
///
/// Errors are collected alongside the IR; with [`ErrorMode::Throw`] the
/// traversal stops after the first one.
///
/// [`ErrorMode::Throw`]: crate::options::ErrorMode::Throw
pub fn transform<'a>(
    root: &'a RootNode<'a>,
    options: CompilerOptions,
) -> (RootIRNode, Vec<CompilerError>) {
    let _span = tracing::debug_span!("transform", filename = %options.filename).entered();
    let mut ctx = TransformContext::new(root, options);
    transform_node(&mut ctx);
    let (ir, errors) = ctx.finish();
    tracing::debug!(
        "transformed into {} templates, {} errors",
        ir.templates.len(),
        errors.len()
    );
    (ir, errors)
}

/// Run every node transform on the current node, then the collected exits.
pub fn transform_node(ctx: &mut TransformContext<'_>) {
    let mut exits = Vec::new();
    let mut index = 0;
    while let Some(node_transform) = ctx.node_transform(index) {
        index += 1;
        if let Some(on_exit) = node_transform(ctx) {
            exits.extend(on_exit);
        }
        if ctx.is_aborted() || ctx.node().is_none() {
            return;
        }
    }
    while let Some(exit) = exits.pop() {
        if ctx.is_aborted() {
            return;
        }
        exit(ctx);
    }
}
