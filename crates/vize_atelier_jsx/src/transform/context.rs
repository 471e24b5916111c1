//! Transform context.
//!
//! The context is the traversal cursor of the transform stage. Instead of a
//! chain of per-node context objects it keeps a stack of [`Frame`]s, one per
//! node on the path from the root to the node being transformed. Blocks
//! entered by structural directives are saved on a second stack and swapped
//! back in when the directive's exit callback runs.

use std::mem;

use vize_carton::{FxHashMap, FxHashSet, String};
use vize_relief::{
    CompilerError, ElementNode, ElementType, ErrorCode, ExpressionContainerNode, FragmentNode,
    RootNode, SimpleExpressionNode, SourceLocation, TemplateChildNode, TextNode,
};

use super::{DirectiveTransform, NodeTransform};
use crate::expression::is_constant_expression;
use crate::ir::{
    BlockIRNode, DynamicFlag, IRDynamicInfo, IREffect, IRSlots, OperationNode, RootIRNode,
};
use crate::options::{CompilerOptions, ErrorMode};
use crate::transforms::get_base_transform_preset;

/// A node of the element tree as seen by the transforms.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Root(&'a RootNode<'a>),
    Element(&'a ElementNode<'a>),
    /// Implicit `<template>` around an element carrying `v-if` or `v-for`
    Wrapped(&'a ElementNode<'a>),
    Fragment(&'a FragmentNode<'a>),
    Text(&'a TextNode),
    Expression(&'a ExpressionContainerNode<'a>),
}

impl<'a> NodeRef<'a> {
    pub fn from_child(child: &'a TemplateChildNode<'a>) -> Self {
        match child {
            TemplateChildNode::Element(el) => Self::Element(el),
            TemplateChildNode::Fragment(fragment) => Self::Fragment(fragment),
            TemplateChildNode::Text(text) => Self::Text(text),
            TemplateChildNode::ExpressionContainer(exp) => Self::Expression(exp),
        }
    }

    pub fn children(self) -> Children<'a> {
        match self {
            Self::Root(root) => Children::List(&root.children),
            Self::Element(el) => Children::List(&el.children),
            Self::Fragment(fragment) => Children::List(&fragment.children),
            Self::Wrapped(el) => Children::Single(el),
            Self::Text(_) | Self::Expression(_) => Children::List(&[]),
        }
    }

    /// Nodes whose children become block roots instead of template markup.
    pub fn is_fragment(self) -> bool {
        match self {
            Self::Root(_) | Self::Fragment(_) | Self::Wrapped(_) => true,
            Self::Element(el) => matches!(el.tag_type, ElementType::Template | ElementType::Component),
            Self::Text(_) | Self::Expression(_) => false,
        }
    }

    /// The element, unless this is an implicit wrapper.
    pub fn element(self) -> Option<&'a ElementNode<'a>> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_text_like(self) -> bool {
        matches!(self, Self::Text(_) | Self::Expression(_))
    }

    pub fn loc(self) -> &'a SourceLocation {
        match self {
            Self::Root(root) => &root.loc,
            Self::Element(el) | Self::Wrapped(el) => &el.loc,
            Self::Fragment(fragment) => &fragment.loc,
            Self::Text(text) => &text.loc,
            Self::Expression(exp) => &exp.loc,
        }
    }

    /// Stable identity of the underlying tree node.
    pub fn identity(self) -> usize {
        match self {
            Self::Root(root) => root as *const RootNode<'a> as usize,
            Self::Element(el) | Self::Wrapped(el) => el as *const ElementNode<'a> as usize,
            Self::Fragment(fragment) => fragment as *const FragmentNode<'a> as usize,
            Self::Text(text) => text as *const TextNode as usize,
            Self::Expression(exp) => exp as *const ExpressionContainerNode<'a> as usize,
        }
    }
}

/// Children of a [`NodeRef`].
#[derive(Debug, Clone, Copy)]
pub enum Children<'a> {
    List(&'a [TemplateChildNode<'a>]),
    Single(&'a ElementNode<'a>),
}

impl<'a> Children<'a> {
    pub fn len(self) -> usize {
        match self {
            Self::List(list) => list.len(),
            Self::Single(_) => 1,
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub fn get(self, index: usize) -> Option<NodeRef<'a>> {
        match self {
            Self::List(list) => list.get(index).map(NodeRef::from_child),
            Self::Single(el) => (index == 0).then_some(NodeRef::Element(el)),
        }
    }

    pub fn iter(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

/// Per-node traversal state.
#[derive(Debug)]
pub(crate) struct Frame<'a> {
    node: Option<NodeRef<'a>>,
    index: usize,
    dynamic: IRDynamicInfo,
    template: std::string::String,
    children_template: Vec<std::string::String>,
    slots: Vec<IRSlots>,
    in_v_once: bool,
    root_template: bool,
}

impl<'a> Frame<'a> {
    fn new(node: NodeRef<'a>, index: usize, in_v_once: bool) -> Self {
        Self {
            node: Some(node),
            index,
            dynamic: IRDynamicInfo::default(),
            template: std::string::String::new(),
            children_template: Vec::new(),
            slots: Vec::new(),
            in_v_once,
            root_template: false,
        }
    }

    pub(crate) fn dynamic(&self) -> &IRDynamicInfo {
        &self.dynamic
    }

    pub(crate) fn template(&self) -> &str {
        &self.template
    }

    pub(crate) fn into_dynamic(self) -> IRDynamicInfo {
        self.dynamic
    }
}

/// Parent state saved by [`TransformContext::enter_block`].
#[derive(Debug)]
struct SavedBlock {
    block: BlockIRNode,
    dynamic: IRDynamicInfo,
    template: std::string::String,
    children_template: Vec<std::string::String>,
    slots: Vec<IRSlots>,
    is_v_for: bool,
    discarding: bool,
}

/// Transform context
pub struct TransformContext<'a> {
    pub root: &'a RootNode<'a>,
    pub options: CompilerOptions,
    pub ir: RootIRNode,
    /// Block currently receiving operations and effects
    pub block: BlockIRNode,
    /// Depth of enclosing `v-for` bodies
    pub in_v_for: usize,
    node_transforms: Vec<NodeTransform>,
    directive_transforms: Vec<(&'static str, DirectiveTransform)>,
    frames: Vec<Frame<'a>>,
    blocks: Vec<SavedBlock>,
    global_id: usize,
    template_index: FxHashMap<std::string::String, usize>,
    seen: FxHashSet<(usize, &'static str)>,
    scope_vars: Vec<String>,
    errors: Vec<CompilerError>,
    aborted: bool,
    /// The current block is dropped, so its markup is never instantiated.
    discarding: bool,
}

impl<'a> TransformContext<'a> {
    pub fn new(root: &'a RootNode<'a>, options: CompilerOptions) -> Self {
        let (mut node_transforms, directive_transforms) = get_base_transform_preset();
        node_transforms.extend(options.node_transforms.iter().copied());

        let ir = RootIRNode {
            source: root.source.clone(),
            ..Default::default()
        };

        Self {
            root,
            options,
            ir,
            block: BlockIRNode::new(root.loc.clone()),
            in_v_for: 0,
            node_transforms,
            directive_transforms,
            frames: vec![Frame::new(NodeRef::Root(root), 0, false)],
            blocks: Vec::new(),
            global_id: 0,
            template_index: FxHashMap::default(),
            seen: FxHashSet::default(),
            scope_vars: Vec::new(),
            errors: Vec::new(),
            aborted: false,
            discarding: false,
        }
    }

    /// Hand the finished IR and the collected errors back.
    pub fn finish(mut self) -> (RootIRNode, Vec<CompilerError>) {
        debug_assert!(self.blocks.is_empty(), "unbalanced enter_block/exit_block");
        let mut block = mem::take(&mut self.block);
        if let Some(root) = self.frames.pop() {
            block.dynamic = root.dynamic;
        }
        self.ir.block = block;
        (self.ir, self.errors)
    }

    // ------------------------------------------------------------------
    // Transform registry
    // ------------------------------------------------------------------

    pub fn node_transform(&self, index: usize) -> Option<NodeTransform> {
        self.node_transforms.get(index).copied()
    }

    /// User transforms registered under a built-in name take precedence.
    pub fn directive_transform(&self, name: &str) -> Option<DirectiveTransform> {
        self.options
            .directive_transforms
            .iter()
            .chain(self.directive_transforms.iter())
            .find(|(key, _)| *key == name)
            .map(|(_, transform)| *transform)
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    pub(crate) fn push_frame(&mut self, node: NodeRef<'a>, index: usize) {
        let in_v_once = self.in_v_once();
        self.frames.push(Frame::new(node, index, in_v_once));
    }

    pub(crate) fn pop_frame(&mut self) -> Option<Frame<'a>> {
        debug_assert!(self.frames.len() > 1, "the root frame is never popped");
        self.frames.pop()
    }

    fn frame(&self) -> &Frame<'a> {
        // The root frame lives until `finish`.
        &self.frames[self.frames.len() - 1]
    }

    fn frame_mut(&mut self) -> &mut Frame<'a> {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn parent_frame_mut(&mut self) -> Option<&mut Frame<'a>> {
        let len = self.frames.len();
        if len < 2 {
            return None;
        }
        self.frames.get_mut(len - 2)
    }

    /// The node being transformed, `None` once it was removed.
    pub fn node(&self) -> Option<NodeRef<'a>> {
        self.frame().node
    }

    pub fn parent_node(&self) -> Option<NodeRef<'a>> {
        let len = self.frames.len();
        if len < 2 {
            return None;
        }
        self.frames[len - 2].node
    }

    pub fn is_root_child(&self) -> bool {
        self.frames.len() == 2
    }

    /// Index of the current node among its parent's children.
    pub fn index(&self) -> usize {
        self.frame().index
    }

    /// Swap the current node, e.g. for an implicit `<template>` wrapper.
    pub fn replace_node(&mut self, node: NodeRef<'a>) {
        self.frame_mut().node = Some(node);
    }

    pub fn remove_node(&mut self) {
        self.frame_mut().node = None;
    }

    pub fn dynamic(&self) -> &IRDynamicInfo {
        &self.frame().dynamic
    }

    pub fn dynamic_mut(&mut self) -> &mut IRDynamicInfo {
        &mut self.frame_mut().dynamic
    }

    pub fn parent_dynamic_mut(&mut self) -> Option<&mut IRDynamicInfo> {
        self.parent_frame_mut().map(|frame| &mut frame.dynamic)
    }

    pub fn template_mut(&mut self) -> &mut std::string::String {
        &mut self.frame_mut().template
    }

    pub fn children_template_mut(&mut self) -> &mut Vec<std::string::String> {
        &mut self.frame_mut().children_template
    }

    pub fn slots_mut(&mut self) -> &mut Vec<IRSlots> {
        &mut self.frame_mut().slots
    }

    pub fn parent_slots_mut(&mut self) -> Option<&mut Vec<IRSlots>> {
        self.parent_frame_mut().map(|frame| &mut frame.slots)
    }

    pub fn in_v_once(&self) -> bool {
        self.frame().in_v_once
    }

    pub fn set_in_v_once(&mut self) {
        self.frame_mut().in_v_once = true;
    }

    /// Flag the current element's template as the component root template.
    pub fn mark_root_template(&mut self) {
        self.frame_mut().root_template = true;
    }

    pub(crate) fn is_root_template(&self) -> bool {
        self.frame().root_template
    }

    /// Whether the current element is the only node the render produces.
    pub fn is_single_root(&self) -> bool {
        if self.in_v_for > 0 || self.frames.len() < 2 {
            return false;
        }
        let mut parent = self.frames.len() - 2;
        if !self.frames[parent].node.is_some_and(has_single_root_child) {
            return false;
        }
        while parent > 0 && self.frames[parent].node.is_some_and(is_template_like) {
            parent -= 1;
            if !self.frames[parent].node.is_some_and(has_single_root_child) {
                return false;
            }
        }
        parent == 0
    }

    // ------------------------------------------------------------------
    // Ids and templates
    // ------------------------------------------------------------------

    pub fn increase_id(&mut self) -> usize {
        let id = self.global_id;
        self.global_id += 1;
        tracing::trace!("allocate id n{}", id);
        id
    }

    /// Give the current node an id; repeated calls return the same id.
    pub fn reference(&mut self) -> usize {
        if let Some(id) = self.dynamic().id {
            return id;
        }
        let id = self.increase_id();
        let dynamic = self.dynamic_mut();
        dynamic.flags |= DynamicFlag::REFERENCED;
        dynamic.id = Some(id);
        id
    }

    /// Add markup to the template table, reusing an identical entry.
    pub fn push_template(&mut self, content: std::string::String) -> usize {
        if let Some(&index) = self.template_index.get(&content) {
            return index;
        }
        let index = self.ir.templates.len();
        tracing::trace!("register template t{}: {}", index, content);
        self.template_index.insert(content.clone(), index);
        self.ir.templates.push(content);
        index
    }

    /// Flush the current node's markup into the template table.
    pub fn register_template(&mut self) -> Option<usize> {
        if self.discarding || self.frame().template.is_empty() {
            return None;
        }
        let content = self.frame().template.clone();
        let index = self.push_template(content);
        self.dynamic_mut().template = Some(index);
        Some(index)
    }

    // ------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------

    /// Make `block` the target of operations for the current node's subtree.
    pub fn enter_block(&mut self, mut block: BlockIRNode, is_v_for: bool) {
        let dynamic = mem::take(&mut block.dynamic);
        let saved_block = mem::replace(&mut self.block, block);
        let discarding = mem::take(&mut self.discarding);
        let frame = self.frame_mut();
        let saved = SavedBlock {
            block: saved_block,
            dynamic: mem::replace(&mut frame.dynamic, dynamic),
            template: mem::take(&mut frame.template),
            children_template: mem::take(&mut frame.children_template),
            slots: mem::take(&mut frame.slots),
            is_v_for,
            discarding,
        };
        self.blocks.push(saved);
        if is_v_for {
            self.in_v_for += 1;
        }
    }

    /// Finish the innermost block and restore the parent state.
    pub fn exit_block(&mut self) -> BlockIRNode {
        self.register_template();
        let Some(saved) = self.blocks.pop() else {
            debug_assert!(false, "exit_block without enter_block");
            return BlockIRNode::default();
        };
        let mut block = mem::replace(&mut self.block, saved.block);
        let frame = self.frame_mut();
        block.dynamic = mem::replace(&mut frame.dynamic, saved.dynamic);
        frame.template = saved.template;
        frame.children_template = saved.children_template;
        frame.slots = saved.slots;
        self.discarding = saved.discarding;
        if saved.is_v_for {
            self.in_v_for -= 1;
        }
        block
    }

    /// Keep the rest of the current block out of the template table.
    pub fn discard_templates(&mut self) {
        self.discarding = true;
    }

    pub fn is_discarding(&self) -> bool {
        self.discarding
    }

    // ------------------------------------------------------------------
    // Operations and effects
    // ------------------------------------------------------------------

    /// Insert an operation, at `*index` if given (which is then advanced).
    pub fn register_operation(&mut self, operation: OperationNode, index: Option<&mut usize>) {
        insert_at(&mut self.block.operation, operation, index);
    }

    /// Register an operation that re-runs whenever `expressions` change.
    ///
    /// Constant expressions are dropped; with nothing left to track, or inside
    /// `v-once`, the operation runs once instead.
    pub fn register_effect(
        &mut self,
        expressions: Vec<SimpleExpressionNode>,
        operation: OperationNode,
        effect_index: Option<&mut usize>,
        operation_index: Option<&mut usize>,
    ) {
        let expressions: Vec<SimpleExpressionNode> = expressions
            .into_iter()
            .filter(|exp| !is_constant_expression(exp))
            .collect();
        if self.in_v_once() || expressions.is_empty() {
            self.register_operation(operation, operation_index);
            return;
        }
        let effect = IREffect {
            expressions,
            operations: vec![operation],
        };
        insert_at(&mut self.block.effect, effect, effect_index);
    }

    // ------------------------------------------------------------------
    // Bookkeeping
    // ------------------------------------------------------------------

    /// Mark a node as handled by `pass`; returns `false` if it already was.
    pub fn mark_seen(&mut self, node: NodeRef<'a>, pass: &'static str) -> bool {
        self.seen.insert((node.identity(), pass))
    }

    pub(crate) fn is_seen(&self, node: NodeRef<'a>, pass: &'static str) -> bool {
        self.seen.contains(&(node.identity(), pass))
    }

    /// Bring loop or slot variables into scope; returns how many were added.
    pub fn push_scope_vars(&mut self, names: impl IntoIterator<Item = String>) -> usize {
        let before = self.scope_vars.len();
        self.scope_vars.extend(names);
        self.scope_vars.len() - before
    }

    pub fn pop_scope_vars(&mut self, count: usize) {
        let len = self.scope_vars.len().saturating_sub(count);
        self.scope_vars.truncate(len);
    }

    pub fn is_scope_var(&self, name: &str) -> bool {
        self.scope_vars.iter().any(|var| var == name)
    }

    pub fn add_component(&mut self, name: &str) {
        if !self.ir.component.iter().any(|c| c == name) {
            self.ir.component.push(String::from(name));
        }
    }

    pub fn add_directive(&mut self, name: &str) {
        if !self.ir.directive.iter().any(|d| d == name) {
            self.ir.directive.push(String::from(name));
        }
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    /// Report an error; in [`ErrorMode::Throw`] the traversal stops.
    pub fn on_error(&mut self, code: ErrorCode, loc: Option<SourceLocation>) {
        let error = CompilerError::new(code, loc);
        tracing::debug!("compiler error {:?}: {}", code, error.message);
        if let Some(on_error) = self.options.on_error {
            on_error(&error);
        }
        if self.options.error_mode == ErrorMode::Throw {
            self.aborted = true;
        }
        self.errors.push(error);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

fn insert_at<T>(list: &mut Vec<T>, item: T, index: Option<&mut usize>) {
    match index {
        Some(index) => {
            debug_assert!(*index <= list.len());
            let at = (*index).min(list.len());
            list.insert(at, item);
            *index += 1;
        }
        None => list.push(item),
    }
}

fn is_template_like(node: NodeRef<'_>) -> bool {
    match node {
        NodeRef::Wrapped(_) => true,
        NodeRef::Element(el) => el.tag_type == ElementType::Template,
        _ => false,
    }
}

fn has_conditional(node: NodeRef<'_>, names: &[&str]) -> bool {
    node.element().is_some_and(|el| {
        el.props.iter().any(|prop| match prop {
            vize_relief::PropNode::Attribute(attr) => names.contains(&attr.name.as_str()),
            vize_relief::PropNode::Spread(_) => false,
        })
    })
}

/// One child, or a single `v-if`/`v-else-if`/`v-else` chain.
fn has_single_root_child(node: NodeRef<'_>) -> bool {
    let children = node.children();
    if children.len() == 1 {
        return true;
    }
    let mut seen_if = false;
    for child in children.iter() {
        if has_conditional(child, &["v-if"]) {
            if seen_if {
                return false;
            }
            seen_if = true;
        } else if !seen_if || !has_conditional(child, &["v-else", "v-else-if"]) {
            return false;
        }
    }
    seen_if
}
