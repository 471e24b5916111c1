//! Vapor Intermediate Representation (IR) types.
//!
//! The transform stage produces a [`RootIRNode`]; code generation consumes it.
//! IR nodes own their data (expressions are cloned out of the element tree), so
//! the IR outlives the arena the template was parsed into.

use serde::{Deserialize, Serialize};
use vize_carton::{bitflags, String};
use vize_relief::{SimpleExpressionNode, SourceLocation};

use crate::directive::DirectiveNode;
use crate::expression::ForParseResult;

/// IR node type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum IRNodeType {
    Root = 0,
    Block = 1,
    SetProp = 2,
    SetDynamicProps = 3,
    SetText = 4,
    SetEvent = 5,
    SetDynamicEvents = 6,
    SetHtml = 7,
    SetTemplateRef = 8,
    InsertNode = 9,
    CreateComponentNode = 10,
    Directive = 11,
    DeclareOldRef = 12,
    If = 13,
    For = 14,
    GetTextChild = 15,
    CreateNodes = 16,
    SetNodes = 17,
}

bitflags! {
    /// Dynamic flags for IR nodes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DynamicFlag: u8 {
        /// The node is addressed by a variable (`nN`)
        const REFERENCED = 1;
        /// The node is not part of the cloned template
        const NON_TEMPLATE = 1 << 1;
        /// The node is spliced in at runtime
        const INSERT = 1 << 2;
    }
}

/// Root IR node for one template
#[derive(Debug, Default)]
pub struct RootIRNode {
    pub source: String,
    /// Deduplicated static markup, in registration order
    pub templates: Vec<std::string::String>,
    /// Templates whose root node is the component root
    pub root_template_indexes: Vec<usize>,
    pub component: Vec<String>,
    pub directive: Vec<String>,
    pub block: BlockIRNode,
    pub has_template_ref: bool,
}

/// Block IR node - unit of reactive computation
#[derive(Debug, Default)]
pub struct BlockIRNode {
    /// Location of the node the block was created for
    pub loc: SourceLocation,
    pub dynamic: IRDynamicInfo,
    pub temp_id: usize,
    pub effect: Vec<IREffect>,
    pub operation: Vec<OperationNode>,
    pub returns: Vec<usize>,
}

impl BlockIRNode {
    pub fn new(loc: SourceLocation) -> Self {
        Self {
            loc,
            ..Default::default()
        }
    }
}

/// Dynamic info for IR nodes
#[derive(Debug, Default)]
pub struct IRDynamicInfo {
    pub id: Option<usize>,
    pub flags: DynamicFlag,
    pub anchor: Option<usize>,
    pub children: Vec<IRDynamicInfo>,
    pub template: Option<usize>,
    pub has_dynamic_child: bool,
    pub operation: Option<Box<OperationNode>>,
}

/// IR effect
#[derive(Debug, Default)]
pub struct IREffect {
    pub expressions: Vec<SimpleExpressionNode>,
    pub operations: Vec<OperationNode>,
}

/// Where an inserted block lands inside its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionAnchor {
    /// Before the parent's first child
    Prepend,
    /// Before the placeholder node `nN`
    Node(usize),
}

/// All operation node variants
#[derive(Debug)]
pub enum OperationNode {
    SetProp(SetPropIRNode),
    SetDynamicProps(SetDynamicPropsIRNode),
    SetText(SetTextIRNode),
    SetEvent(SetEventIRNode),
    SetDynamicEvents(SetDynamicEventsIRNode),
    SetHtml(SetHtmlIRNode),
    SetTemplateRef(SetTemplateRefIRNode),
    InsertNode(InsertNodeIRNode),
    Directive(DirectiveIRNode),
    If(Box<IfIRNode>),
    For(Box<ForIRNode>),
    CreateComponent(Box<CreateComponentIRNode>),
    DeclareOldRef(DeclareOldRefIRNode),
    GetTextChild(GetTextChildIRNode),
    CreateNodes(CreateNodesIRNode),
    SetNodes(SetNodesIRNode),
}

impl OperationNode {
    pub fn node_type(&self) -> IRNodeType {
        match self {
            Self::SetProp(_) => IRNodeType::SetProp,
            Self::SetDynamicProps(_) => IRNodeType::SetDynamicProps,
            Self::SetText(_) => IRNodeType::SetText,
            Self::SetEvent(_) => IRNodeType::SetEvent,
            Self::SetDynamicEvents(_) => IRNodeType::SetDynamicEvents,
            Self::SetHtml(_) => IRNodeType::SetHtml,
            Self::SetTemplateRef(_) => IRNodeType::SetTemplateRef,
            Self::InsertNode(_) => IRNodeType::InsertNode,
            Self::Directive(_) => IRNodeType::Directive,
            Self::If(_) => IRNodeType::If,
            Self::For(_) => IRNodeType::For,
            Self::CreateComponent(_) => IRNodeType::CreateComponentNode,
            Self::DeclareOldRef(_) => IRNodeType::DeclareOldRef,
            Self::GetTextChild(_) => IRNodeType::GetTextChild,
            Self::CreateNodes(_) => IRNodeType::CreateNodes,
            Self::SetNodes(_) => IRNodeType::SetNodes,
        }
    }

    /// Operations that produce a block of nodes rather than mutating one.
    pub fn is_block_operation(&self) -> bool {
        matches!(
            self,
            Self::If(_) | Self::For(_) | Self::CreateComponent(_) | Self::CreateNodes(_)
        )
    }

    /// Record where a block operation inserts its nodes.
    pub fn set_insertion(&mut self, parent: usize, anchor: Option<InsertionAnchor>) {
        match self {
            Self::If(op) => {
                op.parent = Some(parent);
                op.anchor = anchor;
            }
            Self::For(op) => {
                op.parent = Some(parent);
                op.anchor = anchor;
            }
            Self::CreateComponent(op) => {
                op.parent = Some(parent);
                op.anchor = anchor;
            }
            Self::CreateNodes(op) => {
                op.parent = Some(parent);
                op.anchor = anchor;
            }
            _ => {}
        }
    }

    /// Insertion target of a block operation, if one was registered.
    pub fn insertion(&self) -> Option<(usize, Option<InsertionAnchor>)> {
        let (parent, anchor) = match self {
            Self::If(op) => (op.parent, op.anchor),
            Self::For(op) => (op.parent, op.anchor),
            Self::CreateComponent(op) => (op.parent, op.anchor),
            Self::CreateNodes(op) => (op.parent, op.anchor),
            _ => return None,
        };
        parent.map(|parent| (parent, anchor))
    }
}

/// `.foo` (DOM property) or `^foo` (attribute) prop modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropModifier {
    Prop,
    Attr,
}

/// IR prop
#[derive(Debug, Clone)]
pub struct IRProp {
    pub key: SimpleExpressionNode,
    pub values: Vec<SimpleExpressionNode>,
    pub modifier: Option<PropModifier>,
    pub runtime_camelize: bool,
    pub handler: bool,
    pub handler_modifiers: Option<EventModifiers>,
    pub model: bool,
    pub model_modifiers: Vec<String>,
}

/// One entry of a prop bag: static props, a spread expression, or a
/// dynamically keyed prop.
#[derive(Debug, Clone)]
pub enum IRPropsEntry {
    Static(Vec<IRProp>),
    Dynamic {
        value: SimpleExpressionNode,
        /// `v-on={obj}` on a component
        handler: bool,
    },
    Attribute(IRProp),
}

/// Set prop operation
#[derive(Debug)]
pub struct SetPropIRNode {
    pub element: usize,
    pub prop: IRProp,
    pub tag: String,
}

/// Set dynamic props operation
#[derive(Debug)]
pub struct SetDynamicPropsIRNode {
    pub element: usize,
    pub props: Vec<IRPropsEntry>,
    pub tag: String,
}

/// Set text operation
#[derive(Debug)]
pub struct SetTextIRNode {
    pub element: usize,
    pub values: Vec<SimpleExpressionNode>,
    /// The text node was created by the compiler (`" "` placeholder)
    pub generated: bool,
}

/// Event modifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventModifiers {
    pub keys: Vec<String>,
    pub non_keys: Vec<String>,
    pub options: EventOptions,
}

/// Event options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOptions {
    pub capture: bool,
    pub once: bool,
    pub passive: bool,
}

impl EventOptions {
    pub fn is_empty(&self) -> bool {
        !(self.capture || self.once || self.passive)
    }
}

/// Set event operation
#[derive(Debug)]
pub struct SetEventIRNode {
    pub element: usize,
    pub key: SimpleExpressionNode,
    pub value: Option<SimpleExpressionNode>,
    pub modifiers: EventModifiers,
    /// Dynamic event name rewrite, e.g. `click` -> `contextmenu`
    pub key_override: Option<(String, String)>,
    pub delegate: bool,
    /// Whether the event name is reactive
    pub effect: bool,
}

/// `v-on={handlers}` on a native element
#[derive(Debug)]
pub struct SetDynamicEventsIRNode {
    pub element: usize,
    pub value: SimpleExpressionNode,
}

/// Set HTML operation
#[derive(Debug)]
pub struct SetHtmlIRNode {
    pub element: usize,
    pub value: SimpleExpressionNode,
}

/// Set template ref operation
#[derive(Debug)]
pub struct SetTemplateRefIRNode {
    pub element: usize,
    pub value: SimpleExpressionNode,
    pub ref_for: bool,
    pub effect: bool,
}

/// `let rN` holding the previous ref value
#[derive(Debug)]
pub struct DeclareOldRefIRNode {
    pub id: usize,
}

/// Insert node operation
#[derive(Debug)]
pub struct InsertNodeIRNode {
    pub elements: Vec<usize>,
    pub parent: usize,
    pub anchor: Option<InsertionAnchor>,
}

/// Built-in `v-model` flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    Text,
    Radio,
    Checkbox,
    Select,
    Dynamic,
}

/// Directive operation
#[derive(Debug)]
pub struct DirectiveIRNode {
    pub element: usize,
    pub dir: DirectiveNode,
    pub name: String,
    pub builtin: bool,
    pub model_type: Option<ModelType>,
}

/// If operation
#[derive(Debug)]
pub struct IfIRNode {
    pub id: usize,
    pub condition: SimpleExpressionNode,
    pub positive: BlockIRNode,
    pub negative: Option<NegativeBranch>,
    pub once: bool,
    pub parent: Option<usize>,
    pub anchor: Option<InsertionAnchor>,
}

/// Negative branch of if
#[derive(Debug)]
pub enum NegativeBranch {
    Block(BlockIRNode),
    If(Box<IfIRNode>),
}

/// For operation
#[derive(Debug)]
pub struct ForIRNode {
    pub id: usize,
    pub source: SimpleExpressionNode,
    pub value: Option<SimpleExpressionNode>,
    pub key: Option<SimpleExpressionNode>,
    pub index: Option<SimpleExpressionNode>,
    pub key_prop: Option<SimpleExpressionNode>,
    pub render: BlockIRNode,
    pub once: bool,
    pub component: bool,
    pub only_child: bool,
    pub parent: Option<usize>,
    pub anchor: Option<InsertionAnchor>,
}

/// Create component operation
#[derive(Debug)]
pub struct CreateComponentIRNode {
    pub id: usize,
    pub tag: String,
    pub props: Vec<IRPropsEntry>,
    pub slots: Vec<IRSlots>,
    pub root: bool,
    pub once: bool,
    /// `<component is={...}>`
    pub dynamic: Option<SimpleExpressionNode>,
    pub parent: Option<usize>,
    pub anchor: Option<InsertionAnchor>,
}

/// Slot body
#[derive(Debug, Default)]
pub struct SlotBlockIRNode {
    pub block: BlockIRNode,
    /// Slot props pattern (`v-slot={props}`)
    pub props: Option<SimpleExpressionNode>,
}

/// Slot descriptor
#[derive(Debug)]
pub enum IRSlots {
    Static(Vec<(String, SlotBlockIRNode)>),
    Dynamic(IRSlotDynamic),
    /// `v-slots={obj}`
    Expression(SimpleExpressionNode),
}

/// Dynamic slot descriptor
#[derive(Debug)]
pub enum IRSlotDynamic {
    Basic {
        name: SimpleExpressionNode,
        block: SlotBlockIRNode,
    },
    Loop {
        name: SimpleExpressionNode,
        block: SlotBlockIRNode,
        for_parse: ForParseResult,
    },
    Conditional {
        condition: SimpleExpressionNode,
        positive: Box<IRSlotDynamic>,
        negative: Option<Box<IRSlotDynamic>>,
    },
}

/// Get text child operation
#[derive(Debug)]
pub struct GetTextChildIRNode {
    pub parent: usize,
}

/// Interpolation group rendered as freestanding nodes
#[derive(Debug)]
pub struct CreateNodesIRNode {
    pub id: usize,
    pub values: Vec<SimpleExpressionNode>,
    pub blocks: Vec<JsxBlockIRNode>,
    pub once: bool,
    pub parent: Option<usize>,
    pub anchor: Option<InsertionAnchor>,
}

/// Replace an element's children with rendered values
#[derive(Debug)]
pub struct SetNodesIRNode {
    pub element: usize,
    pub values: Vec<SimpleExpressionNode>,
    pub blocks: Vec<JsxBlockIRNode>,
    pub once: bool,
    pub generated: bool,
}

/// JSX nested in a rendered value, compiled to its own block
#[derive(Debug)]
pub struct JsxBlockIRNode {
    /// Source offsets of the JSX
    pub start: u32,
    pub end: u32,
    pub block: BlockIRNode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_flags() {
        let mut flags = DynamicFlag::NON_TEMPLATE | DynamicFlag::INSERT;
        assert!(flags.contains(DynamicFlag::INSERT));
        flags.remove(DynamicFlag::NON_TEMPLATE);
        assert!(!flags.contains(DynamicFlag::NON_TEMPLATE));
        assert_eq!(flags.bits(), 4);
    }

    #[test]
    fn test_set_insertion() {
        let mut op = OperationNode::CreateNodes(CreateNodesIRNode {
            id: 1,
            values: Vec::new(),
            blocks: Vec::new(),
            once: false,
            parent: None,
            anchor: None,
        });
        assert!(op.is_block_operation());
        assert_eq!(op.insertion(), None);
        op.set_insertion(0, Some(InsertionAnchor::Prepend));
        assert_eq!(op.insertion(), Some((0, Some(InsertionAnchor::Prepend))));
        assert_eq!(op.node_type(), IRNodeType::CreateNodes);
    }
}
