//! Text and `{expression}` children.

use vize_carton::escape_html;
use vize_relief::{ElementType, SimpleExpressionNode};

use crate::expression::{contains_jsx, literal_value};
use crate::ir::{
    BlockIRNode, CreateNodesIRNode, DynamicFlag, GetTextChildIRNode, JsxBlockIRNode,
    OperationNode, SetNodesIRNode, SetTextIRNode,
};
use crate::transform::{transform_node, Children, ExitFn, NodeRef, TransformContext};

const SEEN: &str = "text";

pub fn transform_text<'a>(ctx: &mut TransformContext<'a>) -> Option<Vec<ExitFn<'a>>> {
    let node = ctx.node()?;
    if ctx.is_seen(node, SEEN) {
        ctx.dynamic_mut().flags |= DynamicFlag::NON_TEMPLATE;
        return None;
    }

    match node {
        NodeRef::Text(text) => {
            ctx.template_mut().push_str(&escape_html(&text.content));
        }
        NodeRef::Expression(_) => process_interpolation(ctx),
        NodeRef::Wrapped(_) => {}
        _ => {
            let children = node.children();
            if children.is_empty() {
                return None;
            }
            let has_expression = children.iter().any(|c| matches!(c, NodeRef::Expression(_)));
            let all_text_like = children.iter().all(NodeRef::is_text_like);
            let is_native = node
                .element()
                .is_some_and(|el| el.tag_type == ElementType::Element);

            if is_native && all_text_like && has_expression {
                process_text_container(ctx, children);
            } else if has_expression {
                // Text directly before an interpolation joins its group.
                for index in 1..children.len() {
                    if let (Some(prev @ NodeRef::Text(_)), Some(NodeRef::Expression(_))) =
                        (children.get(index - 1), children.get(index))
                    {
                        ctx.mark_seen(prev, SEEN);
                    }
                }
            }
        }
    }
    None
}

/// Values of a run of text-like children; marks them as handled.
fn process_text_like_children<'a>(
    ctx: &mut TransformContext<'a>,
    nodes: impl IntoIterator<Item = NodeRef<'a>>,
) -> Vec<SimpleExpressionNode> {
    let mut values = Vec::new();
    for node in nodes {
        ctx.mark_seen(node, SEEN);
        match node {
            NodeRef::Text(text) => values.push(SimpleExpressionNode::new(
                text.content.clone(),
                true,
                text.loc.clone(),
            )),
            NodeRef::Expression(exp) if !exp.expression.is_empty() => {
                values.push(exp.expression.clone());
            }
            _ => {}
        }
    }
    values
}

/// A native element whose children are all text: one text node.
fn process_text_container<'a>(ctx: &mut TransformContext<'a>, children: Children<'a>) {
    let values = process_text_like_children(ctx, children.iter());

    if values
        .iter()
        .any(|value| !value.is_static && contains_jsx(&value.content))
    {
        ctx.children_template_mut().clear();
        let element = ctx.reference();
        let blocks = transform_nested_jsx(ctx, children.iter());
        let once = ctx.in_v_once();
        ctx.register_operation(
            OperationNode::SetNodes(SetNodesIRNode {
                element,
                values,
                blocks,
                once,
                generated: false,
            }),
            None,
        );
        return;
    }

    let literals: Option<Vec<String>> = values.iter().map(literal_value).collect();
    if let Some(literals) = literals {
        *ctx.children_template_mut() = literals
            .iter()
            .map(|literal| escape_html(literal).to_string())
            .collect();
        return;
    }

    *ctx.children_template_mut() = vec![String::from(" ")];
    let parent = ctx.reference();
    ctx.register_operation(OperationNode::GetTextChild(GetTextChildIRNode { parent }), None);
    ctx.register_effect(
        values.clone(),
        OperationNode::SetText(SetTextIRNode {
            element: parent,
            values,
            generated: true,
        }),
        None,
        None,
    );
}

/// An interpolation among other nodes: a group of runtime-created nodes.
fn process_interpolation(ctx: &mut TransformContext<'_>) {
    let Some(parent) = ctx.parent_node() else {
        return;
    };
    let siblings = parent.children();
    let index = ctx.index();

    let mut group = Vec::new();
    if let Some(prev @ NodeRef::Text(_)) = index.checked_sub(1).and_then(|i| siblings.get(i)) {
        group.push(prev);
    }
    group.extend(
        (index..siblings.len())
            .filter_map(|i| siblings.get(i))
            .take_while(|node| node.is_text_like()),
    );

    let values = process_text_like_children(ctx, group.iter().copied());
    if values.is_empty() {
        ctx.dynamic_mut().flags |= DynamicFlag::NON_TEMPLATE;
        return;
    }
    let id = ctx.reference();
    ctx.dynamic_mut().flags |= DynamicFlag::INSERT | DynamicFlag::NON_TEMPLATE;
    let blocks = transform_nested_jsx(ctx, group);
    let once = ctx.in_v_once();
    ctx.dynamic_mut().operation = Some(Box::new(OperationNode::CreateNodes(CreateNodesIRNode {
        id,
        values,
        blocks,
        once,
        parent: None,
        anchor: None,
    })));
}

/// Compile the JSX nested in interpolations, each root into its own block.
fn transform_nested_jsx<'a>(
    ctx: &mut TransformContext<'a>,
    nodes: impl IntoIterator<Item = NodeRef<'a>>,
) -> Vec<JsxBlockIRNode> {
    let mut blocks = Vec::new();
    for node in nodes {
        let NodeRef::Expression(exp) = node else {
            continue;
        };
        for root in exp.jsx.iter() {
            ctx.push_frame(NodeRef::Fragment(root), 0);
            ctx.enter_block(BlockIRNode::new(root.loc.clone()), false);
            transform_node(ctx);
            let block = ctx.exit_block();
            ctx.pop_frame();
            if ctx.is_aborted() {
                return blocks;
            }
            blocks.push(JsxBlockIRNode {
                start: root.loc.start.offset,
                end: root.loc.end.offset,
                block,
            });
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use crate::ir::{DynamicFlag, OperationNode, RootIRNode};
    use crate::options::{CompilerOptions, ErrorMode};
    use crate::transform::transform;
    use vize_relief::{parse, Bump};

    fn run(source: &str) -> RootIRNode {
        let bump = Bump::new();
        let (root, _) = parse(&bump, source);
        let root = bump.alloc(root);
        let options = CompilerOptions {
            error_mode: ErrorMode::Collect,
            ..Default::default()
        };
        transform(root, options).0
    }

    #[test]
    fn test_text_container() {
        let ir = run("<p>count: {count}</p>");
        assert_eq!(ir.templates, vec!["<p> </p>"]);
        assert!(matches!(ir.block.operation[0], OperationNode::GetTextChild(_)));
        let OperationNode::SetText(set_text) = &ir.block.effect[0].operations[0] else {
            panic!("expected set text");
        };
        assert_eq!(set_text.values.len(), 2);
        assert!(set_text.values[0].is_static);
        assert!(set_text.generated);
    }

    #[test]
    fn test_literal_text_is_folded() {
        let ir = run(r#"<p>{"a < b"}</p>"#);
        assert_eq!(ir.templates, vec!["<p>a &lt; b</p>"]);
        assert!(ir.block.effect.is_empty());
        assert!(ir.block.operation.is_empty());
    }

    #[test]
    fn test_mixed_children_create_nodes() {
        let ir = run("<div>hi {name}<span /></div>");
        assert_eq!(ir.templates, vec!["<div><span></span></div>"]);
        let children = &ir.block.dynamic.children[0].children;
        assert!(children[0].flags.contains(DynamicFlag::NON_TEMPLATE));
        let Some(OperationNode::CreateNodes(nodes)) = children[1].operation.as_deref() else {
            panic!("expected create nodes");
        };
        assert_eq!(nodes.values.len(), 2);
        assert_eq!(nodes.values[0].content.as_str(), "hi ");
    }

    #[test]
    fn test_jsx_in_expression_sets_nodes() {
        let ir = run("<div>{ok ? <b /> : null}</div>");
        assert_eq!(ir.templates, vec!["<b></b>", "<div></div>"]);
        let OperationNode::SetNodes(set_nodes) = &ir.block.operation[0] else {
            panic!("expected set nodes");
        };
        assert_eq!(set_nodes.blocks.len(), 1);
        assert_eq!(set_nodes.blocks[0].start, 11);
        assert_eq!(set_nodes.blocks[0].block.returns.len(), 1);
    }

    #[test]
    fn test_jsx_among_elements_creates_nodes() {
        let ir = run("<div><i />{list.map(item => <li>{item}</li>)}</div>");
        let children = &ir.block.dynamic.children[0].children;
        let Some(OperationNode::CreateNodes(nodes)) = children[1].operation.as_deref() else {
            panic!("expected create nodes");
        };
        assert_eq!(nodes.blocks.len(), 1);
        assert_eq!(nodes.blocks[0].block.effect.len(), 1);
    }
}
