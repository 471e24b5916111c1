//! `v-if`, `v-else-if` and `v-else`.
//!
//! The `v-if` element becomes an `If` operation on its own dynamic slot. The
//! following `v-else-if`/`v-else` siblings attach their blocks to that
//! operation instead of producing nodes of their own.

use vize_relief::{ElementNode, ElementType, ErrorCode, SimpleExpressionNode};

use crate::expression::is_constant_expression;
use crate::ir::{BlockIRNode, DynamicFlag, IRDynamicInfo, IfIRNode, NegativeBranch, OperationNode};
use crate::transform::{ExitFn, NodeRef, TransformContext};

use super::{find_directive, has_directive, is_template_slot};

pub fn transform_v_if<'a>(ctx: &mut TransformContext<'a>) -> Option<Vec<ExitFn<'a>>> {
    let Some(NodeRef::Element(el)) = ctx.node() else {
        return None;
    };
    if is_template_slot(el) {
        return None;
    }
    let dir = find_directive(el, "if")
        .or_else(|| find_directive(el, "else-if"))
        .or_else(|| find_directive(el, "else"))?;
    if !ctx.mark_seen(NodeRef::Element(el), "if") {
        return None;
    }

    let condition = if dir.name == "else" {
        None
    } else {
        Some(dir.exp.clone().unwrap_or_else(|| {
            ctx.on_error(ErrorCode::VIfNoExpression, Some(dir.loc.clone()));
            SimpleExpressionNode::new("true", false, dir.loc.clone())
        }))
    };

    ctx.dynamic_mut().flags |= DynamicFlag::NON_TEMPLATE;

    match condition {
        Some(condition) if dir.name == "if" => {
            let id = ctx.reference();
            ctx.dynamic_mut().flags |= DynamicFlag::INSERT;
            enter_branch(ctx, el);
            Some(vec![Box::new(move |ctx: &mut TransformContext<'a>| {
                let once = ctx.in_v_once() || is_constant_expression(&condition);
                let positive = ctx.exit_block();
                let operation = IfIRNode {
                    id,
                    condition,
                    positive,
                    negative: None,
                    once,
                    parent: None,
                    anchor: None,
                };
                ctx.dynamic_mut().operation = Some(Box::new(OperationNode::If(Box::new(operation))));
            })])
        }
        condition => {
            if !has_adjacent_if(ctx) {
                ctx.on_error(ErrorCode::VElseNoAdjacentIf, Some(el.loc.clone()));
                ctx.dynamic_mut().flags.remove(DynamicFlag::NON_TEMPLATE);
                return None;
            }
            enter_branch(ctx, el);
            Some(vec![Box::new(move |ctx: &mut TransformContext<'a>| {
                let once = ctx.in_v_once()
                    || condition.as_ref().is_some_and(is_constant_expression);
                let block = ctx.exit_block();
                let Some(parent) = ctx.parent_dynamic_mut() else {
                    return;
                };
                let Some(target) = last_if_mut(&mut parent.children).map(innermost_if) else {
                    return;
                };
                target.negative = Some(match condition {
                    None => NegativeBranch::Block(block),
                    Some(condition) => NegativeBranch::If(Box::new(IfIRNode {
                        id: target.id,
                        condition,
                        positive: block,
                        negative: None,
                        once,
                        parent: None,
                        anchor: None,
                    })),
                });
            })])
        }
    }
}

fn enter_branch<'a>(ctx: &mut TransformContext<'a>, el: &'a ElementNode<'a>) {
    if el.tag_type != ElementType::Template {
        ctx.replace_node(NodeRef::Wrapped(el));
    }
    ctx.enter_block(BlockIRNode::new(el.loc.clone()), false);
    ctx.reference();
}

/// The previous sibling is a `v-if`/`v-else-if` whose chain is still open.
fn has_adjacent_if(ctx: &mut TransformContext<'_>) -> bool {
    let index = ctx.index();
    let sibling = index
        .checked_sub(1)
        .and_then(|prev| ctx.parent_node().and_then(|parent| parent.children().get(prev)));
    let Some(NodeRef::Element(sibling)) = sibling else {
        return false;
    };
    if !has_directive(sibling, &["if", "else-if"]) {
        return false;
    }
    ctx.parent_dynamic_mut()
        .and_then(|parent| last_if_mut(&mut parent.children))
        .map(innermost_if)
        .is_some_and(|target| target.negative.is_none())
}

fn last_if_mut(children: &mut [IRDynamicInfo]) -> Option<&mut IfIRNode> {
    children
        .iter_mut()
        .rev()
        .find_map(|child| child.operation.as_deref_mut())
        .and_then(|operation| match operation {
            OperationNode::If(if_op) => Some(&mut **if_op),
            _ => None,
        })
}

fn innermost_if(node: &mut IfIRNode) -> &mut IfIRNode {
    match node.negative {
        Some(NegativeBranch::If(ref mut nested)) => innermost_if(nested),
        _ => node,
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::{NegativeBranch, OperationNode, RootIRNode};
    use crate::options::{CompilerOptions, ErrorMode};
    use crate::transform::transform;
    use vize_relief::{parse, Bump, CompilerError, ErrorCode};

    fn run(source: &str) -> (RootIRNode, Vec<CompilerError>) {
        let bump = Bump::new();
        let (root, _) = parse(&bump, source);
        let root = bump.alloc(root);
        let options = CompilerOptions {
            error_mode: ErrorMode::Collect,
            ..Default::default()
        };
        transform(root, options)
    }

    #[test]
    fn test_if_else_if_else_chain() {
        let (ir, errors) = run("<><a v-if={x} /><b v-else-if={y} /><i v-else /></>");
        assert!(errors.is_empty());
        assert_eq!(ir.block.returns.len(), 1);
        let Some(OperationNode::If(if_op)) = ir.block.dynamic.children[0].operation.as_deref()
        else {
            panic!("expected an if operation");
        };
        let Some(NegativeBranch::If(else_if)) = &if_op.negative else {
            panic!("expected an else-if branch");
        };
        assert_eq!(else_if.condition.content.as_str(), "y");
        assert!(matches!(else_if.negative, Some(NegativeBranch::Block(_))));
    }

    #[test]
    fn test_constant_condition_renders_once() {
        let (ir, _) = run("<div v-if={true}></div>");
        let Some(OperationNode::If(if_op)) = ir.block.dynamic.children[0].operation.as_deref()
        else {
            panic!("expected an if operation");
        };
        assert!(if_op.once);
    }

    #[test]
    fn test_else_without_if() {
        let (ir, errors) = run("<><a /><b v-else /></>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::VElseNoAdjacentIf);
        assert_eq!(ir.block.returns.len(), 2);
    }

    #[test]
    fn test_else_if_after_else() {
        let (_, errors) = run("<><a v-if={x} /><b v-else /><i v-else-if={y} /></>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::VElseNoAdjacentIf);
    }

    #[test]
    fn test_missing_condition() {
        let (_, errors) = run("<div v-if></div>");
        assert_eq!(errors[0].code, ErrorCode::VIfNoExpression);
    }
}
