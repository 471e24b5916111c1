//! Component slots: children, `v-slot`, `<template v-slot>` and `v-slots`.

use std::mem;

use vize_carton::String;
use vize_relief::{ElementNode, ElementType, ErrorCode, SimpleExpressionNode, SourceLocation};

use crate::directive::DirectiveNode;
use crate::expression::{destructure_bindings, parse_for_expression, ForParseResult};
use crate::ir::{BlockIRNode, DynamicFlag, IRSlotDynamic, IRSlots, SlotBlockIRNode};
use crate::transform::{ExitFn, NodeRef, TransformContext};

use super::v_for::scope_vars;
use super::{find_directive, has_directive};

pub fn transform_v_slot<'a>(ctx: &mut TransformContext<'a>) -> Option<Vec<ExitFn<'a>>> {
    let Some(NodeRef::Element(el)) = ctx.node() else {
        return None;
    };
    let dir = find_directive(el, "slot");

    if el.tag_type == ElementType::Component {
        if let Some(exp) = find_directive(el, "slots").and_then(|slots| slots.exp) {
            ctx.slots_mut().push(IRSlots::Expression(exp));
        }
        if el.children.is_empty() {
            return None;
        }
        return Some(transform_component_slot(el, dir, ctx));
    }

    let in_component = matches!(
        ctx.parent_node(),
        Some(NodeRef::Element(parent)) if parent.tag_type == ElementType::Component
    );
    match dir {
        Some(dir) if el.tag_type == ElementType::Template && in_component => {
            Some(transform_template_slot(el, dir, ctx))
        }
        Some(dir) => {
            ctx.on_error(ErrorCode::VSlotMisplaced, Some(dir.loc));
            None
        }
        None => None,
    }
}

/// Slot props pattern names, in scope inside the slot body.
fn slot_scope(props: Option<&SimpleExpressionNode>) -> Vec<String> {
    props
        .map(|props| {
            destructure_bindings(&props.content)
                .into_iter()
                .map(|binding| String::from(binding.name))
                .collect()
        })
        .unwrap_or_default()
}

/// Children of a component form its default slot, unless they are all
/// `<template v-slot>` elements.
fn transform_component_slot<'a>(
    el: &'a ElementNode<'a>,
    dir: Option<DirectiveNode>,
    ctx: &mut TransformContext<'a>,
) -> Vec<ExitFn<'a>> {
    let first_non_slot_child = el
        .children
        .iter()
        .map(NodeRef::from_child)
        .find(|child| !child.element().is_some_and(|child| has_directive(child, &["slot"])))
        .map(|child| child.loc().clone());

    // Non-slot children are dropped when they clash with the other slots.
    let drops_children = first_non_slot_child.is_some()
        && el
            .children
            .iter()
            .filter_map(|child| NodeRef::from_child(child).element())
            .filter(|child| child.tag_type == ElementType::Template)
            .any(|child| match find_directive(child, "slot") {
                Some(_) if dir.is_some() => true,
                Some(slot) => {
                    !has_directive(child, &["if", "else-if", "else", "for"])
                        && is_default_slot(slot.arg.as_ref())
                }
                None => false,
            });

    let props = dir.as_ref().and_then(|dir| dir.exp.clone());
    let scope_len = ctx.push_scope_vars(slot_scope(props.as_ref()));
    ctx.enter_block(BlockIRNode::new(el.loc.clone()), false);
    if drops_children {
        ctx.discard_templates();
    }

    vec![Box::new(move |ctx: &mut TransformContext<'a>| {
        let mut slots = mem::take(ctx.slots_mut());
        let block = ctx.exit_block();
        ctx.pop_scope_vars(scope_len);

        let has_other_slots = !slots.is_empty();
        if let Some(dir) = &dir {
            if has_other_slots {
                ctx.on_error(ErrorCode::VSlotMixedSlotUsage, Some(dir.loc.clone()));
                return;
            }
        }

        if let Some(loc) = first_non_slot_child {
            if has_static_slot(&slots, "default") {
                ctx.on_error(ErrorCode::VSlotExtraneousDefaultSlotChildren, Some(loc));
            } else {
                let name = dir.as_ref().and_then(|dir| dir.arg.clone());
                register_slot(&mut slots, name, SlotBlockIRNode { block, props });
            }
        }
        ctx.slots_mut().extend(slots);
    })]
}

/// `<template v-slot:name>` inside a component.
fn transform_template_slot<'a>(
    el: &'a ElementNode<'a>,
    dir: DirectiveNode,
    ctx: &mut TransformContext<'a>,
) -> Vec<ExitFn<'a>> {
    ctx.dynamic_mut().flags |= DynamicFlag::NON_TEMPLATE;

    let v_for = find_directive(el, "for");
    let v_if = find_directive(el, "if");
    let v_else = find_directive(el, "else-if").or_else(|| find_directive(el, "else"));

    let mut scope = slot_scope(dir.exp.as_ref());
    let for_parse = match &v_for {
        Some(v_for) => match v_for.exp.as_ref() {
            None => {
                ctx.on_error(ErrorCode::VForNoExpression, Some(v_for.loc.clone()));
                None
            }
            Some(exp) => {
                let parsed = parse_for_expression(exp);
                if parsed.is_none() {
                    ctx.on_error(ErrorCode::VForMalformedExpression, Some(v_for.loc.clone()));
                }
                parsed
            }
        },
        None => None,
    };
    if let Some(parsed) = &for_parse {
        scope.extend(scope_vars(parsed));
    }
    let scope_len = ctx.push_scope_vars(scope);
    ctx.enter_block(BlockIRNode::new(el.loc.clone()), false);

    vec![Box::new(move |ctx: &mut TransformContext<'a>| {
        let block = ctx.exit_block();
        ctx.pop_scope_vars(scope_len);

        let slot = SlotBlockIRNode {
            block,
            props: dir.exp.clone(),
        };
        let name = dir.arg.clone();
        let result = match ctx.parent_slots_mut() {
            Some(slots) => register_template_slot(slots, name, slot, v_if, v_else, v_for, for_parse),
            None => Ok(()),
        };
        if let Err((code, loc)) = result {
            ctx.on_error(code, Some(loc.unwrap_or_else(|| dir.loc.clone())));
        }
    })]
}

type SlotError = (ErrorCode, Option<SourceLocation>);

fn register_template_slot(
    slots: &mut Vec<IRSlots>,
    name: Option<SimpleExpressionNode>,
    slot: SlotBlockIRNode,
    v_if: Option<DirectiveNode>,
    v_else: Option<DirectiveNode>,
    v_for: Option<DirectiveNode>,
    for_parse: Option<ForParseResult>,
) -> Result<(), SlotError> {
    let dynamic_name = || {
        name.clone()
            .unwrap_or_else(|| SimpleExpressionNode::static_str("default"))
    };

    if let Some(v_if) = v_if {
        let condition = v_if
            .exp
            .unwrap_or_else(|| SimpleExpressionNode::new("true", false, v_if.loc.clone()));
        slots.push(IRSlots::Dynamic(IRSlotDynamic::Conditional {
            condition,
            positive: Box::new(IRSlotDynamic::Basic {
                name: dynamic_name(),
                block: slot,
            }),
            negative: None,
        }));
        return Ok(());
    }

    if let Some(v_else) = v_else {
        let Some(IRSlots::Dynamic(last @ IRSlotDynamic::Conditional { .. })) = slots.last_mut()
        else {
            return Err((ErrorCode::VElseNoAdjacentIf, Some(v_else.loc)));
        };
        let basic = IRSlotDynamic::Basic {
            name: dynamic_name(),
            block: slot,
        };
        let negative = match v_else.exp {
            Some(condition) if v_else.name == "else-if" => IRSlotDynamic::Conditional {
                condition,
                positive: Box::new(basic),
                negative: None,
            },
            _ => basic,
        };
        if let IRSlotDynamic::Conditional { negative: target, .. } = innermost_conditional(last) {
            *target = Some(Box::new(negative));
        }
        return Ok(());
    }

    if v_for.is_some() {
        if let Some(for_parse) = for_parse {
            slots.push(IRSlots::Dynamic(IRSlotDynamic::Loop {
                name: dynamic_name(),
                block: slot,
                for_parse,
            }));
        }
        return Ok(());
    }

    let static_name = match &name {
        None => Some("default"),
        Some(name) if name.is_static => Some(name.content.as_str()),
        Some(_) => None,
    };
    if let Some(static_name) = static_name {
        if has_static_slot(slots, static_name) {
            return Err((ErrorCode::VSlotDuplicateSlotNames, None));
        }
    }
    register_slot(slots, name, slot);
    Ok(())
}

fn innermost_conditional(node: &mut IRSlotDynamic) -> &mut IRSlotDynamic {
    let descend = matches!(
        node,
        IRSlotDynamic::Conditional { negative: Some(negative), .. }
            if matches!(**negative, IRSlotDynamic::Conditional { .. })
    );
    if !descend {
        return node;
    }
    match node {
        IRSlotDynamic::Conditional {
            negative: Some(negative),
            ..
        } => innermost_conditional(negative),
        other => other,
    }
}

fn is_default_slot(name: Option<&SimpleExpressionNode>) -> bool {
    match name {
        None => true,
        Some(name) => name.is_static && name.content == "default",
    }
}

fn has_static_slot(slots: &[IRSlots], name: &str) -> bool {
    slots.iter().any(|slot| match slot {
        IRSlots::Static(named) => named.iter().any(|(slot_name, _)| slot_name == name),
        _ => false,
    })
}

fn register_slot(slots: &mut Vec<IRSlots>, name: Option<SimpleExpressionNode>, block: SlotBlockIRNode) {
    match name {
        Some(name) if !name.is_static => {
            slots.push(IRSlots::Dynamic(IRSlotDynamic::Basic { name, block }));
        }
        name => {
            let name = name.map_or(String::const_new("default"), |name| name.content);
            if let Some(IRSlots::Static(named)) = slots.last_mut() {
                named.push((name, block));
            } else {
                slots.push(IRSlots::Static(vec![(name, block)]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::{IRSlotDynamic, IRSlots, OperationNode, RootIRNode};
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

    fn slots(ir: &RootIRNode) -> &[IRSlots] {
        match ir.block.dynamic.children[0].operation.as_deref() {
            Some(OperationNode::CreateComponent(comp)) => &comp.slots,
            _ => panic!("expected component"),
        }
    }

    #[test]
    fn test_default_slot_from_children() {
        let (ir, errors) = run("<Comp><span>hi</span></Comp>");
        assert!(errors.is_empty());
        let [IRSlots::Static(named)] = slots(&ir) else {
            panic!("expected static slots");
        };
        assert_eq!(named[0].0.as_str(), "default");
        assert_eq!(named[0].1.block.returns.len(), 1);
    }

    #[test]
    fn test_named_template_slots() {
        let (ir, errors) = run(
            "<Comp><template v-slot:header={{ title }}>{title}</template><template v-slot:footer>f</template></Comp>",
        );
        assert!(errors.is_empty());
        let [IRSlots::Static(named)] = slots(&ir) else {
            panic!("expected static slots");
        };
        let names: Vec<&str> = named.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["header", "footer"]);
        assert!(named[0].1.props.is_some());
    }

    #[test]
    fn test_conditional_slot() {
        let (ir, errors) = run(
            "<Comp><template v-slot:a v-if={ok}>a</template><template v-slot:b v-else>b</template></Comp>",
        );
        assert!(errors.is_empty());
        let [IRSlots::Dynamic(IRSlotDynamic::Conditional { negative, .. })] = slots(&ir) else {
            panic!("expected a conditional slot");
        };
        assert!(matches!(negative.as_deref(), Some(IRSlotDynamic::Basic { .. })));
    }

    #[test]
    fn test_mixed_slot_usage() {
        let (_, errors) = run("<Comp v-slot={p}><template v-slot:a>a</template></Comp>");
        assert_eq!(errors[0].code, ErrorCode::VSlotMixedSlotUsage);
    }

    #[test]
    fn test_duplicate_slot_names() {
        let (_, errors) =
            run("<Comp><template v-slot:a>1</template><template v-slot:a>2</template></Comp>");
        assert_eq!(errors[0].code, ErrorCode::VSlotDuplicateSlotNames);
    }

    #[test]
    fn test_extraneous_default_children() {
        let (_, errors) = run("<Comp><template v-slot:default>1</template><b /></Comp>");
        assert_eq!(errors[0].code, ErrorCode::VSlotExtraneousDefaultSlotChildren);
    }

    #[test]
    fn test_misplaced_slot() {
        let (_, errors) = run("<div v-slot={p}></div>");
        assert_eq!(errors[0].code, ErrorCode::VSlotMisplaced);
    }

    #[test]
    fn test_slots_object() {
        let (ir, _) = run("<Comp v-slots={slots} />");
        assert!(matches!(slots(&ir), [IRSlots::Expression(_)]));
    }
}
