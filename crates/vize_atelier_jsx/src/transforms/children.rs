//! Child traversal and insertion planning.
//!
//! Children of fragment-like nodes (the root, components, templates and
//! implicit wrappers) become block roots. Children of native elements are
//! folded into the parent's markup; the ones that cannot be (blocks,
//! components, interpolations) are inserted at runtime, before a `<!>`
//! placeholder when static siblings precede them.

use std::mem;

use crate::ir::{DynamicFlag, InsertNodeIRNode, InsertionAnchor, OperationNode};
use crate::transform::{transform_node, ExitFn, NodeRef, TransformContext};

pub fn transform_children<'a>(ctx: &mut TransformContext<'a>) -> Option<Vec<ExitFn<'a>>> {
    let node = ctx.node()?;
    if matches!(node, NodeRef::Text(_) | NodeRef::Expression(_)) {
        return None;
    }
    let is_fragment = node.is_fragment();

    for (index, child) in node.children().iter().enumerate() {
        ctx.push_frame(child, index);
        transform_node(ctx);
        if ctx.is_aborted() {
            ctx.pop_frame();
            return None;
        }

        if is_fragment {
            ctx.reference();
            let template = ctx.register_template();
            if ctx.is_root_template() {
                if let Some(template) = template {
                    ctx.ir.root_template_indexes.push(template);
                }
            }
            let flags = ctx.dynamic().flags;
            if !flags.contains(DynamicFlag::NON_TEMPLATE) || flags.contains(DynamicFlag::INSERT) {
                if let Some(id) = ctx.dynamic().id {
                    ctx.block.returns.push(id);
                }
            }
        }

        let Some(frame) = ctx.pop_frame() else {
            return None;
        };
        if !is_fragment {
            ctx.children_template_mut().push(frame.template().to_owned());
        }
        let child_dynamic = frame.dynamic();
        if child_dynamic.has_dynamic_child
            || child_dynamic.id.is_some()
            || child_dynamic
                .flags
                .intersects(DynamicFlag::NON_TEMPLATE | DynamicFlag::INSERT)
        {
            ctx.dynamic_mut().has_dynamic_child = true;
        }
        ctx.dynamic_mut().children.push(frame.into_dynamic());
    }

    if !is_fragment {
        process_dynamic_children(ctx);
    }
    None
}

/// Group inserted children and decide where each group lands.
fn process_dynamic_children(ctx: &mut TransformContext<'_>) {
    let mut group: Vec<usize> = Vec::new();
    let mut has_static = false;

    for index in 0..ctx.dynamic().children.len() {
        let flags = ctx.dynamic().children[index].flags;
        if flags.contains(DynamicFlag::INSERT) {
            group.push(index);
        }
        if flags.contains(DynamicFlag::NON_TEMPLATE) {
            continue;
        }
        if !group.is_empty() {
            let group = mem::take(&mut group);
            if has_static {
                let first = group[0];
                if let Some(slot) = ctx.children_template_mut().get_mut(first) {
                    *slot = String::from("<!>");
                }
                let anchor = ctx.increase_id();
                let placeholder = &mut ctx.dynamic_mut().children[first];
                placeholder.flags.remove(DynamicFlag::NON_TEMPLATE);
                placeholder.anchor = Some(anchor);
                register_insertion(ctx, &group, Some(InsertionAnchor::Node(anchor)));
            } else {
                register_insertion(ctx, &group, Some(InsertionAnchor::Prepend));
            }
        }
        has_static = true;
    }

    if !group.is_empty() {
        register_insertion(ctx, &group, None);
    }
}

fn register_insertion(
    ctx: &mut TransformContext<'_>,
    group: &[usize],
    anchor: Option<InsertionAnchor>,
) {
    let parent = ctx.reference();
    let mut elements = Vec::new();
    for &index in group {
        let child = &mut ctx.dynamic_mut().children[index];
        if child.template.is_some() {
            elements.extend(child.id);
        } else if let Some(operation) = child.operation.as_deref_mut() {
            if operation.is_block_operation() {
                operation.set_insertion(parent, anchor);
            }
        }
    }
    if !elements.is_empty() {
        ctx.register_operation(
            OperationNode::InsertNode(InsertNodeIRNode {
                elements,
                parent,
                anchor,
            }),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::{DynamicFlag, InsertionAnchor, OperationNode};
    use crate::options::{CompilerOptions, ErrorMode};
    use crate::transform::transform;
    use vize_relief::{parse, Bump};

    fn with_ir(source: &str, f: impl FnOnce(&crate::ir::RootIRNode)) {
        let bump = Bump::new();
        let (root, _) = parse(&bump, source);
        let root = bump.alloc(root);
        let options = CompilerOptions {
            error_mode: ErrorMode::Collect,
            ..Default::default()
        };
        let (ir, _) = transform(root, options);
        f(&ir);
    }

    #[test]
    fn test_component_between_static_children_gets_placeholder() {
        with_ir("<div><span /><Comp /><b /></div>", |ir| {
            assert_eq!(ir.templates[0], "<div><span></span><!><b></b></div>");
            let children = &ir.block.dynamic.children[0].children;
            assert!(children[1].anchor.is_some());
            assert!(!children[1].flags.contains(DynamicFlag::NON_TEMPLATE));
            let Some(OperationNode::CreateComponent(comp)) = children[1].operation.as_deref()
            else {
                panic!("expected a component");
            };
            assert_eq!(comp.parent, ir.block.dynamic.children[0].id);
            assert!(matches!(comp.anchor, Some(InsertionAnchor::Node(_))));
        });
    }

    #[test]
    fn test_leading_component_is_prepended() {
        with_ir("<div><Comp /><b /></div>", |ir| {
            let children = &ir.block.dynamic.children[0].children;
            let Some(OperationNode::CreateComponent(comp)) = children[0].operation.as_deref()
            else {
                panic!("expected a component");
            };
            assert_eq!(comp.anchor, Some(InsertionAnchor::Prepend));
        });
    }

    #[test]
    fn test_trailing_component_is_appended() {
        with_ir("<div><b /><Comp /></div>", |ir| {
            let children = &ir.block.dynamic.children[0].children;
            let Some(OperationNode::CreateComponent(comp)) = children[1].operation.as_deref()
            else {
                panic!("expected a component");
            };
            assert_eq!(comp.parent, ir.block.dynamic.children[0].id);
            assert_eq!(comp.anchor, None);
        });
    }
}
