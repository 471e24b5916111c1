//! `v-for`: keyed list rendering.

use vize_carton::String;
use vize_relief::{ElementNode, ElementType, ErrorCode, TemplateChildNode};

use crate::expression::{
    destructure_bindings, is_constant_expression, parse_for_expression, ForParseResult,
};
use crate::ir::{BlockIRNode, DynamicFlag, ForIRNode, OperationNode};
use crate::transform::{ExitFn, NodeRef, TransformContext};

use super::{find_directive, is_template_slot};

pub fn transform_v_for<'a>(ctx: &mut TransformContext<'a>) -> Option<Vec<ExitFn<'a>>> {
    let Some(NodeRef::Element(el)) = ctx.node() else {
        return None;
    };
    let dir = find_directive(el, "for")?;
    if is_template_slot(el) {
        return None;
    }
    if !ctx.mark_seen(NodeRef::Element(el), "for") {
        return None;
    }

    let Some(exp) = dir.exp.as_ref() else {
        ctx.on_error(ErrorCode::VForNoExpression, Some(dir.loc.clone()));
        return None;
    };
    let Some(parse_result) = parse_for_expression(exp) else {
        ctx.on_error(ErrorCode::VForMalformedExpression, Some(dir.loc.clone()));
        return None;
    };

    let key_prop = el.find_attribute("key").and_then(|attr| attr.value.clone());
    let component = el.tag_type == ElementType::Component || is_template_with_single_component(el);

    ctx.replace_node(NodeRef::Wrapped(el));
    ctx.dynamic_mut().flags |= DynamicFlag::NON_TEMPLATE | DynamicFlag::INSERT;
    let id = ctx.reference();
    ctx.enter_block(BlockIRNode::new(el.loc.clone()), true);
    ctx.reference();

    let scope = scope_vars(&parse_result);
    let scope_len = ctx.push_scope_vars(scope);

    Some(vec![Box::new(move |ctx: &mut TransformContext<'a>| {
        let render = ctx.exit_block();
        ctx.pop_scope_vars(scope_len);
        let only_child = matches!(
            ctx.parent_node(),
            Some(NodeRef::Element(parent))
                if parent.tag_type == ElementType::Element && parent.children.len() == 1
        );
        let once = ctx.in_v_once() || is_constant_expression(&parse_result.source);
        let operation = ForIRNode {
            id,
            source: parse_result.source,
            value: parse_result.value,
            key: parse_result.key,
            index: parse_result.index,
            key_prop,
            render,
            once,
            component,
            only_child,
            parent: None,
            anchor: None,
        };
        ctx.dynamic_mut().operation = Some(Box::new(OperationNode::For(Box::new(operation))));
    })])
}

pub(super) fn scope_vars(parse_result: &ForParseResult) -> Vec<String> {
    let mut names: Vec<String> = parse_result
        .value
        .as_ref()
        .map(|value| {
            destructure_bindings(&value.content)
                .into_iter()
                .map(|binding| String::from(binding.name))
                .collect()
        })
        .unwrap_or_default();
    names.extend(
        [&parse_result.key, &parse_result.index]
            .into_iter()
            .flatten()
            .map(|alias| String::from(alias.content.trim())),
    );
    names
}

fn is_template_with_single_component(el: &ElementNode<'_>) -> bool {
    if el.tag_type != ElementType::Template {
        return false;
    }
    match el.children.as_slice() {
        [TemplateChildNode::Element(child)] => child.tag_type == ElementType::Component,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::{DynamicFlag, OperationNode, RootIRNode};
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
    fn test_for_in_single_child_parent() {
        let (ir, errors) = run("<ul><li v-for={(item, i) in items} key={item.id}>{item.name}</li></ul>");
        assert!(errors.is_empty());
        assert_eq!(ir.templates, vec!["<li> </li>", "<ul></ul>"]);
        let list = &ir.block.dynamic.children[0].children[0];
        assert!(list.flags.contains(DynamicFlag::INSERT));
        let Some(OperationNode::For(for_op)) = list.operation.as_deref() else {
            panic!("expected a for operation");
        };
        assert!(for_op.only_child);
        assert!(!for_op.once);
        assert_eq!(for_op.source.content.as_str(), "items");
        assert_eq!(for_op.value.as_ref().map(|v| v.content.as_str()), Some("item"));
        assert_eq!(for_op.key.as_ref().map(|v| v.content.as_str()), Some("i"));
        assert_eq!(for_op.key_prop.as_ref().map(|v| v.content.as_str()), Some("item.id"));
    }

    #[test]
    fn test_for_errors() {
        let (_, errors) = run("<div v-for></div>");
        assert_eq!(errors[0].code, ErrorCode::VForNoExpression);
        let (_, errors) = run("<div v-for={items}></div>");
        assert_eq!(errors[0].code, ErrorCode::VForMalformedExpression);
    }

    #[test]
    fn test_v_model_on_loop_variable() {
        let (_, errors) = run("<input v-for={item in list} v-model={item} />");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::VModelOnScopeVariable);
    }
}
