//! Elements and components.
//!
//! Native elements contribute markup to the template; props that cannot be
//! written into it become `SetProp`/`SetDynamicProps` operations. Components
//! become `CreateComponent` operations carrying their props and slots.

use std::mem;

use vize_carton::{
    camelize, capitalize, escape_html_attr, is_valid_html_nesting, is_void_tag, String,
};
use vize_relief::{ElementNode, ElementType, ErrorCode, PropNode, SimpleExpressionNode};

use crate::directive::{is_builtin_directive, resolve_directive, DirectiveNode};
use crate::ir::{
    CreateComponentIRNode, DirectiveIRNode, DynamicFlag, IRProp, IRPropsEntry, OperationNode,
    SetDynamicEventsIRNode, SetDynamicPropsIRNode, SetPropIRNode,
};
use crate::transform::{DirectiveTransformResult, ExitFn, NodeRef, TransformContext};

/// Props of one element.
#[derive(Debug)]
pub enum PropsResult {
    /// Every key is known at compile time
    Static(Vec<IRProp>),
    /// Spreads or dynamic keys; entries merge in order at runtime
    Dynamic(Vec<IRPropsEntry>, Vec<SimpleExpressionNode>),
}

pub fn transform_element<'a>(ctx: &mut TransformContext<'a>) -> Option<Vec<ExitFn<'a>>> {
    let mut effect_index = ctx.block.effect.len();
    let mut operation_index = ctx.block.operation.len();

    Some(vec![Box::new(move |ctx: &mut TransformContext<'a>| {
        let Some(NodeRef::Element(el)) = ctx.node() else {
            return;
        };
        if !matches!(el.tag_type, ElementType::Element | ElementType::Component) {
            return;
        }
        let props = build_props(el, ctx, &mut effect_index, &mut operation_index);
        let single_root = ctx.is_single_root();
        if el.tag_type == ElementType::Component {
            transform_component_element(el, props, single_root, ctx);
        } else {
            transform_native_element(
                el,
                props,
                single_root,
                ctx,
                &mut effect_index,
                &mut operation_index,
            );
        }
    })])
}

fn transform_native_element<'a>(
    el: &'a ElementNode<'a>,
    props: PropsResult,
    single_root: bool,
    ctx: &mut TransformContext<'a>,
    effect_index: &mut usize,
    operation_index: &mut usize,
) {
    let tag = el.tag.as_str();
    let mut template = std::string::String::with_capacity(tag.len() * 2 + 5);
    template.push('<');
    template.push_str(tag);

    match props {
        PropsResult::Dynamic(entries, expressions) => {
            let element = ctx.reference();
            ctx.register_effect(
                expressions,
                OperationNode::SetDynamicProps(SetDynamicPropsIRNode {
                    element,
                    props: entries,
                    tag: el.tag.clone(),
                }),
                Some(effect_index),
                Some(operation_index),
            );
        }
        PropsResult::Static(props) => {
            let mut dynamic_keys: Vec<String> = Vec::new();
            for prop in props {
                let is_folded = prop.key.is_static
                    && prop.modifier.is_none()
                    && prop.values.len() == 1
                    && prop.values[0].is_static
                    && !dynamic_keys.contains(&prop.key.content);
                if is_folded {
                    template.push(' ');
                    template.push_str(&prop.key.content);
                    if !prop.values[0].content.is_empty() {
                        template.push_str("=\"");
                        template.push_str(&escape_html_attr(&prop.values[0].content));
                        template.push('"');
                    }
                    continue;
                }
                dynamic_keys.push(prop.key.content.clone());
                let element = ctx.reference();
                ctx.register_effect(
                    prop.values.clone(),
                    OperationNode::SetProp(SetPropIRNode {
                        element,
                        prop,
                        tag: el.tag.clone(),
                    }),
                    Some(effect_index),
                    Some(operation_index),
                );
            }
        }
    }

    template.push('>');
    for child in mem::take(ctx.children_template_mut()) {
        template.push_str(&child);
    }
    if !is_void_tag(tag) {
        template.push_str("</");
        template.push_str(tag);
        template.push('>');
    }

    if single_root {
        ctx.mark_root_template();
    }

    let invalid_nesting = matches!(
        ctx.parent_node(),
        Some(NodeRef::Element(parent))
            if parent.tag_type == ElementType::Element && !is_valid_html_nesting(&parent.tag, tag)
    );
    if invalid_nesting {
        ctx.reference();
        let index = (!ctx.is_discarding()).then(|| ctx.push_template(template));
        let dynamic = ctx.dynamic_mut();
        dynamic.template = index;
        dynamic.flags |= DynamicFlag::INSERT | DynamicFlag::NON_TEMPLATE;
    } else {
        ctx.template_mut().push_str(&template);
    }
}

fn transform_component_element<'a>(
    el: &'a ElementNode<'a>,
    props: PropsResult,
    single_root: bool,
    ctx: &mut TransformContext<'a>,
) {
    let props = match props {
        PropsResult::Static(props) => vec![IRPropsEntry::Static(props)],
        PropsResult::Dynamic(entries, _) => entries,
    };
    let dynamic = if el.tag == "component" {
        el.find_attribute("is").and_then(|attr| attr.value.clone())
    } else {
        None
    };
    if dynamic.is_none() {
        ctx.add_component(&el.tag);
    }

    ctx.dynamic_mut().flags |= DynamicFlag::NON_TEMPLATE | DynamicFlag::INSERT;
    let id = ctx.reference();
    let slots = mem::take(ctx.slots_mut());
    let operation = CreateComponentIRNode {
        id,
        tag: el.tag.clone(),
        props,
        slots,
        root: single_root && ctx.in_v_for == 0,
        once: ctx.in_v_once(),
        dynamic,
        parent: None,
        anchor: None,
    };
    ctx.dynamic_mut().operation = Some(Box::new(OperationNode::CreateComponent(Box::new(
        operation,
    ))));
}

/// Resolve every attribute of the element into props.
pub fn build_props<'a>(
    el: &'a ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
    effect_index: &mut usize,
    operation_index: &mut usize,
) -> PropsResult {
    let is_component = el.tag_type == ElementType::Component;
    let is_dynamic_component = el.tag == "component";

    let mut entries: Vec<IRPropsEntry> = Vec::new();
    let mut expressions: Vec<SimpleExpressionNode> = Vec::new();
    let mut results: Vec<IRProp> = Vec::new();

    let flush = |results: &mut Vec<IRProp>, entries: &mut Vec<IRPropsEntry>| {
        if !results.is_empty() {
            entries.push(IRPropsEntry::Static(dedupe_properties(mem::take(results))));
        }
    };

    for prop in el.props.iter() {
        let attr = match prop {
            PropNode::Spread(spread) => {
                expressions.push(spread.exp.clone());
                flush(&mut results, &mut entries);
                entries.push(IRPropsEntry::Dynamic {
                    value: spread.exp.clone(),
                    handler: false,
                });
                continue;
            }
            PropNode::Attribute(attr) => attr,
        };
        let dir = resolve_directive(attr, is_component);

        if dir.arg.is_none() && matches!(dir.name.as_str(), "bind" | "on") {
            let Some(exp) = dir.exp.clone() else {
                let code = if dir.name == "bind" {
                    ErrorCode::VBindNoExpression
                } else {
                    ErrorCode::VOnNoExpression
                };
                ctx.on_error(code, Some(dir.loc.clone()));
                continue;
            };
            if dir.name == "bind" || is_component {
                expressions.push(exp.clone());
                flush(&mut results, &mut entries);
                entries.push(IRPropsEntry::Dynamic {
                    value: exp,
                    handler: dir.name == "on",
                });
            } else {
                let element = ctx.reference();
                ctx.register_effect(
                    vec![exp.clone()],
                    OperationNode::SetDynamicEvents(SetDynamicEventsIRNode { element, value: exp }),
                    Some(effect_index),
                    Some(operation_index),
                );
            }
            continue;
        }

        if is_dynamic_component && dir.name == "bind" && dir.static_arg() == Some("is") {
            continue;
        }

        let Some(result) = transform_prop(&dir, el, ctx) else {
            continue;
        };
        expressions.push(result.key.clone());
        expressions.push(result.value.clone());
        if is_component && !result.key.is_static {
            flush(&mut results, &mut entries);
            entries.push(IRPropsEntry::Attribute(result.into_prop()));
        } else {
            results.push(result.into_prop());
        }
    }

    if !entries.is_empty() || results.iter().any(|prop| !prop.key.is_static) {
        flush(&mut results, &mut entries);
        return PropsResult::Dynamic(entries, expressions);
    }
    PropsResult::Static(dedupe_properties(results))
}

/// Run the directive transform for one attribute; unknown directives
/// become runtime directive operations.
fn transform_prop<'a>(
    dir: &DirectiveNode,
    el: &'a ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> Option<DirectiveTransformResult> {
    if let Some(directive_transform) = ctx.directive_transform(&dir.name) {
        return directive_transform(dir, el, ctx);
    }
    if !is_builtin_directive(&dir.name) {
        let mut name = String::const_new("v");
        name.push_str(&capitalize(&camelize(&dir.name)));
        ctx.add_directive(&name);
        let element = ctx.reference();
        ctx.register_operation(
            OperationNode::Directive(DirectiveIRNode {
                element,
                dir: dir.clone(),
                name,
                builtin: false,
                model_type: None,
            }),
            None,
        );
    }
    None
}

/// Keep the first of each static key; `class` and `style` values merge.
fn dedupe_properties(props: Vec<IRProp>) -> Vec<IRProp> {
    let mut deduped: Vec<IRProp> = Vec::with_capacity(props.len());
    for prop in props {
        if !prop.key.is_static {
            deduped.push(prop);
            continue;
        }
        let existing = deduped
            .iter_mut()
            .find(|known| known.key.is_static && known.key.content == prop.key.content);
        match existing {
            Some(existing) => {
                if matches!(prop.key.content.as_str(), "class" | "style") {
                    existing.values.extend(prop.values);
                }
            }
            None => deduped.push(prop),
        }
    }
    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::RootIRNode;
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
    fn test_static_attributes_in_template() {
        let ir = run(r#"<input type="text" disabled title={"a \"b\""} />"#);
        assert_eq!(ir.templates, vec![r#"<input type="text" disabled title="a &quot;b&quot;">"#]);
        assert!(ir.block.operation.is_empty());
        assert!(ir.block.effect.is_empty());
    }

    #[test]
    fn test_dynamic_prop_effect() {
        let ir = run("<div id={id} title=\"t\"></div>");
        assert_eq!(ir.templates, vec![r#"<div title="t"></div>"#]);
        assert_eq!(ir.block.effect.len(), 1);
        let OperationNode::SetProp(id) = &ir.block.effect[0].operations[0] else {
            panic!("expected set prop");
        };
        assert_eq!(id.prop.key.content.as_str(), "id");
        assert_eq!(id.prop.values[0].content.as_str(), "id");
    }

    #[test]
    fn test_dedupe_merges_class() {
        let prop = |key: &str, value: SimpleExpressionNode| IRProp {
            key: SimpleExpressionNode::static_str(key),
            values: vec![value],
            modifier: None,
            runtime_camelize: false,
            handler: false,
            handler_modifiers: None,
            model: false,
            model_modifiers: Vec::new(),
        };
        let deduped = dedupe_properties(vec![
            prop("class", SimpleExpressionNode::static_str("a")),
            prop("id", SimpleExpressionNode::dynamic("x")),
            prop("class", SimpleExpressionNode::dynamic("b")),
            prop("id", SimpleExpressionNode::dynamic("y")),
        ]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].values.len(), 2);
        assert_eq!(deduped[1].values[0].content.as_str(), "x");
    }

    #[test]
    fn test_spread_makes_props_dynamic() {
        let ir = run("<div {...attrs} id=\"x\"></div>");
        let OperationNode::SetDynamicProps(props) = &ir.block.effect[0].operations[0] else {
            panic!("expected dynamic props");
        };
        assert_eq!(props.props.len(), 2);
        assert!(matches!(props.props[0], IRPropsEntry::Dynamic { .. }));
        assert!(matches!(props.props[1], IRPropsEntry::Static(_)));
    }

    #[test]
    fn test_custom_directive() {
        let ir = run("<div v-focus_lazy={true}></div>");
        assert_eq!(ir.directive, vec!["vFocus"]);
        let OperationNode::Directive(dir) = &ir.block.operation[0] else {
            panic!("expected directive");
        };
        assert!(!dir.builtin);
        assert_eq!(dir.dir.modifiers, vec!["lazy"]);
    }

    #[test]
    fn test_invalid_nesting_is_inserted() {
        let ir = run("<p><div>x</div></p>");
        assert_eq!(ir.templates, vec!["<div>x</div>", "<p></p>"]);
        assert!(matches!(ir.block.operation[0], OperationNode::InsertNode(_)));
    }

    #[test]
    fn test_component() {
        let ir = run("<Comp msg=\"hi\" onClick={go} />");
        assert!(ir.templates.is_empty());
        assert_eq!(ir.component, vec!["Comp"]);
        let Some(OperationNode::CreateComponent(comp)) =
            ir.block.dynamic.children[0].operation.as_deref()
        else {
            panic!("expected component");
        };
        assert!(comp.root);
        let IRPropsEntry::Static(props) = &comp.props[0] else {
            panic!("expected static props");
        };
        assert_eq!(props.len(), 2);
        assert!(props[1].handler);
    }
}
