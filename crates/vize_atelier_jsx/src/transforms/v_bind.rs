//! Attribute bindings (`title={x}`, `title_camel`, `innerHTML_prop`).

use vize_carton::camelize;
use vize_relief::{ElementNode, ElementType, SimpleExpressionNode};

use crate::directive::{is_reserved_prop, DirectiveNode};
use crate::expression::literal_value;
use crate::ir::PropModifier;
use crate::transform::{DirectiveTransformResult, TransformContext};

pub fn transform_v_bind<'a>(
    dir: &DirectiveNode,
    el: &'a ElementNode<'a>,
    _ctx: &mut TransformContext<'a>,
) -> Option<DirectiveTransformResult> {
    let mut key = dir.arg.clone()?;
    if key.is_static && is_reserved_prop(&key.content) {
        return None;
    }

    let value = match &dir.exp {
        Some(exp) if exp.is_static => exp.clone(),
        Some(exp) => match literal_value(exp) {
            Some(literal) => SimpleExpressionNode::new(literal, true, exp.loc.clone()),
            None => exp.clone(),
        },
        // Boolean attribute: present means true
        None if el.tag_type == ElementType::Component => {
            SimpleExpressionNode::new("true", false, dir.loc.clone())
        }
        None => SimpleExpressionNode::new("", true, dir.loc.clone()),
    };

    let mut runtime_camelize = false;
    if dir.has_modifier("camel") {
        if key.is_static {
            key.content = camelize(&key.content);
        } else {
            runtime_camelize = true;
        }
    }

    let modifier = if dir.has_modifier("prop") {
        Some(PropModifier::Prop)
    } else if dir.has_modifier("attr") {
        Some(PropModifier::Attr)
    } else {
        None
    };

    let mut result = DirectiveTransformResult::new(key, value);
    result.modifier = modifier;
    result.runtime_camelize = runtime_camelize;
    Some(result)
}
