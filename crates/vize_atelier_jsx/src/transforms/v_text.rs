//! `v-text`

use vize_carton::{escape_html, is_void_tag};
use vize_relief::{ElementNode, ElementType, ErrorCode, SimpleExpressionNode};

use crate::directive::DirectiveNode;
use crate::expression::literal_value;
use crate::ir::{GetTextChildIRNode, OperationNode, SetTextIRNode};
use crate::transform::{DirectiveTransformResult, TransformContext};

pub fn transform_v_text<'a>(
    dir: &DirectiveNode,
    el: &'a ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> Option<DirectiveTransformResult> {
    let value = dir.exp.clone().unwrap_or_else(|| {
        ctx.on_error(ErrorCode::VTextNoExpression, Some(dir.loc.clone()));
        SimpleExpressionNode::new("", true, dir.loc.clone())
    });
    if !el.children.is_empty() {
        ctx.on_error(ErrorCode::VTextWithChildren, Some(dir.loc.clone()));
        ctx.children_template_mut().clear();
    }
    if is_void_tag(&el.tag) {
        return None;
    }

    if let Some(literal) = literal_value(&value) {
        *ctx.children_template_mut() = vec![escape_html(&literal).to_string()];
        return None;
    }

    *ctx.children_template_mut() = vec![String::from(" ")];
    let element = ctx.reference();
    if el.tag_type != ElementType::Component {
        ctx.register_operation(
            OperationNode::GetTextChild(GetTextChildIRNode { parent: element }),
            None,
        );
    }
    ctx.register_effect(
        vec![value.clone()],
        OperationNode::SetText(SetTextIRNode {
            element,
            values: vec![value],
            generated: true,
        }),
        None,
        None,
    );
    None
}
