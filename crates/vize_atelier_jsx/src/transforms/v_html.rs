//! `v-html`

use vize_relief::{ElementNode, ErrorCode, SimpleExpressionNode};

use crate::directive::DirectiveNode;
use crate::ir::{OperationNode, SetHtmlIRNode};
use crate::transform::{DirectiveTransformResult, TransformContext};

pub fn transform_v_html<'a>(
    dir: &DirectiveNode,
    el: &'a ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> Option<DirectiveTransformResult> {
    let value = dir.exp.clone().unwrap_or_else(|| {
        ctx.on_error(ErrorCode::VHtmlNoExpression, Some(dir.loc.clone()));
        SimpleExpressionNode::new("", true, dir.loc.clone())
    });
    if !el.children.is_empty() {
        ctx.on_error(ErrorCode::VHtmlWithChildren, Some(dir.loc.clone()));
        ctx.children_template_mut().clear();
    }

    let element = ctx.reference();
    ctx.register_effect(
        vec![value.clone()],
        OperationNode::SetHtml(SetHtmlIRNode { element, value }),
        None,
        None,
    );
    None
}
