//! `v-show`

use vize_carton::String;
use vize_relief::{ElementNode, ErrorCode};

use crate::directive::DirectiveNode;
use crate::ir::{DirectiveIRNode, OperationNode};
use crate::transform::{DirectiveTransformResult, TransformContext};

pub fn transform_v_show<'a>(
    dir: &DirectiveNode,
    _el: &'a ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> Option<DirectiveTransformResult> {
    if dir.exp.is_none() {
        ctx.on_error(ErrorCode::VShowNoExpression, Some(dir.loc.clone()));
        return None;
    }
    let element = ctx.reference();
    ctx.register_operation(
        OperationNode::Directive(DirectiveIRNode {
            element,
            dir: dir.clone(),
            name: String::const_new("show"),
            builtin: true,
            model_type: None,
        }),
        None,
    );
    None
}
