//! `ref` attribute: template refs.

use vize_relief::SimpleExpressionNode;

use crate::expression::is_constant_expression;
use crate::ir::{DeclareOldRefIRNode, OperationNode, SetTemplateRefIRNode};
use crate::transform::{ExitFn, NodeRef, TransformContext};

pub fn transform_template_ref<'a>(ctx: &mut TransformContext<'a>) -> Option<Vec<ExitFn<'a>>> {
    let Some(NodeRef::Element(el)) = ctx.node() else {
        return None;
    };
    let value: SimpleExpressionNode = el
        .find_attribute("ref")?
        .value
        .clone()
        .filter(|value| value.is_static || !value.is_empty())?;
    ctx.ir.has_template_ref = true;

    Some(vec![Box::new(move |ctx: &mut TransformContext<'a>| {
        let id = ctx.reference();
        let effect = !is_constant_expression(&value);
        if effect {
            ctx.register_operation(OperationNode::DeclareOldRef(DeclareOldRefIRNode { id }), None);
        }
        let ref_for = ctx.in_v_for > 0;
        ctx.register_effect(
            vec![value.clone()],
            OperationNode::SetTemplateRef(SetTemplateRefIRNode {
                element: id,
                value,
                ref_for,
                effect,
            }),
            None,
            None,
        );
    })])
}
