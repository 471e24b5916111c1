//! `v-model` on form elements and components.

use vize_carton::{is_simple_identifier, String};
use vize_relief::{ElementNode, ElementType, ErrorCode, SimpleExpressionNode};

use crate::directive::DirectiveNode;
use crate::expression::is_member_expression;
use crate::ir::{DirectiveIRNode, ModelType, OperationNode};
use crate::transform::{DirectiveTransformResult, TransformContext};

pub fn transform_v_model<'a>(
    dir: &DirectiveNode,
    el: &'a ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> Option<DirectiveTransformResult> {
    let Some(exp) = dir.exp.as_ref() else {
        ctx.on_error(ErrorCode::VModelNoExpression, Some(dir.loc.clone()));
        return None;
    };
    let content = exp.content.trim();
    if exp.is_static || content.is_empty() || !is_member_expression(content) {
        ctx.on_error(ErrorCode::VModelMalformedExpression, Some(exp.loc.clone()));
        return None;
    }
    if is_simple_identifier(content) && ctx.is_scope_var(content) {
        ctx.on_error(ErrorCode::VModelOnScopeVariable, Some(exp.loc.clone()));
        return None;
    }

    if el.tag_type == ElementType::Component {
        let key = dir
            .arg
            .clone()
            .unwrap_or_else(|| SimpleExpressionNode::static_str("modelValue"));
        let mut result = DirectiveTransformResult::new(key, exp.clone());
        result.model = true;
        result.model_modifiers = dir.modifiers.clone();
        return Some(result);
    }

    if let Some(arg) = &dir.arg {
        ctx.on_error(ErrorCode::VModelArgOnElement, Some(arg.loc.clone()));
    }

    let model_type = resolve_model_type(el, ctx)?;
    let element = ctx.reference();
    ctx.register_operation(
        OperationNode::Directive(DirectiveIRNode {
            element,
            dir: dir.clone(),
            name: String::const_new("model"),
            builtin: true,
            model_type: Some(model_type),
        }),
        None,
    );
    None
}

/// Runtime helper flavour for a native element, or `None` after an error.
fn resolve_model_type(el: &ElementNode<'_>, ctx: &mut TransformContext<'_>) -> Option<ModelType> {
    let tag = el.tag.as_str();
    let is_custom_element = ctx.options.is_custom_element(tag);

    if tag == "input" || is_custom_element {
        let Some(type_attr) = el.find_attribute("type") else {
            if el.has_spread() {
                return Some(ModelType::Dynamic);
            }
            check_duplicated_value(el, ctx);
            return Some(ModelType::Text);
        };
        return match &type_attr.value {
            Some(value) if value.is_static => match value.content.as_str() {
                "radio" => Some(ModelType::Radio),
                "checkbox" => Some(ModelType::Checkbox),
                "file" => {
                    ctx.on_error(ErrorCode::VModelOnFileInputElement, Some(el.loc.clone()));
                    None
                }
                _ => {
                    check_duplicated_value(el, ctx);
                    Some(ModelType::Text)
                }
            },
            Some(_) => Some(ModelType::Dynamic),
            None => {
                check_duplicated_value(el, ctx);
                Some(ModelType::Text)
            }
        };
    }

    match tag {
        "select" => Some(ModelType::Select),
        "textarea" => {
            check_duplicated_value(el, ctx);
            Some(ModelType::Text)
        }
        _ => {
            ctx.on_error(ErrorCode::VModelOnInvalidElement, Some(el.loc.clone()));
            None
        }
    }
}

fn check_duplicated_value(el: &ElementNode<'_>, ctx: &mut TransformContext<'_>) {
    if let Some(value) = el.find_attribute("value") {
        ctx.on_error(ErrorCode::VModelUnnecessaryValue, Some(value.loc.clone()));
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::{ModelType, OperationNode, RootIRNode};
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

    fn model_type(ir: &RootIRNode) -> Option<ModelType> {
        ir.block.operation.iter().find_map(|op| match op {
            OperationNode::Directive(dir) => dir.model_type,
            _ => None,
        })
    }

    #[test]
    fn test_model_types() {
        let (ir, errors) = run("<input v-model={msg} />");
        assert!(errors.is_empty());
        assert_eq!(model_type(&ir), Some(ModelType::Text));

        let (ir, _) = run(r#"<input type="checkbox" v-model={checked} />"#);
        assert_eq!(model_type(&ir), Some(ModelType::Checkbox));

        let (ir, _) = run("<input type={kind} v-model={value} />");
        assert_eq!(model_type(&ir), Some(ModelType::Dynamic));

        let (ir, _) = run("<select v-model={selected}></select>");
        assert_eq!(model_type(&ir), Some(ModelType::Select));
    }

    #[test]
    fn test_model_errors() {
        let (ir, errors) = run(r#"<input type="file" v-model={files} />"#);
        assert_eq!(errors[0].code, ErrorCode::VModelOnFileInputElement);
        assert_eq!(model_type(&ir), None);

        let (ir, errors) = run("<div v-model={msg}></div>");
        assert_eq!(errors[0].code, ErrorCode::VModelOnInvalidElement);
        assert_eq!(model_type(&ir), None);

        let (_, errors) = run("<input v-model={a + b} />");
        assert_eq!(errors[0].code, ErrorCode::VModelMalformedExpression);

        let (_, errors) = run("<input v-model={msg} value={other} />");
        assert_eq!(errors[0].code, ErrorCode::VModelUnnecessaryValue);
    }
}
