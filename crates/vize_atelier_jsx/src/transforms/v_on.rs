//! Event listeners (`onClick={handler}`, `onKeydown_enter`, `v-on:$name$`).

use vize_carton::{is_delegated_event, is_keyboard_event, String};
use vize_relief::{ElementNode, ElementType, ErrorCode, SimpleExpressionNode};

use crate::directive::DirectiveNode;
use crate::ir::{EventModifiers, OperationNode, SetEventIRNode};
use crate::transform::{DirectiveTransformResult, TransformContext};

/// Split modifiers into key guards, other guards and listener options.
pub fn resolve_modifiers(key: &SimpleExpressionNode, modifiers: &[String]) -> EventModifiers {
    let mut resolved = EventModifiers::default();
    for modifier in modifiers {
        match modifier.as_str() {
            "passive" => resolved.options.passive = true,
            "once" => resolved.options.once = true,
            "capture" => resolved.options.capture = true,
            "left" | "right" => {
                if !key.is_static {
                    resolved.keys.push(modifier.clone());
                    resolved.non_keys.push(modifier.clone());
                } else if is_keyboard_event(&key.content) {
                    resolved.keys.push(modifier.clone());
                } else {
                    resolved.non_keys.push(modifier.clone());
                }
            }
            "stop" | "prevent" | "self" | "ctrl" | "shift" | "alt" | "meta" | "exact"
            | "middle" => resolved.non_keys.push(modifier.clone()),
            _ => resolved.keys.push(modifier.clone()),
        }
    }
    resolved
}

pub fn transform_v_on<'a>(
    dir: &DirectiveNode,
    el: &'a ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> Option<DirectiveTransformResult> {
    let mut key = dir.arg.clone()?;
    if dir.exp.is_none() && dir.modifiers.is_empty() {
        ctx.on_error(ErrorCode::VOnNoExpression, Some(dir.loc.clone()));
    }

    let modifiers = resolve_modifiers(&key, &dir.modifiers);
    let is_static_click = key.is_static && key.content.eq_ignore_ascii_case("click");
    let mut key_override = None;
    for (modifier, rewritten) in [("middle", "mouseup"), ("right", "contextmenu")] {
        if !modifiers.non_keys.iter().any(|m| m == modifier) {
            continue;
        }
        if is_static_click {
            key.content = String::const_new(rewritten);
        } else if !key.is_static {
            key_override = Some((String::const_new("click"), String::const_new(rewritten)));
        }
    }

    if el.tag_type == ElementType::Component {
        let value = dir
            .exp
            .clone()
            .unwrap_or_else(|| SimpleExpressionNode::new("() => {}", false, dir.loc.clone()));
        let mut result = DirectiveTransformResult::new(key, value);
        result.handler = true;
        result.handler_modifiers = Some(modifiers);
        return Some(result);
    }

    let delegate =
        key.is_static && modifiers.options.is_empty() && is_delegated_event(&key.content);
    let element = ctx.reference();
    let effect = !key.is_static;
    ctx.register_effect(
        vec![key.clone()],
        OperationNode::SetEvent(SetEventIRNode {
            element,
            key,
            value: dir.exp.clone(),
            modifiers,
            key_override,
            delegate,
            effect,
        }),
        None,
        None,
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_modifiers() {
        let key = SimpleExpressionNode::static_str("keydown");
        let modifiers: Vec<String> = ["enter", "stop", "once", "left"]
            .into_iter()
            .map(String::from)
            .collect();
        let resolved = resolve_modifiers(&key, &modifiers);
        assert_eq!(resolved.keys, vec!["enter", "left"]);
        assert_eq!(resolved.non_keys, vec!["stop"]);
        assert!(resolved.options.once);

        let click = SimpleExpressionNode::static_str("click");
        let resolved = resolve_modifiers(&click, &[String::from("right")]);
        assert!(resolved.keys.is_empty());
        assert_eq!(resolved.non_keys, vec!["right"]);

        let dynamic = SimpleExpressionNode::dynamic("name");
        let resolved = resolve_modifiers(&dynamic, &[String::from("left")]);
        assert_eq!(resolved.keys, vec!["left"]);
        assert_eq!(resolved.non_keys, vec!["left"]);
    }
}
