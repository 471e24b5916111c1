//! Directive recognition for JSX attributes.
//!
//! JSX has no directive syntax of its own, so attribute names carry it:
//! `v-name`, `v-name:arg`, `_`-separated modifiers, `$expr$` dynamic
//! arguments, `on[A-Z]...` event bindings, and plain attributes as `bind`.

use vize_carton::{uncapitalize, String};
use vize_relief::{AttributeNode, SimpleExpressionNode, SourceLocation};

/// A JSX attribute resolved into directive form.
#[derive(Debug, Clone)]
pub struct DirectiveNode {
    /// Directive name without prefix: `if`, `on`, `bind`, `model`, `focus`
    pub name: String,
    /// Attribute name as written
    pub raw_name: String,
    pub arg: Option<SimpleExpressionNode>,
    pub exp: Option<SimpleExpressionNode>,
    pub modifiers: Vec<String>,
    pub loc: SourceLocation,
}

impl DirectiveNode {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    /// Static argument content, if the argument is static.
    pub fn static_arg(&self) -> Option<&str> {
        self.arg
            .as_ref()
            .filter(|arg| arg.is_static)
            .map(|arg| arg.content.as_str())
    }
}

/// Directives handled by the compiler itself.
pub fn is_builtin_directive(name: &str) -> bool {
    matches!(
        name,
        "bind"
            | "on"
            | "model"
            | "show"
            | "html"
            | "text"
            | "if"
            | "else-if"
            | "else"
            | "for"
            | "once"
            | "slot"
            | "slots"
    )
}

/// `onClick`, `onUpdate:title`
pub fn is_event_attribute(name: &str) -> bool {
    name.strip_prefix("on")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// Props that never reach the element or component.
pub fn is_reserved_prop(key: &str) -> bool {
    matches!(key, "key" | "ref" | "ref_for" | "ref_key")
}

fn split_modifiers(part: &str) -> (&str, Vec<String>) {
    let mut parts = part.split('_');
    let head = parts.next().unwrap_or_default();
    let modifiers = parts.filter(|m| !m.is_empty()).map(String::from).collect();
    (head, modifiers)
}

/// Parse an argument segment: `title_trim` or `$name$_mod`.
fn parse_arg(part: &str, loc: &SourceLocation) -> (Option<SimpleExpressionNode>, Vec<String>) {
    if let Some(rest) = part.strip_prefix('$') {
        if let Some(end) = rest.find('$') {
            let content = rest[..end].replace('_', ".");
            let (_, modifiers) = split_modifiers(&rest[end + 1..]);
            let arg = SimpleExpressionNode::new(content, false, loc.clone());
            return (Some(arg), modifiers);
        }
    }
    let (arg, modifiers) = split_modifiers(part);
    let arg = (!arg.is_empty()).then(|| SimpleExpressionNode::new(arg, true, loc.clone()));
    (arg, modifiers)
}

/// Resolve a JSX attribute into directive form.
///
/// Event names are lowercased for native elements (`onDblClick` -> `dblclick`)
/// and uncapitalized for components (`onUpdateValue` -> `updateValue`).
pub fn resolve_directive(attr: &AttributeNode, is_component: bool) -> DirectiveNode {
    let name = attr.name.as_str();
    let exp = attr
        .value
        .clone()
        .filter(|value| value.is_static || !value.is_empty());

    let (dir_name, arg, modifiers) = if let Some(body) = name.strip_prefix("v-") {
        match &attr.arg {
            None => {
                let (dir_name, modifiers) = split_modifiers(body);
                (String::from(dir_name), None, modifiers)
            }
            Some(arg_part) => {
                let (arg, modifiers) = parse_arg(arg_part, &attr.name_loc);
                (String::from(body), arg, modifiers)
            }
        }
    } else if is_event_attribute(name) {
        let (event, mut modifiers) = split_modifiers(&name[2..]);
        let mut event = if is_component {
            uncapitalize(event)
        } else {
            String::from(event.to_ascii_lowercase())
        };
        if let Some(arg_part) = &attr.arg {
            let (arg, arg_modifiers) = split_modifiers(arg_part);
            event = uncapitalize(&event);
            event.push(':');
            event.push_str(arg);
            modifiers.extend(arg_modifiers);
        }
        let arg = SimpleExpressionNode::new(event, true, attr.name_loc.clone());
        (String::from("on"), Some(arg), modifiers)
    } else {
        let mut key = attr.raw_name();
        let mut modifiers = Vec::new();
        while let Some(pos) = key.rfind('_') {
            let modifier = &key[pos + 1..];
            if !matches!(modifier, "prop" | "attr" | "camel") {
                break;
            }
            modifiers.insert(0, String::from(modifier));
            key.truncate(pos);
        }
        let arg = SimpleExpressionNode::new(key, true, attr.name_loc.clone());
        (String::from("bind"), Some(arg), modifiers)
    };

    DirectiveNode {
        name: dir_name,
        raw_name: attr.raw_name(),
        arg,
        exp,
        modifiers,
        loc: attr.loc.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, arg: Option<&str>) -> AttributeNode {
        let mut attr = AttributeNode::new(name, SourceLocation::STUB);
        attr.arg = arg.map(String::from);
        attr.value = Some(SimpleExpressionNode::dynamic("x"));
        attr
    }

    #[test]
    fn test_resolve_v_directive() {
        let dir = resolve_directive(&attr("v-model_trim_number", None), false);
        assert_eq!(dir.name.as_str(), "model");
        assert!(dir.arg.is_none());
        assert_eq!(dir.modifiers, vec!["trim", "number"]);

        let dir = resolve_directive(&attr("v-model", Some("title_trim")), true);
        assert_eq!(dir.static_arg(), Some("title"));
        assert!(dir.has_modifier("trim"));

        let dir = resolve_directive(&attr("v-slot", Some("$slot_name$")), true);
        let arg = dir.arg.unwrap();
        assert!(!arg.is_static);
        assert_eq!(arg.content.as_str(), "slot.name");
    }

    #[test]
    fn test_resolve_event() {
        let dir = resolve_directive(&attr("onClick_stop_prevent", None), false);
        assert_eq!(dir.name.as_str(), "on");
        assert_eq!(dir.static_arg(), Some("click"));
        assert_eq!(dir.modifiers, vec!["stop", "prevent"]);

        let dir = resolve_directive(&attr("onDblClick", None), false);
        assert_eq!(dir.static_arg(), Some("dblclick"));

        let dir = resolve_directive(&attr("onCustomEvent", None), true);
        assert_eq!(dir.static_arg(), Some("customEvent"));

        let dir = resolve_directive(&attr("onUpdate", Some("modelValue")), true);
        assert_eq!(dir.static_arg(), Some("update:modelValue"));
    }

    #[test]
    fn test_resolve_bind() {
        let dir = resolve_directive(&attr("foo-bar_camel", None), false);
        assert_eq!(dir.name.as_str(), "bind");
        assert_eq!(dir.static_arg(), Some("foo-bar"));
        assert_eq!(dir.modifiers, vec!["camel"]);

        let dir = resolve_directive(&attr("xlink", Some("href")), false);
        assert_eq!(dir.static_arg(), Some("xlink:href"));

        let dir = resolve_directive(&attr("data_id", None), false);
        assert_eq!(dir.static_arg(), Some("data_id"));
        assert!(dir.modifiers.is_empty());
    }

    #[test]
    fn test_empty_expression_is_absent() {
        let mut a = attr("v-if", None);
        a.value = Some(SimpleExpressionNode::dynamic(""));
        assert!(resolve_directive(&a, false).exp.is_none());
        a.value = Some(SimpleExpressionNode::static_str(""));
        assert!(resolve_directive(&a, false).exp.is_some());
    }
}
