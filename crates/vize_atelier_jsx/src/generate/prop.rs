//! Prop and attribute operations.

use vize_carton::{
    camelize, can_set_value_directly, capitalize, is_simple_identifier, is_svg_tag,
    should_set_as_attr, to_handler_key,
};
use vize_relief::SimpleExpressionNode;

use super::fragment::{arg, gen_call, gen_multi, to_json, CodeFragment, Delimiters, Fragments};
use super::CodegenContext;
use crate::ir::{IRProp, IRPropsEntry, PropModifier, SetDynamicPropsIRNode, SetPropIRNode};

/// Runtime setter for a single prop.
struct RuntimeHelper {
    name: &'static str,
    need_key: bool,
}

impl RuntimeHelper {
    const fn keyed(name: &'static str) -> Self {
        Self {
            name,
            need_key: true,
        }
    }

    const fn unkeyed(name: &'static str) -> Self {
        Self {
            name,
            need_key: false,
        }
    }
}

fn special_helper(key: &str, tag: &str) -> Option<RuntimeHelper> {
    match key {
        "value" if can_set_value_directly(tag) => Some(RuntimeHelper::unkeyed("setValue")),
        "class" => Some(RuntimeHelper::unkeyed("setClass")),
        "style" => Some(RuntimeHelper::unkeyed("setStyle")),
        "innerHTML" => Some(RuntimeHelper::unkeyed("setHtml")),
        "textContent" => Some(RuntimeHelper::unkeyed("setText")),
        _ => None,
    }
}

fn is_aria_prop(key: &str) -> bool {
    key.as_bytes()
        .windows(5)
        .any(|w| w.starts_with(b"aria") && w[4].is_ascii_uppercase())
}

fn runtime_helper(tag: &str, key: &str, modifier: Option<PropModifier>) -> RuntimeHelper {
    let tag = tag.to_ascii_lowercase();
    match modifier {
        Some(PropModifier::Prop) => {
            return special_helper(key, &tag).unwrap_or(RuntimeHelper::keyed("setDOMProp"))
        }
        Some(PropModifier::Attr) => return RuntimeHelper::keyed("setAttr"),
        None => {}
    }
    if let Some(helper) = special_helper(key, &tag) {
        return helper;
    }
    if is_aria_prop(key) {
        return RuntimeHelper::keyed("setDOMProp");
    }
    if is_svg_tag(&tag) || should_set_as_attr(&tag, key) || key.contains('-') {
        return RuntimeHelper::keyed("setAttr");
    }
    RuntimeHelper::keyed("setProp")
}

impl CodegenContext<'_> {
    pub(super) fn gen_set_prop(&mut self, op: &SetPropIRNode) -> Fragments {
        let prop = &op.prop;
        let helper = runtime_helper(&op.tag, &prop.key.content, prop.modifier);
        let mut args = vec![arg(format!("n{}", op.element))];
        if helper.need_key {
            args.push(Some(self.gen_expression(&prop.key)));
        }
        args.push(Some(self.gen_prop_value(&prop.values)));
        let mut frag = vec![CodeFragment::Newline];
        frag.extend(gen_call(self.helper(helper.name), args));
        frag
    }

    pub(super) fn gen_set_dynamic_props(&mut self, op: &SetDynamicPropsIRNode) -> Fragments {
        let values = op
            .props
            .iter()
            .map(|entry| {
                Some(match entry {
                    IRPropsEntry::Static(props) => self.gen_literal_object_props(props),
                    IRPropsEntry::Attribute(prop) => {
                        self.gen_literal_object_props(std::slice::from_ref(prop))
                    }
                    IRPropsEntry::Dynamic { value, .. } => self.gen_expression(value),
                })
            })
            .collect();
        let mut frag = vec![CodeFragment::Newline];
        frag.extend(gen_call(
            self.helper("setDynamicProps"),
            vec![
                arg(format!("n{}", op.element)),
                Some(gen_multi(Delimiters::Array, values)),
                is_svg_tag(&op.tag.to_ascii_lowercase()).then(|| vec!["true".into()]),
            ],
        ));
        frag
    }

    fn gen_literal_object_props(&mut self, props: &[IRProp]) -> Fragments {
        let entries = props
            .iter()
            .map(|prop| {
                let mut frag = self.gen_prop_key(prop);
                frag.push(": ".into());
                frag.extend(self.gen_prop_value(&prop.values));
                Some(frag)
            })
            .collect();
        gen_multi(Delimiters::Object, entries)
    }

    /// Object key for a prop: quoted when needed, computed when dynamic.
    pub(super) fn gen_prop_key(&mut self, prop: &IRProp) -> Fragments {
        let postfix: std::string::String = prop
            .handler_modifiers
            .as_ref()
            .map(|modifiers| {
                let options = modifiers.options;
                [
                    (options.capture, "capture"),
                    (options.once, "once"),
                    (options.passive, "passive"),
                ]
                .into_iter()
                .filter(|(enabled, _)| *enabled)
                .map(|(_, name)| capitalize(name).to_string())
                .collect()
            })
            .unwrap_or_default();
        let prefix = match prop.modifier {
            Some(PropModifier::Prop) => ".",
            Some(PropModifier::Attr) => "^",
            None => "",
        };

        let key = &prop.key;
        if key.is_static {
            let name = if prop.handler {
                to_handler_key(&camelize(&key.content))
            } else {
                key.content.clone()
            };
            let name = format!("{prefix}{name}{postfix}");
            let code = if is_simple_identifier(&name) {
                name
            } else {
                to_json(&name)
            };
            return vec![CodeFragment::Mapped {
                code,
                loc: key.loc.clone(),
                name: None,
            }];
        }

        let mut exp = self.gen_expression(key);
        if prop.runtime_camelize {
            exp = gen_call(self.helper("camelize"), vec![Some(exp)]);
        }
        if prop.handler {
            exp = gen_call(self.helper("toHandlerKey"), vec![Some(exp)]);
        }
        let mut frag = vec!["[".into()];
        if !prefix.is_empty() {
            frag.push(format!("{} + ", to_json(prefix)).into());
        }
        frag.extend(exp);
        if !postfix.is_empty() {
            frag.push(format!(" + {}", to_json(&postfix)).into());
        }
        frag.push("]".into());
        frag
    }

    pub(super) fn gen_prop_value(&mut self, values: &[SimpleExpressionNode]) -> Fragments {
        if let [value] = values {
            return self.gen_expression(value);
        }
        gen_multi(
            Delimiters::Array,
            values.iter().map(|value| Some(self.gen_expression(value))).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{is_aria_prop, runtime_helper};
    use crate::ir::PropModifier;

    #[test]
    fn test_runtime_helper() {
        assert_eq!(runtime_helper("div", "id", None).name, "setProp");
        assert_eq!(runtime_helper("div", "class", None).name, "setClass");
        assert!(!runtime_helper("div", "class", None).need_key);
        assert_eq!(runtime_helper("input", "value", None).name, "setValue");
        assert_eq!(runtime_helper("progress", "value", None).name, "setProp");
        assert_eq!(runtime_helper("div", "data-id", None).name, "setAttr");
        assert_eq!(runtime_helper("circle", "cx", None).name, "setAttr");
        assert_eq!(runtime_helper("img", "width", None).name, "setAttr");
        assert_eq!(runtime_helper("div", "ariaLabel", None).name, "setDOMProp");
        assert_eq!(runtime_helper("div", "id", Some(PropModifier::Prop)).name, "setDOMProp");
        assert_eq!(runtime_helper("div", "id", Some(PropModifier::Attr)).name, "setAttr");
    }

    #[test]
    fn test_aria_prop() {
        assert!(is_aria_prop("ariaHidden"));
        assert!(!is_aria_prop("aria-hidden"));
        assert!(!is_aria_prop("area"));
    }
}
