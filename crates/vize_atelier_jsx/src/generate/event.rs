//! Event listeners.

use vize_relief::SimpleExpressionNode;

use super::fragment::{arg, gen_call, gen_multi, to_json, CodeFragment, Delimiters, Fragments};
use super::CodegenContext;
use crate::expression::{is_fn_expression, is_member_expression};
use crate::ir::{EventModifiers, OperationNode, SetDynamicEventsIRNode, SetEventIRNode};

impl CodegenContext<'_> {
    pub(super) fn gen_set_event(&mut self, op: &SetEventIRNode) -> Fragments {
        let name = self.gen_event_name(op);
        let handler = self.gen_event_handler(op.value.as_ref(), Some(&op.modifiers), false);

        if op.delegate {
            self.delegate(&op.key.content);
            if !self.has_same_delegate_event(op) {
                let mut frag = vec![
                    CodeFragment::Newline,
                    format!("n{}.$evt{} = ", op.element, op.key.content).into(),
                ];
                frag.extend(handler);
                return frag;
            }
        }

        let options = op.modifiers.options;
        let entries: Vec<Option<Fragments>> = [
            (op.effect, "effect: true"),
            (options.capture, "capture: true"),
            (options.once, "once: true"),
            (options.passive, "passive: true"),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, entry)| arg(entry))
        .collect();
        let event_options = (!entries.is_empty()).then(|| gen_multi(Delimiters::ObjectNewline, entries));

        let helper = self.helper(if op.delegate { "delegate" } else { "on" });
        let mut frag = vec![CodeFragment::Newline];
        frag.extend(gen_call(
            helper,
            vec![
                arg(format!("n{}", op.element)),
                Some(name),
                Some(handler),
                event_options,
            ],
        ));
        frag
    }

    fn gen_event_name(&mut self, op: &SetEventIRNode) -> Fragments {
        let exp = self.gen_expression(&op.key);
        let Some((find, replacement)) = &op.key_override else {
            return exp;
        };
        let mut wrapped = vec!["(".into()];
        wrapped.extend(exp);
        wrapped.push(")".into());

        let mut frag = wrapped.clone();
        frag.push(format!(" === {} ? {} : ", to_json(find.as_str()), to_json(replacement.as_str())).into());
        frag.extend(wrapped);
        frag
    }

    /// Another delegated listener for the same event on the same element.
    fn has_same_delegate_event(&self, op: &SetEventIRNode) -> bool {
        let Some(block) = self.current_block() else {
            return false;
        };
        block.operation.iter().any(|other| match other {
            OperationNode::SetEvent(other) => {
                !std::ptr::eq(other, op)
                    && other.delegate
                    && other.element == op.element
                    && other.key.content == op.key.content
            }
            _ => false,
        })
    }

    /// Listener function for an event value.
    ///
    /// With `extra_wrap` the handler is returned from a getter, as component
    /// props are.
    pub(super) fn gen_event_handler(
        &mut self,
        value: Option<&SimpleExpressionNode>,
        modifiers: Option<&EventModifiers>,
        extra_wrap: bool,
    ) -> Fragments {
        let mut handler: Fragments = match value.filter(|value| !value.content.trim().is_empty()) {
            None => vec!["() => {}".into()],
            Some(value) if is_member_expression(&value.content) => {
                let exp = self.gen_expression(value);
                if extra_wrap {
                    exp
                } else {
                    let mut frag = vec!["e => ".into()];
                    frag.extend(exp);
                    frag.push("(e)".into());
                    frag
                }
            }
            Some(value) if is_fn_expression(&value.content) => self.gen_expression(value),
            Some(value) => {
                let block = value.content.contains(';');
                let mut frag = vec![if block { "() => {" } else { "() => (" }.into()];
                frag.extend(self.gen_expression(value));
                frag.push(if block { "}" } else { ")" }.into());
                frag
            }
        };

        if let Some(modifiers) = modifiers {
            if !modifiers.non_keys.is_empty() {
                handler = gen_call(
                    self.helper("withModifiers"),
                    vec![Some(handler), arg(to_json(&modifiers.non_keys))],
                );
            }
            if !modifiers.keys.is_empty() {
                handler = gen_call(
                    self.helper("withKeys"),
                    vec![Some(handler), arg(to_json(&modifiers.keys))],
                );
            }
        }
        if extra_wrap {
            handler.insert(0, "() => ".into());
        }
        handler
    }

    pub(super) fn gen_set_dynamic_events(&mut self, op: &SetDynamicEventsIRNode) -> Fragments {
        let mut frag = vec![CodeFragment::Newline];
        let value = self.gen_expression(&op.value);
        frag.extend(gen_call(
            self.helper("setDynamicEvents"),
            vec![arg(format!("n{}", op.element)), Some(value)],
        ));
        frag
    }
}
