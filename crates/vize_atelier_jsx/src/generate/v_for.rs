//! `v-for` output and the keyed-loop optimizations.
//!
//! Loop aliases are read through the runtime's item/key/index refs:
//!
//! ```text
//! (item, i) in list   =>   _createFor(() => (list), (_for_item0, _for_index0) => {
//!                            ... _for_item0.value ... _for_index0.value ...
//!                          })
//! ```
//!
//! In a keyed loop, bindings of the shape `selected === item.id` compare a
//! loop-external value against the key. They are moved to a selector created
//! once per loop, so a change of `selected` touches only the two rows whose
//! result flips. Bindings that depend on the key alone can never change for a
//! row and are emitted without a render effect.

use vize_relief::SimpleExpressionNode;

use super::fragment::{
    gen_call, gen_call_with_placeholder, gen_for_params, CodeFragment, Fragments,
};
use super::CodegenContext;
use crate::expression::{
    destructure_bindings, is_key_only_binding, match_selector_pattern, sub_expression,
    DestructureHelper,
};
use crate::ir::{ForIRNode, IREffect};

const FAST_REMOVE: u8 = 1;
const IS_COMPONENT: u8 = 1 << 1;
const ONCE: u8 = 1 << 2;

/// Names bound by a loop's aliases.
pub(super) fn loop_bound_names(
    value: Option<&SimpleExpressionNode>,
    key: Option<&SimpleExpressionNode>,
    index: Option<&SimpleExpressionNode>,
) -> Vec<vize_carton::String> {
    let mut names: Vec<vize_carton::String> = value
        .map(|value| {
            destructure_bindings(&value.content)
                .into_iter()
                .map(|binding| binding.name.as_str().into())
                .collect()
        })
        .unwrap_or_default();
    names.extend(
        [key, index]
            .into_iter()
            .flatten()
            .map(|alias| alias.content.trim().into()),
    );
    names
}

fn alias_text(alias: Option<&SimpleExpressionNode>) -> Option<&str> {
    alias.map(|alias| alias.content.trim())
}

impl<'a> CodegenContext<'a> {
    pub(super) fn gen_for(&mut self, op: &'a ForIRNode) -> Fragments {
        let mut source = vec!["() => (".into()];
        source.extend(self.gen_expression(&op.source));
        source.push(")".into());

        let local_names = loop_bound_names(op.value.as_ref(), op.key.as_ref(), op.index.as_ref());

        // Split the body effects into selector bindings, key-only bindings
        // and regular effects.
        let mut selectors: Vec<(&'a IREffect, SimpleExpressionNode)> = Vec::new();
        let mut key_only: Vec<&'a IREffect> = Vec::new();
        let mut effects: Vec<&'a IREffect> = Vec::new();
        for effect in &op.render.effect {
            if let (true, Some(key_prop), [exp]) = (
                self.options.optimize_loops,
                op.key_prop.as_ref(),
                effect.expressions.as_slice(),
            ) {
                let is_local = |name: &str| local_names.iter().any(|local| local == name);
                if let Some((start, end)) =
                    match_selector_pattern(&exp.content, &key_prop.content, &is_local)
                {
                    tracing::trace!(binding = %exp.content, "selector binding in keyed loop");
                    selectors.push((effect, sub_expression(exp, start, end)));
                    continue;
                }
                if is_key_only_binding(&exp.content, &key_prop.content) {
                    tracing::trace!(binding = %exp.content, "key-only binding in keyed loop");
                    key_only.push(effect);
                    continue;
                }
            }
            effects.push(effect);
        }

        // Selector setup runs outside the loop scope.
        let mut declarations = Vec::new();
        let mut setup = Vec::new();
        for (i, (_, selector)) in selectors.iter().enumerate() {
            let name = format!("_selector{}_{i}", op.id);
            declarations.extend([format!("let {name}").into(), CodeFragment::Newline]);
            if i == 0 {
                setup.extend(["({ createSelector }) => {".into(), CodeFragment::IndentStart]);
            }
            let mut getter = vec!["() => ".into()];
            getter.extend(self.gen_expression(selector));
            setup.extend([CodeFragment::Newline, format!("{name} = ").into()]);
            setup.extend(gen_call("createSelector", vec![Some(getter)]));
            if i + 1 == selectors.len() {
                setup.extend([CodeFragment::IndentEnd, CodeFragment::Newline, "}".into()]);
            }
        }

        let depth = self.enter_scope();
        let item_var = format!("_for_item{depth}");
        let mut ids: Vec<(vize_carton::String, Option<vize_carton::String>)> =
            vec![(item_var.as_str().into(), None)];
        if let Some(value) = &op.value {
            for binding in destructure_bindings(&value.content) {
                let mut path = format!("{item_var}.value{}", binding.path);
                match &binding.helper {
                    Some(DestructureHelper::RestElement(excluded)) => {
                        path = format!("{}({path}, {excluded})", self.helper("getRestElement"));
                    }
                    Some(DestructureHelper::DefaultValue(default)) => {
                        path = format!("{}({path}, {default})", self.helper("getDefaultValue"));
                    }
                    None => {}
                }
                ids.push((binding.name.as_str().into(), Some(path.as_str().into())));
            }
        }
        let mut args = vec![item_var];
        for (alias, prefix) in [(&op.key, "_for_key"), (&op.index, "_for_index")] {
            if let Some(alias) = alias {
                let var = format!("{prefix}{depth}");
                ids.push((alias.content.trim().into(), Some(format!("{var}.value").as_str().into())));
                ids.push((var.as_str().into(), None));
                args.push(var);
            }
        }

        let pushed = self.push_ids(ids);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let mut render = vec![format!("({}) => {{", args.join(", ")).into(), CodeFragment::IndentStart];
        render.extend(self.gen_block_body(&op.render, false, &effects, |ctx| {
            let mut frag = Vec::new();
            for (i, &(effect, _)) in selectors.iter().enumerate() {
                frag.extend([
                    CodeFragment::Newline,
                    format!("_selector{}_{i}(() => {{", op.id).into(),
                    CodeFragment::IndentStart,
                ]);
                for operation in &effect.operations {
                    frag.extend(ctx.gen_operation_with_insertion_state(operation));
                }
                frag.extend([CodeFragment::IndentEnd, CodeFragment::Newline, "})".into()]);
            }
            for &effect in &key_only {
                for operation in &effect.operations {
                    frag.extend(ctx.gen_operation_with_insertion_state(operation));
                }
            }
            frag
        }));
        render.extend([CodeFragment::IndentEnd, CodeFragment::Newline, "}".into()]);
        self.pop_ids(pushed);
        self.exit_scope();

        let key = op.key_prop.as_ref().map(|key_prop| {
            let shadowed = self.push_ids(local_names.iter().map(|name| (name.clone(), None)).collect());
            let mut frag = gen_for_params(
                alias_text(op.value.as_ref()),
                alias_text(op.key.as_ref()),
                alias_text(op.index.as_ref()),
            );
            frag.push(" => (".into());
            frag.extend(self.gen_expression(key_prop));
            frag.push(")".into());
            self.pop_ids(shadowed);
            frag
        });

        let mut flags = 0;
        if op.only_child {
            flags |= FAST_REMOVE;
        }
        if op.component {
            flags |= IS_COMPONENT;
        }
        if op.once {
            flags |= ONCE;
        }

        let mut frag = vec![CodeFragment::Newline];
        frag.extend(declarations);
        frag.push(format!("const n{} = ", op.id).into());
        frag.extend(gen_call_with_placeholder(
            self.helper("createFor"),
            "undefined",
            vec![
                Some(source),
                Some(render),
                key,
                (flags != 0).then(|| vec![flags.to_string().into()]),
                (!setup.is_empty()).then_some(setup),
            ],
        ));
        frag
    }
}

#[cfg(test)]
mod tests {
    use vize_relief::SimpleExpressionNode;

    use super::loop_bound_names;

    #[test]
    fn test_loop_bound_names() {
        let value = SimpleExpressionNode::dynamic("{ id, label: text }");
        let index = SimpleExpressionNode::dynamic("i");
        let names = loop_bound_names(Some(&value), None, Some(&index));
        assert_eq!(names, vec!["id", "text", "i"]);
    }
}
