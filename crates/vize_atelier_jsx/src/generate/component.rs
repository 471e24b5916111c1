//! Component creation: props object and slots object.
//!
//! Props are passed as getters so the child reads them lazily:
//!
//! ```text
//! <Comp foo={bar} {...rest} onClick={go} />
//!
//! _createComponent(Comp, {
//!   foo: () => (bar),
//!   onClick: () => go,
//!   $: [
//!     () => (rest)
//!   ]
//! })
//! ```

use vize_carton::{camelize, is_simple_identifier, String};

use super::directive::gen_directive_modifiers;
use super::fragment::{arg, gen_call, gen_for_params, gen_multi, to_json, CodeFragment, Delimiters, Fragments};
use super::v_for::loop_bound_names;
use super::CodegenContext;
use crate::expression::{destructure_bindings, ForParseResult};
use crate::ir::{CreateComponentIRNode, IRProp, IRPropsEntry, IRSlotDynamic, IRSlots, SlotBlockIRNode};
use vize_relief::SimpleExpressionNode;

impl<'a> CodegenContext<'a> {
    pub(super) fn gen_create_component(&mut self, op: &'a CreateComponentIRNode) -> Fragments {
        let tag = self.gen_component_tag(op);
        let props = self.gen_raw_props(&op.props);
        let slots = self.gen_raw_slots(&op.slots);
        let helper = match &op.dynamic {
            Some(dynamic) if !dynamic.is_static => "createDynamicComponent",
            _ if self.options.with_fallback => "createComponentWithFallback",
            _ => "createComponent",
        };

        let mut frag = vec![CodeFragment::Newline, format!("const n{} = ", op.id).into()];
        frag.extend(gen_call(
            self.helper(helper),
            vec![
                Some(tag),
                props,
                slots,
                op.root.then(|| vec!["true".into()]),
                op.once.then(|| vec!["true".into()]),
            ],
        ));
        frag.extend(self.gen_directives_for_element(op.id));
        frag
    }

    fn gen_component_tag(&mut self, op: &CreateComponentIRNode) -> Fragments {
        match &op.dynamic {
            Some(dynamic) if dynamic.is_static => gen_call(
                self.helper("resolveDynamicComponent"),
                vec![Some(self.gen_expression(dynamic))],
            ),
            Some(dynamic) => {
                let mut frag = vec!["() => (".into()];
                frag.extend(self.gen_expression(dynamic));
                frag.push(")".into());
                frag
            }
            None => self.gen_expression(&SimpleExpressionNode::dynamic(op.tag.as_str())),
        }
    }

    fn gen_raw_props(&mut self, props: &[IRPropsEntry]) -> Option<Fragments> {
        match props.split_first() {
            None => None,
            Some((IRPropsEntry::Static(first), rest)) => {
                if first.is_empty() && rest.is_empty() {
                    return None;
                }
                let dynamic = self.gen_dynamic_props(rest);
                Some(self.gen_static_props(first, dynamic))
            }
            Some(_) => {
                let dynamic = self.gen_dynamic_props(props);
                Some(self.gen_static_props(&[], dynamic))
            }
        }
    }

    fn gen_static_props(&mut self, props: &[IRProp], dynamic: Option<Fragments>) -> Fragments {
        let mut args: Vec<Option<Fragments>> =
            props.iter().map(|prop| Some(self.gen_component_prop(prop, true))).collect();
        if let Some(dynamic) = dynamic {
            let mut frag = vec!["$: ".into()];
            frag.extend(dynamic);
            args.push(Some(frag));
        }
        let delimiters = if args.len() > 1 {
            Delimiters::ObjectNewline
        } else {
            Delimiters::Object
        };
        gen_multi(delimiters, args)
    }

    /// `$: [...]` sources merged after the static props.
    fn gen_dynamic_props(&mut self, entries: &[IRPropsEntry]) -> Option<Fragments> {
        let mut sources = Vec::new();
        for entry in entries {
            let exp = match entry {
                IRPropsEntry::Static(props) => {
                    if !props.is_empty() {
                        sources.push(Some(self.gen_static_props(props, None)));
                    }
                    continue;
                }
                IRPropsEntry::Attribute(prop) => {
                    gen_multi(Delimiters::Object, vec![Some(self.gen_component_prop(prop, false))])
                }
                IRPropsEntry::Dynamic { value, handler } => {
                    let exp = self.gen_expression(value);
                    if *handler {
                        gen_call(self.helper("toHandlers"), vec![Some(exp)])
                    } else {
                        exp
                    }
                }
            };
            let mut frag = vec!["() => (".into()];
            frag.extend(exp);
            frag.push(")".into());
            sources.push(Some(frag));
        }
        (!sources.is_empty()).then(|| gen_multi(Delimiters::ArrayNewline, sources))
    }

    fn gen_component_prop(&mut self, prop: &IRProp, as_getter: bool) -> Fragments {
        let mut frag = self.gen_prop_key(prop);
        frag.push(": ".into());
        if prop.handler {
            frag.extend(self.gen_event_handler(
                prop.values.first(),
                prop.handler_modifiers.as_ref(),
                true,
            ));
        } else {
            let value = self.gen_prop_value(&prop.values);
            if as_getter {
                frag.push("() => (".into());
                frag.extend(value);
                frag.push(")".into());
            } else {
                frag.extend(value);
            }
        }
        if prop.model {
            if let Some(value) = prop.values.first() {
                frag.extend(self.gen_model_event(prop, value));
                frag.extend(self.gen_model_modifiers(prop));
            }
        }
        frag
    }

    /// `"onUpdate:key": () => _value => (exp = _value)`
    fn gen_model_event(&mut self, prop: &IRProp, value: &SimpleExpressionNode) -> Fragments {
        let mut frag = vec![",".into(), CodeFragment::Newline];
        if prop.key.is_static {
            frag.push(to_json(&format!("onUpdate:{}", camelize(&prop.key.content))).into());
        } else {
            frag.push("[\"onUpdate:\" + ".into());
            frag.extend(self.gen_expression(&prop.key));
            frag.push("]".into());
        }
        frag.push(": () => ".into());
        frag.extend(self.gen_model_handler(value));
        frag
    }

    /// `keyModifiers: () => ({ trim: true })`
    fn gen_model_modifiers(&mut self, prop: &IRProp) -> Fragments {
        if prop.model_modifiers.is_empty() {
            return Vec::new();
        }
        let mut frag = vec![",".into(), CodeFragment::Newline];
        if prop.key.is_static {
            let key = format!("{}Modifiers", prop.key.content);
            frag.push(if is_simple_identifier(&key) { key } else { to_json(&key) }.into());
        } else {
            frag.push("[".into());
            frag.extend(self.gen_expression(&prop.key));
            frag.push(" + \"Modifiers\"]".into());
        }
        frag.push(
            format!(
                ": () => ({{ {} }})",
                gen_directive_modifiers(&prop.model_modifiers)
            )
            .into(),
        );
        frag
    }

    // ========================================================================
    // Slots
    // ========================================================================

    fn gen_raw_slots(&mut self, slots: &'a [IRSlots]) -> Option<Fragments> {
        match slots.split_first() {
            None => None,
            Some((IRSlots::Static(named), rest)) => {
                Some(self.gen_static_slots(named, (!rest.is_empty()).then_some(rest)))
            }
            Some(_) => Some(self.gen_static_slots(&[], Some(slots))),
        }
    }

    fn gen_static_slots(
        &mut self,
        named: &'a [(String, SlotBlockIRNode)],
        dynamic: Option<&'a [IRSlots]>,
    ) -> Fragments {
        let mut args = Vec::new();
        for (name, slot) in named {
            let mut frag = vec![format!("{}: ", to_json(name.as_str())).into()];
            frag.extend(self.gen_slot_block_with_props(slot));
            args.push(Some(frag));
        }
        if let Some(dynamic) = dynamic {
            let mut frag = vec!["$: ".into()];
            frag.extend(self.gen_dynamic_slots(dynamic));
            args.push(Some(frag));
        }
        gen_multi(Delimiters::ObjectNewline, args)
    }

    fn gen_dynamic_slots(&mut self, slots: &'a [IRSlots]) -> Fragments {
        let items = slots
            .iter()
            .map(|slot| {
                Some(match slot {
                    IRSlots::Static(named) => self.gen_static_slots(named, None),
                    IRSlots::Expression(exp) => self.gen_expression(exp),
                    IRSlots::Dynamic(dynamic) => self.gen_dynamic_slot(dynamic, true),
                })
            })
            .collect();
        gen_multi(Delimiters::ArrayNewline, items)
    }

    fn gen_dynamic_slot(&mut self, slot: &'a IRSlotDynamic, with_function: bool) -> Fragments {
        let frag = match slot {
            IRSlotDynamic::Basic { name, block } => self.gen_basic_dynamic_slot(name, block),
            IRSlotDynamic::Loop {
                name,
                block,
                for_parse,
            } => self.gen_loop_slot(name, block, for_parse),
            IRSlotDynamic::Conditional {
                condition,
                positive,
                negative,
            } => {
                let mut frag = self.gen_expression(condition);
                frag.extend([CodeFragment::IndentStart, CodeFragment::Newline, "? ".into()]);
                frag.extend(self.gen_dynamic_slot(positive, false));
                frag.extend([CodeFragment::Newline, ": ".into()]);
                match negative {
                    Some(negative) => frag.extend(self.gen_dynamic_slot(negative, false)),
                    None => frag.push("void 0".into()),
                }
                frag.push(CodeFragment::IndentEnd);
                frag
            }
        };
        if !with_function {
            return frag;
        }
        let mut wrapped = vec!["() => (".into()];
        wrapped.extend(frag);
        wrapped.push(")".into());
        wrapped
    }

    fn gen_basic_dynamic_slot(
        &mut self,
        name: &SimpleExpressionNode,
        block: &'a SlotBlockIRNode,
    ) -> Fragments {
        let mut name_frag = vec!["name: ".into()];
        name_frag.extend(self.gen_expression(name));
        let mut fn_frag = vec!["fn: ".into()];
        fn_frag.extend(self.gen_slot_block_with_props(block));
        gen_multi(Delimiters::ObjectNewline, vec![Some(name_frag), Some(fn_frag)])
    }

    /// `_createForSlots(source, (item) => ({ name, fn }))`
    fn gen_loop_slot(
        &mut self,
        name: &SimpleExpressionNode,
        block: &'a SlotBlockIRNode,
        for_parse: &ForParseResult,
    ) -> Fragments {
        let source = self.gen_expression(&for_parse.source);

        let locals = loop_bound_names(
            for_parse.value.as_ref(),
            for_parse.key.as_ref(),
            for_parse.index.as_ref(),
        );
        let shadowed = self.push_ids(locals.into_iter().map(|name| (name, None)).collect());
        let slot = self.gen_basic_dynamic_slot(name, block);
        self.pop_ids(shadowed);

        let alias = |exp: &Option<SimpleExpressionNode>| {
            exp.as_ref().map(|exp| exp.content.trim().to_owned())
        };
        let (value, key, index) = (
            alias(&for_parse.value),
            alias(&for_parse.key),
            alias(&for_parse.index),
        );
        let mut callback = gen_for_params(value.as_deref(), key.as_deref(), index.as_deref());
        callback.push(" => (".into());
        callback.extend(slot);
        callback.push(")".into());

        gen_call(self.helper("createForSlots"), vec![Some(source), Some(callback)])
    }

    /// Slot function; destructured slot props are read from `_slotPropsN`.
    fn gen_slot_block_with_props(&mut self, slot: &'a SlotBlockIRNode) -> Fragments {
        let mut ids: Vec<(String, Option<String>)> = Vec::new();
        let mut param = None;
        let mut scoped = false;

        if let Some(props) = &slot.props {
            let raw = props.content.trim();
            if is_simple_identifier(raw) {
                ids.push((raw.into(), None));
                param = Some(raw.to_owned());
            } else if !raw.is_empty() {
                let depth = self.enter_scope();
                scoped = true;
                let name = format!("_slotProps{depth}");
                for binding in destructure_bindings(raw) {
                    let access = format!("{name}[{}]", to_json(binding.name.as_str()));
                    ids.push((binding.name.as_str().into(), Some(access.as_str().into())));
                }
                param = Some(name);
            }
        }

        let pushed = self.push_ids(ids);
        let args: Vec<&str> = param.as_deref().into_iter().collect();
        let frag = self.gen_block(&slot.block, &args);
        self.pop_ids(pushed);
        if scoped {
            self.exit_scope();
        }
        frag
    }
}

#[cfg(test)]
mod tests {
    use vize_relief::{parse, Bump};

    use crate::generate::generate;
    use crate::options::CompilerOptions;
    use crate::transform::transform;

    fn code(source: &str) -> std::string::String {
        let bump = Bump::new();
        let (root, _) = parse(&bump, source);
        let root = bump.alloc(root);
        let options = CompilerOptions::default();
        let (ir, _) = transform(root, options.clone());
        generate(&ir, &options).code
    }

    #[test]
    fn test_component_props_are_getters() {
        let code = code("<Comp foo={bar} title=\"hi\" />");
        assert!(code.contains("_createComponent(Comp, {"), "{code}");
        assert!(code.contains("foo: () => (bar)"), "{code}");
        assert!(code.contains(r#"title: () => ("hi")"#), "{code}");
    }

    #[test]
    fn test_component_spread_and_handler() {
        let code = code("<Comp {...rest} onClick={go} />");
        assert!(code.contains("$: ["), "{code}");
        assert!(code.contains("() => (rest)"), "{code}");
        assert!(code.contains("onClick: () => go"), "{code}");
    }

    #[test]
    fn test_component_model() {
        let code = code("<Comp v-model={msg} />");
        assert!(code.contains("modelValue: () => (msg)"), "{code}");
        assert!(code.contains(r#""onUpdate:modelValue": () => _value => (msg = _value)"#), "{code}");
    }

    #[test]
    fn test_default_slot() {
        let code = code("<Comp><span>hi</span></Comp>");
        assert!(code.contains(r#""default": () => {"#), "{code}");
        assert!(code.contains("return n"), "{code}");
    }

    #[test]
    fn test_scoped_slot_props() {
        let code = code("<Comp v-slot={{ item }}>{item}</Comp>");
        assert!(code.contains(r#"(_slotProps0) => {"#), "{code}");
        assert!(code.contains(r#"_slotProps0["item"]"#), "{code}");
    }
}
