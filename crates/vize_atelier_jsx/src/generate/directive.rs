//! `v-show`, `v-model` on elements, and custom directives.

use vize_carton::is_simple_identifier;
use vize_relief::SimpleExpressionNode;

use super::fragment::{
    arg, gen_call, gen_multi, gen_multi_with_placeholder, to_json, CodeFragment, Delimiters,
    Fragments,
};
use super::CodegenContext;
use crate::ir::{DirectiveIRNode, ModelType, OperationNode};

/// `trim: true, lazy: true`
pub(super) fn gen_directive_modifiers(modifiers: &[impl AsRef<str>]) -> std::string::String {
    modifiers
        .iter()
        .map(|modifier| {
            let modifier = modifier.as_ref();
            if is_simple_identifier(modifier) {
                format!("{modifier}: true")
            } else {
                format!("{}: true", to_json(modifier))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl<'a> CodegenContext<'a> {
    pub(super) fn gen_builtin_directive(&mut self, op: &DirectiveIRNode) -> Fragments {
        if !op.builtin {
            // emitted with the element it belongs to
            return Vec::new();
        }
        match op.name.as_str() {
            "show" => self.gen_v_show(op),
            "model" => self.gen_v_model(op),
            _ => Vec::new(),
        }
    }

    fn gen_v_show(&mut self, op: &DirectiveIRNode) -> Fragments {
        let Some(exp) = op.dir.exp.as_ref() else {
            return Vec::new();
        };
        let mut getter = vec!["() => (".into()];
        getter.extend(self.gen_expression(exp));
        getter.push(")".into());
        let mut frag = vec![CodeFragment::Newline];
        frag.extend(gen_call(
            self.helper("applyVShow"),
            vec![arg(format!("n{}", op.element)), Some(getter)],
        ));
        frag
    }

    fn gen_v_model(&mut self, op: &DirectiveIRNode) -> Fragments {
        let Some(exp) = op.dir.exp.as_ref() else {
            return Vec::new();
        };
        let helper = match op.model_type.unwrap_or(ModelType::Text) {
            ModelType::Text => "applyTextModel",
            ModelType::Radio => "applyRadioModel",
            ModelType::Checkbox => "applyCheckboxModel",
            ModelType::Select => "applySelectModel",
            ModelType::Dynamic => "applyDynamicModel",
        };
        let mut getter = vec!["() => (".into()];
        getter.extend(self.gen_expression(exp));
        getter.push(")".into());
        let modifiers = (!op.dir.modifiers.is_empty())
            .then(|| arg(format!("{{ {} }}", gen_directive_modifiers(&op.dir.modifiers))))
            .flatten();

        let mut frag = vec![CodeFragment::Newline];
        frag.extend(gen_call(
            self.helper(helper),
            vec![
                arg(format!("n{}", op.element)),
                Some(getter),
                Some(self.gen_model_handler(exp)),
                modifiers,
            ],
        ));
        frag
    }

    /// `_value => (exp = _value)`
    pub(super) fn gen_model_handler(&self, exp: &SimpleExpressionNode) -> Fragments {
        let mut frag = vec!["_value => (".into()];
        frag.extend(self.gen_assignment(exp, "_value"));
        frag.push(")".into());
        frag
    }

    /// `_withVaporDirectives(nN, [...])` for the element's custom directives.
    pub(super) fn gen_directives_for_element(&mut self, id: usize) -> Fragments {
        let Some(block) = self.current_block() else {
            return Vec::new();
        };
        let directives: Vec<&'a DirectiveIRNode> = block
            .operation
            .iter()
            .filter_map(|op| match op {
                OperationNode::Directive(dir) if !dir.builtin && dir.element == id => Some(dir),
                _ => None,
            })
            .collect();
        if directives.is_empty() {
            return Vec::new();
        }

        let items = directives
            .into_iter()
            .map(|dir| {
                let name = self.gen_expression(&SimpleExpressionNode::dynamic(dir.name.as_str()));
                let value = dir.dir.exp.as_ref().map(|exp| {
                    let mut frag = vec!["() => ".into()];
                    frag.extend(self.gen_expression(exp));
                    frag
                });
                let argument = dir.dir.arg.as_ref().map(|arg| self.gen_expression(arg));
                let modifiers = (!dir.dir.modifiers.is_empty()).then(|| {
                    vec![format!("{{ {} }}", gen_directive_modifiers(&dir.dir.modifiers)).into()]
                });
                Some(gen_multi_with_placeholder(
                    Delimiters::Array,
                    "void 0",
                    vec![Some(name), value, argument, modifiers],
                ))
            })
            .collect();

        let mut frag = vec![CodeFragment::Newline];
        frag.extend(gen_call(
            self.helper("withVaporDirectives"),
            vec![arg(format!("n{id}")), Some(gen_multi(Delimiters::Array, items))],
        ));
        frag
    }
}

#[cfg(test)]
mod tests {
    use super::gen_directive_modifiers;

    #[test]
    fn test_directive_modifiers() {
        assert_eq!(gen_directive_modifiers(&["trim", "lazy"]), "trim: true, lazy: true");
        assert_eq!(gen_directive_modifiers(&["a-b"]), r#""a-b": true"#);
    }
}
