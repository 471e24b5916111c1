//! Blocks, node creation and template navigation.

use super::fragment::{arg, gen_call, gen_multi, CodeFragment, Delimiters, Fragments};
use super::CodegenContext;
use crate::ir::{BlockIRNode, DynamicFlag, IRDynamicInfo, IREffect};

impl<'a> CodegenContext<'a> {
    /// `(args) => { ... }`
    pub fn gen_block(&mut self, block: &'a BlockIRNode, args: &[&str]) -> Fragments {
        let mut frag = vec![format!("({}) => {{", args.join(", ")).into(), CodeFragment::IndentStart];
        frag.extend(self.gen_block_content(block, false));
        frag.extend([CodeFragment::IndentEnd, CodeFragment::Newline, "}".into()]);
        frag
    }

    pub fn gen_block_content(&mut self, block: &'a BlockIRNode, root: bool) -> Fragments {
        let effects: Vec<&'a IREffect> = block.effect.iter().collect();
        self.gen_block_body(block, root, &effects, |_| Vec::new())
    }

    /// Block body with an explicit effect list and trailing fragments.
    pub fn gen_block_body(
        &mut self,
        block: &'a BlockIRNode,
        root: bool,
        effects: &[&'a IREffect],
        extra: impl FnOnce(&mut Self) -> Fragments,
    ) -> Fragments {
        self.enter_block(block);
        let mut frag = Vec::new();

        if root && self.ir.has_template_ref {
            frag.push(CodeFragment::Newline);
            frag.push(
                format!(
                    "const _setTemplateRef = {}()",
                    self.helper("createTemplateRefSetter")
                )
                .into(),
            );
        }

        for child in &block.dynamic.children {
            frag.extend(self.gen_self(child));
        }
        for child in &block.dynamic.children {
            if let Some(id) = child.id {
                let deferred = self.gen_children(child, &format!("n{id}"), &mut frag);
                frag.extend(deferred);
            }
        }

        for operation in &block.operation {
            frag.extend(self.gen_operation_with_insertion_state(operation));
        }
        frag.extend(self.gen_effects(effects));
        frag.extend(extra(self));

        frag.push(CodeFragment::Newline);
        frag.push("return ".into());
        match block.returns.as_slice() {
            [] => frag.push("null".into()),
            [id] => frag.push(format!("n{id}").into()),
            ids => frag.extend(gen_multi(
                Delimiters::Array,
                ids.iter().map(|id| arg(format!("n{id}"))).collect(),
            )),
        }

        self.exit_block();
        frag
    }

    /// Create the node from its template, then run its own operation.
    fn gen_self(&mut self, dynamic: &'a IRDynamicInfo) -> Fragments {
        let mut frag = Vec::new();
        if let (Some(id), Some(template)) = (dynamic.id, dynamic.template) {
            frag.push(CodeFragment::Newline);
            frag.push(format!("const n{id} = t{template}()").into());
            frag.extend(self.gen_directives_for_element(id));
        }
        if let Some(operation) = dynamic.operation.as_deref() {
            frag.extend(self.gen_operation_with_insertion_state(operation));
        }
        frag
    }

    /// A node that is not part of its parent's markup: created from its own
    /// template, with navigation into it emitted right after.
    fn gen_detached(&mut self, dynamic: &'a IRDynamicInfo) -> Fragments {
        let mut frag = self.gen_self(dynamic);
        if let (Some(id), true) = (dynamic.id, dynamic.has_dynamic_child) {
            let deferred = self.gen_children(dynamic, &format!("n{id}"), &mut frag);
            frag.extend(deferred);
        }
        frag
    }

    /// Navigation to referenced descendants of `dynamic`.
    ///
    /// Navigation statements go straight into `nav`; node creation and
    /// directives that depend on them are returned, to follow all navigation.
    fn gen_children(
        &mut self,
        dynamic: &'a IRDynamicInfo,
        from: &str,
        nav: &mut Fragments,
    ) -> Fragments {
        let mut frag = Vec::new();
        let mut offset: isize = 0;
        let mut prev: Option<(std::string::String, isize)> = None;
        let mut pending = Vec::new();

        for (index, child) in dynamic.children.iter().enumerate() {
            if child.flags.contains(DynamicFlag::NON_TEMPLATE) {
                offset -= 1;
            }
            let detached = child.template.is_some() && child.flags.contains(DynamicFlag::INSERT);
            let id = if !child.flags.contains(DynamicFlag::REFERENCED) {
                None
            } else if child.flags.contains(DynamicFlag::INSERT) {
                child.anchor
            } else {
                child.id
            };

            if id.is_none() && (detached || !child.has_dynamic_child) {
                if detached {
                    frag.extend(self.gen_detached(child));
                } else {
                    frag.extend(self.gen_self(child));
                }
                continue;
            }

            let element_index = index as isize + offset;
            let variable = match id {
                Some(id) => format!("n{id}"),
                None => format!("p{}", self.next_temp_id()),
            };
            nav.push(CodeFragment::Newline);
            nav.push(format!("const {variable} = ").into());
            let navigation = match &prev {
                Some((prev_var, prev_index)) if element_index - prev_index == 1 => {
                    gen_call(self.helper("next"), vec![arg(prev_var.clone())])
                }
                None if element_index == 0 => {
                    gen_call(self.helper("child"), vec![arg(from.to_owned())])
                }
                None if element_index == 1 => {
                    let first = gen_call(self.helper("child"), vec![arg(from.to_owned())]);
                    gen_call(self.helper("next"), vec![Some(first)])
                }
                _ => gen_call(
                    self.helper("nthChild"),
                    vec![arg(from.to_owned()), arg(element_index.to_string())],
                ),
            };
            nav.extend(navigation);

            if id == child.anchor {
                if detached {
                    frag.extend(self.gen_detached(child));
                } else {
                    frag.extend(self.gen_self(child));
                }
            }
            if let Some(id) = id {
                frag.extend(self.gen_directives_for_element(id));
            }

            prev = Some((variable.clone(), element_index));
            if !detached {
                pending.push((child, variable));
            }
        }

        for (child, variable) in pending {
            let deferred = self.gen_children(child, &variable, nav);
            frag.extend(deferred);
        }
        frag
    }

    /// `_renderEffect(() => ...)` around the effect operations.
    pub fn gen_effects(&mut self, effects: &[&'a IREffect]) -> Fragments {
        let mut body = Vec::new();
        for effect in effects {
            for operation in &effect.operations {
                body.extend(self.gen_operation_with_insertion_state(operation));
            }
        }
        if body.is_empty() {
            return body;
        }

        let render_effect = self.helper("renderEffect");
        let newlines = body
            .iter()
            .filter(|f| matches!(f, CodeFragment::Newline))
            .count();
        let mut frag = vec![CodeFragment::Newline, format!("{render_effect}(() => ").into()];
        if newlines > 1 {
            frag.extend(["{".into(), CodeFragment::IndentStart]);
            frag.extend(body);
            frag.extend([CodeFragment::IndentEnd, CodeFragment::Newline, "})".into()]);
        } else {
            frag.extend(
                body.into_iter()
                    .filter(|f| !matches!(f, CodeFragment::Newline)),
            );
            frag.push(")".into());
        }
        frag
    }
}
