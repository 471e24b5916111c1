//! Operation dispatch and the node-level operations.

use vize_relief::SimpleExpressionNode;

use super::fragment::{arg, gen_call, to_json, CodeFragment, Fragments};
use super::CodegenContext;
use crate::expression::{is_constant_expression, literal_value};
use crate::ir::{
    CreateNodesIRNode, GetTextChildIRNode, InsertNodeIRNode, InsertionAnchor, JsxBlockIRNode,
    OperationNode, SetHtmlIRNode, SetNodesIRNode, SetTemplateRefIRNode, SetTextIRNode,
};

impl<'a> CodegenContext<'a> {
    pub fn gen_operation(&mut self, operation: &'a OperationNode) -> Fragments {
        match operation {
            OperationNode::SetProp(op) => self.gen_set_prop(op),
            OperationNode::SetDynamicProps(op) => self.gen_set_dynamic_props(op),
            OperationNode::SetText(op) => self.gen_set_text(op),
            OperationNode::SetEvent(op) => self.gen_set_event(op),
            OperationNode::SetDynamicEvents(op) => self.gen_set_dynamic_events(op),
            OperationNode::SetHtml(op) => self.gen_set_html(op),
            OperationNode::SetTemplateRef(op) => self.gen_set_template_ref(op),
            OperationNode::InsertNode(op) => self.gen_insert_node(op),
            OperationNode::Directive(op) => self.gen_builtin_directive(op),
            OperationNode::If(op) => self.gen_if(op, false),
            OperationNode::For(op) => self.gen_for(op),
            OperationNode::CreateComponent(op) => self.gen_create_component(op),
            OperationNode::DeclareOldRef(op) => {
                vec![CodeFragment::Newline, format!("let r{}", op.id).into()]
            }
            OperationNode::GetTextChild(op) => self.gen_get_text_child(op),
            OperationNode::CreateNodes(op) => self.gen_create_nodes(op),
            OperationNode::SetNodes(op) => self.gen_set_nodes(op),
        }
    }

    /// Block operations first point the runtime at their insertion target.
    pub fn gen_operation_with_insertion_state(&mut self, operation: &'a OperationNode) -> Fragments {
        let mut frag = Vec::new();
        if let Some((parent, anchor)) = operation.insertion() {
            let anchor = anchor.map(|anchor| match anchor {
                InsertionAnchor::Prepend => "0".to_owned(),
                InsertionAnchor::Node(id) => format!("n{id}"),
            });
            frag.push(CodeFragment::Newline);
            frag.extend(gen_call(
                self.helper("setInsertionState"),
                vec![arg(format!("n{parent}")), anchor.and_then(arg)],
            ));
        }
        frag.extend(self.gen_operation(operation));
        frag
    }

    fn gen_insert_node(&mut self, op: &InsertNodeIRNode) -> Fragments {
        let mut frag = vec![CodeFragment::Newline];
        let parent = format!("n{}", op.parent);
        let call = match op.anchor {
            Some(InsertionAnchor::Prepend) => {
                let mut args = vec![arg(parent)];
                args.extend(op.elements.iter().map(|el| arg(format!("n{el}"))));
                gen_call(self.helper("prepend"), args)
            }
            anchor => {
                let elements = match op.elements.as_slice() {
                    [el] => format!("n{el}"),
                    elements => format!(
                        "[{}]",
                        elements
                            .iter()
                            .map(|el| format!("n{el}"))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                };
                let anchor = match anchor {
                    Some(InsertionAnchor::Node(id)) => arg(format!("n{id}")),
                    _ => None,
                };
                gen_call(self.helper("insert"), vec![arg(elements), arg(parent), anchor])
            }
        };
        frag.extend(call);
        frag
    }

    fn gen_set_template_ref(&mut self, op: &SetTemplateRefIRNode) -> Fragments {
        let mut frag = vec![CodeFragment::Newline];
        if op.effect {
            frag.push(format!("r{} = ", op.element).into());
        }
        let old_ref = if op.effect {
            arg(format!("r{}", op.element))
        } else if op.ref_for {
            arg("void 0")
        } else {
            None
        };
        frag.extend(gen_call(
            "_setTemplateRef",
            vec![
                arg(format!("n{}", op.element)),
                Some(self.gen_expression(&op.value)),
                old_ref,
                op.ref_for.then(|| vec!["true".into()]),
            ],
        ));
        frag
    }

    fn gen_get_text_child(&mut self, op: &GetTextChildIRNode) -> Fragments {
        let child = self.helper("child");
        vec![
            CodeFragment::Newline,
            format!("const x{0} = {child}(n{0})", op.parent).into(),
        ]
    }

    fn gen_set_text(&mut self, op: &SetTextIRNode) -> Fragments {
        let element = format!("{}{}", if op.generated { "x" } else { "n" }, op.element);
        let texts = self.gen_text_values(&op.values);
        let mut frag = vec![CodeFragment::Newline];
        frag.extend(gen_call(self.helper("setText"), vec![arg(element), Some(texts)]));
        frag
    }

    /// Text parts joined with `+`; literals are inlined as strings.
    fn gen_text_values(&mut self, values: &[SimpleExpressionNode]) -> Fragments {
        let mut frag = Vec::new();
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                frag.push(" + ".into());
            }
            match literal_value(value) {
                Some(text) => frag.push(CodeFragment::Mapped {
                    code: to_json(&text),
                    loc: value.loc.clone(),
                    name: None,
                }),
                None => {
                    let exp = self.gen_expression(value);
                    frag.extend(gen_call(self.helper("toDisplayString"), vec![Some(exp)]));
                }
            }
        }
        frag
    }

    fn gen_set_html(&mut self, op: &SetHtmlIRNode) -> Fragments {
        let mut frag = vec![CodeFragment::Newline];
        let value = self.gen_expression(&op.value);
        frag.extend(gen_call(
            self.helper("setHtml"),
            vec![arg(format!("n{}", op.element)), Some(value)],
        ));
        frag
    }

    /// Rendered node values: getters, unless nothing can change.
    fn gen_node_values(
        &mut self,
        values: &[SimpleExpressionNode],
        blocks: &'a [JsxBlockIRNode],
        once: bool,
    ) -> Vec<Option<Fragments>> {
        values
            .iter()
            .map(|value| {
                let exp = self.gen_expression_with_blocks(value, blocks);
                if once || value.is_static || is_constant_expression(value) {
                    return Some(exp);
                }
                let mut frag = vec!["() => (".into()];
                frag.extend(exp);
                frag.push(")".into());
                Some(frag)
            })
            .collect()
    }

    fn gen_create_nodes(&mut self, op: &'a CreateNodesIRNode) -> Fragments {
        let mut frag = vec![CodeFragment::Newline, format!("const n{} = ", op.id).into()];
        let values = self.gen_node_values(&op.values, &op.blocks, op.once);
        frag.extend(gen_call(self.helper("createNodes"), values));
        frag
    }

    fn gen_set_nodes(&mut self, op: &'a SetNodesIRNode) -> Fragments {
        let element = format!("{}{}", if op.generated { "x" } else { "n" }, op.element);
        let mut args = vec![arg(element)];
        args.extend(self.gen_node_values(&op.values, &op.blocks, op.once));
        let mut frag = vec![CodeFragment::Newline];
        frag.extend(gen_call(self.helper("setNodes"), args));
        frag
    }
}
