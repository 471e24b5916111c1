//! Expression output with scope rewriting.
//!
//! Loop aliases and slot props are not plain variables in the generated
//! code: `item` inside a `v-for` body becomes `_for_item0.value`. Free
//! identifier references are located with oxc and replaced from the
//! context's identifier map.

use vize_carton::String;
use vize_relief::{SimpleExpressionNode, SourceLocation};

use super::fragment::{to_json, CodeFragment, Fragments};
use super::CodegenContext;
use crate::expression::{collect_identifiers, is_constant_expression, sub_location, IdentifierRef};
use crate::ir::JsxBlockIRNode;

fn mapped(code: impl Into<std::string::String>, loc: SourceLocation) -> CodeFragment {
    CodeFragment::Mapped {
        code: code.into(),
        loc,
        name: None,
    }
}

impl<'a> CodegenContext<'a> {
    pub fn gen_expression(&self, exp: &SimpleExpressionNode) -> Fragments {
        self.gen_expression_with(exp, None)
    }

    /// `exp = value`, for model update handlers.
    pub fn gen_assignment(&self, exp: &SimpleExpressionNode, value: &str) -> Fragments {
        self.gen_expression_with(exp, Some(value))
    }

    fn gen_expression_with(&self, exp: &SimpleExpressionNode, assignment: Option<&str>) -> Fragments {
        if exp.is_static {
            return vec![mapped(to_json(exp.content.as_str()), exp.loc.clone())];
        }

        let content = exp.content.as_str();
        let mut frag = match self.rewrite_identifiers(exp) {
            Some(frag) => frag,
            None => vec![mapped(content, exp.loc.clone())],
        };
        if let Some(value) = assignment {
            frag.push(format!(" = {value}").into());
        }
        frag
    }

    /// Fragments of `exp` with mapped identifiers replaced, or `None` when
    /// nothing needs rewriting.
    fn rewrite_identifiers(&self, exp: &SimpleExpressionNode) -> Option<Fragments> {
        let content = exp.content.as_str();
        if content.trim().is_empty() || !self.has_identifiers() || is_constant_expression(exp) {
            return None;
        }

        let identifiers = collect_identifiers(content)?;
        let mut frag = Vec::new();
        let replaced = self.push_rewritten(exp, &identifiers, 0, content.len(), &mut frag);
        (replaced > 0).then_some(frag)
    }

    /// Append `exp.content[from..to]` with mapped identifiers replaced.
    /// Returns how many were replaced.
    fn push_rewritten(
        &self,
        exp: &SimpleExpressionNode,
        identifiers: &[IdentifierRef],
        from: usize,
        to: usize,
        frag: &mut Fragments,
    ) -> usize {
        let content = exp.content.as_str();
        let mut last = from;
        let mut replaced = 0;
        for id in identifiers {
            let (start, end) = (id.start as usize, id.end as usize);
            if start < from || end > to {
                continue;
            }
            let Some(Some(replacement)) = self.identifier(&id.name) else {
                continue;
            };
            if start > last {
                let text = content.get(last..start).unwrap_or_default();
                frag.push(mapped(text, sub_location(exp, last, start)));
            }
            let code = if id.shorthand {
                format!("{}: {replacement}", id.name)
            } else {
                replacement.to_owned()
            };
            frag.push(CodeFragment::Mapped {
                code,
                loc: sub_location(exp, start, end),
                name: Some(String::from(id.name.as_str())),
            });
            last = end;
            replaced += 1;
        }
        if last < to {
            let text = content.get(last..to).unwrap_or_default();
            frag.push(mapped(text, sub_location(exp, last, to)));
        }
        replaced
    }

    /// Like [`Self::gen_expression`], with the JSX inside `exp` replaced by
    /// immediately invoked render blocks.
    pub fn gen_expression_with_blocks(
        &mut self,
        exp: &SimpleExpressionNode,
        blocks: &'a [JsxBlockIRNode],
    ) -> Fragments {
        let base = exp.loc.start.offset;
        let end = exp.loc.end.offset;
        let nested: Vec<&'a JsxBlockIRNode> = blocks
            .iter()
            .filter(|block| !exp.is_static && block.start >= base && block.end <= end)
            .collect();
        if nested.is_empty() {
            return self.gen_expression(exp);
        }

        let content = exp.content.as_str();
        let identifiers = if self.has_identifiers() {
            collect_identifiers(content).unwrap_or_default()
        } else {
            Vec::new()
        };
        let mut frag = Vec::new();
        let mut last = 0;
        for block in nested {
            let start = (block.start - base) as usize;
            self.push_rewritten(exp, &identifiers, last, start, &mut frag);
            frag.push("(".into());
            frag.extend(self.gen_block(&block.block, &[]));
            frag.push(")()".into());
            last = (block.end - base) as usize;
        }
        self.push_rewritten(exp, &identifiers, last, content.len(), &mut frag);
        frag
    }
}

#[cfg(test)]
mod tests {
    use vize_relief::SimpleExpressionNode;

    use super::super::fragment::fragments_to_string;
    use super::CodegenContext;
    use crate::ir::RootIRNode;
    use crate::options::CompilerOptions;

    fn render(ctx: &CodegenContext<'_>, content: &str) -> std::string::String {
        fragments_to_string(&ctx.gen_expression(&SimpleExpressionNode::dynamic(content)), None)
    }

    #[test]
    fn test_rewrite_loop_alias() {
        let ir = RootIRNode::default();
        let options = CompilerOptions::default();
        let mut ctx = CodegenContext::new(&ir, &options);
        ctx.push_ids(vec![("item".into(), Some("_for_item0.value".into()))]);

        assert_eq!(render(&ctx, "item.name + other"), "_for_item0.value.name + other");
        assert_eq!(render(&ctx, "{ item }"), "{ item: _for_item0.value }");
        assert_eq!(render(&ctx, "(item) => item"), "(item) => item");
        assert_eq!(render(&ctx, "obj.item"), "obj.item");
    }

    #[test]
    fn test_static_and_assignment() {
        let ir = RootIRNode::default();
        let options = CompilerOptions::default();
        let ctx = CodegenContext::new(&ir, &options);
        let frag = ctx.gen_expression(&SimpleExpressionNode::static_str("a\"b"));
        assert_eq!(fragments_to_string(&frag, None), r#""a\"b""#);
        let frag = ctx.gen_assignment(&SimpleExpressionNode::dynamic("msg"), "_value");
        assert_eq!(fragments_to_string(&frag, None), "msg = _value");
    }
}
