use super::fragment::{gen_call, CodeFragment, Fragments};
use super::CodegenContext;
use crate::ir::{IfIRNode, NegativeBranch};

impl<'a> CodegenContext<'a> {
    /// `const nN = _createIf(() => (cond), () => {...}, () => {...})`
    ///
    /// An `else-if` chain nests as `() => _createIf(...)` in the negative slot.
    pub(super) fn gen_if(&mut self, op: &'a IfIRNode, nested: bool) -> Fragments {
        let mut condition = vec!["() => (".into()];
        condition.extend(self.gen_expression(&op.condition));
        condition.push(")".into());

        let positive = self.gen_block(&op.positive, &[]);
        let negative = op.negative.as_ref().map(|negative| match negative {
            NegativeBranch::Block(block) => self.gen_block(block, &[]),
            NegativeBranch::If(nested_if) => {
                let mut frag = vec!["() => ".into()];
                frag.extend(self.gen_if(nested_if, true));
                frag
            }
        });

        let mut frag = Vec::new();
        if !nested {
            frag.push(CodeFragment::Newline);
            frag.push(format!("const n{} = ", op.id).into());
        }
        frag.extend(gen_call(
            self.helper("createIf"),
            vec![
                Some(condition),
                Some(positive),
                negative,
                op.once.then(|| vec!["true".into()]),
            ],
        ));
        frag
    }
}
