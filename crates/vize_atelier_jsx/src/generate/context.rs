//! Code generation context.

use vize_carton::{FxHashMap, FxHashSet, String};

use crate::ir::{BlockIRNode, RootIRNode};
use crate::options::CompilerOptions;

pub struct CodegenContext<'a> {
    pub ir: &'a RootIRNode,
    pub options: &'a CompilerOptions,
    /// Runtime helpers in first-use order
    helpers: Vec<&'static str>,
    delegates: FxHashSet<String>,
    /// Identifier rewrites; `None` shadows an outer rewrite
    identifiers: FxHashMap<String, Vec<Option<String>>>,
    scope_level: usize,
    /// Blocks being generated with their next `pN` id, innermost last
    blocks: Vec<(&'a BlockIRNode, usize)>,
}

impl<'a> CodegenContext<'a> {
    pub fn new(ir: &'a RootIRNode, options: &'a CompilerOptions) -> Self {
        Self {
            ir,
            options,
            helpers: Vec::new(),
            delegates: FxHashSet::default(),
            identifiers: FxHashMap::default(),
            scope_level: 0,
            blocks: Vec::new(),
        }
    }

    /// Register a runtime helper and return its local alias (`_name`).
    pub fn helper(&mut self, name: &'static str) -> std::string::String {
        if !self.helpers.contains(&name) {
            self.helpers.push(name);
        }
        format!("_{name}")
    }

    pub fn helpers(&self) -> &[&'static str] {
        &self.helpers
    }

    pub fn delegate(&mut self, event: &str) {
        self.delegates.insert(String::from(event));
    }

    /// Delegated event names, sorted.
    pub fn delegates(&self) -> Vec<String> {
        let mut events: Vec<String> = self.delegates.iter().cloned().collect();
        events.sort();
        events
    }

    /// Rewrite for an identifier; `Some(None)` when it is shadowed.
    pub fn identifier(&self, name: &str) -> Option<Option<&str>> {
        self.identifiers
            .get(name)
            .and_then(|stack| stack.last())
            .map(|replacement| replacement.as_deref())
    }

    pub fn has_identifiers(&self) -> bool {
        !self.identifiers.is_empty()
    }

    /// Push identifier rewrites; returns the names to pass to [`Self::pop_ids`].
    pub fn push_ids(&mut self, ids: Vec<(String, Option<String>)>) -> Vec<String> {
        let mut names = Vec::with_capacity(ids.len());
        for (name, replacement) in ids {
            self.identifiers
                .entry(name.clone())
                .or_default()
                .push(replacement);
            names.push(name);
        }
        names
    }

    pub fn pop_ids(&mut self, names: Vec<String>) {
        for name in names {
            if let Some(stack) = self.identifiers.get_mut(&name) {
                stack.pop();
                if stack.is_empty() {
                    self.identifiers.remove(&name);
                }
            }
        }
    }

    /// Enter a nested loop or slot scope; returns its depth.
    pub fn enter_scope(&mut self) -> usize {
        let depth = self.scope_level;
        self.scope_level += 1;
        depth
    }

    pub fn exit_scope(&mut self) {
        self.scope_level = self.scope_level.saturating_sub(1);
    }

    pub fn enter_block(&mut self, block: &'a BlockIRNode) {
        self.blocks.push((block, block.temp_id));
    }

    pub fn exit_block(&mut self) {
        self.blocks.pop();
    }

    /// Innermost block being generated.
    pub fn current_block(&self) -> Option<&'a BlockIRNode> {
        self.blocks.last().map(|(block, _)| *block)
    }

    /// Allocate a `pN` navigation variable in the current block.
    pub fn next_temp_id(&mut self) -> usize {
        match self.blocks.last_mut() {
            Some((_, next)) => {
                *next += 1;
                *next - 1
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_keep_first_use_order() {
        let ir = RootIRNode::default();
        let options = CompilerOptions::default();
        let mut ctx = CodegenContext::new(&ir, &options);
        assert_eq!(ctx.helper("template"), "_template");
        ctx.helper("setText");
        ctx.helper("template");
        assert_eq!(ctx.helpers(), &["template", "setText"]);
    }

    #[test]
    fn test_identifier_shadowing() {
        let ir = RootIRNode::default();
        let options = CompilerOptions::default();
        let mut ctx = CodegenContext::new(&ir, &options);
        let outer = ctx.push_ids(vec![("item".into(), Some("_for_item0.value".into()))]);
        let inner = ctx.push_ids(vec![("item".into(), None)]);
        assert_eq!(ctx.identifier("item"), Some(None));
        ctx.pop_ids(inner);
        assert_eq!(ctx.identifier("item"), Some(Some("_for_item0.value")));
        ctx.pop_ids(outer);
        assert_eq!(ctx.identifier("item"), None);
        assert!(!ctx.has_identifiers());
    }
}
