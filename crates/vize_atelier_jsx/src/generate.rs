//! Vapor IR to JavaScript.
//!
//! The output is split in two parts. `preamble` holds the module-level
//! statements (helper imports, template factories, event delegation) and
//! `code` is a self-invoking render function producing the nodes:
//!
//! ```text
//! import { template as _template, ... } from 'vue';
//! const t0 = _template("<div> </div>", true)
//! _delegateEvents("click")
//!
//! (() => {
//!   const n0 = t0()
//!   ...
//!   return n0
//! })()
//! ```

mod block;
mod component;
mod context;
mod directive;
mod event;
mod expression;
mod fragment;
mod operation;
mod prop;
mod source_map;
mod v_for;
mod v_if;

pub use context::CodegenContext;
pub use fragment::{CodeFragment, Fragments};
pub use source_map::SourceMap;

use std::fmt::Write as _;

use vize_carton::String;

use crate::ir::RootIRNode;
use crate::options::CompilerOptions;
use fragment::{fragments_to_string, to_json};
use source_map::SourceMapGenerator;

/// Generated code for one template.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub code: std::string::String,
    pub preamble: std::string::String,
    /// Runtime helpers in first-use order
    pub helpers: Vec<String>,
    /// Delegated event names, sorted
    pub delegated_events: Vec<String>,
    pub source_map: Option<SourceMap>,
}

pub fn generate(ir: &RootIRNode, options: &CompilerOptions) -> GenerateResult {
    let _span = tracing::debug_span!("generate", filename = %options.filename).entered();
    let mut ctx = CodegenContext::new(ir, options);

    let mut frag: Fragments = vec!["(() => {".into(), CodeFragment::IndentStart];
    frag.extend(ctx.gen_block_content(&ir.block, true));
    frag.extend([CodeFragment::IndentEnd, CodeFragment::Newline, "})()".into()]);

    let mut map = options
        .source_map
        .then(|| SourceMapGenerator::new(&options.filename, &ir.source));
    let code = fragments_to_string(&frag, map.as_mut());

    let delegated_events = ctx.delegates();
    let mut module_code = std::string::String::new();
    for (index, template) in ir.templates.iter().enumerate() {
        let helper = ctx.helper("template");
        let root = if ir.root_template_indexes.contains(&index) {
            ", true"
        } else {
            ""
        };
        let _ = writeln!(module_code, "const t{index} = {helper}({}{root})", to_json(template));
    }
    for event in &delegated_events {
        let helper = ctx.helper("delegateEvents");
        let _ = writeln!(module_code, "{helper}({})", to_json(event.as_str()));
    }

    let helpers: Vec<String> = ctx.helpers().iter().map(|name| String::from(*name)).collect();
    let mut preamble = std::string::String::new();
    if !helpers.is_empty() {
        let imports = helpers
            .iter()
            .map(|name| format!("{name} as _{name}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            preamble,
            "import {{ {imports} }} from '{}';",
            options.runtime_module_name
        );
    }
    preamble.push_str(&module_code);

    tracing::debug!(
        "generated {} bytes, {} helpers, {} delegated events",
        code.len(),
        helpers.len(),
        delegated_events.len()
    );

    GenerateResult {
        code,
        preamble,
        helpers,
        delegated_events,
        source_map: map.map(SourceMapGenerator::finish),
    }
}
