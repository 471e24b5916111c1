//! `v-once`: render the subtree once, without effects.

use crate::transform::{ExitFn, NodeRef, TransformContext};

use super::has_directive;

pub fn transform_v_once<'a>(ctx: &mut TransformContext<'a>) -> Option<Vec<ExitFn<'a>>> {
    if let Some(NodeRef::Element(el)) = ctx.node() {
        if has_directive(el, &["once"]) {
            ctx.set_in_v_once();
        }
    }
    None
}
