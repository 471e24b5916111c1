//! Built-in node and directive transforms.

mod children;
mod element;
mod template_ref;
mod text;
mod v_bind;
mod v_for;
mod v_html;
mod v_if;
mod v_model;
mod v_on;
mod v_once;
mod v_show;
mod v_slot;
mod v_text;

pub use children::transform_children;
pub use element::transform_element;
pub use template_ref::transform_template_ref;
pub use text::transform_text;
pub use v_bind::transform_v_bind;
pub use v_for::transform_v_for;
pub use v_html::transform_v_html;
pub use v_if::transform_v_if;
pub use v_model::transform_v_model;
pub use v_on::transform_v_on;
pub use v_once::transform_v_once;
pub use v_show::transform_v_show;
pub use v_slot::transform_v_slot;
pub use v_text::transform_v_text;

use vize_relief::{ElementNode, PropNode};

use crate::directive::{resolve_directive, DirectiveNode};
use crate::transform::{DirectiveTransform, NodeTransform};

/// Node transforms in execution order, and directive transforms by name.
pub fn get_base_transform_preset() -> (Vec<NodeTransform>, Vec<(&'static str, DirectiveTransform)>) {
    (
        vec![
            transform_v_once as NodeTransform,
            transform_v_if,
            transform_v_for,
            transform_template_ref,
            transform_element,
            transform_text,
            transform_v_slot,
            transform_children,
        ],
        vec![
            ("bind", transform_v_bind as DirectiveTransform),
            ("on", transform_v_on),
            ("model", transform_v_model),
            ("show", transform_v_show),
            ("html", transform_v_html),
            ("text", transform_v_text),
        ],
    )
}

/// First attribute resolving to the directive `name`.
pub(crate) fn find_directive(el: &ElementNode<'_>, name: &str) -> Option<DirectiveNode> {
    let is_component = el.tag_type == vize_relief::ElementType::Component;
    el.props.iter().find_map(|prop| match prop {
        PropNode::Attribute(attr) if attr.name.starts_with("v-") => {
            let dir = resolve_directive(attr, is_component);
            (dir.name == name).then_some(dir)
        }
        _ => None,
    })
}

/// Whether the element carries any of the given `v-` attributes.
pub(crate) fn has_directive(el: &ElementNode<'_>, names: &[&str]) -> bool {
    el.props.iter().any(|prop| match prop {
        PropNode::Attribute(attr) => attr
            .name
            .strip_prefix("v-")
            .is_some_and(|name| names.contains(&name.split('_').next().unwrap_or(name))),
        PropNode::Spread(_) => false,
    })
}

/// `<template v-slot>`; its directives belong to the slot, not to a block.
pub(crate) fn is_template_slot(el: &ElementNode<'_>) -> bool {
    el.tag_type == vize_relief::ElementType::Template && has_directive(el, &["slot"])
}
