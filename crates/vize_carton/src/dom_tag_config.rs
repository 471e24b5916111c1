//! DOM tag and event configuration tables.

use phf::phf_set;

static SVG_TAGS: phf::Set<&'static str> = phf_set! {
    "svg", "animate", "animateMotion", "animateTransform", "circle", "clipPath",
    "color-profile", "defs", "desc", "discard", "ellipse", "feBlend", "feColorMatrix",
    "feComponentTransfer", "feComposite", "feConvolveMatrix", "feDiffuseLighting",
    "feDisplacementMap", "feDistantLight", "feDropShadow", "feFlood", "feFuncA", "feFuncB",
    "feFuncG", "feFuncR", "feGaussianBlur", "feImage", "feMerge", "feMergeNode",
    "feMorphology", "feOffset", "fePointLight", "feSpecularLighting", "feSpotLight",
    "feTile", "feTurbulence", "filter", "foreignObject", "g", "hatch", "hatchpath", "image",
    "line", "linearGradient", "marker", "mask", "mesh", "meshgradient", "meshpatch",
    "meshrow", "metadata", "mpath", "path", "pattern", "polygon", "polyline",
    "radialGradient", "rect", "set", "solidcolor", "stop", "switch", "symbol", "text",
    "textPath", "tspan", "unknown", "use", "view",
};

static VOID_TAGS: phf::Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
};

/// Events the runtime dispatches through a single root listener.
static DELEGATED_EVENTS: phf::Set<&'static str> = phf_set! {
    "beforeinput", "click", "dblclick", "contextmenu", "focusin", "focusout", "input",
    "keydown", "keyup", "mousedown", "mousemove", "mouseout", "mouseover", "mouseup",
    "pointerdown", "pointermove", "pointerout", "pointerover", "pointerup", "touchend",
    "touchmove", "touchstart",
};

static KEYBOARD_EVENTS: phf::Set<&'static str> = phf_set! {
    "keyup", "keydown", "keypress",
};

/// Elements whose children may only be of a fixed set of tags.
static ONLY_VALID_CHILDREN: phf::Map<&'static str, &'static [&'static str]> = phf::phf_map! {
    "head" => &["base", "basefront", "bgsound", "link", "meta", "title", "noscript",
        "noframes", "style", "script", "template"],
    "optgroup" => &["option"],
    "select" => &["optgroup", "option", "hr"],
    "table" => &["caption", "colgroup", "tbody", "tfoot", "thead"],
    "tr" => &["td", "th"],
    "colgroup" => &["col"],
    "tbody" => &["tr"],
    "thead" => &["tr"],
    "tfoot" => &["tr"],
    "script" => &[],
    "iframe" => &[],
    "option" => &[],
    "textarea" => &[],
    "style" => &[],
    "title" => &[],
};

/// Tags that may not contain each other at any depth.
static KNOWN_INVALID_CHILDREN: phf::Map<&'static str, &'static [&'static str]> = phf::phf_map! {
    "p" => &["address", "article", "aside", "blockquote", "center", "details", "dialog",
        "dir", "div", "dl", "fieldset", "figure", "footer", "form", "h1", "h2", "h3", "h4",
        "h5", "h6", "header", "hgroup", "hr", "li", "main", "nav", "menu", "ol", "p", "pre",
        "section", "table", "ul"],
    "svg" => &["b", "blockquote", "br", "code", "dd", "div", "dl", "dt", "em", "embed",
        "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "li", "menu", "meta", "ol",
        "p", "pre", "ruby", "s", "small", "span", "strong", "sub", "sup", "table", "u",
        "ul", "var"],
};

static ANCESTOR_INVALID_TAGS: phf::Set<&'static str> = phf_set! {
    "a", "button", "form", "label", "dfn", "li", "dd", "dt",
};

#[inline]
pub fn is_svg_tag(tag: &str) -> bool {
    SVG_TAGS.contains(tag)
}

#[inline]
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(tag)
}

#[inline]
pub fn is_delegated_event(event: &str) -> bool {
    DELEGATED_EVENTS.contains(event)
}

/// Whether `on<event>` is a keyboard event (case-insensitive).
pub fn is_keyboard_event(event: &str) -> bool {
    KEYBOARD_EVENTS.contains(event.to_ascii_lowercase().as_str())
}

/// Tags on which `value` can be assigned directly as a DOM property.
pub fn can_set_value_directly(tag: &str) -> bool {
    !matches!(tag, "progress" | "meter") && !tag.contains('-')
}

/// Keys that must always be set as attributes even though a DOM property exists.
pub fn should_set_as_attr(tag: &str, key: &str) -> bool {
    match key {
        "spellcheck" | "draggable" | "translate" | "autocorrect" => true,
        "form" => true,
        "list" => tag == "input",
        "type" => tag == "textarea",
        "width" | "height" => matches!(tag, "img" | "video" | "canvas" | "source"),
        _ => false,
    }
}

/// Whether `child` may be nested directly inside `parent` per the HTML content model.
pub fn is_valid_html_nesting(parent: &str, child: &str) -> bool {
    if let Some(valid) = ONLY_VALID_CHILDREN.get(parent) {
        return valid.contains(&child);
    }
    if let Some(invalid) = KNOWN_INVALID_CHILDREN.get(parent) {
        if invalid.contains(&child) {
            return false;
        }
    }
    if ANCESTOR_INVALID_TAGS.contains(child) && parent == child {
        return false;
    }
    !matches!(
        (parent, child),
        ("a", "a") | ("form", "form") | ("button", "button")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_tables() {
        assert!(is_svg_tag("circle"));
        assert!(!is_svg_tag("div"));
        assert!(is_void_tag("input"));
        assert!(!is_void_tag("div"));
    }

    #[test]
    fn test_events() {
        assert!(is_delegated_event("click"));
        assert!(!is_delegated_event("scroll"));
        assert!(is_keyboard_event("keyDown"));
        assert!(!is_keyboard_event("click"));
    }

    #[test]
    fn test_nesting() {
        assert!(is_valid_html_nesting("div", "p"));
        assert!(!is_valid_html_nesting("p", "div"));
        assert!(!is_valid_html_nesting("tr", "div"));
        assert!(is_valid_html_nesting("tr", "td"));
        assert!(!is_valid_html_nesting("a", "a"));
    }
}
