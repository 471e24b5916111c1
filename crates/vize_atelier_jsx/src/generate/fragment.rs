//! Code fragments.
//!
//! Generators return flat lists of fragments instead of strings so that
//! indentation is applied once, at the end, and so that fragments produced
//! from source expressions can carry their location into the source map.

use std::borrow::Cow;

use serde::Serialize;
use vize_carton::String;
use vize_relief::SourceLocation;

use super::source_map::SourceMapGenerator;

#[derive(Debug, Clone)]
pub enum CodeFragment {
    /// Line break followed by the current indentation
    Newline,
    IndentStart,
    IndentEnd,
    Code(Cow<'static, str>),
    /// Code produced from a source range
    Mapped {
        code: std::string::String,
        loc: SourceLocation,
        /// Original identifier, recorded in the source map `names`
        name: Option<String>,
    },
}

impl From<&'static str> for CodeFragment {
    fn from(code: &'static str) -> Self {
        Self::Code(Cow::Borrowed(code))
    }
}

impl From<std::string::String> for CodeFragment {
    fn from(code: std::string::String) -> Self {
        Self::Code(Cow::Owned(code))
    }
}

pub type Fragments = Vec<CodeFragment>;

/// Single-fragment argument for [`gen_call`] and [`gen_multi`].
pub fn arg(code: impl Into<CodeFragment>) -> Option<Fragments> {
    Some(vec![code.into()])
}

/// Opening, closing and separating fragments of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiters {
    Args,
    Array,
    Object,
    ArrayNewline,
    ObjectNewline,
}

impl Delimiters {
    fn left(self) -> Fragments {
        match self {
            Self::Args => vec!["(".into()],
            Self::Array => vec!["[".into()],
            Self::Object => vec!["{ ".into()],
            Self::ArrayNewline => vec!["[".into(), CodeFragment::IndentStart, CodeFragment::Newline],
            Self::ObjectNewline => vec!["{".into(), CodeFragment::IndentStart, CodeFragment::Newline],
        }
    }

    fn right(self) -> Fragments {
        match self {
            Self::Args => vec![")".into()],
            Self::Array => vec!["]".into()],
            Self::Object => vec![" }".into()],
            Self::ArrayNewline => vec![CodeFragment::IndentEnd, CodeFragment::Newline, "]".into()],
            Self::ObjectNewline => vec![CodeFragment::IndentEnd, CodeFragment::Newline, "}".into()],
        }
    }

    fn separator(self) -> Fragments {
        match self {
            Self::Args | Self::Array | Self::Object => vec![", ".into()],
            Self::ArrayNewline | Self::ObjectNewline => vec![",".into(), CodeFragment::Newline],
        }
    }
}

fn join(delimiters: Delimiters, items: impl IntoIterator<Item = Fragments>) -> Fragments {
    let mut frag = delimiters.left();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            frag.extend(delimiters.separator());
        }
        frag.extend(item);
    }
    frag.extend(delimiters.right());
    frag
}

/// List of the present items.
pub fn gen_multi(delimiters: Delimiters, items: Vec<Option<Fragments>>) -> Fragments {
    join(delimiters, items.into_iter().flatten())
}

/// List where trailing missing items are dropped and inner ones replaced.
pub fn gen_multi_with_placeholder(
    delimiters: Delimiters,
    placeholder: &'static str,
    mut items: Vec<Option<Fragments>>,
) -> Fragments {
    while matches!(items.last(), Some(None)) {
        items.pop();
    }
    join(
        delimiters,
        items
            .into_iter()
            .map(|item| item.unwrap_or_else(|| vec![placeholder.into()])),
    )
}

/// `name(a, b)`, with `null` standing in for skipped arguments.
pub fn gen_call(name: impl Into<CodeFragment>, args: Vec<Option<Fragments>>) -> Fragments {
    gen_call_with_placeholder(name, "null", args)
}

pub fn gen_call_with_placeholder(
    name: impl Into<CodeFragment>,
    placeholder: &'static str,
    args: Vec<Option<Fragments>>,
) -> Fragments {
    let mut frag = vec![name.into()];
    frag.extend(gen_multi_with_placeholder(Delimiters::Args, placeholder, args));
    frag
}

/// `(value, key, index)` parameters of a loop callback; skipped leading
/// aliases become `_` and `__`.
pub fn gen_for_params(value: Option<&str>, key: Option<&str>, index: Option<&str>) -> Fragments {
    let value = value.or((key.is_some() || index.is_some()).then_some("_"));
    let key = key.or(index.is_some().then_some("__"));
    gen_multi(
        Delimiters::Args,
        [value, key, index]
            .into_iter()
            .map(|alias| alias.map(|alias| vec![alias.to_owned().into()]))
            .collect(),
    )
}

/// JSON literal of a serializable value.
pub fn to_json(value: &(impl Serialize + ?Sized)) -> std::string::String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Generated-code cursor, zero-based.
#[derive(Debug, Default, Clone, Copy)]
struct Cursor {
    line: u32,
    column: u32,
}

impl Cursor {
    fn advance(&mut self, code: &str) {
        match code.rfind('\n') {
            Some(last) => {
                self.line += code.matches('\n').count() as u32;
                self.column = code[last + 1..].encode_utf16().count() as u32;
            }
            None => self.column += code.encode_utf16().count() as u32,
        }
    }
}

/// Render fragments to text, recording mappings when a generator is given.
pub fn fragments_to_string(
    fragments: &[CodeFragment],
    mut map: Option<&mut SourceMapGenerator>,
) -> std::string::String {
    let mut code = std::string::String::with_capacity(fragments.len() * 8);
    let mut cursor = Cursor::default();
    let mut indent = 0usize;

    for fragment in fragments {
        match fragment {
            CodeFragment::IndentStart => indent += 1,
            CodeFragment::IndentEnd => indent = indent.saturating_sub(1),
            CodeFragment::Newline => {
                code.push('\n');
                for _ in 0..indent {
                    code.push_str("  ");
                }
                cursor.line += 1;
                cursor.column = indent as u32 * 2;
            }
            CodeFragment::Code(text) => {
                code.push_str(text);
                cursor.advance(text);
            }
            CodeFragment::Mapped {
                code: text,
                loc,
                name,
            } => {
                let mapped = !loc.is_stub();
                if let Some(map) = map.as_deref_mut().filter(|_| mapped) {
                    map.add_mapping(cursor.line, cursor.column, loc.start, name.as_deref());
                }
                code.push_str(text);
                cursor.advance(text);
                if let Some(map) = map.as_deref_mut().filter(|_| mapped) {
                    map.add_mapping(cursor.line, cursor.column, loc.end, None);
                }
            }
        }
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(fragments: &[CodeFragment]) -> std::string::String {
        fragments_to_string(fragments, None)
    }

    #[test]
    fn test_gen_call_placeholders() {
        let call = gen_call("_f", vec![arg("a"), None, arg("c"), None]);
        assert_eq!(render(&call), "_f(a, null, c)");

        let call = gen_call_with_placeholder("_g", "undefined", vec![arg("a"), None, arg("c")]);
        assert_eq!(render(&call), "_g(a, undefined, c)");
    }

    #[test]
    fn test_gen_multi_newline() {
        let mut frag = vec!["x = ".into()];
        frag.extend(gen_multi(
            Delimiters::ObjectNewline,
            vec![arg("a: 1"), None, arg("b: 2")],
        ));
        assert_eq!(render(&frag), "x = {\n  a: 1,\n  b: 2\n}");
    }

    #[test]
    fn test_for_params() {
        assert_eq!(render(&gen_for_params(Some("item"), None, None)), "(item)");
        assert_eq!(render(&gen_for_params(None, None, Some("i"))), "(_, __, i)");
        assert_eq!(render(&gen_for_params(Some("v"), Some("k"), None)), "(v, k)");
    }
}
