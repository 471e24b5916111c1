//! Expression analysis backed by oxc.
//!
//! Expressions live in the IR as plain source text. Whenever the compiler needs
//! to know something about one (is it constant, is it assignable, which free
//! identifiers does it reference) the text is re-parsed with oxc. Parsing a
//! template expression is cheap compared to keeping an arena-bound AST alive
//! across the whole pipeline.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrayExpressionElement, ArrowFunctionExpression, BinaryExpression, BinaryOperator,
    BindingIdentifier, BindingPattern, Expression, Function, IdentifierName, IdentifierReference,
    JSXElement, JSXFragment, ObjectProperty, ObjectPropertyKind, PropertyKey, PropertyKind,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use oxc_syntax::scope::ScopeFlags;
use vize_carton::{is_simple_identifier, FxHashSet};
use vize_relief::{Position, SimpleExpressionNode, SourceLocation};

/// Parse `content` as one expression. Trailing input after a valid prefix,
/// as in `a++; b()`, makes this fail.
fn parse_whole_expression<'a>(allocator: &'a Allocator, content: &'a str) -> Option<Expression<'a>> {
    let expression = Parser::new(allocator, content, SourceType::tsx())
        .parse_expression()
        .ok()?;
    (expression.span().end as usize >= content.trim_end().len()).then_some(expression)
}

/// Parse `content` as a single expression and hand the AST to `f`.
fn parse_with<R>(content: &str, f: impl FnOnce(&Expression<'_>) -> R) -> Option<R> {
    let allocator = Allocator::default();
    parse_whole_expression(&allocator, content).map(|expression| f(&expression))
}

/// Strip parentheses and TypeScript-only wrappers.
fn unwrap_expression<'e, 'a>(expression: &'e Expression<'a>) -> &'e Expression<'a> {
    match expression {
        Expression::ParenthesizedExpression(e) => unwrap_expression(&e.expression),
        Expression::TSAsExpression(e) => unwrap_expression(&e.expression),
        Expression::TSSatisfiesExpression(e) => unwrap_expression(&e.expression),
        Expression::TSNonNullExpression(e) => unwrap_expression(&e.expression),
        Expression::TSTypeAssertion(e) => unwrap_expression(&e.expression),
        other => other,
    }
}

fn is_literal_whitelisted(name: &str) -> bool {
    matches!(name, "true" | "false" | "null" | "this")
}

/// Globals that never need a reactive subscription.
pub fn is_globally_allowed(name: &str) -> bool {
    matches!(
        name,
        "Infinity"
            | "undefined"
            | "NaN"
            | "isFinite"
            | "isNaN"
            | "parseFloat"
            | "parseInt"
            | "decodeURI"
            | "decodeURIComponent"
            | "encodeURI"
            | "encodeURIComponent"
            | "Math"
            | "Number"
            | "Date"
            | "Array"
            | "Object"
            | "Boolean"
            | "String"
            | "RegExp"
            | "Map"
            | "Set"
            | "JSON"
            | "Intl"
            | "BigInt"
            | "console"
            | "Error"
            | "Symbol"
    )
}

fn is_static_node(expression: &Expression<'_>) -> bool {
    match unwrap_expression(expression) {
        Expression::StringLiteral(_)
        | Expression::NumericLiteral(_)
        | Expression::BooleanLiteral(_)
        | Expression::NullLiteral(_)
        | Expression::BigIntLiteral(_) => true,
        Expression::UnaryExpression(e) => is_static_node(&e.argument),
        Expression::BinaryExpression(e) => is_static_node(&e.left) && is_static_node(&e.right),
        Expression::LogicalExpression(e) => is_static_node(&e.left) && is_static_node(&e.right),
        Expression::ConditionalExpression(e) => {
            is_static_node(&e.test) && is_static_node(&e.consequent) && is_static_node(&e.alternate)
        }
        Expression::SequenceExpression(e) => e.expressions.iter().all(is_static_node),
        Expression::TemplateLiteral(e) => e.expressions.iter().all(is_static_node),
        _ => false,
    }
}

fn is_constant_node(expression: &Expression<'_>) -> bool {
    if is_static_node(expression) {
        return true;
    }
    match unwrap_expression(expression) {
        Expression::Identifier(id) => {
            is_globally_allowed(id.name.as_str()) || is_literal_whitelisted(id.name.as_str())
        }
        Expression::RegExpLiteral(_) => true,
        Expression::ObjectExpression(object) => {
            object.properties.iter().all(|property| match property {
                ObjectPropertyKind::ObjectProperty(p) => {
                    p.kind == PropertyKind::Init
                        && !p.method
                        && (!p.computed || p.key.as_expression().is_some_and(is_constant_node))
                        && is_constant_node(&p.value)
                }
                ObjectPropertyKind::SpreadProperty(spread) => is_constant_node(&spread.argument),
            })
        }
        Expression::ArrayExpression(array) => array.elements.iter().all(|element| match element {
            ArrayExpressionElement::SpreadElement(spread) => is_constant_node(&spread.argument),
            ArrayExpressionElement::Elision(_) => true,
            other => other.as_expression().is_some_and(is_constant_node),
        }),
        _ => false,
    }
}

/// Whether evaluating the expression can never require a reactive subscription.
pub fn is_constant_expression(exp: &SimpleExpressionNode) -> bool {
    if exp.is_static {
        return true;
    }
    let content = exp.content.trim();
    if content.is_empty() {
        return false;
    }
    if is_literal_whitelisted(content) || is_globally_allowed(content) {
        return true;
    }
    parse_with(content, is_constant_node).unwrap_or(false)
}

/// The string value of a literal expression, if it is one.
pub fn literal_value(exp: &SimpleExpressionNode) -> Option<String> {
    if exp.is_static {
        return Some(exp.content.to_string());
    }
    parse_with(exp.content.trim(), |expression| {
        match unwrap_expression(expression) {
            Expression::StringLiteral(lit) => Some(lit.value.to_string()),
            Expression::TemplateLiteral(tpl) if tpl.expressions.is_empty() => tpl
                .quasis
                .first()
                .and_then(|quasi| quasi.value.cooked.as_ref())
                .map(|cooked| cooked.to_string()),
            _ => None,
        }
    })
    .flatten()
}

/// Identifier or member expression (an assignable target).
pub fn is_member_expression(content: &str) -> bool {
    let content = content.trim();
    if is_simple_identifier(content) {
        return content != "undefined";
    }
    parse_with(content, |expression| {
        let expression = unwrap_expression(expression);
        matches!(expression, Expression::Identifier(_)) || expression.is_member_expression()
    })
    .unwrap_or(false)
}

/// Arrow function or function expression.
pub fn is_fn_expression(content: &str) -> bool {
    parse_with(content.trim(), |expression| {
        matches!(
            unwrap_expression(expression),
            Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_)
        )
    })
    .unwrap_or(false)
}

#[derive(Default)]
struct JsxFinder {
    found: bool,
}

impl<'a> Visit<'a> for JsxFinder {
    fn visit_jsx_element(&mut self, _it: &JSXElement<'a>) {
        self.found = true;
    }

    fn visit_jsx_fragment(&mut self, _it: &JSXFragment<'a>) {
        self.found = true;
    }
}

/// Whether the expression produces JSX somewhere inside it.
pub fn contains_jsx(content: &str) -> bool {
    if !content.contains('<') {
        return false;
    }
    parse_with(content, |expression| {
        let mut finder = JsxFinder::default();
        finder.visit_expression(expression);
        finder.found
    })
    .unwrap_or(false)
}

// ============================================================================
// Identifier references
// ============================================================================

/// A free identifier reference inside an expression.
///
/// Offsets are byte offsets relative to the start of the expression text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierRef {
    pub name: String,
    pub start: u32,
    pub end: u32,
    /// `{ foo }` object shorthand; rewriting must produce `foo: <replacement>`
    pub shorthand: bool,
}

#[derive(Default)]
struct BindingNames {
    names: FxHashSet<String>,
}

impl<'a> Visit<'a> for BindingNames {
    fn visit_binding_identifier(&mut self, it: &BindingIdentifier<'a>) {
        self.names.insert(it.name.to_string());
    }
}

#[derive(Default)]
struct IdentifierCollector {
    scopes: Vec<FxHashSet<String>>,
    refs: Vec<IdentifierRef>,
}

impl IdentifierCollector {
    fn record(&mut self, id: &IdentifierReference<'_>, shorthand: bool) {
        let name = id.name.as_str();
        if self.scopes.iter().any(|scope| scope.contains(name)) {
            return;
        }
        self.refs.push(IdentifierRef {
            name: name.to_string(),
            start: id.span.start,
            end: id.span.end,
            shorthand,
        });
    }
}

impl<'a> Visit<'a> for IdentifierCollector {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        self.record(it, false);
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        if it.shorthand {
            if let Expression::Identifier(id) = &it.value {
                self.record(id, true);
                return;
            }
        }
        walk::walk_object_property(self, it);
    }

    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
        let mut bindings = BindingNames::default();
        walk::walk_arrow_function_expression(&mut bindings, it);
        self.scopes.push(bindings.names);
        walk::walk_arrow_function_expression(self, it);
        self.scopes.pop();
    }

    fn visit_function(&mut self, it: &Function<'a>, flags: ScopeFlags) {
        let mut bindings = BindingNames::default();
        walk::walk_function(&mut bindings, it, flags);
        self.scopes.push(bindings.names);
        walk::walk_function(self, it, flags);
        self.scopes.pop();
    }
}

/// Collect the free identifier references of an expression in source order.
///
/// Identifiers bound inside the expression itself (arrow parameters, function
/// locals) are skipped. Inline handler statements such as `a++; b()` are not
/// expressions, so they are parsed as a statement list instead.
pub fn collect_identifiers(content: &str) -> Option<Vec<IdentifierRef>> {
    let allocator = Allocator::default();
    let mut collector = IdentifierCollector::default();
    match parse_whole_expression(&allocator, content) {
        Some(expression) => collector.visit_expression(&expression),
        None => {
            let ret = Parser::new(&allocator, content, SourceType::tsx()).parse();
            if !ret.errors.is_empty() {
                tracing::warn!(content, "expression could not be parsed; identifiers are left as-is");
                return None;
            }
            collector.visit_program(&ret.program);
        }
    }
    collector.refs.sort_by_key(|r| r.start);
    Some(collector.refs)
}

fn references_any(content: &str, is_local: &dyn Fn(&str) -> bool) -> bool {
    collect_identifiers(content)
        .map(|refs| refs.iter().any(|r| is_local(&r.name)))
        .unwrap_or(false)
}

// ============================================================================
// Sub-expressions
// ============================================================================

/// Location of `exp.content[start..end]`, derived from the expression location.
pub fn sub_location(exp: &SimpleExpressionNode, start: usize, end: usize) -> SourceLocation {
    if exp.loc.is_stub() || exp.is_static {
        return SourceLocation::STUB;
    }
    let content = exp.content.as_str();
    let advance = |mut pos: Position, upto: usize| {
        for byte in content.as_bytes().iter().take(upto) {
            pos.offset += 1;
            if *byte == b'\n' {
                pos.line += 1;
                pos.column = 1;
            } else {
                pos.column += 1;
            }
        }
        pos
    };
    SourceLocation::new(
        advance(exp.loc.start, start),
        advance(exp.loc.start, end),
        content.get(start..end).unwrap_or_default(),
    )
}

/// Slice a sub-expression out of `exp`, keeping the source position.
pub fn sub_expression(exp: &SimpleExpressionNode, start: usize, end: usize) -> SimpleExpressionNode {
    let content = exp.content.get(start..end).unwrap_or_default();
    SimpleExpressionNode::new(content, false, sub_location(exp, start, end))
}

// ============================================================================
// v-for
// ============================================================================

/// `value`, `key` and `index` aliases plus the iterated source of a `v-for`.
#[derive(Debug, Clone)]
pub struct ForParseResult {
    pub source: SimpleExpressionNode,
    pub value: Option<SimpleExpressionNode>,
    pub key: Option<SimpleExpressionNode>,
    pub index: Option<SimpleExpressionNode>,
}

/// Find `<lhs> in|of <source>`, returning the end of `lhs` and start of `source`.
fn split_for_alias(content: &str) -> Option<(usize, usize)> {
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        let rest = &content[j..];
        if (rest.starts_with("in") || rest.starts_with("of"))
            && bytes.get(j + 2).is_some_and(|b| b.is_ascii_whitespace())
        {
            let mut k = j + 2;
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < bytes.len() {
                return Some((i, k));
            }
        }
        i = j;
    }
    None
}

/// Parse a `v-for` expression such as `(item, key, index) in list`.
///
/// The alias list is parsed as arrow function parameters so destructuring
/// patterns containing commas are split correctly.
pub fn parse_for_expression(exp: &SimpleExpressionNode) -> Option<ForParseResult> {
    let content = exp.content.as_str();
    let (lhs_end, source_start) = split_for_alias(content)?;

    let source_end = content.trim_end().len();
    let source = sub_expression(exp, source_start, source_end);

    let lhs = &content[..lhs_end];
    let mut inner_start = lhs.len() - lhs.trim_start().len();
    let mut inner_end = lhs.trim_end().len();
    if content[inner_start..inner_end].starts_with('(') {
        inner_start += 1;
    }
    if inner_end > inner_start && content[inner_start..inner_end].ends_with(')') {
        inner_end -= 1;
    }
    let inner = &content[inner_start..inner_end];

    let mut result = ForParseResult {
        source,
        value: None,
        key: None,
        index: None,
    };
    if inner.trim().is_empty() {
        return Some(result);
    }

    let wrapper = format!("({inner}) => 0");
    let spans = parse_with(&wrapper, |expression| match expression {
        Expression::ArrowFunctionExpression(arrow) => Some(
            arrow
                .params
                .items
                .iter()
                .map(|param| param.pattern.span())
                .collect::<Vec<Span>>(),
        ),
        _ => None,
    })
    .flatten()?;

    let mut aliases = spans.into_iter().map(|span| {
        let start = inner_start + span.start as usize - 1;
        let end = inner_start + span.end as usize - 1;
        sub_expression(exp, start, end)
    });
    result.value = aliases.next();
    result.key = aliases.next();
    result.index = aliases.next();
    Some(result)
}

/// Runtime helper needed to read a destructured loop variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestructureHelper {
    /// `{ a, ...rest }`: the keys to exclude, rendered as an array literal
    RestElement(String),
    /// `{ a = 1 }`: the default value expression
    DefaultValue(String),
}

/// A name bound by a loop value pattern and how to reach it from the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestructuredBinding {
    pub name: String,
    /// Access path appended to the item accessor, e.g. `.user.name` or `[0]`
    pub path: String,
    pub helper: Option<DestructureHelper>,
}

fn property_key_segment(key: &PropertyKey<'_>, computed: bool, source: &str) -> (String, String) {
    match key {
        PropertyKey::StringLiteral(lit) => {
            let json = serde_json::to_string(lit.value.as_str()).unwrap_or_default();
            (format!("[{json}]"), json)
        }
        PropertyKey::StaticIdentifier(id) if !computed => {
            let name = id.name.as_str();
            let json = serde_json::to_string(name).unwrap_or_default();
            (format!(".{name}"), json)
        }
        other => {
            let span = other.span();
            let text = source
                .get(span.start as usize..span.end as usize)
                .unwrap_or_default();
            (format!("[{text}]"), text.to_string())
        }
    }
}

fn walk_binding_pattern(
    pattern: &BindingPattern<'_>,
    source: &str,
    path: String,
    helper: Option<DestructureHelper>,
    out: &mut Vec<DestructuredBinding>,
) {
    match pattern {
        BindingPattern::BindingIdentifier(id) => out.push(DestructuredBinding {
            name: id.name.to_string(),
            path,
            helper,
        }),
        BindingPattern::ObjectPattern(object) => {
            let mut keys = Vec::with_capacity(object.properties.len());
            for property in &object.properties {
                let (segment, key) = property_key_segment(&property.key, property.computed, source);
                keys.push(key);
                walk_binding_pattern(
                    &property.value,
                    source,
                    format!("{path}{segment}"),
                    helper.clone(),
                    out,
                );
            }
            if let Some(rest) = &object.rest {
                let excluded = format!("[{}]", keys.join(", "));
                walk_binding_pattern(
                    &rest.argument,
                    source,
                    path,
                    Some(DestructureHelper::RestElement(excluded)),
                    out,
                );
            }
        }
        BindingPattern::ArrayPattern(array) => {
            for (index, element) in array.elements.iter().enumerate() {
                if let Some(element) = element {
                    walk_binding_pattern(
                        element,
                        source,
                        format!("{path}[{index}]"),
                        helper.clone(),
                        out,
                    );
                }
            }
            if let Some(rest) = &array.rest {
                let len = array.elements.len();
                walk_binding_pattern(
                    &rest.argument,
                    source,
                    format!("{path}.slice({len})"),
                    helper,
                    out,
                );
            }
        }
        BindingPattern::AssignmentPattern(assign) => {
            let span = assign.right.span();
            let default = source
                .get(span.start as usize..span.end as usize)
                .unwrap_or_default()
                .to_string();
            walk_binding_pattern(
                &assign.left,
                source,
                path,
                Some(DestructureHelper::DefaultValue(default)),
                out,
            );
        }
    }
}

/// Decompose a loop value alias into the names it binds.
///
/// A plain identifier binds itself with an empty path.
pub fn destructure_bindings(pattern: &str) -> Vec<DestructuredBinding> {
    let pattern = pattern.trim();
    if is_simple_identifier(pattern) {
        return vec![DestructuredBinding {
            name: pattern.to_string(),
            path: String::new(),
            helper: None,
        }];
    }
    let wrapper = format!("({pattern}) => 0");
    parse_with(&wrapper, |expression| {
        let mut out = Vec::new();
        if let Expression::ArrowFunctionExpression(arrow) = expression {
            if let Some(param) = arrow.params.items.first() {
                walk_binding_pattern(&param.pattern, &wrapper, String::new(), None, &mut out);
            }
        }
        out
    })
    .unwrap_or_default()
}

// ============================================================================
// Loop body patterns
// ============================================================================

fn normalize(content: &str) -> String {
    content.chars().filter(|c| !c.is_whitespace()).collect()
}

struct KeyOnlyVisitor<'k> {
    source: &'k str,
    key: &'k str,
    only: bool,
}

impl<'a> Visit<'a> for KeyOnlyVisitor<'_> {
    fn visit_expression(&mut self, it: &Expression<'a>) {
        let span = it.span();
        let text = self
            .source
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default();
        if normalize(text) == self.key {
            return;
        }
        walk::walk_expression(self, it);
    }

    fn visit_identifier_reference(&mut self, _it: &IdentifierReference<'a>) {
        self.only = false;
    }

    fn visit_identifier_name(&mut self, _it: &IdentifierName<'a>) {
        self.only = false;
    }
}

fn key_only(content: &str, normalized_key: &str) -> bool {
    parse_with(content, |expression| {
        let mut visitor = KeyOnlyVisitor {
            source: content,
            key: normalized_key,
            only: true,
        };
        visitor.visit_expression(expression);
        visitor.only
    })
    .unwrap_or(false)
}

/// Whether `content` is built only from the loop key expression (and literals).
pub fn is_key_only_binding(content: &str, key: &str) -> bool {
    key_only(content, &normalize(key))
}

#[derive(Default)]
struct StrictEqualities {
    pairs: Vec<(Span, Span)>,
}

impl<'a> Visit<'a> for StrictEqualities {
    fn visit_binary_expression(&mut self, it: &BinaryExpression<'a>) {
        if it.operator == BinaryOperator::StrictEquality {
            self.pairs.push((it.left.span(), it.right.span()));
        }
        walk::walk_binary_expression(self, it);
    }
}

fn slice(content: &str, span: Span) -> &str {
    content
        .get(span.start as usize..span.end as usize)
        .unwrap_or_default()
}

/// Match a loop body binding of the form `<external> === <key>`.
///
/// Returns the byte range of the loop-external side. Two shapes are recognized:
/// a single strict equality where every other identifier belongs to one of the
/// two sides, or a conditional testing such an equality with literal branches.
pub fn match_selector_pattern(
    content: &str,
    key: &str,
    is_local: &dyn Fn(&str) -> bool,
) -> Option<(usize, usize)> {
    let key = normalize(key);
    let orientation = |a: Span, b: Span| {
        let b_text = slice(content, b);
        key_only(slice(content, a), &key)
            && !key_only(b_text, &key)
            && !references_any(b_text, is_local)
    };

    parse_with(content, |expression| {
        let mut equalities = StrictEqualities::default();
        equalities.visit_expression(expression);

        let mut matched = Vec::new();
        for (left, right) in equalities.pairs {
            for (a, b) in [(left, right), (right, left)] {
                if orientation(a, b) {
                    matched.push((a, b));
                }
            }
        }
        if let [(key_span, selector_span)] = matched.as_slice() {
            let mut collector = IdentifierCollector::default();
            collector.visit_expression(expression);
            let has_extra_id = collector
                .refs
                .iter()
                .any(|r| r.start != key_span.start && r.start != selector_span.start);
            if !has_extra_id {
                return Some((selector_span.start as usize, selector_span.end as usize));
            }
        }

        if let Expression::ConditionalExpression(conditional) = unwrap_expression(expression) {
            if let Expression::BinaryExpression(test) = unwrap_expression(&conditional.test) {
                if test.operator == BinaryOperator::StrictEquality
                    && is_static_node(&conditional.consequent)
                    && is_static_node(&conditional.alternate)
                {
                    let (left, right) = (test.left.span(), test.right.span());
                    for (a, b) in [(left, right), (right, left)] {
                        if orientation(a, b) {
                            return Some((b.start as usize, b.end as usize));
                        }
                    }
                }
            }
        }
        None
    })
    .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp(content: &str) -> SimpleExpressionNode {
        SimpleExpressionNode::dynamic(content)
    }

    #[test]
    fn test_constant_expressions() {
        assert!(is_constant_expression(&exp("1 + 1")));
        assert!(is_constant_expression(&exp("'a' + `b`")));
        assert!(is_constant_expression(&exp("[1, { a: true }]")));
        assert!(is_constant_expression(&exp("undefined")));
        assert!(is_constant_expression(&SimpleExpressionNode::static_str("x")));
        assert!(!is_constant_expression(&exp("foo")));
        assert!(!is_constant_expression(&exp("foo + 1")));
        assert!(!is_constant_expression(&exp("`${foo}`")));
        assert!(!is_constant_expression(&exp("{ a() {} }")));
    }

    #[test]
    fn test_literal_value() {
        assert_eq!(literal_value(&exp("'hi'")).as_deref(), Some("hi"));
        assert_eq!(literal_value(&exp("`hi`")).as_deref(), Some("hi"));
        assert_eq!(literal_value(&exp("hi")), None);
        assert_eq!(literal_value(&exp("`${a}`")), None);
    }

    #[test]
    fn test_member_and_fn_expressions() {
        assert!(is_member_expression("foo"));
        assert!(is_member_expression("foo.bar[baz]"));
        assert!(!is_member_expression("a + b"));
        assert!(!is_member_expression("undefined"));
        assert!(is_fn_expression("e => foo(e)"));
        assert!(is_fn_expression("function () {}"));
        assert!(!is_fn_expression("foo"));
        assert!(!is_member_expression("a; b.c"));
        assert!(!is_fn_expression("() => a; b()"));
    }

    #[test]
    fn test_contains_jsx() {
        assert!(contains_jsx("ok ? <span /> : null"));
        assert!(!contains_jsx("a < b"));
    }

    #[test]
    fn test_collect_identifiers_skips_locals() {
        let refs = collect_identifiers("items.map(item => item.id + offset)").unwrap();
        let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["items", "offset"]);
    }

    #[test]
    fn test_collect_identifiers_shorthand() {
        let refs = collect_identifiers("{ foo, bar: baz }").unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name, "foo");
        assert!(refs[0].shorthand);
        assert_eq!(refs[1].name, "baz");
        assert!(!refs[1].shorthand);
    }

    #[test]
    fn test_collect_identifiers_statements() {
        let refs = collect_identifiers("count++; log(count)").unwrap();
        let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["count", "log", "count"]);

        let refs = collect_identifiers("(a);\n").unwrap();
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn test_parse_for_expression() {
        let result = parse_for_expression(&exp("(item, key, index) in list")).unwrap();
        assert_eq!(result.source.content.as_str(), "list");
        assert_eq!(result.value.unwrap().content.as_str(), "item");
        assert_eq!(result.key.unwrap().content.as_str(), "key");
        assert_eq!(result.index.unwrap().content.as_str(), "index");

        let result = parse_for_expression(&exp("{ id, name } of users")).unwrap();
        assert_eq!(result.source.content.as_str(), "users");
        assert_eq!(result.value.unwrap().content.as_str(), "{ id, name }");
        assert!(result.key.is_none());

        assert!(parse_for_expression(&exp("list")).is_none());
    }

    #[test]
    fn test_destructure_bindings() {
        let bindings = destructure_bindings("{ id, user: { name }, list: [first, ...others], ...rest }");
        let paths: Vec<(&str, &str)> = bindings
            .iter()
            .map(|b| (b.name.as_str(), b.path.as_str()))
            .collect();
        assert_eq!(
            paths,
            vec![
                ("id", ".id"),
                ("name", ".user.name"),
                ("first", ".list[0]"),
                ("others", ".list.slice(1)"),
                ("rest", ""),
            ]
        );
        assert_eq!(
            bindings[4].helper,
            Some(DestructureHelper::RestElement(
                r#"["id", "user", "list"]"#.to_string()
            ))
        );

        let bindings = destructure_bindings("{ a = 1 }");
        assert_eq!(
            bindings[0].helper,
            Some(DestructureHelper::DefaultValue("1".to_string()))
        );
        assert_eq!(destructure_bindings("item")[0].path, "");
    }

    #[test]
    fn test_key_only_binding() {
        assert!(is_key_only_binding("row.id", "row.id"));
        assert!(is_key_only_binding("`row-${row.id}`", "row.id"));
        assert!(!is_key_only_binding("row.label", "row.id"));
        assert!(!is_key_only_binding("row.id + offset", "row.id"));
    }

    #[test]
    fn test_match_selector_pattern() {
        let is_local = |name: &str| name == "row";
        let content = "selected === row.id ? 'a' : ''";
        let range = match_selector_pattern(content, "row.id", &is_local).unwrap();
        assert_eq!(&content[range.0..range.1], "selected");

        let content = "{ active: row.id === current.id }";
        let range = match_selector_pattern(content, "row.id", &is_local).unwrap();
        assert_eq!(&content[range.0..range.1], "current.id");

        assert!(match_selector_pattern("row.id === row.parent", "row.id", &is_local).is_none());
        assert!(match_selector_pattern("a === row.id && b", "row.id", &is_local).is_none());
        assert!(match_selector_pattern("selected !== row.id", "row.id", &is_local).is_none());
    }
}
