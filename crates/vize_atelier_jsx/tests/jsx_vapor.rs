//! JSX Vapor compiler output tests.
//!
//! Generated code is checked with substring assertions, since node ids
//! depend on traversal order; small stable outputs use inline snapshots.

use vize_atelier_jsx::{compile, CompileResult, CompilerOptions, ErrorMode};
use vize_carton::Bump;
use vize_relief::{CompilerError, ErrorCode};

fn compile_with(source: &str, options: CompilerOptions) -> (String, CompileResult<'static>) {
    let bump: &'static Bump = Box::leak(Box::new(Bump::new()));
    let source: &'static str = Box::leak(source.to_owned().into_boxed_str());
    let result = match compile(bump, source, options) {
        Ok(result) => result,
        Err(error) => panic!("Compilation error: {error:?}"),
    };
    (format!("{}\n{}", result.preamble, result.code), result)
}

/// Preamble and render code
fn get_compiled(source: &str) -> String {
    compile_with(source, CompilerOptions::default()).0
}

fn collect_errors(source: &str) -> Vec<CompilerError> {
    let bump = Bump::new();
    let options = CompilerOptions {
        error_mode: ErrorMode::Collect,
        ..Default::default()
    };
    match compile(&bump, source, options) {
        Ok(result) => result.errors,
        Err(error) => vec![error],
    }
}

// =============================================================================
// Templates
// =============================================================================

mod templates {
    use super::*;

    #[test]
    fn identical_markup_is_shared() {
        let (code, result) = compile_with("<><p>a</p><p>a</p></>", CompilerOptions::default());
        assert_eq!(result.templates, vec!["<p>a</p>"]);
        assert!(code.contains("const n0 = t0()"), "{code}");
        assert!(code.contains("const n1 = t0()"), "{code}");
        assert!(code.contains("return [n0, n1]"), "{code}");
    }

    #[test]
    fn single_root_template_is_flagged() {
        let code = get_compiled("<div><span>hi</span></div>");
        assert!(
            code.contains(r#"const t0 = _template("<div><span>hi</span></div>", true)"#),
            "{code}"
        );
    }

    #[test]
    fn literal_text_is_escaped() {
        let (_, result) = compile_with(r#"<p>{"<b>"}</p>"#, CompilerOptions::default());
        assert_eq!(result.templates, vec!["<p>&lt;b&gt;</p>"]);
    }
}

// =============================================================================
// Props
// =============================================================================

mod props {
    use super::*;

    #[test]
    fn constant_binding_has_no_effect() {
        let code = get_compiled("<div id={1 + 1} />");
        assert!(!code.contains("_renderEffect"), "{code}");
        assert!(code.contains(r#"_setProp(n0, "id", 1 + 1)"#), "{code}");
    }

    #[test]
    fn reactive_class() {
        let code = get_compiled("<div class={cls} />");
        assert!(code.contains("_renderEffect(() => _setClass(n0, cls))"), "{code}");
    }

    #[test]
    fn attribute_keys() {
        let code = get_compiled("<div data-id={id} />");
        assert!(code.contains(r#"_setAttr(n0, "data-id", id)"#), "{code}");
    }

    #[test]
    fn spread_props() {
        let code = get_compiled("<div {...attrs} title={title} />");
        assert!(code.contains("_setDynamicProps(n0, [attrs, { title: title }])"), "{code}");
    }
}

// =============================================================================
// Text and navigation
// =============================================================================

mod text {
    use super::*;

    #[test]
    fn text_container() {
        let code = get_compiled("<p>count: {count}</p>");
        insta::assert_snapshot!(code, @r#"
        import { child as _child, toDisplayString as _toDisplayString, setText as _setText, renderEffect as _renderEffect, template as _template } from 'vue';
        const t0 = _template("<p> </p>", true)

        (() => {
          const n0 = t0()
          const x0 = _child(n0)
          _renderEffect(() => _setText(x0, "count: " + _toDisplayString(count)))
          return n0
        })()
        "#);
    }

    #[test]
    fn second_child_is_reached_through_next() {
        let code = get_compiled("<div><span /><b>{x}</b></div>");
        assert!(code.contains(" = _next(_child(n"), "{code}");
        assert!(code.contains("_setText(x"), "{code}");
    }

    #[test]
    fn expression_among_elements_creates_nodes() {
        let code = get_compiled("<div><span />{msg}</div>");
        assert!(code.contains("_setInsertionState(n"), "{code}");
        assert!(code.contains("_createNodes(() => (msg))"), "{code}");
    }

    #[test]
    fn later_siblings_are_reached_by_index() {
        let code = get_compiled("<div><a /><b>{x}</b><i /><u>{y}</u></div>");
        assert!(code.contains("const n0 = _next(_child(n2))"), "{code}");
        assert!(code.contains("const n1 = _nthChild(n2, 3)"), "{code}");
    }

    #[test]
    fn words_keep_their_separator() {
        let code = get_compiled("<p>{first} {last}</p>");
        assert!(
            code.contains(r#"_toDisplayString(first) + " " + _toDisplayString(last)"#),
            "{code}"
        );
    }

    #[test]
    fn jsx_in_expression_is_compiled_to_a_block() {
        let code = get_compiled("<div>{ok ? <span>{a}</span> : null}</div>");
        assert!(!code.contains("<span>{a}</span>"), "{code}");
        assert!(code.contains(r#"_template("<span> </span>")"#), "{code}");
        assert!(code.contains("_setNodes(n0, () => (ok ? (() => {"), "{code}");
        assert!(code.contains("_setText(x1, _toDisplayString(a))"), "{code}");
        assert!(code.contains("})() : null))"), "{code}");
    }

    #[test]
    fn jsx_in_loop_callback_keeps_scope() {
        let code = get_compiled(
            "<ul><li v-for={row in rows}><i />{row.tags.map(tag => <b>{tag}</b>)}</li></ul>",
        );
        assert!(!code.contains("<b>{tag}</b>"), "{code}");
        assert!(code.contains("_createNodes(() => (_for_item0.value.tags.map(tag => (() => {"), "{code}");
        assert!(code.contains("_toDisplayString(tag)"), "{code}");
    }

    #[test]
    fn root_expression_creates_nodes() {
        let code = get_compiled("<>{msg}</>");
        assert!(code.contains("= _createNodes(() => (msg))"), "{code}");
    }
}

// =============================================================================
// Events
// =============================================================================

mod events {
    use super::*;

    #[test]
    fn single_delegated_handler_is_assigned() {
        let (code, result) = compile_with("<button onClick={handle}>go</button>", CompilerOptions::default());
        assert!(code.contains("n0.$evtclick = e => handle(e)"), "{code}");
        assert!(code.contains(r#"_delegateEvents("click")"#), "{code}");
        assert_eq!(result.delegated_events, vec!["click"]);
    }

    #[test]
    fn same_event_twice_uses_delegate() {
        let code = get_compiled("<div onClick={a} onClick_stop={b} />");
        assert!(code.contains(r#"_delegate(n0, "click", e => a(e))"#), "{code}");
        assert!(
            code.contains(r#"_delegate(n0, "click", _withModifiers(e => b(e), ["stop"]))"#),
            "{code}"
        );
    }

    #[test]
    fn non_delegated_event() {
        let code = get_compiled("<div onScroll={onScroll} />");
        assert!(code.contains(r#"_on(n0, "scroll", e => onScroll(e))"#), "{code}");
        assert!(!code.contains("_delegateEvents"), "{code}");
    }

    #[test]
    fn inline_statement_handler() {
        let code = get_compiled("<button onClick={() => count++}>+</button>");
        assert!(code.contains("n0.$evtclick = () => count++"), "{code}");
    }

    #[test]
    fn dynamic_event_bag() {
        let code = get_compiled("<div v-on={handlers} />");
        assert!(code.contains("_setDynamicEvents(n0, handlers)"), "{code}");
    }
}

// =============================================================================
// Directives
// =============================================================================

mod directives {
    use super::*;

    #[test]
    fn v_show() {
        let code = get_compiled("<div v-show={visible} />");
        assert!(code.contains("_applyVShow(n0, () => (visible))"), "{code}");
    }

    #[test]
    fn v_model_text() {
        let code = get_compiled("<input v-model_trim={msg} />");
        assert!(
            code.contains("_applyTextModel(n0, () => (msg), _value => (msg = _value), { trim: true })"),
            "{code}"
        );
    }

    #[test]
    fn v_html() {
        let code = get_compiled("<div v-html={html} />");
        assert!(code.contains("_setHtml(n0, html)"), "{code}");
    }

    #[test]
    fn custom_directive() {
        let code = get_compiled("<div v-focus />");
        assert!(code.contains("_withVaporDirectives(n0, [[vFocus]])"), "{code}");
    }

    #[test]
    fn template_ref() {
        let code = get_compiled("<div ref={el} />");
        assert!(code.contains("const _setTemplateRef = _createTemplateRefSetter()"), "{code}");
        assert!(code.contains("let r0"), "{code}");
        assert!(code.contains("r0 = _setTemplateRef(n0, el, r0)"), "{code}");
    }
}

// =============================================================================
// Control flow
// =============================================================================

mod control_flow {
    use super::*;

    #[test]
    fn v_if_else_chain() {
        let code = get_compiled(
            "<><div v-if={a}>a</div><div v-else-if={b}>b</div><div v-else>c</div></>",
        );
        assert!(code.contains("_createIf(() => (a), () => {"), "{code}");
        assert!(code.contains("}, () => _createIf(() => (b), () => {"), "{code}");
    }

    #[test]
    fn v_for_aliases() {
        let code = get_compiled("<ul><li v-for={(item, index) in list}>{item.label}</li></ul>");
        assert!(code.contains("_createFor(() => (list), (_for_item0, _for_key0) => {"), "{code}");
        assert!(code.contains("_toDisplayString(_for_item0.value.label)"), "{code}");
    }

    #[test]
    fn v_for_destructure() {
        let code = get_compiled("<ul><li v-for={({ id, ...rest }) in list}>{rest.a}</li></ul>");
        assert!(code.contains(r#"_getRestElement(_for_item0.value, ["id"]).a"#), "{code}");
    }

    #[test]
    fn keyed_loop_selector() {
        let code = get_compiled(
            r#"<ul><li v-for={row in rows} key={row.id} class={selected === row.id ? "danger" : ""}>x</li></ul>"#,
        );
        assert!(code.contains("let _selector"), "{code}");
        assert!(code.contains("({ createSelector }) => {"), "{code}");
        assert!(code.contains("= createSelector(() => selected)"), "{code}");
        assert!(code.contains("(row) => (row.id)"), "{code}");
        assert!(!code.contains("_renderEffect"), "{code}");
    }

    #[test]
    fn key_only_binding_is_hoisted() {
        let code = get_compiled(
            "<ul><li v-for={row in rows} key={row.id} id={row.id}>x</li></ul>",
        );
        assert!(code.contains(r#"_setProp(n"#), "{code}");
        assert!(code.contains("_for_item0.value.id)"), "{code}");
        assert!(!code.contains("_renderEffect"), "{code}");
    }

    #[test]
    fn loop_optimizer_can_be_disabled() {
        let options = CompilerOptions {
            optimize_loops: false,
            ..Default::default()
        };
        let (code, _) = compile_with(
            "<ul><li v-for={row in rows} key={row.id} id={row.id}>x</li></ul>",
            options,
        );
        assert!(code.contains("_renderEffect"), "{code}");
    }
}

// =============================================================================
// Components and slots
// =============================================================================

mod components {
    use super::*;

    #[test]
    fn component_with_props() {
        let code = get_compiled("<Comp msg={msg} />");
        assert!(code.contains("_createComponent(Comp, { msg: () => (msg) }, null, true)"), "{code}");
    }

    #[test]
    fn dynamic_component() {
        let code = get_compiled("<component is={view} />");
        assert!(code.contains("_createDynamicComponent(() => (view)"), "{code}");
    }

    #[test]
    fn fallback_constructor() {
        let options = CompilerOptions {
            with_fallback: true,
            ..Default::default()
        };
        let (code, _) = compile_with("<Comp />", options);
        assert!(code.contains("_createComponentWithFallback(Comp"), "{code}");
    }

    #[test]
    fn named_slots() {
        let code = get_compiled(
            "<Comp><template v-slot:header>h</template><template v-slot:footer>f</template></Comp>",
        );
        assert!(code.contains(r#""header": () => {"#), "{code}");
        assert!(code.contains(r#""footer": () => {"#), "{code}");
    }

    #[test]
    fn conditional_slot_chain() {
        let (code, result) = compile_with(
            "<Comp><template v-if={a} v-slot:one>1</template><template v-else-if={b} v-slot:two>2</template><template v-else v-slot:three>3</template></Comp>",
            CompilerOptions {
                error_mode: ErrorMode::Collect,
                ..Default::default()
            },
        );
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert!(code.contains(r#"name: "one""#), "{code}");
        assert!(code.contains(r#"name: "two""#), "{code}");
        assert!(code.contains(r#"name: "three""#), "{code}");
        assert!(!code.contains("void 0"), "{code}");
    }

    #[test]
    fn extraneous_default_slot_children_are_dropped() {
        let (_, result) = compile_with(
            "<Comp><template v-slot:default>a</template>extra</Comp>",
            CompilerOptions {
                error_mode: ErrorMode::Collect,
                ..Default::default()
            },
        );
        let codes: Vec<ErrorCode> = result.errors.iter().map(|e| e.code).collect();
        assert!(codes.contains(&ErrorCode::VSlotExtraneousDefaultSlotChildren), "{codes:?}");
        assert!(
            result.templates.iter().all(|t| t.as_str() != "extra"),
            "{:?}",
            result.templates
        );
    }

    #[test]
    fn conditional_slot() {
        let code = get_compiled("<Comp><template v-if={ok} v-slot:a>a</template></Comp>");
        assert!(code.contains("$: ["), "{code}");
        assert!(code.contains("() => (ok"), "{code}");
        assert!(code.contains(r#"name: "a""#), "{code}");
    }
}

// =============================================================================
// Errors
// =============================================================================

mod errors {
    use super::*;

    fn codes(source: &str) -> Vec<ErrorCode> {
        collect_errors(source).into_iter().map(|e| e.code).collect()
    }

    #[test]
    fn model_errors() {
        assert_eq!(
            codes(r#"<input type="file" v-model={files} />"#),
            vec![ErrorCode::VModelOnFileInputElement]
        );
        assert_eq!(codes("<div v-model={x} />"), vec![ErrorCode::VModelOnInvalidElement]);
        assert_eq!(
            codes("<input v-model={a + b} />"),
            vec![ErrorCode::VModelMalformedExpression]
        );
    }

    #[test]
    fn slot_errors() {
        let mixed = codes("<Comp v-slot={x}><template v-slot:foo>a</template></Comp>");
        assert!(mixed.contains(&ErrorCode::VSlotMixedSlotUsage), "{mixed:?}");
        let duplicate =
            codes("<Comp><template v-slot:foo>1</template><template v-slot:foo>2</template></Comp>");
        assert!(duplicate.contains(&ErrorCode::VSlotDuplicateSlotNames), "{duplicate:?}");
    }

    #[test]
    fn content_directives_with_children() {
        let bump = Bump::new();
        let options = || CompilerOptions {
            error_mode: ErrorMode::Collect,
            ..Default::default()
        };

        let result = compile(&bump, "<div v-html={html}>x</div>", options()).unwrap();
        let codes: Vec<ErrorCode> = result.errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ErrorCode::VHtmlWithChildren]);
        assert!(result.code.contains("_setHtml(n0, html)"), "{}", result.code);

        let result = compile(&bump, "<p v-text={msg}>x</p>", options()).unwrap();
        let codes: Vec<ErrorCode> = result.errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ErrorCode::VTextWithChildren]);
        assert!(
            result.code.contains("_setText(x0, _toDisplayString(msg))"),
            "{}",
            result.code
        );
    }

    #[test]
    fn else_without_if() {
        let codes = codes("<><div v-else>a</div></>");
        assert!(codes.contains(&ErrorCode::VElseNoAdjacentIf), "{codes:?}");
    }

    #[test]
    fn on_error_observer_sees_errors() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static SEEN: AtomicUsize = AtomicUsize::new(0);
        fn observe(_: &CompilerError) {
            SEEN.fetch_add(1, Ordering::SeqCst);
        }

        let bump = Bump::new();
        let options = CompilerOptions {
            error_mode: ErrorMode::Collect,
            on_error: Some(observe),
            ..Default::default()
        };
        let result = compile(&bump, "<div v-show />", options).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(SEEN.load(Ordering::SeqCst), 1);
    }
}

// =============================================================================
// Source maps
// =============================================================================

mod source_map {
    use super::*;

    #[test]
    fn source_map_is_generated_on_request() {
        let options = CompilerOptions {
            source_map: true,
            filename: "App.jsx".into(),
            ..Default::default()
        };
        let (_, result) = compile_with("<ul><li v-for={item in list}>{item.label}</li></ul>", options);
        let Some(map) = result.source_map else {
            panic!("expected a source map");
        };
        assert_eq!(map.version, 3);
        assert_eq!(map.sources, vec!["App.jsx"]);
        assert!(map.names.contains(&"item".to_string()));
        assert!(!map.mappings.is_empty());
        assert!(map.to_json().starts_with(r#"{"version":3,"file":"App.jsx""#));
    }

    #[test]
    fn no_source_map_by_default() {
        let (_, result) = compile_with("<div>{a}</div>", CompilerOptions::default());
        assert!(result.source_map.is_none());
    }
}
