//! End-to-end behaviour of the rule engine on parsed HTML.

#![cfg(feature = "html")]

use domsweep::{
    parse_html, process_children, process_markup, Document, Error, Filter, FilterOutcome,
    ProcessingOptions, SideTable, SweepService,
};
use pretty_assertions::assert_eq;

fn sweep(html: &str, options: &ProcessingOptions<Document>) -> String {
    process_markup(html, options, false, &mut SideTable::new()).unwrap()
}

#[test]
fn test_empty_options_flatten_everything() {
    let options = ProcessingOptions::new();
    assert_eq!(sweep("<div><p>abc <b>def</b></p></div>", &options), "abc def");
}

#[test]
fn test_flattening_is_idempotent() {
    let options = ProcessingOptions::new().allow_deep(".*", ["p", "i"]);
    let once = sweep("<div><p>a<span>b<i>c</i></span></p><section>d</section></div>", &options);
    let twice = sweep(&once, &options);

    assert_eq!(once, "<p>ab<i>c</i></p>d");
    assert_eq!(twice, once);
}

#[test]
fn test_tag_matching_is_case_insensitive() {
    let options = ProcessingOptions::new().allow_direct(".*", "b");
    assert_eq!(sweep("<B>x</B><b>y</b>", &options), "<b>x</b><b>y</b>");

    let options = ProcessingOptions::new().allow_direct("BODY", "B");
    assert_eq!(sweep("<b>x</b>", &options), "<b>x</b>");
}

#[test]
fn test_flatten_wins_over_allow() {
    let options = ProcessingOptions::new()
        .flatten_deep(".*", ".*")
        .allow_direct(".*", ".*");
    assert_eq!(sweep("<b>x</b><p>y<b>z</b></p>", &options), "xyz");
}

#[test]
fn test_remove_wins_over_flatten() {
    let options = ProcessingOptions::new()
        .remove_deep(".*", "aside")
        .flatten_deep(".*", "aside");
    assert_eq!(sweep("a<aside>b</aside>c", &options), "ac");
}

#[test]
fn test_remove_direct_only_hits_immediate_children() {
    let options = ProcessingOptions::new()
        .allow_deep(".*", ["div", "p", "span"])
        .remove_direct("div", "span");
    assert_eq!(
        sweep("<div><span>a</span><p><span>b</span></p></div>", &options),
        "<div><p><span>b</span></p></div>"
    );
}

#[test]
fn test_remove_deep_hits_any_depth() {
    let options = ProcessingOptions::new()
        .allow_deep(".*", ["div", "p", "span"])
        .remove_deep("div", "span");
    assert_eq!(
        sweep("<span>a</span><div><span>b</span><p><span>c</span></p></div>", &options),
        "<span>a</span><div><p></p></div>"
    );
}

#[test]
fn test_flatten_direct_only_hits_immediate_children() {
    let options = ProcessingOptions::new()
        .allow_deep(".*", ["ul", "li", "p"])
        .flatten_direct("li", "p");
    assert_eq!(
        sweep("<ul><li><p>a</p></li></ul><p>b</p>", &options),
        "<ul><li>a</li></ul><p>b</p>"
    );
}

#[test]
fn test_flattened_children_are_processed_under_new_parent() {
    // em is only kept directly under p; it becomes a direct child once span is flattened
    let options = ProcessingOptions::new()
        .allow_deep(".*", "p")
        .allow_direct("p", "em");
    assert_eq!(
        sweep("<p><span><em>x</em></span></p>", &options),
        "<p><em>x</em></p>"
    );
}

#[test]
fn test_attribute_and_class_filtering() {
    let options = ProcessingOptions::new()
        .allow_deep(".*", ["div", "span"])
        .allow_classes("DIV", "one");
    assert_eq!(
        sweep(r#"<div class="one two"><span class="two three">x</span></div>"#, &options),
        r#"<div class="one"><span>x</span></div>"#
    );
}

#[test]
fn test_attributes_allowed_per_tag() {
    let options = ProcessingOptions::new()
        .allow_deep(".*", ["a", "img"])
        .allow_attributes("a", ["href", "title"])
        .allow_attributes("img|a", "data-.*");
    assert_eq!(
        sweep(
            r#"<a href="/x" style="color:red" data-id="1">x</a><img src="y.png" data-src="z.png">"#,
            &options
        ),
        r#"<a href="/x" data-id="1">x</a><img data-src="z.png">"#
    );
}

#[test]
fn test_skip_attribute_and_class_flags() {
    let mut document = parse_html(r#"<p class="a" id="x">1</p><p class="b" id="y">2</p>"#);
    let root = document.root();
    let first = document.children(root)[0];
    let mut side_table = SideTable::new();
    side_table.set_skip_attributes(first).set_skip_classes(first);

    let options = ProcessingOptions::new().allow_deep(".*", "p");
    process_children(&mut document, root, &options, &mut side_table).unwrap();

    assert_eq!(
        document.inner_html(root),
        r#"<p class="a" id="x">1</p><p>2</p>"#
    );
    assert!(side_table.is_empty());
}

#[test]
fn test_join_siblings_reaches_fixed_point() {
    let options = ProcessingOptions::new()
        .allow_deep(".*", "b")
        .join_siblings(["B"]);
    assert_eq!(sweep("<b>a</b><b>b</b><b>c</b>", &options), "<b>abc</b>");
}

#[test]
fn test_join_siblings_across_whitespace_only() {
    let options = ProcessingOptions::new()
        .allow_deep(".*", "b")
        .join_siblings(["b"]);
    assert_eq!(sweep("<b>a</b> <b>b</b>", &options), "<b>a b</b>");
    assert_eq!(sweep("<b>a</b> and <b>b</b>", &options), "<b>a</b> and <b>b</b>");
}

#[test]
fn test_join_after_flattening_creates_adjacency() {
    let options = ProcessingOptions::new()
        .allow_deep(".*", "b")
        .join_siblings(["b"]);
    assert_eq!(
        sweep("<b>a</b><span><b>b</b></span><b>c</b>", &options),
        "<b>abc</b>"
    );
}

#[test]
fn test_remove_empty() {
    let options = ProcessingOptions::new()
        .allow_deep(".*", ["p", "span", "br"])
        .remove_deep(".*", "script")
        .remove_empty(true);
    assert_eq!(
        sweep("<p></p><p><script>x</script></p><p>a<br></p><span><br></span>", &options),
        "<p>a<br></p><span><br></span>"
    );
}

#[test]
fn test_remove_empty_cascades_bottom_up() {
    let options = ProcessingOptions::new()
        .allow_deep(".*", ["div", "p"])
        .remove_empty(true);
    assert_eq!(sweep("<div><p></p></div>x", &options), "x");
}

#[test]
fn test_remove_empty_respects_allowed_empty_tags() {
    let options = ProcessingOptions::new()
        .allow_deep(".*", ["td", "tr", "table", "tbody"])
        .remove_empty(true)
        .allowed_empty_tags(["td"]);
    assert_eq!(
        sweep("<table><tbody><tr><td></td></tr></tbody></table>", &options),
        "<table><tbody><tr><td></td></tr></tbody></table>"
    );
}

#[test]
fn test_filter_null_removes_subtree() {
    let options = ProcessingOptions::new()
        .allow_deep(".*", ".*")
        .filter("figure", Filter::remove("drop-figures"));
    assert_eq!(
        sweep("<p>a</p><figure><img src=\"x\"><figcaption>c</figcaption></figure>", &options),
        "<p>a</p>"
    );
}

#[test]
fn test_filter_replacement_can_be_flattened_by_same_call() {
    let options = ProcessingOptions::<Document>::new()
        .allow_deep(".*", "p")
        .flatten_deep(".*", "span")
        .filter(
            "font",
            Filter::new("font-to-span", |doc: &mut Document, node, _, _| {
                let span = doc.create_element("span");
                for child in doc.children(node).to_vec() {
                    doc.append(span, child);
                }
                FilterOutcome::replace_with(span)
            }),
        );
    assert_eq!(
        sweep("<p><font color=\"red\">x</font></p>", &options),
        "<p>x</p>"
    );
}

#[test]
fn test_filter_same_tag_replacement_raises_loop_guard() {
    let options = ProcessingOptions::<Document>::new().filter(
        "p",
        Filter::new("rewrap", |doc: &mut Document, node, _, _| {
            let p = doc.create_element("p");
            for child in doc.children(node).to_vec() {
                doc.append(p, child);
            }
            FilterOutcome::replace_with(p)
        }),
    );

    let err = process_markup("<p>x</p>", &options, false, &mut SideTable::new()).unwrap_err();
    match err {
        Error::InfiniteLoop { filter, tag } => {
            assert_eq!(filter, "rewrap");
            assert_eq!(tag, "P");
        }
        other => panic!("expected loop guard, got {other:?}"),
    }
}

#[test]
fn test_filter_can_rewrite_node_in_place() {
    let options = ProcessingOptions::<Document>::new()
        .allow_deep(".*", "a")
        .allow_attributes("a", ["href", "rel"])
        .filter(
            "a",
            Filter::new("nofollow", |doc: &mut Document, node, _, _| {
                doc.set_attribute(node, "rel", "nofollow");
                FilterOutcome::Keep
            }),
        );
    assert_eq!(
        sweep(r#"<a href="/x" onclick="y">x</a>"#, &options),
        r#"<a href="/x" rel="nofollow">x</a>"#
    );
}

#[test]
fn test_filter_can_edit_text_nodes() {
    let options = ProcessingOptions::<Document>::new()
        .allow_deep(".*", "p")
        .filter(
            "TEXT",
            Filter::new("upper", |doc: &mut Document, node, _, _| {
                let upper = doc.text(node).unwrap_or_default().to_uppercase();
                doc.set_text(node, &upper);
                FilterOutcome::Keep
            }),
        );
    assert_eq!(sweep("<p>abc</p>", &options), "<p>ABC</p>");
}

#[test]
fn test_filter_context_parent_tag() {
    let options = ProcessingOptions::<Document>::new()
        .allow_deep(".*", ["ul", "ol", "li"])
        .filter(
            "li",
            Filter::new("only-in-ul", |_: &mut Document, _, context, _| {
                if context.parent_tag() == Some("UL") {
                    FilterOutcome::Keep
                } else {
                    FilterOutcome::Remove
                }
            }),
        );
    assert_eq!(
        sweep("<ul><li>a</li></ul><ol><li>b</li></ol>", &options),
        "<ul><li>a</li></ul><ol></ol>"
    );
}

#[test]
fn test_options_from_json() {
    let options = ProcessingOptions::<Document>::from_json(
        r#"{
            "allow_tags_deep": {".*": ["p", "a"]},
            "allow_attributes_by_tag": {"a": "href"},
            "remove_tags_deep": {".*": "script"},
            "remove_empty": true
        }"#,
    )
    .unwrap();

    assert_eq!(
        sweep(
            r#"<div><p><a href="/" id="home">home</a></p><p><script>x</script></p></div>"#,
            &options
        ),
        r#"<p><a href="/">home</a></p>"#
    );
}

#[test]
fn test_deeply_nested_document() {
    let depth = 3000;
    let mut document = Document::new();
    let root = document.root();
    let mut parent = root;
    for level in 0..depth {
        let tag = if level % 2 == 0 { "div" } else { "span" };
        let node = document.element_with_attrs(tag, vec![("id", "x")]);
        document.append(parent, node);
        parent = node;
    }
    let text = document.create_text("x");
    document.append(parent, text);

    let options = ProcessingOptions::new().allow_deep(".*", "div");
    process_children(&mut document, root, &options, &mut SideTable::new()).unwrap();

    let depth = depth / 2;
    assert_eq!(
        document.inner_html(root),
        format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth))
    );
}

#[test]
fn test_sweep_reuses_holding_container() {
    let mut document = parse_html("<p><span>a</span><span>b</span></p>");
    let root = document.root();
    let service = SweepService::with_options(ProcessingOptions::new().allow_deep(".*", "p"));

    let before = document.len();
    service.sweep(&mut document, root, &mut SideTable::new()).unwrap();
    assert_eq!(document.inner_html(root), "<p>ab</p>");
    assert_eq!(document.len(), before + 1);
}
