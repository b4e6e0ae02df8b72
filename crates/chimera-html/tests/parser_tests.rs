//! Integration tests for the HTML tokenizer and tree builder.

use chimera_dom::{DomTree, NodeId, NodeType};
use chimera_html::{HTMLParser, HTMLTokenizer, Token, parse_document};

fn tokens(html: &str) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new(html.to_string());
    tokenizer.run();
    tokenizer.into_tokens()
}

/// Tag names of the element children of `id`.
fn child_tags(tree: &DomTree, id: NodeId) -> Vec<String> {
    tree.children(id)
        .iter()
        .filter_map(|&c| tree.as_element(c).map(|e| e.tag_name.clone()))
        .collect()
}

#[test]
fn test_tokenize_start_tag_with_attributes() {
    let toks = tokens(r#"<IMG SRC="a.png" width=50 alt='x' hidden/>"#);
    let Token::StartTag {
        name,
        self_closing,
        attributes,
    } = &toks[0]
    else {
        panic!("expected start tag, got {:?}", toks[0]);
    };
    assert_eq!(name, "img");
    assert!(*self_closing);
    let pairs: Vec<(&str, &str)> = attributes
        .iter()
        .map(|a| (a.name.as_str(), a.value.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("src", "a.png"), ("width", "50"), ("alt", "x"), ("hidden", "")]
    );
    assert_eq!(toks.last(), Some(&Token::EndOfFile));
}

#[test]
fn test_tokenize_doctype_comment_and_text() {
    let toks = tokens("<!DOCTYPE html><!-- note -->a &amp; b");
    assert_eq!(
        toks,
        vec![
            Token::Doctype {
                name: Some("html".to_string())
            },
            Token::Comment {
                data: " note ".to_string()
            },
            Token::Character {
                data: "a & b".to_string()
            },
            Token::EndOfFile,
        ]
    );
}

#[test]
fn test_tokenize_literal_less_than() {
    let toks = tokens("1 < 2");
    assert_eq!(
        toks[0],
        Token::Character {
            data: "1 < 2".to_string()
        }
    );
}

#[test]
fn test_tokenize_raw_text_script() {
    let toks = tokens("<script>if (a < b) { x = '<p>'; }</script>");
    assert_eq!(
        toks[1],
        Token::Character {
            data: "if (a < b) { x = '<p>'; }".to_string()
        }
    );
    assert_eq!(
        toks[2],
        Token::EndTag {
            name: "script".to_string()
        }
    );
}

#[test]
fn test_document_structure() {
    let tree = parse_document("<!DOCTYPE html><html><head><title>T</title></head><body><p>x</p></body></html>");
    let html = tree.document_element().unwrap();
    assert_eq!(child_tags(&tree, html), vec!["head", "body"]);
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["p"]);
}

#[test]
fn test_implied_html_head_body() {
    let tree = parse_document("<title>Hi</title><h1>Heading</h1>");
    let html = tree.document_element().unwrap();
    assert_eq!(child_tags(&tree, html), vec!["head", "body"]);
    let title = tree.find_first(NodeId::ROOT, "title").unwrap();
    assert_eq!(tree.text_content(title), "Hi");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["h1"]);
}

#[test]
fn test_empty_document_still_has_body() {
    let tree = parse_document("");
    assert!(tree.body().is_some());
}

#[test]
fn test_void_elements_do_not_nest() {
    let tree = parse_document("<body><img src=a.png><p>after</p></body>");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["img", "p"]);
}

#[test]
fn test_implied_end_tags_for_li_and_p() {
    let tree = parse_document("<ul><li>one<li>two</ul><p>a<p>b");
    let body = tree.body().unwrap();
    let ul = tree.find_first(body, "ul").unwrap();
    assert_eq!(child_tags(&tree, ul), vec!["li", "li"]);
    assert_eq!(child_tags(&tree, body), vec!["ul", "p", "p"]);
}

#[test]
fn test_table_rows_and_cells() {
    let tree = parse_document("<table><tr><td>1<td>2<tr><td>3</table>");
    let table = tree.find_first(NodeId::ROOT, "table").unwrap();
    assert_eq!(child_tags(&tree, table), vec!["tr", "tr"]);
    let first_row = tree.children(table)[0];
    assert_eq!(child_tags(&tree, first_row), vec!["td", "td"]);
}

#[test]
fn test_stray_end_tag_reports_issue() {
    let mut tokenizer = HTMLTokenizer::new("<p>a</span></p>".to_string());
    tokenizer.run();
    let (tree, issues) = HTMLParser::new(tokenizer.into_tokens()).run_with_issues();
    assert!(issues.iter().any(|i| i.message.contains("</span>")));
    let p = tree.find_first(NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.text_content(p), "a");
}

#[test]
fn test_comment_node_kept() {
    let tree = parse_document("<body><!--c--><p>x</p></body>");
    let body = tree.body().unwrap();
    let first = tree.children(body)[0];
    assert!(matches!(
        tree.get(first).map(|n| &n.node_type),
        Some(NodeType::Comment(c)) if c == "c"
    ));
}
