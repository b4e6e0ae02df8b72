//! HTML tokenizer and tree builder for the Chimera browser.
//!
//! # Scope
//!
//! This crate implements a forgiving subset of
//! [WHATWG § 13.2 Parsing HTML documents](https://html.spec.whatwg.org/multipage/parsing.html):
//! - **Tokenizer**: tags, attributes, text, comments, DOCTYPE, character
//!   references, and raw text for `script`, `style`, `title` and `textarea`
//! - **Tree builder**: implied `html`/`head`/`body`, void elements, and
//!   implied end tags for `p`, `li`, `td`/`th` and `tr`
//!
//! # Not Implemented
//!
//! - Table insertion modes and foster parenting
//! - Adoption agency algorithm
//! - Foreign content (SVG, MathML)

/// HTML tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use parser::{HTMLParser, ParseIssue};
pub use tokenizer::{Attribute, HTMLTokenizer, Token};

use chimera_dom::DomTree;

/// Tokenize and parse `html` into a DOM tree in one call.
#[must_use]
pub fn parse_document(html: &str) -> DomTree {
    let mut tokenizer = HTMLTokenizer::new(html.to_string());
    tokenizer.run();
    let (tree, issues) = HTMLParser::new(tokenizer.into_tokens()).run_with_issues();
    for issue in &issues {
        log::debug!("parse issue: {}", issue.message);
    }
    tree
}
