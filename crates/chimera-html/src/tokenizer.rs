//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! A single-pass tokenizer over the input characters. It does not model the
//! full state machine; malformed markup degrades to text instead of being
//! reported.

/// An attribute on a start tag token.
///
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    pub value: String,
}

/// "The output of the tokenization step is a series of zero or more of the following
/// tokens: DOCTYPE, start tag, end tag, comment, character, end-of-file."
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<!DOCTYPE name>`
    Doctype {
        /// "a name"
        name: Option<String>,
    },
    /// Start tag with lowercased name and attributes.
    StartTag {
        /// "a tag name"
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes"
        attributes: Vec<Attribute>,
    },
    /// End tag with lowercased name.
    EndTag {
        /// "a tag name"
        name: String,
    },
    /// `<!-- data -->`
    Comment {
        /// "data"
        data: String,
    },
    /// A run of text with character references already decoded.
    Character {
        /// "data"
        data: String,
    },
    /// End-of-file token signals the end of input.
    EndOfFile,
}

/// [§ 13.2.5.2 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
/// and [RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state):
/// elements whose content runs until the matching end tag.
const RAW_TEXT_ELEMENTS: &[(&str, bool)] = &[
    // (name, decode character references)
    ("script", false),
    ("style", false),
    ("title", true),
    ("textarea", true),
];

/// HTML tokenizer.
pub struct HTMLTokenizer {
    input: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
}

impl HTMLTokenizer {
    /// Create a tokenizer over `input`.
    #[must_use]
    pub fn new(input: String) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    /// Consume the tokenizer and return the emitted tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Tokenize the whole input. Always ends with [`Token::EndOfFile`].
    pub fn run(&mut self) {
        while self.pos < self.input.len() {
            if self.starts_with("<!--") {
                self.consume_comment();
            } else if self.starts_with("<!") {
                self.consume_markup_declaration();
            } else if self.starts_with("</") && self.peek_is_alpha(2) {
                self.consume_end_tag();
            } else if self.starts_with("<") && self.peek_is_alpha(1) {
                self.consume_start_tag();
            } else {
                self.consume_text();
            }
        }
        self.tokens.push(Token::EndOfFile);
    }

    fn starts_with(&self, prefix: &str) -> bool {
        let mut i = self.pos;
        for expected in prefix.chars() {
            match self.input.get(i) {
                Some(c) if c.eq_ignore_ascii_case(&expected) => i += 1,
                _ => return false,
            }
        }
        true
    }

    fn peek_is_alpha(&self, offset: usize) -> bool {
        self.input
            .get(self.pos + offset)
            .is_some_and(char::is_ascii_alphabetic)
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    /// Index of the next occurrence of `needle` at or after `from`.
    fn find_from(&self, from: usize, needle: &str) -> Option<usize> {
        let needle: Vec<char> = needle.chars().collect();
        (from..self.input.len()).find(|&start| {
            needle.iter().enumerate().all(|(k, n)| {
                self.input
                    .get(start + k)
                    .is_some_and(|c| c.eq_ignore_ascii_case(n))
            })
        })
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.input[start..end].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    fn consume_comment(&mut self) {
        let start = self.pos + 4;
        let end = self.find_from(start, "-->").unwrap_or(self.input.len());
        let data = self.slice(start, end);
        self.pos = (end + 3).min(self.input.len());
        self.tokens.push(Token::Comment { data });
    }

    /// `<!DOCTYPE ...>` or a bogus comment.
    fn consume_markup_declaration(&mut self) {
        let start = self.pos + 2;
        let end = self.find_from(start, ">").unwrap_or(self.input.len());
        let body = self.slice(start, end);
        self.pos = (end + 1).min(self.input.len());

        let token = match body.get(..7) {
            Some(keyword) if keyword.eq_ignore_ascii_case("doctype") => {
                let name = body[7..].trim().to_ascii_lowercase();
                Token::Doctype {
                    name: (!name.is_empty()).then_some(name),
                }
            }
            _ => Token::Comment { data: body },
        };
        self.tokens.push(token);
    }

    fn consume_tag_name(&mut self) -> String {
        let start = self.pos;
        while self
            .current()
            .is_some_and(|c| !c.is_whitespace() && c != '>' && c != '/')
        {
            self.pos += 1;
        }
        self.slice(start, self.pos).to_ascii_lowercase()
    }

    fn consume_end_tag(&mut self) {
        self.pos += 2;
        let name = self.consume_tag_name();
        let end = self.find_from(self.pos, ">").unwrap_or(self.input.len());
        self.pos = (end + 1).min(self.input.len());
        self.tokens.push(Token::EndTag { name });
    }

    fn consume_start_tag(&mut self) {
        self.pos += 1;
        let name = self.consume_tag_name();
        let mut attributes: Vec<Attribute> = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.current() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    break;
                }
                Some('/') => {
                    self.pos += 1;
                    if self.current() == Some('>') {
                        self_closing = true;
                        self.pos += 1;
                        break;
                    }
                }
                Some(_) => {
                    let attribute = self.consume_attribute();
                    // "If there is already an attribute on the token with the exact same
                    // name, then this is a duplicate-attribute parse error and the new
                    // attribute must be removed from the token."
                    if !attributes.iter().any(|a| a.name == attribute.name) {
                        attributes.push(attribute);
                    }
                }
            }
        }

        let raw_text = RAW_TEXT_ELEMENTS
            .iter()
            .find(|(raw, _)| *raw == name)
            .map(|&(_, decode)| decode);

        self.tokens.push(Token::StartTag {
            name: name.clone(),
            self_closing,
            attributes,
        });

        if let Some(decode) = raw_text
            && !self_closing
        {
            self.consume_raw_text(&name, decode);
        }
    }

    fn consume_attribute(&mut self) -> Attribute {
        let start = self.pos;
        while self
            .current()
            .is_some_and(|c| !c.is_whitespace() && !matches!(c, '=' | '>' | '/'))
        {
            self.pos += 1;
        }
        // A stray '=' at the start of an attribute name is part of the name.
        if self.pos == start {
            self.pos += 1;
        }
        let name = self.slice(start, self.pos).to_ascii_lowercase();

        self.skip_whitespace();
        if self.current() != Some('=') {
            return Attribute {
                name,
                value: String::new(),
            };
        }
        self.pos += 1;
        self.skip_whitespace();

        let value = match self.current() {
            Some(quote @ ('"' | '\'')) => {
                let start = self.pos + 1;
                let end = (start..self.input.len())
                    .find(|&i| self.input[i] == quote)
                    .unwrap_or(self.input.len());
                self.pos = (end + 1).min(self.input.len());
                self.slice(start, end)
            }
            _ => {
                let start = self.pos;
                while self.current().is_some_and(|c| !c.is_whitespace() && c != '>') {
                    self.pos += 1;
                }
                self.slice(start, self.pos)
            }
        };

        Attribute {
            name,
            value: decode_character_references(&value),
        }
    }

    fn consume_raw_text(&mut self, name: &str, decode: bool) {
        let end = self
            .find_from(self.pos, &format!("</{name}"))
            .unwrap_or(self.input.len());
        let data = self.slice(self.pos, end);
        self.pos = end;
        if !data.is_empty() {
            let data = if decode {
                decode_character_references(&data)
            } else {
                data
            };
            self.tokens.push(Token::Character { data });
        }
    }

    fn consume_text(&mut self) {
        let start = self.pos;
        // Always take the first character so a literal '<' makes progress.
        self.pos += 1;
        while self.pos < self.input.len() {
            if self.input[self.pos] == '<'
                && (self.starts_with("<!") || self.starts_with("</") || self.peek_is_alpha(1))
            {
                break;
            }
            self.pos += 1;
        }
        let data = decode_character_references(&self.slice(start, self.pos));
        match self.tokens.last_mut() {
            Some(Token::Character { data: previous }) => previous.push_str(&data),
            _ => self.tokens.push(Token::Character { data }),
        }
    }
}

/// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
///
/// Decodes the common named references and numeric references. Anything
/// unrecognized is kept verbatim.
#[must_use]
pub fn decode_character_references(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .char_indices()
            .take(12)
            .find(|&(_, c)| c == ';')
            .and_then(|(semi, _)| decode_reference(&rest[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(reference: &str) -> Option<char> {
    if let Some(numeric) = reference.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        // "If the number is 0x00 ... or a surrogate ... set the character
        // reference code to 0xFFFD."
        return Some(char::from_u32(code).filter(|&c| c != '\0').unwrap_or('\u{FFFD}'));
    }
    match reference {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{A0}'),
        "bull" => Some('•'),
        "copy" => Some('©'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_named_and_numeric() {
        assert_eq!(decode_character_references("a &amp; b"), "a & b");
        assert_eq!(decode_character_references("&lt;p&gt;"), "<p>");
        assert_eq!(decode_character_references("&#65;&#x42;"), "AB");
        assert_eq!(decode_character_references("&#0;"), "\u{FFFD}");
    }

    #[test]
    fn test_unknown_reference_kept() {
        assert_eq!(decode_character_references("&unknown; & done"), "&unknown; & done");
        assert_eq!(decode_character_references("trailing &"), "trailing &");
    }
}
