//! Lenient HTML fragment parser.
//!
//! Only element structure and text survive parsing. Attributes, comments and
//! doctype/processing declarations are dropped.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<[!?][^>]*>|</\s*([A-Za-z][A-Za-z0-9:-]*)\s*>|<([A-Za-z][A-Za-z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#,
    )
    .expect("valid tag regex")
});
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31})(;?)")
        .expect("valid entity regex")
});

/// Named character references as `(name, value, legacy)`.
///
/// Covers the Latin-1 set, typographic punctuation, arrows and common math
/// symbols. `legacy` names also decode without a trailing semicolon.
const NAMED_REFERENCES: &[(&str, &str, bool)] = &[
    ("amp", "&", true),
    ("lt", "<", true),
    ("gt", ">", true),
    ("quot", "\"", true),
    ("apos", "'", false),
    ("nbsp", "\u{a0}", true),
    ("iexcl", "\u{a1}", true),
    ("cent", "\u{a2}", true),
    ("pound", "\u{a3}", true),
    ("curren", "\u{a4}", true),
    ("yen", "\u{a5}", true),
    ("brvbar", "\u{a6}", true),
    ("sect", "\u{a7}", true),
    ("uml", "\u{a8}", true),
    ("copy", "\u{a9}", true),
    ("ordf", "\u{aa}", true),
    ("laquo", "\u{ab}", true),
    ("not", "\u{ac}", true),
    ("shy", "\u{ad}", true),
    ("reg", "\u{ae}", true),
    ("macr", "\u{af}", true),
    ("deg", "\u{b0}", true),
    ("plusmn", "\u{b1}", true),
    ("sup2", "\u{b2}", true),
    ("sup3", "\u{b3}", true),
    ("acute", "\u{b4}", true),
    ("micro", "\u{b5}", true),
    ("para", "\u{b6}", true),
    ("middot", "\u{b7}", true),
    ("cedil", "\u{b8}", true),
    ("sup1", "\u{b9}", true),
    ("ordm", "\u{ba}", true),
    ("raquo", "\u{bb}", true),
    ("frac14", "\u{bc}", true),
    ("frac12", "\u{bd}", true),
    ("frac34", "\u{be}", true),
    ("iquest", "\u{bf}", true),
    ("Agrave", "\u{c0}", true),
    ("Aacute", "\u{c1}", true),
    ("Acirc", "\u{c2}", true),
    ("Atilde", "\u{c3}", true),
    ("Auml", "\u{c4}", true),
    ("Aring", "\u{c5}", true),
    ("AElig", "\u{c6}", true),
    ("Ccedil", "\u{c7}", true),
    ("Egrave", "\u{c8}", true),
    ("Eacute", "\u{c9}", true),
    ("Ecirc", "\u{ca}", true),
    ("Euml", "\u{cb}", true),
    ("Igrave", "\u{cc}", true),
    ("Iacute", "\u{cd}", true),
    ("Icirc", "\u{ce}", true),
    ("Iuml", "\u{cf}", true),
    ("ETH", "\u{d0}", true),
    ("Ntilde", "\u{d1}", true),
    ("Ograve", "\u{d2}", true),
    ("Oacute", "\u{d3}", true),
    ("Ocirc", "\u{d4}", true),
    ("Otilde", "\u{d5}", true),
    ("Ouml", "\u{d6}", true),
    ("times", "\u{d7}", true),
    ("Oslash", "\u{d8}", true),
    ("Ugrave", "\u{d9}", true),
    ("Uacute", "\u{da}", true),
    ("Ucirc", "\u{db}", true),
    ("Uuml", "\u{dc}", true),
    ("Yacute", "\u{dd}", true),
    ("THORN", "\u{de}", true),
    ("szlig", "\u{df}", true),
    ("agrave", "\u{e0}", true),
    ("aacute", "\u{e1}", true),
    ("acirc", "\u{e2}", true),
    ("atilde", "\u{e3}", true),
    ("auml", "\u{e4}", true),
    ("aring", "\u{e5}", true),
    ("aelig", "\u{e6}", true),
    ("ccedil", "\u{e7}", true),
    ("egrave", "\u{e8}", true),
    ("eacute", "\u{e9}", true),
    ("ecirc", "\u{ea}", true),
    ("euml", "\u{eb}", true),
    ("igrave", "\u{ec}", true),
    ("iacute", "\u{ed}", true),
    ("icirc", "\u{ee}", true),
    ("iuml", "\u{ef}", true),
    ("eth", "\u{f0}", true),
    ("ntilde", "\u{f1}", true),
    ("ograve", "\u{f2}", true),
    ("oacute", "\u{f3}", true),
    ("ocirc", "\u{f4}", true),
    ("otilde", "\u{f5}", true),
    ("ouml", "\u{f6}", true),
    ("divide", "\u{f7}", true),
    ("oslash", "\u{f8}", true),
    ("ugrave", "\u{f9}", true),
    ("uacute", "\u{fa}", true),
    ("ucirc", "\u{fb}", true),
    ("uuml", "\u{fc}", true),
    ("yacute", "\u{fd}", true),
    ("thorn", "\u{fe}", true),
    ("yuml", "\u{ff}", true),
    ("OElig", "\u{152}", false),
    ("oelig", "\u{153}", false),
    ("Scaron", "\u{160}", false),
    ("scaron", "\u{161}", false),
    ("Yuml", "\u{178}", false),
    ("fnof", "\u{192}", false),
    ("circ", "\u{2c6}", false),
    ("tilde", "\u{2dc}", false),
    ("ensp", "\u{2002}", false),
    ("emsp", "\u{2003}", false),
    ("thinsp", "\u{2009}", false),
    ("zwnj", "\u{200c}", false),
    ("zwj", "\u{200d}", false),
    ("lrm", "\u{200e}", false),
    ("rlm", "\u{200f}", false),
    ("ndash", "\u{2013}", false),
    ("mdash", "\u{2014}", false),
    ("lsquo", "\u{2018}", false),
    ("rsquo", "\u{2019}", false),
    ("sbquo", "\u{201a}", false),
    ("ldquo", "\u{201c}", false),
    ("rdquo", "\u{201d}", false),
    ("bdquo", "\u{201e}", false),
    ("dagger", "\u{2020}", false),
    ("Dagger", "\u{2021}", false),
    ("bull", "\u{2022}", false),
    ("hellip", "\u{2026}", false),
    ("permil", "\u{2030}", false),
    ("prime", "\u{2032}", false),
    ("Prime", "\u{2033}", false),
    ("lsaquo", "\u{2039}", false),
    ("rsaquo", "\u{203a}", false),
    ("euro", "\u{20ac}", false),
    ("trade", "\u{2122}", false),
    ("larr", "\u{2190}", false),
    ("uarr", "\u{2191}", false),
    ("rarr", "\u{2192}", false),
    ("darr", "\u{2193}", false),
    ("harr", "\u{2194}", false),
    ("minus", "\u{2212}", false),
    ("infin", "\u{221e}", false),
    ("notin", "\u{2209}", false),
    ("asymp", "\u{2248}", false),
    ("ne", "\u{2260}", false),
    ("le", "\u{2264}", false),
    ("ge", "\u{2265}", false),
    ("star", "\u{2606}", false),
    ("hearts", "\u{2665}", false),
    ("check", "\u{2713}", false),
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Node of a parsed markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// Root of a parsed fragment.
    Document(Vec<MarkupNode>),
    /// Element with a lower-cased tag name.
    Element {
        name: String,
        children: Vec<MarkupNode>,
    },
    /// Decoded character data.
    Text(String),
}

impl MarkupNode {
    pub fn element(name: impl Into<String>, children: Vec<MarkupNode>) -> Self {
        Self::Element {
            name: name.into(),
            children,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Child nodes; empty for text.
    pub fn children(&self) -> &[MarkupNode] {
        match self {
            Self::Document(children) | Self::Element { children, .. } => children,
            Self::Text(_) => &[],
        }
    }
}

struct OpenElement {
    name: String,
    children: Vec<MarkupNode>,
}

/// Stack of open elements; index 0 is the document root.
struct TreeBuilder {
    stack: Vec<OpenElement>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![OpenElement {
                name: String::new(),
                children: Vec::new(),
            }],
        }
    }

    fn top(&mut self) -> &mut OpenElement {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let decoded = decode_entities(raw);
        let top = self.top();
        if let Some(MarkupNode::Text(previous)) = top.children.last_mut() {
            previous.push_str(&decoded);
        } else {
            top.children.push(MarkupNode::Text(decoded));
        }
    }

    fn open(&mut self, name: String, self_closing: bool) {
        // A new paragraph or list item implicitly ends an open sibling of the same kind.
        if (name == "p" || name == "li") && self.stack.len() > 1 && self.top().name == name {
            self.close_top();
        }

        if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            self.top().children.push(MarkupNode::element(name, Vec::new()));
            return;
        }
        self.stack.push(OpenElement {
            name,
            children: Vec::new(),
        });
    }

    fn close(&mut self, name: &str) {
        let Some(position) = self.stack.iter().rposition(|open| open.name == name) else {
            return;
        };
        if position == 0 {
            return;
        }
        while self.stack.len() > position {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(open) = self.stack.pop() {
            self.top()
                .children
                .push(MarkupNode::element(open.name, open.children));
        }
    }

    fn finish(mut self) -> MarkupNode {
        while self.stack.len() > 1 {
            self.close_top();
        }
        let root = self.stack.pop().map(|open| open.children).unwrap_or_default();
        MarkupNode::Document(root)
    }
}

/// Parses an HTML fragment into a markup tree.
///
/// # Invariants
/// - Never fails; stray end tags are ignored and unclosed elements are
///   closed at end of input.
/// - Void and self-closing elements never receive children.
pub fn parse_markup(input: &str) -> MarkupNode {
    let mut builder = TreeBuilder::new();
    let mut cursor = 0;

    for captures in TAG_RE.captures_iter(input) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        builder.push_text(&input[cursor..whole.start()]);
        cursor = whole.end();

        if let Some(end) = captures.get(1) {
            builder.close(&end.as_str().to_ascii_lowercase());
        } else if let Some(start) = captures.get(2) {
            let self_closing = captures
                .get(3)
                .map(|attrs| attrs.as_str().trim_end().ends_with('/'))
                .unwrap_or(false);
            builder.open(start.as_str().to_ascii_lowercase(), self_closing);
        }
    }
    builder.push_text(&input[cursor..]);

    builder.finish()
}

/// Decodes named and numeric character references.
///
/// # Contract
/// - Numeric references decode with or without `;`; invalid code points
///   become U+FFFD.
/// - Names from `NAMED_REFERENCES` decode with `;`. Legacy Latin-1 names
///   also decode without it, taking the longest matching prefix, so
///   `&ampfoo` becomes `&foo`.
/// - Any other name is kept verbatim.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    ENTITY_RE
        .replace_all(input, |captures: &Captures<'_>| {
            let terminated = !captures[2].is_empty();
            decode_reference(&captures[1], terminated)
                .unwrap_or_else(|| captures[0].to_string())
        })
        .into_owned()
}

fn decode_reference(reference: &str, terminated: bool) -> Option<String> {
    if let Some(numeric) = reference.strip_prefix('#') {
        let code = match numeric.strip_prefix(&['x', 'X'][..]) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        let decoded = match char::from_u32(code) {
            Some(ch) if ch != '\0' => ch,
            _ => char::REPLACEMENT_CHARACTER,
        };
        return Some(decoded.to_string());
    }

    if terminated {
        if let Some((_, value, _)) = NAMED_REFERENCES
            .iter()
            .find(|(name, _, _)| *name == reference)
        {
            return Some((*value).to_string());
        }
    }

    let (name, value, _) = NAMED_REFERENCES
        .iter()
        .filter(|(name, _, legacy)| *legacy && reference.starts_with(name))
        .max_by_key(|(name, _, _)| name.len())?;
    let mut decoded = (*value).to_string();
    decoded.push_str(&reference[name.len()..]);
    if terminated {
        decoded.push(';');
    }
    Some(decoded)
}
