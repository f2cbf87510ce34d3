//! Plain-text rendering of markup trees.

use crate::text::markup::{parse_markup, MarkupNode};

/// Renders a markup tree as formatted plain text.
///
/// # Contract
/// - Text nodes are emitted verbatim.
/// - `ol`/`ul` content is preceded by `"\n"`, `li` content by `"\n- "`.
/// - `p` content is followed by `"\n\n"`; `div`, `ol`, `ul` and `li` content
///   by `"\n"`.
/// - Every other element contributes only its children's text.
pub fn to_plain_text(node: &MarkupNode) -> String {
    let mut out = String::new();
    match node {
        MarkupNode::Text(value) => out.push_str(value),
        MarkupNode::Document(children) | MarkupNode::Element { children, .. } => {
            render_children(children, &mut out);
        }
    }
    out
}

/// Parses `input` as an HTML fragment and renders it as plain text.
pub fn strip_markup(input: &str) -> String {
    to_plain_text(&parse_markup(input))
}

fn render_children(children: &[MarkupNode], out: &mut String) {
    for child in children {
        match child {
            MarkupNode::Text(value) => out.push_str(value),
            MarkupNode::Element { name, children } => {
                out.push_str(prefix_for(name));
                render_children(children, out);
                out.push_str(suffix_for(name));
            }
            MarkupNode::Document(children) => render_children(children, out),
        }
    }
}

fn prefix_for(name: &str) -> &'static str {
    match name {
        "ol" | "ul" => "\n",
        "li" => "\n- ",
        _ => "",
    }
}

fn suffix_for(name: &str) -> &'static str {
    match name {
        "p" => "\n\n",
        "div" | "ol" | "ul" | "li" => "\n",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::{strip_markup, to_plain_text};
    use crate::text::markup::MarkupNode;

    #[test]
    fn mention_paragraph_flattens() {
        let input = r#"<p><span class="h-card" translate="no"><a href="https://troet.tay-tec.de/@allsky" class="u-url mention">@<span>allsky</span></a></span> hello</p>"#;
        assert_eq!(strip_markup(input), "@allsky hello\n\n");
    }

    #[test]
    fn simple_span_paragraph_flattens() {
        assert_eq!(
            strip_markup("<p><span>@allsky</span> hello</p>"),
            "@allsky hello\n\n"
        );
    }

    #[test]
    fn lists_get_bullets_and_line_breaks() {
        assert_eq!(
            strip_markup("<ul><li>one</li><li>two</li></ul>"),
            "\n\n- one\n\n- two\n\n"
        );
        assert_eq!(strip_markup("<div>a</div><div>b</div>"), "a\nb\n");
    }

    #[test]
    fn other_elements_add_no_whitespace() {
        assert_eq!(strip_markup("a<br>b<strong>c</strong>"), "abc");
    }

    #[test]
    fn entities_are_decoded_in_text() {
        assert_eq!(strip_markup("<p>fish &amp; chips</p>"), "fish & chips\n\n");
    }

    #[test]
    fn converts_hand_built_tree() {
        let tree = MarkupNode::Document(vec![MarkupNode::element(
            "ol",
            vec![MarkupNode::element("li", vec![MarkupNode::text("first")])],
        )]);
        assert_eq!(to_plain_text(&tree), "\n\n- first\n\n");
        assert_eq!(to_plain_text(&MarkupNode::text("raw")), "raw");
    }
}
