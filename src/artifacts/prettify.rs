//! Indented HTML layout for the rendered page
//!
//! One element or text run per line, one space of indentation per level.
//! Purely cosmetic: when the markup cannot be parsed it is returned as is.

const INDENT: &str = " ";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose content is whitespace-sensitive
const VERBATIM_ELEMENTS: &[&str] = &["pre", "textarea", "script", "style"];

pub fn prettify(html: &str) -> String {
    let (doctype, markup) = split_doctype(html);

    let Ok(dom) = tl::parse(markup, tl::ParserOptions::default()) else {
        tracing::warn!("Could not parse rendered HTML, writing it unformatted");
        return html.to_string();
    };

    let parser = dom.parser();
    let mut out = String::with_capacity(html.len() * 2);

    if let Some(doctype) = doctype {
        out.push_str(doctype);
        out.push('\n');
    }

    for handle in dom.children() {
        write_node(*handle, parser, 0, &mut out);
    }

    out
}

fn split_doctype(html: &str) -> (Option<&str>, &str) {
    let trimmed = html.trim_start();
    let is_doctype = trimmed
        .get(..9)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("<!doctype"));

    match trimmed.find('>') {
        Some(end) if is_doctype => (Some(&trimmed[..=end]), &trimmed[end + 1..]),
        _ => (None, html),
    }
}

fn write_node(handle: tl::NodeHandle, parser: &tl::Parser, depth: usize, out: &mut String) {
    let Some(node) = handle.get(parser) else {
        return;
    };
    let indent = INDENT.repeat(depth);

    match node {
        tl::Node::Tag(tag) => {
            let name = tag.name().as_utf8_str().to_lowercase();

            out.push_str(&indent);
            out.push('<');
            out.push_str(&name);
            for (key, value) in tag.attributes().iter() {
                out.push(' ');
                out.push_str(key.as_ref());
                if let Some(value) = value {
                    out.push_str("=\"");
                    out.push_str(&value.replace('"', "&quot;"));
                    out.push('"');
                }
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&name.as_str()) {
                out.push('\n');
                return;
            }

            if VERBATIM_ELEMENTS.contains(&name.as_str()) {
                out.push_str(&tag.inner_html(parser));
            } else {
                out.push('\n');
                for child in tag.children().top().iter() {
                    write_node(*child, parser, depth + 1, out);
                }
                out.push_str(&indent);
            }

            out.push_str("</");
            out.push_str(&name);
            out.push_str(">\n");
        }
        tl::Node::Raw(bytes) => {
            let text = bytes.as_utf8_str();
            let text = text.trim();
            if !text.is_empty() {
                out.push_str(&indent);
                out.push_str(text);
                out.push('\n');
            }
        }
        tl::Node::Comment(bytes) => {
            let comment = bytes.as_utf8_str();
            let comment = comment.trim();
            out.push_str(&indent);
            if comment.starts_with("<!--") {
                out.push_str(comment);
            } else {
                out.push_str("<!-- ");
                out.push_str(comment);
                out.push_str(" -->");
            }
            out.push('\n');
        }
    }
}
