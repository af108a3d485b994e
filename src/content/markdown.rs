//! DOM to Markdown conversion
//!
//! Converts the readable subtree of a rendered page into Markdown. Every
//! `pre`/`code` element is emitted as a fenced block containing its raw text:
//! move notation must survive conversion byte-for-byte, never reflowed.

use crate::content::readability::is_noise;
use scraper::node::Node;
use scraper::ElementRef;

const BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "ul", "ol", "pre", "blockquote", "table", "div",
    "section", "article", "main", "body", "figure", "figcaption", "details", "summary", "hr",
    "dl", "dt", "dd",
];

/// Converts a readable DOM subtree to Markdown text
pub fn to_markdown(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    render_blocks(root, &mut out, 0);
    collapse_blank_lines(&out)
}

fn is_block(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

/// Walks an element's children, flushing runs of inline content as
/// paragraphs and dispatching block elements to their renderers
fn render_blocks(element: ElementRef<'_>, out: &mut String, list_depth: usize) {
    let mut inline = String::new();

    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_inline_text(&mut inline, text),
            Node::Element(el) => {
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_noise(&child_ref) {
                    continue;
                }
                if is_block(el.name()) {
                    flush_paragraph(out, &mut inline);
                    render_block(child_ref, out, list_depth);
                } else {
                    render_inline(child_ref, &mut inline);
                }
            }
            _ => {}
        }
    }

    flush_paragraph(out, &mut inline);
}

fn render_block(element: ElementRef<'_>, out: &mut String, list_depth: usize) {
    match element.value().name() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = element.value().name()[1..].parse::<usize>().unwrap_or(1);
            let text = inline_of(element);
            if !text.is_empty() {
                push_block(out, &format!("{} {}", "#".repeat(level), text));
            }
        }
        "p" | "figcaption" | "summary" | "dt" | "dd" => {
            let text = inline_of(element);
            if !text.is_empty() {
                push_block(out, &text);
            }
        }
        "ul" => render_list(element, out, list_depth, false),
        "ol" => render_list(element, out, list_depth, true),
        "pre" => {
            // Raw text, fenced, exactly as rendered
            let raw: String = element.text().collect();
            let raw = raw.trim_matches('\n');
            if !raw.trim().is_empty() {
                push_block(out, &format!("```\n{}\n```", raw));
            }
        }
        "blockquote" => {
            let mut quoted = String::new();
            render_blocks(element, &mut quoted, list_depth);
            let quoted = quoted.trim();
            if !quoted.is_empty() {
                let lines: Vec<String> =
                    quoted.lines().map(|l| format!("> {}", l)).collect();
                push_block(out, &lines.join("\n"));
            }
        }
        "table" => render_table(element, out),
        "hr" => push_block(out, "---"),
        _ => render_blocks(element, out, list_depth),
    }
}

fn render_list(element: ElementRef<'_>, out: &mut String, list_depth: usize, ordered: bool) {
    let mut index = 1;
    for child in element.children() {
        let Some(li) = ElementRef::wrap(child) else {
            continue;
        };
        if li.value().name() != "li" || is_noise(&li) {
            continue;
        }

        let mut item = String::new();
        render_blocks(li, &mut item, list_depth + 1);
        let item = item.trim();
        if item.is_empty() {
            continue;
        }

        let marker = if ordered {
            format!("{}. ", index)
        } else {
            "- ".to_string()
        };
        let indent = "  ".repeat(list_depth);

        for (i, line) in item.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if i == 0 {
                out.push_str(&format!("{}{}{}\n", indent, marker, line));
            } else {
                out.push_str(&format!("{}{}{}\n", indent, " ".repeat(marker.len()), line));
            }
        }
        index += 1;
    }
    out.push('\n');
}

fn render_table(element: ElementRef<'_>, out: &mut String) {
    let mut rows = Vec::new();
    collect_table_rows(element, &mut rows);

    if rows.is_empty() {
        return;
    }

    let mut table = String::new();
    for (i, cells) in rows.iter().enumerate() {
        table.push_str(&format!("| {} |\n", cells.join(" | ")));
        if i == 0 {
            table.push_str(&format!(
                "|{}\n",
                " --- |".repeat(cells.len().max(1))
            ));
        }
    }
    push_block(out, table.trim_end());
}

fn collect_table_rows(element: ElementRef<'_>, rows: &mut Vec<Vec<String>>) {
    for child in element.children() {
        let Some(el) = ElementRef::wrap(child) else {
            continue;
        };
        match el.value().name() {
            "tr" => {
                let cells: Vec<String> = el
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|c| matches!(c.value().name(), "td" | "th"))
                    .map(|c| inline_of(c))
                    .collect();
                if cells.iter().any(|c| !c.is_empty()) {
                    rows.push(cells);
                }
            }
            "thead" | "tbody" | "tfoot" => collect_table_rows(el, rows),
            _ => {}
        }
    }
}

/// Renders one inline element into the paragraph buffer
fn render_inline(element: ElementRef<'_>, buf: &mut String) {
    match element.value().name() {
        "a" => {
            let text = inline_of(element);
            if text.is_empty() {
                return;
            }
            match element.value().attr("href") {
                Some(href) if href.starts_with("http") => {
                    buf.push_str(&format!("[{}]({})", text, href));
                }
                _ => buf.push_str(&text),
            }
        }
        "strong" | "b" => {
            let text = inline_of(element);
            if !text.is_empty() {
                buf.push_str(&format!("**{}**", text));
            }
        }
        "em" | "i" => {
            let text = inline_of(element);
            if !text.is_empty() {
                buf.push_str(&format!("*{}*", text));
            }
        }
        "code" => {
            // Inline code keeps its raw text; notation fragments stay intact
            let raw: String = element.text().collect();
            if !raw.trim().is_empty() {
                buf.push_str(&format!("`{}`", raw.trim()));
            }
        }
        "br" => buf.push(' '),
        _ => {
            for child in element.children() {
                match child.value() {
                    Node::Text(text) => push_inline_text(buf, text),
                    Node::Element(_) => {
                        if let Some(el) = ElementRef::wrap(child) {
                            if !is_noise(&el) {
                                render_inline(el, buf);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Inline rendering of an element's content into a fresh buffer
fn inline_of(element: ElementRef<'_>) -> String {
    let mut buf = String::new();
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_inline_text(&mut buf, text),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    if !is_noise(&el) {
                        render_inline(el, &mut buf);
                    }
                }
            }
            _ => {}
        }
    }
    buf.trim().to_string()
}

/// Appends text with whitespace runs collapsed to single spaces
fn push_inline_text(buf: &mut String, text: &str) {
    let mut last_space = buf.ends_with(' ') || buf.is_empty();
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_space {
                buf.push(' ');
                last_space = true;
            }
        } else {
            buf.push(c);
            last_space = false;
        }
    }
}

fn flush_paragraph(out: &mut String, inline: &mut String) {
    let text = inline.trim();
    if !text.is_empty() {
        push_block(out, text);
    }
    inline.clear();
}

fn push_block(out: &mut String, block: &str) {
    out.push_str(block);
    out.push_str("\n\n");
}

/// Collapses runs of 3+ newlines down to exactly one blank line
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push(c);
            }
        } else {
            newlines = 0;
            out.push(c);
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::readability::readable_root;
    use scraper::Html;

    fn convert(html: &str) -> String {
        let document = Html::parse_document(html);
        let root = readable_root(&document).unwrap();
        to_markdown(root)
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let md = convert(
            r#"<html><body><h1>Sicilian Defense</h1><h2>Main Line</h2><p>Black fights for the center.</p></body></html>"#,
        );
        assert!(md.contains("# Sicilian Defense"));
        assert!(md.contains("## Main Line"));
        assert!(md.contains("Black fights for the center."));
    }

    #[test]
    fn test_scripts_and_nav_removed() {
        let md = convert(
            r#"<html><body><nav>Home | About</nav><script>track();</script><p>Theory text.</p><footer>Copyright</footer></body></html>"#,
        );
        assert!(md.contains("Theory text."));
        assert!(!md.contains("track()"));
        assert!(!md.contains("Home | About"));
        assert!(!md.contains("Copyright"));
    }

    #[test]
    fn test_article_preferred_over_sidebar() {
        let md = convert(
            r#"<html><body><div class="sidebar">Hot posts</div><article><p>Endgame technique.</p></article></body></html>"#,
        );
        assert!(md.contains("Endgame technique."));
        assert!(!md.contains("Hot posts"));
    }

    #[test]
    fn test_unordered_list() {
        let md = convert(
            r#"<html><body><ul><li>Control the center</li><li>Develop pieces</li></ul></body></html>"#,
        );
        assert!(md.contains("- Control the center"));
        assert!(md.contains("- Develop pieces"));
    }

    #[test]
    fn test_ordered_list() {
        let md = convert(
            r#"<html><body><ol><li>e4</li><li>Nf3</li></ol></body></html>"#,
        );
        assert!(md.contains("1. e4"));
        assert!(md.contains("2. Nf3"));
    }

    #[test]
    fn test_links_converted() {
        let md = convert(
            r#"<html><body><p>See <a href="https://lichess.org/study/abc">this study</a>.</p></body></html>"#,
        );
        assert!(md.contains("[this study](https://lichess.org/study/abc)"));
    }

    #[test]
    fn test_emphasis() {
        let md = convert(
            r#"<html><body><p><strong>Never</strong> move the <em>same piece</em> twice.</p></body></html>"#,
        );
        assert!(md.contains("**Never**"));
        assert!(md.contains("*same piece*"));
    }

    #[test]
    fn test_pre_becomes_fenced_block_verbatim() {
        let md = convert(
            "<html><body><pre>1. e4 c5\n2. Nf3 d6\n3. d4 cxd4</pre></body></html>",
        );
        assert!(md.contains("```\n1. e4 c5\n2. Nf3 d6\n3. d4 cxd4\n```"));
    }

    #[test]
    fn test_notation_not_reflowed() {
        // Internal spacing inside the fence must survive untouched
        let md = convert("<html><body><pre>8/8/8/8/8/8/8/8 w - - 0 1</pre></body></html>");
        assert!(md.contains("8/8/8/8/8/8/8/8 w - - 0 1"));
    }

    #[test]
    fn test_inline_code_preserved() {
        let md = convert(
            r#"<html><body><p>The move <code>Nxe5</code> loses a pawn.</p></body></html>"#,
        );
        assert!(md.contains("`Nxe5`"));
    }

    #[test]
    fn test_whitespace_collapsed_in_prose() {
        let md = convert(
            "<html><body><p>Too   much\n\n   whitespace</p></body></html>",
        );
        assert!(md.contains("Too much whitespace"));
    }

    #[test]
    fn test_blockquote() {
        let md = convert(
            r#"<html><body><blockquote><p>Tactics flow from a superior position.</p></blockquote></body></html>"#,
        );
        assert!(md.contains("> Tactics flow from a superior position."));
    }

    #[test]
    fn test_table_rendered_as_rows() {
        let md = convert(
            r#"<html><body><table><tr><th>ECO</th><th>Name</th></tr><tr><td>B20</td><td>Sicilian</td></tr></table></body></html>"#,
        );
        assert!(md.contains("| ECO | Name |"));
        assert!(md.contains("| B20 | Sicilian |"));
    }
}
