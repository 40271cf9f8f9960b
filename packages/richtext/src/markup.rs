//! # Markup codec
//!
//! The surface talks to its host in HTML fragments. [`parse`] reads whatever a
//! host or a browser hands over into a [`Document`] and never fails: unknown
//! tags are transparent, comments and unsupported void elements are dropped,
//! and so are other attributes and script-capable link targets, which makes
//! [`normalize`] safe for displaying untrusted markup.
//! [`serialize`] writes the canonical form back out.
//!
//! Canonical form:
//!
//! - `<p>`, `<h1>`..`<h6>`, `<blockquote>` per block, consecutive list items
//!   grouped in one `<ul>` or `<ol>`.
//! - Inline marks nested as `<a href>` > `<strong>` > `<em>` > `<u>`.
//! - An empty block holds a `<br>` placeholder.
//! - A document made of one empty paragraph is written as [`LINE_BREAK`],
//!   the single-empty-line sentinel that a cleared `contenteditable` holds.

use crate::document::{heading_level, Block, BlockKind, Document, Marks};

/// What an emptied editable region contains.
pub const LINE_BREAK: &str = "<br>";

/// Markup that renders as an empty editor.
pub const DEFAULT_EMPTY_SENTINELS: &[&str] = &["<br>", "<p><br></p>", "<p></p>", "<div><br></div>"];

/// `true` for the empty string or one of `sentinels` (surrounding
/// whitespace ignored).
pub fn is_visually_empty<S: AsRef<str>>(value: &str, sentinels: &[S]) -> bool {
    let value = value.trim();
    value.is_empty() || sentinels.iter().any(|s| s.as_ref() == value)
}

/// Parse then serialize.
pub fn normalize(markup: &str) -> String {
    serialize(&parse(markup))
}

// ── Reading ──

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_block_tag(name: &str) -> bool {
    matches!(name, "p" | "div" | "blockquote" | "li") || heading_level(name).is_some()
}

fn is_list_tag(name: &str) -> bool {
    matches!(name, "ul" | "ol")
}

fn is_collapsible(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\r' | '\t')
}

#[derive(Debug, PartialEq)]
enum Token {
    Text(String),
    Open {
        name: String,
        href: Option<String>,
        self_closing: bool,
    },
    Close(String),
}

/// Split markup into text and tag tokens. Comments, doctypes and processing
/// instructions are skipped; a `<` that does not start a tag is text.
fn tokenize(markup: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = markup;

    while let Some(lt) = rest.find('<') {
        text.push_str(&rest[..lt]);
        let after = &rest[lt + 1..];

        if let Some(comment) = after.strip_prefix("!--") {
            rest = match comment.find("-->") {
                Some(end) => &comment[end + 3..],
                None => "",
            };
            continue;
        }

        let starts_tag = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
        let Some(end) = starts_tag.then(|| find_tag_end(after)).flatten() else {
            text.push('<');
            rest = after;
            continue;
        };

        let inner = &after[..end];
        rest = &after[end + 1..];
        if inner.starts_with('!') || inner.starts_with('?') {
            continue;
        }

        if !text.is_empty() {
            tokens.push(Token::Text(decode_entities(&std::mem::take(&mut text))));
        }
        if let Some(name) = inner.strip_prefix('/') {
            tokens.push(Token::Close(tag_name(name)));
        } else {
            let name = tag_name(inner);
            let attrs = &inner[name.len().min(inner.len())..];
            tokens.push(Token::Open {
                href: attribute(attrs, "href").filter(|href| is_safe_href(href)),
                self_closing: inner.trim_end().ends_with('/'),
                name,
            });
        }
    }
    text.push_str(rest);
    if !text.is_empty() {
        tokens.push(Token::Text(decode_entities(&text)));
    }
    tokens
}

/// Index of the `>` closing a tag, skipping quoted attribute values.
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

fn tag_name(inner: &str) -> String {
    inner
        .trim_start()
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '/' && *c != '>')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Value of attribute `wanted` in a tag's attribute list.
/// Link targets that can run script are dropped, the link text is kept.
fn is_safe_href(href: &str) -> bool {
    let scheme: String = href
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take_while(|c| *c != ':')
        .collect::<String>()
        .to_ascii_lowercase();
    let has_scheme = href.contains(':');
    !(has_scheme && matches!(scheme.as_str(), "javascript" | "vbscript" | "data"))
}

fn attribute(attrs: &str, wanted: &str) -> Option<String> {
    let chars: Vec<char> = attrs.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        while i < len && (chars[i].is_whitespace() || chars[i] == '/') {
            i += 1;
        }
        let name_start = i;
        while i < len && !chars[i].is_whitespace() && !matches!(chars[i], '=' | '/') {
            i += 1;
        }
        let name: String = chars[name_start..i].iter().collect();
        while i < len && chars[i].is_whitespace() {
            i += 1;
        }

        let mut value = String::new();
        if i < len && chars[i] == '=' {
            i += 1;
            while i < len && chars[i].is_whitespace() {
                i += 1;
            }
            if i < len && (chars[i] == '"' || chars[i] == '\'') {
                let q = chars[i];
                i += 1;
                while i < len && chars[i] != q {
                    value.push(chars[i]);
                    i += 1;
                }
                i += 1;
            } else {
                while i < len && !chars[i].is_whitespace() {
                    value.push(chars[i]);
                    i += 1;
                }
            }
        }

        if name.eq_ignore_ascii_case(wanted) {
            return Some(decode_entities(&value));
        }
        if name.is_empty() {
            i += 1;
        }
    }
    None
}

/// Decode the named entities an editor produces plus numeric references.
/// Anything unrecognised stays as written.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity(&after[..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

struct OpenTag {
    name: String,
    href: Option<String>,
}

#[derive(Default)]
struct Reader {
    stack: Vec<OpenTag>,
    blocks: Vec<Block>,
    chars: Vec<(char, Marks)>,
    /// A block element was opened since the last flush, so even an empty
    /// block must be kept.
    opened: bool,
}

impl Reader {
    fn in_block(&self) -> bool {
        self.stack.iter().any(|t| is_block_tag(&t.name))
    }

    fn marks(&self) -> Marks {
        let has = |names: &[&str]| self.stack.iter().any(|t| names.contains(&t.name.as_str()));
        Marks {
            bold: has(&["b", "strong"]),
            italic: has(&["i", "em"]),
            underline: has(&["u"]),
            link: self
                .stack
                .iter()
                .rev()
                .find(|t| t.name == "a")
                .and_then(|t| t.href.clone()),
        }
    }

    /// Kind of the innermost heading, list item or quote on the stack.
    fn kind(&self) -> BlockKind {
        for (i, tag) in self.stack.iter().enumerate().rev() {
            if tag.name == "li" {
                let ordered = self.stack[..i]
                    .iter()
                    .rev()
                    .find(|t| is_list_tag(&t.name))
                    .is_some_and(|t| t.name == "ol");
                return BlockKind::ListItem { ordered };
            }
            if tag.name == "blockquote" {
                return BlockKind::BlockQuote;
            }
            if let Some(level) = heading_level(&tag.name) {
                return BlockKind::Heading(level);
            }
        }
        BlockKind::Paragraph
    }

    fn text(&mut self, text: &str) {
        if !self.in_block() && self.chars.is_empty() && text.chars().all(is_collapsible) {
            return;
        }
        let marks = self.marks();
        for c in text.chars() {
            let c = if is_collapsible(c) { ' ' } else { c };
            self.chars.push((c, marks.clone()));
        }
    }

    fn line_break(&mut self) {
        let marks = self.marks();
        self.chars.push(('\n', marks));
    }

    fn flush(&mut self, force: bool) {
        let mut chars = std::mem::take(&mut self.chars);
        let keep = force || !chars.iter().all(|(c, _)| is_collapsible(*c));
        self.opened = false;
        if !keep {
            return;
        }
        if chars.last().is_some_and(|(c, _)| *c == '\n') {
            chars.pop();
        }
        self.blocks.push(Block::from_chars(self.kind(), chars));
    }

    fn open(&mut self, name: String, href: Option<String>) {
        if name == "br" {
            self.line_break();
            return;
        }
        if VOID_TAGS.contains(&name.as_str()) {
            return;
        }
        let structural = is_block_tag(&name) || is_list_tag(&name);
        if structural {
            self.flush(false);
        }
        if is_block_tag(&name) {
            self.opened = true;
        }
        self.stack.push(OpenTag { name, href });
    }

    fn close(&mut self, name: &str) {
        let Some(index) = self.stack.iter().rposition(|t| t.name == name) else {
            return;
        };
        if is_block_tag(name) || is_list_tag(name) {
            let force = self.opened;
            self.flush(force);
        }
        self.stack.truncate(index);
    }

    fn finish(mut self) -> Document {
        let force = self.opened;
        self.flush(force);
        Document::from_blocks(self.blocks)
    }
}

/// Read an HTML fragment into a document.
pub fn parse(markup: &str) -> Document {
    let mut reader = Reader::default();
    for token in tokenize(markup) {
        match token {
            Token::Text(text) => reader.text(&text),
            Token::Open {
                name,
                href,
                self_closing,
            } => {
                let void = VOID_TAGS.contains(&name.as_str());
                reader.open(name.clone(), href);
                if self_closing && !void {
                    reader.close(&name);
                }
            }
            Token::Close(name) => reader.close(&name),
        }
    }
    reader.finish()
}

// ── Writing ──

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '\n' => out.push_str("<br>"),
            c => out.push(c),
        }
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn write_inline(out: &mut String, block: &Block) {
    if block.is_empty() {
        out.push_str(LINE_BREAK);
        return;
    }
    for run in &block.runs {
        let m = &run.marks;
        if let Some(href) = &m.link {
            out.push_str(&format!("<a href=\"{}\">", escape_attr(href)));
        }
        if m.bold {
            out.push_str("<strong>");
        }
        if m.italic {
            out.push_str("<em>");
        }
        if m.underline {
            out.push_str("<u>");
        }
        escape_text(out, &run.text);
        if m.underline {
            out.push_str("</u>");
        }
        if m.italic {
            out.push_str("</em>");
        }
        if m.bold {
            out.push_str("</strong>");
        }
        if m.link.is_some() {
            out.push_str("</a>");
        }
    }
    // A trailing line break needs a placeholder after it to stay visible.
    if block.text().ends_with('\n') {
        out.push_str(LINE_BREAK);
    }
}

/// Write the canonical markup of `doc`.
pub fn serialize(doc: &Document) -> String {
    if doc.is_blank() {
        return LINE_BREAK.to_string();
    }

    let mut out = String::new();
    let mut list: Option<bool> = None;
    for block in doc.blocks() {
        let item_of = match block.kind {
            BlockKind::ListItem { ordered } => Some(ordered),
            _ => None,
        };
        if list != item_of {
            if let Some(ordered) = list {
                out.push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            if let Some(ordered) = item_of {
                out.push_str(if ordered { "<ol>" } else { "<ul>" });
            }
            list = item_of;
        }

        let tag = block.kind.tag();
        out.push('<');
        out.push_str(tag);
        out.push('>');
        write_inline(&mut out, block);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
    if let Some(ordered) = list {
        out.push_str(if ordered { "</ol>" } else { "</ul>" });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paragraph() {
        let doc = parse("<p>Hello</p>");
        assert_eq!(doc.blocks().len(), 1);
        assert_eq!(doc.blocks()[0].text(), "Hello");
        assert_eq!(serialize(&doc), "<p>Hello</p>");
    }

    #[test]
    fn test_browser_bold_becomes_strong() {
        assert_eq!(normalize("<p><b>Hi</b> there</p>"), "<p><strong>Hi</strong> there</p>");
    }

    #[test]
    fn test_bare_text_becomes_paragraph() {
        assert_eq!(normalize("Hello <i>you</i>"), "<p>Hello <em>you</em></p>");
    }

    #[test]
    fn test_empty_inputs_collapse_to_line_break() {
        for input in ["", "<br>", "<p><br></p>", "<p></p>", "<div><br></div>", "  \n "] {
            assert_eq!(normalize(input), LINE_BREAK, "input {input:?}");
        }
    }

    #[test]
    fn test_lists_grouped() {
        let html = "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol>";
        let doc = parse(html);
        assert_eq!(doc.blocks().len(), 3);
        assert_eq!(doc.blocks()[2].kind, BlockKind::ListItem { ordered: true });
        assert_eq!(serialize(&doc), html);
    }

    #[test]
    fn test_paragraph_inside_quote_and_whitespace_between_blocks() {
        let html = "<blockquote>\n  <p>quoted</p>\n</blockquote>\n<h2>Title</h2>";
        let doc = parse(html);
        assert_eq!(doc.blocks().len(), 2);
        assert_eq!(doc.blocks()[0].kind, BlockKind::BlockQuote);
        assert_eq!(doc.blocks()[1].kind, BlockKind::Heading(2));
        assert_eq!(serialize(&doc), "<blockquote>quoted</blockquote><h2>Title</h2>");
    }

    #[test]
    fn test_links_and_nested_marks() {
        let html = r#"<p><a href="https://example.org/?a=1&amp;b=2"><b><u>go</u></b></a></p>"#;
        let doc = parse(html);
        let run = &doc.blocks()[0].runs[0];
        assert_eq!(run.marks.link.as_deref(), Some("https://example.org/?a=1&b=2"));
        assert!(run.marks.bold && run.marks.underline);
        assert_eq!(
            serialize(&doc),
            r#"<p><a href="https://example.org/?a=1&amp;b=2"><strong><u>go</u></strong></a></p>"#
        );
    }

    #[test]
    fn test_entities_and_nbsp() {
        let doc = parse("<p>a&nbsp;&lt;b&gt; &#65;&#x42; &bogus;</p>");
        assert_eq!(doc.blocks()[0].text(), "a\u{a0}<b> AB &bogus;");
        assert_eq!(serialize(&doc), "<p>a&nbsp;&lt;b&gt; AB &amp;bogus;</p>");
    }

    #[test]
    fn test_line_breaks_inside_block() {
        let doc = parse("<p>one<br>two<br></p>");
        assert_eq!(doc.blocks()[0].text(), "one\ntwo");
        assert_eq!(serialize(&doc), "<p>one<br>two</p>");

        let doc = parse("<p>one<br><br></p>");
        assert_eq!(serialize(&doc), "<p>one<br><br></p>");
        assert_eq!(normalize(&serialize(&doc)), serialize(&doc));
    }

    #[test]
    fn test_unknown_tags_comments_and_images() {
        let doc = parse(r#"<!-- note --><p><span class="x">keep</span><img src="a.png"></p>"#);
        assert_eq!(serialize(&doc), "<p>keep</p>");
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        assert_eq!(normalize("<p>1 < 2</p>"), "<p>1 &lt; 2</p>");
    }

    #[test]
    fn test_script_is_neutralized() {
        assert_eq!(
            normalize(r#"<p onclick="x()"><a href=" JavaScript:alert(1)">hi</a></p>"#),
            "<p>hi</p>"
        );
        assert_eq!(normalize("<script>alert(1)</script>"), "<p>alert(1)</p>");
        assert_eq!(
            normalize(r#"<p><a href="https://a.b/c:d">ok</a></p>"#),
            r#"<p><a href="https://a.b/c:d">ok</a></p>"#
        );
    }

    #[test]
    fn test_quoted_gt_in_attribute() {
        let doc = parse(r#"<a href="x>y">t</a>"#);
        assert_eq!(doc.blocks()[0].runs[0].marks.link.as_deref(), Some("x>y"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in [
            "<p>Hello</p>",
            "<h1>T</h1><p>a <b>b</b><i>c</i></p><ul><li>x</li></ul>",
            "<div>one</div><div><br></div><div>two</div>",
            "text<br>more",
            "<blockquote>q</blockquote><ol><li>1</li><li><br></li></ol>",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_visually_empty() {
        assert!(is_visually_empty("", DEFAULT_EMPTY_SENTINELS));
        assert!(is_visually_empty(" <p><br></p> ", DEFAULT_EMPTY_SENTINELS));
        assert!(!is_visually_empty("<p>x</p>", DEFAULT_EMPTY_SENTINELS));
        assert!(!is_visually_empty("<br>", &[] as &[&str]));
    }
}
