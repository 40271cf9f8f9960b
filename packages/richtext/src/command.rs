//! Formatting commands.
//!
//! Each command carries the verb a browser's `document.execCommand` knows it
//! by, so the web binding can hand it to the native editor, while
//! [`Command::apply`] performs the same edit on a [`Document`].

use crate::document::{BlockKind, Document, InlineMark, Marks, Selection};
use crate::error::Error;
use crate::format::{ActiveFormats, Format};

/// Block containers reachable through `formatBlock`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockFormat {
    Paragraph,
    Heading1,
    Heading2,
    Quote,
}

impl BlockFormat {
    pub fn tag(&self) -> &'static str {
        match self {
            BlockFormat::Paragraph => "p",
            BlockFormat::Heading1 => "h1",
            BlockFormat::Heading2 => "h2",
            BlockFormat::Quote => "blockquote",
        }
    }

    /// Accepts `h1` as well as `<h1>`, in any case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().trim_start_matches('<').trim_end_matches('>');
        match tag.to_ascii_lowercase().as_str() {
            "p" => Some(BlockFormat::Paragraph),
            "h1" => Some(BlockFormat::Heading1),
            "h2" => Some(BlockFormat::Heading2),
            "blockquote" => Some(BlockFormat::Quote),
            _ => None,
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            BlockFormat::Paragraph => BlockKind::Paragraph,
            BlockFormat::Heading1 => BlockKind::Heading(1),
            BlockFormat::Heading2 => BlockKind::Heading(2),
            BlockFormat::Quote => BlockKind::BlockQuote,
        }
    }

    /// What a toolbar button for `self` applies: an active heading or quote
    /// turns back into a paragraph.
    pub fn toggled(self, active: &ActiveFormats) -> BlockFormat {
        match self.format() {
            Some(format) if active.contains(format) => BlockFormat::Paragraph,
            _ => self,
        }
    }

    pub fn format(&self) -> Option<Format> {
        match self {
            BlockFormat::Paragraph => None,
            BlockFormat::Heading1 => Some(Format::Heading1),
            BlockFormat::Heading2 => Some(Format::Heading2),
            BlockFormat::Quote => Some(Format::Quote),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Bold,
    Italic,
    Underline,
    InsertUnorderedList,
    InsertOrderedList,
    FormatBlock(BlockFormat),
    CreateLink(String),
}

impl Command {
    /// Parse a native verb and its argument.
    pub fn parse(verb: &str, argument: Option<&str>) -> Result<Self, Error> {
        match verb {
            "bold" => Ok(Command::Bold),
            "italic" => Ok(Command::Italic),
            "underline" => Ok(Command::Underline),
            "insertUnorderedList" => Ok(Command::InsertUnorderedList),
            "insertOrderedList" => Ok(Command::InsertOrderedList),
            "formatBlock" => {
                let tag = argument.unwrap_or_default();
                BlockFormat::from_tag(tag)
                    .map(Command::FormatBlock)
                    .ok_or_else(|| Error::UnknownBlockFormat(tag.to_string()))
            }
            "createLink" => match argument.map(str::trim) {
                Some(url) if !url.is_empty() => Ok(Command::CreateLink(url.to_string())),
                _ => Err(Error::MissingLinkTarget),
            },
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }

    pub fn native_verb(&self) -> &'static str {
        match self {
            Command::Bold => "bold",
            Command::Italic => "italic",
            Command::Underline => "underline",
            Command::InsertUnorderedList => "insertUnorderedList",
            Command::InsertOrderedList => "insertOrderedList",
            Command::FormatBlock(_) => "formatBlock",
            Command::CreateLink(_) => "createLink",
        }
    }

    pub fn native_argument(&self) -> Option<String> {
        match self {
            Command::FormatBlock(block) => Some(format!("<{}>", block.tag())),
            Command::CreateLink(url) => Some(url.clone()),
            _ => None,
        }
    }

    /// The toolbar format this command switches, if any.
    pub fn format(&self) -> Option<Format> {
        match self {
            Command::Bold => Some(Format::Bold),
            Command::Italic => Some(Format::Italic),
            Command::Underline => Some(Format::Underline),
            Command::InsertUnorderedList => Some(Format::UnorderedList),
            Command::InsertOrderedList => Some(Format::OrderedList),
            Command::FormatBlock(block) => block.format(),
            Command::CreateLink(_) => None,
        }
    }

    /// Apply to the model. `pending` holds the marks the next typed text
    /// takes when an inline mark is toggled on a caret.
    pub fn apply(&self, doc: &mut Document, selection: &mut Selection, pending: &mut Option<Marks>) {
        *selection = doc.clamp_selection(*selection);
        let (start, end) = selection.range();
        match self {
            Command::Bold => toggle_mark(doc, selection, pending, InlineMark::Bold),
            Command::Italic => toggle_mark(doc, selection, pending, InlineMark::Italic),
            Command::Underline => toggle_mark(doc, selection, pending, InlineMark::Underline),
            Command::InsertUnorderedList => toggle_list(doc, selection, false),
            Command::InsertOrderedList => toggle_list(doc, selection, true),
            Command::FormatBlock(block) => doc.set_block_kind(doc.block_span(start, end), block.kind()),
            Command::CreateLink(url) => {
                if url.is_empty() {
                    return;
                }
                if selection.is_collapsed() {
                    let mut marks = pending.take().unwrap_or_else(|| doc.marks_at(start));
                    marks.link = Some(url.clone());
                    let after = doc.insert_text(start, url, &marks);
                    *selection = Selection::new(start, after);
                } else {
                    doc.set_link(start, end, Some(url.clone()));
                }
            }
        }
    }
}

/// Applied when any selected char lacks the mark, removed when all carry it.
fn toggle_mark(doc: &mut Document, selection: &Selection, pending: &mut Option<Marks>, mark: InlineMark) {
    let (start, end) = selection.range();
    if selection.is_collapsed() {
        let mut marks = pending.take().unwrap_or_else(|| doc.marks_at(start));
        let on = !marks.has(mark);
        marks.set(mark, on);
        *pending = Some(marks);
        return;
    }
    let all = doc.range_all(start, end, |m| m.has(mark));
    doc.set_mark(start, end, mark, !all);
}

fn toggle_list(doc: &mut Document, selection: &Selection, ordered: bool) {
    let (start, end) = selection.range();
    let span = doc.block_span(start, end);
    let target = BlockKind::ListItem { ordered };
    let all = doc.blocks()[span.clone()].iter().all(|b| b.kind == target);
    let kind = if all { BlockKind::Paragraph } else { target };
    doc.set_block_kind(span, kind);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Position;
    use crate::markup::{parse, serialize};

    fn run(html: &str, sel: Selection, cmd: Command) -> (String, Selection, Option<Marks>) {
        let mut doc = parse(html);
        let mut sel = sel;
        let mut pending = None;
        cmd.apply(&mut doc, &mut sel, &mut pending);
        (serialize(&doc), sel, pending)
    }

    fn span(from: usize, to: usize) -> Selection {
        Selection::new(Position::new(0, from), Position::new(0, to))
    }

    #[test]
    fn test_parse_native_verbs() {
        assert_eq!(Command::parse("bold", None).unwrap(), Command::Bold);
        assert_eq!(
            Command::parse("formatBlock", Some("<H2>")).unwrap(),
            Command::FormatBlock(BlockFormat::Heading2)
        );
        assert_eq!(
            Command::parse("createLink", Some(" https://a.b ")).unwrap(),
            Command::CreateLink("https://a.b".to_string())
        );
        assert!(matches!(Command::parse("createLink", Some("")), Err(Error::MissingLinkTarget)));
        assert!(matches!(Command::parse("formatBlock", Some("<pre>")), Err(Error::UnknownBlockFormat(_))));
        assert!(matches!(Command::parse("strikeThrough", None), Err(Error::UnknownCommand(_))));
    }

    #[test]
    fn test_native_round_trip() {
        for cmd in [
            Command::Bold,
            Command::InsertOrderedList,
            Command::FormatBlock(BlockFormat::Quote),
            Command::CreateLink("https://example.org".to_string()),
        ] {
            let arg = cmd.native_argument();
            assert_eq!(Command::parse(cmd.native_verb(), arg.as_deref()).unwrap(), cmd);
        }
    }

    #[test]
    fn test_bold_partially_bold_range_applies() {
        let (html, _, _) = run("<p><strong>ab</strong>cd</p>", span(0, 4), Command::Bold);
        assert_eq!(html, "<p><strong>abcd</strong></p>");
    }

    #[test]
    fn test_italic_on_caret_sets_pending() {
        let (html, _, pending) = run("<p>abc</p>", span(3, 3), Command::Italic);
        assert_eq!(html, "<p>abc</p>");
        assert!(pending.unwrap().italic);
    }

    #[test]
    fn test_list_toggle() {
        let two_blocks = Selection::new(Position::new(0, 0), Position::new(1, 1));
        let (html, _, _) = run("<p>a</p><p>b</p>", two_blocks, Command::InsertUnorderedList);
        assert_eq!(html, "<ul><li>a</li><li>b</li></ul>");

        let (html, _, _) = run(&html, two_blocks, Command::InsertUnorderedList);
        assert_eq!(html, "<p>a</p><p>b</p>");

        let (html, _, _) = run("<ul><li>a</li></ul>", span(0, 0), Command::InsertOrderedList);
        assert_eq!(html, "<ol><li>a</li></ol>");
    }

    #[test]
    fn test_format_block() {
        let (html, _, _) = run("<p>T</p>", span(0, 0), Command::FormatBlock(BlockFormat::Heading1));
        assert_eq!(html, "<h1>T</h1>");
        let (html, _, _) = run("<h1>T</h1>", span(1, 1), Command::FormatBlock(BlockFormat::Quote));
        assert_eq!(html, "<blockquote>T</blockquote>");
    }

    #[test]
    fn test_block_toggle_against_active_formats() {
        let active: ActiveFormats = [Format::Heading2].into_iter().collect();
        assert_eq!(BlockFormat::Heading2.toggled(&active), BlockFormat::Paragraph);
        assert_eq!(BlockFormat::Heading1.toggled(&active), BlockFormat::Heading1);
        assert_eq!(BlockFormat::Paragraph.toggled(&active), BlockFormat::Paragraph);
    }

    #[test]
    fn test_create_link_over_selection() {
        let (html, _, _) = run(
            "<p>see docs</p>",
            span(4, 8),
            Command::CreateLink("https://docs.rs".to_string()),
        );
        assert_eq!(html, r#"<p>see <a href="https://docs.rs">docs</a></p>"#);
    }

    #[test]
    fn test_create_link_on_caret_inserts_url() {
        let (html, sel, _) = run("<p>go </p>", span(3, 3), Command::CreateLink("x.io".to_string()));
        assert_eq!(html, r#"<p>go <a href="x.io">x.io</a></p>"#);
        assert_eq!(sel, span(3, 7));
    }
}
