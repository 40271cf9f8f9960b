//! Active format set: what a toolbar highlights for the current cursor.

use std::collections::BTreeSet;

use crate::document::{BlockKind, Document, Marks, Selection};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Format {
    Bold,
    Italic,
    Underline,
    OrderedList,
    UnorderedList,
    Heading1,
    Heading2,
    Quote,
}

impl Format {
    pub const ALL: [Format; 8] = [
        Format::Bold,
        Format::Italic,
        Format::Underline,
        Format::OrderedList,
        Format::UnorderedList,
        Format::Heading1,
        Format::Heading2,
        Format::Quote,
    ];

    /// Inline formats answered by the browser's `queryCommandState`, keyed by
    /// their native verb.
    pub const QUERYABLE: [(Format, &'static str); 5] = [
        (Format::Bold, "bold"),
        (Format::Italic, "italic"),
        (Format::Underline, "underline"),
        (Format::OrderedList, "insertOrderedList"),
        (Format::UnorderedList, "insertUnorderedList"),
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Format::Bold => "bold",
            Format::Italic => "italic",
            Format::Underline => "underline",
            Format::OrderedList => "orderedList",
            Format::UnorderedList => "unorderedList",
            Format::Heading1 => "heading1",
            Format::Heading2 => "heading2",
            Format::Quote => "quote",
        }
    }

    /// Block format of a container tag, compared case-insensitively.
    pub fn from_block_tag(tag: &str) -> Option<Format> {
        match tag.to_ascii_lowercase().as_str() {
            "h1" => Some(Format::Heading1),
            "h2" => Some(Format::Heading2),
            "blockquote" => Some(Format::Quote),
            _ => None,
        }
    }

    fn from_block_kind(kind: &BlockKind) -> Option<Format> {
        match kind {
            BlockKind::ListItem { ordered: true } => Some(Format::OrderedList),
            BlockKind::ListItem { ordered: false } => Some(Format::UnorderedList),
            other => Format::from_block_tag(other.tag()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveFormats(BTreeSet<Format>);

impl ActiveFormats {
    pub fn contains(&self, format: Format) -> bool {
        self.0.contains(&format)
    }

    pub fn insert(&mut self, format: Format) {
        self.0.insert(format);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Format> + '_ {
        self.0.iter().copied()
    }

    /// Formats at `selection`. A caret reports the marks new text would get
    /// (`pending` wins over the neighbouring char); a range reports a mark only
    /// when every selected char carries it. Block formats come from the block
    /// holding the selection start.
    pub fn derive(doc: &Document, selection: &Selection, pending: Option<&Marks>) -> Self {
        let mut active = Self::default();
        let (start, end) = selection.range();
        let start = doc.clamp(start);
        let end = doc.clamp(end);

        let (bold, italic, underline) = if start == end {
            let marks = pending.cloned().unwrap_or_else(|| doc.marks_at(start));
            (marks.bold, marks.italic, marks.underline)
        } else {
            (
                doc.range_all(start, end, |m| m.bold),
                doc.range_all(start, end, |m| m.italic),
                doc.range_all(start, end, |m| m.underline),
            )
        };
        for (on, format) in [
            (bold, Format::Bold),
            (italic, Format::Italic),
            (underline, Format::Underline),
        ] {
            if on {
                active.insert(format);
            }
        }

        if let Some(format) = Format::from_block_kind(&doc.blocks()[start.block].kind) {
            active.insert(format);
        }
        active
    }

    /// Build from the browser's per-verb command states and the tag name of
    /// the block container holding the cursor.
    pub fn from_native<'a>(states: impl IntoIterator<Item = (&'a str, bool)>, block_tag: &str) -> Self {
        let mut active = Self::default();
        for (verb, on) in states {
            let format = Format::QUERYABLE
                .iter()
                .find(|(_, v)| *v == verb)
                .map(|(f, _)| *f);
            if let (Some(format), true) = (format, on) {
                active.insert(format);
            }
        }
        if let Some(format) = Format::from_block_tag(block_tag) {
            active.insert(format);
        }
        active
    }
}

impl FromIterator<Format> for ActiveFormats {
    fn from_iter<T: IntoIterator<Item = Format>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Position;
    use crate::markup::parse;

    #[test]
    fn test_caret_inside_bold_heading() {
        let doc = parse("<h1><strong>Big</strong> title</h1>");
        let active = ActiveFormats::derive(&doc, &Selection::caret(Position::new(0, 2)), None);
        assert!(active.contains(Format::Bold));
        assert!(active.contains(Format::Heading1));
        assert!(!active.contains(Format::Italic));
    }

    #[test]
    fn test_range_needs_every_char() {
        let doc = parse("<p><em>half</em> plain</p>");
        let partial = Selection::new(Position::new(0, 0), Position::new(0, 8));
        assert!(!ActiveFormats::derive(&doc, &partial, None).contains(Format::Italic));
        let full = Selection::new(Position::new(0, 0), Position::new(0, 4));
        assert!(ActiveFormats::derive(&doc, &full, None).contains(Format::Italic));
    }

    #[test]
    fn test_pending_marks_override_caret() {
        let doc = parse("<p>abc</p>");
        let pending = Marks {
            underline: true,
            ..Marks::default()
        };
        let active = ActiveFormats::derive(&doc, &Selection::caret(Position::new(0, 3)), Some(&pending));
        assert!(active.contains(Format::Underline));
    }

    #[test]
    fn test_list_blocks() {
        let doc = parse("<ol><li>one</li></ol>");
        let active = ActiveFormats::derive(&doc, &Selection::caret(Position::new(0, 1)), None);
        assert_eq!(active.iter().collect::<Vec<_>>(), vec![Format::OrderedList]);
    }

    #[test]
    fn test_from_native_block_tag_is_case_insensitive() {
        let active = ActiveFormats::from_native([("bold", true), ("italic", false), ("justify", true)], "BLOCKQUOTE");
        assert_eq!(
            active,
            [Format::Bold, Format::Quote].into_iter().collect::<ActiveFormats>()
        );
        assert!(ActiveFormats::from_native(Vec::<(&str, bool)>::new(), "H2").contains(Format::Heading2));
        assert!(ActiveFormats::from_native(Vec::<(&str, bool)>::new(), "div").is_empty());
    }
}
