//! # Attributed text model
//!
//! A [`Document`] is a list of [`Block`]s; each block is a list of [`Run`]s of
//! text carrying the same [`Marks`]. Positions are `(block, char offset)`
//! pairs. A line break inside a block is stored as `'\n'`.
//!
//! The model always holds at least one block. Runs with identical marks are
//! merged and empty runs are dropped after every edit, so two documents with
//! the same content compare equal.

use std::ops::RangeInclusive;

/// Block-level container of a run of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    BlockQuote,
    ListItem { ordered: bool },
}

impl BlockKind {
    /// HTML tag the block renders as.
    pub fn tag(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "p",
            BlockKind::Heading(1) => "h1",
            BlockKind::Heading(2) => "h2",
            BlockKind::Heading(3) => "h3",
            BlockKind::Heading(4) => "h4",
            BlockKind::Heading(5) => "h5",
            BlockKind::Heading(_) => "h6",
            BlockKind::BlockQuote => "blockquote",
            BlockKind::ListItem { .. } => "li",
        }
    }

    /// Map a (case-insensitive) tag name to a block kind. `li` maps to an
    /// unordered item; the caller knows the enclosing list.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.to_ascii_lowercase();
        match tag.as_str() {
            "p" | "div" => Some(BlockKind::Paragraph),
            "blockquote" => Some(BlockKind::BlockQuote),
            "li" => Some(BlockKind::ListItem { ordered: false }),
            _ => heading_level(&tag).map(BlockKind::Heading),
        }
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, BlockKind::ListItem { .. })
    }
}

pub(crate) fn heading_level(tag: &str) -> Option<u8> {
    let digit = tag.strip_prefix('h').or_else(|| tag.strip_prefix('H'))?;
    match digit.parse::<u8>() {
        Ok(level @ 1..=6) => Some(level),
        _ => None,
    }
}

/// Inline mark that can be toggled on a range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InlineMark {
    Bold,
    Italic,
    Underline,
}

/// Inline formatting of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub link: Option<String>,
}

impl Marks {
    pub fn has(&self, mark: InlineMark) -> bool {
        match mark {
            InlineMark::Bold => self.bold,
            InlineMark::Italic => self.italic,
            InlineMark::Underline => self.underline,
        }
    }

    pub fn set(&mut self, mark: InlineMark, on: bool) {
        match mark {
            InlineMark::Bold => self.bold = on,
            InlineMark::Italic => self.italic = on,
            InlineMark::Underline => self.underline = on,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub marks: Marks,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub runs: Vec<Run>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            runs: Vec::new(),
        }
    }

    /// Build a block from per-character marks, merging equal neighbours.
    pub fn from_chars(kind: BlockKind, chars: Vec<(char, Marks)>) -> Self {
        let mut runs: Vec<Run> = Vec::new();
        for (c, marks) in chars {
            match runs.last_mut() {
                Some(run) if run.marks == marks => run.text.push(c),
                _ => runs.push(Run {
                    text: c.to_string(),
                    marks,
                }),
            }
        }
        Self { kind, runs }
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.runs.iter().map(|r| r.text.chars().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn chars(&self) -> Vec<(char, Marks)> {
        self.runs
            .iter()
            .flat_map(|r| r.text.chars().map(move |c| (c, r.marks.clone())))
            .collect()
    }
}

/// A point in the document: block index and char offset inside it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub block: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Anchor/focus pair, like a browser selection. Not necessarily ordered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    pub fn caret(at: Position) -> Self {
        Self::new(at, at)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// `(start, end)` in document order.
    pub fn range(&self) -> (Position, Position) {
        if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            blocks: vec![Block::new(BlockKind::Paragraph)],
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            return Self::default();
        }
        let mut doc = Self { blocks };
        for i in 0..doc.blocks.len() {
            doc.normalize_block(i);
        }
        doc
    }

    /// Plain text as paragraphs, one per non-blank line.
    pub fn from_text(text: &str) -> Self {
        let blocks = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                Block::from_chars(
                    BlockKind::Paragraph,
                    line.chars().map(|c| (c, Marks::default())).collect(),
                )
            })
            .collect();
        Self::from_blocks(blocks)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// A single empty paragraph: what an untouched or cleared editor holds.
    pub fn is_blank(&self) -> bool {
        self.blocks.len() == 1
            && self.blocks[0].kind == BlockKind::Paragraph
            && self.blocks[0].is_empty()
    }

    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn end(&self) -> Position {
        let last = self.blocks.len() - 1;
        Position::new(last, self.blocks[last].len())
    }

    pub fn select_all(&self) -> Selection {
        Selection::new(Position::default(), self.end())
    }

    pub fn clamp(&self, pos: Position) -> Position {
        let block = pos.block.min(self.blocks.len() - 1);
        Position::new(block, pos.offset.min(self.blocks[block].len()))
    }

    pub fn clamp_selection(&self, sel: Selection) -> Selection {
        Selection::new(self.clamp(sel.anchor), self.clamp(sel.focus))
    }

    /// Indices of the blocks touched by `start..end`.
    pub fn block_span(&self, start: Position, end: Position) -> RangeInclusive<usize> {
        let start = self.clamp(start);
        let end = self.clamp(end);
        start.block..=end.block
    }

    fn normalize_block(&mut self, index: usize) {
        let block = &mut self.blocks[index];
        let chars = block.chars();
        *block = Block::from_chars(block.kind.clone(), chars);
    }

    fn replace_chars(&mut self, index: usize, chars: Vec<(char, Marks)>) {
        let kind = self.blocks[index].kind.clone();
        self.blocks[index] = Block::from_chars(kind, chars);
    }

    /// Marks that newly typed text at `pos` inherits: those of the char
    /// before the caret, or after it at the start of a block.
    pub fn marks_at(&self, pos: Position) -> Marks {
        let pos = self.clamp(pos);
        let chars = self.blocks[pos.block].chars();
        let index = if pos.offset > 0 {
            Some(pos.offset - 1)
        } else if !chars.is_empty() {
            Some(0)
        } else {
            None
        };
        index
            .and_then(|i| chars.get(i).map(|(_, m)| m.clone()))
            .unwrap_or_default()
    }

    /// Marks of every char in `start..end`.
    pub fn range_marks(&self, start: Position, end: Position) -> Vec<Marks> {
        let start = self.clamp(start);
        let end = self.clamp(end);
        let mut out = Vec::new();
        for i in start.block..=end.block {
            let chars = self.blocks[i].chars();
            let from = if i == start.block { start.offset } else { 0 };
            let to = if i == end.block { end.offset } else { chars.len() };
            out.extend(chars[from..to.max(from)].iter().map(|(_, m)| m.clone()));
        }
        out
    }

    /// Whether every char in a non-empty range satisfies `pred`.
    pub fn range_all(&self, start: Position, end: Position, pred: impl Fn(&Marks) -> bool) -> bool {
        let marks = self.range_marks(start, end);
        !marks.is_empty() && marks.iter().all(pred)
    }

    fn map_range(&mut self, start: Position, end: Position, mut f: impl FnMut(&mut Marks)) {
        let start = self.clamp(start);
        let end = self.clamp(end);
        for i in start.block..=end.block {
            let mut chars = self.blocks[i].chars();
            let from = if i == start.block { start.offset } else { 0 };
            let to = if i == end.block { end.offset } else { chars.len() };
            for (_, marks) in chars[from..to.max(from)].iter_mut() {
                f(marks);
            }
            self.replace_chars(i, chars);
        }
    }

    pub fn set_mark(&mut self, start: Position, end: Position, mark: InlineMark, on: bool) {
        self.map_range(start, end, |m| m.set(mark, on));
    }

    pub fn set_link(&mut self, start: Position, end: Position, link: Option<String>) {
        self.map_range(start, end, |m| m.link = link.clone());
    }

    pub fn set_block_kind(&mut self, blocks: RangeInclusive<usize>, kind: BlockKind) {
        for i in blocks {
            if let Some(block) = self.blocks.get_mut(i) {
                block.kind = kind.clone();
            }
        }
    }

    /// Remove `start..end`, joining the boundary blocks. Returns the caret.
    pub fn delete_range(&mut self, start: Position, end: Position) -> Position {
        let start = self.clamp(start);
        let end = self.clamp(end);
        if start == end {
            return start;
        }
        let head: Vec<_> = self.blocks[start.block].chars()[..start.offset].to_vec();
        let tail: Vec<_> = self.blocks[end.block].chars()[end.offset..].to_vec();
        let mut joined = head;
        joined.extend(tail);
        self.blocks.drain(start.block + 1..=end.block);
        self.replace_chars(start.block, joined);
        start
    }

    /// Insert `text` with `marks` at `pos`. Returns the caret after it.
    pub fn insert_text(&mut self, pos: Position, text: &str, marks: &Marks) -> Position {
        let pos = self.clamp(pos);
        let mut chars = self.blocks[pos.block].chars();
        let inserted: Vec<_> = text.chars().map(|c| (c, marks.clone())).collect();
        let count = inserted.len();
        chars.splice(pos.offset..pos.offset, inserted);
        self.replace_chars(pos.block, chars);
        Position::new(pos.block, pos.offset + count)
    }

    /// Insert a parsed fragment at `pos`. The first fragment block joins the
    /// block at `pos`, the last one takes the text after `pos`.
    pub fn insert_fragment(&mut self, pos: Position, fragment: &Document) -> Position {
        let pos = self.clamp(pos);
        let frag = fragment.blocks();
        if frag.len() == 1 {
            let mut chars = self.blocks[pos.block].chars();
            let inserted = frag[0].chars();
            let count = inserted.len();
            chars.splice(pos.offset..pos.offset, inserted);
            self.replace_chars(pos.block, chars);
            return Position::new(pos.block, pos.offset + count);
        }

        let chars = self.blocks[pos.block].chars();
        let (head, tail) = chars.split_at(pos.offset);
        let mut first = head.to_vec();
        first.extend(frag[0].chars());
        let kind = self.blocks[pos.block].kind.clone();

        let last_block = &frag[frag.len() - 1];
        let mut last = last_block.chars();
        let caret_offset = last.len();
        last.extend(tail.iter().cloned());

        let mut replacement = vec![Block::from_chars(kind, first)];
        replacement.extend(frag[1..frag.len() - 1].iter().cloned());
        replacement.push(Block::from_chars(last_block.kind.clone(), last));
        let count = replacement.len();
        self.blocks.splice(pos.block..=pos.block, replacement);
        Position::new(pos.block + count - 1, caret_offset)
    }

    /// Enter key. Headings continue as paragraphs; Enter in an empty list
    /// item turns it back into a paragraph instead of splitting.
    pub fn split_block(&mut self, pos: Position) -> Position {
        let pos = self.clamp(pos);
        let block = &self.blocks[pos.block];
        if block.kind.is_list_item() && block.is_empty() {
            self.blocks[pos.block].kind = BlockKind::Paragraph;
            return pos;
        }
        let next_kind = match &block.kind {
            BlockKind::Heading(_) => BlockKind::Paragraph,
            other => other.clone(),
        };
        let chars = block.chars();
        let (head, tail) = chars.split_at(pos.offset);
        let tail = Block::from_chars(next_kind, tail.to_vec());
        let head = head.to_vec();
        self.replace_chars(pos.block, head);
        self.blocks.insert(pos.block + 1, tail);
        Position::new(pos.block + 1, 0)
    }

    /// Backspace.
    pub fn delete_backward(&mut self, sel: Selection) -> Position {
        let (start, end) = sel.range();
        if start != end {
            return self.delete_range(start, end);
        }
        let pos = self.clamp(start);
        if pos.offset > 0 {
            return self.delete_range(Position::new(pos.block, pos.offset - 1), pos);
        }
        if pos.block == 0 {
            return pos;
        }
        let prev = Position::new(pos.block - 1, self.blocks[pos.block - 1].len());
        self.delete_range(prev, pos)
    }

    /// Delete key.
    pub fn delete_forward(&mut self, sel: Selection) -> Position {
        let (start, end) = sel.range();
        if start != end {
            return self.delete_range(start, end);
        }
        let pos = self.clamp(start);
        if pos.offset < self.blocks[pos.block].len() {
            return self.delete_range(pos, Position::new(pos.block, pos.offset + 1));
        }
        if pos.block + 1 >= self.blocks.len() {
            return pos;
        }
        self.delete_range(pos, Position::new(pos.block + 1, 0))
    }
}
