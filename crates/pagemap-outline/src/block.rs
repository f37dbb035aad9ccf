//! Block tokens shared by the content tokenizers.

use crate::section::MAX_LEVEL;

/// Block-level token produced by a tokenizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// Heading that opens a section (level 1-4).
    Heading {
        /// Heading level.
        level: u8,
        /// Heading text.
        text: String,
    },
    /// Body text block (paragraph, list item, table row, code block).
    Text(String),
    /// Attachment file name referenced from the body.
    Attachment(String),
}

/// Accumulates inline text into blocks.
///
/// Both tokenizers drive the same collector: inline events append to the
/// buffer, block boundaries flush it. Inside a table row, boundaries are
/// ignored and cells are joined with ` | ` when the row ends.
#[derive(Debug, Default)]
pub(crate) struct BlockCollector {
    blocks: Vec<Block>,
    buffer: String,
    prefix: Option<&'static str>,
    heading: Option<u8>,
    row: Option<Vec<String>>,
}

impl BlockCollector {
    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Append text with whitespace runs collapsed to single spaces.
    pub(crate) fn push_collapsed(&mut self, text: &str) {
        let mut in_space = self.buffer.is_empty() || self.buffer.ends_with(char::is_whitespace);
        for c in text.chars() {
            if c.is_whitespace() {
                if !in_space {
                    self.buffer.push(' ');
                    in_space = true;
                }
            } else {
                self.buffer.push(c);
                in_space = false;
            }
        }
    }

    pub(crate) fn push_break(&mut self) {
        self.buffer.push('\n');
    }

    /// Prefix for the next non-empty block (list bullets).
    pub(crate) fn set_prefix(&mut self, prefix: &'static str) {
        self.flush();
        self.prefix = Some(prefix);
    }

    pub(crate) fn in_heading(&self) -> bool {
        self.heading.is_some()
    }

    /// Emit the buffered text as a body block.
    pub(crate) fn flush(&mut self) {
        if self.heading.is_some() {
            return;
        }
        if self.row.is_some() {
            if !self.buffer.is_empty() && !self.buffer.ends_with(char::is_whitespace) {
                self.buffer.push(' ');
            }
            return;
        }
        let text = self.buffer.trim();
        if !text.is_empty() {
            let text = match self.prefix.take() {
                Some(prefix) => format!("{prefix}{text}"),
                None => text.to_owned(),
            };
            self.blocks.push(Block::Text(text));
        }
        self.buffer.clear();
    }

    pub(crate) fn start_heading(&mut self, level: u8) {
        self.flush();
        self.prefix = None;
        self.heading = Some(level);
    }

    /// Close the current heading.
    ///
    /// Levels deeper than [`MAX_LEVEL`] become body text; empty headings are
    /// dropped.
    pub(crate) fn end_heading(&mut self) {
        let Some(level) = self.heading.take() else {
            return;
        };
        let text = self.buffer.trim().to_owned();
        self.buffer.clear();
        if text.is_empty() {
            return;
        }
        if level <= MAX_LEVEL {
            self.blocks.push(Block::Heading { level, text });
        } else {
            self.blocks.push(Block::Text(text));
        }
    }

    pub(crate) fn start_row(&mut self) {
        self.flush();
        self.row = Some(Vec::new());
    }

    pub(crate) fn end_cell(&mut self) {
        if let Some(row) = self.row.as_mut() {
            row.push(self.buffer.trim().to_owned());
            self.buffer.clear();
        }
    }

    pub(crate) fn end_row(&mut self) {
        if let Some(cells) = self.row.take()
            && cells.iter().any(|cell| !cell.is_empty())
        {
            self.blocks.push(Block::Text(cells.join(" | ")));
        }
        self.buffer.clear();
    }

    pub(crate) fn attachment(&mut self, name: String) {
        if !name.is_empty() {
            self.blocks.push(Block::Attachment(name));
        }
    }

    pub(crate) fn finish(mut self) -> Vec<Block> {
        self.end_heading();
        self.end_row();
        self.flush();
        self.blocks
    }
}
