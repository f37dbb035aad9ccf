//! Outline section type.

use std::fmt::Write;

/// Deepest heading level that opens a section.
pub const MAX_LEVEL: u8 = 4;

/// Heading-delimited portion of a page.
///
/// Level 0 is reserved for the implicit untitled section that collects body
/// text appearing before the first heading.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section {
    /// Heading level (1-4), or 0 for the untitled preamble.
    pub level: u8,
    /// Heading text.
    pub heading: String,
    /// Body text up to the next heading, blocks separated by newlines.
    pub body: String,
    /// Attachment file names referenced in the body.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub attachments: Vec<String>,
    /// Nested deeper sections.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub subsections: Vec<Section>,
}

impl Section {
    /// Create an empty section for a heading.
    #[must_use]
    pub fn new(level: u8, heading: impl Into<String>) -> Self {
        Self {
            level,
            heading: heading.into(),
            ..Self::default()
        }
    }

    /// Create the implicit untitled section.
    #[must_use]
    pub fn untitled() -> Self {
        Self::default()
    }

    /// Whether this is the implicit untitled section.
    #[must_use]
    pub fn is_untitled(&self) -> bool {
        self.level == 0
    }

    /// Hierarchy label for this section's level.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self.level {
            0 => "Untitled",
            1 => "Section",
            2 => "Subsection",
            3 => "Topic",
            _ => "Subtopic",
        }
    }

    /// Append a body block.
    pub fn push_text(&mut self, text: &str) {
        if !self.body.is_empty() {
            self.body.push('\n');
        }
        self.body.push_str(text);
    }

    /// Number of sections in this subtree, including `self`.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.subsections.iter().map(Self::count).sum::<usize>()
    }

    /// Render back to Markdown.
    ///
    /// Chunking the result yields a section equal to `self` (attachments
    /// excepted, Markdown has no attachment blocks).
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        self.write_markdown(&mut out);
        out
    }

    fn write_markdown(&self, out: &mut String) {
        if !self.is_untitled() {
            let hashes = "#".repeat(usize::from(self.level));
            let _ = writeln!(out, "{hashes} {}\n", escape_markdown(&self.heading));
        }
        if !self.body.is_empty() {
            write_body(out, &self.body);
        }
        for sub in &self.subsections {
            sub.write_markdown(out);
        }
    }
}

/// Backslash-escape every ASCII punctuation character.
///
/// CommonMark treats an escaped punctuation character as literal text, so
/// the result parses back to exactly `text`.
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_punctuation() {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Write body text so that it tokenizes back to the same string.
///
/// Lines without surrounding whitespace become one escaped paragraph, soft
/// breaks keep the line boundaries. Blank or indented lines only survive
/// verbatim inside a fenced code block.
fn write_body(out: &mut String, body: &str) {
    let plain = body
        .lines()
        .all(|line| !line.is_empty() && line.trim() == line);
    if plain {
        let lines: Vec<String> = body.lines().map(escape_markdown).collect();
        let _ = writeln!(out, "{}\n", lines.join("\n"));
        return;
    }

    let longest_run = body
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);
    let _ = writeln!(out, "{fence}\n{body}\n{fence}\n");
}
