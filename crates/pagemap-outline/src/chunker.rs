//! Outline construction from block tokens.
//!
//! Open sections are kept on an explicit stack, shallowest first. A heading
//! of level L closes every open section at level L or deeper, attaching each
//! closed section to the section below it on the stack (or to the top-level
//! outline once the stack is empty), then opens a new section. Levels may
//! skip: an H4 directly under an H1 nests under the H1, no intermediate
//! sections are synthesized.

use crate::ContentFormat;
use crate::block::Block;
use crate::section::Section;
use crate::{markdown, storage};

/// Chunk Markdown content into an outline.
#[must_use]
pub fn chunk(content: &str) -> Vec<Section> {
    chunk_blocks(markdown::tokenize(content))
}

/// Chunk Confluence storage-format content into an outline.
#[must_use]
pub fn chunk_storage(content: &str) -> Vec<Section> {
    chunk_blocks(storage::tokenize(content))
}

/// Chunk content in the given format.
#[must_use]
pub fn chunk_content(content: &str, format: ContentFormat) -> Vec<Section> {
    match format {
        ContentFormat::Markdown => chunk(content),
        ContentFormat::Storage => chunk_storage(content),
    }
}

/// Fold block tokens into a nested outline.
///
/// Always returns at least one section: content without any heading yields a
/// single untitled (level 0) section holding all body text.
pub fn chunk_blocks<I>(blocks: I) -> Vec<Section>
where
    I: IntoIterator<Item = Block>,
{
    let mut outline = OutlineBuilder::default();
    for block in blocks {
        match block {
            Block::Heading { level, text } => outline.open(level, text),
            Block::Text(text) => outline.current().push_text(&text),
            Block::Attachment(name) => outline.current().attachments.push(name),
        }
    }
    outline.finish()
}

#[derive(Default)]
struct OutlineBuilder {
    /// Open sections, shallowest first.
    stack: Vec<Section>,
    /// Body text seen before the first heading.
    preamble: Option<Section>,
    /// Completed top-level sections.
    sections: Vec<Section>,
}

impl OutlineBuilder {
    fn open(&mut self, level: u8, heading: String) {
        self.close_from(level);
        self.stack.push(Section::new(level, heading));
    }

    /// Close open sections at `level` or deeper, deepest first.
    fn close_from(&mut self, level: u8) {
        while self.stack.last().is_some_and(|open| open.level >= level) {
            if let Some(done) = self.stack.pop() {
                self.attach(done);
            }
        }
    }

    fn attach(&mut self, section: Section) {
        match self.stack.last_mut() {
            Some(parent) => parent.subsections.push(section),
            None => self.sections.push(section),
        }
    }

    fn current(&mut self) -> &mut Section {
        match self.stack.last_mut() {
            Some(open) => open,
            None => self.preamble.get_or_insert_with(Section::untitled),
        }
    }

    fn finish(mut self) -> Vec<Section> {
        self.close_from(0);
        let mut outline: Vec<Section> = self.preamble.into_iter().collect();
        outline.append(&mut self.sections);
        if outline.is_empty() {
            outline.push(Section::untitled());
        }
        outline
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn section(level: u8, heading: &str, body: &str, subsections: Vec<Section>) -> Section {
        Section {
            level,
            heading: heading.to_owned(),
            body: body.to_owned(),
            attachments: Vec::new(),
            subsections,
        }
    }

    #[test]
    fn test_two_top_level_sections_with_nested_subsection() {
        let outline = chunk("# A\ntext1\n## B\ntext2\n# C\ntext3");

        assert_eq!(
            outline,
            vec![
                section(1, "A", "text1", vec![section(2, "B", "text2", vec![])]),
                section(1, "C", "text3", vec![]),
            ]
        );
    }

    #[test]
    fn test_strictly_increasing_levels_nest_as_written() {
        let outline = chunk("# One\na\n## Two\nb\n### Three\nc\n#### Four\nd");

        assert_eq!(
            outline,
            vec![section(
                1,
                "One",
                "a",
                vec![section(
                    2,
                    "Two",
                    "b",
                    vec![section(
                        3,
                        "Three",
                        "c",
                        vec![section(4, "Four", "d", vec![])]
                    )]
                )]
            )]
        );
    }

    #[test]
    fn test_skipped_levels_nest_directly() {
        let outline = chunk("# Top\n#### Deep\nx\n## Mid");

        assert_eq!(
            outline,
            vec![section(
                1,
                "Top",
                "",
                vec![
                    section(4, "Deep", "x", vec![]),
                    section(2, "Mid", "", vec![])
                ]
            )]
        );
    }

    #[test]
    fn test_text_before_heading_goes_to_untitled() {
        let outline = chunk("intro text\n\n# A\nbody");

        assert_eq!(
            outline,
            vec![
                section(0, "", "intro text", vec![]),
                section(1, "A", "body", vec![]),
            ]
        );
    }

    #[test]
    fn test_no_headings_yields_single_untitled() {
        let outline = chunk("just a paragraph\n\nand another");

        assert_eq!(
            outline,
            vec![section(0, "", "just a paragraph\nand another", vec![])]
        );
    }

    #[test]
    fn test_empty_content_yields_empty_untitled() {
        assert_eq!(chunk(""), vec![Section::untitled()]);
        assert_eq!(chunk_storage(""), vec![Section::untitled()]);
    }

    #[test]
    fn test_shallower_heading_after_deeper_start() {
        // Outline that starts below H1 keeps document order at the top level.
        let outline = chunk("## Early\na\n# Late\nb");

        assert_eq!(
            outline,
            vec![
                section(2, "Early", "a", vec![]),
                section(1, "Late", "b", vec![]),
            ]
        );
    }

    fn assert_idempotent(content: &str) {
        let outline = chunk(content);

        for top in &outline {
            let rechunked = chunk(&top.to_markdown());
            assert_eq!(rechunked, vec![top.clone()], "content: {content:?}");
        }
    }

    #[test]
    fn test_chunking_is_idempotent() {
        for content in [
            "# A\nalpha\n\nmore alpha\n## B\nbeta\n### C\ngamma\n## D\ndelta\n# E\nepsilon",
            "# Setup\n```sh\n# install deps\nmake\n```\n",
            "# A\n\\*literal\\*",
            "# Lists\n- first\n- second\n\n1. one\n2. two",
            "# Code\n```\nfn main() {\n    run();\n\n}\n```\nafter",
            "# Ticks\n````\n```\n  nested\n````",
            "## C# *notes* and `code`\n> quoted & <b>bold</b>\n\n| a | b |\n|---|---|\n| 1 | 2 |",
            "# Break\nline one  \nline two\\\nline three",
        ] {
            assert_idempotent(content);
        }
    }

    #[test]
    fn test_code_block_heading_stays_in_body() {
        let outline = chunk("# Setup\n```sh\n# install deps\nmake\n```\n");

        assert_eq!(
            outline,
            vec![section(1, "Setup", "# install deps\nmake", vec![])]
        );
        assert_eq!(chunk(&outline[0].to_markdown()), outline);
    }

    #[test]
    fn test_untitled_round_trips() {
        let outline = chunk("loose\n\n# A\nbody");
        let rendered: String = outline.iter().map(Section::to_markdown).collect();

        assert_eq!(chunk(&rendered), outline);
    }

    #[test]
    fn test_storage_matches_markdown() {
        let from_markdown = chunk("# A\ntext1\n## B\ntext2\n# C\ntext3");
        let from_storage = chunk_storage(
            "<h1>A</h1><p>text1</p><h2>B</h2><p>text2</p><h1>C</h1><p>text3</p>",
        );

        assert_eq!(from_storage, from_markdown);
    }

    #[test]
    fn test_attachments_attach_to_current_section() {
        let outline = chunk_storage(
            r#"<h1>Arch</h1><p>Overview</p><ac:image><ri:attachment ri:filename="c4.png"/></ac:image>"#,
        );

        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].body, "Overview");
        assert_eq!(outline[0].attachments, vec!["c4.png".to_owned()]);
    }

    #[test]
    fn test_chunk_blocks_directly() {
        let outline = chunk_blocks(vec![
            Block::Text("pre".to_owned()),
            Block::Attachment("a.png".to_owned()),
            Block::Heading {
                level: 3,
                text: "T".to_owned(),
            },
        ]);

        assert_eq!(outline.len(), 2);
        assert!(outline[0].is_untitled());
        assert_eq!(outline[0].attachments, vec!["a.png".to_owned()]);
        assert_eq!(outline[1].level, 3);
    }

    #[test]
    fn test_chunk_content_dispatches_on_format() {
        assert_eq!(
            chunk_content("<h2>X</h2>", ContentFormat::Storage),
            vec![section(2, "X", "", vec![])]
        );
        assert_eq!(
            chunk_content("## X", ContentFormat::Markdown),
            vec![section(2, "X", "", vec![])]
        );
    }
}
