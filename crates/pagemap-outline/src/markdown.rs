//! Markdown tokenizer.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::block::{Block, BlockCollector};

/// Parser options (GFM tables, task lists, strikethrough).
fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Split Markdown into block tokens.
pub(crate) fn tokenize(markdown: &str) -> Vec<Block> {
    let mut collector = BlockCollector::default();

    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                collector.start_heading(heading_level_to_num(level));
            }
            Event::End(TagEnd::Heading(_)) => collector.end_heading(),
            Event::Start(Tag::Item) => collector.set_prefix("- "),
            Event::Start(Tag::TableHead | Tag::TableRow) => collector.start_row(),
            Event::End(TagEnd::TableCell) => collector.end_cell(),
            Event::End(TagEnd::TableHead | TagEnd::TableRow) => collector.end_row(),
            Event::Start(
                Tag::Paragraph
                | Tag::BlockQuote(_)
                | Tag::CodeBlock(_)
                | Tag::List(_)
                | Tag::Table(_)
                | Tag::HtmlBlock
                | Tag::FootnoteDefinition(_)
                | Tag::DefinitionList
                | Tag::DefinitionListTitle
                | Tag::DefinitionListDefinition,
            )
            | Event::End(
                TagEnd::Paragraph
                | TagEnd::BlockQuote(_)
                | TagEnd::CodeBlock
                | TagEnd::List(_)
                | TagEnd::Item
                | TagEnd::Table
                | TagEnd::HtmlBlock
                | TagEnd::FootnoteDefinition
                | TagEnd::DefinitionList
                | TagEnd::DefinitionListTitle
                | TagEnd::DefinitionListDefinition,
            )
            | Event::Rule => collector.flush(),
            Event::Text(text) | Event::Code(text) => collector.push_str(&text),
            Event::SoftBreak | Event::HardBreak => {
                if collector.in_heading() {
                    collector.push_str(" ");
                } else {
                    collector.push_break();
                }
            }
            Event::TaskListMarker(checked) => {
                collector.push_str(if checked { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }

    collector.finish()
}
