//! Confluence storage-format tokenizer.
//!
//! Walks the XHTML with `quick-xml`. Storage markup from real spaces is not
//! always well-formed, so end-tag names are not checked and a hard syntax
//! error ends tokenizing with the blocks read so far.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::warn;

use crate::block::{Block, BlockCollector};
use crate::entities::{convert_html_entities, decode_entity};

/// Confluence XML namespaces.
const NAMESPACES: &[(&str, &str)] = &[
    ("ac", "http://www.atlassian.com/schema/confluence/4/ac/"),
    ("ri", "http://www.atlassian.com/schema/confluence/4/ri/"),
];

/// Elements whose text never reaches the outline.
const SKIPPED: &[&str] = &["ac:parameter", "ac:placeholder", "style", "script"];

/// Elements that start and end a body block.
const BLOCKS: &[&str] = &[
    "p",
    "div",
    "blockquote",
    "ul",
    "ol",
    "table",
    "thead",
    "tbody",
    "hr",
    "dl",
    "dt",
    "dd",
    "ac:structured-macro",
    "ac:rich-text-body",
    "ac:layout",
    "ac:layout-section",
    "ac:layout-cell",
    "ac:task",
];

/// Split storage-format XHTML into block tokens.
pub(crate) fn tokenize(xhtml: &str) -> Vec<Block> {
    let html = convert_html_entities(xhtml);
    let namespace_decls = NAMESPACES
        .iter()
        .map(|(prefix, uri)| format!(r#"xmlns:{prefix}="{uri}""#))
        .collect::<Vec<_>>()
        .join(" ");
    let wrapped = format!("<root {namespace_decls}>{html}</root>");

    let mut reader = Reader::from_str(&wrapped);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;

    let mut walker = Walker::default();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => walker.start(&e),
            Ok(Event::Empty(e)) => {
                walker.start(&e);
                walker.end(&tag_name(e.name().as_ref()));
            }
            Ok(Event::End(e)) => walker.end(&tag_name(e.name().as_ref())),
            Ok(Event::Text(e)) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_or_else(|_| String::from_utf8_lossy(&e).into_owned(), Cow::into_owned);
                walker.text(&text);
            }
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(&e).into_owned();
                walker.text(&decode_entity(&entity));
            }
            Ok(Event::CData(e)) => walker.text(&String::from_utf8_lossy(&e)),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(
                    position = reader.error_position(),
                    "Malformed storage content, keeping blocks read so far: {err}"
                );
                break;
            }
        }
    }

    walker.collector.finish()
}

fn tag_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key.as_bytes())
        .map(|attr| {
            attr.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&attr.value).into_owned(),
                Cow::into_owned,
            )
        })
}

/// Last path segment of an attachment reference, without query string.
fn short_name(filename: &str) -> String {
    let name = filename.rsplit('/').next().unwrap_or(filename);
    name.split('?').next().unwrap_or(name).to_owned()
}

#[derive(Default)]
struct Walker {
    collector: BlockCollector,
    skip_depth: usize,
    preformatted: usize,
    media: usize,
}

impl Walker {
    fn start(&mut self, e: &BytesStart<'_>) {
        let tag = tag_name(e.name().as_ref());
        if self.skip_depth > 0 {
            self.skip_depth += 1;
            return;
        }
        if SKIPPED.contains(&tag.as_str()) {
            self.skip_depth = 1;
            return;
        }
        if let Some(level) = heading_level(&tag) {
            self.collector.start_heading(level);
            return;
        }
        match tag.as_str() {
            "li" => self.collector.set_prefix("- "),
            "tr" => self.collector.start_row(),
            "br" => {
                if self.collector.in_heading() {
                    self.collector.push_str(" ");
                } else {
                    self.collector.push_break();
                }
            }
            "pre" | "ac:plain-text-body" => {
                self.collector.flush();
                self.preformatted += 1;
            }
            "ac:image" | "ac:link" => self.media += 1,
            "ri:attachment" if self.media > 0 => {
                if let Some(filename) = attribute(e, "ri:filename") {
                    self.collector.attachment(short_name(&filename));
                }
            }
            other if BLOCKS.contains(&other) => self.collector.flush(),
            _ => {}
        }
    }

    fn end(&mut self, tag: &str) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return;
        }
        if heading_level(tag).is_some() {
            self.collector.end_heading();
            return;
        }
        match tag {
            "td" | "th" => self.collector.end_cell(),
            "tr" => self.collector.end_row(),
            "pre" | "ac:plain-text-body" => {
                self.collector.flush();
                self.preformatted = self.preformatted.saturating_sub(1);
            }
            "ac:image" | "ac:link" => self.media = self.media.saturating_sub(1),
            "li" => self.collector.flush(),
            other if BLOCKS.contains(&other) => self.collector.flush(),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.skip_depth > 0 {
            return;
        }
        if self.preformatted > 0 {
            self.collector.push_str(text);
        } else {
            self.collector.push_collapsed(text);
        }
    }
}
