//! `pagemap outline` command implementation.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;
use console::Term;
use pagemap_outline::{ContentFormat, Section, chunk_content};

use crate::error::CliError;

/// Arguments for the outline command.
#[derive(Args)]
pub(crate) struct OutlineArgs {
    /// Page content file to chunk.
    pub(crate) file: PathBuf,

    /// Treat the file as Confluence storage format (XHTML) instead of Markdown.
    #[arg(long)]
    pub(crate) storage: bool,

    /// Print the outline as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

impl OutlineArgs {
    /// Execute the outline command.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let content = std::fs::read_to_string(&self.file)?;
        let format = if self.storage {
            ContentFormat::Storage
        } else {
            ContentFormat::Markdown
        };
        let outline = chunk_content(&content, format);

        let text = if self.json {
            serde_json::to_string_pretty(&outline)?
        } else {
            format_outline(&outline)
        };
        Term::stdout().write_line(text.trim_end())?;

        Ok(())
    }
}

/// Indented text rendering, one line per section.
fn format_outline(outline: &[Section]) -> String {
    let mut out = String::new();
    for section in outline {
        write_section(&mut out, section, 0);
    }
    out
}

fn write_section(out: &mut String, section: &Section, indent: usize) {
    let pad = "  ".repeat(indent);
    let heading = if section.heading.is_empty() {
        "Untitled Content"
    } else {
        section.heading.as_str()
    };
    let lines = section.body.lines().filter(|l| !l.trim().is_empty()).count();
    let _ = writeln!(out, "{pad}{}: {heading} ({lines} lines)", section.label());
    if !section.attachments.is_empty() {
        let _ = writeln!(out, "{pad}  attachments: {}", section.attachments.join(", "));
    }
    for sub in &section.subsections {
        write_section(out, sub, indent + 1);
    }
}
