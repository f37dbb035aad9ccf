//! `pagemap build` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use pagemap_config::{CliSettings, Config, ConfluenceConfig, OutputFormat};
use pagemap_confluence::ConfluenceClient;
use pagemap_layout::layout;
use pagemap_render::{SvgRenderer, write_json};
use pagemap_tree::{
    AbortSignal, BuildOptions, BuildReport, BuildStats, HierarchyBuilder, PageId, PageNode,
};
use serde::Serialize;
use tracing::debug;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Project name, used for output file names and the diagram title.
    pub(crate) project: String,

    /// Expected title of the root page (display only).
    #[arg(long)]
    pub(crate) root_title: String,

    /// Identifier of the root page.
    #[arg(long)]
    pub(crate) root_id: String,

    /// Path to configuration file (default: auto-discover pagemap.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    pub(crate) output_dir: Option<PathBuf>,

    /// Files to write: svg, json or all (overrides config).
    #[arg(long)]
    pub(crate) format: Option<OutputFormat>,

    /// Deepest page level fetched below the root (overrides config).
    #[arg(long)]
    pub(crate) max_depth: Option<usize>,

    /// Overall traversal deadline in seconds, 0 for none (overrides config).
    #[arg(long)]
    pub(crate) timeout: Option<u64>,

    /// Enable verbose output (log every fetched page).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the root page cannot be
    /// fetched, or the output files cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        validate_project_name(&self.project)?;

        let cli_settings = CliSettings {
            output_dir: self.output_dir,
            format: self.format,
            max_depth: self.max_depth,
            timeout_secs: self.timeout,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let conf_config = require_confluence_config(&config, &output)?;
        let client = create_confluence_client(conf_config)?;

        let abort = config
            .traversal
            .timeout()
            .map_or_else(AbortSignal::new, AbortSignal::with_timeout);
        let options = BuildOptions {
            max_depth: config.traversal.max_depth,
            expected_root_title: Some(self.root_title.clone()),
            abort,
        };

        output.info(&format!(
            "Building page tree for {} from page {}...",
            self.project, self.root_id
        ));
        let report = HierarchyBuilder::new(&client, options).build(&PageId::from(self.root_id))?;

        print_diagnostics(&output, &report);

        let written = write_artifacts(&self.project, &report, &config)?;
        for path in &written {
            output.info(&format!("  -> {}", path.display()));
        }
        output.success(&summary(&report.stats));

        Ok(())
    }
}

/// Project names become file name prefixes.
fn validate_project_name(project: &str) -> Result<(), CliError> {
    if project.trim().is_empty() {
        return Err(CliError::Validation("project name cannot be empty".to_owned()));
    }
    if project.contains(['/', '\\']) {
        return Err(CliError::Validation(format!(
            "project name cannot contain path separators: {project}"
        )));
    }
    Ok(())
}

fn require_confluence_config<'a>(
    config: &'a Config,
    output: &Output,
) -> Result<&'a ConfluenceConfig, CliError> {
    if config.confluence.is_none() {
        output.error("Error: confluence configuration required in pagemap.toml");
        output.info("\nAdd the following to your pagemap.toml:");
        output.info("\n[confluence]");
        output.info(r#"base_url = "https://confluence.example.com""#);
        output.info(r#"username = "${CONFLUENCE_USERNAME}""#);
        output.info(r#"api_token = "${CONFLUENCE_API_KEY}""#);
    }
    Ok(config.require_confluence()?)
}

fn create_confluence_client(conf_config: &ConfluenceConfig) -> Result<ConfluenceClient, CliError> {
    let client = ConfluenceClient::from_config(
        &conf_config.base_url,
        conf_config.username.as_deref(),
        &conf_config.api_token,
        conf_config.page_size,
        conf_config.timeout(),
    )?;
    Ok(client)
}

/// Page tree file contents.
#[derive(Serialize)]
struct PageTreeFile<'a> {
    project: &'a str,
    stats: BuildStats,
    diagnostics: Vec<String>,
    root: &'a PageNode,
}

/// Write the configured output files and return their paths.
fn write_artifacts(
    project: &str,
    report: &BuildReport,
    config: &Config,
) -> Result<Vec<PathBuf>, CliError> {
    let dir = &config.output_resolved.dir;
    let format = config.output_resolved.format;
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();

    if format.writes_json() {
        let path = dir.join(format!("{project}_page_tree.json"));
        write_page_tree(project, report, &path)?;
        written.push(path);
    }

    let graph = layout(&report.root, &config.layout);
    debug!(
        "Laid out {} nodes in {:.0}x{:.0}",
        graph.nodes.len(),
        graph.bounds.width,
        graph.bounds.height
    );

    if format.writes_svg() {
        let path = dir.join(format!("{project}_page_tree_diagram.svg"));
        SvgRenderer::with_layout(project, &config.layout).write_svg(&graph, &path)?;
        written.push(path);
    }
    if format.writes_json() {
        let path = dir.join(format!("{project}_page_tree_diagram.layout.json"));
        write_json(&graph, &path)?;
        written.push(path);
    }

    Ok(written)
}

fn write_page_tree(project: &str, report: &BuildReport, path: &Path) -> Result<(), CliError> {
    let file = PageTreeFile {
        project,
        stats: report.stats,
        diagnostics: report.diagnostics.iter().map(ToString::to_string).collect(),
        root: &report.root,
    };
    std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
    Ok(())
}

fn print_diagnostics(output: &Output, report: &BuildReport) {
    if report.diagnostics.is_empty() {
        return;
    }
    output.warning(&format!("\nWarnings ({}):", report.diagnostics.len()));
    for diagnostic in &report.diagnostics {
        output.warning(&format!("  - {diagnostic}"));
    }
}

fn summary(stats: &BuildStats) -> String {
    format!(
        "\nResolved {} pages ({} cross-references, {} unresolved, {} cycles), depth {}",
        stats.pages, stats.cross_references, stats.unresolved, stats.cycles, stats.max_depth
    )
}
