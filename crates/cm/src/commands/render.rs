//! `cm render` command implementation.

use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Args;
use cm_ast::MarkdownParser;
use cm_config::{CliSettings, Config, HtmlConfig};
use cm_renderer::{HtmlRenderer, RenderOptions};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: stdin).
    input: Option<PathBuf>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover cmark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Drop unsafe link destinations and raw HTML (overrides config).
    #[arg(long)]
    safe: bool,

    /// Add data-sourcepos attributes to block elements (overrides config).
    #[arg(long)]
    sourcepos: bool,

    /// Fill image alt attributes with their plain text (overrides config).
    #[arg(long)]
    alt_text: bool,

    /// Text to emit for soft line breaks (overrides config).
    #[arg(long, env = "CM_SOFTBREAK")]
    softbreak: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read or
    /// the output cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            softbreak: self.softbreak,
            safe: self.safe.then_some(true),
            sourcepos: self.sourcepos.then_some(true),
            alt_text: self.alt_text.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let markdown = match &self.input {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };

        let html = render_source(&markdown, &config.html)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &html)?;
                Output::new().success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

/// Build renderer options from the `[html]` config section.
fn render_options(html: &HtmlConfig) -> RenderOptions {
    RenderOptions::new()
        .with_soft_break(html.softbreak.as_str())
        .with_safe(html.safe)
        .with_source_pos(html.sourcepos)
        .with_alt_text(html.alt_text)
}

/// Parse and render one markdown source.
fn render_source(markdown: &str, html: &HtmlConfig) -> Result<String, CliError> {
    let options = render_options(html);
    let doc = MarkdownParser::new()
        .with_source_pos(options.source_pos)
        .parse(markdown);
    tracing::info!(nodes = doc.len(), "Parsed input");
    Ok(HtmlRenderer::new(options).render(&doc)?)
}
