//! Chimera CLI - headless front end for the layout engine
//!
//! Loads a page, runs one layout pass and prints what the draw step would
//! receive: the window title, the render commands and the diagnostics log.
//!
//! Usage:
//!   chimera <URL|FILE>                 Lay out a page and print the commands
//!   chimera <URL|FILE> --json          Print the page layout as JSON
//!   chimera --html '<h1>Hi</h1>'       Lay out an HTML string
//!   chimera wind://about -S about.png  Save a screenshot

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chimera_browser::dom::{NodeId, format_tree};
use chimera_browser::navigation::ABOUT_URL;
use chimera_browser::{BrowserSession, LoadedPage};
use chimera_common::BrowserConfig;
use chimera_common::url::scheme;
use chimera_layout::{PageMetadata, Rect, RenderCommand};
use clap::Parser;
use log::{LevelFilter, debug};
use owo_colors::OwoColorize;

#[derive(Parser, Debug)]
#[command(name = "chimera")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Built-in about page
    chimera

    # Fetch and lay out a remote page
    chimera https://example.com

    # Local file, narrow window, JSON output
    chimera page.html --width 400 --json

    # Show the parsed DOM before the render commands
    chimera --html '<ul><li>one<li>two</ul>' --dom

    # Render to PNG
    chimera page.html -S out.png
"#)]
struct Cli {
    /// URL (http, https or wind) or path to an HTML file
    #[arg(value_name = "URL|FILE")]
    target: Option<String>,

    /// Lay out an HTML string instead of a URL or file
    #[arg(long, value_name = "HTML", conflicts_with = "target")]
    html: Option<String>,

    /// Browser configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Viewport width
    #[arg(long, default_value = "680")]
    width: u32,

    /// Viewport height
    #[arg(long, default_value = "540")]
    height: u32,

    /// Print the page layout as JSON
    #[arg(short, long)]
    json: bool,

    /// Also print the parsed DOM tree
    #[arg(long)]
    dom: bool,

    /// Render the page and save it to the specified file (PNG format)
    #[arg(short = 'S', long, value_name = "FILE")]
    screenshot: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// What the positional argument refers to.
#[derive(Debug, PartialEq, Eq)]
enum Target {
    Url(String),
    File(PathBuf),
}

impl Target {
    /// Anything with a URL scheme is navigated to (unsupported schemes get
    /// the browser's error page); everything else is a file path.
    ///
    /// Single-letter schemes are drive letters, not URLs.
    fn classify(arg: &str) -> Self {
        match scheme(arg) {
            Some(s) if s.len() > 1 => Self::Url(arg.to_string()),
            _ => Self::File(PathBuf::from(arg)),
        }
    }
}

/// `-v` wins over `RUST_LOG`; without either, only warnings are shown.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        let _ = builder.filter_level(level);
    }
    let _ = builder.try_init();
}

fn load_config(path: Option<&Path>) -> Result<BrowserConfig> {
    let Some(path) = path else {
        return Ok(BrowserConfig::default());
    };
    BrowserConfig::load(path).with_context(|| format!("loading config {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    debug!("config: {config:?}");
    let viewport = Rect::new(0.0, 0.0, cli.width as f32, cli.height as f32);
    let mut session = BrowserSession::new(config, viewport);

    if let Some(html) = &cli.html {
        let _ = session.load_html(html, None);
    } else {
        let target = cli.target.as_deref().unwrap_or(ABOUT_URL);
        match Target::classify(target) {
            Target::Url(url) => {
                let _ = session.navigate(&url);
            }
            Target::File(path) => {
                let _ = session.load_file(&path)?;
            }
        }
    }

    let page = session.page().context("no page was loaded")?;

    if cli.dom {
        println!("=== DOM Tree ===");
        print!("{}", format_tree(&page.dom, NodeId::ROOT));
        println!();
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&page.layout)?);
    } else {
        print_page(&session.window_title(), page);
    }

    if let Some(path) = &cli.screenshot {
        session
            .screenshot(path)
            .with_context(|| format!("saving screenshot to {}", path.display()))?;
        eprintln!("Screenshot saved to {}", path.display());
    }

    Ok(())
}

fn print_page(window_title: &str, page: &LoadedPage) {
    let layout = &page.layout;

    println!("=== {} ===", window_title.bold());
    println!("url: {}", page.url);
    println!("content height: {:.1}", layout.content_height);

    if !page.parse_issues.is_empty() {
        println!("\n=== Parse Issues ({}) ===", page.parse_issues.len());
        for issue in &page.parse_issues {
            println!("  {}", issue.yellow());
        }
    }

    println!("\n=== Render Commands ({}) ===", layout.commands.len());
    for (i, command) in layout.commands.iter().enumerate() {
        println!("  {i:3}: {}", describe(command));
    }

    let links = PageMetadata::extract(&page.dom).links;
    if !links.is_empty() {
        println!("\n=== Links ({}) ===", links.len());
        for link in &links {
            println!("  {}", link.underline());
        }
    }

    println!("\n=== Diagnostics ({}) ===", layout.diagnostics.len());
    if layout.diagnostics.is_empty() {
        println!("  {}", "(empty)".dimmed());
    }
    for entry in &layout.diagnostics {
        println!("  {}", entry.red());
    }
}

/// One-line summary of a render command.
fn describe(command: &RenderCommand) -> String {
    let position = format!(
        "({:.1}, {:.1}) h={:.1}",
        command.x(),
        command.y(),
        command.height()
    );
    match command {
        RenderCommand::Text(text) => format!(
            "{} <{}> {} {:?}",
            "text".green(),
            text.tag,
            position,
            preview(&text.text)
        ),
        RenderCommand::Image(image) => format!(
            "{} <{}> {} {}x{}",
            "image".cyan(),
            image.tag,
            position,
            image.image.width,
            image.image.height
        ),
        RenderCommand::TableCell(cell) => {
            let image = cell
                .image
                .as_ref()
                .map(|i| format!(" +img {}x{}", i.width, i.height))
                .unwrap_or_default();
            format!(
                "{} {} w={:.1} {:?}{}",
                "cell".magenta(),
                position,
                cell.width,
                preview(&cell.text),
                image
            )
        }
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 50;
    if text.chars().count() > MAX {
        let cut: String = text.chars().take(MAX).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
