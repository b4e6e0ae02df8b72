//! High-level browser API for the Chimera browser.
//!
//! # Scope
//!
//! This crate provides:
//! - **Navigation** - history, network and built-in `wind://` pages
//! - **Document Loading** - parse HTML and run layout
//! - **Text Measurement** - fontdue-backed [`TextMeasurer`]
//! - **Image Loading** - fetch, decode and shrink images for layout
//! - **Software Rendering** - headless screenshot generation
//!
//! # Not Implemented
//!
//! - Cookies and script execution
//! - Scrolling (content below the surface is clipped)
//! - A windowing toolkit; the window title is exposed as a string

pub mod fonts;
pub mod image_loader;
pub mod navigation;
pub mod renderer;
pub mod text_metrics;

pub use chimera_dom as dom;
pub use chimera_html as html;
pub use chimera_layout as layout;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chimera_common::BrowserConfig;
use chimera_common::net::FetchError;
use chimera_common::url::is_http_url;
use chimera_common::warning::clear_warnings;
use chimera_dom::DomTree;
use chimera_html::{HTMLParser, HTMLTokenizer};
use chimera_layout::{ApproximateTextMeasurer, LayoutEngine, PageLayout, Rect, TextMeasurer};
use log::{info, warn};

use crate::fonts::FontSet;
use crate::image_loader::HttpImageResolver;
use crate::navigation::{HistoryManager, error_page, fetch_page};
use crate::renderer::Renderer;
use crate::text_metrics::FontdueTextMeasurer;

/// Browser version shown in the window title and on `wind://about`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Title shown before the first page has loaded.
pub const LOADING_TITLE: &str = "Loading...";

/// Error type for document loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Failed to read a local file.
    #[error("failed to read '{}': {source}", path.display())]
    File {
        /// The file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Failed to fetch a URL.
    #[error("network error: {0}")]
    Network(#[from] FetchError),
}

/// A loaded and laid out page.
#[derive(Debug)]
pub struct LoadedPage {
    /// Source path or URL.
    pub url: String,
    /// Original HTML source.
    pub html_source: String,
    /// Parsed DOM tree.
    pub dom: DomTree,
    /// Result of the last layout pass.
    pub layout: PageLayout,
    /// Parse issues/warnings.
    pub parse_issues: Vec<String>,
}

/// Parse an HTML string, keeping the parser's issues.
#[must_use]
pub fn parse_html(html: &str) -> (DomTree, Vec<String>) {
    let mut tokenizer = HTMLTokenizer::new(html.to_string());
    tokenizer.run();
    let (dom, issues) = HTMLParser::new(tokenizer.into_tokens()).run_with_issues();
    (dom, issues.into_iter().map(|i| i.message).collect())
}

/// One browser window: configuration, layout engine, services, history and
/// the current page.
///
/// Every navigation replaces the page wholesale; nothing is cached across
/// pages.
pub struct BrowserSession {
    config: BrowserConfig,
    viewport: Rect,
    engine: LayoutEngine,
    fonts: FontSet,
    measurer: Box<dyn TextMeasurer>,
    resolver: HttpImageResolver,
    history: Option<HistoryManager>,
    page: Option<LoadedPage>,
}

impl BrowserSession {
    /// Create a session using system fonts.
    ///
    /// Falls back to approximate text metrics when no font is installed.
    #[must_use]
    pub fn new(config: BrowserConfig, viewport: Rect) -> Self {
        let fonts = FontSet::load_system();
        let measurer: Box<dyn TextMeasurer> = if fonts.is_empty() {
            warn!("no fonts available; using approximate text metrics");
            Box::new(ApproximateTextMeasurer)
        } else {
            Box::new(FontdueTextMeasurer::new(fonts.clone()))
        };
        Self::with_measurer(config, viewport, fonts, measurer)
    }

    /// Create a session with explicit fonts and text measurer.
    #[must_use]
    pub fn with_measurer(
        config: BrowserConfig,
        viewport: Rect,
        fonts: FontSet,
        measurer: Box<dyn TextMeasurer>,
    ) -> Self {
        Self {
            engine: LayoutEngine::new(&config),
            resolver: HttpImageResolver::new(config.timeout(), config.margin()),
            config,
            viewport,
            fonts,
            measurer,
            history: None,
            page: None,
        }
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// The layout engine, including its diagnostics log.
    #[must_use]
    pub const fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    /// The history, once something has been navigated to.
    #[must_use]
    pub const fn history(&self) -> Option<&HistoryManager> {
        self.history.as_ref()
    }

    /// The current page.
    #[must_use]
    pub const fn page(&self) -> Option<&LoadedPage> {
        self.page.as_ref()
    }

    /// The current viewport.
    #[must_use]
    pub const fn viewport(&self) -> Rect {
        self.viewport
    }

    /// `"Project Chimera v{VERSION} - {title}"`.
    #[must_use]
    pub fn window_title(&self) -> String {
        let title = self
            .page
            .as_ref()
            .map_or(LOADING_TITLE, |page| page.layout.title.as_str());
        format!("Project Chimera v{VERSION} - {title}")
    }

    /// Navigate to `url`, recording it in history.
    ///
    /// A failed network fetch shows an error page and adds the error to the
    /// diagnostics log; the page is replaced either way.
    pub fn navigate(&mut self, url: &str) -> &LoadedPage {
        self.history
            .get_or_insert_with(|| HistoryManager::new(url))
            .navigate_to(url);
        self.load_current()
    }

    /// Go back one page. `None` if there is nothing to go back to.
    pub fn back(&mut self) -> Option<&LoadedPage> {
        let _ = self.history.as_mut()?.go_back()?;
        Some(self.load_current())
    }

    /// Go forward one page. `None` if there is nothing to go forward to.
    pub fn forward(&mut self) -> Option<&LoadedPage> {
        let _ = self.history.as_mut()?.go_forward()?;
        Some(self.load_current())
    }

    fn load_current(&mut self) -> &LoadedPage {
        let url = self
            .history
            .as_ref()
            .map(|h| h.current_url().to_string())
            .unwrap_or_default();
        let html = match fetch_page(&url, self.config.timeout()) {
            Ok(html) => html,
            Err(err) => {
                warn!("failed to load {url}: {err}");
                self.engine.log_mut().append(&err.to_string());
                error_page("Network error", &err.to_string())
            }
        };
        let base_url = is_http_url(&url).then_some(url.as_str());
        self.install(&url, html, base_url)
    }

    /// Load a local HTML file without touching history.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::File`] if the file cannot be read.
    pub fn load_file(&mut self, path: &Path) -> Result<&LoadedPage, LoadError> {
        let html = fs::read_to_string(path).map_err(|source| LoadError::File {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.install(&path.display().to_string(), html, None))
    }

    /// Load an HTML string without touching history.
    pub fn load_html(&mut self, html: &str, base_url: Option<&str>) -> &LoadedPage {
        self.install(base_url.unwrap_or("about:blank"), html.to_string(), base_url)
    }

    fn install(&mut self, url: &str, html: String, base_url: Option<&str>) -> &LoadedPage {
        clear_warnings();
        self.resolver.clear();
        self.engine.set_base_url(base_url);

        let (dom, parse_issues) = parse_html(&html);
        let layout = self.engine.layout(
            &dom,
            self.viewport,
            self.measurer.as_ref(),
            &mut self.resolver,
        );
        info!("loaded {url}: {} commands, title {:?}", layout.commands.len(), layout.title);

        self.page.insert(LoadedPage {
            url: url.to_string(),
            html_source: html,
            dom,
            layout,
            parse_issues,
        })
    }

    /// Lay out the current page again in a new viewport (window resize).
    ///
    /// Images are resolved again; the previous command list is discarded.
    pub fn relayout(&mut self, viewport: Rect) -> Option<&LoadedPage> {
        self.viewport = viewport;
        let page = self.page.as_mut()?;
        self.resolver.clear();
        page.layout = self.engine.layout(
            &page.dom,
            viewport,
            self.measurer.as_ref(),
            &mut self.resolver,
        );
        Some(&*page)
    }

    /// Draw the current page into a new surface the size of the viewport.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render(&self) -> Option<Renderer<'_>> {
        let page = self.page.as_ref()?;
        let mut renderer = Renderer::new(
            self.viewport.right().max(1.0) as u32,
            self.viewport.bottom().max(1.0) as u32,
            self.config.margin(),
            &self.fonts,
            self.resolver.store(),
        );
        renderer.render(&page.layout, self.viewport);
        Some(renderer)
    }

    /// Render the current page and save it as an image file.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is loaded or the file cannot be written.
    pub fn screenshot(&self, path: &Path) -> Result<()> {
        let renderer = self
            .render()
            .ok_or_else(|| anyhow::anyhow!("no page loaded"))?;
        renderer.save(path)
    }
}
