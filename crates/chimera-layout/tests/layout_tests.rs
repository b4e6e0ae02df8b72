//! Integration tests for the layout engine.

use chimera_common::{BrowserConfig, ImageHandle};
use chimera_dom::{DomTree, ElementData, NodeId};
use chimera_html::parse_document;
use chimera_layout::{
    BlockTag, CELL_WIDTH, FontSpec, IMAGE_FALLBACK_HEIGHT, ImageError, ImageResolver,
    LayoutEngine, LayoutError, MeasureError, PageLayout, PageMetadata, Rect, RenderCommand,
    ResolvedImage, TextAlign, TextMeasurer, TextMetrics,
};

const MARGIN: f32 = 8.0;

/// Line height equals the font size; width is one unit per character.
struct FixedMeasurer;

impl TextMeasurer for FixedMeasurer {
    fn measure(&self, font: &FontSpec, text: &str) -> Result<TextMetrics, MeasureError> {
        Ok(TextMetrics {
            width: text.chars().count() as f32,
            line_height: font.size,
        })
    }

    fn line_height(&self, font: &FontSpec) -> Result<f32, MeasureError> {
        Ok(font.size)
    }
}

struct FailingMeasurer;

impl TextMeasurer for FailingMeasurer {
    fn measure(&self, _font: &FontSpec, _text: &str) -> Result<TextMetrics, MeasureError> {
        Err(MeasureError::NoFont("helvetica".to_string()))
    }

    fn line_height(&self, _font: &FontSpec) -> Result<f32, MeasureError> {
        Err(MeasureError::NoFont("helvetica".to_string()))
    }
}

/// Records every URL it is asked for. Resolves to `size` when set,
/// otherwise fails.
#[derive(Default)]
struct RecordingResolver {
    calls: Vec<String>,
    size: Option<(u32, u32)>,
}

impl RecordingResolver {
    fn with_size(width: u32, height: u32) -> Self {
        Self {
            calls: Vec::new(),
            size: Some((width, height)),
        }
    }
}

impl ImageResolver for RecordingResolver {
    fn resolve(&mut self, url: &str) -> Result<ResolvedImage, ImageError> {
        self.calls.push(url.to_string());
        match self.size {
            Some((width, height)) => Ok(ResolvedImage {
                width,
                height,
                handle: ImageHandle(self.calls.len() as u64),
            }),
            None => Err(ImageError::Fetch("connection refused".to_string())),
        }
    }
}

fn viewport() -> Rect {
    Rect::new(0.0, 0.0, 800.0, 600.0)
}

fn engine() -> LayoutEngine {
    LayoutEngine::new(&BrowserConfig::default())
}

fn layout_html(html: &str, resolver: &mut RecordingResolver) -> PageLayout {
    engine().layout(&parse_document(html), viewport(), &FixedMeasurer, resolver)
}

fn element(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
    let id = tree.create_element(ElementData::new(tag));
    tree.append_child(parent, id);
    id
}

fn assert_y_non_decreasing(layout: &PageLayout) {
    for pair in layout.commands.windows(2) {
        assert!(
            pair[0].y() <= pair[1].y(),
            "y decreased: {:?} then {:?}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_no_body_gives_empty_layout_and_default_title() {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, "html");
    let head = element(&mut tree, html, "head");
    let title = element(&mut tree, head, "title");
    tree.append_text(title, "Ignored");

    let layout = engine().layout(
        &tree,
        viewport(),
        &FixedMeasurer,
        &mut RecordingResolver::default(),
    );
    assert!(layout.commands.is_empty());
    assert_eq!(layout.title, "No Title");
}

#[test]
fn test_heading_position_and_style() {
    let layout = layout_html("<h1>Welcome</h1><p>Body</p>", &mut RecordingResolver::default());
    assert_eq!(layout.commands.len(), 2);

    let RenderCommand::Text(h1) = &layout.commands[0] else {
        panic!("expected text, got {:?}", layout.commands[0]);
    };
    assert_eq!(h1.tag, "h1");
    assert_eq!((h1.x, h1.y), (MARGIN, MARGIN));
    assert_eq!(h1.height, 24.0 + 2.0 * MARGIN);
    assert_eq!(h1.align, TextAlign::Center);
    assert!(h1.font.is_bold());

    let RenderCommand::Text(p) = &layout.commands[1] else {
        panic!("expected text, got {:?}", layout.commands[1]);
    };
    assert_eq!(p.y, h1.y + h1.height);
    assert!(p.background.is_some());
}

#[test]
fn test_whitespace_only_block_is_skipped() {
    let layout = layout_html("<p>   \n\t </p><h2>Next</h2>", &mut RecordingResolver::default());
    assert_eq!(layout.commands.len(), 1);
    assert_eq!(layout.commands[0].tag(), "h2");
    assert_eq!(layout.commands[0].y(), MARGIN);
}

#[test]
fn test_list_item_gets_bullet() {
    let layout = layout_html(
        "<ul><li>Buy milk</li><li> Eggs </li></ul>",
        &mut RecordingResolver::default(),
    );
    let texts: Vec<&str> = layout.commands.iter().filter_map(|c| c.text()).collect();
    assert_eq!(texts, vec!["\u{2022} Buy milk", "\u{2022} Eggs"]);
    assert_eq!(BlockTag::Li.prefix(), "\u{2022} ");
}

#[test]
fn test_table_cell_columns() {
    let layout = layout_html(
        "<table><tr><td>a</td><td>b</td><td>c</td></tr></table>",
        &mut RecordingResolver::default(),
    );
    let xs: Vec<f32> = layout.commands.iter().map(RenderCommand::x).collect();
    assert_eq!(xs, vec![MARGIN, MARGIN + CELL_WIDTH, MARGIN + 2.0 * CELL_WIDTH]);
    for command in &layout.commands {
        let RenderCommand::TableCell(cell) = command else {
            panic!("expected table cell, got {command:?}");
        };
        assert_eq!(cell.y, MARGIN + MARGIN);
        assert_eq!(cell.width, CELL_WIDTH);
        assert!(cell.border);
    }
}

#[test]
fn test_table_with_image_cell() {
    let mut resolver = RecordingResolver::with_size(50, 50);
    let layout = layout_html(
        r#"<table><tr><td>Cell 1.1</td><td><img src="http://img.test/a.png"></td></tr></table>"#,
        &mut resolver,
    );

    let cells: Vec<_> = layout
        .commands
        .iter()
        .filter_map(|c| match c {
            RenderCommand::TableCell(cell) => Some(cell),
            _ => None,
        })
        .collect();
    assert_eq!(cells.len(), 2);
    let (first, second) = (cells[0], cells[1]);

    assert_eq!(first.text, "Cell 1.1");
    assert!(first.image.is_none());
    assert_eq!(first.height, 12.0 + MARGIN + 2.0 * MARGIN);

    let image = second.image.expect("second cell has an image");
    assert_eq!((image.width, image.height), (50, 50));
    assert!(second.height >= 50.0 + 2.0 * MARGIN);

    // The walk reaches the img again after the grid and lays it out on its own.
    assert_eq!(layout.commands.len(), 3);
    let RenderCommand::Image(standalone) = &layout.commands[2] else {
        panic!("expected image after the table, got {:?}", layout.commands[2]);
    };
    let table_bottom = MARGIN + second.height + MARGIN;
    assert_eq!(standalone.y, table_bottom);
    assert_eq!(standalone.height, 50.0 + MARGIN);
    assert_eq!(
        resolver.calls,
        vec!["http://img.test/a.png", "http://img.test/a.png"]
    );
    assert_eq!(layout.content_height, table_bottom + standalone.height);
}

#[test]
fn test_blocks_inside_cells_follow_the_table() {
    let layout = layout_html(
        r#"<table><tr><td><p>Inside</p><a href="/x">Link</a></td></tr></table>"#,
        &mut RecordingResolver::default(),
    );

    let kinds: Vec<(&str, Option<&str>)> = layout
        .commands
        .iter()
        .map(|c| (c.tag(), c.text()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("td", Some("InsideLink")),
            ("p", Some("Inside")),
            ("a", Some("Link")),
        ]
    );

    let cell_height = 12.0 + MARGIN + 2.0 * MARGIN;
    let p = &layout.commands[1];
    assert_eq!(p.y(), MARGIN + cell_height + MARGIN);
    assert_eq!(p.x(), MARGIN);
    assert_eq!(layout.commands[2].y(), p.y() + 14.0 + 2.0 * MARGIN);
    assert_y_non_decreasing(&layout);
}

#[test]
fn test_rows_inside_tbody() {
    let layout = layout_html(
        "<table><tbody><tr><td>1</td></tr><tr><td>2</td></tr></tbody></table>",
        &mut RecordingResolver::default(),
    );
    assert_eq!(layout.commands.len(), 2);
    let row_height = 12.0 + MARGIN + 2.0 * MARGIN;
    assert_eq!(layout.commands[1].y(), layout.commands[0].y() + row_height);
    assert_eq!(layout.commands[1].x(), MARGIN);
}

#[test]
fn test_empty_table_adds_only_margin() {
    let layout = layout_html("<table></table><p>after</p>", &mut RecordingResolver::default());
    assert_eq!(layout.commands.len(), 1);
    assert_eq!(layout.commands[0].y(), MARGIN + MARGIN);
}

#[test]
fn test_cell_image_without_src_is_logged() {
    let layout = layout_html(
        "<table><tr><td>x<img alt=nothing></td></tr></table>",
        &mut RecordingResolver::default(),
    );
    let RenderCommand::TableCell(cell) = &layout.commands[0] else {
        panic!("expected table cell");
    };
    assert!(cell.image.is_none());
    assert!(matches!(
        layout.errors.as_slice(),
        [LayoutError::ImageResolutionFailure { detail, .. }] if detail == "missing src"
    ));
}

#[test]
fn test_insecure_image_never_reaches_resolver() {
    let mut resolver = RecordingResolver::with_size(10, 10);
    let layout = layout_html(
        r#"<p>before</p><img src="ftp://files.example.com/pic.png"><p>after</p>"#,
        &mut resolver,
    );

    assert!(resolver.calls.is_empty());
    assert_eq!(layout.errors.len(), 1);
    assert!(matches!(
        &layout.errors[0],
        LayoutError::InsecureSchemeRejected { url_prefix } if url_prefix == "ftp://files.exa..."
    ));
    assert_eq!(layout.diagnostics.len(), 1);
    assert!(layout.diagnostics[0].starts_with("[Security]"));

    let before = &layout.commands[0];
    let after = &layout.commands[1];
    assert_eq!(after.y() - (before.y() + before.height()), IMAGE_FALLBACK_HEIGHT);
}

#[test]
fn test_standalone_image_success_and_failure() {
    let mut resolver = RecordingResolver::with_size(40, 30);
    let layout = layout_html(r#"<img src="https://img.test/ok.png"><p>x</p>"#, &mut resolver);
    let RenderCommand::Image(image) = &layout.commands[0] else {
        panic!("expected image");
    };
    assert_eq!(image.height, 30.0 + MARGIN);
    assert_eq!(layout.commands[1].y(), MARGIN + image.height);

    let mut failing = RecordingResolver::default();
    let layout = layout_html(r#"<img src="https://img.test/missing.png"><p>x</p>"#, &mut failing);
    assert_eq!(layout.commands.len(), 1);
    assert_eq!(layout.commands[0].y(), MARGIN + IMAGE_FALLBACK_HEIGHT);
    assert!(layout.diagnostics[0].starts_with("image load/decode error"));
}

#[test]
fn test_image_without_src_is_skipped_silently() {
    let mut resolver = RecordingResolver::with_size(10, 10);
    let layout = layout_html(r#"<img src=""><img><p>x</p>"#, &mut resolver);
    assert!(resolver.calls.is_empty());
    assert!(layout.errors.is_empty());
    assert_eq!(layout.commands[0].y(), MARGIN);
}

#[test]
fn test_relative_image_resolves_against_base_url() {
    let mut engine = engine();
    engine.set_base_url(Some("http://site.test/dir/page.html"));
    let mut resolver = RecordingResolver::with_size(5, 5);
    let _ = engine.layout(
        &parse_document(r#"<img src="img/a.png">"#),
        viewport(),
        &FixedMeasurer,
        &mut resolver,
    );
    assert_eq!(resolver.calls, vec!["http://site.test/dir/img/a.png"]);
}

#[test]
fn test_nested_title() {
    let layout = layout_html(
        "<body><div><title> Foo </title></div><p>x</p></body>",
        &mut RecordingResolver::default(),
    );
    assert_eq!(layout.title, "Foo");
}

#[test]
fn test_missing_title_uses_default() {
    let metadata = PageMetadata::extract(&parse_document("<body><p>x</p></body>"));
    assert_eq!(metadata.title, "No Title");
}

#[test]
fn test_metadata_title_and_links() {
    let dom = parse_document(
        "<title>  </title><body><a href=\"/one\">1</a><p><a>no href</a><a href=\"two\">2</a></p></body>",
    );
    let metadata = PageMetadata::extract(&dom);
    // Present but blank is not the same as missing.
    assert_eq!(metadata.title, "");
    assert_eq!(metadata.links, vec!["/one", "two"]);
}

#[test]
fn test_y_is_non_decreasing() {
    let layout = layout_html(
        r#"<h1>A</h1><section>B</section>
           <table><tr><td>1</td><td><img src="http://i.test/x.png"></td></tr><tr><td>2</td></tr></table>
           <img src="http://i.test/y.png"><article>C</article><ul><li>D</li></ul><a href="/">E</a>"#,
        &mut RecordingResolver::with_size(20, 60),
    );
    assert!(layout.commands.len() >= 8);
    assert_y_non_decreasing(&layout);
}

#[test]
fn test_measurement_failure_skips_elements() {
    let layout = engine().layout(
        &parse_document("<p>a</p><h2>b</h2>"),
        viewport(),
        &FailingMeasurer,
        &mut RecordingResolver::default(),
    );
    assert!(layout.commands.is_empty());
    assert_eq!(layout.errors.len(), 2);
    assert!(
        layout
            .errors
            .iter()
            .all(|e| matches!(e, LayoutError::MeasurementFailure { .. }))
    );
}

#[test]
fn test_measurement_failure_keeps_cell_geometry() {
    let layout = engine().layout(
        &parse_document("<table><tr><td>a</td><td>b</td></tr></table>"),
        viewport(),
        &FailingMeasurer,
        &mut RecordingResolver::default(),
    );
    let cells: Vec<(f32, f32, &str)> = layout
        .commands
        .iter()
        .filter_map(|c| match c {
            RenderCommand::TableCell(cell) => Some((cell.x, cell.height, cell.text.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(
        cells,
        vec![
            (MARGIN, 2.0 * MARGIN, "a"),
            (MARGIN + CELL_WIDTH, 2.0 * MARGIN, "b"),
        ]
    );
    assert_eq!(layout.errors.len(), 2);
    assert!(
        layout
            .errors
            .iter()
            .all(|e| matches!(e, LayoutError::MeasurementFailure { tag, .. } if tag == "td"))
    );
    assert_eq!(layout.diagnostics.len(), 2);
}

#[test]
fn test_dangling_node_stops_pass_and_resets_title() {
    let mut tree = parse_document("<title>Kept?</title><p>first</p><p>second</p>");
    let body = tree.body().unwrap();
    // Corrupt the tree: a child id between the two paragraphs that points nowhere.
    tree.get_mut(body).unwrap().children.insert(1, NodeId(9_999));

    let layout = engine().layout(
        &tree,
        viewport(),
        &FixedMeasurer,
        &mut RecordingResolver::default(),
    );
    assert_eq!(layout.commands.len(), 1);
    assert_eq!(layout.commands[0].text(), Some("first"));
    assert_eq!(layout.title, "No Title");
    assert!(matches!(
        layout.errors.last(),
        Some(LayoutError::DomTraversalFailure { .. })
    ));
}

#[test]
fn test_cycle_stops_pass() {
    let mut tree = parse_document("<div><p>loop</p></div>");
    let body = tree.body().unwrap();
    let div = tree.find_first(body, "div").unwrap();
    tree.get_mut(div).unwrap().children.push(body);

    let layout = engine().layout(
        &tree,
        viewport(),
        &FixedMeasurer,
        &mut RecordingResolver::default(),
    );
    assert!(layout.errors.iter().any(LayoutError::is_fatal));
    assert_y_non_decreasing(&layout);
}

#[test]
fn test_diagnostics_bounded_by_capacity() {
    let config = BrowserConfig {
        log_lines_to_show: 2,
        ..BrowserConfig::default()
    };
    let mut engine = LayoutEngine::new(&config);
    let html = (0..5)
        .map(|i| format!(r#"<img src="ftp://host/{i}.png">"#))
        .collect::<String>();
    let layout = engine.layout(
        &parse_document(&html),
        viewport(),
        &FixedMeasurer,
        &mut RecordingResolver::default(),
    );
    assert_eq!(layout.errors.len(), 5);
    assert_eq!(layout.diagnostics.len(), 2);
    assert!(layout.diagnostics[1].contains("host/4"));
    assert_eq!(engine.log().len(), 2);
}

#[test]
fn test_relayout_replaces_commands() {
    let mut engine = engine();
    let dom = parse_document("<p>one</p>");
    let first = engine.layout(&dom, viewport(), &FixedMeasurer, &mut RecordingResolver::default());
    let second = engine.layout(&dom, viewport(), &FixedMeasurer, &mut RecordingResolver::default());
    assert_eq!(first.commands, second.commands);
}

#[test]
fn test_centered_text_draw_x() {
    let layout = layout_html("<h1>Title</h1><p>left</p>", &mut RecordingResolver::default());
    let view = viewport();
    let RenderCommand::Text(h1) = &layout.commands[0] else {
        panic!("expected text");
    };
    assert_eq!(h1.draw_x(&view, 100.0), 350.0);
    // Wider than the viewport: pinned to the left edge.
    assert_eq!(h1.draw_x(&view, 1_000.0), 0.0);

    let RenderCommand::Text(p) = &layout.commands[1] else {
        panic!("expected text");
    };
    assert_eq!(p.draw_x(&view, 100.0), p.x);
    assert_eq!(p.background_rect(&view).width, view.width);
}

#[test]
fn test_layout_serializes_with_command_type_tags() {
    let layout = layout_html(
        "<h1>A</h1><table><tr><td>b</td></tr></table>",
        &mut RecordingResolver::default(),
    );
    let json = serde_json::to_value(&layout).unwrap();
    assert_eq!(json["title"], "No Title");
    assert_eq!(json["commands"][0]["type"], "text");
    assert_eq!(json["commands"][0]["align"], "center");
    assert_eq!(json["commands"][1]["type"], "table_cell");
    assert!(json.get("errors").is_none());
}
