//! Tests for the image pipeline and the software renderer.

use std::io::Cursor;
use std::time::Duration;

use chimera_browser::fonts::FontSet;
use chimera_browser::image_loader::{HttpImageResolver, ImageStore, fit_within};
use chimera_browser::renderer::Renderer;
use chimera_common::{BrowserConfig, ImageHandle, LoadedImage};
use chimera_html::parse_document;
use chimera_layout::{
    ApproximateTextMeasurer, Color, ImageCommand, ImageError, ImageRef, LayoutEngine,
    OfflineImageResolver, PageLayout, Rect, RenderCommand,
};

const MARGIN: f32 = 8.0;

fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn resolver() -> HttpImageResolver {
    HttpImageResolver::new(Duration::from_secs(1), MARGIN)
}

fn layout(commands: Vec<RenderCommand>) -> PageLayout {
    PageLayout {
        commands,
        title: "Test".to_string(),
        diagnostics: Vec::new(),
        errors: Vec::new(),
        content_height: 0.0,
    }
}

#[test]
fn test_large_raster_is_shrunk_to_cell() {
    let mut resolver = resolver();
    assert_eq!(resolver.max_side(), 134);
    let image = resolver
        .load_bytes("http://img.test/wide.png", &png_bytes(300, 150, [0, 0, 255, 255]))
        .unwrap();
    assert_eq!((image.width, image.height), (134, 67));
    let stored = resolver.store().get(image.handle).unwrap();
    assert_eq!((stored.width(), stored.height()), (134, 67));
}

#[test]
fn test_small_raster_is_kept() {
    let mut resolver = resolver();
    let image = resolver
        .load_bytes("http://img.test/small.png?v=2", &png_bytes(20, 10, [1, 2, 3, 255]))
        .unwrap();
    assert_eq!((image.width, image.height), (20, 10));
    let stored = resolver.store().get(image.handle).unwrap();
    assert_eq!(stored.pixel(0, 0), Some([1, 2, 3, 255]));
}

#[test]
fn test_svg_is_rasterized() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect width="40" height="20" fill="#ff0000"/></svg>"##;
    let mut resolver = resolver();
    let image = resolver.load_bytes("http://img.test/icon", svg).unwrap();
    assert_eq!((image.width, image.height), (40, 20));
    let stored = resolver.store().get(image.handle).unwrap();
    assert_eq!(stored.pixel(10, 10), Some([255, 0, 0, 255]));
}

#[test]
fn test_garbage_bytes_fail_to_decode() {
    let mut resolver = resolver();
    let err = resolver
        .load_bytes("http://img.test/broken.png", b"not an image")
        .unwrap_err();
    assert!(matches!(err, ImageError::Decode(_)));
    assert!(resolver.store().is_empty());
}

#[test]
fn test_fit_within_keeps_aspect() {
    let tall = LoadedImage::new(10, 40, vec![0; 10 * 40 * 4]).unwrap();
    let fitted = fit_within(tall, 20);
    assert_eq!((fitted.width(), fitted.height()), (5, 20));
}

#[test]
fn test_render_text_background_and_cell_border() {
    let session_layout = LayoutEngine::new(&BrowserConfig::default()).layout(
        &parse_document("<p>Hi</p><table><tr><td>cell</td></tr></table>"),
        Rect::new(0.0, 0.0, 400.0, 300.0),
        &ApproximateTextMeasurer,
        &mut OfflineImageResolver,
    );
    let fonts = FontSet::default();
    let images = ImageStore::new();
    let mut renderer = Renderer::new(400, 300, MARGIN, &fonts, &images);
    renderer.render(&session_layout, Rect::new(0.0, 0.0, 400.0, 300.0));

    // p: background spans the full width of its block.
    let RenderCommand::Text(p) = &session_layout.commands[0] else {
        panic!("expected text");
    };
    let mid_y = (p.y + p.height / 2.0) as u32;
    assert_eq!(renderer.pixel(0, mid_y), Some(Color::YELLOW.to_array()));
    assert_eq!(renderer.pixel(399, mid_y), Some(Color::YELLOW.to_array()));
    assert_eq!(renderer.pixel(200, 2), Some(Color::WHITE.to_array()));

    // td: border starts one margin above the cell origin.
    let RenderCommand::TableCell(cell) = &session_layout.commands[1] else {
        panic!("expected table cell");
    };
    let border = cell.border_rect(MARGIN);
    let left = border.x as u32;
    let top = border.y as u32;
    assert_eq!(renderer.pixel(left, top + 5), Some(Color::LIGHT_GREY.to_array()));
    assert_eq!(renderer.pixel(left + 5, top), Some(Color::LIGHT_GREY.to_array()));
    assert_eq!(renderer.pixel(left + 20, top + 5), Some(Color::WHITE.to_array()));
}

#[test]
fn test_render_image_command() {
    let mut images = ImageStore::new();
    let handle = images.insert(LoadedImage::new(4, 4, [0, 128, 0, 255].repeat(16)).unwrap());
    let page = layout(vec![RenderCommand::Image(ImageCommand {
        tag: "img".to_string(),
        x: 10.0,
        y: 12.0,
        height: 4.0 + MARGIN,
        image: ImageRef {
            handle,
            width: 4,
            height: 4,
        },
    })]);
    let fonts = FontSet::default();
    let mut renderer = Renderer::new(50, 50, MARGIN, &fonts, &images);
    renderer.render(&page, Rect::new(0.0, 0.0, 50.0, 50.0));

    assert_eq!(renderer.pixel(10, 12), Some([0, 128, 0, 255]));
    assert_eq!(renderer.pixel(13, 15), Some([0, 128, 0, 255]));
    assert_eq!(renderer.pixel(14, 12), Some(Color::WHITE.to_array()));
}

#[test]
fn test_missing_image_handle_draws_nothing() {
    let images = ImageStore::new();
    let page = layout(vec![RenderCommand::Image(ImageCommand {
        tag: "img".to_string(),
        x: 0.0,
        y: 0.0,
        height: 10.0,
        image: ImageRef {
            handle: ImageHandle(42),
            width: 2,
            height: 2,
        },
    })]);
    let fonts = FontSet::default();
    let mut renderer = Renderer::new(10, 10, MARGIN, &fonts, &images);
    renderer.render(&page, Rect::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(renderer.pixel(0, 0), Some(Color::WHITE.to_array()));
    let surface = renderer.into_image();
    assert_eq!(surface.dimensions(), (10, 10));
}
