use crate::browser::Viewport;
use crate::dom::{BoundingBox, ElementMap, InteractiveElement};
use crate::error::{BrowserError, Result};
use crate::som::font::LabelFont;
use image::{DynamicImage, ImageOutputFormat, Pixel, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use std::io::Cursor;

/// Colours and spacing of the marks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkStyle {
    /// Translucent fill over the element box
    pub box_fill: Rgba<u8>,
    pub box_outline: Rgba<u8>,
    pub outline_width: u32,
    pub tag_fill: Rgba<u8>,
    pub tag_text: Rgba<u8>,
    /// Horizontal padding between tag edge and digits
    pub tag_padding_x: i32,
    /// Vertical padding between tag edge and digits
    pub tag_padding_y: i32,
    /// Gap between a tag placed above a box and the box
    pub tag_gap: i32,
}

impl Default for MarkStyle {
    fn default() -> Self {
        Self {
            box_fill: Rgba([255, 0, 0, 60]),
            box_outline: Rgba([255, 0, 0, 255]),
            outline_width: 2,
            tag_fill: Rgba([255, 0, 0, 255]),
            tag_text: Rgba([255, 255, 255, 255]),
            tag_padding_x: 3,
            tag_padding_y: 2,
            tag_gap: 2,
        }
    }
}

/// Box of an element in image pixels.
///
/// Edges may lie past the image, but never more than a small margin, so
/// arithmetic on them cannot overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelBox {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl PixelBox {
    fn from_bounds(bounds: &BoundingBox, (scale_x, scale_y): (f64, f64), (width, height): (u32, u32), margin: i32) -> Self {
        let (max_x, max_y) = (clamp_dimension(width) + margin, clamp_dimension(height) + margin);
        let x0 = to_pixel(bounds.x * scale_x, -margin, max_x);
        let y0 = to_pixel(bounds.y * scale_y, -margin, max_y);
        let x1 = to_pixel(bounds.right() * scale_x, -margin, max_x);
        let y1 = to_pixel(bounds.bottom() * scale_y, -margin, max_y);

        Self {
            x: x0,
            y: y0,
            width: (x1 - x0).max(1),
            height: (y1 - y0).max(1),
        }
    }

    fn rect(&self) -> Rect {
        Rect::at(self.x, self.y).of_size(self.width as u32, self.height as u32)
    }
}

fn clamp_dimension(pixels: u32) -> i32 {
    pixels.min(u32::MAX / 8) as i32
}

/// Round to a whole pixel within `[min, max]`
fn to_pixel(value: f64, min: i32, max: i32) -> i32 {
    if value.is_nan() {
        return min;
    }
    value.round().clamp(f64::from(min), f64::from(max)) as i32
}

/// Draws numbered Set-of-Marks overlays onto screenshots
#[derive(Debug)]
pub struct AnnotationRenderer {
    font: LabelFont,
    style: MarkStyle,
}

impl Default for AnnotationRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationRenderer {
    /// Renderer using the best label font available on this machine
    pub fn new() -> Self {
        Self::with_font(LabelFont::load())
    }

    pub fn with_font(font: LabelFont) -> Self {
        Self { font, style: MarkStyle::default() }
    }

    /// Builder method: set mark colours and spacing
    pub fn with_style(mut self, style: MarkStyle) -> Self {
        self.style = style;
        self
    }

    pub fn font(&self) -> &LabelFont {
        &self.font
    }

    pub fn style(&self) -> &MarkStyle {
        &self.style
    }

    /// Overlay every element of `map` onto the screenshot and return PNG bytes.
    ///
    /// Geometry is scaled from the map's viewport to the decoded image size,
    /// so device-pixel-ratio screenshots line up. Marks are drawn in id order.
    pub fn render(&self, screenshot: &[u8], map: &ElementMap) -> Result<Vec<u8>> {
        let mut image = image::load_from_memory(screenshot)
            .map_err(|e| BrowserError::RenderFailed(format!("Failed to decode screenshot: {}", e)))?
            .to_rgba8();

        let scale = scale_factors(image.dimensions(), map.viewport());

        for element in map.iter() {
            self.draw_mark(&mut image, element, scale);
        }

        encode_png(image)
    }

    fn draw_mark(&self, image: &mut RgbaImage, element: &InteractiveElement, scale: (f64, f64)) {
        // outlines of clamped edges stay outside the image
        let margin = self.style.outline_width.min(64) as i32 + 1;
        let pixel_box = PixelBox::from_bounds(&element.bounds, scale, image.dimensions(), margin);

        blend_rect(image, pixel_box, self.style.box_fill);

        for inset in 0..self.style.outline_width as i32 {
            let inner = PixelBox {
                x: pixel_box.x + inset,
                y: pixel_box.y + inset,
                width: pixel_box.width - 2 * inset,
                height: pixel_box.height - 2 * inset,
            };
            if inner.width <= 0 || inner.height <= 0 {
                break;
            }
            draw_hollow_rect_mut(image, inner.rect(), self.style.box_outline);
        }

        self.draw_tag(image, &element.id.to_string(), pixel_box);
    }

    /// Filled tag with the id at the box's top-left corner.
    ///
    /// The tag sits above the box when there is room, otherwise just inside
    /// the corner; it is always kept within the image.
    fn draw_tag(&self, image: &mut RgbaImage, label: &str, pixel_box: PixelBox) {
        let metrics = self.font.measure(label);
        let tag_width = metrics.width.max(1) + 2 * self.style.tag_padding_x;
        let tag_height = metrics.height.max(1) + 2 * self.style.tag_padding_y;
        let (image_width, image_height) = (image.width() as i32, image.height() as i32);

        let tag_x = pixel_box.x.max(0).min(image_width - tag_width).max(0);

        let above = pixel_box.y - tag_height - self.style.tag_gap;
        let tag_y = if above >= 0 { above } else { pixel_box.y.max(0) };
        let tag_y = tag_y.min(image_height - tag_height).max(0);

        let tag = PixelBox { x: tag_x, y: tag_y, width: tag_width, height: tag_height };
        draw_filled_rect_mut(image, tag.rect(), self.style.tag_fill);

        self.font.draw(
            image,
            tag_x + self.style.tag_padding_x,
            tag_y + self.style.tag_padding_y,
            label,
            self.style.tag_text,
        );
    }
}

/// Image pixels per viewport pixel on each axis
fn scale_factors((width, height): (u32, u32), viewport: Viewport) -> (f64, f64) {
    let axis = |pixels: u32, css: u32| {
        if css == 0 { 1.0 } else { f64::from(pixels) / f64::from(css) }
    };
    (axis(width, viewport.width), axis(height, viewport.height))
}

fn blend_rect(image: &mut RgbaImage, pixel_box: PixelBox, color: Rgba<u8>) {
    let x0 = pixel_box.x.max(0);
    let y0 = pixel_box.y.max(0);
    let x1 = (pixel_box.x + pixel_box.width).min(image.width() as i32);
    let y1 = (pixel_box.y + pixel_box.height).min(image.height() as i32);

    for y in y0..y1 {
        for x in x0..x1 {
            image.get_pixel_mut(x as u32, y as u32).blend(&color);
        }
    }
}

fn encode_png(image: RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .map_err(|e| BrowserError::RenderFailed(format!("Failed to encode annotated image: {}", e)))?;
    Ok(bytes)
}
