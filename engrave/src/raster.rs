//! Raster payloads for image commands, plus the two places where pixels
//! are actually produced: gradient-paint rasterization and affine image
//! resampling.

use crate::{
    graphics::{GradientStop, Paint, Transform},
    shape::{Rect, Seg, Shape},
};
use image::{codecs::jpeg::JpegEncoder, codecs::png::PngEncoder, ColorType, ImageEncoder};
use tiny_skia::{FillRule, FilterQuality, Pixmap, PixmapPaint, SpreadMode};

/// Owned RGBA8 raster, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// Band order used when streaming samples out of a raster for embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interleaving {
    /// All samples per pixel, alpha first (mask-interleaved image data).
    Sample,
    /// Color samples only.
    WithoutAlpha,
    /// Alpha samples only (soft masks).
    AlphaOnly,
}

impl ImageData {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_rgba(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn raw(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// True when at least one pixel is not fully opaque.
    pub fn uses_alpha(&self) -> bool {
        self.pixels.chunks_exact(4).any(|px| px[3] < 255)
    }

    /// Binarizes the alpha channel at the midpoint. With `inverted` set,
    /// transparent pixels become the masked (255) value, the convention
    /// PostScript ImageType 3 mask data expects.
    pub fn alpha_to_mask(&self, inverted: bool) -> ImageData {
        let mut out = self.clone();
        for px in out.pixels.chunks_exact_mut(4) {
            let opaque = px[3] >= 127;
            px[3] = if opaque != inverted { 255 } else { 0 };
        }
        out
    }

    pub fn samples(&self, interleaving: Interleaving) -> Samples<'_> {
        Samples {
            image: self,
            order: match interleaving {
                Interleaving::Sample => &[3, 0, 1, 2],
                Interleaving::WithoutAlpha => &[0, 1, 2],
                Interleaving::AlphaOnly => &[3],
            },
            pixel: 0,
            band: 0,
        }
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out).write_image(
            &self.pixels,
            self.width,
            self.height,
            ColorType::Rgba8,
        )?;
        Ok(out)
    }

    pub fn encode_jpeg(&self) -> Result<Vec<u8>, image::ImageError> {
        let rgb: Vec<u8> = self.samples(Interleaving::WithoutAlpha).collect();
        let mut out = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut out, 85);
        encoder.encode(&rgb, self.width, self.height, ColorType::Rgb8)?;
        Ok(out)
    }

    fn to_pixmap(&self) -> Option<Pixmap> {
        let mut pixmap = Pixmap::new(self.width, self.height)?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(self.pixels.chunks_exact(4)) {
            *dst = tiny_skia::ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Some(pixmap)
    }

    fn from_pixmap(pixmap: Pixmap) -> ImageData {
        let mut pixels = Vec::with_capacity(pixmap.pixels().len() * 4);
        for px in pixmap.pixels() {
            let c = px.demultiply();
            pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        ImageData {
            width: pixmap.width(),
            height: pixmap.height(),
            pixels,
        }
    }
}

pub struct Samples<'a> {
    image: &'a ImageData,
    order: &'static [usize],
    pixel: usize,
    band: usize,
}

impl Iterator for Samples<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let count = self.image.width as usize * self.image.height as usize;
        if self.pixel >= count {
            return None;
        }
        let value = self.image.pixels[self.pixel * 4 + self.order[self.band]];
        self.band += 1;
        if self.band == self.order.len() {
            self.band = 0;
            self.pixel += 1;
        }
        Some(value)
    }
}

fn to_skia(tx: &Transform) -> tiny_skia::Transform {
    tiny_skia::Transform::from_row(
        tx.m11 as f32,
        tx.m12 as f32,
        tx.m21 as f32,
        tx.m22 as f32,
        tx.m31 as f32,
        tx.m32 as f32,
    )
}

fn to_skia_path(path: &crate::shape::Path) -> Option<tiny_skia::Path> {
    let mut builder = tiny_skia::PathBuilder::new();
    for seg in &path.segments {
        match seg {
            Seg::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            Seg::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            Seg::QuadTo(c, p) => {
                builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32)
            }
            Seg::CubicTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            Seg::Close => builder.close(),
        }
    }
    builder.finish()
}

fn to_skia_stops(stops: &[GradientStop]) -> Vec<tiny_skia::GradientStop> {
    stops
        .iter()
        .map(|stop| {
            tiny_skia::GradientStop::new(
                stop.offset as f32,
                tiny_skia::Color::from_rgba8(
                    stop.color.r,
                    stop.color.g,
                    stop.color.b,
                    stop.color.a,
                ),
            )
        })
        .collect()
}

fn skia_point(p: crate::graphics::Point) -> tiny_skia::Point {
    tiny_skia::Point::from_xy(p.x as f32, p.y as f32)
}

/// Rasterizes `paint` over the bounding box of `shape`, one pixel per
/// user-space unit, with the shape itself as the fill mask. Returns the
/// raster and its axis-aligned placement, or `None` when the geometry is
/// degenerate.
pub(crate) fn rasterize_paint(paint: &Paint, shape: &Shape) -> Option<(ImageData, Rect)> {
    let bounds = shape.bounds();
    if bounds.is_empty() {
        return None;
    }
    let width = bounds.width.round().max(1.0) as u32;
    let height = bounds.height.round().max(1.0) as u32;

    // Map user space onto the pixel grid of the target raster.
    let local = Transform::translation(-bounds.x, -bounds.y).then(&Transform::scale(
        f64::from(width) / bounds.width,
        f64::from(height) / bounds.height,
    ));

    let shader = match paint {
        Paint::Linear(gradient) => tiny_skia::LinearGradient::new(
            skia_point(gradient.start),
            skia_point(gradient.end),
            to_skia_stops(&gradient.stops),
            SpreadMode::Pad,
            to_skia(&local),
        )?,
        Paint::Radial(gradient) => tiny_skia::RadialGradient::new(
            skia_point(gradient.center),
            skia_point(gradient.center),
            gradient.radius as f32,
            to_skia_stops(&gradient.stops),
            SpreadMode::Pad,
            to_skia(&local),
        )?,
    };

    let path = to_skia_path(&shape.to_path().transform(&local))?;
    let mut pixmap = Pixmap::new(width, height)?;
    let skia_paint = tiny_skia::Paint {
        shader,
        anti_alias: true,
        ..tiny_skia::Paint::default()
    };
    let rule = match shape.winding() {
        crate::shape::Winding::NonZero => FillRule::Winding,
        crate::shape::Winding::EvenOdd => FillRule::EvenOdd,
    };
    pixmap.fill_path(&path, &skia_paint, rule, tiny_skia::Transform::identity(), None);

    Some((
        ImageData::from_pixmap(pixmap),
        Rect::new(bounds.x, bounds.y, bounds.width, bounds.height),
    ))
}

/// Resamples `image` through an arbitrary affine transform into an
/// axis-aligned raster. Returns the raster and its placement rectangle.
pub(crate) fn transform_image(image: &ImageData, tx: &Transform) -> Option<(ImageData, Rect)> {
    let src_rect = Rect::new(0.0, 0.0, f64::from(image.width), f64::from(image.height));
    let corners = [
        crate::graphics::Point::new(src_rect.x, src_rect.y),
        crate::graphics::Point::new(src_rect.max_x(), src_rect.y),
        crate::graphics::Point::new(src_rect.max_x(), src_rect.max_y()),
        crate::graphics::Point::new(src_rect.x, src_rect.max_y()),
    ];
    let mut bounds: Option<Rect> = None;
    for corner in corners {
        let p = tx.transform_point(corner);
        let r = Rect::new(p.x, p.y, 0.0, 0.0);
        bounds = Some(match bounds {
            Some(b) => b.union(&r),
            None => r,
        });
    }
    let bounds = bounds?;

    let ox = bounds.x.floor();
    let oy = bounds.y.floor();
    let width = (bounds.max_x().ceil() - ox) as u32;
    let height = (bounds.max_y().ceil() - oy) as u32;
    if width == 0 || height == 0 || width > 16_384 || height > 16_384 {
        return None;
    }

    let src = image.to_pixmap()?;
    let mut out = Pixmap::new(width, height)?;
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    out.draw_pixmap(
        0,
        0,
        src.as_ref(),
        &paint,
        to_skia(&tx.then(&Transform::translation(-ox, -oy))),
        None,
    );

    Some((
        ImageData::from_pixmap(out),
        Rect::new(ox, oy, f64::from(width), f64::from(height)),
    ))
}
