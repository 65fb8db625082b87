use crate::{
    command::{Command, ImagePlacement},
    graphics::Paint,
    raster,
};
use log::error;
use std::sync::Arc;

/// Replaces fills under a non-solid paint with a raster of that paint,
/// for backends with no native gradient support.
///
/// The paint is rasterized over the shape's bounding box at one pixel per
/// user-space unit, masked by the shape itself, and substituted as an
/// axis-aligned image placement. A solid color or scope disposal ends the
/// tracked paint.
pub struct FillPaintedShapeAsImage<I> {
    input: I,
    paint: Option<Paint>,
}

impl<I> FillPaintedShapeAsImage<I>
where
    I: Iterator<Item = Command>,
{
    pub fn new(input: I) -> Self {
        Self { input, paint: None }
    }
}

impl<I> Iterator for FillPaintedShapeAsImage<I>
where
    I: Iterator<Item = Command>,
{
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        let command = self.input.next()?;
        match command {
            Command::SetPaint(paint) => {
                self.paint = Some(paint.clone());
                Some(Command::SetPaint(paint))
            }
            Command::SetColor(color) => {
                self.paint = None;
                Some(Command::SetColor(color))
            }
            Command::DisposeScope => {
                self.paint = None;
                Some(Command::DisposeScope)
            }
            Command::FillShape(shape) => match &self.paint {
                Some(paint) => match raster::rasterize_paint(paint, &shape) {
                    Some((image, rect)) => Some(Command::DrawImage(ImagePlacement {
                        image: Arc::new(image),
                        x: rect.x,
                        y: rect.y,
                        width: rect.width,
                        height: rect.height,
                    })),
                    None => {
                        error!("paint rasterization failed; filling with current color");
                        Some(Command::FillShape(shape))
                    }
                },
                None => Some(Command::FillShape(shape)),
            },
            other => Some(other),
        }
    }
}
