use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Point, Rect};
use crate::model::color::Rgb8;

/// Drawing target the compositor paints onto.
///
/// The live canvas, offscreen export buffers and capture frames all implement this, so one
/// compositor drives every output. Shapes are filled with the most recent `set_fill` color and
/// have no stroke.
pub trait Surface {
    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Flood the whole surface with `color`.
    fn fill_background(&mut self, color: Rgb8);

    /// Draw `image` scaled into `dest` (which may extend past the surface edges).
    ///
    /// Returns `false` when the image could not be drawn and nothing was painted.
    fn draw_image(&mut self, image: &PreparedImage, dest: Rect) -> bool;

    fn set_fill(&mut self, color: Rgb8);

    /// Axis-aligned ellipse centered on `center`.
    fn fill_ellipse(&mut self, center: Point, width: f64, height: f64);

    /// Axis-aligned rectangle centered on `center`.
    fn fill_rect_centered(&mut self, center: Point, width: f64, height: f64);

    fn fill_triangle(&mut self, points: [Point; 3]);
}

/// One recorded surface call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    Background(Rgb8),
    Image {
        width: u32,
        height: u32,
        dest: Rect,
    },
    Fill(Rgb8),
    Ellipse {
        center: Point,
        width: f64,
        height: f64,
    },
    Rect {
        center: Point,
        width: f64,
        height: f64,
    },
    Triangle([Point; 3]),
}

impl DrawOp {
    fn is_shape(&self) -> bool {
        matches!(
            self,
            DrawOp::Ellipse { .. } | DrawOp::Rect { .. } | DrawOp::Triangle(_)
        )
    }
}

/// Surface that records calls instead of rasterizing.
///
/// Used to inspect geometric layout independently of any rasterizer.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Shape ops paired with the fill color active when they were drawn.
    pub fn shapes(&self) -> Vec<(Rgb8, DrawOp)> {
        let mut fill = None;
        let mut out = Vec::new();
        for op in &self.ops {
            match op {
                DrawOp::Fill(c) => fill = Some(*c),
                op if op.is_shape() => {
                    if let Some(c) = fill {
                        out.push((c, op.clone()));
                    }
                }
                _ => {}
            }
        }
        out
    }

    pub fn reset(&mut self) {
        self.ops.clear();
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_background(&mut self, color: Rgb8) {
        self.ops.push(DrawOp::Background(color));
    }

    fn draw_image(&mut self, image: &PreparedImage, dest: Rect) -> bool {
        self.ops.push(DrawOp::Image {
            width: image.width,
            height: image.height,
            dest,
        });
        true
    }

    fn set_fill(&mut self, color: Rgb8) {
        self.ops.push(DrawOp::Fill(color));
    }

    fn fill_ellipse(&mut self, center: Point, width: f64, height: f64) {
        self.ops.push(DrawOp::Ellipse {
            center,
            width,
            height,
        });
    }

    fn fill_rect_centered(&mut self, center: Point, width: f64, height: f64) {
        self.ops.push(DrawOp::Rect {
            center,
            width,
            height,
        });
    }

    fn fill_triangle(&mut self, points: [Point; 3]) {
        self.ops.push(DrawOp::Triangle(points));
    }
}
