use std::sync::Arc;

use kurbo::Shape as _;

use crate::assets::decode::PreparedImage;
use crate::compose::surface::Surface;
use crate::foundation::core::{Affine, Canvas, Point, Rect};
use crate::foundation::error::{GridtileError, GridtileResult};
use crate::model::color::Rgb8;
use crate::render::backend::FrameRGBA;

const ELLIPSE_TOLERANCE: f64 = 0.1;

struct CachedImage {
    source: PreparedImage,
    paint: vello_cpu::Image,
}

/// Raster surface powered by `vello_cpu`.
///
/// Draw calls are recorded into a reusable render context; [`CpuSurface::read_frame`] flushes
/// them into the backing pixmap. The decoded background is converted to a paint once and reused
/// while the same pixels are drawn.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    fill: Rgb8,
    image: Option<CachedImage>,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fill", &self.fill)
            .finish_non_exhaustive()
    }
}

impl CpuSurface {
    pub fn new(canvas: Canvas) -> GridtileResult<Self> {
        canvas.validate()?;
        let width = u16::try_from(canvas.width)
            .map_err(|_| GridtileError::validation("surface width exceeds u16"))?;
        let height = u16::try_from(canvas.height)
            .map_err(|_| GridtileError::validation("surface height exceeds u16"))?;
        Ok(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
            fill: Rgb8::new(0, 0, 0),
            image: None,
        })
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: u32::from(self.width),
            height: u32::from(self.height),
        }
    }

    /// Reallocate for a new size. Pending draw calls are dropped; the image paint survives.
    pub fn resize(&mut self, canvas: Canvas) -> GridtileResult<()> {
        if canvas == self.canvas() {
            return Ok(());
        }
        let image = self.image.take();
        *self = Self::new(canvas)?;
        self.image = image;
        Ok(())
    }

    /// Rasterize the recorded draw calls and read back the premultiplied pixels.
    pub fn read_frame(&mut self) -> FrameRGBA {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    fn full_rect(&self) -> vello_cpu::kurbo::Rect {
        vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    fn prepare_shape(&mut self) {
        self.ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let [r, g, b, a] = self.fill.to_rgba8();
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    }

    fn image_paint(&mut self, image: &PreparedImage) -> GridtileResult<vello_cpu::Image> {
        if let Some(cached) = &self.image
            && cached.source.same_pixels(image)
        {
            return Ok(cached.paint.clone());
        }
        let pixmap =
            pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image = Some(CachedImage {
            source: image.clone(),
            paint: paint.clone(),
        });
        Ok(paint)
    }
}

impl Surface for CpuSurface {
    fn clear(&mut self) {
        self.ctx.reset();
    }

    fn fill_background(&mut self, color: Rgb8) {
        let saved = self.fill;
        self.fill = color;
        self.prepare_shape();
        self.ctx.fill_rect(&self.full_rect());
        self.fill = saved;
    }

    fn draw_image(&mut self, image: &PreparedImage, dest: Rect) -> bool {
        let paint = match self.image_paint(image) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "skipping background image");
                return false;
            }
        };
        let (w, h) = (f64::from(image.width), f64::from(image.height));
        let tr = Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / w, dest.height() / h);

        self.ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(tr));
        self.ctx.set_paint(paint);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        true
    }

    fn set_fill(&mut self, color: Rgb8) {
        self.fill = color;
    }

    fn fill_ellipse(&mut self, center: Point, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let ellipse = kurbo::Ellipse::new(center, (width / 2.0, height / 2.0), 0.0);
        let mut path = vello_cpu::kurbo::BezPath::new();
        for el in ellipse.path_elements(ELLIPSE_TOLERANCE) {
            push_el(&mut path, el);
        }
        self.prepare_shape();
        self.ctx.fill_path(&path);
    }

    fn fill_rect_centered(&mut self, center: Point, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.prepare_shape();
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            center.x + width / 2.0,
            center.y + height / 2.0,
        ));
    }

    fn fill_triangle(&mut self, points: [Point; 3]) {
        if points[0] == points[1] && points[1] == points[2] {
            return;
        }
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(cpu_point(points[0]));
        path.line_to(cpu_point(points[1]));
        path.line_to(cpu_point(points[2]));
        path.close_path();
        self.prepare_shape();
        self.ctx.fill_path(&path);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn cpu_point(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn push_el(out: &mut vello_cpu::kurbo::BezPath, el: kurbo::PathEl) {
    use kurbo::PathEl;

    match el {
        PathEl::MoveTo(p) => out.move_to(cpu_point(p)),
        PathEl::LineTo(p) => out.line_to(cpu_point(p)),
        PathEl::QuadTo(p1, p2) => out.quad_to(cpu_point(p1), cpu_point(p2)),
        PathEl::CurveTo(p1, p2, p3) => out.curve_to(cpu_point(p1), cpu_point(p2), cpu_point(p3)),
        PathEl::ClosePath => out.close_path(),
    }
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> GridtileResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| GridtileError::image_load("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| GridtileError::image_load("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(GridtileError::image_load("image byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
