use crate::assets::decode::PreparedImage;
use crate::compose::random::{RandomSource, pick};
use crate::compose::surface::Surface;
use crate::foundation::core::{Point, Rect};
use crate::model::params::{ParameterSet, Shape};

/// Quarter-turn orientation of a triangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Apex up.
    Deg0,
    /// Apex right.
    Deg90,
    /// Apex down.
    Deg180,
    /// Apex left.
    Deg270,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::Deg0,
        Orientation::Deg90,
        Orientation::Deg180,
        Orientation::Deg270,
    ];

    pub fn degrees(self) -> u32 {
        match self {
            Orientation::Deg0 => 0,
            Orientation::Deg90 => 90,
            Orientation::Deg180 => 180,
            Orientation::Deg270 => 270,
        }
    }
}

/// Cell layout for one frame.
///
/// Cells are `cell_w x cell_h`, but shapes are governed by the square `cell_size` (the smaller
/// side), so non-square cells leave a margin on one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    pub cols: u32,
    pub rows: u32,
    pub cell_w: f64,
    pub cell_h: f64,
    pub cell_size: f64,
    pub pad: f64,
    pub shape_size: f64,
}

impl GridGeometry {
    pub fn new(width: f64, height: f64, params: &ParameterSet) -> Self {
        let cols = params.grid_columns();
        let rows = params.grid_rows();
        let cell_w = width / f64::from(cols);
        let cell_h = height / f64::from(rows);
        let cell_size = cell_w.min(cell_h);
        let pad = params.padding_percent() / 100.0 * cell_size;
        let shape_size = (cell_size - pad * 2.0).max(0.0);
        Self {
            cols,
            rows,
            cell_w,
            cell_h,
            cell_size,
            pad,
            shape_size,
        }
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.cols) * u64::from(self.rows)
    }

    pub fn cell_center(&self, gx: u32, gy: u32) -> Point {
        Point::new(
            f64::from(gx) * self.cell_w + self.cell_w / 2.0,
            f64::from(gy) * self.cell_h + self.cell_h / 2.0,
        )
    }
}

/// Destination rect that scales an `img_w x img_h` image uniformly to cover the target,
/// centered so overflow is cropped equally on both sides.
pub fn cover_rect(img_w: f64, img_h: f64, width: f64, height: f64) -> Rect {
    let scale = (width / img_w).max(height / img_h);
    let nw = img_w * scale;
    let nh = img_h * scale;
    let x = (width - nw) / 2.0;
    let y = (height - nh) / 2.0;
    Rect::new(x, y, x + nw, y + nh)
}

/// Vertices of a triangle inscribed in the `size x size` box around `center`.
pub fn triangle_vertices(center: Point, size: f64, orientation: Orientation) -> [Point; 3] {
    let r = size / 2.0;
    let (cx, cy) = (center.x, center.y);
    match orientation {
        Orientation::Deg0 => [
            Point::new(cx, cy - r),
            Point::new(cx - r, cy + r),
            Point::new(cx + r, cy + r),
        ],
        Orientation::Deg90 => [
            Point::new(cx + r, cy),
            Point::new(cx - r, cy - r),
            Point::new(cx - r, cy + r),
        ],
        Orientation::Deg180 => [
            Point::new(cx, cy + r),
            Point::new(cx - r, cy - r),
            Point::new(cx + r, cy - r),
        ],
        Orientation::Deg270 => [
            Point::new(cx - r, cy),
            Point::new(cx + r, cy - r),
            Point::new(cx + r, cy + r),
        ],
    }
}

/// Counters from one compositor pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositionStats {
    pub cells: u64,
    pub shapes: u64,
}

/// Paint one frame of the grid composition onto `surface`.
///
/// Reads `params` and consumes `rng` in row-major cell order; per cell the draws are skip check,
/// color (palette-cycling presets only), shape (`any` mode only), then orientation, which is
/// drawn even for circles and squares. `width` and `height` must be finite.
pub fn render_composition(
    surface: &mut dyn Surface,
    width: f64,
    height: f64,
    params: &ParameterSet,
    background: Option<&PreparedImage>,
    rng: &mut dyn RandomSource,
) -> CompositionStats {
    surface.clear();
    let drew_image = background.is_some_and(|img| {
        let dest = cover_rect(f64::from(img.width), f64::from(img.height), width, height);
        surface.draw_image(img, dest)
    });
    if !drew_image {
        surface.fill_background(params.background_color());
    }

    let geo = GridGeometry::new(width, height, params);
    let palette = params.palette();
    let cycles = params.cycles_palette();
    let fixed_shape = params.shape_mode().fixed();
    let empty_p = params.empty_probability();

    let mut stats = CompositionStats {
        cells: geo.cell_count(),
        shapes: 0,
    };

    for gy in 0..geo.rows {
        for gx in 0..geo.cols {
            if rng.next_unit() < empty_p {
                continue;
            }
            let Some(first) = palette.first() else {
                continue;
            };

            let fill = if cycles {
                pick(rng, palette.colors())
            } else {
                first
            };
            surface.set_fill(fill);

            let shape = match fixed_shape {
                Some(s) => s,
                None => pick(rng, &Shape::ANY_ORDER),
            };
            let orientation = pick(rng, &Orientation::ALL);

            let center = geo.cell_center(gx, gy);
            let s = geo.shape_size;
            match shape {
                Shape::Circle => surface.fill_ellipse(center, s, s),
                Shape::Square => surface.fill_rect_centered(center, s, s),
                Shape::Triangle => {
                    surface.fill_triangle(triangle_vertices(center, s, orientation));
                }
            }
            stats.shapes += 1;
        }
    }

    tracing::trace!(
        cols = geo.cols,
        rows = geo.rows,
        shape_size = geo.shape_size,
        shapes = stats.shapes,
        "composition rendered"
    );
    stats
}

#[cfg(test)]
#[path = "../../tests/unit/compose/grid.rs"]
mod tests;
