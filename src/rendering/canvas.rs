use super::DrawSurface;
use crate::field::Viewport;
use crate::palette::{Rgb, Rgba};
use crate::particle::Position;

/// Software raster surface.
///
/// Pixels are stored at backing resolution (logical size times dpr) in the
/// `0RGB` layout softbuffer expects; drawing calls take logical
/// coordinates and are scaled by dpr on the way in.
pub struct RasterCanvas {
    viewport: Viewport,
    width: u32,
    height: u32,
    background: Rgb,
    pixels: Vec<u32>,
}

impl RasterCanvas {
    pub fn new(background: Rgb) -> Self {
        Self {
            viewport: Viewport::new(0.0, 0.0, 1.0),
            width: 0,
            height: 0,
            background,
            pixels: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Takes effect on the next clear.
    pub fn set_background(&mut self, background: Rgb) {
        self.background = background;
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let value = self.pixels[(y * self.width + x) as usize];
        Some(Rgb::new((value >> 16) as u8, (value >> 8) as u8, value as u8))
    }

    /// Copies the frame into a destination buffer of a possibly different
    /// size. Rows and columns outside the canvas are painted background.
    pub fn blit_into(&self, dst: &mut [u32], dst_width: u32, dst_height: u32) {
        let fill = self.background.to_u32();
        for y in 0..dst_height {
            let row = (y * dst_width) as usize;
            for x in 0..dst_width {
                let idx = row + x as usize;
                if idx >= dst.len() {
                    return;
                }
                dst[idx] = if x < self.width && y < self.height {
                    self.pixels[(y * self.width + x) as usize]
                } else {
                    fill
                };
            }
        }
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgb, alpha: f64) {
        if alpha <= 0.0 || x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height)
        {
            return;
        }
        let idx = (y as usize) * (self.width as usize) + x as usize;
        let dst = self.pixels[idx];
        let mix = |shift: u32, src: u8| -> u32 {
            let d = f64::from((dst >> shift) as u8);
            let out = d + (f64::from(src) - d) * alpha.min(1.0);
            (out.round() as u32).min(255) << shift
        };
        self.pixels[idx] = mix(16, color.r) | mix(8, color.g) | mix(0, color.b);
    }

    fn to_backing(&self, p: Position) -> (f64, f64) {
        (p.x * self.viewport.dpr, p.y * self.viewport.dpr)
    }
}

/// Distance from `(px, py)` to the segment `a`-`b`.
fn segment_distance(px: f64, py: f64, a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((px - a.0) * dx + (py - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

impl DrawSurface for RasterCanvas {
    fn resize(&mut self, width: f64, height: f64, dpr: f64) {
        self.viewport = Viewport::new(width, height, dpr);
        let (w, h) = self.viewport.backing_size();
        self.width = w;
        self.height = h;
        self.pixels = vec![self.background.to_u32(); (w as usize) * (h as usize)];
    }

    fn clear(&mut self) {
        let fill = self.background.to_u32();
        self.pixels.iter_mut().for_each(|p| *p = fill);
    }

    fn stroke_line(&mut self, from: Position, to: Position, color: Rgba, width: f64) {
        let a = self.to_backing(from);
        let b = self.to_backing(to);
        let half = (width * self.viewport.dpr).max(1.0) / 2.0;
        let reach = (half + 1.0).ceil() as i64;

        // Walk the major axis one pixel at a time and shade a thin band
        // across it, weighting by distance to the ideal segment.
        let steep = (b.1 - a.1).abs() > (b.0 - a.0).abs();
        let (major_a, major_b) = if steep { (a.1, b.1) } else { (a.0, b.0) };
        let (start, end) = if major_a <= major_b {
            (major_a, major_b)
        } else {
            (major_b, major_a)
        };
        let span = major_b - major_a;

        for m in (start.floor() as i64)..=(end.ceil() as i64) {
            let center_m = m as f64 + 0.5;
            let t = if span == 0.0 {
                0.0
            } else {
                ((center_m - major_a) / span).clamp(0.0, 1.0)
            };
            let minor = if steep {
                a.0 + t * (b.0 - a.0)
            } else {
                a.1 + t * (b.1 - a.1)
            };
            let minor_px = minor.floor() as i64;

            for n in (minor_px - reach)..=(minor_px + reach) {
                let (x, y) = if steep { (n, m) } else { (m, n) };
                let d = segment_distance(x as f64 + 0.5, y as f64 + 0.5, a, b);
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color.rgb, color.alpha * coverage);
                }
            }
        }
    }

    fn fill_disc(&mut self, center: Position, radius: f64, color: Rgba) {
        let (cx, cy) = self.to_backing(center);
        let r = radius * self.viewport.dpr;
        let x0 = (cx - r - 1.0).floor() as i64;
        let x1 = (cx + r + 1.0).ceil() as i64;
        let y0 = (cy - r - 1.0).floor() as i64;
        let y1 = (cy + r + 1.0).ceil() as i64;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                let coverage = (r + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color.rgb, color.alpha * coverage);
                }
            }
        }
    }
}
