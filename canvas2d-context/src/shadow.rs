//! Drop shadows for canvas drawing.
//!
//! The shape is first rendered into a scratch pixmap shifted by the shadow
//! offset. Its alpha channel is blurred and then recolored through a 256-entry
//! lookup table before the result is composited under the real draw.

use crate::context::MAX_DIMENSION;
use tiny_skia::{
    BlendMode, Color, ColorU8, FilterQuality, Mask, Pixmap, PixmapPaint,
    PremultipliedColorU8, Transform,
};

/// Shadow parameters as set on the graphics state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowParams {
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur: f32,
    pub color: Color,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            blur: 0.0,
            color: Color::TRANSPARENT,
        }
    }
}

impl ShadowParams {
    /// Whether a draw with these parameters produces any shadow pixels.
    pub fn is_visible(&self) -> bool {
        self.color.alpha() > 0.0
            && (self.blur > 0.0 || self.offset_x != 0.0 || self.offset_y != 0.0)
    }

    /// Gaussian standard deviation equivalent to `shadowBlur`.
    pub fn sigma(&self) -> f32 {
        self.blur / 2.0
    }
}

/// Maps mask coverage (0..=255) to the premultiplied shadow pixel.
#[derive(Debug, Clone)]
pub struct ShadowColorCache {
    key: Option<ColorU8>,
    table: Vec<PremultipliedColorU8>,
    rebuilds: usize,
}

impl Default for ShadowColorCache {
    fn default() -> Self {
        Self {
            key: None,
            table: vec![PremultipliedColorU8::TRANSPARENT; 256],
            rebuilds: 0,
        }
    }
}

impl ShadowColorCache {
    /// Point the table at `color`, rebuilding only when it differs from the cached one.
    pub fn update(&mut self, color: Color) {
        let key = color.to_color_u8();
        if self.key == Some(key) {
            return;
        }
        let base_alpha = key.alpha() as u32;
        for (coverage, entry) in self.table.iter_mut().enumerate() {
            let alpha = (base_alpha * coverage as u32 + 127) / 255;
            *entry = ColorU8::from_rgba(key.red(), key.green(), key.blue(), alpha as u8)
                .premultiply();
        }
        self.key = Some(key);
        self.rebuilds += 1;
    }

    /// Shadow pixel for a mask coverage value.
    pub fn tint(&self, coverage: u8) -> PremultipliedColorU8 {
        self.table[coverage as usize]
    }

    /// How many times the table has been rebuilt.
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }
}

/// Renders shadows for the primary draws of one surface.
#[derive(Debug, Default)]
pub struct ShadowCompositor {
    params: ShadowParams,
    cache: ShadowColorCache,
    scratch: Option<Pixmap>,
    alpha: Vec<u8>,
    blur_tmp: Vec<u8>,
}

impl ShadowCompositor {
    pub fn configure(&mut self, params: &ShadowParams) {
        self.params = *params;
        if params.is_visible() {
            self.cache.update(params.color);
        }
    }

    pub fn params(&self) -> &ShadowParams {
        &self.params
    }

    pub fn is_active(&self) -> bool {
        self.params.is_visible()
    }

    pub fn color_cache(&self) -> &ShadowColorCache {
        &self.cache
    }

    /// Size of the scratch pixmap, if one has been allocated.
    pub fn scratch_size(&self) -> Option<(u32, u32)> {
        self.scratch.as_ref().map(|p| (p.width(), p.height()))
    }

    /// Draw the shadow of one primitive onto `surface`.
    ///
    /// `draw` renders the primitive into the scratch pixmap using the supplied
    /// device-space transform, which already contains the shadow offset.
    pub(crate) fn render<F>(
        &mut self,
        surface: &mut Pixmap,
        blend_mode: BlendMode,
        clip: Option<&Mask>,
        draw: F,
    ) where
        F: FnOnce(&mut Pixmap, Transform),
    {
        if !self.params.is_visible() {
            return;
        }
        // Blur beyond the surface's largest side cannot reach visible pixels
        let max_side = surface.width().max(surface.height());
        let sigma = self.params.sigma().min(max_side as f32 / 3.0);
        let radii = box_radii(sigma).map(|r| r.min(max_side as usize));
        let margin = u32::try_from(radii.iter().sum::<usize>())
            .unwrap_or(u32::MAX)
            .min(max_side);
        let (Some(width), Some(height)) = (
            margin.checked_mul(2).and_then(|m| surface.width().checked_add(m)),
            margin.checked_mul(2).and_then(|m| surface.height().checked_add(m)),
        ) else {
            return;
        };

        let Some(scratch) = ensure_scratch(&mut self.scratch, width, height) else {
            log::warn!(target: "canvas", "shadow scratch allocation failed for {}x{}", width, height);
            return;
        };
        scratch.fill(Color::TRANSPARENT);

        let offset = Transform::from_translate(
            self.params.offset_x + margin as f32,
            self.params.offset_y + margin as f32,
        );
        draw(scratch, offset);

        let (sw, sh) = (scratch.width() as usize, scratch.height() as usize);
        self.alpha.clear();
        self.alpha.extend(scratch.pixels().iter().map(|p| p.alpha()));
        if sigma > 0.0 {
            for radius in radii {
                blur_alpha(&mut self.alpha, &mut self.blur_tmp, sw, sh, radius);
            }
        }

        for (pixel, coverage) in scratch.pixels_mut().iter_mut().zip(&self.alpha) {
            *pixel = self.cache.tint(*coverage);
        }

        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode,
            quality: FilterQuality::Nearest,
        };
        surface.draw_pixmap(
            -(margin as i32),
            -(margin as i32),
            scratch.as_ref(),
            &paint,
            Transform::identity(),
            clip,
        );
    }
}

fn ensure_scratch(slot: &mut Option<Pixmap>, width: u32, height: u32) -> Option<&mut Pixmap> {
    let reusable = slot
        .as_ref()
        .is_some_and(|p| p.width() >= width && p.height() >= height);
    if !reusable {
        log::debug!(target: "canvas", "allocating shadow scratch {}x{}", width, height);
        *slot = Some(Pixmap::new(width, height)?);
    }
    slot.as_mut()
}

/// Radii of three box passes approximating a Gaussian of `sigma`.
///
/// `sigma` is capped at [`MAX_DIMENSION`]; larger values give the same radii.
pub(crate) fn box_radii(sigma: f32) -> [usize; 3] {
    if sigma.is_nan() || sigma <= 0.0 {
        return [0; 3];
    }
    let sigma = sigma.min(MAX_DIMENSION as f32);
    const PASSES: f32 = 3.0;
    let sigma2 = sigma * sigma;
    let w_ideal = (12.0 * sigma2 / PASSES + 1.0).sqrt();
    let mut wl = w_ideal.floor() as i32;
    if wl % 2 == 0 {
        wl -= 1;
    }
    let wu = wl + 2;
    let wlf = wl as f32;
    let m_ideal =
        (12.0 * sigma2 - PASSES * wlf * wlf - 4.0 * PASSES * wlf - 3.0 * PASSES) / (-4.0 * wlf - 4.0);
    let m = m_ideal.round() as i32;

    let mut radii = [0usize; 3];
    for (i, r) in radii.iter_mut().enumerate() {
        let size = if (i as i32) < m { wl } else { wu };
        *r = ((size.max(1) - 1) / 2) as usize;
    }
    radii
}

/// One separable box pass (horizontal then vertical) over an alpha plane.
/// Samples outside the plane count as transparent.
fn blur_alpha(alpha: &mut [u8], tmp: &mut Vec<u8>, width: usize, height: usize, radius: usize) {
    if radius == 0 || width == 0 || height == 0 {
        return;
    }
    tmp.clear();
    tmp.resize(alpha.len(), 0);
    let div = (2 * radius + 1) as u32;
    let r = radius as isize;

    for y in 0..height {
        let row = &alpha[y * width..(y + 1) * width];
        let out = &mut tmp[y * width..(y + 1) * width];
        let sample = |i: isize| -> u32 {
            if i < 0 || i >= width as isize {
                0
            } else {
                row[i as usize] as u32
            }
        };
        let mut sum: u32 = (-r..=r).map(sample).sum();
        for (x, value) in out.iter_mut().enumerate() {
            *value = ((sum + div / 2) / div) as u8;
            let x = x as isize;
            sum = sum + sample(x + r + 1) - sample(x - r);
        }
    }

    for x in 0..width {
        let sample = |i: isize| -> u32 {
            if i < 0 || i >= height as isize {
                0
            } else {
                tmp[i as usize * width + x] as u32
            }
        };
        let mut sum: u32 = (-r..=r).map(sample).sum();
        for y in 0..height {
            alpha[y * width + x] = ((sum + div / 2) / div) as u8;
            let yi = y as isize;
            sum = sum + sample(yi + r + 1) - sample(yi - r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_visibility_rules() {
        let mut params = ShadowParams::default();
        assert!(!params.is_visible());
        params.offset_x = 3.0;
        assert!(!params.is_visible(), "transparent color never draws");
        params.color = Color::BLACK;
        assert!(params.is_visible());
        params.offset_x = 0.0;
        assert!(!params.is_visible(), "no offset and no blur");
        params.blur = 2.0;
        assert!(params.is_visible());
    }

    #[test]
    fn test_color_cache_rebuilds_only_on_change() {
        let mut cache = ShadowColorCache::default();
        cache.update(Color::from_rgba8(255, 0, 0, 255));
        cache.update(Color::from_rgba8(255, 0, 0, 255));
        assert_eq!(cache.rebuild_count(), 1);
        assert_eq!(cache.tint(0), PremultipliedColorU8::TRANSPARENT);
        let full = cache.tint(255);
        assert_eq!((full.red(), full.alpha()), (255, 255));
        let half = cache.tint(128);
        assert_eq!(half.alpha(), 128);
        assert_eq!(half.red(), 128);

        cache.update(Color::from_rgba8(0, 0, 255, 128));
        assert_eq!(cache.rebuild_count(), 2);
        assert_eq!(cache.tint(255).alpha(), 128);
    }

    #[test]
    fn test_box_radii() {
        assert_eq!(box_radii(0.0), [0, 0, 0]);
        let radii = box_radii(4.0);
        assert!(radii.iter().all(|r| *r >= 2 && *r <= 4), "{radii:?}");
        // Three boxes of width w have variance 3 * (w^2 - 1) / 12 ~ sigma^2
        let variance: f32 = radii
            .iter()
            .map(|r| {
                let w = (2 * r + 1) as f32;
                (w * w - 1.0) / 12.0
            })
            .sum();
        assert!((variance - 16.0).abs() < 4.0, "variance {variance}");
    }

    #[rstest]
    #[case(1e20)]
    #[case(f32::MAX)]
    #[case(f32::INFINITY)]
    #[case(f32::NAN)]
    fn test_box_radii_extreme_sigma(#[case] sigma: f32) {
        let radii = box_radii(sigma);
        assert!(radii.iter().all(|r| *r <= MAX_DIMENSION as usize), "{radii:?}");
    }

    #[test]
    fn test_large_blur_keeps_scratch_near_surface_size() {
        let mut surface = Pixmap::new(20, 20).unwrap();
        let mut compositor = ShadowCompositor::default();
        compositor.configure(&ShadowParams {
            offset_x: 0.0,
            offset_y: 0.0,
            blur: 5000.0,
            color: Color::BLACK,
        });
        let rect = tiny_skia::Rect::from_xywh(5.0, 5.0, 10.0, 10.0).unwrap();
        let paint = tiny_skia::Paint::default();
        compositor.render(&mut surface, BlendMode::SourceOver, None, |pixmap, offset| {
            pixmap.fill_rect(rect, &paint, offset, None);
        });

        let (w, h) = compositor.scratch_size().unwrap();
        assert!(w <= 60 && h <= 60, "scratch {w}x{h}");
        assert!(surface.pixel(10, 10).unwrap().alpha() > 0);
    }

    #[test]
    fn test_blur_spreads_and_stays_bounded() {
        let (w, h) = (9, 9);
        let mut alpha = vec![0u8; w * h];
        alpha[4 * w + 4] = 255;
        let mut tmp = Vec::new();
        blur_alpha(&mut alpha, &mut tmp, w, h, 1);
        assert!(alpha[4 * w + 4] < 255);
        assert!(alpha[4 * w + 3] > 0);
        assert!(alpha[3 * w + 4] > 0);
        assert_eq!(alpha[0], 0);
    }

    #[test]
    fn test_render_offset_shadow() {
        let mut surface = Pixmap::new(20, 20).unwrap();
        let mut compositor = ShadowCompositor::default();
        compositor.configure(&ShadowParams {
            offset_x: 5.0,
            offset_y: 5.0,
            blur: 0.0,
            color: Color::from_rgba8(0, 0, 255, 255),
        });
        let rect = tiny_skia::Rect::from_xywh(2.0, 2.0, 6.0, 6.0).unwrap();
        let mut paint = tiny_skia::Paint::default();
        paint.set_color(Color::from_rgba8(255, 0, 0, 255));
        compositor.render(&mut surface, BlendMode::SourceOver, None, |pixmap, offset| {
            pixmap.fill_rect(rect, &paint, offset, None);
        });

        let shadow = surface.pixel(10, 10).unwrap();
        assert_eq!(
            (shadow.red(), shadow.blue(), shadow.alpha()),
            (0, 255, 255)
        );
        assert_eq!(surface.pixel(3, 3).unwrap().alpha(), 0);
        assert_eq!(compositor.scratch_size(), Some((20, 20)));
    }
}
