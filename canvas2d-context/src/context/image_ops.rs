//! Image drawing, pixel data, and PNG output operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::error::Canvas2dResult;
use crate::geometry::{DirtyRect, ImageCropParams, ImageData, RectParams};
use crate::image::{premultiply_into, unpremultiply_into, ImageSource};
use tiny_skia::{FilterQuality, Paint, Pattern, Rect, SpreadMode, Transform};

/// Intersection of a rectangle with `0..width x 0..height`, as `(x, y, w, h)`.
///
/// Takes `i64` so that any `i32` origin plus any `i32` size is representable.
fn clamp_to_surface(
    x: i64,
    y: i64,
    w: i64,
    h: i64,
    width: u32,
    height: u32,
) -> Option<(u32, u32, u32, u32)> {
    let (x, w) = if w < 0 { (x + w, -w) } else { (x, w) };
    let (y, h) = if h < 0 { (y + h, -h) } else { (y, h) };
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(width as i64);
    let y1 = (y + h).min(height as i64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

/// Heat map ramp: blue, cyan, green, yellow, red.
fn heat_color(intensity: f32) -> [u8; 3] {
    const STOPS: [[f32; 3]; 5] = [
        [0.0, 0.0, 255.0],
        [0.0, 255.0, 255.0],
        [0.0, 255.0, 0.0],
        [255.0, 255.0, 0.0],
        [255.0, 0.0, 0.0],
    ];
    let t = intensity.clamp(0.0, 1.0) * 4.0;
    let i = (t.floor() as usize).min(3);
    let f = t - i as f32;
    let (a, b) = (STOPS[i], STOPS[i + 1]);
    [
        (a[0] + (b[0] - a[0]) * f).round() as u8,
        (a[1] + (b[1] - a[1]) * f).round() as u8,
        (a[2] + (b[2] - a[2]) * f).round() as u8,
    ]
}

impl Canvas2dContext {
    // --- Image drawing ---

    /// Draw `source` at its natural size with its top-left corner at (dx, dy).
    pub fn draw_image<S: ImageSource + ?Sized>(&mut self, source: &S, dx: f32, dy: f32) {
        let Some(image) = source.pixmap_ref() else {
            return;
        };
        let (w, h) = (image.width() as f32, image.height() as f32);
        self.draw_image_cropped(
            source,
            &ImageCropParams {
                sx: 0.0,
                sy: 0.0,
                sw: w,
                sh: h,
                dx,
                dy,
                dw: w,
                dh: h,
            },
        );
    }

    /// Draw `source` scaled into the rectangle (dx, dy, dw, dh).
    pub fn draw_image_scaled<S: ImageSource + ?Sized>(
        &mut self,
        source: &S,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
    ) {
        let Some(image) = source.pixmap_ref() else {
            return;
        };
        let (w, h) = (image.width() as f32, image.height() as f32);
        self.draw_image_cropped(
            source,
            &ImageCropParams {
                sx: 0.0,
                sy: 0.0,
                sw: w,
                sh: h,
                dx,
                dy,
                dw,
                dh,
            },
        );
    }

    /// Draw the source rectangle of `source` into the destination rectangle.
    ///
    /// Negative sizes are normalized. Zero-area rectangles and empty images draw nothing.
    pub fn draw_image_cropped<S: ImageSource + ?Sized>(
        &mut self,
        source: &S,
        params: &ImageCropParams,
    ) {
        log::debug!(target: "canvas", "drawImage {:?}", params);
        let Some(image) = source.pixmap_ref() else {
            return;
        };
        let ImageCropParams {
            mut sx,
            mut sy,
            mut sw,
            mut sh,
            mut dx,
            mut dy,
            mut dw,
            mut dh,
        } = *params;
        if ![sx, sy, sw, sh, dx, dy, dw, dh].iter().all(|v| v.is_finite()) {
            return;
        }
        if sw < 0.0 {
            sx += sw;
            sw = -sw;
        }
        if sh < 0.0 {
            sy += sh;
            sh = -sh;
        }
        if dw < 0.0 {
            dx += dw;
            dw = -dw;
        }
        if dh < 0.0 {
            dy += dh;
            dh = -dh;
        }
        if sw == 0.0 || sh == 0.0 || dw == 0.0 || dh == 0.0 {
            return;
        }

        // Clip the source rectangle to the image, shrinking the destination to match
        let (scale_x, scale_y) = (dw / sw, dh / sh);
        let (img_w, img_h) = (image.width() as f32, image.height() as f32);
        let cx0 = sx.max(0.0);
        let cy0 = sy.max(0.0);
        let cx1 = (sx + sw).min(img_w);
        let cy1 = (sy + sh).min(img_h);
        if cx1 <= cx0 || cy1 <= cy0 {
            return;
        }
        dx += (cx0 - sx) * scale_x;
        dy += (cy0 - sy) * scale_y;
        dw = (cx1 - cx0) * scale_x;
        dh = (cy1 - cy0) * scale_y;
        let (sx, sy) = (cx0, cy0);

        let Some(dest) = Rect::from_xywh(dx, dy, dw, dh) else {
            return;
        };
        let Some(dest_path) = self.device_rect(&RectParams::new(
            dest.x(),
            dest.y(),
            dest.width(),
            dest.height(),
        )) else {
            return;
        };
        if !self.prepare_draw() {
            return;
        }

        // Image space -> user space -> device space
        let image_to_device = Transform::from_translate(-sx, -sy)
            .post_scale(scale_x, scale_y)
            .post_translate(dx, dy)
            .post_concat(self.raster.transform);
        let quality = if scale_x == 1.0 && scale_y == 1.0 {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bilinear
        };
        let shader = Pattern::new(
            image,
            SpreadMode::Pad,
            quality,
            self.raster.global_alpha,
            image_to_device,
        );
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Default::default()
        };
        self.render_with_shadow(|pixmap, blend_mode, transform, mask| {
            let paint = Paint {
                blend_mode,
                ..paint.clone()
            };
            pixmap.fill_path(&dest_path, &paint, tiny_skia::FillRule::Winding, transform, mask);
        });
    }

    // --- Image data ---

    /// Transparent black image data of the given size.
    pub fn create_image_data(&self, width: u32, height: u32) -> ImageData {
        ImageData::new(width, height)
    }

    /// Read a device-space region as straight-alpha RGBA.
    ///
    /// The region is clamped to the surface; a region entirely outside it
    /// yields empty (0x0) image data.
    pub fn get_image_data(&self, x: i32, y: i32, width: i32, height: i32) -> ImageData {
        log::debug!(target: "canvas", "getImageData {} {} {} {}", x, y, width, height);
        let Some((x0, y0, w, h)) = clamp_to_surface(
            x.into(),
            y.into(),
            width.into(),
            height.into(),
            self.width,
            self.height,
        ) else {
            return ImageData::new(0, 0);
        };
        let premultiplied = self.read_region(x0, y0, w, h);
        let mut data = vec![0u8; premultiplied.len()];
        unpremultiply_into(&premultiplied, &mut data);
        ImageData {
            width: w,
            height: h,
            data,
        }
    }

    /// Write image data at (dx, dy), replacing pixels without compositing.
    pub fn put_image_data(&mut self, image: &ImageData, dx: i32, dy: i32) {
        self.put_image_data_dirty(
            image,
            dx,
            dy,
            &DirtyRect {
                x: 0,
                y: 0,
                width: i32::try_from(image.width).unwrap_or(i32::MAX),
                height: i32::try_from(image.height).unwrap_or(i32::MAX),
            },
        );
    }

    /// Write the `dirty` sub-rectangle of `image`, positioned as if the whole
    /// image were placed at (dx, dy). Pixels off the surface are dropped.
    pub fn put_image_data_dirty(&mut self, image: &ImageData, dx: i32, dy: i32, dirty: &DirtyRect) {
        log::debug!(target: "canvas", "putImageData {}x{} at {} {}", image.width, image.height, dx, dy);
        if image.data.len() != image.width as usize * image.height as usize * 4 {
            log::warn!(target: "canvas", "putImageData: data length does not match {}x{}", image.width, image.height);
            return;
        }
        let Some((ix, iy, w, h)) = clamp_to_surface(
            dirty.x.into(),
            dirty.y.into(),
            dirty.width.into(),
            dirty.height.into(),
            image.width,
            image.height,
        ) else {
            return;
        };

        let row_len = w as usize * 4;
        let mut region = vec![0u8; row_len * h as usize];
        for row in 0..h as usize {
            let start = ((iy as usize + row) * image.width as usize + ix as usize) * 4;
            premultiply_into(
                &image.data[start..start + row_len],
                &mut region[row * row_len..(row + 1) * row_len],
            );
        }
        self.write_region(
            i64::from(dx) + i64::from(ix),
            i64::from(dy) + i64::from(iy),
            w,
            h,
            &region,
        );
    }

    /// Copy a device-space region of the surface to (dx, dy).
    ///
    /// The copy goes through an intermediate buffer, so overlapping source
    /// and destination are fine. Pixels are replaced directly; transform,
    /// clip and composite mode do not apply.
    pub fn move_canvas_image(&mut self, sx: f32, sy: f32, sw: f32, sh: f32, dx: f32, dy: f32) {
        log::debug!(target: "canvas", "moveCanvasImage {} {} {} {} -> {} {}", sx, sy, sw, sh, dx, dy);
        if ![sx, sy, sw, sh, dx, dy].iter().all(|v| v.is_finite()) {
            return;
        }
        // Float to int casts saturate, and every sum below fits in i64
        let (sx, sy, sw, sh) = (
            sx.round() as i32 as i64,
            sy.round() as i32 as i64,
            sw.round() as i32 as i64,
            sh.round() as i32 as i64,
        );
        let (dx, dy) = (dx.round() as i32 as i64, dy.round() as i32 as i64);
        let Some((x0, y0, w, h)) = clamp_to_surface(sx, sy, sw, sh, self.width, self.height) else {
            return;
        };
        // Keep the destination aligned with the part of the source that survived clamping
        let (sx, sy) = (sx.min(sx + sw), sy.min(sy + sh));
        let buffer = self.read_region(x0, y0, w, h);
        self.write_region(dx + (i64::from(x0) - sx), dy + (i64::from(y0) - sy), w, h, &buffer);
    }

    /// Render an intensity map of a region at (dx, dy).
    ///
    /// Intensity is luma times alpha of each source pixel, mapped through a
    /// blue, cyan, green, yellow, red ramp. Output pixels are opaque.
    pub fn create_heat_map(&mut self, sx: i32, sy: i32, sw: i32, sh: i32, dx: i32, dy: i32) {
        log::debug!(target: "canvas", "createHeatMap {} {} {} {} -> {} {}", sx, sy, sw, sh, dx, dy);
        let source = self.get_image_data(sx, sy, sw, sh);
        if source.is_empty() {
            return;
        }
        let mut out = vec![0u8; source.data.len()];
        for (src, dst) in source.data.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
            let luma = (0.299 * src[0] as f32 + 0.587 * src[1] as f32 + 0.114 * src[2] as f32)
                / 255.0;
            let intensity = luma * src[3] as f32 / 255.0;
            let [r, g, b] = heat_color(intensity);
            dst.copy_from_slice(&[r, g, b, 255]);
        }
        let (sx, sy, sw, sh) = (i64::from(sx), i64::from(sy), i64::from(sw), i64::from(sh));
        let (nsx, nsy) = (sx.min(sx + sw), sy.min(sy + sh));
        let (ox, oy) = (nsx.max(0) - nsx, nsy.max(0) - nsy);
        self.write_region(
            i64::from(dx) + ox,
            i64::from(dy) + oy,
            source.width,
            source.height,
            &out,
        );
    }

    /// Premultiplied bytes of an in-bounds region.
    fn read_region(&self, x: u32, y: u32, w: u32, h: u32) -> Vec<u8> {
        let stride = self.width as usize * 4;
        let row_len = w as usize * 4;
        let data = self.pixmap.data();
        let mut out = Vec::with_capacity(row_len * h as usize);
        for row in y as usize..(y + h) as usize {
            let start = row * stride + x as usize * 4;
            out.extend_from_slice(&data[start..start + row_len]);
        }
        out
    }

    /// Replace pixels with premultiplied `data` (w x h) at (x, y), clipped to the surface.
    fn write_region(&mut self, x: i64, y: i64, w: u32, h: u32, data: &[u8]) {
        let Some((x0, y0, cw, ch)) =
            clamp_to_surface(x, y, w.into(), h.into(), self.width, self.height)
        else {
            return;
        };
        let stride = self.width as usize * 4;
        let src_row_len = w as usize * 4;
        let (skip_x, skip_y) = (
            (i64::from(x0) - x) as usize,
            (i64::from(y0) - y) as usize,
        );
        let copy_len = cw as usize * 4;
        let pixels = self.pixmap.data_mut();
        for row in 0..ch as usize {
            let src = (skip_y + row) * src_row_len + skip_x * 4;
            let dst = (y0 as usize + row) * stride + x0 as usize * 4;
            pixels[dst..dst + copy_len].copy_from_slice(&data[src..src + copy_len]);
        }
        self.repaint.schedule_change();
    }

    /// Export the canvas as PNG data.
    ///
    /// `ppi` sets the pixel density metadata and defaults to 72.
    pub fn to_png(&self, ppi: Option<f32>) -> Canvas2dResult<Vec<u8>> {
        let ppi = ppi.unwrap_or(72.0);

        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            // Pixels per meter
            let ppm = (ppi.max(0.0) / 0.0254).round() as u32;
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));

            let mut writer = encoder.write_header()?;
            let image = self.get_image_data(0, 0, self.width as i32, self.height as i32);
            writer.write_image_data(&image.data)?;
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::test_context;
    use crate::image::CanvasImage;
    use rstest::rstest;

    #[rstest]
    #[case((0, 0, 10, 10), Some((0, 0, 10, 10)))]
    #[case((-5, -5, 10, 10), Some((0, 0, 5, 5)))]
    #[case((8, 8, -4, -4), Some((4, 4, 4, 4)))]
    #[case((15, 0, 5, 5), None)]
    #[case((0, 0, 0, 5), None)]
    #[case((0, 0, i32::MIN as i64, 5), None)]
    #[case((i32::MIN as i64, i32::MIN as i64, i32::MAX as i64, i32::MAX as i64), None)]
    #[case((-5, 0, i32::MAX as i64, 3), Some((0, 0, 10, 3)))]
    #[case((i32::MAX as i64, 0, i32::MIN as i64, 2), Some((0, 0, 10, 2)))]
    fn test_clamp_to_surface(
        #[case] rect: (i64, i64, i64, i64),
        #[case] expected: Option<(u32, u32, u32, u32)>,
    ) {
        let (x, y, w, h) = rect;
        assert_eq!(clamp_to_surface(x, y, w, h, 10, 10), expected);
    }

    #[test]
    fn test_heat_ramp_endpoints() {
        assert_eq!(heat_color(0.0), [0, 0, 255]);
        assert_eq!(heat_color(0.25), [0, 255, 255]);
        assert_eq!(heat_color(0.5), [0, 255, 0]);
        assert_eq!(heat_color(0.75), [255, 255, 0]);
        assert_eq!(heat_color(1.0), [255, 0, 0]);
    }

    #[test]
    fn test_get_image_data_clamps() {
        let mut ctx = test_context(10, 10);
        ctx.set_fill_style("rgba(255, 0, 0, 0.5)");
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 10.0, 10.0));

        let data = ctx.get_image_data(-5, 5, 10, 10);
        assert_eq!((data.width, data.height), (5, 5));
        let [r, g, _, a] = data.pixel(0, 0).unwrap();
        assert!(r >= 250 && g == 0, "unpremultiplied red {r}");
        assert!((127..=128).contains(&a));

        assert!(ctx.get_image_data(20, 20, 5, 5).is_empty());
    }

    #[test]
    fn test_put_get_roundtrip_is_identity() {
        let mut ctx = test_context(16, 16);
        let mut image = ImageData::new(16, 16);
        for (i, px) in image.data.chunks_exact_mut(4).enumerate() {
            px.copy_from_slice(&[(i * 7) as u8, (i * 13) as u8, (i * 29) as u8, (i * 3) as u8]);
        }
        ctx.put_image_data(&image, 0, 0);
        let before = ctx.pixmap.data().to_vec();

        let region = ctx.get_image_data(3, 2, 9, 11);
        ctx.put_image_data(&region, 3, 2);
        assert_eq!(ctx.pixmap.data(), &before[..]);
    }

    #[test]
    fn test_put_image_data_replaces_without_compositing() {
        let mut ctx = test_context(4, 4);
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 4.0, 4.0));
        ctx.set_global_alpha(0.5);
        ctx.set_global_composite_operation("destination-over");
        let clear = ImageData::new(2, 2);
        ctx.put_image_data(&clear, 1, 1);
        assert_eq!(ctx.pixmap.pixel(1, 1).unwrap().alpha(), 0);
        assert_eq!(ctx.pixmap.pixel(0, 0).unwrap().alpha(), 255);
    }

    #[test]
    fn test_put_image_data_dirty_subrect() {
        let mut ctx = test_context(10, 10);
        let image = ImageData::from_rgba(4, 4, vec![255; 64]).unwrap();
        ctx.put_image_data_dirty(
            &image,
            2,
            2,
            &DirtyRect {
                x: 1,
                y: 1,
                width: 2,
                height: 2,
            },
        );
        assert_eq!(ctx.pixmap.pixel(2, 2).unwrap().alpha(), 0);
        assert_eq!(ctx.pixmap.pixel(3, 3).unwrap().alpha(), 255);
        assert_eq!(ctx.pixmap.pixel(4, 4).unwrap().alpha(), 255);
        assert_eq!(ctx.pixmap.pixel(5, 5).unwrap().alpha(), 0);
    }

    #[test]
    fn test_put_image_data_partially_off_surface() {
        let mut ctx = test_context(4, 4);
        let image = ImageData::from_rgba(3, 3, vec![255; 36]).unwrap();
        ctx.put_image_data(&image, -1, 2);
        assert_eq!(ctx.pixmap.pixel(0, 2).unwrap().alpha(), 255);
        assert_eq!(ctx.pixmap.pixel(1, 3).unwrap().alpha(), 255);
        assert_eq!(ctx.pixmap.pixel(2, 2).unwrap().alpha(), 0);
    }

    #[test]
    fn test_move_canvas_image_overlapping() {
        let mut ctx = test_context(10, 1);
        let mut row = ImageData::new(10, 1);
        for x in 0..10 {
            row.data[x * 4..x * 4 + 4].copy_from_slice(&[x as u8 * 20, 0, 0, 255]);
        }
        ctx.put_image_data(&row, 0, 0);
        // Scroll left by two
        ctx.move_canvas_image(2.0, 0.0, 8.0, 1.0, 0.0, 0.0);
        let out = ctx.get_image_data(0, 0, 10, 1);
        for x in 0..8 {
            assert_eq!(out.pixel(x, 0).unwrap()[0], (x as u8 + 2) * 20);
        }
        // Untouched tail
        assert_eq!(out.pixel(9, 0).unwrap()[0], 180);
    }

    #[test]
    fn test_move_canvas_image_ignores_clip_and_transform() {
        let mut ctx = test_context(10, 10);
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 2.0, 2.0));
        ctx.translate(5.0, 5.0);
        ctx.begin_path();
        ctx.rect(&RectParams::new(0.0, 0.0, 1.0, 1.0));
        ctx.clip();
        ctx.move_canvas_image(0.0, 0.0, 2.0, 2.0, 7.0, 0.0);
        assert_eq!(ctx.pixmap.pixel(8, 1).unwrap().alpha(), 255);
    }

    #[rstest]
    #[case(0, 0, i32::MIN, 5)]
    #[case(0, 0, 5, i32::MIN)]
    #[case(i32::MAX, i32::MAX, i32::MAX, i32::MAX)]
    #[case(i32::MIN, i32::MIN, i32::MIN, i32::MIN)]
    #[case(i32::MAX, 0, i32::MIN, 5)]
    fn test_extreme_regions_do_not_panic(
        #[case] x: i32,
        #[case] y: i32,
        #[case] w: i32,
        #[case] h: i32,
    ) {
        let mut ctx = test_context(8, 8);
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 8.0, 8.0));
        let before = ctx.pixmap.data().to_vec();

        let data = ctx.get_image_data(x, y, w, h);
        assert!(data.width <= 8 && data.height <= 8);
        ctx.create_heat_map(x, y, w, h, x, y);

        let image = ImageData::from_rgba(4, 4, vec![255; 64]).unwrap();
        let dirty = DirtyRect {
            x: 2,
            y: 0,
            width: 2,
            height: 2,
        };
        ctx.put_image_data_dirty(&image, i32::MAX, i32::MAX, &dirty);
        ctx.put_image_data_dirty(&image, i32::MIN, i32::MIN, &dirty);
        ctx.put_image_data(&image, i32::MAX, i32::MIN);

        let (xf, yf, wf, hf) = (x as f32, y as f32, w as f32, h as f32);
        ctx.move_canvas_image(xf, yf, wf, hf, f32::MAX, -f32::MAX);
        ctx.move_canvas_image(0.0, 0.0, 8.0, 8.0, xf, yf);
        assert_eq!(ctx.pixmap.data(), &before[..]);
    }

    #[test]
    fn test_get_image_data_normalizes_min_width() {
        let ctx = test_context(10, 10);
        // x + w spans the whole surface once the size is normalized
        let data = ctx.get_image_data(i32::MAX, 0, i32::MIN, 1);
        assert_eq!((data.width, data.height), (10, 1));
    }

    #[test]
    fn test_heat_map_output() {
        let mut ctx = test_context(4, 2);
        ctx.set_fill_style("white");
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 1.0, 1.0));
        ctx.create_heat_map(0, 0, 2, 1, 0, 1);
        let hot = ctx.pixmap.pixel(0, 1).unwrap();
        let cold = ctx.pixmap.pixel(1, 1).unwrap();
        assert_eq!((hot.red(), hot.green(), hot.blue(), hot.alpha()), (255, 0, 0, 255));
        assert_eq!((cold.red(), cold.green(), cold.blue(), cold.alpha()), (0, 0, 255, 255));
    }

    #[test]
    fn test_draw_image_natural_size() {
        let mut ctx = test_context(10, 10);
        let image = CanvasImage::from_rgba(2, 2, &[0, 0, 255, 255].repeat(4)).unwrap();
        ctx.draw_image(&image, 3.0, 4.0);
        let p = ctx.pixmap.pixel(4, 5).unwrap();
        assert_eq!((p.blue(), p.alpha()), (255, 255));
        assert_eq!(ctx.pixmap.pixel(5, 5).unwrap().alpha(), 0);
        assert_eq!(ctx.pixmap.pixel(2, 4).unwrap().alpha(), 0);
    }

    #[test]
    fn test_draw_image_scaled_and_negative_size() {
        let mut ctx = test_context(20, 20);
        let image = CanvasImage::from_rgba(2, 2, &[255, 0, 0, 255].repeat(4)).unwrap();
        // Negative width/height are normalized: covers 2..10 x 2..10
        ctx.draw_image_scaled(&image, 10.0, 10.0, -8.0, -8.0);
        assert_eq!(ctx.pixmap.pixel(3, 3).unwrap().alpha(), 255);
        assert_eq!(ctx.pixmap.pixel(9, 9).unwrap().alpha(), 255);
        assert_eq!(ctx.pixmap.pixel(11, 11).unwrap().alpha(), 0);

        let before = ctx.pixmap.data().to_vec();
        ctx.draw_image_scaled(&image, 0.0, 0.0, 0.0, 5.0);
        ctx.draw_image(&CanvasImage::new(), 0.0, 0.0);
        assert_eq!(ctx.pixmap.data(), &before[..]);
    }

    #[test]
    fn test_draw_image_cropped_samples_source_rect() {
        let mut ctx = test_context(10, 10);
        // Left column red, right column green
        let image = CanvasImage::from_rgba(
            2,
            1,
            &[255, 0, 0, 255, 0, 255, 0, 255],
        )
        .unwrap();
        ctx.draw_image_cropped(
            &image,
            &ImageCropParams {
                sx: 1.0,
                sy: 0.0,
                sw: 1.0,
                sh: 1.0,
                dx: 0.0,
                dy: 0.0,
                dw: 4.0,
                dh: 4.0,
            },
        );
        let p = ctx.pixmap.pixel(2, 2).unwrap();
        assert_eq!((p.red(), p.green()), (0, 255));
        assert_eq!(ctx.pixmap.pixel(5, 2).unwrap().alpha(), 0);
    }

    #[test]
    fn test_draw_image_from_other_context() {
        let mut source = test_context(4, 4);
        source.set_fill_style("lime");
        source.fill_rect(&RectParams::new(0.0, 0.0, 4.0, 4.0));

        let mut ctx = test_context(8, 8);
        ctx.set_global_alpha(0.5);
        ctx.draw_image(&source, 4.0, 4.0);
        let p = ctx.pixmap.pixel(5, 5).unwrap();
        assert!((127..=128).contains(&p.alpha()));
        assert_eq!(ctx.pixmap.pixel(1, 1).unwrap().alpha(), 0);
    }

    #[test]
    fn test_to_png_roundtrip() {
        let mut ctx = test_context(6, 4);
        ctx.set_fill_style("#336699");
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 6.0, 4.0));
        let bytes = ctx.to_png(Some(144.0)).unwrap();

        let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (6, 4));
        assert_eq!(&buf[..4], &[0x33, 0x66, 0x99, 0xff]);
    }
}
