//! Pixel-level drawing helpers shared by the render layers.
//!
//! Layers are RGBA images with a fully transparent background; the final
//! frame is composited by alpha-blending them in order.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_antialiased_line_segment_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::pixelops::interpolate;
use imageproc::point::Point;

pub const COLOR_RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const COLOR_BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const COLOR_GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
pub const COLOR_YELLOW: Rgba<u8> = Rgba([255, 255, 0, 255]);
pub const COLOR_MAGENTA: Rgba<u8> = Rgba([255, 0, 255, 255]);
pub const COLOR_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const COLOR_BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const COLOR_GREY: Rgba<u8> = Rgba([127, 127, 127, 255]);
pub const COLOR_LIGHT_GREY: Rgba<u8> = Rgba([200, 200, 200, 255]);
pub const COLOR_DARK_GREY: Rgba<u8> = Rgba([50, 50, 50, 255]);
pub const COLOR_ORANGE: Rgba<u8> = Rgba([255, 127, 0, 255]);

/// Reset a layer to fully transparent.
pub fn clear(layer: &mut RgbaImage) {
    for pixel in layer.pixels_mut() {
        *pixel = Rgba([0, 0, 0, 0]);
    }
}

/// Alpha-blend one pixel. Out-of-bounds writes are ignored.
pub fn blend_pixel(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let alpha = color[3] as f32 / 255.0;
    if alpha <= 0.0 {
        return;
    }
    let background = *img.get_pixel(x as u32, y as u32);
    let back_weight = background[3] as f32 / 255.0 * (1.0 - alpha);
    let out_alpha = alpha + back_weight;
    let channel =
        |src: u8, dst: u8| ((src as f32 * alpha + dst as f32 * back_weight) / out_alpha) as u8;
    img.put_pixel(
        x as u32,
        y as u32,
        Rgba([
            channel(color[0], background[0]),
            channel(color[1], background[1]),
            channel(color[2], background[2]),
            (out_alpha * 255.0).round() as u8,
        ]),
    );
}

/// Alpha-blend `src` onto `dst` with its top-left corner at (x, y).
pub fn blit(dst: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32) {
    blit_faded(dst, src, x, y, 1.0);
}

/// Like [`blit`] with an extra opacity factor applied to every pixel.
pub fn blit_faded(dst: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32, opacity: f32) {
    for (sx, sy, pixel) in src.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        let mut pixel = *pixel;
        if opacity < 1.0 {
            pixel[3] = (pixel[3] as f32 * opacity) as u8;
        }
        blend_pixel(dst, x + sx as i32, y + sy as i32, pixel);
    }
}

/// Blit `src` rotated by `angle` radians about its own center, with that
/// center landing on (cx, cy). Positive angles turn +X toward +Y, which is
/// clockwise on screen. Samples by rotating each destination offset back
/// into source space.
pub fn blit_rotated(dst: &mut RgbaImage, src: &RgbaImage, cx: i32, cy: i32, angle: f32) {
    let src_w = src.width() as f32;
    let src_h = src.height() as f32;
    let (sin_a, cos_a) = angle.sin_cos();
    let half = (src_w.max(src_h) * std::f32::consts::SQRT_2 / 2.0).ceil() as i32 + 1;
    for dy in -half..=half {
        for dx in -half..=half {
            let dest_x = cx + dx;
            let dest_y = cy + dy;
            if dest_x < 0
                || dest_y < 0
                || dest_x >= dst.width() as i32
                || dest_y >= dst.height() as i32
            {
                continue;
            }
            let fx = dx as f32;
            let fy = dy as f32;
            let src_x = (fx * cos_a + fy * sin_a + src_w / 2.0).floor() as i32;
            let src_y = (-fx * sin_a + fy * cos_a + src_h / 2.0).floor() as i32;
            if src_x < 0 || src_y < 0 || src_x >= src.width() as i32 || src_y >= src.height() as i32
            {
                continue;
            }
            let pixel = *src.get_pixel(src_x as u32, src_y as u32);
            if pixel[3] == 0 {
                continue;
            }
            blend_pixel(dst, dest_x, dest_y, pixel);
        }
    }
}

fn quad_corners(p0: (f32, f32), p1: (f32, f32), width: f32) -> Option<[Point<i32>; 4]> {
    let dx = p1.0 - p0.0;
    let dy = p1.1 - p0.1;
    let length = (dx * dx + dy * dy).sqrt();
    if length < f32::EPSILON {
        return None;
    }
    let nx = -dy / length;
    let ny = dx / length;
    let hw = (width / 2.0).max(0.5);
    let corner = |x: f32, y: f32| Point::new(x.round() as i32, y.round() as i32);
    let corners = [
        corner(p0.0 + nx * hw, p0.1 + ny * hw),
        corner(p1.0 + nx * hw, p1.1 + ny * hw),
        corner(p1.0 - nx * hw, p1.1 - ny * hw),
        corner(p0.0 - nx * hw, p0.1 - ny * hw),
    ];
    // draw_polygon_mut rejects a polygon whose last point closes the loop
    if corners[0] == corners[3] {
        return None;
    }
    Some(corners)
}

/// A line drawn as a filled rotated quad, hard edges.
pub fn draw_thick_line(img: &mut RgbaImage, p0: (f32, f32), p1: (f32, f32), width: f32, color: Rgba<u8>) {
    if width <= 1.0 {
        draw_line_segment_mut(img, p0, p1, color);
        return;
    }
    match quad_corners(p0, p1, width) {
        Some(corners) => draw_polygon_mut(img, &corners, color),
        None => draw_line_segment_mut(img, p0, p1, color),
    }
}

/// A line drawn as a filled rotated quad with smoothed edges.
pub fn draw_thick_line_aa(img: &mut RgbaImage, p0: (f32, f32), p1: (f32, f32), width: f32, color: Rgba<u8>) {
    let aa_edge = |img: &mut RgbaImage, a: Point<i32>, b: Point<i32>| {
        draw_antialiased_line_segment_mut(img, (a.x, a.y), (b.x, b.y), color, interpolate);
    };
    if width <= 1.0 {
        draw_antialiased_line_segment_mut(
            img,
            (p0.0.round() as i32, p0.1.round() as i32),
            (p1.0.round() as i32, p1.1.round() as i32),
            color,
            interpolate,
        );
        return;
    }
    match quad_corners(p0, p1, width) {
        Some(corners) => {
            draw_polygon_mut(img, &corners, color);
            aa_edge(img, corners[0], corners[1]);
            aa_edge(img, corners[1], corners[2]);
            aa_edge(img, corners[2], corners[3]);
            aa_edge(img, corners[3], corners[0]);
        }
        None => draw_line_segment_mut(img, p0, p1, color),
    }
}

/// Dispatch on the anti-aliasing setting.
pub fn draw_line(img: &mut RgbaImage, p0: (f32, f32), p1: (f32, f32), width: f32, color: Rgba<u8>, antialiasing: bool) {
    if antialiasing {
        draw_thick_line_aa(img, p0, p1, width, color);
    } else {
        draw_thick_line(img, p0, p1, width, color);
    }
}

/// A line with a contrasting border: the border pass is drawn first at
/// `width + border`, then the line itself on top.
pub fn draw_line_with_border(
    img: &mut RgbaImage,
    p0: (f32, f32),
    p1: (f32, f32),
    width: f32,
    color: Rgba<u8>,
    border: f32,
    border_color: Rgba<u8>,
    antialiasing: bool,
) {
    draw_line(img, p0, p1, width + border, border_color, antialiasing);
    draw_line(img, p0, p1, width, color, antialiasing);
}

/// Alpha-blend a filled rectangle; the color's alpha applies to every pixel.
pub fn fill_rect_blend(img: &mut RgbaImage, x: i32, y: i32, width: i32, height: i32, color: Rgba<u8>) {
    for dy in 0..height {
        for dx in 0..width {
            blend_pixel(img, x + dx, y + dy, color);
        }
    }
}

/// Alpha-blend a filled disc centered at (cx, cy).
pub fn fill_circle_blend(img: &mut RgbaImage, cx: i32, cy: i32, radius: i32, color: Rgba<u8>) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                blend_pixel(img, cx + dx, cy + dy, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupied_box(img: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, pixel) in img.enumerate_pixels() {
            if pixel[3] == 0 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        }
        bounds
    }

    #[test]
    fn blend_pixel_composites_over_an_opaque_background() {
        let mut img = RgbaImage::from_pixel(4, 4, COLOR_BLACK);
        // 40% white over black
        blend_pixel(&mut img, 1, 1, Rgba([255, 255, 255, 102]));
        let pixel = img.get_pixel(1, 1);
        assert_eq!(pixel[0], 102);
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut img = RgbaImage::new(4, 4);
        blend_pixel(&mut img, -1, 0, COLOR_WHITE);
        blend_pixel(&mut img, 0, 99, COLOR_WHITE);
        assert!(occupied_box(&img).is_none());
    }

    #[test]
    fn thick_lines_cover_their_width() {
        let mut img = RgbaImage::new(16, 16);
        draw_thick_line(&mut img, (2.0, 8.0), (12.0, 8.0), 4.0, COLOR_WHITE);
        assert_eq!(*img.get_pixel(7, 8), COLOR_WHITE);
        assert_eq!(*img.get_pixel(7, 7), COLOR_WHITE);
        assert_eq!(*img.get_pixel(7, 9), COLOR_WHITE);
        // Well outside the half width
        assert_eq!(img.get_pixel(7, 2)[3], 0);
    }

    #[test]
    fn rotating_a_wide_glyph_ninety_degrees_makes_it_tall() {
        let src = RgbaImage::from_pixel(8, 2, COLOR_MAGENTA);
        let mut flat = RgbaImage::new(32, 32);
        blit_rotated(&mut flat, &src, 16, 16, 0.0);
        let (min_x, min_y, max_x, max_y) = occupied_box(&flat).unwrap();
        assert!(max_x - min_x > max_y - min_y);

        let mut turned = RgbaImage::new(32, 32);
        blit_rotated(&mut turned, &src, 16, 16, std::f32::consts::FRAC_PI_2);
        let (min_x, min_y, max_x, max_y) = occupied_box(&turned).unwrap();
        assert!(max_y - min_y > max_x - min_x);
    }

    #[test]
    fn faded_blits_scale_the_source_alpha() {
        let src = RgbaImage::from_pixel(2, 2, COLOR_WHITE);
        let mut dst = RgbaImage::from_pixel(4, 4, COLOR_BLACK);
        blit_faded(&mut dst, &src, 0, 0, 0.5);
        let pixel = dst.get_pixel(0, 0);
        assert!(pixel[0] > 110 && pixel[0] < 140);
    }

    #[test]
    fn translucent_discs_blend_and_stay_inside_the_radius() {
        let mut img = RgbaImage::from_pixel(16, 16, COLOR_BLACK);
        fill_circle_blend(&mut img, 8, 8, 3, Rgba([255, 127, 0, 100]));
        assert!(img.get_pixel(8, 8)[0] > 0);
        assert_eq!(img.get_pixel(8, 3)[0], 0);
    }
}
