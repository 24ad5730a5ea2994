//! Procedural textures
//!
//! Brushed metal, concrete, paper and film surfaces painted with simple
//! 2D primitives (streaks, soft blobs, fibers, curved crinkles) plus per-pixel
//! grain, and a radial contact shadow for the ground platform. Output depends
//! only on kind, size and seed.

use glam::Vec2;
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::TEXTURE_SIZE;

/// Available procedural surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureKind {
    BrushedMetal,
    Concrete,
    Paper,
    Film,
    /// Black with alpha falling off from the center, laid over the ground
    ContactShadow,
}

impl TextureKind {
    pub fn all() -> &'static [TextureKind] {
        &[
            TextureKind::BrushedMetal,
            TextureKind::Concrete,
            TextureKind::Paper,
            TextureKind::Film,
            TextureKind::ContactShadow,
        ]
    }

    /// Fixed seed so every session paints the same surfaces
    pub fn default_seed(&self) -> u64 {
        match self {
            TextureKind::BrushedMetal => 0x6d65_7461_6c00,
            TextureKind::Concrete => 0x636f_6e63_7265,
            TextureKind::Paper => 0x7061_7065_7200,
            TextureKind::Film => 0x6669_6c6d_0000,
            TextureKind::ContactShadow => 0x7368_6164_6f77,
        }
    }

    /// Texture at the default size and seed
    pub fn generate_default(&self) -> RgbaImage {
        generate_texture(*self, TEXTURE_SIZE, self.default_seed())
    }
}

/// Paint a texture of `size` x `size` pixels.
///
/// Feature counts scale with area and feature sizes with edge length, so a
/// small texture looks like a downscaled large one.
pub fn generate_texture(kind: TextureKind, size: u32, seed: u64) -> RgbaImage {
    let size = size.max(1);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut canvas = Canvas::new(size);
    let k = size as f32 / TEXTURE_SIZE as f32;
    let count = |n: f32| ((n * k * k).round() as usize).max(1);

    match kind {
        TextureKind::BrushedMetal => {
            canvas.fill([128.0, 128.0, 128.0, 1.0]);
            for i in 0..count(2000.0) {
                let x = rng.gen_range(0.0..size as f32);
                let y = rng.gen_range(0.0..size as f32);
                let length = (50.0 + rng.gen_range(0.0..200.0)) * k;
                let opacity = 0.05 + rng.gen_range(0.0..0.1);
                canvas.fill_rect(x, y, length, 1.0, [255.0, 255.0, 255.0, opacity]);
                // Dark streaks for contrast
                if i % 2 == 0 {
                    canvas.fill_rect(x, y, length, 1.0, [0.0, 0.0, 0.0, opacity]);
                }
            }
            canvas.into_image_with_grain(&mut rng, 10.0)
        }
        TextureKind::Concrete => {
            canvas.fill([224.0, 224.0, 224.0, 1.0]);
            for _ in 0..count(5000.0) {
                let center = Vec2::new(
                    rng.gen_range(0.0..size as f32),
                    rng.gen_range(0.0..size as f32),
                );
                let radius = (20.0 + rng.gen_range(0.0..60.0)) * k;
                let opacity = 0.02 + rng.gen_range(0.0..0.04);
                let grey = if rng.r#gen::<bool>() { 255.0 } else { 0.0 };
                canvas.radial_blob(center, radius, [grey, grey, grey, opacity]);
            }
            canvas.into_image_with_grain(&mut rng, 15.0)
        }
        TextureKind::Paper => {
            canvas.fill([253.0, 253.0, 253.0, 1.0]);
            for _ in 0..count(2000.0) {
                let center = Vec2::new(
                    rng.gen_range(0.0..size as f32),
                    rng.gen_range(0.0..size as f32),
                );
                let radius = (5.0 + rng.gen_range(0.0..15.0)) * k;
                let opacity = 0.01 + rng.gen_range(0.0..0.02);
                canvas.fill_circle(center, radius, [220.0, 220.0, 210.0, opacity]);
            }
            // Fibers
            for _ in 0..count(5000.0) {
                let start = Vec2::new(
                    rng.gen_range(0.0..size as f32),
                    rng.gen_range(0.0..size as f32),
                );
                let length = (2.0 + rng.gen_range(0.0..4.0)) * k;
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                let end = start + Vec2::from_angle(angle) * length;
                canvas.stroke_line(start, end, 0.5, [180.0, 180.0, 170.0, 0.05]);
            }
            canvas.into_image_with_grain(&mut rng, 5.0)
        }
        TextureKind::Film => {
            // Clear base, only highlights are painted
            for _ in 0..count(300.0) {
                let start = Vec2::new(
                    rng.gen_range(0.0..size as f32),
                    rng.gen_range(0.0..size as f32),
                );
                let length = (20.0 + rng.gen_range(0.0..60.0)) * k;
                let dir = Vec2::from_angle(rng.gen_range(0.0..std::f32::consts::TAU));
                let opacity = 0.05 + rng.gen_range(0.0..0.15);
                let jitter = Vec2::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0)) * k;
                let control = start + dir * (length / 2.0) + jitter;
                let end = start + dir * length;
                let width = 0.5 + rng.gen_range(0.0..1.0);
                canvas.stroke_quadratic(start, control, end, width, [255.0, 255.0, 255.0, opacity]);
            }
            for _ in 0..count(50.0) {
                let center = Vec2::new(
                    rng.gen_range(0.0..size as f32),
                    rng.gen_range(0.0..size as f32),
                );
                let radius = (30.0 + rng.gen_range(0.0..100.0)) * k;
                let opacity = 0.01 + rng.gen_range(0.0..0.03);
                canvas.radial_blob(center, radius, [255.0, 255.0, 255.0, opacity]);
            }
            canvas.into_image()
        }
        TextureKind::ContactShadow => {
            canvas.contact_shadow(CONTACT_SHADOW_OPACITY);
            canvas.into_image()
        }
    }
}

/// Peak alpha at the center of the contact shadow
const CONTACT_SHADOW_OPACITY: f32 = 0.45;

/// Float RGBA canvas with straight alpha and source-over blending
struct Canvas {
    size: u32,
    /// RGB in 0..=255, alpha in 0..=1
    pixels: Vec<[f32; 4]>,
}

impl Canvas {
    fn new(size: u32) -> Self {
        Self {
            size,
            pixels: vec![[0.0; 4]; size as usize * size as usize],
        }
    }

    fn fill(&mut self, color: [f32; 4]) {
        self.pixels.fill(color);
    }

    fn blend(&mut self, x: i64, y: i64, color: [f32; 4], coverage: f32) {
        if x < 0 || y < 0 || x >= self.size as i64 || y >= self.size as i64 {
            return;
        }
        let src_a = (color[3] * coverage).clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst = &mut self.pixels[y as usize * self.size as usize + x as usize];
        let out_a = src_a + dst[3] * (1.0 - src_a);
        if out_a <= f32::EPSILON {
            return;
        }
        for c in 0..3 {
            dst[c] = (color[c] * src_a + dst[c] * dst[3] * (1.0 - src_a)) / out_a;
        }
        dst[3] = out_a;
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: [f32; 4]) {
        let (x0, y0) = (x.floor() as i64, y.floor() as i64);
        let (x1, y1) = ((x + width).ceil() as i64, (y + height).ceil() as i64);
        for py in y0.max(0)..y1.min(self.size as i64) {
            for px in x0.max(0)..x1.min(self.size as i64) {
                self.blend(px, py, color, 1.0);
            }
        }
    }

    /// Soft disc whose alpha falls off linearly to zero at `radius`
    fn radial_blob(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        self.for_each_in_disc(center, radius, |canvas, px, py, distance| {
            canvas.blend(px, py, color, 1.0 - distance / radius);
        });
    }

    /// Black disc inscribed in the canvas, alpha easing out quadratically
    /// from `opacity` at the center to zero at the rim
    fn contact_shadow(&mut self, opacity: f32) {
        let half = self.size as f32 / 2.0;
        let center = Vec2::splat(half);
        let size = self.size as usize;
        for (i, pixel) in self.pixels.iter_mut().enumerate() {
            let p = Vec2::new((i % size) as f32 + 0.5, (i / size) as f32 + 0.5);
            let t = (p.distance(center) / half).min(1.0);
            *pixel = [0.0, 0.0, 0.0, opacity * (1.0 - t) * (1.0 - t)];
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        self.for_each_in_disc(center, radius, |canvas, px, py, _| {
            canvas.blend(px, py, color, 1.0);
        });
    }

    fn for_each_in_disc(
        &mut self,
        center: Vec2,
        radius: f32,
        mut f: impl FnMut(&mut Self, i64, i64, f32),
    ) {
        if radius <= 0.0 {
            return;
        }
        let min = (center - Vec2::splat(radius)).floor();
        let max = (center + Vec2::splat(radius)).ceil();
        let size = self.size as i64;
        for py in (min.y as i64).max(0)..(max.y as i64).min(size) {
            for px in (min.x as i64).max(0)..(max.x as i64).min(size) {
                let distance = (Vec2::new(px as f32 + 0.5, py as f32 + 0.5) - center).length();
                if distance < radius {
                    f(self, px, py, distance);
                }
            }
        }
    }

    /// Hairline stroke; widths below one pixel lower the coverage instead
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
        let steps = (from.distance(to).ceil() as usize).max(1);
        let coverage = width.min(1.0);
        let radius = (width / 2.0).max(0.5);
        let mut last = None;
        for i in 0..=steps {
            let p = from.lerp(to, i as f32 / steps as f32);
            let pixel = (p.x.floor() as i64, p.y.floor() as i64);
            if last == Some(pixel) {
                continue;
            }
            last = Some(pixel);
            if radius <= 0.5 {
                self.blend(pixel.0, pixel.1, color, coverage);
            } else {
                self.fill_circle(p, radius, [color[0], color[1], color[2], color[3] * coverage]);
            }
        }
    }

    fn stroke_quadratic(&mut self, from: Vec2, control: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
        const SEGMENTS: usize = 12;
        let point = |t: f32| {
            let u = 1.0 - t;
            from * (u * u) + control * (2.0 * u * t) + to * (t * t)
        };
        let mut prev = from;
        for i in 1..=SEGMENTS {
            let next = point(i as f32 / SEGMENTS as f32);
            self.stroke_line(prev, next, width, color);
            prev = next;
        }
    }

    fn into_image(self) -> RgbaImage {
        let size = self.size;
        let mut image = RgbaImage::new(size, size);
        for (pixel, src) in image.pixels_mut().zip(self.pixels) {
            *pixel = Rgba([
                src[0].round().clamp(0.0, 255.0) as u8,
                src[1].round().clamp(0.0, 255.0) as u8,
                src[2].round().clamp(0.0, 255.0) as u8,
                (src[3] * 255.0).round().clamp(0.0, 255.0) as u8,
            ]);
        }
        image
    }

    /// Quantize, then add uniform grey noise of the given amplitude
    fn into_image_with_grain(self, rng: &mut StdRng, amplitude: f32) -> RgbaImage {
        let mut image = self.into_image();
        for pixel in image.pixels_mut() {
            let noise = (rng.r#gen::<f32>() - 0.5) * amplitude;
            for c in 0..3 {
                pixel.0[c] = (f32::from(pixel.0[c]) + noise).round().clamp(0.0, 255.0) as u8;
            }
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean_rgb(image: &RgbaImage) -> f32 {
        let sum: u64 = image
            .pixels()
            .map(|p| u64::from(p.0[0]) + u64::from(p.0[1]) + u64::from(p.0[2]))
            .sum();
        sum as f32 / (image.pixels().len() * 3) as f32
    }

    #[test]
    fn test_same_seed_same_texture() {
        for kind in TextureKind::all() {
            let a = generate_texture(*kind, 64, 7);
            let b = generate_texture(*kind, 64, 7);
            assert_eq!(a.as_raw(), b.as_raw(), "{:?}", kind);
        }
    }

    #[test]
    fn test_different_seed_differs() {
        let a = generate_texture(TextureKind::Concrete, 64, 1);
        let b = generate_texture(TextureKind::Concrete, 64, 2);
        assert_ne!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_requested_size() {
        let image = generate_texture(TextureKind::Paper, 32, 0);
        assert_eq!(image.dimensions(), (32, 32));
    }

    #[test]
    fn test_surface_tones() {
        let metal = generate_texture(TextureKind::BrushedMetal, 64, 3);
        assert!((mean_rgb(&metal) - 128.0).abs() < 20.0);

        let paper = generate_texture(TextureKind::Paper, 64, 3);
        assert!(mean_rgb(&paper) > 230.0);
        assert!(paper.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn test_contact_shadow_fades_to_rim() {
        let shadow = generate_texture(TextureKind::ContactShadow, 64, 0);
        let center = shadow.get_pixel(32, 32).0;
        let corner = shadow.get_pixel(0, 0).0;
        let midway = shadow.get_pixel(48, 32).0;
        assert_eq!(&center[..3], &[0, 0, 0]);
        assert!(center[3] > 100);
        assert!(midway[3] > 0 && midway[3] < center[3]);
        assert_eq!(corner[3], 0);
    }

    #[test]
    fn test_canvas_covers_every_pixel() {
        let canvas = Canvas::new(300);
        assert_eq!(canvas.pixels.len(), 90_000);

        // Edge pixels of a large canvas are addressable
        let mut canvas = Canvas::new(2048);
        canvas.blend(2047, 2047, [255.0, 0.0, 0.0, 1.0], 1.0);
        assert_eq!(canvas.pixels[2048 * 2048 - 1], [255.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_film_is_mostly_clear() {
        let film = generate_texture(TextureKind::Film, 64, 5);
        let clear = film.pixels().filter(|p| p.0[3] < 16).count();
        assert!(clear > film.pixels().len() / 2);
    }
}
