//! Labelled boxes burned into saved frames for later review. Only the
//! persisted copy is drawn on.
use image::{Rgba, RgbaImage};

use crate::perception::types::Annotation;

const OUTLINE: Rgba<u8> = Rgba([255, 68, 68, 220]);
const GLYPH_SIZE: u32 = 5;
const BACKDROP_SHADE: f32 = 0.2;

/// Annotated copy of `src`. Wide frames (over 1600 px) get doubled labels
/// and thicker outlines.
pub fn annotate(src: &RgbaImage, annotations: &[Annotation]) -> RgbaImage {
    let mut canvas = src.clone();
    let wide = canvas.width() > 1600;
    let scale: u32 = if wide { 2 } else { 1 };
    let thickness: i32 = if wide { 3 } else { 2 };

    for a in annotations {
        outline(&mut canvas, a, thickness);
        let label_height = ((GLYPH_SIZE + 4) * scale) as i32;
        let anchor = (a.x1.max(0), (a.y1 - label_height).max(0));
        label(&mut canvas, anchor, &a.label, scale);
    }
    canvas
}

fn outline(canvas: &mut RgbaImage, a: &Annotation, thickness: i32) {
    for t in 0..thickness {
        fill(canvas, a.x1, a.y1 + t, a.x2, a.y1 + t);
        fill(canvas, a.x1, a.y2 - t, a.x2, a.y2 - t);
        fill(canvas, a.x1 + t, a.y1, a.x1 + t, a.y2);
        fill(canvas, a.x2 - t, a.y1, a.x2 - t, a.y2);
    }
}

/// Blend the inclusive rectangle, clipped to the canvas.
fn fill(canvas: &mut RgbaImage, x1: i32, y1: i32, x2: i32, y2: i32) {
    let (w, h) = (canvas.width() as i32, canvas.height() as i32);
    for y in y1.max(0)..=y2.min(h - 1) {
        for x in x1.max(0)..=x2.min(w - 1) {
            blend(canvas.get_pixel_mut(x as u32, y as u32), OUTLINE);
        }
    }
}

fn label(canvas: &mut RgbaImage, (x, y): (i32, i32), text: &str, scale: u32) {
    let pad = 2 * scale;
    let advance = GLYPH_SIZE * scale + 1;
    let chars = text.chars().count() as u32;
    let (x, y) = (x as u32, y as u32);

    let bw = chars * advance + 2 * pad;
    let bh = GLYPH_SIZE * scale + 2 * pad;
    for py in y..(y + bh).min(canvas.height()) {
        for px in x..(x + bw).min(canvas.width()) {
            let p = canvas.get_pixel_mut(px, py);
            for c in 0..3 {
                p[c] = (p[c] as f32 * BACKDROP_SHADE) as u8;
            }
            p[3] = 255;
        }
    }

    for (i, c) in text.chars().enumerate() {
        let gx = x + pad + i as u32 * advance;
        if gx + GLYPH_SIZE * scale >= canvas.width() {
            break;
        }
        if let Some(bits) = glyph(c) {
            stamp(canvas, bits, gx, y + pad, scale);
        }
    }
}

/// Draw a packed 5×5 glyph; bit 24 is the top-left pixel.
fn stamp(canvas: &mut RgbaImage, bits: u32, x: u32, y: u32, scale: u32) {
    for cell in 0..GLYPH_SIZE * GLYPH_SIZE {
        if bits & (1 << (24 - cell)) == 0 {
            continue;
        }
        let (col, row) = (cell % GLYPH_SIZE, cell / GLYPH_SIZE);
        for dy in 0..scale {
            for dx in 0..scale {
                let (px, py) = (x + col * scale + dx, y + row * scale + dy);
                if px < canvas.width() && py < canvas.height() {
                    blend(canvas.get_pixel_mut(px, py), OUTLINE);
                }
            }
        }
    }
}

fn blend(p: &mut Rgba<u8>, colour: Rgba<u8>) {
    let a = colour[3] as f32 / 255.0;
    for c in 0..3 {
        p[c] = (p[c] as f32 * (1.0 - a) + colour[c] as f32 * a).round() as u8;
    }
    p[3] = 255;
}

/// Case-insensitive; unknown characters render as blanks.
fn glyph(c: char) -> Option<u32> {
    if c == ' ' {
        return None;
    }
    let upper = c.to_ascii_uppercase();
    GLYPHS.iter().find(|(g, _)| *g == upper).map(|(_, bits)| *bits)
}

const GLYPHS: [(char, u32); 43] = [
    ('0', 0x0E8C62E),
    ('1', 0x046108E),
    ('2', 0x0E8991F),
    ('3', 0x1E0983E),
    ('4', 0x0654BE2),
    ('5', 0x1F8783E),
    ('6', 0x0E87A2E),
    ('7', 0x1F08884),
    ('8', 0x0E8BA2E),
    ('9', 0x0E8BC2E),
    ('A', 0x0E8FE31),
    ('B', 0x1E8FA3E),
    ('C', 0x0E8420E),
    ('D', 0x1C9465C),
    ('E', 0x1F87A1F),
    ('F', 0x1F87A10),
    ('G', 0x0E84E2E),
    ('H', 0x118FE31),
    ('I', 0x0E2108E),
    ('J', 0x0710A4C),
    ('K', 0x1197251),
    ('L', 0x108421F),
    ('M', 0x11DD631),
    ('N', 0x11CD671),
    ('O', 0x0E8C62E),
    ('P', 0x1E8FA10),
    ('Q', 0x0E8D64D),
    ('R', 0x1E8FA51),
    ('S', 0x0F8383E),
    ('T', 0x1F21084),
    ('U', 0x118C62E),
    ('V', 0x118C544),
    ('W', 0x118D771),
    ('X', 0x1151151),
    ('Y', 0x1151084),
    ('Z', 0x1F1111F),
    (':', 0x0020080),
    ('_', 0x000001F),
    ('-', 0x0007C00),
    ('.', 0x0000004),
    ('/', 0x0111110),
    ('(', 0x0221082),
    (')', 0x0821088),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn black(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255]))
    }

    #[test]
    fn draws_box_edges_and_leaves_source_untouched() {
        let src = black(64, 64);
        let out = annotate(&src, &[Annotation::new(20, 30, 40, 50, "slot 5")]);

        assert_eq!(src.get_pixel(20, 40)[0], 0);
        assert!(out.get_pixel(20, 40)[0] > 200);
        assert!(out.get_pixel(40, 40)[0] > 200);
        assert_eq!(out.get_pixel(30, 40)[0], 0);
    }

    #[test]
    fn boxes_outside_the_frame_are_clipped() {
        let out = annotate(&black(16, 16), &[Annotation::new(-10, -10, 100, 100, "x")]);
        assert_eq!(out.dimensions(), (16, 16));
    }

    #[test]
    fn glyph_lookup_ignores_case() {
        assert_eq!(glyph('a'), glyph('A'));
        assert!(glyph('7').is_some());
        assert!(glyph(' ').is_none());
        assert!(glyph('~').is_none());
    }
}
