use super::frame::Frame;

/// Per-pixel skin classification for one frame, plus zone-rectangle counting.
///
/// The rule is a fixed two-branch chrominance heuristic on raw RGB, chosen so
/// the whole frame can be classified every tick with integer compares only.
/// It is not a trained model and makes no identity claim; it only estimates
/// "how much of this region looks like skin".
#[derive(Debug)]
pub struct SkinMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
    skin_total: usize,
}

/// Mid-tone skin: warm, red-dominant, with enough channel spread to exclude
/// gray surfaces.
#[inline]
fn branch_midtone(r: u8, g: u8, b: u8) -> bool {
    let (r16, g16, b16) = (r as i16, g as i16, b as i16);
    let max = r16.max(g16).max(b16);
    let min = r16.min(g16).min(b16);
    r16 > 95 && g16 > 40 && b16 > 20 && (max - min) > 15 && (r16 - g16).abs() > 15 && r > g && r > b
}

/// Over-exposed skin: near-equal high-brightness channels, still warmer than
/// blue. Catches faces washed out by direct lighting that branch A misses.
#[inline]
fn branch_highlight(r: u8, g: u8, b: u8) -> bool {
    let (r16, g16) = (r as i16, g as i16);
    r > 220 && g > 210 && b > 170 && (r16 - g16).abs() <= 15 && r > b && g > b
}

#[inline]
pub fn is_skin(r: u8, g: u8, b: u8) -> bool {
    branch_midtone(r, g, b) || branch_highlight(r, g, b)
}

impl SkinMask {
    /// Classify every pixel of the frame. O(pixels), one allocation.
    pub fn classify(frame: &Frame) -> Self {
        let mut bits = Vec::with_capacity(frame.pixel_count());
        let mut skin_total = 0usize;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let (r, g, b) = frame.rgb(x, y);
                let skin = is_skin(r, g, b);
                skin_total += skin as usize;
                bits.push(skin);
            }
        }
        Self {
            width: frame.width(),
            height: frame.height(),
            bits,
            skin_total,
        }
    }

    /// Fraction of skin pixels over the whole frame, in [0, 1].
    pub fn overall_ratio(&self) -> f32 {
        if self.bits.is_empty() {
            return 0.0;
        }
        self.skin_total as f32 / self.bits.len() as f32
    }

    /// Fraction of skin pixels within a pixel rectangle, in [0, 1]. The
    /// rectangle is clamped to the frame; an empty intersection yields 0.
    pub fn ratio_in(&self, x: u32, y: u32, w: u32, h: u32) -> f32 {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        if x >= x_end || y >= y_end {
            return 0.0;
        }

        let mut skin = 0usize;
        for row in y..y_end {
            let base = row as usize * self.width as usize;
            for col in x..x_end {
                skin += self.bits[base + col as usize] as usize;
            }
        }
        let total = (x_end - x) as usize * (y_end - y) as usize;
        skin as f32 / total as f32
    }
}
