use image::{Rgb, RgbImage};

#[inline]
fn get_channel(src: &RgbImage, x: i64, y: i64, channel: usize) -> f32 {
    if x < 0 || y < 0 || x >= src.width() as i64 || y >= src.height() as i64 {
        return 0.0;
    }
    src.get_pixel(x as u32, y as u32).0[channel] as f32
}

/// Bilinear sample of one channel; pixels outside the image read as 0.
#[inline]
pub fn sample_bilinear(src: &RgbImage, x: f32, y: f32, channel: usize) -> f32 {
    let x0f = x.floor();
    let y0f = y.floor();
    let fx = x - x0f;
    let fy = y - y0f;
    let x0 = x0f as i64;
    let y0 = y0f as i64;

    let p00 = get_channel(src, x0, y0, channel);
    let p10 = get_channel(src, x0 + 1, y0, channel);
    let p01 = get_channel(src, x0, y0 + 1, channel);
    let p11 = get_channel(src, x0 + 1, y0 + 1, channel);

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

/// Bilinear sample of all three channels, rounded to the nearest level.
#[inline]
pub fn sample_bilinear_rgb(src: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    if !x.is_finite() || !y.is_finite() {
        return Rgb([0, 0, 0]);
    }
    let mut out = [0u8; 3];
    for (channel, v) in out.iter_mut().enumerate() {
        *v = sample_bilinear(src, x, y, channel).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}
