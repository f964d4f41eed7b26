use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::error::{DialError, DialResult};

/// Kernel radius covering three standard deviations.
pub(crate) fn radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

/// Separable Gaussian blur over premultiplied RGBA8, with kernels and scratch memory kept
/// across frames.
#[derive(Default)]
pub(crate) struct Blur {
    kernels: HashMap<(u32, u32), Arc<Vec<u32>>>,
    tmp: Vec<u8>,
    src: Vec<u8>,
}

impl Blur {
    /// Blur `pixels` (width*height*4 bytes) in place with standard deviation `sigma` pixels.
    pub(crate) fn apply(
        &mut self,
        pixels: &mut [u8],
        width: u32,
        height: u32,
        sigma: f32,
    ) -> DialResult<()> {
        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| DialError::render("blur buffer size overflow"))?;
        if pixels.len() != expected_len {
            return Err(DialError::render(
                "blur expects a buffer matching width*height*4",
            ));
        }
        let radius = radius_for_sigma(sigma);
        if radius == 0 || expected_len == 0 {
            return Ok(());
        }

        let kernel = self.kernel(radius, sigma)?;
        self.tmp.resize(expected_len, 0);
        self.src.clear();
        self.src.extend_from_slice(pixels);

        horizontal_pass(&self.src, &mut self.tmp, width, height, &kernel);
        vertical_pass(&self.tmp, pixels, width, height, &kernel);
        Ok(())
    }

    fn kernel(&mut self, radius: u32, sigma: f32) -> DialResult<Arc<Vec<u32>>> {
        let key = (radius, sigma.to_bits());
        if let Some(k) = self.kernels.get(&key) {
            return Ok(k.clone());
        }
        let k = Arc::new(gaussian_kernel_q16(radius, sigma)?);
        self.kernels.insert(key, k.clone());
        Ok(k)
    }
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> DialResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(DialError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(DialError::render("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();

    // Fold the rounding error into the center tap so the kernel sums to exactly 1.0 (Q16).
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}
