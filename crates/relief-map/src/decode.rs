use crate::raster::Rgba;

/// Raw value that marks a pixel as "no data" unless configured otherwise.
pub const DEFAULT_INVALID_VALUE: i32 = -8388608;

/// Decodes the elevation packed into an RGBA pixel.
///
/// The red, green and blue channels form a 24-bit big-endian two's complement integer. Transparent pixels and pixels holding
/// `invalid_value` decode to zero; everything else is the raw integer times `scale`.
#[inline]
pub fn decode_elevation(rgba: Rgba, scale: f64, invalid_value: i32) -> f32 {
    let [r, g, b, a] = rgba;
    let mut raw = (r as i32) << 16 | (g as i32) << 8 | b as i32;
    if r >= 128 {
        raw -= 1 << 24;
    }
    if a == 0 || raw == invalid_value {
        0.0
    } else {
        (raw as f64 * scale) as f32
    }
}

/// Scale and sentinel for one elevation layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelDecoder {
    pub scale: f64,
    pub invalid_value: i32,
}

impl PixelDecoder {
    pub fn new(scale: f64, invalid_value: i32) -> Self {
        Self {
            scale,
            invalid_value,
        }
    }

    #[inline]
    pub fn decode(&self, rgba: Rgba) -> f32 {
        decode_elevation(rgba, self.scale, self.invalid_value)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
