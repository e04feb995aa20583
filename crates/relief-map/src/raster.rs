use ndshape::{RuntimeShape, Shape};

pub type Rgba = [u8; 4];

/// Largest accepted side length of a fetched raster. Composites are one pixel wider.
pub const MAX_TILE_WIDTH: u32 = 4096;

fn area(width: u32) -> usize {
    width as usize * width as usize
}

/// A square grid of RGBA pixels in row-major order, with row 0 at the north edge.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterTile {
    width: u32,
    pixels: Vec<Rgba>,
    /// Side length, in pixels, of the blocks that were replicated from a coarser ancestor tile. `1` at native resolution.
    pub resolution_unit: u32,
}

impl RasterTile {
    /// A fully transparent raster, which decodes to zero elevation everywhere.
    pub fn blank(width: u32, resolution_unit: u32) -> Self {
        Self {
            width,
            pixels: vec![[0; 4]; area(width)],
            resolution_unit,
        }
    }

    /// # Panics
    ///
    /// If `pixels` does not hold exactly `width * width` values.
    pub fn from_pixels(width: u32, pixels: Vec<Rgba>) -> Self {
        assert_eq!(pixels.len(), area(width));
        Self {
            width,
            pixels,
            resolution_unit: 1,
        }
    }

    /// Reinterprets tightly packed RGBA bytes. Returns `None` if the length is not `4 * width * width`.
    pub fn from_rgba_bytes(width: u32, bytes: &[u8]) -> Option<Self> {
        let pixels: &[Rgba] = bytemuck::try_cast_slice(bytes).ok()?;
        (pixels.len() == area(width)).then(|| Self::from_pixels(width, pixels.to_vec()))
    }

    /// Every pixel set to `rgba`.
    pub fn uniform(width: u32, rgba: Rgba) -> Self {
        Self::from_pixels(width, vec![rgba; area(width)])
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    #[inline]
    fn shape(&self) -> RuntimeShape<u32, 2> {
        RuntimeShape::<u32, 2>::new([self.width, self.width])
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.pixels[self.shape().linearize([x, y]) as usize]
    }

    /// Copies `src` so that its `(0, 0)` pixel lands at `offset`. Pixels falling outside of `self` are dropped.
    pub fn blit(&mut self, src: &Self, offset: [u32; 2]) {
        let dst_shape = self.shape();
        let src_shape = src.shape();
        let w = src.width.min(self.width.saturating_sub(offset[0]));
        let h = src.width.min(self.width.saturating_sub(offset[1]));
        if w == 0 || h == 0 {
            return;
        }
        for y in 0..h {
            let src_row = src_shape.linearize([0, y]) as usize;
            let dst_row = dst_shape.linearize([offset[0], offset[1] + y]) as usize;
            self.pixels[dst_row..dst_row + w as usize]
                .copy_from_slice(&src.pixels[src_row..src_row + w as usize]);
        }
    }

    /// The `size × size` square whose north-west corner is `origin`. The square is clipped to this raster, and clipped pixels
    /// are blank.
    pub fn crop(&self, origin: [u32; 2], size: u32) -> Self {
        let mut cropped = Self::blank(size, self.resolution_unit);
        let shape = self.shape();
        for y in 0..size {
            for x in 0..size {
                let (sx, sy) = (origin[0] + x, origin[1] + y);
                if sx < self.width && sy < self.width {
                    cropped.pixels[(y * size + x) as usize] =
                        self.pixels[shape.linearize([sx, sy]) as usize];
                }
            }
        }
        cropped
    }

    /// Scales this raster up to `width` by nearest-neighbor sampling, so every source pixel becomes a solid block.
    pub fn expand_nearest(&self, width: u32, resolution_unit: u32) -> Self {
        let mut expanded = Self::blank(width, resolution_unit);
        let src_shape = self.shape();
        let dst_shape = expanded.shape();
        let ratio = |p: u32| (p as u64 * self.width as u64 / width as u64) as u32;
        for y in 0..width {
            let sy = ratio(y);
            for x in 0..width {
                expanded.pixels[dst_shape.linearize([x, y]) as usize] =
                    self.pixels[src_shape.linearize([ratio(x), sy]) as usize];
            }
        }
        expanded
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;

    fn numbered(width: u32) -> RasterTile {
        RasterTile::from_pixels(
            width,
            (0..width * width).map(|i| [i as u8, 0, 0, 255]).collect(),
        )
    }

    #[test]
    fn rgba_bytes_must_match_width() {
        let bytes = [1u8; 16];
        let raster = RasterTile::from_rgba_bytes(2, &bytes).unwrap();
        assert_eq!(raster.pixel(1, 1), [1; 4]);
        assert!(RasterTile::from_rgba_bytes(3, &bytes).is_none());
        // Pixel count no longer fits in a u32.
        assert!(RasterTile::from_rgba_bytes(1 << 16, &bytes).is_none());
    }

    #[test]
    fn blit_clips_to_destination() {
        let mut dst = RasterTile::blank(3, 1);
        dst.blit(&numbered(2), [2, 2]);
        assert_eq!(dst.pixel(2, 2), [0, 0, 0, 255]);
        assert_eq!(dst.pixel(1, 1), [0; 4]);
        assert_eq!(dst.pixels().iter().filter(|p| p[3] == 255).count(), 1);
    }

    #[test]
    fn crop_takes_sub_square() {
        let cropped = numbered(4).crop([2, 1], 2);
        assert_eq!(cropped.width(), 2);
        assert_eq!(cropped.pixel(0, 0)[0], 6);
        assert_eq!(cropped.pixel(1, 0)[0], 7);
        assert_eq!(cropped.pixel(0, 1)[0], 10);
        assert_eq!(cropped.pixel(1, 1)[0], 11);
    }

    #[test]
    fn expand_replicates_blocks() {
        let expanded = numbered(2).expand_nearest(4, 2);
        assert_eq!(expanded.resolution_unit, 2);
        let reds: Vec<u8> = expanded.pixels().iter().map(|p| p[0]).collect();
        assert_eq!(
            reds,
            vec![0, 0, 1, 1, 0, 0, 1, 1, 2, 2, 3, 3, 2, 2, 3, 3]
        );
    }
}
