use std::fmt;

/// The finest level whose tiles can all be addressed with `u32` coordinates.
pub const MAX_TILE_LEVEL: u8 = 32;

/// Addresses one tile of the Web Mercator pyramid. `x` and `y` are in `[0, 2^level)`, with `y` increasing southward.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TileKey {
    pub level: u8,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    pub const fn new(level: u8, x: u32, y: u32) -> Self {
        Self { level, x, y }
    }

    /// Number of tiles along each axis at this key's level. Saturates past level 63.
    pub fn tiles_per_axis(&self) -> u64 {
        1u64.checked_shl(u32::from(self.level)).unwrap_or(u64::MAX)
    }

    /// True if `x` and `y` both lie in `[0, 2^level)` and `level` is at most [`MAX_TILE_LEVEL`].
    pub fn is_in_pyramid(&self) -> bool {
        self.level <= MAX_TILE_LEVEL
            && u64::from(self.x) < self.tiles_per_axis()
            && u64::from(self.y) < self.tiles_per_axis()
    }

    /// The tile at `level` that contains this one.
    ///
    /// # Panics
    ///
    /// If `level` is finer than `self.level`.
    pub fn ancestor(&self, level: u8) -> Self {
        assert!(level <= self.level);
        let shift = u32::from(self.level - level);
        Self::new(
            level,
            self.x.checked_shr(shift).unwrap_or(0),
            self.y.checked_shr(shift).unwrap_or(0),
        )
    }

    /// The neighbor offset by `(dx, dy)` tiles. `x` wraps around the antimeridian; at level zero there is only one column.
    /// `y` does not wrap, so the result may lie south of the pyramid. Returns `None` if `y` is not representable.
    pub fn neighbor(&self, dx: u32, dy: u32) -> Option<Self> {
        let x = if self.level == 0 {
            0
        } else {
            let x = self.x as u64 + dx as u64;
            if x < self.tiles_per_axis() {
                x as u32
            } else {
                0
            }
        };
        Some(Self::new(self.level, x, self.y.checked_add(dy)?))
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.level, self.x, self.y)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
