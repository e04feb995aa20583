mod ellipsoid;
mod geometry;
mod oct;
mod rectangle;

pub use ellipsoid::*;
pub use geometry::*;
pub use oct::*;
pub use rectangle::*;

use ahash::AHashMap;
pub type SmallKeyHashMap<K, V> = AHashMap<K, V>;

// Re-exports.
pub use approx;
pub use glam;
pub use static_assertions;
