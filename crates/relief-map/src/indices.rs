use crate::sampling::MAX_HEIGHTMAP_WIDTH;

use std::sync::Arc;

/// Triangulation and border vertex lists of a square grid. Built once per grid width and shared by every tile.
#[derive(Clone, Debug, PartialEq)]
pub struct GridIndices {
    pub width: u32,
    /// Two counter-clockwise triangles per grid cell.
    pub triangles: Arc<[u16]>,
    /// Vertices of the top row, west to east.
    pub north: Arc<[u16]>,
    /// Vertices of the bottom row, west to east.
    pub south: Arc<[u16]>,
    /// Vertices of the first column, north to south.
    pub west: Arc<[u16]>,
    /// Vertices of the last column, north to south.
    pub east: Arc<[u16]>,
}

impl GridIndices {
    /// # Panics
    ///
    /// If `width` is less than 2 or greater than [`MAX_HEIGHTMAP_WIDTH`].
    pub fn new(width: u32) -> Self {
        assert!((2..=MAX_HEIGHTMAP_WIDTH).contains(&width));
        let n = width as usize;

        let row: Vec<usize> = (0..n - 1)
            .flat_map(|x| [x, x + n + 1, x + 1, x, x + n, x + n + 1])
            .collect();
        let triangles = (0..n - 1)
            .flat_map(|y| row.iter().map(move |i| (i + y * n) as u16))
            .collect();

        let border = |f: &dyn Fn(usize) -> usize| (0..n).map(|i| f(i) as u16).collect::<Arc<[u16]>>();

        Self {
            width,
            triangles,
            north: border(&|i| i),
            south: border(&|i| i + n * (n - 1)),
            west: border(&|i| i * n),
            east: border(&|i| i * n + n - 1),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
