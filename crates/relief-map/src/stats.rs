use std::convert::TryInto;
use std::time::Duration;

/// Counters for the work done by a [`TerrainService`](crate::TerrainService).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BuildStats {
    pub cache_hits: u64,
    pub tiles_built: u64,
    /// Built tiles that resolved to the empty artifact.
    pub empty_tiles: u64,
    /// Time spent decoding, resampling and quantizing; excludes waiting on fetches.
    pub total_build_time: Duration,
}

impl BuildStats {
    pub fn record_hit(&mut self) {
        self.cache_hits += 1;
    }

    pub fn complete_tile(&mut self, build_time: Duration, empty: bool) {
        self.total_build_time += build_time;
        self.tiles_built += 1;
        if empty {
            self.empty_tiles += 1;
        }
    }

    pub fn average_build_time_us(&self) -> u32 {
        let total_us: u64 = self
            .total_build_time
            .as_micros()
            .try_into()
            .unwrap_or(u64::MAX);

        (total_us / self.tiles_built.max(1))
            .try_into()
            .unwrap_or(u32::MAX)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
