// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Batch job halves. The map side turns archives into exchange lines, one per
//! converted document; the reduce side writes exchange lines back out as a
//! single archive.

mod map;
mod reduce;

pub use map::{MapStats, MapSummary, map_archive, map_locations, process_record};
pub use reduce::reduce;
