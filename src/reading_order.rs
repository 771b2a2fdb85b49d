use std::cmp::Reverse;

use crate::region::Region;

/// Height of the horizontal bands regions are grouped into.
pub const READING_BAND_PX: i32 = 50;

/// Orders regions top-to-bottom by 50px band, right-to-left inside a band.
/// The sort is stable, so ties keep detection order.
pub fn order(mut regions: Vec<Region>) -> Vec<Region> {
    regions.sort_by_key(|region| {
        (
            region.bbox.y1.div_euclid(READING_BAND_PX),
            Reverse(region.bbox.x1),
        )
    });
    regions
}
