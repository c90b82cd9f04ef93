//! Normative time bands.
//!
//! Two fixed tables drive regulatory reporting of future cash flows:
//!
//! - the 19 day-count bands used to bucket flows for reporting, and
//! - the band time factor `t_k` used in place of the actual year fraction
//!   when discounting a flow. `t_k` depends only on the bucket, not on
//!   the exact day count.

use serde::{Deserialize, Serialize};

use crate::types::Date;

/// Inclusive upper day bound of each band.
pub const BAND_END_DAYS: [i64; 19] = [
    1, 30, 91, 183, 274, 365, 548, 731, 1096, 1461, 1826, 2191, 2556, 2921, 3286, 3650, 5475,
    7300, 99999,
];

/// Lower day bound of each band.
pub const BAND_START_DAYS: [i64; 19] = [
    0, 1, 31, 92, 184, 275, 366, 549, 732, 1097, 1462, 1827, 2192, 2557, 2922, 3287, 3651, 5476,
    7301,
];

/// `(max node days, t_k)` pairs; nodes beyond the last bound get [`T_K_BEYOND`].
const TIME_FACTORS: [(i64, f64); 18] = [
    (1, 0.0028),
    (30, 0.0417),
    (90, 0.1667),
    (180, 0.375),
    (270, 0.625),
    (360, 0.8075),
    (540, 1.25),
    (720, 1.75),
    (1080, 2.5),
    (1440, 3.5),
    (1800, 4.5),
    (2160, 5.5),
    (2520, 6.5),
    (2880, 7.5),
    (3240, 8.5),
    (3650, 9.5),
    (5475, 12.5),
    (7300, 17.5),
];

/// Time factor for flows more than twenty years out.
pub const T_K_BEYOND: f64 = 25.0;

/// One row of the normative band table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormativeBand {
    /// Band number, 1 to 19.
    pub number: u8,
    /// First day covered.
    pub start_day: i64,
    /// Last day covered (inclusive).
    pub end_day: i64,
}

impl NormativeBand {
    /// The full band table in ascending order.
    pub fn table() -> impl Iterator<Item = NormativeBand> {
        BAND_START_DAYS
            .iter()
            .zip(BAND_END_DAYS.iter())
            .enumerate()
            .map(|(i, (&start_day, &end_day))| NormativeBand {
                number: (i + 1) as u8,
                start_day,
                end_day,
            })
    }

    /// Looks up a band by number.
    #[must_use]
    pub fn by_number(number: u8) -> Option<NormativeBand> {
        Self::table().find(|b| b.number == number)
    }
}

/// Band number for a flow paid `days` after the reference date.
///
/// Right-inclusive cut on the band ends: day 1 falls in band 1, day 30 in
/// band 2. Flows in the past fall into band 1. Returns `None` beyond the
/// last band.
#[must_use]
pub fn band_for_days(days: i64) -> Option<u8> {
    BAND_END_DAYS
        .iter()
        .position(|&end| days <= end)
        .map(|i| (i + 1) as u8)
}

/// Band number for a payment date relative to a reference date.
#[must_use]
pub fn band_for_date(reference: Date, payment: Date) -> Option<u8> {
    band_for_days(reference.days_between(&payment))
}

/// Band time factor `t_k` for a node `node_days` days after the cut-off.
#[must_use]
pub fn time_band_factor(node_days: i64) -> f64 {
    TIME_FACTORS
        .iter()
        .find(|(max_days, _)| node_days <= *max_days)
        .map_or(T_K_BEYOND, |&(_, t_k)| t_k)
}
