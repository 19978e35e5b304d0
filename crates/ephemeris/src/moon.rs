//! Low-precision lunar position and phase.
//!
//! The position series is the geocentric approximation from page D22 of the
//! 2008 Astronomical Almanac. It ignores the observer's position on Earth, so
//! RA/Dec may be off by up to about a degree and a half.

use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Serialize;
use sky_core::RaDec;
use sky_core::angles::{asin_clamped, mod2pi, normalize_degrees};
use sky_core::time::julian_centuries;

/// Mean synodic month, in days.
pub const LUNAR_CYCLE_DAYS: f64 = 29.53;

/// Hours searched before giving up on an hourly full-moon search.
const FULL_MOON_SEARCH_HOURS: i64 = 24 * 32;

#[inline]
fn sin_deg(deg: f64) -> f64 {
    deg.to_radians().sin()
}

/// Geocentric RA/Dec of the Moon.
pub fn moon_ra_dec(instant: &DateTime<Utc>) -> RaDec {
    let t = julian_centuries(instant);

    let lambda = 218.32 + 481_267.881 * t + 6.29 * sin_deg(135.0 + 477_198.87 * t)
        - 1.27 * sin_deg(259.3 - 413_335.36 * t)
        + 0.66 * sin_deg(235.7 + 890_534.22 * t)
        + 0.21 * sin_deg(269.9 + 954_397.74 * t)
        - 0.19 * sin_deg(357.5 + 35_999.05 * t)
        - 0.11 * sin_deg(186.5 + 966_404.03 * t);
    let beta = 5.13 * sin_deg(93.3 + 483_202.02 * t) + 0.28 * sin_deg(228.2 + 960_400.89 * t)
        - 0.28 * sin_deg(318.3 + 6_003.15 * t)
        - 0.17 * sin_deg(217.6 - 407_332.21 * t);

    let (sin_lambda, cos_lambda) = lambda.to_radians().sin_cos();
    let (sin_beta, cos_beta) = beta.to_radians().sin_cos();
    let l = cos_beta * cos_lambda;
    let m = 0.9175 * cos_beta * sin_lambda - 0.3978 * sin_beta;
    let n = 0.3978 * cos_beta * sin_lambda + 0.9175 * sin_beta;

    let ra = normalize_degrees(mod2pi(m.atan2(l)).to_degrees());
    let dec = asin_clamped(n).to_degrees();
    RaDec::new(ra, dec)
}

/// One of the eight images used to draw the Moon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LunarPhase {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl LunarPhase {
    /// Bucket a phase angle (degrees), using the phase a day later to tell waxing from waning.
    pub fn classify(phase: f64, phase_tomorrow: f64) -> Self {
        if phase < 22.5 {
            return LunarPhase::New;
        }
        if phase > 150.0 {
            return LunarPhase::Full;
        }
        let waxing = phase_tomorrow > phase;
        match (phase < 67.5, phase < 112.5, waxing) {
            (true, _, true) => LunarPhase::WaxingCrescent,
            (true, _, false) => LunarPhase::WaningCrescent,
            (false, true, true) => LunarPhase::FirstQuarter,
            (false, true, false) => LunarPhase::LastQuarter,
            (false, false, true) => LunarPhase::WaxingGibbous,
            (false, false, false) => LunarPhase::WaningGibbous,
        }
    }

    /// Index of the phase image, 0 for new through 4 for full and back to 7.
    pub fn image_index(&self) -> u8 {
        match self {
            LunarPhase::New => 0,
            LunarPhase::WaxingCrescent => 1,
            LunarPhase::FirstQuarter => 2,
            LunarPhase::WaxingGibbous => 3,
            LunarPhase::Full => 4,
            LunarPhase::WaningGibbous => 5,
            LunarPhase::LastQuarter => 6,
            LunarPhase::WaningCrescent => 7,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LunarPhase::New => "new moon",
            LunarPhase::WaxingCrescent => "waxing crescent",
            LunarPhase::FirstQuarter => "first quarter",
            LunarPhase::WaxingGibbous => "waxing gibbous",
            LunarPhase::Full => "full moon",
            LunarPhase::WaningGibbous => "waning gibbous",
            LunarPhase::LastQuarter => "last quarter",
            LunarPhase::WaningCrescent => "waning crescent",
        }
    }
}

/// Days until the phase angle next reaches 180° (full) given whether it is rising.
pub(crate) fn days_to_full(phase: f64, waxing: bool) -> f64 {
    let remaining = if waxing { 180.0 - phase } else { 180.0 + phase };
    remaining / 360.0 * LUNAR_CYCLE_DAYS
}

/// Days until the phase angle next reaches 0° (new) given whether it is rising.
pub(crate) fn days_to_new(phase: f64, waxing: bool) -> f64 {
    let remaining = if waxing { 360.0 - phase } else { phase };
    remaining / 360.0 * LUNAR_CYCLE_DAYS
}

pub(crate) fn offset_by_days(instant: &DateTime<Utc>, days: f64) -> DateTime<Utc> {
    *instant + Duration::milliseconds((days * 86_400_000.0) as i64)
}

/// Step hour by hour until `phase_at` stops increasing; the last rising hour is returned.
pub(crate) fn search_full_moon<F>(start: &DateTime<Utc>, phase_at: F) -> Option<DateTime<Utc>>
where
    F: Fn(&DateTime<Utc>) -> f64,
{
    let mut candidate = *start;
    let mut phase = phase_at(start);
    let mut waxing = false;
    for _ in 0..FULL_MOON_SEARCH_HOURS {
        candidate += Duration::hours(1);
        let next = phase_at(&candidate);
        if waxing && next < phase {
            return Some(candidate - Duration::hours(1));
        }
        waxing = next > phase;
        phase = next;
        debug!("lunar phase {phase:.3} at {candidate}");
    }
    None
}
