//! Sky map engine: solar-system ephemeris, rise/set solving, simulated
//! clocks and the device pointing model.
//!
//! The work is split across member crates; this facade re-exports them so
//! front-ends depend on a single library.

pub use sky_astronomer as astronomer;
pub use sky_clock as clock;
pub use sky_config as config;
pub use sky_core as core;
pub use sky_ephemeris as ephemeris;
pub use sky_export as export;
pub use sky_orbits as orbits;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
