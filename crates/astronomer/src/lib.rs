//! The astronomer: where and when the observer is, and where they are looking.
//!
//! Three frames are involved. The celestial frame has x towards (RA 0, Dec 0)
//! and z towards the north celestial pole. The phone frame has x across the
//! short side, y along the long side and z out of the screen. The local frame
//! is spanned by north and east along the ground plus up towards the zenith.
//! The model expresses the local axes in both the phone and celestial frames
//! and maps phone-frame directions into the sky through
//! `celestial = [N U E]_celestial * [N U E]_phone^-1`.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use sky_clock::{Clock, ClockError, RealClock};
use sky_config::{EngineConfig, ViewDirectionSetting};
use sky_core::time::mean_sidereal_time;
use sky_core::vector::{self, Vector3};
use sky_core::{LatLong, Matrix3x3, RaDec, rotation_matrix};

pub mod controllers;
pub mod location;
pub mod magnetic;
pub mod sensors;

pub use controllers::{ManualOrientationController, ZoomController};
pub use location::LocationTracker;
pub use magnetic::{
    DipoleMagneticDeclinationCalculator, MagneticDeclinationCalculator,
    MagneticDeclinationSwitcher, ZeroMagneticDeclinationCalculator,
};
pub use sensors::PhoneAxes;

const DEFAULT_FIELD_OF_VIEW: f64 = 45.0;
const MINIMUM_TIME_BETWEEN_CELESTIAL_UPDATES_MS: i64 = 60_000;
const SENSOR_TOLERANCE: f64 = 0.01;
const AXIS_OF_EARTHS_ROTATION: Vector3 = vector::UNIT_Z;

/// Line of sight and the perpendicular screen-up direction, in celestial coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointing {
    line_of_sight: Vector3,
    perpendicular: Vector3,
}

impl Default for Pointing {
    fn default() -> Self {
        Self {
            line_of_sight: vector::UNIT_X,
            perpendicular: vector::UNIT_Y,
        }
    }
}

impl Pointing {
    pub fn new(line_of_sight: Vector3, perpendicular: Vector3) -> Self {
        Self {
            line_of_sight,
            perpendicular,
        }
    }

    pub fn line_of_sight(&self) -> Vector3 {
        self.line_of_sight
    }

    pub fn perpendicular(&self) -> Vector3 {
        self.perpendicular
    }

    pub fn update_line_of_sight(&mut self, line_of_sight: Vector3) {
        self.line_of_sight = line_of_sight;
    }

    pub fn update_perpendicular(&mut self, perpendicular: Vector3) {
        self.perpendicular = perpendicular;
    }

    /// Direction of the line of sight as RA/Dec.
    pub fn ra_dec(&self) -> RaDec {
        RaDec::from_cartesian(&self.line_of_sight)
    }
}

/// How the device is held relative to what the user sights along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewDirectionMode {
    /// Looking through the screen, top edge up.
    #[default]
    Standard,
    /// Looking through the screen with the device turned on its side.
    Rotate90,
    /// Sighting along the long edge, as when strapped to a telescope tube.
    Telescope,
}

impl ViewDirectionMode {
    /// Pointing direction and screen-up direction in phone coordinates.
    pub fn phone_vectors(&self) -> (Vector3, Vector3) {
        match self {
            ViewDirectionMode::Standard => (vector::negate(&vector::UNIT_Z), vector::UNIT_Y),
            ViewDirectionMode::Rotate90 => (vector::negate(&vector::UNIT_Z), vector::UNIT_X),
            ViewDirectionMode::Telescope => (vector::UNIT_Y, vector::UNIT_Z),
        }
    }
}

impl From<ViewDirectionSetting> for ViewDirectionMode {
    fn from(setting: ViewDirectionSetting) -> Self {
        match setting {
            ViewDirectionSetting::Standard => ViewDirectionMode::Standard,
            ViewDirectionSetting::Rotate90 => ViewDirectionMode::Rotate90,
            ViewDirectionSetting::Telescope => ViewDirectionMode::Telescope,
        }
    }
}

/// RA/Dec of the point directly overhead.
pub fn zenith_ra_dec(instant: &DateTime<Utc>, location: &LatLong) -> RaDec {
    RaDec::new(
        mean_sidereal_time(instant, location.longitude()),
        location.latitude(),
    )
}

/// The observer's time, place and orientation.
pub struct AstronomerModel<C: Clock = RealClock> {
    clock: C,
    location: LatLong,
    magnetic: Box<dyn MagneticDeclinationCalculator>,
    field_of_view: f64,
    auto_update_pointing: bool,
    pointing_in_phone: Vector3,
    screen_up_in_phone: Vector3,
    pointing: Pointing,

    acceleration: Vector3,
    magnetic_field: Vector3,
    rotation_vector: [f64; 4],
    use_rotation_vector: bool,
    up_phone: Vector3,
    sensor_tolerance: f64,

    true_north_celestial: Vector3,
    up_celestial: Vector3,
    true_east_celestial: Vector3,
    axes_phone_inverse: Matrix3x3,
    axes_magnetic_celestial: Matrix3x3,
    celestial_last_updated: Option<i64>,
    celestial_update_interval_ms: i64,
}

impl<C: Clock> AstronomerModel<C> {
    pub fn new(clock: C, magnetic: Box<dyn MagneticDeclinationCalculator>) -> Self {
        let mut model = Self {
            clock,
            location: LatLong::default(),
            magnetic,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
            auto_update_pointing: true,
            pointing_in_phone: vector::negate(&vector::UNIT_Z),
            screen_up_in_phone: vector::UNIT_Y,
            pointing: Pointing::default(),
            acceleration: sensors::INITIAL_DOWN,
            magnetic_field: sensors::INITIAL_SOUTH,
            rotation_vector: [1.0, 0.0, 0.0, 0.0],
            use_rotation_vector: false,
            up_phone: vector::negate(&sensors::INITIAL_DOWN),
            sensor_tolerance: SENSOR_TOLERANCE,
            true_north_celestial: vector::UNIT_X,
            up_celestial: vector::UNIT_Y,
            true_east_celestial: AXIS_OF_EARTHS_ROTATION,
            axes_phone_inverse: Matrix3x3::IDENTITY,
            axes_magnetic_celestial: Matrix3x3::IDENTITY,
            celestial_last_updated: None,
            celestial_update_interval_ms: MINIMUM_TIME_BETWEEN_CELESTIAL_UPDATES_MS,
        };
        model.update_celestial_axes(true);
        model
    }

    /// Model configured from engine settings, with the calculator chosen by the switcher.
    pub fn from_config(clock: C, config: &EngineConfig) -> Self {
        let switcher = MagneticDeclinationSwitcher::new(config.use_magnetic_correction);
        let mut model = Self::new(clock, switcher.calculator());
        model.field_of_view = config.field_of_view_deg;
        model.sensor_tolerance = config.sensor_tolerance;
        model.celestial_update_interval_ms = config.celestial_update_interval_ms;
        model.set_view_direction_mode(config.view_direction.into());
        model
    }

    pub fn set_view_direction_mode(&mut self, mode: ViewDirectionMode) {
        let (pointing, screen_up) = mode.phone_vectors();
        self.pointing_in_phone = pointing;
        self.screen_up_in_phone = screen_up;
    }

    /// When disabled, [`pointing`](Self::pointing) returns whatever was last set manually.
    pub fn set_auto_update_pointing(&mut self, auto_update: bool) {
        self.auto_update_pointing = auto_update;
    }

    pub fn field_of_view(&self) -> f64 {
        self.field_of_view
    }

    pub fn set_field_of_view(&mut self, degrees: f64) {
        self.field_of_view = degrees;
    }

    pub fn magnetic_correction(&self) -> f64 {
        self.magnetic.declination()
    }

    pub fn set_magnetic_declination_calculator(
        &mut self,
        calculator: Box<dyn MagneticDeclinationCalculator>,
    ) {
        self.magnetic = calculator;
        self.update_celestial_axes(true);
    }

    pub fn time_millis(&mut self) -> i64 {
        self.clock.now_millis()
    }

    pub fn time(&mut self) -> Result<DateTime<Utc>, ClockError> {
        self.clock.now()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn set_clock(&mut self, clock: C) {
        self.clock = clock;
        self.update_celestial_axes(true);
    }

    pub fn location(&self) -> LatLong {
        self.location
    }

    pub fn set_location(&mut self, location: LatLong) {
        self.location = location;
        self.update_celestial_axes(true);
    }

    /// Up in phone coordinates as of the last pointing calculation.
    pub fn phone_up_direction(&self) -> Vector3 {
        self.up_phone
    }

    /// Feed accelerometer and magnetometer readings; near-zero readings are ignored.
    pub fn set_phone_sensor_values(&mut self, acceleration: Vector3, magnetic_field: Vector3) -> bool {
        if vector::length2(&magnetic_field) < self.sensor_tolerance
            || vector::length2(&acceleration) < self.sensor_tolerance
        {
            warn!("invalid sensor values ignored: magnetic field {magnetic_field:?}, acceleration {acceleration:?}");
            return false;
        }
        self.acceleration = acceleration;
        self.magnetic_field = magnetic_field;
        self.use_rotation_vector = false;
        true
    }

    /// Feed a rotation-vector sample; only the first four components are used.
    pub fn set_rotation_vector(&mut self, sample: &[f64]) {
        self.rotation_vector = sensors::truncate_rotation_vector(sample, &self.rotation_vector);
        self.use_rotation_vector = true;
    }

    pub fn north(&mut self) -> Vector3 {
        self.update_celestial_axes(false);
        self.true_north_celestial
    }

    pub fn south(&mut self) -> Vector3 {
        vector::negate(&self.north())
    }

    pub fn zenith(&mut self) -> Vector3 {
        self.update_celestial_axes(false);
        self.up_celestial
    }

    pub fn nadir(&mut self) -> Vector3 {
        vector::negate(&self.zenith())
    }

    pub fn east(&mut self) -> Vector3 {
        self.update_celestial_axes(false);
        self.true_east_celestial
    }

    pub fn west(&mut self) -> Vector3 {
        vector::negate(&self.east())
    }

    /// Current pointing, recomputed from the latest sensor data unless auto-update is off.
    pub fn pointing(&mut self) -> Pointing {
        self.calculate_pointing();
        self.pointing
    }

    pub fn set_pointing(&mut self, line_of_sight: Vector3, perpendicular: Vector3) {
        self.pointing.update_line_of_sight(line_of_sight);
        self.pointing.update_perpendicular(perpendicular);
    }

    fn calculate_pointing(&mut self) {
        if !self.auto_update_pointing {
            return;
        }
        self.update_celestial_axes(false);
        self.update_phone_axes();
        let transform = self.axes_magnetic_celestial * self.axes_phone_inverse;
        let view = transform * self.pointing_in_phone;
        let screen_up = transform * self.screen_up_in_phone;
        self.pointing.update_line_of_sight(view);
        self.pointing.update_perpendicular(screen_up);
    }

    /// Recompute local north, east and up in celestial coordinates.
    ///
    /// Unless forced, this runs at most once per update interval of clock time.
    fn update_celestial_axes(&mut self, force: bool) {
        let now_ms = self.clock.now_millis();
        if let Some(last) = self.celestial_last_updated {
            if !force && (now_ms - last).abs() < self.celestial_update_interval_ms {
                return;
            }
        }
        let Some(now) = DateTime::<Utc>::from_timestamp_millis(now_ms) else {
            warn!("clock reading {now_ms} ms is out of range, keeping previous axes");
            return;
        };
        self.celestial_last_updated = Some(now_ms);
        self.magnetic.set_location_and_time(&self.location, now_ms);

        let up = zenith_ra_dec(&now, &self.location).to_geocentric();
        let z = AXIS_OF_EARTHS_ROTATION;
        let north = vector::sub(&z, &vector::scale(&up, vector::dot(&up, &z)));
        let north = vector::normalize(&north);
        let east = vector::cross(&north, &up);
        self.up_celestial = up;
        self.true_north_celestial = north;
        self.true_east_celestial = east;

        // magnetic correction is applied to the celestial axes, not the phone axes
        let declination = self.magnetic.declination();
        let magnetic_north = rotation_matrix(declination, &up) * north;
        let magnetic_east = vector::cross(&magnetic_north, &up);
        self.axes_magnetic_celestial = Matrix3x3::from_columns(magnetic_north, up, magnetic_east);
        debug!(
            "celestial axes updated at {now} for {:?}, declination {declination:.2}",
            self.location
        );
    }

    fn update_phone_axes(&mut self) {
        let axes = if self.use_rotation_vector {
            PhoneAxes::from_rotation_vector(&self.rotation_vector)
        } else {
            match PhoneAxes::from_acceleration_and_field(&self.acceleration, &self.magnetic_field) {
                Some(axes) => axes,
                None => {
                    warn!(
                        "magnetic field {:?} is parallel to gravity, keeping previous orientation",
                        self.magnetic_field
                    );
                    return;
                }
            }
        };
        self.up_phone = axes.up;
        self.axes_phone_inverse = axes.inverse_matrix();
    }
}
