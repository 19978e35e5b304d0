//! User-driven adjustments to the astronomer's view.

use log::debug;
use sky_clock::Clock;
use sky_core::rotation_matrix;
use sky_core::vector;

use crate::AstronomerModel;

/// Multiplicative step of one zoom notch: sixteen notches change the field of view by 1.5×.
pub fn zoom_factor() -> f64 {
    1.5_f64.powf(1.0 / 16.0)
}

/// Widest field of view zooming out will reach, in degrees.
pub const MAX_ZOOM_OUT: f64 = 90.0;

/// Changes the field of view in fixed notches.
#[derive(Debug, Clone, Copy)]
pub struct ZoomController {
    enabled: bool,
}

impl Default for ZoomController {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ZoomController {
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn zoom_in<C: Clock>(&self, model: &mut AstronomerModel<C>) {
        self.zoom_by(model, 1.0 / zoom_factor());
    }

    pub fn zoom_out<C: Clock>(&self, model: &mut AstronomerModel<C>) {
        self.zoom_by(model, zoom_factor());
    }

    /// Scale the field of view by `ratio`, capped at [`MAX_ZOOM_OUT`].
    pub fn zoom_by<C: Clock>(&self, model: &mut AstronomerModel<C>, ratio: f64) {
        if !self.enabled {
            return;
        }
        let degrees = (model.field_of_view() * ratio).min(MAX_ZOOM_OUT);
        debug!("setting field of view to {degrees}");
        model.set_field_of_view(degrees);
    }
}

/// Moves the pointing in response to drags, trackballs and rotation gestures.
///
/// The small-angle moves are only exact in the limit of small steps.
#[derive(Debug, Clone, Copy)]
pub struct ManualOrientationController {
    enabled: bool,
}

impl Default for ManualOrientationController {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ManualOrientationController {
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Swing the line of sight sideways by roughly `radians`.
    pub fn change_right_left<C: Clock>(&self, model: &mut AstronomerModel<C>, radians: f64) {
        if !self.enabled {
            return;
        }
        let pointing = model.pointing();
        let los = pointing.line_of_sight();
        let top = pointing.perpendicular();
        let horizontal = vector::cross(&los, &top);
        let moved = vector::add(&los, &vector::scale(&horizontal, radians));
        model.set_pointing(vector::normalize(&moved), top);
    }

    /// Tilt the line of sight and the up direction together by roughly `radians`.
    pub fn change_up_down<C: Clock>(&self, model: &mut AstronomerModel<C>, radians: f64) {
        if !self.enabled {
            return;
        }
        let pointing = model.pointing();
        let los = pointing.line_of_sight();
        let top = pointing.perpendicular();
        let new_los = vector::add(&los, &vector::scale(&top, -radians));
        let new_top = vector::add(&top, &vector::scale(&los, radians));
        model.set_pointing(vector::normalize(&new_los), vector::normalize(&new_top));
    }

    /// Spin the view about the line of sight.
    pub fn rotate<C: Clock>(&self, model: &mut AstronomerModel<C>, degrees: f64) {
        if !self.enabled {
            return;
        }
        debug!("rotating view by {degrees}");
        let pointing = model.pointing();
        let los = pointing.line_of_sight();
        let top = rotation_matrix(degrees, &los) * pointing.perpendicular();
        model.set_pointing(los, vector::normalize(&top));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ZeroMagneticDeclinationCalculator;
    use sky_clock::{ManualWallClock, RealClock};
    use sky_core::angles::acos_clamped;
    use sky_core::vector::Vector3;

    fn manual_model() -> AstronomerModel<RealClock<ManualWallClock>> {
        let mut model = AstronomerModel::new(
            RealClock::new(ManualWallClock::new(0)),
            Box::new(ZeroMagneticDeclinationCalculator),
        );
        model.set_auto_update_pointing(false);
        model.set_pointing(vector::UNIT_X, vector::UNIT_Z);
        model
    }

    fn angle(a: &Vector3, b: &Vector3) -> f64 {
        acos_clamped(vector::cosine_similarity(a, b))
    }

    #[test]
    fn zoom_notches_are_reversible_and_capped() {
        let mut model = manual_model();
        let zoom = ZoomController::default();
        zoom.zoom_in(&mut model);
        assert!(model.field_of_view() < 45.0);
        zoom.zoom_out(&mut model);
        assert!((model.field_of_view() - 45.0).abs() < 1e-9);

        for _ in 0..16 {
            zoom.zoom_in(&mut model);
        }
        assert!((model.field_of_view() - 30.0).abs() < 1e-9);

        for _ in 0..100 {
            zoom.zoom_out(&mut model);
        }
        assert_eq!(model.field_of_view(), MAX_ZOOM_OUT);
    }

    #[test]
    fn disabled_controllers_do_nothing() {
        let mut model = manual_model();
        let mut zoom = ZoomController::default();
        zoom.set_enabled(false);
        zoom.zoom_in(&mut model);
        assert_eq!(model.field_of_view(), 45.0);

        let mut manual = ManualOrientationController::default();
        manual.set_enabled(false);
        manual.change_right_left(&mut model, 0.1);
        manual.rotate(&mut model, 30.0);
        let pointing = model.pointing();
        assert_eq!(pointing.line_of_sight(), vector::UNIT_X);
        assert_eq!(pointing.perpendicular(), vector::UNIT_Z);
    }

    #[test]
    fn right_left_keeps_up_and_turns_about_it() {
        let mut model = manual_model();
        ManualOrientationController::default().change_right_left(&mut model, 0.01);
        let pointing = model.pointing();
        assert_eq!(pointing.perpendicular(), vector::UNIT_Z);
        assert!((angle(&pointing.line_of_sight(), &vector::UNIT_X) - 0.01).abs() < 1e-5);
        assert!(pointing.line_of_sight()[2].abs() < 1e-12);
        assert!((vector::norm(&pointing.line_of_sight()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn up_down_tilts_both_vectors() {
        let mut model = manual_model();
        ManualOrientationController::default().change_up_down(&mut model, 0.01);
        let pointing = model.pointing();
        let (los, top) = (pointing.line_of_sight(), pointing.perpendicular());
        assert!(los[2] < 0.0 && top[0] > 0.0);
        assert!(vector::dot(&los, &top).abs() < 1e-12);
    }

    #[test]
    fn rotate_spins_up_about_line_of_sight() {
        let mut model = manual_model();
        ManualOrientationController::default().rotate(&mut model, 90.0);
        let pointing = model.pointing();
        assert_eq!(pointing.line_of_sight(), vector::UNIT_X);
        let top = pointing.perpendicular();
        assert!(top[0].abs() < 1e-12 && top[2].abs() < 1e-12);
        assert!((top[1].abs() - 1.0).abs() < 1e-12);
    }
}
