//! A single celestial body: immutable orbital parameters plus mutable
//! kinematic state.

use glam::{Mat4, Vec3};

use crate::error::SimError;

/// Simulated minutes per Earth day. One tick advances the simulation by one
/// minute of planetary time.
pub const MINUTES_PER_DAY: f32 = 24.0 * 60.0;

/// Simulated minutes per Earth year.
pub const MINUTES_PER_YEAR: f32 = 365.25 * MINUTES_PER_DAY;

/// Orbit advance per tick for a body with a one-Earth-year orbit period.
pub const ORBIT_RADIANS_PER_TICK: f32 = std::f32::consts::TAU / MINUTES_PER_YEAR;

/// Spin advance per tick for a body with a one-Earth-day rotation period.
pub const ROTATION_RADIANS_PER_TICK: f32 = std::f32::consts::TAU / MINUTES_PER_DAY;

/// Immutable parameters of a celestial body.
///
/// Radii are in kilometres. The rotation period is in Earth days and the
/// orbit period in Earth years; both may be negative for retrograde motion
/// but must be non-zero. The root body uses a zero orbit radius (it sits at
/// the world origin) with any non-zero orbit period.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyParams {
    /// Human-readable name (informational only).
    pub name: String,
    /// Physical radius in km.
    pub radius: f32,
    /// Axial tilt off the reference pole, in degrees.
    pub tilt_deg: f32,
    /// Sidereal rotation period in Earth days.
    pub rotation_period: f32,
    /// Orbit radius around the parent in km.
    pub orbit_radius: f32,
    /// Orbit period in Earth years.
    pub orbit_period: f32,
}

impl BodyParams {
    /// Construct body parameters.
    pub fn new(
        name: impl Into<String>,
        radius: f32,
        tilt_deg: f32,
        rotation_period: f32,
        orbit_radius: f32,
        orbit_period: f32,
    ) -> Self {
        Self {
            name: name.into(),
            radius,
            tilt_deg,
            rotation_period,
            orbit_radius,
            orbit_period,
        }
    }
}

/// A celestial body with its current kinematic state.
///
/// Bodies are owned by a `CelestialSystem` in a `Vec` that never reallocates
/// after tree wiring; `first_child`/`next_sibling` are indices into that
/// collection (a left-child/right-sibling encoding of the orbit tree).
#[derive(Clone, Debug)]
pub struct CelestialBody {
    params: BodyParams,
    tilt: f32,
    rotate_axis: Vec3,
    orbit_axis: Vec3,

    scale_factor: f32,
    scaled_radius: f32,
    scaled_orbit_radius: f32,

    rot_angle: f32,
    orbit_angle: f32,
    rel_position: Vec3,
    rel_velocity: Vec3,
    abs_position: Vec3,

    rel_transform: Mat4,
    abs_transform: Mat4,
    orientation: Mat4,
    scale_transform: Mat4,

    pub(crate) first_child: Option<usize>,
    pub(crate) next_sibling: Option<usize>,
}

impl CelestialBody {
    /// Create a body at orbit/rotation angle zero, positioned on the positive
    /// x axis of its parent's frame at the viewing-scaled orbit radius.
    ///
    /// Fails on zero periods or degenerate radii; the per-tick step divides
    /// by the periods and is never guarded.
    pub fn new(params: BodyParams, scale_factor: f32) -> Result<Self, SimError> {
        if params.rotation_period == 0.0 {
            return Err(SimError::ZeroRotationPeriod(params.name));
        }
        if params.orbit_period == 0.0 {
            return Err(SimError::ZeroOrbitPeriod(params.name));
        }
        if !(params.radius > 0.0) || !params.radius.is_finite() {
            return Err(SimError::InvalidRadius {
                radius: params.radius,
                name: params.name,
            });
        }
        if params.orbit_radius < 0.0 || !params.orbit_radius.is_finite() {
            return Err(SimError::InvalidOrbitRadius {
                orbit_radius: params.orbit_radius,
                name: params.name,
            });
        }

        let tilt = params.tilt_deg.to_radians();
        // The spin axis is the reference pole tipped over by the axial tilt;
        // orbits are coplanar about the pole itself (no orbital inclination).
        let rotate_axis = Mat4::from_rotation_z(-tilt).transform_vector3(Vec3::Y);
        let orbit_axis = Vec3::Y;

        let scaled_radius = viewing_scale(params.radius, scale_factor);
        let scaled_orbit_radius = viewing_scale(params.orbit_radius, scale_factor);
        let rel_position = Vec3::new(scaled_orbit_radius, 0.0, 0.0);

        Ok(Self {
            tilt,
            rotate_axis,
            orbit_axis,
            scale_factor,
            scaled_radius,
            scaled_orbit_radius,
            rot_angle: 0.0,
            orbit_angle: 0.0,
            rel_position,
            rel_velocity: Vec3::ZERO,
            abs_position: rel_position,
            rel_transform: Mat4::from_translation(rel_position),
            abs_transform: Mat4::IDENTITY,
            orientation: Mat4::IDENTITY,
            scale_transform: Mat4::from_scale(Vec3::splat(scaled_radius)),
            first_child: None,
            next_sibling: None,
            params,
        })
    }

    /// Advance the body by `ticks` simulated minutes (negative runs time
    /// backwards) and recompute its parent-relative transform.
    pub fn advance(&mut self, ticks: f32) {
        let orbit_inc = ORBIT_RADIANS_PER_TICK * ticks / self.params.orbit_period;
        let rot_inc = ROTATION_RADIANS_PER_TICK * ticks / self.params.rotation_period;

        self.orbit_angle = wrap_angle(self.orbit_angle + orbit_inc);
        self.rot_angle = wrap_angle(self.rot_angle + rot_inc);

        // A single rotation by the current absolute angle, not a cumulative
        // one: the point starts over at (scaled_orbit_radius, 0, 0) each tick.
        self.rel_transform = Mat4::from_axis_angle(self.orbit_axis, self.orbit_angle)
            * Mat4::from_translation(Vec3::new(self.scaled_orbit_radius, 0.0, 0.0));

        // Finite-difference velocity estimate: exact only for small ticks.
        let new_position = self.rel_transform.transform_point3(Vec3::ZERO);
        self.rel_velocity = new_position - self.rel_position;
        self.rel_position = new_position;
    }

    /// Fold `delta` into the viewing-scale exponent and recompute the scaled
    /// radii and the pure-scale matrix. Current positions are untouched;
    /// only future transforms reflect the new scale.
    pub fn adjust_scale(&mut self, delta: f32) {
        self.scale_factor += delta;
        self.scaled_radius = viewing_scale(self.params.radius, self.scale_factor);
        self.scaled_orbit_radius = viewing_scale(self.params.orbit_radius, self.scale_factor);
        self.scale_transform = Mat4::from_scale(Vec3::splat(self.scaled_radius));
    }

    /// Set the world-space transform composed by the system's tree walk.
    pub(crate) fn set_absolute(&mut self, abs: Mat4) {
        self.abs_transform = abs;
        self.abs_position = abs.transform_point3(Vec3::ZERO);
    }

    /// Rebuild the orientation matrix: spin about the orbit axis, then the
    /// axial tilt, both anchored at the body's current absolute position so
    /// a moon spins about itself while orbiting its planet.
    ///
    /// Call only after the absolute position is final for this tick.
    pub(crate) fn update_orientation(&mut self) {
        self.orientation = Mat4::from_translation(self.abs_position)
            * Mat4::from_rotation_z(-self.tilt)
            * Mat4::from_axis_angle(self.orbit_axis, self.rot_angle)
            * Mat4::from_translation(-self.abs_position);
    }

    /// The combined per-instance draw transform: scale innermost, then the
    /// orbit placement, then spin/tilt about that placement.
    pub fn draw_transform(&self) -> Mat4 {
        self.orientation * self.abs_transform * self.scale_transform
    }

    /// Body name.
    pub fn name(&self) -> &str {
        &self.params.name
    }

    /// Immutable parameters.
    pub fn params(&self) -> &BodyParams {
        &self.params
    }

    /// Axial tilt in radians.
    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    /// The tilted spin axis.
    pub fn rotate_axis(&self) -> Vec3 {
        self.rotate_axis
    }

    /// Current spin angle, always in `[0, 2pi)`.
    pub fn rot_angle(&self) -> f32 {
        self.rot_angle
    }

    /// Current orbit angle, always in `[0, 2pi)`.
    pub fn orbit_angle(&self) -> f32 {
        self.orbit_angle
    }

    /// Radius after viewing-scale compression.
    pub fn scaled_radius(&self) -> f32 {
        self.scaled_radius
    }

    /// Orbit radius after viewing-scale compression.
    pub fn scaled_orbit_radius(&self) -> f32 {
        self.scaled_orbit_radius
    }

    /// Position relative to the parent body.
    pub fn rel_position(&self) -> Vec3 {
        self.rel_position
    }

    /// Parent-relative velocity estimate (position delta of the last
    /// `advance` call).
    pub fn rel_velocity(&self) -> Vec3 {
        self.rel_velocity
    }

    /// Position in world space (valid after a system update pass).
    pub fn abs_position(&self) -> Vec3 {
        self.abs_position
    }

    /// Parent-relative transform.
    pub fn rel_transform(&self) -> Mat4 {
        self.rel_transform
    }

    /// World-space transform (valid after a system update pass).
    pub fn abs_transform(&self) -> Mat4 {
        self.abs_transform
    }

    /// Index of the first child body, if any.
    pub fn first_child(&self) -> Option<usize> {
        self.first_child
    }

    /// Index of the next sibling body, if any.
    pub fn next_sibling(&self) -> Option<usize> {
        self.next_sibling
    }
}

/// Power-law compression of astronomical magnitudes: `x^scale_factor`.
///
/// Keeps a 1,390,000 km star and a 1,737 km moon at comparable screen scale.
fn viewing_scale(x: f32, scale_factor: f32) -> f32 {
    x.powf(scale_factor)
}

/// Wrap an angle into `[0, 2pi)` by repeated add/subtract, handling negative
/// increments (reverse time) as well.
fn wrap_angle(mut angle: f32) -> f32 {
    while angle >= std::f32::consts::TAU {
        angle -= std::f32::consts::TAU;
    }
    while angle < 0.0 {
        angle += std::f32::consts::TAU;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planet() -> CelestialBody {
        CelestialBody::new(
            BodyParams::new("Test", 6371.0, 23.44, 1.0, 149_598_000.0, 1.0),
            0.35,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_zero_periods() {
        let zero_rot = BodyParams::new("Bad", 10.0, 0.0, 0.0, 50.0, 1.0);
        assert!(matches!(
            CelestialBody::new(zero_rot, 1.0),
            Err(SimError::ZeroRotationPeriod(_))
        ));

        let zero_orbit = BodyParams::new("Bad", 10.0, 0.0, 1.0, 50.0, 0.0);
        assert!(matches!(
            CelestialBody::new(zero_orbit, 1.0),
            Err(SimError::ZeroOrbitPeriod(_))
        ));
    }

    #[test]
    fn test_rejects_degenerate_radius() {
        let bad = BodyParams::new("Bad", 0.0, 0.0, 1.0, 50.0, 1.0);
        assert!(matches!(
            CelestialBody::new(bad, 1.0),
            Err(SimError::InvalidRadius { .. })
        ));
        let bad = BodyParams::new("Bad", 10.0, 0.0, 1.0, -1.0, 1.0);
        assert!(matches!(
            CelestialBody::new(bad, 1.0),
            Err(SimError::InvalidOrbitRadius { .. })
        ));
    }

    #[test]
    fn test_angles_stay_in_range() {
        let mut body = planet();
        for _ in 0..1000 {
            body.advance(173.5);
            assert!((0.0..std::f32::consts::TAU).contains(&body.orbit_angle()));
            assert!((0.0..std::f32::consts::TAU).contains(&body.rot_angle()));
        }
    }

    #[test]
    fn test_negative_ticks_reverse_time() {
        let mut body = planet();
        body.advance(500.0);
        let forward = body.orbit_angle();
        body.advance(-500.0);
        assert!(body.orbit_angle() < 1e-4 || std::f32::consts::TAU - body.orbit_angle() < 1e-4);
        assert!(forward > 0.0);
        assert!((0.0..std::f32::consts::TAU).contains(&body.orbit_angle()));
    }

    #[test]
    fn test_initial_position_on_x_axis() {
        let body = planet();
        let expected = 149_598_000.0f32.powf(0.35);
        assert!((body.rel_position().x - expected).abs() < expected * 1e-5);
        assert_eq!(body.rel_position().y, 0.0);
        assert_eq!(body.rel_position().z, 0.0);
        assert_eq!(body.rel_velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_scale_round_trip() {
        let mut body = planet();
        let radius = body.scaled_radius();
        let orbit = body.scaled_orbit_radius();
        body.adjust_scale(0.07);
        assert!((body.scaled_radius() - radius).abs() > 1e-3);
        body.adjust_scale(-0.07);
        assert!((body.scaled_radius() - radius).abs() < radius * 1e-4);
        assert!((body.scaled_orbit_radius() - orbit).abs() < orbit * 1e-4);
    }

    #[test]
    fn test_velocity_is_position_delta() {
        let mut body = planet();
        let before = body.rel_position();
        body.advance(10_000.0);
        let after = body.rel_position();
        assert!((body.rel_velocity() - (after - before)).length() < 1e-4);
    }

    #[test]
    fn test_orientation_fixes_absolute_position() {
        let mut body = planet();
        body.advance(30_000.0);
        body.set_absolute(body.rel_transform());
        body.update_orientation();
        // Spin and tilt are anchored at the body's own location, so the
        // location itself must be a fixed point of the orientation.
        let p = body.abs_position();
        let moved = body.orientation.transform_point3(p);
        assert!((moved - p).length() < p.length() * 1e-5);
    }

    #[test]
    fn test_retrograde_rotation_allowed() {
        // Venus-style spin: a negative rotation period runs the spin
        // backwards but keeps the angle in range.
        let mut venus = CelestialBody::new(
            BodyParams::new("Venus", 6051.8, 177.4, -243.02, 108_209_000.0, 0.6152),
            0.35,
        )
        .unwrap();
        venus.advance(1000.0);
        assert!((0.0..std::f32::consts::TAU).contains(&venus.rot_angle()));
        assert!(venus.rot_angle() > std::f32::consts::PI, "spin should run backwards");
    }
}
