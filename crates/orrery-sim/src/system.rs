//! The celestial system: an arena of bodies wired into an orbit tree, plus
//! the shared sphere mesh handed to the renderer.

use glam::Mat4;
use tracing::{debug, info};

use orrery_mesh::SphereMesh;

use crate::body::{BodyParams, CelestialBody};
use crate::error::SimError;

/// Longitudinal resolution of the shared sphere.
const SPHERE_FANS: u32 = 36;
/// Latitudinal resolution of the shared sphere.
const SPHERE_BANDS: u32 = 18;

/// A solar system: the body arena, the orbit tree over it, and one unit
/// sphere every body is drawn as an instance of.
///
/// The body `Vec` is populated once and never resized afterwards — the tree
/// links are positional. Index 0 is always the root (the star).
#[derive(Clone, Debug)]
pub struct CelestialSystem {
    bodies: Vec<CelestialBody>,
    mesh: SphereMesh,
    scale_factor: f32,
}

impl CelestialSystem {
    /// Build the fixed solar-system roster: the Sun, the eight planets, and
    /// the major moons, wired so each moon orbits its planet and each planet
    /// orbits the Sun.
    ///
    /// `initial_scale_factor` is the starting viewing-scale exponent
    /// (0.35 keeps the whole system on screen at once).
    pub fn new(initial_scale_factor: f32) -> Result<Self, SimError> {
        // name, radius (km), tilt (deg), rotation period (Earth days),
        // orbit radius (km), orbit period (Earth years), parent index.
        #[rustfmt::skip]
        let roster: [(BodyParams, Option<usize>); 17] = [
            (BodyParams::new("Sol",      695_700.0,  7.25,   25.38,              0.0,     1.0), None),
            (BodyParams::new("Mercury",    2_439.7,  0.03,   58.65,     57_909_000.0,  0.2408), Some(0)),
            (BodyParams::new("Venus",      6_051.8, 177.4, -243.02,    108_209_000.0,  0.6152), Some(0)),
            (BodyParams::new("Earth",      6_371.0, 23.44,    0.9973,  149_598_000.0,  1.0),    Some(0)),
            (BodyParams::new("Luna",       1_737.4,  6.68,   27.32,        384_400.0,  0.0748), Some(3)),
            (BodyParams::new("Mars",       3_389.5, 25.19,    1.026,   227_939_000.0,  1.8808), Some(0)),
            (BodyParams::new("Phobos",        11.3,  0.0,     0.3189,        9_376.0,  0.000873), Some(5)),
            (BodyParams::new("Deimos",         6.2,  0.0,     1.2624,       23_463.0,  0.003456), Some(5)),
            (BodyParams::new("Jupiter",   69_911.0,  3.13,    0.4135,  778_570_000.0, 11.862),  Some(0)),
            (BodyParams::new("Io",         1_821.6,  0.0,     1.769,       421_700.0,  0.004844), Some(8)),
            (BodyParams::new("Europa",     1_560.8,  0.1,     3.551,       670_900.0,  0.009723), Some(8)),
            (BodyParams::new("Ganymede",   2_634.1,  0.2,     7.155,     1_070_400.0,  0.019589), Some(8)),
            (BodyParams::new("Callisto",   2_410.3,  0.0,    16.689,     1_882_700.0,  0.045694), Some(8)),
            (BodyParams::new("Saturn",    58_232.0, 26.73,    0.444,  1_433_530_000.0, 29.457),  Some(0)),
            (BodyParams::new("Titan",      2_574.7,  0.3,    15.945,     1_221_870.0,  0.043649), Some(13)),
            (BodyParams::new("Uranus",    25_362.0, 97.77,   -0.718,  2_872_460_000.0, 84.011),  Some(0)),
            (BodyParams::new("Neptune",   24_622.0, 28.32,    0.671,  4_495_060_000.0,164.79),   Some(0)),
        ];

        let mut bodies = Vec::with_capacity(roster.len());
        let mut parents = Vec::with_capacity(roster.len());
        for (params, parent) in roster {
            bodies.push(CelestialBody::new(params, initial_scale_factor)?);
            parents.push(parent);
        }

        let system = Self::from_bodies(bodies, &parents, initial_scale_factor)?;
        info!(
            bodies = system.body_count(),
            scale_factor = initial_scale_factor,
            "celestial system constructed"
        );
        Ok(system)
    }

    /// Assemble a system from pre-built bodies and a parent table
    /// (`parents[i]` is the arena index of body `i`'s parent; the root, and
    /// only the root, has none). Wires the left-child/right-sibling links and
    /// runs one zero-tick update so absolute transforms are valid.
    pub(crate) fn from_bodies(
        mut bodies: Vec<CelestialBody>,
        parents: &[Option<usize>],
        scale_factor: f32,
    ) -> Result<Self, SimError> {
        assert_eq!(bodies.len(), parents.len());
        assert!(!bodies.is_empty(), "a system needs at least a root body");
        assert_eq!(parents[0], None, "index 0 must be the root");

        // Children are chained in insertion order: the first child found
        // becomes first_child, later ones append to the sibling chain.
        for i in 1..bodies.len() {
            let parent = parents[i].expect("non-root body must have a parent");
            assert!(parent < i, "parents must precede children in the arena");
            match bodies[parent].first_child {
                None => bodies[parent].first_child = Some(i),
                Some(first) => {
                    let mut tail = first;
                    while let Some(next) = bodies[tail].next_sibling {
                        tail = next;
                    }
                    bodies[tail].next_sibling = Some(i);
                }
            }
        }

        let mesh = SphereMesh::build(SPHERE_FANS, SPHERE_BANDS, 1.0)?;
        let mut system = Self {
            bodies,
            mesh,
            scale_factor,
        };
        system.update(0.0);
        Ok(system)
    }

    /// Advance every body by `ticks` simulated minutes, then recompose all
    /// absolute transforms top-down and refresh orientations.
    ///
    /// A body's absolute transform is its parent's absolute transform
    /// composed with its own relative transform, so parents are always
    /// processed strictly before their children.
    pub fn update(&mut self, ticks: f32) {
        for body in &mut self.bodies {
            body.advance(ticks);
        }

        // Depth-first walk of the left-child/right-sibling tree: children
        // inherit this body's absolute transform, siblings the parent's.
        let mut stack = vec![(0usize, Mat4::IDENTITY)];
        while let Some((index, parent_abs)) = stack.pop() {
            let abs = parent_abs * self.bodies[index].rel_transform();
            self.bodies[index].set_absolute(abs);
            if let Some(sibling) = self.bodies[index].next_sibling {
                stack.push((sibling, parent_abs));
            }
            if let Some(child) = self.bodies[index].first_child {
                stack.push((child, abs));
            }
        }

        // Orientations need final absolute positions, so this pass runs last.
        for body in &mut self.bodies {
            body.update_orientation();
        }
    }

    /// Broadcast a viewing-scale change to every body.
    pub fn adjust_scale(&mut self, delta: f32) {
        self.scale_factor += delta;
        for body in &mut self.bodies {
            body.adjust_scale(delta);
        }
        debug!(scale_factor = self.scale_factor, "viewing scale adjusted");
    }

    /// The cumulative viewing-scale exponent.
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Number of bodies in the system.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// All bodies, in arena order.
    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    /// A single body by arena index.
    pub fn body(&self, index: usize) -> &CelestialBody {
        &self.bodies[index]
    }

    /// The shared unit-sphere mesh, uploaded once at startup.
    pub fn mesh(&self) -> &SphereMesh {
        &self.mesh
    }

    /// Per-instance draw transforms in arena order:
    /// `orientation * absolute_location * scale` for each body.
    pub fn draw_transforms(&self) -> Vec<Mat4> {
        self.bodies.iter().map(|b| b.draw_transform()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{MINUTES_PER_DAY, MINUTES_PER_YEAR};
    use glam::Vec3;

    const TAU: f32 = std::f32::consts::TAU;

    /// A body that just sits at a fixed offset on the x axis: orbit angle
    /// stays zero because the period is enormous relative to the test ticks.
    fn translation_body(name: &str, offset: f32) -> CelestialBody {
        CelestialBody::new(BodyParams::new(name, 1.0, 0.0, 1.0, offset, 1e9), 1.0).unwrap()
    }

    #[test]
    fn test_roster_tree_shape() {
        let system = CelestialSystem::new(0.35).unwrap();
        assert_eq!(system.body_count(), 17);
        assert_eq!(system.body(0).name(), "Sol");

        // Every non-root body reaches the root through the child chains.
        let mut reached = vec![false; system.body_count()];
        let mut stack = vec![0usize];
        while let Some(i) = stack.pop() {
            reached[i] = true;
            if let Some(s) = system.body(i).next_sibling() {
                stack.push(s);
            }
            if let Some(c) = system.body(i).first_child() {
                stack.push(c);
            }
        }
        assert!(reached.iter().all(|&r| r), "unreachable body in the tree");

        // Mercury is the Sun's first child; Luna is Earth's.
        assert_eq!(system.body(0).first_child(), Some(1));
        assert_eq!(system.body(3).name(), "Earth");
        assert_eq!(system.body(3).first_child(), Some(4));
        assert_eq!(system.body(4).name(), "Luna");
    }

    #[test]
    fn test_three_level_chain_composition() {
        // Pure translations of 10, 5, and 2 units: the grandchild's absolute
        // position must be the straight sum (17, 0, 0).
        let bodies = vec![
            translation_body("root", 10.0),
            translation_body("child", 5.0),
            translation_body("grandchild", 2.0),
        ];
        let system = CelestialSystem::from_bodies(bodies, &[None, Some(0), Some(1)], 1.0).unwrap();

        let p = system.body(2).abs_position();
        assert!((p - Vec3::new(17.0, 0.0, 0.0)).length() < 1e-4, "got {p}");
        let q = system.body(1).abs_position();
        assert!((q - Vec3::new(15.0, 0.0, 0.0)).length() < 1e-4, "got {q}");
    }

    #[test]
    fn test_chain_equals_composed_relatives() {
        let mut system = CelestialSystem::new(0.35).unwrap();
        system.update(90_000.0);

        // Luna's absolute transform must equal Sun.rel * Earth.rel * Luna.rel.
        let expected = system.body(0).rel_transform()
            * system.body(3).rel_transform()
            * system.body(4).rel_transform();
        let diff: f32 = (expected.to_cols_array())
            .iter()
            .zip(system.body(4).abs_transform().to_cols_array())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max);
        assert!(diff < 1e-3, "max element diff {diff}");
    }

    #[test]
    fn test_quarter_orbit_scenario() {
        // A planet whose full revolution takes exactly 4 ticks.
        let period = 4.0 / MINUTES_PER_YEAR;
        let star = CelestialBody::new(BodyParams::new("star", 100.0, 0.0, 1.0, 0.0, 1e9), 1.0)
            .unwrap();
        let planet =
            CelestialBody::new(BodyParams::new("planet", 10.0, 0.0, 1.0, 50.0, period), 1.0)
                .unwrap();
        let mut system =
            CelestialSystem::from_bodies(vec![star, planet], &[None, Some(0)], 1.0).unwrap();

        system.update(1.0);
        let quarter = system.body(1).orbit_angle();
        assert!(
            (quarter - TAU / 4.0).abs() < 1e-4,
            "after 1 tick expected pi/2, got {quarter}"
        );
        // The planet swings from +x to -z for a right-handed turn about +y.
        let p = system.body(1).abs_position();
        assert!(p.x.abs() < 1e-3 && (p.z + 50.0).abs() < 1e-3, "got {p}");

        system.update(3.0);
        let full = system.body(1).orbit_angle();
        assert!(
            full.min(TAU - full) < 1e-3,
            "after 4 ticks expected wrap to ~0, got {full}"
        );
    }

    #[test]
    fn test_update_is_deterministic() {
        let mut a = CelestialSystem::new(0.35).unwrap();
        let mut b = CelestialSystem::new(0.35).unwrap();
        for ticks in [60.0, -13.5, 1440.0, 0.25] {
            a.update(ticks);
            b.update(ticks);
        }
        for (ta, tb) in a.draw_transforms().iter().zip(b.draw_transforms()) {
            assert_eq!(ta.to_cols_array(), tb.to_cols_array());
        }
    }

    #[test]
    fn test_scale_round_trip_via_system() {
        let mut system = CelestialSystem::new(0.35).unwrap();
        let before: Vec<f32> = system.bodies().iter().map(|b| b.scaled_radius()).collect();
        system.adjust_scale(0.01);
        system.adjust_scale(-0.01);
        assert!((system.scale_factor() - 0.35).abs() < 1e-6);
        for (body, old) in system.bodies().iter().zip(before) {
            assert!(
                (body.scaled_radius() - old).abs() < old * 1e-4,
                "{} radius drifted",
                body.name()
            );
        }
    }

    #[test]
    fn test_moon_tracks_planet() {
        let mut system = CelestialSystem::new(0.35).unwrap();
        // Half an Earth year in one-day steps.
        for _ in 0..182 {
            system.update(MINUTES_PER_DAY);
        }
        let earth = system.body(3).abs_position();
        let luna = system.body(4).abs_position();
        let lead = (luna - earth).length();
        assert!(
            (lead - system.body(4).scaled_orbit_radius()).abs() < lead * 1e-3,
            "Luna strayed from Earth: {lead}"
        );
    }

    #[test]
    fn test_draw_transform_places_and_sizes() {
        let system = CelestialSystem::new(0.35).unwrap();
        for body in system.bodies() {
            let m = body.draw_transform();
            // The unit sphere's center lands at the body's world position.
            let center = m.transform_point3(Vec3::ZERO);
            assert!((center - body.abs_position()).length() < center.length().max(1.0) * 1e-4);
        }
    }
}
