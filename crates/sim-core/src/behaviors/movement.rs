//! Movement Helpers
//!
//! Heading arithmetic, seeking, and the eight-direction quantization used
//! by grid agents.

use glam::{DVec2, IVec2};
use rand::Rng;
use std::f64::consts::TAU;

use crate::components::space::Space;

/// Norm below which a potential-field vector counts as zero
pub const FIELD_EPSILON: f64 = 1e-5;

/// Unit steps for the eight octants, counter-clockwise from +x
pub const OCTANT_STEPS: [IVec2; 8] = [
    IVec2::new(1, 0),
    IVec2::new(1, 1),
    IVec2::new(0, 1),
    IVec2::new(-1, 1),
    IVec2::new(-1, 0),
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
];

/// Inclusive upper bound (degrees) of each octant band; beyond the last
/// band the angle wraps back to octant 0
const OCTANT_UPPER_BOUNDS: [f64; 8] = [22.5, 67.5, 112.5, 157.5, 202.5, 247.5, 292.5, 337.5];

/// Uniform heading in [0, 2π)
pub fn random_heading(rng: &mut impl Rng) -> f64 {
    rng.gen::<f64>() * TAU
}

/// Normalize an angle into [0, 2π)
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Point reached by moving `distance` along `heading`
pub fn project(from: DVec2, distance: f64, heading: f64) -> DVec2 {
    from + DVec2::new(heading.cos(), heading.sin()) * distance
}

/// One random-heading step, clamped into the space
pub fn wander(from: DVec2, speed: f64, space: &Space, rng: &mut impl Rng) -> DVec2 {
    space.clamp(project(from, speed, random_heading(rng)))
}

/// Step toward `target`, returning the new position and heading
///
/// A target closer than one step is reached exactly and the heading is
/// re-drawn at random.
pub fn go_to(from: DVec2, speed: f64, target: DVec2, rng: &mut impl Rng) -> (DVec2, f64) {
    let dist = from.distance(target);
    if dist < speed {
        return (target, random_heading(rng));
    }
    let mut angle = ((target.x - from.x) / dist).clamp(-1.0, 1.0).acos();
    if target.y < from.y {
        angle = -angle;
    }
    (project(from, speed, angle), wrap_angle(angle))
}

/// Direction of `v` in degrees, in [0, 360)
pub fn degrees_of(v: DVec2) -> f64 {
    let deg = v.y.atan2(v.x).to_degrees();
    if deg < 0.0 {
        deg + 360.0
    } else {
        deg
    }
}

/// Octant index for an angle in [0, 360) degrees
pub fn octant_for_degrees(deg: f64) -> usize {
    OCTANT_UPPER_BOUNDS
        .iter()
        .position(|&upper| deg <= upper)
        .unwrap_or(0)
}

/// Octant that `v` points into; `None` for a vanishing vector
pub fn octant_of(v: DVec2) -> Option<usize> {
    if v.length() <= FIELD_EPSILON {
        return None;
    }
    Some(octant_for_degrees(degrees_of(v)))
}

/// Grid step along `v`, if it points anywhere
pub fn octant_step(v: DVec2) -> Option<IVec2> {
    octant_of(v).map(|i| OCTANT_STEPS[i])
}

/// Weighted sum of unit vectors toward each offset
pub fn field_sum(contributions: impl IntoIterator<Item = (IVec2, f64)>) -> DVec2 {
    contributions
        .into_iter()
        .filter(|(offset, _)| *offset != IVec2::ZERO)
        .fold(DVec2::ZERO, |acc, (offset, weight)| {
            acc + offset.as_dvec2().normalize() * weight
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((wrap_angle(5.0 * PI) - PI).abs() < 1e-12);
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!(wrap_angle(-1e-18) < TAU);
    }

    #[test]
    fn test_go_to_snaps_when_close() {
        let mut rng = SmallRng::seed_from_u64(1);
        let (pos, heading) = go_to(DVec2::ZERO, 10.0, DVec2::new(3.0, 4.0), &mut rng);
        assert_eq!(pos, DVec2::new(3.0, 4.0));
        assert!((0.0..TAU).contains(&heading));
    }

    #[test]
    fn test_go_to_steps_toward_target() {
        let mut rng = SmallRng::seed_from_u64(1);
        let (pos, heading) = go_to(DVec2::ZERO, 5.0, DVec2::new(0.0, -20.0), &mut rng);
        assert!(pos.distance(DVec2::new(0.0, -5.0)) < 1e-9);
        assert!((heading - 3.0 * FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_wander_stays_in_bounds() {
        let space = Space::continuous(10.0, 10.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(9);
        let mut p = DVec2::new(0.5, 9.5);
        for _ in 0..200 {
            p = wander(p, 4.0, &space, &mut rng);
            assert!(space.contains(p));
        }
    }

    #[test]
    fn test_octant_bands() {
        assert_eq!(octant_for_degrees(0.0), 0);
        assert_eq!(octant_for_degrees(22.5), 0);
        assert_eq!(octant_for_degrees(22.6), 1);
        assert_eq!(octant_for_degrees(90.0), 2);
        assert_eq!(octant_for_degrees(337.5), 7);
        assert_eq!(octant_for_degrees(350.0), 0);

        assert_eq!(octant_step(DVec2::new(-1.0, 0.0)), Some(IVec2::new(-1, 0)));
        assert_eq!(octant_step(DVec2::new(1.0, -1.0)), Some(IVec2::new(1, -1)));
        assert_eq!(octant_step(DVec2::new(1e-7, 0.0)), None);
    }

    #[test]
    fn test_symmetric_field_cancels() {
        let mut cells = Vec::new();
        for dx in -4..=4 {
            for dy in -4..=4 {
                cells.push((IVec2::new(dx, dy), 7.0));
            }
        }
        assert!(field_sum(cells).length() <= FIELD_EPSILON);

        let pull = field_sum([(IVec2::new(0, 3), 2.0), (IVec2::new(0, -1), 1.0)]);
        assert!((pull - DVec2::new(0.0, 1.0)).length() < 1e-12);
    }
}
