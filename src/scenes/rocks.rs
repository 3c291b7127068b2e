use glam::Vec3;
use rand::Rng;
use serde::Deserialize;
use std::f32::consts::TAU;
use std::ops::{Range, RangeInclusive};

/// Uniform-random layout of rocks on a ring around the origin
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RockScatter {
    pub count: usize,
    /// Sphere radius, half-open
    pub radius: Range<f32>,
    /// Width and height segment counts, sampled independently
    pub segments: RangeInclusive<u32>,
    /// Distance from the origin in the ground plane, half-open
    pub distance: Range<f32>,
    /// Maximum rotation jitter per axis in radians
    pub tilt: f32,
}

impl Default for RockScatter {
    fn default() -> Self {
        Self {
            count: 100,
            radius: 0.1..0.6,
            segments: 5..=9,
            distance: 5.0..17.0,
            tilt: 0.2,
        }
    }
}

/// One sampled rock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RockPlacement {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub angle: f32,
    pub distance: f32,
    pub position: Vec3,
    /// Euler XYZ angles
    pub rotation: Vec3,
}

impl RockScatter {
    /// Draw `count` placements from `rng`.
    ///
    /// Each rock consumes eight samples in a fixed order (radius, width segments,
    /// height segments, angle, distance, then tilt about y, z and x), so a seeded
    /// generator always yields the same layout.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<RockPlacement> {
        (0..self.count).map(|_| self.sample_one(rng)).collect()
    }

    fn sample_one<R: Rng + ?Sized>(&self, rng: &mut R) -> RockPlacement {
        let radius = rng.random_range(self.radius.clone());
        let width_segments = rng.random_range(self.segments.clone());
        let height_segments = rng.random_range(self.segments.clone());

        let angle = rng.random_range(0.0..TAU);
        let distance = rng.random_range(self.distance.clone());
        let position = Vec3::new(angle.sin() * distance, radius / 2.0, angle.cos() * distance);

        let y = self.jitter(rng);
        let z = self.jitter(rng);
        let x = self.jitter(rng);

        RockPlacement {
            radius,
            width_segments,
            height_segments,
            angle,
            distance,
            position,
            rotation: Vec3::new(x, y, z),
        }
    }

    fn jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.tilt > 0.0 {
            rng.random_range(-self.tilt..self.tilt)
        } else {
            0.0
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.radius.start > 0.0 && self.radius.start < self.radius.end,
            "rock radius range {:?} must be positive and non-empty",
            self.radius
        );
        anyhow::ensure!(
            self.segments.start() <= self.segments.end(),
            "rock segment range {:?} is empty",
            self.segments
        );
        anyhow::ensure!(
            self.distance.start >= 0.0 && self.distance.start < self.distance.end,
            "rock distance range {:?} must be non-negative and non-empty",
            self.distance
        );
        anyhow::ensure!(self.tilt >= 0.0, "rock tilt {} is negative", self.tilt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_layout_matches_ranges() {
        let scatter = RockScatter::default();
        let rocks = scatter.sample(&mut StdRng::seed_from_u64(7));

        assert_eq!(rocks.len(), 100);
        for rock in &rocks {
            assert!((0.1..0.6).contains(&rock.radius));
            assert!((5..=9).contains(&rock.width_segments));
            assert!((5..=9).contains(&rock.height_segments));
            assert!((0.0..TAU).contains(&rock.angle));
            assert!((5.0..17.0).contains(&rock.distance));
            assert!((rock.position.y - rock.radius / 2.0).abs() < 1e-6);
            assert!(rock.rotation.abs().max_element() < 0.2);
        }
    }

    #[test]
    fn test_position_on_ring() {
        let rocks = RockScatter::default().sample(&mut StdRng::seed_from_u64(3));
        for rock in rocks {
            let planar = Vec3::new(rock.position.x, 0.0, rock.position.z).length();
            assert!((planar - rock.distance).abs() < 1e-4);
            assert!((rock.position.x - rock.angle.sin() * rock.distance).abs() < 1e-5);
        }
    }

    #[test]
    fn test_zero_tilt_leaves_rocks_upright() {
        let scatter = RockScatter {
            tilt: 0.0,
            ..Default::default()
        };
        let rocks = scatter.sample(&mut StdRng::seed_from_u64(1));
        assert!(rocks.iter().all(|r| r.rotation == Vec3::ZERO));
    }

    #[test]
    fn test_validate_rejects_empty_ranges() {
        assert!(RockScatter::default().validate().is_ok());

        let bad_radius = RockScatter {
            radius: 0.5..0.5,
            ..Default::default()
        };
        assert!(bad_radius.validate().is_err());

        #[allow(clippy::reversed_empty_ranges)]
        let bad_segments = RockScatter {
            segments: 9..=5,
            ..Default::default()
        };
        assert!(bad_segments.validate().is_err());
    }
}
