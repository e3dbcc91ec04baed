//! Configuration sampler
//!
//! Draws candidate `(x, y, θ)` configurations either uniformly over the
//! workspace or from normals centred on the robot's current pose. Every
//! sample is tagged with its collision status; colliding samples are kept.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use itertools::izip;
use nalgebra::{Matrix2, Vector2};
use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::common::{Configuration, PlanningError, PlanningResult, Point2D, Pose2D};

use super::collision::CollisionChecker;
use super::geometry::WorkspaceBounds;

/// Distribution used to draw candidate configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingDistribution {
    /// Uniform over the workspace, heading uniform over `[-π, π)`
    Uniform,
    /// Normal around the robot's current pose
    GaussianBiased,
}

impl FromStr for SamplingDistribution {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "u" | "uniform" => Ok(SamplingDistribution::Uniform),
            "n" | "normal" | "gaussian" | "gaussian_biased" => {
                Ok(SamplingDistribution::GaussianBiased)
            }
            _ => Err(PlanningError::UnknownDistribution(s.to_string())),
        }
    }
}

impl fmt::Display for SamplingDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingDistribution::Uniform => write!(f, "uniform"),
            SamplingDistribution::GaussianBiased => write!(f, "gaussian"),
        }
    }
}

/// Configuration for the configuration sampler
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Covariance of the Gaussian-biased position draw, row major
    pub position_covariance: [[f64; 2]; 2],
    /// Standard deviation of the Gaussian-biased heading draw [rad]
    pub heading_std_dev: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            position_covariance: [[1.5, 0.0], [0.0, 1.5]],
            heading_std_dev: 0.1,
        }
    }
}

/// Drawn configurations with a parallel collision flag per sample
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    pub configurations: Vec<Configuration>,
    pub collisions: Vec<bool>,
}

impl SampleSet {
    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    pub fn positions(&self) -> Vec<Point2D> {
        self.configurations.iter().map(|q| q.position()).collect()
    }

    /// Positions split into (free, colliding)
    pub fn partition_positions(&self) -> (Vec<Point2D>, Vec<Point2D>) {
        let mut free = Vec::new();
        let mut colliding = Vec::new();
        for (q, &hit) in self.configurations.iter().zip(self.collisions.iter()) {
            if hit {
                colliding.push(q.position());
            } else {
                free.push(q.position());
            }
        }
        (free, colliding)
    }

    /// Move every sample of `other` onto the end of this set
    pub fn append(&mut self, other: &mut SampleSet) {
        self.configurations.append(&mut other.configurations);
        self.collisions.append(&mut other.collisions);
    }

    pub fn collision_count(&self) -> usize {
        self.collisions.iter().filter(|&&c| c).count()
    }
}

/// Configuration sampler over a fixed workspace
#[derive(Debug, Clone)]
pub struct ConfigurationSampler {
    bounds: WorkspaceBounds,
    covariance: Matrix2<f64>,
    /// Lower Cholesky factor of `covariance`
    covariance_factor: Matrix2<f64>,
    heading_std_dev: f64,
}

impl ConfigurationSampler {
    pub fn new(bounds: WorkspaceBounds, config: &SamplerConfig) -> PlanningResult<Self> {
        bounds.validate()?;

        let c = config.position_covariance;
        let covariance = Matrix2::new(c[0][0], c[0][1], c[1][0], c[1][1]);
        if covariance != covariance.transpose() {
            return Err(PlanningError::InvalidParameter(
                "position covariance must be symmetric".to_string(),
            ));
        }
        let covariance_factor = covariance
            .cholesky()
            .ok_or_else(|| {
                PlanningError::InvalidParameter(
                    "position covariance must be positive definite".to_string(),
                )
            })?
            .l();

        if !config.heading_std_dev.is_finite() || config.heading_std_dev < 0.0 {
            return Err(PlanningError::InvalidParameter(format!(
                "heading standard deviation must be finite and non-negative, got {}",
                config.heading_std_dev
            )));
        }

        Ok(ConfigurationSampler {
            bounds,
            covariance,
            covariance_factor,
            heading_std_dev: config.heading_std_dev,
        })
    }

    pub fn covariance(&self) -> &Matrix2<f64> {
        &self.covariance
    }

    /// Draw `n` positions
    pub fn sample_positions<R: Rng + ?Sized>(
        &self,
        n: usize,
        distribution: SamplingDistribution,
        pose: &Pose2D,
        rng: &mut R,
    ) -> Vec<Point2D> {
        match distribution {
            SamplingDistribution::Uniform => (0..n)
                .map(|_| {
                    Point2D::new(
                        rng.gen_range(self.bounds.x_min..self.bounds.x_max),
                        rng.gen_range(self.bounds.y_min..self.bounds.y_max),
                    )
                })
                .collect(),
            SamplingDistribution::GaussianBiased => {
                let mean = pose.position().to_vector();
                (0..n)
                    .map(|_| {
                        let zx: f64 = rng.sample(StandardNormal);
                        let zy: f64 = rng.sample(StandardNormal);
                        Point2D::from(mean + self.covariance_factor * Vector2::new(zx, zy))
                    })
                    .collect()
            }
        }
    }

    /// Draw `n` headings
    pub fn sample_headings<R: Rng + ?Sized>(
        &self,
        n: usize,
        distribution: SamplingDistribution,
        pose: &Pose2D,
        rng: &mut R,
    ) -> PlanningResult<Vec<f64>> {
        match distribution {
            SamplingDistribution::Uniform => Ok((0..n).map(|_| rng.gen_range(-PI..PI)).collect()),
            SamplingDistribution::GaussianBiased => {
                let normal = Normal::new(pose.yaw, self.heading_std_dev)
                    .map_err(|e| PlanningError::InvalidParameter(e.to_string()))?;
                Ok((0..n).map(|_| normal.sample(rng)).collect())
            }
        }
    }

    /// Draw `n` configurations and tag each with its collision status
    pub fn sample<R: Rng + ?Sized>(
        &self,
        n: usize,
        distribution: SamplingDistribution,
        pose: &Pose2D,
        checker: &CollisionChecker,
        rng: &mut R,
    ) -> PlanningResult<SampleSet> {
        let positions = self.sample_positions(n, distribution, pose, rng);
        let headings = self.sample_headings(n, distribution, pose, rng)?;

        let mut set = SampleSet {
            configurations: Vec::with_capacity(n),
            collisions: Vec::with_capacity(n),
        };
        for (p, theta) in izip!(positions, headings) {
            set.collisions.push(checker.is_collision(p));
            set.configurations.push(Configuration::from_cartesian(p.x, p.y, theta));
        }

        log::debug!(
            "sampled {} configurations ({}), {} in collision",
            set.len(),
            distribution,
            set.collision_count()
        );
        Ok(set)
    }

    /// Like [`Self::sample`] with the distribution given by name; an unknown
    /// name fails before anything is drawn.
    pub fn sample_named<R: Rng + ?Sized>(
        &self,
        n: usize,
        distribution: &str,
        pose: &Pose2D,
        checker: &CollisionChecker,
        rng: &mut R,
    ) -> PlanningResult<SampleSet> {
        let distribution: SamplingDistribution = distribution.parse()?;
        self.sample(n, distribution, pose, checker, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_planning::environment::geometry::HalfSpaceObstacle;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bounds() -> WorkspaceBounds {
        WorkspaceBounds::new(0.0, 10.0, 0.0, 10.0).unwrap()
    }

    fn create_test_checker() -> CollisionChecker {
        let block = HalfSpaceObstacle::from_arrays(
            &[[1.0, 0.0], [-1.0, 0.0], [0.0, 1.0], [0.0, -1.0]],
            &[-4.0, 6.0, -4.0, 6.0],
        )
        .unwrap();
        CollisionChecker::new(bounds(), vec![block], 5).unwrap()
    }

    #[test]
    fn test_parse_distribution() {
        assert_eq!("U".parse::<SamplingDistribution>().unwrap(), SamplingDistribution::Uniform);
        assert_eq!("N".parse::<SamplingDistribution>().unwrap(), SamplingDistribution::GaussianBiased);
        assert_eq!(
            "Gaussian".parse::<SamplingDistribution>().unwrap(),
            SamplingDistribution::GaussianBiased
        );
        let err = "beta".parse::<SamplingDistribution>().unwrap_err();
        assert!(matches!(err, PlanningError::UnknownDistribution(ref name) if name == "beta"));
    }

    #[test]
    fn test_unknown_distribution_produces_nothing() {
        let sampler = ConfigurationSampler::new(bounds(), &SamplerConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let result = sampler.sample_named(10, "poisson", &Pose2D::origin(), &create_test_checker(), &mut rng);
        assert!(matches!(result, Err(PlanningError::UnknownDistribution(_))));
    }

    #[test]
    fn test_uniform_samples_in_bounds() {
        let sampler = ConfigurationSampler::new(bounds(), &SamplerConfig::default()).unwrap();
        let checker = create_test_checker();
        let mut rng = StdRng::seed_from_u64(2);
        let set = sampler
            .sample(500, SamplingDistribution::Uniform, &Pose2D::origin(), &checker, &mut rng)
            .unwrap();

        assert_eq!(set.len(), 500);
        assert_eq!(set.collisions.len(), 500);
        for (q, &hit) in set.configurations.iter().zip(set.collisions.iter()) {
            let p = q.position();
            assert!(p.x >= -1e-9 && p.x <= 10.0 + 1e-9);
            assert!(p.y >= -1e-9 && p.y <= 10.0 + 1e-9);
            assert!(q.theta >= -PI && q.theta < PI);
            assert_eq!(hit, checker.is_collision(p));
        }
        // the 2x2 block covers 4% of the workspace
        assert!(set.collision_count() > 0);
    }

    #[test]
    fn test_gaussian_samples_centred_on_pose() {
        let sampler = ConfigurationSampler::new(bounds(), &SamplerConfig::default()).unwrap();
        let checker = create_test_checker();
        let pose = Pose2D::new(2.0, 8.0, 0.7);
        let mut rng = StdRng::seed_from_u64(3);
        let set = sampler
            .sample(4000, SamplingDistribution::GaussianBiased, &pose, &checker, &mut rng)
            .unwrap();

        let n = set.len() as f64;
        let pts = set.positions();
        let mx = pts.iter().map(|p| p.x).sum::<f64>() / n;
        let my = pts.iter().map(|p| p.y).sum::<f64>() / n;
        let mt = set.configurations.iter().map(|q| q.theta).sum::<f64>() / n;
        let vx = pts.iter().map(|p| (p.x - mx).powi(2)).sum::<f64>() / n;

        assert!((mx - 2.0).abs() < 0.1, "mean x {}", mx);
        assert!((my - 8.0).abs() < 0.1, "mean y {}", my);
        assert!((mt - 0.7).abs() < 0.01, "mean theta {}", mt);
        assert!((vx - 1.5).abs() < 0.2, "var x {}", vx);
    }

    #[test]
    fn test_collided_samples_kept() {
        let sampler = ConfigurationSampler::new(bounds(), &SamplerConfig::default()).unwrap();
        let checker = create_test_checker();
        // centred on the obstacle
        let pose = Pose2D::new(5.0, 5.0, 0.0);
        let mut rng = StdRng::seed_from_u64(4);
        let set = sampler
            .sample(200, SamplingDistribution::GaussianBiased, &pose, &checker, &mut rng)
            .unwrap();
        assert_eq!(set.len(), 200);
        let (free, colliding) = set.partition_positions();
        assert_eq!(free.len() + colliding.len(), 200);
        assert!(!colliding.is_empty());
    }

    #[test]
    fn test_append_sample_sets() {
        let sampler = ConfigurationSampler::new(bounds(), &SamplerConfig::default()).unwrap();
        let checker = create_test_checker();
        let pose = Pose2D::new(5.0, 5.0, 0.0);
        let mut rng = StdRng::seed_from_u64(5);
        let mut uniform = sampler
            .sample(30, SamplingDistribution::Uniform, &pose, &checker, &mut rng)
            .unwrap();
        let mut biased = sampler
            .sample(20, SamplingDistribution::GaussianBiased, &pose, &checker, &mut rng)
            .unwrap();
        let hits = uniform.collision_count() + biased.collision_count();

        uniform.append(&mut biased);
        assert!(biased.is_empty());
        assert_eq!(uniform.len(), 50);
        assert_eq!(uniform.collisions.len(), 50);
        assert_eq!(uniform.collision_count(), hits);
    }

    #[test]
    fn test_invalid_covariance_rejected() {
        let config = SamplerConfig {
            position_covariance: [[1.0, 2.0], [2.0, 1.0]],
            ..Default::default()
        };
        assert!(ConfigurationSampler::new(bounds(), &config).is_err());

        let config = SamplerConfig {
            heading_std_dev: -0.1,
            ..Default::default()
        };
        assert!(ConfigurationSampler::new(bounds(), &config).is_err());
    }
}
