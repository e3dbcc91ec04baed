// Planning environment demo: samples configurations, integrates a unicycle
// trajectory towards the goal with heading-control retries, and checks it
// against the obstacles.
//
// usage: environment_demo [config.toml]

use std::env;
use std::f64::consts::PI;

use rand::thread_rng;

use rrt_environment::common::{
    Configuration, ControlWindow, IntegrationReport, Pose2D, Robot, TimeSpan, Trajectory,
};
use rrt_environment::path_planning::environment::{
    CancelToken, Environment, EnvironmentConfig, ObstacleSpec, SamplingDistribution,
};
use rrt_environment::utils::{colors, PathStyle, Visualizer};

const SHOW_ANIMATION: bool = true;

/// Unicycle that steers towards a reference point only inside the heading
/// control window. Integration fails when the commanded turn rate exceeds
/// `max_turn_rate`.
struct UnicycleRobot {
    pose: Pose2D,
    reference: (f64, f64),
    speed: f64,
    heading_gain: f64,
    max_turn_rate: f64,
    span: TimeSpan,
    steps: usize,
    window: ControlWindow,
}

impl UnicycleRobot {
    fn new(pose: Pose2D, reference: (f64, f64)) -> Self {
        let span = TimeSpan::new(0.0, 5.0);
        UnicycleRobot {
            pose,
            reference,
            speed: 2.0,
            heading_gain: 4.0,
            max_turn_rate: 3.0,
            span,
            steps: 500,
            window: ControlWindow::new(0.0, 0.5),
        }
    }
}

fn wrap_angle(a: f64) -> f64 {
    let mut a = (a + PI) % (2.0 * PI);
    if a < 0.0 {
        a += 2.0 * PI;
    }
    a - PI
}

impl Robot for UnicycleRobot {
    fn integrate(&mut self, window: ControlWindow) -> IntegrationReport {
        let dt = self.span.duration() / self.steps as f64;
        let (mut x, mut y, mut yaw) = (self.pose.x, self.pose.y, self.pose.yaw);
        let mut trajectory = Trajectory::new();
        trajectory.push(Configuration::from_cartesian(x, y, yaw));

        for i in 0..self.steps {
            let t = self.span.t_1 + i as f64 * dt;
            let omega = if t >= window.t_head_min && t <= window.t_head_max {
                let bearing = (self.reference.1 - y).atan2(self.reference.0 - x);
                self.heading_gain * wrap_angle(bearing - yaw)
            } else {
                0.0
            };
            if omega.abs() > self.max_turn_rate {
                return IntegrationReport::failed(
                    trajectory,
                    &format!("turn rate {:.2} rad/s exceeds limit at t = {:.2}", omega, t),
                );
            }
            x += self.speed * yaw.cos() * dt;
            y += self.speed * yaw.sin() * dt;
            yaw += omega * dt;
            trajectory.push(Configuration::from_cartesian(x, y, yaw));
        }

        self.window = window;
        IntegrationReport::succeeded(trajectory)
    }

    fn time_span(&self) -> TimeSpan {
        self.span
    }

    fn current_pose(&self) -> Pose2D {
        self.pose
    }

    fn control_window(&self) -> ControlWindow {
        self.window
    }
}

fn default_config() -> EnvironmentConfig {
    EnvironmentConfig {
        obstacles: vec![
            ObstacleSpec::Polygon {
                vertices: vec![[3.0, 3.0], [5.0, 3.0], [5.0, 5.0], [3.0, 5.0]],
            },
            ObstacleSpec::Polygon {
                vertices: vec![[6.0, 6.5], [8.0, 6.0], [7.5, 8.0]],
            },
            ObstacleSpec::HalfSpace {
                normals: vec![[1.0, 0.0], [-1.0, 0.0], [0.0, 1.0], [0.0, -1.0]],
                offsets: vec![-7.0, 8.0, -1.0, 3.0],
            },
        ],
        ..Default::default()
    }
}

fn main() {
    env_logger::init();
    println!("Planning environment demo start!!");

    let config = match env::args().nth(1) {
        Some(path) => match EnvironmentConfig::from_file(&path) {
            Ok(cfg) => {
                println!("Loaded config from {}", path);
                cfg
            }
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                return;
            }
        },
        None => default_config(),
    };

    let env = match Environment::from_config(&config) {
        Ok(env) => env,
        Err(e) => {
            eprintln!("Invalid environment: {}", e);
            return;
        }
    };

    let mut rng = thread_rng();
    let start = env.start();
    let mut robot = UnicycleRobot::new(
        Pose2D::new(start.x, start.y, 0.25 * PI),
        (env.goal().x, env.goal().y),
    );

    let uniform = env.sample(300, SamplingDistribution::Uniform, &robot.current_pose(), &mut rng);
    let biased = env.random_configurations(100, "N", &robot, &mut rng);
    let (mut samples, mut biased) = match (uniform, biased) {
        (Ok(u), Ok(b)) => (u, b),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Sampling failed: {}", e);
            return;
        }
    };
    println!(
        "Sampled {} uniform ({} in collision) and {} biased ({} in collision)",
        samples.len(),
        samples.collision_count(),
        biased.len(),
        biased.collision_count()
    );

    let mut vis = Visualizer::new();
    vis.set_title("Planning Environment");
    vis.plot_environment(&env);
    samples.append(&mut biased);
    vis.plot_samples(&samples);
    vis.plot_robot(&robot.current_pose(), 1.0);

    match env.draw_robot_trajectory(&mut robot, &mut rng, &CancelToken::new()) {
        Ok(result) => {
            let hit = env.is_trajectory_collision(&result.trajectory);
            println!(
                "Integration successful after {} attempts, window ({:.2}, {:.2}), collision: {}",
                result.attempts, result.window.t_head_min, result.window.t_head_max, hit
            );
            let color = if hit { colors::RED } else { colors::TRAJECTORY };
            vis.plot_trajectory(&result.trajectory, &PathStyle::new(color, "Trajectory"));
            vis.plot_checkpoints(env.checker(), &result.trajectory);
        }
        Err(e) => println!("{}", e),
    }

    if let Err(e) = vis.save_png("img/environment_demo.png", 800, 800) {
        eprintln!("Failed to save plot: {}", e);
    }
    if SHOW_ANIMATION {
        if let Err(e) = vis.show() {
            eprintln!("Failed to show plot: {}", e);
        }
    }
}
