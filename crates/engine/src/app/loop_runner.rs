use std::io;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::content::ContentError;
use crate::world::{GameWorld, GridMapError};
use crate::StartupError;

use super::metrics::MetricsAccumulator;
use super::{InputSnapshot, MetricsHandle};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    /// Upper bound on presents per second. `None` runs unpaced.
    pub max_present_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_present_fps: Some(60),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load case content: {0}")]
    Content(#[from] ContentError),
    #[error("failed to build world: {0}")]
    World(#[from] GridMapError),
    #[error("frontend failed to present frame: {0}")]
    Present(#[source] io::Error),
}

/// Input source and output sink for the loop.
pub trait Frontend {
    /// Called once per simulation tick, before `GameWorld::frame`.
    fn snapshot_for_tick(&mut self, world: &GameWorld) -> InputSnapshot;

    /// Called once per loop iteration after all ticks of that iteration ran.
    fn present(&mut self, world: &GameWorld, metrics: &MetricsHandle) -> io::Result<()>;

    fn quit_requested(&self) -> bool;
}

pub fn run_app(
    config: LoopConfig,
    world: &mut GameWorld,
    frontend: &mut dyn Frontend,
) -> Result<(), AppError> {
    let metrics_handle = MetricsHandle::default();
    run_app_with_metrics(config, world, frontend, metrics_handle)
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    world: &mut GameWorld,
    frontend: &mut dyn Frontend,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let present_cap = normalize_present_fps_cap(config.max_present_fps);
    let present_frame_target = target_frame_duration(present_cap);

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        present_fps_cap = %format_present_cap(present_cap),
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut quit_requested = false;

    while !quit_requested {
        if frontend.quit_requested() {
            info!(reason = "frontend", "shutdown_requested");
            break;
        }

        let now = Instant::now();
        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
        last_frame_instant = now;

        accumulator = accumulator.saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));
        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        let mut ticks_run = 0;
        for _ in 0..step_plan.ticks_to_run {
            let input = frontend.snapshot_for_tick(world);
            if input.quit_requested() {
                info!(reason = "quit_input", "shutdown_requested");
                quit_requested = true;
                break;
            }
            world.frame(&input);
            ticks_run += 1;
        }
        metrics_accumulator.record_ticks(ticks_run);
        accumulator = step_plan.remaining_accumulator;

        if step_plan.dropped_backlog > Duration::ZERO {
            metrics_accumulator.record_dropped_backlog(step_plan.dropped_backlog);
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        frontend
            .present(world, &metrics_handle)
            .map_err(AppError::Present)?;
        metrics_accumulator.record_frame(raw_frame_dt);

        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
            metrics_handle.publish(snapshot);
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                dropped_backlog_ms = snapshot.dropped_backlog_ms,
                frames = world.frames(),
                indoors = world.transition().is_indoors(),
                "loop_metrics"
            );
        }

        let cap_sleep = compute_cap_sleep(
            Instant::now().saturating_duration_since(now),
            present_frame_target,
        );
        if cap_sleep > Duration::ZERO {
            thread::sleep(cap_sleep);
        }
    }

    info!(
        frames = world.frames(),
        solved = world.riddles().solved_count(),
        "shutdown"
    );
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

/// Splits `accumulator` into whole ticks. Anything still owed once the cap
/// is hit is dropped rather than carried.
fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };

    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_present_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_fps: Option<u32>) -> Option<Duration> {
    max_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_present_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::InputAction;
    use crate::content::builtin_case;
    use crate::world::Viewport;

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(50), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(2));
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn normalize_non_zero_duration_replaces_zero() {
        let fallback = Duration::from_secs(1);
        assert_eq!(normalize_non_zero_duration(Duration::ZERO, fallback), fallback);
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(5), fallback),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn compute_cap_sleep_zero_when_over_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(20), target_frame_duration(Some(60)));
        assert_eq!(sleep, Duration::ZERO);
    }

    #[test]
    fn compute_cap_sleep_positive_when_under_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(5), target_frame_duration(Some(60)));
        assert!(sleep > Duration::ZERO);
    }

    #[test]
    fn normalize_present_fps_cap_disables_zero() {
        assert_eq!(normalize_present_fps_cap(Some(0)), None);
        assert_eq!(normalize_present_fps_cap(Some(60)), Some(60));
        assert_eq!(target_frame_duration(None), None);
    }

    /// Walks right on every tick and quits once enough ticks have run.
    struct WalkingFrontend {
        quit_after_ticks: u64,
        presents: u32,
        fail_present: bool,
    }

    impl Frontend for WalkingFrontend {
        fn snapshot_for_tick(&mut self, world: &GameWorld) -> InputSnapshot {
            if world.frames() >= self.quit_after_ticks {
                InputSnapshot::empty().with_action_down(InputAction::Quit, true)
            } else {
                InputSnapshot::empty().with_action_down(InputAction::MoveRight, true)
            }
        }

        fn present(&mut self, _world: &GameWorld, _metrics: &MetricsHandle) -> io::Result<()> {
            self.presents += 1;
            if self.fail_present {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            } else {
                Ok(())
            }
        }

        fn quit_requested(&self) -> bool {
            false
        }
    }

    fn world() -> GameWorld {
        GameWorld::new(builtin_case().expect("case"), 3, Viewport::default()).expect("world")
    }

    #[test]
    fn run_app_ticks_world_until_quit_input() {
        let mut world = world();
        let start = world.actor().target();
        let mut frontend = WalkingFrontend {
            quit_after_ticks: 3,
            presents: 0,
            fail_present: false,
        };

        run_app(LoopConfig::default(), &mut world, &mut frontend).expect("loop");

        assert_eq!(world.frames(), 3);
        assert_eq!(world.actor().target(), start.offset(1, 0));
        assert!(frontend.presents >= 1);
    }

    #[test]
    fn present_failure_stops_loop_with_error() {
        let mut world = world();
        let mut frontend = WalkingFrontend {
            quit_after_ticks: u64::MAX,
            presents: 0,
            fail_present: true,
        };

        let result = run_app(LoopConfig::default(), &mut world, &mut frontend);

        assert!(matches!(result, Err(AppError::Present(_))));
        assert_eq!(frontend.presents, 1);
    }
}
