#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Continuous waypoint-follow demo.
//!
//! A single entity glides along a fixed polyline at constant speed, pausing,
//! finishing at the last waypoint, and resetting on request. Positions are
//! expressed in window pixels.

use std::time::Duration;

use glam::Vec2;
use tracing::info;

/// Default travel speed in pixels per second.
pub const DEFAULT_SPEED: f32 = 220.0;

/// Moves `current` toward `target` by at most `max_step` pixels.
///
/// Snaps onto `target` when it is within reach or already reached.
#[must_use]
pub fn move_toward(current: Vec2, target: Vec2, max_step: f32) -> Vec2 {
    let to_target = target - current;
    let distance = to_target.length();
    if distance <= max_step || distance == 0.0 {
        return target;
    }
    current + to_target / distance * max_step
}

/// Coarse state of the follower shown by the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FollowStatus {
    /// The entity is travelling toward its target waypoint.
    Running,
    /// Travel is suspended until the pause is toggled again.
    Paused,
    /// The entity reached the final waypoint.
    Finished,
}

impl FollowStatus {
    /// Upper-case label shown by adapters.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::Finished => "FINISHED",
        }
    }
}

/// Entity following a fixed path of waypoints.
#[derive(Clone, Debug, PartialEq)]
pub struct WaypointFollower {
    path: Vec<Vec2>,
    speed: f32,
    position: Vec2,
    target_index: usize,
    paused: bool,
    finished: bool,
}

impl Default for WaypointFollower {
    fn default() -> Self {
        Self::new(default_path(), DEFAULT_SPEED)
    }
}

impl WaypointFollower {
    /// Creates a follower positioned at the first waypoint.
    ///
    /// A path with fewer than two waypoints starts out finished.
    #[must_use]
    pub fn new(path: Vec<Vec2>, speed: f32) -> Self {
        let position = path.first().copied().unwrap_or(Vec2::ZERO);
        let finished = path.len() < 2;
        Self {
            path,
            speed: speed.max(0.0),
            position,
            target_index: 1,
            paused: false,
            finished,
        }
    }

    /// Waypoints in travel order; the last one is the end point.
    #[must_use]
    pub fn path(&self) -> &[Vec2] {
        &self.path
    }

    /// Current entity position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Index of the waypoint the entity is heading to.
    #[must_use]
    pub const fn target_index(&self) -> usize {
        self.target_index
    }

    /// Waypoint the entity is heading to, absent once finished.
    #[must_use]
    pub fn target(&self) -> Option<Vec2> {
        if self.finished {
            return None;
        }
        self.path.get(self.target_index).copied()
    }

    /// Coarse follower state.
    #[must_use]
    pub const fn status(&self) -> FollowStatus {
        if self.paused {
            FollowStatus::Paused
        } else if self.finished {
            FollowStatus::Finished
        } else {
            FollowStatus::Running
        }
    }

    /// Flips the pause flag.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Returns to the first waypoint and resumes travel.
    pub fn reset(&mut self) {
        self.position = self.path.first().copied().unwrap_or(Vec2::ZERO);
        self.target_index = 1;
        self.paused = false;
        self.finished = self.path.len() < 2;
    }

    /// Advances the entity by `dt` worth of travel.
    ///
    /// At most one waypoint is reached per update; reaching the last one
    /// finishes the follow.
    pub fn update(&mut self, dt: Duration) {
        if self.paused || self.finished {
            return;
        }
        let Some(target) = self.path.get(self.target_index).copied() else {
            self.finished = true;
            return;
        };

        let step = self.speed * dt.as_secs_f32();
        self.position = move_toward(self.position, target, step);
        if self.position != target {
            return;
        }

        if self.target_index + 1 < self.path.len() {
            self.target_index += 1;
        } else {
            self.finished = true;
            info!(x = target.x, y = target.y, "waypoint follow finished");
        }
    }
}

/// Fixed six-point route ending at the lower right of a 1000x600 window.
#[must_use]
pub fn default_path() -> Vec<Vec2> {
    vec![
        Vec2::new(120.0, 450.0),
        Vec2::new(200.0, 180.0),
        Vec2::new(420.0, 160.0),
        Vec2::new(650.0, 260.0),
        Vec2::new(820.0, 120.0),
        Vec2::new(880.0, 420.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_toward_snaps_when_within_reach() {
        let target = Vec2::new(3.0, 4.0);
        assert_eq!(move_toward(Vec2::ZERO, target, 5.0), target);
        assert_eq!(move_toward(target, target, 0.0), target);
    }

    #[test]
    fn move_toward_limits_step_length() {
        let next = move_toward(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.5);
        assert!((next - Vec2::new(2.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn follower_walks_the_path_and_finishes() {
        let path = vec![Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];
        let mut follower = WaypointFollower::new(path, 10.0);
        assert_eq!(follower.status(), FollowStatus::Running);

        follower.update(Duration::from_millis(500));
        assert!((follower.position() - Vec2::new(5.0, 0.0)).length() < 1e-4);
        assert_eq!(follower.target_index(), 1);

        follower.update(Duration::from_millis(600));
        assert_eq!(follower.position(), Vec2::new(10.0, 0.0));
        assert_eq!(follower.target_index(), 2);

        follower.update(Duration::from_secs(2));
        assert_eq!(follower.position(), Vec2::new(10.0, 10.0));
        assert_eq!(follower.status(), FollowStatus::Finished);
        assert_eq!(follower.target(), None);
    }

    #[test]
    fn pause_and_reset() {
        let mut follower = WaypointFollower::default();
        let start = follower.position();
        follower.toggle_pause();
        follower.update(Duration::from_secs(1));
        assert_eq!(follower.position(), start);
        assert_eq!(follower.status(), FollowStatus::Paused);

        follower.toggle_pause();
        follower.update(Duration::from_millis(100));
        assert_ne!(follower.position(), start);

        follower.reset();
        assert_eq!(follower.position(), start);
        assert_eq!(follower.target_index(), 1);
        assert_eq!(follower.status(), FollowStatus::Running);
    }

    #[test]
    fn single_point_path_is_finished() {
        let follower = WaypointFollower::new(vec![Vec2::new(1.0, 1.0)], 5.0);
        assert_eq!(follower.status(), FollowStatus::Finished);
    }
}
