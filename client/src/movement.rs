//! Local vessel integration: held input in, pose out.

use crate::navigation::NavigationMask;
use crate::scene::{Effect, SceneSink};
use shared::{
    heading_direction, ACCELERATION, BRAKE, MAX_SPEED, SPEED_DECAY, TURN_SPEED,
    WAKE_SPEED_THRESHOLD,
};

/// Directional keys held during a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFlags {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub heading: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Accepted,
    /// The candidate left the mask; position stayed put.
    Rejected,
}

#[derive(Debug, Clone, Default)]
pub struct MovementSimulator {
    speed: f32,
}

impl MovementSimulator {
    pub fn new() -> Self {
        Self { speed: 0.0 }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn stop(&mut self) {
        self.speed = 0.0;
    }

    /// Advances one frame. Increments are per frame, not per second.
    pub fn step(
        &mut self,
        pose: &mut Pose,
        input: InputFlags,
        mask: &NavigationMask,
        scene: &mut dyn SceneSink,
    ) -> MoveOutcome {
        if input.forward {
            self.speed += ACCELERATION;
        } else if input.backward {
            self.speed -= BRAKE;
        } else {
            self.speed *= SPEED_DECAY;
        }
        self.speed = self.speed.clamp(-MAX_SPEED, MAX_SPEED);

        if input.left {
            pose.heading += TURN_SPEED;
        }
        if input.right {
            pose.heading -= TURN_SPEED;
        }

        let (dx, dy) = heading_direction(pose.heading);
        let candidate_x = pose.x + dx * self.speed;
        let candidate_y = pose.y + dy * self.speed;

        if !mask.contains(candidate_x, candidate_y) {
            return MoveOutcome::Rejected;
        }

        pose.x = candidate_x;
        pose.y = candidate_y;

        if self.speed.abs() > WAKE_SPEED_THRESHOLD {
            scene.spawn_effect(Effect::Wake {
                x: pose.x,
                y: pose.y,
            });
        }

        MoveOutcome::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneRecorder;
    use assert_approx_eq::assert_approx_eq;
    use shared::Aabb;

    const FORWARD: InputFlags = InputFlags {
        forward: true,
        backward: false,
        left: false,
        right: false,
    };

    const BACKWARD: InputFlags = InputFlags {
        forward: false,
        backward: true,
        left: false,
        right: false,
    };

    #[test]
    fn test_forward_speed_never_exceeds_max() {
        let mut sim = MovementSimulator::new();
        let mut pose = Pose::default();
        let mask = NavigationMask::arena();
        let mut scene = SceneRecorder::new();

        for _ in 0..200 {
            sim.step(&mut pose, FORWARD, &mask, &mut scene);
            assert!(sim.speed() <= MAX_SPEED);
        }
        assert_approx_eq!(sim.speed(), MAX_SPEED, 1e-6);
    }

    #[test]
    fn test_backward_speed_never_below_negative_max() {
        let mut sim = MovementSimulator::new();
        let mut pose = Pose::default();
        let mask = NavigationMask::arena();
        let mut scene = SceneRecorder::new();

        for _ in 0..200 {
            sim.step(&mut pose, BACKWARD, &mask, &mut scene);
            assert!(sim.speed() >= -MAX_SPEED);
        }
        assert_approx_eq!(sim.speed(), -MAX_SPEED, 1e-6);
    }

    #[test]
    fn test_braking_is_faster_than_accelerating() {
        let mask = NavigationMask::arena();
        let mut scene = SceneRecorder::new();

        let mut sim = MovementSimulator::new();
        let mut pose = Pose::default();
        for _ in 0..10 {
            sim.step(&mut pose, FORWARD, &mask, &mut scene);
        }
        assert_approx_eq!(sim.speed(), MAX_SPEED, 1e-6);

        // A single brake frame wipes out ten frames of acceleration.
        sim.step(&mut pose, BACKWARD, &mask, &mut scene);
        assert_approx_eq!(sim.speed(), -MAX_SPEED, 1e-6);
    }

    #[test]
    fn test_coasting_decays_speed() {
        let mut sim = MovementSimulator::new();
        let mut pose = Pose::default();
        let mask = NavigationMask::arena();
        let mut scene = SceneRecorder::new();

        for _ in 0..10 {
            sim.step(&mut pose, FORWARD, &mask, &mut scene);
        }
        sim.step(&mut pose, InputFlags::default(), &mask, &mut scene);
        assert_approx_eq!(sim.speed(), MAX_SPEED * SPEED_DECAY, 1e-6);
    }

    #[test]
    fn test_turning_is_independent_of_speed() {
        let mut sim = MovementSimulator::new();
        let mut pose = Pose::default();
        let mask = NavigationMask::arena();
        let mut scene = SceneRecorder::new();

        let input = InputFlags {
            left: true,
            ..InputFlags::default()
        };
        for _ in 0..90 {
            sim.step(&mut pose, input, &mask, &mut scene);
        }
        assert_approx_eq!(pose.heading, std::f32::consts::FRAC_PI_2, 1e-4);
        assert_approx_eq!(pose.x, 0.0, 1e-6);
        assert_approx_eq!(pose.y, 0.0, 1e-6);
    }

    #[test]
    fn test_forward_moves_along_heading() {
        let mut sim = MovementSimulator::new();
        let mut pose = Pose::default();
        let mask = NavigationMask::arena();
        let mut scene = SceneRecorder::new();

        sim.step(&mut pose, FORWARD, &mask, &mut scene);
        assert_approx_eq!(pose.x, 0.0, 1e-6);
        assert_approx_eq!(pose.y, ACCELERATION, 1e-6);
    }

    #[test]
    fn test_rejected_move_keeps_position_and_speed() {
        let mut sim = MovementSimulator::new();
        let mask = NavigationMask::new(vec![Aabb::from_center(0.0, 0.0, 1.0, 1.0)]);
        let mut scene = SceneRecorder::new();
        let mut pose = Pose {
            x: 0.0,
            y: 0.999,
            heading: 0.0,
        };

        for _ in 0..5 {
            sim.step(&mut pose, FORWARD, &mask, &mut scene);
        }
        let before = pose;
        let outcome = sim.step(&mut pose, FORWARD, &mask, &mut scene);

        assert_eq!(outcome, MoveOutcome::Rejected);
        assert_eq!(pose.x, before.x);
        assert_eq!(pose.y, before.y);
        assert!(sim.speed() > 0.0);
    }

    #[test]
    fn test_wake_only_above_threshold() {
        let mut sim = MovementSimulator::new();
        let mut pose = Pose::default();
        let mask = NavigationMask::arena();
        let mut scene = SceneRecorder::new();

        // 0.005 and 0.010 are not above the threshold, 0.015 is.
        sim.step(&mut pose, FORWARD, &mask, &mut scene);
        sim.step(&mut pose, FORWARD, &mask, &mut scene);
        assert!(scene.effects.is_empty());
        sim.step(&mut pose, FORWARD, &mask, &mut scene);
        assert!(matches!(scene.effects.last(), Some(Effect::Wake { .. })));
    }
}
