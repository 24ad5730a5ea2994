//! Idle auto-rotate state machine and float animation
//!
//! The state machine holds at most one pending deadline. Arming a new
//! deadline replaces the old one, and interaction or teardown cancels it.

/// Auto-rotate states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoRotateState {
    /// Not rotating; a deadline may be pending
    #[default]
    IdleSettled,
    /// The user is dragging the view
    UserInteracting,
    /// Rotating on its own
    AutoRotating,
}

/// Auto-rotate scheduling for one mounted scene
#[derive(Debug, Clone)]
pub struct AutoRotate {
    state: AutoRotateState,
    deadline: Option<f64>,
    idle_delay: f64,
}

impl AutoRotate {
    /// Create an unmounted state machine with the given inactivity window
    pub fn new(idle_delay: f64) -> Self {
        Self {
            state: AutoRotateState::IdleSettled,
            deadline: None,
            idle_delay: idle_delay.max(0.0),
        }
    }

    /// Current state
    pub fn state(&self) -> AutoRotateState {
        self.state
    }

    /// Pending deadline, if any
    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// Whether the scene should rotate this frame
    pub fn is_rotating(&self) -> bool {
        self.state == AutoRotateState::AutoRotating
    }

    /// Scene mounted: settle and arm the timer
    pub fn mount(&mut self, now: f64) {
        self.state = AutoRotateState::IdleSettled;
        self.arm(now);
    }

    /// Pointer pressed on the view
    pub fn begin_interaction(&mut self) {
        if self.state != AutoRotateState::UserInteracting {
            tracing::trace!("Auto-rotate: user interacting");
        }
        self.state = AutoRotateState::UserInteracting;
        self.deadline = None;
    }

    /// Pointer released: rotate again after the inactivity window
    pub fn end_interaction(&mut self, now: f64) {
        if self.state == AutoRotateState::UserInteracting {
            self.state = AutoRotateState::IdleSettled;
            self.arm(now);
        }
    }

    /// Fire the deadline if it has passed. Returns true on the transition
    /// into [`AutoRotateState::AutoRotating`].
    pub fn update(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline && self.state == AutoRotateState::IdleSettled => {
                self.deadline = None;
                self.state = AutoRotateState::AutoRotating;
                tracing::trace!("Auto-rotate: rotating");
                true
            }
            _ => false,
        }
    }

    /// Scene torn down: cancel anything pending
    pub fn teardown(&mut self) {
        self.deadline = None;
        self.state = AutoRotateState::IdleSettled;
    }

    fn arm(&mut self, now: f64) {
        self.deadline = Some(now + self.idle_delay);
    }
}

/// Smoothed vertical float offset of the model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatAnimator {
    /// Current offset
    pub offset: f32,
    amplitude: f32,
    frequency: f32,
    float_lerp: f32,
    settle_lerp: f32,
}

impl FloatAnimator {
    /// Create an animator at rest
    pub fn new(amplitude: f32, frequency: f32, float_lerp: f32, settle_lerp: f32) -> Self {
        Self {
            offset: 0.0,
            amplitude,
            frequency,
            float_lerp: float_lerp.clamp(0.0, 1.0),
            settle_lerp: settle_lerp.clamp(0.0, 1.0),
        }
    }

    /// Advance one frame. `time` is the elapsed scene time in seconds.
    pub fn update(&mut self, floating: bool, time: f64) -> f32 {
        let (target, factor) = if floating {
            (
                (time as f32 * self.frequency).sin() * self.amplitude,
                self.float_lerp,
            )
        } else {
            (0.0, self.settle_lerp)
        };
        self.offset += (target - self.offset) * factor;
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_arms_timer() {
        let mut rotate = AutoRotate::new(2.0);
        assert_eq!(rotate.deadline(), None);
        rotate.mount(1.0);
        assert_eq!(rotate.state(), AutoRotateState::IdleSettled);
        assert_eq!(rotate.deadline(), Some(3.0));

        assert!(!rotate.update(2.9));
        assert!(rotate.update(3.0));
        assert!(rotate.is_rotating());
        assert_eq!(rotate.deadline(), None);
        assert!(!rotate.update(4.0));
    }

    #[test]
    fn test_interaction_cancels_timer() {
        let mut rotate = AutoRotate::new(2.0);
        rotate.mount(0.0);
        rotate.begin_interaction();
        assert_eq!(rotate.state(), AutoRotateState::UserInteracting);
        assert_eq!(rotate.deadline(), None);
        assert!(!rotate.update(10.0));
    }

    #[test]
    fn test_interaction_stops_rotation() {
        let mut rotate = AutoRotate::new(2.0);
        rotate.mount(0.0);
        rotate.update(2.0);
        assert!(rotate.is_rotating());

        rotate.begin_interaction();
        assert!(!rotate.is_rotating());
        rotate.end_interaction(5.0);
        assert_eq!(rotate.state(), AutoRotateState::IdleSettled);
        assert!(!rotate.update(6.9));
        assert!(rotate.update(7.0));
    }

    #[test]
    fn test_rearm_replaces_deadline() {
        let mut rotate = AutoRotate::new(2.0);
        rotate.mount(0.0);
        rotate.begin_interaction();
        rotate.end_interaction(1.0);
        rotate.begin_interaction();
        rotate.end_interaction(1.5);
        assert_eq!(rotate.deadline(), Some(3.5));
        assert!(!rotate.update(3.0));
        assert!(rotate.update(3.5));
    }

    #[test]
    fn test_end_without_begin_is_ignored() {
        let mut rotate = AutoRotate::new(2.0);
        rotate.mount(0.0);
        rotate.update(2.0);
        rotate.end_interaction(3.0);
        assert!(rotate.is_rotating());
        assert_eq!(rotate.deadline(), None);
    }

    #[test]
    fn test_teardown_cancels() {
        let mut rotate = AutoRotate::new(2.0);
        rotate.mount(0.0);
        rotate.teardown();
        assert_eq!(rotate.deadline(), None);
        assert!(!rotate.update(100.0));
    }

    #[test]
    fn test_float_settles_to_rest() {
        let mut float = FloatAnimator::new(0.15, 0.5, 0.02, 0.1);
        for frame in 0..600 {
            float.update(true, 3.0 + frame as f64 / 60.0);
        }
        assert!(float.offset.abs() <= 0.15);
        assert!(float.offset.abs() > 0.0);

        for _ in 0..300 {
            float.update(false, 0.0);
        }
        assert!(float.offset.abs() < 1e-6);
    }

    #[test]
    fn test_float_moves_toward_target() {
        let mut float = FloatAnimator::new(0.15, 0.5, 0.02, 0.1);
        let time = std::f64::consts::PI; // sin(pi * 0.5) = 1
        let offset = float.update(true, time);
        assert!((offset - 0.15 * 0.02).abs() < 1e-6);
    }
}
