//! Processing of policy actions into per-substep motor commands.
use crate::{MotorControlMode, SimulationParameters};
use std::f64::consts::PI;

/// Cutoff frequency of the action filter in Hz.
pub const ACTION_FILTER_CUTOFF_HZ: f64 = 4.0;

/// Largest change of a position command relative to the current motor angle, in radians.
pub const MAX_MOTOR_ANGLE_CHANGE: f64 = 0.2;

/// Turns the action of one environment step into the commands of its physics substeps.
///
/// Each stage is enabled by the corresponding flag of [`SimulationParameters`]:
/// a first-order low-pass filter on the action, linear interpolation from the previous
/// step's command over the substeps, and clipping of position commands around the
/// current motor angles.
#[derive(Clone, Debug)]
pub struct ActionProcessor {
    mode: MotorControlMode,
    num_action_repeat: usize,
    enable_filter: bool,
    enable_interpolation: bool,
    enable_clip: bool,
    alpha: f64,
    filtered: Vec<f64>,
    previous: Vec<f64>,
}

impl ActionProcessor {
    /// Creates a processor for the given parameters.
    pub fn new(params: &SimulationParameters) -> Self {
        let dt = params.env_time_step();
        let rc = 1.0 / (2.0 * PI * ACTION_FILTER_CUTOFF_HZ);
        Self {
            mode: params.motor_control_mode(),
            num_action_repeat: params.num_action_repeat(),
            enable_filter: params.enable_action_filter(),
            enable_interpolation: params.enable_action_interpolation(),
            enable_clip: params.enable_clip_motor_commands(),
            alpha: dt / (rc + dt),
            filtered: vec![],
            previous: vec![],
        }
    }

    /// Smoothing factor of the filter, in `(0, 1]`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Starts a new episode from the given command, usually the standing pose.
    pub fn reset(&mut self, initial: &[f64]) {
        self.filtered = initial.to_vec();
        self.previous = initial.to_vec();
    }

    /// Filters the action of a new environment step and returns the step's target.
    pub fn begin_step(&mut self, action: &[f64]) -> Vec<f64> {
        if !self.enable_filter || self.filtered.len() != action.len() {
            self.filtered = action.to_vec();
        } else {
            let alpha = self.alpha;
            self.filtered
                .iter_mut()
                .zip(action)
                .for_each(|(f, a)| *f += alpha * (a - *f));
        }
        self.filtered.clone()
    }

    /// Command for the `substep`-th physics step towards `target`.
    pub fn substep_command(
        &self,
        target: &[f64],
        substep: usize,
        motor_angles: &[f64],
    ) -> Vec<f64> {
        let mut command = if self.enable_interpolation && self.previous.len() == target.len() {
            let lerp = (substep + 1) as f64 / self.num_action_repeat as f64;
            self.previous
                .iter()
                .zip(target)
                .map(|(p, t)| p + lerp * (t - p))
                .collect::<Vec<_>>()
        } else {
            target.to_vec()
        };

        if self.enable_clip && self.mode == MotorControlMode::Position {
            command
                .iter_mut()
                .zip(motor_angles)
                .for_each(|(c, a)| {
                    *c = c.max(a - MAX_MOTOR_ANGLE_CHANGE).min(a + MAX_MOTOR_ANGLE_CHANGE)
                });
        }
        command
    }

    /// Finishes the environment step, remembering its target for interpolation.
    pub fn end_step(&mut self, target: Vec<f64>) {
        self.previous = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(filter: bool, interpolation: bool, clip: bool) -> SimulationParameters {
        SimulationParameters::builder()
            .num_action_repeat(4)
            .enable_action_filter(filter)
            .enable_action_interpolation(interpolation)
            .enable_clip_motor_commands(clip)
            .build()
            .unwrap()
    }

    #[test]
    fn test_pass_through_when_disabled() {
        let mut p = ActionProcessor::new(&params(false, false, false));
        p.reset(&[0.0, 0.0]);
        let target = p.begin_step(&[1.0, -1.0]);
        assert_eq!(target, vec![1.0, -1.0]);
        for i in 0..4 {
            assert_eq!(p.substep_command(&target, i, &[0.0, 0.0]), vec![1.0, -1.0]);
        }
    }

    #[test]
    fn test_interpolation_reaches_target_on_last_substep() {
        let mut p = ActionProcessor::new(&params(false, true, false));
        p.reset(&[0.0]);
        let target = p.begin_step(&[1.0]);
        assert_eq!(p.substep_command(&target, 0, &[0.0]), vec![0.25]);
        assert_eq!(p.substep_command(&target, 1, &[0.0]), vec![0.5]);
        assert_eq!(p.substep_command(&target, 3, &[0.0]), vec![1.0]);
        p.end_step(target);

        let target = p.begin_step(&[0.0]);
        assert_eq!(p.substep_command(&target, 1, &[0.0]), vec![0.5]);
    }

    #[test]
    fn test_filter_smooths_steps() {
        let mut p = ActionProcessor::new(&params(true, false, false));
        assert!(p.alpha() > 0.0 && p.alpha() < 1.0);
        p.reset(&[0.0]);
        let first = p.begin_step(&[1.0])[0];
        assert!((first - p.alpha()).abs() < 1e-12);
        let second = p.begin_step(&[1.0])[0];
        assert!(first < second && second < 1.0);

        p.reset(&[0.0]);
        assert!((p.begin_step(&[1.0])[0] - first).abs() < 1e-12);
    }

    #[test]
    fn test_clip_around_motor_angles() {
        let mut p = ActionProcessor::new(&params(false, false, true));
        p.reset(&[0.0, 0.0]);
        let target = p.begin_step(&[1.0, -0.1]);
        let command = p.substep_command(&target, 0, &[0.5, 0.0]);
        assert!((command[0] - 0.7).abs() < 1e-12);
        assert_eq!(command[1], -0.1);
    }
}
