//! Objectives built from network settings.
//!
//! A setting exposes the standard bound over theta alone; a [`SettingNew`]
//! additionally exposes the Lyapunov bound over theta followed by one extra
//! exponent per hop. Both are plugged into the same [`Optimize`] facade, so
//! every strategy works on either without change.
use super::{Optimize, OptimizerConfig};
use crate::error::ObjectiveError;
use crate::optimization::Objective;

/// A network scenario with a standard MGF bound.
pub trait Setting {
    /// Bound as a function of `[theta]`.
    fn bound(&self, param_list: &[f64]) -> Result<f64, ObjectiveError>;
}

/// A scenario that also offers the Lyapunov bound.
pub trait SettingNew: Setting {
    /// Bound as a function of `[theta, l_1, ..., l_L]`.
    fn new_bound(&self, param_l_list: &[f64]) -> Result<f64, ObjectiveError>;
}

/// Standard bound of a setting as an objective
pub struct StandardBound<'s, S: ?Sized> {
    setting: &'s S,
}

impl<'s, S: Setting + ?Sized> StandardBound<'s, S> {
    pub fn new(setting: &'s S) -> Self {
        Self { setting }
    }
}

impl<S: Setting + ?Sized> Objective for StandardBound<'_, S> {
    fn value(&self, params: &[f64]) -> Result<f64, ObjectiveError> {
        self.setting.bound(params)
    }
}

/// Lyapunov bound of a setting as an objective
///
/// With `new == false` it falls back to the standard bound, which lets one
/// facade type drive both halves of a comparison.
pub struct LyapunovBound<'s, S: ?Sized> {
    setting: &'s S,
    new: bool,
}

impl<'s, S: SettingNew + ?Sized> LyapunovBound<'s, S> {
    pub fn new(setting: &'s S, new: bool) -> Self {
        Self { setting, new }
    }

    pub fn is_new(&self) -> bool {
        self.new
    }
}

impl<S: SettingNew + ?Sized> Objective for LyapunovBound<'_, S> {
    fn value(&self, params: &[f64]) -> Result<f64, ObjectiveError> {
        if self.new {
            self.setting.new_bound(params)
        } else {
            self.setting.bound(params)
        }
    }
}

impl<'s, S: Setting + ?Sized> Optimize<StandardBound<'s, S>> {
    /// Facade over the standard bound of `setting`.
    pub fn standard(setting: &'s S, config: OptimizerConfig) -> Self {
        Optimize::with_config(StandardBound::new(setting), config)
    }
}

impl<'s, S: SettingNew + ?Sized> Optimize<LyapunovBound<'s, S>> {
    /// Facade over the Lyapunov bound of `setting`.
    pub fn lyapunov(setting: &'s S, config: OptimizerConfig) -> Self {
        Optimize::with_config(LyapunovBound::new(setting, true), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// new_bound = bound(theta) * l, so l = 1 reproduces the standard bound
    struct Scaled;

    impl Setting for Scaled {
        fn bound(&self, param_list: &[f64]) -> Result<f64, ObjectiveError> {
            let theta = param_list[0];
            if theta <= 0.0 {
                return Err(ObjectiveError::ParameterOutOfBounds("theta <= 0".into()));
            }
            Ok(theta + 1.0 / theta)
        }
    }

    impl SettingNew for Scaled {
        fn new_bound(&self, param_l_list: &[f64]) -> Result<f64, ObjectiveError> {
            Ok(self.bound(&param_l_list[..1])? * param_l_list[1])
        }
    }

    #[test]
    fn lyapunov_objective_dispatches_on_flag() {
        assert_eq!(LyapunovBound::new(&Scaled, true).value(&[1.0, 3.0]).unwrap(), 6.0);
        assert_eq!(LyapunovBound::new(&Scaled, false).value(&[1.0]).unwrap(), 2.0);
    }

    #[test]
    fn lyapunov_facade_targets_the_new_bound() {
        let optimize = Optimize::lyapunov(&Scaled, OptimizerConfig::default());
        assert!(optimize.objective().is_new());
        assert_eq!(optimize.evaluate(&[1.0, 0.5]).unwrap(), 1.0);
    }

    #[test]
    fn both_facades_share_the_strategies() {
        let standard = Optimize::standard(&Scaled, OptimizerConfig::default());
        let lyapunov = Optimize::lyapunov(&Scaled, OptimizerConfig::default());

        let s = standard.grid_search(&[(0.1, 4.0)], 0.1).unwrap();
        let l = lyapunov.grid_search(&[(0.1, 4.0), (0.9, 4.0)], 0.1).unwrap();

        assert!((s.value - 2.0).abs() < 1e-9);
        assert!((l.value - 1.8).abs() < 1e-9);
        assert_eq!(l.params.len(), 2);
    }

    #[test]
    fn trait_objects_work_as_settings() {
        let setting: &dyn SettingNew = &Scaled;
        let optimize = Optimize::lyapunov(setting, OptimizerConfig::default());
        assert!(optimize.evaluate(&[0.0, 1.0]).is_err());
    }
}
