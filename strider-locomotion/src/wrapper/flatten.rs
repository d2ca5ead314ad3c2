use crate::{DictObs, DictSpace, FlatObs, LocomotionEnv, LocomotionError, Robot};
use anyhow::Result;
use log::trace;
use ndarray::{concatenate, Array1, ArrayView1, Axis};
use strider_core::{record::Record, BoxSpace, Env, Step};

/// Flattens a [`DictObs`] into a single array.
///
/// Keys and lengths of the entries are recorded from the observation space when the
/// wrapper is constructed and fix the layout of every flattened observation. An
/// observation that does not follow the layout is an error.
pub struct ObsDictToArrayWrapper<E> {
    env: E,
    layout: Vec<(String, usize)>,
    space: BoxSpace,
}

impl<E> ObsDictToArrayWrapper<E>
where
    E: Env<Obs = DictObs, ObsSpace = DictSpace>,
{
    /// Wraps `env`.
    pub fn new(env: E) -> Self {
        let dict_space = env.observation_space();
        let layout = dict_space
            .0
            .iter()
            .map(|(k, s)| (k.clone(), s.dim()))
            .collect();
        let space = dict_space.flatten();
        Self { env, layout, space }
    }

    /// Keys and lengths of the entries of a flattened observation, in order.
    pub fn layout(&self) -> &[(String, usize)] {
        &self.layout
    }

    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Concatenates the entries of `obs` in the recorded order.
    pub fn flatten(&self, obs: &DictObs) -> Result<FlatObs> {
        let keys = obs.keys();
        if keys.len() != self.layout.len()
            || keys.iter().zip(self.layout.iter()).any(|(k, (l, _))| k != l)
        {
            return Err(LocomotionError::ObservationKeyMismatch {
                expected: self.layout.iter().map(|(k, _)| k.clone()).collect(),
                found: keys,
            }
            .into());
        }
        for ((key, v), (_, n)) in obs.0.iter().zip(self.layout.iter()) {
            if v.len() != *n {
                return Err(LocomotionError::ObservationShapeMismatch {
                    key: key.clone(),
                    expected: *n,
                    found: v.len(),
                }
                .into());
            }
        }
        let views = obs.0.iter().map(|(_, v)| v.view()).collect::<Vec<ArrayView1<f32>>>();
        let flat = if views.is_empty() {
            Array1::zeros(0)
        } else {
            concatenate(Axis(0), &views)?
        };
        Ok(FlatObs(flat))
    }

    /// Splits a flattened observation back into its entries.
    pub fn unflatten(&self, obs: &FlatObs) -> Result<DictObs> {
        let total = self.layout.iter().map(|(_, n)| n).sum::<usize>();
        if obs.0.len() != total {
            return Err(LocomotionError::ObservationShapeMismatch {
                key: String::new(),
                expected: total,
                found: obs.0.len(),
            }
            .into());
        }
        let mut offset = 0;
        let entries = self
            .layout
            .iter()
            .map(|(k, n)| {
                let v = obs.0.slice(ndarray::s![offset..offset + n]).to_owned();
                offset += n;
                (k.clone(), v)
            })
            .collect();
        Ok(DictObs(entries))
    }
}

impl<E> LocomotionEnv for ObsDictToArrayWrapper<E>
where
    E: LocomotionEnv,
{
    fn env_time_step(&self) -> f64 {
        self.env.env_time_step()
    }

    fn robot(&self) -> &dyn Robot {
        self.env.robot()
    }
}

impl<E> Env for ObsDictToArrayWrapper<E>
where
    E: Env<Obs = DictObs, ObsSpace = DictSpace>,
{
    type Obs = FlatObs;
    type Act = E::Act;
    type Info = E::Info;
    type ObsSpace = BoxSpace;

    fn reset(&mut self) -> Result<FlatObs> {
        trace!("ObsDictToArrayWrapper::reset()");
        let obs = self.env.reset()?;
        self.flatten(&obs)
    }

    fn step(&mut self, a: &E::Act) -> Result<(Step<Self>, Record)> {
        trace!("ObsDictToArrayWrapper::step()");
        let (step, record) = self.env.step(a)?;
        let obs = self.flatten(&step.obs)?;
        let init_obs = match &step.init_obs {
            Some(o) => Some(self.flatten(o)?),
            None => None,
        };
        let mut flat = Step::<Self>::new(
            obs,
            step.act,
            step.reward,
            step.is_terminated,
            step.is_truncated,
            step.info,
        );
        flat.init_obs = init_obs;
        Ok((flat, record))
    }

    fn observation_space(&self) -> BoxSpace {
        self.space.clone()
    }

    fn action_space(&self) -> BoxSpace {
        self.env.action_space()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strider_core::{Act, Info};

    #[derive(Clone, Debug)]
    struct UnitAct;

    impl Act for UnitAct {
        fn len(&self) -> usize {
            0
        }
    }

    struct UnitInfo;

    impl Info for UnitInfo {}

    /// Emits fixed observations; drops the last entry from step `drop_from` on.
    struct FixedEnv {
        drop_from: Option<usize>,
        short: bool,
        steps: usize,
    }

    impl FixedEnv {
        fn new(drop_from: Option<usize>, short: bool) -> Self {
            Self {
                drop_from,
                short,
                steps: 0,
            }
        }

        fn obs(&self) -> DictObs {
            let mut entries = vec![
                ("b".to_string(), Array1::from(vec![1.0, 2.0])),
                ("a".to_string(), Array1::from(vec![3.0])),
                ("c".to_string(), Array1::from(vec![4.0, 5.0, 6.0])),
            ];
            if matches!(self.drop_from, Some(n) if self.steps >= n) {
                entries.pop();
            }
            if self.short {
                entries[0].1 = Array1::from(vec![1.0]);
            }
            DictObs(entries)
        }
    }

    impl Env for FixedEnv {
        type Obs = DictObs;
        type Act = UnitAct;
        type Info = UnitInfo;
        type ObsSpace = DictSpace;

        fn reset(&mut self) -> Result<DictObs> {
            self.steps = 0;
            Ok(self.obs())
        }

        fn step(&mut self, a: &UnitAct) -> Result<(Step<Self>, Record)> {
            self.steps += 1;
            let step = Step::<Self>::new(self.obs(), a.clone(), 1.0, false, false, UnitInfo);
            Ok((step, Record::empty()))
        }

        fn observation_space(&self) -> DictSpace {
            DictSpace(vec![
                ("b".to_string(), BoxSpace::symmetric(&[10.0, 10.0])),
                ("a".to_string(), BoxSpace::symmetric(&[10.0])),
                ("c".to_string(), BoxSpace::symmetric(&[10.0, 10.0, 10.0])),
            ])
        }

        fn action_space(&self) -> BoxSpace {
            BoxSpace::symmetric(&[])
        }
    }

    #[test]
    fn test_flatten_keeps_insertion_order() -> Result<()> {
        let mut env = ObsDictToArrayWrapper::new(FixedEnv::new(None, false));
        assert_eq!(env.observation_space().dim(), 6);
        let obs = env.reset()?;
        assert_eq!(obs.0.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(
            env.layout(),
            &[
                ("b".to_string(), 2),
                ("a".to_string(), 1),
                ("c".to_string(), 3)
            ]
        );
        Ok(())
    }

    #[test]
    fn test_unflatten_restores_entries() -> Result<()> {
        let mut env = ObsDictToArrayWrapper::new(FixedEnv::new(None, false));
        let (step, _) = env.step(&UnitAct)?;
        let dict = env.unflatten(&step.obs)?;
        assert_eq!(dict, env.inner().obs());
        assert!(env.unflatten(&FlatObs(Array1::zeros(4))).is_err());
        Ok(())
    }

    #[test]
    fn test_changed_keys_fail() {
        let mut env = ObsDictToArrayWrapper::new(FixedEnv::new(Some(0), false));
        let err = env.reset().err().unwrap();
        assert_eq!(
            err.downcast_ref::<LocomotionError>(),
            Some(&LocomotionError::ObservationKeyMismatch {
                expected: vec!["b".to_string(), "a".to_string(), "c".to_string()],
                found: vec!["b".to_string(), "a".to_string()],
            })
        );
    }

    #[test]
    fn test_key_dropped_mid_episode_fails() -> Result<()> {
        let mut env = ObsDictToArrayWrapper::new(FixedEnv::new(Some(2), false));
        env.reset()?;
        let (step, _) = env.step(&UnitAct)?;
        assert_eq!(step.obs.0.len(), 6);

        let err = env.step(&UnitAct).err().unwrap();
        assert_eq!(
            err.downcast_ref::<LocomotionError>(),
            Some(&LocomotionError::ObservationKeyMismatch {
                expected: vec!["b".to_string(), "a".to_string(), "c".to_string()],
                found: vec!["b".to_string(), "a".to_string()],
            })
        );
        Ok(())
    }

    #[test]
    fn test_changed_shape_fails() {
        let mut env = ObsDictToArrayWrapper::new(FixedEnv::new(None, true));
        let err = env.step(&UnitAct).err().unwrap();
        assert_eq!(
            err.downcast_ref::<LocomotionError>(),
            Some(&LocomotionError::ObservationShapeMismatch {
                key: "b".to_string(),
                expected: 2,
                found: 1,
            })
        );
    }
}
