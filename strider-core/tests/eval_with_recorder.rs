use anyhow::Result;
use strider_core::{
    record::{BufferedRecorder, NullRecorder, Record},
    util::eval_with_recorder,
    Act, BoxSpace, Env, Obs, Policy, Step,
};
use test_log::test;

#[derive(Clone, Debug, PartialEq)]
struct CounterObs(usize);

impl Obs for CounterObs {
    fn len(&self) -> usize {
        1
    }
}

#[derive(Clone, Debug)]
struct Increment(usize);

impl Act for Increment {
    fn len(&self) -> usize {
        1
    }
}

/// Counts up by the action; the episode terminates at `goal`.
struct CounterEnv {
    count: usize,
    goal: usize,
    n_resets: usize,
}

impl Env for CounterEnv {
    type Obs = CounterObs;
    type Act = Increment;
    type Info = ();
    type ObsSpace = BoxSpace;

    fn reset(&mut self) -> Result<CounterObs> {
        self.count = 0;
        self.n_resets += 1;
        Ok(CounterObs(0))
    }

    fn step(&mut self, a: &Increment) -> Result<(Step<Self>, Record)> {
        self.count += a.0;
        let done = self.count >= self.goal;
        let step = Step::<Self>::new(CounterObs(self.count), a.clone(), 1.0, done, false, ());
        Ok((step, Record::from_scalar("count", self.count as f32)))
    }

    fn observation_space(&self) -> BoxSpace {
        BoxSpace::symmetric(&[self.goal as f32])
    }

    fn action_space(&self) -> BoxSpace {
        BoxSpace::symmetric(&[1.0])
    }
}

struct Constant(usize);

impl Policy<CounterEnv> for Constant {
    fn sample(&mut self, _obs: &CounterObs) -> Increment {
        Increment(self.0)
    }
}

fn env(goal: usize) -> CounterEnv {
    CounterEnv {
        count: 0,
        goal,
        n_resets: 0,
    }
}

#[test]
fn test_step_with_reset_sets_init_obs() -> Result<()> {
    let mut env = env(2);
    env.reset()?;
    let (step, _) = env.step_with_reset(&Increment(1))?;
    assert!(step.init_obs.is_none());
    let (step, _) = env.step_with_reset(&Increment(1))?;
    assert!(step.is_terminated);
    assert_eq!(step.obs, CounterObs(2));
    assert_eq!(step.init_obs, Some(CounterObs(0)));
    assert_eq!(env.n_resets, 2);
    Ok(())
}

#[test]
fn test_eval_records_every_step() -> Result<()> {
    let mut env = env(3);
    let mut recorder = BufferedRecorder::new();
    let returns = eval_with_recorder(&mut env, &mut Constant(1), 2, None, &mut recorder)?;
    assert_eq!(returns, vec![3.0, 3.0]);
    assert_eq!(recorder.len(), 6);

    let records = recorder.iter().collect::<Vec<_>>();
    assert_eq!(records[4].get_scalar("episode")?, 1.0);
    assert_eq!(records[4].get_scalar("step")?, 1.0);
    assert_eq!(records[4].get_scalar("count")?, 2.0);
    assert_eq!(records[4].get_scalar("reward")?, 1.0);
    Ok(())
}

#[test]
fn test_eval_stops_at_max_steps() -> Result<()> {
    let mut env = env(100);
    let returns = eval_with_recorder(&mut env, &mut Constant(1), 3, Some(5), &mut NullRecorder {})?;
    assert_eq!(returns, vec![5.0; 3]);
    assert_eq!(env.n_resets, 3);
    Ok(())
}
