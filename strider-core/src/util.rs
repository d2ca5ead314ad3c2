//! Utilities for interaction of policies and environments.
use crate::{
    record::{RecordValue, Recorder},
    Env, Policy,
};
use anyhow::Result;
use log::info;

/// Run episodes with a policy and a recorder, returning the return of each episode.
///
/// Every step's [`Record`](crate::record::Record) is extended with `episode`, `step` and
/// `reward` before it is handed to `recorder`. An episode ends when the environment
/// reports termination or truncation, or after `max_steps` steps if given.
pub fn eval_with_recorder<E, P, R>(
    env: &mut E,
    policy: &mut P,
    n_episodes: usize,
    max_steps: Option<usize>,
    recorder: &mut R,
) -> Result<Vec<f32>>
where
    E: Env,
    P: Policy<E>,
    R: Recorder,
{
    let mut rs = Vec::with_capacity(n_episodes);

    for episode in 0..n_episodes {
        let mut prev_obs = env.reset()?;
        let mut count_step = 0;
        let mut r_total = 0.0;

        loop {
            let act = policy.sample(&prev_obs);
            let (step, mut record) = env.step(&act)?;
            r_total += step.reward;

            record.insert("reward", RecordValue::Scalar(step.reward));
            record.insert("episode", RecordValue::Scalar(episode as _));
            record.insert("step", RecordValue::Scalar(count_step as _));
            recorder.write(record);

            count_step += 1;
            let out_of_steps = max_steps.map_or(false, |m| count_step >= m);
            if step.is_done() || out_of_steps {
                break;
            }
            prev_obs = step.obs;
        }
        info!(
            "Episode {:?}, {:?} steps, return = {:?}",
            episode, count_step, r_total
        );
        rs.push(r_total);
    }
    recorder.flush();

    Ok(rs)
}
