use anyhow::Result;
use nalgebra::Vector3;
use strider_core::Env;
use strider_locomotion::{
    build_regular_env, joint_space,
    robot::{KinematicRobotFactory, ScriptedRobotFactory},
    EnvBuilderConfig, JointAct, LocomotionEnv, LocomotionError, MotorControlMode, RobotKind,
    TrajectoryWrapping, WrappedEnv,
};
use tempdir::TempDir;
use test_log::test;

const OBS_DIM_12_MOTORS: usize = 12 + 12 + 1 + 5 + 4;

#[test]
fn test_trajectory_generator_is_outermost() -> Result<()> {
    let config = EnvBuilderConfig::new(RobotKind::A1, MotorControlMode::Position);
    let built = build_regular_env(&config, &KinematicRobotFactory)?;
    assert_eq!(built.trajectory_wrapping, TrajectoryWrapping::Applied);
    assert!(matches!(built.env, WrappedEnv::TrajectoryGenerator(_)));

    let env = built.env;
    let space = env.action_space();
    assert_eq!(space.dim(), 12);
    assert!(space.high().iter().all(|v| *v == 0.75));
    assert!(space.low().iter().all(|v| *v == -0.75));
    assert_ne!(space, env.base().action_space());
    assert_eq!(env.observation_space().dim(), OBS_DIM_12_MOTORS);
    Ok(())
}

#[test]
fn test_without_trajectory_generator_actions_are_raw_joint_commands() -> Result<()> {
    let config = EnvBuilderConfig::new(RobotKind::Laikago, MotorControlMode::Position)
        .wrap_trajectory_generator(false);
    let built = build_regular_env(&config, &KinematicRobotFactory)?;
    assert_eq!(built.trajectory_wrapping, TrajectoryWrapping::NotRequested);

    let env = built.env;
    let raw = joint_space(env.robot(), MotorControlMode::Position)?;
    assert_eq!(env.action_space(), raw);
    assert_eq!(env.action_space(), env.base().action_space());
    Ok(())
}

#[test]
fn test_unsupported_robot_is_reported() -> Result<()> {
    let config = EnvBuilderConfig::new(RobotKind::Minitaur, MotorControlMode::Position);
    let built = build_regular_env(&config, &KinematicRobotFactory)?;
    assert_eq!(
        built.trajectory_wrapping,
        TrajectoryWrapping::UnsupportedRobot(RobotKind::Minitaur)
    );
    assert!(matches!(built.env, WrappedEnv::Flattened(_)));
    assert_eq!(built.env.action_space().dim(), 8);
    assert_eq!(built.env.observation_space().dim(), 8 + 8 + 1 + 5 + 4);
    Ok(())
}

#[test]
fn test_unsupported_mode_is_reported() -> Result<()> {
    let config = EnvBuilderConfig::new(RobotKind::A1, MotorControlMode::Torque);
    let built = build_regular_env(&config, &KinematicRobotFactory)?;
    assert_eq!(
        built.trajectory_wrapping,
        TrajectoryWrapping::UnsupportedMode(MotorControlMode::Torque)
    );

    let config = EnvBuilderConfig::new(RobotKind::A1, MotorControlMode::Hybrid);
    let built = build_regular_env(&config, &KinematicRobotFactory)?;
    assert_eq!(built.env.action_space().dim(), 60);
    Ok(())
}

#[test]
fn test_fixed_simulation_parameters() -> Result<()> {
    let config = EnvBuilderConfig::new(RobotKind::A1, MotorControlMode::Position).on_rack(true);
    let built = build_regular_env(&config, &KinematicRobotFactory)?;
    let params = built.env.base().simulation_parameters();
    assert_eq!(params.num_action_repeat(), 10);
    assert_eq!(params.reset_time(), 2.0);
    assert!(params.robot_on_rack());
    assert!(!params.enable_action_filter());
    assert!(!params.enable_action_interpolation());
    assert!(!params.enable_clip_motor_commands());
    assert_eq!(
        built.env.base().sensors().names(),
        vec![
            "MotorAngle",
            "MotorVelocity",
            "BaseDisplacement",
            "IMU",
            "FootContactSensor"
        ]
    );
    assert_eq!(built.env.base().task().target_vel(), 1.0);
    Ok(())
}

#[test]
fn test_residual_is_offset_from_pose() -> Result<()> {
    let (factory, handle) = ScriptedRobotFactory::new(RobotKind::A1);
    let config = EnvBuilderConfig::new(RobotKind::A1, MotorControlMode::Position)
        .action_limit([0.1, 0.2, 0.3]);
    let mut env = build_regular_env(&config, &factory)?.env;
    env.reset()?;

    let residual = JointAct::from_vec(vec![1.0; 12]);
    let (step, _) = env.step(&residual)?;
    assert_eq!(step.act, residual);

    let commands = handle.commands();
    assert_eq!(commands.len(), 10);
    let expected = [0.0 + 0.1, 0.67 + 0.2, -1.25 + 0.3]
        .iter()
        .cycle()
        .take(12)
        .map(|v| *v as f32 as f64)
        .collect::<Vec<_>>();
    for command in commands {
        assert_eq!(command, expected);
    }
    Ok(())
}

#[test]
fn test_residual_of_wrong_length_is_rejected() -> Result<()> {
    let (factory, handle) = ScriptedRobotFactory::new(RobotKind::A1);
    let config = EnvBuilderConfig::new(RobotKind::A1, MotorControlMode::Position);
    let mut env = build_regular_env(&config, &factory)?.env;
    env.reset()?;

    for len in [11, 13] {
        let err = env.step(&JointAct::zeros(len)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LocomotionError>(),
            Some(&LocomotionError::ActionDimension {
                expected: 12,
                found: len
            })
        );
    }
    assert!(handle.commands().is_empty());
    Ok(())
}

#[test]
fn test_non_finite_residual_is_rejected() -> Result<()> {
    let (factory, handle) = ScriptedRobotFactory::new(RobotKind::A1);
    let config = EnvBuilderConfig::new(RobotKind::A1, MotorControlMode::Position);
    let mut env = build_regular_env(&config, &factory)?.env;
    env.reset()?;

    let mut residual = vec![0.0; 12];
    residual[1] = f32::NAN;
    let err = env.step(&JointAct::from_vec(residual)).unwrap_err();
    assert_eq!(
        err.downcast_ref::<LocomotionError>(),
        Some(&LocomotionError::NonFiniteAction(1))
    );

    let mut residual = vec![0.0; 12];
    residual[7] = f32::INFINITY;
    let err = env.step(&JointAct::from_vec(residual)).unwrap_err();
    assert_eq!(
        err.downcast_ref::<LocomotionError>(),
        Some(&LocomotionError::NonFiniteAction(7))
    );
    assert!(handle.commands().is_empty());

    // A valid residual still goes through afterwards.
    env.step(&JointAct::zeros(12))?;
    assert_eq!(handle.commands().len(), 10);
    Ok(())
}

#[test]
fn test_trajectory_time_restarts_on_reset() -> Result<()> {
    let config = EnvBuilderConfig::new(RobotKind::A1, MotorControlMode::Position);
    let mut env = build_regular_env(&config, &KinematicRobotFactory)?.env;
    env.reset()?;
    let act = JointAct::zeros(12);
    env.step(&act)?;
    env.step(&act)?;
    match &env {
        WrappedEnv::TrajectoryGenerator(tg) => {
            assert!((tg.elapsed() - 2.0 * env.env_time_step()).abs() < 1e-12)
        }
        _ => panic!("trajectory generator expected"),
    }

    env.reset()?;
    match &env {
        WrappedEnv::TrajectoryGenerator(tg) => assert_eq!(tg.elapsed(), 0.0),
        _ => panic!("trajectory generator expected"),
    }
    Ok(())
}

#[test]
fn test_flattened_observation_splits_back() -> Result<()> {
    let (factory, handle) = ScriptedRobotFactory::new(RobotKind::A1);
    let config = EnvBuilderConfig::new(RobotKind::A1, MotorControlMode::Position);
    let mut env = build_regular_env(&config, &factory)?.env;
    env.reset()?;
    handle.set_base_position(Vector3::new(0.05, 0.0, 0.0));
    let (step, _) = env.step(&JointAct::zeros(12))?;

    let flat = env.flattened();
    let dict = flat.unflatten(&step.obs)?;
    assert_eq!(dict.keys(), env.base().sensors().names());
    assert_eq!(dict.get("BaseDisplacement").map(|v| v.to_vec()), Some(vec![0.05]));
    assert_eq!(dict.get("FootContactSensor").map(|v| v.to_vec()), Some(vec![1.0; 4]));
    assert_eq!(flat.flatten(&dict)?, step.obs);
    Ok(())
}

#[test]
fn test_orientation_failure_propagates() -> Result<()> {
    let (factory, handle) = ScriptedRobotFactory::new(RobotKind::Laikago);
    let config = EnvBuilderConfig::new(RobotKind::Laikago, MotorControlMode::Position);
    let mut env = build_regular_env(&config, &factory)?.env;
    env.reset()?;
    handle.fail_orientation_reads(true);
    assert!(env.step(&JointAct::zeros(12)).is_err());
    Ok(())
}

#[test]
fn test_kinematic_rollout() -> Result<()> {
    let config = EnvBuilderConfig::new(RobotKind::A1, MotorControlMode::Position)
        .max_episode_steps(Some(20));
    let mut env = build_regular_env(&config, &KinematicRobotFactory)?.env;
    let obs = env.reset()?;
    assert_eq!(obs.0.len(), OBS_DIM_12_MOTORS);

    let act = JointAct::zeros(12);
    let mut n_steps = 0;
    loop {
        let (step, record) = env.step(&act)?;
        n_steps += 1;
        assert!(step.reward > 0.0 && step.reward <= 1.0);
        assert_eq!(record.get_scalar("reward")?, step.reward);
        if step.is_done() {
            assert!(step.is_truncated);
            break;
        }
    }
    assert_eq!(n_steps, 20);
    Ok(())
}

#[test]
fn test_config_file_round_trip() -> Result<()> {
    let tmp = TempDir::new("env_builder_config")?;
    let path = tmp.path().join("env.yaml");
    let config = EnvBuilderConfig::new(RobotKind::Laikago, MotorControlMode::Hybrid)
        .action_limit([0.5, 0.25, 0.125])
        .max_episode_steps(Some(1000));
    config.save(&path)?;
    assert_eq!(EnvBuilderConfig::load(&path)?, config);
    Ok(())
}
