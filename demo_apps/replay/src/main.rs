//! Replay
//! Plays a landmark recording onto two procedural avatars and logs the
//! resulting IK goals and finger rotations.
//!
//! Usage:
//!   replay [SEQUENCE.json] [--settings SETTINGS.json] [--realtime]
//!
//! Without a sequence file a short synthetic take is generated: the head
//! sways and the left index finger curls. Playback switches from the
//! "male" to the "female" avatar halfway through.
//!
//! Run with `RUST_LOG=debug` to see every resolve step.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::time::Duration;

use anyhow::Context;
use glam::{Quat, Vec3};
use marionette::retarget::{HandGoal, LookAtGoal};
use marionette::{
    BoneKey, Finger, FrameTimer, IkSolver, LandmarkFrame, LandmarkPoint, LandmarkSequence, NodeHandle,
    PlaybackState, RetargetSettings, Retargeter, Scene, Segment, Side, Transform,
};

const RENDER_DT: f32 = 1.0 / 60.0;
const SYNTHETIC_FRAMES: usize = 90;

struct Args {
    sequence: Option<String>,
    settings: Option<String>,
    realtime: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        sequence: None,
        settings: None,
        realtime: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--settings" => args.settings = Some(iter.next().context("--settings needs a path")?),
            "--realtime" => args.realtime = true,
            _ => args.sequence = Some(arg),
        }
    }
    Ok(args)
}

/// Forwards goals to the log in place of a real IK solver.
#[derive(Default)]
struct LoggingSolver {
    resolves: u64,
}

impl IkSolver for LoggingSolver {
    fn set_hand_goal(&mut self, side: Side, goal: HandGoal) {
        log::debug!(
            "{side} hand goal {:.3} (position weight {}, rotation weight {})",
            goal.position,
            goal.position_weight,
            goal.rotation_weight
        );
    }

    fn set_look_at(&mut self, goal: LookAtGoal) {
        self.resolves += 1;
        log::debug!("look-at goal {:.3} (weight {})", goal.position, goal.weight);
    }
}

/// Builds a skeleton with both hands under `name`, using the configured
/// bone names. Finger chains rest along the hand's -X axis.
fn build_avatar(scene: &mut Scene, settings: &RetargetSettings, name: &str, hand_height: f32) -> NodeHandle {
    let root = scene.create_node_with_name(name);
    let spine = scene.spawn(
        &format!("{name}_spine"),
        Transform::from_position_rotation(Vec3::new(0.0, hand_height, 0.0), Quat::IDENTITY),
        Some(root),
    );

    for side in Side::ALL {
        let offset = if side.is_left() { -0.3 } else { 0.3 };
        let hand = scene.spawn(
            &settings.naming.hand_name(side),
            Transform::from_position_rotation(Vec3::new(offset, 0.0, 0.0), Quat::IDENTITY),
            Some(spine),
        );

        for (i, finger) in Finger::ALL.into_iter().enumerate() {
            let mut parent = hand;
            for segment in Segment::ALL {
                let (position, rotation) = match segment {
                    Segment::Proximal => (
                        Vec3::new(0.0, 0.0, 0.02 * i as f32),
                        Quat::from_rotation_y(-FRAC_PI_2),
                    ),
                    _ => (Vec3::new(0.0, 0.0, 0.03), Quat::IDENTITY),
                };
                parent = scene.spawn(
                    &settings.naming.bone_name(BoneKey::new(finger, segment, side)),
                    Transform::from_position_rotation(position, rotation),
                    Some(parent),
                );
            }
        }
    }
    root
}

/// A head sway plus a left index finger curling from straight to bent.
fn synthesize_sequence() -> LandmarkSequence {
    let frames = (0..SYNTHETIC_FRAMES)
        .map(|i| {
            let t = i as f32 / SYNTHETIC_FRAMES as f32;

            let mut pose = vec![LandmarkPoint::new(0.5, 0.6, 0.0); 33];
            pose[0] = LandmarkPoint::new(0.5 + 0.05 * (t * TAU).sin(), 0.3, 0.0);

            let wrist = LandmarkPoint::new(0.6, 0.6, 0.0);
            let mut left_hand = vec![wrist; 21];
            let curl = t * FRAC_PI_2;
            let mut joint = Vec3::new(0.65, 0.6, 0.0);
            for (n, index) in Finger::Index.landmark_indices().into_iter().enumerate() {
                left_hand[index] = LandmarkPoint::from(joint);
                let angle = curl * n as f32 / 3.0;
                joint += Vec3::new(angle.cos(), -angle.sin(), 0.0) * 0.04;
            }

            LandmarkFrame {
                pose,
                left_hand,
                ..Default::default()
            }
        })
        .collect();
    LandmarkSequence::new(frames)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = parse_args()?;

    let settings = match &args.settings {
        Some(path) => RetargetSettings::from_file(path).with_context(|| format!("loading settings from {path}"))?,
        None => RetargetSettings::default(),
    };

    let mut scene = Scene::new();
    let male = build_avatar(&mut scene, &settings, "male", 1.4);
    let female = build_avatar(&mut scene, &settings, "female", 1.3);

    let mut retargeter: Retargeter<Scene> = Retargeter::new(settings);
    retargeter.register_avatar("male", male);
    retargeter.register_avatar("female", female);
    retargeter.select_avatar(&mut scene, "male")?;

    let started = match &args.sequence {
        Some(path) => retargeter.try_load_from_file(path),
        None => {
            log::info!("No sequence given, playing a synthetic take");
            retargeter.load_sequence(synthesize_sequence());
            true
        }
    };
    if !started {
        anyhow::bail!("nothing to play");
    }

    let frame_count = retargeter.sequence().map_or(0, LandmarkSequence::len);
    let mut solver = LoggingSolver::default();
    let mut timer = FrameTimer::default();
    let mut switched = false;
    let mut steps = 0u64;

    while retargeter.state() == PlaybackState::Playing {
        let dt = if args.realtime {
            std::thread::sleep(Duration::from_secs_f32(RENDER_DT));
            timer.tick();
            timer.dt_seconds()
        } else {
            RENDER_DT
        };
        steps += 1;

        retargeter.update(&mut scene, dt);
        retargeter.resolve_ik(&mut solver);
        let solves = retargeter.apply_render_step(&mut scene);
        log::trace!("{} finger segments solved", solves.len());

        if !switched && retargeter.cursor() >= frame_count / 2 {
            retargeter.select_avatar(&mut scene, "female")?;
            switched = true;
        }
    }

    let targets = retargeter.targets();
    log::info!(
        "Finished after {steps} render steps ({:.2}s wall clock), {} IK resolves",
        timer.elapsed.as_secs_f32(),
        solver.resolves
    );
    log::info!("Head target: {:.3}", targets.head.position);
    for side in Side::ALL {
        log::info!("{side} hand target: {:.3}", targets.hand(side).position);
    }

    let key = BoneKey::new(Finger::Index, Segment::Proximal, Side::Left);
    if let Some(binding) = retargeter.binding()
        && let Some(bone) = binding.bone(key)
        && let Some(rotation) = scene.world_rotation(bone)
    {
        log::info!("{key} forward: {:.3}", rotation * binding.axis_for(key));
    }

    Ok(())
}
