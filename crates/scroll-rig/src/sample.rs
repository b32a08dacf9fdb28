//! Procedural humanoid with the five clips the default phase table expects
//!
//! Stands in for a loaded asset in tests, benchmarks and the CLI. Bone
//! names follow the Mixamo convention.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};

use crate::animation::{AnimationClip, BoneTrack, Rig, RigBuilder, Track, Transform};
use crate::error::Result;

const HIPS: &str = "mixamorig:Hips";
const SPINE: &str = "mixamorig:Spine";
const LEFT_ARM: &str = "mixamorig:LeftArm";
const RIGHT_ARM: &str = "mixamorig:RightArm";

/// Hip height in the rest pose
pub const HIP_HEIGHT: f32 = 1.0;

pub fn humanoid_rig() -> Result<Rig> {
    RigBuilder::new()
        .bone(HIPS, None, at(0.0, HIP_HEIGHT, 0.0))
        .bone(SPINE, Some(HIPS), at(0.0, 0.2, 0.0))
        .bone("mixamorig:Neck", Some(SPINE), at(0.0, 0.45, 0.0))
        .bone("mixamorig:Head", Some("mixamorig:Neck"), at(0.0, 0.12, 0.0))
        .bone("mixamorig:LeftEyelid", Some("mixamorig:Head"), at(0.03, 0.08, 0.09))
        .bone("mixamorig:RightEyelid", Some("mixamorig:Head"), at(-0.03, 0.08, 0.09))
        .bone(LEFT_ARM, Some(SPINE), at(0.2, 0.4, 0.0))
        .bone(RIGHT_ARM, Some(SPINE), at(-0.2, 0.4, 0.0))
        .bone("mixamorig:LeftUpLeg", Some(HIPS), at(0.1, -0.05, 0.0))
        .bone("mixamorig:RightUpLeg", Some(HIPS), at(-0.1, -0.05, 0.0))
        .morph_target("EyeBlink")
        .clip(idle()?)
        .clip(turn_to_wall()?)
        .clip(climb()?)
        .clip(stand_up()?)
        .clip(turn_around()?)
        .build()
}

fn at(x: f32, y: f32, z: f32) -> Transform {
    Transform::from_translation(Vec3::new(x, y, z))
}

fn hips_at(y: f32) -> Vec3 {
    Vec3::new(0.0, y, 0.0)
}

fn idle() -> Result<AnimationClip> {
    AnimationClip::new(
        "Idle",
        vec![
            BoneTrack::new(HIPS).with_translation(Track::linear(
                vec![0.0, 1.0, 2.0],
                vec![hips_at(HIP_HEIGHT), hips_at(HIP_HEIGHT - 0.01), hips_at(HIP_HEIGHT)],
            )),
            BoneTrack::new(SPINE).with_rotation(Track::linear(
                vec![0.0, 1.0, 2.0],
                vec![Quat::IDENTITY, Quat::from_rotation_x(0.03), Quat::IDENTITY],
            )),
        ],
    )
}

/// The bones turn the body half a revolution; the root stays put
fn turn_to_wall() -> Result<AnimationClip> {
    AnimationClip::new(
        "TurnToWall",
        vec![BoneTrack::new(HIPS).with_rotation(Track::linear(
            vec![0.0, 0.5, 1.0],
            vec![
                Quat::IDENTITY,
                Quat::from_rotation_y(FRAC_PI_2),
                Quat::from_rotation_y(PI),
            ],
        ))],
    )
}

fn climb() -> Result<AnimationClip> {
    let times = vec![0.0, 1.0, 2.0, 3.0, 4.0];
    let reach = |angle: f32| Quat::from_rotation_x(-angle);
    AnimationClip::new(
        "Climb",
        vec![
            BoneTrack::new(HIPS).with_translation(Track::linear(
                times.clone(),
                vec![
                    hips_at(HIP_HEIGHT),
                    hips_at(HIP_HEIGHT + 0.15),
                    hips_at(HIP_HEIGHT),
                    hips_at(HIP_HEIGHT + 0.15),
                    hips_at(HIP_HEIGHT),
                ],
            )),
            BoneTrack::new(LEFT_ARM).with_rotation(Track::linear(
                times.clone(),
                vec![reach(2.6), reach(1.8), reach(2.6), reach(1.8), reach(2.6)],
            )),
            BoneTrack::new(RIGHT_ARM).with_rotation(Track::linear(
                times,
                vec![reach(1.8), reach(2.6), reach(1.8), reach(2.6), reach(1.8)],
            )),
        ],
    )
}

/// Pulls up over the ledge: the hip rises and moves onto the ledge
fn stand_up() -> Result<AnimationClip> {
    AnimationClip::new(
        "StandUp",
        vec![BoneTrack::new(HIPS).with_translation(Track::linear(
            vec![0.0, 2.0],
            vec![Vec3::new(0.0, 0.6, 0.3), Vec3::new(0.0, HIP_HEIGHT, -0.2)],
        ))],
    )
}

fn turn_around() -> Result<AnimationClip> {
    AnimationClip::new(
        "TurnAround",
        vec![BoneTrack::new(HIPS)
            .with_translation(Track::linear(
                vec![0.0, 1.5],
                vec![Vec3::new(0.0, HIP_HEIGHT, -0.2), Vec3::new(0.0, HIP_HEIGHT, 0.1)],
            ))
            .with_rotation(Track::linear(
                vec![0.0, 0.75, 1.5],
                vec![
                    Quat::IDENTITY,
                    Quat::from_rotation_y(FRAC_PI_2),
                    Quat::from_rotation_y(PI),
                ],
            ))],
    )
}
