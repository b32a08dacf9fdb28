//! Integration tests for the scroll-driven controller on the sample humanoid

use pretty_assertions::assert_eq;
use scroll_rig::animation::{AnimationClip, BoneTrack, Rig, RigBuilder, Track, Transform};
use scroll_rig::controller::{DriftMode, Phase, PhaseKind, YawMode};
use scroll_rig::glam::{Mat4, Vec3};
use scroll_rig::sample::{HIP_HEIGHT, humanoid_rig};
use scroll_rig::{AnimationController, RigConfig};
use std::f32::consts::FRAC_PI_2;

const EPSILON: f32 = 1e-4;

fn config() -> RigConfig {
    let mut config = RigConfig::default();
    config.secondary.seed = Some(1);
    config
}

fn setup() -> (Rig, AnimationController) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rig = humanoid_rig().unwrap();
    let controller = AnimationController::new(&config(), &mut rig).unwrap();
    (rig, controller)
}

fn assert_matrices_close(a: &[Mat4], b: &[Mat4]) {
    assert_eq!(a.len(), b.len());
    for (i, (a, b)) in a.iter().zip(b).enumerate() {
        assert!(a.abs_diff_eq(*b, EPSILON), "bone {i} differs:\n{a}\n{b}");
    }
}

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

/// Update to `progress` and return the hip relative to the character base
fn hip_on_base(rig: &mut Rig, controller: &mut AnimationController, progress: f32) -> Vec3 {
    controller.update(rig, progress, 0.016);
    let snapshot = controller.snapshot(rig);
    snapshot.hip.unwrap() - controller.camera().character_base(progress)
}

/// Hip offsets on both sides of a seam, crossing it in the given order
fn across_seam(first: f32, second: f32) -> (Vec3, Vec3, PhaseKind, PhaseKind) {
    let (mut rig, mut controller) = setup();
    controller.update(&mut rig, 0.0, 0.016);
    let before = hip_on_base(&mut rig, &mut controller, first);
    let first_kind = controller.current_phase().unwrap().kind;
    let after = hip_on_base(&mut rig, &mut controller, second);
    let second_kind = controller.current_phase().unwrap().kind;
    (before, after, first_kind, second_kind)
}

// Sub-frame scroll steps still move a scrubbed clip slightly
const SEAM_EPSILON: f32 = 1e-3;

#[test]
fn test_jump_from_start_to_turn_around() {
    let (mut rig, mut controller) = setup();
    controller.update(&mut rig, 0.0, 0.016);
    controller.update(&mut rig, 0.95, 0.016);

    let phase = controller.current_phase().unwrap();
    assert_eq!(phase.kind, PhaseKind::TurnAround);
    // Entered idle, then stepped through every phase up to turn-around
    assert_eq!(controller.transitions(), 5);

    let active = controller.binding(4);
    for (id, action) in rig.actions() {
        if Some(id) != active {
            assert_eq!(action.weight(), 0.0, "action {id:?} still weighted");
            assert!(!action.is_enabled());
        }
    }
    assert!(!controller.secondary().is_active());
}

#[test]
fn test_jump_backwards_restores_idle() {
    let (mut rig, mut controller) = setup();
    controller.update(&mut rig, 1.0, 0.016);
    controller.update(&mut rig, 0.0, 0.016);

    assert_eq!(controller.current_phase().unwrap().kind, PhaseKind::Idle);
    assert!(controller.secondary().is_active());
    assert_eq!(controller.drift().anchor(), None);

    let idle = controller.binding(0);
    for (id, action) in rig.actions() {
        if Some(id) != idle {
            assert_eq!(action.effective_weight(), 0.0);
        }
    }
}

#[test]
fn test_nan_progress_never_reaches_bones() {
    let (mut rig, mut controller) = setup();
    controller.update(&mut rig, 0.4, 0.016);
    controller.update(&mut rig, f32::NAN, f32::NAN);

    assert_eq!(controller.progress(), 0.0);
    assert_eq!(controller.current_phase().unwrap().kind, PhaseKind::Idle);
    assert!(rig.skeleton().root().is_finite());
    for bone in rig.skeleton().bones() {
        assert!(bone.local.is_finite(), "{} has a non-finite pose", bone.name);
    }
    assert!(rig.skeleton().skinning_data().iter().all(|v| v.is_finite()));
}

#[test]
fn test_update_with_zero_delta_is_idempotent() {
    for progress in [0.0, 0.003, 0.04, 0.09, 0.3, 0.58, 0.75, 0.95, 1.0] {
        let (mut rig, mut controller) = setup();
        controller.update(&mut rig, progress, 0.0);
        let poses = rig.skeleton().local_poses();
        let matrices = rig.skeleton().world_matrices();
        let morphs = rig.morphs().weights().to_vec();

        controller.update(&mut rig, progress, 0.0);
        assert_eq!(rig.skeleton().local_poses(), poses, "progress {progress}");
        assert_eq!(rig.skeleton().world_matrices(), matrices, "progress {progress}");
        assert_eq!(rig.morphs().weights(), morphs.as_slice());
    }
}

#[test]
fn test_scrub_endpoints_regardless_of_history() {
    let (mut rig, mut controller) = setup();

    // Forward into standing
    controller.update(&mut rig, 0.0, 0.016);
    controller.update(&mut rig, 0.58, 0.016);
    let forward = controller.snapshot(&rig);
    assert_eq!(forward.clip.as_deref(), Some("StandUp"));
    assert_eq!(forward.clip_time, Some(0.0));
    let hips = rig.skeleton().bones()[0].local.translation;
    assert!(close(hips, Vec3::new(0.0, 0.6, 0.3)), "{hips:?}");
    let forward_matrices = rig.skeleton().world_matrices();

    // Last frame of the final phase
    controller.update(&mut rig, 1.0, 0.016);
    let end = controller.snapshot(&rig);
    assert_eq!(end.clip.as_deref(), Some("TurnAround"));
    assert_eq!(end.clip_time, end.clip_duration);

    // Back into standing from the other side
    controller.update(&mut rig, 0.58, 0.016);
    let backward = controller.snapshot(&rig);
    assert_eq!(backward.clip_time, Some(0.0));
    assert_matrices_close(&rig.skeleton().world_matrices(), &forward_matrices);

    // Re-entering climbing from above lands on its first frame too
    controller.update(&mut rig, 0.08, 0.016);
    assert_eq!(controller.snapshot(&rig).clip_time, Some(0.0));
}

#[test]
fn test_standing_hip_stays_on_anchor() {
    let (mut rig, mut controller) = setup();
    let rail = *controller.camera();

    let mut anchor = None;
    for progress in [0.58, 0.62, 0.7, 0.8, 0.8999] {
        controller.update(&mut rig, progress, 0.016);
        let snapshot = controller.snapshot(&rig);
        assert_eq!(snapshot.phase, Some(PhaseKind::Standing));

        let cached = snapshot.drift_anchor.unwrap();
        let anchor = *anchor.get_or_insert(cached);
        assert!(close(cached, anchor), "anchor changed within the phase");

        let relative = snapshot.hip.unwrap() - rail.character_base(progress);
        assert!(
            close(relative, anchor),
            "hip drifted at {progress}: {relative:?} vs {anchor:?}"
        );
    }

    // The anchor is where the climb leaves the hip, not where the stand-up
    // clip starts
    let anchor = anchor.unwrap();
    assert!(close(anchor, Vec3::new(0.0, HIP_HEIGHT, 0.0)), "{anchor:?}");
}

#[test]
fn test_hip_continuous_from_climbing_to_standing() {
    let (climb, stand, from, to) = across_seam(0.5799, 0.58);
    assert_eq!((from, to), (PhaseKind::Climbing, PhaseKind::Standing));
    assert!(
        (climb - stand).length() < SEAM_EPSILON,
        "hip jumped by {:?}",
        stand - climb
    );
}

#[test]
fn test_hip_continuous_from_standing_to_climbing() {
    let (stand, climb, from, to) = across_seam(0.58, 0.5799);
    assert_eq!((from, to), (PhaseKind::Standing, PhaseKind::Climbing));
    assert!(
        (climb - stand).length() < SEAM_EPSILON,
        "hip jumped by {:?}",
        climb - stand
    );
}

#[test]
fn test_hip_continuous_from_standing_to_turn_around() {
    let (stand, turn, from, to) = across_seam(0.8999, 0.9);
    assert_eq!((from, to), (PhaseKind::Standing, PhaseKind::TurnAround));
    assert!((stand - turn).length() < SEAM_EPSILON, "hip jumped by {:?}", turn - stand);
}

#[test]
fn test_hip_continuous_from_turn_around_to_standing() {
    let (turn, stand, from, to) = across_seam(0.9, 0.8999);
    assert_eq!((from, to), (PhaseKind::TurnAround, PhaseKind::Standing));
    assert!((stand - turn).length() < SEAM_EPSILON, "hip jumped by {:?}", stand - turn);
}

#[test]
fn test_custom_phase_table() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rig = humanoid_rig().unwrap();
    let mut config = config();
    config.phases = vec![
        Phase::new(PhaseKind::Idle, 0.0, 0.1).with_time_scale(2.0),
        Phase::new(PhaseKind::TurnToWall, 0.1, 0.2).with_yaw(YawMode::Pinned(FRAC_PI_2)),
        Phase::new(PhaseKind::Climbing, 0.2, 0.6),
        Phase::new(PhaseKind::Standing, 0.6, 0.9).with_drift(DriftMode::None),
        Phase::new(PhaseKind::TurnAround, 0.9, 1.0).with_clip("TurnToWall"),
    ];
    let mut controller = AnimationController::new(&config, &mut rig).unwrap();

    // Idle plays at double speed
    controller.update(&mut rig, 0.0, 0.5);
    assert!((controller.snapshot(&rig).clip_time.unwrap() - 1.0).abs() < 1e-5);

    controller.update(&mut rig, 0.15, 0.016);
    assert!((controller.snapshot(&rig).root_yaw - FRAC_PI_2).abs() < 1e-6);

    // Standing without compensation stays on the rail
    controller.update(&mut rig, 0.7, 0.016);
    let snapshot = controller.snapshot(&rig);
    assert_eq!(snapshot.drift_anchor, None);
    assert_eq!(snapshot.root_translation, controller.camera().character_base(0.7));

    controller.update(&mut rig, 0.95, 0.016);
    assert_eq!(
        controller.snapshot(&rig).clip.as_deref(),
        Some("TurnToWall")
    );
}

#[test]
fn test_turn_around_hands_off_anchor() {
    let (mut rig, mut controller) = setup();
    let rail = *controller.camera();

    controller.update(&mut rig, 0.75, 0.016);
    let standing_anchor = controller.drift().anchor().unwrap();

    for progress in [0.9, 0.95, 1.0] {
        controller.update(&mut rig, progress, 0.016);
        let snapshot = controller.snapshot(&rig);
        assert_eq!(snapshot.phase, Some(PhaseKind::TurnAround));
        let relative = snapshot.hip.unwrap() - rail.character_base(progress);
        assert!(close(relative, standing_anchor), "hip jumped at {progress}");
    }

    // Leaving the compensated phases drops the anchor
    controller.update(&mut rig, 0.3, 0.016);
    assert_eq!(controller.drift().anchor(), None);
    assert_eq!(controller.snapshot(&rig).drift_correction, Vec3::ZERO);
}

#[test]
fn test_turn_around_anchor_is_recomputed_on_entry() {
    let (mut rig, mut controller) = setup();
    controller.update(&mut rig, 0.95, 0.016);
    let direct = controller.drift().anchor().unwrap();

    controller.update(&mut rig, 0.2, 0.016);
    controller.update(&mut rig, 0.7, 0.016);
    controller.update(&mut rig, 0.95, 0.016);
    assert!(close(controller.drift().anchor().unwrap(), direct));
}

#[test]
fn test_crossfade_into_climbing() {
    let (mut rig, mut controller) = setup();
    let turn = controller.binding(1).unwrap();
    let climb = controller.binding(2).unwrap();

    controller.update(&mut rig, 0.0, 0.016);
    controller.update(&mut rig, 0.09, 0.016);

    let partner = rig.action(turn).unwrap();
    assert!(partner.is_enabled());
    assert_eq!(partner.time(), partner.duration());
    assert!((partner.weight() - 0.5).abs() < 1e-3);
    assert!((rig.action(climb).unwrap().weight() - 0.5).abs() < 1e-3);

    // Past the crossfade range the partner is released
    controller.update(&mut rig, 0.3, 0.016);
    let partner = rig.action(turn).unwrap();
    assert_eq!(partner.weight(), 0.0);
    assert!(!partner.is_enabled());
    assert_eq!(rig.action(climb).unwrap().weight(), 1.0);
}

#[test]
fn test_idle_runs_on_wall_clock() {
    let (mut rig, mut controller) = setup();
    controller.update(&mut rig, 0.0, 0.5);
    controller.update(&mut rig, 0.001, 0.5);
    let snapshot = controller.snapshot(&rig);
    assert_eq!(snapshot.clip.as_deref(), Some("Idle"));
    assert!((snapshot.clip_time.unwrap() - 1.0).abs() < 1e-5);

    // Idle loops
    controller.update(&mut rig, 0.0, 1.5);
    assert!((controller.snapshot(&rig).clip_time.unwrap() - 0.5).abs() < 1e-5);
}

#[test]
fn test_missing_clip_holds_last_pose() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rig = humanoid_rig().unwrap();
    let mut config = config();
    config.phases[2].clip = "NoSuchClip".to_string();
    let mut controller = AnimationController::new(&config, &mut rig).unwrap();
    assert_eq!(controller.binding(2), None);

    controller.update(&mut rig, 0.07, 0.016);
    let poses = rig.skeleton().local_poses();

    controller.update(&mut rig, 0.3, 0.016);
    let snapshot = controller.snapshot(&rig);
    assert_eq!(snapshot.phase, Some(PhaseKind::Climbing));
    assert_eq!(snapshot.clip, None);
    assert_eq!(rig.skeleton().local_poses(), poses);

    // Phases with clips still work afterwards
    controller.update(&mut rig, 0.7, 0.016);
    assert_eq!(
        controller.snapshot(&rig).clip.as_deref(),
        Some("StandUp")
    );
}

#[test]
fn test_missing_hip_disables_compensation() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rig = RigBuilder::new()
        .bone("Root", None, Transform::IDENTITY)
        .bone("Torso", Some("Root"), Transform::from_translation(Vec3::Y))
        .clip(
            AnimationClip::new(
                "StandUp",
                vec![BoneTrack::new("Root").with_translation(Track::linear(
                    vec![0.0, 1.0],
                    vec![Vec3::ZERO, Vec3::Y],
                ))],
            )
            .unwrap(),
        )
        .build()
        .unwrap();

    let mut controller = AnimationController::new(&config(), &mut rig).unwrap();
    assert_eq!(controller.bones().hip, None);

    controller.update(&mut rig, 0.7, 0.016);
    let snapshot = controller.snapshot(&rig);
    assert_eq!(snapshot.phase, Some(PhaseKind::Standing));
    assert_eq!(snapshot.hip, None);
    assert_eq!(snapshot.drift_anchor, None);
    assert_eq!(snapshot.drift_correction, Vec3::ZERO);
    assert_eq!(
        rig.skeleton().root().translation,
        controller.camera().character_base(0.7)
    );
}

#[test]
fn test_reentrant_transition_is_noop() {
    let (mut rig, mut controller) = setup();
    controller.update(&mut rig, 0.3, 0.016);
    let transitions = controller.transitions();
    controller.transition(&mut rig, Some(2), 2);
    assert_eq!(controller.transitions(), transitions);
}

#[test]
fn test_camera_follows_progress() {
    let (mut rig, mut controller) = setup();
    controller.update(&mut rig, 0.5, 0.016);
    let snapshot = controller.snapshot(&rig);
    assert_eq!(
        snapshot.camera_position,
        controller.camera().camera_position(0.5)
    );
    assert_eq!(snapshot.camera_tilt, controller.camera().tilt);
}
