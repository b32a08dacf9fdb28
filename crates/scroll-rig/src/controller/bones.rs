//! One-time lookup of the bones the controller touches directly

use log::{debug, warn};

use crate::animation::{BoneId, Skeleton};
use crate::error::RigError;

const HIP_PATTERNS: &[&str] = &["hips", "hip", "pelvis"];
const SPINE_PATTERNS: &[&str] = &["spine", "chest", "torso"];
const NECK_PATTERNS: &[&str] = &["neck"];
const HEAD_PATTERNS: &[&str] = &["head"];
const LEFT_ARM_PATTERNS: &[&str] = &["leftarm", "left_arm", "arm_l", "arm.l", "l_upperarm"];
const RIGHT_ARM_PATTERNS: &[&str] = &["rightarm", "right_arm", "arm_r", "arm.r", "r_upperarm"];
const EYELID_PATTERN: &str = "eyelid";

/// Bones resolved by name pattern after the rig loads
///
/// Lookups happen once; a missing bone disables whatever feature needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoneRefs {
    pub hip: Option<BoneId>,
    pub spine: Option<BoneId>,
    pub neck: Option<BoneId>,
    pub head: Option<BoneId>,
    pub left_arm: Option<BoneId>,
    pub right_arm: Option<BoneId>,
    pub eyelids: Vec<BoneId>,
}

impl BoneRefs {
    pub fn resolve(skeleton: &Skeleton) -> Self {
        let refs = Self {
            hip: lookup(skeleton, HIP_PATTERNS, "drift compensation"),
            spine: lookup(skeleton, SPINE_PATTERNS, "breathing"),
            neck: skeleton.find_by_substring(NECK_PATTERNS),
            head: lookup(skeleton, HEAD_PATTERNS, "head look-at and sway"),
            left_arm: skeleton.find_by_substring(LEFT_ARM_PATTERNS),
            right_arm: skeleton.find_by_substring(RIGHT_ARM_PATTERNS),
            eyelids: skeleton.find_all_by_substring(EYELID_PATTERN),
        };
        debug!(
            "Resolved bones: hip={:?} spine={:?} neck={:?} head={:?} arms={:?}/{:?} eyelids={}",
            refs.hip,
            refs.spine,
            refs.neck,
            refs.head,
            refs.left_arm,
            refs.right_arm,
            refs.eyelids.len()
        );
        refs
    }
}

fn lookup(skeleton: &Skeleton, patterns: &[&str], feature: &str) -> Option<BoneId> {
    let found = skeleton.find_by_substring(patterns);
    if found.is_none() {
        warn!("{}, disabling {feature}", RigError::missing_bone(patterns));
    }
    found
}
