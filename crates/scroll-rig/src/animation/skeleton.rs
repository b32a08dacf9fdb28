//! Bone hierarchy and world transform computation
//!
//! Bones are stored parent-first, so world matrices resolve in a single
//! forward pass: each bone multiplies its local transform onto the already
//! computed world matrix of its parent, and root bones onto the character
//! root node.

use glam::{Mat4, Quat, Vec3};

use crate::error::{Result, RigError};

/// Translation, rotation and scale of a node
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Transform with only a translation
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Compose into a matrix (scale, then rotation, then translation)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Check that no component is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Index of a bone within its skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneId(pub usize);

impl BoneId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single bone: rest pose, current local pose and cached world matrix
#[derive(Debug, Clone)]
pub struct Bone {
    /// Bone name as authored in the asset
    pub name: String,
    /// Parent bone (None for bones attached directly to the root node)
    pub parent: Option<BoneId>,
    /// Bind/rest pose in parent space
    pub rest: Transform,
    /// Current pose in parent space
    pub local: Transform,
    world: Mat4,
}

impl Bone {
    /// Create a bone posed at its rest transform
    pub fn new(name: impl Into<String>, parent: Option<BoneId>, rest: Transform) -> Self {
        Self {
            name: name.into(),
            parent,
            rest,
            local: rest,
            world: Mat4::IDENTITY,
        }
    }

    /// World matrix as of the last `Skeleton::update_world`
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// World-space origin of the bone
    pub fn world_position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }
}

/// Bone hierarchy plus the character root node it hangs from
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: Vec<Bone>,
    root: Transform,
}

impl Skeleton {
    /// Build a skeleton, checking that parents precede children and names are unique
    pub fn new(bones: Vec<Bone>) -> Result<Self> {
        for (i, bone) in bones.iter().enumerate() {
            if bone.name.is_empty() {
                return Err(RigError::InvalidSkeleton(format!("bone {i} has no name")));
            }
            if let Some(parent) = bone.parent {
                if parent.0 >= i {
                    return Err(RigError::InvalidSkeleton(format!(
                        "bone '{}' (index {i}) references parent {} which does not precede it",
                        bone.name, parent.0
                    )));
                }
            }
            if bones[..i].iter().any(|b| b.name == bone.name) {
                return Err(RigError::InvalidSkeleton(format!(
                    "duplicate bone name '{}'",
                    bone.name
                )));
            }
            if !bone.rest.is_finite() {
                return Err(RigError::InvalidSkeleton(format!(
                    "bone '{}' has a non-finite rest pose",
                    bone.name
                )));
            }
        }

        let mut skeleton = Self {
            bones,
            root: Transform::IDENTITY,
        };
        skeleton.update_world();
        Ok(skeleton)
    }

    /// Get number of bones
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.get(id.0)
    }

    pub fn bone_mut(&mut self, id: BoneId) -> Option<&mut Bone> {
        self.bones.get_mut(id.0)
    }

    /// Character root node (world placement of the whole rig)
    pub fn root(&self) -> &Transform {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Transform {
        &mut self.root
    }

    /// Find a bone by exact name
    pub fn find(&self, name: &str) -> Option<BoneId> {
        self.bones.iter().position(|b| b.name == name).map(BoneId)
    }

    /// Find the first bone whose name contains one of `patterns`, case-insensitively
    ///
    /// Patterns are tried in order, so earlier patterns take priority over
    /// later ones regardless of where the bones sit in the hierarchy.
    pub fn find_by_substring(&self, patterns: &[&str]) -> Option<BoneId> {
        let lowered: Vec<String> = self.bones.iter().map(|b| b.name.to_lowercase()).collect();
        patterns.iter().find_map(|pattern| {
            let pattern = pattern.to_lowercase();
            lowered
                .iter()
                .position(|name| name.contains(&pattern))
                .map(BoneId)
        })
    }

    /// Find every bone whose name contains `pattern`, case-insensitively
    pub fn find_all_by_substring(&self, pattern: &str) -> Vec<BoneId> {
        let pattern = pattern.to_lowercase();
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.name.to_lowercase().contains(&pattern))
            .map(|(i, _)| BoneId(i))
            .collect()
    }

    /// Put every bone back to its rest pose
    pub fn reset_to_rest(&mut self) {
        for bone in &mut self.bones {
            bone.local = bone.rest;
        }
    }

    /// Recompute world matrices from the root node and local poses
    pub fn update_world(&mut self) {
        let root = self.root.to_matrix();
        for i in 0..self.bones.len() {
            let local = self.bones[i].local.to_matrix();
            let parent_world = match self.bones[i].parent {
                Some(parent) => self.bones[parent.0].world,
                None => root,
            };
            self.bones[i].world = parent_world * local;
        }
    }

    /// World-space origin of a bone as of the last `update_world`
    pub fn world_position(&self, id: BoneId) -> Option<Vec3> {
        self.bone(id).map(Bone::world_position)
    }

    /// Snapshot of all world matrices (for upload or comparison)
    pub fn world_matrices(&self) -> Vec<Mat4> {
        self.bones.iter().map(|b| b.world).collect()
    }

    /// Snapshot of all local poses
    pub fn local_poses(&self) -> Vec<Transform> {
        self.bones.iter().map(|b| b.local).collect()
    }

    /// Overwrite local poses, e.g. with a snapshot from `local_poses`
    ///
    /// Extra entries are ignored; bones past the end of `poses` are untouched.
    pub fn set_local_poses(&mut self, poses: &[Transform]) {
        for (bone, pose) in self.bones.iter_mut().zip(poses) {
            bone.local = *pose;
        }
    }

    /// Flat column-major matrices for GPU upload, 16 floats per bone
    pub fn skinning_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.bones.len() * 16);
        for bone in &self.bones {
            data.extend_from_slice(&bone.world.to_cols_array());
        }
        data
    }
}
