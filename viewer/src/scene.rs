//! A displayed glTF scene: prepared meshes, skeletons and animations, and
//! the per-frame update that feeds them.
//!
//! One frame runs, in order: animation of the node transforms, world
//! transform propagation from the roots, instance and joint collection,
//! instance buffer uploads, matrix palette uploads. [`Scene::render`] then
//! submits the draws.

use std::collections::BTreeMap;

use arte_core::gltf::{self, Gltf, Index, Node, Owned, Skin, Transformation};
use arte_core::math::{mat4_from_scale_rotation_translation, BoundingBox, Mat4};
use arte_graphics::GpuBackend;

use crate::animation::{Animation, Time};
use crate::args::ViewerOptions;
use crate::error::{Result, ViewerError};
use crate::logging::{MAIN, PREPARE};
use crate::material::TextureRepository;
use crate::mesh::{Instance, Mesh};
use crate::render::Renderer;
use crate::skeleton::{Joint, JointRepository, Skeleton};

/// A prepared mesh and the instances collected for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInstances {
    pub mesh: Mesh,
    /// Instances of nodes without skin.
    pub instances: Vec<Instance>,
    /// Skins of the skinned nodes showing the mesh.
    pub skin_instances: Vec<Index<Skin>>,
}

pub type MeshRepository = BTreeMap<Index<gltf::Mesh>, MeshInstances>;
pub type SkeletonRepository = BTreeMap<Index<Skin>, Skeleton>;
pub type AnimationRepository = Vec<Animation>;

/// Local transform of a node: its matrix, or `T * R * S` from its TRS.
pub fn local_transform(node: &Node) -> Mat4 {
    match &node.transformation {
        Transformation::Matrix(matrix) => *matrix,
        Transformation::Trs(trs) => {
            mat4_from_scale_rotation_translation(trs.scale, trs.rotation, trs.translation)
        }
    }
}

/// Scene to display: `requested`, else the default scene, else the first.
pub fn select_scene(gltf: &Gltf, requested: Option<usize>) -> Result<Index<gltf::Scene>> {
    let index = match (requested, gltf.default_scene()) {
        (Some(requested), _) => Index::new(requested),
        (None, Some(default)) => default.id(),
        (None, None) => Index::new(0),
    };
    if index.value() >= gltf.count::<gltf::Scene>() {
        return Err(ViewerError::Format(format!(
            "scene {} does not exist ({} declared)",
            index,
            gltf.count::<gltf::Scene>()
        )));
    }
    Ok(index)
}

/// Fails when `node` is already on the path from the root.
fn check_acyclic(node: Owned<'_, Node>, ancestors: &[Index<Node>]) -> Result<()> {
    if ancestors.contains(&node.id()) {
        return Err(ViewerError::Format(format!(
            "node {} is its own ancestor",
            node.id()
        )));
    }
    Ok(())
}

fn populate_repositories(
    backend: &dyn GpuBackend,
    node: Owned<'_, Node>,
    ancestors: &mut Vec<Index<Node>>,
    meshes: &mut MeshRepository,
    skeletons: &mut SkeletonRepository,
    textures: &mut TextureRepository,
) -> Result<()> {
    check_acyclic(node, ancestors)?;
    if let Some(mesh) = node.get_optional(|n| n.mesh) {
        if !meshes.contains_key(&mesh.id()) {
            let prepared = Mesh::prepare(backend, mesh, textures)?;
            log::info!(target: PREPARE, "Completed GPU loading for mesh {} '{}': {}", mesh.id(), mesh.name, prepared);
            meshes.insert(
                mesh.id(),
                MeshInstances {
                    mesh: prepared,
                    instances: Vec::new(),
                    skin_instances: Vec::new(),
                },
            );
        }
        // Only skins present in the scene are loaded.
        if let Some(skin) = node.get_optional(|n| n.skin) {
            if !skeletons.contains_key(&skin.id()) {
                skeletons.insert(skin.id(), Skeleton::prepare(backend, skin)?);
            }
        }
    }

    ancestors.push(node.id());
    for child in node.iterate(|n| n.children.as_slice()) {
        populate_repositories(backend, child, ancestors, meshes, skeletons, textures)?;
    }
    ancestors.pop();
    Ok(())
}

fn node_bounding_box(
    node: Owned<'_, Node>,
    parent_transform: &Mat4,
    meshes: &MeshRepository,
    ancestors: &mut Vec<Index<Node>>,
) -> Result<Option<BoundingBox>> {
    check_acyclic(node, ancestors)?;
    let model_transform = parent_transform * local_transform(&node);

    let mut result = node
        .mesh
        .and_then(|mesh| meshes.get(&mesh))
        .map(|mesh| mesh.mesh.bounding_box.transformed(&model_transform));

    ancestors.push(node.id());
    for child in node.iterate(|n| n.children.as_slice()) {
        let child_box = node_bounding_box(child, &model_transform, meshes, ancestors)?;
        result = match (result, child_box) {
            (Some(united), Some(other)) => Some(united.united(&other)),
            (united, other) => united.or(other),
        };
    }
    ancestors.pop();
    Ok(result)
}

fn collect_instances(
    node: Owned<'_, Node>,
    parent_transform: &Mat4,
    meshes: &mut MeshRepository,
    joints: &mut JointRepository,
    ancestors: &mut Vec<Index<Node>>,
) -> Result<()> {
    check_acyclic(node, ancestors)?;
    let model_transform = parent_transform * local_transform(&node);

    if let Some(entry) = node.mesh.and_then(|mesh| meshes.get_mut(&mesh)) {
        match node.skin {
            Some(skin) => entry.skin_instances.push(skin),
            None => entry.instances.push(Instance::new(&model_transform)),
        }
    }

    if node.used_as_joint {
        joints.insert(
            node.id(),
            Joint {
                world_transform: model_transform,
            },
        );
    }

    ancestors.push(node.id());
    for child in node.iterate(|n| n.children.as_slice()) {
        collect_instances(child, &model_transform, meshes, joints, ancestors)?;
    }
    ancestors.pop();
    Ok(())
}

/// A scene of a document, prepared for display.
#[derive(Debug)]
pub struct Scene {
    gltf: Gltf,
    scene: Index<gltf::Scene>,
    meshes: MeshRepository,
    skeletons: SkeletonRepository,
    animations: AnimationRepository,
    active_animation: Option<usize>,
    joints: JointRepository,
    textures: TextureRepository,
    bounding_box: BoundingBox,
}

impl Scene {
    /// Prepares the meshes and skins used by scene `scene_index` and every
    /// animation of the document.
    ///
    /// Fails when the scene has no bounded geometry.
    pub fn new(
        backend: &dyn GpuBackend,
        gltf: Gltf,
        scene_index: Index<gltf::Scene>,
        options: &ViewerOptions,
    ) -> Result<Self> {
        let scene = gltf.get(scene_index)?;
        let mut meshes = MeshRepository::new();
        let mut skeletons = SkeletonRepository::new();
        let mut textures = TextureRepository::new();
        for root in scene.iterate(|s| s.nodes.as_slice()) {
            populate_repositories(
                backend,
                root,
                &mut Vec::new(),
                &mut meshes,
                &mut skeletons,
                &mut textures,
            )?;
        }

        let animations = gltf
            .animations()
            .map(|animation| Ok(Animation::prepare(animation)?.with_mode(options.mode)))
            .collect::<Result<AnimationRepository>>()?;
        let active_animation = match options.animation {
            Some(requested) if requested >= animations.len() => {
                return Err(ViewerError::Format(format!(
                    "animation #{} does not exist ({} declared)",
                    requested,
                    animations.len()
                )))
            }
            Some(requested) => Some(requested),
            None => (!animations.is_empty()).then_some(0),
        };

        let mut bounding_box = None;
        for root in scene.iterate(|s| s.nodes.as_slice()) {
            let root_box = node_bounding_box(root, &Mat4::identity(), &meshes, &mut Vec::new())?;
            bounding_box = match (bounding_box, root_box) {
                (Some(united), Some(other)) => Some(BoundingBox::united(&united, &other)),
                (united, other) => united.or(other),
            };
        }
        let Some(bounding_box) = bounding_box else {
            return Err(ViewerError::Format(
                "scene does not contain bounded geometry to render".into(),
            ));
        };
        log::info!(
            target: MAIN,
            "Scene {} bounding box is {:?}..{:?}, centered on {:?}.",
            scene_index,
            bounding_box.min.as_slice(),
            bounding_box.max.as_slice(),
            bounding_box.center().as_slice()
        );

        Ok(Self {
            gltf,
            scene: scene_index,
            meshes,
            skeletons,
            animations,
            active_animation,
            joints: JointRepository::new(),
            textures,
            bounding_box,
        })
    }

    /// Advances the scene to playback time `time` and uploads the per-frame
    /// GPU data.
    pub fn update(&mut self, backend: &dyn GpuBackend, time: Time) -> Result<()> {
        if let Some(active) = self.active_animation {
            self.animations[active].apply(time, &mut self.gltf)?;
        }

        for entry in self.meshes.values_mut() {
            entry.instances.clear();
            entry.skin_instances.clear();
        }
        let scene = self.gltf.get(self.scene)?;
        for root in scene.iterate(|s| s.nodes.as_slice()) {
            collect_instances(
                root,
                &Mat4::identity(),
                &mut self.meshes,
                &mut self.joints,
                &mut Vec::new(),
            )?;
        }

        for entry in self.meshes.values_mut() {
            entry.mesh.instances.update(backend, &entry.instances)?;
        }
        for skeleton in self.skeletons.values() {
            skeleton.update_palette(backend, &self.joints)?;
        }
        Ok(())
    }

    /// Draws static instances instanced, and each skinned instance with its
    /// skeleton. Returns the number of draws issued.
    pub fn render(&self, backend: &dyn GpuBackend, renderer: &Renderer) -> Result<usize> {
        let mut draws = 0;
        for entry in self.meshes.values() {
            if !entry.instances.is_empty() {
                draws += renderer.render(backend, &entry.mesh)?;
            }
            for skin in &entry.skin_instances {
                let Some(skeleton) = self.skeletons.get(skin) else {
                    return Err(ViewerError::Format(format!("skin {skin} was not prepared")));
                };
                draws += renderer.render_skinned(backend, &entry.mesh, skeleton)?;
            }
        }
        Ok(draws)
    }

    pub fn gltf(&self) -> &Gltf {
        &self.gltf
    }

    pub fn scene_index(&self) -> Index<gltf::Scene> {
        self.scene
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn meshes(&self) -> &MeshRepository {
        &self.meshes
    }

    pub fn skeletons(&self) -> &SkeletonRepository {
        &self.skeletons
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn active_animation(&self) -> Option<&Animation> {
        self.active_animation.map(|active| &self.animations[active])
    }

    pub fn joints(&self) -> &JointRepository {
        &self.joints
    }

    pub fn textures(&self) -> &TextureRepository {
        &self.textures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arte_core::gltf::Trs;
    use arte_core::math::{Quat, Vec3};

    fn node(transformation: Transformation) -> Node {
        Node {
            name: String::new(),
            camera: None,
            children: Vec::new(),
            transformation,
            mesh: None,
            skin: None,
            used_as_joint: false,
        }
    }

    #[test]
    fn test_local_transform_matrix() {
        let matrix = Mat4::new_translation(&Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(local_transform(&node(Transformation::Matrix(matrix))), matrix);
    }

    #[test]
    fn test_local_transform_trs_order() {
        let quarter_turn = nalgebra::UnitQuaternion::from_axis_angle(
            &nalgebra::Vector3::z_axis(),
            std::f32::consts::FRAC_PI_2,
        );
        let trs = Trs {
            translation: Vec3::new(10.0, 0.0, 0.0),
            rotation: quarter_turn.into_inner(),
            scale: Vec3::new(2.0, 1.0, 1.0),
        };
        let m = local_transform(&node(Transformation::Trs(trs)));
        // Scaled to (2, 0, 0), rotated to (0, 2, 0), then translated.
        let p = m.transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert!((p.coords - Vec3::new(10.0, 2.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_local_transform_identity() {
        let trs = Trs {
            rotation: Quat::new(2.0, 0.0, 0.0, 0.0),
            ..Trs::identity()
        };
        // Non-unit rotations are normalized.
        assert!(local_transform(&node(Transformation::Trs(trs))).is_identity(1e-6));
    }
}
