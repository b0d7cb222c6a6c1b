//! Document model: plain data entities mirroring the glTF JSON.
//!
//! Cross-references between entities are [`Index`] values into the vectors
//! owned by [`Gltf`](super::Gltf). Field names follow the JSON keys in
//! snake case.

use std::collections::BTreeMap;
use std::fmt;

use crate::math::{Mat4, Quat, Vec3};

use super::index::Index;
use super::uri::Uri;

/// Default for [`TextureSampler::wrap_s`] and [`TextureSampler::wrap_t`] (`REPEAT`).
pub const WRAP_REPEAT: u32 = 10497;

// ============================================================================
// Buffers and accessors
// ============================================================================

/// A block of binary data, resolved from a file or data URI.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    pub name: String,
    /// Absent for the embedded buffer of a binary container.
    pub uri: Option<Uri>,
    pub byte_length: usize,
}

/// Usage hint of a buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attributes (`ARRAY_BUFFER`, 34962).
    Array,
    /// Vertex indices (`ELEMENT_ARRAY_BUFFER`, 34963).
    ElementArray,
}

impl BufferTarget {
    /// Maps the GL enumerator stored in the document.
    pub fn from_gl(value: u64) -> Option<Self> {
        match value {
            34962 => Some(Self::Array),
            34963 => Some(Self::ElementArray),
            _ => None,
        }
    }

    pub fn to_gl(self) -> u32 {
        match self {
            Self::Array => 34962,
            Self::ElementArray => 34963,
        }
    }
}

/// A byte sub-range of a [`Buffer`], optionally strided.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferView {
    pub name: String,
    pub buffer: Index<Buffer>,
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
    pub target: Option<BufferTarget>,
}

/// Shape of one accessor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    /// Parses the JSON `type` string.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SCALAR" => Some(Self::Scalar),
            "VEC2" => Some(Self::Vec2),
            "VEC3" => Some(Self::Vec3),
            "VEC4" => Some(Self::Vec4),
            "MAT2" => Some(Self::Mat2),
            "MAT3" => Some(Self::Mat3),
            "MAT4" => Some(Self::Mat4),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric type of one element component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// 5120
    Byte,
    /// 5121
    UnsignedByte,
    /// 5122
    Short,
    /// 5123
    UnsignedShort,
    /// 5125
    UnsignedInt,
    /// 5126
    Float,
}

impl ComponentType {
    /// Maps the GL enumerator stored in the document.
    pub fn from_gl(value: u64) -> Option<Self> {
        match value {
            5120 => Some(Self::Byte),
            5121 => Some(Self::UnsignedByte),
            5122 => Some(Self::Short),
            5123 => Some(Self::UnsignedShort),
            5125 => Some(Self::UnsignedInt),
            5126 => Some(Self::Float),
            _ => None,
        }
    }

    pub fn to_gl(self) -> u32 {
        match self {
            Self::Byte => 5120,
            Self::UnsignedByte => 5121,
            Self::Short => 5122,
            Self::UnsignedShort => 5123,
            Self::UnsignedInt => 5125,
            Self::Float => 5126,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_gl())
    }
}

/// Per-component minimum and maximum of an accessor.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMax<T> {
    pub min: Vec<T>,
    pub max: Vec<T>,
}

/// Accessor bounds, typed after the accessor's component type.
#[derive(Debug, Clone, PartialEq)]
pub enum Bounds {
    Float(MinMax<f32>),
    Int(MinMax<i64>),
    Unsigned(MinMax<u64>),
}

/// Location of the indices of a sparse accessor.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseIndices {
    pub buffer_view: Index<BufferView>,
    pub byte_offset: usize,
    pub component_type: ComponentType,
}

/// Location of the replacement values of a sparse accessor.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseValues {
    pub buffer_view: Index<BufferView>,
    pub byte_offset: usize,
}

/// Elements of an accessor overridden at specific indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Sparse {
    pub count: usize,
    pub indices: SparseIndices,
    pub values: SparseValues,
}

/// Typed view over a byte range of a [`BufferView`].
#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub name: String,
    /// When absent the data is conceptually all zeros.
    pub buffer_view: Option<Index<BufferView>>,
    /// Relative to the buffer view.
    pub byte_offset: usize,
    pub element_type: ElementType,
    pub component_type: ComponentType,
    pub normalized: bool,
    pub count: usize,
    pub bounds: Option<Bounds>,
    pub sparse: Option<Sparse>,
}

// ============================================================================
// Meshes
// ============================================================================

/// Topology of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveMode {
    /// Maps the GL enumerator stored in the document.
    pub fn from_gl(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Points),
            1 => Some(Self::Lines),
            2 => Some(Self::LineLoop),
            3 => Some(Self::LineStrip),
            4 => Some(Self::Triangles),
            5 => Some(Self::TriangleStrip),
            6 => Some(Self::TriangleFan),
            _ => None,
        }
    }

    pub fn to_gl(self) -> u32 {
        match self {
            Self::Points => 0,
            Self::Lines => 1,
            Self::LineLoop => 2,
            Self::LineStrip => 3,
            Self::Triangles => 4,
            Self::TriangleStrip => 5,
            Self::TriangleFan => 6,
        }
    }
}

/// One drawable geometry batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub mode: PrimitiveMode,
    /// Semantic name (`POSITION`, `NORMAL`, ...) to accessor.
    pub attributes: BTreeMap<String, Index<Accessor>>,
    pub indices: Option<Index<Accessor>>,
    pub material: Option<Index<Material>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub primitives: Vec<Primitive>,
}

// ============================================================================
// Nodes and scenes
// ============================================================================

/// Decomposed local transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trs {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Trs {
    /// No translation, identity rotation, unit scale.
    pub fn identity() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Default for Trs {
    fn default() -> Self {
        Self::identity()
    }
}

/// Local transform of a node, either baked or decomposed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transformation {
    Matrix(Mat4),
    Trs(Trs),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub camera: Option<Index<Camera>>,
    pub children: Vec<Index<Node>>,
    pub transformation: Transformation,
    pub mesh: Option<Index<Mesh>>,
    pub skin: Option<Index<Skin>>,
    /// Set by the loader when a skin lists this node as a joint.
    pub used_as_joint: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub name: String,
    /// Root nodes.
    pub nodes: Vec<Index<Node>>,
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Scene>")?;
        if !self.name.is_empty() {
            write!(f, " {}", self.name)?;
        }
        write!(f, " nodes: [")?;
        for (position, node) in self.nodes.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{node}")?;
        }
        write!(f, "]")
    }
}

// ============================================================================
// Cameras
// ============================================================================

/// Camera projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Orthographic {
        xmag: f32,
        ymag: f32,
        zfar: f32,
        znear: f32,
    },
    Perspective {
        aspect_ratio: Option<f32>,
        yfov: f32,
        zfar: Option<f32>,
        znear: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: String,
    pub projection: Projection,
}

// ============================================================================
// Materials and textures
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureInfo {
    pub index: Index<Texture>,
    pub tex_coord: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalTextureInfo {
    pub index: Index<Texture>,
    pub tex_coord: u32,
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcclusionTextureInfo {
    pub index: Index<Texture>,
    pub tex_coord: u32,
    pub strength: f32,
}

/// PBR metallic-roughness parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PbrMetallicRoughness {
    /// Linear RGBA.
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness_texture: Option<TextureInfo>,
}

impl PbrMetallicRoughness {
    /// Values used when a material has no `pbrMetallicRoughness` block.
    pub const DEFAULT: Self = Self {
        base_color_factor: [1.0, 1.0, 1.0, 1.0],
        base_color_texture: None,
        metallic_factor: 1.0,
        roughness_factor: 1.0,
        metallic_roughness_texture: None,
    };
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "OPAQUE" => Some(Self::Opaque),
            "MASK" => Some(Self::Mask),
            "BLEND" => Some(Self::Blend),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Material {
    pub name: String,
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
    pub normal_texture: Option<NormalTextureInfo>,
    pub occlusion_texture: Option<OcclusionTextureInfo>,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: Option<f32>,
    pub double_sided: bool,
}

impl Material {
    /// PBR block, or the default one when absent.
    pub fn pbr(&self) -> PbrMetallicRoughness {
        self.pbr_metallic_roughness.unwrap_or_default()
    }
}

/// Wrap and filter parameters of a texture, as GL enumerators.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSampler {
    pub name: String,
    pub mag_filter: Option<u32>,
    pub min_filter: Option<u32>,
    pub wrap_s: u32,
    pub wrap_t: u32,
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self {
            name: String::new(),
            mag_filter: None,
            min_filter: None,
            wrap_s: WRAP_REPEAT,
            wrap_t: WRAP_REPEAT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub name: String,
    pub source: Option<Index<Image>>,
    pub sampler: Option<Index<TextureSampler>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MimeType {
    ImageJpeg,
    ImagePng,
}

impl MimeType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "image/jpeg" => Some(Self::ImageJpeg),
            "image/png" => Some(Self::ImagePng),
            _ => None,
        }
    }
}

/// Where the pixels of an [`Image`] come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Uri(Uri),
    BufferView(Index<BufferView>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub name: String,
    pub source: ImageSource,
    /// Required to decode bytes that do not come from a file.
    pub mime_type: Option<MimeType>,
}

// ============================================================================
// Skins and animations
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    pub name: String,
    /// Identity matrices are assumed when absent.
    pub inverse_bind_matrices: Option<Index<Accessor>>,
    pub skeleton: Option<Index<Node>>,
    pub joints: Vec<Index<Node>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

impl Interpolation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "LINEAR" => Some(Self::Linear),
            "STEP" => Some(Self::Step),
            "CUBICSPLINE" => Some(Self::CubicSpline),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "LINEAR",
            Self::Step => "STEP",
            Self::CubicSpline => "CUBICSPLINE",
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keyframe track of an animation: timestamps and output values.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSampler {
    pub input: Index<Accessor>,
    pub interpolation: Interpolation,
    pub output: Index<Accessor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl TargetPath {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "translation" => Some(Self::Translation),
            "rotation" => Some(Self::Rotation),
            "scale" => Some(Self::Scale),
            "weights" => Some(Self::Weights),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub node: Option<Index<Node>>,
    pub path: TargetPath,
}

/// Binds a sampler of the same animation to a node property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    /// Index into [`Animation::samplers`].
    pub sampler: Index<AnimationSampler>,
    pub target: Target,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    pub channels: Vec<Channel>,
    pub samplers: Vec<AnimationSampler>,
}
