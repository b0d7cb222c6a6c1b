//! JSON to document model.
//!
//! Every entity kind implements [`FromJson`]; [`populate_vector`] reads a
//! top-level array and loads each element in order, so indices match the
//! JSON array positions. Cross-references are validated once the whole
//! document is loaded.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::math::{quat_from_array, Mat4, Vec3};

use super::error::GltfError;
use super::index::Index;
use super::owned::Indexed;
use super::types::*;
use super::uri::Uri;
use super::{check_index, Gltf};

/// Per-entity loading from one JSON object.
pub(crate) trait FromJson: Sized {
    /// Top-level array holding this entity kind.
    const SECTION: &'static str;

    fn load(json: &Value, context: &str) -> Result<Self, GltfError>;
}

/// Loads the array `T::SECTION` of `root`, or nothing when it is absent.
pub(crate) fn populate_vector<T: FromJson>(root: &Map<String, Value>) -> Result<Vec<T>, GltfError> {
    let Some(section) = root.get(T::SECTION) else {
        return Ok(Vec::new());
    };
    let items = section
        .as_array()
        .ok_or_else(|| GltfError::invalid("document", T::SECTION))?;
    items
        .iter()
        .enumerate()
        .map(|(position, item)| T::load(item, &format!("{}[{}]", T::SECTION, position)))
        .collect()
}

pub(crate) fn load_document(json: &Value, path: PathBuf) -> Result<Gltf, GltfError> {
    let root = json
        .as_object()
        .ok_or_else(|| GltfError::invalid("document", "root"))?;
    let fields = Fields {
        map: root,
        context: "document",
    };

    let mut gltf = Gltf {
        path,
        default_scene: fields.optional_index("scene")?,
        scenes: populate_vector(root)?,
        nodes: populate_vector(root)?,
        meshes: populate_vector(root)?,
        animations: populate_vector(root)?,
        buffers: populate_vector(root)?,
        buffer_views: populate_vector(root)?,
        accessors: populate_vector(root)?,
        materials: populate_vector(root)?,
        images: populate_vector(root)?,
        textures: populate_vector(root)?,
        samplers: populate_vector(root)?,
        skins: populate_vector(root)?,
        cameras: populate_vector(root)?,
    };

    validate_references(&gltf)?;
    mark_joints(&mut gltf);
    Ok(gltf)
}

/// Flags every node listed as a joint by some skin.
fn mark_joints(gltf: &mut Gltf) {
    let joints: Vec<Index<Node>> = gltf
        .skins
        .iter()
        .flat_map(|skin| skin.joints.iter().copied())
        .collect();
    for joint in joints {
        gltf.nodes[joint.value()].used_as_joint = true;
    }
}

// ============================================================================
// Field extraction
// ============================================================================

/// A JSON object together with the name of the element it describes.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    context: &'a str,
}

impl<'a> Fields<'a> {
    fn of(json: &'a Value, context: &'a str) -> Result<Self, GltfError> {
        let map = json
            .as_object()
            .ok_or_else(|| GltfError::InvalidField {
                context: context.to_string(),
                field: "<object>",
            })?;
        Ok(Self { map, context })
    }

    fn value(&self, field: &'static str) -> Option<&'a Value> {
        self.map.get(field).filter(|value| !value.is_null())
    }

    fn required(&self, field: &'static str) -> Result<&'a Value, GltfError> {
        self.value(field)
            .ok_or_else(|| GltfError::missing(self.context, field))
    }

    fn object(&self, field: &'static str) -> Result<Option<&'a Value>, GltfError> {
        match self.value(field) {
            Some(value) if value.is_object() => Ok(Some(value)),
            Some(_) => Err(GltfError::invalid(self.context, field)),
            None => Ok(None),
        }
    }

    fn name(&self) -> Result<String, GltfError> {
        Ok(self.optional_str("name")?.unwrap_or_default().to_string())
    }

    fn optional_str(&self, field: &'static str) -> Result<Option<&'a str>, GltfError> {
        self.value(field)
            .map(|value| value.as_str().ok_or_else(|| GltfError::invalid(self.context, field)))
            .transpose()
    }

    fn required_str(&self, field: &'static str) -> Result<&'a str, GltfError> {
        self.optional_str(field)?
            .ok_or_else(|| GltfError::missing(self.context, field))
    }

    fn optional_u64(&self, field: &'static str) -> Result<Option<u64>, GltfError> {
        self.value(field)
            .map(|value| value.as_u64().ok_or_else(|| GltfError::invalid(self.context, field)))
            .transpose()
    }

    fn required_u64(&self, field: &'static str) -> Result<u64, GltfError> {
        self.optional_u64(field)?
            .ok_or_else(|| GltfError::missing(self.context, field))
    }

    fn optional_usize(&self, field: &'static str) -> Result<Option<usize>, GltfError> {
        self.optional_u64(field)?
            .map(|value| usize::try_from(value).map_err(|_| GltfError::invalid(self.context, field)))
            .transpose()
    }

    fn required_usize(&self, field: &'static str) -> Result<usize, GltfError> {
        self.optional_usize(field)?
            .ok_or_else(|| GltfError::missing(self.context, field))
    }

    fn optional_u32(&self, field: &'static str) -> Result<Option<u32>, GltfError> {
        self.optional_u64(field)?
            .map(|value| u32::try_from(value).map_err(|_| GltfError::invalid(self.context, field)))
            .transpose()
    }

    fn optional_f32(&self, field: &'static str) -> Result<Option<f32>, GltfError> {
        self.value(field)
            .map(|value| {
                value
                    .as_f64()
                    .map(|number| number as f32)
                    .ok_or_else(|| GltfError::invalid(self.context, field))
            })
            .transpose()
    }

    fn required_f32(&self, field: &'static str) -> Result<f32, GltfError> {
        self.optional_f32(field)?
            .ok_or_else(|| GltfError::missing(self.context, field))
    }

    fn bool_or(&self, field: &'static str, default: bool) -> Result<bool, GltfError> {
        self.value(field)
            .map(|value| value.as_bool().ok_or_else(|| GltfError::invalid(self.context, field)))
            .transpose()
            .map(|value| value.unwrap_or(default))
    }

    fn optional_index<T>(&self, field: &'static str) -> Result<Option<Index<T>>, GltfError> {
        Ok(self.optional_usize(field)?.map(Index::new))
    }

    fn required_index<T>(&self, field: &'static str) -> Result<Index<T>, GltfError> {
        Ok(Index::new(self.required_usize(field)?))
    }

    fn array(&self, field: &'static str) -> Result<Option<&'a Vec<Value>>, GltfError> {
        self.value(field)
            .map(|value| value.as_array().ok_or_else(|| GltfError::invalid(self.context, field)))
            .transpose()
    }

    fn required_array(&self, field: &'static str) -> Result<&'a Vec<Value>, GltfError> {
        self.array(field)?
            .ok_or_else(|| GltfError::missing(self.context, field))
    }

    fn index_array<T>(&self, field: &'static str) -> Result<Vec<Index<T>>, GltfError> {
        let Some(items) = self.array(field)? else {
            return Ok(Vec::new());
        };
        items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|value| usize::try_from(value).ok())
                    .map(Index::new)
                    .ok_or_else(|| GltfError::invalid(self.context, field))
            })
            .collect()
    }

    fn float_array<const N: usize>(&self, field: &'static str) -> Result<Option<[f32; N]>, GltfError> {
        let Some(items) = self.array(field)? else {
            return Ok(None);
        };
        if items.len() != N {
            return Err(GltfError::invalid(self.context, field));
        }
        let mut values = [0.0; N];
        for (slot, item) in values.iter_mut().zip(items) {
            *slot = item
                .as_f64()
                .ok_or_else(|| GltfError::invalid(self.context, field))? as f32;
        }
        Ok(Some(values))
    }

    fn enumeration<E>(
        &self,
        field: &'static str,
        kind: &'static str,
        from_name: impl FnOnce(&str) -> Option<E>,
    ) -> Result<Option<E>, GltfError> {
        self.optional_str(field)?
            .map(|name| from_name(name).ok_or_else(|| GltfError::unknown(self.context, kind, name)))
            .transpose()
    }

    fn code<E>(
        &self,
        field: &'static str,
        kind: &'static str,
        from_gl: impl FnOnce(u64) -> Option<E>,
    ) -> Result<Option<E>, GltfError> {
        self.optional_u64(field)?
            .map(|code| from_gl(code).ok_or_else(|| GltfError::unknown(self.context, kind, code)))
            .transpose()
    }

    fn nested(&self, field: &'static str, suffix: &str) -> String {
        format!("{}.{}{}", self.context, field, suffix)
    }
}

// ============================================================================
// Entities
// ============================================================================

impl FromJson for Scene {
    const SECTION: &'static str = "scenes";

    fn load(json: &Value, context: &str) -> Result<Self, GltfError> {
        let fields = Fields::of(json, context)?;
        Ok(Self {
            name: fields.name()?,
            nodes: fields.index_array("nodes")?,
        })
    }
}

impl FromJson for Node {
    const SECTION: &'static str = "nodes";

    fn load(json: &Value, context: &str) -> Result<Self, GltfError> {
        let fields = Fields::of(json, context)?;
        let translation = fields.float_array::<3>("translation")?;
        let rotation = fields.float_array::<4>("rotation")?;
        let scale = fields.float_array::<3>("scale")?;

        let transformation = if translation.is_some() || rotation.is_some() || scale.is_some() {
            let identity = Trs::identity();
            Transformation::Trs(Trs {
                translation: translation.map(Vec3::from).unwrap_or(identity.translation),
                rotation: rotation.map(quat_from_array).unwrap_or(identity.rotation),
                scale: scale.map(Vec3::from).unwrap_or(identity.scale),
            })
        } else {
            let matrix = fields
                .float_array::<16>("matrix")?
                .map(|columns| Mat4::from_column_slice(&columns))
                .unwrap_or_else(Mat4::identity);
            Transformation::Matrix(matrix)
        };

        Ok(Self {
            name: fields.name()?,
            camera: fields.optional_index("camera")?,
            children: fields.index_array("children")?,
            transformation,
            mesh: fields.optional_index("mesh")?,
            skin: fields.optional_index("skin")?,
            used_as_joint: false,
        })
    }
}

impl FromJson for Mesh {
    const SECTION: &'static str = "meshes";

    fn load(json: &Value, context: &str) -> Result<Self, GltfError> {
        let fields = Fields::of(json, context)?;
        let primitives = fields
            .required_array("primitives")?
            .iter()
            .enumerate()
            .map(|(position, item)| load_primitive(item, &fields.nested("primitives", &format!("[{position}]"))))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            name: fields.name()?,
            primitives,
        })
    }
}

fn load_primitive(json: &Value, context: &str) -> Result<Primitive, GltfError> {
    let fields = Fields::of(json, context)?;
    let attributes = fields
        .required("attributes")?
        .as_object()
        .ok_or_else(|| GltfError::invalid(context, "attributes"))?
        .iter()
        .map(|(semantic, value)| {
            value
                .as_u64()
                .and_then(|value| usize::try_from(value).ok())
                .map(|value| (semantic.clone(), Index::new(value)))
                .ok_or_else(|| GltfError::invalid(context, "attributes"))
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    Ok(Primitive {
        mode: fields
            .code("mode", "primitive mode", PrimitiveMode::from_gl)?
            .unwrap_or_default(),
        attributes,
        indices: fields.optional_index("indices")?,
        material: fields.optional_index("material")?,
    })
}

impl FromJson for Animation {
    const SECTION: &'static str = "animations";

    fn load(json: &Value, context: &str) -> Result<Self, GltfError> {
        let fields = Fields::of(json, context)?;
        let channels = fields
            .required_array("channels")?
            .iter()
            .enumerate()
            .map(|(position, item)| load_channel(item, &fields.nested("channels", &format!("[{position}]"))))
            .collect::<Result<_, _>>()?;
        let samplers = fields
            .required_array("samplers")?
            .iter()
            .enumerate()
            .map(|(position, item)| {
                load_animation_sampler(item, &fields.nested("samplers", &format!("[{position}]")))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            name: fields.name()?,
            channels,
            samplers,
        })
    }
}

fn load_channel(json: &Value, context: &str) -> Result<Channel, GltfError> {
    let fields = Fields::of(json, context)?;
    let target_context = fields.nested("target", "");
    let target = Fields::of(fields.required("target")?, &target_context)?;
    Ok(Channel {
        sampler: fields.required_index("sampler")?,
        target: Target {
            node: target.optional_index("node")?,
            path: target
                .enumeration("path", "target path", TargetPath::from_name)?
                .ok_or_else(|| GltfError::missing(&target_context, "path"))?,
        },
    })
}

fn load_animation_sampler(json: &Value, context: &str) -> Result<AnimationSampler, GltfError> {
    let fields = Fields::of(json, context)?;
    Ok(AnimationSampler {
        input: fields.required_index("input")?,
        interpolation: fields
            .enumeration("interpolation", "interpolation", Interpolation::from_name)?
            .unwrap_or_default(),
        output: fields.required_index("output")?,
    })
}

impl FromJson for Buffer {
    const SECTION: &'static str = "buffers";

    fn load(json: &Value, context: &str) -> Result<Self, GltfError> {
        let fields = Fields::of(json, context)?;
        Ok(Self {
            name: fields.name()?,
            uri: fields.optional_str("uri")?.map(Uri::new),
            byte_length: fields.required_usize("byteLength")?,
        })
    }
}

impl FromJson for BufferView {
    const SECTION: &'static str = "bufferViews";

    fn load(json: &Value, context: &str) -> Result<Self, GltfError> {
        let fields = Fields::of(json, context)?;
        Ok(Self {
            name: fields.name()?,
            buffer: fields.required_index("buffer")?,
            byte_offset: fields.optional_usize("byteOffset")?.unwrap_or(0),
            byte_length: fields.required_usize("byteLength")?,
            byte_stride: fields.optional_usize("byteStride")?,
            target: fields.code("target", "buffer view target", BufferTarget::from_gl)?,
        })
    }
}

impl FromJson for Accessor {
    const SECTION: &'static str = "accessors";

    fn load(json: &Value, context: &str) -> Result<Self, GltfError> {
        let fields = Fields::of(json, context)?;
        let component_type = fields
            .code("componentType", "component type", ComponentType::from_gl)?
            .ok_or_else(|| GltfError::missing(context, "componentType"))?;
        let element_type = fields
            .enumeration("type", "accessor type", ElementType::from_name)?
            .ok_or_else(|| GltfError::missing(context, "type"))?;

        let sparse = fields
            .object("sparse")?
            .map(|sparse| load_sparse(sparse, &fields.nested("sparse", "")))
            .transpose()?;

        Ok(Self {
            name: fields.name()?,
            buffer_view: fields.optional_index("bufferView")?,
            byte_offset: fields.optional_usize("byteOffset")?.unwrap_or(0),
            element_type,
            component_type,
            normalized: fields.bool_or("normalized", false)?,
            count: fields.required_usize("count")?,
            bounds: load_bounds(&fields, component_type)?,
            sparse,
        })
    }
}

/// Reads `min`/`max`, typed after the component type. Bounds are only
/// considered present when `max` is.
fn load_bounds(fields: &Fields<'_>, component_type: ComponentType) -> Result<Option<Bounds>, GltfError> {
    let Some(max) = fields.array("max")? else {
        return Ok(None);
    };
    let min = fields.required_array("min")?;

    fn convert<T>(
        values: &[Value],
        fields: &Fields<'_>,
        field: &'static str,
        cast: impl Fn(&Value) -> Option<T>,
    ) -> Result<Vec<T>, GltfError> {
        values
            .iter()
            .map(|value| cast(value).ok_or_else(|| GltfError::invalid(fields.context, field)))
            .collect()
    }

    let bounds = match component_type {
        ComponentType::Float => Bounds::Float(MinMax {
            min: convert(min, fields, "min", |v| v.as_f64().map(|n| n as f32))?,
            max: convert(max, fields, "max", |v| v.as_f64().map(|n| n as f32))?,
        }),
        ComponentType::Byte | ComponentType::Short => Bounds::Int(MinMax {
            min: convert(min, fields, "min", Value::as_i64)?,
            max: convert(max, fields, "max", Value::as_i64)?,
        }),
        ComponentType::UnsignedByte | ComponentType::UnsignedShort | ComponentType::UnsignedInt => {
            Bounds::Unsigned(MinMax {
                min: convert(min, fields, "min", Value::as_u64)?,
                max: convert(max, fields, "max", Value::as_u64)?,
            })
        }
    };
    Ok(Some(bounds))
}

fn load_sparse(json: &Value, context: &str) -> Result<Sparse, GltfError> {
    let fields = Fields::of(json, context)?;

    let indices_context = fields.nested("indices", "");
    let indices = Fields::of(fields.required("indices")?, &indices_context)?;
    let values_context = fields.nested("values", "");
    let values = Fields::of(fields.required("values")?, &values_context)?;

    Ok(Sparse {
        count: fields.required_usize("count")?,
        indices: SparseIndices {
            buffer_view: indices.required_index("bufferView")?,
            byte_offset: indices.optional_usize("byteOffset")?.unwrap_or(0),
            component_type: indices
                .code("componentType", "component type", ComponentType::from_gl)?
                .ok_or_else(|| GltfError::missing(&indices_context, "componentType"))?,
        },
        values: SparseValues {
            buffer_view: values.required_index("bufferView")?,
            byte_offset: values.optional_usize("byteOffset")?.unwrap_or(0),
        },
    })
}

impl FromJson for Material {
    const SECTION: &'static str = "materials";

    fn load(json: &Value, context: &str) -> Result<Self, GltfError> {
        let fields = Fields::of(json, context)?;

        let pbr_metallic_roughness = fields
            .object("pbrMetallicRoughness")?
            .map(|pbr| {
                let pbr_context = fields.nested("pbrMetallicRoughness", "");
                let pbr = Fields::of(pbr, &pbr_context)?;
                let defaults = PbrMetallicRoughness::DEFAULT;
                Ok::<_, GltfError>(PbrMetallicRoughness {
                    base_color_factor: pbr
                        .float_array::<4>("baseColorFactor")?
                        .unwrap_or(defaults.base_color_factor),
                    base_color_texture: load_texture_info(&pbr, "baseColorTexture")?,
                    metallic_factor: pbr.optional_f32("metallicFactor")?.unwrap_or(defaults.metallic_factor),
                    roughness_factor: pbr
                        .optional_f32("roughnessFactor")?
                        .unwrap_or(defaults.roughness_factor),
                    metallic_roughness_texture: load_texture_info(&pbr, "metallicRoughnessTexture")?,
                })
            })
            .transpose()?;

        let normal_texture = match fields.object("normalTexture")? {
            Some(info) => {
                let info_context = fields.nested("normalTexture", "");
                let info = Fields::of(info, &info_context)?;
                Some(NormalTextureInfo {
                    index: info.required_index("index")?,
                    tex_coord: info.optional_u32("texCoord")?.unwrap_or(0),
                    scale: info.optional_f32("scale")?.unwrap_or(1.0),
                })
            }
            None => None,
        };

        let occlusion_texture = match fields.object("occlusionTexture")? {
            Some(info) => {
                let info_context = fields.nested("occlusionTexture", "");
                let info = Fields::of(info, &info_context)?;
                Some(OcclusionTextureInfo {
                    index: info.required_index("index")?,
                    tex_coord: info.optional_u32("texCoord")?.unwrap_or(0),
                    strength: info.optional_f32("strength")?.unwrap_or(1.0),
                })
            }
            None => None,
        };

        Ok(Self {
            name: fields.name()?,
            pbr_metallic_roughness,
            normal_texture,
            occlusion_texture,
            alpha_mode: fields
                .enumeration("alphaMode", "alpha mode", AlphaMode::from_name)?
                .unwrap_or_default(),
            alpha_cutoff: fields.optional_f32("alphaCutoff")?,
            double_sided: fields.bool_or("doubleSided", false)?,
        })
    }
}

fn load_texture_info(fields: &Fields<'_>, field: &'static str) -> Result<Option<TextureInfo>, GltfError> {
    let Some(info) = fields.object(field)? else {
        return Ok(None);
    };
    let context = fields.nested(field, "");
    let info = Fields::of(info, &context)?;
    Ok(Some(TextureInfo {
        index: info.required_index("index")?,
        tex_coord: info.optional_u32("texCoord")?.unwrap_or(0),
    }))
}

impl FromJson for Image {
    const SECTION: &'static str = "images";

    fn load(json: &Value, context: &str) -> Result<Self, GltfError> {
        let fields = Fields::of(json, context)?;
        let source = match fields.optional_str("uri")? {
            Some(uri) => ImageSource::Uri(Uri::new(uri)),
            None => ImageSource::BufferView(fields.required_index("bufferView")?),
        };
        Ok(Self {
            name: fields.name()?,
            source,
            mime_type: fields.enumeration("mimeType", "mime type", MimeType::from_name)?,
        })
    }
}

impl FromJson for Texture {
    const SECTION: &'static str = "textures";

    fn load(json: &Value, context: &str) -> Result<Self, GltfError> {
        let fields = Fields::of(json, context)?;
        Ok(Self {
            name: fields.name()?,
            source: fields.optional_index("source")?,
            sampler: fields.optional_index("sampler")?,
        })
    }
}

impl FromJson for TextureSampler {
    const SECTION: &'static str = "samplers";

    fn load(json: &Value, context: &str) -> Result<Self, GltfError> {
        let fields = Fields::of(json, context)?;
        Ok(Self {
            name: fields.name()?,
            mag_filter: fields.optional_u32("magFilter")?,
            min_filter: fields.optional_u32("minFilter")?,
            wrap_s: fields.optional_u32("wrapS")?.unwrap_or(WRAP_REPEAT),
            wrap_t: fields.optional_u32("wrapT")?.unwrap_or(WRAP_REPEAT),
        })
    }
}

impl FromJson for Skin {
    const SECTION: &'static str = "skins";

    fn load(json: &Value, context: &str) -> Result<Self, GltfError> {
        let fields = Fields::of(json, context)?;
        if fields.array("joints")?.is_none() {
            return Err(GltfError::missing(context, "joints"));
        }
        Ok(Self {
            name: fields.name()?,
            inverse_bind_matrices: fields.optional_index("inverseBindMatrices")?,
            skeleton: fields.optional_index("skeleton")?,
            joints: fields.index_array("joints")?,
        })
    }
}

impl FromJson for Camera {
    const SECTION: &'static str = "cameras";

    fn load(json: &Value, context: &str) -> Result<Self, GltfError> {
        let fields = Fields::of(json, context)?;
        let projection = match fields.required_str("type")? {
            "orthographic" => {
                let inner_context = fields.nested("orthographic", "");
                let inner = Fields::of(fields.required("orthographic")?, &inner_context)?;
                Projection::Orthographic {
                    xmag: inner.required_f32("xmag")?,
                    ymag: inner.required_f32("ymag")?,
                    zfar: inner.required_f32("zfar")?,
                    znear: inner.required_f32("znear")?,
                }
            }
            "perspective" => {
                let inner_context = fields.nested("perspective", "");
                let inner = Fields::of(fields.required("perspective")?, &inner_context)?;
                Projection::Perspective {
                    aspect_ratio: inner.optional_f32("aspectRatio")?,
                    yfov: inner.required_f32("yfov")?,
                    zfar: inner.optional_f32("zfar")?,
                    znear: inner.required_f32("znear")?,
                }
            }
            other => return Err(GltfError::unknown(context, "camera type", other)),
        };
        Ok(Self {
            name: fields.name()?,
            projection,
        })
    }
}

// ============================================================================
// Reference validation
// ============================================================================

fn check_all<'i, T: Indexed>(
    gltf: &Gltf,
    indices: impl IntoIterator<Item = &'i Index<T>>,
    context: impl Fn() -> String,
) -> Result<(), GltfError> {
    for &index in indices {
        check_index(gltf, index, &context)?;
    }
    Ok(())
}

fn check_optional<T: Indexed>(
    gltf: &Gltf,
    index: Option<Index<T>>,
    context: impl FnOnce() -> String,
) -> Result<(), GltfError> {
    match index {
        Some(index) => check_index(gltf, index, context),
        None => Ok(()),
    }
}

/// Checks every cross-reference of the document against its target vector.
fn validate_references(gltf: &Gltf) -> Result<(), GltfError> {
    check_optional(gltf, gltf.default_scene, || "document.scene".to_string())?;

    for (position, scene) in gltf.scenes.iter().enumerate() {
        check_all(gltf, &scene.nodes, || format!("scenes[{position}]"))?;
    }

    for (position, node) in gltf.nodes.iter().enumerate() {
        let context = || format!("nodes[{position}]");
        check_all(gltf, &node.children, context)?;
        check_optional(gltf, node.mesh, context)?;
        check_optional(gltf, node.skin, context)?;
        check_optional(gltf, node.camera, context)?;
    }

    for (position, mesh) in gltf.meshes.iter().enumerate() {
        for (primitive_position, primitive) in mesh.primitives.iter().enumerate() {
            let context = || format!("meshes[{position}].primitives[{primitive_position}]");
            check_all(gltf, primitive.attributes.values(), context)?;
            check_optional(gltf, primitive.indices, context)?;
            check_optional(gltf, primitive.material, context)?;
        }
    }

    for (position, animation) in gltf.animations.iter().enumerate() {
        for (sampler_position, sampler) in animation.samplers.iter().enumerate() {
            let context = || format!("animations[{position}].samplers[{sampler_position}]");
            check_index(gltf, sampler.input, context)?;
            check_index(gltf, sampler.output, context)?;
        }
        for (channel_position, channel) in animation.channels.iter().enumerate() {
            let context = || format!("animations[{position}].channels[{channel_position}]");
            if channel.sampler.value() >= animation.samplers.len() {
                return Err(GltfError::DanglingIndex {
                    context: context(),
                    kind: "animation sampler",
                    index: channel.sampler.value(),
                    len: animation.samplers.len(),
                });
            }
            check_optional(gltf, channel.target.node, context)?;
        }
    }

    for (position, view) in gltf.buffer_views.iter().enumerate() {
        let context = || format!("bufferViews[{position}]");
        check_index(gltf, view.buffer, context)?;
        let available = gltf.buffers[view.buffer.value()].byte_length;
        let end = view.byte_offset.saturating_add(view.byte_length);
        if end > available {
            return Err(GltfError::OutOfRange {
                context: context(),
                start: view.byte_offset,
                end,
                len: available,
            });
        }
    }

    for (position, accessor) in gltf.accessors.iter().enumerate() {
        let context = || format!("accessors[{position}]");
        check_optional(gltf, accessor.buffer_view, context)?;
        if let Some(sparse) = &accessor.sparse {
            check_index(gltf, sparse.indices.buffer_view, context)?;
            check_index(gltf, sparse.values.buffer_view, context)?;
        }
    }

    for (position, material) in gltf.materials.iter().enumerate() {
        let context = || format!("materials[{position}]");
        if let Some(pbr) = &material.pbr_metallic_roughness {
            check_optional(gltf, pbr.base_color_texture.map(|info| info.index), context)?;
            check_optional(gltf, pbr.metallic_roughness_texture.map(|info| info.index), context)?;
        }
        check_optional(gltf, material.normal_texture.map(|info| info.index), context)?;
        check_optional(gltf, material.occlusion_texture.map(|info| info.index), context)?;
    }

    for (position, image) in gltf.images.iter().enumerate() {
        if let ImageSource::BufferView(view) = &image.source {
            check_index(gltf, *view, || format!("images[{position}]"))?;
        }
    }

    for (position, texture) in gltf.textures.iter().enumerate() {
        let context = || format!("textures[{position}]");
        check_optional(gltf, texture.source, context)?;
        check_optional(gltf, texture.sampler, context)?;
    }

    for (position, skin) in gltf.skins.iter().enumerate() {
        let context = || format!("skins[{position}]");
        check_optional(gltf, skin.inverse_bind_matrices, context)?;
        check_optional(gltf, skin.skeleton, context)?;
        check_all(gltf, &skin.joints, context)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_section_is_empty() {
        let root = json!({ "asset": { "version": "2.0" } });
        let scenes: Vec<Scene> = populate_vector(root.as_object().unwrap()).unwrap();
        assert!(scenes.is_empty());
    }

    #[test]
    fn test_node_trs_takes_precedence_over_matrix() {
        let node = Node::load(
            &json!({ "translation": [1.0, 2.0, 3.0], "matrix": [2.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0] }),
            "nodes[0]",
        )
        .unwrap();
        match node.transformation {
            Transformation::Trs(trs) => {
                assert_eq!(trs.translation, Vec3::new(1.0, 2.0, 3.0));
                assert_eq!(trs.scale, Vec3::new(1.0, 1.0, 1.0));
            }
            Transformation::Matrix(_) => panic!("expected TRS"),
        }
    }

    #[test]
    fn test_node_matrix_is_column_major() {
        let node = Node::load(
            &json!({ "matrix": [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0, 6.0, 7.0, 1.0] }),
            "nodes[0]",
        )
        .unwrap();
        match node.transformation {
            Transformation::Matrix(matrix) => {
                assert_eq!(matrix[(0, 3)], 5.0);
                assert_eq!(matrix[(1, 3)], 6.0);
                assert_eq!(matrix[(2, 3)], 7.0);
            }
            Transformation::Trs(_) => panic!("expected matrix"),
        }
    }

    #[test]
    fn test_node_without_transform_is_identity_matrix() {
        let node = Node::load(&json!({}), "nodes[0]").unwrap();
        assert_eq!(node.transformation, Transformation::Matrix(Mat4::identity()));
    }

    #[test]
    fn test_accessor_defaults_and_bounds() {
        let accessor = Accessor::load(
            &json!({
                "bufferView": 0,
                "componentType": 5126,
                "count": 3,
                "type": "VEC3",
                "min": [0.0, 0.0, 0.0],
                "max": [1.0, 1.0, 0.0]
            }),
            "accessors[0]",
        )
        .unwrap();
        assert_eq!(accessor.byte_offset, 0);
        assert!(!accessor.normalized);
        assert_eq!(
            accessor.bounds,
            Some(Bounds::Float(MinMax {
                min: vec![0.0, 0.0, 0.0],
                max: vec![1.0, 1.0, 0.0],
            }))
        );
    }

    #[test]
    fn test_unsigned_bounds() {
        let accessor = Accessor::load(
            &json!({ "componentType": 5123, "count": 6, "type": "SCALAR", "min": [0], "max": [3] }),
            "accessors[0]",
        )
        .unwrap();
        assert_eq!(
            accessor.bounds,
            Some(Bounds::Unsigned(MinMax { min: vec![0], max: vec![3] }))
        );
    }

    #[test]
    fn test_unknown_accessor_type() {
        let err = Accessor::load(
            &json!({ "componentType": 5126, "count": 1, "type": "VEC5" }),
            "accessors[4]",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "accessors[4]: unknown accessor type 'VEC5'");
    }

    #[test]
    fn test_missing_required_field() {
        let err = BufferView::load(&json!({ "byteLength": 4 }), "bufferViews[1]").unwrap_err();
        assert_eq!(err.to_string(), "bufferViews[1]: missing required field 'buffer'");
    }

    #[test]
    fn test_primitive_mode_default() {
        let mesh = Mesh::load(
            &json!({ "primitives": [{ "attributes": { "POSITION": 0 } }] }),
            "meshes[0]",
        )
        .unwrap();
        assert_eq!(mesh.primitives[0].mode, PrimitiveMode::Triangles);
        assert_eq!(mesh.primitives[0].attributes["POSITION"], Index::new(0));
    }

    #[test]
    fn test_sampler_interpolation_default() {
        let animation = Animation::load(
            &json!({
                "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }],
                "samplers": [{ "input": 0, "output": 1 }]
            }),
            "animations[0]",
        )
        .unwrap();
        assert_eq!(animation.samplers[0].interpolation, Interpolation::Linear);
        assert_eq!(animation.channels[0].target.path, TargetPath::Translation);
    }

    #[test]
    fn test_image_source_selection() {
        let from_uri = Image::load(&json!({ "uri": "albedo.png" }), "images[0]").unwrap();
        assert_eq!(from_uri.source, ImageSource::Uri(Uri::new("albedo.png")));

        let from_view = Image::load(
            &json!({ "bufferView": 2, "mimeType": "image/png" }),
            "images[1]",
        )
        .unwrap();
        assert_eq!(from_view.source, ImageSource::BufferView(Index::new(2)));
        assert_eq!(from_view.mime_type, Some(MimeType::ImagePng));

        let err = Image::load(&json!({}), "images[2]").unwrap_err();
        assert_eq!(err.to_string(), "images[2]: missing required field 'bufferView'");
    }

    #[test]
    fn test_material_defaults() {
        let material = Material::load(&json!({}), "materials[0]").unwrap();
        assert_eq!(material.alpha_mode, AlphaMode::Opaque);
        assert!(!material.double_sided);
        assert_eq!(material.pbr(), PbrMetallicRoughness::DEFAULT);

        let material = Material::load(
            &json!({ "pbrMetallicRoughness": { "baseColorTexture": { "index": 1 } }, "alphaMode": "BLEND" }),
            "materials[1]",
        )
        .unwrap();
        let pbr = material.pbr();
        assert_eq!(pbr.base_color_factor, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(
            pbr.base_color_texture,
            Some(TextureInfo {
                index: Index::new(1),
                tex_coord: 0
            })
        );
        assert_eq!(material.alpha_mode, AlphaMode::Blend);
    }

    #[test]
    fn test_camera_projection() {
        let camera = Camera::load(
            &json!({ "type": "perspective", "perspective": { "yfov": 0.8, "znear": 0.1 } }),
            "cameras[0]",
        )
        .unwrap();
        assert_eq!(
            camera.projection,
            Projection::Perspective {
                aspect_ratio: None,
                yfov: 0.8,
                zfar: None,
                znear: 0.1
            }
        );

        let err = Camera::load(&json!({ "type": "fisheye" }), "cameras[1]").unwrap_err();
        assert_eq!(err.to_string(), "cameras[1]: unknown camera type 'fisheye'");
    }
}
