//! Geometry extraction (spec §4.5): primitive parameter decoding, the two
//! param-block wire layouts, Editable Poly vertex/face arrays, and the
//! object-space-modifier (OSM) walk. The largest single component, per
//! spec §2's ~30% budget note.

use bitflags::bitflags;
use num_enum::FromPrimitive;

use crate::chunk::types::Chunk;
use crate::common::types::{ClassId, Vec3};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::scene::ScenePool;
use crate::scene::accessors::{get_chunk, get_property};
use crate::scene::link::{get_link, get_link_chunk};

const SUPER_GEOMOBJECT: u32 = 0x0010;
const SUPER_OSM: u32 = 0x0810;
const OSM_CONTAINER_TYPE: u16 = 0x2032;
const OSM_INSTANCE_DATA_TYPE: u16 = 0x2500;

const PARAM_BLOCK_V1: u32 = 0x0008;
const PARAM_BLOCK_V2: u32 = 0x0082;

const BOX_CLASS: ClassId = ClassId::new(0x0000_0010, 0);
const SPHERE_CLASS: ClassId = ClassId::new(0x0000_0011, 0);
const CYLINDER_CLASS: ClassId = ClassId::new(0x0000_0012, 0);
const TORUS_CLASS: ClassId = ClassId::new(0x0000_0020, 0);
const CONE_CLASS: ClassId = ClassId::new(0xA86C_23DD, 0);
const GEOSPHERE_CLASS: ClassId = ClassId::new(0, 0x7F9E);
const TUBE_CLASS: ClassId = ClassId::new(0x0000_7B21, 0);
const PYRAMID_CLASS: ClassId = ClassId::new(0x76BF_318A, 0x4BF3_7B10);
const PLANE_CLASS: ClassId = ClassId::new(0x081F_1DFC, 0x7756_6F65);
const EDITABLE_POLY_CLASS: ClassId = ClassId::new(0x1BF8_338D, 0x192F_6098);

const EDIT_NORMALS_CLASS: ClassId = ClassId::new(0x4AA5_2AE3, 0x35CA_1CDE);
const PAINTLAYERMOD_CLASS: ClassId = ClassId::new(0x7EBB_4645, 0x7BE2_044B);

bitflags! {
    /// Per-face trailing-data flags in the vertex face array (spec §4.5).
    /// Bits 0/3/4/5 each gate extra u16 words after the index list; which
    /// exact word bit 0 skips (smoothing group vs. material id) is left
    /// undocumented upstream, so it's only ever skipped here, never
    /// interpreted (see SPEC_FULL.md §10).
    struct FaceFlags: u16 {
        const EXTRA_WORD       = 0x01;
        const BIT3             = 0x08;
        const BIT4             = 0x10;
        const PER_VERTEX_EXTRA = 0x20;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub vertices: Vec<Vec3>,
    pub texture_coords: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub vertex_color: Vec<Vec3>,
    pub vertex_alpha: Vec<Vec3>,
    pub vertex_face_array: Vec<Vec<u32>>,
    pub texture_face_array: Vec<Vec<u32>>,
    pub text: String,
}

fn class_id_of(chunk: &Chunk) -> Option<(ClassId, u32)> {
    let data = chunk.decoration.as_ref()?.class_data.as_ref()?;
    Some((data.class_id, data.super_class_id))
}

fn follow<'a>(pool: &'a ScenePool, chunk: &'a Chunk, slot: u32) -> Option<&'a Chunk> {
    get_link_chunk(pool, chunk, &[slot])
}

/// Extracts geometry reachable from `node` via link slot 1 (spec §4.5).
pub fn extract_geometry(pool: &ScenePool, node: &Chunk, diag: &mut dyn Diagnostics) -> Geometry {
    let mut geometry = Geometry::default();
    let Some(object) = follow(pool, node, 1) else {
        diag.report(Diagnostic::MissingProperty { context: "geometry object" });
        return geometry;
    };
    walk_object(pool, object, &mut geometry, diag);
    geometry
}

fn walk_object(pool: &ScenePool, chunk: &Chunk, geometry: &mut Geometry, diag: &mut dyn Diagnostics) {
    match class_id_of(chunk) {
        Some((_, super_id)) if super_id == SUPER_GEOMOBJECT => decode_geomobject(pool, chunk, geometry, diag),
        Some((_, super_id)) if super_id == SUPER_OSM || chunk.type_id == OSM_CONTAINER_TYPE => {
            walk_osm(pool, chunk, geometry, diag)
        }
        _ if chunk.type_id == OSM_CONTAINER_TYPE => walk_osm(pool, chunk, geometry, diag),
        _ => diag.report(Diagnostic::ClassMismatch {
            context: "geometry object",
            expected: "GEOMOBJECT (0010) or OSM container (0810/2032)",
        }),
    }
}

// --- Param blocks (spec §4.5 "Param-block decoding") -----------------------

#[derive(Debug, Clone)]
enum ParamValue {
    Float(f32),
    Int(i32),
    Rgba(Vec3),
    Point3(Vec3),
    Bool(bool),
}

/// The param-block v2 "type" tag (spec §4.5's `{0,5,6,7}`/`{1,4}`/`{2,3}`
/// groupings), narrowed to a closed set so each group is matched once
/// instead of repeating its member values at every call site.
#[repr(u32)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
enum ParamValueKind {
    Float = 0,
    Int = 1,
    Rgba = 2,
    Point3 = 3,
    Bool = 4,
    FloatAngle = 5,
    FloatPercent = 6,
    FloatWorld = 7,
    #[default]
    Unknown,
}

fn get_param_block(block: &Chunk, diag: &mut dyn Diagnostics) -> Vec<Option<ParamValue>> {
    match class_id_of(block) {
        Some((_, super_id)) if super_id == PARAM_BLOCK_V1 => {
            decode_param_block_v1(block).into_iter().map(Some).collect()
        }
        Some((_, super_id)) if super_id == PARAM_BLOCK_V2 => decode_param_block_v2(block),
        _ => {
            diag.report(Diagnostic::ClassMismatch { context: "param block", expected: "v1 (0008) or v2 (0082)" });
            Vec::new()
        }
    }
}

fn decode_param_block_v1(block: &Chunk) -> Vec<ParamValue> {
    let count = get_property::<u32>(block, &[0x0001]).into_iter().next().unwrap_or(0) as usize;
    let mut out = Vec::new();
    for child in block.children().iter().filter(|c| c.type_id == 0x0002) {
        if out.len() >= count {
            break;
        }
        if let Some(v) = get_property::<f32>(child, &[0x0100]).into_iter().next() {
            out.push(ParamValue::Float(v));
        } else if let Some(v) = get_property::<i32>(child, &[0x0101]).into_iter().next() {
            out.push(ParamValue::Int(v));
        } else if let Some(v) = get_property::<Vec3>(child, &[0x0102]).into_iter().next() {
            out.push(ParamValue::Rgba(v));
        } else if let Some(v) = get_property::<Vec3>(child, &[0x0103]).into_iter().next() {
            out.push(ParamValue::Point3(v));
        } else if let Some(v) = get_property::<bool>(child, &[0x0104]).into_iter().next() {
            out.push(ParamValue::Bool(v));
        }
    }
    out
}

fn decode_param_block_v2(block: &Chunk) -> Vec<Option<ParamValue>> {
    let mut out: Vec<Option<ParamValue>> = Vec::new();
    for child in block.children().iter().filter(|c| c.type_id == 0x000E || c.type_id == 0x100E) {
        let payload = child.payload();
        if payload.len() < 19 {
            continue;
        }
        let index = u16::from_le_bytes([payload[0], payload[1]]) as usize;
        let kind = ParamValueKind::from_primitive(u32::from_le_bytes(payload[2..6].try_into().unwrap()));
        let value_bytes = &payload[15..];

        let value = match kind {
            ParamValueKind::Float | ParamValueKind::FloatAngle | ParamValueKind::FloatPercent | ParamValueKind::FloatWorld
                if value_bytes.len() >= 4 =>
            {
                Some(ParamValue::Float(f32::from_le_bytes(value_bytes[0..4].try_into().unwrap())))
            }
            ParamValueKind::Int | ParamValueKind::Bool if value_bytes.len() >= 4 => {
                Some(ParamValue::Int(i32::from_le_bytes(value_bytes[0..4].try_into().unwrap())))
            }
            ParamValueKind::Rgba | ParamValueKind::Point3 if value_bytes.len() >= 12 => {
                let x = f32::from_le_bytes(value_bytes[0..4].try_into().unwrap());
                let y = f32::from_le_bytes(value_bytes[4..8].try_into().unwrap());
                let z = f32::from_le_bytes(value_bytes[8..12].try_into().unwrap());
                Some(if kind == ParamValueKind::Rgba { ParamValue::Rgba((x, y, z)) } else { ParamValue::Point3((x, y, z)) })
            }
            _ => None,
        };

        if let Some(value) = value {
            if out.len() <= index {
                out.resize(index + 1, None);
            }
            out[index] = Some(value);
        }
    }
    out
}

fn f32_at(values: &[Option<ParamValue>], index: usize) -> f32 {
    match values.get(index) {
        Some(Some(ParamValue::Float(v))) => *v,
        _ => 0.0,
    }
}

fn i32_at(values: &[Option<ParamValue>], index: usize) -> i32 {
    match values.get(index) {
        Some(Some(ParamValue::Int(v))) => *v,
        _ => 0,
    }
}

fn bool_at(values: &[Option<ParamValue>], index: usize) -> bool {
    match values.get(index) {
        Some(Some(ParamValue::Bool(v))) => *v,
        _ => false,
    }
}

// --- Primitive dispatch ------------------------------------------------

struct Field<'a>(&'a str, String);

fn render_text(name: &str, fields: &[Field]) -> String {
    let mut out = format!("Primitive : {name}\n");
    for Field(label, value) in fields {
        out.push_str(&format!("  {label} = {value}\n"));
    }
    out
}

fn box_corners(length: f32, width: f32, height: f32) -> Vec<Vec3> {
    let mut corners = Vec::with_capacity(8);
    for &sx in &[-1.0, 1.0] {
        for &sy in &[-1.0, 1.0] {
            for &sz in &[-1.0, 1.0] {
                corners.push((sx * length, sy * width, sz * height));
            }
        }
    }
    corners
}

fn plane_corners(length: f32, width: f32) -> Vec<Vec3> {
    vec![
        (-length, -width, 0.0),
        (-length, width, 0.0),
        (length, -width, 0.0),
        (length, width, 0.0),
    ]
}

fn decode_geomobject(pool: &ScenePool, chunk: &Chunk, geometry: &mut Geometry, diag: &mut dyn Diagnostics) {
    let Some((class_id, _)) = class_id_of(chunk) else {
        diag.report(Diagnostic::MissingProperty { context: "geometry object class" });
        return;
    };

    if class_id == EDITABLE_POLY_CLASS {
        decode_editable_poly(chunk, geometry, diag);
        return;
    }

    let Some(param_block) = follow(pool, chunk, 0) else {
        diag.report(Diagnostic::MissingProperty { context: "geometry param block" });
        return;
    };
    let v = get_param_block(param_block, diag);

    geometry.text = if class_id == BOX_CLASS {
        let (length, width, height) = (f32_at(&v, 0), f32_at(&v, 1), f32_at(&v, 2));
        geometry.vertices = box_corners(length, width, height);
        render_text(
            "Box",
            &[
                Field("length", length.to_string()),
                Field("width", width.to_string()),
                Field("height", height.to_string()),
                Field("lengthSegs", i32_at(&v, 3).to_string()),
                Field("widthSegs", i32_at(&v, 4).to_string()),
                Field("heightSegs", i32_at(&v, 5).to_string()),
            ],
        )
    } else if class_id == SPHERE_CLASS {
        render_text(
            "Sphere",
            &[
                Field("radius", f32_at(&v, 0).to_string()),
                Field("segments", i32_at(&v, 1).to_string()),
                Field("smooth", bool_at(&v, 2).to_string()),
                Field("hemisphere", f32_at(&v, 3).to_string()),
                Field("chopSquash", i32_at(&v, 4).to_string()),
            ],
        )
    } else if class_id == CYLINDER_CLASS {
        render_text(
            "Cylinder",
            &[
                Field("radius", f32_at(&v, 0).to_string()),
                Field("height", f32_at(&v, 1).to_string()),
                Field("heightSegs", i32_at(&v, 2).to_string()),
                Field("capSegs", i32_at(&v, 3).to_string()),
                Field("sides", i32_at(&v, 4).to_string()),
                Field("smooth", bool_at(&v, 5).to_string()),
            ],
        )
    } else if class_id == TORUS_CLASS {
        render_text(
            "Torus",
            &[
                Field("radius1", f32_at(&v, 0).to_string()),
                Field("radius2", f32_at(&v, 1).to_string()),
                Field("rotation", f32_at(&v, 2).to_string()),
                Field("twist", f32_at(&v, 3).to_string()),
                Field("segments", i32_at(&v, 4).to_string()),
                Field("sides", i32_at(&v, 5).to_string()),
                Field("smooth", bool_at(&v, 6).to_string()),
            ],
        )
    } else if class_id == CONE_CLASS {
        render_text(
            "Cone",
            &[
                Field("radius1", f32_at(&v, 0).to_string()),
                Field("radius2", f32_at(&v, 1).to_string()),
                Field("height", f32_at(&v, 2).to_string()),
                Field("heightSegs", i32_at(&v, 3).to_string()),
                Field("capSegs", i32_at(&v, 4).to_string()),
                Field("sides", i32_at(&v, 5).to_string()),
                Field("smooth", bool_at(&v, 6).to_string()),
            ],
        )
    } else if class_id == GEOSPHERE_CLASS {
        render_text(
            "GeoSphere",
            &[
                Field("radius", f32_at(&v, 0).to_string()),
                Field("segments", i32_at(&v, 1).to_string()),
                Field("baseType", i32_at(&v, 2).to_string()),
                Field("smooth", bool_at(&v, 3).to_string()),
                Field("hemisphere", bool_at(&v, 4).to_string()),
            ],
        )
    } else if class_id == TUBE_CLASS {
        render_text(
            "Tube",
            &[
                Field("radius1", f32_at(&v, 0).to_string()),
                Field("radius2", f32_at(&v, 1).to_string()),
                Field("height", f32_at(&v, 2).to_string()),
                Field("heightSegs", i32_at(&v, 3).to_string()),
                Field("capSegs", i32_at(&v, 4).to_string()),
                Field("sides", i32_at(&v, 5).to_string()),
                Field("smooth", bool_at(&v, 6).to_string()),
            ],
        )
    } else if class_id == PYRAMID_CLASS {
        render_text(
            "Pyramid",
            &[
                Field("width", f32_at(&v, 0).to_string()),
                Field("depth", f32_at(&v, 1).to_string()),
                Field("height", f32_at(&v, 2).to_string()),
                Field("widthSegs", i32_at(&v, 3).to_string()),
                Field("depthSegs", i32_at(&v, 4).to_string()),
                Field("heightSegs", i32_at(&v, 5).to_string()),
            ],
        )
    } else if class_id == PLANE_CLASS {
        let (length, width) = (f32_at(&v, 0), f32_at(&v, 1));
        geometry.vertices = plane_corners(length, width);
        render_text(
            "Plane",
            &[
                Field("length", length.to_string()),
                Field("width", width.to_string()),
                Field("lengthSegs", i32_at(&v, 2).to_string()),
                Field("widthSegs", i32_at(&v, 3).to_string()),
            ],
        )
    } else {
        diag.report(Diagnostic::ClassMismatch { context: "geometry object", expected: "known primitive classID" });
        format!("Primitive : Unknown ({:#010X}, {:#010X})\n", class_id.a, class_id.b)
    };
}

// --- Editable Poly (spec §4.5 "Editable Poly") --------------------------

const POLY_ROOT: u16 = 0x08FE;
const POLY_VERTICES: u16 = 0x0100;
const POLY_VERTEX_FACES: u16 = 0x011A;
const POLY_TEXTURE_COORDS: u16 = 0x0128;
const POLY_TEXTURE_FACES: u16 = 0x012B;

fn decode_editable_poly(chunk: &Chunk, geometry: &mut Geometry, diag: &mut dyn Diagnostics) {
    let Some(poly_root) = get_chunk(chunk, &[POLY_ROOT]) else {
        diag.report(Diagnostic::MissingProperty { context: "editable poly root (08FE)" });
        return;
    };

    geometry.text = "Editable Poly\n".to_string();

    let raw_vertices: Vec<f32> = get_property(poly_root, &[POLY_VERTICES]);
    geometry.vertices = raw_vertices
        .chunks_exact(4)
        .map(|f| (f[1], f[2], f[3]))
        .collect();

    let raw_texcoords: Vec<f32> = get_property(poly_root, &[POLY_TEXTURE_COORDS]);
    geometry.texture_coords = raw_texcoords.chunks_exact(3).map(|f| (f[0], f[1], f[2])).collect();

    geometry.vertex_face_array = decode_vertex_face_array(poly_root, diag);
    geometry.texture_face_array = decode_texture_face_array(poly_root, diag);
}

fn u16_pair_to_u32(lo: u16, hi: u16) -> u32 {
    (lo as u32) | ((hi as u32) << 16)
}

/// Vertex face array (spec §4.5): per-face `count` then `count` vertex
/// indices (each little-endian-split across two `u16`s), then a `flags`
/// word whose set bits each gate more trailing `u16`s.
fn decode_vertex_face_array(poly_root: &Chunk, diag: &mut dyn Diagnostics) -> Vec<Vec<u32>> {
    let raw: Vec<u16> = get_property(poly_root, &[POLY_VERTEX_FACES]);
    let mut faces = Vec::new();
    let mut cursor = 0usize;

    loop {
        if cursor >= raw.len() {
            break;
        }
        if cursor + 2 > raw.len() {
            diag.report(Diagnostic::CorruptFaceArray { array: "vertexFaceArray" });
            break;
        }
        let count = u16_pair_to_u32(raw[cursor], raw[cursor + 1]);
        cursor += 2;

        let needed = 2 * count as usize;
        if cursor + needed > raw.len() {
            diag.report(Diagnostic::CorruptFaceArray { array: "vertexFaceArray" });
            break;
        }
        let mut indices = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            indices.push(u16_pair_to_u32(raw[cursor + 2 * i], raw[cursor + 2 * i + 1]));
        }
        cursor += needed;

        if cursor >= raw.len() {
            diag.report(Diagnostic::CorruptFaceArray { array: "vertexFaceArray" });
            break;
        }
        let flags = FaceFlags::from_bits_truncate(raw[cursor]);
        cursor += 1;

        let mut skip = 0usize;
        if flags.contains(FaceFlags::EXTRA_WORD) {
            skip += 2;
        }
        if flags.contains(FaceFlags::BIT3) {
            skip += 1;
        }
        if flags.contains(FaceFlags::BIT4) {
            skip += 2;
        }
        if flags.contains(FaceFlags::PER_VERTEX_EXTRA) {
            // Suspected sign bug upstream for count < 6 (SPEC_FULL.md §10):
            // clamp to zero instead of wrapping/going negative.
            skip += 2 * (count as usize).saturating_sub(6);
        }

        if cursor + skip > raw.len() {
            diag.report(Diagnostic::CorruptFaceArray { array: "vertexFaceArray" });
            break;
        }
        cursor += skip;

        faces.push(indices);
    }

    faces
}

fn decode_texture_face_array(poly_root: &Chunk, diag: &mut dyn Diagnostics) -> Vec<Vec<u32>> {
    let raw: Vec<u32> = get_property(poly_root, &[POLY_TEXTURE_FACES]);
    let mut faces = Vec::new();
    let mut cursor = 0usize;

    loop {
        if cursor >= raw.len() {
            break;
        }
        let count = raw[cursor] as usize;
        cursor += 1;
        if cursor + count > raw.len() {
            diag.report(Diagnostic::CorruptFaceArray { array: "textureFaceArray" });
            break;
        }
        faces.push(raw[cursor..cursor + count].to_vec());
        cursor += count;
    }

    faces
}

// --- Object-space modifier walk (spec §4.5 "Modifier walk") -------------

const MODIFIER_ATTR_ROOT: u16 = 0x2512;
const MODIFIER_ATTR_A: u16 = 0x0240;
const MODIFIER_ATTR_B: u16 = 0x0250;
const MODIFIER_TRIPLES: u16 = 0x0110;

/// Slot 0 is the upstream object reference on a derived-object-style
/// container; every other slot is one modifier application, whose
/// `0x2500` instance-data child is found at the occurrence position equal
/// to the link slot itself (spec §4.5's own link-slot numbering is silent
/// on this split; see SPEC_FULL.md §10 for the decision).
const UPSTREAM_SLOT: u32 = 0;

fn walk_osm(pool: &ScenePool, container: &Chunk, geometry: &mut Geometry, diag: &mut dyn Diagnostics) {
    let link_map = get_link(container);
    let instance_data: Vec<&Chunk> = container.children().iter().filter(|c| c.type_id == OSM_INSTANCE_DATA_TYPE).collect();

    let mut modifier_slots: Vec<u32> = link_map.keys().copied().filter(|&s| s != UPSTREAM_SLOT).collect();
    modifier_slots.sort_unstable();

    for slot in modifier_slots {
        let target_index = link_map[&slot];
        let Some(modifier_ref) = pool.get(target_index as usize) else {
            diag.report(Diagnostic::MissingProperty { context: "OSM modifier link target" });
            continue;
        };
        let Some(&data) = instance_data.get(slot as usize) else {
            diag.report(Diagnostic::MissingProperty { context: "OSM modifier instance data (2500)" });
            continue;
        };
        let Some(plugin) = follow(pool, modifier_ref, 0) else {
            diag.report(Diagnostic::MissingProperty { context: "OSM modifier plugin" });
            continue;
        };

        match class_id_of(plugin) {
            Some((class_id, _)) if class_id == EDIT_NORMALS_CLASS => decode_edit_normals(modifier_ref, geometry, diag),
            Some((class_id, _)) if class_id == PAINTLAYERMOD_CLASS => {
                decode_paintlayermod(pool, plugin, modifier_ref, geometry, diag)
            }
            _ => diag.report(Diagnostic::ClassMismatch {
                context: "OSM modifier",
                expected: "EDIT_NORMALS or PAINTLAYERMOD",
            }),
        }
        let _ = data; // instance data is only used to locate the slot; no fields read from it upstream.
    }

    match link_map.get(&UPSTREAM_SLOT) {
        Some(&upstream_index) => match pool.get(upstream_index as usize) {
            Some(upstream) => walk_object(pool, upstream, geometry, diag),
            None => diag.report(Diagnostic::MissingProperty { context: "OSM upstream object" }),
        },
        None => diag.report(Diagnostic::MissingProperty { context: "OSM upstream object" }),
    }
}

fn modifier_triples(modifier_ref: &Chunk) -> Vec<Vec3> {
    let source = get_chunk(modifier_ref, &[MODIFIER_ATTR_ROOT, MODIFIER_ATTR_A])
        .or_else(|| get_chunk(modifier_ref, &[MODIFIER_ATTR_ROOT, MODIFIER_ATTR_B]));
    let Some(source) = source else {
        return Vec::new();
    };
    let raw: Vec<f32> = get_property(source, &[MODIFIER_TRIPLES]);
    raw.chunks_exact(3).map(|f| (f[0], f[1], f[2])).collect()
}

fn decode_edit_normals(modifier_ref: &Chunk, geometry: &mut Geometry, diag: &mut dyn Diagnostics) {
    let source = get_chunk(modifier_ref, &[MODIFIER_ATTR_ROOT, MODIFIER_ATTR_A])
        .or_else(|| get_chunk(modifier_ref, &[MODIFIER_ATTR_ROOT, MODIFIER_ATTR_B]));
    let Some(source) = source else {
        diag.report(Diagnostic::MissingProperty { context: "EDIT_NORMALS data (2512)" });
        return;
    };
    // Same 1-float skip pattern as Editable Poly vertices.
    let raw: Vec<f32> = get_property(source, &[MODIFIER_TRIPLES]);
    geometry.normals.extend(raw.chunks_exact(4).map(|f| (f[1], f[2], f[3])));
}

fn decode_paintlayermod(pool: &ScenePool, plugin: &Chunk, modifier_ref: &Chunk, geometry: &mut Geometry, diag: &mut dyn Diagnostics) {
    let triples = modifier_triples(modifier_ref);
    let Some(param_block) = follow(pool, plugin, 0) else {
        diag.report(Diagnostic::MissingProperty { context: "PAINTLAYERMOD param block" });
        return;
    };
    let values = get_param_block(param_block, diag);
    // Only dispatch when a second param-block entry actually exists; with
    // none, there is nothing to write to any output (spec §4.5), not a
    // default "vertex_color" case.
    if values.len() > 1 {
        match i32_at(&values, 1) {
            -1 => { /* vertex illumination: discarded per spec §4.5/SPEC_FULL.md §10 */ }
            -2 => geometry.vertex_alpha.extend(triples),
            _ => geometry.vertex_color.extend(triples),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_corners_use_full_extent_on_each_axis() {
        let corners = box_corners(10.0, 20.0, 30.0);
        assert_eq!(corners.len(), 8);
        assert!(corners.iter().all(|c| c.0.abs() == 10.0 && c.1.abs() == 20.0 && c.2.abs() == 30.0));
    }

    #[test]
    fn plane_corners_are_flat_quad() {
        let corners = plane_corners(10.0, 20.0);
        assert_eq!(corners.len(), 4);
        assert!(corners.iter().all(|c| c.2 == 0.0));
    }

    #[test]
    fn vertex_face_array_face_count_for_count_below_six_does_not_underflow() {
        // count=3, flags with bit 5 set: must not panic/wrap on `count - 6`.
        let mut raw: Vec<u16> = Vec::new();
        raw.push(3);
        raw.push(0); // count = 3 (low word), high word 0
        raw.extend_from_slice(&[0, 1]); // index 0 (two u16 halves)
        raw.extend_from_slice(&[1, 0]);
        raw.extend_from_slice(&[2, 0]);
        raw.push(0x20); // flags: PER_VERTEX_EXTRA
        // No trailing data provided on purpose; this must report corruption,
        // not panic, when count < 6 and bit 5 is set.
        let mut diag = crate::diagnostics::CollectingDiagnostics::default();
        let chunk = crate::chunk::types::Chunk {
            type_id: 0x08FE,
            body: crate::chunk::types::ChunkBody::Container(vec![crate::chunk::types::Chunk {
                type_id: POLY_VERTEX_FACES,
                body: crate::chunk::types::ChunkBody::Leaf(raw.iter().flat_map(|v| v.to_le_bytes()).collect()),
                decoration: None,
            }]),
            decoration: None,
        };
        let faces = decode_vertex_face_array(&chunk, &mut diag);
        assert!(faces.is_empty());
        assert!(!diag.0.is_empty());
    }
}
