//! PRS (Position/Rotation/Scale) controller extraction (spec §4.4).
//! Dispatches on `(classID, superClassID)` pairs over small closed sets, the
//! natural Rust mapping for the source's virtual-controller polymorphism
//! (spec §9 "Polymorphism").

use crate::chunk::types::Chunk;
use crate::common::types::ClassId;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::scene::ScenePool;
use crate::scene::accessors::{get_chunk, get_property};
use crate::scene::link::get_link_chunk;

const SUPER_PRS_CONTROL: u32 = 0x9008;
const SUPER_POSITION: u32 = 0x900B;
const SUPER_ROTATION: u32 = 0x900C;
const SUPER_SCALE: u32 = 0x900D;

const PRS_CONTROL: ClassId = ClassId::new(0x0000_2005, 0x0000_0000);
const IPOS_CONTROL: ClassId = ClassId::new(0x118F_7E02, 0xFFEE_238A);
const HYBRIDINTERP_FLOAT: ClassId = ClassId::new(0x2007, 0);
const LININTERP_POSITION: ClassId = ClassId::new(0x2002, 0);
const HYBRIDINTERP_POSITION: ClassId = ClassId::new(0x2008, 0);
const TCBINTERP_POSITION: ClassId = ClassId::new(0x44_2312, 0);
const HYBRIDINTERP_POINT4: ClassId = ClassId::new(0x2012, 0);
const LININTERP_ROTATION: ClassId = ClassId::new(0x2003, 0);
const TCBINTERP_ROTATION: ClassId = ClassId::new(0x44_2313, 0);
const LININTERP_SCALE: ClassId = ClassId::new(0x2004, 0);
const HYBRIDINTERP_SCALE: ClassId = ClassId::new(0x2010, 0);
const TCBINTERP_SCALE: ClassId = ClassId::new(0x44_2315, 0);

const VALUE_CONTAINER: u16 = 0x7127;
const FLOAT_LEAVES: [u16; 4] = [0x2501, 0x2503, 0x2504, 0x2505];

pub const DEFAULT_POSITION: [f32; 3] = [0.0, 0.0, 0.0];
pub const DEFAULT_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
pub const DEFAULT_SCALE: [f32; 3] = [1.0, 1.0, 1.0];

/// Converts an Euler angle triple (X, Y, Z, radians) to a quaternion
/// `(x, y, z, w)` using the half-angle formula from spec §4.4, verbatim.
pub fn euler_to_quaternion(x: f32, y: f32, z: f32) -> [f32; 4] {
    let (sx, cx) = (x / 2.0).sin_cos();
    let (sy, cy) = (y / 2.0).sin_cos();
    let (sz, cz) = (z / 2.0).sin_cos();

    let qx = sx * cy * cz - cx * sy * sz;
    let qy = cx * sy * cz + sx * cy * sz;
    let qz = cx * cy * sz - sx * sy * cz;
    let qw = cx * cy * cz + sx * sy * sz;
    [qx, qy, qz, qw]
}

fn class_id_of(chunk: &Chunk) -> Option<(ClassId, u32)> {
    let data = chunk.decoration.as_ref()?.class_data.as_ref()?;
    Some((data.class_id, data.super_class_id))
}

/// `getLinkChunk`'s single-slot special case, used pervasively here.
fn follow<'a>(pool: &'a ScenePool, chunk: &'a Chunk, slot: u32) -> Option<&'a Chunk> {
    get_link_chunk(pool, chunk, &[slot])
}

fn first_float(chunk: &Chunk) -> Option<f32> {
    floats(chunk).into_iter().next()
}

/// Reads the float(s) stored for one controller: prefers a direct
/// `0x7127` value container when present, then reads the `0x2501`
/// property cascade (falling back through `0x2503`/`0x2504`/`0x2505`)
/// from whichever chunk that turned out to be.
fn floats(chunk: &Chunk) -> Vec<f32> {
    let source = get_chunk(chunk, &[VALUE_CONTAINER]).unwrap_or(chunk);
    get_property::<f32>(source, &FLOAT_LEAVES)
}

pub struct Transform {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            position: DEFAULT_POSITION,
            rotation: DEFAULT_ROTATION,
            scale: DEFAULT_SCALE,
        }
    }
}

/// Extracts the first-keyframe/static PRS transform reachable from `node`
/// via link slot 0 (spec §4.4). Missing or unexpected classes leave the
/// corresponding component at its default and are reported, never abort
/// the whole extraction.
pub fn extract_transform(pool: &ScenePool, node: &Chunk, diag: &mut dyn Diagnostics) -> Transform {
    let mut transform = Transform::default();

    let Some(prs) = follow(pool, node, 0) else {
        diag.report(Diagnostic::MissingProperty { context: "PRS controller" });
        return transform;
    };
    match class_id_of(prs) {
        Some((class_id, super_class_id)) if class_id == PRS_CONTROL && super_class_id == SUPER_PRS_CONTROL => {}
        _ => {
            diag.report(Diagnostic::ClassMismatch { context: "PRS controller", expected: "PRS Control (9008)" });
            return transform;
        }
    }

    if let Some(position_chunk) = follow(pool, prs, 0) {
        transform.position = extract_position(pool, position_chunk, diag);
    } else {
        diag.report(Diagnostic::MissingProperty { context: "position controller" });
    }

    if let Some(rotation_chunk) = follow(pool, prs, 1) {
        transform.rotation = extract_rotation(pool, rotation_chunk, diag);
    } else {
        diag.report(Diagnostic::MissingProperty { context: "rotation controller" });
    }

    if let Some(scale_chunk) = follow(pool, prs, 2) {
        transform.scale = extract_scale(scale_chunk, diag);
    } else {
        diag.report(Diagnostic::MissingProperty { context: "scale controller" });
    }

    transform
}

fn extract_position(pool: &ScenePool, chunk: &Chunk, diag: &mut dyn Diagnostics) -> [f32; 3] {
    let Some((class_id, super_class_id)) = class_id_of(chunk) else {
        diag.report(Diagnostic::MissingProperty { context: "position controller class" });
        return DEFAULT_POSITION;
    };
    if super_class_id != SUPER_POSITION {
        diag.report(Diagnostic::ClassMismatch { context: "position controller", expected: "superClassID 900B" });
        return DEFAULT_POSITION;
    }

    if class_id == IPOS_CONTROL {
        let mut position = DEFAULT_POSITION;
        for (i, slot) in (0u32..3).enumerate() {
            let Some(component) = follow(pool, chunk, slot) else {
                diag.report(Diagnostic::MissingProperty { context: "IPOS_CONTROL component" });
                continue;
            };
            match class_id_of(component) {
                Some((cid, sid)) if cid == HYBRIDINTERP_FLOAT && sid == 0x9003 => {
                    if let Some(v) = first_float(component) {
                        position[i] = v;
                    }
                }
                _ => diag.report(Diagnostic::ClassMismatch {
                    context: "IPOS_CONTROL component",
                    expected: "HYBRIDINTERP_FLOAT (9003)",
                }),
            }
        }
        return position;
    }

    if matches!(class_id, LININTERP_POSITION | HYBRIDINTERP_POSITION | TCBINTERP_POSITION) {
        let values = floats(chunk);
        if values.len() >= 3 {
            return [values[0], values[1], values[2]];
        }
        diag.report(Diagnostic::MissingProperty { context: "position value" });
        return DEFAULT_POSITION;
    }

    diag.report(Diagnostic::ClassMismatch { context: "position controller", expected: "known position classID" });
    DEFAULT_POSITION
}

fn extract_rotation(pool: &ScenePool, chunk: &Chunk, diag: &mut dyn Diagnostics) -> [f32; 4] {
    let Some((class_id, super_class_id)) = class_id_of(chunk) else {
        diag.report(Diagnostic::MissingProperty { context: "rotation controller class" });
        return DEFAULT_ROTATION;
    };
    if super_class_id != SUPER_ROTATION {
        diag.report(Diagnostic::ClassMismatch { context: "rotation controller", expected: "superClassID 900C" });
        return DEFAULT_ROTATION;
    }

    if class_id == HYBRIDINTERP_POINT4 {
        let mut euler = [0.0f32; 3];
        for (i, slot) in (0u32..3).enumerate() {
            let Some(component) = follow(pool, chunk, slot) else {
                diag.report(Diagnostic::MissingProperty { context: "Euler XYZ component" });
                continue;
            };
            if let Some(v) = first_float(component) {
                euler[i] = v;
            }
        }
        let [x, y, z] = euler;
        return euler_to_quaternion(x, y, z);
    }

    if matches!(class_id, LININTERP_ROTATION | TCBINTERP_ROTATION) {
        let values = floats(chunk);
        if values.len() >= 4 {
            return [values[0], values[1], values[2], values[3]];
        }
        if values.len() >= 3 {
            return euler_to_quaternion(values[0], values[1], values[2]);
        }
        diag.report(Diagnostic::MissingProperty { context: "rotation value" });
        return DEFAULT_ROTATION;
    }

    diag.report(Diagnostic::ClassMismatch { context: "rotation controller", expected: "known rotation classID" });
    DEFAULT_ROTATION
}

fn extract_scale(chunk: &Chunk, diag: &mut dyn Diagnostics) -> [f32; 3] {
    let Some((class_id, super_class_id)) = class_id_of(chunk) else {
        diag.report(Diagnostic::MissingProperty { context: "scale controller class" });
        return DEFAULT_SCALE;
    };
    if super_class_id != SUPER_SCALE {
        diag.report(Diagnostic::ClassMismatch { context: "scale controller", expected: "superClassID 900D" });
        return DEFAULT_SCALE;
    }
    if !matches!(class_id, LININTERP_SCALE | HYBRIDINTERP_SCALE | TCBINTERP_SCALE) {
        diag.report(Diagnostic::ClassMismatch { context: "scale controller", expected: "known scale classID" });
        return DEFAULT_SCALE;
    }

    let values = floats(chunk);
    if values.len() >= 3 {
        [values[0], values[1], values[2]]
    } else if let Some(v) = values.first() {
        [*v, *v, *v]
    } else {
        diag.report(Diagnostic::MissingProperty { context: "scale value" });
        DEFAULT_SCALE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euler_identity_is_unit_quaternion() {
        let q = euler_to_quaternion(0.0, 0.0, 0.0);
        assert_eq!(q, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn euler_round_trip_matches_scalar_formula() {
        use std::f32::consts::FRAC_PI_2;
        // x=pi/2, y=0, z=0 -> q = (sin(pi/4), 0, 0, cos(pi/4))
        let q = euler_to_quaternion(FRAC_PI_2, 0.0, 0.0);
        let expected = (FRAC_PI_2 / 2.0).sin();
        assert!((q[0] - expected).abs() < 1e-5);
        assert!(q[1].abs() < 1e-5);
        assert!(q[2].abs() < 1e-5);
        assert!((q[3] - (FRAC_PI_2 / 2.0).cos()).abs() < 1e-5);
    }

    #[test]
    fn quaternion_is_unit_magnitude() {
        let q = euler_to_quaternion(0.3, -1.1, 2.4);
        let mag_sq: f32 = q.iter().map(|c| c * c).sum();
        assert!((mag_sq.sqrt() - 1.0).abs() < 1e-4);
    }
}
