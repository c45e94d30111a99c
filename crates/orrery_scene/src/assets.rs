//! Mesh and material handles shared with the host renderer
//!
//! The host registers geometry and materials under these ids before the
//! first frame. Planet materials are allocated per body from `PLANET_BASE`.

use orrery_core::{MaterialId, MeshId};

pub const SPHERE_MESH: MeshId = MeshId(1);
pub const RING_MESH: MeshId = MeshId(2);
pub const POINT_MESH: MeshId = MeshId(3);
pub const BOX_MESH: MeshId = MeshId(4);
pub const PLANE_MESH: MeshId = MeshId(5);

pub const SUN_MATERIAL: MaterialId = MaterialId(1);
pub const RING_MATERIAL: MaterialId = MaterialId(2);
pub const METEOR_MATERIAL: MaterialId = MaterialId(3);
pub const LAPTOP_BODY_MATERIAL: MaterialId = MaterialId(10);
pub const LAPTOP_SCREEN_MATERIAL: MaterialId = MaterialId(11);
pub const SCREEN_GLOW_MATERIAL: MaterialId = MaterialId(12);
pub const HOLOGRAM_MATERIAL: MaterialId = MaterialId(13);
pub const TABLE_MATERIAL: MaterialId = MaterialId(14);

const PLANET_BASE: u64 = 100;

/// Material for the planet at `index` in the orbit layout
pub fn planet_material(index: usize) -> MaterialId {
    MaterialId(PLANET_BASE + index as u64)
}
