//! # Isosurface Extraction
//!
//! Polygonizes the density channel of a volume at a fixed iso level, either with
//! marching cubes or with marching tetrahedra.
//!
//! Every interior cell `(x, y, z)` with `1 <= x < size - 1` (same for y and z) is the
//! minimum corner of a unit cube whose 8 corners are sampled. A corner is *inside*
//! when its density is `<= iso_level`. Edges that join an inside corner to an
//! outside one are cut at the linearly interpolated crossing point, and the lookup
//! tables in [`tables`] connect the cut points into triangles.
//!
//! Marching tetrahedra splits each cube into six tetrahedra around its main diagonal.
//! It produces more triangles but has no ambiguous configurations.
//!
//! ## Output
//!
//! - Positions are in world space.
//! - Normals are flat: each triangle's three vertices share its face normal.
//! - Triangles without area are dropped. They appear whenever a corner density equals
//!   the iso level exactly, for example empty cells (density 0) at iso level 0, since
//!   every cut on such a corner's edges lands on the corner itself.
//! - Texture coordinates are resolved once per element type (isosurface faces are
//!   not axis-aligned), and corners 0, 1, 2 of the tile go to the triangle's vertices.
//! - A cube is attributed to the element type of its first non-empty corner in corner
//!   order. Cubes with eight empty corners are skipped.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::{EuclideanSpace, InnerSpace, Point2, Point3, Vector3, Zero};
use log::debug;
use web_time::Instant;

use super::mesh::{MaterialMesh, MeshAccumulator, SurfaceMesh};
use super::SurfaceExtractor;
use crate::engine_state::rendering::appearance::Appearance;
use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::element::ElementTypeCode;
use crate::engine_state::voxels::grid::VolumeGrid;
use crate::engine_state::voxels::volume::Volume;
use crate::error::Result;

pub mod tables;

use tables::{
    CORNER_OFFSETS, CUBE_EDGE_CORNERS, CUBE_EDGE_FLAGS, TETRAHEDRA_IN_CUBE,
    TETRAHEDRON_EDGE_CORNERS, TETRAHEDRON_EDGE_FLAGS, TETRAHEDRON_TRIANGLES, TRIANGLE_CONNECTION,
};

/// Edge deltas smaller than this cut the edge in its middle.
const FLAT_EDGE_EPSILON: f32 = 1e-6;

/// Polygonization variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarchingMode {
    /// Up to five triangles per cube from the 256 entry table.
    Cubes,
    /// Six tetrahedra per cube, up to two triangles each.
    Tetrahedra,
}

/// Position along an edge where the field crosses `iso_level`, as a fraction of the
/// edge from `v1` to `v2`.
pub fn edge_offset(v1: f32, v2: f32, iso_level: f32) -> f32 {
    let delta = v2 - v1;
    if delta.abs() < FLAT_EDGE_EPSILON {
        return 0.5;
    }
    (iso_level - v1) / delta
}

/// Flat normal of the triangle `a, b, c`, or zero for degenerate triangles.
pub fn face_normal(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Vector3<f32> {
    let normal = (b - a).cross(c - a);
    if normal.magnitude2() < f32::EPSILON {
        return Vector3::zero();
    }
    normal.normalize()
}

/// Scalar field polygonizer over volume densities.
pub struct IsoSurfaceExtractor {
    mode: MarchingMode,
    iso_level: f32,
    reuse_vertices: bool,
    appearance: Arc<dyn Appearance>,
}

impl IsoSurfaceExtractor {
    /// Creates an isosurface extractor.
    ///
    /// # Arguments
    /// * `mode` - Cubes or tetrahedra
    /// * `iso_level` - Densities at or below this level are inside
    /// * `reuse_vertices` - Share vertices with identical positions within a mesh
    /// * `appearance` - Resolves materials and texture coordinates
    pub fn new(
        mode: MarchingMode,
        iso_level: f32,
        reuse_vertices: bool,
        appearance: Arc<dyn Appearance>,
    ) -> Self {
        IsoSurfaceExtractor {
            mode,
            iso_level,
            reuse_vertices,
            appearance,
        }
    }

    /// The polygonization variant in use.
    pub fn mode(&self) -> MarchingMode {
        self.mode
    }

    fn march_cube(&self, positions: &[Point3<f32>; 8], values: &[f32; 8], triangles: &mut Triangles) {
        let mut mask = 0usize;
        for (corner, &value) in values.iter().enumerate() {
            if value <= self.iso_level {
                mask |= 1 << corner;
            }
        }
        let edge_flags = CUBE_EDGE_FLAGS[mask];
        if edge_flags == 0 {
            return;
        }

        let mut cuts = [Point3::origin(); 12];
        for (edge, [a, b]) in CUBE_EDGE_CORNERS.iter().enumerate() {
            if edge_flags & (1 << edge) != 0 {
                let offset = edge_offset(values[*a], values[*b], self.iso_level);
                cuts[edge] = positions[*a] + (positions[*b] - positions[*a]) * offset;
            }
        }

        for triangle in TRIANGLE_CONNECTION[mask].chunks_exact(3) {
            if triangle[0] < 0 {
                break;
            }
            triangles.push(
                cuts[triangle[0] as usize],
                cuts[triangle[1] as usize],
                cuts[triangle[2] as usize],
            );
        }
    }

    fn march_tetrahedra(
        &self,
        positions: &[Point3<f32>; 8],
        values: &[f32; 8],
        triangles: &mut Triangles,
    ) {
        for tetrahedron in TETRAHEDRA_IN_CUBE {
            let corner_positions = tetrahedron.map(|corner| positions[corner]);
            let corner_values = tetrahedron.map(|corner| values[corner]);
            self.march_tetrahedron(&corner_positions, &corner_values, triangles);
        }
    }

    fn march_tetrahedron(
        &self,
        positions: &[Point3<f32>; 4],
        values: &[f32; 4],
        triangles: &mut Triangles,
    ) {
        let mut mask = 0usize;
        for (corner, &value) in values.iter().enumerate() {
            if value <= self.iso_level {
                mask |= 1 << corner;
            }
        }
        let edge_flags = TETRAHEDRON_EDGE_FLAGS[mask];
        if edge_flags == 0 {
            return;
        }

        let mut cuts = [Point3::origin(); 6];
        for (edge, [a, b]) in TETRAHEDRON_EDGE_CORNERS.iter().enumerate() {
            if edge_flags & (1 << edge) != 0 {
                let offset = edge_offset(values[*a], values[*b], self.iso_level);
                cuts[edge] = positions[*a] + (positions[*b] - positions[*a]) * offset;
            }
        }

        for triangle in TETRAHEDRON_TRIANGLES[mask][..6].chunks_exact(3) {
            if triangle[0] < 0 {
                break;
            }
            triangles.push(
                cuts[triangle[0] as usize],
                cuts[triangle[1] as usize],
                cuts[triangle[2] as usize],
            );
        }
    }

    /// Texture coordinates for `element_type`, looked up once per extraction.
    fn tex_coords(
        &self,
        cache: &mut HashMap<ElementTypeCode, [Point2<f32>; 4]>,
        element_type: ElementTypeCode,
    ) -> Result<[Point2<f32>; 4]> {
        if let Some(uv) = cache.get(&element_type) {
            return Ok(*uv);
        }
        let uv = self.appearance.texture_coordinates(element_type, None)?;
        cache.insert(element_type, uv);
        Ok(uv)
    }
}

/// Triangles emitted for one cube, flushed into the owning type's mesh.
#[derive(Default)]
struct Triangles(Vec<[Point3<f32>; 3]>);

impl Triangles {
    fn push(&mut self, a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) {
        self.0.push([a, b, c]);
    }

    /// Moves the pending triangles into `mesh`, dropping those with no area.
    ///
    /// Returns the number of dropped triangles.
    fn drain_into(&mut self, mesh: &mut SurfaceMesh, uv: [Point2<f32>; 4]) -> usize {
        let mut dropped = 0;
        for [a, b, c] in self.0.drain(..) {
            let normal = face_normal(a, b, c);
            if normal.is_zero() {
                dropped += 1;
                continue;
            }
            mesh.add_triangle(
                Vertex::new(a, normal, uv[0]),
                Vertex::new(b, normal, uv[1]),
                Vertex::new(c, normal, uv[2]),
            );
        }
        dropped
    }
}

impl SurfaceExtractor for IsoSurfaceExtractor {
    fn extract(&self, _grid: &VolumeGrid, volume: &Volume) -> Result<Vec<MaterialMesh>> {
        let start = Instant::now();
        let size = volume.size();
        let origin = volume.origin().cast::<f32>().unwrap_or_else(Point3::origin);
        let mut accumulator = MeshAccumulator::new(self.reuse_vertices);
        let mut uv_cache = HashMap::new();
        let mut triangles = Triangles::default();
        let mut cubes = 0usize;
        let mut degenerate = 0usize;

        for x in 1..size.x - 1 {
            for z in 1..size.z - 1 {
                for y in 1..size.y - 1 {
                    let mut values = [0.0f32; 8];
                    let mut element_type = None;
                    for (corner, offset) in CORNER_OFFSETS.iter().enumerate() {
                        let element = volume.get(x + offset[0], y + offset[1], z + offset[2])?;
                        values[corner] = element.density;
                        if element_type.is_none() && !element.is_empty() {
                            element_type = Some(element.element_type);
                        }
                    }
                    let Some(element_type) = element_type else {
                        continue;
                    };
                    cubes += 1;

                    let positions = CORNER_OFFSETS.map(|[ox, oy, oz]| {
                        origin + Vector3::new((x + ox) as f32, (y + oy) as f32, (z + oz) as f32)
                    });
                    match self.mode {
                        MarchingMode::Cubes => self.march_cube(&positions, &values, &mut triangles),
                        MarchingMode::Tetrahedra => {
                            self.march_tetrahedra(&positions, &values, &mut triangles)
                        }
                    }
                    if triangles.0.is_empty() {
                        continue;
                    }
                    let uv = self.tex_coords(&mut uv_cache, element_type)?;
                    degenerate += triangles.drain_into(accumulator.mesh_for(element_type), uv);
                }
            }
        }

        debug!(
            "{:?} extraction of {:?} marched {} cubes into {} triangles ({} degenerate dropped) in {:?}",
            self.mode,
            volume.origin(),
            cubes,
            accumulator.triangle_count(),
            degenerate,
            start.elapsed()
        );
        accumulator.finish(self.appearance.as_ref())
    }
}
