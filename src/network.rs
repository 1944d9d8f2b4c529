//! Whole-network tessellation.
//!
//! Roads are tessellated in parallel, each into buffers it owns. The strips
//! are then merged into a single [`Mesh`] on one thread, walking roads in
//! document order, so the result does not depend on scheduling.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::mesh::{Mesh, MeshStrip, StripId};
use crate::model::RoadNetwork;
use crate::tessellator::{tessellate, TessellationConfig};

/// Where a strip ended up inside the merged mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct StripRange {
    pub id: StripId,
    pub first_vertex: usize,
    pub vertex_count: usize,
    pub first_face: usize,
    pub face_count: usize,
}

/// A road left out of the mesh and the reason.
#[derive(Debug)]
pub struct SkippedRoad {
    pub road_id: String,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct NetworkMesh {
    pub mesh: Mesh,
    pub strips: Vec<StripRange>,
    pub skipped: Vec<SkippedRoad>,
}

impl NetworkMesh {
    fn push_strip(&mut self, strip: &MeshStrip) -> Result<()> {
        let first_face = self.mesh.face_count();
        let first_vertex = self.mesh.add_strip(strip)? as usize;
        self.strips.push(StripRange {
            id: strip.id.clone(),
            first_vertex,
            vertex_count: strip.vertices.len(),
            first_face,
            face_count: strip.triangle_count(),
        });
        Ok(())
    }
}

/// Tessellates every road of `network` and merges the strips into one mesh.
///
/// Roads failing with a road-local error are skipped and reported in
/// [`NetworkMesh::skipped`]; any other error aborts the build.
pub fn build_network_mesh(network: &RoadNetwork, config: &TessellationConfig) -> Result<NetworkMesh> {
    config.validate()?;

    let results: Vec<Result<Vec<MeshStrip>>> = network
        .roads
        .par_iter()
        .map(|road| tessellate(road, config))
        .collect();

    let mut output = NetworkMesh::default();
    for (road, result) in network.roads.iter().zip(results) {
        match result {
            Ok(strips) => {
                for strip in strips.iter().filter(|strip| !strip.is_empty()) {
                    output.push_strip(strip)?;
                }
            }
            Err(error) if error.is_road_local() => {
                warn!("Skipping road {}: {}", road.id, error);
                output.skipped.push(SkippedRoad {
                    road_id: road.id.clone(),
                    error,
                });
            }
            Err(error) => return Err(error),
        }
    }

    info!(
        "Tessellated {} of {} roads: {} vertices, {} triangles",
        network.roads.len() - output.skipped.len(),
        network.roads.len(),
        output.mesh.vertex_count(),
        output.mesh.face_count()
    );

    Ok(output)
}
