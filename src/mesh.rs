//! Triangle strips and the indexed mesh they are merged into.

use glam::DVec3;
use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StripKind {
    Lane,
    /// Index of the road mark record within its lane.
    RoadMark(usize),
}

/// Stable key of a strip: road, lane section, lane and what the strip covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StripId {
    pub road_id: String,
    pub section: usize,
    pub lane_id: i32,
    pub kind: StripKind,
}

impl fmt::Display for StripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "road {} section {} lane {}",
            self.road_id, self.section, self.lane_id
        )?;
        if let StripKind::RoadMark(index) = self.kind {
            write!(f, " mark {}", index)?;
        }
        Ok(())
    }
}

/// Vertices and faces of one strip, indexed locally from 0.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshStrip {
    pub id: StripId,
    pub vertices: Vec<DVec3>,
    pub faces: Vec<[u32; 3]>,
}

impl MeshStrip {
    /// Builds a strip from `(right, left)` point pairs, one pair per station.
    ///
    /// Consecutive pairs form a quad split into `(R_i, R_i+1, L_i+1)` and
    /// `(R_i, L_i+1, L_i)`, which is counter-clockwise seen from above when
    /// stations advance along the direction of travel.
    pub fn from_columns(id: StripId, columns: &[(DVec3, DVec3)]) -> Self {
        let mut strip = Self {
            id,
            vertices: Vec::with_capacity(columns.len() * 2),
            faces: Vec::with_capacity(columns.len().saturating_sub(1) * 2),
        };

        for (i, &(right, left)) in columns.iter().enumerate() {
            strip.vertices.push(right);
            strip.vertices.push(left);
            if i > 0 {
                let r0 = (2 * (i - 1)) as u32;
                let (l0, r1, l1) = (r0 + 1, r0 + 2, r0 + 3);
                strip.faces.push([r0, r1, l1]);
                strip.faces.push([r0, l1, l0]);
            }
        }

        strip
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Indexed triangle mesh accumulating every strip of a network.
///
/// Vertex indices follow insertion order; strips are never merged or
/// deduplicated against each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<DVec3>,
    faces: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `strip`, shifting its face indices by the current vertex count.
    ///
    /// Returns the index of the strip's first vertex in the mesh.
    pub fn add_strip(&mut self, strip: &MeshStrip) -> Result<u32> {
        let total = self.vertices.len() + strip.vertices.len();
        if total > u32::MAX as usize {
            return Err(Error::TooManyVertices { count: total });
        }
        let offset = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&strip.vertices);
        self.faces.extend(
            strip
                .faces
                .iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
        Ok(offset)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Axis-aligned bounding box, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(DVec3, DVec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(min, max), v| (min.min(*v), max.max(*v))),
        )
    }
}
