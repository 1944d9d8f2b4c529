//! Lane boundaries and surface placement at a single station.

use glam::{DVec2, DVec3};

use crate::error::Result;
use crate::geometry::Pose;
use crate::model::{Road, ShapeProfile};
use crate::reference_line::ReferenceLine;
use crate::tessellator::TessellationConfig;

/// A lane boundary at one station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryPoint {
    /// Lane whose outer edge this is; 0 for the reference boundary.
    pub lane_id: i32,
    /// Lateral position, positive to the left of the reference line.
    pub t: f64,
    pub position: DVec3,
}

/// The road surface cut across at station `s`.
#[derive(Debug, Clone)]
pub struct CrossSection<'a> {
    pub s: f64,
    /// Lane section in effect, `None` for roads without lane sections.
    pub section: Option<usize>,
    pub pose: Pose,
    pub elevation: f64,
    /// dz/ds of the elevation profile.
    pub slope: f64,
    /// Superelevation roll angle in radians.
    pub roll: f64,
    shape: Option<&'a ShapeProfile>,
    /// Center lane boundary, shifted by the lane offset.
    pub center: BoundaryPoint,
    /// Outer boundaries of lanes 1, 2, ... (inner to outer).
    pub left: Vec<BoundaryPoint>,
    /// Outer boundaries of lanes -1, -2, ... (inner to outer).
    pub right: Vec<BoundaryPoint>,
    pub normal: DVec3,
}

impl CrossSection<'_> {
    /// Places lateral position `t` on the road surface.
    pub fn point_at(&self, t: f64) -> DVec3 {
        let (sin, cos) = self.roll.sin_cos();
        let planar = self.pose.position() + self.pose.left_normal() * (t * cos);
        let shape = self.shape.map_or(0.0, |shape| shape.height(self.s, t));
        DVec3::new(planar.x, planar.y, self.elevation + t * sin + shape)
    }

    /// Outer boundary of `lane_id`; the reference boundary for lane 0.
    pub fn boundary(&self, lane_id: i32) -> Option<&BoundaryPoint> {
        match lane_id {
            0 => Some(&self.center),
            id if id > 0 => self.left.get(id as usize - 1),
            id => self.right.get((-id) as usize - 1),
        }
    }

    /// Inner and outer boundary of a side lane.
    pub fn lane_edges(&self, lane_id: i32) -> Option<(&BoundaryPoint, &BoundaryPoint)> {
        if lane_id == 0 {
            return None;
        }
        let inner = self.boundary(lane_id - lane_id.signum())?;
        let outer = self.boundary(lane_id)?;
        Some((inner, outer))
    }

    /// Largest lateral distance of any boundary from the reference line.
    pub fn max_abs_t(&self) -> f64 {
        self.left
            .iter()
            .chain(self.right.iter())
            .fold(self.center.t.abs(), |acc, b| acc.max(b.t.abs()))
    }
}

/// Cross section of `road` at `s`, using the lane section active there.
pub fn cross_section_at<'a>(
    road: &'a Road,
    line: &ReferenceLine,
    s: f64,
    config: &TessellationConfig,
) -> Result<CrossSection<'a>> {
    cross_section_in(road, line, road.section_index_at(s), s, config)
}

/// Cross section of `road` at `s` using lane section `section` explicitly.
///
/// The tessellator uses this at section ends, where the station already
/// belongs to the following section.
pub fn cross_section_in<'a>(
    road: &'a Road,
    line: &ReferenceLine,
    section: Option<usize>,
    s: f64,
    config: &TessellationConfig,
) -> Result<CrossSection<'a>> {
    let pose = line.evaluate_clamped(s, config.continuity_tolerance)?;

    let (elevation, slope, roll, shape) = if config.flatten_profiles {
        (0.0, 0.0, 0.0, None)
    } else {
        (
            road.elevation.value(s),
            road.elevation.slope(s),
            road.superelevation.value(s),
            (!road.shape.is_empty()).then_some(&road.shape),
        )
    };

    let mut cross = CrossSection {
        s,
        section,
        pose,
        elevation,
        slope,
        roll,
        shape,
        center: BoundaryPoint {
            lane_id: 0,
            t: 0.0,
            position: DVec3::ZERO,
        },
        left: Vec::new(),
        right: Vec::new(),
        normal: surface_normal(&pose, slope, roll),
    };

    let center_t = road.lane_offset.value(s);
    cross.center.t = center_t;
    cross.center.position = cross.point_at(center_t);

    if let Some(lanes) = section.and_then(|idx| road.lane_sections.get(idx)) {
        // widths are held at their section-start value before the first section
        let ds = (s - lanes.s).max(0.0);

        let mut t = center_t;
        for lane in &lanes.left {
            t += lane.width_at(ds);
            cross.left.push(BoundaryPoint {
                lane_id: lane.id,
                t,
                position: cross.point_at(t),
            });
        }

        let mut t = center_t;
        for lane in &lanes.right {
            t -= lane.width_at(ds);
            cross.right.push(BoundaryPoint {
                lane_id: lane.id,
                t,
                position: cross.point_at(t),
            });
        }
    }

    Ok(cross)
}

fn surface_normal(pose: &Pose, slope: f64, roll: f64) -> DVec3 {
    let tangent = pose.tangent();
    let tangent = DVec3::new(tangent.x, tangent.y, slope);
    let (sin, cos) = roll.sin_cos();
    let lateral: DVec2 = pose.left_normal() * cos;
    let lateral = DVec3::new(lateral.x, lateral.y, sin);
    tangent.cross(lateral).normalize_or_zero()
}
