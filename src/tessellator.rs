//! Adaptive sampling of a road into per-lane triangle strips.

use glam::DVec3;
use tracing::{debug, trace, warn};

use crate::cross_section::{cross_section_in, CrossSection};
use crate::error::{Error, Result};
use crate::mesh::{MeshStrip, StripId, StripKind};
use crate::model::{Lane, LaneSection, Road};
use crate::reference_line::ReferenceLine;

/// Stations closer than this are treated as the same station.
const STATION_EPSILON: f64 = 1e-9;

/// Lower bound of `1 - |k|·t` used when widening the curvature of outer
/// boundaries; keeps the estimate finite when a boundary reaches the center
/// of curvature.
const MIN_OFFSET_FACTOR: f64 = 0.1;

const CURVATURE_EPSILON: f64 = 1e-12;

/// Tessellation settings.
///
/// All lengths are in the document's length unit, normally meters.
#[derive(Debug, Clone, PartialEq)]
pub struct TessellationConfig {
    /// Largest allowed distance between a chord and the curve it replaces.
    pub max_chord_error: f64,
    pub min_step: f64,
    pub max_step: f64,
    /// Largest station, position or heading gap accepted between geometry
    /// primitives and between the declared and the geometric road length.
    pub continuity_tolerance: f64,
    /// Emit strips for road marks.
    pub road_marks: bool,
    /// Only emit lanes of type `driving`.
    pub driving_only: bool,
    /// Ignore elevation, superelevation and lateral shape.
    pub flatten_profiles: bool,
}

impl TessellationConfig {
    pub const DEFAULT_MAX_CHORD_ERROR: f64 = 0.1;

    pub fn validate(&self) -> Result<()> {
        if !(self.max_chord_error.is_finite() && self.max_chord_error > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "max chord error must be positive, got {}",
                self.max_chord_error
            )));
        }
        if !(self.min_step.is_finite() && self.min_step > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "min step must be positive, got {}",
                self.min_step
            )));
        }
        if !(self.max_step.is_finite() && self.max_step >= self.min_step) {
            return Err(Error::InvalidConfig(format!(
                "max step {} must not be below min step {}",
                self.max_step, self.min_step
            )));
        }
        if !(self.continuity_tolerance.is_finite() && self.continuity_tolerance >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "continuity tolerance must not be negative, got {}",
                self.continuity_tolerance
            )));
        }
        Ok(())
    }

    /// Length of the chord whose sagitta on a curve of `curvature` equals
    /// the max chord error, clamped to the step bounds.
    pub fn step_for_curvature(&self, curvature: f64) -> f64 {
        let curvature = curvature.abs();
        if curvature < CURVATURE_EPSILON {
            return self.max_step;
        }
        let radius = 1.0 / curvature;
        let error = self.max_chord_error.min(radius);
        let chord = 2.0 * (2.0 * radius * error - error * error).sqrt();
        chord.clamp(self.min_step, self.max_step)
    }
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            max_chord_error: Self::DEFAULT_MAX_CHORD_ERROR,
            min_step: 0.1,
            max_step: 10.0,
            continuity_tolerance: 0.01,
            road_marks: true,
            driving_only: false,
            flatten_profiles: false,
        }
    }
}

/// Tessellates `road` into one strip per lane and lane section, plus one
/// per visible road mark when enabled.
pub fn tessellate(road: &Road, config: &TessellationConfig) -> Result<Vec<MeshStrip>> {
    if !(road.length > 0.0) {
        return Err(Error::EmptyRoad {
            length: road.length,
        });
    }

    let line = ReferenceLine::assemble(&road.plan_view, config.continuity_tolerance)?;
    if line.start().abs() > config.continuity_tolerance
        || (line.end() - road.length).abs() > config.continuity_tolerance
    {
        return Err(Error::LengthMismatch {
            declared: road.length,
            geometry: line.end(),
        });
    }

    if road.lane_sections.is_empty() {
        warn!("Road {} has no lane sections, nothing to mesh", road.id);
        return Ok(Vec::new());
    }
    for (idx, section) in road.lane_sections.iter().enumerate() {
        section.validate(idx)?;
    }

    let mut strips = Vec::new();
    for (idx, section) in road.lane_sections.iter().enumerate() {
        let (start, end) = road.section_range(idx);
        if end - start <= STATION_EPSILON {
            debug!("Road {}: skipping empty lane section {}", road.id, idx);
            continue;
        }

        let mut breakpoints: Vec<f64> = line.joins().collect();
        if config.road_marks {
            breakpoints.extend(
                lanes_with_marks(section)
                    .flat_map(|lane| lane.road_marks.iter())
                    .map(|mark| section.s + mark.s_offset),
            );
        }

        let stations = march(road, &line, idx, start, end, breakpoints, config)?;
        trace!(
            "Road {}: section {} sampled at {} stations",
            road.id,
            idx,
            stations.len()
        );

        for lane in section.side_lanes() {
            if config.driving_only && !lane.is_driving() {
                continue;
            }
            if let Some(strip) = lane_strip(road, idx, lane.id, &stations) {
                strips.push(strip);
            }
        }

        if config.road_marks {
            for lane in lanes_with_marks(section) {
                if config.driving_only && lane.id != 0 && !lane.is_driving() {
                    continue;
                }
                strips.extend(road_mark_strips(road, idx, section, lane, end, &stations));
            }
        }
    }

    debug!("Road {}: tessellated into {} strips", road.id, strips.len());
    Ok(strips)
}

/// Center lane first, then the side lanes.
fn lanes_with_marks(section: &LaneSection) -> impl Iterator<Item = &Lane> {
    section.center.iter().chain(section.side_lanes())
}

/// Samples lane section `section` over `[start, end]`.
///
/// The step follows the curvature at the current station, rechecked at the
/// step's end so steps shrink when entering tighter curves. Every breakpoint
/// inside the range becomes a station and the last station is exactly `end`.
fn march<'a>(
    road: &'a Road,
    line: &ReferenceLine,
    section: usize,
    start: f64,
    end: f64,
    mut breakpoints: Vec<f64>,
    config: &TessellationConfig,
) -> Result<Vec<CrossSection<'a>>> {
    breakpoints.retain(|&b| b > start + STATION_EPSILON && b < end - STATION_EPSILON);
    breakpoints.sort_by(f64::total_cmp);
    breakpoints.dedup_by(|a, b| (*a - *b).abs() <= STATION_EPSILON);
    let mut breakpoints = breakpoints.into_iter().peekable();

    let mut stations = vec![cross_section_in(road, line, Some(section), start, config)?];
    let mut s = start;
    while s < end {
        let Some(current) = stations.last() else {
            break;
        };
        let step = step_length(road, line, current, config)?;

        let mut next = s + step;
        while breakpoints.next_if(|&b| b <= s + STATION_EPSILON).is_some() {}
        if let Some(&b) = breakpoints.peek() {
            next = next.min(b);
        }
        if next >= end - STATION_EPSILON {
            next = end;
        }

        stations.push(cross_section_in(road, line, Some(section), next, config)?);
        s = next;
    }

    Ok(stations)
}

fn step_length(
    road: &Road,
    line: &ReferenceLine,
    current: &CrossSection<'_>,
    config: &TessellationConfig,
) -> Result<f64> {
    let reach = current.max_abs_t();
    let curvature_at = |horizontal: f64, s: f64| {
        let horizontal = horizontal.abs();
        let factor = (1.0 - horizontal * reach).max(MIN_OFFSET_FACTOR);
        let vertical = if config.flatten_profiles {
            0.0
        } else {
            road.elevation.second_derivative(s).abs()
        };
        (horizontal / factor).max(vertical)
    };

    let here = curvature_at(current.pose.curvature, current.s);
    let step = config.step_for_curvature(here);

    let ahead_s = (current.s + step).min(line.end());
    let there = curvature_at(line.curvature_at(ahead_s)?, ahead_s);

    Ok(if there > here {
        config.step_for_curvature(there)
    } else {
        step
    })
}

fn lane_strip(road: &Road, section: usize, lane_id: i32, stations: &[CrossSection<'_>]) -> Option<MeshStrip> {
    let columns = stations
        .iter()
        .map(|cross| {
            let (inner, outer) = cross.lane_edges(lane_id)?;
            Some(if lane_id < 0 {
                (outer.position, inner.position)
            } else {
                (inner.position, outer.position)
            })
        })
        .collect::<Option<Vec<(DVec3, DVec3)>>>()?;

    let id = StripId {
        road_id: road.id.clone(),
        section,
        lane_id,
        kind: StripKind::Lane,
    };
    Some(MeshStrip::from_columns(id, &columns))
}

fn road_mark_strips(
    road: &Road,
    section: usize,
    lanes: &LaneSection,
    lane: &Lane,
    section_end: f64,
    stations: &[CrossSection<'_>],
) -> Vec<MeshStrip> {
    let mut strips = Vec::new();

    for (index, mark) in lane.road_marks.iter().enumerate() {
        if !mark.is_visible() {
            continue;
        }
        let from = lanes.s + mark.s_offset;
        let to = lane
            .road_marks
            .get(index + 1)
            .map_or(section_end, |next| lanes.s + next.s_offset)
            .min(section_end);

        let half = 0.5 * mark.width;
        let columns: Vec<(DVec3, DVec3)> = stations
            .iter()
            .filter(|cross| cross.s >= from - STATION_EPSILON && cross.s <= to + STATION_EPSILON)
            .filter_map(|cross| {
                let t = cross.boundary(lane.id)?.t;
                Some((cross.point_at(t - half), cross.point_at(t + half)))
            })
            .collect();

        if columns.len() < 2 {
            continue;
        }

        let id = StripId {
            road_id: road.id.clone(),
            section,
            lane_id: lane.id,
            kind: StripKind::RoadMark(index),
        };
        strips.push(MeshStrip::from_columns(id, &columns));
    }

    strips
}
