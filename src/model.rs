//! In-memory view of an OpenDRIVE document.
//!
//! Everything here is built once by the parser and is read-only afterwards.
//! Stations (`s`) are arc-length positions along a road's reference line and
//! lateral positions (`t`) are measured to the left of it.

use crate::error::{Error, Result};

/// `a + b·ds + c·ds² + d·ds³`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CubicPoly {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl CubicPoly {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub fn constant(a: f64) -> Self {
        Self::new(a, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn eval(&self, ds: f64) -> f64 {
        self.a + ds * (self.b + ds * (self.c + ds * self.d))
    }

    #[inline]
    pub fn derivative(&self, ds: f64) -> f64 {
        self.b + ds * (2.0 * self.c + ds * 3.0 * self.d)
    }

    #[inline]
    pub fn second_derivative(&self, ds: f64) -> f64 {
        2.0 * self.c + 6.0 * self.d * ds
    }
}

/// One polynomial piece of a [`Profile`], valid from `start` until the next piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileRecord {
    pub start: f64,
    pub poly: CubicPoly,
}

/// Piecewise cubic function of a station.
///
/// Used for elevation, superelevation, lane offset and lane widths. The active
/// piece at `s` is the last one whose start is `<= s`; queries before the
/// first piece use the first piece. An empty profile is zero everywhere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    records: Vec<ProfileRecord>,
}

impl Profile {
    pub fn new(mut records: Vec<ProfileRecord>) -> Self {
        records.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { records }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![ProfileRecord {
            start: 0.0,
            poly: CubicPoly::constant(value),
        }])
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn active(&self, s: f64) -> Option<&ProfileRecord> {
        let idx = self.records.partition_point(|r| r.start <= s);
        self.records.get(idx.saturating_sub(1))
    }

    pub fn value(&self, s: f64) -> f64 {
        self.active(s).map_or(0.0, |r| r.poly.eval(s - r.start))
    }

    pub fn slope(&self, s: f64) -> f64 {
        self.active(s).map_or(0.0, |r| r.poly.derivative(s - r.start))
    }

    pub fn second_derivative(&self, s: f64) -> f64 {
        self.active(s)
            .map_or(0.0, |r| r.poly.second_derivative(s - r.start))
    }
}

/// Lateral shape record: a height polynomial in `t - t_start` at station `s`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeRecord {
    pub s: f64,
    pub t: f64,
    pub poly: CubicPoly,
}

#[derive(Debug, Clone, PartialEq)]
struct ShapeGroup {
    s: f64,
    // sorted by t
    pieces: Vec<(f64, CubicPoly)>,
}

impl ShapeGroup {
    fn height(&self, t: f64) -> f64 {
        let idx = self.pieces.partition_point(|(start, _)| *start <= t);
        self.pieces
            .get(idx.saturating_sub(1))
            .map_or(0.0, |(start, poly)| poly.eval(t - start))
    }
}

/// Lateral shape of the road surface.
///
/// Records sharing a station form one cross profile; between two stations
/// the height is interpolated linearly, after the last it is held.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeProfile {
    groups: Vec<ShapeGroup>,
}

impl ShapeProfile {
    pub fn new(mut records: Vec<ShapeRecord>) -> Self {
        records.sort_by(|a, b| a.s.total_cmp(&b.s).then(a.t.total_cmp(&b.t)));

        let mut groups: Vec<ShapeGroup> = Vec::new();
        for record in records {
            match groups.last_mut() {
                Some(group) if group.s == record.s => group.pieces.push((record.t, record.poly)),
                _ => groups.push(ShapeGroup {
                    s: record.s,
                    pieces: vec![(record.t, record.poly)],
                }),
            }
        }

        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn height(&self, s: f64, t: f64) -> f64 {
        if self.groups.is_empty() {
            return 0.0;
        }

        let idx = self.groups.partition_point(|g| g.s <= s);
        if idx == 0 {
            return self.groups[0].height(t);
        }

        let before = &self.groups[idx - 1];
        let h0 = before.height(t);
        match self.groups.get(idx) {
            Some(after) if after.s > before.s => {
                let f = (s - before.s) / (after.s - before.s);
                h0 + f * (after.height(t) - h0)
            }
            _ => h0,
        }
    }
}

/// Parameter range of a `paramPoly3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamRange {
    /// `p` runs over `[0, length]`.
    #[default]
    ArcLength,
    /// `p` runs over `[0, 1]`.
    Normalized,
}

/// Type-specific part of a plan-view geometry record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryKind {
    Line,
    Arc {
        curvature: f64,
    },
    Spiral {
        curv_start: f64,
        curv_end: f64,
    },
    Poly3(CubicPoly),
    ParamPoly3 {
        u: CubicPoly,
        v: CubicPoly,
        p_range: ParamRange,
    },
}

/// One piece of a road's reference line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryPrimitive {
    /// Station of the start of this piece along the road.
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub hdg: f64,
    pub length: f64,
    pub kind: GeometryKind,
}

impl GeometryPrimitive {
    pub fn end_s(&self) -> f64 {
        self.s + self.length
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoadMark {
    /// Offset from the start of the lane section.
    pub s_offset: f64,
    pub mark_type: String,
    pub width: f64,
}

impl RoadMark {
    /// Default painted width when the document omits one.
    pub const DEFAULT_WIDTH: f64 = 0.12;

    pub fn is_visible(&self) -> bool {
        self.mark_type != "none" && self.width > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    /// 0 is the center lane, positive ids lie to the left and negative to the right.
    pub id: i32,
    pub lane_type: String,
    /// Width as a function of the offset from the lane section start.
    pub width: Profile,
    pub road_marks: Vec<RoadMark>,
}

impl Lane {
    pub fn new(id: i32, lane_type: impl Into<String>, width: Profile) -> Self {
        Self {
            id,
            lane_type: lane_type.into(),
            width,
            road_marks: Vec::new(),
        }
    }

    pub fn is_driving(&self) -> bool {
        self.lane_type == "driving"
    }

    pub fn width_at(&self, ds: f64) -> f64 {
        self.width.value(ds).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaneSection {
    pub s: f64,
    /// Left lanes ordered 1, 2, ...
    pub left: Vec<Lane>,
    pub center: Option<Lane>,
    /// Right lanes ordered -1, -2, ...
    pub right: Vec<Lane>,
}

impl LaneSection {
    pub fn new(s: f64, mut left: Vec<Lane>, center: Option<Lane>, mut right: Vec<Lane>) -> Self {
        left.sort_by_key(|lane| lane.id);
        right.sort_by_key(|lane| -lane.id);
        Self {
            s,
            left,
            center,
            right,
        }
    }

    /// Checks that lane ids are unique and contiguous outward from 0.
    pub fn validate(&self, index: usize) -> Result<()> {
        let invalid = |message: String| Error::InvalidLaneSection {
            section: index,
            message,
        };

        for (k, lane) in self.left.iter().enumerate() {
            let expected = k as i32 + 1;
            if lane.id != expected {
                return Err(invalid(format!(
                    "left lane ids must be 1..={}, found {} where {} was expected",
                    self.left.len(),
                    lane.id,
                    expected
                )));
            }
        }
        for (k, lane) in self.right.iter().enumerate() {
            let expected = -(k as i32) - 1;
            if lane.id != expected {
                return Err(invalid(format!(
                    "right lane ids must be -1..=-{}, found {} where {} was expected",
                    self.right.len(),
                    lane.id,
                    expected
                )));
            }
        }
        if let Some(center) = &self.center {
            if center.id != 0 {
                return Err(invalid(format!("center lane has id {}", center.id)));
            }
        }

        Ok(())
    }

    pub fn lane(&self, id: i32) -> Option<&Lane> {
        match id {
            0 => self.center.as_ref(),
            id if id > 0 => self.left.get(id as usize - 1),
            id => self.right.get((-id) as usize - 1),
        }
    }

    /// Side lanes, right side first then left, each inner to outer.
    pub fn side_lanes(&self) -> impl Iterator<Item = &Lane> {
        self.right.iter().chain(self.left.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Road {
    pub id: String,
    pub name: Option<String>,
    pub junction: Option<String>,
    pub length: f64,
    pub plan_view: Vec<GeometryPrimitive>,
    pub lane_offset: Profile,
    /// Sorted by start station.
    pub lane_sections: Vec<LaneSection>,
    pub elevation: Profile,
    pub superelevation: Profile,
    pub shape: ShapeProfile,
}

impl Road {
    pub fn new(id: impl Into<String>, length: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            junction: None,
            length,
            plan_view: Vec::new(),
            lane_offset: Profile::default(),
            lane_sections: Vec::new(),
            elevation: Profile::default(),
            superelevation: Profile::default(),
            shape: ShapeProfile::default(),
        }
    }

    /// Index of the lane section active at `s`: the last one starting at or before it.
    pub fn section_index_at(&self, s: f64) -> Option<usize> {
        if self.lane_sections.is_empty() {
            return None;
        }
        let idx = self.lane_sections.partition_point(|section| section.s <= s);
        Some(idx.saturating_sub(1))
    }

    /// Station range covered by lane section `idx`, clipped to the road.
    ///
    /// The first section also covers any stretch before its start.
    pub fn section_range(&self, idx: usize) -> (f64, f64) {
        let start = if idx == 0 {
            0.0
        } else {
            self.lane_sections[idx].s.clamp(0.0, self.length)
        };
        let end = self
            .lane_sections
            .get(idx + 1)
            .map_or(self.length, |next| next.s)
            .clamp(start, self.length);
        (start, end)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub name: Option<String>,
    pub rev_major: u32,
    pub rev_minor: u32,
}

/// A parsed OpenDRIVE document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadNetwork {
    pub header: Header,
    /// Roads in document order.
    pub roads: Vec<Road>,
}
