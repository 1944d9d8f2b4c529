use glam::DVec2;
use std::f64::consts::{PI, TAU};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{self, Pose, EVAL_TOLERANCE};
use crate::model::GeometryPrimitive;

/// A road's plan-view primitives joined into one curve parameterized by station.
#[derive(Debug, Clone)]
pub struct ReferenceLine {
    primitives: Vec<GeometryPrimitive>,
}

impl ReferenceLine {
    /// Joins `primitives` after checking that each one starts where its
    /// predecessor ends, in station, position and heading.
    ///
    /// `tolerance` bounds the station and position gaps (length units) and
    /// the heading gap (radians).
    pub fn assemble(primitives: &[GeometryPrimitive], tolerance: f64) -> Result<Self> {
        if primitives.is_empty() {
            return Err(Error::MissingGeometry);
        }

        for (index, pair) in primitives.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            let end = geometry::end_pose(prev)?;

            let station_gap = (next.s - prev.end_s()).abs();
            let position_gap = end.position().distance(DVec2::new(next.x, next.y));
            let heading_gap = wrap_angle(next.hdg - end.hdg).abs();

            if station_gap > tolerance || position_gap > tolerance || heading_gap > tolerance {
                return Err(Error::Discontinuity {
                    index: index + 1,
                    gap: station_gap.max(position_gap),
                    heading_gap,
                });
            }
        }

        let line = Self {
            primitives: primitives.to_vec(),
        };
        debug!(
            "Assembled reference line from {} primitives over [{}, {}]",
            line.primitives.len(),
            line.start(),
            line.end()
        );
        Ok(line)
    }

    pub fn start(&self) -> f64 {
        self.primitives[0].s
    }

    pub fn end(&self) -> f64 {
        self.primitives[self.primitives.len() - 1].end_s()
    }

    pub fn length(&self) -> f64 {
        self.end() - self.start()
    }

    /// Stations where one primitive hands over to the next.
    pub fn joins(&self) -> impl Iterator<Item = f64> + '_ {
        self.primitives.iter().skip(1).map(|p| p.s)
    }

    /// Pose of the reference line at station `s`.
    pub fn evaluate_at(&self, s: f64) -> Result<Pose> {
        let (start, end) = (self.start(), self.end());
        if !(s >= start - EVAL_TOLERANCE && s <= end + EVAL_TOLERANCE) {
            return Err(Error::OutOfRange { s, start, end });
        }

        let idx = self
            .primitives
            .partition_point(|p| p.s <= s)
            .saturating_sub(1);
        let primitive = &self.primitives[idx];
        // stations in a tolerated gap between two primitives snap to the nearer one's end
        let local = (s - primitive.s).clamp(0.0, primitive.length.max(0.0));
        geometry::evaluate(primitive, local)
    }

    /// Signed plan-view curvature at station `s`, positive when turning left.
    pub fn curvature_at(&self, s: f64) -> Result<f64> {
        Ok(self.evaluate_at(s)?.curvature)
    }

    /// Like [`evaluate_at`](Self::evaluate_at), but stations up to `tolerance`
    /// beyond either end are pulled back onto the line.
    ///
    /// Declared road lengths rarely match the summed geometry lengths exactly.
    pub fn evaluate_clamped(&self, s: f64, tolerance: f64) -> Result<Pose> {
        let (start, end) = (self.start(), self.end());
        let s = if s < start && start - s <= tolerance {
            start
        } else if s > end && s - end <= tolerance {
            end
        } else {
            s
        };
        self.evaluate_at(s)
    }
}

/// Maps an angle onto `(-PI, PI]`.
pub(crate) fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeometryKind;

    fn line(s: f64, x: f64, y: f64, hdg: f64, length: f64) -> GeometryPrimitive {
        GeometryPrimitive {
            s,
            x,
            y,
            hdg,
            length,
            kind: GeometryKind::Line,
        }
    }

    /// line 0..20, arc 20..50, line 50..60, each starting at its predecessor's end
    fn chained() -> Vec<GeometryPrimitive> {
        let first = line(0.0, 0.0, 0.0, 0.0, 20.0);
        let arc_start = geometry::end_pose(&first).unwrap();
        let arc = GeometryPrimitive {
            s: 20.0,
            x: arc_start.x,
            y: arc_start.y,
            hdg: arc_start.hdg,
            length: 30.0,
            kind: GeometryKind::Arc { curvature: 0.02 },
        };
        let arc_end = geometry::end_pose(&arc).unwrap();
        let last = line(50.0, arc_end.x, arc_end.y, arc_end.hdg, 10.0);
        vec![first, arc, last]
    }

    #[test]
    fn test_assemble_contiguous_sequence() {
        let line = ReferenceLine::assemble(&chained(), 1e-6).unwrap();
        assert_eq!(line.start(), 0.0);
        assert_eq!(line.end(), 60.0);
        assert_eq!(line.joins().collect::<Vec<_>>(), vec![20.0, 50.0]);
    }

    #[test]
    fn test_evaluate_at_delegates_to_containing_primitive() {
        let primitives = chained();
        let line = ReferenceLine::assemble(&primitives, 1e-6).unwrap();

        let pose = line.evaluate_at(35.0).unwrap();
        let expected = geometry::evaluate(&primitives[1], 15.0).unwrap();
        assert_eq!(pose, expected);

        let pose = line.evaluate_at(10.0).unwrap();
        assert_eq!((pose.x, pose.y), (10.0, 0.0));

        // joins belong to the following primitive
        let pose = line.evaluate_at(20.0).unwrap();
        assert_eq!(pose.curvature, 0.02);

        let end = line.evaluate_at(60.0).unwrap();
        let expected = geometry::end_pose(&primitives[2]).unwrap();
        assert!((end.x - expected.x).abs() < 1e-12);
    }

    #[test]
    fn test_curvature_at_follows_spiral() {
        let first = line(0.0, 0.0, 0.0, 0.0, 10.0);
        let spiral = GeometryPrimitive {
            s: 10.0,
            x: 10.0,
            y: 0.0,
            hdg: 0.0,
            length: 20.0,
            kind: GeometryKind::Spiral {
                curv_start: 0.01,
                curv_end: 0.03,
            },
        };
        let line = ReferenceLine::assemble(&[first, spiral], 1e-6).unwrap();
        assert_eq!(line.length(), 30.0);

        assert_eq!(line.curvature_at(5.0).unwrap(), 0.0);
        assert!((line.curvature_at(20.0).unwrap() - 0.02).abs() < 1e-12);
        assert!((line.curvature_at(30.0).unwrap() - 0.03).abs() < 1e-12);
        assert!(matches!(
            line.curvature_at(31.0),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_out_of_range_station() {
        let line = ReferenceLine::assemble(&chained(), 1e-6).unwrap();
        assert!(matches!(line.evaluate_at(-1.0), Err(Error::OutOfRange { .. })));
        assert!(matches!(
            line.evaluate_at(60.5),
            Err(Error::OutOfRange { end, .. }) if end == 60.0
        ));
    }

    #[test]
    fn test_evaluate_clamped_absorbs_small_overshoot() {
        let line = ReferenceLine::assemble(&chained(), 1e-6).unwrap();
        let clamped = line.evaluate_clamped(60.004, 0.01).unwrap();
        assert_eq!(clamped, line.evaluate_at(60.0).unwrap());
        assert!(line.evaluate_clamped(60.5, 0.01).is_err());
    }

    #[test]
    fn test_position_gap_names_offending_primitive() {
        let mut primitives = chained();
        primitives[2].y += 0.5;

        let err = ReferenceLine::assemble(&primitives, 0.01).unwrap_err();
        match err {
            Error::Discontinuity { index, gap, .. } => {
                assert_eq!(index, 2);
                assert!((gap - 0.5).abs() < 1e-9, "gap was {}", gap);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_heading_and_station_gaps_are_detected() {
        let mut primitives = chained();
        primitives[1].hdg += 0.1;
        assert!(matches!(
            ReferenceLine::assemble(&primitives, 0.01),
            Err(Error::Discontinuity { index: 1, .. })
        ));

        let mut primitives = chained();
        primitives[1].s = 21.0;
        assert!(matches!(
            ReferenceLine::assemble(&primitives, 0.01),
            Err(Error::Discontinuity { index: 1, .. })
        ));
    }

    #[test]
    fn test_small_gaps_within_tolerance_are_accepted() {
        let mut primitives = chained();
        primitives[2].x += 0.001;
        assert!(ReferenceLine::assemble(&primitives, 0.01).is_ok());
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        assert!(matches!(
            ReferenceLine::assemble(&[], 0.01),
            Err(Error::MissingGeometry)
        ));
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(TAU + 0.1) - 0.1).abs() < 1e-12);
        assert!((wrap_angle(-0.1) + 0.1).abs() < 1e-12);
        assert!((wrap_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-12);
    }
}
