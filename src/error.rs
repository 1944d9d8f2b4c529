use thiserror::Error;

/// Errors produced while reading and tessellating a road network.
#[derive(Debug, Error)]
pub enum Error {
    /// The OpenDRIVE document could not be read.
    #[error("XML parse error at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// A station lies outside the interval a geometry or reference line covers.
    #[error("station {s} is outside [{start}, {end}]")]
    OutOfRange { s: f64, start: f64, end: f64 },

    /// Consecutive plan-view primitives do not join up.
    #[error(
        "geometry {index} does not continue its predecessor (gap {gap:.6} m, heading gap {heading_gap:.6} rad)"
    )]
    Discontinuity {
        index: usize,
        gap: f64,
        heading_gap: f64,
    },

    #[error("road has non-positive length {length}")]
    EmptyRoad { length: f64 },

    #[error("road has no plan-view geometry")]
    MissingGeometry,

    #[error("declared road length {declared} does not match geometry length {geometry}")]
    LengthMismatch { declared: f64, geometry: f64 },

    #[error("lane section {section}: {message}")]
    InvalidLaneSection { section: usize, message: String },

    #[error("mesh would hold {count} vertices, more than 32-bit indices can address")]
    TooManyVertices { count: usize },

    #[error("invalid tessellation config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parse(position: u64, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Returns true for errors that only invalidate a single road.
    ///
    /// The network builder skips such roads and keeps going.
    pub fn is_road_local(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. }
                | Self::Discontinuity { .. }
                | Self::EmptyRoad { .. }
                | Self::MissingGeometry
                | Self::LengthMismatch { .. }
                | Self::InvalidLaneSection { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
