pub mod cross_section;
pub mod error;
pub mod geometry;
pub mod mesh;
pub mod model;
pub mod network;
pub mod parser;
pub mod reference_line;
pub mod tessellator;
pub mod writer;

pub use error::{Error, Result};
pub use mesh::{Mesh, MeshStrip, StripId, StripKind};
pub use model::{Road, RoadNetwork};
pub use network::{build_network_mesh, NetworkMesh, SkippedRoad, StripRange};
pub use parser::{parse_xodr, parse_xodr_file, parse_xodr_str};
pub use reference_line::ReferenceLine;
pub use tessellator::{tessellate, TessellationConfig};
pub use writer::ObjWriter;
