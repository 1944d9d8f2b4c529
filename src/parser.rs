//! OpenDRIVE reader.
//!
//! Streams the document with quick-xml and keeps a stack of open element
//! names so that each element is interpreted by its parent, e.g. `width`
//! only counts inside a `lane`. Elements the mesher has no use for
//! (junctions, objects, signals, links, ...) are skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{
    CubicPoly, GeometryKind, GeometryPrimitive, Header, Lane, LaneSection, ParamRange, Profile,
    ProfileRecord, Road, RoadMark, RoadNetwork, ShapeProfile, ShapeRecord,
};

type ParseResult<T> = std::result::Result<T, String>;

/// Parses an OpenDRIVE document from `reader`.
pub fn parse_xodr<R: BufRead>(reader: R) -> Result<RoadNetwork> {
    let mut reader = Reader::from_reader(reader);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut builder = DocumentBuilder::default();

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let (name, attrs) = element(&e).map_err(|msg| Error::parse(position, msg))?;
                builder
                    .open(&name, &attrs)
                    .map_err(|msg| Error::parse(position, msg))?;
            }
            Ok(Event::Empty(e)) => {
                let (name, attrs) = element(&e).map_err(|msg| Error::parse(position, msg))?;
                builder
                    .open(&name, &attrs)
                    .and_then(|()| builder.close(&name))
                    .map_err(|msg| Error::parse(position, msg))?;
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                builder
                    .close(&name)
                    .map_err(|msg| Error::parse(position, msg))?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::parse(reader.error_position() as u64, e.to_string()));
            }
            _ => (),
        }
        buf.clear();
    }

    let network = builder
        .finish()
        .map_err(|msg| Error::parse(reader.buffer_position() as u64, msg))?;
    info!(
        "Parsed OpenDRIVE {}.{} document {:?}: {} roads",
        network.header.rev_major,
        network.header.rev_minor,
        network.header.name.as_deref().unwrap_or(""),
        network.roads.len()
    );
    Ok(network)
}

pub fn parse_xodr_str(xml: &str) -> Result<RoadNetwork> {
    parse_xodr(xml.as_bytes())
}

pub fn parse_xodr_file(path: &Path) -> Result<RoadNetwork> {
    let file = File::open(path)?;
    parse_xodr(BufReader::new(file))
}

fn element(e: &BytesStart) -> ParseResult<(String, Attributes)> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let attrs = Attributes::read(e).map_err(|msg| format!("<{}>: {}", name, msg))?;
    Ok((name, attrs))
}

/// Attributes of one element, namespace prefixes stripped.
#[derive(Debug, Default)]
struct Attributes(Vec<(String, String)>);

impl Attributes {
    fn read(e: &BytesStart) -> ParseResult<Self> {
        let mut pairs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| err.to_string())?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            pairs.push((key, value.into_owned()));
        }
        Ok(Self(pairs))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn string(&self, element: &str, key: &str) -> ParseResult<String> {
        self.get(key)
            .map(str::to_string)
            .ok_or_else(|| format!("<{}> is missing required attribute '{}'", element, key))
    }

    fn number<T: std::str::FromStr>(&self, element: &str, key: &str) -> ParseResult<Option<T>>
    where
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|err| {
                    format!(
                        "<{}> attribute '{}' has invalid value '{}': {}",
                        element, key, raw, err
                    )
                })
            })
            .transpose()
    }

    /// A real-valued attribute; `NaN` and infinities are rejected.
    fn finite(&self, element: &str, key: &str) -> ParseResult<Option<f64>> {
        match self.number::<f64>(element, key)? {
            Some(value) if !value.is_finite() => Err(format!(
                "<{}> attribute '{}' must be a finite number, got '{}'",
                element,
                key,
                self.get(key).unwrap_or_default()
            )),
            value => Ok(value),
        }
    }

    fn f64(&self, element: &str, key: &str) -> ParseResult<f64> {
        self.finite(element, key)?
            .ok_or_else(|| format!("<{}> is missing required attribute '{}'", element, key))
    }

    fn f64_or(&self, element: &str, key: &str, default: f64) -> ParseResult<f64> {
        Ok(self.finite(element, key)?.unwrap_or(default))
    }

    /// Cubic coefficients named `a{suffix}` .. `d{suffix}`, defaulting to 0.
    fn cubic(&self, element: &str, suffix: &str) -> ParseResult<CubicPoly> {
        let coefficient = |name: &str| self.f64_or(element, &format!("{}{}", name, suffix), 0.0);
        Ok(CubicPoly::new(
            coefficient("a")?,
            coefficient("b")?,
            coefficient("c")?,
            coefficient("d")?,
        ))
    }

    fn profile_record(&self, element: &str, start_key: &str) -> ParseResult<ProfileRecord> {
        Ok(ProfileRecord {
            start: self.f64(element, start_key)?,
            poly: self.cubic(element, "")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Center,
    Right,
}

#[derive(Debug)]
struct RoadDraft {
    road: Road,
    lane_offset: Vec<ProfileRecord>,
    elevation: Vec<ProfileRecord>,
    superelevation: Vec<ProfileRecord>,
    shape: Vec<ShapeRecord>,
}

impl RoadDraft {
    fn finish(self) -> Road {
        let mut road = self.road;
        road.lane_offset = Profile::new(self.lane_offset);
        road.elevation = Profile::new(self.elevation);
        road.superelevation = Profile::new(self.superelevation);
        road.shape = ShapeProfile::new(self.shape);
        road.lane_sections.sort_by(|a, b| a.s.total_cmp(&b.s));
        road
    }
}

#[derive(Debug)]
struct GeometryDraft {
    s: f64,
    x: f64,
    y: f64,
    hdg: f64,
    length: f64,
    kind: Option<GeometryKind>,
}

#[derive(Debug)]
struct SectionDraft {
    s: f64,
    left: Vec<Lane>,
    center: Option<Lane>,
    right: Vec<Lane>,
}

#[derive(Debug)]
struct LaneDraft {
    side: Side,
    lane: Lane,
    widths: Vec<ProfileRecord>,
}

#[derive(Debug, Default)]
struct DocumentBuilder {
    stack: Vec<String>,
    header: Header,
    roads: Vec<Road>,
    road: Option<RoadDraft>,
    geometry: Option<GeometryDraft>,
    section: Option<SectionDraft>,
    lane: Option<LaneDraft>,
}

impl DocumentBuilder {
    fn open(&mut self, name: &str, attrs: &Attributes) -> ParseResult<()> {
        let parent = self.stack.last().cloned();

        match (parent.as_deref(), name) {
            (Some("OpenDRIVE"), "header") => {
                self.header = Header {
                    name: attrs.get("name").map(str::to_string),
                    rev_major: attrs.number(name, "revMajor")?.unwrap_or(1),
                    rev_minor: attrs.number(name, "revMinor")?.unwrap_or(0),
                };
            }
            (Some("OpenDRIVE"), "road") => {
                let mut road = Road::new(attrs.string(name, "id")?, attrs.f64(name, "length")?);
                road.name = attrs.get("name").map(str::to_string);
                road.junction = attrs
                    .get("junction")
                    .filter(|id| *id != "-1")
                    .map(str::to_string);
                self.road = Some(RoadDraft {
                    road,
                    lane_offset: Vec::new(),
                    elevation: Vec::new(),
                    superelevation: Vec::new(),
                    shape: Vec::new(),
                });
            }
            (Some("planView"), "geometry") if self.road.is_some() => {
                self.geometry = Some(GeometryDraft {
                    s: attrs.f64(name, "s")?,
                    x: attrs.f64(name, "x")?,
                    y: attrs.f64(name, "y")?,
                    hdg: attrs.f64(name, "hdg")?,
                    length: attrs.f64(name, "length")?,
                    kind: None,
                });
            }
            (Some("geometry"), "line" | "arc" | "spiral" | "poly3" | "paramPoly3") => {
                if let Some(geometry) = self.geometry.as_mut() {
                    geometry.kind = Some(geometry_kind(name, attrs)?);
                }
            }
            (Some("elevationProfile"), "elevation") => {
                if let Some(road) = self.road.as_mut() {
                    road.elevation.push(attrs.profile_record(name, "s")?);
                }
            }
            (Some("lateralProfile"), "superelevation") => {
                if let Some(road) = self.road.as_mut() {
                    road.superelevation.push(attrs.profile_record(name, "s")?);
                }
            }
            (Some("lateralProfile"), "shape") => {
                if let Some(road) = self.road.as_mut() {
                    road.shape.push(ShapeRecord {
                        s: attrs.f64(name, "s")?,
                        t: attrs.f64(name, "t")?,
                        poly: attrs.cubic(name, "")?,
                    });
                }
            }
            (Some("lanes"), "laneOffset") => {
                if let Some(road) = self.road.as_mut() {
                    road.lane_offset.push(attrs.profile_record(name, "s")?);
                }
            }
            (Some("lanes"), "laneSection") if self.road.is_some() => {
                self.section = Some(SectionDraft {
                    s: attrs.f64(name, "s")?,
                    left: Vec::new(),
                    center: None,
                    right: Vec::new(),
                });
            }
            (Some(side @ ("left" | "center" | "right")), "lane") if self.section.is_some() => {
                let side = match side {
                    "left" => Side::Left,
                    "center" => Side::Center,
                    _ => Side::Right,
                };
                let id = attrs
                    .number::<i32>(name, "id")?
                    .ok_or_else(|| format!("<{}> is missing required attribute 'id'", name))?;
                let lane_type = attrs.get("type").unwrap_or("none");
                self.lane = Some(LaneDraft {
                    side,
                    lane: Lane::new(id, lane_type, Profile::default()),
                    widths: Vec::new(),
                });
            }
            (Some("lane"), "width") => {
                if let Some(lane) = self.lane.as_mut() {
                    lane.widths.push(attrs.profile_record(name, "sOffset")?);
                }
            }
            (Some("lane"), "roadMark") => {
                if let Some(lane) = self.lane.as_mut() {
                    lane.lane.road_marks.push(RoadMark {
                        s_offset: attrs.f64(name, "sOffset")?,
                        mark_type: attrs.get("type").unwrap_or("none").to_string(),
                        width: attrs.f64_or(name, "width", RoadMark::DEFAULT_WIDTH)?,
                    });
                }
            }
            _ => {}
        }

        self.stack.push(name.to_string());
        Ok(())
    }

    fn close(&mut self, name: &str) -> ParseResult<()> {
        match self.stack.pop() {
            Some(open) if open == name => {}
            Some(open) => return Err(format!("</{}> closes <{}>", name, open)),
            None => return Err(format!("unexpected </{}>", name)),
        }

        match name {
            "geometry" => {
                if let Some(draft) = self.geometry.take() {
                    let kind = draft.kind.ok_or_else(|| {
                        format!("<geometry> at s={} has no shape element", draft.s)
                    })?;
                    if let Some(road) = self.road.as_mut() {
                        road.road.plan_view.push(GeometryPrimitive {
                            s: draft.s,
                            x: draft.x,
                            y: draft.y,
                            hdg: draft.hdg,
                            length: draft.length,
                            kind,
                        });
                    }
                }
            }
            "lane" => {
                if let (Some(draft), Some(section)) = (self.lane.take(), self.section.as_mut()) {
                    let mut lane = draft.lane;
                    lane.width = Profile::new(draft.widths);
                    lane.road_marks
                        .sort_by(|a, b| a.s_offset.total_cmp(&b.s_offset));
                    match draft.side {
                        Side::Left => section.left.push(lane),
                        Side::Center => section.center = Some(lane),
                        Side::Right => section.right.push(lane),
                    }
                }
            }
            "laneSection" => {
                if let (Some(draft), Some(road)) = (self.section.take(), self.road.as_mut()) {
                    road.road.lane_sections.push(LaneSection::new(
                        draft.s,
                        draft.left,
                        draft.center,
                        draft.right,
                    ));
                }
            }
            "road" => {
                if let Some(draft) = self.road.take() {
                    let road = draft.finish();
                    debug!(
                        "Parsed road {} (length {}, {} geometries, {} lane sections)",
                        road.id,
                        road.length,
                        road.plan_view.len(),
                        road.lane_sections.len()
                    );
                    self.roads.push(road);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn finish(self) -> ParseResult<RoadNetwork> {
        if let Some(open) = self.stack.last() {
            return Err(format!("unexpected end of document inside <{}>", open));
        }
        Ok(RoadNetwork {
            header: self.header,
            roads: self.roads,
        })
    }
}

fn geometry_kind(name: &str, attrs: &Attributes) -> ParseResult<GeometryKind> {
    Ok(match name {
        "line" => GeometryKind::Line,
        "arc" => GeometryKind::Arc {
            curvature: attrs.f64(name, "curvature")?,
        },
        "spiral" => GeometryKind::Spiral {
            curv_start: attrs.f64(name, "curvStart")?,
            curv_end: attrs.f64(name, "curvEnd")?,
        },
        "poly3" => GeometryKind::Poly3(attrs.cubic(name, "")?),
        _ => GeometryKind::ParamPoly3 {
            u: attrs.cubic(name, "U")?,
            v: attrs.cubic(name, "V")?,
            p_range: match attrs.get("pRange") {
                None | Some("arcLength") => ParamRange::ArcLength,
                Some("normalized") => ParamRange::Normalized,
                Some(other) => {
                    return Err(format!("<{}> has unknown pRange '{}'", name, other));
                }
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" standalone="yes"?>
<OpenDRIVE>
  <header revMajor="1" revMinor="6" name="sample" north="0" south="0" east="0" west="0"/>
  <road name="Main" length="50.0" id="1" junction="-1">
    <link><successor elementType="junction" elementId="9"/></link>
    <planView>
      <geometry s="0.0" x="0.0" y="0.0" hdg="0.0" length="20.0"><line/></geometry>
      <geometry s="20.0" x="20.0" y="0.0" hdg="0.0" length="30.0">
        <arc curvature="0.01"/>
      </geometry>
    </planView>
    <elevationProfile>
      <elevation s="0.0" a="1.5" b="0.01" c="0" d="0"/>
    </elevationProfile>
    <lateralProfile>
      <superelevation s="0.0" a="0.02" b="0" c="0" d="0"/>
      <shape s="0.0" t="-3.5" a="0" b="0.01" c="0" d="0"/>
    </lateralProfile>
    <lanes>
      <laneOffset s="0.0" a="0.25" b="0" c="0" d="0"/>
      <laneSection s="30.0">
        <right>
          <lane id="-1" type="driving" level="false">
            <width sOffset="0.0" a="3.0" b="0" c="0" d="0"/>
          </lane>
        </right>
      </laneSection>
      <laneSection s="0.0">
        <left>
          <lane id="2" type="sidewalk"><width sOffset="0.0" a="2.0" b="0" c="0" d="0"/></lane>
          <lane id="1" type="driving">
            <link><predecessor id="1"/></link>
            <width sOffset="0.0" a="3.5" b="0" c="0" d="0"/>
            <roadMark sOffset="10.0" type="broken" weight="standard" color="standard" width="0.15"/>
            <roadMark sOffset="0.0" type="solid"/>
          </lane>
        </left>
        <center>
          <lane id="0" type="none"><roadMark sOffset="0.0" type="solid solid" width="0.3"/></lane>
        </center>
        <right>
          <lane id="-1" type="driving">
            <width sOffset="0.0" a="3.5" b="0" c="0" d="0"/>
            <width sOffset="15.0" a="3.5" b="0.1" c="0" d="0"/>
          </lane>
        </right>
      </laneSection>
    </lanes>
    <objects><object id="5" s="3" t="2" width="4"/></objects>
  </road>
  <road name="" length="30.0" id="2" junction="9">
    <planView>
      <geometry s="0.0" x="0.0" y="10.0" hdg="1.0" length="10.0">
        <spiral curvStart="0.0" curvEnd="0.02"/>
      </geometry>
      <geometry s="10.0" x="1.0" y="11.0" hdg="1.1" length="10.0">
        <poly3 a="0" b="0" c="0.001" d="0"/>
      </geometry>
      <geometry s="20.0" x="2.0" y="12.0" hdg="1.2" length="10.0">
        <paramPoly3 aU="0" bU="10" cU="0" dU="0" aV="0" bV="0" cV="1" dV="0" pRange="normalized"/>
      </geometry>
    </planView>
  </road>
  <junction id="9" name="">
    <connection id="0" incomingRoad="1" connectingRoad="2" contactPoint="start">
      <laneLink from="-1" to="-1"/>
    </connection>
  </junction>
</OpenDRIVE>
"#;

    #[test]
    fn test_parse_sample_document() {
        let network = parse_xodr_str(SAMPLE).unwrap();
        assert_eq!(network.header.name.as_deref(), Some("sample"));
        assert_eq!((network.header.rev_major, network.header.rev_minor), (1, 6));
        assert_eq!(network.roads.len(), 2);

        let road = &network.roads[0];
        assert_eq!(road.id, "1");
        assert_eq!(road.name.as_deref(), Some("Main"));
        assert_eq!(road.junction, None);
        assert_eq!(road.length, 50.0);
        assert_eq!(road.plan_view.len(), 2);
        assert_eq!(road.plan_view[0].kind, GeometryKind::Line);
        assert_eq!(road.plan_view[1].kind, GeometryKind::Arc { curvature: 0.01 });
        assert_eq!(road.plan_view[1].s, 20.0);

        assert!((road.elevation.value(10.0) - 1.6).abs() < 1e-12);
        assert_eq!(road.superelevation.value(5.0), 0.02);
        assert!((road.shape.height(0.0, -1.5) - 0.02).abs() < 1e-12);
        assert_eq!(road.lane_offset.value(0.0), 0.25);

        assert_eq!(network.roads[1].junction.as_deref(), Some("9"));
    }

    #[test]
    fn test_parse_lane_sections() {
        let network = parse_xodr_str(SAMPLE).unwrap();
        let road = &network.roads[0];

        // sorted by start station
        let starts: Vec<f64> = road.lane_sections.iter().map(|s| s.s).collect();
        assert_eq!(starts, vec![0.0, 30.0]);

        let section = &road.lane_sections[0];
        assert!(section.validate(0).is_ok());
        let left: Vec<(i32, &str)> = section
            .left
            .iter()
            .map(|l| (l.id, l.lane_type.as_str()))
            .collect();
        assert_eq!(left, vec![(1, "driving"), (2, "sidewalk")]);

        let right = section.lane(-1).unwrap();
        assert_eq!(right.width_at(10.0), 3.5);
        assert!((right.width_at(20.0) - 4.0).abs() < 1e-12);

        let lane1 = section.lane(1).unwrap();
        let marks: Vec<(f64, &str, f64)> = lane1
            .road_marks
            .iter()
            .map(|m| (m.s_offset, m.mark_type.as_str(), m.width))
            .collect();
        assert_eq!(
            marks,
            vec![
                (0.0, "solid", RoadMark::DEFAULT_WIDTH),
                (10.0, "broken", 0.15)
            ]
        );

        let center = section.center.as_ref().unwrap();
        assert_eq!(center.id, 0);
        assert_eq!(center.road_marks[0].width, 0.3);

        assert!(road.lane_sections[1].left.is_empty());
        assert!(road.lane_sections[1].center.is_none());
    }

    #[test]
    fn test_parse_curve_primitives() {
        let network = parse_xodr_str(SAMPLE).unwrap();
        let plan_view = &network.roads[1].plan_view;

        assert_eq!(
            plan_view[0].kind,
            GeometryKind::Spiral {
                curv_start: 0.0,
                curv_end: 0.02
            }
        );
        assert_eq!(
            plan_view[1].kind,
            GeometryKind::Poly3(CubicPoly::new(0.0, 0.0, 0.001, 0.0))
        );
        assert_eq!(
            plan_view[2].kind,
            GeometryKind::ParamPoly3 {
                u: CubicPoly::new(0.0, 10.0, 0.0, 0.0),
                v: CubicPoly::new(0.0, 0.0, 1.0, 0.0),
                p_range: ParamRange::Normalized,
            }
        );
        assert_eq!(plan_view[2].hdg, 1.2);
    }

    #[test]
    fn test_empty_document_has_no_roads() {
        let network = parse_xodr_str("<OpenDRIVE><header/></OpenDRIVE>").unwrap();
        assert!(network.roads.is_empty());
    }

    #[test]
    fn test_malformed_xml_is_a_parse_error() {
        let err = parse_xodr_str("<OpenDRIVE><road id=\"1\" length=\"5\"></OpenDRIVE>").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{:?}", err);
    }

    #[test]
    fn test_truncated_document_is_a_parse_error() {
        let err = parse_xodr_str("<OpenDRIVE><road id=\"1\" length=\"5\">").unwrap_err();
        match err {
            Error::Parse { message, .. } => assert!(message.contains("<road>"), "{}", message),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_number_names_the_attribute() {
        let xml = r#"<OpenDRIVE><road id="1" length="ten"/></OpenDRIVE>"#;
        match parse_xodr_str(xml).unwrap_err() {
            Error::Parse { message, .. } => {
                assert!(message.contains("'length'"), "{}", message);
                assert!(message.contains("ten"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_numbers_are_rejected() {
        let section = r#"<OpenDRIVE><road id="1" length="20"><lanes>
            <laneSection s="0"><right><lane id="-1" type="driving"/></right></laneSection>
            <laneSection s="NaN"><right><lane id="-1" type="driving"/></right></laneSection>
        </lanes></road></OpenDRIVE>"#;
        match parse_xodr_str(section).unwrap_err() {
            Error::Parse { message, .. } => {
                assert!(message.contains("<laneSection>"), "{}", message);
                assert!(message.contains("'s'"), "{}", message);
                assert!(message.contains("finite"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let length = r#"<OpenDRIVE><road id="1" length="inf"/></OpenDRIVE>"#;
        match parse_xodr_str(length).unwrap_err() {
            Error::Parse { message, .. } => assert!(message.contains("'length'"), "{}", message),
            other => panic!("unexpected error: {:?}", other),
        }

        let width = r#"<OpenDRIVE><road id="1" length="20"><lanes><laneSection s="0"><right>
            <lane id="-1" type="driving"><width sOffset="0" a="3" b="-inf"/></lane>
        </right></laneSection></lanes></road></OpenDRIVE>"#;
        assert!(matches!(parse_xodr_str(width), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_geometry_without_shape_is_rejected() {
        let xml = r#"<OpenDRIVE><road id="1" length="5"><planView>
            <geometry s="0" x="0" y="0" hdg="0" length="5"></geometry>
        </planView></road></OpenDRIVE>"#;
        match parse_xodr_str(xml).unwrap_err() {
            Error::Parse { message, .. } => assert!(message.contains("no shape element"), "{}", message),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_attribute() {
        let xml = r#"<OpenDRIVE><road length="5"/></OpenDRIVE>"#;
        match parse_xodr_str(xml).unwrap_err() {
            Error::Parse { message, .. } => assert!(message.contains("'id'"), "{}", message),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.xodr");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(parse_xodr_file(&path).unwrap().roads.len(), 2);

        let missing = dir.path().join("missing.xodr");
        assert!(matches!(parse_xodr_file(&missing), Err(Error::Io(_))));
    }
}
