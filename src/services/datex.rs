//! Streaming decoder for the roads feed's DATEX XML.
//!
//! Each `sitRoadOrCarriagewayOrLaneManagement` element becomes one
//! [`ClosureRecord`]. Text is assigned to the nearest enclosing element that
//! names a known field; namespace prefixes are ignored. Records on roads
//! other than the tracked ones are dropped as soon as their road is known.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::Result;
use crate::models::{BridgeId, ClosureRecord};

/// Element wrapping one closure situation record.
pub const RECORD_ELEMENT: &str = "sitRoadOrCarriagewayOrLaneManagement";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Road,
    Location,
    Comment,
    Validity,
    Start,
    End,
    Cause,
    Probability,
    Coordinates,
    Direction,
}

impl Field {
    fn from_element(name: &str) -> Option<Self> {
        let field = match name {
            "roadName" => Field::Road,
            "locationDescription" => Field::Location,
            "comment" => Field::Comment,
            "validityStatus" => Field::Validity,
            "overallStartTime" => Field::Start,
            "overallEndTime" => Field::End,
            "causeType" => Field::Cause,
            "probabilityOfOccurrence" => Field::Probability,
            "posList" => Field::Coordinates,
            "directionOnLinearSection" => Field::Direction,
            _ => return None,
        };
        Some(field)
    }
}

/// Record under construction.
#[derive(Debug, Default)]
struct PartialRecord {
    record: ClosureRecord,
    untracked: bool,
}

impl PartialRecord {
    /// Set a field if it has no value yet.
    fn assign(&mut self, field: Field, text: &str) {
        if self.untracked || text.is_empty() {
            return;
        }

        let r = &mut self.record;
        let slot = match field {
            Field::Road => &mut r.road,
            Field::Location => &mut r.location,
            Field::Comment => &mut r.description,
            Field::Validity => &mut r.validity,
            Field::Cause => &mut r.cause,
            Field::Probability => &mut r.probability,
            Field::Coordinates => &mut r.coordinates,
            Field::Direction => &mut r.direction,
            Field::Start => {
                r.start.get_or_insert_with(|| text.to_string());
                return;
            }
            Field::End => {
                r.end.get_or_insert_with(|| text.to_string());
                return;
            }
        };

        if slot.is_empty() {
            *slot = text.to_string();
            if field == Field::Road && BridgeId::from_road(slot.as_str()).is_none() {
                self.untracked = true;
            }
        }
    }
}

/// Decode a DATEX payload into records on tracked roads.
pub fn decode_xml(xml: &str) -> Result<Vec<ClosureRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<(usize, PartialRecord)> = None;
    let mut records = Vec::new();
    let mut skipped = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == RECORD_ELEMENT && current.is_none() {
                    current = Some((stack.len(), PartialRecord::default()));
                }
                stack.push(name);
            }
            Event::End(_) => {
                stack.pop();
                if current.as_ref().is_some_and(|(depth, _)| *depth == stack.len()) {
                    if let Some((_, partial)) = current.take() {
                        if partial.untracked {
                            skipped += 1;
                        } else {
                            records.push(partial.record);
                        }
                    }
                }
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(quick_xml::Error::from)?;
                assign_text(&stack, current.as_mut(), text.trim());
            }
            Event::CData(c) => {
                let bytes = c.into_inner();
                let text = String::from_utf8_lossy(&bytes);
                assign_text(&stack, current.as_mut(), text.trim());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    log::debug!(
        "Decoded {} closure record(s), skipped {} on untracked roads",
        records.len(),
        skipped
    );
    Ok(records)
}

fn assign_text(stack: &[String], current: Option<&mut (usize, PartialRecord)>, text: &str) {
    let Some((depth, partial)) = current else {
        return;
    };

    // Nearest enclosing known field inside the record element
    let field = stack[*depth..]
        .iter()
        .rev()
        .find_map(|name| Field::from_element(name));

    if let Some(field) = field {
        partial.assign(field, text);
    }
}

/// Decode either a DATEX XML payload or a JSON array of records.
pub fn decode_payload(payload: &str) -> Result<Vec<ClosureRecord>> {
    let trimmed = payload.trim_start();
    if trimmed.starts_with('[') {
        let records: Vec<ClosureRecord> = serde_json::from_str(trimmed)?;
        Ok(records)
    } else {
        decode_xml(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<d2:d2LogicalModel xmlns:d2="http://datex2.eu/schema/3/d2Payload" xmlns:sit="http://datex2.eu/schema/3/situation">
  <d2:payloadPublication>
    <sit:situation>
      <sit:situationRecord>
        <sit:sitRoadOrCarriagewayOrLaneManagement>
          <sit:validity>
            <com:validityStatus>planned</com:validityStatus>
            <com:validityTimeSpecification>
              <com:overallStartTime>2026-03-01T20:00:00+00:00</com:overallStartTime>
              <com:overallEndTime>2026-03-02T06:00:00+00:00</com:overallEndTime>
            </com:validityTimeSpecification>
          </sit:validity>
          <sit:probabilityOfOccurrence>certain</sit:probabilityOfOccurrence>
          <sit:cause><sit:causeType>roadMaintenance</sit:causeType></sit:cause>
          <sit:generalPublicComment>
            <sit:comment><com:values><com:value lang="en">Carriageway closure 201/5-196/0</com:value></com:values></sit:comment>
          </sit:generalPublicComment>
          <loc:locationReference>
            <loc:roadName><com:values><com:value>M48</com:value></com:values></loc:roadName>
            <loc:locationDescription>M48 eastbound J2 to J1</loc:locationDescription>
            <loc:directionOnLinearSection>eastBound</loc:directionOnLinearSection>
            <loc:posList>51.61 -2.64 51.62 -2.65</loc:posList>
          </loc:locationReference>
        </sit:sitRoadOrCarriagewayOrLaneManagement>
      </sit:situationRecord>
      <sit:situationRecord>
        <sit:sitRoadOrCarriagewayOrLaneManagement>
          <com:validityStatus>active</com:validityStatus>
          <loc:roadName>M5</loc:roadName>
          <loc:locationDescription>M5 J21 near the Severn</loc:locationDescription>
        </sit:sitRoadOrCarriagewayOrLaneManagement>
      </sit:situationRecord>
      <sit:situationRecord>
        <sit:sitRoadOrCarriagewayOrLaneManagement>
          <com:validityStatus>active</com:validityStatus>
          <loc:roadName>M4</loc:roadName>
          <loc:locationDescription>M4 westbound J23 &amp; J24</loc:locationDescription>
          <sit:comment><![CDATA[Lane closure]]></sit:comment>
          <sit:comment>second comment ignored</sit:comment>
        </sit:sitRoadOrCarriagewayOrLaneManagement>
      </sit:situationRecord>
    </sit:situation>
  </d2:payloadPublication>
</d2:d2LogicalModel>"#;

    #[test]
    fn test_decode_nested_and_namespaced_fields() {
        let records = decode_xml(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);

        let m48 = &records[0];
        assert_eq!(m48.road, "M48");
        assert_eq!(m48.location, "M48 eastbound J2 to J1");
        assert_eq!(m48.description, "Carriageway closure 201/5-196/0");
        assert_eq!(m48.validity, "planned");
        assert_eq!(m48.start.as_deref(), Some("2026-03-01T20:00:00+00:00"));
        assert_eq!(m48.end.as_deref(), Some("2026-03-02T06:00:00+00:00"));
        assert_eq!(m48.cause, "roadMaintenance");
        assert_eq!(m48.probability, "certain");
        assert_eq!(m48.coordinates, "51.61 -2.64 51.62 -2.65");
        assert_eq!(m48.direction, "eastBound");
    }

    #[test]
    fn test_untracked_roads_are_skipped() {
        let records = decode_xml(SAMPLE).unwrap();
        assert!(records.iter().all(|r| r.road != "M5"));
    }

    #[test]
    fn test_entities_cdata_and_first_value_wins() {
        let records = decode_xml(SAMPLE).unwrap();
        let m4 = &records[1];
        assert_eq!(m4.road, "M4");
        assert_eq!(m4.location, "M4 westbound J23 & J24");
        assert_eq!(m4.description, "Lane closure");
        assert_eq!(m4.start, None);
        assert_eq!(m4.direction, "");
    }

    #[test]
    fn test_text_outside_records_is_ignored() {
        let xml = "<root><roadName>M4</roadName><comment>stray</comment></root>";
        assert!(decode_xml(xml).unwrap().is_empty());
    }

    #[test]
    fn test_record_without_road_is_kept() {
        let xml = "<root><sitRoadOrCarriagewayOrLaneManagement>\
                   <locationDescription>M48 J1</locationDescription>\
                   </sitRoadOrCarriagewayOrLaneManagement></root>";
        let records = decode_xml(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].road, "");
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(decode_xml("<a><b></a>").is_err());
    }

    #[test]
    fn test_decode_payload_json() {
        let json = r#"[{"road": "M4", "location": "M4 J23", "validity": "active"}]"#;
        let records = decode_payload(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].road, "M4");
        assert_eq!(records[0].description, "");
        assert_eq!(records[0].start, None);
    }

    #[test]
    fn test_decode_payload_xml() {
        assert_eq!(decode_payload(SAMPLE).unwrap().len(), 2);
    }
}
