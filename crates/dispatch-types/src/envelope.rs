//! The event envelope exchanged between producers, the relay and dashboards.
//!
//! An envelope is a snapshot of one entity's current reported state. It
//! has no identity or sequence number: each arrival simply replaces the
//! previous snapshot for its discriminant.
//!
//! # Wire format
//!
//! ```json
//! {"type": "fire", "name": "Station 7", "address": "12 Elm St",
//!  "distance": "1.20 miles", "contact": "555-0100", "lat": 40.1, "lon": -74.2}
//! {"type": "user", "name": "Ann", "location": "Main & 3rd", "phone": "555-0199",
//!  "age": 34, "injuryStatus": "conscious", "lat": 40.0, "lon": -74.0,
//!  "transcript": "..."}
//! ```
//!
//! Fields outside the modelled set are kept in `extra` and written back
//! out unchanged, so producers can add fields without a relay upgrade.
//!
//! Decoding never rejects structurally valid JSON. Anything without a
//! recognised `type` becomes [`Envelope::Unknown`] carrying the raw value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::geo::Coordinate;
use crate::kind::ResponderKind;
use crate::lenient;

/// Wire tag of the caller envelope.
pub const USER_TAG: &str = "user";

/// Reported state of a dispatched responder (hospital, police, paramedic
/// or fire).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct ResponderInfo {
    /// Facility or unit name.
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub name: Option<String>,
    /// Street address of the facility.
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub address: Option<String>,
    /// Display distance to the caller (e.g. `"1.20 miles"`).
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub distance: Option<String>,
    /// Contact phone number.
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub contact: Option<String>,
    /// Latitude in degrees.
    #[serde(deserialize_with = "lenient::coordinate", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub lat: Option<f64>,
    /// Longitude in degrees.
    #[serde(deserialize_with = "lenient::coordinate", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub lon: Option<f64>,
    /// Producer fields this type does not model, relayed untouched.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Map<String, Value>,
}

impl ResponderInfo {
    /// Reported position, if both components are present.
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.lat?, self.lon?))
    }
}

/// Reported state of the caller who requested help.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct CallerInfo {
    /// Caller name.
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub name: Option<String>,
    /// Free-text location as spoken by the caller.
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub location: Option<String>,
    /// Callback phone number.
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub phone: Option<String>,
    /// Age in years.
    #[serde(deserialize_with = "lenient::whole_number", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub age: Option<u32>,
    /// Reported injury status.
    #[serde(rename = "injuryStatus")]
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub injury_status: Option<String>,
    /// Latitude in degrees.
    #[serde(deserialize_with = "lenient::coordinate", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub lat: Option<f64>,
    /// Longitude in degrees.
    #[serde(deserialize_with = "lenient::coordinate", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub lon: Option<f64>,
    /// Call transcript.
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub transcript: Option<String>,
    /// Producer fields this type does not model, relayed untouched.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Map<String, Value>,
}

impl CallerInfo {
    /// Reported position, if both components are present.
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.lat?, self.lon?))
    }
}

/// A single dispatch event, decoded by its `type` discriminant.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// A responder snapshot for one of the four service kinds.
    Responder {
        /// Which service this snapshot describes.
        kind: ResponderKind,
        /// The reported fields.
        info: ResponderInfo,
    },
    /// The caller snapshot.
    User(CallerInfo),
    /// Valid JSON without a recognised discriminant, kept verbatim.
    Unknown(Value),
}

impl Envelope {
    /// Parse an envelope from JSON text.
    ///
    /// Only a structural JSON syntax error fails; every valid document
    /// yields an envelope.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] if `raw` is not valid JSON.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::from_value(value))
    }

    /// Classify an already-parsed JSON value.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = &value else {
            return Self::Unknown(value);
        };
        let Some(tag) = map.get("type").and_then(Value::as_str) else {
            return Self::Unknown(value);
        };

        let mut fields = map.clone();
        fields.remove("type");
        let fields = Value::Object(fields);

        if tag == USER_TAG {
            return serde_json::from_value(fields).map_or(Self::Unknown(value), Self::User);
        }
        match ResponderKind::from_tag(tag) {
            Some(kind) => serde_json::from_value(fields)
                .map_or(Self::Unknown(value), |info| Self::Responder { kind, info }),
            None => Self::Unknown(value),
        }
    }

    /// The discriminant as it appears on the wire, or `"unknown"`.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Responder { kind, .. } => kind.tag(),
            Self::User(_) => USER_TAG,
            Self::Unknown(_) => "unknown",
        }
    }

    /// Reported position of the entity, if the envelope carries one.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Responder { info, .. } => info.coordinate(),
            Self::User(info) => info.coordinate(),
            Self::Unknown(_) => None,
        }
    }
}

/// Serialization helper that writes the discriminant next to the fields.
#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "type")]
    tag: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Responder { kind, info } => Tagged {
                tag: kind.tag(),
                body: info,
            }
            .serialize(serializer),
            Self::User(info) => Tagged {
                tag: USER_TAG,
                body: info,
            }
            .serialize(serializer),
            Self::Unknown(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}
