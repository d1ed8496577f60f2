//! In-memory buffer of metric sets and the JSON document that hands them to
//! the infrastructure agent.

use std::collections::BTreeMap;
use std::io::Write;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{CollectorError, Result};

pub const INTEGRATION_NAME: &str = "com.newrelic.nri-apigee";
pub const INTEGRATION_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PROTOCOL_VERSION: &str = "3";

pub const EVENT_TYPE_KEY: &str = "event_type";

/// One entry of a metric set; attributes and gauges share a single namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricEntry {
    Attribute(String),
    Gauge(f64),
}

/// Attributes and gauges belonging to one sample. Setting a name that is
/// already present replaces the earlier entry, whatever its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSet {
    event_type: String,
    entries: BTreeMap<String, MetricEntry>,
}

impl MetricSet {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set(name.into(), MetricEntry::Attribute(value.into()));
    }

    pub fn set_gauge(&mut self, name: impl Into<String>, value: f64) {
        self.set(name.into(), MetricEntry::Gauge(value));
    }

    fn set(&mut self, name: String, entry: MetricEntry) {
        if name == EVENT_TYPE_KEY {
            warn!("Ignoring {:?} for reserved key {}", entry, EVENT_TYPE_KEY);
            return;
        }
        self.entries.insert(name, entry);
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self.entries.get(name) {
            Some(MetricEntry::Attribute(value)) => Some(value),
            _ => None,
        }
    }

    pub fn gauge(&self, name: &str) -> Option<f64> {
        match self.entries.get(name) {
            Some(MetricEntry::Gauge(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn gauge_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, MetricEntry::Gauge(_)))
            .count()
    }
}

impl Serialize for MetricSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.entries.len()))?;
        map.serialize_entry(EVENT_TYPE_KEY, &self.event_type)?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    name: &'a str,
    protocol_version: &'a str,
    integration_version: &'a str,
    data: [EntityData<'a>; 1],
}

#[derive(Serialize)]
struct EntityData<'a> {
    metrics: &'a [MetricSet],
    inventory: BTreeMap<String, serde_json::Value>,
    events: Vec<serde_json::Value>,
}

/// Accumulates metric sets for the local entity until the run publishes them.
#[derive(Debug, Clone)]
pub struct Integration {
    name: String,
    version: String,
    metric_sets: Vec<MetricSet>,
}

impl Default for Integration {
    fn default() -> Self {
        Self::new(INTEGRATION_NAME, INTEGRATION_VERSION)
    }
}

impl Integration {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            metric_sets: Vec::new(),
        }
    }

    /// Appends a fresh metric set and returns it for population.
    pub fn new_metric_set(&mut self, event_type: &str) -> &mut MetricSet {
        self.metric_sets.push(MetricSet::new(event_type));
        let last = self.metric_sets.len() - 1;
        &mut self.metric_sets[last]
    }

    pub fn metric_sets(&self) -> &[MetricSet] {
        &self.metric_sets
    }

    pub fn to_json(&self, pretty: bool) -> Result<Vec<u8>> {
        let payload = Payload {
            name: &self.name,
            protocol_version: PROTOCOL_VERSION,
            integration_version: &self.version,
            data: [EntityData {
                metrics: &self.metric_sets,
                inventory: BTreeMap::new(),
                events: Vec::new(),
            }],
        };

        let encoded = if pretty {
            serde_json::to_vec_pretty(&payload)
        } else {
            serde_json::to_vec(&payload)
        };
        encoded.map_err(|e| CollectorError::Publish(format!("Failed to encode payload: {}", e)))
    }

    /// Writes every buffered metric set as one JSON document followed by a
    /// newline, then flushes the writer.
    pub fn publish<W: Write>(&self, mut writer: W, pretty: bool) -> Result<()> {
        let body = self.to_json(pretty)?;
        debug!("Publishing {} metric sets", self.metric_sets.len());

        writer.write_all(&body)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
