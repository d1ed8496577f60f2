use serde::{Deserialize, Serialize};

/// Stats response body: environments, their dimensions, and the measures
/// requested for each dimension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub environments: Vec<EnvironmentNode>,
    #[serde(rename = "metaData", default)]
    pub metadata: MetaData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentNode {
    pub name: String,
    #[serde(default)]
    pub dimensions: Vec<DimensionNode>,
}

/// One grouping of the requested dimension, typically an API proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionNode {
    pub name: String,
    #[serde(default)]
    pub metrics: Vec<MetricNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricNode {
    pub name: String,
    #[serde(default)]
    pub values: Vec<MetricValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaData {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    #[serde(default)]
    pub notices: Vec<String>,
}

/// A numeric value kept as its original text.
///
/// The remote service sends values either as JSON strings (`"42.0"`) or as
/// bare numbers; both are accepted and neither is rounded through `f64`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawValue", into = "String")]
pub struct MetricValue(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawValue> for MetricValue {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Text(text) => MetricValue(text),
            RawValue::Number(number) => MetricValue(number.to_string()),
        }
    }
}

impl From<MetricValue> for String {
    fn from(value: MetricValue) -> Self {
        value.0
    }
}

impl MetricValue {
    pub fn new(text: impl Into<String>) -> Self {
        MetricValue(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_accept_strings_and_numbers() {
        let metric: MetricNode =
            serde_json::from_str(r#"{"name": "message_count", "values": ["42", 17.5, 3]}"#).unwrap();

        let texts: Vec<&str> = metric.values.iter().map(MetricValue::as_str).collect();
        assert_eq!(texts, vec!["42", "17.5", "3"]);
        assert_eq!(metric.values[1].as_f64(), Some(17.5));
    }

    #[test]
    fn test_non_numeric_value_has_no_f64() {
        assert_eq!(MetricValue::new("n/a").as_f64(), None);
        assert_eq!(MetricValue::new("NaN").as_f64(), None);
        assert_eq!(MetricValue::new(" 12.0 ").as_f64(), Some(12.0));
    }

    #[test]
    fn test_missing_arrays_default_to_empty() {
        let response: StatsResponse =
            serde_json::from_str(r#"{"environments": [{"name": "prod"}]}"#).unwrap();

        assert_eq!(response.environments.len(), 1);
        assert!(response.environments[0].dimensions.is_empty());
        assert!(response.metadata.errors.is_empty());
    }
}
