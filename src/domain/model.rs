use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One pollen type and its count. `0` also stands in for "not reported".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub value: i64,
}

/// One region's forecast as it appears on the upstream page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRecord {
    #[serde(rename = "city_name")]
    pub location_name: String,
    #[serde(rename = "forecast_text")]
    pub summary_text: String,
    #[serde(rename = "values")]
    pub measurements: Vec<Measurement>,
}

/// The complete result of one successful rebuild.
///
/// Fields are private so a published snapshot cannot be edited in place;
/// the cache hands out `Arc<Snapshot>` to every reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<ForecastRecord>,
    captured_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(records: Vec<ForecastRecord>) -> Self {
        Self::with_timestamp(records, Utc::now())
    }

    pub fn with_timestamp(records: Vec<ForecastRecord>, captured_at: DateTime<Utc>) -> Self {
        Self {
            records,
            captured_at,
        }
    }

    pub fn records(&self) -> &[ForecastRecord] {
        &self.records
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What the periodic refresh does when a rebuild fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log the error and wait for the next tick.
    #[default]
    LogAndContinue,
    /// Stop the scheduler, which shuts the service down.
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aarhus() -> ForecastRecord {
        ForecastRecord {
            location_name: "Aarhus".to_string(),
            summary_text: "Moderate levels".to_string(),
            measurements: vec![
                Measurement {
                    name: "Birk".to_string(),
                    value: 12,
                },
                Measurement {
                    name: "El".to_string(),
                    value: 0,
                },
            ],
        }
    }

    #[test]
    fn test_record_uses_wire_field_names() {
        let json = serde_json::to_value(aarhus()).unwrap();

        assert_eq!(json["city_name"], "Aarhus");
        assert_eq!(json["forecast_text"], "Moderate levels");
        assert_eq!(json["values"][0]["name"], "Birk");
        assert_eq!(json["values"][0]["value"], 12);
        assert_eq!(json["values"][1]["value"], 0);
        assert!(json.get("location_name").is_none());
    }

    #[test]
    fn test_records_survive_wire_encoding() {
        let records = vec![
            aarhus(),
            ForecastRecord {
                location_name: "København".to_string(),
                summary_text: String::new(),
                measurements: vec![],
            },
        ];

        let encoded = serde_json::to_string(&records).unwrap();
        let decoded: Vec<ForecastRecord> = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, records);
    }

    #[test]
    fn test_failure_policy_names() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::LogAndContinue);
        let parsed: FailurePolicy = serde_json::from_str("\"exit\"").unwrap();
        assert_eq!(parsed, FailurePolicy::Exit);
        let parsed: FailurePolicy = serde_json::from_str("\"log-and-continue\"").unwrap();
        assert_eq!(parsed, FailurePolicy::LogAndContinue);
    }
}
