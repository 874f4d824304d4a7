use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tetrobot_agent::HeuristicWeights;

use crate::util;

/// Trained weights as saved by `train` and loaded by `--model`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeightModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub final_fitness: f32,
    pub weights: HeuristicWeights,
}

impl WeightModel {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("weight model", path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    #[test]
    fn test_model_json_layout() {
        let model = WeightModel {
            name: "baseline".to_owned(),
            trained_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            final_fitness: 1234.5,
            weights: HeuristicWeights::new(-1.0, -2.0, -3.0, 4.0),
        };
        let json: serde_json::Value = serde_json::to_value(&model).unwrap();
        assert_eq!(json["name"], "baseline");
        assert_eq!(json["trained_at"], "2025-01-02T03:04:05Z");
        assert_eq!(json["final_fitness"], 1234.5);
        assert_eq!(json["weights"]["holes"], -3.0);

        let restored: WeightModel = serde_json::from_value(json).unwrap();
        assert_eq!(restored, model);
    }

    #[test]
    fn test_open_reports_missing_file() {
        let err = WeightModel::open("/nonexistent/model.json").unwrap_err();
        assert!(err.to_string().contains("weight model"), "{err}");
    }
}
