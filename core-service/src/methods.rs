//! Method names of the bridge surface and their argument parsing.

use bridge_traits::MethodCall;
use core_health::{Category, TimeRange};
use serde_json::Value;
use std::fmt;

use crate::error::{Result, ServiceError};

/// Every method the plugin answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthMethod {
    Connect,
    Disconnect,
    RequestPermissions,
    GetPermissionStatus,
    GetTotalData,
    GetExerciseSessions,
    GetHeartRateData,
    GetHeartRate5minSeries,
    GetSleepData,
    GetStepCountSeries,
    GetNutritionData,
}

impl HealthMethod {
    pub const ALL: [HealthMethod; 11] = [
        HealthMethod::Connect,
        HealthMethod::Disconnect,
        HealthMethod::RequestPermissions,
        HealthMethod::GetPermissionStatus,
        HealthMethod::GetTotalData,
        HealthMethod::GetExerciseSessions,
        HealthMethod::GetHeartRateData,
        HealthMethod::GetHeartRate5minSeries,
        HealthMethod::GetSleepData,
        HealthMethod::GetStepCountSeries,
        HealthMethod::GetNutritionData,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HealthMethod::Connect => "connect",
            HealthMethod::Disconnect => "disconnect",
            HealthMethod::RequestPermissions => "requestPermissions",
            HealthMethod::GetPermissionStatus => "getPermissionStatus",
            HealthMethod::GetTotalData => "getTotalData",
            HealthMethod::GetExerciseSessions => "getExerciseSessions",
            HealthMethod::GetHeartRateData => "getHeartRateData",
            HealthMethod::GetHeartRate5minSeries => "getHeartRate5minSeries",
            HealthMethod::GetSleepData => "getSleepData",
            HealthMethod::GetStepCountSeries => "getStepCountSeries",
            HealthMethod::GetNutritionData => "getNutritionData",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        HealthMethod::ALL
            .into_iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| ServiceError::UnsupportedMethod(name.to_string()))
    }

    pub fn takes_range(self) -> bool {
        !matches!(
            self,
            HealthMethod::Connect
                | HealthMethod::Disconnect
                | HealthMethod::RequestPermissions
                | HealthMethod::GetPermissionStatus
        )
    }

    /// Single-category target and whether it is served as a bucketed series.
    pub fn single_category(self) -> Option<(Category, bool)> {
        match self {
            HealthMethod::GetExerciseSessions => Some((Category::Exercise, false)),
            HealthMethod::GetHeartRateData => Some((Category::HeartRate, false)),
            HealthMethod::GetHeartRate5minSeries => Some((Category::HeartRate, true)),
            HealthMethod::GetSleepData => Some((Category::Sleep, false)),
            HealthMethod::GetStepCountSeries => Some((Category::StepCount, true)),
            HealthMethod::GetNutritionData => Some((Category::Nutrition, false)),
            _ => None,
        }
    }
}

impl fmt::Display for HealthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read `start` and `end` from the call arguments.
pub fn parse_range(call: &MethodCall) -> Result<TimeRange> {
    let start = millis_argument(call, "start")?;
    let end = millis_argument(call, "end")?;
    Ok(TimeRange::new(start, end)?)
}

fn millis_argument(call: &MethodCall, name: &str) -> Result<i64> {
    let value = call
        .argument(name)
        .ok_or_else(|| ServiceError::InvalidArguments(format!("missing '{}'", name)))?;
    as_millis(value).ok_or_else(|| {
        ServiceError::InvalidArguments(format!(
            "'{}' must be epoch milliseconds, got {}",
            name, value
        ))
    })
}

// Dart and JS hosts may send integral doubles.
fn as_millis(value: &Value) -> Option<i64> {
    if let Some(v) = value.as_i64() {
        return Some(v);
    }
    let v = value.as_f64()?;
    if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_health::HealthError;
    use serde_json::json;

    #[test]
    fn test_method_names_round_trip() {
        for method in HealthMethod::ALL {
            assert_eq!(HealthMethod::from_name(method.name()).unwrap(), method);
        }
        assert!(matches!(
            HealthMethod::from_name("getWeight"),
            Err(ServiceError::UnsupportedMethod(name)) if name == "getWeight"
        ));
    }

    #[test]
    fn test_single_category_targets() {
        assert_eq!(
            HealthMethod::GetHeartRate5minSeries.single_category(),
            Some((Category::HeartRate, true))
        );
        assert_eq!(
            HealthMethod::GetHeartRateData.single_category(),
            Some((Category::HeartRate, false))
        );
        assert_eq!(HealthMethod::GetTotalData.single_category(), None);
        assert!(!HealthMethod::Connect.takes_range());
        assert!(HealthMethod::GetTotalData.takes_range());
    }

    #[test]
    fn test_parse_range_accepts_integral_floats() {
        let call = MethodCall::new("getSleepData", json!({"start": 0, "end": 600000.0}));
        let range = parse_range(&call).unwrap();
        assert_eq!((range.start(), range.end()), (0, 600_000));
    }

    #[test]
    fn test_parse_range_rejects_bad_arguments() {
        let missing = MethodCall::new("getSleepData", json!({"start": 0}));
        assert!(matches!(parse_range(&missing), Err(ServiceError::InvalidArguments(_))));

        let text = MethodCall::new("getSleepData", json!({"start": "0", "end": 1}));
        assert!(matches!(parse_range(&text), Err(ServiceError::InvalidArguments(_))));

        let fractional = MethodCall::new("getSleepData", json!({"start": 0.5, "end": 1}));
        assert!(matches!(parse_range(&fractional), Err(ServiceError::InvalidArguments(_))));

        let bare = MethodCall::bare("getSleepData");
        assert!(matches!(parse_range(&bare), Err(ServiceError::InvalidArguments(_))));
    }

    #[test]
    fn test_parse_range_rejects_inverted_range() {
        let call = MethodCall::new("getTotalData", json!({"start": 10, "end": 5}));
        assert!(matches!(
            parse_range(&call),
            Err(ServiceError::Health(HealthError::InvalidRange { start: 10, end: 5 }))
        ));
    }
}
