use serde::{Serialize, Deserialize, Serializer, Deserializer};
use std::time::Duration;

/// Serializes Duration as seconds
pub fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    duration.as_secs_f64().serialize(serializer)
}

/// Deserializes Duration from seconds
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}

/// Serializes an optional Duration as seconds, or null
pub fn serialize_opt_duration<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    duration.map(|d| d.as_secs_f64()).serialize(serializer)
}

/// Deserializes an optional Duration from seconds, or null
pub fn deserialize_opt_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = Option::<f64>::deserialize(deserializer)?;
    secs.map(|s| Duration::try_from_secs_f64(s).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    #[derive(Serialize, Deserialize)]
    struct Test {
        #[serde(serialize_with = "serialize_duration")]
        #[serde(deserialize_with = "deserialize_duration")]
        fixed: Duration,
        #[serde(serialize_with = "serialize_opt_duration")]
        #[serde(deserialize_with = "deserialize_opt_duration")]
        optional: Option<Duration>,
    }

    #[test]
    fn test_duration_serialization() {
        let original = Test {
            fixed: Duration::from_millis(1500),
            optional: Some(Duration::from_millis(250)),
        };

        let serialized = serde_json::to_string(&original).unwrap();
        assert_eq!(serialized, r#"{"fixed":1.5,"optional":0.25}"#);

        let deserialized: Test = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.fixed, original.fixed);
        assert_eq!(deserialized.optional, original.optional);
    }

    #[test]
    fn test_missing_timeout_is_null() {
        let original = Test {
            fixed: Duration::from_secs(1),
            optional: None,
        };

        let serialized = serde_json::to_string(&original).unwrap();
        assert!(serialized.contains(r#""optional":null"#));

        let deserialized: Test = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.optional, None);
    }

    #[test]
    fn test_negative_duration_rejected() {
        let result: std::result::Result<Test, _> =
            serde_json::from_str(r#"{"fixed":-1.0,"optional":null}"#);
        assert!(result.is_err());
    }
}
