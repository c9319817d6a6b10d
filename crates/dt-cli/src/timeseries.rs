//! Timeseries request specs and data-point shaping.

use serde_json::{Map, Value};

use crate::error::CliError;

pub const BUILTIN_NAMESPACE: &str = "com.dynatrace.builtin";
pub const DEFAULT_AGGREGATION: &str = "avg";
pub const DEFAULT_TIMEFRAME: &str = "hour";

/// `timeseriesId[aggregation%timeframe]`, both bracket parts optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeseriesSpec {
    pub timeseries_id: String,
    pub aggregation: String,
    pub timeframe: String,
}

impl TimeseriesSpec {
    pub fn parse(input: &str) -> Self {
        let mut spec = Self {
            timeseries_id: input.to_string(),
            aggregation: DEFAULT_AGGREGATION.to_string(),
            timeframe: DEFAULT_TIMEFRAME.to_string(),
        };
        let (Some(begin), Some(end)) = (input.find('['), input.find(']')) else {
            return spec;
        };
        if end <= begin {
            return spec;
        }
        spec.timeseries_id = input[..begin].to_string();
        let settings = &input[begin + 1..end];
        let (aggregation, timeframe) = settings.split_once('%').unwrap_or((settings, ""));
        if !aggregation.is_empty() {
            spec.aggregation = aggregation.to_string();
        }
        if !timeframe.is_empty() {
            spec.timeframe = timeframe.to_string();
        }
        spec
    }

    /// Prefix the builtin namespace when the id has none (`host.cpu.system`).
    pub fn qualified(mut self) -> Self {
        if self.timeseries_id.find(':').map_or(true, |pos| pos == 0) {
            self.timeseries_id = format!("{BUILTIN_NAMESPACE}:{}", self.timeseries_id);
        }
        self
    }

    pub fn query_string(&self) -> String {
        format!(
            "timeseriesId={}&relativeTime={}&aggregationType={}",
            self.timeseries_id,
            self.timeframe.to_lowercase(),
            self.aggregation.to_lowercase()
        )
    }
}

/// Keep the data points of the listed entities, or of all entities when `entities` is `None`.
pub fn filter_data_points(data_points: &Map<String, Value>, entities: Option<&[String]>) -> Map<String, Value> {
    data_points
        .iter()
        .filter(|(entity, _)| entities.map_or(true, |list| list.iter().any(|e| e == *entity)))
        .map(|(entity, points)| {
            let mut entry = Map::new();
            entry.insert("dataPoints".to_string(), points.clone());
            (entity.clone(), Value::Object(entry))
        })
        .collect()
}

/// Shape a timeseries query response into per-entity entries with display name and unit.
pub fn entity_measures(
    response: &Value,
    timeseries_id: &str,
    entities: Option<&[String]>,
) -> Result<Map<String, Value>, CliError> {
    let result = response
        .get("result")
        .ok_or_else(|| CliError::UnexpectedResponse("missing 'result'".to_string()))?;
    if result.get("timeseriesId").and_then(Value::as_str) != Some(timeseries_id) {
        return Err(CliError::UnknownTimeseries(timeseries_id.to_string()));
    }
    let data_points = result
        .get("dataPoints")
        .and_then(Value::as_object)
        .ok_or_else(|| CliError::UnexpectedResponse("missing 'dataPoints'".to_string()))?;

    let mut measures = filter_data_points(data_points, entities);
    for (entity, entry) in measures.iter_mut() {
        if let Value::Object(entry) = entry {
            let display_name = result
                .get("entities")
                .and_then(|names| names.get(entity.as_str()))
                .cloned()
                .unwrap_or(Value::Null);
            entry.insert("entityDisplayName".to_string(), display_name);
            entry.insert("unit".to_string(), result.get("unit").cloned().unwrap_or(Value::Null));
            entry.insert("timeseriesId".to_string(), Value::String(timeseries_id.to_string()));
        }
    }
    Ok(measures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn spec_defaults_and_overrides() {
        let spec = TimeseriesSpec::parse("com.dynatrace.builtin:service.responsetime");
        assert_eq!(spec.timeseries_id, "com.dynatrace.builtin:service.responsetime");
        assert_eq!((spec.aggregation.as_str(), spec.timeframe.as_str()), ("avg", "hour"));

        let spec = TimeseriesSpec::parse("app.useractions[count%hour]");
        assert_eq!(spec.timeseries_id, "app.useractions");
        assert_eq!(spec.aggregation, "count");

        let spec = TimeseriesSpec::parse("x[%day]");
        assert_eq!((spec.aggregation.as_str(), spec.timeframe.as_str()), ("avg", "day"));

        let spec = TimeseriesSpec::parse("x]odd[");
        assert_eq!(spec.timeseries_id, "x]odd[");
    }

    #[test]
    fn qualified_adds_builtin_namespace() {
        assert_eq!(
            TimeseriesSpec::parse("host.cpu.system[max%hour]").qualified().timeseries_id,
            "com.dynatrace.builtin:host.cpu.system"
        );
        assert_eq!(
            TimeseriesSpec::parse("jmx.tomcat.jdbc.pool:Active").qualified().timeseries_id,
            "jmx.tomcat.jdbc.pool:Active"
        );
    }

    #[test]
    fn query_string_is_lowercased() {
        let spec = TimeseriesSpec::parse("a:b[MAX%Hour]");
        assert_eq!(spec.query_string(), "timeseriesId=a:b&relativeTime=hour&aggregationType=max");
    }

    #[test]
    fn measures_are_filtered_and_annotated() {
        let response = json!({
            "result": {
                "timeseriesId": "a:b",
                "unit": "MicroSecond",
                "dataPoints": {"APP-1": [[1, 2.0]], "APP-2": [[1, 3.0]]},
                "entities": {"APP-1": "www.easytravel.com", "APP-2": "shop"}
            }
        });
        let only = vec!["APP-2".to_string()];
        let measures = entity_measures(&response, "a:b", Some(&only)).unwrap();
        assert_eq!(
            Value::Object(measures),
            json!({"APP-2": {
                "dataPoints": [[1, 3.0]],
                "entityDisplayName": "shop",
                "unit": "MicroSecond",
                "timeseriesId": "a:b"
            }})
        );
        assert_eq!(entity_measures(&response, "a:b", None).unwrap().len(), 2);
        assert!(matches!(entity_measures(&response, "x:y", None), Err(CliError::UnknownTimeseries(_))));
    }

    #[test]
    fn display_names_resolve_for_ids_with_separators() {
        let response = json!({
            "result": {
                "timeseriesId": "a:b",
                "dataPoints": {"CUSTOM_DEVICE-x/y": [[1, 1.0]], "CUSTOM_DEVICE-a~b": [[1, 2.0]]},
                "entities": {"CUSTOM_DEVICE-x/y": "router", "CUSTOM_DEVICE-a~b": "switch"}
            }
        });
        let measures = entity_measures(&response, "a:b", None).unwrap();
        assert_eq!(measures["CUSTOM_DEVICE-x/y"]["entityDisplayName"], json!("router"));
        assert_eq!(measures["CUSTOM_DEVICE-a~b"]["entityDisplayName"], json!("switch"));
        assert_eq!(measures["CUSTOM_DEVICE-x/y"]["unit"], Value::Null);
    }
}
