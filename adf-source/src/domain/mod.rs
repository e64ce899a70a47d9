//! Shapes returned by the Data Factory management API. Only the fields the
//! extractor consumes are modelled; everything else is ignored.

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineListResponse {
    #[serde(default)]
    pub value: Vec<RemotePipeline>,
    /// Continuation link for the next page. Read but never followed.
    #[serde(default)]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemotePipeline {
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub properties: Option<PipelineProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineProperties {
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub activities: Vec<RemoteActivity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteActivity {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub activity_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub type_properties: Option<ActivityTypeProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityTypeProperties {
    #[serde(default, deserialize_with = "lenient")]
    pub sink: Option<CopySink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CopySink {
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub sink_type: Option<String>,
}

impl RemoteActivity {
    pub fn sink_type(&self) -> Option<&str> {
        self.type_properties
            .as_ref()?
            .sink
            .as_ref()?
            .sink_type
            .as_deref()
    }
}

impl RemotePipeline {
    pub fn description(&self) -> Option<&str> {
        self.properties.as_ref()?.description.as_deref()
    }
}

// A field of the wrong JSON type degrades to `None` instead of failing the
// whole page.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };

    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_listing_page() {
        let page: PipelineListResponse = serde_json::from_value(json!({
            "value": [{
                "name": "p1",
                "id": "/subscriptions/s1/pipelines/p1",
                "etag": "0a00",
                "properties": {
                    "description": "d",
                    "activities": [{
                        "name": "copyA",
                        "type": "Copy",
                        "dependsOn": [],
                        "typeProperties": {
                            "source": { "type": "SqlSource" },
                            "sink": { "type": "BlobSink" }
                        }
                    }]
                }
            }],
            "nextLink": "https://management.azure.com/next"
        }))
        .unwrap();

        assert_eq!(page.value.len(), 1);
        assert_eq!(
            page.next_link.as_deref(),
            Some("https://management.azure.com/next")
        );

        let pipeline = &page.value[0];
        assert_eq!(pipeline.name, "p1");
        assert_eq!(pipeline.description(), Some("d"));

        let activities = &pipeline.properties.as_ref().unwrap().activities;
        assert_eq!(activities[0].name.as_deref(), Some("copyA"));
        assert_eq!(activities[0].activity_type.as_deref(), Some("Copy"));
        assert_eq!(activities[0].sink_type(), Some("BlobSink"));
    }

    #[test]
    fn test_missing_value_is_empty_page() {
        let page: PipelineListResponse = serde_json::from_value(json!({})).unwrap();

        assert!(page.value.is_empty());
        assert!(page.next_link.is_none());
    }

    #[test]
    fn test_malformed_activity_fields_degrade() {
        let properties: PipelineProperties = serde_json::from_value(json!({
            "description": 42,
            "activities": [
                { "name": 7, "type": ["Copy"], "typeProperties": "nope" },
                "not an object",
                { "name": "ok", "type": "Copy", "typeProperties": { "sink": { "type": null } } }
            ]
        }))
        .unwrap();

        assert_eq!(properties.description, None);
        assert_eq!(properties.activities.len(), 3);
        assert!(properties.activities[0].name.is_none());
        assert!(properties.activities[0].activity_type.is_none());
        assert!(properties.activities[0].type_properties.is_none());
        assert!(properties.activities[1].name.is_none());
        assert_eq!(properties.activities[2].name.as_deref(), Some("ok"));
        assert_eq!(properties.activities[2].sink_type(), None);
    }

    #[test]
    fn test_non_array_activities_is_empty() {
        let properties: PipelineProperties =
            serde_json::from_value(json!({ "activities": { "name": "x" } })).unwrap();

        assert!(properties.activities.is_empty());
    }

    #[test]
    fn test_pipeline_without_name_fails() {
        let result = serde_json::from_value::<PipelineListResponse>(json!({
            "value": [{ "id": "/p" }]
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_non_string_id_keeps_page() {
        let page: PipelineListResponse = serde_json::from_value(json!({
            "value": [
                { "name": "ok", "id": "/ok" },
                { "name": "odd", "id": 42 }
            ]
        }))
        .unwrap();

        assert_eq!(page.value.len(), 2);
        assert_eq!(page.value[0].id.as_deref(), Some("/ok"));
        assert_eq!(page.value[1].name, "odd");
        assert_eq!(page.value[1].id, None);
    }
}
