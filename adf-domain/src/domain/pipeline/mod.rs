use serde::{Deserialize, Serialize};

pub const PIPELINE_SERVICE_TYPE: &str = "pipelineService";

/// Reference to an entity already registered in the catalog. The id is left
/// unset so the catalog resolves the entity by name.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub name: String,
}

impl EntityReference {
    pub fn pipeline_service(name: impl Into<String>) -> Self {
        Self {
            id: None,
            entity_type: PIPELINE_SERVICE_TYPE.to_owned(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub name: String,
    pub task_type: String,
    /// `None` means no dependency data was found, which the catalog treats
    /// differently from an explicit empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downstream_tasks: Option<Vec<String>>,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePipelineRequest {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub service: EntityReference,
    pub tasks: Vec<Task>,
    pub source_url: String,
}
