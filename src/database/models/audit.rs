use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeAuditEntry {
    pub id: Uuid,
    pub record_id: Uuid,
    pub action: String,
    pub actor_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub route: String,
    pub metadata: Option<String>, // JSON text
    pub created_at: DateTime<Utc>,
}

/// Request context captured for every mutating action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMeta {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub route: String,
    pub correlation_id: Option<String>,
}

impl ActionMeta {
    pub fn route(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            ..Default::default()
        }
    }
}

/// Who performed an action and from where.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionContext {
    pub actor_id: String,
    pub meta: ActionMeta,
}

impl ActionContext {
    pub fn new(actor_id: impl Into<String>, meta: ActionMeta) -> Self {
        Self {
            actor_id: actor_id.into(),
            meta,
        }
    }

    pub fn audit_entry(
        &self,
        record_id: Uuid,
        action: &str,
        metadata: Option<HashMap<String, serde_json::Value>>,
        at: DateTime<Utc>,
    ) -> OvertimeAuditEntry {
        OvertimeAuditEntry {
            id: Uuid::new_v4(),
            record_id,
            action: action.to_string(),
            actor_id: self.actor_id.clone(),
            ip_address: self.meta.ip.clone(),
            user_agent: self.meta.user_agent.clone(),
            route: self.meta.route.clone(),
            metadata: self
                .with_correlation(metadata)
                .and_then(|m| serde_json::to_string(&m).ok()),
            created_at: at,
        }
    }
}

impl ActionContext {
    fn with_correlation(
        &self,
        metadata: Option<HashMap<String, serde_json::Value>>,
    ) -> Option<HashMap<String, serde_json::Value>> {
        let Some(id) = &self.meta.correlation_id else {
            return metadata;
        };
        let mut metadata = metadata.unwrap_or_default();
        metadata.insert(
            "correlationId".to_string(),
            serde_json::Value::String(id.clone()),
        );
        Some(metadata)
    }
}

pub fn metadata(pairs: Vec<(&str, String)>) -> HashMap<String, serde_json::Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v)))
        .collect()
}
