//! Liveness and readiness reporting
//!
//! Components report their own status; readiness additionally requires that
//! the model artifacts loaded at startup.

use crate::predictor::PredictorHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Component names reported by the server
pub mod components {
    pub const PREDICTOR: &str = "predictor";
    pub const HTTP: &str = "http";
}

/// Ordered from best to worst, so the overall status is the maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// RFC 3339 time of the last report
    pub checked_at: String,
}

impl ComponentHealth {
    pub fn new(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            checked_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn healthy() -> Self {
        Self::new(ComponentStatus::Healthy, None)
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::new(ComponentStatus::Unhealthy, Some(message.into()))
    }
}

/// Body of `/healthz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: BTreeMap<String, ComponentHealth>,
}

/// Body of `/readyz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ArtifactState {
    Pending,
    Loaded,
    Failed(String),
}

#[derive(Debug)]
struct RegistryState {
    components: BTreeMap<String, ComponentHealth>,
    artifacts: ArtifactState,
}

/// Shared health state; clones observe the same registry
#[derive(Debug, Clone)]
pub struct HealthRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState {
                components: BTreeMap::new(),
                artifacts: ArtifactState::Pending,
            })),
        }
    }

    /// Add a component in the healthy state
    pub async fn register(&self, name: &str) {
        self.mark(name, ComponentHealth::healthy()).await;
    }

    pub async fn mark(&self, name: &str, health: ComponentHealth) {
        self.state
            .write()
            .await
            .components
            .insert(name.to_string(), health);
    }

    /// Record the predictor's load outcome as both component health and readiness
    pub async fn track_predictor(&self, handle: &PredictorHandle) {
        let (health, artifacts) = match handle.load_error() {
            None => (ComponentHealth::healthy(), ArtifactState::Loaded),
            Some(reason) => (
                ComponentHealth::unhealthy(reason),
                ArtifactState::Failed(reason.to_string()),
            ),
        };

        let mut state = self.state.write().await;
        state
            .components
            .insert(components::PREDICTOR.to_string(), health);
        state.artifacts = artifacts;
    }

    pub async fn health(&self) -> HealthResponse {
        let state = self.state.read().await;
        let status = state
            .components
            .values()
            .map(|c| c.status)
            .max()
            .unwrap_or(ComponentStatus::Healthy);

        HealthResponse {
            status,
            components: state.components.clone(),
        }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        let state = self.state.read().await;

        let reason = match &state.artifacts {
            ArtifactState::Pending => Some("Model artifacts not loaded".to_string()),
            ArtifactState::Failed(reason) => {
                Some(format!("Model artifacts not loaded: {}", reason))
            }
            ArtifactState::Loaded => state
                .components
                .iter()
                .find(|(_, c)| c.status == ComponentStatus::Unhealthy)
                .map(|(name, _)| format!("Component {} is unhealthy", name)),
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_registry_is_healthy_but_not_ready() {
        let registry = HealthRegistry::new();

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(
            readiness.reason.as_deref(),
            Some("Model artifacts not loaded")
        );
    }

    #[tokio::test]
    async fn test_worst_component_status_wins() {
        let registry = HealthRegistry::new();
        registry.register(components::PREDICTOR).await;
        registry.register(components::HTTP).await;
        registry
            .mark(
                components::HTTP,
                ComponentHealth::new(ComponentStatus::Degraded, Some("Slow responses".into())),
            )
            .await;

        assert_eq!(registry.health().await.status, ComponentStatus::Degraded);
    }

    #[tokio::test]
    async fn test_track_unloaded_predictor() {
        let registry = HealthRegistry::new();
        registry.register(components::HTTP).await;
        registry
            .track_predictor(&PredictorHandle::unloaded(
                "missing files: matrix_ratio_scaler.json",
            ))
            .await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Unhealthy);
        assert!(health.components[components::PREDICTOR]
            .message
            .as_deref()
            .unwrap()
            .contains("matrix_ratio_scaler.json"));

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert!(readiness
            .reason
            .unwrap()
            .contains("matrix_ratio_scaler.json"));
    }

    #[tokio::test]
    async fn test_unhealthy_component_blocks_readiness() {
        let registry = HealthRegistry::new();
        registry.register(components::HTTP).await;
        {
            let mut state = registry.state.write().await;
            state.artifacts = ArtifactState::Loaded;
        }
        assert!(registry.readiness().await.ready);

        registry
            .mark(components::HTTP, ComponentHealth::unhealthy("Listener closed"))
            .await;

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(
            readiness.reason.as_deref(),
            Some("Component http is unhealthy")
        );
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ComponentHealth::unhealthy("down")).unwrap();
        assert!(json.contains(r#""status":"unhealthy""#));
        assert!(json.contains(r#""message":"down""#));
    }
}
