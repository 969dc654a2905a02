//! HTTP inference surface.
//!
//! One [`InferenceGate`] per configured domain, looked up by the `/predict`
//! path segment (domain name or alias). Gates are built once, before the
//! listener binds, and shared read-only across requests.

mod routes;

pub use routes::{build_router, run_http_server, AppState, HealthResponse, HttpServerError};

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::gate::InferenceGate;

/// Domain name/alias → gate lookup
#[derive(Debug, Default)]
pub struct GateRegistry {
    gates: Vec<Arc<InferenceGate>>,
    routes: HashMap<String, usize>,
    default_domain: Option<String>,
}

impl GateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every configured model and register its gate
    pub fn from_config(config: &AppConfig) -> Self {
        let mut registry = Self::new();
        for model in &config.models {
            registry.insert(InferenceGate::from_config(model), &model.aliases);
        }
        registry.default_domain = config.server.default_domain.clone();
        registry
    }

    /// Register a gate under its domain and any aliases; later entries win
    pub fn insert(&mut self, gate: InferenceGate, aliases: &[String]) {
        let index = self.gates.len();
        let domain = gate.domain().to_string();
        self.gates.push(Arc::new(gate));
        for name in std::iter::once(&domain).chain(aliases) {
            if self.routes.insert(name.clone(), index).is_some() {
                log::warn!("[Registry] Route '{}' re-registered for {}", name, domain);
            }
        }
    }

    pub fn with_default_domain(mut self, domain: impl Into<String>) -> Self {
        self.default_domain = Some(domain.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<InferenceGate>> {
        self.routes.get(name).map(|&index| &self.gates[index])
    }

    /// Gate answering the bare `/predict` route
    ///
    /// Falls back to the first registered gate when no default is configured.
    pub fn default_gate(&self) -> Option<&Arc<InferenceGate>> {
        match &self.default_domain {
            Some(domain) => self.get(domain),
            None => self.gates.first(),
        }
    }

    pub fn gates(&self) -> &[Arc<InferenceGate>] {
        &self.gates
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}
