//! Sound-velocity profiles stored as JSON.
//!
//! Reading files is left to the caller; this module only turns a JSON
//! document into a validated [`VelocityModel`]:
//!
//! ```json
//! { "name": "cast 12", "nodes": [ { "depth": 0.0, "velocity": 1500.0 }, ... ] }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ModelError, VelocityModel, VelocityNode};

/// Errors that can occur while reading a profile document.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid velocity model: {0}")]
    Model(#[from] ModelError),
}

/// Serialized form of a sound-velocity profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDocument {
    /// Optional profile label (cast id, station name)
    #[serde(default)]
    pub name: Option<String>,
    /// Nodes, shallowest first
    pub nodes: Vec<VelocityNode>,
}

impl ProfileDocument {
    /// Validate the nodes and build a model.
    pub fn into_model(self) -> Result<VelocityModel, ModelError> {
        VelocityModel::new(self.nodes)
    }
}

/// Parse a JSON profile document and build its model.
pub fn parse_profile_json(source: &str) -> Result<VelocityModel, ProfileError> {
    let document: ProfileDocument = serde_json::from_str(source)?;
    if let Some(name) = &document.name {
        log::debug!("Parsed profile '{}' with {} nodes", name, document.nodes.len());
    }
    Ok(document.into_model()?)
}
