//! SP metadata request/response models.

use serde::{Deserialize, Serialize};

/// Request body for SP metadata resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct SpMetadataRequest {
    pub sp_metadata_url: String,
}

/// The fields the platform needs from SP metadata.
#[derive(Debug, Clone, Serialize)]
pub struct SpMetadata {
    pub entity_id: String,
    pub certificate: String,
}
