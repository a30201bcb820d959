//! Authorization request parameters.

use serde::Deserialize;

use idsphere_core::AuthorizeParams;

/// The OAuth parameter set carried by the deep link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizeRequest {
    pub response_type: String,
    pub client_id: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub nonce: String,
}

impl AuthorizeRequest {
    /// Project the OAuth fields out of an authorize-parameter bag.
    #[must_use]
    pub fn from_params(params: &AuthorizeParams) -> Self {
        Self {
            response_type: params.response_type().to_string(),
            client_id: params.client_id().to_string(),
            redirect_uri: params.redirect_uri().to_string(),
            state: params.state().to_string(),
            scope: params.scope().to_string(),
            nonce: params.nonce().to_string(),
        }
    }
}
