//! Row models for the SSO core tables.

pub mod cas_ticket;
pub mod nginx_ticket;
pub mod oauth_ticket;
pub mod revoked_token;
pub mod site;
pub mod subject;

pub use cas_ticket::{CasTicket, NewCasTicket, CAS_TICKET_TTL_SECONDS};
pub use nginx_ticket::{NewNginxTicket, NginxTicket, NGINX_TOKEN_TTL_HOURS};
pub use oauth_ticket::{NewOAuthTicket, OAuthTicket, OAUTH_CODE_TTL_SECONDS};
pub use revoked_token::{RevokedToken, REVOCATION_TTL_HOURS};
pub use site::{Site, SSO_TYPE_CAS, SSO_TYPE_NGINX, SSO_TYPE_OAUTH, SSO_TYPE_SAML};
pub use subject::Subject;
