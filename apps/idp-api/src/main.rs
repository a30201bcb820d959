//! IDSphere identity provider - SSO federation over OAuth/OIDC, CAS 3.0,
//! SAML 2.0 and the reverse-proxy cookie scheme.

use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod routes;

use idsphere_api_cas::{cas_router, CasState, CasTicketService};
use idsphere_api_nginx::{nginx_router, NginxAuthService, NginxState};
use idsphere_api_oauth::handlers::{discovery_handler, jwks_handler};
use idsphere_api_oauth::{oauth_router, AuthorizationService, OAuthState};
use idsphere_api_saml::saml::SigningCredentials;
use idsphere_api_saml::{saml_router, SamlAuthorizeService, SamlState};
use idsphere_auth::RevocationCache;
use idsphere_db::SubjectStore;
use idsphere_secrets::{KeyMaterial, Settings, TicketCipher};
use idsphere_sso::SsoDispatcher;
use routes::auth::{auth_router, AuthState};

/// Application version.
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("Starting IDSphere identity provider v{}", VERSION);

    let config_path = Settings::config_path();
    info!(path = %config_path, "Loading settings");
    let mut settings = Settings::from_file(&config_path)?;
    settings.apply_env_overrides();

    // Key material and the ticket cipher are immutable after this point.
    let keys = KeyMaterial::from_pem(&settings.private_key, &settings.certificate)?;
    let key_id = keys.kid()?;
    let public_key = keys.public_key_pem()?;
    let private_key = keys.private_key_pem().as_bytes().to_vec();
    let credentials = SigningCredentials::from_pem(keys.private_key_pem(), keys.certificate_pem())
        .map_err(|e| anyhow::anyhow!("IdP credentials: {e}"))?;
    let cipher = TicketCipher::new(&settings.secret);
    let external_url = settings.external_url().to_string();

    info!(kid = %key_id, issuer = %external_url, "Key material loaded");

    let pool = idsphere_db::connect(&settings.database_url).await?;
    idsphere_db::migrations::run(&pool).await?;
    let revocation = RevocationCache::new(pool.clone());

    let oauth_state = OAuthState::new(
        pool.clone(),
        external_url.clone(),
        cipher.clone(),
        private_key,
        public_key.clone(),
        key_id,
        revocation.clone(),
    );
    let cas_state = CasState::new(pool.clone(), settings.secret.clone());
    let saml_state = SamlState::new(
        pool.clone(),
        external_url.clone(),
        credentials.clone(),
        public_key.clone(),
        revocation.clone(),
    )
    .map_err(|e| anyhow::anyhow!("SAML state: {e}"))?;
    let nginx_state = NginxState::new(pool.clone(), cipher.clone());

    let dispatcher = SsoDispatcher::new(
        AuthorizationService::new(pool.clone(), cipher.clone()),
        CasTicketService::new(pool.clone(), settings.secret.clone()),
        SamlAuthorizeService::new(pool.clone(), external_url, credentials),
        NginxAuthService::new(pool.clone(), cipher),
    );
    let auth_state = AuthState {
        dispatcher,
        subjects: SubjectStore::new(pool),
        public_key,
        revocation,
    };

    let well_known = Router::new()
        .route("/.well-known/openid-configuration", get(discovery_handler))
        .route("/api/v1/sso/oidc/jwks", get(jwks_handler))
        .with_state(oauth_state.clone());

    let app = Router::new()
        .nest("/api/v1/sso/oauth", oauth_router(oauth_state))
        .nest("/p3", cas_router(cas_state))
        .nest("/api/v1/sso/saml", saml_router(saml_state))
        .nest("/api/v1/sso/cookie", nginx_router(nginx_state))
        .merge(well_known)
        .merge(auth_router(auth_state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    info!(%addr, "Listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();
}
