use auth::TokenService;
use db::{DBService, DbErr};
use services::notify::Notifier;

const JWT_SECRET_ENV: &str = "TASKHIVE_JWT_SECRET";

/// Shared handles for every request handler.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    tokens: TokenService,
    notifier: Notifier,
}

impl AppState {
    pub async fn new() -> Result<Self, DbErr> {
        let db = DBService::new().await?;
        Ok(Self::with_db(db))
    }

    pub fn with_db(db: DBService) -> Self {
        let secret = std::env::var(JWT_SECRET_ENV).unwrap_or_else(|_| {
            tracing::warn!("{JWT_SECRET_ENV} is not set, using an insecure development secret");
            "taskhive-dev-secret".to_string()
        });
        Self::with_token_service(db, TokenService::new(secret.as_bytes()))
    }

    pub fn with_token_service(db: DBService, tokens: TokenService) -> Self {
        Self {
            db,
            tokens,
            notifier: Notifier::new(),
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
