use auth::TokenService;
use db::DBService;

use crate::AppState;

pub const TEST_JWT_SECRET: &[u8] = b"taskhive-test-secret";

pub async fn test_state() -> AppState {
    let db = DBService::new_with_url("sqlite::memory:").await.unwrap();
    AppState::with_token_service(db, TokenService::new(TEST_JWT_SECRET))
}
