pub mod boards;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /boards                                  list visible, create
/// /boards/find?title=                      title search over visible boards
/// /boards/count                            count visible boards
/// /boards/public                           public listing
/// /boards/{id}                             get, update, remove (soft)
/// /boards/{id}/members                     add (POST), remove (DELETE)
/// /boards/{id}/transfer-ownership          transfer ownership (POST)
/// /boards/{id}/archive                     archive (POST)
/// /boards/{id}/unarchive                   unarchive (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/boards", boards::router())
}
