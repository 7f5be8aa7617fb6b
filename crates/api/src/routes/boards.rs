//! Route definitions for the `/boards` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::board;
use crate::state::AppState;

/// Routes mounted at `/boards`.
///
/// ```text
/// GET    /                          -> list
/// POST   /                          -> create
/// GET    /find                      -> find
/// GET    /count                     -> count
/// GET    /public                    -> list_public
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// POST   /{id}/members              -> add_members
/// DELETE /{id}/members              -> remove_members
/// POST   /{id}/transfer-ownership   -> transfer_ownership
/// POST   /{id}/archive              -> archive
/// POST   /{id}/unarchive            -> unarchive
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(board::list).post(board::create))
        .route("/find", get(board::find))
        .route("/count", get(board::count))
        .route("/public", get(board::list_public))
        .route(
            "/{id}",
            get(board::get_by_id)
                .put(board::update)
                .delete(board::delete),
        )
        .route(
            "/{id}/members",
            post(board::add_members).delete(board::remove_members),
        )
        .route("/{id}/transfer-ownership", post(board::transfer_ownership))
        .route("/{id}/archive", post(board::archive))
        .route("/{id}/unarchive", post(board::unarchive))
}
