//! Handlers for the `/boards` resource.
//!
//! Handlers translate HTTP into [`BoardService`] calls, publish a
//! [`BoardEvent`] after every successful mutation, and wrap results in the
//! `{ "data": ... }` envelope. All rule enforcement lives in the service.
//!
//! [`BoardService`]: boardwalk_core::service::BoardService

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use boardwalk_core::board::{Board, BoardFilter, BoardView, CreateBoard, UpdateBoard};
use boardwalk_core::error::CoreError;
use boardwalk_core::types::DbId;
use boardwalk_events::{BoardEvent, BoardEventKind};
use serde::Deserialize;
use serde_json::json;

use crate::cache::Listing;
use crate::error::AppResult;
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::{CountResponse, DataResponse};
use crate::state::AppState;

/// Body for `POST`/`DELETE /boards/{id}/members`.
#[derive(Debug, Deserialize)]
pub struct MembersInput {
    pub members: Vec<DbId>,
}

/// Body for `POST /boards/{id}/transfer-ownership`.
#[derive(Debug, Deserialize)]
pub struct TransferOwnershipInput {
    pub owner: DbId,
}

/// `?populate=true` attaches owner and member accounts to read responses.
#[derive(Debug, Default, Deserialize)]
pub struct PopulateParams {
    #[serde(default)]
    pub populate: bool,
}

async fn present(
    state: &AppState,
    boards: Vec<Board>,
    params: &PopulateParams,
) -> AppResult<Vec<BoardView>> {
    if params.populate {
        Ok(state.boards.populate(boards).await?)
    } else {
        Ok(boards.into_iter().map(BoardView::from).collect())
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/boards
pub async fn list(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Query(params): Query<PopulateParams>,
) -> AppResult<Json<DataResponse<Vec<BoardView>>>> {
    let viewer = user.viewer();
    let boards = state
        .list_cache
        .get_or_load(Listing::Visible, &viewer, || {
            state.boards.list_visible_boards(&viewer)
        })
        .await?;
    let data = present(&state, boards, &params).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/boards/public
pub async fn list_public(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Query(params): Query<PopulateParams>,
) -> AppResult<Json<DataResponse<Vec<BoardView>>>> {
    let viewer = user.viewer();
    let boards = state
        .list_cache
        .get_or_load(Listing::Public, &viewer, || {
            state.boards.list_public_boards(&viewer)
        })
        .await?;
    let data = present(&state, boards, &params).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/boards/find?title=&populate=
pub async fn find(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Query(filter): Query<BoardFilter>,
    Query(params): Query<PopulateParams>,
) -> AppResult<Json<DataResponse<Vec<BoardView>>>> {
    let boards = state.boards.find_boards(&user.viewer(), &filter).await?;
    let data = present(&state, boards, &params).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/boards/count
pub async fn count(
    State(state): State<AppState>,
    user: MaybeAuthUser,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    let count = state.boards.count_visible_boards(&user.viewer()).await?;
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}

/// GET /api/v1/boards/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<PopulateParams>,
) -> AppResult<Json<DataResponse<BoardView>>> {
    let board = state.boards.get_board(&user.viewer(), id).await?;
    let view = present(&state, vec![board], &params)
        .await?
        .pop()
        .ok_or(CoreError::NotFound { entity: "Board", id })?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// Create / update / remove
// ---------------------------------------------------------------------------

/// POST /api/v1/boards
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateBoard>,
) -> AppResult<(StatusCode, Json<DataResponse<Board>>)> {
    let board = state.boards.create_board(&user.viewer(), input).await?;

    tracing::info!(board_id = board.id, user_id = user.user_id, "Board created");
    state
        .publish(BoardEvent::new(BoardEventKind::Created, board.id).with_actor(Some(user.user_id)))
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: board })))
}

/// PUT /api/v1/boards/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBoard>,
) -> AppResult<Json<DataResponse<Board>>> {
    let board = state.boards.update_board(&user.viewer(), id, input).await?;

    tracing::info!(board_id = id, user_id = user.user_id, version = board.version, "Board updated");
    state
        .publish(BoardEvent::new(BoardEventKind::Updated, id).with_actor(Some(user.user_id)))
        .await;

    Ok(Json(DataResponse { data: board }))
}

/// DELETE /api/v1/boards/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.boards.remove_board(&user.viewer(), id).await?;

    tracing::info!(board_id = id, user_id = user.user_id, "Board removed");
    state
        .publish(BoardEvent::new(BoardEventKind::Removed, id).with_actor(Some(user.user_id)))
        .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

/// POST /api/v1/boards/{id}/members
pub async fn add_members(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<MembersInput>,
) -> AppResult<Json<DataResponse<Board>>> {
    let board = state
        .boards
        .add_members(&user.viewer(), id, &input.members)
        .await?;

    tracing::info!(board_id = id, user_id = user.user_id, added = ?input.members, "Members added");
    state
        .publish(
            BoardEvent::new(BoardEventKind::MembersAdded, id)
                .with_actor(Some(user.user_id))
                .with_payload(json!({ "members": input.members })),
        )
        .await;

    Ok(Json(DataResponse { data: board }))
}

/// DELETE /api/v1/boards/{id}/members
pub async fn remove_members(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<MembersInput>,
) -> AppResult<Json<DataResponse<Board>>> {
    let board = state
        .boards
        .remove_members(&user.viewer(), id, &input.members)
        .await?;

    tracing::info!(board_id = id, user_id = user.user_id, removed = ?input.members, "Members removed");
    state
        .publish(
            BoardEvent::new(BoardEventKind::MembersRemoved, id)
                .with_actor(Some(user.user_id))
                .with_payload(json!({ "members": input.members })),
        )
        .await;

    Ok(Json(DataResponse { data: board }))
}

/// POST /api/v1/boards/{id}/transfer-ownership
pub async fn transfer_ownership(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<TransferOwnershipInput>,
) -> AppResult<Json<DataResponse<Board>>> {
    let board = state
        .boards
        .transfer_ownership(&user.viewer(), id, input.owner)
        .await?;

    tracing::info!(
        board_id = id,
        user_id = user.user_id,
        new_owner = input.owner,
        "Board ownership transferred"
    );
    state
        .publish(
            BoardEvent::new(BoardEventKind::OwnershipTransferred, id)
                .with_actor(Some(user.user_id))
                .with_payload(json!({ "owner": input.owner })),
        )
        .await;

    Ok(Json(DataResponse { data: board }))
}

// ---------------------------------------------------------------------------
// Archival
// ---------------------------------------------------------------------------

/// POST /api/v1/boards/{id}/archive
pub async fn archive(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Board>>> {
    let board = state.boards.archive(&user.viewer(), id).await?;

    tracing::info!(board_id = id, user_id = user.user_id, "Board archived");
    state
        .publish(BoardEvent::new(BoardEventKind::Archived, id).with_actor(Some(user.user_id)))
        .await;

    Ok(Json(DataResponse { data: board }))
}

/// POST /api/v1/boards/{id}/unarchive
pub async fn unarchive(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Board>>> {
    let board = state.boards.unarchive(&user.viewer(), id).await?;

    tracing::info!(board_id = id, user_id = user.user_id, "Board unarchived");
    state
        .publish(BoardEvent::new(BoardEventKind::Unarchived, id).with_actor(Some(user.user_id)))
        .await;

    Ok(Json(DataResponse { data: board }))
}
