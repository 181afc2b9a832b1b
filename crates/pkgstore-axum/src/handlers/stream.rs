//! Install/remove progress stream.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use futures_util::stream::Stream;

use crate::dto::StreamQuery;
use crate::error::HttpError;
use crate::sse::session_response;
use crate::state::AppState;

/// `GET /api/stream?action=install|remove&pkg=<name>`.
///
/// Invalid input is rejected with 400 before anything is spawned. Once the
/// response starts, every outcome (including a failed install) is reported
/// in-band by the final `done` event.
pub async fn stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static>, HttpError> {
    let events = state
        .controller
        .open_raw(&query.action, query.pkg.trim())?;
    Ok(session_response(events))
}
