use std::fmt::Display;
use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use tracing::info;

use crate::api::{ErrorResponse, GENERIC_ERROR, HealthResponse, MessageResponse};
use crate::db::Database;
use crate::model::BookInput;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub expose_store_errors: bool,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        AppState {
            db,
            expose_store_errors: true,
        }
    }

    pub fn with_store_errors_exposed(mut self, expose: bool) -> Self {
        self.expose_store_errors = expose;
        self
    }

    /// Every failure is a 500. The store message is passed through unless the
    /// service is configured to hide it, in which case it only reaches the log.
    fn store_error(&self, operation: &str, err: impl Display) -> Response {
        tracing::error!(operation, error = %err, "store operation failed");
        let msg = if self.expose_store_errors {
            err.to_string()
        } else {
            GENERIC_ERROR.to_string()
        };
        server_error(msg)
    }
}

pub fn server_error(msg: impl Into<String>) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(msg))).into_response()
}

fn rejected(operation: &str, body: String) -> Response {
    tracing::warn!(operation, error = %body, "request rejected");
    server_error(body)
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(HealthResponse::ok())
}

pub async fn list_books(State(state): State<AppState>) -> Response {
    match state.db.list_books().await {
        Ok(books) => {
            info!(count = books.len(), "got books");
            (StatusCode::OK, Json(books)).into_response()
        }
        Err(e) => state.store_error("list_books", e),
    }
}

pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Response {
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected("create_book", rejection.body_text()),
    };

    match state.db.create_book(input).await {
        Ok(book) => {
            info!(book_id = book.id, "created book");
            (StatusCode::OK, Json(book)).into_response()
        }
        Err(e) => state.store_error("create_book", e),
    }
}

pub async fn update_book(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Response {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return rejected("update_book", rejection.body_text()),
    };
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected("update_book", rejection.body_text()),
    };

    match state.db.update_book(id, input).await {
        Ok(book) => {
            if book.is_none() {
                info!(book_id = id, "update matched no book");
            } else {
                info!(book_id = id, "updated book");
            }
            // A missing id answers 200 with a `null` body.
            (StatusCode::OK, Json(book)).into_response()
        }
        Err(e) => state.store_error("update_book", e),
    }
}

pub async fn delete_book(State(state): State<AppState>, id: Result<Path<i64>, PathRejection>) -> Response {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return rejected("delete_book", rejection.body_text()),
    };

    match state.db.delete_book(id).await {
        Ok(removed) => {
            info!(book_id = id, removed, "deleted book");
            (StatusCode::OK, Json(MessageResponse::deleted())).into_response()
        }
        Err(e) => state.store_error("delete_book", e),
    }
}
