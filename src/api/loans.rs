//! Loan endpoints: on-loan listings, renewal and copy management

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstance, BookInstanceDetails, BookInstanceForm, BookInstanceQuery},
        page::{Page, PageQuery},
        renewal::{RenewBookForm, RenewalFormView},
        user::Permission,
    },
    services::loans::RenewalOutcome,
};

use super::{AuthenticatedUser, ALL_BORROWED_PATH};

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/mybooks",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Copies borrowed by the caller, soonest due first", body = BookInstancePage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<BookInstanceDetails>>> {
    let page = state
        .services
        .loans
        .borrowed_by_user(claims.user_id, query.page)
        .await?;
    Ok(Json(page))
}

/// Every copy on loan (staff)
#[utoipa::path(
    get,
    path = "/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All borrowed copies, soonest due first", body = BookInstancePage),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn all_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<BookInstanceDetails>>> {
    claims.require(Permission::ViewAllBorrowed)?;

    let page = state.services.loans.all_borrowed(query.page).await?;
    Ok(Json(page))
}

/// Show the renewal form with the proposed date
#[utoipa::path(
    get,
    path = "/book/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Renewal form", body = RenewalFormView),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalFormView>> {
    claims.require(Permission::CanMarkReturned)?;

    let form = state.services.loans.renewal_form(id).await?;
    Ok(Json(form))
}

/// Renew a loan; redirects to the borrowed listing on success
#[utoipa::path(
    post,
    path = "/book/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewBookForm,
    responses(
        (status = 303, description = "Renewed, redirect to the borrowed listing"),
        (status = 400, description = "Invalid date, form shown again", body = RenewalFormView),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_book_librarian(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Result<Json<RenewBookForm>, JsonRejection>,
) -> AppResult<Response> {
    claims.require(Permission::CanMarkReturned)?;

    let form = match body {
        Ok(Json(form)) => Some(form),
        Err(rejection) => {
            tracing::debug!("Unreadable renewal form: {}", rejection.body_text());
            None
        }
    };

    let outcome = state.services.loans.renew(id, form).await?;
    Ok(renewal_response(outcome))
}

/// 303 to the borrowed listing, or the form again with a 400
fn renewal_response(outcome: RenewalOutcome) -> Response {
    match outcome {
        RenewalOutcome::Renewed(_) => Redirect::to(ALL_BORROWED_PATH).into_response(),
        RenewalOutcome::Invalid(view) => (StatusCode::BAD_REQUEST, Json(view)).into_response(),
    }
}

/// Back-office listing of copies
#[utoipa::path(
    get,
    path = "/book-instances",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(BookInstanceQuery),
    responses(
        (status = 200, description = "Page of copies", body = BookInstancePage),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn list_instances(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookInstanceQuery>,
) -> AppResult<Json<Page<BookInstanceDetails>>> {
    claims.require(Permission::ManageCatalog)?;

    let page = state.services.loans.list_instances(&query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/book-instances/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy", body = BookInstanceDetails),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn get_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require(Permission::ManageCatalog)?;

    let instance = state.services.loans.get_instance(id).await?;
    Ok(Json(instance))
}

#[utoipa::path(
    post,
    path = "/book-instances",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = BookInstanceForm,
    responses(
        (status = 201, description = "Copy created", body = BookInstance),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(instance): Json<BookInstanceForm>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    claims.require(Permission::ManageCatalog)?;

    let created = state.services.loans.create_instance(instance).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/book-instances/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = BookInstanceForm,
    responses(
        (status = 200, description = "Copy updated", body = BookInstance),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn update_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(instance): Json<BookInstanceForm>,
) -> AppResult<Json<BookInstance>> {
    claims.require(Permission::ManageCatalog)?;

    let updated = state.services.loans.update_instance(id, instance).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/book-instances/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn delete_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require(Permission::ManageCatalog)?;

    state.services.loans.delete_instance(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
