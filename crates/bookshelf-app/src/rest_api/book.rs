use crate::repository_from_request;
use crate::state::AppState;
#[cfg_attr(not(feature = "openapi"), allow(unused_imports))]
use bookshelf_dal::book::{Book, BookRepository, CreateBook, UpdateBook};
use garde::Validate;

#[allow(unused_imports)]
use axum::routing::{delete, get, post, put};

repository_from_request!(BookRepository);

#[derive(Debug, Clone, Validate, serde::Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Path))]
pub struct SearchPath {
    /// Substring looked up in title, author and description
    #[garde(length(chars, max = 255))]
    query: String,
}

#[derive(Debug, Clone, Copy, Validate, serde::Deserialize)]
pub struct BookId {
    #[garde(skip)]
    id: i64,
}

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(paths(
    crud_api::create,
    crud_api::list,
    crud_api::get,
    crud_api::update,
    crud_api::delete,
    crud_api::search
))]
struct ModuleDocs;

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    ModuleDocs::openapi()
}

pub mod crud_api {
    use super::*;
    use crate::{error::ApiResult, rest_api::Paging, validate::Garde};
    use axum::{
        extract::{Path, Query, State},
        response::IntoResponse,
        Json,
    };
    use http::StatusCode;
    use tracing::debug;

    #[cfg_attr(feature = "openapi",  utoipa::path(post, path = "", tag = "Book", operation_id = "createBook",
        request_body = CreateBook,
        responses((status = StatusCode::CREATED, description = "Created Book", body = Book),
        (status = StatusCode::BAD_REQUEST, description = "Invalid payload or duplicate ISBN", body = crate::error::ErrorDetail))))]
    pub async fn create(
        repository: BookRepository,
        Garde(Json(payload)): Garde<Json<CreateBook>>,
    ) -> ApiResult<impl IntoResponse> {
        let record = repository.create(payload).await?;

        Ok((StatusCode::CREATED, Json(record)))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "", tag = "Book", operation_id = "listBook",
        params(Paging), responses((status = StatusCode::OK, description = "Books, newest first", body = Vec<Book>))))]
    pub async fn list(
        repository: BookRepository,
        State(state): State<AppState>,
        Garde(Query(paging)): Garde<Query<Paging>>,
    ) -> ApiResult<impl IntoResponse> {
        let config = state.config();
        let listing_params =
            paging.into_listing_params(config.default_page_size, config.max_page_size);
        let records = repository.list(listing_params).await?;
        Ok((StatusCode::OK, Json(records)))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/{id}", tag = "Book", operation_id = "getBook",
        params(("id" = i64, Path, description = "Book id")),
        responses((status = StatusCode::OK, description = "Get one", body = Book),
        (status = StatusCode::NOT_FOUND, description = "No such book", body = crate::error::ErrorDetail))))]
    pub async fn get(
        Garde(Path(BookId { id })): Garde<Path<BookId>>,
        repository: BookRepository,
    ) -> ApiResult<impl IntoResponse> {
        let record = repository.get(id).await?;

        Ok((StatusCode::OK, Json(record)))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(put, path = "/{id}", tag = "Book", operation_id = "updateBook",
        params(("id" = i64, Path, description = "Book id")),
        request_body = UpdateBook,
        responses((status = StatusCode::OK, description = "Updated Book", body = Book),
        (status = StatusCode::BAD_REQUEST, description = "No fields, invalid payload or duplicate ISBN", body = crate::error::ErrorDetail),
        (status = StatusCode::NOT_FOUND, description = "No such book", body = crate::error::ErrorDetail))))]
    pub async fn update(
        Garde(Path(BookId { id })): Garde<Path<BookId>>,
        repository: BookRepository,
        Garde(Json(payload)): Garde<Json<UpdateBook>>,
    ) -> ApiResult<impl IntoResponse> {
        let record = repository.update(id, payload).await?;

        Ok((StatusCode::OK, Json(record)))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(delete, path = "/{id}", tag = "Book", operation_id = "deleteBook",
        params(("id" = i64, Path, description = "Book id")),
        responses((status = StatusCode::NO_CONTENT, description = "Deleted"),
        (status = StatusCode::NOT_FOUND, description = "No such book", body = crate::error::ErrorDetail))))]
    pub async fn delete(
        Garde(Path(BookId { id })): Garde<Path<BookId>>,
        repository: BookRepository,
    ) -> ApiResult<impl IntoResponse> {
        repository.delete(id).await?;

        Ok((StatusCode::NO_CONTENT, ()))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/search/{query}", tag = "Book", operation_id = "searchBook",
        params(SearchPath, Paging),
        responses((status = StatusCode::OK, description = "Matches ranked title, author, then description", body = Vec<Book>))))]
    pub async fn search(
        Garde(Path(search)): Garde<Path<SearchPath>>,
        repository: BookRepository,
        State(state): State<AppState>,
        Garde(Query(paging)): Garde<Query<Paging>>,
    ) -> ApiResult<impl IntoResponse> {
        debug!("Searching books for {:?}", search.query);
        let config = state.config();
        let listing_params =
            paging.into_listing_params(config.default_search_size, config.max_page_size);
        let records = repository.search(&search.query, listing_params).await?;
        Ok((StatusCode::OK, Json(records)))
    }
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", post(crud_api::create).get(crud_api::list))
        .route(
            "/{id}",
            get(crud_api::get)
                .put(crud_api::update)
                .delete(crud_api::delete),
        )
        .route("/search/{query}", get(crud_api::search))
}
