//! Category endpoints
//!
//! # Endpoints
//!
//! - `GET /v1/categories` - List all categories (public)
//! - `GET /v1/categories/:slug` - Get one category (public)
//! - `POST /v1/categories` - Create a category (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use easel_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::category::{is_valid_slug, Category, CreateCategory},
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Create category request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Slug must be 1-100 characters"))]
    pub slug: String,

    pub description: Option<String>,
}

/// List all categories, ordered by name
///
/// Returns `[]` when no database is configured.
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(Category::list(&state.db).await?))
}

/// Get a category by slug
///
/// # Errors
///
/// - `404 Not Found`: Category not found
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Category>> {
    Category::find_by_slug(&state.db, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
}

/// Create a category
///
/// # Endpoint
///
/// ```text
/// POST /v1/categories
/// Authorization: Bearer <admin token>
///
/// { "name": "Ceramics", "slug": "ceramics", "description": "Pottery and clay" }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an administrator
/// - `409 Conflict`: Name or slug already taken
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    require_admin(&auth)?;
    req.validate()?;

    if !is_valid_slug(&req.slug) {
        return Err(ApiError::invalid_field(
            "slug",
            "Slug may contain only lowercase letters, digits and inner hyphens",
        ));
    }

    let category = Category::create(
        &state.db,
        CreateCategory {
            name: req.name.trim().to_string(),
            slug: req.slug,
            description: req.description.filter(|d| !d.trim().is_empty()),
        },
    )
    .await?;

    info!(category_id = %category.id, slug = %category.slug, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}
