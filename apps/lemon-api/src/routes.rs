//! # HTTP Routes
//!
//! Binds the services to paths. Each handler authenticates the caller,
//! calls one service operation, and picks the success status.
//!
//! ## Route Table
//! ```text
//! /api/menu-items                     GET list    POST create
//! /api/menu-items/{id}                GET get     PUT update   PATCH toggle featured   DELETE
//! /api/categories                     GET list    POST create
//! /api/groups/{group}/users           GET list    POST add        (group: manager | delivery-crew)
//! /api/groups/{group}/users/{user_id} DELETE remove
//! /api/cart/menu-items                GET view    POST add     DELETE remove (?menuitem=) or clear
//! /api/orders                         GET list    POST create from cart
//! /api/orders/{id}                    GET items   PATCH toggle PUT assign crew   DELETE
//! /health                             GET
//! ```

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use lemon_core::{CartLine, Category, Group, MenuItem, Order, OrderItemDetail, User};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::services::cart_service::{AddToCartRequest, CartAddedResponse};
use crate::services::group_service::GroupMemberRequest;
use crate::services::health_service::{HealthCheckResponse, ServingStatus};
use crate::services::menu_service::{CategoryRequest, FeaturedToggled, MenuItemRequest};
use crate::services::order_service::{AssignCrewRequest, OrderPlacedResponse};
use crate::services::MessageResponse;
use crate::AppState;

type SharedState = Arc<AppState>;

/// Builds the application router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/menu-items", get(list_menu_items).post(create_menu_item))
        .route(
            "/api/menu-items/{id}",
            get(get_menu_item)
                .put(update_menu_item)
                .patch(toggle_featured)
                .delete(delete_menu_item),
        )
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/groups/{group}/users",
            get(list_group_members).post(add_group_member),
        )
        .route(
            "/api/groups/{group}/users/{user_id}",
            delete(remove_group_member),
        )
        .route(
            "/api/cart/menu-items",
            get(view_cart).post(add_to_cart).delete(delete_from_cart),
        )
        .route("/api/orders", get(list_orders).post(create_order))
        .route(
            "/api/orders/{id}",
            get(order_items)
                .patch(toggle_order_status)
                .put(assign_delivery_crew)
                .delete(delete_order),
        )
        .route("/health", get(health))
        .with_state(state)
}

/// Maps a path segment to a managed group.
fn parse_group(segment: &str) -> ApiResult<Group> {
    match segment {
        "manager" => Ok(Group::Manager),
        "delivery-crew" => Ok(Group::DeliveryCrew),
        other => Err(ApiError::not_found("Group", other)),
    }
}

// =============================================================================
// Menu
// =============================================================================

async fn list_menu_items(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<MenuItem>>> {
    let caller = state.authenticate(&headers).await?;
    Ok(Json(state.menu.list(caller.as_ref()).await?))
}

async fn create_menu_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<MenuItemRequest>,
) -> ApiResult<(StatusCode, Json<MenuItem>)> {
    let caller = state.authenticate(&headers).await?;
    let item = state.menu.create(caller.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_menu_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<MenuItem>> {
    let caller = state.authenticate(&headers).await?;
    Ok(Json(state.menu.get(caller.as_ref(), &id).await?))
}

async fn update_menu_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<MenuItemRequest>,
) -> ApiResult<Json<MenuItem>> {
    let caller = state.authenticate(&headers).await?;
    Ok(Json(state.menu.update(caller.as_ref(), &id, body).await?))
}

async fn toggle_featured(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<FeaturedToggled>> {
    let caller = state.authenticate(&headers).await?;
    Ok(Json(state.menu.toggle_featured(caller.as_ref(), &id).await?))
}

async fn delete_menu_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let caller = state.authenticate(&headers).await?;
    Ok(Json(state.menu.delete(caller.as_ref(), &id).await?))
}

async fn list_categories(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Category>>> {
    let caller = state.authenticate(&headers).await?;
    Ok(Json(state.menu.list_categories(caller.as_ref()).await?))
}

async fn create_category(
    State(state): State<SharedState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let caller = state.authenticate(&headers).await?;
    let category = state.menu.create_category(caller.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

// =============================================================================
// Groups
// =============================================================================

async fn list_group_members(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(group): Path<String>,
) -> ApiResult<Json<Vec<User>>> {
    let group = parse_group(&group)?;
    let caller = state.authenticate(&headers).await?;
    Ok(Json(state.groups.list(caller.as_ref(), group).await?))
}

async fn add_group_member(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(group): Path<String>,
    ApiJson(body): ApiJson<GroupMemberRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let group = parse_group(&group)?;
    let caller = state.authenticate(&headers).await?;
    let message = state.groups.add(caller.as_ref(), group, body).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn remove_group_member(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((group, user_id)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    let group = parse_group(&group)?;
    let caller = state.authenticate(&headers).await?;
    Ok(Json(state.groups.remove(caller.as_ref(), group, &user_id).await?))
}

// =============================================================================
// Cart
// =============================================================================

/// Query of `DELETE /api/cart/menu-items`.
#[derive(Debug, Default, Deserialize)]
struct CartDeleteQuery {
    menuitem: Option<String>,
}

async fn view_cart(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<CartLine>>> {
    let caller = state.authenticate(&headers).await?;
    Ok(Json(state.carts.list(caller.as_ref()).await?))
}

async fn add_to_cart(
    State(state): State<SharedState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<AddToCartRequest>,
) -> ApiResult<(StatusCode, Json<CartAddedResponse>)> {
    let caller = state.authenticate(&headers).await?;
    let added = state.carts.add(caller.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(added)))
}

/// Removes one item when `?menuitem=` is given, otherwise clears the cart.
async fn delete_from_cart(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<CartDeleteQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let caller = state.authenticate(&headers).await?;
    let message = match query.menuitem.as_deref() {
        Some(menu_item_id) => state.carts.remove(caller.as_ref(), menu_item_id).await?,
        None => state.carts.clear(caller.as_ref()).await?,
    };
    Ok(Json(message))
}

// =============================================================================
// Orders
// =============================================================================

async fn list_orders(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Order>>> {
    let caller = state.authenticate(&headers).await?;
    Ok(Json(state.orders.list(caller.as_ref()).await?))
}

async fn create_order(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<(StatusCode, Json<OrderPlacedResponse>)> {
    let caller = state.authenticate(&headers).await?;
    let placed = state.orders.create(caller.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

async fn order_items(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<OrderItemDetail>>> {
    let caller = state.authenticate(&headers).await?;
    Ok(Json(state.orders.items(caller.as_ref(), &id).await?))
}

async fn toggle_order_status(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let caller = state.authenticate(&headers).await?;
    Ok(Json(state.orders.toggle_status(caller.as_ref(), &id).await?))
}

async fn assign_delivery_crew(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<AssignCrewRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let caller = state.authenticate(&headers).await?;
    Ok(Json(
        state
            .orders
            .assign_delivery_crew(caller.as_ref(), &id, body)
            .await?,
    ))
}

async fn delete_order(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let caller = state.authenticate(&headers).await?;
    Ok(Json(state.orders.delete(caller.as_ref(), &id).await?))
}

// =============================================================================
// Health
// =============================================================================

async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthCheckResponse>) {
    let report = state.health.check().await;
    let status = match report.status {
        ServingStatus::Serving => StatusCode::OK,
        ServingStatus::NotServing => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(report))
}
