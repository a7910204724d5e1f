use uuid::Uuid;

use crate::{
    domain::{OrderDetails, OrderFilter},
    dto::orders::{CreateOrderRequest, OrderList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderDetails>> {
    let new_order = payload.validate(user.user_id)?;
    let details = state.orders.create_order(new_order).await?;

    Ok(ApiResponse::success(
        "Order placed",
        details,
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, filter) = order_filter(&query, Some(user.user_id));
    let result = state.orders.list_orders(filter).await?;

    let meta = Meta::new(page, limit, result.total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList {
            items: result.items,
        },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetails>> {
    let details = state.orders.get_order(id).await?;
    // Someone else's order is reported exactly like a missing one.
    if details.order.user_id != user.user_id {
        return Err(AppError::NotFound("Order".into()));
    }

    Ok(ApiResponse::success("OK", details, Some(Meta::empty())))
}

pub(crate) fn order_filter(query: &OrderListQuery, user_id: Option<Uuid>) -> (i64, i64, OrderFilter) {
    let (page, limit, offset) = query.pagination().normalize();
    let filter = OrderFilter {
        user_id,
        status: query.status,
        limit: limit as u64,
        offset: offset as u64,
        newest_first: matches!(query.sort_order.unwrap_or(SortOrder::Desc), SortOrder::Desc),
    };
    (page, limit, filter)
}
