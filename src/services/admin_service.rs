use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{Order, OrderDetails, Payment, Product},
    dto::{
        orders::OrderList,
        products::{InventoryAdjustRequest, ProductList},
    },
    entity::products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::product_from_entity,
    response::{ApiResponse, Meta},
    routes::params::{LowStockQuery, OrderListQuery},
    services::order_service::order_filter,
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, filter) = order_filter(&query, None);
    let result = state.orders.list_orders(filter).await?;

    let meta = Meta::new(page, limit, result.total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList {
            items: result.items,
        },
        Some(meta),
    ))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetails>> {
    ensure_admin(user)?;
    let details = state.orders.get_order(id).await?;
    Ok(ApiResponse::success(
        "Order found",
        details,
        Some(Meta::empty()),
    ))
}

pub async fn approve_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let order = state.orders.approve_order(id).await?;
    record_status(state, user, "order_approve", &order).await;
    Ok(ApiResponse::success("Order approved", order, Some(Meta::empty())))
}

pub async fn complete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let order = state.orders.complete_order(id).await?;
    record_status(state, user, "order_complete", &order).await;
    Ok(ApiResponse::success("Order delivered", order, Some(Meta::empty())))
}

pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let order = state.orders.cancel_order(id).await?;
    record_status(state, user, "order_reject", &order).await;
    Ok(ApiResponse::success("Order cancelled", order, Some(Meta::empty())))
}

pub async fn return_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let order = state.orders.return_order(id).await?;
    record_status(state, user, "order_return", &order).await;
    Ok(ApiResponse::success("Order returned", order, Some(Meta::empty())))
}

pub async fn cancel_item(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    serial_no: &str,
) -> AppResult<ApiResponse<Payment>> {
    ensure_admin(user)?;
    let payment = state.orders.cancel_product(serial_no, order_id).await?;
    audit::record(
        state,
        user.user_id,
        "order_item_cancel",
        "product_orders",
        serde_json::json!({
            "order_id": order_id,
            "serial_no": serial_no,
            "payment_amount": payment.amount,
        }),
    )
    .await;
    Ok(ApiResponse::success("Item cancelled", payment, Some(Meta::empty())))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let threshold = query.threshold.unwrap_or(5);
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Products::find().filter(ProdCol::Quantity.lte(threshold));
    finder = finder
        .order_by_asc(ProdCol::Quantity)
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect::<Result<Vec<Product>, _>>()?;

    let data = ProductList { items };
    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Low stock", data, Some(meta)))
}

pub async fn adjust_inventory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: InventoryAdjustRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".into()));
    }

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound("Product".into())),
    };

    let new_quantity = product
        .quantity
        .checked_add(payload.delta)
        .ok_or_else(|| AppError::BadRequest("stock adjustment out of range".into()))?;
    if new_quantity < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }

    let mut active: ProductActive = product.into();
    active.quantity = Set(new_quantity);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        state,
        user.user_id,
        "inventory_adjust",
        "products",
        serde_json::json!({ "product_id": updated.id, "delta": payload.delta }),
    )
    .await;

    Ok(ApiResponse::success(
        "Inventory updated",
        product_from_entity(updated)?,
        Some(Meta::empty()),
    ))
}

async fn record_status(state: &AppState, user: &AuthUser, action: &str, order: &Order) {
    audit::record(
        state,
        user.user_id,
        action,
        "orders",
        serde_json::json!({ "order_id": order.id, "status": order.status }),
    )
    .await;
}
