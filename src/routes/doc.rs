use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{
        Category, LineItem, Order, OrderDetails, OrderStatus, OrderType, Payment, PaymentMethod,
        Product,
    },
    dto::{
        bmi::{BmiResult, Recommendations, UpdateBmiRequest},
        orders::{CartLineRequest, CreateOrderRequest, OrderList},
        products::{CreateProductRequest, InventoryAdjustRequest, ProductList, UpdateProductRequest},
    },
    middleware::auth::{USER_ID_HEADER, USER_ROLE_HEADER},
    response::{ApiResponse, Meta},
    routes::{admin, health, me, orders, params, products},
};

struct IdentityAddon;

impl Modify for IdentityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "user_id",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(USER_ID_HEADER))),
        );
        components.add_security_scheme(
            "user_role",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(USER_ROLE_HEADER))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::get_product,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        me::update_bmi,
        me::recommendations,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::approve_order,
        admin::complete_order,
        admin::cancel_order,
        admin::return_order,
        admin::cancel_item,
        admin::create_product,
        admin::update_product,
        admin::list_low_stock,
        admin::adjust_inventory
    ),
    components(
        schemas(
            Product,
            Category,
            Order,
            OrderStatus,
            OrderType,
            PaymentMethod,
            LineItem,
            Payment,
            OrderDetails,
            OrderList,
            CartLineRequest,
            CreateOrderRequest,
            CreateProductRequest,
            UpdateProductRequest,
            InventoryAdjustRequest,
            ProductList,
            UpdateBmiRequest,
            BmiResult,
            Recommendations,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::LowStockQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Order>,
            ApiResponse<OrderDetails>,
            ApiResponse<OrderList>,
            ApiResponse<Payment>
        )
    ),
    security(
        ("user_id" = []),
        ("user_role" = [])
    ),
    modifiers(&IdentityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Me", description = "BMI and recommendations"),
        (name = "Admin", description = "Order lifecycle and inventory management"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
