use std::{collections::HashSet, sync::Arc};

use rust_decimal::Decimal;
use supplement_store::{
    application::OrderEngine,
    domain::{
        CartLine, Category, DomainError, NewOrder, OrderDetails, OrderFilter, OrderStatus,
        OrderType, PaymentMethod, Product,
    },
    infrastructure::MemoryStore,
};
use uuid::Uuid;

fn money(units: i64) -> Decimal {
    Decimal::new(units, 0)
}

async fn seed_product(store: &MemoryStore, name: &str, quantity: i32, price: i64) -> Uuid {
    let id = Uuid::new_v4();
    store
        .insert_product(Product {
            id,
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            description: String::new(),
            price: money(price),
            quantity,
            category: Category::GeneralHealth,
            vendor: "Optimum Nutrition".into(),
            image: String::new(),
        })
        .await;
    id
}

async fn stock(store: &MemoryStore, id: Uuid) -> i32 {
    store.product(id).await.expect("product").quantity
}

fn order_for(user_id: Uuid, lines: &[(Uuid, i32, i64)]) -> NewOrder {
    let amount = lines
        .iter()
        .map(|(_, qty, price)| money(*price) * Decimal::from(*qty))
        .sum();
    NewOrder {
        user_id,
        lines: lines
            .iter()
            .map(|(product_id, quantity, price)| CartLine {
                product_id: *product_id,
                quantity: *quantity,
                base_price: money(*price),
            })
            .collect(),
        amount,
        order_type: OrderType::Delivery,
        payment_method: PaymentMethod::CreditCard,
        address: "123 Main St".into(),
        pickup_date_time: None,
    }
}

fn setup() -> (MemoryStore, OrderEngine<MemoryStore>) {
    let store = MemoryStore::new();
    let engine = OrderEngine::new(store.clone());
    (store, engine)
}

async fn reload(engine: &OrderEngine<MemoryStore>, id: Uuid) -> OrderDetails {
    engine.get_order(id).await.expect("order")
}

#[tokio::test]
async fn create_order_expands_each_unit_into_its_own_line() {
    let (store, engine) = setup();
    let p1 = seed_product(&store, "Creatine", 10, 10).await;

    let created = engine
        .create_order(order_for(Uuid::new_v4(), &[(p1, 3, 10)]))
        .await
        .unwrap();

    assert_eq!(created.order.status, OrderStatus::Processing);
    assert_eq!(created.items.len(), 3);
    let serials: HashSet<&str> = created.items.iter().map(|i| i.serial_no.as_str()).collect();
    assert_eq!(serials.len(), 3);
    for item in &created.items {
        assert_eq!(item.quantity, 1);
        assert_eq!(item.amount, money(10));
        assert_eq!(item.status, OrderStatus::Processing);
        assert_eq!(item.product_id, p1);
        assert_eq!(item.serial_no.len(), 16);
    }
    assert_eq!(created.payment.unwrap().amount, money(30));
    assert_eq!(stock(&store, p1).await, 7);

    let stored = reload(&engine, created.order.id).await;
    assert_eq!(stored.items.len(), 3);
    assert_eq!(stored.payment.unwrap().address, "123 Main St");
}

#[tokio::test]
async fn insufficient_stock_rolls_back_everything() {
    let (store, engine) = setup();
    let plenty = seed_product(&store, "Whey Isolate", 5, 50).await;
    let scarce = seed_product(&store, "Fish Oil", 1, 20).await;

    let err = engine
        .create_order(order_for(Uuid::new_v4(), &[(plenty, 2, 50), (scarce, 2, 20)]))
        .await
        .unwrap_err();

    match err {
        DomainError::InsufficientStock { product } => assert_eq!(product, "Fish Oil"),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(stock(&store, plenty).await, 5);
    assert_eq!(stock(&store, scarce).await, 1);
    assert_eq!(store.order_count().await, 0);
    assert_eq!(store.payment_count().await, 0);
    assert_eq!(store.line_item_count().await, 0);
}

#[tokio::test]
async fn unknown_product_aborts_the_order() {
    let (store, engine) = setup();

    let err = engine
        .create_order(order_for(Uuid::new_v4(), &[(Uuid::new_v4(), 1, 10)]))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound("Product")));
    assert_eq!(store.order_count().await, 0);
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let (store, engine) = setup();

    let err = engine
        .create_order(order_for(Uuid::new_v4(), &[]))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::InvalidInput(_)));
    assert_eq!(store.order_count().await, 0);
}

#[tokio::test]
async fn oversized_cart_fails_on_stock_without_writing_units() {
    let (store, engine) = setup();
    let product = seed_product(&store, "Glutamine", 1, 20).await;

    let err = engine
        .create_order(order_for(Uuid::new_v4(), &[(product, 40_000, 20)]))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::InsufficientStock { .. }));
    assert_eq!(store.line_item_count().await, 0);
    assert_eq!(stock(&store, product).await, 1);
}

#[tokio::test]
async fn repeated_product_lines_that_overflow_are_rejected() {
    let (store, engine) = setup();
    let product = seed_product(&store, "Fish Oil", 10, 12).await;
    let mut order = order_for(Uuid::new_v4(), &[(product, 1, 12)]);
    order.lines = vec![
        CartLine {
            product_id: product,
            quantity: i32::MAX,
            base_price: money(12),
        },
        CartLine {
            product_id: product,
            quantity: 1,
            base_price: money(12),
        },
    ];

    let err = engine.create_order(order).await.unwrap_err();

    assert!(matches!(err, DomainError::InvalidInput(_)));
    assert_eq!(stock(&store, product).await, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn last_unit_is_sold_only_once() {
    let (store, engine) = setup();
    let product = seed_product(&store, "Pre Workout", 1, 30).await;
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .create_order(order_for(Uuid::new_v4(), &[(product, 1, 30)]))
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(err) => assert!(matches!(err, DomainError::InsufficientStock { .. })),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(stock(&store, product).await, 0);
    assert_eq!(store.order_count().await, 1);
}

#[tokio::test]
async fn cancel_keeps_returned_units_and_restocks_every_line() {
    let (store, engine) = setup();
    let a = seed_product(&store, "Multivitamin", 4, 15).await;
    let b = seed_product(&store, "Casein", 4, 40).await;
    let created = engine
        .create_order(order_for(Uuid::new_v4(), &[(a, 1, 15), (b, 1, 40)]))
        .await
        .unwrap();
    let returned = created.items.iter().find(|i| i.product_id == a).unwrap();

    engine
        .cancel_product(&returned.serial_no, created.order.id)
        .await
        .unwrap();
    let order = engine.cancel_order(created.order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);

    let stored = reload(&engine, created.order.id).await;
    for item in &stored.items {
        if item.product_id == a {
            assert_eq!(item.status, OrderStatus::Returned);
        } else {
            assert_eq!(item.status, OrderStatus::Cancelled);
        }
    }
    assert_eq!(stock(&store, a).await, 4);
    assert_eq!(stock(&store, b).await, 4);
}

#[tokio::test]
async fn return_relabels_every_line_and_restocks() {
    let (store, engine) = setup();
    let p = seed_product(&store, "BCAA", 10, 25).await;
    let created = engine
        .create_order(order_for(Uuid::new_v4(), &[(p, 3, 25)]))
        .await
        .unwrap();
    engine.approve_order(created.order.id).await.unwrap();
    engine.complete_order(created.order.id).await.unwrap();
    engine
        .cancel_product(&created.items[0].serial_no, created.order.id)
        .await
        .unwrap();

    let order = engine.return_order(created.order.id).await.unwrap();

    assert_eq!(order.status, OrderStatus::Returned);
    let stored = reload(&engine, created.order.id).await;
    assert!(stored.items.iter().all(|i| i.status == OrderStatus::Returned));
    assert_eq!(stock(&store, p).await, 10);
}

#[tokio::test]
async fn cancel_product_adjusts_payment_but_not_stock() {
    let (store, engine) = setup();
    let cheap = seed_product(&store, "Electrolytes", 5, 15).await;
    let pricey = seed_product(&store, "Mass Gainer", 5, 85).await;
    let created = engine
        .create_order(order_for(Uuid::new_v4(), &[(cheap, 1, 15), (pricey, 1, 85)]))
        .await
        .unwrap();
    assert_eq!(created.payment.as_ref().unwrap().amount, money(100));
    let line = created.items.iter().find(|i| i.product_id == cheap).unwrap();

    let payment = engine
        .cancel_product(&line.serial_no, created.order.id)
        .await
        .unwrap();

    assert_eq!(payment.amount, money(85));
    let stored = reload(&engine, created.order.id).await;
    let line = stored.items.iter().find(|i| i.id == line.id).unwrap();
    assert_eq!(line.amount, Decimal::ZERO);
    assert_eq!(line.status, OrderStatus::Returned);
    assert_eq!(stored.order.status, OrderStatus::Processing);
    assert_eq!(stock(&store, cheap).await, 4);
}

#[tokio::test]
async fn cancel_product_refund_cannot_exceed_payment() {
    let (store, engine) = setup();
    let product = seed_product(&store, "Protein Bar", 5, 30).await;
    let mut order = order_for(Uuid::new_v4(), &[(product, 1, 30)]);
    order.amount = money(10);
    let created = engine.create_order(order).await.unwrap();
    let serial = created.items[0].serial_no.clone();

    let err = engine
        .cancel_product(&serial, created.order.id)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::InvalidInput(_)));
    let stored = reload(&engine, created.order.id).await;
    assert_eq!(stored.payment.unwrap().amount, money(10));
    assert_eq!(stored.items[0].status, OrderStatus::Processing);
    assert_eq!(stored.items[0].amount, money(30));
}

#[tokio::test]
async fn cancel_product_twice_charges_back_once() {
    let (store, engine) = setup();
    let p = seed_product(&store, "Glutamine", 5, 15).await;
    let created = engine
        .create_order(order_for(Uuid::new_v4(), &[(p, 2, 15)]))
        .await
        .unwrap();
    let serial = created.items[0].serial_no.clone();

    engine.cancel_product(&serial, created.order.id).await.unwrap();
    let err = engine
        .cancel_product(&serial, created.order.id)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::IllegalTransition { .. }));
    let stored = reload(&engine, created.order.id).await;
    assert_eq!(stored.payment.unwrap().amount, money(15));
}

#[tokio::test]
async fn cancel_product_with_unknown_serial_is_not_found() {
    let (store, engine) = setup();
    let p = seed_product(&store, "Zinc", 5, 5).await;
    let first = engine
        .create_order(order_for(Uuid::new_v4(), &[(p, 1, 5)]))
        .await
        .unwrap();
    let second = engine
        .create_order(order_for(Uuid::new_v4(), &[(p, 1, 5)]))
        .await
        .unwrap();

    let err = engine
        .cancel_product("0000000000000000", first.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    let foreign = &second.items[0].serial_no;
    let err = engine
        .cancel_product(foreign, first.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    let stored = reload(&engine, second.order.id).await;
    assert_eq!(stored.items[0].status, OrderStatus::Processing);
}

#[tokio::test]
async fn transitions_on_missing_order_write_nothing() {
    let (store, engine) = setup();
    let p = seed_product(&store, "Magnesium", 3, 9).await;
    engine
        .create_order(order_for(Uuid::new_v4(), &[(p, 1, 9)]))
        .await
        .unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(
        engine.approve_order(missing).await,
        Err(DomainError::NotFound("Order"))
    ));
    assert!(matches!(
        engine.complete_order(missing).await,
        Err(DomainError::NotFound("Order"))
    ));
    assert!(matches!(
        engine.cancel_order(missing).await,
        Err(DomainError::NotFound("Order"))
    ));
    assert!(matches!(
        engine.return_order(missing).await,
        Err(DomainError::NotFound("Order"))
    ));
    assert_eq!(store.order_count().await, 1);
    assert_eq!(stock(&store, p).await, 2);
}

#[tokio::test]
async fn returning_twice_restocks_once() {
    let (store, engine) = setup();
    let p = seed_product(&store, "Collagen", 6, 30).await;
    let created = engine
        .create_order(order_for(Uuid::new_v4(), &[(p, 2, 30)]))
        .await
        .unwrap();

    engine.return_order(created.order.id).await.unwrap();
    let after_first = reload(&engine, created.order.id).await;
    engine.return_order(created.order.id).await.unwrap();
    let after_second = reload(&engine, created.order.id).await;

    assert_eq!(stock(&store, p).await, 6);
    assert_eq!(after_first.order.status, after_second.order.status);
    assert_eq!(after_first.items, after_second.items);
}

#[tokio::test]
async fn cancelling_twice_restocks_once() {
    let (store, engine) = setup();
    let p = seed_product(&store, "Ashwagandha", 6, 12).await;
    let created = engine
        .create_order(order_for(Uuid::new_v4(), &[(p, 2, 12)]))
        .await
        .unwrap();

    engine.cancel_order(created.order.id).await.unwrap();
    engine.cancel_order(created.order.id).await.unwrap();

    assert_eq!(stock(&store, p).await, 6);
}

#[tokio::test]
async fn returning_a_cancelled_order_does_not_restock_again() {
    let (store, engine) = setup();
    let p = seed_product(&store, "Melatonin", 6, 8).await;
    let created = engine
        .create_order(order_for(Uuid::new_v4(), &[(p, 3, 8)]))
        .await
        .unwrap();

    engine.cancel_order(created.order.id).await.unwrap();
    let order = engine.return_order(created.order.id).await.unwrap();

    assert_eq!(order.status, OrderStatus::Returned);
    let stored = reload(&engine, created.order.id).await;
    assert!(stored.items.iter().all(|i| i.status == OrderStatus::Returned));
    assert_eq!(stock(&store, p).await, 6);
}

#[tokio::test]
async fn illegal_transitions_are_rejected_without_writes() {
    let (store, engine) = setup();
    let p = seed_product(&store, "Vitamin D3", 10, 7).await;
    let created = engine
        .create_order(order_for(Uuid::new_v4(), &[(p, 1, 7)]))
        .await
        .unwrap();
    let id = created.order.id;

    let err = engine.complete_order(id).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::IllegalTransition {
            from: OrderStatus::Processing,
            to: OrderStatus::Delivered
        }
    ));

    engine.approve_order(id).await.unwrap();
    engine.complete_order(id).await.unwrap();
    let err = engine.cancel_order(id).await.unwrap_err();
    assert!(matches!(err, DomainError::IllegalTransition { .. }));
    let err = engine.approve_order(id).await.unwrap_err();
    assert!(matches!(err, DomainError::IllegalTransition { .. }));

    let stored = reload(&engine, id).await;
    assert_eq!(stored.order.status, OrderStatus::Delivered);
    assert!(stored.items.iter().all(|i| i.status == OrderStatus::Processing));
    assert_eq!(stock(&store, p).await, 9);
}

#[tokio::test]
async fn repeated_approval_is_a_no_op() {
    let (store, engine) = setup();
    let p = seed_product(&store, "Protein Bar", 10, 3).await;
    let created = engine
        .create_order(order_for(Uuid::new_v4(), &[(p, 1, 3)]))
        .await
        .unwrap();

    let first = engine.approve_order(created.order.id).await.unwrap();
    let second = engine.approve_order(created.order.id).await.unwrap();

    assert_eq!(first.status, OrderStatus::OrderPlaced);
    assert_eq!(second.status, OrderStatus::OrderPlaced);
}

#[tokio::test]
async fn order_history_is_per_user_and_newest_first() {
    let (store, engine) = setup();
    let p = seed_product(&store, "Greens Powder", 20, 35).await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let older = engine.create_order(order_for(alice, &[(p, 1, 35)])).await.unwrap();
    let newer = engine.create_order(order_for(alice, &[(p, 2, 35)])).await.unwrap();
    engine.create_order(order_for(bob, &[(p, 1, 35)])).await.unwrap();

    let page = engine
        .list_orders(OrderFilter {
            user_id: Some(alice),
            ..OrderFilter::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    let ids: Vec<Uuid> = page.items.iter().map(|d| d.order.id).collect();
    assert_eq!(ids, vec![newer.order.id, older.order.id]);
    assert_eq!(page.items[0].items.len(), 2);

    let cancelled = engine
        .list_orders(OrderFilter {
            status: Some(OrderStatus::Cancelled),
            ..OrderFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(cancelled.total, 0);
}

#[tokio::test]
async fn stock_never_goes_negative() {
    let (store, engine) = setup();
    let p = seed_product(&store, "Caffeine Tabs", 3, 6).await;

    for _ in 0..5 {
        let _ = engine
            .create_order(order_for(Uuid::new_v4(), &[(p, 2, 6)]))
            .await;
        assert!(stock(&store, p).await >= 0);
    }
    assert_eq!(stock(&store, p).await, 1);
    assert_eq!(store.order_count().await, 1);
}
