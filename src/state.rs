use std::sync::Arc;

use crate::{
    application::OrderEngine,
    db::{DbPool, OrmConn, orm_from_pool},
    infrastructure::SeaOrmStore,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub orders: Arc<OrderEngine<SeaOrmStore>>,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        let orm = orm_from_pool(&pool);
        let orders = Arc::new(OrderEngine::new(SeaOrmStore::new(orm.clone())));
        Self { pool, orm, orders }
    }
}
