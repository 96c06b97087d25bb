//! Resource-specific lookups on top of the generic service.

use super::{EntityService, Resource};
use crate::error::AppError;
use crate::model::{
    Category, Good, User, CREATE_TIME_COLUMN, ID_COLUMN, PRICE_COLUMN, ROLE_COLUMN,
    STATUS_COLUMN, USERNAME_COLUMN,
};
use crate::store::{Filter, ListQuery, Order, Store};
use rust_decimal::Decimal;

impl<S: Store> EntityService<Good, S> {
    /// Live goods priced within `[min, max]`, cheapest first. An inverted range matches nothing.
    pub async fn by_price_range(&self, min: Decimal, max: Decimal) -> Result<Vec<Good>, AppError> {
        let query = ListQuery::new()
            .filter(Filter::Gte(PRICE_COLUMN, min.into()))
            .filter(Filter::Lte(PRICE_COLUMN, max.into()))
            .order_by([Order::asc(PRICE_COLUMN), Order::asc(ID_COLUMN)]);
        self.find(&query).await
    }
}

impl<S: Store> EntityService<Category, S> {
    pub async fn sorted(&self) -> Result<Vec<Category>, AppError> {
        self.find(&ListQuery::new().order_by(Category::search_order()))
            .await
    }
}

fn newest_first() -> [Order; 2] {
    [Order::desc(CREATE_TIME_COLUMN), Order::desc(ID_COLUMN)]
}

impl<S: Store> EntityService<User, S> {
    pub async fn by_username(&self, username: &str) -> Result<User, AppError> {
        let query = ListQuery::new().filter(Filter::Eq(USERNAME_COLUMN, username.into()));
        self.find(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("user not found: {}", username)))
    }

    pub async fn by_role(&self, role: &str) -> Result<Vec<User>, AppError> {
        let query = ListQuery::new()
            .filter(Filter::Eq(ROLE_COLUMN, role.into()))
            .order_by(newest_first());
        self.find(&query).await
    }

    pub async fn by_status(&self, status: i32) -> Result<Vec<User>, AppError> {
        let query = ListQuery::new()
            .filter(Filter::Eq(STATUS_COLUMN, status.into()))
            .order_by(newest_first());
        self.find(&query).await
    }
}
