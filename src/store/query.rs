//! Filter, ordering and window descriptions shared by every backend.

use crate::model::Entity;
use crate::sql::FieldValue;
use std::cmp::Ordering;

/// One predicate on a column. Column names come from entity definitions, never from requests.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Eq(&'static str, FieldValue),
    Ne(&'static str, FieldValue),
    /// Case-sensitive substring match.
    Contains(&'static str, String),
    Gte(&'static str, FieldValue),
    Lte(&'static str, FieldValue),
}

impl Filter {
    pub fn column(&self) -> &'static str {
        match self {
            Filter::Eq(c, _)
            | Filter::Ne(c, _)
            | Filter::Contains(c, _)
            | Filter::Gte(c, _)
            | Filter::Lte(c, _) => c,
        }
    }

    /// In-process evaluation with SQL semantics: comparisons against NULL never match.
    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        let Some(actual) = entity.field(self.column()) else {
            return false;
        };
        if actual == FieldValue::Null {
            return false;
        }
        match self {
            Filter::Eq(_, v) => actual.compare(v) == Some(Ordering::Equal),
            Filter::Ne(_, v) => matches!(actual.compare(v), Some(Ordering::Less | Ordering::Greater)),
            Filter::Contains(_, needle) => actual.as_text().is_some_and(|s| s.contains(needle.as_str())),
            Filter::Gte(_, v) => matches!(actual.compare(v), Some(Ordering::Greater | Ordering::Equal)),
            Filter::Lte(_, v) => matches!(actual.compare(v), Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

impl Order {
    pub fn asc(column: &'static str) -> Self {
        Order {
            column,
            descending: false,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Order {
            column,
            descending: true,
        }
    }
}

/// LIMIT/OFFSET window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub limit: u32,
    pub offset: u64,
}

impl Window {
    /// Window for a 1-based page number.
    pub fn page(page: u32, size: u32) -> Self {
        Window {
            limit: size,
            offset: u64::from(page.saturating_sub(1)) * u64::from(size),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub orders: Vec<Order>,
    pub window: Option<Window>,
}

impl ListQuery {
    pub fn new() -> Self {
        ListQuery::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, orders: impl IntoIterator<Item = Order>) -> Self {
        self.orders.extend(orders);
        self
    }

    pub fn window(mut self, window: Window) -> Self {
        self.window = Some(window);
        self
    }

    /// Sort entities in place following `orders`. Stable, so input order breaks remaining ties.
    pub fn sort<E: Entity>(&self, rows: &mut [E]) {
        rows.sort_by(|a, b| {
            for order in &self.orders {
                let (x, y) = (a.field(order.column), b.field(order.column));
                let ord = match (x, y) {
                    (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                let ord = if order.descending { ord.reverse() } else { ord };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_offsets_from_one() {
        assert_eq!(Window::page(1, 10), Window { limit: 10, offset: 0 });
        assert_eq!(Window::page(3, 20), Window { limit: 20, offset: 40 });
        assert_eq!(Window::page(0, 10).offset, 0);
    }
}
