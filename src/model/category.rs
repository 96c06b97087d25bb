use super::{Audit, Entity, Patch, ID_COLUMN};
use crate::service::{Merge, MergeOutcome, Resource, Validate, Violations};
use crate::sql::FieldValue;
use crate::store::Order;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const SORT_ORDER_COLUMN: &str = "sort_order";

#[derive(Clone, Debug, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Smaller values list first.
    pub sort_order: i32,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
}

impl Entity for Category {
    const TABLE: &'static str = "category";
    const COLUMNS: &'static [&'static str] = &["name", "description", SORT_ORDER_COLUMN];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.name.clone().into(),
            self.description.clone().into(),
            self.sort_order.into(),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

impl Validate for CreateCategory {
    fn check(&self, v: &mut Violations) {
        v.required("name", &self.name);
        v.not_blank("name", self.name.as_deref());
        v.length("name", self.name.as_deref(), 1, 50);
        v.length("description", self.description.as_deref(), 0, 200);
        v.required("sortOrder", &self.sort_order);
        v.at_least("sortOrder", self.sort_order.as_ref(), 0);
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub sort_order: Patch<i32>,
}

impl Validate for UpdateCategory {
    fn check(&self, v: &mut Violations) {
        v.length("name", self.name.as_option().map(String::as_str), 1, 50);
        v.length("description", self.description.as_option().map(String::as_str), 0, 200);
        v.at_least("sortOrder", self.sort_order.as_option(), 0);
    }
}

impl Merge<Category> for UpdateCategory {
    fn merge_into(self, category: &mut Category) -> MergeOutcome {
        let mut out = MergeOutcome::default();
        out.record("name", self.name.apply(&mut category.name));
        out.record("description", self.description.apply_opt(&mut category.description));
        out.record("sortOrder", self.sort_order.apply(&mut category.sort_order));
        out
    }
}

impl Resource for Category {
    const LABEL: &'static str = "category";
    const SEARCH_COLUMN: &'static str = "name";

    type Create = CreateCategory;
    type Update = UpdateCategory;

    fn search_order() -> Vec<Order> {
        vec![Order::asc(SORT_ORDER_COLUMN), Order::asc(ID_COLUMN)]
    }

    fn from_create(req: CreateCategory) -> Self {
        Category {
            id: 0,
            name: req.name.unwrap_or_default(),
            description: req.description,
            sort_order: req.sort_order.unwrap_or_default(),
            audit: Audit::default(),
        }
    }
}
