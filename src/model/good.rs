use super::{Audit, Entity, Patch, CREATE_TIME_COLUMN, ID_COLUMN};
use crate::service::{Merge, MergeOutcome, Resource, Validate, Violations};
use crate::sql::FieldValue;
use crate::store::Order;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const PRICE_COLUMN: &str = "price";

const PRICE_INTEGER_DIGITS: u32 = 8;
const PRICE_FRACTION_DIGITS: u32 = 2;

#[derive(Clone, Debug, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Good {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub stock: i32,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
}

impl Entity for Good {
    const TABLE: &'static str = "good";
    const COLUMNS: &'static [&'static str] = &["name", PRICE_COLUMN, "description", "stock"];

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
            self.price.into(),
            self.description.clone().into(),
            self.stock.into(),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGood {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub stock: Option<i32>,
}

impl Validate for CreateGood {
    fn check(&self, v: &mut Violations) {
        v.required("name", &self.name);
        v.not_blank("name", self.name.as_deref());
        v.length("name", self.name.as_deref(), 1, 100);
        v.required("price", &self.price);
        v.at_least("price", self.price.as_ref(), Decimal::ZERO);
        v.digits("price", self.price.as_ref(), PRICE_INTEGER_DIGITS, PRICE_FRACTION_DIGITS);
        v.length("description", self.description.as_deref(), 0, 500);
        v.required("stock", &self.stock);
        v.at_least("stock", self.stock.as_ref(), 0);
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGood {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub price: Patch<Decimal>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub stock: Patch<i32>,
}

impl Validate for UpdateGood {
    fn check(&self, v: &mut Violations) {
        v.length("name", self.name.as_option().map(String::as_str), 1, 100);
        v.at_least("price", self.price.as_option(), Decimal::ZERO);
        v.digits("price", self.price.as_option(), PRICE_INTEGER_DIGITS, PRICE_FRACTION_DIGITS);
        v.length("description", self.description.as_option().map(String::as_str), 0, 500);
        v.at_least("stock", self.stock.as_option(), 0);
    }
}

impl Merge<Good> for UpdateGood {
    fn merge_into(self, good: &mut Good) -> MergeOutcome {
        let mut out = MergeOutcome::default();
        out.record("name", self.name.apply(&mut good.name));
        out.record("price", self.price.apply(&mut good.price));
        out.record("description", self.description.apply_opt(&mut good.description));
        out.record("stock", self.stock.apply(&mut good.stock));
        out
    }
}

impl Resource for Good {
    const LABEL: &'static str = "good";
    const SEARCH_COLUMN: &'static str = "name";

    type Create = CreateGood;
    type Update = UpdateGood;

    fn search_order() -> Vec<Order> {
        vec![Order::desc(CREATE_TIME_COLUMN), Order::desc(ID_COLUMN)]
    }

    fn from_create(req: CreateGood) -> Self {
        Good {
            id: 0,
            name: req.name.unwrap_or_default(),
            price: req.price.unwrap_or_default(),
            description: req.description,
            stock: req.stock.unwrap_or_default(),
            audit: Audit::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen() -> Good {
        Good {
            id: 7,
            name: "Pen".into(),
            price: Decimal::new(150, 2),
            description: Some("blue ink".into()),
            stock: 10,
            audit: Audit::default(),
        }
    }

    #[test]
    fn absent_fields_are_preserved() {
        let mut good = pen();
        let patch: UpdateGood = serde_json::from_str(r#"{"price": 2.0}"#).unwrap();
        let out = patch.merge_into(&mut good);
        assert_eq!(out.present(), 1);
        assert_eq!(good.name, "Pen");
        assert_eq!(good.price, Decimal::new(200, 2));
        assert_eq!(good.description.as_deref(), Some("blue ink"));
        assert_eq!(good.stock, 10);
        assert_eq!(good.id, 7);
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut good = pen();
        let out = UpdateGood::default().merge_into(&mut good);
        assert!(out.is_empty());
        assert_eq!(good, pen());
    }

    #[test]
    fn description_can_be_cleared_to_empty() {
        let mut good = pen();
        let patch: UpdateGood = serde_json::from_str(r#"{"description": ""}"#).unwrap();
        patch.merge_into(&mut good);
        assert_eq!(good.description.as_deref(), Some(""));
    }

    #[test]
    fn create_requires_core_fields() {
        let err = CreateGood::default().validate().unwrap_err();
        let msg = err.public_message();
        assert!(msg.contains("name is required"), "{msg}");
        assert!(msg.contains("price is required"), "{msg}");
        assert!(msg.contains("stock is required"), "{msg}");
    }

    #[test]
    fn negative_stock_is_rejected() {
        let req = CreateGood {
            name: Some("Pen".into()),
            price: Some(Decimal::ONE),
            description: None,
            stock: Some(-1),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn price_precision_is_bounded() {
        let create = |price: Decimal| CreateGood {
            name: Some("Pen".into()),
            price: Some(price),
            description: None,
            stock: Some(1),
        };
        assert!(create(Decimal::new(150, 2)).validate().is_ok());
        assert!(create(Decimal::new(9999999999, 2)).validate().is_ok());
        let msg = create(Decimal::new(1555, 3)).validate().unwrap_err().public_message();
        assert!(msg.contains("price must have at most 8 integer digits and 2 decimal places"), "{msg}");
        assert!(create(Decimal::new(12345678900, 2)).validate().is_err());

        let patch: UpdateGood = serde_json::from_str(r#"{"price": 9.999}"#).unwrap();
        assert!(patch.validate().is_err());
    }

    #[test]
    fn serializes_camel_case_with_audit_pair() {
        let json = serde_json::to_value(pen()).unwrap();
        assert!(json.get("createTime").is_some());
        assert!(json.get("updateTime").is_some());
        assert_eq!(json["stock"], 10);
    }
}
