use super::{Audit, Entity, Patch, CREATE_TIME_COLUMN, ID_COLUMN};
use crate::service::{Merge, MergeOutcome, Resource, UniqueKey, Validate, Violations};
use crate::sql::FieldValue;
use crate::store::Order;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::sync::OnceLock;

pub const USERNAME_COLUMN: &str = "username";
pub const ROLE_COLUMN: &str = "role";
pub const STATUS_COLUMN: &str = "status";

pub const DEFAULT_STATUS: i32 = 1;
pub const DEFAULT_ROLE: &str = "user";

/// Mainland mobile number: 11 digits starting with 13-19.
fn phone_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^1[3-9]\d{9}$").expect("static phone pattern"))
}

#[derive(Clone, Debug, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Stored as given; never part of a response.
    #[serde(skip_serializing)]
    pub password: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub status: i32,
    pub role: Option<String>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
}

impl Entity for User {
    const TABLE: &'static str = "user";
    const COLUMNS: &'static [&'static str] = &[
        USERNAME_COLUMN,
        "password",
        "email",
        "phone",
        "nickname",
        "avatar",
        STATUS_COLUMN,
        ROLE_COLUMN,
    ];

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
            self.username.clone().into(),
            self.password.clone().into(),
            self.email.clone().into(),
            self.phone.clone().into(),
            self.nickname.clone().into(),
            self.avatar.clone().into(),
            self.status.into(),
            self.role.clone().into(),
        ]
    }
}

fn username_key(username: &str) -> UniqueKey {
    UniqueKey {
        column: USERNAME_COLUMN,
        label: "username",
        value: FieldValue::Text(username.to_string()),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<i32>,
    pub role: Option<String>,
}

impl Validate for CreateUser {
    fn check(&self, v: &mut Violations) {
        v.required("username", &self.username);
        v.not_blank("username", self.username.as_deref());
        v.length("username", self.username.as_deref(), 3, 30);
        v.required("password", &self.password);
        v.not_blank("password", self.password.as_deref());
        v.length("password", self.password.as_deref(), 6, 100);
        v.email("email", self.email.as_deref());
        v.length("email", self.email.as_deref(), 0, 100);
        v.pattern("phone", self.phone.as_deref(), phone_pattern());
        v.length("nickname", self.nickname.as_deref(), 0, 50);
        v.length("avatar", self.avatar.as_deref(), 0, 500);
        v.length("role", self.role.as_deref(), 0, 20);
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(default)]
    pub username: Patch<String>,
    #[serde(default)]
    pub password: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub phone: Patch<String>,
    #[serde(default)]
    pub nickname: Patch<String>,
    #[serde(default)]
    pub avatar: Patch<String>,
    #[serde(default)]
    pub status: Patch<i32>,
    #[serde(default)]
    pub role: Patch<String>,
}

impl Validate for UpdateUser {
    fn check(&self, v: &mut Violations) {
        fn s(p: &Patch<String>) -> Option<&str> {
            p.as_option().map(String::as_str)
        }
        v.length("username", s(&self.username), 3, 30);
        v.length("password", s(&self.password), 6, 100);
        v.email("email", s(&self.email));
        v.length("email", s(&self.email), 0, 100);
        v.pattern("phone", s(&self.phone), phone_pattern());
        v.length("nickname", s(&self.nickname), 0, 50);
        v.length("avatar", s(&self.avatar), 0, 500);
        v.length("role", s(&self.role), 0, 20);
    }
}

impl Merge<User> for UpdateUser {
    fn merge_into(self, user: &mut User) -> MergeOutcome {
        let mut out = MergeOutcome::default();
        out.record("username", self.username.apply(&mut user.username));
        out.record("password", self.password.apply(&mut user.password));
        out.record("email", self.email.apply_opt(&mut user.email));
        out.record("phone", self.phone.apply_opt(&mut user.phone));
        out.record("nickname", self.nickname.apply_opt(&mut user.nickname));
        out.record("avatar", self.avatar.apply_opt(&mut user.avatar));
        out.record("status", self.status.apply(&mut user.status));
        out.record("role", self.role.apply_opt(&mut user.role));
        out
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        self.username
            .as_option()
            .map(String::as_str)
            .map(username_key)
            .into_iter()
            .collect()
    }
}

impl Resource for User {
    const LABEL: &'static str = "user";
    const SEARCH_COLUMN: &'static str = USERNAME_COLUMN;

    type Create = CreateUser;
    type Update = UpdateUser;

    fn search_order() -> Vec<Order> {
        vec![Order::desc(CREATE_TIME_COLUMN), Order::desc(ID_COLUMN)]
    }

    fn from_create(req: CreateUser) -> Self {
        User {
            id: 0,
            username: req.username.unwrap_or_default(),
            password: req.password.unwrap_or_default(),
            email: req.email,
            phone: req.phone,
            nickname: req.nickname,
            avatar: req.avatar,
            status: req.status.unwrap_or(DEFAULT_STATUS),
            role: req.role.or_else(|| Some(DEFAULT_ROLE.to_string())),
            audit: Audit::default(),
        }
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![username_key(&self.username)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> CreateUser {
        CreateUser {
            username: Some("alice".into()),
            password: Some("secret1".into()),
            ..CreateUser::default()
        }
    }

    #[test]
    fn create_fills_defaults() {
        let user = User::from_create(alice());
        assert_eq!(user.status, DEFAULT_STATUS);
        assert_eq!(user.role.as_deref(), Some(DEFAULT_ROLE));
        assert_eq!(user.unique_keys()[0].value, FieldValue::Text("alice".into()));
    }

    #[test]
    fn password_is_never_serialized() {
        let json = serde_json::to_value(User::from_create(alice())).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn phone_and_email_shapes_are_checked() {
        let req = CreateUser {
            phone: Some("12345".into()),
            email: Some("not-an-email".into()),
            ..alice()
        };
        let msg = req.validate().unwrap_err().public_message();
        assert!(msg.contains("phone has an invalid format"), "{msg}");
        assert!(msg.contains("email must be a valid email address"), "{msg}");

        let ok = CreateUser {
            phone: Some("13812345678".into()),
            email: Some("alice@example.com".into()),
            ..alice()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn only_present_username_is_rechecked() {
        let patch: UpdateUser = serde_json::from_str(r#"{"nickname": "Al"}"#).unwrap();
        assert!(patch.unique_keys().is_empty());
        let patch: UpdateUser = serde_json::from_str(r#"{"username": "bob"}"#).unwrap();
        assert_eq!(patch.unique_keys().len(), 1);
    }

    #[test]
    fn short_username_is_rejected() {
        let req = CreateUser {
            username: Some("al".into()),
            ..alice()
        };
        let msg = req.validate().unwrap_err().public_message();
        assert!(msg.contains("username must be between 3 and 30 characters"), "{msg}");
    }

    #[test]
    fn update_checks_only_present_fields() {
        let patch: UpdateUser =
            serde_json::from_str(r#"{"username": "al", "phone": "12345"}"#).unwrap();
        let msg = patch.validate().unwrap_err().public_message();
        assert!(msg.contains("username must be between 3 and 30 characters"), "{msg}");
        assert!(msg.contains("phone has an invalid format"), "{msg}");

        let patch: UpdateUser = serde_json::from_str(r#"{"nickname": "Al"}"#).unwrap();
        assert!(patch.validate().is_ok());
    }
}
