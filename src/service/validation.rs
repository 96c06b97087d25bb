//! Boundary validation of request bodies. Every violated rule is collected, not just the first.

use crate::error::AppError;
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt::Display;
use std::sync::OnceLock;

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("static email pattern"))
}

pub trait Validate {
    fn check(&self, violations: &mut Violations);

    fn validate(&self) -> Result<(), AppError> {
        let mut violations = Violations::default();
        self.check(&mut violations);
        violations.into_result()
    }
}

/// Collected rule violations, one message each, in check order.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn push(&mut self, message: String) {
        self.0.push(message);
    }

    pub fn required<T>(&mut self, field: &str, value: &Option<T>) {
        if value.is_none() {
            self.push(format!("{} is required", field));
        }
    }

    pub fn not_blank(&mut self, field: &str, value: Option<&str>) {
        if let Some(s) = value {
            if s.trim().is_empty() {
                self.push(format!("{} must not be blank", field));
            }
        }
    }

    /// Length in characters, inclusive bounds. A `min` of 0 only enforces the maximum.
    pub fn length(&mut self, field: &str, value: Option<&str>, min: usize, max: usize) {
        let Some(s) = value else { return };
        let n = s.chars().count();
        if n < min || n > max {
            if min == 0 {
                self.push(format!("{} must be at most {} characters", field, max));
            } else {
                self.push(format!(
                    "{} must be between {} and {} characters",
                    field, min, max
                ));
            }
        }
    }

    pub fn at_least<N: PartialOrd + Display>(&mut self, field: &str, value: Option<&N>, min: N) {
        if let Some(v) = value {
            if *v < min {
                self.push(format!("{} must be at least {}", field, min));
            }
        }
    }

    /// At most `integer` digits before the point and `fraction` after it; trailing zeros don't count.
    pub fn digits(&mut self, field: &str, value: Option<&Decimal>, integer: u32, fraction: u32) {
        let Some(d) = value else { return };
        let limit = Decimal::from(10u64.pow(integer));
        if d.abs().trunc() >= limit || d.normalize().scale() > fraction {
            self.push(format!(
                "{} must have at most {} integer digits and {} decimal places",
                field, integer, fraction
            ));
        }
    }

    pub fn pattern(&mut self, field: &str, value: Option<&str>, re: &Regex) {
        if let Some(s) = value {
            if !re.is_match(s) {
                self.push(format!("{} has an invalid format", field));
            }
        }
    }

    /// Empty strings pass, so an optional address can be cleared.
    pub fn email(&mut self, field: &str, value: Option<&str>) {
        if let Some(s) = value {
            if !s.is_empty() && !email_pattern().is_match(s) {
                self.push(format!("{} must be a valid email address", field));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut v = Violations::default();
        v.length("name", Some("笔记本"), 1, 3);
        assert!(v.is_empty());
        v.length("name", Some("笔记本子"), 1, 3);
        assert!(!v.is_empty());
    }

    #[test]
    fn absent_values_skip_shape_rules() {
        let mut v = Violations::default();
        v.length("name", None, 1, 3);
        v.at_least("stock", None::<&i32>, 0);
        v.email("email", None);
        v.not_blank("name", None);
        assert!(v.into_result().is_ok());
    }

    #[test]
    fn digits_bound_both_sides_of_the_point() {
        let mut v = Violations::default();
        v.digits("price", Some(&Decimal::new(9999999999, 2)), 8, 2);
        v.digits("price", Some(&Decimal::new(1500, 3)), 8, 2);
        assert!(v.is_empty());

        v.digits("price", Some(&Decimal::new(1555, 3)), 8, 2);
        v.digits("price", Some(&Decimal::new(12345678900, 2)), 8, 2);
        match v.into_result() {
            Err(AppError::Validation(msgs)) => assert_eq!(msgs.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn violations_are_collected_in_order() {
        let mut v = Violations::default();
        v.required::<String>("name", &None);
        v.at_least("stock", Some(&-3), 0);
        match v.into_result() {
            Err(AppError::Validation(msgs)) => {
                assert_eq!(msgs, vec!["name is required", "stock must be at least 0"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
