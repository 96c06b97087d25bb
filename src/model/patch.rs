use serde::{Deserialize, Deserializer};

/// One field of a partial update: either absent (keep the stored value) or present with a new value.
///
/// A missing key and an explicit JSON `null` both deserialize to [`Patch::Absent`]; use it with
/// `#[serde(default)]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Present(T),
}

impl<T> Patch<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Patch::Present(v) => Some(v),
            Patch::Absent => None,
        }
    }

    /// Overwrite `slot` when present. Returns whether a value was copied.
    pub fn apply(self, slot: &mut T) -> bool {
        match self {
            Patch::Present(v) => {
                *slot = v;
                true
            }
            Patch::Absent => false,
        }
    }

    /// Same as [`Patch::apply`] for a nullable column.
    pub fn apply_opt(self, slot: &mut Option<T>) -> bool {
        match self {
            Patch::Present(v) => {
                *slot = Some(v);
                true
            }
            Patch::Absent => false,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Present(v),
            None => Patch::Absent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        stock: Patch<i32>,
    }

    #[test]
    fn missing_and_null_are_absent() {
        let p: Body = serde_json::from_str(r#"{"stock": null}"#).unwrap();
        assert_eq!(p.name, Patch::Absent);
        assert_eq!(p.stock, Patch::Absent);
    }

    #[test]
    fn empty_string_is_present() {
        let p: Body = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert_eq!(p.name, Patch::Present(String::new()));
    }

    #[test]
    fn apply_only_overwrites_when_present() {
        let mut stock = 10;
        assert!(!Patch::<i32>::Absent.apply(&mut stock));
        assert_eq!(stock, 10);
        assert!(Patch::Present(0).apply(&mut stock));
        assert_eq!(stock, 0);

        let mut description = None;
        assert!(Patch::Present("blue".to_string()).apply_opt(&mut description));
        assert_eq!(description.as_deref(), Some("blue"));
    }
}
