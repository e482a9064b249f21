//! Integer-coded enums as they appear on the wire.
//!
//! Every enum declared with [`wire_enum!`] carries a static table mapping
//! each variant to its integer value. Serialization writes the integer;
//! deserialization accepts either an integer or a numeric string.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

/// An enum with a fixed variant <-> integer table.
pub trait WireEnum: Copy + PartialEq + Sized + 'static {
    /// Type name used in error messages.
    const NAME: &'static str;

    fn table() -> &'static [(Self, i32)];

    /// Integer value sent on the wire.
    fn value(self) -> i32 {
        Self::table()
            .iter()
            .find(|(variant, _)| *variant == self)
            .map(|(_, value)| *value)
            .unwrap_or_default()
    }

    fn from_value(value: i32) -> Option<Self> {
        Self::table()
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(variant, _)| *variant)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Int(i64),
    Text(String),
}

impl RawValue {
    fn as_i32(&self) -> Option<i32> {
        match self {
            RawValue::Int(value) => i32::try_from(*value).ok(),
            RawValue::Text(text) => text.trim().parse().ok(),
        }
    }
}

pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: WireEnum,
    S: Serializer,
{
    serializer.serialize_i32(value.value())
}

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: WireEnum,
    D: Deserializer<'de>,
{
    let raw = RawValue::deserialize(deserializer)?;
    raw.as_i32()
        .and_then(T::from_value)
        .ok_or_else(|| D::Error::custom(format!("invalid {} value", T::NAME)))
}

/// Field deserializer mapping unknown or malformed values to `None`.
pub fn lenient<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: WireEnum,
    D: Deserializer<'de>,
{
    let raw: Option<RawValue> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| raw.as_i32()).and_then(T::from_value))
}

/// Declare an integer-coded enum together with its wire table and serde impls.
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::models::wire::WireEnum for $name {
            const NAME: &'static str = stringify!($name);

            fn table() -> &'static [(Self, i32)] {
                const TABLE: &[($name, i32)] = &[$(($name::$variant, $value)),+];
                TABLE
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                $crate::models::wire::serialize(self, serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                $crate::models::wire::deserialize(deserializer)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserAccountStatus;

    #[test]
    fn test_table_is_bidirectional() {
        for (variant, value) in UserAccountStatus::table() {
            assert_eq!(variant.value(), *value);
            assert_eq!(UserAccountStatus::from_value(*value), Some(*variant));
        }
        assert_eq!(UserAccountStatus::from_value(42), None);
    }

    #[test]
    fn test_serialize_as_integer() {
        let json = serde_json::to_string(&UserAccountStatus::Suspended).unwrap();
        assert_eq!(json, "6");
    }

    #[test]
    fn test_deserialize_integer_or_string() {
        let status: UserAccountStatus = serde_json::from_str("2").unwrap();
        assert_eq!(status, UserAccountStatus::Enabled);

        let status: UserAccountStatus = serde_json::from_str("\"4\"").unwrap();
        assert_eq!(status, UserAccountStatus::PendingActivation);

        assert!(serde_json::from_str::<UserAccountStatus>("99").is_err());
    }
}
