//! Shared decode path for status enumerations.
//!
//! The upstream clients send status values either as numeric codes or as
//! free-text strings; both forms canonicalize to the enum and serialize back
//! as the SCREAMING_CASE string.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, Visitor};

pub(crate) trait StatusEnum: Copy {
    const KIND: &'static str;

    fn from_code(code: i64) -> Option<Self>;
    fn parse(value: &str) -> Option<Self>;
    fn as_str(self) -> &'static str;
}

pub(crate) fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: StatusEnum,
{
    struct StatusVisitor<T>(PhantomData<T>);

    impl<'de, T: StatusEnum> Visitor<'de> for StatusVisitor<T> {
        type Value = T;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a {} status name or numeric code", T::KIND)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<T, E> {
            T::parse(value).ok_or_else(|| {
                E::custom(format!("unknown {} status {:?}", T::KIND, value))
            })
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<T, E> {
            T::from_code(value).ok_or_else(|| {
                E::custom(format!("unknown {} status code {}", T::KIND, value))
            })
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<T, E> {
            let code = i64::try_from(value).map_err(|_| {
                E::custom(format!("unknown {} status code {}", T::KIND, value))
            })?;
            self.visit_i64(code)
        }
    }

    deserializer.deserialize_any(StatusVisitor(PhantomData))
}
