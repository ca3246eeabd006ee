//! An [`OptionValue`] is written as a plain JSON bool or number.
use std::fmt::{self, Formatter};

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::OptionValue;

impl Serialize for OptionValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            Self::Bool(switch) => serializer.serialize_bool(switch),
            Self::U64(count) => serializer.serialize_u64(count),
        }
    }
}

impl<'de> Deserialize<'de> for OptionValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SwitchOrCount;

        impl<'de> Visitor<'de> for SwitchOrCount {
            type Value = OptionValue;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("a bool or an unsigned integer")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(OptionValue::Bool(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(OptionValue::U64(v))
            }

            // Self-describing formats may hand out small counts as signed integers.
            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(v)
                    .map(OptionValue::U64)
                    .map_err(|_| E::invalid_type(Unexpected::Signed(v), &self))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Err(E::invalid_type(Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(SwitchOrCount)
    }
}

#[cfg(test)]
mod tests {
    use serde_test::{assert_de_tokens, assert_de_tokens_error, assert_tokens, Token};

    use super::OptionValue;

    #[test]
    fn test_option_value_serde() {
        assert_tokens(&OptionValue::Bool(true), &[Token::Bool(true)]);
        assert_tokens(&OptionValue::U64(123), &[Token::U64(123)]);
        assert_de_tokens(&OptionValue::U64(7), &[Token::I64(7)]);
    }

    #[test]
    fn test_option_value_rejected() {
        assert_de_tokens_error::<OptionValue>(
            &[Token::I64(-456)],
            "invalid type: integer `-456`, expected a bool or an unsigned integer",
        );
        assert_de_tokens_error::<OptionValue>(
            &[Token::Str("Hi")],
            "invalid type: string \"Hi\", expected a bool or an unsigned integer",
        );
    }
}
