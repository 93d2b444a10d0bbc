//! [`juniper`] support of the types having a textual form.

use std::{any, fmt, str::FromStr};

use juniper::{InputValue, ScalarValue, Value};

/// Helper to use in `#[graphql_scalar(with = ..)]` attribute of the string
/// scalars represented by [`Display`] and [`FromStr`] impls.
///
/// [`Display`]: fmt::Display
#[derive(Clone, Copy, Debug)]
pub(crate) struct Textual;

impl Textual {
    /// Outputs the provided `value` as a string scalar.
    pub(crate) fn to_output<T, S>(value: &T) -> Value<S>
    where
        T: fmt::Display,
        S: ScalarValue,
    {
        Value::scalar(value.to_string())
    }

    /// Parses a `T` out of a string scalar `input`.
    pub(crate) fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        T: FromStr,
        T::Err: fmt::Display,
        S: ScalarValue,
    {
        let name = any::type_name::<T>().rsplit("::").next().unwrap_or("?");
        let Some(s) = input.as_string_value() else {
            return Err(format!(
                "Cannot parse `{name}` input scalar from non-string value: \
                 {input}",
            ));
        };
        s.parse()
            .map_err(|e| format!("Cannot parse `{name}` input scalar: {e}"))
    }
}
