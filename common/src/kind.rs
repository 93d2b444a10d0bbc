//! Macros for defining kind enums.

/// Defines a fieldless enum of kinds (statuses, notification kinds), each
/// variant having an explicit numeric code.
///
/// The code is what gets stored: as `INT2` in Postgres (with the `postgres`
/// feature). The textual `SCREAMING_SNAKE_CASE` form is used by [`Display`]
/// and [`FromStr`].
///
/// The `strum` derives resolve `::strum`, so the crate invoking this macro
/// must depend on `strum` directly.
///
/// # Example
///
/// ```rust
/// # use common::define_kind;
///
/// define_kind! {
///     #[doc = "Size of a dog."]
///     enum Size {
///         #[doc = "Fits on a lap."]
///         Small = 1,
///
///         #[doc = "Doesn't."]
///         Large = 2,
///     }
/// }
///
/// assert_eq!(Size::from_code(Size::Large.code()), Some(Size::Large));
/// assert_eq!(Size::Small.to_string(), "SMALL");
/// ```
///
/// [`Display`]: std::fmt::Display
/// [`FromStr`]: std::str::FromStr
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $code:literal
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            PartialEq,
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant = $code,
            )*
        }

        impl $name {
            /// Returns the numeric code of this kind.
            #[must_use]
            pub const fn code(self) -> u8 {
                self as u8
            }

            /// Looks up the kind having the provided numeric `code`.
            #[must_use]
            pub const fn from_code(code: u8) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )*
                    _ => None,
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(INT2);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &[u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                let code = u8::try_from(i16::from_sql(ty, raw)?)?;
                Self::from_code(code).ok_or_else(|| {
                    ::std::format!(
                        "unknown `{}` code: {code}",
                        ::core::stringify!($name),
                    )
                    .into()
                })
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(INT2);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                i16::from(self.code()).to_sql(ty, w)
            }
        }
    };
}
