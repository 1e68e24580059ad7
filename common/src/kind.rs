//! Macros for defining closed sets of kinds.

use derive_more::{Display, Error};

/// Macro for defining a closed kind enum.
///
/// Every variant has a stable numeric code (used for storage) and a
/// human-readable label (used for display and on the wire).
///
/// # Example
///
/// ```rust
/// # use common::define_kind;
///
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube = 1 as "Cube",
///
///         #[doc = "A rounded sphere"]
///         RoundSphere = 2 as "Round Sphere",
///     }
/// }
///
/// assert_eq!(Kind::RoundSphere.to_string(), "Round Sphere");
/// assert_eq!("Cube".parse::<Kind>(), Ok(Kind::Cube));
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:literal as $label:literal
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            Eq,
            Hash,
            PartialEq,
        )]
        #[doc = $doc]
        #[repr(u8)]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant = $value,
            )*
        }

        impl $name {
            /// All the variants of this kind, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }

            /// Returns the human-readable label of this kind.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $label,
                    )*
                }
            }

            /// Looks up a kind by its human-readable label.
            #[must_use]
            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $(
                        $label => Some(Self::$variant),
                    )*
                    _ => None,
                }
            }

            /// Looks up a kind by its [`u8`] representation.
            #[must_use]
            pub fn from_u8(value: u8) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.u8() == value)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(
                &self,
                f: &mut ::core::fmt::Formatter<'_>,
            ) -> ::core::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::UnknownKind;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_label(s).ok_or_else(|| $crate::UnknownKind {
                    kind: ::core::stringify!($name),
                    value: s.to_owned(),
                })
            }
        }

        impl $crate::private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::private::serde::Serializer,
            {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> $crate::private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::private::serde::Deserializer<'de>,
            {
                use $crate::private::serde::de::Error as _;

                let label = <::std::string::String as
                    $crate::private::serde::Deserialize<'de>>::deserialize(
                        deserializer,
                    )?;
                label.parse().map_err(D::Error::custom)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(INT2);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &'a [u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                let v = u8::try_from(
                    <i16 as $crate::private::postgres_types::FromSql<'a>>
                        ::from_sql(ty, raw)?,
                )?;
                Self::from_u8(v).ok_or_else(|| ::std::format!(
                    "invalid `{}` value: {v}",
                    ::core::stringify!($name),
                ).into())
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
                <i16 as $crate::private::postgres_types::ToSql>::to_sql(
                    &i16::from(self.u8()),
                    ty,
                    w,
                )
            }
        }
    };
}

/// Error of parsing a kind from a label outside of its declared set.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display("`{value}` is not a valid `{kind}`")]
pub struct UnknownKind {
    /// Name of the kind being parsed.
    pub kind: &'static str,

    /// Rejected value.
    pub value: String,
}

#[cfg(test)]
#[expect(unreachable_pub, reason = "macro expansion")]
mod spec {
    define_kind! {
        #[doc = "Kind used in tests."]
        enum Fruit {
            #[doc = "Apple."]
            Apple = 1 as "Apple",

            #[doc = "Dragon fruit."]
            DragonFruit = 2 as "Dragon Fruit",
        }
    }

    #[test]
    fn uses_labels_for_display_and_parsing() {
        assert_eq!(Fruit::DragonFruit.to_string(), "Dragon Fruit");
        assert_eq!("Apple".parse::<Fruit>(), Ok(Fruit::Apple));
        assert_eq!("Dragon Fruit".parse::<Fruit>(), Ok(Fruit::DragonFruit));
    }

    #[test]
    fn rejects_values_outside_of_set() {
        let err = "DragonFruit".parse::<Fruit>().unwrap_err();
        assert_eq!(err.kind, "Fruit");
        assert_eq!(err.value, "DragonFruit");
        assert_eq!(
            err.to_string(),
            "`DragonFruit` is not a valid `Fruit`",
        );
    }

    #[test]
    fn round_trips_numeric_codes() {
        assert_eq!(Fruit::from_u8(2), Some(Fruit::DragonFruit));
        assert_eq!(Fruit::from_u8(7), None);
        assert_eq!(Fruit::Apple.u8(), 1);
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&Fruit::DragonFruit).unwrap(),
            r#""Dragon Fruit""#,
        );
        assert_eq!(
            serde_json::from_str::<Fruit>(r#""Apple""#).unwrap(),
            Fruit::Apple,
        );
        assert!(serde_json::from_str::<Fruit>(r#""Pear""#).is_err());
    }
}
