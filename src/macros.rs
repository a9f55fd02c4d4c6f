//! Macros shared by the record types

/// Status enums as the backend spells them.
///
/// Generates `as_str`, `Display`, a case-insensitive `FromStr` that fails
/// with `LedgerError::InvalidStatus`, and a public slice constant listing
/// every accepted value in declaration order.
///
/// ```rust,ignore
/// status_enum!(ConsentStatus, VALID_CONSENT_STATUSES, {
///     Pending => "pending",
///     Active => "active",
/// });
/// ```
#[macro_export]
macro_rules! status_enum {
    (
        $enum_name:ident,
        $values:ident,
        { $($variant:ident => $str:literal),+ $(,)? }
    ) => {
        /// Every accepted value, in declaration order
        pub const $values: &[&str] = &[$($str),+];

        impl $enum_name {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($enum_name::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok($enum_name::$variant),)+
                    _ => Err($crate::error::LedgerError::InvalidStatus(s.to_string())),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Shade {
        Light,
        Dark,
    }

    status_enum!(Shade, SHADES, {
        Light => "light",
        Dark => "dark",
    });

    #[test]
    fn test_values_follow_declaration_order() {
        assert_eq!(SHADES, &["light", "dark"]);
        assert_eq!(Shade::Dark.as_str(), "dark");
    }

    #[test]
    fn test_parse_ignores_case_and_padding() {
        assert_eq!(" DARK ".parse::<Shade>().unwrap(), Shade::Dark);
        assert_eq!(Shade::Light.to_string(), "light");
        let err = "dim".parse::<Shade>().unwrap_err();
        assert_eq!(err.to_string(), "invalid status 'dim'");
    }
}
