//! Builder generator for configuration structs.

/// Generate a field-by-field builder for a plain configuration struct.
///
/// ```text
/// impl_builder! {
///     Config => ConfigBuilder {
///         size: i64,                 // must be set, or build() fails
///     } defaults {
///         verbose: bool = false,     // falls back to the given expression
///     } maybe {
///         limit: i64,                // the struct field is Option<i64>
///     }
/// }
/// ```
///
/// Setters take the field type by value; `maybe` setters take the inner
/// type and wrap it in `Some`.
macro_rules! impl_builder {
    (
        $(#[$meta:meta])*
        $Config:ident => $Builder:ident {
            $( $field:ident : $ty:ty ),* $(,)?
        } defaults {
            $( $defaulted:ident : $defaulted_ty:ty = $default:expr ),* $(,)?
        } maybe {
            $( $maybe:ident : $maybe_ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone)]
        pub struct $Builder {
            $( $field: Option<$ty>, )*
            $( $defaulted: Option<$defaulted_ty>, )*
            $( $maybe: Option<$maybe_ty>, )*
        }

        impl $Config {
            /// Start building a configuration field by field.
            pub fn builder() -> $Builder {
                $Builder::default()
            }
        }

        impl $Builder {
            $(
                pub fn $field(mut self, value: $ty) -> Self {
                    self.$field = Some(value);
                    self
                }
            )*
            $(
                pub fn $defaulted(mut self, value: $defaulted_ty) -> Self {
                    self.$defaulted = Some(value);
                    self
                }
            )*
            $(
                pub fn $maybe(mut self, value: $maybe_ty) -> Self {
                    self.$maybe = Some(value);
                    self
                }
            )*

            pub fn build(self) -> Result<$Config, $crate::error::BuilderError> {
                Ok($Config {
                    $(
                        $field: self.$field.ok_or($crate::error::BuilderError::MissingRequiredField {
                            builder: stringify!($Builder),
                            field: stringify!($field),
                        })?,
                    )*
                    $( $defaulted: self.$defaulted.unwrap_or_else(|| $default), )*
                    $( $maybe: self.$maybe, )*
                })
            }
        }
    };
}

pub(crate) use impl_builder;
