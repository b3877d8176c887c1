//! Builder macro for configuration structs.

/// Generate a builder for a configuration type.
///
/// The configuration type must implement `Default`. The macro generates:
/// - a builder struct with every field wrapped in `Option`
/// - a setter per field, accepting `impl Into<T>`
/// - `build()`, which fails if a `required` field was never set and takes
///   `optional` fields from `Default` when unset
/// - `builder()` on the configuration type
///
/// Integer fields need suffixed literals (`5u32`), since `i32` does not
/// convert into the other integer types.
#[allow(unused_macros)]
macro_rules! impl_builder {
    (
        $Config:ident, $Builder:ident {
            required { $( $req_field:ident : $req_ty:ty ),* $(,)? }
            optional { $( $opt_field:ident : $opt_ty:ty ),* $(,)? }
        }
    ) => {
        #[doc = concat!("Builder for [`", stringify!($Config), "`].")]
        #[derive(Debug, Default)]
        pub struct $Builder {
            $( $req_field: Option<$req_ty>, )*
            $( $opt_field: Option<$opt_ty>, )*
        }

        impl $Config {
            pub fn builder() -> $Builder {
                $Builder::default()
            }
        }

        impl $Builder {
            $(
                pub fn $req_field(mut self, value: impl Into<$req_ty>) -> Self {
                    self.$req_field = Some(value.into());
                    self
                }
            )*

            $(
                pub fn $opt_field(mut self, value: impl Into<$opt_ty>) -> Self {
                    self.$opt_field = Some(value.into());
                    self
                }
            )*

            pub fn build(self) -> Result<$Config, $crate::error::BuilderError> {
                let defaults = $Config::default();
                Ok($Config {
                    $(
                        $req_field: self.$req_field.ok_or(
                            $crate::error::BuilderError::MissingRequiredField {
                                builder: stringify!($Builder),
                                field: stringify!($req_field),
                            },
                        )?,
                    )*
                    $( $opt_field: self.$opt_field.unwrap_or(defaults.$opt_field), )*
                })
            }
        }
    };
}

#[allow(unused_imports)]
pub(crate) use impl_builder;
