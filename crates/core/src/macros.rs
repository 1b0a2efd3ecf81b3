// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros shared by the forge crates.

/// `Display` for enums whose variants render as fixed words.
///
/// Payload-carrying variants are written `Variant(..)`.
///
/// ```ignore
/// crate::simple_display! {
///     JobStatus {
///         Connected => "connected",
///         Building => "building",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident $(( $($ignore:tt)* ))? => $str:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let word = match self {
                    $( Self::$variant $(( $($ignore)* ))? => $str, )+
                };
                f.write_str(word)
            }
        }
    };
}

/// Chained by-value setters, expanded inside an `impl` block.
///
/// `into` setters take `impl Into<T>`, `set` setters take `T`, and
/// `option` setters store `Some(value.into())`.
///
/// ```ignore
/// impl SpawnSpec {
///     forge_core::setters! {
///         set { args: Vec<String> }
///         option { output: PathBuf }
///     }
/// }
/// ```
#[macro_export]
macro_rules! setters {
    (
        $(into { $( $into_field:ident : $into_ty:ty ),* $(,)? })?
        $(set { $( $set_field:ident : $set_ty:ty ),* $(,)? })?
        $(option { $( $opt_field:ident : $opt_ty:ty ),* $(,)? })?
    ) => {
        $($(
            pub fn $into_field(self, value: impl Into<$into_ty>) -> Self {
                Self { $into_field: value.into(), ..self }
            }
        )*)?
        $($(
            pub fn $set_field(self, value: $set_ty) -> Self {
                Self { $set_field: value, ..self }
            }
        )*)?
        $($(
            pub fn $opt_field(self, value: impl Into<$opt_ty>) -> Self {
                Self { $opt_field: Some(value.into()), ..self }
            }
        )*)?
    };
}

/// Test-only builder for a record type with every field defaulted.
///
/// Only compiled with `cfg(test)` or the `test-support` feature.
///
/// ```ignore
/// crate::builder! {
///     pub struct BuildJobBuilder => BuildJob {
///         into { branch: String = "UE3" }
///         set { id: JobId = JobId::new(1) }
///     }
/// }
/// ```
#[macro_export]
macro_rules! builder {
    (
        pub struct $builder:ident => $target:ident {
            into { $( $into_field:ident : $into_ty:ty = $into_default:expr ),* $(,)? }
            set { $( $set_field:ident : $set_ty:ty = $set_default:expr ),* $(,)? }
        }
    ) => {
        #[cfg(any(test, feature = "test-support"))]
        pub struct $builder {
            $( $into_field: $into_ty, )*
            $( $set_field: $set_ty, )*
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $builder {
            $crate::setters! {
                into { $( $into_field: $into_ty ),* }
                set { $( $set_field: $set_ty ),* }
            }

            pub fn build(self) -> $target {
                $target {
                    $( $into_field: self.$into_field, )*
                    $( $set_field: self.$set_field, )*
                }
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $target {
            pub fn builder() -> $builder {
                $builder {
                    $( $into_field: $into_default.into(), )*
                    $( $set_field: $set_default, )*
                }
            }
        }
    };
}
