//! Macros for ergonomic machine construction.

/// Generate a `State` implementation for a unit enum.
///
/// Variant names double as state names; variants listed under `final:`
/// stop the interpreter when reached.
///
/// # Example
///
/// ```
/// use machine_binder::core::State;
/// use machine_binder::state_enum;
///
/// state_enum! {
///     pub enum Upload {
///         Idle,
///         Sending,
///         Done,
///     }
///     final: [Done]
/// }
///
/// assert_eq!(Upload::Sending.name(), "Sending");
/// assert!(Upload::Done.is_final());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
    };
}
