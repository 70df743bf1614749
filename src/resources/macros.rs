/// Generates a partial-update ("patch") struct for a settings group.
///
/// Every listed field becomes `Option<T>` in the patch. `apply_to` writes the
/// present fields into the target and leaves the rest untouched, so the
/// settings struct stays the single source of truth for defaults.
///
/// ```rust,ignore
/// define_settings_patch!(
///     /// Partial bloom settings.
///     BloomPatch for BloomSettings {
///         enabled: bool,
///         levels: u32,
///     }
/// );
/// ```
#[macro_export]
macro_rules! define_settings_patch {
    (
        $(#[$meta:meta])*
        $patch:ident for $target:ty {
            $( $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct $patch {
            $(
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl $patch {
            /// Writes every present field into `target`.
            pub fn apply_to(&self, target: &mut $target) {
                $(
                    if let Some(value) = self.$field {
                        target.$field = value;
                    }
                )*
            }

            /// Returns `true` when the patch carries no field at all.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                true $( && self.$field.is_none() )*
            }
        }
    };
}
