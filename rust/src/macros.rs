//! Macros shared by the collection facades.

/// Generates `<name>_key` and `<name>_value` projections of `<name>_entry`
/// lookups that return `Option<(&K, &V)>`.
macro_rules! entry_projections {
    ($($name:ident ( $($arg:ident : $ty:ty),* );)*) => {
        paste::paste! {
            $(
                #[doc = "Key of the [`" $name "_entry`](Self::" $name "_entry)."]
                pub fn [<$name _key>](&self $(, $arg: $ty)*) -> Option<&K> {
                    self.[<$name _entry>]($($arg),*).map(|(key, _)| key)
                }

                #[doc = "Value of the [`" $name "_entry`](Self::" $name "_entry)."]
                pub fn [<$name _value>](&self $(, $arg: $ty)*) -> Option<&V> {
                    self.[<$name _entry>]($($arg),*).map(|(_, value)| value)
                }
            )*
        }
    };
}
