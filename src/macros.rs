//! Convenience macros.

/// Build an [`Attributes`](crate::Attributes) map from literal pairs.
///
/// Values can be anything that converts into a `serde_json::Value`, so
/// string and number literals work directly and `serde_json::json!` covers
/// structured values.
///
/// # Examples
///
/// ```
/// use formwork::attrs;
///
/// let attributes = attrs! {
///     "name" => "Ana",
///     "age" => 31,
/// };
///
/// assert_eq!(attributes.len(), 2);
/// assert_eq!(attributes.names(), vec!["name", "age"]);
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::Attributes::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut attributes = $crate::Attributes::new();
        $(
            attributes.set($name, $value);
        )+
        attributes
    }};
}
