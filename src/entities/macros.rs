//! Macros for reducing boilerplate when defining entities

/// Implement [`Entity`](crate::core::entity::Entity) for a record type
///
/// The identity field defaults to `id`.
///
/// # Example
/// ```rust,ignore
/// impl_entity!(Hotel, Hotel);
/// impl_entity!(Customer, Customer, account_id);
/// ```
#[macro_export]
macro_rules! impl_entity {
    ($type:ident, $kind:ident) => {
        $crate::impl_entity!($type, $kind, id);
    };
    ($type:ident, $kind:ident, $id_field:ident) => {
        impl $crate::core::entity::Entity for $type {
            const KIND: $crate::core::entity::EntityKind =
                $crate::core::entity::EntityKind::$kind;

            fn id(&self) -> &str {
                &self.$id_field
            }
        }
    };
}
