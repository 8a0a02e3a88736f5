//! Crate-internal macros.

/// Let handlers pull one `AppState` field with `State<T>`.
///
/// `impl_from_ref!(Arc<NoteService>, notes)` clones `state.notes`.
#[macro_export]
macro_rules! impl_from_ref {
    ($type:ty, $field:ident) => {
        impl axum::extract::FromRef<$crate::state::AppState> for $type {
            fn from_ref(state: &$crate::state::AppState) -> Self {
                state.$field.clone()
            }
        }
    };
}
