pub mod order_reconciler;

// Re-export public API
pub use order_reconciler::{OpenSnapshot, OrderReconciler, FILLED_IMMEDIATELY};
