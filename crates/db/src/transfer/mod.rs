//! The two transfer strategies.
//!
//! - [`PessimisticTransfer`] locks both rows and moves the amount inside one
//!   serializable unit of work. Concurrent transfers over the same accounts
//!   queue behind each other.
//! - [`OptimisticTransfer`] reads without locks, then writes both rows with a
//!   version check. A concurrent writer makes it fail with `Conflict`.

mod optimistic;
mod pessimistic;

pub use optimistic::{OptimisticTransfer, TransferSnapshot};
pub use pessimistic::PessimisticTransfer;
