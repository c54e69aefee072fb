//! Building blocks of one controller session.
//!
//! `SelectionState` writes the `TokenClock`; `RequestCoordinator` reads it
//! when a result arrives. Both live inside one `HistoryController`.

pub mod clock;
pub mod coordinator;
pub mod events;
pub mod export;
pub mod fallback;
pub mod selection;

pub use clock::TokenClock;
pub use coordinator::{Completion, CoordinatorStats, FetchState, RequestCoordinator};
pub use events::{HistoryEvent, HistoryListener, forward_events};
pub use export::ExportBuilder;
pub use fallback::{FallbackSynthesizer, MAX_DEVIATION};
pub use selection::{SelectionState, Window};
