use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::debug;

use crate::state::ProgressView;

pub const STALE_SELECTIONS_TOTAL: &str = "workout_progress_stale_selections_total";

/// Generation token handed out when a selection starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionTicket {
    generation: u64,
}

impl SelectionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Tracks the newest workout-type selection and the view currently on display.
///
/// In-flight work is never cancelled; a result is simply dropped when a newer
/// selection was started before it finished.
#[derive(Clone, Default)]
pub struct SelectionService {
    generation: Arc<AtomicU64>,
    display: Arc<Mutex<Option<ProgressView>>>,
}

impl SelectionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new selection, superseding every earlier one.
    pub fn begin(&self) -> SelectionTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        SelectionTicket { generation }
    }

    pub fn is_current(&self, ticket: SelectionTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Put `view` on display if `ticket` is still the newest selection.
    ///
    /// Returns the view back when it was published, `None` when it was stale.
    pub async fn publish(&self, ticket: SelectionTicket, view: ProgressView) -> Option<ProgressView> {
        let mut display = self.display.lock().await;
        // Checked under the lock so two completions cannot interleave.
        if !self.is_current(ticket) {
            debug!(
                generation = ticket.generation,
                key = %view.workout_type,
                "discarding stale selection result"
            );
            metrics::counter!(STALE_SELECTIONS_TOTAL).increment(1);
            return None;
        }
        *display = Some(view.clone());
        Some(view)
    }

    pub async fn current_view(&self) -> Option<ProgressView> {
        self.display.lock().await.clone()
    }
}
