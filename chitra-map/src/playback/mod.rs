//! Playback driving.
//!
//! ```text
//! Player ──timer──▶ MapView::step ──▶ UpdateEngine::update
//!                        ▲                    │
//!                        └── ChangeEvent ◀────┘
//!                        │
//!                        ▼
//!                     Repaint ──▶ viewport::render
//! ```

mod player;
mod speed;
mod view;

pub use player::{PlaybackSummary, Player};
pub use speed::{PlaybackSpeed, STEP_DELAYS_MS};
pub use view::{MapView, ViewMode};
