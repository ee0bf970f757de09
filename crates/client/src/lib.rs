//! Client side of the shared pixel wall: HTTP access to the pixel API, the read-then-write
//! painting protocol and polling synchronization into immutable wall snapshots.
pub mod api;
pub mod error;
pub mod protocol;
pub mod snapshot;
pub mod sync;

pub mod prelude {
    pub use crate::api::{PixelApi, WallClient};
    pub use crate::error::ClientError;
    pub use crate::protocol::{ConflictPolicy, Paint, PaintOutcome, WriteAction, paint, plan};
    pub use crate::snapshot::{Grid, WallSnapshot, render_text};
    pub use crate::sync::{PollingSynchronizer, WallSynchronizer};
}
