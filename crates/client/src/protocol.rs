//! Writing a color to a coordinate.
//!
//! The API has no upsert. A painter first looks the coordinate up and then, depending on what
//! it found, creates, updates or deletes:
//!
//! | found  | paint  | request            |
//! |--------|--------|--------------------|
//! | no     | color  | create at `(x, y)` |
//! | yes    | color  | update by id       |
//! | yes    | unset  | delete by id       |
//! | no     | unset  | none               |
//!
//! Two painters may both see "no" and both create; the later one gets a conflict.
use std::str::FromStr;

use pixelwall_store::prelude::{HexColor, InvalidColor, Pixel, PixelId};
use tracing::{debug, warn};

use crate::api::PixelApi;
use crate::error::ClientError;

/// Number of read-then-write rounds under [`ConflictPolicy::RefetchAndUpdate`].
const MAX_ATTEMPTS: usize = 3;

/// What to put on a wall block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paint {
    Color(HexColor),
    /// Back to the transparent default.
    Unset,
}

impl Paint {
    pub fn color(&self) -> Option<&HexColor> {
        match self {
            Paint::Color(color) => Some(color),
            Paint::Unset => None,
        }
    }
}

impl FromStr for Paint {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "transparent" | "none" => Ok(Paint::Unset),
            color => color.parse().map(Paint::Color),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteAction {
    Create { x: i64, y: i64, color: HexColor },
    Update { id: PixelId, color: HexColor },
    Delete { id: PixelId },
    Nothing,
}

/// Picks the request that moves `(x, y)` from `existing` to `paint`.
pub fn plan(x: i64, y: i64, existing: Option<&Pixel>, paint: &Paint) -> WriteAction {
    match (existing, paint) {
        (None, Paint::Color(color)) => WriteAction::Create {
            x,
            y,
            color: color.clone(),
        },
        (Some(pixel), Paint::Color(color)) => WriteAction::Update {
            id: pixel.id.clone(),
            color: color.clone(),
        },
        (Some(pixel), Paint::Unset) => WriteAction::Delete {
            id: pixel.id.clone(),
        },
        (None, Paint::Unset) => WriteAction::Nothing,
    }
}

/// How [`paint`] reacts when the coordinate changed between its lookup and its write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Return the conflict to the caller.
    #[default]
    Surface,
    /// Look the coordinate up again and redo the write against what is there now.
    RefetchAndUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintOutcome {
    Created(Pixel),
    Updated(Pixel),
    Deleted,
    /// The coordinate was already unset.
    Unchanged,
}

pub async fn paint<A: PixelApi>(
    api: &A,
    x: i64,
    y: i64,
    paint: &Paint,
    policy: ConflictPolicy,
) -> Result<PaintOutcome, ClientError> {
    let mut attempt = 1;
    loop {
        let existing = api.get(x, y).await?;
        let action = plan(x, y, existing.as_ref(), paint);
        debug!("Painting ({}, {}), attempt {}: {:?}", x, y, attempt, action);

        let result = match action {
            WriteAction::Nothing => return Ok(PaintOutcome::Unchanged),
            WriteAction::Create { x, y, color } => {
                api.create(x, y, &color).await.map(PaintOutcome::Created)
            }
            WriteAction::Update { id, color } => {
                api.update(&id, &color).await.map(PaintOutcome::Updated)
            }
            WriteAction::Delete { id } => api.delete(&id).await.map(|()| PaintOutcome::Deleted),
        };

        let raced = matches!(
            result,
            Err(ClientError::Conflict(_)) | Err(ClientError::NotFound(_))
        );
        if raced && policy == ConflictPolicy::RefetchAndUpdate && attempt < MAX_ATTEMPTS {
            warn!("Pixel ({}, {}) changed under us, looking it up again", x, y);
            attempt += 1;
            continue;
        }
        if let Err(ref e) = result {
            warn!("Painting ({}, {}) failed: {}", x, y, e);
        }
        return result;
    }
}
