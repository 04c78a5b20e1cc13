//! Events flowing into the game and effects flowing out to the host.

use std::fmt;

use crate::assessment::{AssessmentError, AssessmentKind, AssessmentResult};
use crate::input::Key;

/// Identity of one assessment request. Issued monotonically by the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentRequest {
    pub id: RequestId,
    pub kind: AssessmentKind,
}

/// The outcome of an assessment request, routed back as an ordinary event.
#[derive(Debug)]
pub struct Completion {
    pub id: RequestId,
    pub outcome: Result<AssessmentResult, AssessmentError>,
}

#[derive(Debug)]
pub enum Event {
    Key(Key),
    Resize { width: u16, height: u16 },
    /// Periodic redraw while idle; advances spinners.
    Tick,
    AssessmentCompleted(Completion),
}

/// Work the host must perform on the game's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the request concurrently and feed the completion back.
    Assess(AssessmentRequest),
    Quit,
}
