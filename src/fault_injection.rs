//! Scripted failures for graphics operations.
//!
//! A [`FaultPlan`] is owned by the context it sabotages, so concurrent tests
//! never see each other's faults.

use ahash::AHashMap;

use crate::BenchError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    CreateBuffer,
    UploadData,
    CompileShader,
    LinkProgram,
    DrawBatch,
    AwaitIdle,
    ResetState,
    /// The context is lost when this point fires.
    ContextLoss,
}

impl FaultPoint {
    fn error(self) -> BenchError {
        let what = format!("{self:?}");
        match self {
            FaultPoint::CreateBuffer
            | FaultPoint::UploadData
            | FaultPoint::CompileShader
            | FaultPoint::LinkProgram => BenchError::resource(format!("fault injected: {what}")),
            FaultPoint::ContextLoss => {
                BenchError::context_unavailable(format!("fault injected: {what}"))
            }
            FaultPoint::DrawBatch | FaultPoint::AwaitIdle | FaultPoint::ResetState => {
                BenchError::fault_injection(what)
            }
        }
    }
}

#[derive(Clone, Debug)]
struct FaultEntry {
    skip: usize,
    remaining: usize,
}

#[derive(Clone, Debug, Default)]
pub struct FaultPlan {
    entries: AHashMap<FaultPoint, FaultEntry>,
}

impl FaultPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Fails the next `failures` calls through `point`.
    pub fn configure(&mut self, point: FaultPoint, failures: usize) {
        self.configure_after(point, 0, failures);
    }

    /// Lets `skip` calls through `point` succeed, then fails the next `failures`.
    pub fn configure_after(&mut self, point: FaultPoint, skip: usize, failures: usize) {
        if failures == 0 {
            self.entries.remove(&point);
        } else {
            self.entries.insert(
                point,
                FaultEntry {
                    skip,
                    remaining: failures,
                },
            );
        }
    }

    pub fn is_armed(&self, point: FaultPoint) -> bool {
        self.entries.contains_key(&point)
    }

    pub(crate) fn check(&mut self, point: FaultPoint) -> Result<(), BenchError> {
        let Some(entry) = self.entries.get_mut(&point) else {
            return Ok(());
        };
        if entry.skip > 0 {
            entry.skip -= 1;
            return Ok(());
        }
        entry.remaining -= 1;
        if entry.remaining == 0 {
            self.entries.remove(&point);
        }
        Err(point.error())
    }
}
