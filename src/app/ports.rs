use async_trait::async_trait;

use crate::domain::{GeoRecord, RecordId, Resolution};
use crate::error::ReporterError;

/// Monitoring collaborator that receives lifecycle notifications from a stage.
///
/// Implementations are shared between stages running on different tasks, so
/// every call must be safe to make concurrently. The stage never reads anything
/// back except failures.
pub trait LifecycleReporter: Send + Sync {
    fn report_element_started(&self, id: &RecordId) -> Result<(), ReporterError>;

    fn report_element_ended(&self, id: &RecordId) -> Result<(), ReporterError>;

    fn report_stage_completed(&self) -> Result<(), ReporterError>;

    fn report_stage_errored(&self) -> Result<(), ReporterError>;
}

/// Strategy that works out the coordinates of a record.
///
/// Return `Resolution::Unresolved` when nothing can be found. Errors are for
/// genuinely exceptional conditions (a failing cache, an unreachable service)
/// and terminate the stage.
#[async_trait]
pub trait CoordinateResolver<R>: Send + Sync {
    async fn resolve(&self, record: &R) -> anyhow::Result<Resolution>;
}

/// Adapts a plain closure into a `CoordinateResolver`
pub struct FnResolver<F> {
    resolve_fn: F,
}

impl<F> FnResolver<F> {
    pub fn new(resolve_fn: F) -> Self {
        Self { resolve_fn }
    }
}

#[async_trait]
impl<R, F> CoordinateResolver<R> for FnResolver<F>
where
    R: GeoRecord,
    F: Fn(&R) -> anyhow::Result<Resolution> + Send + Sync,
{
    async fn resolve(&self, record: &R) -> anyhow::Result<Resolution> {
        (self.resolve_fn)(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, Message};

    #[tokio::test]
    async fn test_fn_resolver_delegates_to_closure() {
        let resolver = FnResolver::new(|message: &Message| -> anyhow::Result<Resolution> {
            Ok(if message.id == 1 {
                Resolution::from(Some((10.0, 20.0)))
            } else {
                Resolution::Unresolved
            })
        });

        let first = resolver.resolve(&Message::new(1)).await.unwrap();
        let second = resolver.resolve(&Message::new(2)).await.unwrap();

        assert_eq!(first, Resolution::Resolved(Coordinates::new(10.0, 20.0)));
        assert_eq!(second, Resolution::Unresolved);
    }

    #[tokio::test]
    async fn test_fn_resolver_propagates_errors() {
        let resolver = FnResolver::new(|_: &Message| -> anyhow::Result<Resolution> {
            Err(anyhow::anyhow!("cache offline"))
        });

        let result = resolver.resolve(&Message::new(1)).await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().to_string(), "cache offline");
    }
}
