use std::sync::Arc;

use crate::config::StageDescriptor;
use crate::errors::ConnectError;
use crate::traits::RemoteMethod;

/// Resolves a stage descriptor into a callable remote method.
pub trait MethodConnector: Send + Sync {
    fn connect(&self, descriptor: &StageDescriptor) -> Result<Arc<dyn RemoteMethod>, ConnectError>;
}
