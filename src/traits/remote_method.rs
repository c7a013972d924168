use async_trait::async_trait;
use futures::stream::BoxStream;
use tonic::{Code, Status};

use crate::message::Message;

/// Responses of one server-streaming call. The stream ending is the
/// completion signal; an `Err` item ends it with a failure.
pub type ResponseStream = BoxStream<'static, Result<Message, Status>>;

/// A remote method a stage is bound to.
///
/// Implementations only move messages; the stage decides what a failure
/// means through [`RemoteMethod::is_unavailable`].
#[async_trait]
pub trait RemoteMethod: Send + Sync {
    async fn invoke_unary(&self, request: Message) -> Result<Message, Status>;

    async fn invoke_server_streaming(&self, request: Message) -> Result<ResponseStream, Status>;

    /// Whether `status` means the endpoint is transiently unreachable, as
    /// opposed to a failure that should take the process down.
    fn is_unavailable(&self, status: &Status) -> bool {
        status.code() == Code::Unavailable
    }
}
