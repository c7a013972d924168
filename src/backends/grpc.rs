// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! gRPC remote methods.
//!
//! Calls go through tonic's generic client with a prost codec over
//! `google.protobuf.Struct`, so any service whose request and response types
//! are `Struct` can be driven without generated stubs. Channels are lazy: a
//! stage's endpoint is only dialled on its first call, and a refused
//! connection surfaces as `UNAVAILABLE` like any other unreachable service.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use prost_types::Struct;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::Status;

use crate::config::StageDescriptor;
use crate::errors::ConnectError;
use crate::message::Message;
use crate::traits::{MethodConnector, RemoteMethod, ResponseStream};

pub struct GrpcMethod {
    channel: Channel,
    path: PathAndQuery,
}

impl GrpcMethod {
    /// Must be called from within a tokio runtime.
    pub fn connect(descriptor: &StageDescriptor) -> Result<Self, ConnectError> {
        let endpoint = descriptor.endpoint();
        let channel = Endpoint::from_shared(endpoint.clone())
            .map_err(|e| ConnectError::InvalidEndpoint {
                stage_name: descriptor.name.clone(),
                endpoint,
                reason: e.to_string(),
            })?
            .connect_lazy();

        Ok(Self {
            channel,
            path: method_path(descriptor)?,
        })
    }

    async fn client(&self) -> Result<tonic::client::Grpc<Channel>, Status> {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("Service was not ready: {}", e)))?;
        Ok(grpc)
    }
}

#[async_trait]
impl RemoteMethod for GrpcMethod {
    async fn invoke_unary(&self, request: Message) -> Result<Message, Status> {
        let mut grpc = self.client().await?;
        let codec: ProstCodec<Struct, Struct> = ProstCodec::default();

        let response = grpc
            .unary(
                tonic::Request::new(request.into_inner()),
                self.path.clone(),
                codec,
            )
            .await?;
        Ok(Message::from(response.into_inner()))
    }

    async fn invoke_server_streaming(&self, request: Message) -> Result<ResponseStream, Status> {
        let mut grpc = self.client().await?;
        let codec: ProstCodec<Struct, Struct> = ProstCodec::default();

        let response = grpc
            .server_streaming(
                tonic::Request::new(request.into_inner()),
                self.path.clone(),
                codec,
            )
            .await?;
        Ok(response
            .into_inner()
            .map(|item| item.map(Message::from))
            .boxed())
    }
}

/// Turn `package.Service/Method` into the HTTP/2 path `/package.Service/Method`.
fn method_path(descriptor: &StageDescriptor) -> Result<PathAndQuery, ConnectError> {
    let method = &descriptor.method.name;
    let invalid = |reason: &str| ConnectError::InvalidMethodPath {
        stage_name: descriptor.name.clone(),
        method: method.clone(),
        reason: reason.to_string(),
    };

    let trimmed = method.trim().trim_start_matches('/');
    let (service, name) = trimmed
        .split_once('/')
        .ok_or_else(|| invalid("expected '<package.Service>/<Method>'"))?;
    if service.is_empty() || name.is_empty() || name.contains('/') {
        return Err(invalid("expected '<package.Service>/<Method>'"));
    }

    PathAndQuery::try_from(format!("/{}/{}", service, name)).map_err(|e| invalid(&e.to_string()))
}

/// Connects every stage to a [`GrpcMethod`] on its own host and port.
#[derive(Debug, Default, Clone, Copy)]
pub struct GrpcConnector;

impl MethodConnector for GrpcConnector {
    fn connect(&self, descriptor: &StageDescriptor) -> Result<Arc<dyn RemoteMethod>, ConnectError> {
        Ok(Arc::new(GrpcMethod::connect(descriptor)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::descriptor;
    use crate::config::{ExecutionMode, MethodShape};

    fn with_method(method: &str) -> StageDescriptor {
        let mut descriptor = descriptor("detector", MethodShape::Unary, ExecutionMode::Continuous);
        descriptor.method.name = method.to_string();
        descriptor
    }

    #[test]
    fn test_method_path_formatting() {
        let path = method_path(&with_method("vision.Detector/Detect")).unwrap();
        assert_eq!(path.as_str(), "/vision.Detector/Detect");

        let path = method_path(&with_method("/vision.Detector/Detect")).unwrap();
        assert_eq!(path.as_str(), "/vision.Detector/Detect");
    }

    #[test]
    fn test_method_path_requires_service_and_method() {
        for method in ["Detect", "vision.Detector/", "/Detect", "a/b/c"] {
            let result = method_path(&with_method(method));
            assert!(
                matches!(result, Err(ConnectError::InvalidMethodPath { .. })),
                "accepted '{}'",
                method
            );
        }
    }

    #[tokio::test]
    async fn test_connect_is_lazy() {
        // nothing listens on this port; connecting must still succeed
        let mut descriptor = with_method("vision.Detector/Detect");
        descriptor.port = 1;

        let method = GrpcConnector.connect(&descriptor);
        assert!(method.is_ok());
    }

    #[test]
    fn test_invalid_endpoint() {
        let mut descriptor = with_method("vision.Detector/Detect");
        descriptor.host = "bad host".to_string();

        let result = GrpcMethod::connect(&descriptor);
        assert!(matches!(result, Err(ConnectError::InvalidEndpoint { .. })));
    }
}
