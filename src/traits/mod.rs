pub mod connector;
pub mod remote_method;

pub use connector::MethodConnector;
pub use remote_method::{RemoteMethod, ResponseStream};
