pub mod request;
pub mod response;

pub use request::RpcRequest;
pub use response::{
    MethodDescriptor, MethodError, MethodsResponse, ParamDescriptor, RpcResponse,
    UNKNOWN_METHOD_MESSAGE,
};
