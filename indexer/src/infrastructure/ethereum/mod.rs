mod abi_decoder;
mod error;
mod log_source;
mod rpc_client;

pub use abi_decoder::AbiEventDecoder;
pub use error::ChainClientError;
pub use log_source::ContractLogSource;
pub use rpc_client::EthRpcClient;
