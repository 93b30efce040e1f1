use alloy_primitives::Address;
use async_trait::async_trait;

use crate::domain::errors::DecodeError;
use crate::domain::models::{BlockTag, DecodedLog, RawLog};
use crate::domain::ports::ChainLogSource;
use crate::infrastructure::ethereum::{AbiEventDecoder, ChainClientError, EthRpcClient};

/// Chain log source for a single contract: one RPC client, one ABI
#[derive(Debug, Clone)]
pub struct ContractLogSource {
    client: EthRpcClient,
    decoder: AbiEventDecoder,
}

impl ContractLogSource {
    pub fn new(client: EthRpcClient, decoder: AbiEventDecoder) -> Self {
        Self { client, decoder }
    }

    pub fn decoder(&self) -> &AbiEventDecoder {
        &self.decoder
    }
}

#[async_trait]
impl ChainLogSource for ContractLogSource {
    async fn get_logs(
        &self,
        address: &Address,
        from: BlockTag,
        to: BlockTag,
    ) -> Result<Vec<RawLog>, ChainClientError> {
        self.client.get_logs(address, from, to).await
    }

    async fn latest_block(&self) -> Result<u64, ChainClientError> {
        self.client.block_number().await
    }

    fn decode_log(&self, log: &RawLog) -> Result<DecodedLog, DecodeError> {
        self.decoder.decode(log)
    }
}
