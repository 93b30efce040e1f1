pub mod arg_value;
pub mod chain_log;
pub mod checkpoint;
pub mod decoded_event;

pub use arg_value::ArgValue;
pub use chain_log::{BlockTag, RawLog};
pub use checkpoint::{BlockCheckpoint, StreamKey, CHECKPOINT_ROW_KEY};
pub use decoded_event::{DecodedEvent, DecodedLog, EventKeying};
