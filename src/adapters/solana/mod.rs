pub mod rpc;

pub use rpc::{parse_account_info, SolanaRpcClient, SolanaRpcConfig};
