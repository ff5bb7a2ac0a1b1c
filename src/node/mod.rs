pub mod cli;
pub mod config;
pub mod devnet;
pub mod request;
pub mod service_handle;

pub use cli::run_cli;
pub use config::DevnetConfig;
pub use devnet::Devnet;
pub use request::{CallArgs, TxRequest};
pub use service_handle::ServiceHandle;
