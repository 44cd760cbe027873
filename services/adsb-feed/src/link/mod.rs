//! Feed links - one TCP stream per configured dump1090 feed

mod frame;
mod manager;
mod state;

pub use manager::{establish, LinkHandle};
pub use state::{LinkState, LinkStats};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("invalid link configuration: {0}")]
    Config(String),

    #[error("failed to connect to feed {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
