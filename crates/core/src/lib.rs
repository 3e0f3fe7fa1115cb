pub mod cancel;
pub mod config;
pub mod error;
pub mod event;
pub mod key;

pub use cancel::CancelToken;
pub use config::{load_dotenv, Config, DriverConfig, HandlerConfig};
pub use error::*;
pub use event::*;
pub use key::{event_key, KeySequence};
