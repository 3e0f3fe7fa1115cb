use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvloopError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("output sink error: {0}")]
    Output(String),
}
