use thiserror::Error;

/// Errors raised while setting up an editor. Editing itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown editing command: {0}")]
    UnknownCommand(String),

    #[error("formatBlock needs one of <p>, <h1>, <h2>, <blockquote>, got {0:?}")]
    UnknownBlockFormat(String),

    #[error("createLink needs a URL")]
    MissingLinkTarget,

    #[error("invalid editor config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to read editor config: {0}")]
    Io(#[from] std::io::Error),
}
