pub type StagecastResult<T> = Result<T, StagecastError>;

/// Error taxonomy shared by the whole engine.
///
/// Only `Config` and `PlatformUnavailable` ever escape a full render; media and per-element
/// failures are logged and absorbed by the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum StagecastError {
    /// Missing or malformed template/configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Image, video or feed fetch/decode failure.
    #[error("media load error: {0}")]
    MediaLoad(String),

    /// A single element failed to render.
    #[error("render error in element '{element_id}': {message}")]
    RenderIsolation {
        /// Id of the failing element.
        element_id: String,
        /// Underlying failure description.
        message: String,
    },

    /// An optional host capability (fonts, overlay layer, surface) is absent.
    #[error("platform unavailable: {0}")]
    PlatformUnavailable(String),

    /// Anything else, with context attached via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StagecastError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn media_load(msg: impl Into<String>) -> Self {
        Self::MediaLoad(msg.into())
    }

    pub fn isolation(element_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::RenderIsolation {
            element_id: element_id.into(),
            message: msg.into(),
        }
    }

    pub fn platform(msg: impl Into<String>) -> Self {
        Self::PlatformUnavailable(msg.into())
    }

    /// `true` for errors that should be logged and skipped rather than abort a render.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MediaLoad(_) | Self::RenderIsolation { .. } | Self::PlatformUnavailable(_)
        )
    }
}
