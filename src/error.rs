pub type PlaybackResult<T> = Result<T, PlaybackError>;

/// Metadata that cannot drive playback. Fatal to the load that produced it;
/// the engine never substitutes a default.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("sampled fps must be a finite number > 0 with a representable frame interval, got {0}")]
    InvalidSampledFps(f64),

    #[error("metadata declares {declared} frame(s) but {actual} were supplied")]
    FrameCountMismatch { declared: usize, actual: usize },

    #[error("frame store is empty")]
    EmptyStore,

    #[error("frame at position {position} has index {index}, not greater than previous index {previous}")]
    NonMonotonicIndex {
        position: usize,
        index: u64,
        previous: u64,
    },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("no frame store loaded")]
    NotReady,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        let error = PlaybackError::from(ConfigurationError::FrameCountMismatch {
            declared: 5,
            actual: 4,
        });
        assert_eq!(
            error.to_string(),
            "configuration error: metadata declares 5 frame(s) but 4 were supplied"
        );
        assert_eq!(PlaybackError::NotReady.to_string(), "no frame store loaded");
    }
}
