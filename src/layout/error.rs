//! Error types for the layout engine

use thiserror::Error;

use crate::cluster::ClusterError;

/// Errors that can occur during layout computation
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A scene refers to a character index past the end of the character list
    #[error("scene {scene} references character index {index}, but only {count} characters were given")]
    CharacterIndexOutOfRange {
        scene: String,
        index: usize,
        count: usize,
    },

    /// A scene refers to a character name that is not defined
    #[error("scene {scene} references undefined character '{name}'")]
    UnknownCharacter {
        scene: String,
        name: String,
        suggestions: Vec<String>,
    },

    /// Configuration values the solver cannot work with
    #[error("invalid layout configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Community detection rejected the co-occurrence graph
    #[error("community detection failed: {0}")]
    Cluster(#[from] ClusterError),
}

impl LayoutError {
    /// Create an unknown character error with suggestions
    pub fn unknown_character(
        scene: impl Into<String>,
        name: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        Self::UnknownCharacter {
            scene: scene.into(),
            name: name.into(),
            suggestions,
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::UnknownCharacter { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_character_display() {
        let err = LayoutError::unknown_character("#2", "Lukee", vec!["Luke".to_string()]);
        assert!(err.to_string().contains("Lukee"));
        assert_eq!(err.suggestions(), Some(&["Luke".to_string()][..]));
    }

    #[test]
    fn test_cluster_error_wraps() {
        let err: LayoutError = ClusterError::MissingNodes.into();
        assert!(err.to_string().starts_with("community detection failed"));
        assert!(err.suggestions().is_none());
    }
}
