//! Error types

use std::io;
use thiserror::Error;

use crate::gfx::rendering::rasterizer::ShaderStage;

/// Errors surfaced by the editor core
#[derive(Error, Debug)]
pub enum SceneError {
    /// A shader stage failed to compile; rendering cannot start
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    /// Compiled shaders failed to link into a program
    #[error("program failed to link: {0}")]
    ProgramLink(String),

    /// The document is not valid JSON or does not match the expected shape
    #[error("malformed document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    /// The document parsed but its contents are inconsistent
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A referenced item does not exist
    #[error("{kind} {index} not found")]
    ReferenceNotFound { kind: &'static str, index: usize },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SceneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SceneError::ShaderCompile {
            stage: ShaderStage::Fragment,
            log: "0:3 syntax error".into(),
        };
        assert_eq!(err.to_string(), "fragment shader failed to compile: 0:3 syntax error");

        let err = SceneError::ReferenceNotFound {
            kind: "node",
            index: 7,
        };
        assert_eq!(err.to_string(), "node 7 not found");
    }

    #[test]
    fn test_json_errors_convert() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: SceneError = parse.unwrap_err().into();
        assert!(matches!(err, SceneError::MalformedDocument(_)));
    }
}
