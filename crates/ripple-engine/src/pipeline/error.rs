use std::fmt;

/// Shader artifact a pipeline diagnostic refers to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Stage {
    Compute,
    Vertex,
    Fragment,
}

impl Stage {
    /// Entry point name the binding contract fixes for this stage.
    pub fn entry_point(self) -> &'static str {
        match self {
            Stage::Compute => "compute",
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Compute => "compute",
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        })
    }
}

/// Failure while turning shader sources into pipelines.
///
/// `ShaderCompile` covers anything wrong with an artifact in isolation;
/// `LayoutMismatch` means the artifact is valid WGSL but disagrees with the
/// registered resources it would be bound against.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PipelineError {
    ShaderCompile { stage: Stage, message: String },
    LayoutMismatch { stage: Stage, message: String },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::ShaderCompile { stage, message } => {
                write!(f, "{stage} shader failed to compile: {message}")
            }
            PipelineError::LayoutMismatch { stage, message } => {
                write!(f, "{stage} shader disagrees with the registered bindings: {message}")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_stage() {
        let err = PipelineError::ShaderCompile {
            stage: Stage::Fragment,
            message: "unexpected token".to_owned(),
        };
        assert!(err.to_string().starts_with("fragment shader failed to compile"));

        let err = PipelineError::LayoutMismatch {
            stage: Stage::Compute,
            message: "`state` is not visible".to_owned(),
        };
        assert!(err.to_string().contains("disagrees with the registered bindings"));
    }
}
