use crate::ir::Diagram;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("diagram data is empty")]
    Empty,
    #[error("invalid diagram data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses diagram data in the `{"nodes": [...], "flows": [...]}` shape.
///
/// Strict JSON is tried first; on failure the input is retried as JSON5
/// and the JSON error is reported if both fail.
pub fn parse_diagram(input: &str) -> Result<Diagram, InputError> {
    if input.trim().is_empty() {
        return Err(InputError::Empty);
    }
    match serde_json::from_str::<Diagram>(input) {
        Ok(diagram) => Ok(diagram),
        Err(json_err) => match json5::from_str::<Diagram>(input) {
            Ok(diagram) => Ok(diagram),
            Err(_) => Err(InputError::Json(json_err)),
        },
    }
}
