//! Load requests and their validation.
//!
//! Everything here runs before any parsing: the extension picks the model
//! kind once, the size limit is checked against the reported file size, and
//! vector text must carry both root tags.

use std::path::Path;

use extrudekit_core::{Error, ModelKind, Result};

/// A file handed to the viewer by the host
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Size as reported by the host, which may be larger than `bytes`
    pub file_size: u64,
}

/// A validated request, dispatched by kind
#[derive(Debug, Clone)]
pub enum LoadInput {
    Vector { file_name: String, markup: String },
    Solid {
        file_name: String,
        extension: String,
        bytes: Vec<u8>,
    },
}

impl LoadInput {
    pub fn kind(&self) -> ModelKind {
        match self {
            LoadInput::Vector { .. } => ModelKind::Vector,
            LoadInput::Solid { .. } => ModelKind::Solid,
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            LoadInput::Vector { file_name, .. } | LoadInput::Solid { file_name, .. } => file_name,
        }
    }
}

/// Extension including the leading dot, lower-cased; empty without one
fn dotted_extension(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(i) => file_name[i..].to_ascii_lowercase(),
        None => String::new(),
    }
}

impl LoadRequest {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_size = bytes.len() as u64;
        Self {
            file_name: file_name.into(),
            bytes,
            file_size,
        }
    }

    /// Read a file from disk
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// Check extension, size and, for vector input, the root tags.
    ///
    /// The reason strings are shown to the user verbatim.
    pub fn validate(self, max_file_bytes: u64) -> Result<LoadInput> {
        let dotted = dotted_extension(&self.file_name);
        let kind = ModelKind::from_extension(dotted.trim_start_matches('.')).ok_or_else(|| {
                Error::invalid_input(format!(
                    "Invalid file type: {}. Please select a .glb, .gltf, or .svg file.",
                    dotted
                ))
            })?;

        if self.file_size > max_file_bytes {
            return Err(Error::invalid_input(format!(
                "File too large: {:.2} MB. Maximum size is {}MB.",
                self.file_size as f64 / 1024.0 / 1024.0,
                max_file_bytes / 1024 / 1024
            )));
        }

        match kind {
            ModelKind::Vector => {
                let markup = String::from_utf8(self.bytes)
                    .map_err(|_| Error::invalid_input("Failed to read SVG file."))?;
                if !markup.contains("<svg") || !markup.contains("</svg>") {
                    return Err(Error::invalid_input(
                        "Invalid SVG file: Missing required SVG tags.",
                    ));
                }
                Ok(LoadInput::Vector {
                    file_name: self.file_name,
                    markup,
                })
            }
            ModelKind::Solid => Ok(LoadInput::Solid {
                extension: dotted.trim_start_matches('.').to_string(),
                file_name: self.file_name,
                bytes: self.bytes,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extrudekit_core::ErrorKind;

    const LIMIT: u64 = 50 * 1024 * 1024;

    fn reason(err: Error) -> String {
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        err.user_message()
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let err = LoadRequest::new("model.txt", b"<svg></svg>".to_vec())
            .validate(LIMIT)
            .unwrap_err();
        assert_eq!(
            reason(err),
            "Invalid file type: .txt. Please select a .glb, .gltf, or .svg file."
        );

        let err = LoadRequest::new("svg", b"<svg></svg>".to_vec())
            .validate(LIMIT)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_rejects_oversize_regardless_of_content() {
        let mut request = LoadRequest::new("art.svg", b"<svg></svg>".to_vec());
        request.file_size = 60 * 1024 * 1024;
        assert_eq!(
            reason(request.validate(LIMIT).unwrap_err()),
            "File too large: 60.00 MB. Maximum size is 50MB."
        );
    }

    #[test]
    fn test_rejects_missing_closing_tag() {
        let err = LoadRequest::new("art.svg", b"<svg><path d=\"M0 0\"/>".to_vec())
            .validate(LIMIT)
            .unwrap_err();
        assert_eq!(reason(err), "Invalid SVG file: Missing required SVG tags.");
    }

    #[test]
    fn test_dispatches_by_kind() {
        let input = LoadRequest::new("Logo.SVG", b"<svg></svg>".to_vec())
            .validate(LIMIT)
            .unwrap();
        assert_eq!(input.kind(), ModelKind::Vector);
        assert_eq!(input.file_name(), "Logo.SVG");

        let input = LoadRequest::new("part.glb", vec![0; 4]).validate(LIMIT).unwrap();
        match input {
            LoadInput::Solid { extension, .. } => assert_eq!(extension, "glb"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
