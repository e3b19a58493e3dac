//! Text file tools confined to one workspace directory.

use crate::error::ToolError;
use crate::server::{ToolSet, ToolSpec};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ALLOWED_EXTENSIONS: [&str; 3] = [".txt", ".py", ".bal"];

pub struct FileTools {
    root: PathBuf,
}

impl FileTools {
    /// Creates the root directory if it does not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ToolError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted names of regular files, optionally filtered by extension.
    pub fn list_files(&self, extension: Option<&str>) -> Result<Vec<String>, ToolError> {
        let extension = extension.map(str::trim).filter(|ext| !ext.is_empty());
        if let Some(ext) = extension {
            if !ALLOWED_EXTENSIONS.contains(&ext) {
                return Err(ToolError::UnsupportedExtension {
                    extension: ext.to_string(),
                    allowed: ALLOWED_EXTENSIONS.join(", "),
                });
            }
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                debug!("Skipping file name that is not valid UTF-8");
                continue;
            };
            if extension.is_none_or(|ext| name.ends_with(ext)) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn read_file(&self, filename: &str) -> Result<String, ToolError> {
        let path = self.resolve(filename)?;
        if !path.is_file() {
            return Err(ToolError::NotFound {
                filename: filename.to_string(),
            });
        }
        Ok(fs::read_to_string(path)?)
    }

    /// Overwrites existing files.
    pub fn write_file(&self, filename: &str, content: &str) -> Result<String, ToolError> {
        let path = self.resolve(filename)?;
        fs::write(path, content)?;
        Ok(format!("File '{filename}' written successfully."))
    }

    /// Extension is checked before existence; names must be plain file names.
    fn resolve(&self, filename: &str) -> Result<PathBuf, ToolError> {
        if !ALLOWED_EXTENSIONS.iter().any(|ext| filename.ends_with(ext)) {
            return Err(ToolError::DisallowedFile {
                allowed: ".txt, .py, and .bal".to_string(),
            });
        }
        let plain = Path::new(filename)
            .file_name()
            .is_some_and(|name| name == filename);
        if !plain || filename.contains(['/', '\\']) || filename.contains("..") {
            return Err(ToolError::InvalidFileName {
                filename: filename.to_string(),
            });
        }
        Ok(self.root.join(filename))
    }
}

#[async_trait]
impl ToolSet for FileTools {
    fn server_name(&self) -> &str {
        "FileServer"
    }

    fn tools(&self) -> Vec<ToolSpec> {
        vec![
            ToolSpec::new(
                "list_files",
                "List all files with a given extension (.txt, .py, .bal) in the workspace.",
                json!({
                    "type": "object",
                    "properties": {
                        "extension": {"type": "string", "default": ""}
                    }
                }),
            ),
            ToolSpec::new(
                "read_file",
                "Read the contents of a file from the workspace directory.",
                json!({
                    "type": "object",
                    "properties": {"filename": {"type": "string"}},
                    "required": ["filename"]
                }),
            ),
            ToolSpec::new(
                "write_file",
                "Write content to a file in the workspace directory. Overwrites if the file already exists.",
                json!({
                    "type": "object",
                    "properties": {
                        "filename": {"type": "string"},
                        "content": {"type": "string"}
                    },
                    "required": ["filename", "content"]
                }),
            ),
        ]
    }

    async fn call(&self, name: &str, arguments: &Map<String, Value>) -> Result<String, ToolError> {
        match name {
            "list_files" => {
                let extension = optional_str(arguments, "extension")?;
                let names = self.list_files(extension)?;
                Ok(json!(names).to_string())
            }
            "read_file" => self.read_file(required_str(arguments, "filename")?),
            "write_file" => self.write_file(
                required_str(arguments, "filename")?,
                required_str(arguments, "content")?,
            ),
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

fn required_str<'a>(arguments: &'a Map<String, Value>, name: &str) -> Result<&'a str, ToolError> {
    optional_str(arguments, name)?.ok_or_else(|| ToolError::invalid_argument(name, "is required"))
}

fn optional_str<'a>(
    arguments: &'a Map<String, Value>,
    name: &str,
) -> Result<Option<&'a str>, ToolError> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(ToolError::invalid_argument(name, "must be a string")),
    }
}
