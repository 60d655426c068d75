use anyhow::{Result, anyhow};

/// Longest accepted filename, in bytes
pub const MAX_FILENAME_LEN: usize = 255;

/// Characters that are never accepted in a staged filename
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Device names that cannot be used as a file stem on some platforms
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates file size against maximum limit
pub fn validate_file_size(size: usize, max_size: usize) -> Result<()> {
    if size > max_size {
        return Err(anyhow!(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!(
                "File size {} bytes exceeds maximum allowed {} bytes",
                size, max_size
            ),
        }));
    }
    Ok(())
}

/// Error for an upload cut off by the request body limit, when its real
/// size is unknown.
pub fn upload_too_large(max_size: usize) -> anyhow::Error {
    anyhow!(ValidationError {
        code: "FILE_TOO_LARGE",
        message: format!("File exceeds maximum allowed {} bytes", max_size),
    })
}

/// Checks that a client-supplied filename can be used verbatim as a single
/// path component inside a staging directory.
///
/// Unlike a sanitizer this never rewrites the name: the download link must
/// name exactly the file that was stored, so anything suspicious is rejected.
pub fn validate_filename(filename: &str) -> Result<&str> {
    if filename.is_empty() {
        return Err(anyhow!(ValidationError {
            code: "INVALID_FILENAME",
            message: "Filename cannot be empty".to_string(),
        }));
    }

    if filename.len() > MAX_FILENAME_LEN {
        return Err(anyhow!(ValidationError {
            code: "FILENAME_TOO_LONG",
            message: format!("Filename exceeds {} bytes", MAX_FILENAME_LEN),
        }));
    }

    if filename == ".." || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path traversal attempt detected: {:?}", filename);
        return Err(anyhow!(ValidationError {
            code: "PATH_TRAVERSAL",
            message: "Filename must not contain path separators".to_string(),
        }));
    }

    if let Some(c) = filename
        .chars()
        .find(|c| c.is_control() || RESERVED_CHARS.contains(c))
    {
        return Err(anyhow!(ValidationError {
            code: "INVALID_FILENAME",
            message: format!("Filename contains reserved character {:?}", c),
        }));
    }

    if filename.starts_with('.') {
        return Err(anyhow!(ValidationError {
            code: "HIDDEN_FILE",
            message: "Hidden files (starting with '.') are not allowed".to_string(),
        }));
    }

    let stem = filename.split('.').next().unwrap_or(filename).trim_end();
    if RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(stem))
    {
        return Err(anyhow!(ValidationError {
            code: "RESERVED_NAME",
            message: format!("'{}' is a reserved device name", stem),
        }));
    }

    Ok(filename)
}

/// Decodes uploaded bytes as source text, rejecting binary content.
pub fn validate_text(content: &[u8]) -> Result<&str> {
    if content.iter().take(8192).any(|&b| b == 0) {
        return Err(anyhow!(ValidationError {
            code: "BINARY_AS_TEXT",
            message: "File contains binary content".to_string(),
        }));
    }

    std::str::from_utf8(content).map_err(|e| {
        anyhow!(ValidationError {
            code: "INVALID_ENCODING",
            message: format!("File is not valid UTF-8 text ({})", e),
        })
    })
}
