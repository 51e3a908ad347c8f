//! Producer backed by an external command.
//!
//! The configured argv is run once per request with every `{day}` replaced by
//! the day number. Trimmed stdout becomes the content.

#![allow(missing_docs)]

use std::process::{Command, Stdio};

use crate::producer::{ContentProducer, ProducerError};

/// Placeholder substituted with the requested day.
pub const DAY_PLACEHOLDER: &str = "{day}";

#[derive(Debug, Clone)]
pub struct CommandProducer {
    argv: Vec<String>,
    max_chars: usize,
}

impl CommandProducer {
    #[must_use]
    pub fn new(argv: Vec<String>, max_chars: usize) -> Self {
        Self { argv, max_chars }
    }

    fn render_args(&self, day: u32) -> Vec<String> {
        let day = day.to_string();
        self.argv
            .iter()
            .map(|arg| arg.replace(DAY_PLACEHOLDER, &day))
            .collect()
    }
}

impl ContentProducer for CommandProducer {
    fn request_content(&self, day: u32) -> Result<String, ProducerError> {
        let args = self.render_args(day);
        let Some((program, rest)) = args.split_first() else {
            return Err(ProducerError::Unavailable("no command configured".to_string()));
        };

        let output = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ProducerError::Unavailable(format!("{program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProducerError::Failed(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| ProducerError::Malformed(format!("non-UTF-8 output: {e}")))?;
        validate_text(text.trim(), self.max_chars)
    }
}

fn validate_text(text: &str, max_chars: usize) -> Result<String, ProducerError> {
    if text.is_empty() {
        return Err(ProducerError::Malformed("empty output".to_string()));
    }
    let chars = text.chars().count();
    if chars > max_chars {
        return Err(ProducerError::Malformed(format!(
            "{chars} chars exceeds limit of {max_chars}"
        )));
    }
    Ok(text.to_string())
}
