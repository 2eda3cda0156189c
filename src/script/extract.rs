use thiserror::Error;

const FENCE: &str = "```";

/// Why a generated response did not yield exactly one script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("no fenced code block found in the response")]
    NoCodeBlock,

    #[error("expected exactly one fenced code block, found {0}")]
    MultipleCodeBlocks(usize),

    #[error("code block opened but never closed")]
    UnterminatedCodeBlock,
}

/// One assistant turn's raw text together with the script pulled out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCandidate {
    raw_text: String,
    extracted: Result<String, ExtractionError>,
}

impl ScriptCandidate {
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The block contents, absent when extraction failed.
    pub fn extracted_code(&self) -> Option<&str> {
        self.extracted.as_deref().ok()
    }

    pub fn failure(&self) -> Option<&ExtractionError> {
        self.extracted.as_ref().err()
    }

    pub fn code(&self) -> Result<&str, &ExtractionError> {
        self.extracted.as_deref()
    }
}

/// Pull the single fenced block out of `raw`.
///
/// A block opens on a line whose trimmed text starts with three backticks
/// (an info string such as `python` may follow) and closes on the next line
/// whose trimmed text is exactly three backticks. Pure: the same input
/// always yields the same candidate.
pub fn extract(raw: &str) -> ScriptCandidate {
    ScriptCandidate {
        raw_text: raw.to_string(),
        extracted: extract_code(raw),
    }
}

fn extract_code(raw: &str) -> Result<String, ExtractionError> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut open: Option<Vec<&str>> = None;

    for line in raw.lines() {
        let trimmed = line.trim();
        match open.as_mut() {
            Some(body) => {
                if trimmed == FENCE {
                    blocks.push(open.take().unwrap_or_default());
                } else {
                    body.push(line);
                }
            }
            None => {
                if trimmed.starts_with(FENCE) {
                    open = Some(Vec::new());
                }
            }
        }
    }

    if open.is_some() {
        return Err(ExtractionError::UnterminatedCodeBlock);
    }

    match blocks.len() {
        0 => Err(ExtractionError::NoCodeBlock),
        1 => {
            let body = blocks.remove(0);
            let mut code = body.join("\n");
            if !code.is_empty() {
                code.push('\n');
            }
            Ok(code)
        }
        n => Err(ExtractionError::MultipleCodeBlocks(n)),
    }
}
