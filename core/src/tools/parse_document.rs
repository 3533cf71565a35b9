use crate::tools::extract_string_arg;
use crate::traits::Tool;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

pub struct ParseDocumentTool {
    summary_chars: usize,
}

impl ParseDocumentTool {
    pub fn new(summary_chars: usize) -> Self {
        Self { summary_chars }
    }
}

#[async_trait]
impl Tool for ParseDocumentTool {
    fn name(&self) -> &str {
        "parse_document_text"
    }

    fn description(&self) -> &str {
        "Parses text from a local document (e.g. a TXT file of a financial report) and returns a summary of its opening."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the local text document"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> String {
        let file_path = match extract_string_arg(&args, "file_path") {
            Ok(path) => path,
            Err(message) => return message,
        };

        debug!(path = %file_path, "parsing document");

        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => {
                let summary: String = content.chars().take(self.summary_chars).collect();
                format!("Successfully parsed document. Summary: {}...", summary)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("Error: The file at {} was not found.", file_path)
            }
            Err(e) => format!("An error occurred while parsing the document: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_reports_not_found() {
        let out = ParseDocumentTool::new(1000)
            .execute(json!({"file_path": "/nonexistent/path"}))
            .await;
        assert_eq!(out, "Error: The file at /nonexistent/path was not found.");
    }

    #[tokio::test]
    async fn short_document_is_returned_whole() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.txt");
        fs::write(&path, "Revenue grew 12% year over year.").unwrap();

        let out = ParseDocumentTool::new(1000)
            .execute(json!({"file_path": path.to_str().unwrap()}))
            .await;
        assert_eq!(
            out,
            "Successfully parsed document. Summary: Revenue grew 12% year over year...."
        );
    }

    #[tokio::test]
    async fn summary_is_bounded_by_characters() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("long.txt");
        fs::write(&path, "₹".repeat(1500)).unwrap();

        let out = ParseDocumentTool::new(1000)
            .execute(json!({"file_path": path.to_str().unwrap()}))
            .await;
        let summary = out
            .strip_prefix("Successfully parsed document. Summary: ")
            .and_then(|s| s.strip_suffix("..."))
            .unwrap();
        assert_eq!(summary.chars().count(), 1000);
    }

    #[tokio::test]
    async fn other_io_errors_are_generic() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("binary.bin");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let out = ParseDocumentTool::new(1000)
            .execute(json!({"file_path": path.to_str().unwrap()}))
            .await;
        assert!(
            out.starts_with("An error occurred while parsing the document:"),
            "{}",
            out
        );

        let out = ParseDocumentTool::new(1000)
            .execute(json!({"file_path": tmp.path().to_str().unwrap()}))
            .await;
        assert!(out.starts_with("An error occurred while parsing the document:"));
    }
}
