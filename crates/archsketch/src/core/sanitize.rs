//! Clean-up of model-generated source before conversion
//!
//! Generated code usually arrives wrapped in Markdown fences and sometimes
//! with typographic quotes that break string literals.

use tracing::trace;

const PYTHON_FENCE: &str = "```python";
const FENCE: &str = "```";

/// Strip Markdown fences and normalize quotes
///
/// A `python` fenced block wins over any other fenced block. Text without
/// fences is returned trimmed.
pub fn extract_code(raw: &str) -> String {
    let body = if let Some(start) = raw.find(PYTHON_FENCE) {
        trace!("Extracting python fenced block");
        fenced_body(&raw[start + PYTHON_FENCE.len()..])
    } else if let Some(start) = raw.find(FENCE) {
        trace!("Extracting first fenced block");
        fenced_body(&raw[start + FENCE.len()..])
    } else {
        raw
    };
    normalize_quotes(body.trim())
}

fn fenced_body(after_open: &str) -> &str {
    match after_open.find(FENCE) {
        Some(end) => &after_open[..end],
        None => after_open,
    }
}

/// Replace typographic quotes with their ASCII counterparts
pub fn normalize_quotes(code: &str) -> String {
    code.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' => '\'',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_trimmed() {
        assert_eq!(extract_code("  s3 = S3()\n\n"), "s3 = S3()");
    }

    #[test]
    fn test_python_fence_preferred() {
        let raw = "Here:\n```text\nnot this\n```\n```python\nfn = Lambda()\n```\nDone";
        assert_eq!(extract_code(raw), "fn = Lambda()");
    }

    #[test]
    fn test_bare_fence() {
        let raw = "```\nq = SQS()\n```";
        assert_eq!(extract_code(raw), "q = SQS()");
    }

    #[test]
    fn test_unterminated_fence_takes_rest() {
        assert_eq!(extract_code("```python\nq = SQS()"), "q = SQS()");
    }

    #[test]
    fn test_smart_quotes_normalized() {
        let raw = "with Cluster(\u{201C}Data\u{201D}):\n    fn = Lambda(\u{2018}etl\u{2019})";
        assert_eq!(
            extract_code(raw),
            "with Cluster(\"Data\"):\n    fn = Lambda('etl')"
        );
    }
}
