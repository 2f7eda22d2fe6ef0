// End-to-end behaviour of the extraction and formatting stages.

use evalbot_sandbox::format::{ESCAPE_DETECTED, NO_OUTPUT};
use evalbot_sandbox::{
    dedent, extract, format_result, ExecutionResult, ExtractionReason, StatusIcon,
};

#[test]
fn tagged_block_is_dedented() {
    let extracted = extract("please run\n```python\n  for i in range(3):\n      print(i)\n```");
    assert_eq!(extracted.code, "for i in range(3):\n    print(i)");
    assert_eq!(
        extracted.reason,
        ExtractionReason::FencedBlockWithLanguage("python".into())
    );
}

#[test]
fn two_blocks_join_with_single_newline_despite_inline_spans() {
    let text = "`inline` first\n```\nimport math\n```\n`another`\n```py\nprint(math.pi)\n```";
    let extracted = extract(text);
    assert_eq!(extracted.code, "import math\nprint(math.pi)");
    assert_eq!(extracted.reason, ExtractionReason::MultipleFencedBlocks);
}

#[test]
fn plain_text_strips_surrounding_blank_lines() {
    let extracted = extract("\n\nprint('plain')\n\n\n");
    assert_eq!(extracted.code, "print('plain')");
    assert_eq!(extracted.reason, ExtractionReason::RawFallback);
}

#[test]
fn empty_success_warns_with_placeholder() {
    let formatted = format_result(&ExecutionResult::new("", Some(0)));
    assert_eq!(formatted.status_icon, StatusIcon::Warning);
    assert_eq!(formatted.display_text, NO_OUTPUT);
}

#[test]
fn fifteen_lines_are_truncated_with_attachment() {
    let formatted = format_result(&ExecutionResult::new("a\n".repeat(15), Some(0)));
    assert!(formatted.display_text.starts_with("... (truncated"));
    assert!(formatted.full_output.is_some());
}

#[test]
fn backtick_flood_is_suppressed_and_attached() {
    let stdout = "```".repeat(5);
    let formatted = format_result(&ExecutionResult::new(stdout.clone(), Some(0)));
    assert_eq!(formatted.display_text, ESCAPE_DETECTED);
    assert_eq!(formatted.full_output.as_deref(), Some(stdout.as_bytes()));
}

#[test]
fn service_failure_shows_error_verbatim() {
    let formatted = format_result(&ExecutionResult::new("boom", None));
    assert_eq!(formatted.status_message, "Your eval job has failed");
    assert_eq!(formatted.display_text, "boom");
    assert!(!formatted.display_text.contains(" | "));
}

#[test]
fn sigkill_means_timeout_whatever_the_output() {
    for stdout in ["x", "", "```"] {
        let formatted = format_result(&ExecutionResult::new(stdout, Some(137)));
        assert_eq!(
            formatted.status_message,
            "Your eval job timed out or ran out of memory"
        );
    }
}

#[test]
fn dedent_is_idempotent() {
    let samples = [
        "    a\n      b\n    c",
        "\tx\n\t\ty\n",
        "  \n    only\n  \n",
        "no indent\n  some indent",
        "  \tmixed\n   spaces",
        "",
    ];
    for sample in samples {
        let once = dedent(sample);
        assert_eq!(dedent(&once), once, "sample {sample:?}");
    }
}

#[test]
fn display_text_stays_within_bounds() {
    let inputs = [
        "x".repeat(5000),
        "line\n".repeat(200),
        "short\nlines\n".to_string(),
        "é".repeat(999),
    ];
    for stdout in inputs {
        let formatted = format_result(&ExecutionResult::new(stdout, Some(0)));
        assert!(formatted.display_text.lines().count() <= 11);
        assert!(formatted.display_text.chars().count() < 1000);
    }
}
