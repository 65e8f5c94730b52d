//! Harness scenarios against a real Python interpreter.
//!
//! Each test returns early when python3 is not on PATH, so the suite
//! stays green on machines without it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use grindstone_core::error::HarnessError;
use grindstone_core::harness::Harness;
use grindstone_core::store::CustomCase;
use serde_json::json;

const TWO_SUM: &str = r#"
class Solution:
    def twoSum(self, nums, target):
        seen = {}
        for i, n in enumerate(nums):
            if target - n in seen:
                return [seen[target - n], i]
            seen[n] = i
        return []
"#;

fn python_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn write_solution(dir: &Path, source: &str) -> PathBuf {
    let path = dir.join("solution.py");
    std::fs::write(&path, source).unwrap();
    path
}

#[tokio::test]
async fn passing_solution_yields_clean_verdict() {
    if !python_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let solution = write_solution(dir.path(), TWO_SUM);
    let cases = vec![CustomCase {
        input: json!([[2, 7, 11, 15], 9]),
        expected: Some(json!([0, 1])),
    }];
    let examples = "Input: nums = [2,7,11,15], target = 9\n\nInput: nums = [3,2,4], target = 6";

    let verdict = Harness::default().run(&solution, examples, &cases).await.unwrap();
    assert!(verdict.passed, "output: {}", verdict.output);
    assert_eq!(verdict.failed_count, 0);
    assert!(verdict.output.contains("example 1: [0, 1]"));
    assert!(verdict.output.contains("case 1: ok"));
    assert!(!dir.path().join(".grindstone_runner.py").exists());
}

#[tokio::test]
async fn expected_mismatch_counts_as_failure() {
    if !python_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let solution = write_solution(dir.path(), TWO_SUM);
    let cases = vec![CustomCase {
        input: json!([[2, 7, 11, 15], 9]),
        expected: Some(json!([1, 0])),
    }];

    let verdict = Harness::default().run(&solution, "", &cases).await.unwrap();
    assert!(!verdict.passed);
    assert_eq!(verdict.failed_count, 1);
    assert!(verdict.output.contains("expected=[1, 0]"));
    assert!(verdict.output.contains("got=[0, 1]"));
}

#[tokio::test]
async fn echo_solution_passes_expected_and_prints_unchecked_results() {
    if !python_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let solution = write_solution(
        dir.path(),
        "class Solution:\n    def echo(self, x):\n        return x\n",
    );
    let cases = vec![
        CustomCase {
            input: json!([5]),
            expected: Some(json!(5)),
        },
        // Non-list input is wrapped into a single argument.
        CustomCase {
            input: json!("hi"),
            expected: None,
        },
    ];

    let verdict = Harness::default().run(&solution, "", &cases).await.unwrap();
    assert!(verdict.passed, "output: {}", verdict.output);
    assert_eq!(verdict.failed_count, 0);
    assert!(verdict.output.contains("case 1: ok"));
    assert!(verdict.output.contains("case 2: 'hi'"));
}

#[tokio::test]
async fn raising_case_does_not_stop_the_run() {
    if !python_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let solution = write_solution(
        dir.path(),
        "class Solution:\n    def pick(self, n):\n        if n == 1:\n            raise ValueError('boom')\n        return n * 2\n",
    );

    let verdict = Harness::default()
        .run(&solution, "Input: n = 1\n\nInput: n = 2", &[])
        .await
        .unwrap();
    assert!(!verdict.passed);
    assert_eq!(verdict.failed_count, 1);
    assert!(verdict.output.contains("example 1 raised:"));
    assert!(verdict.output.contains("ValueError"));
    assert!(verdict.output.contains("example 2: 4"));
}

#[tokio::test]
async fn unlabeled_multiline_case_maps_lines_to_arguments() {
    if !python_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let solution = write_solution(dir.path(), TWO_SUM);

    let verdict = Harness::default()
        .run(&solution, "[2,7,11,15]\n9", &[])
        .await
        .unwrap();
    assert!(verdict.passed, "output: {}", verdict.output);
    assert!(verdict.output.contains("example 1: [0, 1]"));
}

#[tokio::test]
async fn bracketed_example_keeps_equals_inside_literals() {
    if !python_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let solution = write_solution(
        dir.path(),
        "class Solution:\n    def first(self, items):\n        return items[0]\n",
    );

    // A line that opens with a bracket is one literal, not an
    // assignment list, even when an "=" sits inside a string element.
    let verdict = Harness::default()
        .run(&solution, r#"["k=v", "plain"]"#, &[])
        .await
        .unwrap();
    assert!(verdict.passed, "output: {}", verdict.output);
    assert_eq!(verdict.failed_count, 0);
    assert!(verdict.output.contains("example 1: 'k=v'"));
}

#[tokio::test]
async fn unloadable_solution_is_a_failed_verdict_not_an_error() {
    if !python_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let solution = write_solution(dir.path(), "class Solution\n    broken(\n");

    let verdict = Harness::default()
        .run(&solution, "Input: n = 1", &[])
        .await
        .unwrap();
    assert!(!verdict.passed);
    assert_eq!(verdict.failed_count, 1);
    assert!(verdict.output.contains("SyntaxError"));
}

#[tokio::test]
async fn missing_solution_class_reports_single_failure() {
    if !python_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let solution = write_solution(dir.path(), "def helper():\n    return 1\n");

    let verdict = Harness::default()
        .run(&solution, "Input: n = 1", &[])
        .await
        .unwrap();
    assert!(!verdict.passed);
    assert_eq!(verdict.failed_count, 1);
    assert!(verdict.output.contains("no callable solution method found"));
}

#[tokio::test]
async fn hanging_worker_times_out_as_failure() {
    if !python_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let solution = write_solution(
        dir.path(),
        "class Solution:\n    def spin(self, n):\n        while True:\n            pass\n",
    );

    let verdict = Harness::default()
        .with_timeout(Duration::from_secs(2))
        .run(&solution, "Input: n = 1", &[])
        .await
        .unwrap();
    assert!(!verdict.passed);
    assert_eq!(verdict.failed_count, 1);
    assert!(verdict.output.contains("timed out"));
}

#[tokio::test]
async fn missing_interpreter_is_a_launch_error() {
    let dir = tempfile::tempdir().unwrap();
    let solution = write_solution(dir.path(), TWO_SUM);

    let err = Harness::new("grindstone-no-such-python")
        .run(&solution, "Input: n = 1", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, HarnessError::Launch { .. }));
}
