//! Python test harness.
//!
//! Runs a solution file against the judge's example block and any
//! user-authored cases inside an isolated worker process, and returns
//! a structured [`Verdict`]. A fault in user code never propagates as
//! an error: worker crashes, timeouts, and unparseable output all
//! surface as failed verdicts with the combined process output as
//! diagnostics. The only hard error is failing to launch the worker
//! at all.
//!
//! Protocol: the solving method name is scanned out of the solution
//! source, the example block is split into case groups on blank
//! lines, and method name plus cases go to the worker as one JSON
//! request on stdin. The worker loads the solution as a module, runs
//! every case even when earlier ones raise, and prints a one-line
//! JSON verdict as its final stdout line.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use indoc::indoc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::HarnessError;
use crate::store::CustomCase;

/// Worker script written next to the solution for the duration of a run.
const RUNNER_FILE: &str = ".grindstone_runner.py";

/// User-authored cases file inside a problem directory.
pub const USER_CASES_FILE: &str = "tests.json";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a harness run. A failing run is a normal verdict, not an
/// error.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub passed: bool,
    pub failed_count: i64,
    /// Merged stdout/stderr of the worker.
    pub output: String,
}

impl Verdict {
    fn fail(failed_count: i64, output: String) -> Self {
        Verdict {
            passed: false,
            failed_count,
            output,
        }
    }
}

#[derive(Serialize)]
struct WorkerRequest<'a> {
    method: Option<&'a str>,
    example: Vec<String>,
    user: &'a [CustomCase],
}

#[derive(Deserialize)]
struct RawVerdict {
    passed: bool,
    failed: i64,
}

/// Test harness driving an external Python interpreter.
#[derive(Debug, Clone)]
pub struct Harness {
    python: String,
    timeout: Duration,
}

impl Default for Harness {
    fn default() -> Self {
        Harness {
            python: "python3".into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Harness {
    pub fn new(python: impl Into<String>) -> Self {
        Harness {
            python: python.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the solution at `solution` against the example block and
    /// user cases.
    ///
    /// Errors only when the interpreter cannot be launched or harness
    /// files cannot be written; everything that goes wrong inside the
    /// worker comes back as a failed [`Verdict`].
    pub async fn run(
        &self,
        solution: &Path,
        examples: &str,
        user_cases: &[CustomCase],
    ) -> Result<Verdict, HarnessError> {
        let source = std::fs::read_to_string(solution).unwrap_or_default();
        let method = detect_method(&source);
        let request = serde_json::to_string(&WorkerRequest {
            method: method.as_deref(),
            example: split_example_cases(examples),
            user: user_cases,
        })?;
        debug!(solution = %solution.display(), ?method, "running harness");

        let dir = solution.parent().unwrap_or_else(|| Path::new("."));
        let runner = RunnerFile::create(dir)?;

        let mut child = Command::new(&self.python)
            .arg(runner.path())
            .arg(solution)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| HarnessError::Launch {
                python: self.python.clone(),
                source: e,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A worker that dies before reading shows up through its
            // exit status below, not as a write error here.
            let _ = stdin.write_all(request.as_bytes()).await;
        }

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(waited) => waited.map_err(|e| HarnessError::Io {
                path: solution.to_path_buf(),
                source: e,
            })?,
            Err(_) => {
                return Ok(Verdict::fail(
                    1,
                    format!("worker timed out after {}s", self.timeout.as_secs()),
                ));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let merged = merge_output(&stdout, &stderr);

        if !output.status.success() {
            return Ok(Verdict::fail(1, merged));
        }
        let verdict_line = stdout.lines().rev().find(|l| !l.trim().is_empty());
        match verdict_line.and_then(|l| serde_json::from_str::<RawVerdict>(l.trim()).ok()) {
            Some(raw) => Ok(Verdict {
                passed: raw.passed,
                failed_count: raw.failed,
                output: merged,
            }),
            None => Ok(Verdict::fail(1, merged)),
        }
    }
}

/// Load user-authored cases from `tests.json` in the problem
/// directory. Missing file means no cases; a file that exists but does
/// not parse is an error.
pub fn load_user_cases(dir: &Path) -> Result<Vec<CustomCase>, HarnessError> {
    let path = dir.join(USER_CASES_FILE);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(HarnessError::Io { path, source: e }),
    };
    serde_json::from_str(&raw).map_err(|e| HarnessError::MalformedCases {
        path,
        message: e.to_string(),
    })
}

/// First public `def` name in the solution source, if any. The worker
/// re-resolves against the instantiated solution object, so a stale or
/// missing name here still ends in a usable method there.
fn detect_method(source: &str) -> Option<String> {
    let re = Regex::new(r"(?m)^\s*def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").ok()?;
    let name = re
        .captures_iter(source)
        .map(|caps| caps[1].to_string())
        .find(|name| !name.starts_with('_'));
    name
}

/// Split the judge's example block into case groups on blank-line
/// boundaries. A block without any boundary is one case.
fn split_example_cases(block: &str) -> Vec<String> {
    block
        .replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_string)
        .collect()
}

fn merge_output(stdout: &str, stderr: &str) -> String {
    let mut merged = stdout.trim_end().to_string();
    let err = stderr.trim();
    if !err.is_empty() {
        if !merged.is_empty() {
            merged.push('\n');
        }
        merged.push_str(err);
    }
    merged
}

struct RunnerFile {
    path: PathBuf,
}

impl RunnerFile {
    fn create(dir: &Path) -> Result<RunnerFile, HarnessError> {
        let path = dir.join(RUNNER_FILE);
        std::fs::write(&path, WORKER_SCRIPT).map_err(|e| HarnessError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(RunnerFile { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunnerFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// The worker. Arguments for example cases come from a permissive
/// literal parse: an `Input:` label is stripped, `name=value` pairs
/// are split on top-level commas, a line that opens with a bracket or
/// carries no `=` is evaluated whole, and a multi-line group without
/// labels is one argument per line. User cases carry structured
/// arguments directly and compare against `expected` when present.
/// Per-case exceptions count as failures but never stop the run.
const WORKER_SCRIPT: &str = indoc! {r#"
    import ast
    import importlib.util
    import json
    import sys
    import traceback


    def load_module(path):
        spec = importlib.util.spec_from_file_location("solution", path)
        mod = importlib.util.module_from_spec(spec)
        spec.loader.exec_module(mod)
        return mod


    def split_top_level(text):
        parts = []
        depth = 0
        cur = ""
        for ch in text:
            if ch in "([{":
                depth += 1
            elif ch in ")]}":
                depth -= 1
            if ch == "," and depth == 0:
                parts.append(cur)
                cur = ""
            else:
                cur += ch
        if cur.strip():
            parts.append(cur)
        return parts


    def parse_line(line):
        line = line.strip()
        if line.startswith("Input:"):
            line = line[len("Input:"):].strip()
        if "=" in line and not line.startswith(("[", "{", "(")):
            args = []
            for part in split_top_level(line):
                _, _, value = part.partition("=")
                args.append(ast.literal_eval(value.strip()))
            return args
        value = ast.literal_eval(line)
        if isinstance(value, tuple):
            return list(value)
        return [value]


    def parse_case(chunk):
        lines = [l for l in chunk.splitlines() if l.strip()]
        for line in lines:
            if line.strip().startswith("Input:"):
                return parse_line(line)
        if len(lines) == 1:
            return parse_line(lines[0])
        return [ast.literal_eval(l.strip()) for l in lines]


    def pick_method(sol, name):
        if name:
            cand = getattr(sol, name, None)
            if callable(cand):
                return cand
        for attr in dir(sol):
            if attr.startswith("_"):
                continue
            cand = getattr(sol, attr)
            if callable(cand):
                return cand
        return None


    def main():
        req = json.load(sys.stdin)
        try:
            mod = load_module(sys.argv[1])
            cls = getattr(mod, "Solution", None)
            sol = cls() if cls is not None else None
        except Exception:
            traceback.print_exc(file=sys.stdout)
            print(json.dumps({"passed": False, "failed": 1}))
            return
        method = pick_method(sol, req.get("method")) if sol is not None else None
        failed = 0
        if method is None:
            print("no callable solution method found")
            failed += 1
        else:
            for i, chunk in enumerate(req.get("example", []), 1):
                try:
                    got = method(*parse_case(chunk))
                    print(f"example {i}: {got!r}")
                except Exception:
                    failed += 1
                    print(f"example {i} raised:")
                    traceback.print_exc(file=sys.stdout)
            for i, case in enumerate(req.get("user", []), 1):
                try:
                    args = case["input"]
                    if not isinstance(args, list):
                        args = [args]
                    got = method(*args)
                    if "expected" in case:
                        if got == case["expected"]:
                            print(f"case {i}: ok")
                        else:
                            failed += 1
                            print(f"case {i}: expected={case['expected']!r} got={got!r}")
                    else:
                        print(f"case {i}: {got!r}")
                except Exception:
                    failed += 1
                    print(f"case {i} raised:")
                    traceback.print_exc(file=sys.stdout)
        print(json.dumps({"passed": failed == 0, "failed": failed}))


    if __name__ == "__main__":
        main()
"#};
