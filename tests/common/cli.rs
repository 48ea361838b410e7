//! CLI test runner with fluent assertions.
//!
//! Provides infrastructure for executing the `rcb` binary against an isolated
//! environment and verifying output, exit codes and JSON responses in robot
//! mode.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde_json::Value;

/// Configuration for CLI test runs.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Environment variables to set for the command.
    pub env_vars: HashMap<String, String>,
    /// Working directory for command execution.
    pub working_dir: Option<PathBuf>,
    /// Standard input to provide to the command.
    pub stdin: Option<String>,
}

/// Test runner for the `rcb` CLI binary.
///
/// Every run gets `--data-dir`/`--cache-dir` inside `root`, and the platform
/// config dir is pointed at `root` so no user settings file is picked up.
///
/// # Example
///
/// ```ignore
/// let cli = CliRunner::new(env.root());
/// cli.run(&["list", "--robot"])
///    .assert_success()
///    .assert_json_array_len("", 1);
/// ```
pub struct CliRunner {
    binary_path: PathBuf,
    root: PathBuf,
    config: CliConfig,
}

impl CliRunner {
    /// Create a runner isolated under `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        // Set by cargo test for binary targets
        let binary = env!("CARGO_BIN_EXE_rcb");
        Self {
            binary_path: PathBuf::from(binary),
            root: root.to_path_buf(),
            config: CliConfig::default(),
        }
        .with_env("RUST_LOG", "off")
    }

    /// Add an environment variable for command execution.
    #[must_use]
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.config
            .env_vars
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Set the working directory for command execution.
    #[must_use]
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.config.working_dir = Some(dir);
        self
    }

    /// Set standard input for the command.
    #[must_use]
    pub fn with_stdin(mut self, stdin: &str) -> Self {
        self.config.stdin = Some(stdin.to_string());
        self
    }

    /// Execute the command with the given arguments.
    ///
    /// # Panics
    ///
    /// Panics if the command fails to execute.
    #[must_use]
    pub fn run(&self, args: &[&str]) -> CliResult {
        let data_dir = self.root.join("data");
        let cache_dir = self.root.join("cache");

        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("--data-dir")
            .arg(&data_dir)
            .arg("--cache-dir")
            .arg(&cache_dir)
            .args(args)
            .env_remove("RCB_CONFIG")
            .env_remove("RCB_FORMAT")
            .env_remove("NO_COLOR")
            .env("XDG_CONFIG_HOME", self.root.join("xdg-config"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        for (key, value) in &self.config.env_vars {
            cmd.env(key, value);
        }
        if let Some(ref dir) = self.config.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().expect("Failed to execute command");
        {
            let mut stdin = child.stdin.take().expect("stdin is piped");
            if let Some(input) = &self.config.stdin {
                stdin.write_all(input.as_bytes()).expect("Failed to write stdin");
            }
        }
        let output = child.wait_with_output().expect("Failed to wait for command");

        CliResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            args: args.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Execute with `--robot` flag for JSON output.
    #[must_use]
    pub fn run_robot(&self, args: &[&str]) -> CliResult {
        let mut full_args = vec!["--robot"];
        full_args.extend(args);
        self.run(&full_args)
    }
}

/// Captured output from CLI execution with fluent assertions.
#[derive(Debug, Clone)]
pub struct CliResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub args: Vec<String>,
}

impl CliResult {
    /// Check if the command succeeded (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    // === Fluent Assertions (all return &Self for chaining) ===

    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success(),
            "Command {:?} failed with exit code {}: {}",
            self.args,
            self.exit_code,
            self.stderr
        );
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.success(),
            "Command {:?} unexpectedly succeeded",
            self.args
        );
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "stdout does not contain \"{text}\"\nActual stdout:\n{}",
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "stderr does not contain \"{text}\"\nActual stderr:\n{}",
            self.stderr
        );
        self
    }

    // === JSON Assertions (for robot mode) ===

    /// Parse stdout as JSON.
    ///
    /// # Panics
    ///
    /// Panics if stdout is not valid JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(self.stdout.trim())
            .unwrap_or_else(|_| panic!("Failed to parse JSON from stdout:\n{}", self.stdout))
    }

    /// Parse stderr as JSON (robot-mode errors).
    ///
    /// # Panics
    ///
    /// Panics if stderr is not valid JSON.
    #[must_use]
    pub fn stderr_json(&self) -> Value {
        serde_json::from_str(self.stderr.trim())
            .unwrap_or_else(|_| panic!("Failed to parse JSON from stderr:\n{}", self.stderr))
    }

    /// Assert a JSON field matches an expected value using JSON pointer syntax.
    pub fn assert_json_field(&self, json_pointer: &str, expected: &Value) -> &Self {
        let json = self.json();
        let actual = json.pointer(json_pointer).unwrap_or_else(|| {
            panic!(
                "JSON path {json_pointer} not found in:\n{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            )
        });
        assert_eq!(actual, expected, "JSON field {json_pointer} mismatch");
        self
    }

    /// Assert a JSON array has the expected length.
    pub fn assert_json_array_len(&self, json_pointer: &str, expected_len: usize) -> &Self {
        let json = self.json();
        let arr = json
            .pointer(json_pointer)
            .unwrap_or_else(|| panic!("JSON path {json_pointer} not found"))
            .as_array()
            .unwrap_or_else(|| panic!("JSON path {json_pointer} is not an array"))
            .clone();
        assert_eq!(
            arr.len(),
            expected_len,
            "Array at {json_pointer} has {} elements, expected {expected_len}",
            arr.len()
        );
        self
    }
}
