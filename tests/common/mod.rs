//! Runs tests using the actual binary, adapted from 'fd' method: https://github.com/sharkdp/fd/blob/master/tests/testenv/mod.rs
#![allow(dead_code)]
use std::env;
use std::path::PathBuf;
use std::process;

/// Environment for the integration tests.
pub struct TestEnv {
    /// Path to the *ykushctl* executable.
    exe: PathBuf,
}

/// Find the *ykushctl* executable.
fn find_exe() -> PathBuf {
    // Tests exe is in target/debug/deps, the *ykushctl* exe is in target/debug
    let root = env::current_exe()
        .expect("tests executable")
        .parent()
        .expect("tests executable directory")
        .parent()
        .expect("ykushctl executable directory")
        .to_path_buf();

    let exe_name = if cfg!(windows) {
        "ykushctl.exe"
    } else {
        "ykushctl"
    };

    root.join(exe_name)
}

impl TestEnv {
    pub fn new() -> TestEnv {
        TestEnv { exe: find_exe() }
    }

    /// Run *ykushctl* with `args` and return the full output.
    pub fn run(&self, args: &[&str]) -> process::Output {
        process::Command::new(&self.exe)
            .args(args)
            .output()
            .expect("ykushctl output")
    }

    /// Assert *ykushctl* exits nonzero with `expected` somewhere in stderr.
    pub fn assert_failure_with_stderr(&self, args: &[&str], expected: &str) {
        let output = self.run(args);
        let stderr = String::from_utf8_lossy(&output.stderr);

        assert!(
            !output.status.success(),
            "`ykushctl {}` unexpectedly exited successfully.\nstderr:\n---\n{}---",
            args.join(" "),
            stderr
        );
        assert!(
            stderr.contains(expected),
            "`ykushctl {}` stderr did not contain '{}'.\nstderr:\n---\n{}---",
            args.join(" "),
            expected,
            stderr
        );
    }
}
