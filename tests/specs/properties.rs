//! Round-trip/idempotence properties (§8), backed by `proptest` rather
//! than single hand-picked examples.

use std::io::Write;
use std::process::Stdio;

use proptest::prelude::*;

use super::prelude::*;

fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9]{1,8}", 1..8)
}

fn pattern_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z]{1,5}"
}

fn joined(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Pipe `stdin_bytes` into an `ungrep` invocation and capture its stdout.
fn run_piped(args: &[&str], stdin_bytes: &[u8]) -> Vec<u8> {
    let mut child = ungrep_cmd()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stdin_bytes).unwrap();
    let output = child.wait_with_output().unwrap();
    output.stdout
}

proptest! {
    /// `grep '' F` emits every line of `F` unchanged: the empty pattern
    /// matches at every position, so nothing is filtered out.
    #[test]
    fn empty_pattern_emits_every_line(lines in lines_strategy()) {
        let (_dir, path) = temp_file("input.txt", &joined(&lines));
        let output = ungrep_cmd().args(["", path.to_str().unwrap()]).output().unwrap();
        prop_assert!(output.status.success());
        prop_assert_eq!(String::from_utf8_lossy(&output.stdout), joined(&lines));
    }

    /// `grep -F s F | grep -F s` is stable: filtering a second time with
    /// the same fixed string changes nothing, since every surviving line
    /// already contains it.
    #[test]
    fn fixed_string_filter_is_idempotent(lines in lines_strategy(), s in pattern_strategy()) {
        let (_dir, path) = temp_file("input.txt", &joined(&lines));
        let once = ungrep_cmd()
            .args(["-F", &s, path.to_str().unwrap()])
            .output()
            .unwrap()
            .stdout;
        let twice = run_piped(&["-F", &s], &once);
        prop_assert_eq!(once, twice);
    }

    /// `grep -v P | grep P` is empty: every line that survives inversion
    /// is, by construction, a line `P` did not match.
    #[test]
    fn inverted_then_direct_match_is_empty(lines in lines_strategy(), p in pattern_strategy()) {
        let (_dir, path) = temp_file("input.txt", &joined(&lines));
        let inverted = ungrep_cmd()
            .args(["-v", &p, path.to_str().unwrap()])
            .output()
            .unwrap()
            .stdout;
        let rematched = run_piped(&[&p], &inverted);
        prop_assert!(rematched.is_empty());
    }
}
