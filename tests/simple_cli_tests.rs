use assert_cmd::cargo::cargo_bin_cmd;

/// Tests that `--help` is handled successfully by the CLI.
///
/// This test verifies:
/// 1. Running `cardwise-cli --help` exits successfully
/// 2. The help text lists the top-level command groups
/// 3. No unexpected stderr output is produced
#[test]
fn test_cli_help_success() {
  let mut cmd = cargo_bin_cmd!("cardwise-cli");

  let assert = cmd.arg("--help").assert().success();

  let out = assert.get_output();
  let stdout = String::from_utf8_lossy(&out.stdout);
  println!("=== cardwise-cli --help stdout ===\n\n{}\n==================================", stdout);

  for group in ["card", "wishlist", "scan", "settings", "seed"] {
  	assert!(stdout.contains(group), "expected `{}` in --help output", group);
  }
  assert!(
  	out.stderr.is_empty(),
  	"expected empty stderr for --help, got:\n{}",
  	String::from_utf8_lossy(&out.stderr)
  );
}

/// Tests that an unreachable server is reported on stderr with a non-zero exit.
#[test]
fn test_cli_reports_unreachable_server() {
  let mut cmd = cargo_bin_cmd!("cardwise-cli");

  let assert = cmd
  	.args(["--server-url", "http://127.0.0.1:9", "card", "list"])
  	.assert()
  	.failure();

  let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
  assert!(stderr.starts_with("Error:"), "unexpected stderr:\n{}", stderr);
}

/// Tests that subcommand arguments are validated before any request is made.
#[test]
fn test_cli_rejects_bad_priority() {
  let mut cmd = cargo_bin_cmd!("cardwise-cli");

  cmd.args([
  	"wishlist", "add",
  	"--player", "Connor McDavid",
  	"--sport", "Hockey",
  	"--priority", "urgent",
  ])
  .assert()
  .failure()
  .code(2);
}
