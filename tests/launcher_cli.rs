// tests/launcher_cli.rs
mod common;
use crate::common::{concur, init_tracing, unique_prefix};

use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::thread;
use std::time::{Duration, Instant};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn command_output_passes_through_unmodified() -> TestResult {
    init_tracing();
    let prefix = unique_prefix("echo");

    let out = concur(&prefix).args(["echo", "hello"]).output()?;

    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout)?, "hello\n");
    Ok(())
}

#[test]
fn worker_exit_status_is_not_propagated() -> TestResult {
    init_tracing();
    let prefix = unique_prefix("exit7");

    let out = concur(&prefix).args(["sh", "-c", "echo out; echo err >&2; exit 7"]).output()?;

    assert!(out.status.success(), "launcher must succeed: {:?}", out.status);
    assert_eq!(String::from_utf8(out.stdout)?, "out\n");
    assert!(String::from_utf8(out.stderr)?.contains("err"));
    Ok(())
}

#[test]
fn foreground_mode_also_discards_worker_status() -> TestResult {
    init_tracing();
    let prefix = unique_prefix("fg");

    let status = concur(&prefix).args(["--no-detach", "false"]).status()?;

    assert!(status.success());
    Ok(())
}

#[test]
fn missing_command_is_reported_but_launcher_succeeds() -> TestResult {
    init_tracing();
    let prefix = unique_prefix("noexec");

    let out = concur(&prefix)
        .arg("/nonexistent/concur-test-binary")
        .output()?;

    assert!(out.status.success());
    assert!(String::from_utf8(out.stderr)?.contains("cannot execute command"));
    Ok(())
}

#[test]
fn invalid_capacity_aborts_before_running_anything() -> TestResult {
    init_tracing();
    let prefix = unique_prefix("cap0");

    let out = concur(&prefix)
        .args(["--capacity", "0", "echo", "should-not-run"])
        .output()?;

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8(out.stderr)?.contains("capacity"));
    Ok(())
}

#[test]
fn dry_run_prints_pool_for_parent_process() -> TestResult {
    init_tracing();
    let prefix = unique_prefix("dry");

    let out = concur(&prefix)
        .args(["--dry-run", "--capacity", "3", "echo", "never"])
        .output()?;

    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout)?;
    let expected = format!(
        "pool = /{prefix}.{}.{}",
        nix::unistd::geteuid().as_raw(),
        std::process::id()
    );
    assert!(stdout.contains(&expected), "stdout was: {stdout}");
    assert!(stdout.contains("capacity (if created) = 3"));
    assert!(!stdout.contains("never\n"));
    Ok(())
}

/// With capacity C and C+1 launchers, one must wait for a slot.
#[test]
fn saturated_pool_never_runs_more_than_capacity() -> TestResult {
    init_tracing();
    let prefix = unique_prefix("saturate");
    let scratch = tempfile::tempdir()?;
    let dir = scratch.path().to_path_buf();

    // Each worker counts the workers running alongside it (itself included).
    let script = r#"touch "$1/run.$$"; ls "$1" | grep -c '^run\.' > "$1/seen.$$"; sleep 0.4; rm "$1/run.$$""#;

    let started = Instant::now();
    let launchers: Vec<_> = (0..3)
        .map(|_| {
            let mut cmd = concur(&prefix);
            cmd.args(["--capacity", "2", "sh", "-c", script, "sh"])
                .arg(&dir);
            thread::spawn(move || cmd.output())
        })
        .collect();

    for handle in launchers {
        let out = handle.join().expect("launcher thread panicked")?;
        assert!(out.status.success());
    }
    let elapsed = started.elapsed();

    let mut seen = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(!name.starts_with("run."), "worker {name} never finished");
        if name.starts_with("seen.") {
            seen.push(fs::read_to_string(&path)?.trim().parse::<u32>()?);
        }
    }

    assert_eq!(seen.len(), 3, "every worker must run exactly once");
    assert!(seen.iter().all(|&n| n <= 2), "observed concurrency {seen:?}");
    assert!(
        elapsed >= Duration::from_millis(800),
        "third worker did not wait for a slot (took {elapsed:?})"
    );
    Ok(())
}

#[test]
fn unexecutable_commands_do_not_fail_the_launcher() -> TestResult {
    init_tracing();
    let scratch = tempfile::tempdir()?;

    let not_a_dir = scratch.path().join("plain");
    fs::write(&not_a_dir, "data")?;
    let garbage = scratch.path().join("garbage");
    fs::write(&garbage, [0x13u8, 0x37, 0x00, 0xff, 0x42, 0x42, 0x42, 0x42])?;
    fs::set_permissions(&garbage, fs::Permissions::from_mode(0o755))?;

    for target in [not_a_dir.join("x"), garbage] {
        let prefix = unique_prefix("badexec");
        let out = concur(&prefix).arg("--no-detach").arg(&target).output()?;

        let stderr = String::from_utf8(out.stderr)?;
        assert!(out.status.success(), "{target:?}: {:?} {stderr}", out.status);
        assert!(stderr.contains("cannot execute command"), "{target:?}: {stderr}");
        assert!(!stderr.contains("concur error"), "{target:?}: {stderr}");
    }
    Ok(())
}
