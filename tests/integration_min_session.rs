// Minimal integration test that drives the compiled binary through a PTY.
// This exercises the real event loop, mouse capture and key handling
// without relying on internal modules.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Marked Unix-only and ignored by default to avoid CI/platform issues.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn reflex_session_starts_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("aimr");
    let log = tempfile::NamedTempFile::new()?;
    let cmd = format!(
        "{} --mode reflex --seed 7 --log-file {}",
        bin.display(),
        log.path().display()
    );

    let mut p = spawn(cmd)?;

    // Give the app a moment to enter the alternate screen
    std::thread::sleep(Duration::from_millis(300));

    // Stop the drill, then leave from the summary screen
    p.send("s")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}
