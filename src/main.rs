// Entrypoint for the one-shot backup.
// - Keeps `main` small: run the backup once, print the summary and exit.
// - Backup failures are reported on the console, not through the exit code.

use drive_backup::shell::run_backup_with_spinner;

fn main() -> anyhow::Result<()> {
    // Verbosity is controlled by RUST_LOG.
    env_logger::init();

    if let Err(e) = run_backup_with_spinner() {
        println!("{:#}", e);
    }
    Ok(())
}
