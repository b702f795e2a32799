// Entrypoint for the interactive shell variant.

use drive_backup::shell::main_menu;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Blocks until the user picks "Exit".
    main_menu()?;
    Ok(())
}
