use kiauto_core::init_logging;

mod app;
mod commands;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = app::build_cli();
    let matches = app.get_matches();

    // Extract logging flags before running any command
    if !matches.get_flag("quiet") {
        init_logging(matches.get_count("verbose"));
    }

    commands::run_command(&matches)?;

    Ok(())
}
