use std::path::PathBuf;
use std::time::Duration;

use clap::ArgMatches;
use tracing::{error, info, warn};

use kiauto_core::config::AutomationConfig;
use kiauto_core::errors::KiautoError;
use kiauto_core::events;
use kiauto_core::{
    ClipboardBridge, CommandTool, LogContext, SessionConfig, SessionLauncher, SupervisedProcess,
    WindowHandle, WindowSynchronizer, WindowWait,
};

#[derive(serde::Serialize)]
struct WindowResponse<'a> {
    name: &'a str,
    pattern: &'a str,
    handle: &'a WindowHandle,
}

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
fn load_config_with_warning() -> AutomationConfig {
    match AutomationConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.kiauto/config.toml and ./.kiauto/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            AutomationConfig::default()
        }
    }
}

/// Log a core error with its code and hand it back boxed.
fn report<E: KiautoError>(e: E) -> Box<dyn std::error::Error> {
    events::log_core_error(&e);
    Box::new(e)
}

fn timeout_arg(matches: &ArgMatches) -> Result<Option<Duration>, Box<dyn std::error::Error>> {
    let Some(secs) = matches.get_one::<f64>("timeout") else {
        return Ok(None);
    };
    match Duration::try_from_secs_f64(*secs) {
        Ok(timeout) if !timeout.is_zero() => Ok(Some(timeout)),
        _ => Err(format!("Timeout must be a positive number of seconds, got {secs}").into()),
    }
}

fn window_synchronizer(config: &AutomationConfig, log: &LogContext) -> WindowSynchronizer {
    WindowSynchronizer::new(
        Box::new(CommandTool::new(config.tools.window_tool())),
        log,
    )
    .with_polling(config.polling.window())
}

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let result = match matches.subcommand() {
        Some(("wait-window", sub_matches)) => handle_wait_window_command(sub_matches),
        Some(("wait-focus", sub_matches)) => handle_wait_focus_command(sub_matches),
        Some(("clipboard", sub_matches)) => handle_clipboard_command(sub_matches),
        Some(("run", sub_matches)) => handle_run_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };

    events::log_app_shutdown();
    result
}

fn handle_wait_window_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let name = matches
        .get_one::<String>("name")
        .ok_or("Window name argument is required")?;
    let pattern = matches
        .get_one::<String>("pattern")
        .ok_or("Pattern argument is required")?;
    let json_output = matches.get_flag("json");

    let mut request = WindowWait::new(name.as_str(), pattern.as_str())
        .focus(!matches.get_flag("no-focus"));
    if let Some(timeout) = timeout_arg(matches)? {
        request = request.timeout(timeout);
    }
    if let Some(skip) = matches.get_one::<String>("skip-id") {
        request = request.skip(skip.as_str());
    }

    info!(
        event = "cli.wait_window_started",
        name = %name,
        pattern = %pattern,
        focus = request.focus
    );

    let config = load_config_with_warning();
    let synchronizer = window_synchronizer(&config, &LogContext::default());
    let handle = synchronizer.wait_for_window(&request).map_err(report)?;

    if json_output {
        let response = WindowResponse {
            name,
            pattern,
            handle: &handle,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{handle}");
    }

    info!(event = "cli.wait_window_completed", handle = %handle);
    Ok(())
}

fn handle_wait_focus_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let handle = matches
        .get_one::<String>("handle")
        .map(|id| WindowHandle::from(id.as_str()))
        .ok_or("Window handle argument is required")?;
    let lost = matches.get_flag("lost");
    let timeout = timeout_arg(matches)?;

    let config = load_config_with_warning();
    let synchronizer = window_synchronizer(&config, &LogContext::default());

    if lost {
        synchronizer
            .wait_focus_lost(&handle, timeout)
            .map_err(report)?;
    } else {
        synchronizer
            .wait_focus_gained(&handle, timeout)
            .map_err(report)?;
    }

    info!(
        event = "cli.wait_focus_completed",
        handle = %handle,
        lost = lost
    );
    Ok(())
}

fn handle_clipboard_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_warning();
    let bridge = ClipboardBridge::new(config.tools.clipboard_tool(), &LogContext::default());

    match matches.subcommand() {
        Some(("store", store_matches)) => {
            let text = store_matches
                .get_one::<String>("text")
                .ok_or("Text argument is required")?;
            bridge.store(text).map_err(report)?;
            info!(event = "cli.clipboard_store_completed", bytes = text.len());
        }
        Some(("retrieve", _)) => {
            let text = bridge.retrieve().map_err(report)?;
            print!("{text}");
            info!(event = "cli.clipboard_retrieve_completed", bytes = text.len());
        }
        _ => return Err("Unknown clipboard command".into()),
    }

    Ok(())
}

fn handle_run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let mut command_line = matches
        .get_many::<String>("command")
        .ok_or("Command argument is required")?;
    let program = command_line.next().ok_or("Command argument is required")?;
    let args: Vec<&String> = command_line.collect();

    let config = load_config_with_warning();
    let mut session_config = SessionConfig::from(&config);
    if let Some(width) = matches.get_one::<u32>("width") {
        session_config.width = *width;
    }
    if let Some(height) = matches.get_one::<u32>("height") {
        session_config.height = *height;
    }
    if let Some(depth) = matches.get_one::<String>("depth") {
        session_config.color_depth = depth.parse()?;
    }
    if let Some(record) = matches.get_one::<String>("record") {
        session_config.record_to = Some(PathBuf::from(record));
    }
    if session_config.width == 0 || session_config.height == 0 {
        return Err("Display dimensions must be non-zero".into());
    }

    let log = LogContext::default();
    let session = SessionLauncher::from_config(&config, &log)
        .open(&session_config)
        .map_err(report)?;

    info!(
        event = "cli.run_started",
        display = %session.display(),
        program = %program,
        recording = session.is_recording()
    );

    let mut command = session.command(program);
    command.args(&args);
    let process = SupervisedProcess::spawn(&mut command, &log).map_err(report)?;
    let status = process.wait().map_err(report)?;

    session.close();

    if !status.success() {
        error!(
            event = "cli.run_failed",
            program = %program,
            status = %status
        );
        return Err(format!("'{program}' exited with {status}").into());
    }

    info!(event = "cli.run_completed", program = %program);
    Ok(())
}
