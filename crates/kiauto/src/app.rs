use clap::{Arg, ArgAction, Command, value_parser};

pub fn build_cli() -> Command {
    Command::new("kiauto")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Drive GUI applications headlessly inside a virtual X display")
        .long_about("kiauto exposes the automation primitives used to script GUI-only export and check actions: waiting for windows and focus changes, moving text through the clipboard, and running a command inside a supervised virtual display with optional screen recording.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase logging output (-v info, -vv debug)")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Disable logging output")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("wait-window")
                .about("Wait for a visible window whose title matches a pattern")
                .arg(
                    Arg::new("name")
                        .help("Name of the window, used in messages")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("pattern")
                        .help("Regular expression matched against window titles")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .short('t')
                        .help("Seconds to wait (overrides config)")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("no-focus")
                        .long("no-focus")
                        .help("Do not focus the window once found")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("skip-id")
                        .long("skip-id")
                        .help("Ignore the window with this id"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("wait-focus")
                .about("Wait for a window to gain (or lose) input focus")
                .arg(
                    Arg::new("handle")
                        .help("Window id as printed by wait-window")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("lost")
                        .long("lost")
                        .help("Wait for the window to lose focus instead")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .short('t')
                        .help("Seconds to wait (overrides config)")
                        .value_parser(value_parser!(f64)),
                ),
        )
        .subcommand(
            Command::new("clipboard")
                .about("Move text in and out of the clipboard")
                .subcommand_required(true)
                .subcommand(
                    Command::new("store")
                        .about("Put text on the clipboard")
                        .arg(
                            Arg::new("text")
                                .help("Text to store")
                                .required(true)
                                .allow_hyphen_values(true)
                                .index(1),
                        ),
                )
                .subcommand(
                    Command::new("retrieve").about("Print the clipboard text"),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Run a command inside a virtual display and wait for it")
                .arg(
                    Arg::new("width")
                        .long("width")
                        .help("Screen width in pixels (overrides config)")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("height")
                        .long("height")
                        .help("Screen height in pixels (overrides config)")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("depth")
                        .long("depth")
                        .help("Color depth in bits (overrides config)")
                        .value_parser(["8", "16", "24", "32"]),
                )
                .arg(
                    Arg::new("record")
                        .long("record")
                        .short('r')
                        .help("Record the screen into this video file"),
                )
                .arg(
                    Arg::new("command")
                        .help("Command and arguments to run")
                        .required(true)
                        .num_args(1..)
                        .last(true),
                ),
        )
}
