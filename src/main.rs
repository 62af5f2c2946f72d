mod ui;

use std::env;
use std::io;
use std::time::Duration;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use footprint::config::Settings;
use footprint::{logging, routes};

use crate::ui::app::{App, Selection};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!("footprint {} - keyboard shortcut dispatcher demo", VERSION);
    println!();
    println!("USAGE:");
    println!("    footprint [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help              Print help information");
    println!("    -v, --version           Print version information");
    println!("    --route <PATH>          Start on this route (default: {})", routes::DASHBOARD);
    println!("    --width <PX>            Fixed viewport width instead of the terminal's");
    println!();
    println!("Settings are read from ~/.footprint/settings.json");
}

struct Options {
    route: String,
    width: Option<u32>,
}

/// Parse arguments. `Ok(None)` means the program already printed what was asked and should exit.
fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut options = Options {
        route: routes::DASHBOARD.to_string(),
        width: None,
    };
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(None);
            }
            "-v" | "--version" => {
                println!("footprint {}", VERSION);
                return Ok(None);
            }
            "--route" => {
                let route = iter.next().ok_or("--route requires a path")?;
                if !route.starts_with('/') {
                    return Err(format!("route must start with '/': {}", route));
                }
                options.route = route.clone();
            }
            "--width" => {
                let width = iter.next().ok_or("--width requires a pixel value")?;
                let width = width
                    .parse::<u32>()
                    .map_err(|_| format!("invalid width: {}", width))?;
                options.width = Some(width);
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
    }
    Ok(Some(options))
}

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => return Ok(()),
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Use --help for usage information");
            return Ok(());
        }
    };

    let settings = Settings::load();
    if let Err(e) = logging::init(&settings) {
        eprintln!("Warning: logging disabled: {}", e);
    }
    info!(route = %options.route, width = ?options.width, "starting");

    let (columns, _) = terminal::size()?;
    let mut app = App::new(&settings, &options.route, columns, options.width, Selection::open());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, crossterm::cursor::Show)?;

    if let Err(err) = result {
        error!(error = %err, "terminal loop failed");
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw::draw(f, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) => {
                    if app.handle_key(key) {
                        return Ok(());
                    }
                }
                Event::Resize(columns, _) => app.on_resize(columns),
                _ => {}
            }
        }
    }
}
