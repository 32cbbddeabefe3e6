//! Etch entrypoint.
use anyhow::Result;
use clap::Parser;
use core_config::PaletteChoice;
use core_editor::Editor;
use core_events::InputEvent;
use core_render::{Palette, Screen};
use core_terminal::{CrosstermTerminal, TerminalBackend};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "etch", version, about = "Etch editor")]
struct Args {
    /// Files to open at startup; the last one becomes the active document.
    pub paths: Vec<PathBuf>,
    /// Optional configuration file path (overrides discovery of `etch.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Use the bright palette regardless of configuration.
    #[arg(long, conflicts_with = "dark")]
    pub bright: bool,
    /// Use the dark palette regardless of configuration.
    #[arg(long)]
    pub dark: bool,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("etch.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "etch.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        Err(_) => {
            // Global subscriber already installed; drop guard so writer shuts down.
            None
        }
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn pick_palette(args: &Args, configured: PaletteChoice) -> Palette {
    if args.bright {
        Palette::bright()
    } else if args.dark {
        Palette::dark()
    } else {
        match configured {
            PaletteChoice::Bright => Palette::bright(),
            PaletteChoice::Dark => Palette::dark(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = core_config::load_from(args.config.clone())?;
    let palette = pick_palette(&args, config.ui.palette);

    let mut editor = Editor::new(config, palette);
    for path in &args.paths {
        editor.open_path(path);
    }

    let mut terminal = CrosstermTerminal::new();
    terminal.set_title("Etch")?;
    let (width, height) = terminal.size()?;
    let mut screen = Screen::new(width as usize, height as usize);
    editor.set_size(width, height);

    let mut guard = terminal.enter_guard()?;
    run(guard.backend_mut(), &mut screen, &mut editor)?;
    drop(guard);

    info!(target: "runtime", "shutdown");
    Ok(())
}

/// The event loop: one blocking read per iteration, then a render. The
/// terminal guard restores the screen however this returns.
fn run(terminal: &mut CrosstermTerminal, screen: &mut Screen, editor: &mut Editor) -> Result<()> {
    editor.render(screen, terminal)?;
    loop {
        let batch = terminal.read_event_batch()?;
        for event in batch {
            if let InputEvent::Resize { width, height } = event {
                screen.resize(width as usize, height as usize);
            }
            editor.handle(event);
        }
        if editor.should_quit() {
            return Ok(());
        }
        editor.render(screen, terminal)?;
    }
}
