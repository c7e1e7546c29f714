#[macro_use] extern crate failure;
#[macro_use] extern crate log;
extern crate env_logger;
extern crate gl;
extern crate nalgebra as na;
extern crate sdl2;
#[cfg(test)] extern crate tempfile;

#[macro_use]
pub mod render_gl;
pub mod resources;
mod config;
mod game;
mod geometry;
mod timer;
mod transform;

use config::Config;
use failure::err_msg;
use game::Game;
use resources::Resources;
use std::path::Path;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", failure_to_string(e));
        std::process::exit(1);
    }
}

fn run() -> Result<(), failure::Error> {
    let config = Config::from_env()?;
    init_logging(&config.log_filter);

    let res = match config.assets_dir {
        Some(ref dir) => Resources::from_dir(dir.clone()),
        None => Resources::from_relative_exe_path(Path::new("assets"))?,
    };
    if !res.root_path().is_dir() {
        return Err(err_msg(format!("asset directory {} does not exist", res.root_path().display())));
    }
    debug!("Loading assets from {}", res.root_path().display());

    let mut game = Game::new(&config, &res)?;
    info!("Initialized {}x{} window", config.window.width, config.window.height);
    game.play()?;

    Ok(())
}

fn init_logging(default_filter: &str) {
    let filter = log_filter(std::env::var("RUST_LOG").ok(), default_filter);
    env_logger::Builder::new()
        .parse_filters(&filter)
        .init();
}

/// `RUST_LOG` wins over the configured filter when it is set.
fn log_filter(rust_log: Option<String>, default_filter: &str) -> String {
    rust_log.unwrap_or_else(|| default_filter.to_owned())
}

pub fn failure_to_string(e: failure::Error) -> String {
    use std::fmt::Write;

    let mut result = String::new();

    for (i, cause) in e.iter_chain().collect::<Vec<_>>().into_iter().rev().enumerate() {
        if i > 0 {
            let _ = writeln!(&mut result, "   Which caused the following issue:");
        }
        let _ = write!(&mut result, "{}", cause);
        if let Some(backtrace) = cause.backtrace() {
            let backtrace_str = format!("{}", backtrace);
            if backtrace_str.len() > 0 {
                let _ = writeln!(&mut result, " This happened at {}", backtrace);
            } else {
                let _ = writeln!(&mut result);
            }
        } else {
            let _ = writeln!(&mut result);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_chain_lists_root_cause_first() {
        let inner = resources::Error::FileContainsNil;
        let outer = render_gl::Error::ResourceLoad { name: "shaders/cube.vert".into(), inner };
        let text = failure_to_string(game::Error::Program(outer).into());

        let root = text.find("Failed to read CString from file that contains 0").unwrap();
        let middle = text.find("Failed to load resource shaders/cube.vert").unwrap();
        let top = text.find("Failed to set up shader program").unwrap();
        assert!(root < middle && middle < top);
        assert_eq!(text.matches("Which caused the following issue:").count(), 2);
    }

    #[test]
    fn rust_log_overrides_configured_filter() {
        let filter = log_filter(Some("spinning_cube=trace".into()), "warn");
        assert_eq!(filter, "spinning_cube=trace");
    }

    #[test]
    fn configured_filter_applies_without_rust_log() {
        assert_eq!(log_filter(None, "warn"), "warn");
    }
}
