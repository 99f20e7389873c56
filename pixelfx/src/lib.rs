//! PixelFX photo-effect editor
//!
//! A headless editor model for applying blur, brightness, contrast,
//! grayscale and noise effects to an image, either locally through the
//! `image-effect` canvas pipeline or remotely through a processing backend.
//!
//! # Architecture
//! - `registry`: the catalogue of effects and their slider parameters
//! - `logic`: editor state, render paths, debounced preview, panel views
//! - `config`: TOML settings shared by the CLI front end
//! - `cli`: the `pixelfx` command line

#[macro_use]
extern crate derivative;

pub mod cli;
pub mod config;
pub mod logic;
pub mod registry;

/// Initializes the logger.
///
/// Sets up a custom logger format with timestamp, log level, file name, line number,
/// and log message. `verbose` raises the default level to debug.
pub fn init_logger(verbose: bool) {
    use std::io::Write;

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::builder()
        .filter_level(level)
        .filter_module("hyper", log::LevelFilter::Warn)
        .filter_module("hyper_util", log::LevelFilter::Warn)
        .filter_module("reqwest", log::LevelFilter::Warn)
        .parse_default_env()
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = chrono::Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}
