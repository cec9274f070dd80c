use crate::app::App;
use crate::args::Args;

pub mod app;
pub mod args;
pub mod data;
pub mod error;
pub mod process;
pub mod resource;

#[cfg(test)]
mod fixtures;

pub const ERROR_SUCCESS: i32 = 0;
pub const ERROR_BAD_ARGUMENTS: i32 = 160;
pub const ERROR_UNHANDLED_EXCEPTION: i32 = 574;

/// Runs the tool and returns the process exit code.
pub fn run(args: Args) -> i32 {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init();

    let format = match args.validate() {
        Ok(format) => format,
        Err(error) => {
            log::error!("{error}");
            return ERROR_BAD_ARGUMENTS;
        }
    };

    match App::new(args, format).process() {
        Ok(_) => ERROR_SUCCESS,
        Err(error) => {
            log::error!("{error:#}");
            ERROR_UNHANDLED_EXCEPTION
        }
    }
}
