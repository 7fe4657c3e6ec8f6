use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use thiserror::Error;

use crate::snake::{Grid, SPAWN_MARGIN};
use crate::{GridInt, TermInt};

pub const DEFAULT_WINDOW_WIDTH: u32 = 640;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 480;
pub const DEFAULT_CELL_SIZE: u32 = 20;
pub const DEFAULT_FPS: u32 = 10;
pub const DEFAULT_START_FPS: u32 = 15;

/// Smallest grid side that leaves room for the spawn margin on both edges.
pub const MIN_GRID_CELLS: u32 = 2 * SPAWN_MARGIN as u32 + 1;

/// Largest window side in pixels. A cell corner can sit one cell past the
/// window edge and is then doubled onto terminal columns, all within `i32`.
pub const MAX_WINDOW_PIXELS: u32 = i32::MAX as u32 / 4;

/// Command-line arguments for Wormy.
#[derive(Debug, Parser)]
#[command(author, version, about = "Wormy, a Nibbles clone for the terminal", long_about = None)]
pub struct CliArgs {
    /// Width of the play surface in pixels.
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_WINDOW_WIDTH)]
    window_width: u32,
    /// Height of the play surface in pixels.
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_WINDOW_HEIGHT)]
    window_height: u32,
    /// Side of one grid cell in pixels. Must divide both window dimensions.
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_CELL_SIZE)]
    cell_size: u32,
    /// Game ticks per second while a round is running.
    #[arg(
        long,
        value_name = "HZ",
        default_value_t = DEFAULT_FPS,
        value_parser = clap::value_parser!(u32).range(1..=120)
    )]
    fps: u32,
    /// Frames per second on the start and game-over screens.
    #[arg(
        long,
        value_name = "HZ",
        default_value_t = DEFAULT_START_FPS,
        value_parser = clap::value_parser!(u32).range(1..=120)
    )]
    start_fps: u32,
    /// Seed for worm spawns and apple placement.
    #[arg(long)]
    seed: Option<u64>,
    /// File that receives the log output. When it cannot be created the game
    /// runs without logging.
    #[arg(long, value_name = "FILE", default_value = "wormy.log")]
    log_file: PathBuf,
    /// Minimum level written to the log file.
    #[arg(long, value_name = "LEVEL", default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cell size must be greater than zero")]
    ZeroCellSize,
    #[error("window width {width} is not a multiple of cell size {cell_size}")]
    WidthNotMultiple { width: u32, cell_size: u32 },
    #[error("window height {height} is not a multiple of cell size {cell_size}")]
    HeightNotMultiple { height: u32, cell_size: u32 },
    #[error("a {columns}x{rows} grid is too small, need at least {min}x{min} cells")]
    GridTooSmall { columns: u32, rows: u32, min: u32 },
    #[error("a {columns}x{rows} grid does not fit in a terminal")]
    GridTooLarge { columns: u32, rows: u32 },
    #[error("a {width}x{height} window is too large, each side must be at most {max} pixels")]
    WindowTooLarge { width: u32, height: u32, max: u32 },
}

/// Validated settings shared by the session and the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub window_width: u32,
    pub window_height: u32,
    pub cell_size: u32,
    pub grid: Grid,
    pub fps: u32,
    pub start_fps: u32,
    pub seed: Option<u64>,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

impl Settings {
    pub fn new(window_width: u32, window_height: u32, cell_size: u32) -> Result<Self, ConfigError> {
        let grid = grid_for(window_width, window_height, cell_size)?;

        Ok(Settings {
            window_width,
            window_height,
            cell_size,
            grid,
            fps: DEFAULT_FPS,
            start_fps: DEFAULT_START_FPS,
            seed: None,
            log_file: PathBuf::from("wormy.log"),
            log_level: LevelFilter::Info,
        })
    }

    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut settings = Settings::new(args.window_width, args.window_height, args.cell_size)?;
        settings.fps = args.fps;
        settings.start_fps = args.start_fps;
        settings.seed = args.seed;
        settings.log_file = args.log_file;
        settings.log_level = args.log_level;
        Ok(settings)
    }
}

fn grid_for(width: u32, height: u32, cell_size: u32) -> Result<Grid, ConfigError> {
    if cell_size == 0 {
        return Err(ConfigError::ZeroCellSize);
    }
    if width > MAX_WINDOW_PIXELS || height > MAX_WINDOW_PIXELS {
        return Err(ConfigError::WindowTooLarge { width, height, max: MAX_WINDOW_PIXELS });
    }
    if width % cell_size != 0 {
        return Err(ConfigError::WidthNotMultiple { width, cell_size });
    }
    if height % cell_size != 0 {
        return Err(ConfigError::HeightNotMultiple { height, cell_size });
    }

    let (columns, rows) = (width / cell_size, height / cell_size);
    if columns < MIN_GRID_CELLS || rows < MIN_GRID_CELLS {
        return Err(ConfigError::GridTooSmall { columns, rows, min: MIN_GRID_CELLS });
    }


    // Each cell takes two terminal columns
    let too_large = ConfigError::GridTooLarge { columns, rows };
    let fits_terminal = columns
        .checked_mul(2)
        .map_or(false, |cols| TermInt::try_from(cols).is_ok())
        && TermInt::try_from(rows).is_ok();
    if !fits_terminal {
        return Err(too_large);
    }

    let width = GridInt::try_from(columns).map_err(|_| too_large.clone())?;
    let height = GridInt::try_from(rows).map_err(|_| too_large)?;
    Ok(Grid::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_give_classic_grid() {
        let settings = Settings::from_args(CliArgs::parse_from(["wormy"])).unwrap();
        assert_eq!(settings.grid, Grid::new(32, 24));
        assert_eq!(settings.fps, 10);
        assert_eq!(settings.start_fps, 15);
        assert_eq!(settings.seed, None);
        assert_eq!(settings.log_level, LevelFilter::Info);
    }

    #[test]
    fn flags_override_defaults() {
        let args = CliArgs::parse_from([
            "wormy", "--window-width", "330", "--window-height", "360", "--cell-size", "30",
            "--fps", "12", "--seed", "42", "--log-level", "debug",
        ]);
        let settings = Settings::from_args(args).unwrap();
        assert_eq!(settings.grid, Grid::new(11, 12));
        assert_eq!(settings.fps, 12);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.log_level, LevelFilter::Debug);
    }

    #[test]
    fn rejects_uneven_dimensions() {
        assert_eq!(
            Settings::new(650, 480, 20).unwrap_err(),
            ConfigError::WidthNotMultiple { width: 650, cell_size: 20 }
        );
        assert_eq!(
            Settings::new(640, 490, 20).unwrap_err(),
            ConfigError::HeightNotMultiple { height: 490, cell_size: 20 }
        );
        assert_eq!(Settings::new(640, 480, 0).unwrap_err(), ConfigError::ZeroCellSize);
    }

    #[test]
    fn rejects_tiny_grids() {
        assert_eq!(
            Settings::new(200, 480, 20).unwrap_err(),
            ConfigError::GridTooSmall { columns: 10, rows: 24, min: 11 }
        );
        assert!(Settings::new(220, 220, 20).is_ok());
    }

    #[test]
    fn rejects_huge_grids() {
        assert_eq!(
            Settings::new(4_000_000_000, 480, 1).unwrap_err(),
            ConfigError::WindowTooLarge { width: 4_000_000_000, height: 480, max: MAX_WINDOW_PIXELS }
        );
        assert_eq!(
            Settings::new(40_000, 480, 1).unwrap_err(),
            ConfigError::GridTooLarge { columns: 40_000, rows: 480 }
        );
        assert_eq!(
            Settings::new(640, 70_000, 1).unwrap_err(),
            ConfigError::GridTooLarge { columns: 640, rows: 70_000 }
        );

        let widest = Settings::new(32_767, 480, 1).unwrap();
        assert_eq!(widest.grid, Grid::new(32_767, 480));
    }

    #[test]
    fn fps_must_be_positive() {
        assert!(CliArgs::try_parse_from(["wormy", "--fps", "0"]).is_err());
    }
}
