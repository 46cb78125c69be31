//! Build script for lumen-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml and turns it into constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    let board = validate_config();
    write_constants(&board);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated board settings
struct Board {
    peripheral_clock_mhz: i64,
    bus_speed_hz: i64,
    ccr: i64,
    trise: i64,
    poll_budget: i64,
    detect_nack: bool,
    address: i64,
    command_settle_cycles: i64,
    data_settle_cycles: i64,
    byte_pacing_cycles: i64,
    startup_delay_cycles: i64,
}

/// Validate board.toml configuration at compile time
fn validate_config() -> Board {
    // Re-run if board.toml changes
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml configuration file.          ║\n\
            ║  Please create one in the lumen-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let board = read_board(&config, &mut errors);
    if errors.is_empty() {
        check_ranges(&board, &mut errors);
    }
    report("Invalid board configuration", &errors);

    println!("cargo:warning=board.toml validated successfully");
    board
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn integer(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> i64 {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(v)) => *v,
        Some(_) => {
            errors.push(format!("[{}] '{}' must be an integer", section, key));
            0
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            0
        }
    }
}

fn boolean(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> bool {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Boolean(v)) => *v,
        Some(_) => {
            errors.push(format!("[{}] '{}' must be true or false", section, key));
            false
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            false
        }
    }
}

fn read_board(config: &toml::Value, errors: &mut Vec<String>) -> Board {
    for section in ["i2c", "display", "startup"] {
        if !matches!(config.get(section), Some(toml::Value::Table(_))) {
            errors.push(format!("Missing [{}] section", section));
        }
    }

    Board {
        peripheral_clock_mhz: integer(config, "i2c", "peripheral_clock_mhz", errors),
        bus_speed_hz: integer(config, "i2c", "bus_speed_hz", errors),
        ccr: integer(config, "i2c", "ccr", errors),
        trise: integer(config, "i2c", "trise", errors),
        poll_budget: integer(config, "i2c", "poll_budget", errors),
        detect_nack: boolean(config, "i2c", "detect_nack", errors),
        address: integer(config, "display", "address", errors),
        command_settle_cycles: integer(config, "display", "command_settle_cycles", errors),
        data_settle_cycles: integer(config, "display", "data_settle_cycles", errors),
        byte_pacing_cycles: integer(config, "display", "byte_pacing_cycles", errors),
        startup_delay_cycles: integer(config, "startup", "delay_cycles", errors),
    }
}

fn check_ranges(board: &Board, errors: &mut Vec<String>) {
    if !(2..=50).contains(&board.peripheral_clock_mhz) {
        errors.push("[i2c] peripheral_clock_mhz must be 2-50".into());
    }
    if !(1..=100_000).contains(&board.bus_speed_hz) {
        errors.push("[i2c] bus_speed_hz must be 1-100000 (standard mode)".into());
    }
    if !(4..=0xFFF).contains(&board.ccr) {
        errors.push("[i2c] ccr must be 4-4095".into());
    }
    if !(1..=63).contains(&board.trise) {
        errors.push("[i2c] trise must be 1-63".into());
    }
    if !(0x00..=0x7F).contains(&board.address) {
        errors.push("[display] address must be a 7-bit address (0x00-0x7F)".into());
    }

    for (key, value) in [
        ("[i2c] poll_budget", board.poll_budget),
        ("[display] command_settle_cycles", board.command_settle_cycles),
        ("[display] data_settle_cycles", board.data_settle_cycles),
        ("[display] byte_pacing_cycles", board.byte_pacing_cycles),
        ("[startup] delay_cycles", board.startup_delay_cycles),
    ] {
        if !(0..=u32::MAX as i64).contains(&value) {
            errors.push(format!("{} must fit in a u32", key));
        }
    }

    if errors.is_empty() {
        // Standard mode: CCR = pclk / (2 * f_scl), TRISE = 1000 ns / t_pclk + 1
        let expected_ccr = board.peripheral_clock_mhz * 1_000_000 / (2 * board.bus_speed_hz);
        let expected_trise = board.peripheral_clock_mhz + 1;
        if board.ccr != expected_ccr {
            errors.push(format!(
                "[i2c] ccr is {} but clock and speed give {}",
                board.ccr, expected_ccr
            ));
        }
        if board.trise != expected_trise {
            errors.push(format!(
                "[i2c] trise is {} but the clock gives {}",
                board.trise, expected_trise
            ));
        }
    }
}

/// Write board constants to OUT_DIR/board.rs
fn write_constants(board: &Board) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("board.rs")).unwrap();

    writeln!(f, "// Generated from board.toml by build.rs").unwrap();
    writeln!(f, "pub const PERIPHERAL_CLOCK_MHZ: u8 = {};", board.peripheral_clock_mhz).unwrap();
    writeln!(f, "pub const BUS_SPEED_HZ: u32 = {};", board.bus_speed_hz).unwrap();
    writeln!(f, "pub const CCR: u16 = {};", board.ccr).unwrap();
    writeln!(f, "pub const TRISE: u8 = {};", board.trise).unwrap();
    writeln!(f, "pub const POLL_BUDGET: u32 = {};", board.poll_budget).unwrap();
    writeln!(f, "pub const DETECT_NACK: bool = {};", board.detect_nack).unwrap();
    writeln!(f, "pub const DISPLAY_ADDRESS: u8 = {:#04X};", board.address).unwrap();
    writeln!(f, "pub const COMMAND_SETTLE_CYCLES: u32 = {};", board.command_settle_cycles).unwrap();
    writeln!(f, "pub const DATA_SETTLE_CYCLES: u32 = {};", board.data_settle_cycles).unwrap();
    writeln!(f, "pub const BYTE_PACING_CYCLES: u32 = {};", board.byte_pacing_cycles).unwrap();
    writeln!(f, "pub const STARTUP_DELAY_CYCLES: u32 = {};", board.startup_delay_cycles).unwrap();
}
