//! CLI errors and their process exit codes.
//!
//! | code | meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | success                                            |
//! | 2    | argument parse error (reported by clap)            |
//! | 10   | engine error (unknown engine, bad params or size)  |
//! | 11   | I/O error (PNG or seed file)                       |
//! | 12   | input error (bad palette, bad JSON, bad seed file) |
//! | 13   | serialization error                                |

use quadfield_core::EngineError;
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    Engine(EngineError),
    Io(String),
    Input(String),
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }

    /// Machine-readable form printed in `--json` mode.
    pub fn to_json(&self) -> Value {
        json!({
            "error": self.to_string(),
            "kind": match self {
                CliError::Engine(_) => "engine",
                CliError::Io(_) => "io",
                CliError::Input(_) => "input",
                CliError::Serialization(_) => "serialization",
            },
            "exit_code": self.exit_code(),
        })
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Engine(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                f.write_str(msg)
            }
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            EngineError::InvalidPalette(msg) => CliError::Input(msg),
            other => CliError::Engine(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let errors = [
            CliError::Engine(EngineError::UnknownEngine("foo".into())),
            CliError::Io("write failed".into()),
            CliError::Input("bad palette".into()),
            CliError::Serialization("json fail".into()),
        ];
        let codes: Vec<i32> = errors.iter().map(CliError::exit_code).collect();
        assert_eq!(codes, vec![10, 11, 12, 13]);
    }

    #[test]
    fn engine_io_routes_to_cli_io() {
        let cli_err = CliError::from(EngineError::Io("disk full".into()));
        assert_eq!(cli_err.exit_code(), 11);
        assert!(cli_err.to_string().contains("disk full"));
    }

    #[test]
    fn unknown_palette_is_input_error() {
        let cli_err = CliError::from(EngineError::InvalidPalette("unknown palette 'x'".into()));
        assert_eq!(cli_err.exit_code(), 12);
    }

    #[test]
    fn other_engine_errors_keep_engine_code() {
        let cli_err = CliError::from(EngineError::UnknownEngine("xyz".into()));
        assert_eq!(cli_err.exit_code(), 10);
        assert!(cli_err.to_string().contains("xyz"));
    }

    #[test]
    fn serde_and_io_conversions() {
        let bad_json = serde_json::from_str::<Value>("{invalid").unwrap_err();
        assert_eq!(CliError::from(bad_json).exit_code(), 13);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "seed.json");
        assert_eq!(CliError::from(io).exit_code(), 11);
    }

    #[test]
    fn json_form_names_kind_and_code() {
        let j = CliError::Input("bad params".into()).to_json();
        assert_eq!(j["kind"], "input");
        assert_eq!(j["exit_code"], 12);
        assert_eq!(j["error"], "bad params");
    }
}
