//! To configure the logger.
//!
//! Two console styles are provided:
//! - `json`: one JSON object per line with `ts`, `proj`, `level`, `module` and `msg`.
//! - `log4j`: `ts proj LEVEL [module] msg` plain text.

use std::env;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use clap::{Arg, ArgMatches, Command};
use log::{LevelFilter, Record};
use log4rs::{
    self,
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::{Encode, Write},
};
use serde::{Deserialize, Serialize};

/// Logger configuration object.
#[derive(Default, Deserialize)]
pub struct Config {
    /// Log level. Can be `off`, `error`, `warn`, `info`, `debug`.
    ///
    /// Default is `info`.
    pub level: Option<String>,
    /// Log style. Can be `json`, `log4j`.
    ///
    /// Default is `json`.
    pub style: Option<String>,
}

/// The log4rs encoder for JSON format.
#[derive(Debug)]
struct JsonEncoder {
    proj_name: String,
}

/// The log4rs encoder for log4j format.
#[derive(Debug)]
struct Log4jEncoder {
    proj_name: String,
}

/// Normal log information.
#[derive(Debug, Serialize)]
struct JsonEncoderMsg<'a> {
    pub ts: String,
    pub proj: &'a str,
    pub level: String,
    pub module: String,
    pub msg: String,
}

pub const LEVEL_OFF: &'static str = "off";
pub const LEVEL_ERROR: &'static str = "error";
pub const LEVEL_WARN: &'static str = "warn";
pub const LEVEL_INFO: &'static str = "info";
pub const LEVEL_DEBUG: &'static str = "debug";

pub const STYLE_JSON: &'static str = "json";
pub const STYLE_LOG4J: &'static str = "log4j";

pub const DEF_LEVEL: &'static str = LEVEL_INFO;
pub const DEF_STYLE: &'static str = STYLE_JSON;

impl JsonEncoder {
    pub fn new(proj_name: &str) -> Self {
        JsonEncoder {
            proj_name: proj_name.to_string(),
        }
    }
}

impl Log4jEncoder {
    pub fn new(proj_name: &str) -> Self {
        Log4jEncoder {
            proj_name: proj_name.to_string(),
        }
    }
}

impl Encode for Log4jEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record<'_>) -> Result<()> {
        let module = match get_module_name(record) {
            None => return Ok(()),
            Some(module) => module,
        };

        let str = format!(
            "{} {} {} [{}] {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            self.proj_name,
            record.level(),
            module,
            record.args().to_string().replace("\n", "\\n")
        );
        w.write_all(str.as_bytes())?;
        Ok(())
    }
}

impl Encode for JsonEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record<'_>) -> Result<()> {
        let module = match get_module_name(record) {
            None => return Ok(()),
            Some(module) => module,
        };

        let msg = JsonEncoderMsg {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            proj: self.proj_name.as_str(),
            level: record.level().to_string().to_lowercase(),
            module,
            msg: record.args().to_string(),
        };
        let str = serde_json::to_string(&msg)? + "\n";
        w.write_all(str.as_bytes())?;
        Ok(())
    }
}

/// To initialize the logger with configurations.
pub fn init(proj_name: &str, conf: &Config) {
    let conf = apply_default(&conf);

    let level = match conf.level.as_ref() {
        None => DEF_LEVEL,
        Some(v) => v.as_str(),
    };
    let level = match level {
        LEVEL_OFF => LevelFilter::Off,
        LEVEL_ERROR => LevelFilter::Error,
        LEVEL_WARN => LevelFilter::Warn,
        LEVEL_INFO => LevelFilter::Info,
        LEVEL_DEBUG => LevelFilter::Debug,
        _ => LevelFilter::Info,
    };
    let style = match conf.style.as_ref() {
        None => DEF_STYLE,
        Some(v) => v.as_str(),
    };

    let log4j_encoder = ConsoleAppender::builder()
        .encoder(Box::new(Log4jEncoder::new(proj_name)))
        .build();
    let json_encoder = ConsoleAppender::builder()
        .encoder(Box::new(JsonEncoder::new(proj_name)))
        .build();
    let _ = log4rs::init_config(
        log4rs::Config::builder()
            .appender(Appender::builder().build(STYLE_LOG4J, Box::new(log4j_encoder)))
            .appender(Appender::builder().build(STYLE_JSON, Box::new(json_encoder)))
            .build(Root::builder().appender(style).build(level))
            .unwrap(),
    )
    .unwrap();
}

/// To register Clap arguments.
pub fn reg_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("log.level")
            .long("log.level")
            .help("log level")
            .num_args(1)
            .value_parser([LEVEL_OFF, LEVEL_ERROR, LEVEL_WARN, LEVEL_INFO, LEVEL_DEBUG]),
    )
    .arg(
        Arg::new("log.style")
            .long("log.style")
            .help("log style")
            .num_args(1)
            .value_parser([STYLE_JSON, STYLE_LOG4J]),
    )
}

/// To read input arguments from command-line arguments and environment variables.
///
/// This function will call [`apply_default()`] to fill missing values so you do not need call it
/// again.
pub fn read_args(args: &ArgMatches) -> Config {
    apply_default(&Config {
        level: match args.get_one::<String>("log.level") {
            None => match env::var("LOG_LEVEL") {
                Err(_) => None,
                Ok(v) => to_level(v.as_str()),
            },
            Some(v) => to_level(v.as_str()),
        },
        style: match args.get_one::<String>("log.style") {
            None => match env::var("LOG_STYLE") {
                Err(_) => None,
                Ok(v) => to_style(v.as_str()),
            },
            Some(v) => to_style(v.as_str()),
        },
    })
}

/// Fill missing configuration with default values.
pub fn apply_default(config: &Config) -> Config {
    Config {
        level: match config.level.as_ref() {
            None => Some(DEF_LEVEL.to_string()),
            Some(v) => match to_level(v.as_str()) {
                None => Some(DEF_LEVEL.to_string()),
                Some(v) => Some(v),
            },
        },
        style: match config.style.as_ref() {
            None => Some(DEF_STYLE.to_string()),
            Some(v) => match to_style(v.as_str()) {
                None => Some(DEF_STYLE.to_string()),
                Some(v) => Some(v),
            },
        },
    }
}

fn to_level(level: &str) -> Option<String> {
    match level {
        LEVEL_OFF | LEVEL_ERROR | LEVEL_WARN | LEVEL_INFO | LEVEL_DEBUG => Some(level.to_string()),
        _ => None,
    }
}

fn to_style(style: &str) -> Option<String> {
    match style {
        STYLE_JSON | STYLE_LOG4J => Some(style.to_string()),
        _ => None,
    }
}

/// To get the module name (or `file:line`) for printing logs. Records from dependencies under
/// `.cargo/` are skipped.
fn get_module_name(record: &Record<'_>) -> Option<String> {
    match record.module_path() {
        None => None,
        Some(module) => match record.file() {
            None => Some(module.to_string()),
            Some(file) => match file.contains("/.cargo/") {
                false => match record.line() {
                    None => Some(file.to_string()),
                    Some(line) => Some(format!("{}:{}", file, line)),
                },
                true => None,
            },
        },
    }
}
