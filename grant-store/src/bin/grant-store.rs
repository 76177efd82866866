use std::{error::Error as StdError, fs};

use clap::{Arg as ClapArg, Command};
use json5;
use log::{error, info};
use serde::Deserialize;
use tokio::{self, signal};

use grant_store::{
    libs,
    models::{index::QueryCond, token::IndexKind},
    store,
};
use grant_store_corelib::logger;

#[derive(Deserialize)]
struct AppConfig {
    log: logger::Config,
    store: libs::config::Config,
}

const PROJ_NAME: &'static str = env!("CARGO_BIN_NAME");
const PROJ_VER: &'static str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    const FN_NAME: &'static str = "main";

    let conf = match init_config() {
        Err(e) => {
            let conf = &logger::Config {
                ..Default::default()
            };
            logger::init(PROJ_NAME, &conf);
            error!("[{}] read config error: {}", FN_NAME, e);
            return;
        }
        Ok(conf) => conf,
    };

    logger::init(PROJ_NAME, &conf.log);

    let (token_store, sweeper) = match store::new_store(&conf.store).await {
        Err(e) => {
            error!("[{}] new store error: {}", FN_NAME, e);
            return;
        }
        Ok(store) => store,
    };
    let model = token_store.model();
    for kind in IndexKind::ALL {
        let index = model.index(kind);
        match index.count(&QueryCond::default()).await {
            Err(e) => error!("[{}] count {} error: {}", FN_NAME, index.name(), e),
            Ok(count) => info!("[{}] {} has {} documents", FN_NAME, index.name(), count),
        }
    }
    info!("[{}] {} started", FN_NAME, PROJ_NAME);

    if let Err(e) = signal::ctrl_c().await {
        error!("[{}] wait signal error: {}", FN_NAME, e);
    }

    info!("[{}] shutting down", FN_NAME);
    sweeper.stop().await;
    if let Err(e) = model.close().await {
        error!("[{}] close error: {}", FN_NAME, e);
    }
}

fn init_config() -> Result<AppConfig, Box<dyn StdError>> {
    let mut args = Command::new(PROJ_NAME).version(PROJ_VER).arg(
        ClapArg::new("file")
            .short('f')
            .long("file")
            .help("config file")
            .num_args(1),
    );
    args = logger::reg_args(args);
    args = libs::config::reg_args(args);
    let args = args.get_matches();

    if let Some(v) = args.get_one::<String>("file") {
        let conf_str = fs::read_to_string(v)?;
        let conf: AppConfig = json5::from_str(conf_str.as_str())?;
        return Ok(AppConfig {
            log: logger::apply_default(&conf.log),
            store: libs::config::apply_default(&conf.store),
        });
    }

    Ok(AppConfig {
        log: logger::read_args(&args),
        store: libs::config::read_args(&args),
    })
}
