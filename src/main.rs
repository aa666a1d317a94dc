use chrono::Local;
use christmas_countdown::config::init_config;
use christmas_countdown::display::driver::create_driver;
use christmas_countdown::display::manager::DisplayManager;
use christmas_countdown::display::update_loop::display_loop;
use christmas_countdown::utils::privilege::{check_root_privileges, drop_privileges};
use christmas_countdown::web::api::router;
use colored::*;
use env_logger::Builder;
use log::{debug, error, info, warn, LevelFilter};
use std::io::Write;
use std::time::Duration;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::Mutex;

fn init_logger() {
    Builder::new()
        .format(|buf, record| {
            let level = match record.level() {
                log::Level::Error => record.level().to_string().red().bold(),
                log::Level::Warn => record.level().to_string().yellow().bold(),
                log::Level::Info => record.level().to_string().green(),
                log::Level::Debug => record.level().to_string().blue(),
                log::Level::Trace => record.level().to_string().purple(),
            };

            let message = match record.level() {
                log::Level::Error => record.args().to_string().red(),
                log::Level::Warn => record.args().to_string().yellow(),
                log::Level::Info => record.args().to_string().normal(),
                log::Level::Debug => record.args().to_string().blue(),
                log::Level::Trace => record.args().to_string().purple(),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level,
                message
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();
}

fn exit_with_errors(errors: Vec<String>) -> ! {
    for error in errors {
        error!("{}", error);
    }
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    init_logger();
    info!("Starting Christmas Countdown");

    let display_config = init_config().unwrap_or_else(|e| exit_with_errors(vec![e]));

    let needs_hardware = display_config.driver_type.needs_hardware();
    if needs_hardware {
        if let Err(e) = check_root_privileges() {
            exit_with_errors(vec![e]);
        }
    }

    let mut errors = Vec::new();
    if let Err(mut config_errors) = display_config.validate() {
        errors.append(&mut config_errors);
    }
    if let Err(mut countdown_errors) = display_config.countdown.validate() {
        errors.append(&mut countdown_errors);
    }
    if !errors.is_empty() {
        exit_with_errors(errors);
    }

    info!("Initializing LED matrix driver");
    let driver = match create_driver(&display_config) {
        Ok(driver) => driver,
        Err(e) => exit_with_errors(vec![format!("Failed to initialize LED matrix driver: {}", e)]),
    };

    #[cfg(target_os = "linux")]
    if needs_hardware {
        if let Err(e) = drop_privileges() {
            error!("Failed to drop privileges: {}", e);
        }
    }

    let display = Arc::new(Mutex::new(DisplayManager::with_config_and_driver(
        &display_config,
        driver,
    )));

    let display_for_shutdown = display.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received termination signal, shutting down...");

        // try_lock so a busy display loop can't deadlock the handler
        if let Ok(mut display_guard) = display_for_shutdown.try_lock() {
            display_guard.shutdown();
        } else {
            warn!("Could not acquire display lock for shutdown - display might not be properly cleared");
        }

        std::process::exit(0);
    }) {
        error!("Error setting Ctrl-C handler: {}", e);
    }

    let interval = Duration::from_millis(display_config.countdown.update_interval_ms);
    tokio::spawn({
        let display = display.clone();
        async move {
            debug!("Display update task started");
            display_loop(display, interval).await;
        }
    });

    let ip_addr = match display_config.interface.parse::<std::net::IpAddr>() {
        Ok(ip_addr) => ip_addr,
        Err(e) => exit_with_errors(vec![format!("Invalid network interface address: {}", e)]),
    };
    let addr = SocketAddr::from((ip_addr, display_config.port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => exit_with_errors(vec![format!("Failed to bind to address {}: {}", addr, e)]),
    };

    info!("Info server running on http://{}", addr);
    if let Err(e) = axum::serve(listener, router(display.clone())).await {
        error!("Server error: {}", e);
    }

    info!("Application exiting, cleaning up display...");
    display.lock().await.shutdown();
}
