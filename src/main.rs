use std::thread;
use std::time::Duration;

use clap::Parser;

use mt_touch::config::{Cli, Command};
use mt_touch::input::Dispatcher;
use mt_touch::{dump, Config, DeviceProfile, Error, StopToken, TouchEvent, TouchState, Touchscreen};

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Watch);

    let default_level = if command == Command::Dump { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let profile = DeviceProfile::current();
    let config = Config::load(&cli, profile);
    config.validate()?;

    log::info!(
        "mt-touch starting (profile={}, device={}, slots={}, source={})",
        profile.name,
        config.device.as_deref().unwrap_or(&config.device_name),
        config.slots,
        config.host.as_deref().unwrap_or("local")
    );

    match command {
        Command::Dump => {
            let mut ts = Touchscreen::open(&config)?;
            eprintln!("Dumping touch events (Ctrl+C to stop):\n");
            let n = dump::run_dump(&mut ts, &mut std::io::stdout().lock(), &StopToken::new())?;
            eprintln!("{} events", n);
            Ok(())
        }
        Command::Watch => watch(&config),
    }
}

fn print_event(event: TouchEvent, touch: &TouchState) {
    println!("{} {} {} {}", event, touch.slot(), touch.x(), touch.y());
}

fn register_printers(dispatcher: &mut Dispatcher) {
    dispatcher
        .on_press(print_event)
        .on_release(print_event)
        .on_move(print_event);
}

/// Print touch events, reopening the device whenever it goes away.
fn watch(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut ts = Touchscreen::open(config)?;
    loop {
        register_printers(ts.dispatcher_mut());
        match ts.run().join() {
            Ok(_) => return Ok(()),
            Err(Error::DeviceDisconnected) => {
                log::warn!("Device disconnected, reconnecting in {}s…", RECONNECT_DELAY.as_secs());
            }
            Err(e) => return Err(e.into()),
        }

        ts = loop {
            thread::sleep(RECONNECT_DELAY);
            match Touchscreen::open(config) {
                Ok(ts) => break ts,
                Err(e) => log::warn!("Reconnect failed: {}", e),
            }
        };
    }
}
