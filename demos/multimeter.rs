use gpib_relay::util::init_logging;
use gpib_relay::{BusAddress, Session, SessionConfig};
use std::thread::sleep;
use std::time::Duration;
use tracing::Level;

/// Address of the HP 3478A multimeter on the bus
const METER_ADDRESS: u8 = 0x01;

/// Reads DC current from an HP 3478A through the relay.
///
/// Usage: `cargo run --example multimeter [DEVICE]`
fn main() -> gpib_relay::Result<()> {
    init_logging(Level::INFO);

    let device = std::env::args().nth(1).unwrap_or_else(|| "/dev/ttyACM0".to_string());
    let config = SessionConfig::new(device);
    let own = config.address;
    let meter = BusAddress::new(METER_ADDRESS)?;

    println!("Opening relay on {}", config.device);
    let mut session = match Session::open(config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error opening port: {}", e);
            std::process::exit(1);
        }
    };
    // The relay resets when the port opens
    sleep(Duration::from_secs(1));

    print!("Ping? ");
    if !session.ping()? {
        eprintln!("Could not establish connection, reset board?");
        std::process::exit(1);
    }
    println!("Pong!");

    session.remote(true)?;
    session.clear(true)?;
    session.untalk()?;
    session.unlisten()?;
    session.assign_talker(own)?;
    session.assign_listener(meter)?;
    sleep(Duration::from_secs(1));

    // F5: DC current function
    session.write(b"F5")?;

    session.untalk()?;
    session.unlisten()?;
    session.assign_talker(meter)?;
    session.assign_listener(own)?;

    for i in 0..10 {
        match session.read(256) {
            Ok(reading) => {
                println!("Read {} bytes", reading.len());
                println!("{},{} : {}", i, reading.len(), String::from_utf8_lossy(&reading));
            }
            Err(e) => eprintln!("Read error: {}", e),
        }
    }

    session.close()
}
