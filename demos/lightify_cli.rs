//! CLI application for controlling Lightify devices through their gateway.
//!
//! This example demonstrates a full-featured command-line interface for
//! the gateway protocol: discovery, status, power, brightness, color
//! temperature, color, and scene activation.
//!
//! Run with: cargo run --example lightify_cli -- --help

use clap::{Parser, Subcommand};
use std::net::Ipv4Addr;
use lightify_rs::{
    Brightness, ColorTemperature, CommandAck, GatewayClient, Rgba, Transition,
};

#[derive(Parser)]
#[command(name = "lightify-cli")]
#[command(about = "Control Lightify devices from the command line", long_about = None)]
struct Cli {
    /// IP address of the Lightify gateway
    #[arg(short, long)]
    ip: Ipv4Addr,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all devices paired with the gateway
    Discover,

    /// List all zones configured on the gateway
    Zones,

    /// Show one zone's name and member devices
    ZoneInfo {
        /// Zone id (1-65535)
        zone: u16,
    },

    /// Get the current status of a device
    Status {
        /// Device address as printed by discover, or a zone id
        #[arg(value_parser = parse_address)]
        address: u64,
    },

    /// Turn a device or zone on
    On {
        #[arg(value_parser = parse_address)]
        address: u64,
    },

    /// Turn a device or zone off
    Off {
        #[arg(value_parser = parse_address)]
        address: u64,
    },

    /// Fade a device in from off
    SoftOn {
        #[arg(value_parser = parse_address)]
        address: u64,
        /// Fade time in tenths of a second
        #[arg(short, long, default_value = "10")]
        transition: u16,
    },

    /// Fade a device out to off
    SoftOff {
        #[arg(value_parser = parse_address)]
        address: u64,
        /// Fade time in tenths of a second
        #[arg(short, long, default_value = "10")]
        transition: u16,
    },

    /// Set brightness (0-100)
    Brightness {
        #[arg(value_parser = parse_address)]
        address: u64,
        /// Brightness level (0-100)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,
        /// Transition time in tenths of a second
        #[arg(short, long, default_value = "0")]
        transition: u16,
    },

    /// Set color temperature in Kelvin (1000-8000)
    Temperature {
        #[arg(value_parser = parse_address)]
        address: u64,
        /// Temperature in Kelvin (1000-8000)
        #[arg(value_parser = clap::value_parser!(u16).range(1000..=8000))]
        kelvin: u16,
        /// Transition time in tenths of a second
        #[arg(short, long, default_value = "0")]
        transition: u16,
    },

    /// Set RGB color (0-255 for each component)
    Color {
        #[arg(value_parser = parse_address)]
        address: u64,
        /// Red component (0-255)
        red: u8,
        /// Green component (0-255)
        green: u8,
        /// Blue component (0-255)
        blue: u8,
        /// Transition time in tenths of a second
        #[arg(short, long, default_value = "0")]
        transition: u16,
    },

    /// Activate a scene stored on the gateway
    Scene {
        /// Scene id (1-255)
        scene: u8,
    },

    /// Get detailed diagnostics
    Diagnostics,
}

/// Parses a hex device address (as printed by discover) or a bare zone
/// id; values below 0x10000 are addressed as zones.
fn parse_address(value: &str) -> Result<u64, String> {
    let digits = value.trim_start_matches("0x");
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid address '{value}': {e}"))
}

fn report_acks(acks: &[CommandAck]) {
    for ack in acks {
        if ack.succeeded() {
            println!("  ✓ {}", ack.friendly_mac());
        } else {
            println!("  ✗ {} (status 0x{:02x})", ack.friendly_mac(), ack.status);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let gateway = GatewayClient::new(cli.ip);
    println!("Connecting to gateway at {}...", gateway.addr());
    gateway.connect().await?;

    match cli.command {
        Commands::Discover => {
            let devices = gateway.discover().await?;
            if devices.is_empty() {
                println!("No devices are paired with this gateway.");
            } else {
                println!("\nFound {} device(s):", devices.len());
                for device in devices {
                    println!(
                        "  {:24} addr: {:016x}  {}  {}",
                        device.name,
                        device.mac,
                        if device.is_on() { "ON " } else { "OFF" },
                        if device.is_online() { "online" } else { "offline" },
                    );
                }
            }
        }

        Commands::Zones => {
            let zones = gateway.discover_zones().await?;
            if zones.is_empty() {
                println!("No zones are configured on this gateway.");
            } else {
                println!("\nFound {} zone(s):", zones.len());
                for zone in zones {
                    println!("  [{}] {}", zone.id, zone.name);
                }
            }
        }

        Commands::ZoneInfo { zone } => {
            let info = gateway.zone_info(zone).await?;
            println!("\nZone [{}] {}:", info.id, info.name);
            for mac in info.devices {
                println!("  device {:016x}", mac);
            }
        }

        Commands::Status { address } => {
            match gateway.status(address).await? {
                Some(status) => {
                    println!("\nDevice Status:");
                    if status.request_status != 0 {
                        println!(
                            "  Unreachable (request status 0x{:02x})",
                            status.request_status
                        );
                    }
                    if let Some(on) = status.is_on() {
                        println!("  Power: {}", if on { "ON" } else { "OFF" });
                    }
                    if let Some(brightness) = status.brightness {
                        println!("  Brightness: {}%", brightness);
                    }
                    if let Some(temperature) = status.temperature {
                        println!("  Temperature: {}K", temperature);
                    }
                    if let Some(color) = status.color {
                        println!(
                            "  Color: RGBA({}, {}, {}, {})",
                            color.red(),
                            color.green(),
                            color.blue(),
                            color.alpha()
                        );
                    }
                }
                None => println!("The gateway reported nothing for {:016x}.", address),
            }
        }

        Commands::On { address } => {
            println!("Turning {:016x} ON...", address);
            report_acks(&gateway.set_on_off(address, true).await?);
        }

        Commands::Off { address } => {
            println!("Turning {:016x} OFF...", address);
            report_acks(&gateway.set_on_off(address, false).await?);
        }

        Commands::SoftOn { address, transition } => {
            println!("Fading {:016x} in over {} ds...", address, transition);
            let acks = gateway
                .soft_on(address, Transition::from_deciseconds(transition))
                .await?;
            report_acks(&acks);
        }

        Commands::SoftOff { address, transition } => {
            println!("Fading {:016x} out over {} ds...", address, transition);
            let acks = gateway
                .soft_off(address, Transition::from_deciseconds(transition))
                .await?;
            report_acks(&acks);
        }

        Commands::Brightness {
            address,
            level,
            transition,
        } => {
            println!("Setting brightness to {}% on {:016x}...", level, address);
            if let Some(level) = Brightness::create(level) {
                let acks = gateway
                    .set_brightness(address, level, Transition::from_deciseconds(transition))
                    .await?;
                report_acks(&acks);
            } else {
                eprintln!("Invalid brightness value. Must be between 0 and 100.");
            }
        }

        Commands::Temperature {
            address,
            kelvin,
            transition,
        } => {
            println!("Setting temperature to {}K on {:016x}...", kelvin, address);
            if let Some(temperature) = ColorTemperature::create(kelvin) {
                let acks = gateway
                    .set_temperature(
                        address,
                        temperature,
                        Transition::from_deciseconds(transition),
                    )
                    .await?;
                report_acks(&acks);
            } else {
                eprintln!("Invalid temperature value. Must be between 1000 and 8000K.");
            }
        }

        Commands::Color {
            address,
            red,
            green,
            blue,
            transition,
        } => {
            println!(
                "Setting color to RGB({}, {}, {}) on {:016x}...",
                red, green, blue, address
            );
            let color = Rgba::rgb(red, green, blue);
            let acks = gateway
                .set_color(address, &color, Transition::from_deciseconds(transition))
                .await?;
            report_acks(&acks);
        }

        Commands::Scene { scene } => {
            println!("Activating scene {}...", scene);
            report_acks(&gateway.activate_scene(scene).await?);
        }

        Commands::Diagnostics => {
            let diag = gateway.diagnostics().await;
            println!("\nDiagnostics:\n{}", serde_json::to_string_pretty(&diag)?);
        }
    }

    gateway.dispose().await;
    Ok(())
}
