//! Discover every device paired with a Lightify gateway.
//!
//! This example demonstrates:
//! - Connecting to the gateway over TCP
//! - Listing devices with their last known state
//! - Listing zones with their member devices
//!
//! Run with: cargo run --example discover_devices -- 192.168.0.50

use std::net::Ipv4Addr;

use lightify_rs::GatewayClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ip: Ipv4Addr = std::env::args()
        .nth(1)
        .ok_or("usage: discover_devices <gateway-ip>")?
        .parse()?;

    let gateway = GatewayClient::new(ip);
    println!("Connecting to gateway at {}...", gateway.addr());
    gateway.connect().await?;

    let devices = gateway.discover().await?;
    if devices.is_empty() {
        println!("No devices are paired with this gateway.");
    } else {
        println!("\nFound {} device(s):", devices.len());
        for device in &devices {
            println!(
                "  {:24} addr: {:016x}  {}  {:3}%  {}K  {}",
                device.name,
                device.mac,
                if device.is_on() { "ON " } else { "OFF" },
                device.brightness,
                device.temperature,
                if device.is_online() { "online" } else { "offline" },
            );
        }
    }

    let zones = gateway.discover_zones().await?;
    if !zones.is_empty() {
        println!("\nFound {} zone(s):", zones.len());
        for zone in &zones {
            let info = gateway.zone_info(zone.id).await?;
            println!(
                "  [{}] {} ({} device(s))",
                zone.id,
                zone.name,
                info.devices.len()
            );
        }
    }

    gateway.dispose().await;
    println!("\nDone!");
    Ok(())
}
