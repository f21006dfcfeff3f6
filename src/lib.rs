//! # lightify_rs
//!
//! An async Rust library for controlling OSRAM Lightify devices through
//! their gateway's binary TCP protocol.
//!
//! This crate provides a **runtime-agnostic** async API to talk to a
//! Lightify gateway on your local network. It supports discovering
//! devices and zones, querying live status, switching and fading power,
//! and setting brightness, color temperature, and RGBA color.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::net::Ipv4Addr;
//! use std::str::FromStr;
//! use lightify_rs::{GatewayClient, Brightness, Transition};
//!
//! // Works with any async runtime!
//! async fn dim_the_kitchen() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a client with the gateway's IP address
//!     let gateway = GatewayClient::new(Ipv4Addr::from_str("192.168.0.50")?);
//!     gateway.connect().await?;
//!
//!     // Find the kitchen lamp and dim it over two seconds
//!     for device in gateway.discover().await? {
//!         if device.name == "Kitchen lamp" {
//!             let level = Brightness::create(30).unwrap();
//!             gateway
//!                 .set_brightness(device.mac, level, Transition::from_deciseconds(20))
//!                 .await?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Runtime Agnostic**: Works with tokio, async-std, or smol async runtimes
//! - **Discovery**: List every paired device with [`GatewayClient::discover`]
//!   and every zone with [`GatewayClient::discover_zones`]
//! - **Status**: Query live device state with [`GatewayClient::status`]
//! - **Power Control**: Hard on/off plus soft fade-in and fade-out
//! - **Brightness**: Dim from 0-100% using [`Brightness`]
//! - **Color Temperature**: Set warm to cool white (1000K-8000K) using
//!   [`ColorTemperature`]
//! - **RGBA Colors**: Set any color using the [`Rgba`] type
//! - **Scenes**: Recall scenes stored on the gateway
//! - **Zones**: Address a whole zone at once via [`Target::Zone`]
//! - **Connection Management**: Keep the socket open yourself, or let
//!   [`DispatchMode::AutoClose`] connect lazily and hang up when idle
//!
//! ## Communication
//!
//! All communication goes through the Lightify gateway over TCP on port
//! 4000. The gateway must be on the same local network and ideally have
//! a static IP address assigned; devices themselves are addressed by
//! MAC through the gateway.
//!
//! ## Runtime Selection
//!
//! This library is runtime-agnostic. Select your preferred runtime using feature flags:
//!
//! ### Using tokio (default)
//!
//! ```toml
//! [dependencies]
//! lightify-rs = "0.1"
//! tokio = { version = "1", features = ["rt-multi-thread", "macros"] }
//! ```
//!
//! ### Using async-std
//!
//! ```toml
//! [dependencies]
//! lightify-rs = { version = "0.1", default-features = false, features = ["runtime-async-std"] }
//! async-std = { version = "1.12", features = ["attributes"] }
//! ```
//!
//! ### Using smol
//!
//! ```toml
//! [dependencies]
//! lightify-rs = { version = "0.1", default-features = false, features = ["runtime-smol"] }
//! smol = "2"
//! ```
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime

mod commands;
mod device;
mod dispatch;
mod errors;
mod frame;
mod gateway;
mod history;
mod pending;
mod response;
pub mod runtime;
mod session;
mod types;
mod zone;

// Re-export public API
pub use commands::CommandId;
pub use device::{DeviceInfo, DeviceStatus};
pub use dispatch::DispatchMode;
pub use errors::Error;
pub use frame::{FLAG_NODE, FLAG_ZONE, Frame, FrameAssembler};
pub use gateway::{GatewayClient, GatewayOptions};
pub use history::{HistoryEntry, HistorySummary, MessageHistory, MessageType};
pub use response::{CommandAck, read_fixed_width_null_terminated_string};
pub use session::ConnectionState;
pub use types::{
    Brightness, ColorTemperature, DeviceKind, DeviceType, Rgba, Target, Transition,
    is_zone_address,
};
pub use zone::{ZoneDetails, ZoneSummary};
