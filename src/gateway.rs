//! Gateway client facade.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use log::debug;
use serde_json::{Value, json};

use crate::commands::{self, CommandId};
use crate::device::{DeviceInfo, DeviceStatus};
use crate::dispatch::{DispatchMode, DispatchQueue};
use crate::errors::Error;
use crate::frame::{FLAG_NODE, Frame};
use crate::history::{MessageHistory, MessageType};
use crate::pending::PendingTable;
use crate::response::{self, CommandAck};
use crate::runtime::Mutex;
use crate::session::{ConnectionState, TransportSession};
use crate::types::{Brightness, ColorTemperature, Rgba, Target, Transition};
use crate::zone::{ZoneDetails, ZoneSummary};

type Result<T> = std::result::Result<T, Error>;

/// Tunables for one gateway session.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// TCP port the gateway listens on.
    pub port: u16,
    /// How long one dial attempt may take.
    pub connect_timeout: Duration,
    /// How long each command waits for its response frame.
    pub command_timeout: Duration,
    /// Dial attempts per reconnect chain in auto-managed mode.
    pub reconnect_attempts: u32,
    /// Write policy; see [`DispatchMode`].
    pub dispatch: DispatchMode,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        GatewayOptions {
            port: GatewayClient::PORT,
            connect_timeout: Duration::from_millis(GatewayClient::CONNECT_TIMEOUT_MS),
            command_timeout: Duration::from_millis(GatewayClient::COMMAND_TIMEOUT_MS),
            reconnect_attempts: GatewayClient::RECONNECT_ATTEMPTS,
            dispatch: DispatchMode::Immediate,
        }
    }
}

impl GatewayOptions {
    /// Auto-managed mode with the default idle window.
    ///
    /// Note that with the default command timeout, a command issued on a
    /// cold connection can time out while the lazy connect is still in
    /// its backoff delay; raise [`command_timeout`](Self::command_timeout)
    /// when that matters.
    pub fn auto_close() -> Self {
        GatewayOptions {
            dispatch: DispatchMode::AutoClose {
                idle_window: Duration::from_millis(GatewayClient::IDLE_WINDOW_MS),
            },
            ..Self::default()
        }
    }
}

/// Client for one OSRAM Lightify gateway.
///
/// A `GatewayClient` speaks the gateway's binary protocol over a single
/// TCP connection: discovery of devices and zones, status queries, and
/// actuation (on/off, brightness, color temperature, color, scenes).
/// Commands are correlated to responses by sequence number, so callers
/// may have several in flight at once.
///
/// # Example
///
/// ```
/// use std::net::Ipv4Addr;
/// use std::str::FromStr;
/// use lightify_rs::GatewayClient;
///
/// let gateway = GatewayClient::new(Ipv4Addr::from_str("192.168.0.50").unwrap());
/// assert_eq!(gateway.addr().port(), 4000);
/// ```
pub struct GatewayClient {
    addr: SocketAddr,
    session: Arc<TransportSession>,
    dispatch: DispatchQueue,
    pending: PendingTable,
    sequence: AtomicU32,
    history: Arc<Mutex<MessageHistory>>,
}

impl GatewayClient {
    /// TCP port Lightify gateways listen on.
    pub const PORT: u16 = 4000;
    pub const CONNECT_TIMEOUT_MS: u64 = 4000;
    pub const COMMAND_TIMEOUT_MS: u64 = 1000;
    pub const RECONNECT_ATTEMPTS: u32 = 5;
    pub const IDLE_WINDOW_MS: u64 = 3000;

    /// Client with default options: immediate dispatch on port 4000.
    pub fn new(ip: Ipv4Addr) -> Self {
        Self::with_options(ip, GatewayOptions::default())
    }

    /// Client with explicit options.
    ///
    /// In auto-managed mode this spawns the dispatch worker, so it must
    /// be called from within the async runtime.
    pub fn with_options(ip: Ipv4Addr, options: GatewayOptions) -> Self {
        let addr = SocketAddr::V4(SocketAddrV4::new(ip, options.port));
        let history = Arc::new(Mutex::new(MessageHistory::new()));
        let pending = PendingTable::new(options.command_timeout);
        let session = Arc::new(TransportSession::new(
            addr,
            options.connect_timeout,
            pending.clone(),
            Arc::clone(&history),
        ));
        let dispatch = DispatchQueue::new(
            options.dispatch,
            Arc::clone(&session),
            options.reconnect_attempts,
        );
        GatewayClient {
            addr,
            session,
            dispatch,
            pending,
            sequence: AtomicU32::new(0),
            history,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Establishes the connection with a single dial attempt.
    ///
    /// Required before commands in immediate mode; optional in
    /// auto-managed mode, where the first command connects lazily.
    pub async fn connect(&self) -> Result<()> {
        self.session.connect().await
    }

    /// Closes the connection and fails every command still in flight.
    ///
    /// Idempotent; the client stays usable and may connect again.
    pub async fn dispose(&self) {
        self.session.dispose().await;
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.session.state().await
    }

    /// Lists every paired device with its last known state.
    pub async fn discover(&self) -> Result<Vec<DeviceInfo>> {
        let frame = self
            .send_command(CommandId::ListAllNodes, FLAG_NODE, commands::discover_nodes())
            .await?;
        response::decode_items(
            &frame,
            CommandId::ListAllNodes,
            Some(DeviceInfo::ITEM_LEN),
            DeviceInfo::decode,
        )
    }

    /// Lists zone ids and names.
    pub async fn discover_zones(&self) -> Result<Vec<ZoneSummary>> {
        let frame = self
            .send_command(CommandId::ListAllZones, FLAG_NODE, commands::discover_zones())
            .await?;
        response::decode_items(&frame, CommandId::ListAllZones, None, ZoneSummary::decode)
    }

    /// Name and member MACs of one zone.
    pub async fn zone_info(&self, zone: u16) -> Result<ZoneDetails> {
        let frame = self
            .send_command(CommandId::GetZoneInfo, FLAG_NODE, commands::zone_info(zone))
            .await?;
        ZoneDetails::decode(&frame, zone)
    }

    /// Live state of one device, or `None` when the gateway has nothing
    /// to report for that address.
    pub async fn status(&self, target: impl Into<Target>) -> Result<Option<DeviceStatus>> {
        let target = target.into();
        let frame = self
            .send_command(
                CommandId::GetStatus,
                commands::frame_flag(CommandId::GetStatus, target),
                commands::status(target),
            )
            .await?;
        if response::item_count(&frame, CommandId::GetStatus)? == 0 {
            return Ok(None);
        }
        DeviceStatus::decode(&frame).map(Some)
    }

    /// Hard on/off.
    pub async fn set_on_off(&self, target: impl Into<Target>, on: bool) -> Result<Vec<CommandAck>> {
        let target = target.into();
        self.actuate(CommandId::SetOnOff, target, commands::on_off(target, on))
            .await
    }

    /// Fades a device in from off over the given transition.
    pub async fn soft_on(
        &self,
        target: impl Into<Target>,
        transition: Transition,
    ) -> Result<Vec<CommandAck>> {
        let target = target.into();
        self.actuate(
            CommandId::SoftOn,
            target,
            commands::soft_on_off(target, transition),
        )
        .await
    }

    /// Fades a device out to off over the given transition.
    pub async fn soft_off(
        &self,
        target: impl Into<Target>,
        transition: Transition,
    ) -> Result<Vec<CommandAck>> {
        let target = target.into();
        self.actuate(
            CommandId::SoftOff,
            target,
            commands::soft_on_off(target, transition),
        )
        .await
    }

    pub async fn set_brightness(
        &self,
        target: impl Into<Target>,
        level: Brightness,
        transition: Transition,
    ) -> Result<Vec<CommandAck>> {
        let target = target.into();
        self.actuate(
            CommandId::SetBrightness,
            target,
            commands::brightness(target, level, transition),
        )
        .await
    }

    pub async fn set_temperature(
        &self,
        target: impl Into<Target>,
        temperature: ColorTemperature,
        transition: Transition,
    ) -> Result<Vec<CommandAck>> {
        let target = target.into();
        self.actuate(
            CommandId::SetTemperature,
            target,
            commands::temperature(target, temperature, transition),
        )
        .await
    }

    pub async fn set_color(
        &self,
        target: impl Into<Target>,
        color: &Rgba,
        transition: Transition,
    ) -> Result<Vec<CommandAck>> {
        let target = target.into();
        self.actuate(
            CommandId::SetColor,
            target,
            commands::color(target, color, transition),
        )
        .await
    }

    /// Recalls a scene stored on the gateway.
    pub async fn activate_scene(&self, scene: u8) -> Result<Vec<CommandAck>> {
        let frame = self
            .send_command(
                CommandId::ActivateScene,
                FLAG_NODE,
                commands::activate_scene(scene),
            )
            .await?;
        response::decode_acks(&frame, CommandId::ActivateScene)
    }

    pub async fn history(&self) -> MessageHistory {
        self.history.lock().await.clone()
    }

    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }

    /// Returns diagnostics including connection state and frame history.
    pub async fn diagnostics(&self) -> Value {
        let mut diag = json!({
            "gateway": self.addr.to_string(),
            "state": format!("{:?}", self.session.state().await),
            "outstanding": self.pending.outstanding().await,
        });

        let history = self.history.lock().await;
        diag["history"] = serde_json::to_value(history.summary()).unwrap_or(Value::Null);

        diag
    }

    async fn actuate(
        &self,
        command: CommandId,
        target: Target,
        body: Vec<u8>,
    ) -> Result<Vec<CommandAck>> {
        let frame = self
            .send_command(command, commands::frame_flag(command, target), body)
            .await?;
        response::decode_acks(&frame, command)
    }

    async fn send_command(&self, command: CommandId, flag: u8, body: Vec<u8>) -> Result<Frame> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let frame = Frame::new(flag, command.value(), sequence, &body);
        debug!("command sent [{}][{}]", sequence, frame.to_hex());
        self.history.lock().await.record(MessageType::Send, &frame);

        let receiver = self
            .pending
            .register(sequence, command, frame.to_hex())
            .await?;
        if let Err(err) = self.dispatch.enqueue(frame).await {
            self.pending.discard(sequence).await;
            self.history.lock().await.record_error(&err.to_string());
            return Err(err);
        }

        match receiver.await {
            Ok(outcome) => {
                if let Err(err) = &outcome {
                    self.history.lock().await.record_error(&err.to_string());
                }
                outcome
            }
            // The completion slot vanished without a verdict; only a
            // teardown racing the send can do that.
            Err(_) => Err(Error::Disposed),
        }
    }
}
