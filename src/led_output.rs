// LED Output Module - mirrors canvas frames to one or more WLED controllers over DDP
use anyhow::{anyhow, Result};
use ddp_rs::connection::DDPConnection;
use ddp_rs::protocol::{PixelConfig, ID};
use log::warn;
use std::net::UdpSocket;
use std::time::{Duration, Instant};

use crate::config::WledDeviceConfig;

pub const DDP_PORT: u16 = 4048;

// WLED DDP timeout is ~1 second, so send keepalive every 500ms to be safe
const KEEPALIVE_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
pub struct LedDevice {
    pub ip: String,
    pub led_offset: usize,
    pub led_count: usize,
    pub enabled: bool,
}

impl LedDevice {
    /// Resolve a configured device against the canvas pixel count (led_count 0 = rest of the canvas)
    pub fn from_config(config: &WledDeviceConfig, total_leds: usize) -> Self {
        let led_count = if config.led_count == 0 {
            total_leds.saturating_sub(config.led_offset)
        } else {
            config.led_count
        };
        LedDevice {
            ip: config.ip.clone(),
            led_offset: config.led_offset,
            led_count,
            enabled: config.enabled,
        }
    }

    fn byte_range(&self) -> (usize, usize) {
        (self.led_offset * 3, (self.led_offset + self.led_count) * 3)
    }
}

/// Non-empty, and no two enabled devices claim the same LEDs
pub fn validate_devices(devices: &[LedDevice]) -> Result<()> {
    if devices.is_empty() {
        return Err(anyhow!("No devices configured"));
    }

    let enabled: Vec<&LedDevice> = devices.iter().filter(|d| d.enabled).collect();
    for (i, a) in enabled.iter().enumerate() {
        for b in &enabled[i + 1..] {
            let a_end = a.led_offset + a.led_count;
            let b_end = b.led_offset + b.led_count;
            if a.led_offset < b_end && a_end > b.led_offset {
                return Err(anyhow!(
                    "Overlapping LED ranges: Device {} ({}-{}) overlaps with Device {} ({}-{})",
                    a.ip,
                    a.led_offset,
                    a_end.saturating_sub(1),
                    b.ip,
                    b.led_offset,
                    b_end.saturating_sub(1)
                ));
            }
        }
    }

    Ok(())
}

/// Apply a brightness multiplier; frames at full brightness are returned untouched
pub fn apply_brightness(frame: &[u8], brightness: f64) -> Vec<u8> {
    if brightness >= 1.0 {
        return frame.to_vec();
    }
    frame.iter().map(|&val| (val as f64 * brightness).round() as u8).collect()
}

struct DeviceConnection {
    device: LedDevice,
    ddp_connection: DDPConnection,
    last_send_time: Instant,
}

impl DeviceConnection {
    fn new(device: LedDevice) -> Result<Self> {
        let dest_addr = format!("{}:{}", device.ip, DDP_PORT);
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        let ddp_connection = DDPConnection::try_new(&dest_addr, PixelConfig::default(), ID::Default, socket)?;

        Ok(DeviceConnection {
            device,
            ddp_connection,
            last_send_time: Instant::now(),
        })
    }
}

pub struct LedMirror {
    devices: Vec<DeviceConnection>,
    fail_fast: bool,
}

impl LedMirror {
    pub fn new(devices: Vec<LedDevice>, fail_fast: bool) -> Result<Self> {
        validate_devices(&devices)?;

        let mut connections = Vec::new();
        for device in devices.into_iter().filter(|d| d.enabled) {
            let ip = device.ip.clone();
            match DeviceConnection::new(device) {
                Ok(conn) => connections.push(conn),
                Err(e) => warn!("Failed to connect to {}: {}", ip, e),
            }
        }

        if connections.is_empty() {
            return Err(anyhow!("No devices connected successfully"));
        }

        Ok(LedMirror { devices: connections, fail_fast })
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Send each device its slice of the frame. Per-device failures come back as strings.
    pub fn send_frame(&mut self, frame: &[u8], brightness: f64) -> Result<Vec<String>> {
        // Frame size should be divisible by 3 (RGB)
        if frame.len() % 3 != 0 {
            return Err(anyhow!(
                "Frame size must be divisible by 3 (RGB), got {} bytes",
                frame.len()
            ));
        }

        let frame = apply_brightness(frame, brightness);
        let mut errors = Vec::new();

        for conn in &mut self.devices {
            let (start, end) = conn.device.byte_range();
            if end > frame.len() {
                let err = format!(
                    "Device {} range exceeds frame size (device wants LEDs {}-{}, frame has {} LEDs)",
                    conn.device.ip,
                    conn.device.led_offset,
                    (conn.device.led_offset + conn.device.led_count).saturating_sub(1),
                    frame.len() / 3
                );
                warn!("{}", err);
                errors.push(err);
                if self.fail_fast {
                    return Err(anyhow!("Frame range error"));
                }
                continue;
            }

            let device_frame = &frame[start..end];

            // Skip sending if all zeros AND we don't need a keepalive
            let needs_keepalive = conn.last_send_time.elapsed() >= KEEPALIVE_INTERVAL;
            if !needs_keepalive && device_frame.iter().all(|&b| b == 0) {
                continue;
            }

            match conn.ddp_connection.write(device_frame) {
                Ok(_) => conn.last_send_time = Instant::now(),
                Err(e) => {
                    let err = format!("Failed to send to {}: {}", conn.device.ip, e);
                    warn!("{}", err);
                    errors.push(err);
                    if self.fail_fast {
                        return Err(anyhow!("Failed to send to device"));
                    }
                }
            }
        }

        Ok(errors)
    }
}
