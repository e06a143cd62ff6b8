// Config Module - Configuration management and command-line argument parsing
use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

// Global storage for custom config path
static CUSTOM_CONFIG_PATH: OnceLock<Option<String>> = OnceLock::new();

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about = "Slither-style snake game rendered in the terminal",
    long_about = "Steer the green snake with the mouse, avoid the red ones and eat what they leave behind.\n\
                  The playfield is drawn with half-block characters and can be mirrored to WLED\n\
                  LED matrices over DDP."
)]
pub struct Args {
    /// Target framerate (ticks per second)
    #[arg(long)]
    pub fps: Option<f64>,

    /// World units per canvas pixel
    #[arg(long)]
    pub scale: Option<f64>,

    /// Canvas width in pixels (0 = terminal width)
    #[arg(long)]
    pub width: Option<usize>,

    /// Canvas height in pixels (0 = twice the terminal height)
    #[arg(long)]
    pub height: Option<usize>,

    /// WLED device address for mirroring the canvas
    #[arg(short, long)]
    pub wled_ip: Option<String>,

    /// LED brightness multiplier (0.0 - 1.0)
    #[arg(short, long)]
    pub brightness: Option<f64>,

    /// Seed for the random number generator (reproducible games)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Config file path or name (e.g., --cfg /full/path or --cfg myconf for ~/.config/rustslither/myconf.conf)
    #[arg(long)]
    pub cfg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WledDeviceConfig {
    pub ip: String,
    pub led_offset: usize,
    pub led_count: usize,  // 0 = everything from led_offset to the end of the canvas
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    #[serde(skip)]
    pub config_path: Option<PathBuf>,  // Stores the config file path (not serialized)

    pub fps: f64,
    pub scale: f64,  // World units per canvas pixel
    pub canvas_width: usize,  // 0 = auto from terminal size
    pub canvas_height: usize,  // 0 = auto from terminal size
    pub seed: Option<u64>,
    pub log_file: String,
    pub log_level: String,
    pub global_brightness: f64,  // LED brightness multiplier (0.0 to 1.0)
    pub wled_ip: String,
    pub multi_device_fail_fast: bool,
    pub wled_devices: Vec<WledDeviceConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            config_path: None,
            fps: 60.0,
            scale: 4.0,
            canvas_width: 0,
            canvas_height: 0,
            seed: None,
            log_file: "rustslither.log".to_string(),
            log_level: "info".to_string(),
            global_brightness: 1.0,
            wled_ip: "".to_string(),
            multi_device_fail_fast: false,
            wled_devices: Vec::new(),
        }
    }
}

impl GameConfig {
    pub fn merge_with_args(&mut self, args: &Args) -> bool {
        // Track if any args were actually provided
        let mut args_provided = false;

        if let Some(fps) = args.fps {
            self.fps = fps;
            args_provided = true;
        }

        if let Some(scale) = args.scale {
            self.scale = scale;
            args_provided = true;
        }

        if let Some(width) = args.width {
            self.canvas_width = width;
            args_provided = true;
        }

        if let Some(height) = args.height {
            self.canvas_height = height;
            args_provided = true;
        }

        if let Some(ref wled_ip) = args.wled_ip {
            self.wled_ip = wled_ip.clone();
            // --wled-ip replaces the device list with a single full-canvas device
            self.wled_devices = vec![WledDeviceConfig {
                ip: wled_ip.clone(),
                led_offset: 0,
                led_count: 0,
                enabled: true,
            }];
            args_provided = true;
        }

        if let Some(brightness) = args.brightness {
            self.global_brightness = brightness;
            args_provided = true;
        }

        if let Some(seed) = args.seed {
            self.seed = Some(seed);
            args_provided = true;
        }

        if let Some(ref log_file) = args.log_file {
            self.log_file = log_file.clone();
            args_provided = true;
        }

        if let Some(ref log_level) = args.log_level {
            self.log_level = log_level.clone();
            args_provided = true;
        }

        self.sanitize();
        args_provided
    }

    /// Set the global config path (called once at startup)
    pub fn set_config_path(cfg: Option<String>) {
        let _ = CUSTOM_CONFIG_PATH.set(cfg);
    }

    /// Get the global config path (if set)
    fn get_config_path_arg() -> Option<&'static str> {
        CUSTOM_CONFIG_PATH.get()
            .and_then(|opt| opt.as_deref())
    }

    fn config_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        let config_dir = PathBuf::from(home).join(".config").join("rustslither");
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create {}", config_dir.display()))?;
        Ok(config_dir)
    }

    pub fn config_path(cfg_arg: Option<&str>) -> Result<PathBuf> {
        // Priority: explicit arg > global > None
        let cfg = cfg_arg.or_else(|| Self::get_config_path_arg());

        let Some(cfg) = cfg else {
            return Ok(Self::config_dir()?.join("config.conf"));
        };

        let path = PathBuf::from(cfg);
        if path.is_absolute() || cfg.contains('/') || cfg.contains('\\') {
            return Ok(path);
        }

        // Otherwise treat as config name in config directory
        let filename = if cfg.ends_with(".conf") {
            cfg.to_string()
        } else {
            format!("{}.conf", cfg)
        };

        Ok(Self::config_dir()?.join(filename))
    }

    pub fn load_with_path(cfg_arg: Option<&str>) -> Result<Self> {
        let path = Self::config_path(cfg_arg)?;
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut parsed: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        parsed.config_path = Some(path);
        parsed.sanitize();

        // Auto-migrate: a bare wled_ip becomes device 0 covering the whole canvas
        if parsed.wled_devices.is_empty() && !parsed.wled_ip.is_empty() {
            log::info!("Migrating wled_ip {} to multi-device config (device 0)", parsed.wled_ip);
            parsed.wled_devices.push(WledDeviceConfig {
                ip: parsed.wled_ip.clone(),
                led_offset: 0,
                led_count: 0,
                enabled: true,
            });
            if let Err(e) = parsed.save() {
                log::warn!("Failed to save migrated config: {:#}", e);
            }
        }

        Ok(parsed)
    }

    /// Sanitize config values to handle common formatting issues
    pub fn sanitize(&mut self) {
        self.wled_ip = self.wled_ip.trim().to_string();
        self.log_file = self.log_file.trim().to_string();
        self.log_level = self.log_level.trim().to_lowercase();
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            self.log_level = "info".to_string();
        }
        if self.log_file.is_empty() {
            self.log_file = "rustslither.log".to_string();
        }
        for device in &mut self.wled_devices {
            device.ip = device.ip.trim().to_string();
        }

        // Clamp numeric values to reasonable ranges
        self.fps = self.fps.max(1.0).min(500.0);
        self.scale = self.scale.max(0.25).min(64.0);
        self.canvas_width = self.canvas_width.min(4096);
        self.canvas_height = self.canvas_height.min(4096);
        self.global_brightness = self.global_brightness.max(0.0).min(1.0);
    }

    pub fn save(&self) -> Result<()> {
        let path = match self.config_path.clone() {
            Some(path) => path,
            None => Self::config_path(None)?,
        };

        // Sanitize values before saving
        let mut sanitized = self.clone();
        sanitized.sanitize();

        // Keep wled_ip in sync with device 0 for older configs
        if let Some(first) = sanitized.wled_devices.first() {
            sanitized.wled_ip = first.ip.clone();
        }

        let seed_line = match sanitized.seed {
            Some(seed) => format!("seed = {}", seed),
            None => "# seed = 1234".to_string(),
        };

        // Build TOML with comments manually for better documentation
        let mut contents = format!(
            r#"# RustSlither Configuration File
# Command-line flags override these values and are written back here

# Simulation ticks (and terminal frames) per second
fps = {}

# World units per canvas pixel
# Snakes are 12 units wide, so 4.0 draws a segment about 3 pixels across
scale = {}

# Canvas size in pixels (0 = fit the terminal at startup)
# One terminal cell shows two pixels stacked vertically
canvas_width = {}
canvas_height = {}

# Random seed; leave unset for a different game every run
{}

# Log destination (the terminal is busy drawing the game)
log_file = "{}"

# Options: "off", "error", "warn", "info", "debug", "trace"
log_level = "{}"

# LED brightness multiplier applied when mirroring to WLED (0.0 - 1.0)
global_brightness = {}

# Single WLED device address (kept in sync with device 0 below)
wled_ip = "{}"

# Stop sending a frame at the first device error
multi_device_fail_fast = {}
"#,
            sanitized.fps,
            sanitized.scale,
            sanitized.canvas_width,
            sanitized.canvas_height,
            seed_line,
            sanitized.log_file,
            sanitized.log_level,
            sanitized.global_brightness,
            sanitized.wled_ip,
            sanitized.multi_device_fail_fast,
        );

        // Append wled_devices array if devices are configured
        if !sanitized.wled_devices.is_empty() {
            contents.push_str("\n# Multi-Device Configuration\n");
            contents.push_str("# Each WLED controller gets a slice of the canvas, pixels in row-major order\n");
            contents.push_str("# led_offset: Starting pixel in the canvas frame\n");
            contents.push_str("# led_count: Number of LEDs this device controls (0 = rest of the canvas)\n\n");

            for device in &sanitized.wled_devices {
                contents.push_str("[[wled_devices]]\n");
                contents.push_str(&format!("ip = \"{}\"\n", device.ip));
                contents.push_str(&format!("led_offset = {}\n", device.led_offset));
                contents.push_str(&format!("led_count = {}\n", device.led_count));
                contents.push_str(&format!("enabled = {}\n\n", device.enabled));
            }
        }

        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }
}
