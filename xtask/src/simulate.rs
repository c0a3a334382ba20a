//! xtask simulate: run the alert pipeline on the desktop.
//!
//! Builds the sound catalog from a local directory standing in for the SD
//! card, feeds one advertisement payload through classify → dedup → admit,
//! plays the selected file into a counting sink and prints the session
//! report. Pacing runs in real time, so a one-second clip takes a second.
//!
//! ```bash
//! cargo xtask simulate --sd-root ./sdcard \
//!     --report "020106 03031118 06ff5900013412"
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=debug` to see rejections.

use std::convert::Infallible;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use bluetooth::{AdvEventType, AdvertisementReport, Classifier, PeerAddress};
use buzzer::{Buzzer, BuzzerConfig, Dispatch};
use clap::Args;
use colored::Colorize;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use platform::storage_local::LocalFileStorage;
use platform::{AudioConfig, AudioOutput};
use tracing_subscriber::EnvFilter;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Directory standing in for the SD card root
    #[arg(long)]
    pub sd_root: PathBuf,
    /// Advertising data as hex; spaces and colons are ignored
    #[arg(long)]
    pub report: String,
    /// Peer allow-list: ADDR_ANY or AA:BB:CC:DD:EE:FF
    #[arg(long, default_value = "ADDR_ANY")]
    pub peer: String,
    /// Sender address of the simulated advertisement
    #[arg(long, default_value = "00:00:00:00:00:00")]
    pub addr: String,
    /// HCI advertising report event type (0 = ADV_IND, 1 = ADV_DIRECT_IND)
    #[arg(long, default_value_t = 0)]
    pub event_type: u8,
}

/// Audio output that only counts what it receives.
#[derive(Debug, Default)]
struct CountingSink {
    config: Option<AudioConfig>,
    frames: u64,
    bytes: u64,
}

impl AudioOutput for CountingSink {
    type Error = Infallible;

    async fn configure(&mut self, config: AudioConfig) -> Result<(), Self::Error> {
        self.config = Some(config);
        Ok(())
    }

    async fn write(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        self.frames = self.frames.saturating_add(1);
        self.bytes = self.bytes.saturating_add(frame.len() as u64);
        Ok(())
    }

    async fn release(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Entry point called from main.rs
pub fn run(args: &SimulateArgs) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let payload = parse_hex(&args.report)?;
    let addr = PeerAddress::parse(&args.addr).map_err(|e| anyhow!("--addr: {e}"))?;
    let config = BuzzerConfig::with_peer(&args.peer).map_err(|e| anyhow!("--peer: {e}"))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to start tokio runtime")?;
    runtime.block_on(simulate(args, config, addr, &payload))
}

async fn simulate(
    args: &SimulateArgs,
    config: BuzzerConfig,
    addr: PeerAddress,
    payload: &[u8],
) -> Result<()> {
    let mut storage = LocalFileStorage::new(&args.sd_root);
    let buzzer: Buzzer<NoopRawMutex> = Buzzer::init(config, &mut storage).await;

    println!();
    println!("{}", "📂 Sound catalog".cyan().bold());
    if buzzer.catalog().is_empty() {
        println!("   {}", "(empty)".dimmed());
    }
    for (index, name) in buzzer.catalog().iter() {
        println!("   {index}: {name}");
    }
    println!();

    let report = AdvertisementReport {
        addr,
        event_type: AdvEventType::from_raw(args.event_type),
        data: payload,
    };

    match buzzer.on_advertisement(&report) {
        Dispatch::Started(index) => {
            println!("{}", format!("▶ Playing index {index}").cyan().bold());
            let mut sink = CountingSink::default();
            let session = buzzer.play_next(&mut storage, &mut sink).await;
            println!("   outcome:        {}", session.outcome);
            if let Some(header) = session.header {
                println!(
                    "   format:         {} Hz, {} ch, {} bit ({} µs/frame)",
                    header.sample_rate,
                    header.channels,
                    header.bits_per_sample,
                    header.frame_interval_us()
                );
            }
            println!("   frames written: {}", session.frames_written);
            println!("   write failures: {}", session.write_failures);
            println!("   bytes streamed: {}", sink.bytes);
        }
        Dispatch::Busy => println!("{}", "⚠ Busy: a session is already running".yellow()),
        Dispatch::Ignored => {
            let reason = Classifier::new(config.classifier)
                .evaluate(&report)
                .err()
                .map_or_else(
                    || "no sound in the selected slot".to_string(),
                    |rejection| rejection.to_string(),
                );
            println!("{}", format!("✗ Ignored: {reason}").yellow());
        }
    }
    println!();
    Ok(())
}

/// Decode a hex string, ignoring whitespace and `:` separators.
fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<char> = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if digits.len() % 2 != 0 {
        anyhow::bail!("--report: odd number of hex digits");
    }
    digits
        .chunks(2)
        .map(|pair| {
            let byte: String = pair.iter().collect();
            u8::from_str_radix(&byte, 16).with_context(|| format!("--report: bad hex byte {byte:?}"))
        })
        .collect()
}
