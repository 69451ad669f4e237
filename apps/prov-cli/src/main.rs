use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use device_provision::{self as prov, CompiledPlan, MetricsHub, Provisioner, StepSummary};
use modbus_link::{MockLink, ModbusLink, TcpLink, UnitId, MAX_READ_REGISTERS};
use register_codec::{codec, RegisterList};

#[derive(Parser, Debug)]
#[command(
    name = "prov",
    version,
    about = "Tracker and weather-controller provisioning",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the register payload of every step without connecting
    Encode {
        /// Plan file, or a directory of *.yaml plans
        #[arg(long)]
        plan: PathBuf,
        /// Emit JSON instead of a table
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Check a plan and report its size
    Validate {
        #[arg(long)]
        plan: PathBuf,
    },
    /// Apply a plan to the devices behind a Modbus TCP gateway
    Provision {
        #[arg(long)]
        plan: PathBuf,
        /// Gateway host name or address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 502)]
        port: u16,
        /// Use the in-memory register image instead of a gateway
        #[arg(long, action = ArgAction::SetTrue)]
        mock: bool,
        /// Per-request timeout in milliseconds
        #[arg(long, default_value_t = 2000)]
        timeout_ms: u64,
        /// Print Prometheus counters after the run
        #[arg(long, action = ArgAction::SetTrue)]
        metrics: bool,
    },
    /// Read holding registers from one unit
    Read {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 502)]
        port: u16,
        #[arg(long)]
        unit: UnitId,
        #[arg(long)]
        address: u16,
        #[arg(long, default_value_t = 1)]
        count: u16,
        #[arg(long, default_value_t = 2000)]
        timeout_ms: u64,
    },
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { plan, json } => encode(&plan, json),
        Commands::Validate { plan } => validate(&plan),
        Commands::Provision {
            plan,
            host,
            port,
            mock,
            timeout_ms,
            metrics,
        } => provision(&plan, &host, port, mock, timeout_ms, metrics),
        Commands::Read {
            host,
            port,
            unit,
            address,
            count,
            timeout_ms,
        } => read(&host, port, unit, address, count, timeout_ms),
    }
}

fn setup_tracing() {
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_and_compile(path: &Path) -> Result<CompiledPlan> {
    let plan = if path.is_dir() {
        prov::load_plans_dir(path)
            .with_context(|| format!("loading plans from {}", path.display()))?
    } else {
        prov::load_plan_file(path)?
    };
    let compiled = prov::compile(&plan)?;
    info!(
        devices = compiled.devices.len(),
        steps = compiled.step_count(),
        "plan compiled"
    );
    Ok(compiled)
}

#[derive(Serialize)]
struct EncodedDevice<'a> {
    name: &'a str,
    class: &'static str,
    unit_id: UnitId,
    steps: Vec<StepSummary>,
}

fn encode(path: &Path, json: bool) -> Result<()> {
    let compiled = load_and_compile(path)?;
    if json {
        let out: Vec<EncodedDevice<'_>> = compiled
            .devices
            .iter()
            .map(|d| EncodedDevice {
                name: &d.name,
                class: d.class.as_str(),
                unit_id: d.unit_id,
                steps: d.steps.iter().map(|s| s.summary()).collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    for dev in &compiled.devices {
        println!("# {} ({} unit {})", dev.name, dev.class.as_str(), dev.unit_id);
        for step in &dev.steps {
            let s = step.summary();
            match (s.and_mask, s.or_mask) {
                (Some(and), Some(or)) => {
                    println!("{}\t{}\tand={and:#06X} or={or:#06X}", s.unit, s.label)
                }
                _ if s.registers.is_empty() => println!("{}\t{}", s.unit, s.label),
                _ => println!(
                    "{}\t{}\t{}",
                    s.unit,
                    s.label,
                    RegisterList::from(s.registers)
                ),
            }
        }
    }
    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    let compiled = load_and_compile(path)?;
    println!(
        "ok: {} devices, {} steps",
        compiled.devices.len(),
        compiled.step_count()
    );
    Ok(())
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("resolving {host}:{port}"))?
        .next()
        .with_context(|| format!("no address for {host}:{port}"))
}

fn provision(
    path: &Path,
    host: &str,
    port: u16,
    mock: bool,
    timeout_ms: u64,
    metrics: bool,
) -> Result<()> {
    let compiled = load_and_compile(path)?;
    let hub = MetricsHub::new().map_err(anyhow::Error::msg)?;
    if mock {
        run_plan(Provisioner::new(MockLink::new()), &compiled, &hub, metrics)
    } else {
        let addr = resolve(host, port)?;
        let link = TcpLink::connect(addr, Some(Duration::from_millis(timeout_ms)))
            .with_context(|| format!("connecting to {addr}"))?;
        run_plan(Provisioner::new(link), &compiled, &hub, metrics)
    }
}

fn run_plan<L: ModbusLink>(
    provisioner: Provisioner<L>,
    compiled: &CompiledPlan,
    hub: &MetricsHub,
    print_metrics: bool,
) -> Result<()> {
    let mut provisioner = provisioner.with_metrics(hub.clone());
    let report = provisioner.run(compiled);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if print_metrics {
        print!("{}", hub.encode_text());
    }
    if !report.is_clean() {
        for dev in &report.devices {
            for step in dev.failed() {
                error!(device = %dev.name, step = %step.label, error = ?step.error, "failed");
            }
        }
        bail!("{} of {} steps failed", report.failed(), compiled.step_count());
    }
    Ok(())
}

fn read(
    host: &str,
    port: u16,
    unit: UnitId,
    address: u16,
    count: u16,
    timeout_ms: u64,
) -> Result<()> {
    if count == 0 || count > MAX_READ_REGISTERS {
        bail!("count must be within 1..={MAX_READ_REGISTERS}");
    }
    let addr = resolve(host, port)?;
    let mut link = TcpLink::connect(addr, Some(Duration::from_millis(timeout_ms)))
        .with_context(|| format!("connecting to {addr}"))?;
    let words = link.read_holding_registers(unit, address, count)?;
    // f32 column reads this word as the low half of a little-endian pair
    println!("addr\tu16\thex\ti16\tf32");
    for (i, w) in words.iter().enumerate() {
        let float = words
            .get(i + 1)
            .map(|hi| codec::decode_f32_le([*w, *hi]).to_string())
            .unwrap_or_default();
        println!(
            "{}\t{w}\t{w:#06X}\t{}\t{float}",
            usize::from(address) + i,
            codec::decode_u16_as_i16(*w)
        );
    }
    Ok(())
}
