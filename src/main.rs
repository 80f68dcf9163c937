/*!
 * Heapspy - Demo Entry Point
 *
 * Drives a simulated large object space through a few collection passes and
 * streams its tiles:
 * - over TCP as size-prefixed bincode frames when HEAPSPY_CONNECT is set
 * - otherwise to stdout as JSON lines
 */

use anyhow::Context;
use heapspy::{
    init_tracing, monitoring::init_tracing_with, FramedWriter, GcSpyPlan, JsonLinesWriter,
    LargeObjectSpace, ServerInterpreter, SpyConfig, Transport, TreadmillDriver,
};
use std::io::BufWriter;
use std::net::TcpStream;
use tracing::{info, warn};

const PASSES: usize = 4;
const ALLOCATIONS_PER_PASS: usize = 24;

fn main() -> anyhow::Result<()> {
    let config = SpyConfig::from_env().context("invalid HEAPSPY_* configuration")?;
    if config.trace_json {
        init_tracing_with(true);
    } else {
        init_tracing();
    }

    info!("Heapspy starting...");
    info!(
        tile_size = config.tile_size,
        threshold = config.los_threshold,
        start = format_args!("0x{:x}", config.space_start),
        end = format_args!("0x{:x}", config.space_end),
        "Configuration loaded"
    );

    let transport: Box<dyn Transport> = match std::env::var("HEAPSPY_CONNECT") {
        Ok(addr) => {
            let stream = TcpStream::connect(&addr)
                .with_context(|| format!("failed to connect to monitor at {}", addr))?;
            info!(%addr, "Streaming bincode frames to monitor");
            Box::new(FramedWriter::new(BufWriter::new(stream)))
        }
        Err(_) => {
            info!("Streaming JSON lines to stdout");
            Box::new(JsonLinesWriter::new(std::io::stdout()))
        }
    };

    let los = LargeObjectSpace::new(
        config.space_start,
        config.space_end,
        config.page_size,
        config.los_threshold,
    );

    let interpreter = ServerInterpreter::new(&config.server_name);
    interpreter.attach();

    let mut params = config.treadmill_params();
    params.start = los.start();
    params.end = los.end();
    let driver = TreadmillDriver::new(params, interpreter.next_space_id())?;

    let mut plan = GcSpyPlan::new(los.clone(), interpreter, transport);
    plan.add_driver(Box::new(driver));

    for pass in 0..PASSES {
        // Churn: allocate a batch, then drop every third live object
        for i in 0..ALLOCATIONS_PER_PASS {
            let size = config.los_threshold * (1 + (i * 7 + pass * 3) % 11);
            if let Err(e) = los.allocate(size) {
                warn!(error = %e, size, "Allocation failed");
            }
        }
        for addr in los.objects().into_iter().step_by(3) {
            los.free(addr)?;
        }

        let outcomes = plan.collect(los.objects());
        for outcome in &outcomes {
            info!(pass, ?outcome, "Pass complete");
        }
    }

    let snapshot = plan.metrics().snapshot();
    info!(
        stats = ?los.stats(),
        metrics = %serde_json::to_string(&snapshot)?,
        "Heapspy finished"
    );
    Ok(())
}
