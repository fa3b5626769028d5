//! `simulate` command.
//!
//! Builds a [`SimulatedHost`] from the flags, runs a session on it and prints
//! the session timeline, the calls the host received and the registered
//! exchange slots.

use std::path::PathBuf;

use clap::Args;
use tokio::time::Instant;

use adfallback::config::PRIMARY_CONTAINER;
use adfallback::host::sim::{SimulatedHost, SIM_VIEWPORT_WIDTH};
use adfallback::host::ContainerId;
use adfallback::probe::check_rendered;
use adfallback::Session;

use super::common::{format_sizes, read_config};
use crate::error::CliError;

/// Flags describing the simulated page.
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Path to the configuration JSON
    pub config: PathBuf,

    /// Viewport width in CSS pixels
    #[arg(long, default_value_t = SIM_VIEWPORT_WIDTH)]
    pub width: u32,

    /// Primary entry point becomes callable after N failed polls
    #[arg(long, value_name = "N", conflicts_with = "primary_missing")]
    pub primary_ready_after: Option<u32>,

    /// Primary entry point never becomes callable
    #[arg(long)]
    pub primary_missing: bool,

    /// Height of the primary creative once rendered (0 = collapsed)
    #[arg(long, value_name = "PX")]
    pub rendered_height: Option<u32>,

    /// Simulate a content blocker
    #[arg(long)]
    pub adblock: bool,

    /// Remove the primary container from the page
    #[arg(long)]
    pub no_container: bool,

    /// Make the exchange refuse to define the fallback slot
    #[arg(long)]
    pub fail_slot: bool,

    /// Total number of fallback attempts
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub attempts: u32,

    /// Wait out timers in real time instead of skipping ahead
    #[arg(long)]
    pub realtime: bool,
}

impl SimulateArgs {
    fn host(&self) -> SimulatedHost {
        let mut host = SimulatedHost::new().with_viewport_width(self.width);

        if self.primary_missing {
            host = host.without_primary();
        } else if let Some(polls) = self.primary_ready_after {
            host = host.with_primary_ready_after(polls);
        }
        if let Some(height) = self.rendered_height {
            host = host.with_rendered_creative(height);
        }
        if self.adblock {
            host = host.with_adblock();
        }
        if self.no_container {
            host = host.without_container(PRIMARY_CONTAINER);
        }
        if self.fail_slot {
            host = host.with_failing_slot(PRIMARY_CONTAINER);
        }
        host
    }
}

/// Run a simulated session and print what happened.
pub fn run(args: SimulateArgs) -> Result<(), CliError> {
    let raw = read_config(&args.config)?;
    let mut session = Session::new(args.host());
    session.start(raw)?;

    if args.realtime {
        run_realtime(&mut session)?;
    } else {
        session.run_until_idle();
    }
    finish_script_loads(&mut session);

    let container = ContainerId::from(PRIMARY_CONTAINER);
    for _ in 1..args.attempts {
        let health = check_rendered(&session.host().page, &container);
        session.attempt_fallback(health);
        finish_script_loads(&mut session);
    }

    print_report(&session);
    Ok(())
}

/// Drive the event loop with tokio timers, one deadline at a time.
fn run_realtime(session: &mut Session<SimulatedHost>) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| CliError::Runtime(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let started = Instant::now();
        while let Some(deadline) = session.next_deadline() {
            tokio::time::sleep_until(started + deadline).await;
            session.advance_to(deadline);
        }
    });
    Ok(())
}

fn finish_script_loads(session: &mut Session<SimulatedHost>) {
    if session.host_mut().finish_script_loads() {
        session.on_exchange_ready();
    }
}

fn print_report(session: &Session<SimulatedHost>) {
    let host = session.host();

    println!("Timeline:");
    for entry in session.timeline() {
        println!("  {}", entry);
    }

    println!();
    println!("Host:");
    println!("  Primary polls:    {}", host.primary.polls());
    println!("  Primary requests: {}", host.primary.calls().len());
    println!("  Scripts:          {}", host.page.scripts().len());
    for script in host.page.scripts() {
        println!("    {}", script);
    }
    println!("  Exchange calls:   {}", host.exchange.calls().len());
    for call in host.exchange.calls() {
        println!("    {:?}", call);
    }
    println!("  Sense pushes:     {}", host.sense.pushes());

    if let Some(decision) = session.last_decision() {
        println!();
        println!("Decision: {}", decision);
    }

    let slots = session.debug_slots();
    println!();
    println!("Exchange slots ({}):", slots.len());
    for (i, slot) in slots.iter().enumerate() {
        println!(
            "  {}. {} in #{} [{}]",
            i + 1,
            slot.ad_unit_path,
            slot.container,
            format_sizes(&slot.sizes)
        );
    }
}
