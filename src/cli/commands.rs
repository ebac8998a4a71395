use anyhow::Result;
use log::info;

use super::RunArgs;
use crate::config::Config;
use crate::engine::stage::{CompletionRule, Gate};
use crate::engine::STAGES;
use crate::host;

pub fn run_command(args: RunArgs) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(url) = args.url {
        config.destination_url = url;
    }
    if let Some(tick_millis) = args.tick_millis {
        config.tick_millis = tick_millis;
    }
    crate::init_config(config)?;

    let config = crate::global_config();
    info!(
        "running stall sequence toward {} ({} ms/tick)",
        config.destination_url, config.tick_millis
    );
    host::run(config)
}

pub fn stages_command() -> Result<()> {
    println!("{:>2}  {:>8}  {:<24}  {}", "#", "duration", "slug", "completion");
    for spec in &STAGES {
        println!(
            "{:>2}  {:>7}s  {:<24}  {}",
            spec.index,
            spec.duration.as_secs(),
            spec.slug,
            describe_completion(spec.completion)
        );
    }
    Ok(())
}

fn describe_completion(rule: CompletionRule) -> String {
    match rule {
        CompletionRule::TimerExpiry => "timer expiry".to_string(),
        CompletionRule::TimerExpiryAndGate(gate) => {
            format!("timer expiry + {}", describe_gate(gate))
        }
        CompletionRule::ExternalEvent(gate) => format!("user event + {}", describe_gate(gate)),
    }
}

fn describe_gate(gate: Gate) -> String {
    match gate {
        Gate::TimerExpired => "timer expired".to_string(),
        Gate::RetriesAtLeast(n) => format!("{n} retry clicks"),
        Gate::AllVotesCast => "all votes cast".to_string(),
        Gate::FeedbackReady { min_len } => format!("unlocked field + {min_len} characters"),
    }
}
