#[macro_use]
extern crate tracing;

use clap::Parser;
use eyre::Result;
use lock_dapp::{
    FlowOutcome, InjectedWallet, LockSession, RpcWallet, ViewState, state::display_ether,
};
use std::{process::ExitCode, sync::Arc};
use tracing_subscriber::EnvFilter;

mod args;

use args::{LockArgs, LockSubcommand};

fn main() -> Result<ExitCode> {
    subscriber();
    let args = LockArgs::parse();
    main_args(args)
}

/// Initializes a tracing subscriber, logging Lock events at `info` unless `RUST_LOG` says
/// otherwise.
fn subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lock=info"));
    tracing_subscriber::FmtSubscriber::builder().with_env_filter(filter).init();
}

#[tokio::main]
async fn main_args(args: LockArgs) -> Result<ExitCode> {
    let config = args.config.load_config()?;
    let wallet = RpcWallet::from_config(&config, args.wallet.private_key.as_deref())
        .await?
        .map(|wallet| Arc::new(wallet) as Arc<dyn InjectedWallet>);
    if wallet.is_none() {
        warn!(target: "lock::cli", "no RPC endpoint configured, nothing will be submitted");
    }

    let session = LockSession::with_sender(config.contract_address, wallet, config.sender);

    match args.cmd {
        LockSubcommand::Balance => {
            let view = session.refresh().await;
            print_view(&view);
        }
        LockSubcommand::Info => {
            let info = session.info().await?;
            println!("address      {}", info.address);
            println!("owner        {}", info.owner);
            println!("unlock time  {}", info.unlock_time);
            println!("balance      {} ETH", display_ether(info.balance));
        }
        LockSubcommand::Deposit { amount } => {
            session.refresh().await;
            session.set_deposit_input(amount);
            let outcome = session.deposit().await;
            return Ok(report(&outcome, &session.view()));
        }
        LockSubcommand::Withdraw { unlock_time } => {
            session.refresh().await;
            session.set_unlock_time_input(unlock_time);
            let outcome = session.withdraw().await;
            return Ok(report(&outcome, &session.view()));
        }
        LockSubcommand::Watch => {
            let view = session.mount().await;
            print_view(&view);
            if session.events().is_subscribed() {
                println!("Listening for FallbackCalled events, press Ctrl-C to stop.");
                tokio::signal::ctrl_c().await?;
            }
            session.teardown();
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_view(view: &ViewState) {
    println!("Withdrawn amount: {} ETH", view.held_amount);
}

fn report(outcome: &FlowOutcome, view: &ViewState) -> ExitCode {
    let code = match outcome {
        FlowOutcome::Confirmed { receipt, .. } => {
            match receipt.block_number {
                Some(block) => {
                    println!("Transaction {} confirmed in block {block}", receipt.transaction_hash)
                }
                None => println!("Transaction {} confirmed", receipt.transaction_hash),
            }
            ExitCode::SUCCESS
        }
        FlowOutcome::Skipped(reason) => {
            println!("Nothing submitted: {reason}");
            ExitCode::SUCCESS
        }
        FlowOutcome::Failed(err) => {
            println!("Transaction failed: {err}");
            ExitCode::FAILURE
        }
    };
    print_view(view);
    code
}
