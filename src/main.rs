// ledger - command line front end for a provledger data directory

use clap::{Parser, Subcommand};
use provledger::call::{Call, CallBuilder};
use provledger::host::{Executor, LedgerConfig, LedgerService, LedgerState};
use provledger::identity::{Address, Keypair};
use provledger::storage::LedgerStore;
use provledger::token::{Amount, LedgerEvent, MinterId, UNLIMITED_ALLOWANCE};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "ledger", version, about = "Multi-minter provenance token ledger")]
struct Cli {
    /// Directory of the ledger database
    #[arg(long, global = true, default_value = "ledger-data")]
    data_dir: PathBuf,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create and store a signing identity
    Keygen { label: String },
    /// Show the address of a stored identity
    Address { label: String },
    /// List stored identities
    Identities,
    /// Initialize the ledger; the signer becomes owner
    Init {
        #[arg(long = "as")]
        signer: String,
        #[arg(long, default_value = "WUSD")]
        name: String,
        #[arg(long, default_value = "wusd")]
        symbol: String,
    },
    /// Register a minter
    Register {
        #[arg(long = "as")]
        signer: String,
        #[arg(long, value_parser = parse_minter)]
        minter: MinterId,
    },
    /// Mint under a minter (to the signer when --to is omitted)
    Mint {
        #[arg(long = "as")]
        signer: String,
        #[arg(long, value_parser = parse_minter)]
        minter: MinterId,
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
        #[arg(long)]
        to: Option<String>,
    },
    /// Burn from the signer's own bucket of a minter
    Burn {
        #[arg(long = "as")]
        signer: String,
        #[arg(long, value_parser = parse_minter)]
        minter: MinterId,
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
    },
    Transfer {
        #[arg(long = "as")]
        signer: String,
        #[arg(long)]
        to: String,
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
    },
    TransferFrom {
        #[arg(long = "as")]
        signer: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
    },
    /// Set an allowance ("max" approves without limit)
    Approve {
        #[arg(long = "as")]
        signer: String,
        #[arg(long)]
        spender: String,
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
    },
    IncreaseAllowance {
        #[arg(long = "as")]
        signer: String,
        #[arg(long)]
        spender: String,
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
    },
    DecreaseAllowance {
        #[arg(long = "as")]
        signer: String,
        #[arg(long)]
        spender: String,
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
    },
    Pause {
        #[arg(long = "as")]
        signer: String,
    },
    Unpause {
        #[arg(long = "as")]
        signer: String,
    },
    TransferOwnership {
        #[arg(long = "as")]
        signer: String,
        #[arg(long)]
        new_owner: String,
    },
    /// Record a new logic version; ledger state is kept
    Upgrade {
        #[arg(long = "as")]
        signer: String,
        #[arg(long)]
        version: u32,
    },
    /// Balance of an account, split by minter
    Balance {
        account: String,
        #[arg(long, value_parser = parse_minter)]
        minter: Option<MinterId>,
    },
    Allowance {
        owner: String,
        spender: String,
    },
    /// Registered minters and their outstanding issuance
    Minters,
    /// Token metadata and total supply
    Supply,
    /// Recompute the conservation invariants
    Audit,
}

fn parse_amount(s: &str) -> Result<Amount, String> {
    match s {
        "max" | "unlimited" => Ok(UNLIMITED_ALLOWANCE),
        _ => s.replace('_', "").parse::<Amount>().map_err(|e| e.to_string()),
    }
}

fn parse_minter(s: &str) -> Result<MinterId, String> {
    MinterId::parse(s).map_err(|e| e.to_string())
}

/// Accept either a hex address or the label of a stored identity
fn resolve_address(store: &LedgerStore, s: &str) -> CliResult<Address> {
    if let Ok(address) = Address::parse(s) {
        return Ok(address);
    }
    match store.load_keypair(s)? {
        Some(keypair) => Ok(keypair.address()),
        None => Err(format!("'{}' is neither an address nor a stored identity", s).into()),
    }
}

fn load_signer(store: &LedgerStore, label: &str) -> CliResult<Keypair> {
    store
        .load_keypair(label)?
        .ok_or_else(|| format!("no identity stored under '{}'", label).into())
}

fn load_state(store: &LedgerStore) -> CliResult<LedgerState> {
    Ok(store.load_state()?.unwrap_or_else(LedgerState::new))
}

fn print_event(event: &LedgerEvent) {
    match event {
        LedgerEvent::Transfer { from, to, amount, provenance } => {
            let split: Vec<String> = provenance
                .iter()
                .map(|b| format!("{}={}", b.minter(), b.amount()))
                .collect();
            println!("  Transfer {} -> {}: {} [{}]", from, to, amount, split.join(", "));
        }
        other => println!("  {:?}", other),
    }
}

/// Sign a call and run it through the ledger service, persisting on commit
async fn execute(store: LedgerStore, config: &LedgerConfig, signer: &str, call: Call) -> CliResult<()> {
    let keypair = load_signer(&store, signer)?;
    let state = load_state(&store)?;
    let signed = CallBuilder::new().signer(&keypair).call(call).build()?;

    let store = Arc::new(store);
    let executor = Executor::with_state(state, config);
    let (handle, task) = LedgerService::spawn(executor, store.clone(), config.channel_capacity);

    let outcome = handle.submit(signed).await;
    handle.shutdown().await?;
    task.await?;

    let receipt = outcome?;
    println!("{} ok ({})", receipt.operation(), receipt.call_id());
    for event in receipt.events() {
        print_event(event);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let store = LedgerStore::open(&cli.data_dir)?;
    let mut config = store
        .load_config()?
        .unwrap_or_default()
        .with_data_dir(cli.data_dir.clone());

    match cli.command {
        Command::Keygen { label } => {
            if store.load_keypair(&label)?.is_some() {
                return Err(format!("identity '{}' already exists", label).into());
            }
            let keypair = Keypair::generate();
            store.save_keypair(&label, &keypair)?;
            store.flush()?;
            println!("{} {}", label, keypair.address());
        }
        Command::Address { label } => {
            println!("{}", load_signer(&store, &label)?.address());
        }
        Command::Identities => {
            for label in store.keypair_labels()? {
                println!("{} {}", label, load_signer(&store, &label)?.address());
            }
        }
        Command::Init { signer, name, symbol } => {
            config = config.with_name(&name).with_symbol(&symbol);
            config.validate()?;
            store.save_config(&config)?;
            execute(store, &config, &signer, Call::Initialize { name, symbol }).await?;
        }
        Command::Register { signer, minter } => {
            execute(store, &config, &signer, Call::RegisterMinter { minter }).await?;
        }
        Command::Mint { signer, minter, amount, to } => {
            let to = match to {
                Some(to) => resolve_address(&store, &to)?,
                None => Address::ZERO,
            };
            execute(store, &config, &signer, Call::Mint { minter, amount, to }).await?;
        }
        Command::Burn { signer, minter, amount } => {
            execute(store, &config, &signer, Call::Burn { minter, amount }).await?;
        }
        Command::Transfer { signer, to, amount } => {
            let to = resolve_address(&store, &to)?;
            execute(store, &config, &signer, Call::Transfer { to, amount }).await?;
        }
        Command::TransferFrom { signer, from, to, amount } => {
            let from = resolve_address(&store, &from)?;
            let to = resolve_address(&store, &to)?;
            execute(store, &config, &signer, Call::TransferFrom { from, to, amount }).await?;
        }
        Command::Approve { signer, spender, amount } => {
            let spender = resolve_address(&store, &spender)?;
            execute(store, &config, &signer, Call::Approve { spender, amount }).await?;
        }
        Command::IncreaseAllowance { signer, spender, amount } => {
            let spender = resolve_address(&store, &spender)?;
            execute(store, &config, &signer, Call::IncreaseAllowance { spender, added: amount }).await?;
        }
        Command::DecreaseAllowance { signer, spender, amount } => {
            let spender = resolve_address(&store, &spender)?;
            execute(store, &config, &signer, Call::DecreaseAllowance { spender, subtracted: amount }).await?;
        }
        Command::Pause { signer } => {
            execute(store, &config, &signer, Call::Pause).await?;
        }
        Command::Unpause { signer } => {
            execute(store, &config, &signer, Call::Unpause).await?;
        }
        Command::TransferOwnership { signer, new_owner } => {
            let new_owner = resolve_address(&store, &new_owner)?;
            execute(store, &config, &signer, Call::TransferOwnership { new_owner }).await?;
        }
        Command::Upgrade { signer, version } => {
            execute(store, &config, &signer, Call::UpgradeTo { logic_version: version }).await?;
        }
        Command::Balance { account, minter } => {
            let address = resolve_address(&store, &account)?;
            let state = load_state(&store)?;
            let ledger = state.ledger();
            match minter {
                Some(minter) => println!("{}", ledger.balance_of_minter(&address, &minter)),
                None => {
                    println!("{} {}", address, ledger.balance_of(&address));
                    for bucket in ledger.buckets(&address) {
                        println!("  {} {}", bucket.minter(), bucket.amount());
                    }
                }
            }
        }
        Command::Allowance { owner, spender } => {
            let owner = resolve_address(&store, &owner)?;
            let spender = resolve_address(&store, &spender)?;
            let state = load_state(&store)?;
            println!("{}", state.ledger().allowance(&owner, &spender));
        }
        Command::Minters => {
            let state = load_state(&store)?;
            for record in state.ledger().minters() {
                println!("{} {}", record.id(), record.total_issued());
            }
        }
        Command::Supply => {
            let state = load_state(&store)?;
            let ledger = state.ledger();
            println!(
                "{} ({}) decimals={} supply={} owner={} paused={} logic=v{}",
                ledger.name(),
                ledger.symbol(),
                ledger.decimals(),
                ledger.total_supply(),
                ledger.owner(),
                ledger.is_paused(),
                ledger.logic_version()
            );
        }
        Command::Audit => {
            let state = load_state(&store)?;
            state.ledger().check_invariants()?;
            println!("ok: {} accounts, {} minters", state.ledger().accounts().len(), state.ledger().minters().len());
        }
    }
    Ok(())
}
