//! did-wallet CLI — `didw` command.
//!
//! Creates and rotates own DIDs, stores peer DIDs, resolves verkeys and
//! endpoints, and manages per-DID metadata in an encrypted wallet
//! directory. A JSON ledger snapshot (`--registry`) stands in for the
//! authoritative registry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use base64::Engine;
use clap::{Parser, Subcommand};

use did_wallet::did;
use did_wallet::time::micros_to_rfc3339;
use did_wallet::{
    CryptoProvider, DidWallet, Ed25519Provider, Endpoint, FileKeyStore, Freshness,
    IdentityRequest, MemoryRegistry, NoRegistry, PeerIdentityRequest, Registry, RotationRequest,
    Scope, Source,
};

const PASSPHRASE_ENV: &str = "DIDW_PASSPHRASE";

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_wallet_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set; pass --wallet-dir")?;
    Ok(PathBuf::from(home).join(".did-wallet"))
}

// ── Passphrase helper ─────────────────────────────────────────────────────────

fn read_passphrase(prompt: &str) -> Result<String> {
    if let Ok(passphrase) = std::env::var(PASSPHRASE_ENV) {
        return Ok(passphrase);
    }
    eprint!("{prompt}");
    let mut passphrase = String::new();
    std::io::stdin()
        .read_line(&mut passphrase)
        .context("failed to read passphrase")?;
    Ok(passphrase.trim().to_string())
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// did-wallet CLI — manage DID key pairs, rotations, and resolution.
#[derive(Parser, Debug)]
#[command(
    name = "didw",
    about = "did-wallet CLI",
    version,
    long_about = "didw — did-wallet CLI\n\nCreate and rotate DID key pairs, store peer DIDs,\nand resolve verkeys and endpoints against a registry snapshot."
)]
struct Cli {
    /// Wallet directory (default: ~/.did-wallet)
    #[arg(long, global = true, env = "DIDW_WALLET_DIR")]
    wallet_dir: Option<PathBuf>,

    /// Owner scope inside the wallet
    #[arg(long, global = true, default_value = "default")]
    scope: String,

    /// Registry snapshot file used for fresh resolution and publishing
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new own DID
    Create {
        /// Seed for deterministic keys (32 chars, 64 hex, or base64)
        #[arg(long)]
        seed: Option<String>,

        /// Explicit DID; replaces the keys if the DID already exists
        #[arg(long)]
        did: Option<String>,

        /// Metadata to attach to the new DID
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Stage a new key pair for an own DID
    RotateStart {
        did: String,

        #[arg(long)]
        seed: Option<String>,
    },

    /// Make the staged key pair active
    RotateApply { did: String },

    /// Discard the staged key pair
    RotateAbort { did: String },

    /// Publish an own DID's verkey (or an explicit one) to the registry snapshot
    Publish {
        did: String,

        /// Verkey to publish instead of the active one
        #[arg(long)]
        verkey: Option<String>,

        /// Also publish an endpoint address
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Store a peer DID
    StoreTheir {
        did: String,

        /// Full or ~abbreviated verkey; the DID itself when omitted
        #[arg(long)]
        verkey: Option<String>,
    },

    /// Resolve the verkey of a DID
    Key {
        did: String,

        /// Consult the registry and refresh the local cache
        #[arg(long)]
        fresh: bool,
    },

    /// Manage service endpoints
    Endpoint {
        #[command(subcommand)]
        subcommand: EndpointCommands,
    },

    /// Manage per-DID metadata
    Metadata {
        #[command(subcommand)]
        subcommand: MetadataCommands,
    },

    /// List own DIDs in the scope
    List,

    /// Show an own DID
    Show { did: String },

    /// Sign a message with an own DID's active key
    Sign { did: String, message: String },

    /// Verify a base64 signature against a verkey
    Verify {
        verkey: String,
        message: String,
        signature: String,
    },

    /// Print the abbreviated form of a verkey
    Abbreviate { did: String, verkey: String },
}

#[derive(Subcommand, Debug)]
enum EndpointCommands {
    /// Store the endpoint of a DID
    Set {
        did: String,
        address: String,
        transport_verkey: String,
    },

    /// Show the endpoint of a DID
    Get {
        did: String,

        #[arg(long)]
        fresh: bool,
    },
}

#[derive(Subcommand, Debug)]
enum MetadataCommands {
    /// Attach metadata to a DID
    Set { did: String, value: String },

    /// Show the metadata of a DID
    Get { did: String },
}

// ── Main entry point ──────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let verbose = cli.verbose;

    // Commands that need neither the wallet nor the registry.
    match &cli.command {
        Commands::Verify {
            verkey,
            message,
            signature,
        } => return cmd_verify(verkey, message, signature),
        Commands::Abbreviate { did, verkey } => {
            println!("{}", did::abbreviate_verkey(did, verkey)?);
            return Ok(());
        }
        _ => {}
    }

    let ctx = Session::open(&cli)?;

    match cli.command {
        Commands::Create {
            seed,
            did,
            metadata,
        } => cmd_create(&ctx, seed, did, metadata.as_deref(), verbose).await,
        Commands::RotateStart { did, seed } => cmd_rotate_start(&ctx, &did, seed).await,
        Commands::RotateApply { did } => {
            ctx.wallet.commit_rotation(&ctx.scope, &did).await?;
            let identity = ctx.wallet.get_own_identity(&ctx.scope, &did).await?;
            println!("Rotation applied for {did}");
            println!("  Verkey: {}", identity.verkey);
            Ok(())
        }
        Commands::RotateAbort { did } => {
            ctx.wallet.abort_rotation(&ctx.scope, &did).await?;
            println!("Rotation aborted for {did}");
            Ok(())
        }
        Commands::Publish {
            did,
            verkey,
            endpoint,
        } => cmd_publish(&ctx, &did, verkey, endpoint).await,
        Commands::StoreTheir { did, verkey } => {
            let mut request = PeerIdentityRequest::new(did.as_str());
            request.verkey = verkey;
            ctx.wallet.store_peer_identity(&ctx.scope, &request).await?;
            let peer = ctx.wallet.get_peer_identity(&ctx.scope, &did).await?;
            println!("Stored {did}");
            println!("  Verkey: {}", peer.verkey);
            Ok(())
        }
        Commands::Key { did, fresh } => cmd_key(&ctx, &did, fresh, verbose).await,
        Commands::Endpoint { subcommand } => match subcommand {
            EndpointCommands::Set {
                did,
                address,
                transport_verkey,
            } => {
                ctx.wallet
                    .set_endpoint(&ctx.scope, &did, &address, &transport_verkey)
                    .await?;
                println!("Endpoint of {did} set to {address}");
                Ok(())
            }
            EndpointCommands::Get { did, fresh } => {
                let resolution = ctx
                    .wallet
                    .resolve_endpoint(&ctx.scope, &did, Freshness::from(fresh))
                    .await?;
                println!("Address:          {}", resolution.value.address);
                println!("Transport verkey: {}", resolution.value.transport_verkey);
                if verbose {
                    println!("Source:           {}", source_label(resolution.source));
                }
                Ok(())
            }
        },
        Commands::Metadata { subcommand } => match subcommand {
            MetadataCommands::Set { did, value } => {
                ctx.wallet.set_metadata(&ctx.scope, &did, &value).await?;
                println!("Metadata of {did} updated");
                Ok(())
            }
            MetadataCommands::Get { did } => {
                match ctx.wallet.get_metadata(&ctx.scope, &did).await? {
                    Some(value) => println!("{value}"),
                    None => println!("(none)"),
                }
                Ok(())
            }
        },
        Commands::List => cmd_list(&ctx).await,
        Commands::Show { did } => cmd_show(&ctx, &did, verbose).await,
        Commands::Sign { did, message } => {
            let signature = ctx
                .wallet
                .sign(&ctx.scope, &did, message.as_bytes())
                .await?;
            println!(
                "{}",
                base64::engine::general_purpose::STANDARD.encode(signature)
            );
            Ok(())
        }
        Commands::Verify { .. } | Commands::Abbreviate { .. } => Ok(()),
    }
}

// ── Wallet session ────────────────────────────────────────────────────────────

struct Session {
    wallet: DidWallet,
    scope: Scope,
    registry: Option<(PathBuf, Arc<MemoryRegistry>)>,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let wallet_dir = match &cli.wallet_dir {
            Some(dir) => dir.clone(),
            None => default_wallet_dir()?,
        };

        let passphrase = read_passphrase(&format!(
            "Passphrase for wallet {}: ",
            wallet_dir.display()
        ))?;
        if passphrase.is_empty() {
            return Err(anyhow!("passphrase cannot be empty"));
        }
        let store = FileKeyStore::open(&wallet_dir, &passphrase)
            .with_context(|| format!("failed to open wallet {}", wallet_dir.display()))?;
        log::debug!("opened wallet {} (scope {})", wallet_dir.display(), cli.scope);

        let (registry, snapshot): (Arc<dyn Registry>, _) = match &cli.registry {
            Some(path) => {
                log::debug!("loading registry snapshot {}", path.display());
                let registry = Arc::new(MemoryRegistry::load(path).with_context(|| {
                    format!("failed to load registry snapshot {}", path.display())
                })?);
                (registry.clone(), Some((path.clone(), registry)))
            }
            None => (Arc::new(NoRegistry), None),
        };

        Ok(Self {
            wallet: DidWallet::new(Arc::new(store), registry),
            scope: Scope::new(cli.scope.as_str()),
            registry: snapshot,
        })
    }

    fn registry(&self) -> Result<(&Path, &MemoryRegistry)> {
        self.registry
            .as_ref()
            .map(|(path, registry)| (path.as_path(), registry.as_ref()))
            .ok_or_else(|| anyhow!("this command needs --registry <file>"))
    }
}

fn source_label(source: Source) -> &'static str {
    match source {
        Source::Local => "local",
        Source::Authoritative => "registry",
    }
}

// ── Command implementations ───────────────────────────────────────────────────

/// `didw create [--seed SEED] [--did DID] [--metadata TEXT]`
async fn cmd_create(
    ctx: &Session,
    seed: Option<String>,
    did: Option<String>,
    metadata: Option<&str>,
    verbose: bool,
) -> Result<()> {
    let request = IdentityRequest {
        did,
        seed,
        crypto_type: None,
    };
    let (did, verkey) = ctx
        .wallet
        .create_identity(&ctx.scope, &request)
        .await
        .context("failed to create identity")?;
    if let Some(metadata) = metadata {
        ctx.wallet.set_metadata(&ctx.scope, &did, metadata).await?;
    }

    println!("Created {did}");
    println!("  Verkey: {verkey}");
    if verbose {
        println!("  Abbreviated: {}", did::abbreviate_verkey(&did, &verkey)?);
        println!("  Scope: {}", ctx.scope);
    }
    Ok(())
}

/// `didw rotate-start DID [--seed SEED]`
async fn cmd_rotate_start(ctx: &Session, did: &str, seed: Option<String>) -> Result<()> {
    let request = RotationRequest {
        seed,
        crypto_type: None,
    };
    let temp_verkey = ctx
        .wallet
        .begin_rotation(&ctx.scope, did, &request)
        .await?;
    println!("Rotation started for {did}");
    println!("  Pending verkey: {temp_verkey}");
    println!("Publish the pending verkey, then run `didw rotate-apply {did}`.");
    Ok(())
}

/// `didw publish DID [--verkey VERKEY] [--endpoint ADDRESS]`
async fn cmd_publish(
    ctx: &Session,
    did: &str,
    verkey: Option<String>,
    endpoint: Option<String>,
) -> Result<()> {
    let (path, registry) = ctx.registry()?;

    let verkey = match verkey {
        Some(verkey) => verkey,
        None => {
            let identity = ctx.wallet.get_own_identity(&ctx.scope, did).await?;
            identity.temp_verkey.unwrap_or(identity.verkey)
        }
    };
    did::validate_verkey(&verkey)?;
    registry.publish_verkey(did, verkey.as_str()).await;

    if let Some(address) = endpoint {
        registry
            .publish_endpoint(
                did,
                Endpoint {
                    address,
                    transport_verkey: did::expand_verkey(did, Some(&verkey))?,
                },
            )
            .await;
    }

    registry
        .save(path)
        .await
        .with_context(|| format!("failed to write registry snapshot {}", path.display()))?;
    println!("Published {did} -> {verkey}");
    Ok(())
}

/// `didw key DID [--fresh]`
async fn cmd_key(ctx: &Session, did: &str, fresh: bool, verbose: bool) -> Result<()> {
    let resolution = ctx
        .wallet
        .resolve(&ctx.scope, did, Freshness::from(fresh))
        .await?;
    println!("{}", resolution.value);
    if verbose {
        println!("  Source:   {}", source_label(resolution.source));
        println!("  Observed: {}", micros_to_rfc3339(resolution.observed_at));
    }
    Ok(())
}

/// `didw list`
async fn cmd_list(ctx: &Session) -> Result<()> {
    let mut identities = ctx.wallet.list_own_identities(&ctx.scope).await?;
    if identities.is_empty() {
        println!("No DIDs in scope {}", ctx.scope);
        return Ok(());
    }
    identities.sort_by(|a, b| a.did.cmp(&b.did));

    println!("{:<24} {:<46} STATE", "DID", "VERKEY");
    println!("{}", "-".repeat(80));
    for identity in &identities {
        let state = if identity.temp_verkey.is_some() {
            "rotating"
        } else {
            "stable"
        };
        println!("{:<24} {:<46} {state}", identity.did, identity.verkey);
    }
    Ok(())
}

/// `didw show DID`
async fn cmd_show(ctx: &Session, did: &str, verbose: bool) -> Result<()> {
    let identity = ctx.wallet.get_own_identity(&ctx.scope, did).await?;

    println!("DID: {}", identity.did);
    println!("  Verkey:   {}", identity.verkey);
    match &identity.temp_verkey {
        Some(temp) => println!("  Pending:  {temp}"),
        None => println!("  Pending:  none"),
    }
    if let Some(metadata) = &identity.metadata {
        println!("  Metadata: {metadata}");
    }
    if verbose {
        let record = ctx.wallet.records().require_own(&ctx.scope, did).await?;
        println!("  Created:  {}", micros_to_rfc3339(record.created_at));
        println!("  Updated:  {}", micros_to_rfc3339(record.updated_at));
    }
    Ok(())
}

/// `didw verify VERKEY MESSAGE SIGNATURE`
fn cmd_verify(verkey: &str, message: &str, signature: &str) -> Result<()> {
    let signature = base64::engine::general_purpose::STANDARD
        .decode(signature)
        .context("signature is not valid base64")?;
    Ed25519Provider.verify(verkey, message.as_bytes(), &signature)?;
    println!("Signature: valid");
    Ok(())
}
