use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use dialoguer::Confirm;
use playstore_adapters::network::build_api_client;
use playstore_adapters::{configuration, telemetry, ClientOptions, PlayStoreClient};
use playstore_core::config::Settings;
use playstore_core::entities::{VoidedPurchaseType, VoidedPurchasesQuery};
use playstore_core::CallContext;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Parser)]
#[command(author, version, about = "Verify Google Play purchases", long_about = None)]
struct Cli {
    /// Service account JSON key (overrides credentials.key_path)
    #[arg(short, long, global = true)]
    key: Option<PathBuf>,

    /// Application package name (overrides api.package_name)
    #[arg(short, long, global = true)]
    package: Option<String>,

    /// Give up on the call after this many seconds
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ProductArgs {
    /// In-app product SKU
    product_id: String,
    /// Purchase token from the device
    token: String,
}

#[derive(Args)]
struct SubscriptionArgs {
    /// Subscription SKU
    subscription_id: String,
    /// Purchase token from the device
    token: String,
}

#[derive(Subcommand)]
enum Commands {
    // --- In-app products ---
    /// Show the purchase state of an in-app product
    VerifyProduct(ProductArgs),

    /// Acknowledge an in-app product purchase
    AcknowledgeProduct {
        #[command(flatten)]
        target: ProductArgs,

        /// Developer payload to attach
        #[arg(long)]
        payload: Option<String>,
    },

    /// Consume an in-app product purchase
    ConsumeProduct(ProductArgs),

    // --- Subscriptions ---
    /// Show a subscription purchase (v1 API)
    VerifySubscription(SubscriptionArgs),

    /// Show a subscription purchase (v2 API)
    VerifySubscriptionV2 {
        /// Purchase token from the device
        token: String,
    },

    /// Acknowledge a subscription purchase
    AcknowledgeSubscription {
        #[command(flatten)]
        target: SubscriptionArgs,

        /// Developer payload to attach
        #[arg(long)]
        payload: Option<String>,
    },

    /// Cancel a subscription; it stays valid until it expires
    CancelSubscription(SubscriptionArgs),

    /// Refund a subscription; it stays valid until it expires
    RefundSubscription {
        #[command(flatten)]
        target: SubscriptionArgs,

        /// Skip confirmation prompt
        #[arg(short, long, default_value = "false")]
        yes: bool,
    },

    /// Refund and immediately revoke a subscription
    RevokeSubscription {
        #[command(flatten)]
        target: SubscriptionArgs,

        /// Skip confirmation prompt
        #[arg(short, long, default_value = "false")]
        yes: bool,
    },

    // --- Voided purchases ---
    /// List purchases that were cancelled, refunded or charged back
    VoidedPurchases {
        /// Earliest voided time, in milliseconds since the epoch
        #[arg(long)]
        start_time: Option<i64>,

        /// Latest voided time, in milliseconds since the epoch
        #[arg(long)]
        end_time: Option<i64>,

        /// Page size
        #[arg(long)]
        max_results: Option<u32>,

        /// Continuation token from a previous page
        #[arg(long)]
        page_token: Option<String>,

        /// Include voided subscriptions as well as products
        #[arg(long, default_value = "false")]
        include_subscriptions: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn confirm(yes: bool, prompt: String) -> anyhow::Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

async fn build_client(cli: &Cli, settings: &Settings) -> anyhow::Result<PlayStoreClient> {
    let key_path = cli
        .key
        .clone()
        .or_else(|| settings.credentials.key_path.clone())
        .ok_or_else(|| {
            anyhow!("no service account key: pass --key or set PLAYSTORE__CREDENTIALS__KEY_PATH")
        })?;

    let http_client = build_api_client(&settings.http)?;
    let options = ClientOptions::new()
        .with_http_client(http_client)
        .with_base_url(settings.api.base_url.clone());

    PlayStoreClient::from_json_file(&key_path, options)
        .await
        .with_context(|| format!("failed to authorize with {}", key_path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = match configuration::get_configuration() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to load configuration: {}", e);
            return Err(anyhow!("configuration loading failed"));
        }
    };

    let _guard = telemetry::init_subscriber("playstore_cli", &settings.log_level);

    let cli = Cli::parse();

    let package = cli
        .package
        .clone()
        .or_else(|| settings.api.package_name.clone())
        .ok_or_else(|| {
            anyhow!("no package name: pass --package or set PLAYSTORE__API__PACKAGE_NAME")
        })?;

    let client = build_client(&cli, &settings).await?;

    let mut ctx = CallContext::background();
    if let Some(secs) = cli.timeout {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    // Ctrl-C cancels whatever call is in flight
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling request");
            interrupt.cancel();
        }
    });

    let result = run(&cli.command, &client, &ctx, &package).await;
    if let Err(ref e) = result {
        error!(error = %e, "command failed");
    }
    result
}

async fn run(
    command: &Commands,
    client: &PlayStoreClient,
    ctx: &CallContext,
    package: &str,
) -> anyhow::Result<()> {
    match command {
        Commands::VerifyProduct(args) => {
            let purchase = client
                .verify_product(ctx, package, &args.product_id, &args.token)
                .await?;
            print_json(&purchase)?;
        }

        Commands::AcknowledgeProduct { target, payload } => {
            client
                .acknowledge_product(
                    ctx,
                    package,
                    &target.product_id,
                    &target.token,
                    payload.as_deref(),
                )
                .await?;
            println!("Acknowledged {}.", target.product_id);
        }

        Commands::ConsumeProduct(args) => {
            client
                .consume_product(ctx, package, &args.product_id, &args.token)
                .await?;
            println!("Consumed {}.", args.product_id);
        }

        Commands::VerifySubscription(args) => {
            let sub = client
                .verify_subscription(ctx, package, &args.subscription_id, &args.token)
                .await?;
            print_json(&sub)?;
        }

        Commands::VerifySubscriptionV2 { token } => {
            let sub = client.verify_subscription_v2(ctx, package, token).await?;
            print_json(&sub)?;
        }

        Commands::AcknowledgeSubscription { target, payload } => {
            client
                .acknowledge_subscription(
                    ctx,
                    package,
                    &target.subscription_id,
                    &target.token,
                    payload.as_deref(),
                )
                .await?;
            println!("Acknowledged {}.", target.subscription_id);
        }

        Commands::CancelSubscription(args) => {
            client
                .cancel_subscription(ctx, package, &args.subscription_id, &args.token)
                .await?;
            println!("Cancelled {}.", args.subscription_id);
        }

        Commands::RefundSubscription { target, yes } => {
            if !confirm(
                *yes,
                format!("Refund subscription '{}'?", target.subscription_id),
            )? {
                println!("Aborted.");
                return Ok(());
            }
            client
                .refund_subscription(ctx, package, &target.subscription_id, &target.token)
                .await?;
            println!("Refunded {}.", target.subscription_id);
        }

        Commands::RevokeSubscription { target, yes } => {
            if !confirm(
                *yes,
                format!(
                    "Refund and revoke subscription '{}'? Access ends immediately.",
                    target.subscription_id
                ),
            )? {
                println!("Aborted.");
                return Ok(());
            }
            client
                .revoke_subscription(ctx, package, &target.subscription_id, &target.token)
                .await?;
            println!("Revoked {}.", target.subscription_id);
        }

        Commands::VoidedPurchases {
            start_time,
            end_time,
            max_results,
            page_token,
            include_subscriptions,
        } => {
            let mut query = VoidedPurchasesQuery::new();
            query.start_time = *start_time;
            query.end_time = *end_time;
            query.max_results = *max_results;
            query.page_token = page_token.clone();
            if *include_subscriptions {
                query = query.purchase_type(VoidedPurchaseType::All);
            }

            let page = client.list_voided_purchases(ctx, package, &query).await?;
            print_json(&page)?;
            if let Some(next) = page.next_page_token() {
                eprintln!("More results: --page-token {}", next);
            }
        }
    }

    Ok(())
}
