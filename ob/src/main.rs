//! Orderboard - restaurant kitchen and delivery boards
//!
//! CLI entry point for the delivery lifecycle and the kitchen board.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result, eyre};
use tracing::{debug, info};

use orderboard::board::{DeliveryDetails, address_without_complement, filter_orders, format_price, time_elapsed};
use orderboard::cli::{Cli, Command, KitchenCommand, OutputFormat, get_log_path};
use orderboard::config::Config;
use orderboard::domain::{DeliveryOrder, DeliveryStatus, KitchenStatus};
use orderboard::lifecycle::{DeliveryLifecycle, SessionSource, TransitionKind, TransitionOutcome};
use orderboard::{DeliveryBoard, HttpOrderService, KitchenBoard, KitchenManager, RecentDeliveriesCache};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Can't log here yet; the subscriber is not installed
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(base_url = %config.service.base_url, "orderboard loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Deliveries { format } => cmd_deliveries(&config, format).await,
        Command::Accept { id } => cmd_transition(&config, TransitionKind::Accept, &id).await,
        Command::Start { id } => cmd_transition(&config, TransitionKind::Start, &id).await,
        Command::Finish { id } => cmd_transition(&config, TransitionKind::Finish, &id).await,
        Command::Cancel { id } => cmd_transition(&config, TransitionKind::Cancel, &id).await,
        Command::Details { id, format } => cmd_details(&config, &id, format).await,
        Command::History { format } => cmd_history(&config, format),
        Command::Kitchen { command } => cmd_kitchen(&config, command).await,
    }
}

fn lifecycle(config: &Config) -> Result<DeliveryLifecycle> {
    let service = HttpOrderService::from_config(&config.service).context("Failed to build order service client")?;
    let cache = RecentDeliveriesCache::open(&config.storage.cache_path);
    Ok(DeliveryLifecycle::new(Arc::new(service), cache).with_unknown_status(config.board.unknown_status))
}

async fn cmd_deliveries(config: &Config, format: OutputFormat) -> Result<()> {
    debug!(%format, "cmd_deliveries: called");
    let mut lifecycle = lifecycle(config)?;
    let mut board = DeliveryBoard::new();
    let source = lifecycle.start_session(&mut board).await;
    info!(?source, "delivery session started");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&board)?),
        OutputFormat::Text => {
            print_delivery_board(&board);
            match source {
                SessionSource::Combined => {}
                SessionSource::ReadyFallback => {
                    eprintln!("{}", "Order service partially unavailable: showing READY orders only".yellow())
                }
                SessionSource::Empty => {
                    eprintln!("{}", "Order service unavailable: board is empty".red())
                }
            }
        }
    }
    Ok(())
}

async fn cmd_transition(config: &Config, kind: TransitionKind, id: &str) -> Result<()> {
    debug!(%kind, %id, "cmd_transition: called");
    let mut lifecycle = lifecycle(config)?;
    let mut board = DeliveryBoard::new();
    lifecycle.start_session(&mut board).await;

    match lifecycle.run(&mut board, kind, id).await {
        TransitionOutcome::Applied { order } => {
            println!(
                "{} {} {}",
                "✓".green(),
                order.display_number.bold(),
                format!("→ {}", order.status).cyan()
            );
            Ok(())
        }
        TransitionOutcome::Rejected { notice } => Err(eyre!(notice)),
        TransitionOutcome::Dismissed => {
            println!("{}", format!("Order {} unchanged", id).dimmed());
            Ok(())
        }
        TransitionOutcome::Skipped => Err(eyre!(
            "Order {} is not {} (cannot {})",
            id,
            kind.definition().from,
            kind
        )),
    }
}

async fn cmd_details(config: &Config, id: &str, format: OutputFormat) -> Result<()> {
    debug!(%id, %format, "cmd_details: called");
    let mut lifecycle = lifecycle(config)?;
    let mut board = DeliveryBoard::new();
    lifecycle.start_session(&mut board).await;

    if !board.view_details(id) {
        return Err(eyre!("Order {} is not on the board", id));
    }
    let details = board
        .selected_details()
        .ok_or_else(|| eyre!("Order {} is not on the board", id))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&details)?),
        OutputFormat::Text => print_delivery_details(&details),
    }
    Ok(())
}

fn print_delivery_details(details: &DeliveryDetails) {
    println!("{} {}", "Pedido".bold(), details.display_number.bold());
    println!("{}", "Itens do pedido".bold());
    for item in &details.items {
        println!("  {} × {} R$ {}", item.quantity, item.name, format_price(item.price));
    }
    println!("{} {}", "Cliente:".bold(), details.client);
    println!("{} {}", "Endereço:".bold(), details.address.as_deref().unwrap_or("-"));
    println!("{} R$ {}", "Total:".bold(), format_price(details.total));
}

fn cmd_history(config: &Config, format: OutputFormat) -> Result<()> {
    debug!(%format, "cmd_history: called");
    let orders = RecentDeliveriesCache::open(&config.storage.cache_path).load();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&orders)?),
        OutputFormat::Text => {
            if orders.is_empty() {
                println!("{}", "No recent deliveries".dimmed());
            }
            for order in &orders {
                print_delivery_order(order);
            }
        }
    }
    Ok(())
}

fn print_delivery_board(board: &DeliveryBoard) {
    for (status, title) in [
        (DeliveryStatus::Ready, "Disponíveis"),
        (DeliveryStatus::OnTheWay, "Em rota"),
        (DeliveryStatus::Delivered, "Entregas recentes"),
    ] {
        let bucket = board.bucket(status);
        println!("{} ({})", title.bold(), bucket.len());
        for order in bucket {
            print_delivery_order(order);
        }
        println!();
    }
}

fn print_delivery_order(order: &DeliveryOrder) {
    let address = address_without_complement(&order.address).unwrap_or_else(|| "-".to_string());
    println!(
        "  {} [{}] {} R$ {}",
        order.display_number.bold(),
        order.id.dimmed(),
        address,
        format_price(order.items_total())
    );
}

fn kitchen_file(config: &Config) -> PathBuf {
    config.board.kitchen_file.clone()
}

fn load_kitchen(config: &Config) -> Result<KitchenBoard> {
    let path = kitchen_file(config);
    if !path.exists() {
        return Err(eyre!(
            "No kitchen board at {} (run `ob kitchen init` first)",
            path.display()
        ));
    }
    KitchenBoard::load(&path).context(format!("Failed to load kitchen board from {}", path.display()))
}

async fn cmd_kitchen(config: &Config, command: KitchenCommand) -> Result<()> {
    debug!(?command, "cmd_kitchen: called");
    let path = kitchen_file(config);

    if let KitchenCommand::Init { force } = command {
        if path.exists() && !force {
            return Err(eyre!("Kitchen board already exists at {} (use --force)", path.display()));
        }
        KitchenBoard::sample(Utc::now())
            .save(&path)
            .context(format!("Failed to write kitchen board to {}", path.display()))?;
        println!("{} {}", "Created kitchen board".green(), path.display());
        return Ok(());
    }

    let manager = KitchenManager::spawn(load_kitchen(config)?, config.board.highlight());

    match command {
        KitchenCommand::Init { .. } => {}
        KitchenCommand::Show { query } => {
            let board = manager.snapshot().await?;
            print_kitchen_board(&board, query.as_deref().unwrap_or(""));
        }
        KitchenCommand::Move { id, list_id, index } => {
            let board = manager.snapshot().await?;
            let (source, _) = board.find(&id).ok_or_else(|| eyre!("Order {} is not on the board", id))?;
            let from = board
                .bucket(source)
                .position(&id)
                .ok_or_else(|| eyre!("Order {} is not on the board", id))?;
            match manager.transfer(source, from, index.unwrap_or(usize::MAX), &list_id).await? {
                Some(outcome) => println!("{} {} → {}", "✓".green(), id.bold(), outcome.to.label().cyan()),
                None => return Err(eyre!("Unknown list id: {}", list_id)),
            }
        }
        KitchenCommand::Reorder { list_id, from, to } => {
            let status = KitchenStatus::from_list_id(&list_id).ok_or_else(|| eyre!("Unknown list id: {}", list_id))?;
            manager.move_within(status, from, to).await?;
            println!("{} {} {} → {}", "✓".green(), status.label().bold(), from, to);
        }
        KitchenCommand::Advance { id } => match manager.advance(&id).await? {
            Some(outcome) => println!("{} {} → {}", "✓".green(), id.bold(), outcome.to.label().cyan()),
            None => println!("{}", format!("Order {} unchanged", id).dimmed()),
        },
    }

    let board = manager.shutdown().await?;
    board
        .save(&path)
        .context(format!("Failed to save kitchen board to {}", path.display()))?;
    Ok(())
}

fn print_kitchen_board(board: &KitchenBoard, query: &str) {
    let now = Utc::now();
    for status in KitchenStatus::ALL {
        let orders = filter_orders(board.bucket(status).orders(), query);
        println!("{} ({})", status.label().bold(), orders.len());
        for order in orders {
            let elapsed = order
                .timestamp
                .map(|ts| time_elapsed(ts, now))
                .unwrap_or_default();
            let table = order.table.as_deref().map(|t| format!("Mesa {} ", t)).unwrap_or_default();
            println!(
                "  #{} [{}] {}{}",
                order.display_number.bold(),
                order.id.dimmed(),
                table,
                elapsed.dimmed()
            );
            for item in &order.items {
                println!("      {}x {}", item.quantity, item.name);
            }
        }
        println!();
    }
}
