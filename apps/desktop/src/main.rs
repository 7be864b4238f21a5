use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings, FilterSelection, HttpPricingApi, MultiCurrencyQueryController,
    MultiCurrencyViewState, Phase, PricingApi, ProductQueryController, ProductViewState,
};
use shared::{
    domain::Role,
    protocol::{MultiCurrencyQuery, PageCursor, SortSpec},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides the configured pricing service base URL.
    #[arg(long)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the roles the pricing service knows about.
    Roles,
    /// Products grouped by building for a role, optionally filtered.
    Grouped {
        #[arg(long, default_value = "pricing_manager")]
        role: Role,
        /// `attribute=value[,value...]`, repeatable.
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// One page of the multi-currency price list.
    MultiCurrency {
        /// Sort clicks applied in order; repeating a column flips its direction.
        #[arg(long = "sort")]
        sorts: Vec<String>,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (attribute, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected attribute=values, got '{raw}'"))?;
    Ok((attribute.trim().to_string(), values.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.api_base_url {
        settings.api_base_url = url;
    }
    let api = Arc::new(HttpPricingApi::new(&settings).context("failed to build pricing client")?);
    info!(base_url = api.base_url(), "using pricing service");

    match args.command {
        Command::Roles => {
            let roles = api
                .available_roles()
                .await
                .context("failed to list roles")?;
            for option in roles {
                let description = option
                    .role
                    .parse::<Role>()
                    .map(|role| role.description())
                    .unwrap_or_default();
                println!("{:<18} {:<18} {description}", option.role, option.display_name);
            }
        }
        Command::Grouped { role, filters } => {
            let controller = ProductQueryController::new(api, role);
            controller.set_role(role).await;

            let mut selection = FilterSelection::new();
            for (attribute, values) in &filters {
                selection.set_input(attribute, values);
            }
            if !selection.is_empty() {
                controller.apply_filters(selection).await;
            }

            let state = controller.snapshot();
            ensure_ready(state.phase, state.error_message.as_deref())?;
            print_grouped(&state);
        }
        Command::MultiCurrency { sorts, page } => {
            let query = target_query(&sorts, page, settings.page_size);
            let controller = MultiCurrencyQueryController::with_query(api, query);
            controller.load().await;

            let state = controller.snapshot();
            ensure_ready(state.phase, state.error_message.as_deref())?;
            print_multi_currency(&state);
        }
    }

    Ok(())
}

/// Replays the sort clicks and page jump without fetching the pages in between.
fn target_query(sorts: &[String], page: u32, page_size: u32) -> MultiCurrencyQuery {
    MultiCurrencyQuery {
        sort: sorts
            .iter()
            .fold(SortSpec::default(), |sort, column| sort.toggled(column)),
        cursor: PageCursor {
            index: page,
            ..PageCursor::new(page_size)
        },
    }
}

fn ensure_ready(phase: Phase, error_message: Option<&str>) -> Result<()> {
    if phase == Phase::Failed {
        bail!(error_message.unwrap_or("request failed").to_string());
    }
    Ok(())
}

fn print_grouped(state: &ProductViewState) {
    println!("{}: {}", state.role.display_name(), state.role.description());
    println!("Available filters: {}", state.available_filters.join(", "));
    if let Some(applied) = &state.applied_filters {
        println!("Active filter values: {}", applied.active_count());
    }
    println!("Products by building ({} total)", state.total_products());

    for group in &state.products {
        println!();
        println!("{} ({} rooms)", group.building_name, group.room_count());
        for product in &group.products {
            let change = product
                .price_change_percent()
                .map(|pct| format!("{pct:+.1}%"))
                .unwrap_or_else(|| "n/a".to_string());
            let pool = if product.has_private_pool() { " pool" } else { "" };
            println!(
                "  {:<10} {:<20} {} ({} beds){pool}  {:.2} -> {:.2} {} [{change}]",
                product.product_id,
                product.room_name,
                product.room_type,
                product.beds,
                product.current_price,
                product.recommended_price,
                product.currency,
            );
        }
    }
}

fn print_multi_currency(state: &MultiCurrencyViewState) {
    let currencies = state.all_currencies();
    println!(
        "Showing {} products across {} currencies (sorted by {} {})",
        state.products.len(),
        currencies.len(),
        state.query.sort.column,
        state.query.sort.direction.as_str(),
    );

    let header: String = currencies.iter().map(|c| format!("{c:>10}")).collect();
    println!("{:<12} {:<20} {:<16}{header}", "Product", "Room", "Building");
    for product in &state.products {
        let cells: String = currencies
            .iter()
            .map(|currency| match product.prices.get(currency) {
                Some(price) => format!("{price:>10.0}"),
                None => format!("{:>10}", "-"),
            })
            .collect();
        println!(
            "{:<12} {:<20} {:<16}{cells}",
            product.product_id, product.room_name, product.building_name
        );
    }

    println!(
        "Page {}{}{}",
        state.page_number(),
        if state.has_previous_page() { " | previous available" } else { "" },
        if state.has_next_page() { " | next available" } else { "" },
    );
}
