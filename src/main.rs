use config_manager::DashboardConfig;
use dashboard_core::{
    derive_visible_list, format_change, format_compact_usd, format_price, sample::sample_tokens,
    ChangeDirection, ViewState,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let config = DashboardConfig::load()?;
    let view = ViewState::from_config(&config.tokens)?;
    let tokens = sample_tokens();
    let visible = derive_visible_list(&tokens, &view);
    info!("Rendering {} of {} sample tokens", visible.len(), tokens.len());

    println!(
        "Tokens by {} ({:?}), filter {:?}",
        view.sort_field, view.sort_order, view.category_filter
    );
    println!(
        "{:<14} {:<7} {:>10} {:>9} {:>11} {:>11}",
        "Name", "Symbol", "Price", "24h", "Market Cap", "Volume"
    );

    for token in &visible {
        let change = format_change(token.price_change_24h);
        let arrow = match change.direction {
            ChangeDirection::Up => "▲",
            ChangeDirection::Down => "▼",
        };
        println!(
            "{:<14} {:<7} {:>10} {:>9} {:>11} {:>11}{}",
            token.name,
            token.symbol,
            format_price(token.price),
            format!("{} {}", arrow, change.display),
            format_compact_usd(token.market_cap, 2),
            format_compact_usd(token.volume_24h, 2),
            if token.is_tracked { "  ★" } else { "" },
        );
    }

    let hidden = tokens.iter().filter(|t| t.is_hidden).count();
    if hidden > 0 && !view.show_hidden {
        println!("({} hidden)", hidden);
    }

    println!();
    println!("To serve the dashboard API, run:");
    println!("   cargo run -p api_server");

    Ok(())
}
