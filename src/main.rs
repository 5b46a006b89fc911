use clap::Parser;
use crossflow_router::api;
use crossflow_router::config::RoutingConfig;
use crossflow_router::scoring::score_route;

mod cli;

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<RoutingConfig> {
    RoutingConfig::load(path.and_then(|p| p.to_str()))
}

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Serve { host, port, config } => {
            let config = load_config(config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(api::serve(&host, port, config))
        }
        cli::Command::Quote { amount_in, from_token, to_token, intermediates, config } => {
            let config = load_config(config.as_deref())?;
            let intermediates: Vec<String> = intermediates
                .map(|s| s.split(',').map(|t| t.trim().to_string()).collect())
                .unwrap_or_default();
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async move {
                let state = api::build_state(config).await;
                let (result, legs) = state
                    .router
                    .get_best_route_with_legs(amount_in, &from_token, &to_token, &intermediates, None)
                    .await;

                let Some(route) = result.route else {
                    println!("{}", serde_json::json!({ "route": null }));
                    return Ok(());
                };

                let settling = crossflow_router::router::settling_legs(&legs);
                let scored = score_route(&state.config, &from_token, &to_token, route.total_out, &settling);

                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "route": route,
                        "amountOut": route.total_out,
                        "netAmountOut": scored.net_output,
                        "scoringMeta": scored.scoring_meta,
                        "consideredQuotes": result.considered_quotes,
                    }))?
                );
                Ok(())
            })
        }
    }
}
