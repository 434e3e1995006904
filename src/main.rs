use clap::Parser;
use rankings_engine::config::{self, Args};
use rankings_engine::controller::JobController;
use rankings_engine::domain::CalculationStatus;
use rankings_engine::store::{PostgresRankingsStore, RankingsStore};
use rankings_engine::utils::progress::rebuild_progress_bar;
use std::time::Duration;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// CLI entry point for operator-triggered rebuilds. This stands in for the
/// hosted admin dashboard's RPC surface (`rankings_engine::api`): it calls
/// the job controller directly rather than through the authentication and
/// administrator-capability gate, since invoking this binary is itself the
/// privileged action.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_dotenv();
    let args = Args::parse();
    init_tracing(&args.log_level);

    let store = PostgresRankingsStore::connect(
        &args.connection_string,
        rankings_engine::constants::WRITE_BATCH_SIZE,
    )
    .await?;

    let parameters = args.rebuild_parameters();
    let controller = JobController::new(&store);

    if args.progress_bar {
        run_with_progress_bar(&store, &controller, args.triggered_by.clone(), parameters).await?;
    } else {
        let final_state = controller
            .start_full_rebuild(args.triggered_by.clone(), parameters)
            .await?;
        report(&final_state);
    }

    Ok(())
}

async fn run_with_progress_bar(
    store: &dyn RankingsStore,
    controller: &JobController<'_>,
    triggered_by: String,
    parameters: rankings_engine::domain::RebuildParameters,
) -> Result<(), Box<dyn std::error::Error>> {
    let bar = rebuild_progress_bar();
    let rebuild = controller.start_full_rebuild(triggered_by, parameters);
    tokio::pin!(rebuild);

    loop {
        tokio::select! {
            result = &mut rebuild => {
                bar.finish_with_message("done");
                let final_state = result?;
                report(&final_state);
                return Ok(());
            }
            _ = tokio::time::sleep(Duration::from_millis(500)) => {
                if let Ok(Some(latest)) = store.latest_calculation_state().await {
                    bar.set_position(latest.progress.percent_complete as u64);
                    bar.set_message(latest.progress.current_step.clone());
                }
            }
        }
    }
}

fn report(state: &rankings_engine::domain::CalculationState) {
    match state.status {
        CalculationStatus::Completed => {
            tracing::info!(calculation_id = %state.id, "rebuild completed successfully");
        }
        _ => {
            tracing::warn!(calculation_id = %state.id, status = %state.status, "rebuild did not complete");
        }
    }
    for warning in &state.warnings {
        tracing::warn!("{warning}");
    }
}

fn init_tracing(log_level: &str) {
    let indicatif_layer = IndicatifLayer::new();
    let env_filter = tracing_subscriber::EnvFilter::try_new(log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .init();
}
