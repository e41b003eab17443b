use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use ebook_client::BackendFactory;
use ebook_client::ControllerHandle;
use ebook_client::EbookBackend;
use ebook_client::GenerationController;
use ebook_term::application::cli;
use ebook_term::application::cli::RunMode;
use ebook_term::application::headless;
use ebook_term::application::ui;
use ebook_term::domain::services::actions::ActionsService;
use ebook_term::infrastructure::logging;
use ebook_term::Action;
use ebook_term::AppStateProps;
use ebook_term::Config;
use ebook_term::ConfigKey;
use ebook_term::Event;
use tokio::sync::mpsc;
use tokio::task;

async fn run_interactive(
    handle: ControllerHandle,
    backend: Arc<dyn EbookBackend>,
    output_dir: PathBuf,
) -> Result<()> {
    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut background_futures = task::JoinSet::new();

    let actions_handle = handle.clone();
    let actions_backend = backend.clone();
    background_futures.spawn(async move {
        return ActionsService::start(
            actions_handle,
            actions_backend,
            output_dir,
            event_tx,
            &mut action_rx,
        )
        .await;
    });

    let app_state_props = AppStateProps {
        backend,
        server_url: Config::get(ConfigKey::ServerUrl),
    };

    let result = tokio::select!(
        Some(res) = background_futures.join_next() => res?,
        res = ui::start(app_state_props, handle.subscribe(), action_tx, event_rx) => res,
    );

    if result.is_err() {
        ui::destruct_terminal_for_panic();
    }

    return result;
}

#[tokio::main]
async fn main() -> Result<()> {
    let Some(mode) = cli::parse().await? else {
        return Ok(());
    };

    let _guard = logging::init(
        &Config::get(ConfigKey::LogFile),
        &Config::get(ConfigKey::LogLevel),
    )?;

    let backend: Arc<dyn EbookBackend> = Arc::from(BackendFactory::create_http_backend(
        &Config::get(ConfigKey::ServerUrl),
    )?);
    let output_dir = PathBuf::from(Config::get(ConfigKey::OutputDir));

    let (controller, handle) =
        GenerationController::new(backend.clone(), Config::controller_config()?)?;
    let controller_task = tokio::spawn(controller.run());

    let result = match mode {
        RunMode::Interactive => run_interactive(handle.clone(), backend, output_dir).await,
        RunMode::Headless(options) => {
            headless::run(handle.clone(), backend.as_ref(), &output_dir, options).await
        }
    };

    if handle.shutdown().is_ok() {
        controller_task.await??;
    }

    return result;
}
