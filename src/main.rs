use std::{fs, process, sync::Arc, time::Duration};

use homeblog::{
    application::{
        auth::{CredentialEngine, admin_hash_env_line},
        error::AppError,
        render::{
            MarkdownRender, RenderPipelineConfig, configure_markdown_renderer, markdown_renderer,
        },
    },
    config,
    infra::{
        error::InfraError,
        http::{self, AppState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let causes = error.causes();
    if dispatcher::has_been_set() {
        error!(error = %error, causes = ?causes, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, causes = ?causes, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;
    configure_markdown_renderer(RenderPipelineConfig::from(&settings.render))
        .map_err(|err| InfraError::configuration(err.to_string()))?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::HashPassword(args) => run_hash_password(&settings, &args),
        config::Command::Render(args) => run_render(&args),
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let credentials = Arc::new(CredentialEngine::from_settings(&settings.auth));
    let renderer: Arc<dyn MarkdownRender> = markdown_renderer();
    let state = AppState::new(credentials, renderer).with_hash_tool(settings.auth.expose_hash_tool);

    if settings.auth.expose_hash_tool {
        warn!(
            target = "homeblog::serve",
            "password hashing helper is exposed on GET /api/auth/login"
        );
    }

    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| InfraError::bind(settings.server.addr, err))?;

    info!(
        target = "homeblog::serve",
        addr = %settings.server.addr,
        token_lifetime = %settings.auth.token_lifetime_label,
        sanitize_html = settings.render.sanitize_html,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(settings.server.graceful_shutdown))
        .await
        .map_err(InfraError::Serve)?;

    info!(target = "homeblog::serve", "server stopped");
    Ok(())
}

/// Resolve on ctrl-c, then arm a watchdog that forces exit once the grace
/// period elapses with connections still open.
async fn shutdown_signal(grace: Duration) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(target = "homeblog::serve", error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    info!(
        target = "homeblog::serve",
        grace_secs = grace.as_secs(),
        "shutdown requested; draining connections"
    );

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(target = "homeblog::serve", "graceful shutdown timed out");
        process::exit(1);
    });
}

fn run_hash_password(
    settings: &config::Settings,
    args: &config::HashPasswordArgs,
) -> Result<(), AppError> {
    if args.password.is_empty() {
        return Err(AppError::validation("password must not be empty"));
    }

    let credentials = CredentialEngine::from_settings(&settings.auth);
    let digest = credentials.hash_password(&args.password);

    println!("{digest}");
    println!("{}", admin_hash_env_line(&digest));
    Ok(())
}

fn run_render(args: &config::RenderArgs) -> Result<(), AppError> {
    let source =
        fs::read_to_string(&args.file).map_err(|err| InfraError::read_input(&args.file, err))?;
    let renderer = markdown_renderer();

    if args.parts {
        let parts = renderer.parse_markdown_parts(&source);
        let json = serde_json::to_string_pretty(&parts)
            .map_err(|err| AppError::unexpected(format!("failed to encode segments: {err}")))?;
        println!("{json}");
    } else {
        print!("{}", renderer.markdown_to_html(&source));
    }

    Ok(())
}
