use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use hurai::captioner::HuggingFaceCaptioner;
use hurai::observability::init_tracing;
use hurai::translator::MesoliticaTranslator;
use hurai::{create_router, AltTextService, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("loading settings")?;

    init_tracing(&settings).context("installing tracing subscriber")?;

    if settings.caption.fallback_api_key.is_none() {
        tracing::warn!("HUGGINGFACE_INF_KEY not set; clients must supply their own key");
    }

    let client = reqwest::Client::builder()
        .timeout(settings.upstream_timeout)
        .build()
        .context("building http client")?;

    let captioner = Arc::new(HuggingFaceCaptioner::new(
        client.clone(),
        settings.caption.api_url.clone(),
    ));
    let translator = Arc::new(MesoliticaTranslator::new(
        client,
        settings.translation.api_url.clone(),
        settings.translation.target_lang.clone(),
        settings.translation.model.clone(),
    ));

    let service = Arc::new(AltTextService::new(
        captioner,
        translator,
        settings.translation.target_lang.clone(),
    ));

    let state = AppState {
        service,
        upload: settings.upload.clone(),
        fallback_api_key: settings.caption.fallback_api_key.clone(),
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("parsing listen address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
