use anyhow::Context;
use closet::{
    configuration::get_configuration,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber, install_panic_hook},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("closet".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);
    install_panic_hook();

    let config = get_configuration().context("Failed to read configuration")?;

    let app = Application::build(config).await?;
    if let Err(e) = app.run_until_stopped().await {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "API failed"
        );
        return Err(e.into());
    }

    tracing::info!("API has exited");
    Ok(())
}
