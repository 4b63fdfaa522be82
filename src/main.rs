use coming_soon::configuration::get_configuration;
use coming_soon::startup::Application;
use coming_soon::telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> Result<(), anyhow::Error> {
    // Setting up Logging
    let subscriber = get_subscriber("coming-soon".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration()?;
    let application = Application::build(configuration).await?;
    application.run_until_stopped().await?;
    Ok(())
}
