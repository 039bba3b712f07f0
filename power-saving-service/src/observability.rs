use tracing_subscriber::{
    filter::{Directive, LevelFilter},
    EnvFilter,
};

pub fn init_tracing() {
    let directive = |target: &str| -> Directive {
        format!("{target}=info")
            .parse()
            .unwrap_or_else(|_| LevelFilter::INFO.into())
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(directive("power_saving_service"))
        .add_directive(directive("kepco_client"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
