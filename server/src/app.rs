//! Core application

use anyhow::{Result, bail};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, DEFAULT_LOG_FILTER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::filters::{Page, TableName, compile, parse_filters};
use crate::data::sql::DuckdbDialect;
use crate::utils::file::read_json_arg;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();

        let (cli_config, command) = cli::parse();
        Self::init_logging(cli_config.debug);

        tracing::debug!("Application starting");
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Compile {
                table,
                filters,
                page,
                per_page,
            }) => {
                let config = AppConfig::load(&cli_config)?;
                Self::handle_compile_command(&config, &table, filters.as_deref(), page, per_page)
            }
            Some(Commands::Start) | None => {
                let app = Self::init(&cli_config)?;
                Self::start_server(app).await
            }
        }
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
        })
    }

    /// Compile filters offline and print the query as JSON
    fn handle_compile_command(
        config: &AppConfig,
        table: &str,
        filters: Option<&str>,
        page: Option<u64>,
        per_page: Option<u64>,
    ) -> Result<()> {
        let json = match filters {
            Some(arg) => read_json_arg(arg)?,
            None => String::new(),
        };

        let table = TableName::parse(table)?;
        let rules = parse_filters(&json, &config.query.filter_limits())?;
        let mut spec = compile(&table, &rules);

        if page.is_some() || per_page.is_some() {
            let per_page = per_page.unwrap_or(config.query.default_per_page);
            if per_page > config.query.max_per_page {
                bail!("--per-page must be at most {}", config.query.max_per_page);
            }
            let page = Page::new(page.unwrap_or(1), per_page)?;
            spec.paginate(&DuckdbDialect, page);
        }

        println!("{}", serde_json::to_string_pretty(&spec)?);
        Ok(())
    }

    fn init_logging(debug: bool) {
        let default_filter = if debug {
            format!("debug,{}=debug", APP_NAME_LOWER)
        } else {
            DEFAULT_LOG_FILTER.to_string()
        };

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Signal handlers go in before the listener binds
        app.shutdown.install_signal_handlers();

        banner::print_banner(&app.config.server.host, app.config.server.port);

        let server = ApiServer::new(&app.config, app.shutdown.clone());
        let shutdown = app.shutdown.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = server.start().await {
                tracing::error!(error = %e, "API server error");
                shutdown.trigger();
            }
        });
        app.shutdown.register(handle).await;

        app.shutdown.wait().await;
        app.shutdown.shutdown().await;

        Ok(())
    }
}
