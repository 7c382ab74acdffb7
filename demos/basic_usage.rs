// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic usage example for the stratacfg crate.
//!
//! This example demonstrates:
//! - Binding a configuration struct's fields to flags and environment variables
//! - Layering defaults, the environment, a `.env` file and command-line flags
//! - Reporting where each value came from
//!
//! To run this example:
//! ```bash
//! # Set some environment variables
//! export APP_NAME="MyApplication"
//! export DATABASE_PORT="5432"
//!
//! # Optionally override them in a .env file
//! echo 'DATABASE_PORT=6543' > .env
//!
//! # Run the example; flags win over everything
//! cargo run --example basic_usage -- --debug --timeout=12.5
//! ```

use stratacfg::prelude::*;

#[derive(Debug, Default)]
struct AppConfig {
    name: String,
    port: i64,
    debug: bool,
    timeout: f64,
    release_date: Timestamp,
}

impl Configurable for AppConfig {
    fn bind_fields(&mut self) -> Vec<FieldBinding<'_>> {
        vec![
            FieldBinding::new("name", &mut self.name)
                .flag("name")
                .env("APP_NAME")
                .default("demo")
                .description("Application name"),
            FieldBinding::new("port", &mut self.port)
                .flag("port")
                .env("DATABASE_PORT")
                .default("5432")
                .description("Database port"),
            FieldBinding::new("debug", &mut self.debug)
                .flag("debug")
                .env("ENABLE_DEBUG")
                .description("Enable debug output"),
            FieldBinding::new("timeout", &mut self.timeout)
                .flag("timeout")
                .env("API_TIMEOUT")
                .default("30.0")
                .description("API timeout in seconds"),
            FieldBinding::new("release_date", &mut self.release_date)
                .flag("release-date")
                .env("RELEASE_DATE")
                .default("2006-01-02")
                .description("Release date"),
        ]
    }
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== stratacfg: Basic Usage ===\n");

    let mut config = AppConfig::default();
    let fields = match stratacfg::load(&mut config) {
        Ok(fields) => fields,
        Err(ConfigError::FlagError(e)) => e.exit(),
        Err(e) => return Err(e),
    };

    println!("--- Resolved fields ---");
    for field in &fields {
        println!(
            "  {:<14} --{:<14} = {:<28} ({})",
            field.field,
            field.flag,
            field.value.to_string(),
            field.origin
        );
    }

    println!("\n--- Typed struct ---");
    println!("{:#?}", config);

    Ok(())
}
