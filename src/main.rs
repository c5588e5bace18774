/*
 * ASN Blocklist Generator
 * Copyright (C) 2025 Akaere Networks
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use asn_blocklist::config::Cli;
use asn_blocklist::core::logger;
use asn_blocklist::core::stats::create_stats_state;
use asn_blocklist::{BlocklistServer, Pipeline};
use asn_blocklist::{log_init_failed, log_init_ok_with_details, log_init_start};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    logger::init_from_args(args.debug, args.trace, args.journald).context("Failed to initialize logger")?;

    let config = args.pipeline_config();
    log_init_start!("blocklist pipeline");
    let pipeline = Arc::new(Pipeline::from_config(&config));
    log_init_ok_with_details!(
        "blocklist pipeline",
        &format!(
            "registry {}:{}, cache {}",
            config.whois_server,
            config.whois_port,
            config.cache_dir.display()
        )
    );

    let addr = args.listen_addr();
    log_init_start!("HTTP server");
    let server = BlocklistServer::new(addr, pipeline, create_stats_state());
    if let Err(e) = server.run().await {
        log_init_failed!("HTTP server", &format!("{:#}", e));
        return Err(e);
    }

    Ok(())
}
