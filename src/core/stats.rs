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

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::pipeline::Provenance;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub requests: u64,
    pub bytes_served: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TotalStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub generated: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub total_bytes_served: u64,
    pub daily_stats: BTreeMap<String, DailyStats>, // Date in YYYY-MM-DD format
}

pub type StatsState = Arc<RwLock<TotalStats>>;

const DAILY_RETENTION_DAYS: i64 = 31;

pub fn create_stats_state() -> StatsState {
    Arc::new(RwLock::new(TotalStats::default()))
}

fn prune_old_days(stats: &mut TotalStats) {
    let cutoff = (Utc::now() - ChronoDuration::days(DAILY_RETENTION_DAYS))
        .format("%Y-%m-%d")
        .to_string();
    stats.daily_stats.retain(|date, _| date.as_str() >= cutoff.as_str());
}

/// Count a served blocklist.
pub async fn record_success(stats: &StatsState, provenance: Provenance, response_size: usize) {
    let mut stats_guard = stats.write().await;
    let today = Utc::now().format("%Y-%m-%d").to_string();

    stats_guard.total_requests += 1;
    stats_guard.total_bytes_served += response_size as u64;
    match provenance {
        Provenance::Cache => stats_guard.cache_hits += 1,
        Provenance::Registry => stats_guard.generated += 1,
    }

    let daily = stats_guard.daily_stats.entry(today).or_default();
    daily.requests += 1;
    daily.bytes_served += response_size as u64;

    prune_old_days(&mut stats_guard);
}

/// Count a failed request.
pub async fn record_failure(stats: &StatsState, client_error: bool) {
    let mut stats_guard = stats.write().await;
    stats_guard.total_requests += 1;
    if client_error {
        stats_guard.client_errors += 1;
    } else {
        stats_guard.server_errors += 1;
    }
}

pub async fn get_stats_response(stats: &StatsState) -> TotalStats {
    stats.read().await.clone()
}
