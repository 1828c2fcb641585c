use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Board, Deal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthBand {
    Healthy,
    AtRisk,
    Critical,
}

impl HealthBand {
    pub fn for_score(score: u8) -> Self {
        if score >= 70 {
            HealthBand::Healthy
        } else if score >= 40 {
            HealthBand::AtRisk
        } else {
            HealthBand::Critical
        }
    }
}

/// Header figures for one pipeline column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSummary {
    pub stage: String,
    pub deal_count: usize,
    pub total_value: f64,
    pub overdue: usize,
    /// `None` when the stage is empty or nobody has scored its deals yet.
    pub average_health: Option<u8>,
    pub health_band: Option<HealthBand>,
}

impl StageSummary {
    pub fn for_deals(stage: &str, deals: &[Deal], now: DateTime<Utc>) -> Self {
        let average_health =
            average_health(deals.iter().map(|d| d.health_score), deals.len()).filter(|&h| h > 0);
        Self {
            stage: stage.to_string(),
            deal_count: deals.len(),
            total_value: deals.iter().map(|d| d.value).sum(),
            overdue: deals.iter().filter(|d| d.is_overdue(now)).count(),
            average_health,
            health_band: average_health.map(HealthBand::for_score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub total_deals: usize,
    pub total_value: f64,
    pub won: usize,
    pub lost: usize,
    pub overdue: usize,
    pub average_health: Option<u8>,
    pub stages: Vec<StageSummary>,
}

impl PipelineSummary {
    pub fn from_board(board: &Board<Deal>, now: DateTime<Utc>) -> Self {
        let deals: Vec<&Deal> = board.iter().flat_map(|(_, deals)| deals).collect();
        Self {
            total_deals: deals.len(),
            total_value: deals.iter().map(|d| d.value).sum(),
            won: deals.iter().filter(|d| d.is_won()).count(),
            lost: deals.iter().filter(|d| d.is_lost()).count(),
            overdue: deals.iter().filter(|d| d.is_overdue(now)).count(),
            average_health: average_health(deals.iter().map(|d| d.health_score), deals.len()),
            stages: board
                .iter()
                .map(|(stage, deals)| StageSummary::for_deals(stage, deals, now))
                .collect(),
        }
    }
}

fn average_health(scores: impl Iterator<Item = u8>, count: usize) -> Option<u8> {
    if count == 0 {
        return None;
    }
    let total: u64 = scores.map(u64::from).sum();
    Some((total as f64 / count as f64).round() as u8)
}
