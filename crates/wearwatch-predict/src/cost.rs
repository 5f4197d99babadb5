use crate::catalog;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use wearwatch_common::types::{
    round_to, Alert, AlertLevel, Component, ComponentStatus, CostBreakdown, CostRange, CostSummary,
    MaintenanceItem, MaintenanceSchedule, Prediction, RepairCost, RiskLevel, SeverityTier,
    WearSnapshot, CURRENCY,
};

pub const DEFAULT_LABOR_RATE: f64 = 45.0;
const PRICE_SPREAD: f64 = 0.2;
/// Health assumed for a prediction whose component health is unknown.
const DEFAULT_PREDICTION_HEALTH: f64 = 70.0;
/// Wear-state components in good shape are skipped unless maintenance is this close.
const MAINTENANCE_SOON_HOURS: f64 = 50.0;

/// Message keyword to catalog problem type, checked in order.
const ALERT_KEYWORDS: &[(&str, &str)] = &[
    ("overheating", "overheating"),
    ("rpm", "excessive_wear"),
    ("vibration", "wear_degradation"),
    ("pressure", "pressure_loss"),
    ("temperature", "heat_degradation"),
];

const SCHEDULED_ITEMS: &[(&str, Component, &str)] = &[
    ("Oil and filter change", Component::Engine, "oil_change"),
    ("Brake inspection", Component::Brakes, "wear_degradation"),
    ("Transmission fluid change", Component::Transmission, "gear_stress"),
    ("Tire rotation and balancing", Component::Tires, "high_speed_wear"),
    ("Battery check", Component::Battery, "heat_degradation"),
];

fn default_alert_problem(component: Component) -> &'static str {
    match component {
        Component::Engine => "excessive_wear",
        Component::Brakes => "wear_degradation",
        Component::Transmission => "gear_stress",
        Component::Tires => "pressure_loss",
        Component::Battery => "heat_degradation",
    }
}

fn default_wear_problem(component: Component) -> &'static str {
    match component {
        Component::Tires => "high_speed_wear",
        other => default_alert_problem(other),
    }
}

/// Severity tier from a prediction risk and/or a component health score.
pub fn tier_for(risk: Option<RiskLevel>, health: f64) -> SeverityTier {
    if risk == Some(RiskLevel::Critical) || health < 20.0 {
        SeverityTier::Critical
    } else if risk == Some(RiskLevel::High) || health < 40.0 {
        SeverityTier::Major
    } else if risk == Some(RiskLevel::Moderate) || health < 70.0 {
        SeverityTier::Minor
    } else {
        SeverityTier::Preventive
    }
}

/// Minimum tier implied by a component's wear status.
pub fn tier_for_status(status: ComponentStatus) -> SeverityTier {
    match status {
        ComponentStatus::Good => SeverityTier::Preventive,
        ComponentStatus::Warning => SeverityTier::Minor,
        ComponentStatus::Critical => SeverityTier::Major,
        ComponentStatus::Failure => SeverityTier::Critical,
    }
}

pub fn tier_for_alert(level: AlertLevel) -> SeverityTier {
    match level {
        AlertLevel::Info => SeverityTier::Preventive,
        AlertLevel::Warning => SeverityTier::Minor,
        AlertLevel::Critical => SeverityTier::Major,
        AlertLevel::Emergency => SeverityTier::Critical,
    }
}

/// Maps predictions, alerts or wear state onto the repair catalog.
#[derive(Debug, Clone)]
pub struct CostEstimator {
    labor_rate: f64,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_LABOR_RATE)
    }
}

impl CostEstimator {
    pub fn new(labor_rate: f64) -> Self {
        Self { labor_rate }
    }

    pub fn labor_rate(&self) -> f64 {
        self.labor_rate
    }

    fn entry_cost(&self, entry: &catalog::CatalogEntry) -> f64 {
        entry.parts_cost + entry.labor_hours * self.labor_rate
    }

    /// Cost of one repair. Missing tiers fall back towards `Preventive`;
    /// `None` only when the catalog has no entry for the problem at all.
    pub fn repair_cost(
        &self,
        component: Component,
        problem_type: &str,
        tier: SeverityTier,
    ) -> Option<RepairCost> {
        let (resolved, entry) = catalog::resolve(component, problem_type, tier)?;
        let labor = entry.labor_hours * self.labor_rate;
        let average = entry.parts_cost + labor;

        let savings = match catalog::lookup(component, problem_type, SeverityTier::Preventive) {
            Some(preventive) if resolved != SeverityTier::Preventive => {
                average - self.entry_cost(preventive)
            }
            _ => 0.0,
        };

        Some(RepairCost {
            component,
            problem_type: problem_type.to_string(),
            description: entry.description.to_string(),
            tier: resolved,
            cost_range: CostRange {
                min: round_to(average * (1.0 - PRICE_SPREAD), 2),
                max: round_to(average * (1.0 + PRICE_SPREAD), 2),
                average: round_to(average, 2),
            },
            breakdown: CostBreakdown {
                parts: entry.parts_cost,
                labor: round_to(labor, 2),
                labor_hours: entry.labor_hours,
            },
            urgency: tier.urgency(),
            savings_if_preventive: round_to(savings, 2),
            currency: CURRENCY.to_string(),
        })
    }

    /// One repair per distinct `(component, problem_type)`; the first occurrence wins.
    pub fn estimate_from_predictions(
        &self,
        predictions: &[Prediction],
        health: &BTreeMap<Component, f64>,
        now: DateTime<Utc>,
    ) -> CostSummary {
        let mut seen = HashSet::new();
        let mut repairs = Vec::new();
        for p in predictions {
            if !seen.insert((p.component, p.problem_type.clone())) {
                continue;
            }
            let h = health
                .get(&p.component)
                .copied()
                .unwrap_or(DEFAULT_PREDICTION_HEALTH);
            if let Some(cost) = self.repair_cost(p.component, &p.problem_type, tier_for(Some(p.risk_level), h)) {
                repairs.push(cost);
            }
        }
        summarize(repairs, now)
    }

    /// Alerts on components outside the catalog (e.g. fuel) are ignored.
    pub fn estimate_from_alerts(&self, alerts: &[Alert], now: DateTime<Utc>) -> CostSummary {
        let mut seen = HashSet::new();
        let mut repairs = Vec::new();
        for alert in alerts {
            let Ok(component) = alert.component.parse::<Component>() else {
                continue;
            };
            let message = alert.message.to_lowercase();
            let problem = ALERT_KEYWORDS
                .iter()
                .find(|(keyword, problem)| {
                    message.contains(keyword) && catalog::knows_problem(component, problem)
                })
                .map(|(_, problem)| *problem)
                .unwrap_or_else(|| default_alert_problem(component));

            if !seen.insert((component, problem)) {
                continue;
            }
            if let Some(cost) = self.repair_cost(component, problem, tier_for_alert(alert.level)) {
                repairs.push(cost);
            }
        }
        summarize(repairs, now)
    }

    pub fn estimate_from_wear_state(&self, wear: &WearSnapshot, now: DateTime<Utc>) -> CostSummary {
        let mut repairs = Vec::new();
        for (&component, view) in &wear.components {
            if view.status == ComponentStatus::Good && view.hours_until_maintenance > MAINTENANCE_SOON_HOURS {
                continue;
            }
            let tier = tier_for(None, view.health_score).max(tier_for_status(view.status));
            if let Some(cost) = self.repair_cost(component, default_wear_problem(component), tier) {
                repairs.push(cost);
            }
        }
        summarize(repairs, now)
    }

    pub fn maintenance_schedule(&self) -> MaintenanceSchedule {
        let items: Vec<MaintenanceItem> = SCHEDULED_ITEMS
            .iter()
            .filter_map(|(item, component, problem)| {
                let cost = self.repair_cost(*component, problem, SeverityTier::Preventive)?;
                Some(MaintenanceItem {
                    item: item.to_string(),
                    component: *component,
                    cost: cost.cost_range.average,
                })
            })
            .collect();
        let total: f64 = items.iter().map(|i| i.cost).sum();
        MaintenanceSchedule {
            maintenance_items: items,
            total_preventive_cost: round_to(total, 2),
            currency: CURRENCY.to_string(),
        }
    }
}

fn summarize(repairs: Vec<RepairCost>, now: DateTime<Utc>) -> CostSummary {
    let (min, max, average, savings) = repairs.iter().fold((0.0, 0.0, 0.0, 0.0), |acc, r| {
        (
            acc.0 + r.cost_range.min,
            acc.1 + r.cost_range.max,
            acc.2 + r.cost_range.average,
            acc.3 + r.savings_if_preventive,
        )
    });
    CostSummary {
        total_estimated: CostRange {
            min: round_to(min, 2),
            max: round_to(max, 2),
            average: round_to(average, 2),
        },
        potential_savings_if_preventive: round_to(savings, 2),
        repair_count: repairs.len(),
        repairs,
        timestamp: now,
        currency: CURRENCY.to_string(),
    }
}
