//! Static repair catalog keyed by component, problem type and severity tier.

use wearwatch_common::types::Component::{Battery, Brakes, Engine, Tires, Transmission};
use wearwatch_common::types::SeverityTier::{Critical, Major, Minor, Preventive};
use wearwatch_common::types::{Component, SeverityTier};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    pub description: &'static str,
    pub parts_cost: f64,
    pub labor_hours: f64,
}

const fn entry(description: &'static str, parts_cost: f64, labor_hours: f64) -> CatalogEntry {
    CatalogEntry {
        description,
        parts_cost,
        labor_hours,
    }
}

static CATALOG: &[(Component, &str, SeverityTier, CatalogEntry)] = &[
    (Engine, "overheating", Preventive, entry("Coolant flush and thermostat check", 35.0, 1.0)),
    (Engine, "overheating", Minor, entry("Thermostat replacement", 80.0, 2.0)),
    (Engine, "overheating", Major, entry("Radiator and water pump replacement", 350.0, 4.0)),
    (Engine, "overheating", Critical, entry("Head gasket replacement", 450.0, 12.0)),
    (Engine, "excessive_wear", Preventive, entry("Oil and filter change", 60.0, 0.5)),
    (Engine, "excessive_wear", Minor, entry("Spark plugs and ignition service", 150.0, 2.5)),
    (Engine, "excessive_wear", Major, entry("Partial engine overhaul", 600.0, 10.0)),
    (Engine, "excessive_wear", Critical, entry("Engine rebuild", 2500.0, 20.0)),
    (Engine, "oil_change", Preventive, entry("Oil and filter change", 45.0, 0.5)),
    (Brakes, "wear_degradation", Preventive, entry("Brake inspection", 0.0, 0.5)),
    (Brakes, "wear_degradation", Minor, entry("Front brake pad replacement", 60.0, 1.0)),
    (Brakes, "wear_degradation", Major, entry("Pads and discs replacement", 180.0, 2.0)),
    (Brakes, "wear_degradation", Critical, entry("Full brake system overhaul", 450.0, 4.0)),
    (Brakes, "accelerated_wear", Preventive, entry("Brake fluid replacement", 15.0, 1.0)),
    (Brakes, "accelerated_wear", Minor, entry("Pad replacement on both axles", 90.0, 2.5)),
    (Brakes, "accelerated_wear", Major, entry("Pads, discs and caliper service", 380.0, 4.0)),
    (Transmission, "gear_stress", Preventive, entry("Transmission fluid change", 80.0, 1.0)),
    (Transmission, "gear_stress", Minor, entry("Clutch adjustment and synchro service", 200.0, 4.0)),
    (Transmission, "gear_stress", Major, entry("Clutch kit replacement", 450.0, 6.0)),
    (Transmission, "gear_stress", Critical, entry("Gearbox rebuild", 1200.0, 15.0)),
    (Transmission, "aggressive_driving_wear", Preventive, entry("Transmission inspection and fluid service", 90.0, 1.5)),
    (Transmission, "aggressive_driving_wear", Minor, entry("Clutch and flywheel inspection", 350.0, 8.0)),
    (Transmission, "aggressive_driving_wear", Major, entry("Clutch and dual-mass flywheel replacement", 800.0, 12.0)),
    (Tires, "pressure_loss", Preventive, entry("Valve replacement and pressure check", 20.0, 0.3)),
    (Tires, "pressure_loss", Minor, entry("Puncture repair", 15.0, 0.5)),
    (Tires, "pressure_loss", Major, entry("Single tire replacement", 90.0, 0.5)),
    (Tires, "pressure_loss", Critical, entry("Full tire set replacement", 360.0, 1.5)),
    (Tires, "high_speed_wear", Preventive, entry("Tire rotation and balancing", 0.0, 1.0)),
    (Tires, "high_speed_wear", Minor, entry("Wheel alignment", 0.0, 1.5)),
    (Tires, "high_speed_wear", Major, entry("Front tire pair replacement", 180.0, 1.5)),
    (Battery, "heat_degradation", Preventive, entry("Battery terminal cleaning and test", 5.0, 0.3)),
    (Battery, "heat_degradation", Minor, entry("Charging system diagnosis", 0.0, 0.5)),
    (Battery, "heat_degradation", Major, entry("Standard battery replacement", 120.0, 0.5)),
    (Battery, "heat_degradation", Critical, entry("Battery and alternator replacement", 180.0, 1.5)),
    (Battery, "cold_performance", Preventive, entry("Battery test and charge", 0.0, 0.5)),
    (Battery, "cold_performance", Minor, entry("Standard battery replacement", 100.0, 0.5)),
];

/// Exact catalog lookup without tier fallback.
pub fn lookup(component: Component, problem_type: &str, tier: SeverityTier) -> Option<&'static CatalogEntry> {
    CATALOG
        .iter()
        .find(|(c, p, t, _)| *c == component && *p == problem_type && *t == tier)
        .map(|(_, _, _, e)| e)
}

/// Lookup that steps the tier down towards `Preventive` until an entry exists.
pub fn resolve(
    component: Component,
    problem_type: &str,
    tier: SeverityTier,
) -> Option<(SeverityTier, &'static CatalogEntry)> {
    let mut current = Some(tier);
    while let Some(t) = current {
        if let Some(e) = lookup(component, problem_type, t) {
            return Some((t, e));
        }
        current = t.step_down();
    }
    None
}

pub fn knows_problem(component: Component, problem_type: &str) -> bool {
    CATALOG
        .iter()
        .any(|(c, p, _, _)| *c == component && *p == problem_type)
}
