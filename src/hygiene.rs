//! Post-pass over a harvested dataset: null-column pruning, categorical
//! grouping of free-text columns, and the development stage defaults.

use crate::config::NullStagePolicy;
use crate::data::{Table, Value};
use crate::frame::Frame;
use crate::transportup::{DevStage, TransportUpRecord};
use crate::CrawlerError;
use tracing::{debug, info};

/// Drops every column whose share of missing cells is at least `threshold`
/// and returns the dropped names.
pub fn drop_null_columns(frame: &mut Frame, threshold: f64) -> Result<Vec<String>, CrawlerError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(CrawlerError::InvalidThreshold(threshold));
    }
    if frame.is_empty() {
        return Ok(vec![]);
    }

    let total = frame.len() as f64;
    let dropped: Vec<String> = frame
        .columns()
        .iter()
        .filter(|c| {
            let missing = frame
                .column(c)
                .map_or(0, |values| values.filter(|v| v.is_missing()).count());
            missing as f64 / total >= threshold
        })
        .cloned()
        .collect();

    frame.drop_columns(&dropped);
    info!("Dropped {} columns: {:?}", dropped.len(), dropped);
    Ok(dropped)
}

pub fn assign_ac_type(category: &str) -> Option<&'static str> {
    let c = category.to_lowercase();
    if c.contains("winged") && c.contains("vtol") {
        Some("Winged VTOL")
    } else if c.contains("wingless") && c.contains("vtol") {
        Some("Wingless VTOL")
    } else if c.contains("stol") {
        Some("STOL")
    } else {
        None
    }
}

pub fn assign_powerplant(powerplant: &str) -> &'static str {
    let p = powerplant.to_lowercase();
    if p.contains("hybrid") {
        "hybrid electric"
    } else if p.contains("electric") {
        "electric"
    } else {
        "undisclosed"
    }
}

pub fn assign_autonlevel(level: &str) -> &'static str {
    let l = level.trim().to_lowercase();
    let semi = l.contains("semi");
    let pilot = l.contains("pilot");
    if semi && !pilot {
        "semi autonomous"
    } else if l.contains("autonomous") && !semi {
        "autonomous"
    } else if pilot && semi {
        "piloted semi autonomous"
    } else if l == "piloted" {
        "piloted"
    } else {
        "undisclosed"
    }
}

/// Production stage grouping; flight testing still counts as prototype.
pub fn prod_stage(stage: DevStage) -> &'static str {
    match stage {
        DevStage::PreliminaryDesign => "pre production",
        DevStage::PrototypeBuild | DevStage::FlightTesting => "prototype production",
        DevStage::Certification => "lrp",
        DevStage::CommerciallyOperating => "frp",
    }
}

pub fn assign_prod_stage(dev_stage: &str) -> Option<&'static str> {
    dev_stage.parse::<DevStage>().ok().map(prod_stage)
}

fn has_column(frame: &Frame, name: &str) -> bool {
    frame.columns().iter().any(|c| c == name)
}

/// Adds `ac_type`, `prod_stage`, `powerplant_class` and `autonomy_class`
/// for whichever of their source columns the frame carries. Returns the
/// columns written.
pub fn add_derived_columns(frame: &mut Frame) -> Result<Vec<&'static str>, CrawlerError> {
    let mut derived = vec![];

    if has_column(frame, "category") {
        frame.derive_column("ac_type", "category", |v| {
            Value::from(v.as_text().and_then(assign_ac_type))
        })?;
        derived.push("ac_type");
    }
    if has_column(frame, "dev_stage") {
        frame.derive_column("prod_stage", "dev_stage", |v| {
            Value::from(v.as_text().and_then(assign_prod_stage))
        })?;
        derived.push("prod_stage");
    }
    if has_column(frame, "Powerplant") {
        frame.derive_column("powerplant_class", "Powerplant", |v| {
            Value::text(assign_powerplant(v.as_text().unwrap_or_default()))
        })?;
        derived.push("powerplant_class");
    }
    if has_column(frame, "Autonomy Level") {
        frame.derive_column("autonomy_class", "Autonomy Level", |v| {
            Value::text(assign_autonlevel(v.as_text().unwrap_or_default()))
        })?;
        derived.push("autonomy_class");
    }

    debug!(?derived, "Derived columns");
    Ok(derived)
}

/// Gives rows of `policy.category` with no development stage the policy's
/// stage. Returns how many rows changed.
pub fn fill_missing_dev_stage(
    table: &mut Table<TransportUpRecord>,
    policy: &NullStagePolicy,
) -> usize {
    let targets: Vec<String> = table
        .iter()
        .filter(|r| r.dev_stage.is_none() && r.category == policy.category)
        .map(|r| r.link.clone())
        .collect();

    for link in &targets {
        if let Some(record) = table.get_mut(link) {
            record.dev_stage = Some(policy.stage);
        }
    }

    info!(
        "Set dev_stage to {:?} on {} {:?} rows",
        policy.stage.as_str(),
        targets.len(),
        policy.category
    );
    targets.len()
}
