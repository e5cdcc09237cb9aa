//! Derived variables summed from model components.

use log::warn;

use crate::grid::{Dataset, Field};
use crate::model::ModelError;

/// A derived variable: a name and the component variables it sums.
#[derive(Clone, Copy, Debug)]
pub struct DerivedVariable {
    /// Name of the derived variable.
    pub name: &'static str,
    /// Component variable names, all summed.
    pub components: &'static [&'static str],
    /// Descriptive name for the output attributes.
    pub long_name: &'static str,
}

/// Total precipitation: convective plus large-scale.
pub const PRECT: DerivedVariable = DerivedVariable {
    name: "PRECT",
    components: &["PRECC", "PRECL"],
    long_name: "total precipitation",
};

/// Secondary organic aerosol over both fine modes.
pub const SOA: DerivedVariable = DerivedVariable {
    name: "soa",
    components: &[
        "soa1_a1", "soa2_a1", "soa3_a1", "soa4_a1", "soa5_a1",
        "soa1_a2", "soa2_a2", "soa3_a2", "soa4_a2", "soa5_a2",
    ],
    long_name: "secondary organic aerosol",
};

/// Primary organic matter.
pub const POM: DerivedVariable = DerivedVariable {
    name: "pom",
    components: &["pom_a1", "pom_a4"],
    long_name: "primary organic matter",
};

/// Mineral dust over all modes.
pub const DUST: DerivedVariable = DerivedVariable {
    name: "dust",
    components: &["dst_a1", "dst_a2", "dst_a3"],
    long_name: "mineral dust",
};

/// Black carbon.
pub const BC: DerivedVariable = DerivedVariable {
    name: "bc",
    components: &["bc_a1", "bc_a4"],
    long_name: "black carbon",
};

/// Sea salt over all modes.
pub const SEA_SALT: DerivedVariable = DerivedVariable {
    name: "seasalt",
    components: &["ncl_a1", "ncl_a2", "ncl_a3"],
    long_name: "sea salt aerosol",
};

/// Sulfate over all modes.
pub const SULFATE: DerivedVariable = DerivedVariable {
    name: "sulfate",
    components: &["so4_a1", "so4_a2", "so4_a3"],
    long_name: "sulfate aerosol",
};

/// Every aerosol component, for the total-aerosol sum.
pub const TOTAL_AEROSOL: DerivedVariable = DerivedVariable {
    name: "aerosol",
    components: &[
        "soa1_a1", "soa2_a1", "soa3_a1", "soa4_a1", "soa5_a1",
        "soa1_a2", "soa2_a2", "soa3_a2", "soa4_a2", "soa5_a2",
        "pom_a1", "pom_a4",
        "dst_a1", "dst_a2", "dst_a3",
        "bc_a1", "bc_a4",
        "ncl_a1", "ncl_a2", "ncl_a3",
        "so4_a1", "so4_a2", "so4_a3",
    ],
    long_name: "total aerosol",
};

/// Wet acid deposition.
pub const ACID_DEPOSITION: DerivedVariable = DerivedVariable {
    name: "acid_deposition",
    components: &["WD_H2SO4", "WD_HNO3", "WD_HCL", "WD_HF"],
    long_name: "wet acid deposition",
};

/// The aerosol groupings in reporting order.
pub const AEROSOL_GROUPS: [DerivedVariable; 7] =
    [SOA, POM, DUST, BC, SEA_SALT, SULFATE, TOTAL_AEROSOL];

/// Sum the components of a derived variable into a new dataset field.
///
/// Missing components are logged and skipped; errors when none of them
/// is present. The units are taken from the first present component.
pub fn add_derived(ds: &mut Dataset, spec: &DerivedVariable) -> Result<(), ModelError> {
    let mut total: Option<Field> = None;

    for name in spec.components {
        let Some(component) = ds.field(name) else {
            warn!("component '{}' of '{}' missing, skipped", name, spec.name);
            continue;
        };
        total = Some(match total {
            None => {
                let mut first = component.clone();
                first.name = spec.name.to_string();
                first
            }
            Some(sum) => sum.zip_with(component, spec.name, &sum.units, |a, b| a + b)?,
        });
    }

    let mut total = total.ok_or(ModelError::NoComponents(spec.name))?;
    total.long_name = Some(spec.long_name.to_string());
    ds.push_field(total)?;
    Ok(())
}

/// Convert a precipitation rate from m/s to mm/day in place.
pub fn precip_to_mm_per_day(field: &mut Field) {
    field.scale(86_400.0 * 1000.0);
    field.units = "mm/day".to_string();
}
