//! Built-in table catalog.
//!
//! Pure declarative data: each entry names the processed table, the raw
//! Census table it comes from, its universe, and the crosswalk applied to
//! its columns. Race iterations of a table derive from a base config and
//! override only the name and raw table id.

use super::{RegistryError, TableConfig, TableRegistry};

fn invalid(name: &str) -> impl FnOnce(super::CrosswalkError) -> RegistryError {
    let name = name.to_owned();
    move |source| RegistryError::InvalidCrosswalk { name, source }
}

/// Registers every built-in table. Called once by [`TableRegistry::builtin`].
pub(super) fn register_all(registry: &mut TableRegistry) -> Result<(), RegistryError> {
    let mobility = TableConfig::builder("mobility", "B07003")
        .universe("population 1 year and over")
        .crosswalk([
            ("001E", "universe"),
            ("004E", "same_house"),
            ("007E", "moved_within_county"),
            ("010E", "moved_from_different_county_in_same_state"),
            ("013E", "moved_from_different_state"),
            ("016E", "moved_from_abroad"),
        ])
        .map_err(invalid("mobility"))?
        .build();
    registry.register(mobility)?;

    let mobility_by_sex = TableConfig::builder("mobilitybysex", "B07003")
        .universe("population 1 year and over")
        .crosswalk([
            ("001E", "universe"),
            ("002E", "male_total"),
            ("003E", "female_total"),
            ("004E", "total_same_house"),
            ("005E", "male_same_house"),
            ("006E", "female_same_house"),
            ("007E", "total_moved_within_county"),
            ("008E", "male_moved_within_county"),
            ("009E", "female_moved_within_county"),
            ("010E", "total_moved_from_different_county_in_same_state"),
            ("011E", "male_moved_from_different_county_in_same_state"),
            ("012E", "female_moved_from_different_county_in_same_state"),
            ("013E", "total_moved_from_different_state"),
            ("014E", "male_moved_from_different_state"),
            ("015E", "female_moved_from_different_state"),
            ("016E", "total_moved_from_abroad"),
            ("017E", "male_moved_from_abroad"),
            ("018E", "female_moved_from_abroad"),
        ])
        .map_err(invalid("mobilitybysex"))?
        .build();
    registry.register(mobility_by_sex)?;

    // Race iterations of B07004 share one crosswalk; only the table id and
    // processed name differ.
    let mobility_white = TableConfig::builder("mobilitywhite", "B07004H")
        .universe("population 1 year and over")
        .crosswalk([
            ("001E", "universe"),
            ("002E", "same_house"),
            ("003E", "moved_within_county"),
            ("004E", "moved_from_different_county_in_same_state"),
            ("005E", "moved_from_different_state"),
            ("006E", "moved_from_abroad"),
        ])
        .map_err(invalid("mobilitywhite"))?
        .build();

    let mobility_black = TableConfig::derive(&mobility_white)
        .processed_name("mobilityblack")
        .raw_table("B07004B")
        .build();
    let mobility_asian = TableConfig::derive(&mobility_white)
        .processed_name("mobilityasian")
        .raw_table("B07004D")
        .build();
    let mobility_latino = TableConfig::derive(&mobility_white)
        .processed_name("mobilitylatino")
        .raw_table("B07004I")
        .build();

    registry.register(mobility_white)?;
    registry.register(mobility_black)?;
    registry.register(mobility_asian)?;
    registry.register(mobility_latino)?;

    let population = TableConfig::builder("population", "B01003")
        .universe("total population")
        .crosswalk([("001E", "total_population")])
        .map_err(invalid("population"))?
        .build();
    registry.register(population)?;

    let median_age = TableConfig::builder("medianage", "B01002")
        .universe("total population")
        .crosswalk([
            ("001E", "median_age"),
            ("002E", "median_age_male"),
            ("003E", "median_age_female"),
        ])
        .map_err(invalid("medianage"))?
        .build();
    registry.register(median_age)?;

    let median_household_income = TableConfig::builder("medianhouseholdincome", "B19013")
        .universe("households")
        .crosswalk([("001E", "median_household_income")])
        .map_err(invalid("medianhouseholdincome"))?
        .build();

    let income_white = TableConfig::derive(&median_household_income)
        .processed_name("medianhouseholdincomewhite")
        .raw_table("B19013H")
        .build();
    let income_black = TableConfig::derive(&median_household_income)
        .processed_name("medianhouseholdincomeblack")
        .raw_table("B19013B")
        .build();
    let income_asian = TableConfig::derive(&median_household_income)
        .processed_name("medianhouseholdincomeasian")
        .raw_table("B19013D")
        .build();
    let income_latino = TableConfig::derive(&median_household_income)
        .processed_name("medianhouseholdincomelatino")
        .raw_table("B19013I")
        .build();

    registry.register(median_household_income)?;
    registry.register(income_white)?;
    registry.register(income_black)?;
    registry.register(income_asian)?;
    registry.register(income_latino)?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::TableRegistry;

    #[test]
    fn test_catalog_registers_without_conflicts() {
        let registry = TableRegistry::builtin().unwrap();
        assert_eq!(registry.len(), 13);
    }

    #[test]
    fn test_income_iterations_inherit_single_field_crosswalk() {
        let registry = TableRegistry::builtin().unwrap();
        let base = registry.resolve("medianhouseholdincome").unwrap();
        for name in [
            "medianhouseholdincomewhite",
            "medianhouseholdincomeblack",
            "medianhouseholdincomeasian",
            "medianhouseholdincomelatino",
        ] {
            let derived = registry.resolve(name).unwrap();
            assert_eq!(derived.crosswalk, base.crosswalk, "{name} diverged");
            assert_eq!(derived.universe, base.universe);
        }
    }

    #[test]
    fn test_catalog_universes_are_informational_but_present() {
        let registry = TableRegistry::builtin().unwrap();
        for name in registry.table_names() {
            let config = registry.resolve(name).unwrap();
            assert!(
                !config.universe.is_empty(),
                "table {name} missing universe description"
            );
        }
    }
}
