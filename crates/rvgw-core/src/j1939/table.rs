//! J1939 PGN tables: the standard SAE table, and the OEM extension layers
//! (Cummins, Allison, chassis body builder) a deployment opts into on top
//! of it. Later layers shadow the SAE table on PGN collision, the way a
//! chassis OEM's own dictionary takes precedence over the generic one for
//! PGNs it reuses.
use crate::config::J1939Config;
use crate::signal::SignalDef;

#[derive(Clone)]
pub struct PgnDef {
    pub pgn: u32,
    pub name: &'static str,
    pub signals: &'static [SignalDef],
    /// The OEM this entry is attributed to. `None` for plain SAE PGNs.
    pub manufacturer: Option<&'static str>,
}

const ENGINE_CONTROLLER_1_SIGNALS: &[SignalDef] = &[
    SignalDef::new("engine_torque_percent", 16, 8).scaled(1.0, -125.0),
    SignalDef::new("engine_speed", 24, 16).scaled(0.125, 0.0),
];

const VEHICLE_SPEED_SIGNALS: &[SignalDef] = &[
    SignalDef::new("vehicle_speed", 8, 16).scaled(1.0 / 256.0, 0.0)
];

/// Transmission operating parameters. This DGN/PGN historically collided
/// with an alternate engine-temperature grouping in the source data
/// dictionary (see `j1939::bridge` table comment); this table resolves the
/// collision by keeping 0xFEFF for transmission parameters only.
const TRANSMISSION_SIGNALS: &[SignalDef] = &[
    SignalDef::new("selected_gear", 0, 8),
    SignalDef::new("current_gear", 1, 8),
];

const ENGINE_TEMPERATURE_SIGNALS: &[SignalDef] = &[
    SignalDef::new("engine_coolant_temp", 0, 8).scaled(1.0, -40.0),
    SignalDef::new("fuel_temp", 1, 8).scaled(1.0, -40.0),
];

static SAE_TABLE: &[PgnDef] = &[
    PgnDef {
        pgn: 0xF004,
        name: "EEC1",
        signals: ENGINE_CONTROLLER_1_SIGNALS,
        manufacturer: None,
    },
    PgnDef {
        pgn: 0xFEF1,
        name: "CCVS",
        signals: VEHICLE_SPEED_SIGNALS,
        manufacturer: None,
    },
    PgnDef {
        pgn: 0xFEFF,
        name: "ETC7",
        signals: TRANSMISSION_SIGNALS,
        manufacturer: None,
    },
    PgnDef {
        pgn: 0xFEEE,
        name: "ET1",
        signals: ENGINE_TEMPERATURE_SIGNALS,
        manufacturer: None,
    },
];

const CUMMINS_AFTERTREATMENT_SIGNALS: &[SignalDef] = &[
    SignalDef::new("dpf_soot_load_percent", 0, 8),
    SignalDef::new("def_level_percent", 8, 8),
];

static CUMMINS_TABLE: &[PgnDef] = &[PgnDef {
    pgn: 0xFD7C,
    name: "Cummins Aftertreatment 1",
    signals: CUMMINS_AFTERTREATMENT_SIGNALS,
    manufacturer: Some("Cummins"),
}];

const ALLISON_TRANSMISSION_SIGNALS: &[SignalDef] = &[
    SignalDef::new("torque_converter_lockup", 0, 1),
    SignalDef::new("oil_temp", 8, 8).scaled(1.0, -40.0),
];

static ALLISON_TABLE: &[PgnDef] = &[PgnDef {
    pgn: 0xFE55,
    name: "Allison Transmission Status",
    signals: ALLISON_TRANSMISSION_SIGNALS,
    manufacturer: Some("Allison Transmission"),
}];

const CHASSIS_BODY_BUILDER_SIGNALS: &[SignalDef] = &[
    SignalDef::new("pto_engaged", 0, 1),
    SignalDef::new("auxiliary_output_state", 1, 1),
];

static CHASSIS_TABLE: &[PgnDef] = &[PgnDef {
    pgn: 0xFEC0,
    name: "Chassis Body Builder Module",
    signals: CHASSIS_BODY_BUILDER_SIGNALS,
    manufacturer: Some("Spartan Motors"),
}];

/// Looks up a PGN in the standard SAE table only, independent of which OEM
/// extensions a deployment has enabled. Kept for callers that only ever
/// decode plain SAE traffic.
pub fn lookup_pgn(pgn: u32) -> Option<&'static PgnDef> {
    SAE_TABLE.iter().find(|p| p.pgn == pgn)
}

/// The full PGN table for one deployment: the SAE table plus whichever
/// OEM extension layers its [`J1939Config`] enables, in SAE → Cummins →
/// Allison → chassis order.
pub struct J1939Table {
    entries: Vec<PgnDef>,
}

impl J1939Table {
    pub fn build(config: &J1939Config) -> Self {
        let mut entries: Vec<PgnDef> = SAE_TABLE.to_vec();
        if config.enable_cummins_extensions {
            entries.extend(CUMMINS_TABLE.iter().cloned());
        }
        if config.enable_allison_extensions {
            entries.extend(ALLISON_TABLE.iter().cloned());
        }
        if config.enable_chassis_extensions {
            entries.extend(CHASSIS_TABLE.iter().cloned());
        }
        Self { entries }
    }

    /// Later-enabled layers shadow the SAE table on PGN collision.
    pub fn lookup(&self, pgn: u32) -> Option<&PgnDef> {
        self.entries.iter().rev().find(|p| p.pgn == pgn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sae_table_is_unaffected_by_oem_toggles() {
        assert!(lookup_pgn(0xF004).is_some());
        assert!(lookup_pgn(0xFD7C).is_none());
    }

    #[test]
    fn layered_table_adds_only_enabled_oem_extensions() {
        let mut config = J1939Config::default();
        config.enable_cummins_extensions = true;
        let table = J1939Table::build(&config);

        assert!(table.lookup(0xF004).is_some());
        assert!(table.lookup(0xFD7C).is_some());
        assert!(table.lookup(0xFE55).is_none());
    }

    #[test]
    fn layered_table_records_manufacturer_provenance() {
        let mut config = J1939Config::default();
        config.enable_chassis_extensions = true;
        let table = J1939Table::build(&config);

        let entry = table.lookup(0xFEC0).unwrap();
        assert_eq!(entry.manufacturer, Some("Spartan Motors"));
        assert_eq!(table.lookup(0xF004).unwrap().manufacturer, None);
    }
}
